//! Error types for the codec crate.

use std::io;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding frames.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A structural byte did not match the frame format.
    #[error("malformed frame at offset {offset}: awaited {expected}, got {found}")]
    Format {
        /// Stream offset of the first offending byte.
        offset: u64,
        /// What the decoder expected at that point.
        expected: String,
        /// The bytes actually found, escaped for display.
        found: String,
    },

    /// A declared length does not fit in an in-memory buffer.
    #[error("malformed frame at offset {offset}: {field} overflows")]
    LengthOverflow {
        /// Stream offset of the offending digit.
        offset: u64,
        /// Which length field overflowed.
        field: &'static str,
    },

    /// The stream ended in the middle of a frame.
    #[error("truncated input at offset {offset}: {what} needs {needed} bytes, got {got}")]
    Truncated {
        /// Stream offset where input ran out.
        offset: u64,
        /// Which part of the frame was being read.
        what: &'static str,
        /// Bytes required for that part.
        needed: usize,
        /// Bytes actually available.
        got: usize,
    },

    /// The decoder already failed and cannot resynchronize.
    #[error("decoder already failed; stream position is undefined")]
    Poisoned,
}

impl CodecError {
    /// Creates a format error for an unexpected byte sequence.
    pub fn format(offset: u64, expected: impl Into<String>, found: &[u8]) -> Self {
        Self::Format {
            offset,
            expected: expected.into(),
            found: escape(found),
        }
    }

    /// Returns true if the input was structurally malformed.
    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::LengthOverflow { .. })
    }

    /// Returns true if the input ended mid-frame.
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

/// Renders bytes as a quoted, escaped string for error messages.
pub(crate) fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &b in bytes {
        out.extend(std::ascii::escape_default(b).map(char::from));
    }
    out.push('"');
    out
}
