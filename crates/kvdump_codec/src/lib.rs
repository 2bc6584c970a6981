//! # kvdump codec
//!
//! The stream format used by `kvdump dump` and `kvdump load`.
//!
//! Each key/value record becomes one self-delimiting frame:
//!
//! ```text
//! +<key_len>,<value_len>:<key>-><value>\n
//! ```
//!
//! Lengths are decimal ASCII. Frame boundaries come from the lengths alone,
//! so keys and values may hold any byte, including `\n` and `->`. The
//! delimiter and the trailing newline only make dumps readable; the decoder
//! checks that they are present but never searches for them.
//!
//! ## Usage
//!
//! ```
//! use kvdump_codec::{from_frame_bytes, to_frame_bytes, Record};
//!
//! let bytes = to_frame_bytes(b"ab", b"cd");
//! assert_eq!(bytes, b"+2,2:ab->cd\n");
//!
//! let records = from_frame_bytes(&bytes).unwrap();
//! assert_eq!(records, vec![Record::new(b"ab", b"cd")]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod frame;

pub use decoder::{DecodeState, FrameDecoder};
pub use encoder::FrameEncoder;
pub use error::{CodecError, CodecResult};
pub use frame::{
    Frame, FrameHeader, Record, DELIMITER, HEADER_TERMINATOR, LENGTH_SEPARATOR, MARKER,
    MAX_LENGTH_DIGITS, TERMINATOR,
};

/// Encodes a single record as frame bytes.
#[must_use]
pub fn to_frame_bytes(key: &[u8], value: &[u8]) -> Vec<u8> {
    let header = FrameHeader::new(key.len(), value.len());
    let mut out = Vec::with_capacity(header.frame_len());
    header.encode_into(&mut out);
    out.extend_from_slice(key);
    out.extend_from_slice(&DELIMITER);
    out.extend_from_slice(value);
    out.push(TERMINATOR);
    out
}

/// Decodes every frame in `bytes`.
///
/// # Errors
///
/// Returns the first format or truncation error encountered.
pub fn from_frame_bytes(bytes: &[u8]) -> CodecResult<Vec<Record>> {
    FrameDecoder::new(bytes).collect()
}
