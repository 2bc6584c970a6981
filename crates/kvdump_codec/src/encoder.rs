//! Streaming frame encoder.

use crate::error::{CodecError, CodecResult};
use crate::frame::{FrameHeader, DELIMITER, TERMINATOR};
use std::io::{BufWriter, Write};

/// Default output buffer size.
const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Writes records as frames to a buffered output.
///
/// Nothing is held beyond the current record and the output buffer, so a
/// dump of any size runs in constant memory. Call [`FrameEncoder::finish`]
/// to flush; dropping the encoder flushes too but swallows the error.
pub struct FrameEncoder<W: Write> {
    writer: BufWriter<W>,
    frames: u64,
    bytes: u64,
}

impl<W: Write> FrameEncoder<W> {
    /// Creates an encoder with the default buffer size.
    pub fn new(inner: W) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, inner)
    }

    /// Creates an encoder with a specific output buffer size.
    pub fn with_capacity(capacity: usize, inner: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, inner),
            frames: 0,
            bytes: 0,
        }
    }

    /// Writes one record as a frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`] if the output fails.
    pub fn write_record(&mut self, key: &[u8], value: &[u8]) -> CodecResult<()> {
        let header = FrameHeader::new(key.len(), value.len());

        header.write_to(&mut self.writer)?;
        self.writer.write_all(key)?;
        self.writer.write_all(&DELIMITER)?;
        self.writer.write_all(value)?;
        self.writer.write_all(&[TERMINATOR])?;

        self.frames += 1;
        self.bytes += header.frame_len() as u64;
        Ok(())
    }

    /// Number of frames written so far.
    #[must_use]
    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Number of bytes written so far, including buffered ones.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Flushes buffered frames without consuming the encoder.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`] if the flush fails.
    pub fn flush(&mut self) -> CodecResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes all frames and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`] if the final flush fails.
    pub fn finish(self) -> CodecResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| CodecError::Io(e.into_error()))
    }
}
