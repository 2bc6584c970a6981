//! Streaming frame decoder.

use crate::error::{CodecError, CodecResult};
use crate::frame::{
    Frame, FrameHeader, Record, DELIMITER, HEADER_TERMINATOR, LENGTH_SEPARATOR, MARKER,
    MAX_LENGTH_DIGITS, TERMINATOR,
};
use std::io::{self, BufRead, Read};
use tracing::trace;

/// Largest up-front reservation for a payload buffer. Bigger payloads grow
/// the buffer as bytes actually arrive.
const MAX_RESERVE: usize = 64 * 1024;

/// Where the decoder is within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    /// Between frames, waiting for `+` or end of stream.
    AwaitHeader,
    /// Reading `key_len` key bytes.
    ReadKey,
    /// Reading delimiter, value and terminator as one unit.
    ReadValueUnit,
    /// Checking the delimiter and terminator.
    Validate,
    /// Clean end of stream at a frame boundary.
    Done,
    /// A read or validation error occurred; no further frames.
    Failed,
}

/// Reads frames one at a time from a buffered input.
///
/// Key and value scratch buffers are reused across frames. Each frame is
/// sliced to its exact length, so bytes from a longer previous frame never
/// show through.
///
/// ```
/// use kvdump_codec::FrameDecoder;
///
/// let mut decoder = FrameDecoder::new(&b"+1,2:a->bc\n"[..]);
/// let frame = decoder.next_frame().unwrap().unwrap();
/// assert_eq!((frame.key, frame.value), (&b"a"[..], &b"bc"[..]));
/// assert!(decoder.next_frame().unwrap().is_none());
/// ```
pub struct FrameDecoder<R: BufRead> {
    reader: R,
    key: Vec<u8>,
    /// Delimiter + value + terminator of the current frame.
    unit: Vec<u8>,
    position: u64,
    frames: u64,
    state: DecodeState,
}

impl<R: BufRead> FrameDecoder<R> {
    /// Creates a decoder over a buffered reader.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(0, reader)
    }

    /// Creates a decoder whose scratch buffers start with `capacity` bytes.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            reader,
            key: Vec::with_capacity(capacity),
            unit: Vec::with_capacity(capacity),
            position: 0,
            frames: 0,
            state: DecodeState::AwaitHeader,
        }
    }

    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` once the stream ends exactly at a frame boundary.
    ///
    /// # Errors
    ///
    /// - [`CodecError::Format`] / [`CodecError::LengthOverflow`] for
    ///   malformed headers, delimiters or terminators
    /// - [`CodecError::Truncated`] if the stream ends inside a frame
    /// - [`CodecError::Io`] if the reader fails
    /// - [`CodecError::Poisoned`] if called again after an error
    pub fn next_frame(&mut self) -> CodecResult<Option<Frame<'_>>> {
        match self.state {
            DecodeState::Done => return Ok(None),
            DecodeState::Failed => return Err(CodecError::Poisoned),
            _ => {}
        }

        match self.advance() {
            Ok(true) => {
                self.state = DecodeState::AwaitHeader;
                let value_end = self.unit.len() - 1;
                Ok(Some(Frame {
                    key: &self.key,
                    value: &self.unit[DELIMITER.len()..value_end],
                }))
            }
            Ok(false) => {
                self.state = DecodeState::Done;
                Ok(None)
            }
            Err(e) => {
                self.state = DecodeState::Failed;
                Err(e)
            }
        }
    }

    /// Current state of the decoder.
    #[must_use]
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Bytes consumed from the input so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Frames decoded so far.
    #[must_use]
    pub fn frames_read(&self) -> u64 {
        self.frames
    }

    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Runs one frame through the state machine. Returns false on clean EOF.
    fn advance(&mut self) -> CodecResult<bool> {
        self.state = DecodeState::AwaitHeader;
        let frame_start = self.position;

        let Some(header) = self.read_header()? else {
            return Ok(false);
        };
        trace!(
            offset = frame_start,
            key_len = header.key_len,
            value_len = header.value_len,
            "frame header"
        );

        self.state = DecodeState::ReadKey;
        let key_start = self.position;
        let got = read_exact_into(&mut self.reader, &mut self.key, header.key_len)?;
        self.position += got as u64;
        if got < header.key_len {
            return Err(CodecError::Truncated {
                offset: key_start + got as u64,
                what: "key",
                needed: header.key_len,
                got,
            });
        }

        self.state = DecodeState::ReadValueUnit;
        let unit_start = self.position;
        let unit_len = header.value_unit_len().ok_or(CodecError::LengthOverflow {
            offset: frame_start,
            field: "value length",
        })?;
        let got = read_exact_into(&mut self.reader, &mut self.unit, unit_len)?;
        self.position += got as u64;
        if got < unit_len {
            return Err(CodecError::Truncated {
                offset: unit_start + got as u64,
                what: "delimiter, value and terminator",
                needed: unit_len,
                got,
            });
        }

        self.state = DecodeState::Validate;
        let delimiter = &self.unit[..DELIMITER.len()];
        if delimiter != DELIMITER {
            return Err(CodecError::format(
                unit_start,
                "delimiter \"->\"",
                delimiter,
            ));
        }

        let last = self.unit[unit_len - 1];
        if last != TERMINATOR {
            return Err(CodecError::format(
                unit_start + unit_len as u64 - 1,
                "end of line",
                &[last],
            ));
        }

        self.frames += 1;
        Ok(true)
    }

    /// Parses `+<key_len>,<value_len>:`. `None` means EOF before the marker.
    fn read_header(&mut self) -> CodecResult<Option<FrameHeader>> {
        let start = self.position;
        match self.next_byte()? {
            None => return Ok(None),
            Some(MARKER) => {}
            Some(other) => return Err(CodecError::format(start, "frame marker '+'", &[other])),
        }

        let key_len = self.read_length(LENGTH_SEPARATOR, "key length")?;
        let value_len = self.read_length(HEADER_TERMINATOR, "value length")?;
        Ok(Some(FrameHeader::new(key_len, value_len)))
    }

    /// Parses decimal digits up to and including `terminator`.
    fn read_length(&mut self, terminator: u8, field: &'static str) -> CodecResult<usize> {
        let mut value: u64 = 0;
        let mut digits = 0usize;

        loop {
            let at = self.position;
            let Some(byte) = self.next_byte()? else {
                return Err(CodecError::Truncated {
                    offset: at,
                    what: "frame header",
                    needed: 1,
                    got: 0,
                });
            };

            match byte {
                b'0'..=b'9' => {
                    digits += 1;
                    if digits > MAX_LENGTH_DIGITS {
                        return Err(CodecError::format(
                            at,
                            format!("at most {MAX_LENGTH_DIGITS} digits in {field}"),
                            &[byte],
                        ));
                    }
                    value = value
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(u64::from(byte - b'0')))
                        .ok_or(CodecError::LengthOverflow { offset: at, field })?;
                }
                b if b == terminator && digits > 0 => {
                    return usize::try_from(value)
                        .map_err(|_| CodecError::LengthOverflow { offset: at, field });
                }
                other if digits == 0 => {
                    return Err(CodecError::format(at, format!("digit in {field}"), &[other]));
                }
                other => {
                    return Err(CodecError::format(
                        at,
                        format!("digit or '{}' after {field}", char::from(terminator)),
                        &[other],
                    ));
                }
            }
        }
    }

    fn next_byte(&mut self) -> CodecResult<Option<u8>> {
        loop {
            let byte = match self.reader.fill_buf() {
                Ok(buf) => buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if byte.is_some() {
                self.reader.consume(1);
                self.position += 1;
            }
            return Ok(byte);
        }
    }
}

/// Replaces `buf` with up to `len` bytes from `reader`, returning how many
/// arrived before EOF.
fn read_exact_into<R: Read>(reader: &mut R, buf: &mut Vec<u8>, len: usize) -> io::Result<usize> {
    buf.clear();
    buf.reserve(len.min(MAX_RESERVE));
    reader.take(len as u64).read_to_end(buf)
}

impl<R: BufRead> Iterator for FrameDecoder<R> {
    type Item = CodecResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == DecodeState::Failed {
            return None;
        }
        match self.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame.to_record())),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
