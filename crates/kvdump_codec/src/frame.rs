//! Frame layout.
//!
//! ```text
//! '+' key_len ',' value_len ':' key[key_len] '-' '>' value[value_len] '\n'
//! ```

use std::io::{self, Write};

/// First byte of every frame.
pub const MARKER: u8 = b'+';
/// Separates the key length from the value length.
pub const LENGTH_SEPARATOR: u8 = b',';
/// Ends the header.
pub const HEADER_TERMINATOR: u8 = b':';
/// Visual separator between key and value.
pub const DELIMITER: [u8; 2] = *b"->";
/// Last byte of every frame.
pub const TERMINATOR: u8 = b'\n';

/// Longest accepted run of length digits (`u64::MAX` has 20).
pub const MAX_LENGTH_DIGITS: usize = 20;

/// The `+<key_len>,<value_len>:` prefix of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Key length in bytes.
    pub key_len: usize,
    /// Value length in bytes.
    pub value_len: usize,
}

impl FrameHeader {
    /// Creates a header for the given payload lengths.
    #[must_use]
    pub const fn new(key_len: usize, value_len: usize) -> Self {
        Self { key_len, value_len }
    }

    /// Bytes following the key: delimiter, value and terminator.
    ///
    /// Returns `None` if the sum overflows `usize`.
    #[must_use]
    pub fn value_unit_len(&self) -> Option<usize> {
        self.value_len
            .checked_add(DELIMITER.len())?
            .checked_add(1)
    }

    /// Encoded length of the header alone.
    #[must_use]
    pub fn header_len(&self) -> usize {
        3 + decimal_digits(self.key_len) + decimal_digits(self.value_len)
    }

    /// Encoded length of the whole frame.
    #[must_use]
    pub fn frame_len(&self) -> usize {
        self.header_len() + self.key_len + DELIMITER.len() + self.value_len + 1
    }

    /// Writes the header to `writer`.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        write!(
            writer,
            "{}{}{}{}{}",
            char::from(MARKER),
            self.key_len,
            char::from(LENGTH_SEPARATOR),
            self.value_len,
            char::from(HEADER_TERMINATOR)
        )
    }

    /// Appends the header to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.push(MARKER);
        buf.extend_from_slice(self.key_len.to_string().as_bytes());
        buf.push(LENGTH_SEPARATOR);
        buf.extend_from_slice(self.value_len.to_string().as_bytes());
        buf.push(HEADER_TERMINATOR);
    }
}

fn decimal_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// A decoded frame borrowing the decoder's scratch buffers.
///
/// Valid until the next call to
/// [`FrameDecoder::next_frame`](crate::FrameDecoder::next_frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Key bytes.
    pub key: &'a [u8],
    /// Value bytes.
    pub value: &'a [u8],
}

impl Frame<'_> {
    /// Copies the frame into an owned record.
    #[must_use]
    pub fn to_record(&self) -> Record {
        Record::new(self.key, self.value)
    }
}

/// An owned key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Record {
    /// Key bytes.
    pub key: Vec<u8>,
    /// Value bytes.
    pub value: Vec<u8>,
}

impl Record {
    /// Creates a record by copying key and value.
    #[must_use]
    pub fn new(key: &[u8], value: &[u8]) -> Self {
        Self {
            key: key.to_vec(),
            value: value.to_vec(),
        }
    }
}

impl From<(Vec<u8>, Vec<u8>)> for Record {
    fn from((key, value): (Vec<u8>, Vec<u8>)) -> Self {
        Self { key, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_text() {
        let mut buf = Vec::new();
        FrameHeader::new(12, 0).write_to(&mut buf).unwrap();
        assert_eq!(buf, b"+12,0:");

        let mut encoded = Vec::new();
        FrameHeader::new(12, 0).encode_into(&mut encoded);
        assert_eq!(encoded, buf);
    }

    #[test]
    fn lengths_account_for_every_byte() {
        let header = FrameHeader::new(2, 2);
        assert_eq!(header.header_len(), b"+2,2:".len());
        assert_eq!(header.frame_len(), b"+2,2:ab->cd\n".len());
        assert_eq!(header.value_unit_len(), Some(5));

        let wide = FrameHeader::new(1000, 99);
        assert_eq!(wide.header_len(), b"+1000,99:".len());
    }

    #[test]
    fn value_unit_len_overflow() {
        assert_eq!(FrameHeader::new(0, usize::MAX - 1).value_unit_len(), None);
        assert_eq!(FrameHeader::new(0, usize::MAX - 3).value_unit_len(), Some(usize::MAX));
    }
}
