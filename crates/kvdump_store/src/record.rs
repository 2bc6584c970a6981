//! Log record encoding.
//!
//! ```text
//! | record_len u32 LE | key_len u32 LE | key | value | crc32 u32 LE |
//! ```
//!
//! `record_len` counts the whole record including itself and the CRC. The
//! CRC covers every byte before it.

use crate::error::{StoreError, StoreResult};

/// Size of the fixed header: record_len (4) + key_len (4).
pub(crate) const HEADER_SIZE: usize = 8;
/// Size of the trailing checksum.
pub(crate) const CRC_SIZE: usize = 4;
/// Smallest possible record: empty key and empty value.
pub(crate) const MIN_RECORD_SIZE: usize = HEADER_SIZE + CRC_SIZE;

/// Largest encodable record, bounded by the `u32` length field.
pub const MAX_RECORD_SIZE: usize = u32::MAX as usize;

/// A single key/value write as stored in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Record key.
    pub key: Vec<u8>,
    /// Record value.
    pub value: Vec<u8>,
}

impl LogRecord {
    /// Creates a record from borrowed key and value bytes.
    #[must_use]
    pub fn new(key: &[u8], value: &[u8]) -> Self {
        Self {
            key: key.to_vec(),
            value: value.to_vec(),
        }
    }

    /// Returns the encoded size of a record with the given payload lengths.
    #[must_use]
    pub fn encoded_len(key_len: usize, value_len: usize) -> usize {
        HEADER_SIZE
            .saturating_add(key_len)
            .saturating_add(value_len)
            .saturating_add(CRC_SIZE)
    }

    /// Encodes the record to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RecordTooLarge`] if the record does not fit the
    /// `u32` length field.
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        let record_len = Self::encoded_len(self.key.len(), self.value.len());
        if record_len > MAX_RECORD_SIZE {
            return Err(StoreError::RecordTooLarge {
                size: record_len,
                max: MAX_RECORD_SIZE,
            });
        }

        let mut buf = Vec::with_capacity(record_len);
        buf.extend_from_slice(&(record_len as u32).to_le_bytes());
        buf.extend_from_slice(&(self.key.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.key);
        buf.extend_from_slice(&self.value);

        let crc = compute_crc32(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());

        Ok(buf)
    }

    /// Decodes a record that was read from `offset` in the log.
    ///
    /// `data` must hold exactly one record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corruption`] for malformed lengths and
    /// [`StoreError::ChecksumMismatch`] if the CRC does not match.
    pub fn decode(data: &[u8], offset: u64) -> StoreResult<Self> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(StoreError::corruption(offset, "record too short"));
        }

        let record_len = read_u32(data, 0) as usize;
        if record_len != data.len() {
            return Err(StoreError::corruption(
                offset,
                format!("record length {record_len} does not match {} bytes read", data.len()),
            ));
        }

        let crc_at = record_len - CRC_SIZE;
        let expected = read_u32(data, crc_at);
        let actual = compute_crc32(&data[..crc_at]);
        if expected != actual {
            return Err(StoreError::ChecksumMismatch {
                offset,
                expected,
                actual,
            });
        }

        let key_len = read_u32(data, 4) as usize;
        let payload = &data[HEADER_SIZE..crc_at];
        if key_len > payload.len() {
            return Err(StoreError::corruption(
                offset,
                format!("key length {key_len} exceeds payload of {} bytes", payload.len()),
            ));
        }

        let (key, value) = payload.split_at(key_len);
        Ok(Self::new(key, value))
    }
}

pub(crate) fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// Computes the CRC32 (IEEE) checksum of `data`.
#[must_use]
pub fn compute_crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}
