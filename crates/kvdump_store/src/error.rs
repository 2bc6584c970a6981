//! Error types for the store.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while opening, reading or writing a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] kvdump_storage::StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store does not exist and may not be created.
    #[error("store does not exist: {}", path.display())]
    NotFound {
        /// The path that was opened.
        path: PathBuf,
    },

    /// The store path exists but is not a directory.
    #[error("store path is not a directory: {}", path.display())]
    NotADirectory {
        /// The path that was opened.
        path: PathBuf,
    },

    /// Another process holds the store lock.
    #[error("store locked: another process has exclusive access to {}", path.display())]
    Locked {
        /// The locked store directory.
        path: PathBuf,
    },

    /// The record log is malformed.
    #[error("log corruption at offset {offset}: {message}")]
    Corruption {
        /// Offset of the offending record in the log.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// A record checksum does not match its contents.
    #[error("checksum mismatch at offset {offset}: stored {expected:08x}, computed {actual:08x}")]
    ChecksumMismatch {
        /// Offset of the offending record in the log.
        offset: u64,
        /// Checksum stored in the record.
        expected: u32,
        /// Checksum computed over the record bytes.
        actual: u32,
    },

    /// A key/value pair does not fit into a single log record.
    #[error("record too large: {size} bytes exceeds limit of {max} bytes")]
    RecordTooLarge {
        /// Encoded size the record would need.
        size: usize,
        /// Largest encodable record.
        max: usize,
    },

    /// The store was opened read-only.
    #[error("store is read-only")]
    ReadOnly,

    /// The store has been closed.
    #[error("store is closed")]
    Closed,
}

impl StoreError {
    /// Creates a log corruption error.
    pub fn corruption(offset: u64, message: impl Into<String>) -> Self {
        Self::Corruption {
            offset,
            message: message.into(),
        }
    }

    /// Returns true if this error describes damaged log contents rather than
    /// a failure to access the log.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corruption { .. } | Self::ChecksumMismatch { .. })
    }
}
