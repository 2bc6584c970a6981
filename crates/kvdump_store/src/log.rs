//! Append-only record log on top of a storage backend.

use crate::error::{StoreError, StoreResult};
use crate::record::{read_u32, LogRecord, MIN_RECORD_SIZE};
use kvdump_storage::StorageBackend;
use tracing::{debug, warn};

/// What to do with a damaged record found while scanning the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TailPolicy {
    /// Fail the scan.
    Fail,
    /// Cut the log off at the damaged record.
    Truncate,
    /// Stop scanning and leave the log untouched.
    Skip,
}

impl TailPolicy {
    pub(crate) fn for_open(strict: bool, read_only: bool) -> Self {
        match (strict, read_only) {
            (true, _) => Self::Fail,
            (false, false) => Self::Truncate,
            (false, true) => Self::Skip,
        }
    }
}

/// Outcome of scanning the log while opening a store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Recovery {
    /// Intact records visited.
    pub records: usize,
    /// Bytes past the last intact record (non-strict mode only).
    pub damaged_bytes: u64,
}

pub(crate) struct RecordLog {
    backend: Box<dyn StorageBackend>,
}

impl RecordLog {
    pub(crate) fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Appends a record and returns its offset.
    pub(crate) fn append(&mut self, record: &LogRecord) -> StoreResult<u64> {
        let encoded = record.encode()?;
        Ok(self.backend.append(&encoded)?)
    }

    /// Reads and verifies the record starting at `offset`.
    pub(crate) fn read_at(&self, offset: u64) -> StoreResult<LogRecord> {
        let size = self.backend.size()?;

        if offset.saturating_add(4) > size {
            return Err(StoreError::corruption(offset, "truncated record length"));
        }

        let len_bytes = self.backend.read_at(offset, 4)?;
        let record_len = read_u32(&len_bytes, 0) as usize;

        if record_len < MIN_RECORD_SIZE {
            return Err(StoreError::corruption(
                offset,
                format!("record length {record_len} below minimum {MIN_RECORD_SIZE}"),
            ));
        }

        if offset.saturating_add(record_len as u64) > size {
            return Err(StoreError::corruption(
                offset,
                format!("record of {record_len} bytes extends past end of log ({size} bytes)"),
            ));
        }

        let data = self.backend.read_at(offset, record_len)?;
        LogRecord::decode(&data, offset)
    }

    /// Walks every record from the start of the log, calling `visit` with
    /// each intact record and its offset.
    ///
    /// A damaged record ends the scan as `policy` says.
    pub(crate) fn recover<F>(&mut self, policy: TailPolicy, mut visit: F) -> StoreResult<Recovery>
    where
        F: FnMut(LogRecord, u64),
    {
        let size = self.backend.size()?;
        let mut recovery = Recovery::default();
        let mut offset = 0u64;

        while offset < size {
            let record = match self.read_at(offset) {
                Ok(record) => record,
                Err(e) if e.is_corruption() && policy == TailPolicy::Truncate => {
                    warn!(offset, error = %e, "discarding damaged log tail");
                    self.backend.truncate(offset)?;
                    recovery.damaged_bytes = size - offset;
                    break;
                }
                Err(e) if e.is_corruption() && policy == TailPolicy::Skip => {
                    warn!(offset, error = %e, "ignoring damaged log tail");
                    recovery.damaged_bytes = size - offset;
                    break;
                }
                Err(e) => return Err(e),
            };

            let record_len = LogRecord::encoded_len(record.key.len(), record.value.len()) as u64;
            visit(record, offset);
            recovery.records += 1;
            offset += record_len;
        }

        debug!(
            records = recovery.records,
            damaged_bytes = recovery.damaged_bytes,
            "log scan complete"
        );
        Ok(recovery)
    }

    pub(crate) fn flush(&mut self) -> StoreResult<()> {
        Ok(self.backend.flush()?)
    }

    pub(crate) fn sync(&mut self) -> StoreResult<()> {
        Ok(self.backend.sync()?)
    }

    pub(crate) fn size(&self) -> StoreResult<u64> {
        Ok(self.backend.size()?)
    }
}
