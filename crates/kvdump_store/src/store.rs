//! The ordered key-value store.

use crate::config::Config;
use crate::dir::StoreDir;
use crate::error::{StoreError, StoreResult};
use crate::log::{RecordLog, TailPolicy};
use crate::record::LogRecord;
use kvdump_storage::{FileBackend, InMemoryBackend, StorageBackend, StorageError};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// An embedded ordered key-value store.
///
/// A `Store` is owned by exactly one caller. Writes go through
/// [`Store::put`], reads through [`Store::get`] and [`Store::iter`].
/// Call [`Store::close`] to flush and surface flush errors; dropping an
/// open store flushes on a best-effort basis.
pub struct Store {
    config: Config,
    log: RecordLog,
    /// Live key -> offset of its latest record.
    index: BTreeMap<Vec<u8>, u64>,
    dir: Option<StoreDir>,
    is_open: bool,
}

impl Store {
    /// Opens the store at `path`.
    ///
    /// The directory is locked for the lifetime of the store and the log is
    /// scanned to rebuild the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be opened under `config`
    /// (see [`StoreDir::open`]), the log cannot be read, or the log is
    /// damaged in strict mode.
    pub fn open(path: &Path, config: Config) -> StoreResult<Self> {
        let dir = StoreDir::open(path, &config)?;
        let log_path = dir.log_path();

        let opened = if config.read_only {
            FileBackend::open_read_only(&log_path)
        } else if config.may_create() {
            FileBackend::open(&log_path)
        } else {
            FileBackend::open_existing(&log_path)
        };
        let backend = opened.map_err(|e| match e {
            StorageError::Io(err) if err.kind() == io::ErrorKind::NotFound => StoreError::NotFound {
                path: path.to_path_buf(),
            },
            other => other.into(),
        })?;

        debug!(
            path = %path.display(),
            strict = config.strict,
            read_only = config.read_only,
            "opening store"
        );
        let mut store = Self::open_with_backend(config, Box::new(backend))?;
        store.dir = Some(dir);
        Ok(store)
    }

    /// Opens an empty store that lives only in memory.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches the other constructors.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open_with_backend(Config::default(), Box::new(InMemoryBackend::new()))
    }

    /// Opens a store over an arbitrary backend, rebuilding the index from
    /// whatever log bytes it already holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read or is damaged in strict
    /// mode.
    pub fn open_with_backend(config: Config, backend: Box<dyn StorageBackend>) -> StoreResult<Self> {
        let mut log = RecordLog::new(backend);
        let mut index = BTreeMap::new();

        log.recover(TailPolicy::for_open(config.strict, config.read_only), |record, offset| {
            index.insert(record.key, offset);
        })?;

        Ok(Self {
            config,
            log,
            index,
            dir: None,
            is_open: true,
        })
    }

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or read-only, the record is
    /// too large, or the append fails.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.ensure_open()?;
        if self.config.read_only {
            return Err(StoreError::ReadOnly);
        }

        let offset = self.log.append(&LogRecord::new(key, value))?;
        match self.index.get_mut(key) {
            Some(slot) => *slot = offset,
            None => {
                self.index.insert(key.to_vec(), offset);
            }
        }
        Ok(())
    }

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the record cannot be read
    /// back intact.
    pub fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.ensure_open()?;

        let Some(&offset) = self.index.get(key) else {
            return Ok(None);
        };

        let record = self.log.read_at(offset)?;
        Ok(Some(record.value))
    }

    /// Returns a lazy iterator over all records in ascending key order.
    ///
    /// Each item is read from the log when it is yielded. After the first
    /// error the iterator is exhausted. Call `iter` again to restart.
    #[must_use]
    pub fn iter(&self) -> StoreIter<'_> {
        StoreIter {
            log: &self.log,
            entries: self.index.iter(),
            failed: !self.is_open,
            closed: !self.is_open,
        }
    }

    /// Returns the number of live keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the store directory, if the store is file-backed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.dir.as_ref().map(StoreDir::path)
    }

    /// Returns the current size of the record log in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot report its size.
    pub fn log_size(&self) -> StoreResult<u64> {
        self.log.size()
    }

    /// Flushes the log, syncs it if configured, and releases the lock.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing or syncing fails.
    pub fn close(mut self) -> StoreResult<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> StoreResult<()> {
        if !self.is_open {
            return Ok(());
        }
        self.is_open = false;

        if self.config.read_only {
            self.dir = None;
            return Ok(());
        }

        self.log.flush()?;
        if self.config.sync_on_close {
            self.log.sync()?;
        }
        self.dir = None;
        Ok(())
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.is_open {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "failed to flush store on drop");
        }
    }
}

impl<'a> IntoIterator for &'a Store {
    type Item = StoreResult<(Vec<u8>, Vec<u8>)>;
    type IntoIter = StoreIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over the records of a [`Store`].
pub struct StoreIter<'a> {
    log: &'a RecordLog,
    entries: btree_map::Iter<'a, Vec<u8>, u64>,
    failed: bool,
    closed: bool,
}

impl Iterator for StoreIter<'_> {
    type Item = StoreResult<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            self.closed = false;
            return Some(Err(StoreError::Closed));
        }
        if self.failed {
            return None;
        }

        let (key, &offset) = self.entries.next()?;
        let result = match self.log.read_at(offset) {
            Ok(record) if record.key == *key => Ok((record.key, record.value)),
            Ok(_) => Err(StoreError::corruption(
                offset,
                "record key does not match index entry",
            )),
            Err(e) => Err(e),
        };

        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.entries.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvdump_storage::InMemoryBackend;
    use tempfile::tempdir;

    fn collect(store: &Store) -> Vec<(Vec<u8>, Vec<u8>)> {
        store.iter().map(Result::unwrap).collect()
    }

    #[test]
    fn put_and_get() {
        let mut store = Store::open_in_memory().unwrap();
        store.put(b"hello", &[0, 1, 2]).unwrap();

        assert_eq!(store.get(b"hello").unwrap(), Some(vec![0, 1, 2]));
        assert_eq!(store.get(b"missing").unwrap(), None);
    }

    #[test]
    fn iteration_is_ascending_regardless_of_insert_order() {
        let mut store = Store::open_in_memory().unwrap();
        store.put(b"foo3", b"bar3").unwrap();
        store.put(b"foo", b"bar").unwrap();
        store.put(b"foo2", b"bar2").unwrap();

        assert_eq!(
            collect(&store),
            vec![
                (b"foo".to_vec(), b"bar".to_vec()),
                (b"foo2".to_vec(), b"bar2".to_vec()),
                (b"foo3".to_vec(), b"bar3".to_vec()),
            ]
        );
    }

    #[test]
    fn duplicate_put_overwrites() {
        let mut store = Store::open_in_memory().unwrap();
        store.put(b"foo", b"bar").unwrap();
        store.put(b"foo", b"baz").unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(collect(&store), vec![(b"foo".to_vec(), b"baz".to_vec())]);
    }

    #[test]
    fn empty_key_and_value_are_records() {
        let mut store = Store::open_in_memory().unwrap();
        store.put(b"", b"").unwrap();

        assert_eq!(store.get(b"").unwrap(), Some(Vec::new()));
        assert_eq!(collect(&store), vec![(Vec::new(), Vec::new())]);
    }

    #[test]
    fn iteration_is_restartable() {
        let mut store = Store::open_in_memory().unwrap();
        store.put(b"a", b"1").unwrap();
        store.put(b"b", b"2").unwrap();

        let mut first = store.iter();
        assert!(first.next().is_some());
        drop(first);

        assert_eq!(store.iter().count(), 2);
    }

    #[test]
    fn empty_store_iterates_nothing() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.iter().next().map(|r| r.is_ok()), None);
    }

    #[test]
    fn reopen_rebuilds_index_last_write_wins() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("store");

        let mut store = Store::open(&path, Config::default()).unwrap();
        store.put(b"foo", b"bar").unwrap();
        store.put(b"zed", b"1").unwrap();
        store.put(b"foo", b"baz").unwrap();
        store.close().unwrap();

        let store = Store::open(&path, Config::new().error_if_missing(true)).unwrap();
        assert_eq!(
            collect(&store),
            vec![(b"foo".to_vec(), b"baz".to_vec()), (b"zed".to_vec(), b"1".to_vec())]
        );
    }

    #[test]
    fn open_missing_with_error_if_missing_fails() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("absent");

        let result = Store::open(&path, Config::new().error_if_missing(true));
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn second_open_is_locked_until_close() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("store");

        let store = Store::open(&path, Config::default()).unwrap();
        assert!(matches!(
            Store::open(&path, Config::default()),
            Err(StoreError::Locked { .. })
        ));

        store.close().unwrap();
        Store::open(&path, Config::default()).unwrap();
    }

    #[test]
    fn drop_without_close_keeps_writes() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("store");

        {
            let mut store = Store::open(&path, Config::default()).unwrap();
            store.put(b"k", b"v").unwrap();
        }

        let store = Store::open(&path, Config::default()).unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn strict_open_rejects_damaged_log() {
        let mut data = LogRecord::new(b"k", b"v").encode().unwrap();
        data[9] ^= 0xFF;

        let result = Store::open_with_backend(
            Config::default(),
            Box::new(InMemoryBackend::with_data(data)),
        );
        assert!(matches!(result, Err(StoreError::ChecksumMismatch { .. })));
    }

    #[test]
    fn lenient_open_keeps_intact_prefix() {
        let mut data = LogRecord::new(b"k", b"v").encode().unwrap();
        data.extend_from_slice(&[0xFF; 3]);

        let store = Store::open_with_backend(
            Config::new().strict(false),
            Box::new(InMemoryBackend::with_data(data)),
        )
        .unwrap();
        assert_eq!(collect(&store), vec![(b"k".to_vec(), b"v".to_vec())]);
        assert_eq!(store.log_size().unwrap(), 14);
    }

    #[test]
    fn read_only_lenient_open_leaves_log_intact() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("db");
        let mut store = Store::open(&path, Config::default()).unwrap();
        store.put(b"k", b"v").unwrap();
        store.close().unwrap();

        let log_path = path.join("data.log");
        let mut data = std::fs::read(&log_path).unwrap();
        data.extend_from_slice(&[0xFF; 8]);
        std::fs::write(&log_path, &data).unwrap();

        let config = Config::new().error_if_missing(true).read_only(true).strict(false);
        let mut store = Store::open(&path, config).unwrap();
        assert_eq!(collect(&store), vec![(b"k".to_vec(), b"v".to_vec())]);
        assert!(matches!(store.put(b"a", b"b"), Err(StoreError::ReadOnly)));
        store.close().unwrap();

        assert_eq!(std::fs::read(&log_path).unwrap(), data);
    }

    #[test]
    fn read_only_strict_open_still_rejects_damage() {
        let mut data = LogRecord::new(b"k", b"v").encode().unwrap();
        data.extend_from_slice(&[0xFF; 3]);

        let result = Store::open_with_backend(
            Config::new().read_only(true),
            Box::new(InMemoryBackend::with_data(data)),
        );
        assert!(matches!(result, Err(StoreError::Corruption { offset: 14, .. })));
    }

    #[test]
    fn read_only_open_does_not_create_store() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("absent");

        let result = Store::open(&path, Config::new().read_only(true));
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn unreadable_log_keeps_its_cause() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("db");
        std::fs::create_dir_all(path.join("data.log")).unwrap();

        for config in [
            Config::new().error_if_missing(true),
            Config::new().error_if_missing(true).read_only(true),
            Config::default(),
        ] {
            let err = Store::open(&path, config).err().unwrap();
            assert!(matches!(err, StoreError::Storage(_)), "{err}");
        }
    }

    #[test]
    fn closed_store_rejects_use() {
        let mut store = Store::open_in_memory().unwrap();
        store.shutdown().unwrap();

        assert!(matches!(store.put(b"a", b"b"), Err(StoreError::Closed)));
        assert!(matches!(store.get(b"a"), Err(StoreError::Closed)));
        let mut iter = store.iter();
        assert!(matches!(iter.next(), Some(Err(StoreError::Closed))));
        assert!(iter.next().is_none());
    }
}
