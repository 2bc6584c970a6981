//! Temporary store fixtures.

use kvdump_store::{Config, Store};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Key -> value map used as the expected contents of a store.
pub type RecordMap = BTreeMap<Vec<u8>, Vec<u8>>;

/// A store directory inside a temporary directory that is removed on drop.
///
/// The store itself is not held open, so code under test can open it with
/// whatever [`Config`] it needs.
pub struct TestStore {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TestStore {
    /// Creates a fixture whose store directory does not exist yet.
    pub fn absent() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("store");
        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Creates an existing, empty store.
    pub fn empty() -> Self {
        Self::with_records(std::iter::empty::<(Vec<u8>, Vec<u8>)>())
    }

    /// Creates a store holding `records`, written in the given order.
    pub fn with_records<I, K, V>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let fixture = Self::absent();
        let mut store = fixture.open(Config::default());
        for (key, value) in records {
            store
                .put(key.as_ref(), value.as_ref())
                .expect("Failed to populate store");
        }
        store.close().expect("Failed to close store");
        fixture
    }

    /// Returns the store directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the store with `config`.
    pub fn open(&self, config: Config) -> Store {
        Store::open(&self.path, config).expect("Failed to open test store")
    }

    /// Reads the full contents of the store in key order.
    pub fn snapshot(&self) -> RecordMap {
        let store = self.open(Config::new().error_if_missing(true));
        store
            .iter()
            .map(|item| item.expect("Failed to iterate test store"))
            .collect()
    }
}
