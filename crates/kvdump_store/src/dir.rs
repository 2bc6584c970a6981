//! Store directory management.
//!
//! ```text
//! <path>/
//! ├─ LOCK        # Advisory lock for single-process access
//! └─ data.log    # Append-only record log
//! ```
//!
//! The LOCK file is held for the lifetime of a [`StoreDir`]. The lock is
//! released by the OS when the handle is closed.

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

const LOCK_FILE: &str = "LOCK";
const LOG_FILE: &str = "data.log";

/// An opened, exclusively locked store directory.
#[derive(Debug)]
pub struct StoreDir {
    path: PathBuf,
    _lock_file: File,
}

impl StoreDir {
    /// Opens a store directory according to `config`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the directory (or, with
    ///   `error_if_missing`, its `data.log`) doesn't exist and may not be
    ///   created
    /// - [`StoreError::NotADirectory`] if the path is a regular file
    /// - [`StoreError::Locked`] if another process holds the lock
    pub fn open(path: &Path, config: &Config) -> StoreResult<Self> {
        if !path.exists() {
            if !config.may_create() {
                return Err(StoreError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            debug!(path = %path.display(), "creating store directory");
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(StoreError::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        if config.error_if_missing && !path.join(LOG_FILE).exists() {
            return Err(StoreError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the path to the store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path to the record log.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.path.join(LOG_FILE)
    }
}
