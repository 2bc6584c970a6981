//! # kvdump store
//!
//! A small embedded, ordered, log-structured key-value store.
//!
//! Every write appends a checksummed record to `data.log`; an in-memory
//! ordered index maps each live key to the offset of its latest record.
//! Iteration walks the index in ascending key order and reads each record
//! back from the log on demand, so a full scan never holds more than one
//! value in memory.
//!
//! ```text
//! <path>/
//! ├─ LOCK        # Advisory lock, one process at a time
//! └─ data.log    # Append-only record log
//! ```
//!
//! ## Example
//!
//! ```rust
//! use kvdump_store::Store;
//!
//! let mut store = Store::open_in_memory().unwrap();
//! store.put(b"b", b"2").unwrap();
//! store.put(b"a", b"1").unwrap();
//!
//! let keys: Vec<Vec<u8>> = store.iter().map(|r| r.unwrap().0).collect();
//! assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dir;
mod error;
mod log;
mod record;
mod store;

pub use config::Config;
pub use dir::StoreDir;
pub use error::{StoreError, StoreResult};
pub use record::{compute_crc32, LogRecord, MAX_RECORD_SIZE};
pub use store::{Store, StoreIter};
