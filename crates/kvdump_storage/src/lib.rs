//! # kvdump storage
//!
//! Append-only byte backends for the kvdump record log.
//!
//! Backends are **opaque byte stores**: they read, append, flush and
//! truncate bytes and never look inside them. The record layout belongs to
//! `kvdump_store`.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For tests and throwaway stores
//! - [`FileBackend`] - Persistent storage through OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use kvdump_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"hello world").unwrap();
//! let data = backend.read_at(offset, 11).unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
