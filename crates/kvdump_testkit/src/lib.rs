//! # kvdump testkit
//!
//! Shared test helpers:
//! - [`fixtures`]: temporary on-disk stores
//! - [`generators`]: proptest strategies for binary records
//!
//! ```rust,ignore
//! use kvdump_testkit::prelude::*;
//!
//! let source = TestStore::with_records([(b"k".to_vec(), b"v".to_vec())]);
//! assert_eq!(source.snapshot().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
