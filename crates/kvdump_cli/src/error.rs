//! Errors that end a `kvdump` run.
//!
//! Every variant is fatal. Nothing is retried, and a load that fails
//! halfway leaves the records written so far in the store.

use kvdump_codec::CodecError;
use kvdump_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// A fatal error from `dump` or `load`.
#[derive(Debug, Error)]
pub enum CliError {
    /// The store could not be opened.
    #[error("cannot open store at {}: {source}", path.display())]
    StoreOpen {
        /// Store directory that was opened.
        path: PathBuf,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },

    /// The store failed while being scanned.
    #[error("store iteration failed: {0}")]
    Iteration(#[source] StoreError),

    /// Writing the dump stream failed.
    #[error("writing dump output failed: {0}")]
    Output(#[source] CodecError),

    /// The load stream is malformed.
    #[error("malformed input: {0}")]
    Format(#[source] CodecError),

    /// The load stream ended inside a frame.
    #[error("truncated input: {0}")]
    Truncated(#[source] CodecError),

    /// Reading the load stream failed.
    #[error("reading input failed: {0}")]
    Input(#[source] CodecError),

    /// Writing a record into the store failed.
    #[error("store write failed: {0}")]
    StoreWrite(#[source] StoreError),

    /// Flushing the store on close failed.
    #[error("closing store failed: {0}")]
    StoreClose(#[source] StoreError),
}

impl CliError {
    /// Classifies a decoder error.
    pub fn from_decode(error: CodecError) -> Self {
        if error.is_truncation() {
            Self::Truncated(error)
        } else if error.is_format() {
            Self::Format(error)
        } else {
            Self::Input(error)
        }
    }

    /// Short name of the error class, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StoreOpen { .. } => "store_open",
            Self::Iteration(_) => "iteration",
            Self::Output(_) => "output",
            Self::Format(_) => "format",
            Self::Truncated(_) => "truncated_input",
            Self::Input(_) => "input",
            Self::StoreWrite(_) => "store_write",
            Self::StoreClose(_) => "store_close",
        }
    }
}
