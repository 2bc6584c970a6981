//! `kvdump dump`: stream every record of a store as frames.

use crate::error::CliError;
use kvdump_codec::FrameEncoder;
use kvdump_store::{Config, Store};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Totals for a finished dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpStats {
    /// Frames written.
    pub records: u64,
    /// Bytes written.
    pub bytes: u64,
}

/// Opens the existing store at `path` read-only and dumps it to `out`.
///
/// The store is never modified. Without `strict`, a damaged log tail is
/// skipped and only the intact records before it are dumped.
///
/// # Errors
///
/// - [`CliError::StoreOpen`] if the store is missing, locked or damaged
/// - [`CliError::Iteration`] / [`CliError::Output`] as for [`dump_store`]
/// - [`CliError::StoreClose`] if releasing the store fails
pub fn run<W: Write>(path: &Path, strict: bool, out: W) -> Result<DumpStats, CliError> {
    let config = Config::new()
        .create_if_missing(false)
        .error_if_missing(true)
        .read_only(true)
        .strict(strict);

    let store = Store::open(path, config).map_err(|source| CliError::StoreOpen {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), keys = store.len(), "dumping store");

    let stats = dump_store(&store, out)?;
    store.close().map_err(CliError::StoreClose)?;

    info!(records = stats.records, bytes = stats.bytes, "dump complete");
    Ok(stats)
}

/// Writes one frame per record of `store`, in ascending key order, then
/// flushes `out`.
///
/// # Errors
///
/// - [`CliError::Iteration`] if reading a record from the store fails
/// - [`CliError::Output`] if writing or flushing `out` fails
pub fn dump_store<W: Write>(store: &Store, out: W) -> Result<DumpStats, CliError> {
    let mut encoder = FrameEncoder::new(out);

    for item in store {
        let (key, value) = item.map_err(CliError::Iteration)?;
        encoder
            .write_record(&key, &value)
            .map_err(CliError::Output)?;
    }

    let stats = DumpStats {
        records: encoder.frames_written(),
        bytes: encoder.bytes_written(),
    };
    encoder.finish().map_err(CliError::Output)?;
    Ok(stats)
}
