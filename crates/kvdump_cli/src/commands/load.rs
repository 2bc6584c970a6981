//! `kvdump load`: apply a frame stream to a store.

use crate::error::CliError;
use kvdump_codec::FrameDecoder;
use kvdump_store::{Config, Store};
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info};

/// Totals for a finished load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Frames applied to the store.
    pub records: u64,
    /// Input bytes consumed.
    pub bytes: u64,
}

/// Options for [`run`].
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Treat a damaged existing log as fatal.
    pub strict: bool,
    /// Fsync the store log before exiting.
    pub sync: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            strict: true,
            sync: false,
        }
    }
}

/// Opens (or creates) the store at `path` and loads every frame of `input`.
///
/// # Errors
///
/// - [`CliError::StoreOpen`] if the store cannot be opened or created
/// - any error of [`load_stream`]
/// - [`CliError::StoreClose`] if flushing the store fails
pub fn run<R: BufRead>(path: &Path, options: LoadOptions, input: R) -> Result<LoadStats, CliError> {
    let config = Config::new()
        .create_if_missing(true)
        .strict(options.strict)
        .sync_on_close(options.sync);

    let mut store = Store::open(path, config).map_err(|source| CliError::StoreOpen {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), existing_keys = store.len(), "loading into store");

    let stats = load_stream(input, &mut store)?;
    store.close().map_err(CliError::StoreClose)?;

    info!(records = stats.records, bytes = stats.bytes, "load complete");
    Ok(stats)
}

/// Decodes frames from `input` and puts each into `store` until the input
/// ends cleanly at a frame boundary.
///
/// Records put before a failure stay in the store.
///
/// # Errors
///
/// - [`CliError::Format`] / [`CliError::Truncated`] for malformed or cut-off
///   input
/// - [`CliError::Input`] if reading `input` fails
/// - [`CliError::StoreWrite`] if a put fails
pub fn load_stream<R: BufRead>(input: R, store: &mut Store) -> Result<LoadStats, CliError> {
    let mut decoder = FrameDecoder::new(input);

    while let Some(frame) = decoder.next_frame().map_err(CliError::from_decode)? {
        store
            .put(frame.key, frame.value)
            .map_err(CliError::StoreWrite)?;
    }

    Ok(LoadStats {
        records: decoder.frames_read(),
        bytes: decoder.position(),
    })
}
