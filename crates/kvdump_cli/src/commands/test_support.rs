//! Backends and writers that fail on demand.

use kvdump_storage::{InMemoryBackend, StorageBackend, StorageError, StorageResult};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Flags {
    reads: AtomicBool,
    appends: AtomicBool,
}

/// Turns failures of a [`FlakyBackend`] on after it was moved into a store.
#[derive(Clone)]
pub(crate) struct FailureSwitch(Arc<Flags>);

impl FailureSwitch {
    pub(crate) fn fail_reads(&self) {
        self.0.reads.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_appends(&self) {
        self.0.appends.store(true, Ordering::SeqCst);
    }
}

/// An in-memory backend whose reads or appends can be made to fail.
pub(crate) struct FlakyBackend {
    inner: InMemoryBackend,
    flags: Arc<Flags>,
}

impl FlakyBackend {
    pub(crate) fn new() -> (Self, FailureSwitch) {
        let flags = Arc::new(Flags::default());
        let backend = Self {
            inner: InMemoryBackend::new(),
            flags: Arc::clone(&flags),
        };
        (backend, FailureSwitch(flags))
    }
}

fn injected() -> StorageError {
    StorageError::Io(io::Error::new(io::ErrorKind::Other, "injected failure"))
}

impl StorageBackend for FlakyBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        if self.flags.reads.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.read_at(offset, len)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        if self.flags.appends.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.append(data)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.inner.flush()
    }

    fn size(&self) -> StorageResult<u64> {
        self.inner.size()
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.inner.sync()
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        self.inner.truncate(new_size)
    }
}

/// A writer that rejects every write.
pub(crate) struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
