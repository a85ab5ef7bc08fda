//! Failure injection for journal writes.
//!
//! [`CrashableJournal`] wraps a [`MemoryJournal`] and fails appends or syncs
//! on demand. The switches live in a shared [`CrashControl`], so a test can
//! keep flipping them after the journal has been handed to a database.
//!
//! ## Usage
//!
//! ```rust
//! use arenadb_core::{Config, CoreError, Database};
//! use arenadb_testkit::prelude::*;
//!
//! let (journal, control) = CrashableJournal::new();
//! let db = Database::open_with_journal(Box::new(journal), Config::default()).unwrap();
//! let notes = db.register::<Note>().unwrap();
//!
//! control.set_fail_on_sync(true);
//! let err = notes.create(&mut Note::new("lost")).unwrap_err();
//! assert!(matches!(err, CoreError::Storage(_)));
//! assert_eq!(notes.count().unwrap(), 0);
//! ```

use arenadb_storage::{JournalBackend, MemoryJournal, StorageError, StorageResult};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Shared switches and counters of a [`CrashableJournal`].
#[derive(Debug)]
pub struct CrashControl {
    crash_after_bytes: AtomicU64,
    bytes_written: AtomicU64,
    journal_len: AtomicU64,
    crashed: AtomicBool,
    fail_on_sync: AtomicBool,
}

impl CrashControl {
    fn new() -> Self {
        Self {
            crash_after_bytes: AtomicU64::new(u64::MAX),
            bytes_written: AtomicU64::new(0),
            journal_len: AtomicU64::new(0),
            crashed: AtomicBool::new(false),
            fail_on_sync: AtomicBool::new(false),
        }
    }

    /// Fails the append that would carry the total bytes written past
    /// `bytes`, after writing the part that still fits.
    pub fn crash_after(&self, bytes: u64) {
        self.crash_after_bytes.store(bytes, Ordering::SeqCst);
    }

    /// Fails the next append after writing `bytes` of it.
    pub fn crash_next_append_after(&self, bytes: u64) {
        self.crash_after(self.bytes_written() + bytes);
    }

    /// Sets whether sync should fail.
    pub fn set_fail_on_sync(&self, fail: bool) {
        self.fail_on_sync.store(fail, Ordering::SeqCst);
    }

    /// Clears every armed failure and the crashed flag.
    pub fn reset(&self) {
        self.crash_after_bytes.store(u64::MAX, Ordering::SeqCst);
        self.crashed.store(false, Ordering::SeqCst);
        self.fail_on_sync.store(false, Ordering::SeqCst);
    }

    /// Returns whether an injected failure has fired.
    pub fn has_crashed(&self) -> bool {
        self.crashed.load(Ordering::SeqCst)
    }

    /// Total bytes ever appended, partial writes included.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::SeqCst)
    }

    /// Current journal length.
    pub fn journal_len(&self) -> u64 {
        self.journal_len.load(Ordering::SeqCst)
    }

    fn crash(&self, message: &str) -> StorageError {
        self.crashed.store(true, Ordering::SeqCst);
        StorageError::Io(io::Error::other(message.to_string()))
    }
}

/// A journal backend that fails when told to.
#[derive(Debug)]
pub struct CrashableJournal {
    inner: MemoryJournal,
    control: Arc<CrashControl>,
}

impl CrashableJournal {
    /// Creates an empty journal and the control that drives it.
    pub fn new() -> (Self, Arc<CrashControl>) {
        Self::with_data(Vec::new())
    }

    /// Creates a journal holding pre-existing bytes.
    pub fn with_data(data: Vec<u8>) -> (Self, Arc<CrashControl>) {
        let control = Arc::new(CrashControl::new());
        control
            .journal_len
            .store(data.len() as u64, Ordering::SeqCst);
        let journal = Self {
            inner: MemoryJournal::with_data(data),
            control: Arc::clone(&control),
        };
        (journal, control)
    }

    fn record_len(&self) -> StorageResult<()> {
        let len = self.inner.size()?;
        self.control.journal_len.store(len, Ordering::SeqCst);
        Ok(())
    }
}

impl JournalBackend for CrashableJournal {
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        self.inner.read_all()
    }

    fn append(&mut self, frame: &[u8]) -> StorageResult<()> {
        let written = self
            .control
            .bytes_written
            .fetch_add(frame.len() as u64, Ordering::SeqCst);
        let threshold = self.control.crash_after_bytes.load(Ordering::SeqCst);

        if written >= threshold {
            return Err(self.control.crash("simulated crash during append"));
        }
        if written + frame.len() as u64 > threshold {
            let partial = usize::try_from(threshold - written).unwrap_or(frame.len());
            self.inner.append(&frame[..partial])?;
            self.record_len()?;
            return Err(self.control.crash("simulated crash during partial append"));
        }

        self.inner.append(frame)?;
        self.record_len()
    }

    fn sync(&mut self) -> StorageResult<()> {
        if self.control.fail_on_sync.load(Ordering::SeqCst) {
            return Err(self.control.crash("simulated crash during sync"));
        }
        self.inner.sync()
    }

    fn truncate(&mut self, len: u64) -> StorageResult<()> {
        self.inner.truncate(len)?;
        self.record_len()
    }

    fn replace(&mut self, contents: &[u8]) -> StorageResult<()> {
        self.inner.replace(contents)?;
        self.record_len()
    }

    fn size(&self) -> StorageResult<u64> {
        self.inner.size()
    }
}
