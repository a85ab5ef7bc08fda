//! The transactional store.

use crate::backend::JournalBackend;
use crate::error::{StorageError, StorageResult};
use crate::memory::MemoryJournal;
use crate::record::{encode_frame, scan_frames, FrameKind, JournalOp};
use crate::state::StoreState;
use crate::transaction::{ReadScope, ReadTransaction, WriteTransaction};
use parking_lot::{Mutex, RwLock};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Options controlling a [`Store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Whether every commit syncs the journal before returning.
    pub sync_on_commit: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            sync_on_commit: true,
        }
    }
}

/// Journal sizes before and after a compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionStats {
    /// Journal size before compaction, in bytes.
    pub before: u64,
    /// Journal size after compaction, in bytes.
    pub after: u64,
}

/// A transactional, namespaced, ordered key-value store.
///
/// The store provides:
/// - Snapshot isolation for any number of concurrent readers
/// - Serialized writers via [`begin_write`](Self::begin_write)
/// - Per-namespace sequences that survive restarts
/// - Durability through a [`JournalBackend`]
///
/// Committed state lives in memory; the journal is replayed on open.
///
/// # Example
///
/// ```rust
/// use arenadb_storage::{ReadScope, Store, WriteScope};
///
/// let store = Store::in_memory();
/// store
///     .update(|tx| {
///         tx.create_namespace_if_absent("Team")?;
///         let id = tx.next_sequence("Team")?;
///         tx.put("Team", id.to_string().into_bytes(), b"254".to_vec())
///     })
///     .unwrap();
///
/// let value = store
///     .view(|tx| Ok::<_, arenadb_storage::StorageError>(tx.get("Team", b"1")?.map(<[u8]>::to_vec)))
///     .unwrap();
/// assert_eq!(value.as_deref(), Some(b"254".as_slice()));
/// ```
pub struct Store {
    current: RwLock<Arc<StoreState>>,
    writer: Mutex<()>,
    journal: Mutex<Box<dyn JournalBackend>>,
    options: StoreOptions,
    closed: AtomicBool,
}

impl Store {
    /// Opens a store by replaying `journal`.
    ///
    /// A torn final frame (an interrupted commit) is discarded and cut off
    /// the journal.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupted`] if the journal is damaged before
    /// its final frame, or an I/O error.
    pub fn open(mut journal: Box<dyn JournalBackend>, options: StoreOptions) -> StorageResult<Self> {
        let bytes = journal.read_all()?;
        let scan = scan_frames(&bytes)?;

        let mut state = StoreState::default();
        for frame in &scan.frames {
            if frame.kind == FrameKind::Snapshot {
                state = StoreState::default();
            }
            for op in &frame.ops {
                state.apply(op).map_err(|e| {
                    StorageError::corrupted(frame.offset, format!("replay failed: {e}"))
                })?;
            }
        }

        if scan.torn_tail {
            warn!(
                valid_len = scan.valid_len,
                discarded = bytes.len() as u64 - scan.valid_len,
                "discarding torn journal tail"
            );
            journal.truncate(scan.valid_len)?;
        }

        info!(
            frames = scan.frames.len(),
            namespaces = state.namespace_names().len(),
            "store opened"
        );
        Ok(Self::from_parts(state, journal, options))
    }

    /// Creates an empty store backed by a [`MemoryJournal`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_parts(
            StoreState::default(),
            Box::new(MemoryJournal::new()),
            StoreOptions::default(),
        )
    }

    fn from_parts(state: StoreState, journal: Box<dyn JournalBackend>, options: StoreOptions) -> Self {
        Self {
            current: RwLock::new(Arc::new(state)),
            writer: Mutex::new(()),
            journal: Mutex::new(journal),
            options,
            closed: AtomicBool::new(false),
        }
    }

    /// Begins a read-only transaction on the current committed state.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] if the store is closed.
    pub fn begin_read(&self) -> StorageResult<ReadTransaction> {
        self.ensure_open()?;
        Ok(ReadTransaction::new(Arc::clone(&self.current.read())))
    }

    /// Begins a write transaction, blocking while another one is open.
    ///
    /// Must not be called while the same thread holds a write transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] if the store is closed.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction<'_>> {
        self.ensure_open()?;
        let guard = self.writer.lock();
        // The store may have been closed while we waited for the lock.
        self.ensure_open()?;
        let base = StoreState::clone(&self.current.read());
        Ok(WriteTransaction::new(self, guard, base))
    }

    /// Runs `f` inside a read transaction.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or a storage error if the transaction
    /// cannot begin.
    pub fn view<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&ReadTransaction) -> Result<R, E>,
        E: From<StorageError>,
    {
        let txn = self.begin_read()?;
        f(&txn)
    }

    /// Runs `f` inside a write transaction, committing if it succeeds and
    /// rolling back if it fails.
    ///
    /// # Errors
    ///
    /// Returns the error from `f` (after rollback) or from the commit.
    pub fn update<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut WriteTransaction<'_>) -> Result<R, E>,
        E: From<StorageError>,
    {
        let mut txn = self.begin_write()?;
        match f(&mut txn) {
            Ok(result) => {
                txn.commit()?;
                Ok(result)
            }
            Err(e) => {
                txn.rollback();
                Err(e)
            }
        }
    }

    /// Journals `ops` and makes `working` the committed state.
    pub(crate) fn publish(&self, working: StoreState, ops: &[JournalOp]) -> StorageResult<()> {
        self.ensure_open()?;
        if ops.is_empty() {
            return Ok(());
        }

        let frame = encode_frame(FrameKind::Commit, ops)?;
        {
            let mut journal = self.journal.lock();
            let before = journal.size()?;
            let written = journal.append(&frame).and_then(|()| {
                if self.options.sync_on_commit {
                    journal.sync()
                } else {
                    Ok(())
                }
            });
            if let Err(e) = written {
                // Leave no partial frame behind for the next commit to follow.
                if let Err(cleanup) = journal.truncate(before) {
                    warn!(error = %cleanup, "failed to cut back partial journal frame");
                }
                return Err(e);
            }
        }

        *self.current.write() = Arc::new(working);
        debug!(ops = ops.len(), bytes = frame.len(), "commit published");
        Ok(())
    }

    /// Rewrites the journal as a single snapshot frame.
    ///
    /// Blocks writers for the duration.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be replaced.
    pub fn compact(&self) -> StorageResult<CompactionStats> {
        self.ensure_open()?;
        let _guard = self.writer.lock();
        let snapshot = Arc::clone(&self.current.read());
        let frame = encode_frame(FrameKind::Snapshot, &snapshot.snapshot_ops())?;

        let mut journal = self.journal.lock();
        let before = journal.size()?;
        journal.replace(&frame)?;
        journal.sync()?;
        let stats = CompactionStats {
            before,
            after: frame.len() as u64,
        };
        info!(before = stats.before, after = stats.after, "journal compacted");
        Ok(stats)
    }

    /// Writes a compacted copy of the committed state to `path`.
    ///
    /// The copy is a valid journal that [`crate::FileJournal`] can open.
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn backup_to(&self, path: &Path) -> StorageResult<u64> {
        self.ensure_open()?;
        let snapshot = Arc::clone(&self.current.read());
        let frame = encode_frame(FrameKind::Snapshot, &snapshot.snapshot_ops())?;

        let mut file = File::create(path)?;
        file.write_all(&frame)?;
        file.sync_all()?;
        info!(path = %path.display(), bytes = frame.len(), "backup written");
        Ok(frame.len() as u64)
    }

    /// Returns the names of every namespace in the committed state.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] if the store is closed.
    pub fn namespaces(&self) -> StorageResult<Vec<String>> {
        Ok(self.begin_read()?.namespaces())
    }

    /// Returns the current journal size in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    pub fn journal_size(&self) -> StorageResult<u64> {
        self.journal.lock().size()
    }

    /// Syncs the journal and closes the store.
    ///
    /// Waits for an in-flight write transaction to finish. Every later
    /// transaction fails with [`StorageError::Closed`]. Closing twice is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the final sync fails.
    pub fn close(&self) -> StorageResult<()> {
        let _guard = self.writer.lock();
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.journal.lock().sync()?;
        info!("store closed");
        Ok(())
    }

    /// Returns whether the store has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.is_closed() {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }
}
