//! Journal backend trait definition.

use crate::error::StorageResult;

/// Durable byte sink holding the store's commit journal.
///
/// Backends are **opaque byte stores**: they never interpret the frames
/// written to them. The [`crate::Store`] owns framing, checksums and replay.
///
/// # Invariants
///
/// - `append` writes the whole buffer at the end of the journal or fails
/// - `read_all` returns every byte previously appended, in order
/// - `replace` swaps the full contents atomically with respect to readers
///   of the journal after a restart
/// - Backends must be `Send + Sync` so a store can be shared across threads
///
/// # Implementors
///
/// - [`super::MemoryJournal`] - for tests and ephemeral stores
/// - [`super::FileJournal`] - for persistent stores
pub trait JournalBackend: Send + Sync {
    /// Reads the full journal contents.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn read_all(&self) -> StorageResult<Vec<u8>>;

    /// Appends an encoded frame to the end of the journal.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn append(&mut self, frame: &[u8]) -> StorageResult<()>;

    /// Makes every appended byte durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Cuts the journal down to `len` bytes.
    ///
    /// Used on open to discard a torn final frame.
    ///
    /// # Errors
    ///
    /// Returns an error if `len` exceeds the current size or I/O fails.
    fn truncate(&mut self, len: u64) -> StorageResult<()>;

    /// Replaces the whole journal with `contents`.
    ///
    /// Used by compaction, which rewrites history as a single snapshot frame.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn replace(&mut self, contents: &[u8]) -> StorageResult<()>;

    /// Returns the current journal size in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;
}
