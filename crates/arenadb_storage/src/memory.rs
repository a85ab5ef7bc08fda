//! In-memory journal backend.

use crate::backend::JournalBackend;
use crate::error::{StorageError, StorageResult};

/// A journal kept entirely in memory.
///
/// Suitable for unit tests and ephemeral databases. Nothing survives
/// the process, but replay and compaction behave exactly as they do
/// for [`crate::FileJournal`].
///
/// # Example
///
/// ```rust
/// use arenadb_storage::{JournalBackend, MemoryJournal};
///
/// let mut journal = MemoryJournal::new();
/// journal.append(b"frame").unwrap();
/// assert_eq!(journal.size().unwrap(), 5);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryJournal {
    data: Vec<u8>,
}

impl MemoryJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a journal holding pre-existing bytes.
    ///
    /// Useful for replay and torn-write tests.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Returns a copy of the raw journal bytes.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.clone()
    }
}

impl JournalBackend for MemoryJournal {
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        Ok(self.data.clone())
    }

    fn append(&mut self, frame: &[u8]) -> StorageResult<()> {
        self.data.extend_from_slice(frame);
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn truncate(&mut self, len: u64) -> StorageResult<()> {
        let current = self.data.len() as u64;
        if len > current {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cannot truncate journal of {current} bytes to {len}"),
            )));
        }
        self.data.truncate(len as usize);
        Ok(())
    }

    fn replace(&mut self, contents: &[u8]) -> StorageResult<()> {
        self.data = contents.to_vec();
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let journal = MemoryJournal::new();
        assert_eq!(journal.size().unwrap(), 0);
        assert!(journal.read_all().unwrap().is_empty());
    }

    #[test]
    fn memory_append_accumulates() {
        let mut journal = MemoryJournal::new();
        journal.append(b"abc").unwrap();
        journal.append(b"def").unwrap();
        assert_eq!(journal.read_all().unwrap(), b"abcdef");
    }

    #[test]
    fn memory_truncate_drops_tail() {
        let mut journal = MemoryJournal::with_data(b"hello world".to_vec());
        journal.truncate(5).unwrap();
        assert_eq!(journal.data(), b"hello");
    }

    #[test]
    fn memory_truncate_past_end_fails() {
        let mut journal = MemoryJournal::with_data(b"abc".to_vec());
        assert!(journal.truncate(10).is_err());
    }

    #[test]
    fn memory_replace_swaps_contents() {
        let mut journal = MemoryJournal::with_data(b"old frames".to_vec());
        journal.replace(b"new").unwrap();
        assert_eq!(journal.size().unwrap(), 3);
        assert_eq!(journal.data(), b"new");
    }
}
