//! File-based journal backend for persistent stores.

use crate::backend::JournalBackend;
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A journal stored in a single file.
///
/// An exclusive advisory lock on a sibling `<file>.lock` is held for the
/// lifetime of the value, so only one process can write the journal at a
/// time.
///
/// # Durability
///
/// - `append` writes through to the OS
/// - `sync` calls `File::sync_all()`
/// - `replace` writes a temporary file, syncs it, then renames it over the
///   journal
///
/// # Example
///
/// ```no_run
/// use arenadb_storage::{FileJournal, JournalBackend};
/// use std::path::Path;
///
/// let mut journal = FileJournal::open(Path::new("arena.db")).unwrap();
/// journal.append(b"frame").unwrap();
/// journal.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileJournal {
    path: PathBuf,
    file: File,
    size: u64,
    _lock: File,
}

impl FileJournal {
    /// Opens the journal at `path`, creating it (and parent directories)
    /// if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another process holds the lock,
    /// or an I/O error if the file cannot be opened.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::open_inner(path, true)
    }

    /// Opens an existing journal without creating one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::JournalMissing`] if the file does not exist.
    pub fn open_existing(path: &Path) -> StorageResult<Self> {
        if !path.exists() {
            return Err(StorageError::JournalMissing {
                path: path.to_path_buf(),
            });
        }
        Self::open_inner(path, false)
    }

    fn open_inner(path: &Path, create: bool) -> StorageResult<Self> {
        let lock_path = sibling(path, ".lock");
        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        if lock.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked { path: lock_path });
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create)
            .truncate(false)
            .open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            size,
            _lock: lock,
        })
    }

    /// Returns the path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JournalBackend for FileJournal {
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))?;
        let mut buffer = Vec::with_capacity(self.size as usize);
        file.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    fn append(&mut self, frame: &[u8]) -> StorageResult<()> {
        if frame.is_empty() {
            return Ok(());
        }
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(frame)?;
        self.file.flush()?;
        self.size += frame.len() as u64;
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.file.sync_all()?;
        Ok(())
    }

    fn truncate(&mut self, len: u64) -> StorageResult<()> {
        if len > self.size {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cannot truncate journal of {} bytes to {len}", self.size),
            )));
        }
        self.file.set_len(len)?;
        self.file.sync_all()?;
        self.size = len;
        Ok(())
    }

    fn replace(&mut self, contents: &[u8]) -> StorageResult<()> {
        let temp_path = sibling(&self.path, ".compact");
        {
            let mut temp = File::create(&temp_path)?;
            temp.write_all(contents)?;
            temp.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        self.file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)?;
        self.size = contents.len() as u64;
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.size)
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_open_creates_empty_journal() {
        let dir = tempdir().unwrap();
        let journal = FileJournal::open(&dir.path().join("arena.db")).unwrap();
        assert_eq!(journal.size().unwrap(), 0);
        assert!(journal.read_all().unwrap().is_empty());
    }

    #[test]
    fn file_data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("arena.db");

        {
            let mut journal = FileJournal::open(&path).unwrap();
            journal.append(b"first").unwrap();
            journal.append(b"second").unwrap();
            journal.sync().unwrap();
        }

        let journal = FileJournal::open(&path).unwrap();
        assert_eq!(journal.read_all().unwrap(), b"firstsecond");
        assert_eq!(journal.size().unwrap(), 11);
    }

    #[test]
    fn file_open_existing_requires_file() {
        let dir = tempdir().unwrap();
        let result = FileJournal::open_existing(&dir.path().join("missing.db"));
        assert!(matches!(result, Err(StorageError::JournalMissing { .. })));
    }

    #[test]
    fn file_second_open_is_locked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("arena.db");
        let _held = FileJournal::open(&path).unwrap();

        let result = FileJournal::open(&path);
        assert!(matches!(result, Err(StorageError::Locked { .. })));
    }

    #[test]
    fn file_truncate_and_replace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("arena.db");
        let mut journal = FileJournal::open(&path).unwrap();

        journal.append(b"hello world").unwrap();
        journal.truncate(5).unwrap();
        assert_eq!(journal.read_all().unwrap(), b"hello");

        journal.replace(b"compacted").unwrap();
        assert_eq!(journal.read_all().unwrap(), b"compacted");
        journal.append(b"!").unwrap();
        assert_eq!(journal.read_all().unwrap(), b"compacted!");
        assert_eq!(journal.size().unwrap(), 10);
    }
}
