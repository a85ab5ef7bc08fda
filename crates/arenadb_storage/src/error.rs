//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The named namespace does not exist.
    #[error("unknown namespace {name}")]
    NamespaceNotFound {
        /// Name of the missing namespace.
        name: String,
    },

    /// The namespace name is empty or too long to be journaled.
    #[error("invalid namespace name {name:?}")]
    InvalidNamespace {
        /// The rejected name.
        name: String,
    },

    /// The namespace sequence cannot advance any further.
    #[error("sequence exhausted for namespace {name}")]
    SequenceExhausted {
        /// Namespace whose counter overflowed.
        name: String,
    },

    /// The journal is corrupted.
    #[error("journal corrupted at offset {offset}: {message}")]
    Corrupted {
        /// Byte offset of the damaged frame.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// The journal file does not exist and creation was not requested.
    #[error("journal not found: {}", path.display())]
    JournalMissing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Another process holds the journal lock.
    #[error("journal locked by another process: {}", path.display())]
    Locked {
        /// Path of the lock file.
        path: PathBuf,
    },

    /// The store is closed.
    #[error("store is closed")]
    Closed,
}

impl StorageError {
    /// Creates a namespace-not-found error.
    pub fn namespace_not_found(name: impl Into<String>) -> Self {
        Self::NamespaceNotFound { name: name.into() }
    }

    /// Creates a corruption error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::Corrupted {
            offset,
            message: message.into(),
        }
    }
}
