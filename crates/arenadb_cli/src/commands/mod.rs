//! CLI command implementations.

pub mod backup;
pub mod compact;
pub mod dump;
pub mod inspect;
pub mod verify;

use arenadb_storage::{FileJournal, Store, StoreOptions};
use std::path::Path;
use thiserror::Error;

/// Failures reported by the commands themselves.
#[derive(Debug, Error)]
pub enum CliError {
    /// The requested namespace is not in the journal.
    #[error("namespace {0:?} not found")]
    UnknownNamespace(String),

    /// An unsupported `--format` value.
    #[error("unknown output format {0:?} (expected \"text\" or \"json\")")]
    UnknownFormat(String),

    /// Verification found damage.
    #[error("verification failed with {0} problem(s)")]
    VerificationFailed(usize),
}

/// Output format shared by the reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl Format {
    /// Parses a `--format` value.
    pub fn parse(value: &str) -> Result<Self, CliError> {
        match value {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CliError::UnknownFormat(other.to_string())),
        }
    }
}

/// Opens the existing journal at `path` as a store.
///
/// Holds the journal lock until the store is dropped.
pub fn open_store(path: &Path) -> Result<Store, arenadb_storage::StorageError> {
    let journal = FileJournal::open_existing(path)?;
    Store::open(Box::new(journal), StoreOptions::default())
}

/// Formats a byte count for display.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats() {
        assert_eq!(Format::parse("json").unwrap(), Format::Json);
        assert!(matches!(
            Format::parse("yaml"),
            Err(CliError::UnknownFormat(_))
        ));
    }

    #[test]
    fn sizes() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn missing_journal_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_store(&dir.path().join("absent.db")).is_err());
    }
}
