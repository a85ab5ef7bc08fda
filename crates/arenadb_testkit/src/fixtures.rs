//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and common test scenarios.

use arenadb_core::{Config, Database};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test database with automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    config: Config,
    path: Option<PathBuf>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates a new in-memory test database.
    pub fn memory() -> Self {
        Self::memory_with_config(Config::default())
    }

    /// Creates a new in-memory test database with custom configuration.
    pub fn memory_with_config(config: Config) -> Self {
        Self {
            db: Database::open_in_memory_with_config(config.clone())
                .expect("Failed to open in-memory database"),
            config,
            path: None,
            _temp_dir: None,
        }
    }

    /// Creates a new file-based test database.
    pub fn file() -> Self {
        Self::named("test")
    }

    /// Creates a file-based test database whose journal is named after
    /// `name`, so a failing test leaves a recognizable file behind.
    pub fn named(name: &str) -> Self {
        Self::file_with_config(name, Config::default())
    }

    /// Creates a file-based test database with custom configuration.
    pub fn file_with_config(name: &str, config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(format!("{name}.db"));
        let db = Database::open_with_config(&path, config.clone())
            .expect("Failed to open file database");
        Self {
            db,
            config,
            path: Some(path),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the journal path if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Closes the database and opens it again from its journal.
    ///
    /// # Panics
    ///
    /// Panics for in-memory databases, which have nothing to reopen.
    #[must_use]
    pub fn reopen(self) -> Self {
        let Self {
            db,
            config,
            path,
            _temp_dir,
        } = self;
        let path = path.expect("Only file databases can be reopened");
        db.close().expect("Failed to close database");
        drop(db);

        let db = Database::open_with_config(&path, config.clone())
            .expect("Failed to reopen file database");
        Self {
            db,
            config,
            path: Some(path),
            _temp_dir,
        }
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary in-memory database.
///
/// # Example
///
/// ```rust
/// use arenadb_testkit::{with_temp_db, Note};
///
/// with_temp_db(|db| {
///     let notes = db.register::<Note>().unwrap();
///     assert_eq!(notes.count().unwrap(), 0);
/// });
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::memory();
    f(&test_db.db)
}

/// Runs a test with a temporary file-based database.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database, &Path) -> R,
{
    let test_db = TestDatabase::file();
    let path = test_db
        .path()
        .expect("File database should have a path")
        .to_path_buf();
    f(&test_db.db, &path)
}

/// Creates a fresh file database for the test called `name`.
pub fn setup_test_db(name: &str) -> TestDatabase {
    TestDatabase::named(name)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use crate::records::{Note, Team};

    /// Creates a database with `count` notes named `note-1`, `note-2`, ...
    pub fn populated_notes(count: usize) -> TestDatabase {
        let test_db = TestDatabase::memory();
        let notes = test_db.register::<Note>().expect("Failed to register notes");
        for i in 1..=count {
            notes
                .create(&mut Note::new(format!("note-{i}")))
                .expect("Failed to create note");
        }
        test_db
    }

    /// Creates a database with a handful of well-known teams.
    pub fn populated_teams() -> TestDatabase {
        let test_db = TestDatabase::memory();
        let teams = test_db.register::<Team>().expect("Failed to register teams");
        for (number, name) in [
            (254, "The Cheesy Poofs"),
            (1114, "Simbotics"),
            (2056, "OP Robotics"),
            (148, "Robowranglers"),
        ] {
            teams
                .create(&mut Team::new(number, name))
                .expect("Failed to create team");
        }
        test_db
    }
}
