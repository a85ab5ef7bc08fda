//! Journal write failures during commits.

use arenadb_core::{Config, CoreError, Database};
use arenadb_storage::StorageError;
use arenadb_testkit::prelude::*;
use std::sync::Arc;

fn crashable_db() -> (Database, Arc<CrashControl>) {
    let (journal, control) = CrashableJournal::new();
    let db = Database::open_with_journal(Box::new(journal), Config::default()).unwrap();
    (db, control)
}

#[test]
fn failed_append_leaves_table_unchanged() {
    let (db, control) = crashable_db();
    let notes = db.register::<Note>().unwrap();
    notes.create(&mut Note::new("a")).unwrap();
    let committed_len = control.journal_len();

    control.crash_next_append_after(7);
    let mut note = Note::new("b");
    let err = notes.create(&mut note).unwrap_err();

    assert!(matches!(err, CoreError::Storage(StorageError::Io(_))));
    assert!(control.has_crashed());
    assert_eq!(note.id, 0);
    assert_eq!(control.journal_len(), committed_len);
    assert_eq!(notes.get_all().unwrap(), vec![Note { id: 1, name: "a".into() }]);

    // The failed commit did not consume an identifier.
    control.reset();
    assert_eq!(notes.create(&mut Note::new("c")).unwrap(), 2);
}

#[test]
fn failed_sync_leaves_table_unchanged() {
    let (db, control) = crashable_db();
    let teams = db.register::<Team>().unwrap();
    let mut team = Team::new(254, "Poofs");
    teams.create(&mut team).unwrap();
    let committed_len = control.journal_len();

    control.set_fail_on_sync(true);
    team.city = "San Jose".into();
    let err = teams.update(&team).unwrap_err();
    assert!(matches!(err, CoreError::Storage(StorageError::Io(_))));
    let err = teams.delete(1).unwrap_err();
    assert!(matches!(err, CoreError::Storage(StorageError::Io(_))));

    assert_eq!(control.journal_len(), committed_len);
    let stored = teams.get_by_id(1).unwrap().unwrap();
    assert_ne!(stored.city, "San Jose");
    assert_eq!(teams.count().unwrap(), 1);
}
