//! Generated workloads checked against an in-memory model.

use arenadb_core::{Config, CoreError, KeyEncoding};
use arenadb_testkit::prelude::*;
use proptest::prelude::*;
use std::collections::BTreeMap;

/// What a note table must contain after a workload.
#[derive(Debug, Default)]
struct Model {
    notes: BTreeMap<i64, String>,
    last_id: i64,
}

fn run_workload(ops: &[TableOp], encoding: KeyEncoding) -> Result<(), TestCaseError> {
    let test_db = TestDatabase::memory_with_config(Config::new().key_encoding(encoding));
    let table = test_db.register::<Note>().unwrap();
    let mut model = Model::default();

    for op in ops {
        match op {
            TableOp::Create { name } => {
                let mut note = Note::new(name.clone());
                let id = table.create(&mut note).unwrap();
                prop_assert!(id > model.last_id);
                prop_assert_eq!(note.id, id);
                model.last_id = id;
                model.notes.insert(id, name.clone());
            }
            TableOp::Update { index, name } => {
                let Some(&id) = model.notes.keys().nth(index % model.notes.len().max(1)) else {
                    continue;
                };
                table
                    .update(&Note {
                        id,
                        name: name.clone(),
                    })
                    .unwrap();
                model.notes.insert(id, name.clone());
            }
            TableOp::Delete { index } => {
                let Some(&id) = model.notes.keys().nth(index % model.notes.len().max(1)) else {
                    continue;
                };
                table.delete(id).unwrap();
                model.notes.remove(&id);
            }
            TableOp::DeleteMissing { offset } => {
                let id = model.last_id + offset;
                let err = table.delete(id).unwrap_err();
                prop_assert!(matches!(err, CoreError::NotFound { .. }), "expected NotFound");
            }
            TableOp::Truncate => {
                table.truncate().unwrap();
                model.notes.clear();
                model.last_id = 0;
            }
        }
    }

    let stored = table.get_all().unwrap();
    prop_assert_eq!(stored.len(), model.notes.len());
    for note in &stored {
        prop_assert_eq!(model.notes.get(&note.id), Some(&note.name));
        let fetched = table.get_by_id(note.id).unwrap();
        prop_assert_eq!(fetched.as_ref(), Some(note));
    }
    prop_assert_eq!(table.count().unwrap(), model.notes.len());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn decimal_table_matches_model(ops in table_ops_strategy(60)) {
        run_workload(&ops, KeyEncoding::Decimal)?;
    }

    #[test]
    fn big_endian_table_matches_model(ops in table_ops_strategy(60)) {
        run_workload(&ops, KeyEncoding::BigEndian)?;
    }

    #[test]
    fn generated_notes_keep_insertion_order_with_big_endian_keys(
        notes in prop::collection::vec(note_strategy(), 1..40),
    ) {
        let test_db = TestDatabase::memory_with_config(Config::new().key_encoding(KeyEncoding::BigEndian));
        let table = test_db.register::<Note>().unwrap();
        let mut saved = Vec::new();
        for (n, mut note) in notes.into_iter().enumerate() {
            let id = table.create(&mut note).unwrap();
            prop_assert_eq!(id, n as i64 + 1);
            saved.push(note);
        }
        prop_assert_eq!(table.get_all().unwrap(), saved);
    }

    #[test]
    fn generated_teams_round_trip(team in team_strategy()) {
        let test_db = TestDatabase::memory();
        let teams = test_db.register::<Team>().unwrap();
        let mut saved = team.clone();
        let id = teams.create(&mut saved).unwrap();
        prop_assert_eq!(teams.get_by_id(id).unwrap(), Some(Team { id, ..team }));
    }

    #[test]
    fn generated_matches_round_trip(m in match_strategy()) {
        let test_db = TestDatabase::memory();
        let matches = test_db.register::<Match>().unwrap();
        let mut saved = m.clone();
        let id = matches.create(&mut saved).unwrap();
        prop_assert_eq!(matches.get_by_id(id).unwrap(), Some(saved));
    }
}
