//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random records and operation
//! sequences.

use crate::records::{Match, MatchKind, Note, Team};
use proptest::prelude::*;

/// Strategy for generating printable record names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 ]{1,24}").expect("Invalid regex")
}

/// Strategy for generating unsaved notes.
pub fn note_strategy() -> impl Strategy<Value = Note> {
    name_strategy().prop_map(|name| Note::new(name))
}

/// Strategy for generating unsaved teams.
pub fn team_strategy() -> impl Strategy<Value = Team> {
    (1..10_000i32, name_strategy(), 1992..2030i32, any::<bool>()).prop_map(
        |(number, name, rookie_year, yellow_card)| Team {
            rookie_year,
            yellow_card,
            ..Team::new(number, name)
        },
    )
}

/// Strategy for generating unsaved matches.
pub fn match_strategy() -> impl Strategy<Value = Match> {
    (
        prop_oneof![
            Just(MatchKind::Practice),
            Just(MatchKind::Qualification),
            Just(MatchKind::Playoff),
        ],
        1..200u32,
        any::<[i32; 3]>(),
        any::<[i32; 3]>(),
    )
        .prop_map(|(kind, number, red, blue)| Match::new(kind, format!("M{number}"), red, blue))
}

/// One step of a generated workload against a note table.
#[derive(Debug, Clone)]
pub enum TableOp {
    /// Create a note.
    Create {
        /// Note name.
        name: String,
    },
    /// Rename the note at this position among the live ones.
    Update {
        /// Index into the live identifiers, modulo their count.
        index: usize,
        /// New name.
        name: String,
    },
    /// Delete the note at this position among the live ones.
    Delete {
        /// Index into the live identifiers, modulo their count.
        index: usize,
    },
    /// Delete an identifier that was never assigned.
    DeleteMissing {
        /// Offset past the highest assigned identifier.
        offset: i64,
    },
    /// Empty the table.
    Truncate,
}

/// Strategy for generating a single table operation.
///
/// Truncation is rare so generated workloads build up some state.
pub fn table_op_strategy() -> impl Strategy<Value = TableOp> {
    prop_oneof![
        6 => name_strategy().prop_map(|name| TableOp::Create { name }),
        3 => (any::<usize>(), name_strategy())
            .prop_map(|(index, name)| TableOp::Update { index, name }),
        3 => any::<usize>().prop_map(|index| TableOp::Delete { index }),
        1 => (1..100i64).prop_map(|offset| TableOp::DeleteMissing { offset }),
        1 => Just(TableOp::Truncate),
    ]
}

/// Strategy for generating a workload of up to `max_len` operations.
pub fn table_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<TableOp>> {
    prop::collection::vec(table_op_strategy(), 1..=max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn generated_records_are_unsaved() {
        let mut runner = TestRunner::default();
        for _ in 0..20 {
            let team = team_strategy().new_tree(&mut runner).unwrap().current();
            assert_eq!(team.id, 0);
            let m = match_strategy().new_tree(&mut runner).unwrap().current();
            assert_eq!(m.id, 0);
            assert!(m.display_name.starts_with('M'));
        }
    }

    proptest! {
        #[test]
        fn names_are_non_empty(name in name_strategy()) {
            prop_assert!(!name.is_empty());
        }
    }
}
