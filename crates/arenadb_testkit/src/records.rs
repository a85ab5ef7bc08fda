//! Sample record types.
//!
//! [`Team`] and [`Match`] mirror the kind of records a competition arena
//! keeps. [`Note`] is the minimal `{id, name}` record. The [`malformed`]
//! module holds types whose schemas registration must reject.

use arenadb_core::{FieldKind, Record, Schema};
use serde::{Deserialize, Serialize};

/// A competing team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Storage identifier, 0 until created.
    pub id: i64,
    /// Team number.
    pub number: i32,
    /// Team nickname.
    pub name: String,
    /// Home city.
    pub city: String,
    /// First year of competition.
    pub rookie_year: i32,
    /// Whether the team carries a yellow card.
    pub yellow_card: bool,
}

impl Team {
    /// Creates an unsaved team.
    pub fn new(number: i32, name: impl Into<String>) -> Self {
        Self {
            id: 0,
            number,
            name: name.into(),
            city: String::new(),
            rookie_year: 0,
            yellow_card: false,
        }
    }
}

impl Record for Team {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new("Team")
            .identifier("id", |t| t.id, |t, id| t.id = id)
            .field("number", FieldKind::Int32)
            .field("name", FieldKind::Text)
            .field("city", FieldKind::Text)
            .field("rookie_year", FieldKind::Int32)
            .field("yellow_card", FieldKind::Bool)
    }
}

/// Kind of match in the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchKind {
    /// Unscored practice match.
    Practice,
    /// Ranked qualification match.
    Qualification,
    /// Elimination bracket match.
    Playoff,
}

/// A scheduled match between two alliances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Storage identifier, 0 until created.
    pub id: i64,
    /// Kind of match.
    pub kind: MatchKind,
    /// Name shown on displays, e.g. `Q12`.
    pub display_name: String,
    /// Red alliance team numbers.
    pub red: [i32; 3],
    /// Blue alliance team numbers.
    pub blue: [i32; 3],
    /// Whether results were published.
    pub published: bool,
}

impl Match {
    /// Creates an unsaved match.
    pub fn new(kind: MatchKind, display_name: impl Into<String>, red: [i32; 3], blue: [i32; 3]) -> Self {
        Self {
            id: 0,
            kind,
            display_name: display_name.into(),
            red,
            blue,
            published: false,
        }
    }
}

impl Record for Match {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new("Match")
            .identifier("id", |m| m.id, |m, id| m.id = id)
            .field("kind", FieldKind::Text)
            .field("display_name", FieldKind::Text)
            .field("red", FieldKind::List)
            .field("blue", FieldKind::List)
            .field("published", FieldKind::Bool)
    }
}

/// The minimal record: an identifier and a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Storage identifier, 0 until created.
    pub id: i64,
    /// Free text.
    pub name: String,
}

impl Note {
    /// Creates an unsaved note.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }
}

impl Record for Note {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new("Note")
            .identifier("id", |n| n.id, |n, id| n.id = id)
            .field("name", FieldKind::Text)
    }
}

/// Record types with schemas that registration rejects.
pub mod malformed {
    use super::*;
    use arenadb_core::FieldDef;

    /// Declares no identifier field.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Unidentified {
        /// Free text.
        pub name: String,
    }

    impl Record for Unidentified {
        fn schema() -> Schema<Self> {
            Schema::<Self>::new("Unidentified").field("name", FieldKind::Text)
        }
    }

    /// Declares its identifier as text.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TextIdentified {
        /// Text key.
        pub id: String,
    }

    impl Record for TextIdentified {
        fn schema() -> Schema<Self> {
            Schema::<Self>::new("TextIdentified")
                .with_field(FieldDef::new("id", FieldKind::Text).identifier())
        }
    }

    /// Declares two identifier fields.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DoublyIdentified {
        /// First identifier.
        pub id: i64,
        /// Second identifier.
        pub legacy_id: i64,
    }

    impl Record for DoublyIdentified {
        fn schema() -> Schema<Self> {
            Schema::<Self>::new("DoublyIdentified")
                .identifier("id", |r| r.id, |r, id| r.id = id)
                .identifier("legacy_id", |r| r.legacy_id, |r, id| r.legacy_id = id)
        }
    }

    /// Claims the `Note` table with a different shape.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct NoteImpostor {
        /// Identifier.
        pub id: i64,
        /// Not a string, unlike `Note::name`.
        pub name: i64,
    }

    impl Record for NoteImpostor {
        fn schema() -> Schema<Self> {
            Schema::<Self>::new("Note").identifier("id", |r| r.id, |r, id| r.id = id)
        }
    }
}
