//! Error types for ArenaDB core.

use crate::schema::FieldKind;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in ArenaDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage error, surfaced verbatim.
    #[error("storage error: {0}")]
    Storage(#[from] arenadb_storage::StorageError),

    /// Record encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] arenadb_codec::CodecError),

    /// A record type could not be registered.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A table handle does not match the registered binding.
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),

    /// `create` was given a record that already has an identifier.
    #[error("can't create {table} with non-zero ID: {id}")]
    CreateOnNonZeroId {
        /// Table name.
        table: String,
        /// The identifier the record carried.
        id: i64,
    },

    /// `update` was given a record without an identifier.
    #[error("can't update {table} with zero ID")]
    UpdateOnZeroId {
        /// Table name.
        table: String,
    },

    /// The record targeted by an update or delete does not exist.
    #[error("{table} with ID {id} not found")]
    NotFound {
        /// Table name.
        table: String,
        /// The missing identifier.
        id: i64,
    },

    /// A freshly minted identifier collided with a stored record.
    ///
    /// The sequence is exclusive to its namespace, so this indicates damaged
    /// data rather than a race.
    #[error("{table} with ID {id} already exists")]
    Conflict {
        /// Table name.
        table: String,
        /// The colliding identifier.
        id: i64,
    },

    /// The namespace sequence moved past the largest identifier.
    #[error("identifier sequence for {table} is exhausted")]
    IdentifierExhausted {
        /// Table name.
        table: String,
    },

    /// No record type is registered under this table name.
    #[error("table {table} is not registered")]
    TableNotRegistered {
        /// Table name.
        table: String,
    },

    /// Database is closed.
    #[error("database is closed")]
    DatabaseClosed,
}

impl CoreError {
    /// Creates a not-found error.
    pub fn not_found(table: impl Into<String>, id: i64) -> Self {
        Self::NotFound {
            table: table.into(),
            id,
        }
    }

    /// Creates a conflict error.
    pub fn conflict(table: impl Into<String>, id: i64) -> Self {
        Self::Conflict {
            table: table.into(),
            id,
        }
    }

    /// Returns true for [`CoreError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for [`CoreError::Conflict`].
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Reasons a record schema is rejected at registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The record type name cannot be used as a namespace.
    #[error("record type name {name:?} is not a valid table name")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// Two fields share a name.
    #[error("record type {record} declares field {field} twice")]
    DuplicateField {
        /// Record type name.
        record: String,
        /// The repeated field.
        field: String,
    },

    /// No field is designated as the identifier.
    #[error("record type {record} has no field designated as the identifier")]
    MissingIdentifier {
        /// Record type name.
        record: String,
    },

    /// More than one field is designated as the identifier.
    #[error("record type {record} designates several identifier fields: {}", fields.join(", "))]
    AmbiguousIdentifier {
        /// Record type name.
        record: String,
        /// Every designated field, in declaration order.
        fields: Vec<String>,
    },

    /// The identifier field is not a 64-bit signed integer.
    #[error("identifier field {record}.{field} must be int64; got {kind}")]
    IdentifierType {
        /// Record type name.
        record: String,
        /// The identifier field.
        field: String,
        /// Its declared kind.
        kind: FieldKind,
    },

    /// The identifier field has no accessor pair.
    #[error("identifier field {record}.{field} has no accessor")]
    MissingAccessor {
        /// Record type name.
        record: String,
        /// The identifier field.
        field: String,
    },

    /// Another Rust type is already registered under this table name.
    #[error("table {table} is already bound to {registered}; cannot bind {requested}")]
    NamespaceTaken {
        /// Table name.
        table: String,
        /// Type holding the binding.
        registered: &'static str,
        /// Type that asked for it.
        requested: &'static str,
    },
}

/// A table handle or argument does not have the structure an operation
/// expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// The requested record type differs from the registered one.
    #[error("table {table} expects {expected}; got {actual}")]
    TypeMismatch {
        /// Table name.
        table: String,
        /// Expected shape chain.
        expected: String,
        /// Actual shape chain.
        actual: String,
    },

    /// The table binding carries no identifier locator.
    #[error("table {table} has no identifier locator; cannot handle {shape}")]
    UnboundIdentifier {
        /// Table name.
        table: String,
        /// Shape chain of the rejected operation.
        shape: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_table_and_id() {
        assert_eq!(
            CoreError::not_found("Team", 7).to_string(),
            "Team with ID 7 not found"
        );
        assert_eq!(
            CoreError::CreateOnNonZeroId {
                table: "Team".into(),
                id: 3
            }
            .to_string(),
            "can't create Team with non-zero ID: 3"
        );
    }

    #[test]
    fn predicates() {
        assert!(CoreError::not_found("Team", 1).is_not_found());
        assert!(!CoreError::not_found("Team", 1).is_conflict());
        assert!(CoreError::conflict("Team", 1).is_conflict());
    }

    #[test]
    fn ambiguous_identifier_lists_fields() {
        let err = SchemaError::AmbiguousIdentifier {
            record: "Match".into(),
            fields: vec!["id".into(), "legacy_id".into()],
        };
        assert!(err.to_string().ends_with("id, legacy_id"));
    }

    #[test]
    fn storage_errors_convert() {
        let err: CoreError = arenadb_storage::StorageError::Closed.into();
        assert!(matches!(err, CoreError::Storage(_)));
    }
}
