//! Record types and their schemas.
//!
//! A record type describes itself through [`Record::schema`]: its table
//! name, its fields, and which field is the identifier. Registration
//! validates the description once; afterwards the table reads and writes the
//! identifier through the accessor pair the schema carries.

use crate::error::SchemaError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A type that can be stored in a table.
///
/// # Example
///
/// ```
/// use arenadb_core::{FieldKind, Record, Schema};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Team {
///     id: i64,
///     name: String,
/// }
///
/// impl Record for Team {
///     fn schema() -> Schema<Self> {
///         Schema::<Self>::new("Team")
///             .identifier("id", |t| t.id, |t, id| t.id = id)
///             .field("name", FieldKind::Text)
///     }
/// }
///
/// assert!(Team::schema().validate().is_ok());
/// ```
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Describes the record type.
    fn schema() -> Schema<Self>;
}

/// The declared type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Boolean.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit unsigned integer.
    UInt64,
    /// 64-bit float.
    Float64,
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Bytes,
    /// Point in time.
    Timestamp,
    /// Homogeneous list.
    List,
    /// String-keyed map.
    Map,
    /// Nested record.
    Nested,
}

impl FieldKind {
    /// Returns the kind's short name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float64 => "float64",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Timestamp => "timestamp",
            Self::List => "list",
            Self::Map => "map",
            Self::Nested => "nested",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A declared record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    name: &'static str,
    kind: FieldKind,
    identifier: bool,
}

impl FieldDef {
    /// Declares a plain field.
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            identifier: false,
        }
    }

    /// Marks the field as the record identifier.
    #[must_use]
    pub const fn identifier(mut self) -> Self {
        self.identifier = true;
        self
    }

    /// Field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Field kind.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether the field is designated as the identifier.
    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        self.identifier
    }
}

/// Reads and writes the identifier field of a record.
pub struct IdAccessor<R> {
    field: &'static str,
    get: fn(&R) -> i64,
    set: fn(&mut R, i64),
}

impl<R> IdAccessor<R> {
    /// Creates an accessor for `field`.
    #[must_use]
    pub const fn new(field: &'static str, get: fn(&R) -> i64, set: fn(&mut R, i64)) -> Self {
        Self { field, get, set }
    }

    /// The identifier field this accessor reads.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    /// Reads the identifier.
    pub fn get(&self, record: &R) -> i64 {
        (self.get)(record)
    }

    /// Writes the identifier.
    pub fn set(&self, record: &mut R, id: i64) {
        (self.set)(record, id);
    }
}

impl<R> Clone for IdAccessor<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for IdAccessor<R> {}

impl<R> fmt::Debug for IdAccessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdAccessor")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

/// Description of a record type.
pub struct Schema<R> {
    name: String,
    fields: Vec<FieldDef>,
    accessor: Option<IdAccessor<R>>,
}

impl<R> Schema<R> {
    /// Starts a schema for the table `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            accessor: None,
        }
    }

    /// Declares the `int64` identifier field together with its accessors.
    #[must_use]
    pub fn identifier(
        mut self,
        field: &'static str,
        get: fn(&R) -> i64,
        set: fn(&mut R, i64),
    ) -> Self {
        self.fields
            .push(FieldDef::new(field, FieldKind::Int64).identifier());
        self.accessor = Some(IdAccessor::new(field, get, set));
        self
    }

    /// Declares a plain field.
    #[must_use]
    pub fn field(self, name: &'static str, kind: FieldKind) -> Self {
        self.with_field(FieldDef::new(name, kind))
    }

    /// Declares a field from a prepared definition.
    ///
    /// Unlike [`identifier`](Self::identifier), marking a definition as the
    /// identifier here attaches no accessor.
    #[must_use]
    pub fn with_field(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// The identifier accessor, if one was declared.
    #[must_use]
    pub fn accessor(&self) -> Option<IdAccessor<R>> {
        self.accessor
    }

    /// Checks that the schema can back a table and returns its identifier
    /// accessor.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found: an unusable name, a repeated
    /// field, zero or several identifier fields, an identifier that is not
    /// `int64`, or an identifier without accessors.
    pub fn validate(&self) -> Result<IdAccessor<R>, SchemaError> {
        if self.name.trim().is_empty() || self.name.chars().any(char::is_control) {
            return Err(SchemaError::InvalidName {
                name: self.name.clone(),
            });
        }

        let mut seen = HashSet::new();
        for def in &self.fields {
            if !seen.insert(def.name) {
                return Err(SchemaError::DuplicateField {
                    record: self.name.clone(),
                    field: def.name.to_string(),
                });
            }
        }

        let identifiers: Vec<&FieldDef> =
            self.fields.iter().filter(|def| def.identifier).collect();
        let id_field = match identifiers.as_slice() {
            [] => {
                return Err(SchemaError::MissingIdentifier {
                    record: self.name.clone(),
                })
            }
            [single] => *single,
            several => {
                return Err(SchemaError::AmbiguousIdentifier {
                    record: self.name.clone(),
                    fields: several.iter().map(|def| def.name.to_string()).collect(),
                })
            }
        };

        if id_field.kind != FieldKind::Int64 {
            return Err(SchemaError::IdentifierType {
                record: self.name.clone(),
                field: id_field.name.to_string(),
                kind: id_field.kind,
            });
        }

        match self.accessor {
            Some(accessor) if accessor.field == id_field.name => Ok(accessor),
            _ => Err(SchemaError::MissingAccessor {
                record: self.name.clone(),
                field: id_field.name.to_string(),
            }),
        }
    }
}

impl<R> Clone for Schema<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            fields: self.fields.clone(),
            accessor: self.accessor,
        }
    }
}

impl<R> fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("accessor", &self.accessor)
            .finish()
    }
}
