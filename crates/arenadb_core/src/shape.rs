//! Runtime shape checks.
//!
//! Operation signatures already fix the argument shape: `get_by_id` yields an
//! `Option<R>`, `get_all` a `Vec<R>`, `create` and `update` take an `R`, and
//! `delete` takes an `i64`. What remains to check at runtime is that a typed
//! handle resolved from the type-erased registry really belongs to the
//! requested record type, and that the binding still carries its identifier
//! locator.

use crate::error::ShapeError;
use crate::schema::{IdAccessor, Record};
use crate::table::TableBinding;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The argument shape an operation works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// The table itself.
    Table,
    /// Output slot for a single optional record.
    OptionalRecord,
    /// Output slot for every record, in key order.
    RecordSequence,
    /// A single record.
    Record,
    /// A bare identifier.
    Identifier,
}

impl Shape {
    /// Renders the shape as a chain ending in `record`, e.g. `Option -> Team`.
    #[must_use]
    pub fn chain(self, record: &str) -> String {
        match self {
            Self::Table => format!("Table -> {record}"),
            Self::OptionalRecord => format!("Option -> {record}"),
            Self::RecordSequence => format!("Vec -> {record}"),
            Self::Record => record.to_string(),
            Self::Identifier => format!("i64 -> {record}"),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Table => "table",
            Self::OptionalRecord => "optional record",
            Self::RecordSequence => "record sequence",
            Self::Record => "record",
            Self::Identifier => "identifier",
        };
        f.write_str(name)
    }
}

/// Confirms the binding can serve an operation of the given shape and
/// returns its identifier locator.
pub(crate) fn ensure_bound<R>(
    binding: &TableBinding<R>,
    shape: Shape,
) -> Result<IdAccessor<R>, ShapeError> {
    binding.locator.ok_or_else(|| ShapeError::UnboundIdentifier {
        table: binding.name().to_string(),
        shape: shape.chain(binding.name()),
    })
}

/// Recovers a typed binding from the registry.
pub(crate) fn resolve<R: Record>(
    table: &str,
    registered_as: &'static str,
    binding: &Arc<dyn Any + Send + Sync>,
) -> Result<Arc<TableBinding<R>>, ShapeError> {
    Arc::clone(binding)
        .downcast::<TableBinding<R>>()
        .map_err(|_| ShapeError::TypeMismatch {
            table: table.to_string(),
            expected: Shape::Table.chain(registered_as),
            actual: Shape::Table.chain(std::any::type_name::<R>()),
        })
}
