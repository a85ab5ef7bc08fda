//! # ArenaDB Core
//!
//! Typed tables with atomic create, read, update, delete and truncate on top
//! of [`arenadb_storage`].
//!
//! A record type implements [`Record`] and describes its identifier field
//! through a [`Schema`]. [`Database::register`] validates the schema once and
//! returns a [`Table`] handle; every table operation then runs inside exactly
//! one transaction.
//!
//! ## Identifiers
//!
//! - `0` means "not yet stored"
//! - [`Table::create`] assigns the next value of the table's sequence
//! - Identifiers are never reused, even after deletion
//! - [`Table::truncate`] restarts the sequence at 1
//!
//! ## Ordering
//!
//! [`Table::get_all`] returns records in ascending key order. The default
//! [`KeyEncoding::Decimal`] orders identifiers as text (1, 10, 2, ...);
//! [`KeyEncoding::BigEndian`] orders them numerically.
//!
//! ## Example
//!
//! ```rust
//! use arenadb_core::{Database, FieldKind, Record, Schema};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Team {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Record for Team {
//!     fn schema() -> Schema<Self> {
//!         Schema::<Self>::new("Team")
//!             .identifier("id", |t| t.id, |t, id| t.id = id)
//!             .field("name", FieldKind::Text)
//!     }
//! }
//!
//! let db = Database::open_in_memory()?;
//! let teams = db.register::<Team>()?;
//!
//! let mut team = Team { id: 0, name: "Robonauts".into() };
//! teams.create(&mut team)?;
//! assert_eq!(team.id, 1);
//!
//! teams.delete(1)?;
//! assert!(teams.get_by_id(1)?.is_none());
//! # Ok::<(), arenadb_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod key;
mod schema;
pub mod shape;
mod table;

pub use arenadb_codec::Codec;
pub use arenadb_storage::CompactionStats;
pub use config::Config;
pub use database::Database;
pub use error::{CoreError, CoreResult, SchemaError, ShapeError};
pub use key::KeyEncoding;
pub use schema::{FieldDef, FieldKind, IdAccessor, Record, Schema};
pub use shape::Shape;
pub use table::Table;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
