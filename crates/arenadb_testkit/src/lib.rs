//! # ArenaDB Testkit
//!
//! Test utilities for ArenaDB.
//!
//! This crate provides:
//! - Test fixtures and database helpers
//! - Sample record types with valid and malformed schemas
//! - Property-based test generators using proptest
//! - Concurrent stress helpers
//! - A journal backend with injectable write failures
//!
//! The workspace's integration tests live in this crate's `tests/`
//! directory.
//!
//! ## Usage
//!
//! ```rust
//! use arenadb_testkit::prelude::*;
//!
//! with_temp_db(|db| {
//!     let teams = db.register::<Team>().unwrap();
//!     let mut team = Team::new(254, "The Cheesy Poofs");
//!     assert_eq!(teams.create(&mut team).unwrap(), 1);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;
pub mod generators;
pub mod records;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::records::*;
    pub use crate::stress::*;
}

pub use crash::*;
pub use fixtures::*;
pub use generators::*;
pub use records::*;
pub use stress::*;
