//! # ArenaDB Storage
//!
//! Transactional, namespaced, ordered key-value store for ArenaDB.
//!
//! This crate is the lowest layer of ArenaDB. It knows nothing about
//! records or schemas: it stores opaque byte values under byte keys, grouped
//! into independent namespaces.
//!
//! ## Guarantees
//!
//! - Read transactions see a consistent snapshot as of their start
//! - Write transactions are serialized and all-or-nothing
//! - Each namespace iterates in ascending byte order of its keys
//! - Each namespace owns a monotonic sequence, restarted when the namespace
//!   is dropped and recreated
//!
//! ## Journal backends
//!
//! - [`MemoryJournal`] - for testing and ephemeral stores
//! - [`FileJournal`] - for persistent stores
//!
//! ## Example
//!
//! ```rust
//! use arenadb_storage::{ReadScope, Store, WriteScope};
//!
//! let store = Store::in_memory();
//! let id = store
//!     .update(|tx| {
//!         tx.create_namespace_if_absent("Team")?;
//!         tx.next_sequence("Team")
//!     })
//!     .unwrap();
//! assert_eq!(id, 1);
//!
//! let count = store.view(|tx| tx.len("Team")).unwrap();
//! assert_eq!(count, 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;
pub mod record;
mod state;
mod store;
mod transaction;

pub use backend::JournalBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileJournal;
pub use memory::MemoryJournal;
pub use record::{scan_frames, Frame, FrameKind, FrameScan, JournalOp};
pub use state::Entries;
pub use store::{CompactionStats, Store, StoreOptions};
pub use transaction::{ReadScope, ReadTransaction, WriteScope, WriteTransaction};
