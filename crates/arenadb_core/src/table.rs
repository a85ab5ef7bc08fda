//! Typed tables and their CRUD operations.

use crate::error::{CoreError, CoreResult};
use crate::key::KeyEncoding;
use crate::schema::{IdAccessor, Record, Schema};
use crate::shape::{self, Shape};
use arenadb_codec::Codec;
use arenadb_storage::{ReadScope, Store, WriteScope};
use std::sync::Arc;
use tracing::{debug, error};

/// Immutable binding of a record type to its namespace.
pub(crate) struct TableBinding<R> {
    pub(crate) schema: Schema<R>,
    pub(crate) locator: Option<IdAccessor<R>>,
}

impl<R> TableBinding<R> {
    pub(crate) fn new(schema: Schema<R>, locator: Option<IdAccessor<R>>) -> Self {
        Self { schema, locator }
    }

    /// Table name, which is also the namespace name.
    pub(crate) fn name(&self) -> &str {
        self.schema.name()
    }
}

/// A typed handle to the records of one record type.
///
/// Every operation runs inside exactly one transaction: reads see a
/// consistent snapshot and writes are all-or-nothing. Handles are cheap to
/// clone and can be shared across threads.
///
/// # Example
///
/// ```
/// use arenadb_core::{Database, FieldKind, Record, Schema};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
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
/// let db = Database::open_in_memory().unwrap();
/// let teams = db.register::<Team>().unwrap();
///
/// let mut team = Team { id: 0, name: "The Cheesy Poofs".into() };
/// let id = teams.create(&mut team).unwrap();
/// assert_eq!(id, 1);
/// assert_eq!(teams.get_by_id(1).unwrap(), Some(team));
/// ```
pub struct Table<R> {
    store: Arc<Store>,
    binding: Arc<TableBinding<R>>,
    key_encoding: KeyEncoding,
    codec: Codec,
}

impl<R> Clone for Table<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            binding: Arc::clone(&self.binding),
            key_encoding: self.key_encoding,
            codec: self.codec,
        }
    }
}

impl<R> std::fmt::Debug for Table<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.binding.name())
            .field("key_encoding", &self.key_encoding)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl<R: Record> Table<R> {
    pub(crate) fn new(
        store: Arc<Store>,
        binding: Arc<TableBinding<R>>,
        key_encoding: KeyEncoding,
        codec: Codec,
    ) -> Self {
        Self {
            store,
            binding,
            key_encoding,
            codec,
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.binding.name()
    }

    /// Returns the schema the table was registered with.
    #[must_use]
    pub fn schema(&self) -> &Schema<R> {
        &self.binding.schema
    }

    /// Fetches the record with identifier `id`.
    ///
    /// Returns `Ok(None)` if no such record exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the stored bytes don't decode.
    pub fn get_by_id(&self, id: i64) -> CoreResult<Option<R>> {
        shape::ensure_bound(&self.binding, Shape::OptionalRecord)?;
        self.ensure_open()?;
        let key = self.key_encoding.encode(id);
        self.store.view(|tx| -> CoreResult<Option<R>> {
            tx.get(self.name(), &key)?
                .map(|bytes| self.decode(bytes))
                .transpose()
        })
    }

    /// Fetches every record in ascending key order.
    ///
    /// With [`KeyEncoding::Decimal`] the order is lexicographic on the
    /// identifier text, so 10 sorts before 2.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or a stored value doesn't decode.
    pub fn get_all(&self) -> CoreResult<Vec<R>> {
        shape::ensure_bound(&self.binding, Shape::RecordSequence)?;
        self.ensure_open()?;
        self.store.view(|tx| -> CoreResult<Vec<R>> {
            tx.iter_ordered(self.name())?
                .map(|(_, bytes)| self.decode(bytes))
                .collect()
        })
    }

    /// Inserts `record` under a freshly assigned identifier.
    ///
    /// The record's identifier must be 0. On success it holds the new
    /// identifier, which is also returned. On failure it is reset to 0.
    ///
    /// # Errors
    ///
    /// - [`CoreError::CreateOnNonZeroId`] if the record already has an
    ///   identifier
    /// - [`CoreError::Conflict`] if the assigned identifier is already stored
    /// - [`CoreError::IdentifierExhausted`] if the sequence left the `i64`
    ///   range
    /// - Storage and codec errors
    pub fn create(&self, record: &mut R) -> CoreResult<i64> {
        let locator = shape::ensure_bound(&self.binding, Shape::Record)?;
        let current = locator.get(record);
        if current != 0 {
            return Err(CoreError::CreateOnNonZeroId {
                table: self.name().to_string(),
                id: current,
            });
        }
        self.ensure_open()?;

        let result = self.store.update(|tx| -> CoreResult<i64> {
            let sequence = tx.next_sequence(self.name())?;
            let id = i64::try_from(sequence).map_err(|_| CoreError::IdentifierExhausted {
                table: self.name().to_string(),
            })?;
            let key = self.key_encoding.encode(id);
            if tx.get(self.name(), &key)?.is_some() {
                error!(table = %self.name(), id, "assigned identifier is already in use");
                return Err(CoreError::conflict(self.name(), id));
            }
            locator.set(record, id);
            let bytes = self.codec.encode(&*record)?;
            tx.put(self.name(), key, bytes)?;
            Ok(id)
        });

        match result {
            Ok(id) => {
                debug!(table = %self.name(), id, "record created");
                Ok(id)
            }
            Err(e) => {
                locator.set(record, 0);
                Err(e)
            }
        }
    }

    /// Overwrites the stored record with the same identifier.
    ///
    /// Never inserts: the record must already exist.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UpdateOnZeroId`] if the record has no identifier
    /// - [`CoreError::NotFound`] if no record has that identifier
    /// - Storage and codec errors
    pub fn update(&self, record: &R) -> CoreResult<()> {
        let locator = shape::ensure_bound(&self.binding, Shape::Record)?;
        let id = locator.get(record);
        if id == 0 {
            return Err(CoreError::UpdateOnZeroId {
                table: self.name().to_string(),
            });
        }
        self.ensure_open()?;

        let key = self.key_encoding.encode(id);
        self.store.update(|tx| -> CoreResult<()> {
            if tx.get(self.name(), &key)?.is_none() {
                return Err(CoreError::not_found(self.name(), id));
            }
            let bytes = self.codec.encode(record)?;
            tx.put(self.name(), key, bytes)?;
            Ok(())
        })?;
        debug!(table = %self.name(), id, "record updated");
        Ok(())
    }

    /// Removes the record with identifier `id`.
    ///
    /// The identifier is never handed out again, even after deletion.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if no record has that identifier, or a
    /// storage error.
    pub fn delete(&self, id: i64) -> CoreResult<()> {
        shape::ensure_bound(&self.binding, Shape::Identifier)?;
        self.ensure_open()?;
        let key = self.key_encoding.encode(id);
        self.store.update(|tx| -> CoreResult<()> {
            if tx.delete(self.name(), &key)? {
                Ok(())
            } else {
                Err(CoreError::not_found(self.name(), id))
            }
        })?;
        debug!(table = %self.name(), id, "record deleted");
        Ok(())
    }

    /// Removes every record and restarts identifier assignment at 1.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn truncate(&self) -> CoreResult<()> {
        shape::ensure_bound(&self.binding, Shape::Table)?;
        self.ensure_open()?;
        self.store.update(|tx| -> CoreResult<()> {
            tx.drop_and_recreate_namespace(self.name())?;
            Ok(())
        })?;
        debug!(table = %self.name(), "table truncated");
        Ok(())
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn count(&self) -> CoreResult<usize> {
        shape::ensure_bound(&self.binding, Shape::Table)?;
        self.ensure_open()?;
        self.store
            .view(|tx| -> CoreResult<usize> { Ok(tx.len(self.name())?) })
    }

    /// Returns whether a record with identifier `id` is stored.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn exists(&self, id: i64) -> CoreResult<bool> {
        shape::ensure_bound(&self.binding, Shape::Identifier)?;
        self.ensure_open()?;
        let key = self.key_encoding.encode(id);
        self.store
            .view(|tx| -> CoreResult<bool> { Ok(tx.get(self.name(), &key)?.is_some()) })
    }

    fn decode(&self, bytes: &[u8]) -> CoreResult<R> {
        Ok(self.codec.decode(bytes)?)
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.store.is_closed() {
            return Err(CoreError::DatabaseClosed);
        }
        Ok(())
    }
}
