//! Database facade and table registry.

use crate::config::Config;
use crate::error::{CoreError, CoreResult, SchemaError};
use crate::schema::Record;
use crate::shape;
use crate::table::{Table, TableBinding};
use arenadb_storage::{
    CompactionStats, FileJournal, JournalBackend, MemoryJournal, Store, StoreOptions, WriteScope,
};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// A registered table with its record type erased.
struct RegisteredTable {
    type_name: &'static str,
    binding: Arc<dyn Any + Send + Sync>,
}

/// The main database handle.
///
/// `Database` owns the store and the registry of record types. Tables are
/// obtained with [`register`](Self::register) at startup and
/// [`table`](Self::table) afterwards.
///
/// # Opening a Database
///
/// ```rust,no_run
/// use arenadb_core::Database;
/// use std::path::Path;
///
/// let db = Database::open(Path::new("arena.db"))?;
/// // register tables and use them
/// db.close()?;
/// # Ok::<(), arenadb_core::CoreError>(())
/// ```
///
/// # In-Memory Databases
///
/// For testing, use `Database::open_in_memory()`:
///
/// ```rust
/// let db = arenadb_core::Database::open_in_memory()?;
/// assert!(db.path().is_none());
/// # Ok::<(), arenadb_core::CoreError>(())
/// ```
pub struct Database {
    /// Configuration.
    config: Config,
    /// Journal file. None for in-memory databases.
    path: Option<PathBuf>,
    /// The underlying store, shared with every table handle.
    store: Arc<Store>,
    /// Registered tables by name.
    registry: RwLock<HashMap<String, RegisteredTable>>,
}

impl Database {
    /// Opens a database backed by the journal file at `path`.
    ///
    /// The file is created if it doesn't exist. The database holds an
    /// exclusive lock on it until closed or dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Another handle has the database locked
    /// - The journal is damaged before its final frame
    /// - I/O errors occur
    pub fn open(path: &Path) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a database with custom configuration.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open), plus a missing-journal error when
    /// `create_if_missing` is false and the file doesn't exist.
    pub fn open_with_config(path: &Path, config: Config) -> CoreResult<Self> {
        let journal = if config.create_if_missing {
            FileJournal::open(path)?
        } else {
            FileJournal::open_existing(path)?
        };
        let db = Self::from_journal(Box::new(journal), config, Some(path.to_path_buf()))?;
        info!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Opens an empty in-memory database.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the result mirrors [`open`](Self::open).
    pub fn open_in_memory() -> CoreResult<Self> {
        Self::open_in_memory_with_config(Config::default())
    }

    /// Opens an empty in-memory database with custom configuration.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the result mirrors [`open`](Self::open).
    pub fn open_in_memory_with_config(config: Config) -> CoreResult<Self> {
        Self::open_with_journal(Box::new(MemoryJournal::new()), config)
    }

    /// Opens a database on a caller-supplied journal backend.
    ///
    /// This is a lower-level constructor for custom or instrumented journals.
    /// For most use cases, prefer [`open`](Self::open) instead. The database
    /// has no path.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal can't be read or is damaged before its
    /// final frame.
    pub fn open_with_journal(journal: Box<dyn JournalBackend>, config: Config) -> CoreResult<Self> {
        Self::from_journal(journal, config, None)
    }

    fn from_journal(
        journal: Box<dyn JournalBackend>,
        config: Config,
        path: Option<PathBuf>,
    ) -> CoreResult<Self> {
        let options = StoreOptions {
            sync_on_commit: config.sync_on_commit,
        };
        let store = Store::open(journal, options)?;
        Ok(Self {
            config,
            path,
            store: Arc::new(store),
            registry: RwLock::new(HashMap::new()),
        })
    }

    /// Binds record type `R` to its table and returns a handle.
    ///
    /// The schema is validated and the table's namespace is created if
    /// absent. Registering the same type again returns a handle to the
    /// existing binding.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Schema`] if the schema is malformed or the table name is
    ///   bound to another type; no namespace is created
    /// - Storage errors
    pub fn register<R: Record>(&self) -> CoreResult<Table<R>> {
        self.ensure_open()?;
        let schema = R::schema();
        let locator = schema.validate()?;
        let name = schema.name().to_string();
        let requested = std::any::type_name::<R>();

        let mut registry = self.registry.write();
        if let Some(existing) = registry.get(&name) {
            let binding = shape::resolve::<R>(&name, existing.type_name, &existing.binding)
                .map_err(|_| SchemaError::NamespaceTaken {
                    table: name.clone(),
                    registered: existing.type_name,
                    requested,
                })?;
            return Ok(self.table_for(binding));
        }

        let created = self
            .store
            .update(|tx| -> CoreResult<bool> { Ok(tx.create_namespace_if_absent(&name)?) })?;

        let binding = Arc::new(TableBinding::new(schema, Some(locator)));
        registry.insert(
            name.clone(),
            RegisteredTable {
                type_name: requested,
                binding: Arc::clone(&binding) as Arc<dyn Any + Send + Sync>,
            },
        );
        info!(table = %name, record = requested, created, "table registered");
        Ok(self.table_for(binding))
    }

    /// Returns a handle to the already registered table of `R`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::TableNotRegistered`] if `R` was never registered
    /// - [`CoreError::Shape`] if the table name is bound to another type
    pub fn table<R: Record>(&self) -> CoreResult<Table<R>> {
        self.ensure_open()?;
        let name = R::schema().name().to_string();
        let registry = self.registry.read();
        let existing = registry
            .get(&name)
            .ok_or_else(|| CoreError::TableNotRegistered {
                table: name.clone(),
            })?;
        let binding = shape::resolve::<R>(&name, existing.type_name, &existing.binding)?;
        Ok(self.table_for(binding))
    }

    /// Returns the names of all registered tables, sorted.
    #[must_use]
    pub fn tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Empties every registered table in one write transaction.
    ///
    /// Identifier assignment restarts at 1 in each table.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is closed or the store fails.
    pub fn reset(&self) -> CoreResult<()> {
        self.ensure_open()?;
        let names = self.tables();
        self.store.update(|tx| -> CoreResult<()> {
            for name in &names {
                tx.drop_and_recreate_namespace(name)?;
            }
            Ok(())
        })?;
        info!(tables = names.len(), "database reset");
        Ok(())
    }

    /// Writes a compacted copy of the database to `path`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is closed or the copy can't be
    /// written.
    pub fn backup_to(&self, path: &Path) -> CoreResult<u64> {
        self.ensure_open()?;
        Ok(self.store.backup_to(path)?)
    }

    /// Rewrites the journal as a single snapshot of the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is closed or the journal can't be
    /// rewritten.
    pub fn compact(&self) -> CoreResult<CompactionStats> {
        self.ensure_open()?;
        Ok(self.store.compact()?)
    }

    /// Closes the database.
    ///
    /// Table handles fail with [`CoreError::DatabaseClosed`] afterwards.
    /// Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the final journal sync fails.
    pub fn close(&self) -> CoreResult<()> {
        if self.store.is_closed() {
            return Ok(());
        }
        self.store.close()?;
        info!("database closed");
        Ok(())
    }

    /// Returns whether the database is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.store.is_closed()
    }

    /// Returns the journal path, or `None` for in-memory databases.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the configuration the database was opened with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn table_for<R: Record>(&self, binding: Arc<TableBinding<R>>) -> Table<R> {
        Table::new(
            Arc::clone(&self.store),
            binding,
            self.config.key_encoding,
            self.config.codec,
        )
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.store.is_closed() {
            return Err(CoreError::DatabaseClosed);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("config", &self.config)
            .field("tables", &self.tables())
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyEncoding;
    use crate::schema::{FieldDef, FieldKind, Schema};
    use arenadb_storage::ReadScope;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Team {
        id: i64,
        name: String,
    }

    impl Record for Team {
        fn schema() -> Schema<Self> {
            Schema::<Self>::new("Team")
                .identifier("id", |t| t.id, |t, id| t.id = id)
                .field("name", FieldKind::Text)
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Impostor {
        id: i64,
    }

    impl Record for Impostor {
        fn schema() -> Schema<Self> {
            Schema::<Self>::new("Team").identifier("id", |t| t.id, |t, id| t.id = id)
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct NoId {
        name: String,
    }

    impl Record for NoId {
        fn schema() -> Schema<Self> {
            Schema::<Self>::new("NoId").field("name", FieldKind::Text)
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct TextId {
        id: String,
    }

    impl Record for TextId {
        fn schema() -> Schema<Self> {
            Schema::<Self>::new("TextId")
                .with_field(FieldDef::new("id", FieldKind::Text).identifier())
        }
    }

    fn team(name: &str) -> Team {
        Team {
            id: 0,
            name: name.to_string(),
        }
    }

    fn has_namespace(db: &Database, name: &str) -> bool {
        db.store.begin_read().unwrap().has_namespace(name)
    }

    #[test]
    fn register_creates_namespace() {
        let db = Database::open_in_memory().unwrap();
        let teams = db.register::<Team>().unwrap();
        assert_eq!(teams.name(), "Team");
        assert!(has_namespace(&db, "Team"));
        assert_eq!(db.tables(), vec!["Team".to_string()]);
    }

    #[test]
    fn register_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let first = db.register::<Team>().unwrap();
        first.create(&mut team("a")).unwrap();

        let second = db.register::<Team>().unwrap();
        assert_eq!(second.count().unwrap(), 1);
        assert_eq!(db.tables().len(), 1);
    }

    #[test]
    fn malformed_schema_creates_nothing() {
        let db = Database::open_in_memory().unwrap();

        let err = db.register::<NoId>().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Schema(SchemaError::MissingIdentifier { .. })
        ));
        assert!(!has_namespace(&db, "NoId"));

        let err = db.register::<TextId>().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Schema(SchemaError::IdentifierType { .. })
        ));
        assert!(!has_namespace(&db, "TextId"));
        assert!(db.tables().is_empty());
    }

    #[test]
    fn name_bound_to_other_type() {
        let db = Database::open_in_memory().unwrap();
        db.register::<Team>().unwrap();

        let err = db.register::<Impostor>().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Schema(SchemaError::NamespaceTaken { .. })
        ));

        let err = db.table::<Impostor>().unwrap_err();
        assert!(matches!(err, CoreError::Shape(_)));
    }

    #[test]
    fn table_requires_registration() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.table::<Team>(),
            Err(CoreError::TableNotRegistered { .. })
        ));

        let registered = db.register::<Team>().unwrap();
        registered.create(&mut team("a")).unwrap();
        let looked_up = db.table::<Team>().unwrap();
        assert_eq!(looked_up.get_by_id(1).unwrap().unwrap().name, "a");
    }

    #[test]
    fn reset_empties_every_table() {
        let db = Database::open_in_memory().unwrap();
        let teams = db.register::<Team>().unwrap();
        for name in ["a", "b"] {
            teams.create(&mut team(name)).unwrap();
        }
        db.reset().unwrap();
        assert_eq!(teams.count().unwrap(), 0);
        assert_eq!(teams.create(&mut team("c")).unwrap(), 1);
    }

    #[test]
    fn close_rejects_further_use() {
        let db = Database::open_in_memory().unwrap();
        let teams = db.register::<Team>().unwrap();
        db.close().unwrap();
        db.close().unwrap();
        assert!(!db.is_open());
        assert!(matches!(db.register::<Team>(), Err(CoreError::DatabaseClosed)));
        assert!(matches!(teams.get_all(), Err(CoreError::DatabaseClosed)));
    }

    #[test]
    fn reopen_keeps_records_and_sequence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("arena.db");
        {
            let db = Database::open(&path).unwrap();
            let teams = db.register::<Team>().unwrap();
            teams.create(&mut team("a")).unwrap();
            teams.create(&mut team("b")).unwrap();
            teams.delete(2).unwrap();
            db.close().unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.path(), Some(path.as_path()));
        let teams = db.register::<Team>().unwrap();
        let all = teams.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "a");
        assert_eq!(teams.create(&mut team("c")).unwrap(), 3);
    }

    #[test]
    fn open_existing_only() {
        let dir = tempdir().unwrap();
        let config = Config::new().create_if_missing(false);
        let err = Database::open_with_config(&dir.path().join("missing.db"), config).unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
    }

    #[test]
    fn backup_is_openable() {
        let dir = tempdir().unwrap();
        let db = Database::open_in_memory_with_config(
            Config::new().key_encoding(KeyEncoding::BigEndian),
        )
        .unwrap();
        let teams = db.register::<Team>().unwrap();
        teams.create(&mut team("a")).unwrap();

        let backup = dir.path().join("backup.db");
        assert!(db.backup_to(&backup).unwrap() > 0);

        let restored = Database::open_with_config(
            &backup,
            Config::new().key_encoding(KeyEncoding::BigEndian),
        )
        .unwrap();
        let teams = restored.register::<Team>().unwrap();
        assert_eq!(teams.get_by_id(1).unwrap().unwrap().name, "a");
    }

    #[test]
    fn compact_keeps_contents() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("arena.db")).unwrap();
        let teams = db.register::<Team>().unwrap();
        for i in 0..20 {
            let mut t = team(&format!("t{i}"));
            teams.create(&mut t).unwrap();
            t.name.push('!');
            teams.update(&t).unwrap();
        }
        let stats = db.compact().unwrap();
        assert!(stats.after < stats.before);
        assert_eq!(teams.count().unwrap(), 20);
        assert_eq!(teams.get_by_id(20).unwrap().unwrap().name, "t19!");
    }
}
