//! Read and write transactions.

use crate::error::{StorageError, StorageResult};
use crate::record::JournalOp;
use crate::state::{Entries, StoreState};
use crate::store::Store;
use parking_lot::MutexGuard;
use std::sync::Arc;

/// Operations available inside any transaction.
pub trait ReadScope {
    /// Returns whether `namespace` exists.
    fn has_namespace(&self, namespace: &str) -> bool;

    /// Returns the names of every namespace, in ascending order.
    fn namespaces(&self) -> Vec<String>;

    /// Looks up `key` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NamespaceNotFound`] if the namespace is missing.
    fn get(&self, namespace: &str, key: &[u8]) -> StorageResult<Option<&[u8]>>;

    /// Iterates every entry of `namespace` in ascending byte order of keys.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NamespaceNotFound`] if the namespace is missing.
    fn iter_ordered(&self, namespace: &str) -> StorageResult<Entries<'_>>;

    /// Returns the number of entries in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NamespaceNotFound`] if the namespace is missing.
    fn len(&self, namespace: &str) -> StorageResult<usize>;

    /// Returns the last value handed out by the namespace sequence.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NamespaceNotFound`] if the namespace is missing.
    fn sequence(&self, namespace: &str) -> StorageResult<u64>;
}

/// Operations available only inside a write transaction.
pub trait WriteScope: ReadScope {
    /// Creates `namespace` unless it already exists.
    ///
    /// Returns `true` if the namespace was created.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidNamespace`] for an empty name.
    fn create_namespace_if_absent(&mut self, namespace: &str) -> StorageResult<bool>;

    /// Drops `namespace` with all its entries and recreates it empty.
    ///
    /// The recreated namespace's sequence starts over at zero.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NamespaceNotFound`] if the namespace is missing.
    fn drop_and_recreate_namespace(&mut self, namespace: &str) -> StorageResult<()>;

    /// Advances the namespace sequence and returns the new value.
    ///
    /// The first call on a fresh namespace returns 1.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NamespaceNotFound`] if the namespace is missing.
    fn next_sequence(&mut self, namespace: &str) -> StorageResult<u64>;

    /// Inserts or overwrites `key` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NamespaceNotFound`] if the namespace is missing.
    fn put(&mut self, namespace: &str, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()>;

    /// Removes `key` from `namespace`, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NamespaceNotFound`] if the namespace is missing.
    fn delete(&mut self, namespace: &str, key: &[u8]) -> StorageResult<bool>;
}

/// A read-only transaction over a consistent snapshot.
///
/// The snapshot is fixed when the transaction begins; commits made while it
/// is open are not visible through it. Any number of read transactions can
/// be open at once.
#[derive(Debug, Clone)]
pub struct ReadTransaction {
    snapshot: Arc<StoreState>,
}

impl ReadTransaction {
    pub(crate) fn new(snapshot: Arc<StoreState>) -> Self {
        Self { snapshot }
    }
}

impl ReadScope for ReadTransaction {
    fn has_namespace(&self, namespace: &str) -> bool {
        self.snapshot.has_namespace(namespace)
    }

    fn namespaces(&self) -> Vec<String> {
        self.snapshot.namespace_names()
    }

    fn get(&self, namespace: &str, key: &[u8]) -> StorageResult<Option<&[u8]>> {
        let ns = self.snapshot.namespace(namespace)?;
        Ok(ns.entries.get(key).map(Vec::as_slice))
    }

    fn iter_ordered(&self, namespace: &str) -> StorageResult<Entries<'_>> {
        Ok(Entries::new(self.snapshot.namespace(namespace)?))
    }

    fn len(&self, namespace: &str) -> StorageResult<usize> {
        Ok(self.snapshot.namespace(namespace)?.entries.len())
    }

    fn sequence(&self, namespace: &str) -> StorageResult<u64> {
        Ok(self.snapshot.namespace(namespace)?.sequence)
    }
}

/// An exclusive read-write transaction.
///
/// Holds the store's writer lock for its whole lifetime, so write
/// transactions are serialized; a second `begin_write` blocks until this one
/// commits, rolls back or is dropped. Changes go to a private working copy
/// and become visible to new readers only on [`commit`](Self::commit).
/// Dropping without committing discards every change.
pub struct WriteTransaction<'a> {
    store: &'a Store,
    _guard: MutexGuard<'a, ()>,
    working: StoreState,
    ops: Vec<JournalOp>,
}

impl<'a> WriteTransaction<'a> {
    pub(crate) fn new(store: &'a Store, guard: MutexGuard<'a, ()>, base: StoreState) -> Self {
        Self {
            store,
            _guard: guard,
            working: base,
            ops: Vec::new(),
        }
    }

    /// Returns the number of journaled changes pending in this transaction.
    #[must_use]
    pub fn pending_ops(&self) -> usize {
        self.ops.len()
    }

    /// Commits the transaction.
    ///
    /// The changes are journaled first and published to readers only after
    /// the journal write succeeds; on error nothing becomes visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal write fails or the store is closed.
    pub fn commit(self) -> StorageResult<()> {
        let WriteTransaction {
            store,
            _guard,
            working,
            ops,
        } = self;
        store.publish(working, &ops)
    }

    /// Discards every change made in this transaction.
    pub fn rollback(self) {
        tracing::debug!(ops = self.ops.len(), "write transaction rolled back");
    }

    fn record(&mut self, op: JournalOp) -> StorageResult<()> {
        self.working.apply(&op)?;
        self.ops.push(op);
        Ok(())
    }
}

impl ReadScope for WriteTransaction<'_> {
    fn has_namespace(&self, namespace: &str) -> bool {
        self.working.has_namespace(namespace)
    }

    fn namespaces(&self) -> Vec<String> {
        self.working.namespace_names()
    }

    fn get(&self, namespace: &str, key: &[u8]) -> StorageResult<Option<&[u8]>> {
        let ns = self.working.namespace(namespace)?;
        Ok(ns.entries.get(key).map(Vec::as_slice))
    }

    fn iter_ordered(&self, namespace: &str) -> StorageResult<Entries<'_>> {
        Ok(Entries::new(self.working.namespace(namespace)?))
    }

    fn len(&self, namespace: &str) -> StorageResult<usize> {
        Ok(self.working.namespace(namespace)?.entries.len())
    }

    fn sequence(&self, namespace: &str) -> StorageResult<u64> {
        Ok(self.working.namespace(namespace)?.sequence)
    }
}

impl WriteScope for WriteTransaction<'_> {
    fn create_namespace_if_absent(&mut self, namespace: &str) -> StorageResult<bool> {
        if namespace.is_empty() || namespace.len() > usize::from(u16::MAX) {
            return Err(StorageError::InvalidNamespace {
                name: namespace.to_string(),
            });
        }
        if self.working.has_namespace(namespace) {
            return Ok(false);
        }
        self.record(JournalOp::CreateNamespace {
            namespace: namespace.to_string(),
        })?;
        Ok(true)
    }

    fn drop_and_recreate_namespace(&mut self, namespace: &str) -> StorageResult<()> {
        self.record(JournalOp::DropNamespace {
            namespace: namespace.to_string(),
        })?;
        self.record(JournalOp::CreateNamespace {
            namespace: namespace.to_string(),
        })
    }

    fn next_sequence(&mut self, namespace: &str) -> StorageResult<u64> {
        let next = self
            .working
            .namespace(namespace)?
            .sequence
            .checked_add(1)
            .ok_or_else(|| StorageError::SequenceExhausted {
                name: namespace.to_string(),
            })?;
        self.record(JournalOp::Sequence {
            namespace: namespace.to_string(),
            value: next,
        })?;
        Ok(next)
    }

    fn put(&mut self, namespace: &str, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()> {
        self.record(JournalOp::Put {
            namespace: namespace.to_string(),
            key,
            value,
        })
    }

    fn delete(&mut self, namespace: &str, key: &[u8]) -> StorageResult<bool> {
        if self.working.namespace(namespace)?.entries.contains_key(key) {
            self.record(JournalOp::Delete {
                namespace: namespace.to_string(),
                key: key.to_vec(),
            })?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
