//! Committed store state.
//!
//! The state is a map of namespaces, each behind an `Arc` so that a write
//! transaction's working copy only clones the namespaces it touches.
//!
//! # Cost
//!
//! The committed snapshot always holds a second reference to every
//! namespace, so the first write of a transaction to a namespace copies that
//! namespace whole. A single-record `create` is therefore O(n) in the size of
//! its table, and loading n records one transaction at a time is O(n²).
//! Bulk loads should batch their writes into one transaction through
//! `Store::update`, which pays the copy once.

use crate::error::{StorageError, StorageResult};
use crate::record::JournalOp;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One ordered key-space with its own sequence counter.
#[derive(Debug, Clone, Default)]
pub(crate) struct Namespace {
    pub(crate) entries: BTreeMap<Vec<u8>, Vec<u8>>,
    pub(crate) sequence: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StoreState {
    namespaces: BTreeMap<String, Arc<Namespace>>,
}

impl StoreState {
    pub(crate) fn namespace(&self, name: &str) -> StorageResult<&Namespace> {
        self.namespaces
            .get(name)
            .map(Arc::as_ref)
            .ok_or_else(|| StorageError::namespace_not_found(name))
    }

    pub(crate) fn has_namespace(&self, name: &str) -> bool {
        self.namespaces.contains_key(name)
    }

    pub(crate) fn namespace_names(&self) -> Vec<String> {
        self.namespaces.keys().cloned().collect()
    }

    /// Applies a journaled operation.
    ///
    /// Used both by live write transactions and by replay, so a replayed
    /// journal reproduces exactly the state that was committed.
    pub(crate) fn apply(&mut self, op: &JournalOp) -> StorageResult<()> {
        match op {
            JournalOp::CreateNamespace { namespace } => {
                self.namespaces
                    .insert(namespace.clone(), Arc::new(Namespace::default()));
            }
            JournalOp::DropNamespace { namespace } => {
                if self.namespaces.remove(namespace).is_none() {
                    return Err(StorageError::namespace_not_found(namespace.as_str()));
                }
            }
            JournalOp::Put {
                namespace,
                key,
                value,
            } => {
                self.namespace_mut(namespace)?
                    .entries
                    .insert(key.clone(), value.clone());
            }
            JournalOp::Delete { namespace, key } => {
                self.namespace_mut(namespace)?.entries.remove(key);
            }
            JournalOp::Sequence { namespace, value } => {
                self.namespace_mut(namespace)?.sequence = *value;
            }
        }
        Ok(())
    }

    /// Rebuilds the operations that recreate this state from nothing.
    pub(crate) fn snapshot_ops(&self) -> Vec<JournalOp> {
        let mut ops = Vec::new();
        for (name, namespace) in &self.namespaces {
            ops.push(JournalOp::CreateNamespace {
                namespace: name.clone(),
            });
            if namespace.sequence > 0 {
                ops.push(JournalOp::Sequence {
                    namespace: name.clone(),
                    value: namespace.sequence,
                });
            }
            for (key, value) in &namespace.entries {
                ops.push(JournalOp::Put {
                    namespace: name.clone(),
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }
        ops
    }

    /// Copies the namespace unless this state is its only owner.
    fn namespace_mut(&mut self, name: &str) -> StorageResult<&mut Namespace> {
        self.namespaces
            .get_mut(name)
            .map(Arc::make_mut)
            .ok_or_else(|| StorageError::namespace_not_found(name))
    }
}

/// Ascending iterator over the entries of one namespace.
///
/// Keys are compared bytewise, so decimal text keys come back in
/// lexicographic order (`"10"` before `"2"`).
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    inner: btree_map::Iter<'a, Vec<u8>, Vec<u8>>,
}

impl<'a> Entries<'a> {
    pub(crate) fn new(namespace: &'a Namespace) -> Self {
        Self {
            inner: namespace.entries.iter(),
        }
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, value)| (key.as_slice(), value.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Entries<'_> {}
