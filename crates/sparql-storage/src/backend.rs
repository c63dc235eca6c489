//! The ordered key/value backend interface.
//!
//! The storage backend is assumed to expose ordered key iteration over
//! opaque byte keys, like an external KV store would. This module
//! defines that interface as [`OrderedStore`] — one instance per column
//! family (three for the index permutations, two for the
//! dictionary) — plus [`BTreeMapStore`], an in-process implementation
//! sufficient to exercise every contract the index and dictionary need
//! from it; an on-disk backend can implement the same trait later
//! without touching either.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::StorageResult;

/// One column family of an ordered key/value backend.
///
/// Keys and values are opaque byte strings; ordering is plain
/// lexicographic byte order, which is what makes big-endian triple-ID keys
/// sort the way the Index layer expects.
pub trait OrderedStore: Send + Sync {
    /// Inserts or overwrites `key`. Returns `true` if the key was newly inserted.
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<bool>;

    /// Removes `key`. Returns `true` if it was present.
    fn remove(&self, key: &[u8]) -> StorageResult<bool>;

    /// Looks up a single key.
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// True iff `key` is present.
    fn contains(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Scans all entries whose key starts with `prefix`, in ascending key order.
    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Scans all entries whose key is `>= lower_bound`, in ascending key order,
    /// stopping at (not including) the first key that does not start with
    /// `within_prefix`. Used by the trie cursor to seek within one level.
    fn scan_from(&self, lower_bound: &[u8], within_prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Total number of entries (used for unconstrained cardinality estimates).
    fn len(&self) -> usize;

    /// True iff the column family is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An in-process `BTreeMap`-backed column family, guarded by a
/// reader/writer lock: the index is shared read-only during
/// queries, and writes go through the update path which serializes
/// per-statement.
#[derive(Default)]
pub struct BTreeMapStore {
    inner: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl BTreeMapStore {
    /// Creates an empty column family.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl OrderedStore for BTreeMapStore {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<bool> {
        let mut guard = self.inner.write();
        Ok(guard.insert(key.to_vec(), value.to_vec()).is_none())
    }

    fn remove(&self, key: &[u8]) -> StorageResult<bool> {
        let mut guard = self.inner.write();
        Ok(guard.remove(key).is_some())
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.inner.read().get(key).cloned())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let guard = self.inner.read();
        Ok(guard
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn scan_from(&self, lower_bound: &[u8], within_prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let guard = self.inner.read();
        Ok(guard
            .range::<Vec<u8>, _>((Bound::Included(lower_bound.to_vec()), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(within_prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn len(&self) -> usize {
        self.inner.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get_roundtrip() {
        let store = BTreeMapStore::new();
        assert!(store.insert(b"a", b"1").unwrap());
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn insert_existing_key_is_not_new() {
        let store = BTreeMapStore::new();
        assert!(store.insert(b"a", b"1").unwrap());
        assert!(!store.insert(b"a", b"2").unwrap());
    }

    #[test]
    fn scan_prefix_respects_bounds() {
        let store = BTreeMapStore::new();
        store.insert(b"ax", b"").unwrap();
        store.insert(b"ay", b"").unwrap();
        store.insert(b"b", b"").unwrap();
        let matched = store.scan_prefix(b"a").unwrap();
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn remove_nonexistent_is_noop() {
        let store = BTreeMapStore::new();
        assert!(!store.remove(b"missing").unwrap());
    }
}
