//! The trie iterator: one permutation exposed as a
//! three-level trie of distinct IDs.

use std::sync::Arc;

use crate::backend::OrderedStore;
use crate::dictionary::TermId;
use crate::error::StorageResult;
use crate::index::permutation::Permutation;

/// A cursor over one level of one permutation, scoped to a prefix of
/// already-bound IDs.
///
/// Backed by a materialized, sorted `Vec` of distinct values rather than a
/// true backend cursor, since [`OrderedStore`] exposes only
/// batch range scans; the cursor's `open`/`current`/`seek`/`next`/`close`
/// contract is identical either way and is what the leapfrog join depends
/// on.
pub struct TrieCursor {
    level: usize,
    distinct_values: Vec<TermId>,
    position: Option<usize>,
}

impl TrieCursor {
    /// Opens a cursor at `level` (equal to `prefix.len()`) over `store`,
    /// using `perm` to decode each key's field order.
    ///
    /// # Errors
    ///
    /// Propagates backend scan failures.
    pub fn open(
        store: &Arc<dyn OrderedStore>,
        perm: Permutation,
        prefix: &[TermId],
        level: usize,
    ) -> StorageResult<Self> {
        assert_eq!(prefix.len(), level, "prefix length must equal the opened level");

        let mut prefix_bytes = Vec::with_capacity(level * 8);
        for id in prefix {
            prefix_bytes.extend_from_slice(&id.to_be_bytes());
        }

        let entries = store.scan_prefix(&prefix_bytes)?;
        let offset = level * 8;
        let mut distinct_values: Vec<TermId> = Vec::new();
        for (key, _) in &entries {
            let value = u64::from_be_bytes(key[offset..offset + 8].try_into().unwrap());
            if distinct_values.last() != Some(&value) {
                distinct_values.push(value);
            }
        }

        let position = if distinct_values.is_empty() { None } else { Some(0) };
        Ok(Self {
            level,
            distinct_values,
            position,
        })
    }

    /// Builds a cursor directly from an already-sorted, deduplicated list
    /// of distinct values, bypassing a permutation prefix scan. Used when
    /// the candidate set for one logical position is computed some other
    /// way — e.g. a star join intersecting on a position that isn't a
    /// permutation's leading prefix, where the values come from scanning
    /// a triple pattern and projecting out one coordinate.
    #[must_use]
    pub fn from_sorted_distinct(values: Vec<TermId>, level: usize) -> Self {
        let position = if values.is_empty() { None } else { Some(0) };
        Self { level, distinct_values: values, position }
    }

    /// The trie level this cursor iterates (0 = first bound position of
    /// the permutation, 1 = second, 2 = third).
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// The current value, or `None` if exhausted.
    #[must_use]
    pub fn current(&self) -> Option<TermId> {
        self.position.and_then(|i| self.distinct_values.get(i).copied())
    }

    /// Advances to the least value `>= k` within the prefix. Becomes
    /// exhausted if no such value exists.
    pub fn seek(&mut self, k: TermId) {
        let start = self.position.unwrap_or(0);
        match self.distinct_values[start..].binary_search(&k) {
            Ok(i) => self.position = Some(start + i),
            Err(i) => {
                let idx = start + i;
                self.position = if idx < self.distinct_values.len() { Some(idx) } else { None };
            }
        }
    }

    /// Advances to the next distinct value at this level.
    pub fn next(&mut self) {
        self.position = match self.position {
            Some(i) if i + 1 < self.distinct_values.len() => Some(i + 1),
            _ => None,
        };
    }

    /// True iff no current value remains.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.current().is_none()
    }

    /// Releases the cursor's resources. A no-op for the in-process
    /// materialized cursor, but kept as an explicit step so a future
    /// backend-cursor implementation has a place to hang a `close` call,
    /// and so callers always go through one release path regardless of
    /// backend.
    pub fn close(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BTreeMapStore;

    fn populate() -> Arc<dyn OrderedStore> {
        let store: Arc<dyn OrderedStore> = BTreeMapStore::new();
        for (s, p, o) in [(1, 10, 100), (1, 10, 200), (1, 20, 300), (2, 10, 400)] {
            store.insert(&Permutation::Spo.key(s, p, o), &[]).unwrap();
        }
        store
    }

    #[test]
    fn level_zero_lists_distinct_subjects() {
        let store = populate();
        let cursor = TrieCursor::open(&store, Permutation::Spo, &[], 0).unwrap();
        assert_eq!(cursor.current(), Some(1));
    }

    #[test]
    fn seek_advances_to_least_geq() {
        let store = populate();
        let mut cursor = TrieCursor::open(&store, Permutation::Spo, &[], 0).unwrap();
        cursor.seek(2);
        assert_eq!(cursor.current(), Some(2));
    }

    #[test]
    fn seek_past_max_exhausts() {
        let store = populate();
        let mut cursor = TrieCursor::open(&store, Permutation::Spo, &[], 0).unwrap();
        cursor.seek(99);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn next_enumerates_distinct_values_at_level_one() {
        let store = populate();
        let mut cursor = TrieCursor::open(&store, Permutation::Spo, &[1], 1).unwrap();
        assert_eq!(cursor.current(), Some(10));
        cursor.next();
        assert_eq!(cursor.current(), Some(20));
        cursor.next();
        assert!(cursor.is_exhausted());
    }
}
