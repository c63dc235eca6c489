//! The triple index: three sorted permutations over dictionary-encoded
//! triples.

pub mod leapfrog;
pub mod permutation;
pub mod trie;

pub use permutation::Permutation;

use std::sync::Arc;

use crate::backend::{BTreeMapStore, OrderedStore};
use crate::dictionary::TermId;
use crate::error::StorageResult;

/// A triple pattern over term IDs: `None` means unbound in that position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pattern {
    /// Subject, or `None` if unbound.
    pub subject: Option<TermId>,
    /// Predicate, or `None` if unbound.
    pub predicate: Option<TermId>,
    /// Object, or `None` if unbound.
    pub object: Option<TermId>,
}

impl Pattern {
    /// A fully unbound pattern, matching every triple.
    #[must_use]
    pub fn any() -> Self {
        Self {
            subject: None,
            predicate: None,
            object: None,
        }
    }

    /// A fully ground pattern, matching exactly one triple.
    #[must_use]
    pub fn ground(subject: TermId, predicate: TermId, object: TermId) -> Self {
        Self {
            subject: Some(subject),
            predicate: Some(predicate),
            object: Some(object),
        }
    }

    /// The index choice rule: pick the permutation whose
    /// sort order places the bound positions as a prefix.
    ///
    /// | Bound positions | Chosen index |
    /// |---|---|
    /// | S,P,O / S,P / S | SPO |
    /// | P / P,O | POS |
    /// | O | OSP |
    /// | none | SPO (by convention) |
    #[must_use]
    pub fn best_permutation(&self) -> Permutation {
        match (self.subject.is_some(), self.predicate.is_some(), self.object.is_some()) {
            (true, _, _) => Permutation::Spo,
            (false, true, _) => Permutation::Pos,
            (false, false, true) => Permutation::Osp,
            (false, false, false) => Permutation::Spo,
        }
    }
}

/// A concrete, fully-bound triple of term IDs.
pub type TripleIds = (TermId, TermId, TermId);

/// Three sorted permutations (SPO, POS, OSP) over dictionary-encoded
/// triples, plus the insert/delete/count/lookup contracts each permutation
/// must honor.
pub struct TripleIndex {
    spo: Arc<dyn OrderedStore>,
    pos: Arc<dyn OrderedStore>,
    osp: Arc<dyn OrderedStore>,
}

impl TripleIndex {
    /// Creates an empty index over fresh in-process column families.
    #[must_use]
    pub fn new() -> Self {
        Self {
            spo: BTreeMapStore::new(),
            pos: BTreeMapStore::new(),
            osp: BTreeMapStore::new(),
        }
    }

    fn store(&self, perm: Permutation) -> &Arc<dyn OrderedStore> {
        match perm {
            Permutation::Spo => &self.spo,
            Permutation::Pos => &self.pos,
            Permutation::Osp => &self.osp,
        }
    }

    /// Writes the same logical triple under all three permutations.
    /// Idempotent under concurrent insertion of the same
    /// triple: the final state contains exactly one copy per permutation.
    pub fn insert(&self, s: TermId, p: TermId, o: TermId) -> StorageResult<bool> {
        let spo_new = self.spo.insert(&Permutation::Spo.key(s, p, o), &[])?;
        self.pos.insert(&Permutation::Pos.key(s, p, o), &[])?;
        self.osp.insert(&Permutation::Osp.key(s, p, o), &[])?;
        Ok(spo_new)
    }

    /// Removes from all three permutations. Deleting a non-existent triple
    /// succeeds with no effect.
    pub fn delete(&self, s: TermId, p: TermId, o: TermId) -> StorageResult<bool> {
        let spo_removed = self.spo.remove(&Permutation::Spo.key(s, p, o))?;
        self.pos.remove(&Permutation::Pos.key(s, p, o))?;
        self.osp.remove(&Permutation::Osp.key(s, p, o))?;
        Ok(spo_removed)
    }

    /// Returns a lazy sequence of concrete triples matching `pattern`, in
    /// the chosen index's key order. Materialized eagerly
    /// here since the backend has no native cursor API;
    /// callers that need true laziness go through [`trie::TrieCursor`]
    /// instead.
    pub fn lookup(&self, pattern: &Pattern) -> StorageResult<Vec<TripleIds>> {
        let perm = pattern.best_permutation();
        let prefix = perm.prefix_bytes(pattern);
        let entries = self.store(perm).scan_prefix(&prefix)?;
        Ok(entries
            .into_iter()
            .map(|(key, _)| perm.decode_key(&key))
            .filter(|triple| pattern_matches(pattern, *triple))
            .collect())
    }

    /// Counts triples matching `pattern`.
    pub fn count(&self, pattern: &Pattern) -> StorageResult<usize> {
        Ok(self.lookup(pattern)?.len())
    }

    /// Total number of triples in the store.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.spo.len()
    }

    /// Exposes the backing column family for a permutation, for the trie
    /// cursor and leapfrog join.
    #[must_use]
    pub fn column_family(&self, perm: Permutation) -> Arc<dyn OrderedStore> {
        Arc::clone(self.store(perm))
    }
}

impl Default for TripleIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Filters out false positives from a prefix scan: a prefix scan on a
/// partially-bound permutation can still return triples whose *non-prefix*
/// position doesn't match (e.g. pattern `(?, P, O)` on POS: the prefix is
/// just P, so the scan also yields triples with the right P but wrong O
/// until we check).
fn pattern_matches(pattern: &Pattern, triple: TripleIds) -> bool {
    let (s, p, o) = triple;
    pattern.subject.map_or(true, |x| x == s)
        && pattern.predicate.map_or(true, |x| x == p)
        && pattern.object.map_or(true, |x| x == o)
}

/// Same-variable-twice constraint: `?x p ?x` matches only
/// self-loops. The BGP operator (not this index) owns this constraint, but
/// the helper lives here since it operates directly on `TripleIds`.
#[must_use]
pub fn positions_equal(triple: TripleIds, a: TriplePosition, b: TriplePosition) -> bool {
    triple_at(triple, a) == triple_at(triple, b)
}

/// One of the three triple positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriplePosition {
    /// Subject.
    Subject,
    /// Predicate.
    Predicate,
    /// Object.
    Object,
}

fn triple_at(triple: TripleIds, pos: TriplePosition) -> TermId {
    match pos {
        TriplePosition::Subject => triple.0,
        TriplePosition::Predicate => triple.1,
        TriplePosition::Object => triple.2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_visible_in_all_permutations() {
        let index = TripleIndex::new();
        index.insert(1, 2, 3).unwrap();
        assert_eq!(index.count(&Pattern::ground(1, 2, 3)).unwrap(), 1);
        assert_eq!(index.count(&Pattern { subject: None, predicate: Some(2), object: None }).unwrap(), 1);
        assert_eq!(index.count(&Pattern { subject: None, predicate: None, object: Some(3) }).unwrap(), 1);
    }

    #[test]
    fn delete_nonexistent_is_noop() {
        let index = TripleIndex::new();
        assert!(!index.delete(1, 2, 3).unwrap());
    }

    #[test]
    fn delete_removes_from_all_permutations() {
        let index = TripleIndex::new();
        index.insert(1, 2, 3).unwrap();
        index.delete(1, 2, 3).unwrap();
        assert_eq!(index.total_count(), 0);
        assert_eq!(index.count(&Pattern::any()).unwrap(), 0);
    }

    #[test]
    fn concurrent_insert_of_same_triple_is_idempotent() {
        let index = TripleIndex::new();
        index.insert(1, 2, 3).unwrap();
        index.insert(1, 2, 3).unwrap();
        assert_eq!(index.total_count(), 1);
    }

    #[test]
    fn lookup_prefix_filters_false_positives() {
        let index = TripleIndex::new();
        index.insert(1, 2, 3).unwrap();
        index.insert(1, 2, 4).unwrap();
        let results = index.lookup(&Pattern { subject: None, predicate: Some(2), object: Some(4) }).unwrap();
        assert_eq!(results, vec![(1, 2, 4)]);
    }
}
