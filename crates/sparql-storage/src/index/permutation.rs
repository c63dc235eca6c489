//! The three sorted permutations and their 24-byte key encoding: each key
//! is three 64-bit big-endian IDs laid out in the permutation's order.

use crate::dictionary::TermId;
use crate::index::{Pattern, TripleIds};

/// Which of the three sorted orders a column family holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permutation {
    /// Subject, Predicate, Object.
    Spo,
    /// Predicate, Object, Subject.
    Pos,
    /// Object, Subject, Predicate.
    Osp,
}

impl Permutation {
    /// Encodes `(s, p, o)` as this permutation's 24-byte big-endian key.
    #[must_use]
    pub fn key(self, s: TermId, p: TermId, o: TermId) -> [u8; 24] {
        let (a, b, c) = self.order(s, p, o);
        let mut key = [0u8; 24];
        key[0..8].copy_from_slice(&a.to_be_bytes());
        key[8..16].copy_from_slice(&b.to_be_bytes());
        key[16..24].copy_from_slice(&c.to_be_bytes());
        key
    }

    /// Decodes a 24-byte key back to `(s, p, o)` regardless of permutation.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not exactly 24 bytes; index keys are always
    /// produced by [`Permutation::key`] so this is an internal invariant,
    /// not a user-facing error path.
    #[must_use]
    pub fn decode_key(self, key: &[u8]) -> TripleIds {
        assert_eq!(key.len(), 24, "triple index keys are always 24 bytes");
        let a = u64::from_be_bytes(key[0..8].try_into().unwrap());
        let b = u64::from_be_bytes(key[8..16].try_into().unwrap());
        let c = u64::from_be_bytes(key[16..24].try_into().unwrap());
        self.undo_order(a, b, c)
    }

    /// Reorders `(s, p, o)` into this permutation's key field order.
    fn order(self, s: TermId, p: TermId, o: TermId) -> (TermId, TermId, TermId) {
        match self {
            Permutation::Spo => (s, p, o),
            Permutation::Pos => (p, o, s),
            Permutation::Osp => (o, s, p),
        }
    }

    /// Inverse of [`Permutation::order`].
    fn undo_order(self, a: TermId, b: TermId, c: TermId) -> TripleIds {
        match self {
            Permutation::Spo => (a, b, c),
            Permutation::Pos => (c, a, b),
            Permutation::Osp => (b, c, a),
        }
    }

    /// The byte prefix covering exactly the bound leading positions of
    /// `pattern` under this permutation, for a range scan.
    #[must_use]
    pub fn prefix_bytes(self, pattern: &Pattern) -> Vec<u8> {
        let ordered: [Option<TermId>; 3] = match self {
            Permutation::Spo => [pattern.subject, pattern.predicate, pattern.object],
            Permutation::Pos => [pattern.predicate, pattern.object, pattern.subject],
            Permutation::Osp => [pattern.object, pattern.subject, pattern.predicate],
        };
        let mut prefix = Vec::with_capacity(24);
        for slot in ordered {
            match slot {
                Some(id) => prefix.extend_from_slice(&id.to_be_bytes()),
                None => break,
            }
        }
        prefix
    }

    /// The triple position each trie level corresponds to, in this
    /// permutation's order (used by the trie cursor to decode a level's
    /// distinct value back to the caller-visible position).
    #[must_use]
    pub fn level_order(self) -> [TriplePositionName; 3] {
        match self {
            Permutation::Spo => [TriplePositionName::S, TriplePositionName::P, TriplePositionName::O],
            Permutation::Pos => [TriplePositionName::P, TriplePositionName::O, TriplePositionName::S],
            Permutation::Osp => [TriplePositionName::O, TriplePositionName::S, TriplePositionName::P],
        }
    }
}

/// Names a triple position without requiring a full [`crate::index::TriplePosition`] import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriplePositionName {
    /// Subject.
    S,
    /// Predicate.
    P,
    /// Object.
    O,
}
