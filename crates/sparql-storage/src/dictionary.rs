//! The term dictionary.
//!
//! A process-wide bijection between RDF terms and dense, monotonically
//! allocated 64-bit IDs. ID `0` is reserved as the not-found sentinel.
//! Concurrent `encode` calls for the same term must
//! deterministically resolve to one ID, so the whole get-or-create behind
//! one lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use sparql_common::hash::FastHashMap;
use sparql_model::Term;

use crate::backend::{BTreeMapStore, OrderedStore};
use crate::codec::{decode_term, encode_term};
use crate::error::StorageResult;

/// A dense, opaque term identifier. `0` means "not found".
pub type TermId = u64;

/// Sentinel returned by lookups for an unknown term or ID.
pub const TERM_ID_NOT_FOUND: TermId = 0;

struct DictionaryInner {
    term_to_id: FastHashMap<Vec<u8>, TermId>,
    id_to_term: FastHashMap<TermId, Term>,
    next_id: AtomicU64,
}

/// Bidirectional term/ID mapping, backed by an ordered key/value store for
/// the persisted form (two column families: term→id and
/// id→term) and an in-memory index for lookup speed.
pub struct Dictionary {
    inner: parking_lot::Mutex<DictionaryInner>,
    term_to_id_cf: Arc<dyn OrderedStore>,
    id_to_term_cf: Arc<dyn OrderedStore>,
}

impl Dictionary {
    /// Creates an empty dictionary over fresh in-process column families.
    #[must_use]
    pub fn new() -> Self {
        Self::with_backends(BTreeMapStore::new(), BTreeMapStore::new())
    }

    /// Creates a dictionary over caller-provided column families.
    #[must_use]
    pub fn with_backends(term_to_id_cf: Arc<dyn OrderedStore>, id_to_term_cf: Arc<dyn OrderedStore>) -> Self {
        Self {
            inner: parking_lot::Mutex::new(DictionaryInner {
                term_to_id: FastHashMap::default(),
                id_to_term: FastHashMap::default(),
                next_id: AtomicU64::new(1), // id 0 is reserved
            }),
            term_to_id_cf,
            id_to_term_cf,
        }
    }

    /// Encodes a term, creating a new ID if this is the first encounter.
    ///
    /// Returns the ID and whether it was newly created. Idempotent: two
    /// concurrent encodings of the same term return the same ID.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend write fails; in that case no
    /// ID is returned.
    pub fn encode(&self, term: &Term) -> StorageResult<(TermId, bool)> {
        let key = encode_term(term);
        let mut inner = self.inner.lock();
        if let Some(&id) = inner.term_to_id.get(&key) {
            return Ok((id, false));
        }

        let id = inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.term_to_id_cf.insert(&key, &id.to_be_bytes())?;
        self.id_to_term_cf.insert(&id.to_be_bytes(), &key)?;
        inner.term_to_id.insert(key, id);
        inner.id_to_term.insert(id, term.clone());
        Ok((id, true))
    }

    /// Looks up a term's ID without creating one. Total for known terms,
    /// returns [`TERM_ID_NOT_FOUND`] otherwise.
    #[must_use]
    pub fn get_id(&self, term: &Term) -> TermId {
        let key = encode_term(term);
        self.inner
            .lock()
            .term_to_id
            .get(&key)
            .copied()
            .unwrap_or(TERM_ID_NOT_FOUND)
    }

    /// Decodes an ID back to a term. Total for known IDs; `None` for
    /// unknown IDs (not an error at this layer).
    #[must_use]
    pub fn decode(&self, id: TermId) -> Option<Term> {
        if id == TERM_ID_NOT_FOUND {
            return None;
        }
        self.inner.lock().id_to_term.get(&id).cloned()
    }

    /// Number of distinct terms ever encoded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().id_to_term.len()
    }

    /// True iff no term has ever been encoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes persisted dictionary bytes back to a term, exposed for backends
/// that rehydrate the in-memory index from the column families at startup.
pub fn decode_persisted_term(bytes: &[u8]) -> StorageResult<Term> {
    decode_term(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_for_every_term() {
        let dict = Dictionary::new();
        let terms = vec![
            Term::iri("http://example.org/alice"),
            Term::blank("b0"),
            Term::literal("hello"),
            Term::typed_literal("30", "http://www.w3.org/2001/XMLSchema#integer"),
        ];
        for term in &terms {
            let (id, created) = dict.encode(term).unwrap();
            assert!(created);
            assert_eq!(dict.decode(id).as_ref(), Some(term));
        }
    }

    #[test]
    fn encoding_is_idempotent() {
        let dict = Dictionary::new();
        let term = Term::iri("http://example.org/alice");
        let (id1, created1) = dict.encode(&term).unwrap();
        let (id2, created2) = dict.encode(&term).unwrap();
        assert_eq!(id1, id2);
        assert!(created1);
        assert!(!created2);
    }

    #[test]
    fn unknown_term_and_id_are_not_found() {
        let dict = Dictionary::new();
        assert_eq!(dict.get_id(&Term::iri("http://example.org/nope")), TERM_ID_NOT_FOUND);
        assert_eq!(dict.decode(999), None);
    }

    #[test]
    fn id_zero_is_reserved() {
        let dict = Dictionary::new();
        let (id, _) = dict.encode(&Term::iri("http://example.org/a")).unwrap();
        assert_ne!(id, 0);
    }

    proptest::proptest! {
        #[test]
        fn dictionary_roundtrip_is_total(s in "[a-zA-Z0-9:/.#]{1,40}") {
            let dict = Dictionary::new();
            let term = Term::iri(s);
            let (id, _) = dict.encode(&term).unwrap();
            assert_eq!(dict.decode(id), Some(term));
        }
    }
}
