//! # sparql-storage
//!
//! The dictionary-encoded triple store: the
//! [`dictionary::Dictionary`] mapping terms to 64-bit IDs, the
//! [`index::TripleIndex`] holding the three SPO/POS/OSP permutations over
//! an ordered key/value [`backend::OrderedStore`], and the
//! [`index::trie::TrieCursor`]/[`index::leapfrog`] machinery for
//! worst-case-optimal multi-way intersection.
//!
//! ## Modules
//!
//! - [`backend`] - The ordered key/value backend interface — assumed to
//!   expose ordered key iteration over opaque byte keys — and an
//!   in-process implementation.
//! - [`codec`] - Stable binary term encoding.
//! - [`dictionary`] - Bidirectional term/ID mapping.
//! - [`index`] - SPO/POS/OSP permutations, range scans, trie cursors, leapfrog join.
//! - [`statistics`] - Per-predicate cardinality statistics.

pub mod backend;
pub mod codec;
pub mod dictionary;
pub mod error;
pub mod index;
pub mod statistics;

pub use dictionary::{Dictionary, TermId, TERM_ID_NOT_FOUND};
pub use error::{StorageError, StorageResult};
pub use index::{Pattern, TripleIndex};
pub use statistics::Statistics;
