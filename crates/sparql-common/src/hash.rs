//! Fast, non-cryptographic hash collections.
//!
//! The engine hashes variable names, term IDs, and predicate IDs on every
//! hot path (join probing, dictionary lookups); `ahash` trades DoS
//! resistance we don't need (queries are not attacker-controlled the way a
//! public HTTP handler would be) for speed.

use hashbrown::{HashMap, HashSet};

/// A `HashMap` keyed with `ahash` instead of `SipHash`.
pub type FastHashMap<K, V> = HashMap<K, V, ahash::RandomState>;

/// A `HashSet` keyed with `ahash` instead of `SipHash`.
pub type FastHashSet<T> = HashSet<T, ahash::RandomState>;
