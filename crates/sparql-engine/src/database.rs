//! The top-level database handle: owns the store and hands out sessions.

use std::sync::Arc;

use parking_lot::Mutex;
use sparql_storage::{Dictionary, TripleIndex};

use crate::config::EngineConfig;
use crate::optimizer::PlanCache;
use crate::session::Session;

/// An in-memory SPARQL store: the dictionary, the triple index, and the
/// shared plan cache, all behind `Arc` so sessions can be handed out
/// freely.
///
/// Mirrors `GraphosDB::new_in_memory().with_config(..)`'s construction
/// style.
pub struct Database {
    index: Arc<TripleIndex>,
    dictionary: Arc<Dictionary>,
    config: EngineConfig,
    plan_cache: Arc<Mutex<PlanCache>>,
}

impl Database {
    /// Creates an empty in-memory database with default configuration.
    #[must_use]
    pub fn new_in_memory() -> Self {
        Self::with_config(EngineConfig::new())
    }

    /// Creates an empty in-memory database with the given configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let plan_cache = Arc::new(Mutex::new(PlanCache::new(config.plan_cache_capacity)));
        Self { index: Arc::new(TripleIndex::new()), dictionary: Arc::new(Dictionary::new()), config, plan_cache }
    }

    /// Opens a session over this database.
    #[must_use]
    pub fn session(&self) -> Session<'_> {
        Session::new(&self.index, &self.dictionary, &self.config, &self.plan_cache)
    }

    /// The configuration this database was opened with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Total number of triples currently stored.
    #[must_use]
    pub fn triple_count(&self) -> usize {
        self.index.total_count()
    }

    /// Number of distinct RDF terms the dictionary has ever encoded.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.dictionary.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_in_memory_database_starts_empty() {
        let db = Database::new_in_memory();
        assert_eq!(db.triple_count(), 0);
        assert_eq!(db.term_count(), 0);
    }

    #[test]
    fn with_config_carries_the_plan_cache_capacity() {
        let db = Database::with_config(EngineConfig::new().with_plan_cache_capacity(4));
        assert_eq!(db.config().plan_cache_capacity, 4);
    }
}
