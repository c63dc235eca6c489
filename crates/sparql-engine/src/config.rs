//! Engine configuration: resource limits and per-call defaults.

use std::time::Duration;

/// Tunable limits and defaults for a [`crate::database::Database`].
///
/// Built with chained `with_*` calls, mirroring
/// `Config::in_memory().with_threads(n).with_query_logging()`-style
/// construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Default per-query wall-clock deadline, if any.
    pub(crate) default_timeout: Option<Duration>,
    /// Default per-query iteration budget.
    pub(crate) max_iterations: u64,
    /// Per-operation cap on update data triples.
    pub(crate) max_update_triples: usize,
    /// Per-query cap on distinct variables (`TooManyVariables`).
    pub(crate) max_variables: usize,
    /// Plan cache capacity.
    pub(crate) plan_cache_capacity: usize,
    /// Whether the optimizer's rewrite/join-enumeration stages run, or the
    /// algebra tree executes as supplied.
    pub(crate) optimize: bool,
    /// Whether query text and plan summaries are logged at `info` level.
    pub(crate) query_logging: bool,
}

impl EngineConfig {
    /// Conservative defaults: a 30s timeout, a million-iteration budget,
    /// a 100k-triple update cap, a 10k-variable cap, a 256-entry plan
    /// cache, optimization on, logging off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_timeout: Some(Duration::from_secs(30)),
            max_iterations: 1_000_000,
            max_update_triples: 100_000,
            max_variables: 10_000,
            plan_cache_capacity: 256,
            optimize: true,
            query_logging: false,
        }
    }

    /// Sets the default per-query timeout. `None` disables the deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Sets the default per-query iteration budget.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the per-update-operation triple cap.
    #[must_use]
    pub fn with_max_update_triples(mut self, max_update_triples: usize) -> Self {
        self.max_update_triples = max_update_triples;
        self
    }

    /// Sets the per-query distinct-variable cap.
    #[must_use]
    pub fn with_max_variables(mut self, max_variables: usize) -> Self {
        self.max_variables = max_variables;
        self
    }

    /// Sets the plan cache's LRU capacity.
    #[must_use]
    pub fn with_plan_cache_capacity(mut self, capacity: usize) -> Self {
        self.plan_cache_capacity = capacity;
        self
    }

    /// Enables or disables the optimizer's rewrite and join-enumeration
    /// stages.
    #[must_use]
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Enables query-text and plan-summary logging.
    #[must_use]
    pub fn with_query_logging(mut self) -> Self {
        self.query_logging = true;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
