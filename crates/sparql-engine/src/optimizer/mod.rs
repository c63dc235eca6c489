//! The query optimizer: normalization for plan-cache
//! keying, algebraic rewrites, cardinality estimation, and join-order
//! enumeration, orchestrated by [`Optimizer::optimize`].

pub mod cache;
pub mod cost;
pub mod fingerprint;
pub mod rewrite;

pub use cache::{CacheStats, PlanCache};
pub use cost::{choose_strategy, find_star_hub, JoinStrategy};
pub use fingerprint::fingerprint;

use sparql_algebra::GraphPattern;
use sparql_storage::{Dictionary, Statistics, TripleIndex};

/// Runs the optimizer's rewrite and join-enumeration stages over an
/// algebra tree, optionally going through a [`PlanCache`] first.
///
/// Built with chained `with_*` calls, mirroring
/// `Optimizer::new().with_filter_pushdown(..).with_join_reorder(..)`-style
/// construction.
pub struct Optimizer {
    enable_rewrites: bool,
    enable_join_reorder: bool,
}

impl Optimizer {
    /// An optimizer with every stage enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { enable_rewrites: true, enable_join_reorder: true }
    }

    /// Enables or disables the algebraic rewrite stage.
    #[must_use]
    pub fn with_rewrites(mut self, enabled: bool) -> Self {
        self.enable_rewrites = enabled;
        self
    }

    /// Enables or disables join-order enumeration.
    #[must_use]
    pub fn with_join_reorder(mut self, enabled: bool) -> Self {
        self.enable_join_reorder = enabled;
        self
    }

    /// Optimizes `pattern` against the store's current statistics.
    #[must_use]
    pub fn optimize(&self, pattern: GraphPattern, index: &TripleIndex, dictionary: &Dictionary) -> GraphPattern {
        let pattern = if self.enable_rewrites { rewrite::rewrite(pattern) } else { pattern };
        if self.enable_join_reorder {
            let stats = Statistics::rebuild(index);
            reorder_bgps(pattern, &stats, dictionary)
        } else {
            pattern
        }
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively reorders every `Bgp` node's triple list to the
/// estimated-cheapest evaluation order. Other node
/// kinds are left structurally alone; only their children are visited.
fn reorder_bgps(pattern: GraphPattern, stats: &Statistics, dictionary: &Dictionary) -> GraphPattern {
    match pattern {
        GraphPattern::Bgp(triples) => GraphPattern::Bgp(cost::reorder_for_evaluation(triples, stats, dictionary)),
        GraphPattern::Path(_) | GraphPattern::Values { .. } => pattern,
        GraphPattern::Join(l, r) => {
            GraphPattern::Join(Box::new(reorder_bgps(*l, stats, dictionary)), Box::new(reorder_bgps(*r, stats, dictionary)))
        }
        GraphPattern::LeftJoin(l, r, filter) => {
            GraphPattern::LeftJoin(Box::new(reorder_bgps(*l, stats, dictionary)), Box::new(reorder_bgps(*r, stats, dictionary)), filter)
        }
        GraphPattern::Union(l, r) => {
            GraphPattern::Union(Box::new(reorder_bgps(*l, stats, dictionary)), Box::new(reorder_bgps(*r, stats, dictionary)))
        }
        GraphPattern::Minus(l, r) => {
            GraphPattern::Minus(Box::new(reorder_bgps(*l, stats, dictionary)), Box::new(reorder_bgps(*r, stats, dictionary)))
        }
        GraphPattern::Filter(expr, inner) => GraphPattern::Filter(expr, Box::new(reorder_bgps(*inner, stats, dictionary))),
        GraphPattern::Extend(var, expr, inner) => GraphPattern::Extend(var, expr, Box::new(reorder_bgps(*inner, stats, dictionary))),
        GraphPattern::Project(vars, inner) => GraphPattern::Project(vars, Box::new(reorder_bgps(*inner, stats, dictionary))),
        GraphPattern::Distinct(inner) => GraphPattern::Distinct(Box::new(reorder_bgps(*inner, stats, dictionary))),
        GraphPattern::Reduced(inner) => GraphPattern::Reduced(Box::new(reorder_bgps(*inner, stats, dictionary))),
        GraphPattern::OrderBy(comparators, inner) => GraphPattern::OrderBy(comparators, Box::new(reorder_bgps(*inner, stats, dictionary))),
        GraphPattern::Slice { offset, limit, inner } => {
            GraphPattern::Slice { offset, limit, inner: Box::new(reorder_bgps(*inner, stats, dictionary)) }
        }
        GraphPattern::Group { keys, aggregates, inner } => {
            GraphPattern::Group { keys, aggregates, inner: Box::new(reorder_bgps(*inner, stats, dictionary)) }
        }
    }
}
