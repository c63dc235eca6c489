//! The compiled-plan LRU cache.

use std::collections::{HashSet, VecDeque};

use sparql_algebra::{GraphPattern, GraphTerm, PropertyPath};
use sparql_common::hash::FastHashMap;
use sparql_model::NamedNode;

use super::fingerprint::fingerprint;

/// Observable plan-cache statistics: hits and misses tracked so cache
/// effectiveness can be inspected rather than inferred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Successful lookups.
    pub hits: u64,
    /// Lookups that found nothing cached.
    pub misses: u64,
    /// Entries dropped to respect the capacity bound.
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate in `[0.0, 1.0]`; `0.0` when the cache has never been queried.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Maps a normalized query fingerprint to its optimized algebra tree, with
/// LRU eviction at a fixed capacity. Entries can also be invalidated
/// explicitly, e.g. after an update writes to a predicate the cached plan
/// depends on.
/// A cached plan, paired with the ground predicates it touches, so an
/// update to one predicate can invalidate exactly the entries that
/// depend on it rather than the whole cache.
struct Entry {
    plan: GraphPattern,
    predicates: HashSet<NamedNode>,
}

pub struct PlanCache {
    capacity: usize,
    entries: FastHashMap<String, Entry>,
    /// Most-recently-used fingerprint at the back.
    order: VecDeque<String>,
    stats: CacheStats,
}

impl PlanCache {
    /// Creates an empty cache with the given LRU capacity. A capacity of 0
    /// disables caching: every lookup misses and nothing is ever stored.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { capacity, entries: FastHashMap::default(), order: VecDeque::new(), stats: CacheStats::default() }
    }

    /// Looks up the optimized plan for `pattern`, recording a hit or miss.
    pub fn get(&mut self, pattern: &GraphPattern) -> Option<GraphPattern> {
        let key = fingerprint(pattern);
        if let Some(entry) = self.entries.get(&key) {
            let plan = entry.plan.clone();
            self.touch(&key);
            self.stats.hits += 1;
            Some(plan)
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Inserts `optimized` under `pattern`'s fingerprint, evicting the
    /// least-recently-used entry if the cache is at capacity. The
    /// predicates `optimized` touches are recorded so a later
    /// [`PlanCache::invalidate_predicate`] can find this entry.
    pub fn insert(&mut self, pattern: &GraphPattern, optimized: GraphPattern) {
        if self.capacity == 0 {
            return;
        }
        let key = fingerprint(pattern);
        let mut predicates = HashSet::new();
        collect_predicates(&optimized, &mut predicates);
        let entry = Entry { plan: optimized, predicates };
        if self.entries.contains_key(&key) {
            self.entries.insert(key.clone(), entry);
            self.touch(&key);
            return;
        }
        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                self.stats.evictions += 1;
            }
        }
        self.entries.insert(key.clone(), entry);
        self.order.push_back(key);
    }

    /// Drops every cached plan, e.g. after a bulk update whose affected
    /// predicates aren't known ahead of time.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Drops the cached plan for `pattern`'s fingerprint, if any.
    pub fn invalidate(&mut self, pattern: &GraphPattern) {
        let key = fingerprint(pattern);
        if self.entries.remove(&key).is_some() {
            self.order.retain(|k| k != &key);
        }
    }

    /// Drops exactly the cached entries whose plan touches `predicate`,
    /// leaving everything else (and its hit history) intact.
    pub fn invalidate_predicate(&mut self, predicate: &NamedNode) {
        let stale: Vec<String> = self.entries.iter().filter(|(_, entry)| entry.predicates.contains(predicate)).map(|(key, _)| key.clone()).collect();
        for key in stale {
            self.entries.remove(&key);
            self.order.retain(|k| k != &key);
        }
    }

    /// A snapshot of the cache's hit/miss/eviction counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let k = self.order.remove(pos).unwrap();
            self.order.push_back(k);
        }
    }
}

/// Collects every ground predicate a plan's triple and path patterns
/// touch, recursively over every operator that carries a child pattern.
fn collect_predicates(pattern: &GraphPattern, out: &mut HashSet<NamedNode>) {
    match pattern {
        GraphPattern::Bgp(triples) => {
            for t in triples {
                if let GraphTerm::NamedNode(p) = &t.predicate {
                    out.insert(p.clone());
                }
            }
        }
        GraphPattern::Path(p) => collect_path_predicates(&p.path, out),
        GraphPattern::Values { .. } => {}
        GraphPattern::Join(l, r) | GraphPattern::Union(l, r) | GraphPattern::Minus(l, r) => {
            collect_predicates(l, out);
            collect_predicates(r, out);
        }
        GraphPattern::LeftJoin(l, r, _) => {
            collect_predicates(l, out);
            collect_predicates(r, out);
        }
        GraphPattern::Filter(_, inner)
        | GraphPattern::Extend(_, _, inner)
        | GraphPattern::Project(_, inner)
        | GraphPattern::Distinct(inner)
        | GraphPattern::Reduced(inner)
        | GraphPattern::OrderBy(_, inner)
        | GraphPattern::Slice { inner, .. }
        | GraphPattern::Group { inner, .. } => collect_predicates(inner, out),
    }
}

fn collect_path_predicates(path: &PropertyPath, out: &mut HashSet<NamedNode>) {
    match path {
        PropertyPath::Link(p) => {
            out.insert(p.clone());
        }
        PropertyPath::Reverse(inner) | PropertyPath::ZeroOrOne(inner) | PropertyPath::ZeroOrMore(inner) | PropertyPath::OneOrMore(inner) => {
            collect_path_predicates(inner, out);
        }
        PropertyPath::Sequence(a, b) | PropertyPath::Alternative(a, b) => {
            collect_path_predicates(a, out);
            collect_path_predicates(b, out);
        }
        PropertyPath::NegatedPropertySet(props) => out.extend(props.iter().cloned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_algebra::{GraphTerm, TriplePattern};
    use sparql_model::{NamedNode, Variable};

    fn bgp(s: &str) -> GraphPattern {
        bgp_over(s, "http://ex/p")
    }

    fn bgp_over(s: &str, predicate: &str) -> GraphPattern {
        GraphPattern::Bgp(vec![TriplePattern::new(
            GraphTerm::Variable(Variable::new(s)),
            GraphTerm::NamedNode(NamedNode::new(predicate)),
            GraphTerm::Variable(Variable::new("o")),
        )])
    }

    #[test]
    fn miss_then_hit_after_insert() {
        let mut cache = PlanCache::new(4);
        let pattern = bgp("x");
        assert!(cache.get(&pattern).is_none());
        cache.insert(&pattern, pattern.clone());
        assert!(cache.get(&pattern).is_some());
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn eviction_drops_the_least_recently_used_entry() {
        let mut cache = PlanCache::new(2);
        cache.insert(&bgp("a"), bgp("a"));
        cache.insert(&bgp("b"), bgp("b"));
        cache.get(&bgp("a"));
        cache.insert(&bgp("c"), bgp("c"));
        assert!(cache.get(&bgp("b")).is_none());
        assert!(cache.get(&bgp("a")).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn invalidate_forces_a_miss_on_next_lookup() {
        let mut cache = PlanCache::new(4);
        cache.insert(&bgp("a"), bgp("a"));
        cache.invalidate(&bgp("a"));
        assert!(cache.get(&bgp("a")).is_none());
    }

    #[test]
    fn invalidate_predicate_drops_only_entries_touching_it() {
        let mut cache = PlanCache::new(4);
        let over_p = bgp_over("a", "http://ex/p");
        let over_q = bgp_over("b", "http://ex/q");
        cache.insert(&over_p, over_p.clone());
        cache.insert(&over_q, over_q.clone());

        cache.invalidate_predicate(&NamedNode::new("http://ex/p"));

        assert!(cache.get(&over_p).is_none());
        assert!(cache.get(&over_q).is_some());
    }
}
