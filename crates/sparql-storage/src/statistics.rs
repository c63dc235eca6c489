//! Cardinality statistics: per-predicate triple counts and distinct-term
//! counts, the inputs the optimizer's cost model uses to estimate a triple
//! pattern's selectivity without scanning it.

use sparql_common::hash::{FastHashMap, FastHashSet};

use crate::dictionary::TermId;
use crate::index::{Pattern, TripleIndex};

/// Snapshot of per-predicate counts over a [`TripleIndex`], rebuilt by
/// [`Statistics::rebuild`] whenever the optimizer wants a fresh estimate.
///
/// Kept as a plain owned snapshot rather than a live view: the optimizer
/// takes one estimate per planning pass, so staleness between rebuilds is
/// an accepted tradeoff, not a correctness hazard (estimates only ever
/// steer plan choice, never answer correctness).
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    total_triples: usize,
    distinct_subjects: usize,
    distinct_predicates: usize,
    distinct_objects: usize,
    /// Triples per predicate.
    predicate_counts: FastHashMap<TermId, usize>,
}

impl Statistics {
    /// Scans `index` once and builds a fresh snapshot.
    #[must_use]
    pub fn rebuild(index: &TripleIndex) -> Self {
        let all = index.lookup(&Pattern::any()).unwrap_or_default();

        let mut subjects = FastHashSet::default();
        let mut predicates = FastHashSet::default();
        let mut objects = FastHashSet::default();
        let mut predicate_counts: FastHashMap<TermId, usize> = FastHashMap::default();

        for (s, p, o) in &all {
            subjects.insert(*s);
            predicates.insert(*p);
            objects.insert(*o);
            *predicate_counts.entry(*p).or_insert(0) += 1;
        }

        Self {
            total_triples: all.len(),
            distinct_subjects: subjects.len(),
            distinct_predicates: predicates.len(),
            distinct_objects: objects.len(),
            predicate_counts,
        }
    }

    /// Total triples in the snapshot.
    #[must_use]
    pub fn total_triples(&self) -> usize {
        self.total_triples
    }

    /// Distinct subject count.
    #[must_use]
    pub fn distinct_subjects(&self) -> usize {
        self.distinct_subjects
    }

    /// Distinct predicate count.
    #[must_use]
    pub fn distinct_predicates(&self) -> usize {
        self.distinct_predicates
    }

    /// Distinct object count.
    #[must_use]
    pub fn distinct_objects(&self) -> usize {
        self.distinct_objects
    }

    /// Triples carrying `predicate`, or 0 if never seen.
    #[must_use]
    pub fn predicate_frequency(&self, predicate: TermId) -> usize {
        self.predicate_counts.get(&predicate).copied().unwrap_or(0)
    }

    /// Rough selectivity estimate for a triple pattern: a bound predicate
    /// narrows to its own frequency; otherwise falls
    /// back to the overall average fan-out per distinct predicate. Never
    /// returns 0 for a populated store, so downstream cost arithmetic never
    /// divides by zero.
    #[must_use]
    pub fn estimate_cardinality(&self, pattern: &Pattern) -> usize {
        if self.total_triples == 0 {
            return 0;
        }
        let base = match pattern.predicate {
            Some(p) => self.predicate_frequency(p).max(1),
            None => {
                let avg = self.total_triples / self.distinct_predicates.max(1);
                avg.max(1)
            }
        };
        let bound_positions =
            [pattern.subject.is_some(), pattern.object.is_some()].iter().filter(|b| **b).count();
        match bound_positions {
            0 => base,
            1 => (base / 2).max(1),
            _ => (base / 4).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_index() -> TripleIndex {
        let index = TripleIndex::new();
        index.insert(1, 10, 100).unwrap();
        index.insert(2, 10, 200).unwrap();
        index.insert(3, 20, 300).unwrap();
        index
    }

    #[test]
    fn rebuild_counts_distinct_terms_and_predicates() {
        let stats = Statistics::rebuild(&populated_index());
        assert_eq!(stats.total_triples(), 3);
        assert_eq!(stats.distinct_subjects(), 3);
        assert_eq!(stats.distinct_predicates(), 2);
        assert_eq!(stats.predicate_frequency(10), 2);
        assert_eq!(stats.predicate_frequency(20), 1);
        assert_eq!(stats.predicate_frequency(999), 0);
    }

    #[test]
    fn empty_index_has_zero_cardinality_estimate() {
        let stats = Statistics::rebuild(&TripleIndex::new());
        assert_eq!(stats.estimate_cardinality(&Pattern::any()), 0);
    }

    #[test]
    fn bound_predicate_narrows_estimate() {
        let stats = Statistics::rebuild(&populated_index());
        let bound = Pattern { subject: None, predicate: Some(10), object: None };
        let unbound = Pattern::any();
        assert!(stats.estimate_cardinality(&bound) <= stats.estimate_cardinality(&unbound));
    }

    #[test]
    fn fully_bound_pattern_has_lowest_estimate() {
        let stats = Statistics::rebuild(&populated_index());
        let partial = Pattern { subject: None, predicate: Some(10), object: None };
        let full = Pattern { subject: Some(1), predicate: Some(10), object: Some(100) };
        assert!(stats.estimate_cardinality(&full) <= stats.estimate_cardinality(&partial));
    }
}
