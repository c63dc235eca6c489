//! Cardinality estimation and join enumeration.

use sparql_algebra::{GraphTerm, TriplePattern};
use sparql_model::Variable;
use sparql_storage::{Dictionary, Pattern, Statistics};

/// The join strategy a join node should use, chosen by [`choose_strategy`]
/// and carried out by the executor: `executor::bgp` dispatches `Leapfrog`
/// to a real multi-way trie intersection and `executor::join` dispatches
/// `HashJoin` to a build/probe hash join; `NestedLoop` stays the seeded
/// index-nested-loop join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStrategy {
    /// Probe the right side per left-side row via an index seek.
    NestedLoop,
    /// Build a hash table over the smaller side's join keys.
    HashJoin,
    /// Worst-case-optimal multi-way intersection over ≥3 patterns sharing
    /// a variable.
    Leapfrog,
}

/// Picks a join strategy for joining a group of `triples` that all share
/// at least one variable, by a selection predicate where
/// leapfrog needs ≥4 patterns with some variable occurring in ≥3 of them;
/// nested-loop is preferred below a small cardinality threshold to avoid
/// hash-build overhead.
#[must_use]
pub fn choose_strategy(triples: &[TriplePattern], left_card: usize, right_card: usize) -> JoinStrategy {
    const NESTED_LOOP_THRESHOLD: usize = 100;
    if find_star_hub(triples).is_some() {
        return JoinStrategy::Leapfrog;
    }
    if left_card.min(right_card) <= NESTED_LOOP_THRESHOLD {
        JoinStrategy::NestedLoop
    } else {
        JoinStrategy::HashJoin
    }
}

/// Finds a variable occurring in at least 3 of `triples`, the star-shaped
/// condition [`choose_strategy`] requires (together with `triples.len() >=
/// 4`) before it returns [`JoinStrategy::Leapfrog`]. Exposed so the
/// executor can recover *which* variable to intersect on, not just that
/// leapfrog applies.
#[must_use]
pub fn find_star_hub(triples: &[TriplePattern]) -> Option<Variable> {
    if triples.len() < 4 {
        return None;
    }
    let mut counts: std::collections::HashMap<&Variable, usize> = std::collections::HashMap::new();
    for triple in triples {
        for term in [&triple.subject, &triple.predicate, &triple.object] {
            if let GraphTerm::Variable(v) = term {
                *counts.entry(v).or_insert(0) += 1;
            }
        }
    }
    counts.into_iter().find(|&(_, n)| n >= 3).map(|(v, _)| v.clone())
}

/// Estimates a triple pattern's result cardinality
/// by resolving its ground positions to dictionary IDs and delegating to
/// `Statistics::estimate_cardinality`. A ground term absent from the
/// dictionary can never match, so this returns 0 without a lookup.
#[must_use]
pub fn estimate_triple_cardinality(triple: &TriplePattern, stats: &Statistics, dictionary: &Dictionary) -> usize {
    match to_storage_pattern(triple, dictionary) {
        Some(pattern) => stats.estimate_cardinality(&pattern),
        None => 0,
    }
}

fn to_storage_pattern(triple: &TriplePattern, dictionary: &Dictionary) -> Option<Pattern> {
    Some(Pattern {
        subject: resolve(&triple.subject, dictionary)?,
        predicate: resolve(&triple.predicate, dictionary)?,
        object: resolve(&triple.object, dictionary)?,
    })
}

fn resolve(term: &GraphTerm, dictionary: &Dictionary) -> Option<Option<sparql_storage::TermId>> {
    match term {
        GraphTerm::Variable(_) => Some(None),
        ground => {
            let ground_term = ground.as_ground_term()?;
            let id = dictionary.get_id(&ground_term);
            if id == sparql_storage::TERM_ID_NOT_FOUND {
                None
            } else {
                Some(Some(id))
            }
        }
    }
}

/// Reorders `triples` into the estimated-cheapest left-deep evaluation
/// order: exhaustive DP over connected subsets for
/// `n ≤ 8` patterns, greedy nearest-neighbor for larger BGPs.
#[must_use]
pub fn reorder_for_evaluation(triples: Vec<TriplePattern>, stats: &Statistics, dictionary: &Dictionary) -> Vec<TriplePattern> {
    if triples.len() <= 1 {
        return triples;
    }
    let cardinalities: Vec<usize> = triples.iter().map(|t| estimate_triple_cardinality(t, stats, dictionary).max(1)).collect();
    let order = if triples.len() <= 8 {
        dp_join_order(&triples, &cardinalities)
    } else {
        greedy_join_order(&triples, &cardinalities)
    };
    order.into_iter().map(|i| triples[i].clone()).collect()
}

fn shares_variable(a: &TriplePattern, b: &TriplePattern) -> bool {
    let vars_a = pattern_variables(a);
    pattern_variables(b).iter().any(|v| vars_a.contains(v))
}

fn pattern_variables(t: &TriplePattern) -> Vec<&Variable> {
    [&t.subject, &t.predicate, &t.object]
        .iter()
        .filter_map(|term| if let GraphTerm::Variable(v) = term { Some(v) } else { None })
        .collect()
}

/// `dp[mask] = (total_cost, running_cardinality, order)`, built bottom-up
/// over every subset of pattern indices connected to its predecessor.
fn dp_join_order(triples: &[TriplePattern], cardinalities: &[usize]) -> Vec<usize> {
    let n = triples.len();
    let full = (1u32 << n) - 1;
    let mut dp: Vec<Option<(f64, f64, Vec<usize>)>> = vec![None; 1 << n];
    dp[0] = Some((0.0, 1.0, Vec::new()));

    for mask in 1..=full {
        let mut best: Option<(f64, f64, Vec<usize>)> = None;
        for j in 0..n {
            if mask & (1 << j) == 0 {
                continue;
            }
            let prev_mask = mask & !(1 << j);
            let Some((prev_cost, prev_card, prev_order)) = &dp[prev_mask as usize] else { continue };
            let right_card = cardinalities[j] as f64;
            let cost = prev_cost + prev_card * right_card;
            if best.as_ref().map_or(true, |(best_cost, _, _)| cost < *best_cost) {
                let mut order = prev_order.clone();
                order.push(j);
                let card = (prev_card * right_card / 1000.0).max(1.0);
                best = Some((cost, card, order));
            }
        }
        dp[mask as usize] = best;
    }
    dp[full as usize].take().map(|(_, _, order)| order).unwrap_or_else(|| (0..n).collect())
}

fn greedy_join_order(triples: &[TriplePattern], cardinalities: &[usize]) -> Vec<usize> {
    let n = triples.len();
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut order = Vec::with_capacity(n);

    remaining.sort_by_key(|&i| cardinalities[i]);
    order.push(remaining.remove(0));

    while !remaining.is_empty() {
        let connected_index = remaining
            .iter()
            .position(|&j| order.iter().any(|&i| shares_variable(&triples[i], &triples[j])))
            .unwrap_or(0);
        let next = remaining.remove(connected_index);
        order.push(next);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_model::{NamedNode, Term};
    use sparql_storage::TripleIndex;

    fn populated() -> (TripleIndex, Dictionary, Statistics) {
        let index = TripleIndex::new();
        let dictionary = Dictionary::new();
        let p = dictionary.encode(&Term::iri("http://ex/p")).unwrap().0;
        let rare = dictionary.encode(&Term::iri("http://ex/rare")).unwrap().0;
        for i in 0..50 {
            let s = dictionary.encode(&Term::iri(format!("http://ex/s{i}"))).unwrap().0;
            let o = dictionary.encode(&Term::iri(format!("http://ex/o{i}"))).unwrap().0;
            index.insert(s, p, o).unwrap();
        }
        let only = dictionary.encode(&Term::iri("http://ex/only-subject")).unwrap().0;
        index.insert(only, rare, only).unwrap();
        let stats = Statistics::rebuild(&index);
        (index, dictionary, stats)
    }

    fn pattern(s: &str, p: &str, o: &str) -> TriplePattern {
        let subject = if let Some(var) = s.strip_prefix('?') {
            GraphTerm::Variable(Variable::new(var))
        } else {
            GraphTerm::NamedNode(NamedNode::new(s))
        };
        let object = if let Some(var) = o.strip_prefix('?') {
            GraphTerm::Variable(Variable::new(var))
        } else {
            GraphTerm::NamedNode(NamedNode::new(o))
        };
        TriplePattern::new(subject, GraphTerm::NamedNode(NamedNode::new(p)), object)
    }

    #[test]
    fn reorder_places_the_selective_pattern_first() {
        let (_, dictionary, stats) = populated();
        let common = pattern("?s", "http://ex/p", "?o");
        let selective = pattern("http://ex/only-subject", "http://ex/rare", "?o");
        let triples = vec![common.clone(), selective.clone()];
        let ordered = reorder_for_evaluation(triples, &stats, &dictionary);
        assert_eq!(ordered[0], selective);
    }

    #[test]
    fn leapfrog_is_chosen_for_star_patterns_with_a_shared_hub_variable() {
        let triples = vec![
            pattern("?hub", "http://ex/a", "?x"),
            pattern("?hub", "http://ex/b", "?y"),
            pattern("?hub", "http://ex/c", "?z"),
            pattern("?hub", "http://ex/d", "?w"),
        ];
        let strategy = choose_strategy(&triples, 10, 10);
        assert_eq!(strategy, JoinStrategy::Leapfrog);
    }

    #[test]
    fn small_cardinalities_prefer_nested_loop() {
        let triples = vec![pattern("?s", "http://ex/p", "?o")];
        assert_eq!(choose_strategy(&triples, 5, 5), JoinStrategy::NestedLoop);
    }
}
