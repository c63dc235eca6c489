//! Basic graph pattern evaluation: each triple pattern is joined against
//! the store one at a time, seeded by the incoming partial solution
//! (an index-nested-loop join with the seek pushed into the index lookup).
//!
//! A group whose shape trips [`crate::optimizer::find_star_hub`] (≥4
//! patterns sharing one variable in ≥3 of them) instead runs that shared
//! variable through [`leapfrog_intersect`]: one sorted candidate list per
//! pattern, intersected via [`TrieCursor`] rotation rather than probed
//! pattern-by-pattern.

use sparql_algebra::{GraphTerm, TriplePattern};
use sparql_common::{ExecutionBudget, Result as EngineResult};
use sparql_model::Variable;
use sparql_storage::index::leapfrog::leapfrog_intersect;
use sparql_storage::index::trie::TrieCursor;
use sparql_storage::{positions_equal, Pattern, TermId, TriplePosition, TERM_ID_NOT_FOUND};

use super::Store;
use crate::optimizer::find_star_hub;
use crate::solution::{Mapping, Solution};

pub(super) fn eval_bgp(triples: &[TriplePattern], input: &Solution, store: Store<'_>, budget: &mut ExecutionBudget) -> EngineResult<Solution> {
    if let Some(hub) = find_star_hub(triples) {
        let (star, rest): (Vec<TriplePattern>, Vec<TriplePattern>) = triples.iter().cloned().partition(|t| hub_position(t, &hub).is_some());
        let mut star_solutions = Vec::new();
        for mapping in input {
            star_solutions.extend(eval_star_join(&star, &hub, mapping, store, budget)?);
        }
        return eval_chain(&rest, &star_solutions, store, budget);
    }
    eval_chain(triples, input, store, budget)
}

/// The ordinary index-nested-loop fold: each pattern probes the index
/// once per mapping already produced by the previous one.
fn eval_chain(triples: &[TriplePattern], input: &Solution, store: Store<'_>, budget: &mut ExecutionBudget) -> EngineResult<Solution> {
    let mut solutions = input.clone();
    for triple in triples {
        let mut next = Vec::new();
        for mapping in &solutions {
            next.extend(join_one_pattern(triple, mapping, store, budget)?);
        }
        solutions = next;
        if solutions.is_empty() {
            break;
        }
    }
    Ok(solutions)
}

/// Position `hub` occupies in `triple`, or `None` if `triple` doesn't
/// reference it.
fn hub_position(triple: &TriplePattern, hub: &Variable) -> Option<TriplePosition> {
    if matches!(&triple.subject, GraphTerm::Variable(v) if v == hub) {
        Some(TriplePosition::Subject)
    } else if matches!(&triple.predicate, GraphTerm::Variable(v) if v == hub) {
        Some(TriplePosition::Predicate)
    } else if matches!(&triple.object, GraphTerm::Variable(v) if v == hub) {
        Some(TriplePosition::Object)
    } else {
        None
    }
}

/// Joins `star`'s patterns against one incoming `mapping` via a real
/// leapfrog intersection over `hub`, then binds each surviving hub value
/// into `star`'s other positions through the ordinary nested-loop chain.
fn eval_star_join(star: &[TriplePattern], hub: &Variable, mapping: &Mapping, store: Store<'_>, budget: &mut ExecutionBudget) -> EngineResult<Vec<Mapping>> {
    if mapping.is_bound(hub) {
        // Already resolved by an outer scope — nothing to intersect.
        return eval_chain(star, &vec![mapping.clone()], store, budget);
    }

    let mut cursors = Vec::with_capacity(star.len());
    for triple in star {
        let Some(ids) = candidate_hub_values(triple, hub, mapping, store, budget)? else {
            return Ok(Vec::new());
        };
        cursors.push(TrieCursor::from_sorted_distinct(ids, 0));
    }
    let hub_ids = leapfrog_intersect(&mut cursors, || budget.tick("leapfrog"))?;
    for cursor in cursors {
        cursor.close();
    }

    let mut results = Vec::new();
    for hub_id in hub_ids {
        let Some(hub_term) = store.dictionary.decode(hub_id) else { continue };
        let seeded = mapping.clone().with_binding(hub.clone(), hub_term);
        results.extend(eval_chain(star, &vec![seeded], store, budget)?);
    }
    Ok(results)
}

/// The sorted, deduplicated set of term IDs `triple` admits at `hub`'s
/// position, given `mapping`'s other bindings and `triple`'s ground
/// terms — `hub` itself is always treated as unbound here, regardless of
/// `mapping`. Returns `None` when some other position refers to a term
/// absent from the dictionary, meaning `triple` can never match.
fn candidate_hub_values(triple: &TriplePattern, hub: &Variable, mapping: &Mapping, store: Store<'_>, budget: &mut ExecutionBudget) -> EngineResult<Option<Vec<TermId>>> {
    let Some(pos) = hub_position(triple, hub) else {
        return Ok(Some(Vec::new()));
    };
    let Some(pattern) = resolve_pattern_except(triple, hub, mapping, store) else {
        return Ok(None);
    };
    budget.tick("leapfrog-candidates")?;
    let mut ids: Vec<TermId> = store
        .index
        .lookup(&pattern)?
        .into_iter()
        .map(|triple_ids| match pos {
            TriplePosition::Subject => triple_ids.0,
            TriplePosition::Predicate => triple_ids.1,
            TriplePosition::Object => triple_ids.2,
        })
        .collect();
    ids.sort_unstable();
    ids.dedup();
    Ok(Some(ids))
}

/// Like [`resolve_pattern`], but forces `hub`'s position to unbound
/// regardless of whether `mapping` already binds it.
fn resolve_pattern_except(triple: &TriplePattern, hub: &Variable, mapping: &Mapping, store: Store<'_>) -> Option<Pattern> {
    let resolve = |term: &GraphTerm| -> Option<Option<TermId>> {
        if let GraphTerm::Variable(v) = term {
            if v == hub {
                return Some(None);
            }
        }
        resolve_position(term, mapping, store)
    };
    Some(Pattern {
        subject: resolve(&triple.subject)?,
        predicate: resolve(&triple.predicate)?,
        object: resolve(&triple.object)?,
    })
}

fn join_one_pattern(triple: &TriplePattern, mapping: &Mapping, store: Store<'_>, budget: &mut ExecutionBudget) -> EngineResult<Vec<Mapping>> {
    let Some(pattern) = resolve_pattern(triple, mapping, store) else {
        return Ok(Vec::new());
    };
    let mut results = Vec::new();
    for triple_ids in store.index.lookup(&pattern)? {
        budget.tick("bgp-triple")?;
        if let Some(extended) = bind_triple(triple, mapping, store, triple_ids) {
            results.push(extended);
        }
    }
    Ok(results)
}

/// Resolves a triple pattern's three positions to an index [`Pattern`]
/// under the current mapping. Returns `None` when a ground or
/// already-bound position refers to a term absent from the dictionary —
/// such a pattern can never match, without needing an index lookup.
fn resolve_pattern(triple: &TriplePattern, mapping: &Mapping, store: Store<'_>) -> Option<Pattern> {
    Some(Pattern {
        subject: resolve_position(&triple.subject, mapping, store)?,
        predicate: resolve_position(&triple.predicate, mapping, store)?,
        object: resolve_position(&triple.object, mapping, store)?,
    })
}

fn resolve_position(term: &GraphTerm, mapping: &Mapping, store: Store<'_>) -> Option<Option<TermId>> {
    let ground = match term {
        GraphTerm::Variable(var) => match mapping.get(var) {
            Some(bound) => bound.clone(),
            None => return Some(None),
        },
        _ => term.as_ground_term().expect("non-variable pattern position always has a ground term"),
    };
    let id = store.dictionary.get_id(&ground);
    if id == TERM_ID_NOT_FOUND {
        None
    } else {
        Some(Some(id))
    }
}

fn bind_triple(triple: &TriplePattern, mapping: &Mapping, store: Store<'_>, triple_ids: (TermId, TermId, TermId)) -> Option<Mapping> {
    if !positions_consistent(triple, triple_ids) {
        return None;
    }
    let mut extended = mapping.clone();
    let (s, p, o) = triple_ids;
    bind_position(&triple.subject, s, store, &mut extended);
    bind_position(&triple.predicate, p, store, &mut extended);
    bind_position(&triple.object, o, store, &mut extended);
    Some(extended)
}

fn bind_position(term: &GraphTerm, id: TermId, store: Store<'_>, mapping: &mut Mapping) {
    if let GraphTerm::Variable(var) = term {
        if !mapping.is_bound(var) {
            if let Some(decoded) = store.dictionary.decode(id) {
                mapping.bind(var.clone(), decoded);
            }
        }
    }
}

/// Enforces the same-variable-twice constraint (e.g. `?x p ?x` only
/// matches self-loops): any pattern position sharing a variable name with
/// another must resolve to the same term ID.
fn positions_consistent(triple: &TriplePattern, triple_ids: (TermId, TermId, TermId)) -> bool {
    let slots = [
        (&triple.subject, TriplePosition::Subject),
        (&triple.predicate, TriplePosition::Predicate),
        (&triple.object, TriplePosition::Object),
    ];
    for i in 0..slots.len() {
        for j in (i + 1)..slots.len() {
            if let (GraphTerm::Variable(a), GraphTerm::Variable(b)) = (slots[i].0, slots[j].0) {
                if a == b && !positions_equal(triple_ids, slots[i].1, slots[j].1) {
                    return false;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_model::{NamedNode, Term, Variable};
    use sparql_storage::Dictionary;
    use sparql_storage::TripleIndex;

    fn store_with(triples: &[(&str, &str, &str)]) -> (TripleIndex, Dictionary) {
        let index = TripleIndex::new();
        let dictionary = Dictionary::new();
        for (s, p, o) in triples {
            let sid = dictionary.encode(&Term::iri(*s)).unwrap().0;
            let pid = dictionary.encode(&Term::iri(*p)).unwrap().0;
            let oid = dictionary.encode(&Term::iri(*o)).unwrap().0;
            index.insert(sid, pid, oid).unwrap();
        }
        (index, dictionary)
    }

    #[test]
    fn single_pattern_binds_object_variable() {
        let (index, dictionary) = store_with(&[("http://ex/a", "http://ex/p", "http://ex/b")]);
        let store = Store { index: &index, dictionary: &dictionary };
        let pattern = TriplePattern::new(
            GraphTerm::NamedNode(NamedNode::new("http://ex/a")),
            GraphTerm::NamedNode(NamedNode::new("http://ex/p")),
            GraphTerm::Variable(Variable::new("o")),
        );
        let mut budget = ExecutionBudget::unbounded();
        let result = eval_bgp(&[pattern], &vec![Mapping::new()], store, &mut budget).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].get(&Variable::new("o")), Some(&Term::iri("http://ex/b")));
    }

    #[test]
    fn same_variable_twice_requires_self_loop() {
        let (index, dictionary) = store_with(&[("http://ex/a", "http://ex/p", "http://ex/b")]);
        let store = Store { index: &index, dictionary: &dictionary };
        let pattern = TriplePattern::new(
            GraphTerm::Variable(Variable::new("x")),
            GraphTerm::NamedNode(NamedNode::new("http://ex/p")),
            GraphTerm::Variable(Variable::new("x")),
        );
        let mut budget = ExecutionBudget::unbounded();
        let result = eval_bgp(&[pattern], &vec![Mapping::new()], store, &mut budget).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn star_join_runs_through_leapfrog_and_agrees_with_the_chained_join() {
        let mut triples_data = vec![("http://ex/hub", "http://ex/a", "http://ex/a-val"), ("http://ex/hub", "http://ex/b", "http://ex/b-val"), ("http://ex/hub", "http://ex/c", "http://ex/c-val"), ("http://ex/hub", "http://ex/d", "http://ex/d-val")];
        for i in 0..20 {
            triples_data.push(("http://ex/decoy", "http://ex/a", "http://ex/a-val"));
            let _ = i;
        }
        let (index, dictionary) = store_with(&triples_data);
        let store = Store { index: &index, dictionary: &dictionary };
        let pattern = vec![
            TriplePattern::new(GraphTerm::Variable(Variable::new("x")), GraphTerm::NamedNode(NamedNode::new("http://ex/a")), GraphTerm::Variable(Variable::new("a"))),
            TriplePattern::new(GraphTerm::Variable(Variable::new("x")), GraphTerm::NamedNode(NamedNode::new("http://ex/b")), GraphTerm::Variable(Variable::new("b"))),
            TriplePattern::new(GraphTerm::Variable(Variable::new("x")), GraphTerm::NamedNode(NamedNode::new("http://ex/c")), GraphTerm::Variable(Variable::new("c"))),
            TriplePattern::new(GraphTerm::Variable(Variable::new("x")), GraphTerm::NamedNode(NamedNode::new("http://ex/d")), GraphTerm::Variable(Variable::new("d"))),
        ];
        assert!(crate::optimizer::find_star_hub(&pattern).is_some());

        let mut budget = ExecutionBudget::unbounded();
        let result = eval_bgp(&pattern, &vec![Mapping::new()], store, &mut budget).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].get(&Variable::new("x")), Some(&Term::iri("http://ex/hub")));
        assert_eq!(result[0].get(&Variable::new("a")), Some(&Term::iri("http://ex/a-val")));

        let chained = eval_chain(&pattern, &vec![Mapping::new()], store, &mut budget).unwrap();
        assert_eq!(result, chained);
    }

    #[test]
    fn unresolvable_ground_term_yields_no_matches_without_lookup() {
        let (index, dictionary) = store_with(&[("http://ex/a", "http://ex/p", "http://ex/b")]);
        let store = Store { index: &index, dictionary: &dictionary };
        let pattern = TriplePattern::new(
            GraphTerm::NamedNode(NamedNode::new("http://ex/never-seen")),
            GraphTerm::Variable(Variable::new("p")),
            GraphTerm::Variable(Variable::new("o")),
        );
        let mut budget = ExecutionBudget::unbounded();
        let result = eval_bgp(&[pattern], &vec![Mapping::new()], store, &mut budget).unwrap();
        assert!(result.is_empty());
    }
}
