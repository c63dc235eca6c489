//! Property path pattern evaluation, seeded by an incoming partial solution.

use sparql_algebra::{GraphTerm, PathPattern};
use sparql_common::hash::FastHashSet;
use sparql_common::{ExecutionBudget, Result as EngineResult};
use sparql_storage::{TermId, TERM_ID_NOT_FOUND};

use super::Store;
use crate::path::PathEvaluator;
use crate::solution::{Mapping, Solution};

enum Resolved {
    Ground(TermId),
    Unbound,
    NoMatch,
}

fn resolve(term: &GraphTerm, mapping: &Mapping, store: Store<'_>) -> Resolved {
    let ground = match term {
        GraphTerm::Variable(var) => match mapping.get(var) {
            Some(bound) => bound.clone(),
            None => return Resolved::Unbound,
        },
        _ => term.as_ground_term().expect("non-variable pattern position always has a ground term"),
    };
    match store.dictionary.get_id(&ground) {
        TERM_ID_NOT_FOUND => Resolved::NoMatch,
        id => Resolved::Ground(id),
    }
}

pub(super) fn eval_path(pp: &PathPattern, input: &Solution, store: Store<'_>, budget: &mut ExecutionBudget) -> EngineResult<Solution> {
    let evaluator = PathEvaluator::new(store.index, store.dictionary);
    let mut out = Vec::new();
    for mapping in input {
        out.extend(eval_one(pp, mapping, store, &evaluator, budget)?);
    }
    Ok(out)
}

fn eval_one(
    pp: &PathPattern,
    mapping: &Mapping,
    store: Store<'_>,
    evaluator: &PathEvaluator<'_>,
    budget: &mut ExecutionBudget,
) -> EngineResult<Vec<Mapping>> {
    match (resolve(&pp.subject, mapping, store), resolve(&pp.object, mapping, store)) {
        (Resolved::NoMatch, _) | (_, Resolved::NoMatch) => Ok(Vec::new()),
        (Resolved::Ground(s), Resolved::Ground(o)) => {
            if evaluator.connected(s, o, &pp.path, budget)? {
                Ok(vec![mapping.clone()])
            } else {
                Ok(Vec::new())
            }
        }
        (Resolved::Ground(s), Resolved::Unbound) => {
            let objects = evaluator.objects_from(s, &pp.path, budget)?;
            Ok(bind_many(&pp.object, objects, mapping, store))
        }
        (Resolved::Unbound, Resolved::Ground(o)) => {
            let subjects = evaluator.subjects_to(o, &pp.path, budget)?;
            Ok(bind_many(&pp.subject, subjects, mapping, store))
        }
        (Resolved::Unbound, Resolved::Unbound) => {
            let pairs = evaluator.all_pairs(&pp.path, budget)?;
            Ok(pairs.into_iter().filter_map(|(s, o)| bind_pair(&pp.subject, &pp.object, s, o, mapping, store)).collect())
        }
    }
}

fn bind_many(term: &GraphTerm, ids: FastHashSet<TermId>, mapping: &Mapping, store: Store<'_>) -> Vec<Mapping> {
    let GraphTerm::Variable(var) = term else {
        unreachable!("bind_many is only called for a position that resolved to Unbound, i.e. a variable")
    };
    ids.into_iter().filter_map(|id| store.dictionary.decode(id).map(|term| mapping.clone().with_binding(var.clone(), term))).collect()
}

fn bind_pair(subject_term: &GraphTerm, object_term: &GraphTerm, s: TermId, o: TermId, mapping: &Mapping, store: Store<'_>) -> Option<Mapping> {
    let mut extended = mapping.clone();
    if let GraphTerm::Variable(var) = subject_term {
        extended.bind(var.clone(), store.dictionary.decode(s)?);
    }
    if let GraphTerm::Variable(var) = object_term {
        extended.bind(var.clone(), store.dictionary.decode(o)?);
    }
    Some(extended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_algebra::PropertyPath;
    use sparql_model::{NamedNode, Term, Variable};
    use sparql_storage::{Dictionary, TripleIndex};

    #[test]
    fn forward_link_binds_unbound_object() {
        let index = TripleIndex::new();
        let dictionary = Dictionary::new();
        let a = dictionary.encode(&Term::iri("http://ex/a")).unwrap().0;
        let b = dictionary.encode(&Term::iri("http://ex/b")).unwrap().0;
        let p = dictionary.encode(&Term::iri("http://ex/p")).unwrap().0;
        index.insert(a, p, b).unwrap();

        let store = Store { index: &index, dictionary: &dictionary };
        let pattern = PathPattern::new(
            GraphTerm::NamedNode(NamedNode::new("http://ex/a")),
            PropertyPath::Link(NamedNode::new("http://ex/p")),
            GraphTerm::Variable(Variable::new("o")),
        );
        let mut budget = ExecutionBudget::unbounded();
        let result = eval_path(&pattern, &vec![Mapping::new()], store, &mut budget).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].get(&Variable::new("o")), Some(&Term::iri("http://ex/b")));
    }

    #[test]
    fn both_ground_endpoints_is_a_boolean_test() {
        let index = TripleIndex::new();
        let dictionary = Dictionary::new();
        let a = dictionary.encode(&Term::iri("http://ex/a")).unwrap().0;
        let b = dictionary.encode(&Term::iri("http://ex/b")).unwrap().0;
        let p = dictionary.encode(&Term::iri("http://ex/p")).unwrap().0;
        index.insert(a, p, b).unwrap();

        let store = Store { index: &index, dictionary: &dictionary };
        let pattern = PathPattern::new(
            GraphTerm::NamedNode(NamedNode::new("http://ex/a")),
            PropertyPath::Link(NamedNode::new("http://ex/p")),
            GraphTerm::NamedNode(NamedNode::new("http://ex/never-linked")),
        );
        let mut budget = ExecutionBudget::unbounded();
        let result = eval_path(&pattern, &vec![Mapping::new()], store, &mut budget).unwrap();
        assert!(result.is_empty());
    }
}
