//! SPARQL Update execution: `INSERT DATA`/`DELETE DATA`
//! materialize ground quads directly; `DELETE WHERE`/`MODIFY` run their
//! `WHERE` clause as a query and instantiate templates per solution.
//!
//! This store has no named-graph partition in the index itself — it
//! keeps a single triple-permutation layout — so every operation
//! is scoped to the default graph; a quad or `CLEAR` target naming another
//! graph is rejected as unsupported rather than silently folded into the
//! default graph.

use sparql_algebra::{GraphPattern, GraphTarget, GraphTerm, QuadPattern, TriplePattern, UpdateOperation};
use sparql_common::{Error as EngineError, ExecutionBudget, Result as EngineResult};
use sparql_model::{GraphName, Quad, Term, Triple};

use crate::config::EngineConfig;
use crate::executor::{self, Store};
use crate::solution::Mapping;

/// Applies `operation` to the store, returning the number of triples
/// inserted or deleted.
pub fn execute(operation: &UpdateOperation, store: Store<'_>, config: &EngineConfig) -> EngineResult<usize> {
    match operation {
        UpdateOperation::InsertData(quads) => insert_ground(quads, store, config),
        UpdateOperation::DeleteData(quads) => delete_ground(quads, store, config),
        UpdateOperation::DeleteWhere(patterns) => {
            let pattern = GraphPattern::Bgp(patterns.iter().cloned().map(QuadPattern::into_triple_pattern).collect());
            let mut budget = ExecutionBudget::new(config.default_timeout, config.max_iterations);
            let solutions = executor::eval(&pattern, &vec![Mapping::new()], store, config, &mut budget)?;
            let instantiated = instantiate_all(patterns, &solutions);
            delete_ground(&instantiated, store, config)
        }
        UpdateOperation::Modify { delete_template, insert_template, pattern } => {
            let mut budget = ExecutionBudget::new(config.default_timeout, config.max_iterations);
            let solutions = executor::eval(pattern, &vec![Mapping::new()], store, config, &mut budget)?;
            let to_delete = instantiate_all(delete_template, &solutions);
            let to_insert = instantiate_all(insert_template, &solutions);
            let deleted = delete_ground(&to_delete, store, config)?;
            let inserted = insert_ground(&to_insert, store, config)?;
            Ok(deleted + inserted)
        }
        UpdateOperation::Clear(target) => clear(target, store),
    }
}

fn insert_ground(quads: &[Quad], store: Store<'_>, config: &EngineConfig) -> EngineResult<usize> {
    check_cap(quads.len(), config)?;
    let mut count = 0;
    for quad in quads {
        require_default_graph(&quad.graph_name)?;
        let (s, p, o) = encode_triple(&quad.triple, store)?;
        if store.index.insert(s, p, o).map_err(storage_error)? {
            count += 1;
        }
    }
    Ok(count)
}

fn delete_ground(quads: &[Quad], store: Store<'_>, config: &EngineConfig) -> EngineResult<usize> {
    check_cap(quads.len(), config)?;
    let mut count = 0;
    for quad in quads {
        require_default_graph(&quad.graph_name)?;
        let s = store.dictionary.get_id(&Term::from(quad.triple.subject().clone()));
        let p = store.dictionary.get_id(&Term::NamedNode(quad.triple.predicate().clone()));
        let o = store.dictionary.get_id(quad.triple.object());
        if s == sparql_storage::TERM_ID_NOT_FOUND || p == sparql_storage::TERM_ID_NOT_FOUND || o == sparql_storage::TERM_ID_NOT_FOUND {
            // Deleting a triple whose terms were never encoded is a no-op.
            continue;
        }
        if store.index.delete(s, p, o).map_err(storage_error)? {
            count += 1;
        }
    }
    Ok(count)
}

fn clear(target: &GraphTarget, store: Store<'_>) -> EngineResult<usize> {
    match target {
        GraphTarget::Default | GraphTarget::All => {
            let all = store.index.lookup(&sparql_storage::Pattern::any()).map_err(storage_error)?;
            let mut count = 0;
            for (s, p, o) in all {
                if store.index.delete(s, p, o).map_err(storage_error)? {
                    count += 1;
                }
            }
            Ok(count)
        }
        GraphTarget::Named(_) | GraphTarget::AllNamed => {
            Err(EngineError::Unsupported("named graphs are not modeled by this store".to_string()))
        }
    }
}

fn require_default_graph(graph: &GraphName) -> EngineResult<()> {
    match graph {
        GraphName::DefaultGraph => Ok(()),
        _ => Err(EngineError::Unsupported("named graphs are not modeled by this store".to_string())),
    }
}

fn check_cap(found: usize, config: &EngineConfig) -> EngineResult<()> {
    if found > config.max_update_triples {
        return Err(EngineError::TooManyTriples { found, limit: config.max_update_triples });
    }
    Ok(())
}

fn encode_triple(triple: &Triple, store: Store<'_>) -> EngineResult<(sparql_storage::TermId, sparql_storage::TermId, sparql_storage::TermId)> {
    let s = store.dictionary.encode(&Term::from(triple.subject().clone())).map_err(storage_error)?.0;
    let p = store.dictionary.encode(&Term::NamedNode(triple.predicate().clone())).map_err(storage_error)?.0;
    let o = store.dictionary.encode(triple.object()).map_err(storage_error)?.0;
    Ok((s, p, o))
}

fn storage_error(e: sparql_storage::StorageError) -> EngineError {
    EngineError::StorageError(e.to_string())
}

/// Instantiates `templates` once per solution in `solutions`, dropping a
/// template position whose variable is unbound in that solution (the
/// resulting quad can never be materialized, so it is skipped rather than
/// erroring the whole update).
fn instantiate_all(templates: &[QuadPattern], solutions: &[Mapping]) -> Vec<Quad> {
    let mut out = Vec::new();
    for mapping in solutions {
        for template in templates {
            if let Some(quad) = instantiate_one(template, mapping) {
                out.push(quad);
            }
        }
    }
    out
}

fn instantiate_one(template: &QuadPattern, mapping: &Mapping) -> Option<Quad> {
    let subject = resolve_term(&template.subject, mapping)?;
    let predicate = match resolve_term(&template.predicate, mapping)? {
        Term::NamedNode(n) => n,
        _ => return None,
    };
    let object = resolve_term(&template.object, mapping)?;
    let graph = match resolve_term(&template.graph, mapping) {
        Some(Term::NamedNode(n)) => GraphName::NamedNode(n),
        Some(Term::BlankNode(b)) => GraphName::BlankNode(b),
        _ => GraphName::DefaultGraph,
    };
    let subject = match subject {
        Term::NamedNode(n) => sparql_model::Subject::NamedNode(n),
        Term::BlankNode(b) => sparql_model::Subject::BlankNode(b),
        Term::Literal(_) => return None,
    };
    Some(Quad::new(Triple::new(subject, predicate, object), graph))
}

fn resolve_term(term: &GraphTerm, mapping: &Mapping) -> Option<Term> {
    match term {
        GraphTerm::Variable(var) => mapping.get(var).cloned(),
        other => other.as_ground_term(),
    }
}

/// The predicates a write touches, for plan-cache invalidation.
#[derive(Debug, PartialEq, Eq)]
pub enum TouchedPredicates {
    /// Nothing to invalidate.
    None,
    /// Exactly these predicates.
    Some(Vec<sparql_model::NamedNode>),
    /// Every predicate, e.g. `CLEAR`, which removes the whole graph.
    All,
}

/// Determines which predicates `operation` touches, so the session can
/// invalidate exactly the cached plans that depend on them.
/// `InsertData`/`DeleteData` read the predicate straight off each ground
/// quad; `DeleteWhere`/`Modify` read it off each template's predicate
/// position when ground, falling back to [`TouchedPredicates::All`] when
/// a template's predicate is itself a variable (so it could touch any
/// predicate at match time).
#[must_use]
pub fn touched_predicates(operation: &UpdateOperation) -> TouchedPredicates {
    match operation {
        UpdateOperation::InsertData(quads) | UpdateOperation::DeleteData(quads) => {
            TouchedPredicates::Some(quads.iter().map(|q| q.triple.predicate().clone()).collect())
        }
        UpdateOperation::Clear(_) => TouchedPredicates::All,
        UpdateOperation::DeleteWhere(patterns) => predicates_from_quad_patterns(patterns),
        UpdateOperation::Modify { delete_template, insert_template, .. } => {
            predicates_from_quad_patterns(&delete_template.iter().chain(insert_template.iter()).cloned().collect::<Vec<_>>())
        }
    }
}

fn predicates_from_quad_patterns(patterns: &[QuadPattern]) -> TouchedPredicates {
    let mut predicates = Vec::new();
    for pattern in patterns {
        match &pattern.predicate {
            GraphTerm::NamedNode(n) => predicates.push(n.clone()),
            _ => return TouchedPredicates::All,
        }
    }
    if predicates.is_empty() {
        TouchedPredicates::None
    } else {
        TouchedPredicates::Some(predicates)
    }
}
