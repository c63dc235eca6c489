//! Evaluates an algebra tree against the store: each node is a function
//! from an incoming partial solution to an outgoing one, seeded by the
//! (usually singleton) solution produced by its parent. This is an
//! index-nested-loop evaluator rather than a pull-based
//! operator pipeline: every leaf joins directly against the incoming
//! multiset, and compound nodes compose by chaining these joins.

mod aggregate;
mod bgp;
mod join;
mod order;
mod path;

use sparql_algebra::GraphPattern;
use sparql_common::{Error as OperationalError, ExecutionBudget, Result as EngineResult};
use sparql_storage::{Dictionary, TripleIndex};

use crate::config::EngineConfig;
use crate::expression::{self, effective_boolean_value, ExistsProbe};
use crate::optimizer::{choose_strategy, JoinStrategy};
use crate::solution::{Mapping, Solution};
use crate::variables::visible_variables;

/// A borrowed handle to the store's two halves, threaded by value through
/// the executor so `RecursiveProbe` doesn't need to name a lifetime-tied
/// reference type of its own.
#[derive(Clone, Copy)]
pub struct Store<'a> {
    /// The triple index's SPO/POS/OSP permutations.
    pub index: &'a TripleIndex,
    /// The term dictionary.
    pub dictionary: &'a Dictionary,
}

/// Evaluates `pattern`, joining every solution in `input` against it.
pub fn eval(pattern: &GraphPattern, input: &Solution, store: Store<'_>, config: &EngineConfig, budget: &mut ExecutionBudget) -> EngineResult<Solution> {
    budget.tick("eval")?;
    match pattern {
        GraphPattern::Bgp(triples) => bgp::eval_bgp(triples, input, store, budget),
        GraphPattern::Path(pp) => path::eval_path(pp, input, store, budget),
        GraphPattern::Join(left, right) => eval_join(left, right, input, store, config, budget),
        GraphPattern::LeftJoin(left, right, filter) => eval_left_join(left, right, filter.as_ref(), input, store, config, budget),
        GraphPattern::Union(left, right) => {
            let mut out = eval(left, input, store, config, budget)?;
            out.extend(eval(right, input, store, config, budget)?);
            Ok(out)
        }
        GraphPattern::Minus(left, right) => eval_minus(left, right, input, store, config, budget),
        GraphPattern::Filter(expr, inner) => eval_filter(expr, inner, input, store, config, budget),
        GraphPattern::Extend(var, expr, inner) => eval_extend(var, expr, inner, input, store, config, budget),
        GraphPattern::Project(vars, inner) => {
            let evaluated = eval(inner, input, store, config, budget)?;
            Ok(evaluated.into_iter().map(|m| m.project(vars)).collect())
        }
        GraphPattern::Distinct(inner) => Ok(order::distinct(eval(inner, input, store, config, budget)?)),
        GraphPattern::Reduced(inner) => Ok(order::reduced(eval(inner, input, store, config, budget)?)),
        GraphPattern::OrderBy(comparators, inner) => {
            let evaluated = eval(inner, input, store, config, budget)?;
            let mut probe = RecursiveProbe { store, config, budget };
            order::order_by(evaluated, comparators, &mut probe, budget)
        }
        GraphPattern::Slice { offset, limit, inner } => Ok(order::slice(eval(inner, input, store, config, budget)?, *offset, *limit)),
        GraphPattern::Group { keys, aggregates, inner } => {
            let evaluated = eval(inner, input, store, config, budget)?;
            aggregate::eval_group(keys, aggregates, evaluated, store, config, budget)
        }
        GraphPattern::Values { variables, rows } => Ok(eval_values(variables, rows, input)),
    }
}

/// `AND`: merges `left` and `right`'s solutions over the same incoming
/// mappings. When both operands are basic graph patterns,
/// [`choose_strategy`] picks the join strategy over their combined
/// triples: a star-shaped combination is handed to `bgp::eval_bgp` whole
/// (so it takes the leapfrog path), a large non-star combination is
/// routed through [`join::hash_join`], and anything else falls back to
/// the chained index-nested-loop join, which is also what every non-Bgp
/// operand pair uses.
fn eval_join(
    left: &GraphPattern,
    right: &GraphPattern,
    input: &Solution,
    store: Store<'_>,
    config: &EngineConfig,
    budget: &mut ExecutionBudget,
) -> EngineResult<Solution> {
    if let (GraphPattern::Bgp(lt), GraphPattern::Bgp(rt)) = (left, right) {
        let combined: Vec<_> = lt.iter().chain(rt.iter()).cloned().collect();
        let card = store.index.total_count();
        match choose_strategy(&combined, card, card) {
            JoinStrategy::Leapfrog => return bgp::eval_bgp(&combined, input, store, budget),
            JoinStrategy::HashJoin => {
                let left_solution = eval(left, input, store, config, budget)?;
                let right_solution = eval(right, input, store, config, budget)?;
                let right_vars = visible_variables(right);
                let shared: Vec<_> = visible_variables(left).into_iter().filter(|v| right_vars.contains(v)).collect();
                return join::hash_join(left_solution, right_solution, &shared, budget);
            }
            JoinStrategy::NestedLoop => {}
        }
    }
    let left_solution = eval(left, input, store, config, budget)?;
    eval(right, &left_solution, store, config, budget)
}

/// `OPTIONAL`: for each outer mapping, joins against `right`'s matches
/// (additionally passing `filter`, if present); a mapping with no
/// compatible, filter-passing match is kept unextended.
fn eval_left_join(
    left: &GraphPattern,
    right: &GraphPattern,
    filter: Option<&sparql_algebra::Expression>,
    input: &Solution,
    store: Store<'_>,
    config: &EngineConfig,
    budget: &mut ExecutionBudget,
) -> EngineResult<Solution> {
    let left_solution = eval(left, input, store, config, budget)?;
    let mut out = Vec::with_capacity(left_solution.len());
    for outer in left_solution {
        let seed = vec![outer.clone()];
        let mut matches = eval(right, &seed, store, config, budget)?;
        if let Some(expr) = filter {
            let mut probe = RecursiveProbe { store, config, budget };
            matches.retain(|m| matches!(expression::evaluate(expr, m, &mut probe).and_then(|t| effective_boolean_value(&t).map_err(Into::into)), Ok(true)));
        }
        if matches.is_empty() {
            out.push(outer);
        } else {
            out.extend(matches);
        }
    }
    Ok(out)
}

/// `MINUS`: drops every outer mapping that shares a variable with, and is
/// compatible with, some mapping produced by `right` evaluated against
/// the same (not chained) incoming solution.
fn eval_minus(
    left: &GraphPattern,
    right: &GraphPattern,
    input: &Solution,
    store: Store<'_>,
    config: &EngineConfig,
    budget: &mut ExecutionBudget,
) -> EngineResult<Solution> {
    let left_solution = eval(left, input, store, config, budget)?;
    let right_solution = eval(right, input, store, config, budget)?;
    Ok(left_solution
        .into_iter()
        .filter(|outer| !right_solution.iter().any(|inner| outer.shares_a_variable_with(inner) && outer.is_compatible_with(inner)))
        .collect())
}

fn eval_filter(
    expr: &sparql_algebra::Expression,
    inner: &GraphPattern,
    input: &Solution,
    store: Store<'_>,
    config: &EngineConfig,
    budget: &mut ExecutionBudget,
) -> EngineResult<Solution> {
    let evaluated = eval(inner, input, store, config, budget)?;
    let mut out = Vec::with_capacity(evaluated.len());
    for mapping in evaluated {
        budget.tick("filter")?;
        let mut probe = RecursiveProbe { store, config, budget };
        let keep = match expression::evaluate(expr, &mapping, &mut probe).and_then(|t| effective_boolean_value(&t).map_err(Into::into)) {
            Ok(b) => b,
            Err(expression::EvalOutcome::Expr(_)) => false,
            Err(expression::EvalOutcome::Operational(e)) => return Err(e),
        };
        if keep {
            out.push(mapping);
        }
    }
    Ok(out)
}

fn eval_extend(
    var: &sparql_model::Variable,
    expr: &sparql_algebra::Expression,
    inner: &GraphPattern,
    input: &Solution,
    store: Store<'_>,
    config: &EngineConfig,
    budget: &mut ExecutionBudget,
) -> EngineResult<Solution> {
    let evaluated = eval(inner, input, store, config, budget)?;
    let mut out = Vec::with_capacity(evaluated.len());
    for mapping in evaluated {
        budget.tick("extend")?;
        let mut probe = RecursiveProbe { store, config, budget };
        match expression::evaluate(expr, &mapping, &mut probe) {
            Ok(term) => out.push(mapping.with_binding(var.clone(), term)),
            Err(expression::EvalOutcome::Expr(_)) => out.push(mapping),
            Err(expression::EvalOutcome::Operational(e)) => return Err(e),
        }
    }
    Ok(out)
}

fn eval_values(variables: &[sparql_model::Variable], rows: &[Vec<Option<sparql_model::Term>>], input: &Solution) -> Solution {
    let mut out = Vec::with_capacity(input.len() * rows.len());
    for outer in input {
        for row in rows {
            let mut candidate = outer.clone();
            let mut compatible = true;
            for (var, cell) in variables.iter().zip(row.iter()) {
                if let Some(term) = cell {
                    match candidate.get(var) {
                        Some(existing) if existing != term => {
                            compatible = false;
                            break;
                        }
                        Some(_) => {}
                        None => candidate.bind(var.clone(), term.clone()),
                    }
                }
            }
            if compatible {
                out.push(candidate);
            }
        }
    }
    out
}

/// Bridges [`ExistsProbe`] to a recursive call into [`eval`], so the
/// expression evaluator can test `EXISTS`/`NOT EXISTS` sub-patterns
/// without depending on the executor's types.
struct RecursiveProbe<'a, 'b> {
    store: Store<'a>,
    config: &'a EngineConfig,
    budget: &'b mut ExecutionBudget,
}

impl ExistsProbe for RecursiveProbe<'_, '_> {
    fn probe(&mut self, pattern: &GraphPattern, outer: &Mapping) -> Result<bool, OperationalError> {
        let seed = vec![outer.clone()];
        let result = eval(pattern, &seed, self.store, self.config, self.budget)?;
        Ok(!result.is_empty())
    }
}
