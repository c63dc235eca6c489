//! `GROUP BY` and aggregate evaluation.

use sparql_algebra::{AggregateExpression, Expression, GraphTerm};
use sparql_common::hash::FastHashSet;
use sparql_common::{Error as OperationalError, ExecutionBudget, Result as EngineResult};
use sparql_model::{NumericValue, Term, Variable};

use super::Store;
use crate::config::EngineConfig;
use crate::expression::{self, NoExistsProbe};
use crate::solution::{Mapping, Solution};

/// Groups `solution` by `keys` and binds one result mapping per group,
/// containing the group's key bindings plus each aggregate's result
/// variable. A solution with no `GROUP BY` keys but at least one
/// aggregate still produces exactly one group (spanning the whole
/// solution, possibly empty).
pub(super) fn eval_group(
    keys: &[Expression],
    aggregates: &[(Variable, AggregateExpression)],
    solution: Solution,
    store: Store<'_>,
    _config: &EngineConfig,
    budget: &mut ExecutionBudget,
) -> EngineResult<Solution> {
    let mut groups: Vec<(Vec<Option<Term>>, Mapping, Vec<Mapping>)> = Vec::new();
    for mapping in solution {
        budget.tick("group-key")?;
        let key: Vec<Option<Term>> = keys.iter().map(|expr| expression::evaluate(expr, &mapping, &mut NoExistsProbe).ok()).collect();
        let key_bindings = group_key_bindings(keys, &key);
        match groups.iter_mut().find(|(existing, _, _)| existing == &key) {
            Some((_, _, members)) => members.push(mapping),
            None => groups.push((key, key_bindings, vec![mapping])),
        }
    }
    if groups.is_empty() && !keys.is_empty() {
        return Ok(Vec::new());
    }
    if groups.is_empty() {
        // No GROUP BY keys and an empty solution still yields one
        // (empty-group) result row, e.g. `SELECT (COUNT(*) AS ?n) {}`.
        groups.push((Vec::new(), Mapping::new(), Vec::new()));
    }
    let mut out = Vec::with_capacity(groups.len());
    for (_, key_bindings, members) in &groups {
        budget.tick("group-aggregate")?;
        let mut result = key_bindings.clone();
        for (var, agg) in aggregates {
            match eval_aggregate(agg, members, store, budget)? {
                Some(term) => result.bind(var.clone(), term),
                None => {}
            }
        }
        out.push(result);
    }
    Ok(out)
}

/// Binds each `GROUP BY` key that is a bare variable reference to its
/// evaluated value; non-variable key expressions (e.g. `GROUP BY (?x+1)`)
/// are not separately nameable without a `BIND`-introduced alias, so they
/// only affect grouping, not the result row's bindings.
fn group_key_bindings(keys: &[Expression], values: &[Option<Term>]) -> Mapping {
    let mut mapping = Mapping::new();
    for (expr, value) in keys.iter().zip(values.iter()) {
        if let (Expression::Term(GraphTerm::Variable(var)), Some(term)) = (expr, value) {
            mapping.bind(var.clone(), term.clone());
        }
    }
    mapping
}

fn eval_aggregate(agg: &AggregateExpression, members: &[Mapping], store: Store<'_>, budget: &mut ExecutionBudget) -> EngineResult<Option<Term>> {
    let _ = store;
    match agg {
        AggregateExpression::CountAll => Ok(Some(integer_term(members.len() as i64))),
        AggregateExpression::Count { expr, distinct } => {
            let values = evaluated_values(expr, members, budget)?;
            let count = if *distinct { distinct_count(&values) } else { values.len() };
            Ok(Some(integer_term(count as i64)))
        }
        AggregateExpression::Sum { expr, distinct } => {
            let values = evaluated_values(expr, members, budget)?;
            let values = if *distinct { dedup_terms(values) } else { values };
            let sum = values
                .iter()
                .filter_map(expression::numeric_value_of)
                .fold(NumericValue::Integer(0), |acc, v| acc.add(v));
            Ok(Some(expression::numeric_term(sum)))
        }
        AggregateExpression::Avg { expr, distinct } => {
            let values = evaluated_values(expr, members, budget)?;
            let values = if *distinct { dedup_terms(values) } else { values };
            let numerics: Vec<NumericValue> = values.iter().filter_map(expression::numeric_value_of).collect();
            if numerics.is_empty() {
                return Ok(Some(integer_term(0)));
            }
            let sum = numerics.iter().fold(NumericValue::Integer(0), |acc, v| acc.add(*v));
            let avg = sum.div(NumericValue::Integer(numerics.len() as i64)).unwrap_or(NumericValue::Integer(0));
            Ok(Some(expression::numeric_term(avg)))
        }
        AggregateExpression::Min(expr) => {
            let values = evaluated_values(expr, members, budget)?;
            require_nonempty_group(agg, &values)?;
            Ok(values.into_iter().min_by(|a, b| expression::compare_terms(a, b).unwrap_or(std::cmp::Ordering::Equal)))
        }
        AggregateExpression::Max(expr) => {
            let values = evaluated_values(expr, members, budget)?;
            require_nonempty_group(agg, &values)?;
            Ok(values.into_iter().max_by(|a, b| expression::compare_terms(a, b).unwrap_or(std::cmp::Ordering::Equal)))
        }
        AggregateExpression::Sample(expr) => {
            let values = evaluated_values(expr, members, budget)?;
            require_nonempty_group(agg, &values)?;
            Ok(values.into_iter().next())
        }
        AggregateExpression::GroupConcat { expr, distinct, separator } => {
            let values = evaluated_values(expr, members, budget)?;
            let values = if *distinct { dedup_terms(values) } else { values };
            let sep = separator.as_deref().unwrap_or(" ");
            let joined = values.iter().map(expression::term_lexical).collect::<Vec<_>>().join(sep);
            Ok(Some(Term::typed_literal(joined, sparql_model::xsd::STRING)))
        }
    }
}

/// Enforces `AggregateExpression::errors_on_empty_group`: MIN/MAX/SAMPLE
/// over a group with no evaluated values is an operational error rather
/// than an unbound result, since there's no absorption point (unlike
/// FILTER/BIND) for an empty-group aggregate to fall back to.
fn require_nonempty_group(agg: &AggregateExpression, values: &[Term]) -> EngineResult<()> {
    if agg.errors_on_empty_group() && values.is_empty() {
        return Err(OperationalError::EvaluationError(format!("{agg:?} over an empty group")));
    }
    Ok(())
}

fn evaluated_values(expr: &Expression, members: &[Mapping], budget: &mut ExecutionBudget) -> EngineResult<Vec<Term>> {
    let mut values = Vec::with_capacity(members.len());
    for mapping in members {
        budget.tick("aggregate-member")?;
        if let Ok(term) = expression::evaluate(expr, mapping, &mut NoExistsProbe) {
            values.push(term);
        }
    }
    Ok(values)
}

fn dedup_terms(values: Vec<Term>) -> Vec<Term> {
    let mut seen = FastHashSet::default();
    values.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

fn distinct_count(values: &[Term]) -> usize {
    let mut seen = FastHashSet::default();
    values.iter().filter(|t| seen.insert((*t).clone())).count()
}

fn integer_term(value: i64) -> Term {
    Term::typed_literal(value.to_string(), sparql_model::xsd::INTEGER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_model::Variable;
    use sparql_storage::{Dictionary, TripleIndex};

    fn mapping(x: i64) -> Mapping {
        let mut m = Mapping::new();
        m.bind(Variable::new("x"), Term::typed_literal(x.to_string(), sparql_model::xsd::INTEGER));
        m
    }

    #[test]
    fn count_all_counts_every_member() {
        let index = TripleIndex::new();
        let dictionary = Dictionary::new();
        let store = Store { index: &index, dictionary: &dictionary };
        let mut budget = ExecutionBudget::unbounded();
        let members = vec![mapping(1), mapping(2), mapping(3)];
        let result = eval_aggregate(&AggregateExpression::CountAll, &members, store, &mut budget).unwrap();
        assert_eq!(result, Some(Term::typed_literal("3", sparql_model::xsd::INTEGER)));
    }

    #[test]
    fn sum_adds_numeric_values() {
        let index = TripleIndex::new();
        let dictionary = Dictionary::new();
        let store = Store { index: &index, dictionary: &dictionary };
        let mut budget = ExecutionBudget::unbounded();
        let members = vec![mapping(1), mapping(2), mapping(3)];
        let agg = AggregateExpression::Sum { expr: Box::new(Expression::variable("x")), distinct: false };
        let result = eval_aggregate(&agg, &members, store, &mut budget).unwrap();
        assert_eq!(result, Some(Term::typed_literal("6", sparql_model::xsd::INTEGER)));
    }

    #[test]
    fn min_max_sample_over_empty_group_is_an_error() {
        let index = TripleIndex::new();
        let dictionary = Dictionary::new();
        let store = Store { index: &index, dictionary: &dictionary };
        let mut budget = ExecutionBudget::unbounded();
        for agg in [
            AggregateExpression::Min(Box::new(Expression::variable("x"))),
            AggregateExpression::Max(Box::new(Expression::variable("x"))),
            AggregateExpression::Sample(Box::new(Expression::variable("x"))),
        ] {
            assert!(eval_aggregate(&agg, &[], store, &mut budget).is_err());
        }
    }

    #[test]
    fn sum_over_empty_group_is_zero_not_an_error() {
        let index = TripleIndex::new();
        let dictionary = Dictionary::new();
        let store = Store { index: &index, dictionary: &dictionary };
        let mut budget = ExecutionBudget::unbounded();
        let agg = AggregateExpression::Sum { expr: Box::new(Expression::variable("x")), distinct: false };
        let result = eval_aggregate(&agg, &[], store, &mut budget).unwrap();
        assert_eq!(result, Some(Term::typed_literal("0", sparql_model::xsd::INTEGER)));
    }

    #[test]
    fn group_by_splits_solution_into_one_row_per_key() {
        let index = TripleIndex::new();
        let dictionary = Dictionary::new();
        let store = Store { index: &index, dictionary: &dictionary };
        let config = EngineConfig::new();
        let mut budget = ExecutionBudget::unbounded();
        let solution = vec![mapping(1), mapping(1), mapping(2)];
        let keys = vec![Expression::variable("x")];
        let aggregates = vec![(Variable::new("n"), AggregateExpression::CountAll)];
        let result = eval_group(&keys, &aggregates, solution, store, &config, &mut budget).unwrap();
        assert_eq!(result.len(), 2);
        let total: i64 = result
            .iter()
            .map(|m| match m.get(&Variable::new("n")) {
                Some(Term::Literal(l)) => l.lexical().parse::<i64>().unwrap(),
                _ => 0,
            })
            .sum();
        assert_eq!(total, 3);
    }
}
