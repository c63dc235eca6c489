//! The expression evaluator: walks an [`Expression`] tree
//! against one [`Mapping`], producing an RDF term or an expression error.
//!
//! Expression errors are a distinct class from operational errors:
//! this module's own [`EvalError`] never becomes a
//! [`sparql_common::Error`] except when an `EXISTS`/`NOT EXISTS` subquery
//! hits an operational failure (timeout, storage fault) while being
//! probed, which genuinely must abort the query.

mod builtins;
mod ordering;
mod redos;

pub use ordering::{compare_terms, effective_boolean_value};
pub use redos::is_safe_pattern;

use std::fmt;

use sparql_algebra::{BuiltInFunction, Expression, GraphPattern};
use sparql_common::Error as OperationalError;
use sparql_model::{NumericValue, Term, Variable};

use crate::solution::Mapping;

/// An error local to one expression evaluation: absorbed by the caller
/// (FILTER=false, BIND=unbound, aggregate-skip), never surfaced to the
/// query caller directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError(pub String);

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evaluation error: {}", self.0)
    }
}

impl std::error::Error for EvalError {}

impl EvalError {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Either class of failure an expression evaluation can surface.
#[derive(Debug, Clone)]
pub enum EvalOutcome {
    /// A local expression error.
    Expr(EvalError),
    /// An operational error from probing an `EXISTS` subquery.
    Operational(OperationalError),
}

impl From<EvalError> for EvalOutcome {
    fn from(value: EvalError) -> Self {
        EvalOutcome::Expr(value)
    }
}

impl From<OperationalError> for EvalOutcome {
    fn from(value: OperationalError) -> Self {
        EvalOutcome::Operational(value)
    }
}

/// Result of evaluating an expression or sub-step: a local failure drops
/// the enclosing mapping, an operational failure aborts the query.
pub type EvalResult<T> = Result<T, EvalOutcome>;

/// Callback the executor supplies so `EXISTS`/`NOT EXISTS` can probe a
/// sub-pattern without this module depending on the executor's types.
pub trait ExistsProbe {
    /// Returns whether `pattern`, evaluated with `outer` merged into every
    /// inner solution, yields at least one mapping.
    fn probe(&mut self, pattern: &GraphPattern, outer: &Mapping) -> Result<bool, OperationalError>;
}

/// Evaluates `expr` against `mapping`.
pub fn evaluate(expr: &Expression, mapping: &Mapping, probe: &mut dyn ExistsProbe) -> EvalResult<Term> {
    match expr {
        Expression::Term(term) => match term {
            sparql_algebra::GraphTerm::Variable(var) => {
                mapping.get(var).cloned().ok_or_else(|| EvalError::new(format!("unbound variable {var}")).into())
            }
            sparql_algebra::GraphTerm::NamedNode(n) => Ok(Term::NamedNode(n.clone())),
            sparql_algebra::GraphTerm::BlankNode(b) => Ok(Term::BlankNode(b.clone())),
            sparql_algebra::GraphTerm::Literal(l) => Ok(Term::Literal(l.clone())),
        },
        Expression::Numeric(n) => Ok(builtins::numeric_to_term(*n)),
        Expression::Add(l, r) => builtins::arithmetic(evaluate(l, mapping, probe)?, evaluate(r, mapping, probe)?, NumericValue::add),
        Expression::Subtract(l, r) => builtins::arithmetic(evaluate(l, mapping, probe)?, evaluate(r, mapping, probe)?, NumericValue::sub),
        Expression::Multiply(l, r) => builtins::arithmetic(evaluate(l, mapping, probe)?, evaluate(r, mapping, probe)?, NumericValue::mul),
        Expression::Divide(l, r) => {
            let lv = builtins::require_numeric(&evaluate(l, mapping, probe)?)?;
            let rv = builtins::require_numeric(&evaluate(r, mapping, probe)?)?;
            lv.div(rv).map(builtins::numeric_to_term).ok_or_else(|| EvalError::new("division by zero").into())
        }
        Expression::UnaryMinus(inner) => {
            let v = builtins::require_numeric(&evaluate(inner, mapping, probe)?)?;
            Ok(builtins::numeric_to_term(NumericValue::Integer(0).sub(v)))
        }
        Expression::UnaryPlus(inner) => evaluate(inner, mapping, probe),
        Expression::Not(inner) => {
            let b = effective_boolean_value(&evaluate(inner, mapping, probe)?)?;
            Ok(builtins::bool_term(!b))
        }
        Expression::And(l, r) => {
            let left = evaluate(l, mapping, probe).and_then(|t| effective_boolean_value(&t));
            match left {
                Ok(false) => Ok(builtins::bool_term(false)),
                Ok(true) => {
                    let right = effective_boolean_value(&evaluate(r, mapping, probe)?)?;
                    Ok(builtins::bool_term(right))
                }
                Err(e) => {
                    // Short-circuit: AND is false if either side is false,
                    // even if the other side errors.
                    if let Ok(false) = evaluate(r, mapping, probe).and_then(|t| effective_boolean_value(&t)) {
                        Ok(builtins::bool_term(false))
                    } else {
                        Err(e)
                    }
                }
            }
        }
        Expression::Or(l, r) => {
            let left = evaluate(l, mapping, probe).and_then(|t| effective_boolean_value(&t));
            match left {
                Ok(true) => Ok(builtins::bool_term(true)),
                Ok(false) => {
                    let right = effective_boolean_value(&evaluate(r, mapping, probe)?)?;
                    Ok(builtins::bool_term(right))
                }
                Err(e) => {
                    if let Ok(true) = evaluate(r, mapping, probe).and_then(|t| effective_boolean_value(&t)) {
                        Ok(builtins::bool_term(true))
                    } else {
                        Err(e)
                    }
                }
            }
        }
        Expression::Equal(l, r) => {
            let ord = compare_terms(&evaluate(l, mapping, probe)?, &evaluate(r, mapping, probe)?)?;
            Ok(builtins::bool_term(ord == std::cmp::Ordering::Equal))
        }
        Expression::Less(l, r) => {
            let ord = compare_terms(&evaluate(l, mapping, probe)?, &evaluate(r, mapping, probe)?)?;
            Ok(builtins::bool_term(ord == std::cmp::Ordering::Less))
        }
        Expression::LessOrEqual(l, r) => {
            let ord = compare_terms(&evaluate(l, mapping, probe)?, &evaluate(r, mapping, probe)?)?;
            Ok(builtins::bool_term(ord != std::cmp::Ordering::Greater))
        }
        Expression::Greater(l, r) => {
            let ord = compare_terms(&evaluate(l, mapping, probe)?, &evaluate(r, mapping, probe)?)?;
            Ok(builtins::bool_term(ord == std::cmp::Ordering::Greater))
        }
        Expression::GreaterOrEqual(l, r) => {
            let ord = compare_terms(&evaluate(l, mapping, probe)?, &evaluate(r, mapping, probe)?)?;
            Ok(builtins::bool_term(ord != std::cmp::Ordering::Less))
        }
        Expression::Bound(var) => Ok(builtins::bool_term(mapping.is_bound(var))),
        Expression::If(cond, then, otherwise) => {
            if effective_boolean_value(&evaluate(cond, mapping, probe)?)? {
                evaluate(then, mapping, probe)
            } else {
                evaluate(otherwise, mapping, probe)
            }
        }
        Expression::Coalesce(args) => {
            for arg in args {
                if let Ok(term) = evaluate(arg, mapping, probe) {
                    return Ok(term);
                }
            }
            Err(EvalError::new("COALESCE: all arguments errored").into())
        }
        Expression::In { needle, haystack, negated } => {
            let needle_term = evaluate(needle, mapping, probe)?;
            let mut found = false;
            for candidate in haystack {
                if let Ok(t) = evaluate(candidate, mapping, probe) {
                    if compare_terms(&needle_term, &t).map(|o| o == std::cmp::Ordering::Equal).unwrap_or(false) {
                        found = true;
                        break;
                    }
                }
            }
            Ok(builtins::bool_term(found != *negated))
        }
        Expression::FunctionCall(function, args) => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg, mapping, probe)?);
            }
            builtins::call(*function, &values)
        }
        Expression::Exists { pattern, negated } => {
            let found = probe.probe(pattern, mapping).map_err(EvalOutcome::Operational)?;
            Ok(builtins::bool_term(found != *negated))
        }
    }
}

/// The string form of a term, for `GROUP_CONCAT`-style coercions outside
/// this module.
#[must_use]
pub(crate) fn term_lexical(term: &Term) -> String {
    builtins::str_value(term)
}

/// A term's numeric value, if it has one, for aggregate accumulation
/// outside this module.
#[must_use]
pub(crate) fn numeric_value_of(term: &Term) -> Option<NumericValue> {
    ordering::numeric_of(term)
}

/// Encodes a numeric value back to its canonical term form, for aggregate
/// results outside this module.
#[must_use]
pub(crate) fn numeric_term(value: NumericValue) -> Term {
    builtins::numeric_to_term(value)
}

/// A no-op [`ExistsProbe`] for contexts that are statically known never to
/// contain `EXISTS` (e.g. evaluating a `VALUES` row), avoiding the need to
/// thread a real executor callback through.
pub struct NoExistsProbe;

impl ExistsProbe for NoExistsProbe {
    fn probe(&mut self, _pattern: &GraphPattern, _outer: &Mapping) -> Result<bool, OperationalError> {
        Err(OperationalError::Unsupported("EXISTS not available in this context".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_model::xsd;

    fn term_expr(term: Term) -> Expression {
        Expression::Term(sparql_algebra::GraphTerm::from(term))
    }

    #[test]
    fn arithmetic_promotes_across_mixed_numerics() {
        let expr = Expression::Add(
            Box::new(term_expr(Term::typed_literal("2", xsd::INTEGER))),
            Box::new(term_expr(Term::typed_literal("0.5", xsd::DECIMAL))),
        );
        let result = evaluate(&expr, &Mapping::new(), &mut NoExistsProbe).unwrap();
        assert_eq!(result, Term::typed_literal("2.5", xsd::DECIMAL));
    }

    #[test]
    fn division_by_zero_is_an_expression_error() {
        let expr = Expression::Divide(
            Box::new(term_expr(Term::typed_literal("1", xsd::INTEGER))),
            Box::new(term_expr(Term::typed_literal("0", xsd::INTEGER))),
        );
        let result = evaluate(&expr, &Mapping::new(), &mut NoExistsProbe);
        assert!(matches!(result, Err(EvalOutcome::Expr(_))));
    }

    #[test]
    fn bound_reflects_mapping_membership() {
        let mut mapping = Mapping::new();
        mapping.bind(Variable::new("x"), Term::iri("http://example.org/a"));
        let bound = evaluate(&Expression::Bound(Variable::new("x")), &mapping, &mut NoExistsProbe).unwrap();
        let unbound = evaluate(&Expression::Bound(Variable::new("y")), &mapping, &mut NoExistsProbe).unwrap();
        assert_eq!(bound, Term::typed_literal("true", xsd::BOOLEAN));
        assert_eq!(unbound, Term::typed_literal("false", xsd::BOOLEAN));
    }

    #[test]
    fn unbound_variable_is_an_expression_error_not_operational() {
        let result = evaluate(&Expression::variable("missing"), &Mapping::new(), &mut NoExistsProbe);
        assert!(matches!(result, Err(EvalOutcome::Expr(_))));
    }
}
