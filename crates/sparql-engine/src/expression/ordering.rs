//! RDF-term ordering and effective boolean value.

use std::cmp::Ordering;

use sparql_model::{xsd, Literal, NumericValue, Term};

use super::{EvalError, EvalOutcome};

pub(super) fn numeric_of(term: &Term) -> Option<NumericValue> {
    match term {
        Term::Literal(Literal::Typed(lexical, datatype)) => match datatype.as_str() {
            xsd::INTEGER => lexical.parse::<i64>().ok().map(NumericValue::Integer),
            xsd::DECIMAL => lexical.parse::<f64>().ok().map(NumericValue::Decimal),
            xsd::DOUBLE => lexical.parse::<f64>().ok().map(NumericValue::Double),
            _ => None,
        },
        _ => None,
    }
}

/// Orders two terms. Numeric literals compare by value
/// after promotion; simple literals and IRIs compare lexically; anything
/// else is only comparable when exactly equal.
pub fn compare_terms(a: &Term, b: &Term) -> Result<Ordering, EvalOutcome> {
    if let (Some(na), Some(nb)) = (numeric_of(a), numeric_of(b)) {
        return na.partial_cmp(&nb).ok_or_else(|| EvalError::new("numeric comparison with NaN").into());
    }
    match (a, b) {
        (Term::Literal(Literal::Simple(sa)), Term::Literal(Literal::Simple(sb))) => Ok(sa.cmp(sb)),
        (Term::Literal(Literal::LangTagged(sa, la)), Term::Literal(Literal::LangTagged(sb, lb))) if la == lb => {
            Ok(sa.cmp(sb))
        }
        (Term::NamedNode(na), Term::NamedNode(nb)) => Ok(na.as_str().cmp(nb.as_str())),
        _ if a == b => Ok(Ordering::Equal),
        _ => Err(EvalError::new(format!("terms not comparable: {a} vs {b}")).into()),
    }
}

/// Effective boolean value: booleans by value; numerics
/// true iff non-zero and non-NaN; simple literals true iff non-empty;
/// else an error.
pub fn effective_boolean_value(term: &Term) -> Result<bool, EvalOutcome> {
    if let Some(numeric) = numeric_of(term) {
        return Ok(numeric.is_truthy());
    }
    match term {
        Term::Literal(Literal::Typed(lexical, datatype)) if datatype.as_str() == xsd::BOOLEAN => match lexical.as_ref() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(EvalError::new(format!("invalid xsd:boolean lexical: {other}")).into()),
        },
        Term::Literal(Literal::Simple(s)) => Ok(!s.is_empty()),
        Term::Literal(Literal::LangTagged(s, _)) => Ok(!s.is_empty()),
        _ => Err(EvalError::new(format!("no effective boolean value for {term}")).into()),
    }
}
