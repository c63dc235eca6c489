//! `DISTINCT`, `REDUCED`, `ORDER BY`, and `OFFSET`/`LIMIT`.

use std::cmp::Ordering;

use sparql_algebra::OrderComparator;
use sparql_common::hash::FastHashSet;
use sparql_common::{ExecutionBudget, Result as EngineResult};
use sparql_model::{Term, Variable};

use crate::expression::{self, compare_terms, ExistsProbe};
use crate::solution::{Mapping, Solution};

fn canonical_key(mapping: &Mapping) -> Vec<(Variable, Term)> {
    let mut pairs: Vec<(Variable, Term)> = mapping.iter().map(|(v, t)| (v.clone(), t.clone())).collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

/// Drops exact-duplicate mappings, keeping the first occurrence.
pub(super) fn distinct(solution: Solution) -> Solution {
    let mut seen = FastHashSet::default();
    solution.into_iter().filter(|mapping| seen.insert(canonical_key(mapping))).collect()
}

/// Drops only consecutive duplicates: a cheaper, spec-legal relaxation of
/// `DISTINCT` — `REDUCED` never guarantees full deduplication.
pub(super) fn reduced(solution: Solution) -> Solution {
    let mut out = Vec::with_capacity(solution.len());
    let mut last: Option<Vec<(Variable, Term)>> = None;
    for mapping in solution {
        let key = canonical_key(&mapping);
        if last.as_ref() != Some(&key) {
            last = Some(key);
            out.push(mapping);
        }
    }
    out
}

pub(super) fn slice(solution: Solution, offset: Option<usize>, limit: Option<usize>) -> Solution {
    let skipped = solution.into_iter().skip(offset.unwrap_or(0));
    match limit {
        Some(n) => skipped.take(n).collect(),
        None => skipped.collect(),
    }
}

/// Sorts `solution` by `comparators`. A comparator that errors on a given
/// mapping sorts that mapping after every mapping for which it succeeded,
/// mirroring `ORDER BY`'s "unbound/error sorts last" convention.
pub(super) fn order_by(
    solution: Solution,
    comparators: &[OrderComparator],
    probe: &mut dyn ExistsProbe,
    budget: &mut ExecutionBudget,
) -> EngineResult<Solution> {
    let mut keyed: Vec<(Vec<Option<Term>>, Mapping)> = Vec::with_capacity(solution.len());
    for mapping in solution {
        budget.tick("order-by-key")?;
        let key = comparators.iter().map(|c| expression::evaluate(&c.expr, &mapping, probe).ok()).collect();
        keyed.push((key, mapping));
    }
    keyed.sort_by(|(ka, _), (kb, _)| compare_keys(ka, kb, comparators));
    Ok(keyed.into_iter().map(|(_, mapping)| mapping).collect())
}

fn compare_keys(a: &[Option<Term>], b: &[Option<Term>], comparators: &[OrderComparator]) -> Ordering {
    for (i, comparator) in comparators.iter().enumerate() {
        let ord = match (&a[i], &b[i]) {
            (Some(x), Some(y)) => compare_terms(x, y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let ord = if comparator.descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
