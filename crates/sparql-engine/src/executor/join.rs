//! Hash join: build a table over the smaller side's shared-variable
//! bindings, then probe it with the larger side. Dispatched from
//! [`super::eval`]'s `GraphPattern::Join` arm when
//! [`crate::optimizer::choose_strategy`] picks [`JoinStrategy::HashJoin`]
//! for a pair of basic graph patterns.

use sparql_common::{ExecutionBudget, Result as EngineResult};
use sparql_common::hash::FastHashMap;
use sparql_model::{Term, Variable};

use crate::solution::{Mapping, Solution};

/// Joins `left` and `right` — each already evaluated against the same
/// outer input — on `shared`, the variables visible to both sides.
///
/// Builds the hash table over whichever side is smaller, then probes it
/// with the other; an empty `shared` falls back to a compatibility-checked
/// cross product, since there's no join key to bucket on.
pub(super) fn hash_join(left: Solution, right: Solution, shared: &[Variable], budget: &mut ExecutionBudget) -> EngineResult<Solution> {
    if shared.is_empty() {
        return cross_product(left, right, budget);
    }

    let (build, probe, build_is_left) = if left.len() <= right.len() { (left, right, true) } else { (right, left, false) };

    let mut table: FastHashMap<Vec<Option<Term>>, Vec<Mapping>> = FastHashMap::default();
    for mapping in build {
        let key = join_key(&mapping, shared);
        table.entry(key).or_default().push(mapping);
    }

    let mut out = Vec::new();
    for probe_mapping in probe {
        budget.tick("hash-join-probe")?;
        let key = join_key(&probe_mapping, shared);
        let Some(candidates) = table.get(&key) else { continue };
        for build_mapping in candidates {
            let (outer, inner) = if build_is_left { (build_mapping, &probe_mapping) } else { (&probe_mapping, build_mapping) };
            if outer.is_compatible_with(inner) {
                out.push(outer.merge(inner));
            }
        }
    }
    Ok(out)
}

fn join_key(mapping: &Mapping, shared: &[Variable]) -> Vec<Option<Term>> {
    shared.iter().map(|v| mapping.get(v).cloned()).collect()
}

fn cross_product(left: Solution, right: Solution, budget: &mut ExecutionBudget) -> EngineResult<Solution> {
    let mut out = Vec::with_capacity(left.len() * right.len().max(1));
    for outer in &left {
        for inner in &right {
            budget.tick("hash-join-cross")?;
            if outer.is_compatible_with(inner) {
                out.push(outer.merge(inner));
            }
        }
    }
    Ok(out)
}
