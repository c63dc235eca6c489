//! Leapfrog join: worst-case-optimal multi-way intersection
//! over trie cursors aligned at the same level.
//!
//! "Rotate iterators while seeking the minimum up to the current maximum;
//! emit when all iterators agree." This module implements exactly that
//! rotation as a primitive over [`TrieCursor`]s; orchestrating it across
//! several triple patterns that share a star variable (opening the next
//! level's cursors once a value is agreed on, recursing into the next
//! shared variable) is the join executor's job, in `sparql-engine`.

use sparql_common::{Error, Result};

use crate::dictionary::TermId;
use crate::index::trie::TrieCursor;

/// Intersects a set of trie cursors positioned at the same level,
/// returning every value all of them agree on, in ascending order.
///
/// `tick` is called once per rotation step and should thread through the
/// query's [`sparql_common::ExecutionBudget`], a per-execution bound on
/// total seek iterations that guards against pathological inputs.
///
/// # Errors
///
/// Propagates whatever error `tick` returns once the budget is exhausted.
pub fn leapfrog_intersect(
    cursors: &mut [TrieCursor],
    mut tick: impl FnMut() -> Result<()>,
) -> Result<Vec<TermId>> {
    if cursors.is_empty() {
        return Ok(Vec::new());
    }
    if cursors.iter().any(TrieCursor::is_exhausted) {
        return Ok(Vec::new());
    }

    let mut results = Vec::new();
    let n = cursors.len();
    let mut idx = 0usize;
    // The value the previous cursor in rotation order settled on; the next
    // cursor must seek to at least this value.
    let mut max_seen = cursors[(idx + n - 1) % n]
        .current()
        .ok_or_else(|| Error::MaxIterationsExceeded("leapfrog: exhausted cursor".to_string()))?;
    let mut agreeing_in_a_row = 0usize;

    loop {
        tick()?;
        let cursor = &mut cursors[idx];
        let current = match cursor.current() {
            Some(v) => v,
            None => break,
        };

        if current == max_seen {
            agreeing_in_a_row += 1;
            if agreeing_in_a_row == n {
                results.push(current);
                // Advance one cursor past the agreed value and keep rotating.
                cursors[idx].next();
                if cursors[idx].is_exhausted() {
                    break;
                }
                max_seen = cursors[idx].current().unwrap();
                agreeing_in_a_row = 0;
                idx = (idx + 1) % n;
                continue;
            }
        } else {
            cursor.seek(max_seen);
            match cursor.current() {
                Some(v) if v == max_seen => {
                    agreeing_in_a_row += 1;
                    if agreeing_in_a_row == n {
                        results.push(max_seen);
                        cursors[idx].next();
                        if cursors[idx].is_exhausted() {
                            break;
                        }
                        max_seen = cursors[idx].current().unwrap();
                        agreeing_in_a_row = 0;
                        idx = (idx + 1) % n;
                        continue;
                    }
                }
                Some(v) => {
                    max_seen = v;
                    agreeing_in_a_row = 1;
                }
                None => break,
            }
        }

        idx = (idx + 1) % n;
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BTreeMapStore, OrderedStore};
    use crate::index::permutation::Permutation;
    use std::sync::Arc;

    fn store_with(values: &[(u64, u64, u64)]) -> Arc<dyn OrderedStore> {
        let store: Arc<dyn OrderedStore> = BTreeMapStore::new();
        for &(s, p, o) in values {
            store.insert(&Permutation::Spo.key(s, p, o), &[]).unwrap();
        }
        store
    }

    #[test]
    fn intersects_three_cursors_on_shared_subject() {
        // Three "tables" (permutations restricted by different predicates),
        // each listing subjects at level 0; only subject 2 is common to all three.
        let a = store_with(&[(1, 1, 1), (2, 1, 1), (3, 1, 1)]);
        let b = store_with(&[(2, 2, 2), (4, 2, 2)]);
        let c = store_with(&[(2, 3, 3), (2, 3, 4), (5, 3, 3)]);

        let mut cursors = vec![
            TrieCursor::open(&a, Permutation::Spo, &[], 0).unwrap(),
            TrieCursor::open(&b, Permutation::Spo, &[], 0).unwrap(),
            TrieCursor::open(&c, Permutation::Spo, &[], 0).unwrap(),
        ];

        let result = leapfrog_intersect(&mut cursors, || Ok(())).unwrap();
        assert_eq!(result, vec![2]);
    }

    #[test]
    fn empty_intersection_when_no_overlap() {
        let a = store_with(&[(1, 1, 1)]);
        let b = store_with(&[(2, 1, 1)]);
        let mut cursors = vec![
            TrieCursor::open(&a, Permutation::Spo, &[], 0).unwrap(),
            TrieCursor::open(&b, Permutation::Spo, &[], 0).unwrap(),
        ];
        let result = leapfrog_intersect(&mut cursors, || Ok(())).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn single_cursor_yields_all_its_values() {
        let a = store_with(&[(1, 1, 1), (2, 1, 1), (3, 1, 1)]);
        let mut cursors = vec![TrieCursor::open(&a, Permutation::Spo, &[], 0).unwrap()];
        let result = leapfrog_intersect(&mut cursors, || Ok(())).unwrap();
        assert_eq!(result, vec![1, 2, 3]);
    }

    #[test]
    fn budget_exhaustion_propagates() {
        let a = store_with(&[(1, 1, 1), (2, 1, 1)]);
        let b = store_with(&[(1, 2, 2), (2, 2, 2)]);
        let mut cursors = vec![
            TrieCursor::open(&a, Permutation::Spo, &[], 0).unwrap(),
            TrieCursor::open(&b, Permutation::Spo, &[], 0).unwrap(),
        ];
        let mut calls = 0;
        let result = leapfrog_intersect(&mut cursors, || {
            calls += 1;
            if calls > 1 {
                Err(Error::MaxIterationsExceeded("test".to_string()))
            } else {
                Ok(())
            }
        });
        assert!(result.is_err());
    }
}
