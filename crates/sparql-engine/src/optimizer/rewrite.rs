//! Algebraic rewrites, applied before cardinality
//! estimation and join enumeration.

use sparql_algebra::{Expression, GraphPattern};

/// Applies every rewrite rule to `pattern`, bottom-up.
#[must_use]
pub fn rewrite(pattern: GraphPattern) -> GraphPattern {
    let pattern = flatten_unions(pattern);
    let pattern = constant_fold_filters(pattern);
    eliminate_redundant_distinct(pattern)
}

/// Flattens a left- or right-nested chain of `UNION`s into itself; the
/// executor already evaluates `Union` by concatenation, so flattening only
/// removes redundant recursion depth, not semantics. Recurses into both
/// children either way.
fn flatten_unions(pattern: GraphPattern) -> GraphPattern {
    match pattern {
        GraphPattern::Union(l, r) => {
            let l = flatten_unions(*l);
            let r = flatten_unions(*r);
            GraphPattern::Union(Box::new(l), Box::new(r))
        }
        other => recurse(other, flatten_unions),
    }
}

/// Replaces a `FILTER` whose expression is a ground boolean literal with
/// either its inner pattern (`true`) or the empty pattern (`false`),
/// without needing a full mapping to evaluate against.
fn constant_fold_filters(pattern: GraphPattern) -> GraphPattern {
    match pattern {
        GraphPattern::Filter(expr, inner) => {
            let inner = Box::new(constant_fold_filters(*inner));
            match ground_boolean(&expr) {
                Some(true) => *inner,
                Some(false) => empty_pattern(),
                None => GraphPattern::Filter(expr, inner),
            }
        }
        other => recurse(other, constant_fold_filters),
    }
}

fn ground_boolean(expr: &Expression) -> Option<bool> {
    use sparql_algebra::GraphTerm;
    use sparql_model::xsd;
    match expr {
        Expression::Term(GraphTerm::Literal(lit)) if lit.datatype() == xsd::BOOLEAN => match lit.lexical() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// A pattern matching no mappings: an empty `VALUES` table.
fn empty_pattern() -> GraphPattern {
    GraphPattern::Values { variables: Vec::new(), rows: Vec::new() }
}

/// Drops a `DISTINCT` directly wrapping a `Group`: aggregation over a
/// `GROUP BY` key set already produces one row per distinct key, so an
/// outer `DISTINCT` can never remove anything.
fn eliminate_redundant_distinct(pattern: GraphPattern) -> GraphPattern {
    match pattern {
        GraphPattern::Distinct(inner) => {
            let inner = eliminate_redundant_distinct(*inner);
            match inner {
                GraphPattern::Group { .. } => inner,
                other => GraphPattern::Distinct(Box::new(other)),
            }
        }
        other => recurse(other, eliminate_redundant_distinct),
    }
}

/// Applies `f` to every direct child of `pattern`, leaving leaves and the
/// node's own shape untouched. Shared by every single-pass rewrite above.
fn recurse(pattern: GraphPattern, f: impl Fn(GraphPattern) -> GraphPattern + Copy) -> GraphPattern {
    match pattern {
        GraphPattern::Bgp(_) | GraphPattern::Path(_) | GraphPattern::Values { .. } => pattern,
        GraphPattern::Join(l, r) => GraphPattern::Join(Box::new(f(*l)), Box::new(f(*r))),
        GraphPattern::LeftJoin(l, r, filter) => GraphPattern::LeftJoin(Box::new(f(*l)), Box::new(f(*r)), filter),
        GraphPattern::Union(l, r) => GraphPattern::Union(Box::new(f(*l)), Box::new(f(*r))),
        GraphPattern::Minus(l, r) => GraphPattern::Minus(Box::new(f(*l)), Box::new(f(*r))),
        GraphPattern::Filter(expr, inner) => GraphPattern::Filter(expr, Box::new(f(*inner))),
        GraphPattern::Extend(var, expr, inner) => GraphPattern::Extend(var, expr, Box::new(f(*inner))),
        GraphPattern::Project(vars, inner) => GraphPattern::Project(vars, Box::new(f(*inner))),
        GraphPattern::Distinct(inner) => GraphPattern::Distinct(Box::new(f(*inner))),
        GraphPattern::Reduced(inner) => GraphPattern::Reduced(Box::new(f(*inner))),
        GraphPattern::OrderBy(comparators, inner) => GraphPattern::OrderBy(comparators, Box::new(f(*inner))),
        GraphPattern::Slice { offset, limit, inner } => GraphPattern::Slice { offset, limit, inner: Box::new(f(*inner)) },
        GraphPattern::Group { keys, aggregates, inner } => GraphPattern::Group { keys, aggregates, inner: Box::new(f(*inner)) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_algebra::{GraphTerm, TriplePattern};
    use sparql_model::{xsd, NamedNode, Term, Variable};

    fn leaf() -> GraphPattern {
        GraphPattern::Bgp(vec![TriplePattern::new(
            GraphTerm::Variable(Variable::new("s")),
            GraphTerm::NamedNode(NamedNode::new("http://ex/p")),
            GraphTerm::Variable(Variable::new("o")),
        )])
    }

    #[test]
    fn filter_true_collapses_to_its_inner_pattern() {
        let expr = Expression::Term(GraphTerm::Literal(sparql_model::Literal::typed("true", NamedNode::new(xsd::BOOLEAN))));
        let pattern = GraphPattern::Filter(expr, Box::new(leaf()));
        assert_eq!(rewrite(pattern), leaf());
    }

    #[test]
    fn filter_false_collapses_to_the_empty_pattern() {
        let expr = Expression::Term(GraphTerm::Literal(sparql_model::Literal::typed("false", NamedNode::new(xsd::BOOLEAN))));
        let pattern = GraphPattern::Filter(expr, Box::new(leaf()));
        assert_eq!(rewrite(pattern), empty_pattern());
    }

    #[test]
    fn distinct_over_group_is_dropped() {
        let group = GraphPattern::Group { keys: vec![Expression::variable("s")], aggregates: Vec::new(), inner: Box::new(leaf()) };
        let pattern = GraphPattern::Distinct(Box::new(group.clone()));
        assert_eq!(rewrite(pattern), group);
    }

    #[test]
    fn non_constant_filter_is_left_untouched() {
        let expr = Expression::Bound(Variable::new("s"));
        let pattern = GraphPattern::Filter(expr.clone(), Box::new(leaf()));
        assert_eq!(rewrite(pattern), GraphPattern::Filter(expr, Box::new(leaf())));
    }
}
