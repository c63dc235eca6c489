//! Collects the variables visible in an algebra tree, for `SELECT *`
//! projection and the `TooManyVariables` resource cap.

use std::collections::HashSet;

use sparql_algebra::{Expression, GraphPattern, GraphTerm};
use sparql_model::Variable;

/// Every distinct variable that can end up bound by evaluating `pattern`,
/// in first-occurrence order. Used for `SELECT *`, which projects
/// "every variable visible in the pattern" rather than a caller-supplied
/// list.
#[must_use]
pub fn visible_variables(pattern: &GraphPattern) -> Vec<Variable> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    collect(pattern, &mut seen, &mut out);
    out
}

fn push(var: &Variable, seen: &mut HashSet<Variable>, out: &mut Vec<Variable>) {
    if seen.insert(var.clone()) {
        out.push(var.clone());
    }
}

fn collect_term(term: &GraphTerm, seen: &mut HashSet<Variable>, out: &mut Vec<Variable>) {
    if let GraphTerm::Variable(v) = term {
        push(v, seen, out);
    }
}

fn collect_expr(expr: &Expression, seen: &mut HashSet<Variable>, out: &mut Vec<Variable>) {
    match expr {
        Expression::Term(t) => collect_term(t, seen, out),
        Expression::Numeric(_) => {}
        Expression::Add(l, r)
        | Expression::Subtract(l, r)
        | Expression::Multiply(l, r)
        | Expression::Divide(l, r)
        | Expression::And(l, r)
        | Expression::Or(l, r)
        | Expression::Equal(l, r)
        | Expression::Less(l, r)
        | Expression::LessOrEqual(l, r)
        | Expression::Greater(l, r)
        | Expression::GreaterOrEqual(l, r) => {
            collect_expr(l, seen, out);
            collect_expr(r, seen, out);
        }
        Expression::UnaryMinus(e) | Expression::UnaryPlus(e) | Expression::Not(e) => collect_expr(e, seen, out),
        Expression::Bound(v) => push(v, seen, out),
        Expression::If(c, t, e) => {
            collect_expr(c, seen, out);
            collect_expr(t, seen, out);
            collect_expr(e, seen, out);
        }
        Expression::Coalesce(args) => args.iter().for_each(|a| collect_expr(a, seen, out)),
        Expression::In { needle, haystack, .. } => {
            collect_expr(needle, seen, out);
            haystack.iter().for_each(|a| collect_expr(a, seen, out));
        }
        Expression::FunctionCall(_, args) => args.iter().for_each(|a| collect_expr(a, seen, out)),
        Expression::Exists { pattern, .. } => collect(pattern, seen, out),
    }
}

fn collect(pattern: &GraphPattern, seen: &mut HashSet<Variable>, out: &mut Vec<Variable>) {
    match pattern {
        GraphPattern::Bgp(triples) => {
            for t in triples {
                collect_term(&t.subject, seen, out);
                collect_term(&t.predicate, seen, out);
                collect_term(&t.object, seen, out);
            }
        }
        GraphPattern::Path(pp) => {
            collect_term(&pp.subject, seen, out);
            collect_term(&pp.object, seen, out);
        }
        GraphPattern::Join(l, r) | GraphPattern::Union(l, r) | GraphPattern::Minus(l, r) => {
            collect(l, seen, out);
            collect(r, seen, out);
        }
        GraphPattern::LeftJoin(l, r, filter) => {
            collect(l, seen, out);
            collect(r, seen, out);
            if let Some(expr) = filter {
                collect_expr(expr, seen, out);
            }
        }
        GraphPattern::Filter(expr, inner) => {
            collect_expr(expr, seen, out);
            collect(inner, seen, out);
        }
        GraphPattern::Extend(var, expr, inner) => {
            collect(inner, seen, out);
            collect_expr(expr, seen, out);
            push(var, seen, out);
        }
        GraphPattern::Project(vars, inner) => {
            collect(inner, seen, out);
            vars.iter().for_each(|v| push(v, seen, out));
        }
        GraphPattern::Distinct(inner) | GraphPattern::Reduced(inner) => collect(inner, seen, out),
        GraphPattern::OrderBy(comparators, inner) => {
            collect(inner, seen, out);
            comparators.iter().for_each(|c| collect_expr(&c.expr, seen, out));
        }
        GraphPattern::Slice { inner, .. } => collect(inner, seen, out),
        GraphPattern::Group { keys, aggregates, inner } => {
            collect(inner, seen, out);
            keys.iter().for_each(|k| collect_expr(k, seen, out));
            for (var, _) in aggregates {
                push(var, seen, out);
            }
        }
        GraphPattern::Values { variables, .. } => variables.iter().for_each(|v| push(v, seen, out)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_algebra::TriplePattern;
    use sparql_model::NamedNode;

    #[test]
    fn bgp_surfaces_its_pattern_variables() {
        let pattern = GraphPattern::Bgp(vec![TriplePattern::new(
            GraphTerm::Variable(Variable::new("s")),
            GraphTerm::NamedNode(NamedNode::new("http://ex/p")),
            GraphTerm::Variable(Variable::new("o")),
        )]);
        let vars = visible_variables(&pattern);
        assert_eq!(vars, vec![Variable::new("s"), Variable::new("o")]);
    }

    #[test]
    fn extend_adds_its_bound_variable() {
        let inner = GraphPattern::empty_bgp();
        let pattern = GraphPattern::Extend(Variable::new("computed"), Expression::variable("x"), Box::new(inner));
        let vars = visible_variables(&pattern);
        assert!(vars.contains(&Variable::new("computed")));
        assert!(vars.contains(&Variable::new("x")));
    }
}
