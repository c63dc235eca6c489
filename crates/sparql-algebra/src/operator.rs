//! The algebra operator tree: every node produces a
//! lazy stream of solution mappings once evaluated by `sparql-engine`.

use sparql_model::{Term, Variable};

use crate::aggregate::AggregateExpression;
use crate::expr::Expression;
use crate::pattern::{PathPattern, TriplePattern};

/// A node in the SPARQL algebra tree.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphPattern {
    /// A basic graph pattern: the natural join of its triple patterns.
    Bgp(Vec<TriplePattern>),
    /// A property path pattern, evaluated by the path evaluator.
    Path(PathPattern),
    /// Inner join of two patterns, strategy chosen by the optimizer.
    Join(Box<GraphPattern>, Box<GraphPattern>),
    /// `OPTIONAL`: left join with an optional filter.
    LeftJoin(Box<GraphPattern>, Box<GraphPattern>, Option<Expression>),
    /// `UNION`.
    Union(Box<GraphPattern>, Box<GraphPattern>),
    /// `MINUS`.
    Minus(Box<GraphPattern>, Box<GraphPattern>),
    /// `FILTER`.
    Filter(Expression, Box<GraphPattern>),
    /// `BIND(expr AS var)`.
    Extend(Variable, Expression, Box<GraphPattern>),
    /// Restricts the mapping domain to the given variables.
    Project(Vec<Variable>, Box<GraphPattern>),
    /// Drops exact-mapping duplicates.
    Distinct(Box<GraphPattern>),
    /// Permits lossy deduplication.
    Reduced(Box<GraphPattern>),
    /// Orders mappings by a list of (expression, direction) keys.
    OrderBy(Vec<OrderComparator>, Box<GraphPattern>),
    /// `OFFSET`/`LIMIT`.
    Slice {
        /// Number of leading mappings to drop.
        offset: Option<usize>,
        /// Maximum number of mappings to keep after the offset.
        limit: Option<usize>,
        /// The pattern being sliced.
        inner: Box<GraphPattern>,
    },
    /// `GROUP BY` with aggregates.
    Group {
        /// Group-key expressions.
        keys: Vec<Expression>,
        /// Aggregate-result variable bindings.
        aggregates: Vec<(Variable, AggregateExpression)>,
        /// The pattern being grouped.
        inner: Box<GraphPattern>,
    },
    /// `VALUES`: an inline table of solutions.
    Values {
        /// Column variables.
        variables: Vec<Variable>,
        /// Row data; `None` marks an unbound cell (`UNDEF`).
        rows: Vec<Vec<Option<Term>>>,
    },
}

/// One key of an `ORDER BY` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderComparator {
    /// The expression to sort by.
    pub expr: Expression,
    /// `true` for `DESC`, `false` for `ASC`.
    pub descending: bool,
}

impl GraphPattern {
    /// The empty BGP: matches a single empty mapping, the identity pattern
    /// for `Join`.
    #[must_use]
    pub fn empty_bgp() -> Self {
        GraphPattern::Bgp(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::GraphTerm;
    use sparql_model::NamedNode;

    #[test]
    fn empty_bgp_has_no_patterns() {
        match GraphPattern::empty_bgp() {
            GraphPattern::Bgp(patterns) => assert!(patterns.is_empty()),
            _ => panic!("expected Bgp"),
        }
    }

    #[test]
    fn join_wraps_two_patterns() {
        let left = GraphPattern::Bgp(vec![TriplePattern::new(
            GraphTerm::Variable(Variable::new("s")),
            GraphTerm::NamedNode(NamedNode::new("http://example.org/p")),
            GraphTerm::Variable(Variable::new("o")),
        )]);
        let right = GraphPattern::Bgp(Vec::new());
        let join = GraphPattern::Join(Box::new(left), Box::new(right));
        assert!(matches!(join, GraphPattern::Join(_, _)));
    }
}
