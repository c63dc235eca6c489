//! Query forms: SELECT, ASK, CONSTRUCT, DESCRIBE.

use sparql_model::Variable;

use crate::operator::GraphPattern;
use crate::pattern::TriplePattern;
use crate::term::GraphTerm;

/// The projected variables of a `SELECT` query.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectVariables {
    /// `SELECT *`: project every variable visible in the pattern.
    All,
    /// An explicit variable list.
    Explicit(Vec<Variable>),
}

/// The resources a `DESCRIBE` query targets.
#[derive(Debug, Clone, PartialEq)]
pub enum DescribeTarget {
    /// Explicit IRIs or blank nodes named in the query.
    Resources(Vec<GraphTerm>),
    /// Variables bound by the `WHERE` clause.
    Variables(Vec<Variable>),
}

/// A compiled query form.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryForm {
    /// `SELECT`: produces a solution sequence.
    Select {
        /// Which variables to project.
        variables: SelectVariables,
        /// The pattern to evaluate.
        body: GraphPattern,
    },
    /// `ASK`: true iff `body` yields at least one solution.
    Ask {
        /// The pattern to evaluate.
        body: GraphPattern,
    },
    /// `CONSTRUCT`: instantiates a triple template per solution.
    Construct {
        /// The triple template, possibly containing variables bound by `body`.
        template: Vec<TriplePattern>,
        /// The pattern to evaluate.
        body: GraphPattern,
    },
    /// `DESCRIBE`: emits the concise bounded description of each target
    /// resource (strict forward CBD).
    Describe {
        /// The resources to describe.
        target: DescribeTarget,
        /// The pattern to evaluate (empty for a bare IRI-list DESCRIBE).
        body: GraphPattern,
    },
}
