//! Triple, path, and quad patterns.

use crate::path::PropertyPath;
use crate::term::GraphTerm;

/// A triple pattern: each position is a ground term or a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplePattern {
    /// Subject position.
    pub subject: GraphTerm,
    /// Predicate position.
    pub predicate: GraphTerm,
    /// Object position.
    pub object: GraphTerm,
}

impl TriplePattern {
    /// Builds a triple pattern from its three positions.
    #[must_use]
    pub fn new(subject: GraphTerm, predicate: GraphTerm, object: GraphTerm) -> Self {
        Self { subject, predicate, object }
    }
}

/// A path pattern: a subject and object term connected by a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    /// Subject position.
    pub subject: GraphTerm,
    /// The path expression connecting subject and object.
    pub path: PropertyPath,
    /// Object position.
    pub object: GraphTerm,
}

impl PathPattern {
    /// Builds a path pattern.
    #[must_use]
    pub fn new(subject: GraphTerm, path: PropertyPath, object: GraphTerm) -> Self {
        Self { subject, path, object }
    }
}

/// A quad pattern: a triple pattern plus a graph name position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadPattern {
    /// Subject position.
    pub subject: GraphTerm,
    /// Predicate position.
    pub predicate: GraphTerm,
    /// Object position.
    pub object: GraphTerm,
    /// Graph name position.
    pub graph: GraphTerm,
}

impl QuadPattern {
    /// Builds a quad pattern.
    #[must_use]
    pub fn new(subject: GraphTerm, predicate: GraphTerm, object: GraphTerm, graph: GraphTerm) -> Self {
        Self { subject, predicate, object, graph }
    }

    /// The triple pattern component, discarding the graph position.
    #[must_use]
    pub fn into_triple_pattern(self) -> TriplePattern {
        TriplePattern::new(self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_model::{NamedNode, Variable};

    #[test]
    fn quad_pattern_drops_graph_on_conversion() {
        let quad = QuadPattern::new(
            GraphTerm::Variable(Variable::new("s")),
            GraphTerm::NamedNode(NamedNode::new("http://example.org/p")),
            GraphTerm::Variable(Variable::new("o")),
            GraphTerm::NamedNode(NamedNode::new("http://example.org/g")),
        );
        let triple = quad.into_triple_pattern();
        assert_eq!(triple.subject, GraphTerm::Variable(Variable::new("s")));
    }
}
