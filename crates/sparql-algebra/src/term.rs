//! A pattern position: either a variable or a ground RDF term.

use sparql_model::{BlankNode, Literal, NamedNode, Term, Variable};

/// One position of a triple, path, or quad pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphTerm {
    /// A variable to bind.
    Variable(Variable),
    /// A ground IRI.
    NamedNode(NamedNode),
    /// A ground blank node.
    BlankNode(BlankNode),
    /// A ground literal.
    Literal(Literal),
}

impl GraphTerm {
    /// Whether this position is a variable rather than a ground term.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(self, GraphTerm::Variable(_))
    }

    /// The variable this position binds to, if it is one.
    #[must_use]
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            GraphTerm::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// The ground term this position requires, if it is one.
    #[must_use]
    pub fn as_ground_term(&self) -> Option<Term> {
        match self {
            GraphTerm::Variable(_) => None,
            GraphTerm::NamedNode(n) => Some(Term::NamedNode(n.clone())),
            GraphTerm::BlankNode(b) => Some(Term::BlankNode(b.clone())),
            GraphTerm::Literal(l) => Some(Term::Literal(l.clone())),
        }
    }
}

impl From<Variable> for GraphTerm {
    fn from(value: Variable) -> Self {
        GraphTerm::Variable(value)
    }
}

impl From<NamedNode> for GraphTerm {
    fn from(value: NamedNode) -> Self {
        GraphTerm::NamedNode(value)
    }
}

impl From<Term> for GraphTerm {
    fn from(value: Term) -> Self {
        match value {
            Term::NamedNode(n) => GraphTerm::NamedNode(n),
            Term::BlankNode(b) => GraphTerm::BlankNode(b),
            Term::Literal(l) => GraphTerm::Literal(l),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_named_node_roundtrips_through_term() {
        let gt = GraphTerm::NamedNode(NamedNode::new("http://example.org/a"));
        assert!(!gt.is_variable());
        assert_eq!(gt.as_ground_term(), Some(Term::iri("http://example.org/a")));
    }

    #[test]
    fn variable_has_no_ground_term() {
        let gt = GraphTerm::Variable(Variable::new("x"));
        assert!(gt.is_variable());
        assert_eq!(gt.as_ground_term(), None);
        assert_eq!(gt.as_variable().map(Variable::name), Some("x"));
    }
}
