//! Triples and quads.

use std::fmt;

use crate::term::{BlankNode, GraphName, NamedNode, Term};

/// A triple's subject position: named or blank node, never a literal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subject {
    /// An IRI subject.
    NamedNode(NamedNode),
    /// A blank-node subject.
    BlankNode(BlankNode),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::NamedNode(n) => n.fmt(f),
            Subject::BlankNode(b) => b.fmt(f),
        }
    }
}

impl From<Subject> for Term {
    fn from(value: Subject) -> Self {
        match value {
            Subject::NamedNode(n) => Term::NamedNode(n),
            Subject::BlankNode(b) => Term::BlankNode(b),
        }
    }
}

impl From<NamedNode> for Subject {
    fn from(value: NamedNode) -> Self {
        Subject::NamedNode(value)
    }
}

impl From<BlankNode> for Subject {
    fn from(value: BlankNode) -> Self {
        Subject::BlankNode(value)
    }
}

/// `(subject, predicate, object)` over terms, where subject is
/// named-or-blank, predicate is named, and object is any term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    subject: Subject,
    predicate: NamedNode,
    object: Term,
}

impl Triple {
    /// Creates a new triple.
    pub fn new(subject: impl Into<Subject>, predicate: NamedNode, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }

    /// The subject.
    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// The predicate.
    #[must_use]
    pub fn predicate(&self) -> &NamedNode {
        &self.predicate
    }

    /// The object.
    #[must_use]
    pub fn object(&self) -> &Term {
        &self.object
    }

    /// Decomposes into owned parts.
    #[must_use]
    pub fn into_parts(self) -> (Subject, NamedNode, Term) {
        (self.subject, self.predicate, self.object)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// A [`Triple`] scoped to a named graph: a quad adds a graph name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quad {
    /// The underlying triple.
    pub triple: Triple,
    /// The graph this quad belongs to.
    pub graph_name: GraphName,
}

impl Quad {
    /// Creates a quad from a triple and graph name.
    #[must_use]
    pub fn new(triple: Triple, graph_name: GraphName) -> Self {
        Self { triple, graph_name }
    }

    /// Creates a quad in the default graph.
    #[must_use]
    pub fn in_default_graph(triple: Triple) -> Self {
        Self::new(triple, GraphName::DefaultGraph)
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.triple, self.graph_name)
    }
}
