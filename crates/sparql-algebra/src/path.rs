//! Property path expressions.

use sparql_model::NamedNode;

/// A property path: a regular expression over predicates, evaluated
/// against the RDF graph between a subject and object term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyPath {
    /// Exact triple match on a single predicate.
    Link(NamedNode),
    /// Swap subject/object and evaluate the inner path.
    Reverse(Box<PropertyPath>),
    /// Existential join through a fresh intermediate node.
    Sequence(Box<PropertyPath>, Box<PropertyPath>),
    /// Union of two paths.
    Alternative(Box<PropertyPath>, Box<PropertyPath>),
    /// Triples whose predicate is outside the given set.
    NegatedPropertySet(Vec<NamedNode>),
    /// Identity path union one step (`?`).
    ZeroOrOne(Box<PropertyPath>),
    /// Transitive reflexive closure (`*`).
    ZeroOrMore(Box<PropertyPath>),
    /// Transitive closure (`+`).
    OneOrMore(Box<PropertyPath>),
}

impl PropertyPath {
    /// Whether this path can ever match the identity pair `(x, x)` without
    /// traversing an edge — true for `ZeroOrOne`/`ZeroOrMore` at the top
    /// level.
    #[must_use]
    pub fn admits_identity(&self) -> bool {
        matches!(self, PropertyPath::ZeroOrOne(_) | PropertyPath::ZeroOrMore(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_or_more_admits_identity() {
        let path = PropertyPath::ZeroOrMore(Box::new(PropertyPath::Link(NamedNode::new("http://example.org/next"))));
        assert!(path.admits_identity());
    }

    #[test]
    fn one_or_more_does_not_admit_identity() {
        let path = PropertyPath::OneOrMore(Box::new(PropertyPath::Link(NamedNode::new("http://example.org/next"))));
        assert!(!path.admits_identity());
    }
}
