//! RDF terms: a discriminated value, one of `NamedNode`,
//! `BlankNode`, `Literal`, `DefaultGraph`/`GraphName`.

use std::fmt;
use std::sync::Arc;

/// An absolute IRI.
///
/// Interned as `Arc<str>` rather than `String`: the same handful of
/// predicate and datatype IRIs recur across millions of triples, and terms
/// are cloned constantly while threading through solution mappings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamedNode(Arc<str>);

impl NamedNode {
    /// Creates a named node from any string-like value.
    pub fn new(iri: impl Into<Arc<str>>) -> Self {
        Self(iri.into())
    }

    /// Returns the IRI as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl From<&str> for NamedNode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NamedNode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A scoped anonymous node, identified by a label unique within one
/// query/update or dataset load (never across them).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlankNode(Arc<str>);

impl BlankNode {
    /// Creates a blank node from a label.
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self(label.into())
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// Well-known XSD datatype IRIs, used throughout the expression evaluator
/// and numeric promotion ladder.
pub mod xsd {
    /// `xsd:string`
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    /// `xsd:boolean`
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    /// `xsd:integer`
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    /// `xsd:decimal`
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    /// `xsd:double`
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    /// `rdf:langString`
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
    /// `xsd:dateTime`
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// The lexical form of a literal, discriminated by the presence of a
/// datatype or language tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Literal {
    /// A plain string literal with implicit datatype `xsd:string`.
    Simple(Arc<str>),
    /// A literal with an explicit datatype IRI.
    Typed(Arc<str>, NamedNode),
    /// A literal tagged with a BCP-47 language tag (implicit datatype `rdf:langString`).
    LangTagged(Arc<str>, Arc<str>),
}

impl Literal {
    /// Creates a simple literal.
    pub fn simple(lexical: impl Into<Arc<str>>) -> Self {
        Self::Simple(lexical.into())
    }

    /// Creates a typed literal.
    pub fn typed(lexical: impl Into<Arc<str>>, datatype: NamedNode) -> Self {
        Self::Typed(lexical.into(), datatype)
    }

    /// Creates a language-tagged literal.
    pub fn lang_tagged(lexical: impl Into<Arc<str>>, lang: impl Into<Arc<str>>) -> Self {
        Self::LangTagged(lexical.into(), lang.into())
    }

    /// The lexical form, independent of datatype/language.
    #[must_use]
    pub fn lexical(&self) -> &str {
        match self {
            Literal::Simple(s) | Literal::Typed(s, _) | Literal::LangTagged(s, _) => s,
        }
    }

    /// The effective datatype IRI (`xsd:string` for simple,
    /// `rdf:langString` for language-tagged, the explicit one otherwise).
    #[must_use]
    pub fn datatype(&self) -> &str {
        match self {
            Literal::Simple(_) => xsd::STRING,
            Literal::Typed(_, dt) => dt.as_str(),
            Literal::LangTagged(_, _) => xsd::LANG_STRING,
        }
    }

    /// The language tag, if any.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        match self {
            Literal::LangTagged(_, lang) => Some(lang),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Simple(s) => write!(f, "\"{s}\""),
            Literal::Typed(s, dt) => write!(f, "\"{s}\"^^{dt}"),
            Literal::LangTagged(s, lang) => write!(f, "\"{s}\"@{lang}"),
        }
    }
}

/// Any RDF term that can occupy a subject, predicate, object, or graph-name
/// position. `DefaultGraph`/`GraphName` are *not* modeled here
/// since they only ever occur at the quad's graph position — see
/// [`GraphName`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// An absolute IRI.
    NamedNode(NamedNode),
    /// A scoped blank node.
    BlankNode(BlankNode),
    /// A literal value.
    Literal(Literal),
}

impl Term {
    /// Creates a named-node term.
    pub fn iri(iri: impl Into<Arc<str>>) -> Self {
        Term::NamedNode(NamedNode::new(iri))
    }

    /// Creates a blank-node term.
    pub fn blank(label: impl Into<Arc<str>>) -> Self {
        Term::BlankNode(BlankNode::new(label))
    }

    /// Creates a simple-literal term.
    pub fn literal(lexical: impl Into<Arc<str>>) -> Self {
        Term::Literal(Literal::simple(lexical))
    }

    /// Creates a typed-literal term.
    pub fn typed_literal(lexical: impl Into<Arc<str>>, datatype: impl Into<Arc<str>>) -> Self {
        Term::Literal(Literal::typed(lexical, NamedNode::new(datatype.into())))
    }

    /// True for `NamedNode`.
    #[must_use]
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::NamedNode(_))
    }

    /// True for `BlankNode`.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    /// True for `Literal`.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode(n) => n.fmt(f),
            Term::BlankNode(b) => b.fmt(f),
            Term::Literal(l) => l.fmt(f),
        }
    }
}

impl From<NamedNode> for Term {
    fn from(value: NamedNode) -> Self {
        Term::NamedNode(value)
    }
}

impl From<BlankNode> for Term {
    fn from(value: BlankNode) -> Self {
        Term::BlankNode(value)
    }
}

impl From<Literal> for Term {
    fn from(value: Literal) -> Self {
        Term::Literal(value)
    }
}

/// The graph-name position of a quad: either the unnamed
/// default graph or a named graph identified by an IRI or blank node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GraphName {
    /// The default (unnamed) graph.
    DefaultGraph,
    /// A named graph.
    NamedNode(NamedNode),
    /// A graph named by a blank node.
    BlankNode(BlankNode),
}

impl Default for GraphName {
    fn default() -> Self {
        GraphName::DefaultGraph
    }
}

impl fmt::Display for GraphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphName::DefaultGraph => write!(f, "DEFAULT"),
            GraphName::NamedNode(n) => n.fmt(f),
            GraphName::BlankNode(b) => b.fmt(f),
        }
    }
}
