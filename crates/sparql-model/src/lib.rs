//! # sparql-model
//!
//! The RDF data model: terms, triples, quads, variables, and
//! the XSD numeric promotion ladder used by the expression evaluator.
//! This crate is pure data — no storage, no execution — so every other
//! crate in the workspace can depend on it without pulling in the
//! dictionary or index machinery.

pub mod numeric;
pub mod term;
pub mod triple;
pub mod variable;

pub use numeric::NumericValue;
pub use term::{xsd, BlankNode, GraphName, Literal, NamedNode, Term};
pub use triple::{Quad, Subject, Triple};
pub use variable::Variable;
