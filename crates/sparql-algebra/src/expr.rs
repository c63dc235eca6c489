//! The expression tree the evaluator walks for FILTER, BIND, and aggregate
//! arguments.

use sparql_model::{NumericValue, Variable};

use crate::operator::GraphPattern;
use crate::term::GraphTerm;

/// A SPARQL expression. Evaluates against one solution mapping to an RDF
/// term, or an expression error.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A ground term or variable reference.
    Term(GraphTerm),
    /// A literal numeric constant, distinct from [`Expression::Term`] so the
    /// evaluator can skip re-parsing the lexical form.
    Numeric(NumericValue),
    /// Arithmetic `+`.
    Add(Box<Expression>, Box<Expression>),
    /// Arithmetic `-` (binary).
    Subtract(Box<Expression>, Box<Expression>),
    /// Arithmetic `*`.
    Multiply(Box<Expression>, Box<Expression>),
    /// Arithmetic `/`.
    Divide(Box<Expression>, Box<Expression>),
    /// Unary `-`.
    UnaryMinus(Box<Expression>),
    /// Unary `+`.
    UnaryPlus(Box<Expression>),
    /// Logical NOT.
    Not(Box<Expression>),
    /// Logical AND, three-valued.
    And(Box<Expression>, Box<Expression>),
    /// Logical OR, three-valued.
    Or(Box<Expression>, Box<Expression>),
    /// `=` using RDF-term equality/ordering.
    Equal(Box<Expression>, Box<Expression>),
    /// `<`.
    Less(Box<Expression>, Box<Expression>),
    /// `<=`.
    LessOrEqual(Box<Expression>, Box<Expression>),
    /// `>`.
    Greater(Box<Expression>, Box<Expression>),
    /// `>=`.
    GreaterOrEqual(Box<Expression>, Box<Expression>),
    /// `BOUND(var)`.
    Bound(Variable),
    /// `IF(cond, then, else)`.
    If(Box<Expression>, Box<Expression>, Box<Expression>),
    /// `COALESCE(args...)`: first argument that evaluates without error.
    Coalesce(Vec<Expression>),
    /// `IN` / `NOT IN`.
    In {
        /// The needle expression.
        needle: Box<Expression>,
        /// The haystack expressions.
        haystack: Vec<Expression>,
        /// `true` for `NOT IN`.
        negated: bool,
    },
    /// A built-in function call.
    FunctionCall(BuiltInFunction, Vec<Expression>),
    /// `EXISTS { pattern }` (negated for `NOT EXISTS`): non-empty iff the
    /// inner pattern, evaluated under the current mapping, yields at least
    /// one solution.
    Exists {
        /// The inner pattern to probe.
        pattern: Box<GraphPattern>,
        /// `true` for `NOT EXISTS`.
        negated: bool,
    },
}

/// SPARQL 1.1 built-in functions (abridged set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltInFunction {
    /// `STR`.
    Str,
    /// `LANG`.
    Lang,
    /// `DATATYPE`.
    Datatype,
    /// `isIRI`.
    IsIri,
    /// `isBlank`.
    IsBlank,
    /// `isLiteral`.
    IsLiteral,
    /// `isNumeric`.
    IsNumeric,
    /// `STRLEN`.
    StrLen,
    /// `SUBSTR`.
    Substr,
    /// `UCASE`.
    Ucase,
    /// `LCASE`.
    Lcase,
    /// `STRSTARTS`.
    StrStarts,
    /// `STRENDS`.
    StrEnds,
    /// `CONTAINS`.
    Contains,
    /// `STRBEFORE`.
    StrBefore,
    /// `STRAFTER`.
    StrAfter,
    /// `CONCAT`.
    Concat,
    /// `ENCODE_FOR_URI`.
    EncodeForUri,
    /// `LANGMATCHES`.
    LangMatches,
    /// `REGEX`.
    Regex,
    /// `REPLACE`.
    Replace,
    /// `ABS`.
    Abs,
    /// `ROUND`.
    Round,
    /// `CEIL`.
    Ceil,
    /// `FLOOR`.
    Floor,
    /// `RAND`.
    Rand,
    /// `MD5`.
    Md5,
    /// `SHA1`.
    Sha1,
    /// `SHA256`.
    Sha256,
    /// `IRI` / `URI`.
    Iri,
    /// `BNODE`.
    Bnode,
    /// `NOW`.
    Now,
    /// `YEAR`.
    Year,
    /// `MONTH`.
    Month,
    /// `DAY`.
    Day,
    /// `HOURS`.
    Hours,
    /// `MINUTES`.
    Minutes,
    /// `SECONDS`.
    Seconds,
}

impl Expression {
    /// A variable reference, the common case for building expressions by
    /// hand in tests and rewrite rules.
    #[must_use]
    pub fn variable(name: &str) -> Self {
        Expression::Term(GraphTerm::Variable(Variable::new(name)))
    }
}
