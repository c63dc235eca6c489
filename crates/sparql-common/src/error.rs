//! The engine's closed error taxonomy.
//!
//! Every operational
//! failure the engine can surface to a caller is one of these variants.
//! Expression-evaluation errors are deliberately *not* part of
//! this enum — they are absorbed locally by FILTER/BIND/aggregate
//! evaluation and never reach this type.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Operational errors that abort a query or update and surface to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The query or update text could not be parsed into an algebra tree.
    #[error("parse error: {0}")]
    ParseError(String),

    /// An option key passed to `query`/`update` is not recognized.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// A prepared query was executed without all required parameters bound.
    #[error("missing parameters: {0:?}")]
    MissingParameters(Vec<String>),

    /// The query's deadline elapsed before execution completed.
    #[error("query timed out")]
    Timeout,

    /// A per-execution iteration bound (leapfrog seeks, path BFS steps, ...) was exceeded.
    #[error("max iterations exceeded: {0}")]
    MaxIterationsExceeded(String),

    /// An update operation tried to materialize more triples than the configured cap.
    #[error("too many triples: {found} exceeds limit {limit}")]
    TooManyTriples {
        /// Number of triples the operation attempted to materialize.
        found: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A query used more distinct variables than the configured cap.
    #[error("too many variables: {found} exceeds limit {limit}")]
    TooManyVariables {
        /// Number of distinct variables found.
        found: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The backing key/value store failed.
    #[error("storage error: {0}")]
    StorageError(String),

    /// A property path could not be evaluated (e.g. unresolvable negated set).
    #[error("unsupported path: {0}")]
    UnsupportedPath(String),

    /// An expression evaluation error escalated to an operational failure
    /// (this only happens for ASK/CONSTRUCT template instantiation paths
    /// that have no FILTER-like absorption point).
    #[error("evaluation error: {0}")]
    EvaluationError(String),

    /// A requested feature is recognized but intentionally unimplemented
    /// (e.g. `LOAD`, `SERVICE`).
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Maps the error to a CLI-style exit code.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ParseError(_)
            | Error::InvalidOption(_)
            | Error::MissingParameters(_)
            | Error::TooManyTriples { .. }
            | Error::TooManyVariables { .. } => 2,
            Error::Timeout => 3,
            Error::StorageError(_) => 4,
            Error::MaxIterationsExceeded(_)
            | Error::UnsupportedPath(_)
            | Error::EvaluationError(_)
            | Error::Unsupported(_) => 1,
        }
    }
}
