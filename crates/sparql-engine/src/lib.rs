//! The SPARQL 1.1 optimizer and executor: cost-based join planning, the
//! algebra operator tree, property paths, and the expression evaluator.
//!
//! [`Database`] owns the store; [`Database::session`] hands out a
//! [`Session`] to actually run queries and updates against it.

pub mod config;
pub mod database;
pub mod executor;
pub mod expression;
pub mod optimizer;
pub mod path;
pub mod session;
pub mod solution;
pub mod update;
pub mod variables;

pub use config::EngineConfig;
pub use database::Database;
pub use session::{ExplainInfo, PreparedQuery, QueryOptions, QueryOutcome, Session};
pub use solution::{Mapping, Solution};
