//! # sparql-common
//!
//! Foundation layer for the SPARQL engine: the error taxonomy, iteration
//! budgets, and small hashing utilities shared by every other crate in the
//! workspace. Has no internal dependencies and should be kept minimal.
//!
//! ## Modules
//!
//! - [`error`] - Closed error taxonomy (operational errors)
//! - [`hash`] - `FxHashMap`/`FxHashSet`-style fast hash collections
//! - [`budget`] - Iteration and deadline budgets for cancellation

pub mod budget;
pub mod error;
pub mod hash;

pub use budget::ExecutionBudget;
pub use error::{Error, Result};
pub use hash::{FastHashMap, FastHashSet};
