//! Storage-layer errors.
//!
//! Narrower than [`sparql_common::Error`]; the engine layer wraps this into
//! `Error::StorageError` at the crate boundary, so storage code never needs
//! to know about the engine's broader error surface.

use thiserror::Error;

/// Result alias for the storage layer.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Failures raised by the backend, dictionary, or index layers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend failed to read or write a key.
    #[error("backend I/O failure: {0}")]
    Backend(String),

    /// A key in a column family did not decode to a well-formed triple key.
    #[error("corrupt index key in column family {0}")]
    CorruptKey(&'static str),

    /// A dictionary entry's stored bytes did not decode to a term.
    #[error("corrupt dictionary entry for id {0}")]
    CorruptTerm(u64),
}

impl From<StorageError> for sparql_common::Error {
    fn from(value: StorageError) -> Self {
        sparql_common::Error::StorageError(value.to_string())
    }
}
