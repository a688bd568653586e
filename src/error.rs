//! Error types for draft operations
//!
//! Read-path corruption is not represented here: unparseable stored data is
//! treated as an empty collection and logged, so listing operations stay
//! usable. Lookup failures and write failures surface as [`DraftError`] so
//! the caller can inform the user and offer a retry.

use crate::storage::StorageError;

/// Error during a draft manager operation
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// The referenced draft id does not exist.
    #[error("Draft not found: {0}")]
    NotFound(String),
    /// The referenced version id does not exist within the draft.
    #[error("Version not found: {0}")]
    VersionNotFound(String),
    /// Underlying storage failure. Quota exhaustion reaches the caller only
    /// after one eviction retry has also failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Malformed import payload (wraps the parse/decode failure).
    #[error("Import error: {0}")]
    ImportError(String),
    #[error("Export error: {0}")]
    ExportError(String),
}

impl From<serde_json::Error> for DraftError {
    fn from(err: serde_json::Error) -> Self {
        DraftError::SerializationError(err.to_string())
    }
}
