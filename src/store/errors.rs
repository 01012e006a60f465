//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by contract and connector stores
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record with this id
    #[error("{kind} not found")]
    NotFound { kind: &'static str, id: String },

    /// Id cannot be used as a record key
    #[error("Invalid {kind} id: {id:?}")]
    InvalidId { kind: &'static str, id: String },

    /// Filesystem failure
    #[error("Storage I/O error: {0}")]
    Io(String),

    /// Record could not be encoded or decoded
    #[error("Storage serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound { kind, id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
