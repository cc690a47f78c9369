//! # Execution Errors
//!
//! Errors are propagated to the caller unchanged. Nothing retries.

use thiserror::Error;

/// Result type for plan execution
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Plan execution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// No collection with this name
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Regex predicate did not compile
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Plan shape the executor cannot run
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    /// Seed data was not `{collection: [documents]}`
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl ExecutionError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutionError::CollectionNotFound(_) => "HUB_COLLECTION_NOT_FOUND",
            ExecutionError::InvalidPattern { .. } => "HUB_INVALID_PATTERN",
            ExecutionError::InvalidPlan(_) => "HUB_INVALID_PLAN",
            ExecutionError::InvalidData(_) => "HUB_INVALID_DATA",
        }
    }
}
