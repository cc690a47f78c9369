//! # Filter Errors
//!
//! Validation failures are data, not control flow: every validator
//! returns a `FilterValidationResult` carrying `ValidationError`s.
//! `FilterError` only appears when a caller converts a result into a
//! `Result` (to reject the request) or into a typed filter record.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single field-scoped validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Input field the message refers to
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for a field
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors raised when consuming a validation result
#[derive(Debug, Clone, Error)]
pub enum FilterError {
    /// The result was invalid; the request must be rejected
    #[error("Filter validation failed: {}", join_messages(.0))]
    Rejected(Vec<ValidationError>),

    /// Sanitized filters did not fit the typed filter record
    #[error("Malformed sanitized filters: {0}")]
    Malformed(String),
}

impl FilterError {
    /// Validation errors carried by a rejection (empty otherwise)
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            FilterError::Rejected(errors) => errors,
            FilterError::Malformed(_) => &[],
        }
    }
}

impl From<serde_json::Error> for FilterError {
    fn from(e: serde_json::Error) -> Self {
        FilterError::Malformed(e.to_string())
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for consuming filter validation
pub type FilterResult<T> = Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_is_message() {
        let err = ValidationError::new("limit", "Limit must be an integer between 1 and 100");
        assert_eq!(err.to_string(), "Limit must be an integer between 1 and 100");
    }

    #[test]
    fn test_rejected_joins_messages() {
        let err = FilterError::Rejected(vec![
            ValidationError::new("page", "Page must be a positive integer"),
            ValidationError::new("search", "Search term must be a string"),
        ]);
        assert_eq!(
            err.to_string(),
            "Filter validation failed: Page must be a positive integer; Search term must be a string"
        );
        assert_eq!(err.validation_errors().len(), 2);
    }
}
