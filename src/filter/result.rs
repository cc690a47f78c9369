//! # Validation Result
//!
//! Every validator, primitive or composite, returns the same shape so
//! composites can merge mechanically: concatenate errors, extend the
//! sanitized map, AND the validity.

use serde::Serialize;
use serde_json::{Map, Value};

use super::errors::{FilterError, FilterResult, ValidationError};

/// Sanitized filter fields keyed by their input name
pub type SanitizedFilters = Map<String, Value>;

/// Outcome of validating one filter group
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterValidationResult {
    /// False if any error was recorded
    pub is_valid: bool,
    /// Errors in the order validators produced them
    pub errors: Vec<ValidationError>,
    /// Fields that passed validation
    #[serde(rename = "sanitizedFilters")]
    pub sanitized: SanitizedFilters,
}

impl FilterValidationResult {
    /// A valid result with nothing sanitized (absent input)
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            sanitized: Map::new(),
        }
    }

    /// A valid result carrying one sanitized field
    pub fn valid_field(key: impl Into<String>, value: Value) -> Self {
        let mut result = Self::valid();
        result.sanitized.insert(key.into(), value);
        result
    }

    /// An invalid result with the given errors and nothing sanitized
    pub fn invalid(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: false,
            errors,
            sanitized: Map::new(),
        }
    }

    /// An invalid result with a single error
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::invalid(vec![ValidationError::new(field, message)])
    }

    /// Build a result from collected errors: valid with `sanitized` when
    /// there are none, otherwise invalid with nothing sanitized.
    pub fn from_parts(errors: Vec<ValidationError>, sanitized: SanitizedFilters) -> Self {
        if errors.is_empty() {
            Self {
                is_valid: true,
                errors,
                sanitized,
            }
        } else {
            Self::invalid(errors)
        }
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: FilterValidationResult) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
        self.sanitized.extend(other.sanitized);
    }

    /// Merge another result, moving its sanitized fields under `key`
    /// as a nested object (skipped when nothing was sanitized)
    pub fn merge_nested(&mut self, key: &str, mut other: FilterValidationResult) {
        let nested = std::mem::take(&mut other.sanitized);
        if !nested.is_empty() {
            other.sanitized.insert(key.to_string(), Value::Object(nested));
        }
        self.merge(other);
    }

    /// Rename sanitized keys, dropping keys not listed
    pub fn renamed(mut self, renames: &[(&str, &str)]) -> Self {
        let mut sanitized = Map::new();
        for (from, to) in renames {
            if let Some(value) = self.sanitized.remove(*from) {
                sanitized.insert((*to).to_string(), value);
            }
        }
        self.sanitized = sanitized;
        self
    }

    /// Error messages in order
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    /// Sanitized filters, or a rejection if the result is invalid
    pub fn into_sanitized(self) -> FilterResult<SanitizedFilters> {
        if self.is_valid {
            Ok(self.sanitized)
        } else {
            Err(FilterError::Rejected(self.errors))
        }
    }
}
