//! # Filter Builder
//!
//! Primitive validators. Each one inspects a single untrusted value and
//! returns a `FilterValidationResult`; none of them panic or return `Err`.
//!
//! Location and date-range groups are all-or-nothing: one bad field
//! invalidates the group and nothing from it is sanitized. Pagination is
//! the exception in the other direction: it always yields a usable page.

use serde_json::{json, Map, Value};

use super::coerce::{as_bool, as_datetime, as_integer, as_number, format_datetime};
use super::errors::ValidationError;
use super::result::FilterValidationResult;
use crate::config::QueryConfig;

/// Validates and sanitizes caller-supplied filter values
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    config: QueryConfig,
}

impl FilterBuilder {
    /// Builder with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with configured limits
    pub fn with_config(config: QueryConfig) -> Self {
        Self { config }
    }

    /// Limits in effect
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Validate a `{latitude, longitude, radius}` group (radius in km)
    pub fn validate_location(&self, location: &Value) -> FilterValidationResult {
        let Some(obj) = location.as_object() else {
            return FilterValidationResult::error(
                "location",
                "Location must be an object with latitude, longitude and radius",
            );
        };

        let mut errors = Vec::new();

        let latitude = obj
            .get("latitude")
            .and_then(as_number)
            .filter(|lat| (-90.0..=90.0).contains(lat));
        if latitude.is_none() {
            errors.push(ValidationError::new(
                "latitude",
                "Latitude must be a number between -90 and 90",
            ));
        }

        let longitude = obj
            .get("longitude")
            .and_then(as_number)
            .filter(|lon| (-180.0..=180.0).contains(lon));
        if longitude.is_none() {
            errors.push(ValidationError::new(
                "longitude",
                "Longitude must be a number between -180 and 180",
            ));
        }

        let max_radius = self.config.max_radius_km;
        let radius = obj
            .get("radius")
            .and_then(as_number)
            .filter(|r| *r > 0.0 && *r <= max_radius);
        if radius.is_none() {
            errors.push(ValidationError::new(
                "radius",
                format!("Radius must be a number greater than 0 and at most {} km", max_radius),
            ));
        }

        match (latitude, longitude, radius) {
            (Some(latitude), Some(longitude), Some(radius)) if errors.is_empty() => {
                let mut sanitized = Map::new();
                sanitized.insert("latitude".into(), json!(latitude));
                sanitized.insert("longitude".into(), json!(longitude));
                sanitized.insert("radius".into(), json!(radius));
                FilterValidationResult::from_parts(errors, sanitized)
            }
            _ => FilterValidationResult::invalid(errors),
        }
    }

    /// Validate an optional `{from?, to?}` date range
    pub fn validate_date_range(&self, range: Option<&Value>) -> FilterValidationResult {
        let Some(range) = range.filter(|r| !r.is_null()) else {
            return FilterValidationResult::valid();
        };
        let Some(obj) = range.as_object() else {
            return FilterValidationResult::error(
                "dateRange",
                "Date range must be an object with from and/or to",
            );
        };

        let mut errors = Vec::new();
        let mut sanitized = Map::new();

        let mut parse = |key: &str| {
            let raw = obj.get(key).filter(|v| !v.is_null())?;
            match as_datetime(raw) {
                Some(dt) => {
                    sanitized.insert(key.to_string(), Value::String(format_datetime(&dt)));
                    Some(dt)
                }
                None => {
                    errors.push(ValidationError::new(key, format!("Invalid {} date", key)));
                    None
                }
            }
        };
        let from = parse("from");
        let to = parse("to");

        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                errors.push(ValidationError::new(
                    "dateRange",
                    "From date must be before or equal to to date",
                ));
            }
        }

        FilterValidationResult::from_parts(errors, sanitized)
    }

    /// Validate `{page?, limit?}`. Always sanitizes a usable page: any error
    /// falls back to the configured defaults for both fields.
    pub fn validate_pagination(&self, pagination: &Value) -> FilterValidationResult {
        let default_page = self.config.default_page;
        let default_limit = self.config.default_limit;
        let max_limit = self.config.max_limit;

        let field = |key: &str| pagination.get(key).filter(|v| !v.is_null());
        let mut errors = Vec::new();

        let page = match field("page") {
            None => Some(default_page),
            Some(raw) => as_integer(raw).filter(|p| *p >= 1).map(|p| p as u64),
        };
        if page.is_none() {
            errors.push(ValidationError::new("page", "Page must be a positive integer"));
        }

        let limit = match field("limit") {
            None => Some(default_limit),
            Some(raw) => as_integer(raw)
                .filter(|l| *l >= 1 && (*l as u64) <= max_limit)
                .map(|l| l as u64),
        };
        if limit.is_none() {
            errors.push(ValidationError::new(
                "limit",
                format!("Limit must be an integer between 1 and {}", max_limit),
            ));
        }

        let (page, limit) = if errors.is_empty() {
            (page.unwrap_or(default_page), limit.unwrap_or(default_limit))
        } else {
            (default_page, default_limit)
        };

        let mut sanitized = Map::new();
        sanitized.insert("page".into(), json!(page));
        sanitized.insert("limit".into(), json!(limit));

        FilterValidationResult {
            is_valid: errors.is_empty(),
            errors,
            sanitized,
        }
    }

    /// Validate a `{min?, max?}` numeric range, optionally bounded
    pub fn validate_numeric_range(
        &self,
        range: &Value,
        field_name: &str,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> FilterValidationResult {
        let Some(obj) = range.as_object() else {
            return FilterValidationResult::error(
                field_name,
                format!("{} must be an object with min and/or max", field_name),
            );
        };

        let mut errors = Vec::new();
        let mut sanitized = Map::new();
        let mut bound = |key: &str| {
            let raw = obj.get(key).filter(|v| !v.is_null())?;
            let Some(n) = as_number(raw) else {
                errors.push(ValidationError::new(
                    field_name,
                    format!("{} {} must be a valid number", field_name, key),
                ));
                return None;
            };
            if let Some(lower) = lower.filter(|lo| n < *lo) {
                errors.push(ValidationError::new(
                    field_name,
                    format!("{} {} must be at least {}", field_name, key, lower),
                ));
            }
            if let Some(upper) = upper.filter(|hi| n > *hi) {
                errors.push(ValidationError::new(
                    field_name,
                    format!("{} {} must be at most {}", field_name, key, upper),
                ));
            }
            sanitized.insert(key.to_string(), json!(n));
            Some(n)
        };
        let min = bound("min");
        let max = bound("max");

        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                errors.push(ValidationError::new(
                    field_name,
                    format!("{} min cannot be greater than max", field_name),
                ));
            }
        }

        FilterValidationResult::from_parts(errors, sanitized)
    }

    /// Validate an array of strings, optionally restricted to `allowed`
    /// and capped at `max_length`
    pub fn validate_array(
        &self,
        value: &Value,
        field_name: &str,
        allowed: Option<&[&str]>,
        max_length: Option<usize>,
    ) -> FilterValidationResult {
        let items: Vec<Value> = match value {
            Value::Array(items) => items.clone(),
            Value::String(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
            _ => {
                return FilterValidationResult::error(
                    field_name,
                    format!("{} must be an array", field_name),
                )
            }
        };

        let mut errors = Vec::new();

        if let Some(max_length) = max_length.filter(|max| items.len() > *max) {
            errors.push(ValidationError::new(
                field_name,
                format!("{} cannot contain more than {} items", field_name, max_length),
            ));
        }

        if let Some(allowed) = allowed {
            let invalid: Vec<String> = items
                .iter()
                .filter(|item| !item.as_str().is_some_and(|s| allowed.contains(&s)))
                .map(display_value)
                .collect();
            if !invalid.is_empty() {
                errors.push(ValidationError::new(
                    field_name,
                    format!(
                        "{} contains invalid values: {}. Allowed values: {}",
                        field_name,
                        invalid.join(", "),
                        allowed.join(", ")
                    ),
                ));
            }
        }

        let mut sanitized = Map::new();
        sanitized.insert(field_name.to_string(), Value::Array(items));
        FilterValidationResult::from_parts(errors, sanitized)
    }

    /// Validate a free-text search term; blank terms are a no-op
    pub fn validate_search_term(&self, term: &Value) -> FilterValidationResult {
        let Some(term) = term.as_str() else {
            return FilterValidationResult::error("search", "Search term must be a string");
        };
        let term = term.trim();
        if term.is_empty() {
            return FilterValidationResult::valid();
        }

        let min = self.config.search_min_length;
        let max = self.config.search_max_length;
        let len = term.chars().count();
        if len < min || len > max {
            return FilterValidationResult::error(
                "search",
                format!("Search term must be between {} and {} characters", min, max),
            );
        }
        FilterValidationResult::valid_field("search", Value::String(term.to_string()))
    }

    /// Validate a 24-character hexadecimal document id
    pub fn validate_object_id(&self, id: &Value, field_name: &str) -> FilterValidationResult {
        match id.as_str().map(str::trim) {
            Some(id) if is_object_id(id) => {
                FilterValidationResult::valid_field(field_name, Value::String(id.to_string()))
            }
            _ => FilterValidationResult::error(field_name, format!("Invalid {} format", field_name)),
        }
    }

    /// Validate membership in a fixed set of strings
    pub fn validate_enum(
        &self,
        value: &Value,
        field_name: &str,
        allowed: &[&str],
    ) -> FilterValidationResult {
        match value.as_str() {
            Some(s) if allowed.contains(&s) => {
                FilterValidationResult::valid_field(field_name, Value::String(s.to_string()))
            }
            _ => FilterValidationResult::error(
                field_name,
                format!("{} must be one of: {}", field_name, allowed.join(", ")),
            ),
        }
    }

    /// Validate a boolean or "true"/"false" string
    pub fn validate_boolean(&self, value: &Value, field_name: &str) -> FilterValidationResult {
        match as_bool(value) {
            Some(b) => FilterValidationResult::valid_field(field_name, Value::Bool(b)),
            None => FilterValidationResult::error(
                field_name,
                format!("{} must be a boolean", field_name),
            ),
        }
    }
}

fn is_object_id(id: &str) -> bool {
    id.len() == 24 && id.chars().all(|c| c.is_ascii_hexdigit())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
