//! Query layer configuration
//!
//! Loaded from a JSON file. Every field is optional; absent fields take
//! the defaults below, which are also what `QueryConfig::default()` returns.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event, Event, Logger, Severity};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    /// Config file is not valid JSON for this structure
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its allowed range
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Limits and defaults used by validation and recipes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page used when none is supplied (or pagination is invalid)
    pub default_page: u64,
    /// Page size used when none is supplied (or pagination is invalid)
    pub default_limit: u64,
    /// Largest accepted page size
    pub max_limit: u64,
    /// Largest accepted search radius, in kilometers
    pub max_radius_km: f64,
    /// Shortest accepted search term after trimming
    pub search_min_length: usize,
    /// Longest accepted search term after trimming
    pub search_max_length: usize,
    /// Default cap on array filters (services, ...)
    pub max_array_length: usize,
    /// Lowest log severity written ("trace", "info", "warn", "error")
    pub log_level: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_limit: 10,
            max_limit: 100,
            max_radius_km: 1000.0,
            search_min_length: 2,
            search_max_length: 100,
            max_array_length: 20,
            log_level: "warn".to_string(),
        }
    }
}

impl QueryConfig {
    /// Load configuration from file and apply its log level
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: QueryConfig = serde_json::from_str(&content)?;
        config.validate()?;
        config.apply_log_level();

        log_event(
            Event::ConfigLoaded,
            &[("path", &path.display().to_string())],
        );
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_page == 0 {
            return Err(ConfigError::Invalid("default_page must be >= 1".into()));
        }
        if self.max_limit == 0 {
            return Err(ConfigError::Invalid("max_limit must be >= 1".into()));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::Invalid(format!(
                "default_limit must be between 1 and max_limit ({})",
                self.max_limit
            )));
        }
        if !(self.max_radius_km.is_finite() && self.max_radius_km > 0.0) {
            return Err(ConfigError::Invalid("max_radius_km must be > 0".into()));
        }
        if self.search_min_length > self.search_max_length {
            return Err(ConfigError::Invalid(
                "search_min_length cannot exceed search_max_length".into(),
            ));
        }
        if self.max_array_length == 0 {
            return Err(ConfigError::Invalid("max_array_length must be >= 1".into()));
        }
        if Severity::from_name(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "Unknown log_level: '{}'",
                self.log_level
            )));
        }
        Ok(())
    }

    /// Set the process-wide logger threshold from `log_level`
    pub fn apply_log_level(&self) {
        if let Some(severity) = Severity::from_name(&self.log_level) {
            Logger::set_min_severity(severity);
        }
    }
}
