//! Typed filter records
//!
//! Sanitized maps deserialize into these records before they reach the
//! query recipes, so recipes never look at raw JSON.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::FilterResult;
use super::result::SanitizedFilters;
use crate::query::{DateRange, GeoQuery, PageRequest, SortDirection};

/// Conversion from a sanitized filter map
pub trait FromSanitized: DeserializeOwned {
    /// Deserialize from sanitized filters (unknown keys are ignored)
    fn from_sanitized(sanitized: &SanitizedFilters) -> FilterResult<Self> {
        Ok(serde_json::from_value(Value::Object(sanitized.clone()))?)
    }
}

/// Fields shared by every entity search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonFilters {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortDirection>,
    pub date_range: Option<DateRange>,
}

impl CommonFilters {
    /// Requested page, defaulting missing parts
    pub fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.limit.unwrap_or(defaults.limit),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSearchFilters {
    #[serde(flatten)]
    pub common: CommonFilters,
    pub min_rating: Option<f64>,
    pub min_hourly_rate: Option<f64>,
    pub max_hourly_rate: Option<f64>,
    pub location: Option<GeoQuery>,
    pub category: Option<String>,
    pub services: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub is_verified: Option<bool>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSearchFilters {
    #[serde(flatten)]
    pub common: CommonFilters,
    pub status: Option<String>,
    pub urgency: Option<String>,
    pub category: Option<String>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
    pub location: Option<GeoQuery>,
    pub customer_id: Option<String>,
    pub provider_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSearchFilters {
    #[serde(flatten)]
    pub common: CommonFilters,
    pub provider_id: Option<String>,
    pub customer_id: Option<String>,
    pub request_id: Option<String>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub is_verified: Option<bool>,
    pub has_response: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchFilters {
    #[serde(flatten)]
    pub common: CommonFilters,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSearchFilters {
    #[serde(flatten)]
    pub common: CommonFilters,
    pub participant_id: Option<String>,
    pub request_id: Option<String>,
    pub is_active: Option<bool>,
}

impl FromSanitized for CommonFilters {}
impl FromSanitized for ProviderSearchFilters {}
impl FromSanitized for RequestSearchFilters {}
impl FromSanitized for ReviewSearchFilters {}
impl FromSanitized for UserSearchFilters {}
impl FromSanitized for ChatSearchFilters {}
