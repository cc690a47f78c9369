//! Structured arguments for compiler calls

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Meters per kilometer
pub const METERS_PER_KM: f64 = 1000.0;

/// Proximity search; radius in kilometers as callers supply it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "radius")]
    pub radius_km: f64,
}

impl GeoQuery {
    pub fn new(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_km,
        }
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_km * METERS_PER_KM
    }
}

/// Inclusive date range; either side may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Case-insensitive (by default) substring search across fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextSearch {
    pub term: String,
    pub fields: Vec<String>,
    pub case_sensitive: bool,
}

impl TextSearch {
    pub fn new<I, S>(term: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            term: term.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}
