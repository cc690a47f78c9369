//! # Composite Validators
//!
//! Per-entity validators. Each one runs every applicable primitive on the
//! raw input map, never stopping at the first failure, and merges the
//! results under entity keys.

use serde_json::{Map, Value};

use super::builder::FilterBuilder;
use super::coerce::is_present;
use super::result::FilterValidationResult;
use crate::observability::{log_event, Event};

/// Service categories offered on the marketplace
pub const SERVICE_CATEGORIES: &[&str] = &[
    "plumbing",
    "electrical",
    "cleaning",
    "carpentry",
    "painting",
    "gardening",
    "moving",
    "appliance_repair",
    "hvac",
    "pest_control",
    "handyman",
    "other",
];

/// Service request lifecycle states
pub const REQUEST_STATUSES: &[&str] =
    &["pending", "accepted", "in_progress", "completed", "cancelled"];

/// Service request urgency levels
pub const URGENCY_LEVELS: &[&str] = &["low", "medium", "high", "urgent"];

/// User roles
pub const USER_ROLES: &[&str] = &["customer", "provider", "admin"];

/// Accepted `sortOrder` values
pub const SORT_ORDERS: &[&str] = &["asc", "desc"];

pub const PROVIDER_SORT_FIELDS: &[&str] = &["rating", "hourlyRate", "reviewCount", "createdAt"];
pub const REQUEST_SORT_FIELDS: &[&str] = &["createdAt", "budget", "preferredDate", "urgency"];
pub const REVIEW_SORT_FIELDS: &[&str] = &["createdAt", "rating"];
pub const USER_SORT_FIELDS: &[&str] = &["createdAt", "firstName", "lastName", "email"];
pub const CHAT_SORT_FIELDS: &[&str] = &["updatedAt", "createdAt"];

const MAX_LANGUAGES: usize = 10;

impl FilterBuilder {
    /// Pagination, search, sort order and date range
    pub fn validate_common_filters(&self, input: &Map<String, Value>) -> FilterValidationResult {
        let mut result = FilterValidationResult::valid();

        let mut pagination = Map::new();
        for key in ["page", "limit"] {
            if let Some(value) = input.get(key) {
                pagination.insert(key.to_string(), value.clone());
            }
        }
        result.merge(self.validate_pagination(&Value::Object(pagination)));

        if let Some(search) = present(input, "search") {
            result.merge(self.validate_search_term(search));
        }
        if let Some(order) = present(input, "sortOrder") {
            result.merge(self.validate_enum(order, "sortOrder", SORT_ORDERS));
        }
        result.merge_nested(
            "dateRange",
            self.validate_date_range(input.get("dateRange")),
        );

        result
    }

    /// Provider search: rating, hourly rate, location, category, services,
    /// languages and availability flags
    pub fn validate_provider_search(&self, input: &Map<String, Value>) -> FilterValidationResult {
        let mut result = self.validate_common_filters(input);
        self.merge_sort_by(&mut result, input, PROVIDER_SORT_FIELDS);

        if let Some(min_rating) = present(input, "minRating") {
            let range = single_bound("min", min_rating);
            result.merge(
                self.validate_numeric_range(&range, "Rating", Some(0.0), Some(5.0))
                    .renamed(&[("min", "minRating")]),
            );
        }

        let rate = bounds(input, "minHourlyRate", "maxHourlyRate");
        if !rate.is_empty() {
            result.merge(
                self.validate_numeric_range(&Value::Object(rate), "Hourly rate", Some(0.0), None)
                    .renamed(&[("min", "minHourlyRate"), ("max", "maxHourlyRate")]),
            );
        }

        self.merge_location(&mut result, input);

        if let Some(category) = present(input, "category") {
            result.merge(self.validate_enum(category, "category", SERVICE_CATEGORIES));
        }
        if let Some(services) = present(input, "services") {
            let max = self.config().max_array_length;
            result.merge(self.validate_array(services, "services", Some(SERVICE_CATEGORIES), Some(max)));
        }
        if let Some(languages) = present(input, "languages") {
            result.merge(self.validate_array(languages, "languages", None, Some(MAX_LANGUAGES)));
        }
        for flag in ["isVerified", "isAvailable"] {
            if let Some(value) = present(input, flag) {
                result.merge(self.validate_boolean(value, flag));
            }
        }

        finish("providers", result)
    }

    /// Service request search: status, urgency, category, budget, location
    /// and party ids
    pub fn validate_request_search(&self, input: &Map<String, Value>) -> FilterValidationResult {
        let mut result = self.validate_common_filters(input);
        self.merge_sort_by(&mut result, input, REQUEST_SORT_FIELDS);

        if let Some(status) = present(input, "status") {
            result.merge(self.validate_enum(status, "status", REQUEST_STATUSES));
        }
        if let Some(urgency) = present(input, "urgency") {
            result.merge(self.validate_enum(urgency, "urgency", URGENCY_LEVELS));
        }
        if let Some(category) = present(input, "category") {
            result.merge(self.validate_enum(category, "category", SERVICE_CATEGORIES));
        }

        let budget = bounds(input, "minBudget", "maxBudget");
        if !budget.is_empty() {
            result.merge(
                self.validate_numeric_range(&Value::Object(budget), "Budget", Some(0.0), None)
                    .renamed(&[("min", "minBudget"), ("max", "maxBudget")]),
            );
        }

        self.merge_location(&mut result, input);
        self.merge_object_ids(&mut result, input, &["customerId", "providerId"]);

        finish("requests", result)
    }

    /// Review search: party ids, rating bounds, verification and response
    pub fn validate_review_search(&self, input: &Map<String, Value>) -> FilterValidationResult {
        let mut result = self.validate_common_filters(input);
        self.merge_sort_by(&mut result, input, REVIEW_SORT_FIELDS);
        self.merge_object_ids(&mut result, input, &["providerId", "customerId", "requestId"]);

        let rating = bounds(input, "minRating", "maxRating");
        if !rating.is_empty() {
            result.merge(
                self.validate_numeric_range(&Value::Object(rating), "Rating", Some(1.0), Some(5.0))
                    .renamed(&[("min", "minRating"), ("max", "maxRating")]),
            );
        }
        for flag in ["isVerified", "hasResponse"] {
            if let Some(value) = present(input, flag) {
                result.merge(self.validate_boolean(value, flag));
            }
        }

        finish("reviews", result)
    }

    /// User search: role and account flags
    pub fn validate_user_search(&self, input: &Map<String, Value>) -> FilterValidationResult {
        let mut result = self.validate_common_filters(input);
        self.merge_sort_by(&mut result, input, USER_SORT_FIELDS);

        if let Some(role) = present(input, "role") {
            result.merge(self.validate_enum(role, "role", USER_ROLES));
        }
        for flag in ["isActive", "isVerified"] {
            if let Some(value) = present(input, flag) {
                result.merge(self.validate_boolean(value, flag));
            }
        }

        finish("users", result)
    }

    /// Chat search: participant, request and activity
    pub fn validate_chat_search(&self, input: &Map<String, Value>) -> FilterValidationResult {
        let mut result = self.validate_common_filters(input);
        self.merge_sort_by(&mut result, input, CHAT_SORT_FIELDS);
        self.merge_object_ids(&mut result, input, &["participantId", "requestId"]);

        if let Some(value) = present(input, "isActive") {
            result.merge(self.validate_boolean(value, "isActive"));
        }

        finish("chats", result)
    }

    fn merge_sort_by(
        &self,
        result: &mut FilterValidationResult,
        input: &Map<String, Value>,
        allowed: &[&str],
    ) {
        if let Some(sort_by) = present(input, "sortBy") {
            result.merge(self.validate_enum(sort_by, "sortBy", allowed));
        }
    }

    /// Location may arrive as a `location` object or as top-level
    /// `latitude`/`longitude`/`radius` keys
    fn merge_location(&self, result: &mut FilterValidationResult, input: &Map<String, Value>) {
        let location = match present(input, "location") {
            Some(location) => Some(location.clone()),
            None => {
                let mut parts = Map::new();
                for key in ["latitude", "longitude", "radius"] {
                    if let Some(value) = present(input, key) {
                        parts.insert(key.to_string(), value.clone());
                    }
                }
                (!parts.is_empty()).then_some(Value::Object(parts))
            }
        };
        if let Some(location) = location {
            result.merge_nested("location", self.validate_location(&location));
        }
    }

    fn merge_object_ids(
        &self,
        result: &mut FilterValidationResult,
        input: &Map<String, Value>,
        keys: &[&str],
    ) {
        for key in keys {
            if let Some(id) = present(input, key) {
                result.merge(self.validate_object_id(id, key));
            }
        }
    }
}

fn present<'a>(input: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let value = input.get(key);
    is_present(value).then_some(value).flatten()
}

fn single_bound(key: &str, value: &Value) -> Value {
    let mut range = Map::new();
    range.insert(key.to_string(), value.clone());
    Value::Object(range)
}

fn bounds(input: &Map<String, Value>, min_key: &str, max_key: &str) -> Map<String, Value> {
    let mut range = Map::new();
    if let Some(min) = present(input, min_key) {
        range.insert("min".to_string(), min.clone());
    }
    if let Some(max) = present(input, max_key) {
        range.insert("max".to_string(), max.clone());
    }
    range
}

fn finish(entity: &str, result: FilterValidationResult) -> FilterValidationResult {
    if !result.is_valid {
        let count = result.errors.len().to_string();
        let fields = result
            .errors
            .iter()
            .map(|e| e.field.as_str())
            .collect::<Vec<_>>()
            .join(",");
        log_event(
            Event::FilterValidationRejected,
            &[("entity", entity), ("errors", &count), ("fields", &fields)],
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_common_filters_always_sanitize_page() {
        let result = FilterBuilder::new().validate_common_filters(&Map::new());
        assert!(result.is_valid);
        assert_eq!(result.sanitized["page"], json!(1));
        assert_eq!(result.sanitized["limit"], json!(10));
        assert!(!result.sanitized.contains_key("dateRange"));
    }

    #[test]
    fn test_provider_search_limit_error_keeps_other_fields() {
        let input = map(json!({"page": "2", "limit": "200", "minRating": 4}));
        let result = FilterBuilder::new().validate_provider_search(&input);

        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "limit");
        assert_eq!(result.sanitized["page"], json!(1));
        assert_eq!(result.sanitized["limit"], json!(10));
        assert_eq!(result.sanitized["minRating"], json!(4.0));
    }

    #[test]
    fn test_provider_search_collects_every_error() {
        let input = map(json!({
            "minRating": 7,
            "minHourlyRate": 80,
            "maxHourlyRate": 20,
            "latitude": 100,
            "longitude": 10,
            "radius": 5,
            "category": "juggling",
            "isVerified": "maybe"
        }));
        let result = FilterBuilder::new().validate_provider_search(&input);

        let fields: Vec<_> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["Rating", "Hourly rate", "latitude", "category", "isVerified"]
        );
        assert!(!result.sanitized.contains_key("location"));
    }

    #[test]
    fn test_provider_search_location_nested() {
        let input = map(json!({"latitude": "51.5", "longitude": "-0.12", "radius": "10"}));
        let result = FilterBuilder::new().validate_provider_search(&input);

        assert!(result.is_valid);
        assert_eq!(
            result.sanitized["location"],
            json!({"latitude": 51.5, "longitude": -0.12, "radius": 10.0})
        );
    }

    #[test]
    fn test_request_search_enums_and_budget() {
        let input = map(json!({
            "status": "in_progress",
            "urgency": "urgent",
            "minBudget": "100",
            "customerId": "507f1f77bcf86cd799439011"
        }));
        let result = FilterBuilder::new().validate_request_search(&input);

        assert!(result.is_valid);
        assert_eq!(result.sanitized["status"], json!("in_progress"));
        assert_eq!(result.sanitized["minBudget"], json!(100.0));
        assert!(!result.sanitized.contains_key("maxBudget"));
        assert_eq!(result.sanitized["customerId"], json!("507f1f77bcf86cd799439011"));
    }

    #[test]
    fn test_review_search_rating_bounds() {
        let input = map(json!({"minRating": 0, "maxRating": 6}));
        let result = FilterBuilder::new().validate_review_search(&input);
        assert_eq!(
            result.messages(),
            vec!["Rating min must be at least 1", "Rating max must be at most 5"]
        );
    }

    #[test]
    fn test_user_and_chat_search() {
        let users = FilterBuilder::new()
            .validate_user_search(&map(json!({"role": "admin", "isActive": "false"})));
        assert!(users.is_valid);
        assert_eq!(users.sanitized["isActive"], json!(false));

        let chats = FilterBuilder::new()
            .validate_chat_search(&map(json!({"participantId": "nope", "sortBy": "lastSeen"})));
        assert_eq!(chats.errors.len(), 2);
    }

    #[test]
    fn test_null_fields_are_absent() {
        let input = map(json!({"search": null, "category": null, "dateRange": null}));
        let result = FilterBuilder::new().validate_provider_search(&input);
        assert!(result.is_valid);
        assert_eq!(result.sanitized.len(), 2);
    }
}
