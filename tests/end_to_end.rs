//! End-to-End Tests
//!
//! Tests for the full request path:
//! - Raw input is validated and rejected before compilation
//! - Sanitized input compiles into the expected plan
//! - Plans execute against the in-memory store with correct totals

use hubquery::filter::{
    FilterBuilder, FilterError, FromSanitized, ProviderSearchFilters, RequestSearchFilters,
};
use hubquery::executor::{MemoryStore, PlanExecutor};
use hubquery::query::{Constraint, QueryCompiler, RangeBounds};
use serde_json::{json, Map, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

fn providers() -> MemoryStore {
    MemoryStore::from_json(json!({
        "providers": [
            {
                "_id": "p1", "businessName": "Ada Plumbing", "rating": 4.8,
                "hourlyRate": 45, "isVerified": true, "categories": ["plumbing"],
                "location": {"type": "Point", "coordinates": [-0.1276, 51.5072]},
                "createdAt": "2024-01-10T09:00:00Z"
            },
            {
                "_id": "p2", "businessName": "Bright Sparks", "rating": 4.2,
                "hourlyRate": 60, "isVerified": true, "categories": ["electrical"],
                "location": {"type": "Point", "coordinates": [-0.1426, 51.5010]},
                "createdAt": "2024-02-01T09:00:00Z"
            },
            {
                "_id": "p3", "businessName": "Leeds Pipes", "rating": 4.9,
                "hourlyRate": 30, "isVerified": false, "categories": ["plumbing"],
                "location": {"type": "Point", "coordinates": [-1.5491, 53.8008]},
                "createdAt": "2023-12-01T09:00:00Z"
            },
            {
                "_id": "p4", "businessName": "Clean Sweep", "rating": 3.1,
                "hourlyRate": 20, "isVerified": true, "categories": ["cleaning"],
                "createdAt": "2024-03-01T09:00:00Z"
            }
        ]
    }))
    .unwrap()
}

fn provider_plan(input: Value) -> hubquery::query::QueryPlan {
    let sanitized = FilterBuilder::new()
        .validate_provider_search(&object(input))
        .into_sanitized()
        .unwrap();
    let filters = ProviderSearchFilters::from_sanitized(&sanitized).unwrap();
    QueryCompiler::new().for_provider_search(&filters).compile()
}

// =============================================================================
// Validation To Plan Tests
// =============================================================================

/// An over-limit page makes the whole request invalid; the valid
/// rating fragment alone compiles to a single range.
#[test]
fn test_limit_rejection_and_rating_plan() {
    let builder = FilterBuilder::new();
    let input = object(json!({"page": "2", "limit": "200", "minRating": 4}));

    let result = builder.validate_provider_search(&input);
    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(
        result.errors[0].message,
        "Limit must be an integer between 1 and 100"
    );
    assert_eq!(result.sanitized.get("page"), Some(&json!(1)));
    assert_eq!(result.sanitized.get("limit"), Some(&json!(10)));
    assert!(matches!(
        result.into_sanitized(),
        Err(FilterError::Rejected(_))
    ));

    let plan = provider_plan(json!({"minRating": 4}));
    assert_eq!(plan.predicates().len(), 1);
    assert_eq!(
        plan.predicates().get("rating"),
        Some(&Constraint::Range(RangeBounds::new(Some(json!(4.0)), None)))
    );
    assert_eq!(plan.pagination().skip, 0);
    assert_eq!(plan.pagination().limit, Some(10));
}

/// Sanitized request filters flow into the request recipe.
#[test]
fn test_request_filters_to_plan() {
    let input = object(json!({
        "status": "pending",
        "minBudget": "50",
        "dateRange": {"from": "2024-01-01"},
        "page": 3,
        "limit": 5,
    }));
    let sanitized = FilterBuilder::new()
        .validate_request_search(&input)
        .into_sanitized()
        .unwrap();
    let filters = RequestSearchFilters::from_sanitized(&sanitized).unwrap();
    let plan = QueryCompiler::new().for_request_search(&filters).compile();

    assert_eq!(plan.predicates().fields(), vec!["status", "budget", "createdAt"]);
    assert_eq!(
        plan.predicates().get("createdAt"),
        Some(&Constraint::Range(RangeBounds::new(
            Some(json!("2024-01-01T00:00:00.000Z")),
            None
        )))
    );
    assert_eq!(plan.pagination().skip, 10);
    assert_eq!(plan.pagination().limit, Some(5));
}

/// A provider date range filters on creation time.
#[test]
fn test_provider_date_range_to_plan() {
    let plan = provider_plan(json!({
        "dateRange": {"from": "2024-01-01", "to": "2024-02-01"},
    }));

    assert_eq!(plan.predicates().fields(), vec!["createdAt"]);
    assert_eq!(
        plan.predicates().get("createdAt"),
        Some(&Constraint::Range(RangeBounds::new(
            Some(json!("2024-01-01T00:00:00.000Z")),
            Some(json!("2024-02-01T00:00:00.000Z"))
        )))
    );
}

// =============================================================================
// Execution Tests
// =============================================================================

/// Rating filter plus the default sort, end to end.
#[tokio::test]
async fn test_execute_provider_rating_search() {
    let store = providers();
    let plan = provider_plan(json!({"minRating": "4"}));

    let page = store.execute("providers", &plan).await.unwrap();
    let ids: Vec<&str> = page.data.iter().filter_map(|d| d["_id"].as_str()).collect();

    assert_eq!(ids, vec!["p3", "p1", "p2"]);
    assert_eq!(page.total, 3);
    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 1);
}

/// Proximity search keeps only nearby providers.
#[tokio::test]
async fn test_execute_proximity_search() {
    let store = providers();
    let plan = provider_plan(json!({
        "location": {"latitude": 51.5072, "longitude": -0.1276, "radius": 5},
        "sortBy": "hourlyRate",
        "sortOrder": "asc",
    }));

    let page = store.execute("providers", &plan).await.unwrap();
    let ids: Vec<&str> = page.data.iter().filter_map(|d| d["_id"].as_str()).collect();

    assert_eq!(ids, vec!["p1", "p2"]);
}

/// Text search, category and verification combine.
#[tokio::test]
async fn test_execute_combined_filters() {
    let store = providers();
    let plan = provider_plan(json!({
        "search": "pipes",
        "category": "plumbing",
    }));

    let page = store.execute("providers", &plan).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0]["_id"], json!("p3"));

    let verified = provider_plan(json!({"category": "plumbing", "isVerified": "true"}));
    let page = store.execute("providers", &verified).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0]["_id"], json!("p1"));
}

/// Total counts every match; data holds one page.
#[tokio::test]
async fn test_execute_pagination_totals() {
    let store = providers();
    let plan = provider_plan(json!({"page": 2, "limit": 3}));

    let page = store.execute("providers", &plan).await.unwrap();

    assert_eq!(page.total, 4);
    assert_eq!(page.len(), 1);
    assert_eq!(page.total_pages, 2);
    assert!(!page.has_next());
    assert_eq!(page.data[0]["_id"], json!("p4"));

    let metrics = store.metrics();
    assert_eq!(metrics.queries_executed, 1);
    assert_eq!(metrics.documents_returned, 1);
}

/// Only providers created inside the range are returned.
#[tokio::test]
async fn test_execute_provider_date_range() {
    let store = providers();
    let plan = provider_plan(json!({
        "dateRange": {"from": "2024-01-01", "to": "2024-02-01"},
    }));

    let page = store.execute("providers", &plan).await.unwrap();
    let ids: Vec<&str> = page.data.iter().filter_map(|d| d["_id"].as_str()).collect();

    assert_eq!(ids, vec!["p1"]);
}

/// A bare sortOrder reverses the default primary key.
#[tokio::test]
async fn test_execute_sort_order_without_sort_by() {
    let store = providers();
    let plan = provider_plan(json!({"sortOrder": "asc"}));

    let page = store.execute("providers", &plan).await.unwrap();
    let ids: Vec<&str> = page.data.iter().filter_map(|d| d["_id"].as_str()).collect();

    assert_eq!(ids, vec!["p4", "p2", "p1", "p3"]);
}
