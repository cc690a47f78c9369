//! Query Compiler Tests
//!
//! Tests for compiler invariants:
//! - compile() is a pure snapshot
//! - Range bounds on one field merge into a single predicate
//! - Empty inputs are no-ops
//! - Entity recipes apply their default sort and pagination

use hubquery::filter::{
    CommonFilters, ProviderSearchFilters, RequestSearchFilters, ReviewSearchFilters,
};
use hubquery::query::{
    chat_default_sort, created_default_sort, provider_default_sort, Constraint, GeoCircle,
    GeoQuery, PageRequest, Predicate, QueryCompiler, RangeBounds, SortDirection, SortSpec,
    TextSearch,
};
use serde_json::json;

// =============================================================================
// Snapshot Tests
// =============================================================================

/// Compiling twice without mutation gives equal plans.
#[test]
fn test_compile_is_idempotent() {
    let mut compiler = QueryCompiler::new();
    compiler
        .equals("status", "pending")
        .range("budget", Some(100), Some(500))
        .sort(SortSpec::new().desc("createdAt"))
        .paginate(PageRequest::new(3, 20));

    let first = compiler.compile();
    let second = compiler.compile();

    assert_eq!(first, second);
    assert_eq!(first.pagination().skip, 40);
    assert_eq!(first.pagination().limit, Some(20));
}

/// Mutating after compile leaves the earlier plan untouched.
#[test]
fn test_plan_is_detached_from_builder() {
    let mut compiler = QueryCompiler::new();
    compiler.equals("isActive", true);
    let plan = compiler.compile();

    compiler.equals("role", "admin").limit(5);

    assert_eq!(plan.predicates().len(), 1);
    assert_eq!(plan.pagination().limit, None);
    assert_eq!(compiler.compile().predicates().len(), 2);
}

/// clear() returns the builder to its initial state.
#[test]
fn test_clear_resets_everything() {
    let mut compiler = QueryCompiler::new();
    compiler
        .equals("a", 1)
        .sort(SortSpec::new().asc("a"))
        .skip(10)
        .limit(10);
    compiler.clear();

    assert_eq!(compiler, QueryCompiler::default());
    assert!(compiler.compile().predicates().is_empty());
}

// =============================================================================
// Predicate Tests
// =============================================================================

/// Two half-open ranges on one field merge.
#[test]
fn test_range_merge() {
    let mut compiler = QueryCompiler::new();
    compiler
        .range("price", Some(10), None::<i64>)
        .range("price", None::<i64>, Some(50));

    let plan = compiler.compile();
    assert_eq!(plan.predicates().len(), 1);
    assert_eq!(
        plan.predicates().get("price"),
        Some(&Constraint::Range(RangeBounds::new(
            Some(json!(10)),
            Some(json!(50))
        )))
    );
}

/// Re-setting a non-range field replaces it in place.
#[test]
fn test_equals_replaces_in_place() {
    let mut compiler = QueryCompiler::new();
    compiler
        .equals("status", "pending")
        .equals("urgency", "high")
        .equals("status", "accepted");

    let tree = compiler.tree();
    assert_eq!(tree.fields(), vec!["status", "urgency"]);
    assert_eq!(tree.get("status"), Some(&Constraint::Equals(json!("accepted"))));
}

/// Empty membership lists and blank search terms add nothing.
#[test]
fn test_empty_inputs_are_noops() {
    let mut compiler = QueryCompiler::new();
    compiler.equals("isActive", true);
    let before = compiler.tree().clone();

    compiler
        .in_values("services", Vec::<String>::new())
        .text_search(&TextSearch::new("", ["businessName", "description"]))
        .text_search(&TextSearch::new("   ", ["businessName"]))
        .text_search(&TextSearch::new("plumber", Vec::<String>::new()))
        .range("price", None::<f64>, None::<f64>)
        .or(Vec::new())
        .and(Vec::new());

    assert_eq!(compiler.tree(), &before);
}

/// Text search is an Or of escaped, case-insensitive regexes.
#[test]
fn test_text_search_branches() {
    let mut compiler = QueryCompiler::new();
    compiler.text_search(&TextSearch::new("c++ (pro)", ["title", "description"]));

    let predicates = compiler.tree().predicates();
    assert_eq!(predicates.len(), 1);
    let Predicate::Or(branches) = &predicates[0] else {
        panic!("expected or group, got {:?}", predicates[0]);
    };
    assert_eq!(branches.len(), 2);
    assert_eq!(
        branches[1].get("description"),
        Some(&Constraint::Regex {
            pattern: r"c\+\+ \(pro\)".to_string(),
            case_sensitive: false,
        })
    );
}

/// The kilometer radius becomes meters exactly once.
#[test]
fn test_geo_near_converts_radius() {
    let mut compiler = QueryCompiler::new();
    compiler.geo_near("location", &GeoQuery::new(40.7, -74.0, 2.5));

    let first = compiler.compile();
    let second = compiler.compile();
    let expected = Constraint::GeoNear(GeoCircle {
        latitude: 40.7,
        longitude: -74.0,
        radius_meters: 2500.0,
    });
    assert_eq!(first.predicates().get("location"), Some(&expected));
    assert_eq!(second.predicates().get("location"), Some(&expected));
}

/// Sort keys keep first position; last direction wins.
#[test]
fn test_sort_last_write_wins() {
    let mut compiler = QueryCompiler::new();
    compiler
        .sort(SortSpec::new().desc("rating").asc("createdAt"))
        .sort(SortSpec::new().asc("rating"));

    let sort = compiler.compile().sort().clone();
    let fields: Vec<&str> = sort.iter().map(|s| s.field.as_str()).collect();
    assert_eq!(fields, vec!["rating", "createdAt"]);
    assert_eq!(sort.direction_of("rating"), Some(SortDirection::Asc));
}

// =============================================================================
// Recipe Tests
// =============================================================================

/// Hourly rate bounds become one Range predicate.
#[test]
fn test_provider_hourly_rate_single_range() {
    let filters = ProviderSearchFilters {
        min_hourly_rate: Some(5.0),
        max_hourly_rate: Some(50.0),
        ..Default::default()
    };
    let plan = QueryCompiler::new().for_provider_search(&filters).compile();

    assert_eq!(plan.predicates().len(), 1);
    assert_eq!(
        plan.predicates().get("hourlyRate"),
        Some(&Constraint::Range(RangeBounds::new(
            Some(json!(5.0)),
            Some(json!(50.0))
        )))
    );
}

/// No filters: empty tree, default sort, first page.
#[test]
fn test_recipes_empty_filters_use_defaults() {
    let provider = QueryCompiler::new()
        .for_provider_search(&ProviderSearchFilters::default())
        .compile();
    assert!(provider.predicates().is_empty());
    assert_eq!(*provider.sort(), provider_default_sort());
    assert_eq!(provider.pagination().skip, 0);
    assert_eq!(provider.pagination().limit, Some(10));

    let request = QueryCompiler::new()
        .for_request_search(&RequestSearchFilters::default())
        .compile();
    assert!(request.predicates().is_empty());
    assert_eq!(*request.sort(), created_default_sort());

    let chat = QueryCompiler::new()
        .for_chat_search(&Default::default())
        .compile();
    assert_eq!(*chat.sort(), chat_default_sort());
}

/// Explicit sortBy replaces the default; order defaults to descending.
#[test]
fn test_recipe_explicit_sort() {
    let filters = ProviderSearchFilters {
        common: CommonFilters {
            sort_by: Some("hourlyRate".to_string()),
            page: Some(2),
            limit: Some(25),
            ..Default::default()
        },
        ..Default::default()
    };
    let plan = QueryCompiler::new().for_provider_search(&filters).compile();

    assert_eq!(*plan.sort(), SortSpec::new().desc("hourlyRate"));
    assert_eq!(plan.pagination().skip, 25);
    assert_eq!(plan.pagination().limit, Some(25));
}

/// Review recipe maps hasResponse onto an existence check.
#[test]
fn test_review_recipe_fields() {
    let filters = ReviewSearchFilters {
        provider_id: Some("507f1f77bcf86cd799439011".to_string()),
        min_rating: Some(3.0),
        has_response: Some(true),
        ..Default::default()
    };
    let plan = QueryCompiler::new().for_review_search(&filters).compile();

    assert_eq!(plan.predicates().fields(), vec!["providerId", "rating", "response"]);
    assert_eq!(plan.predicates().get("response"), Some(&Constraint::Exists(true)));
}

/// Explain output lists every predicate and sort key.
#[test]
fn test_explain_plan() {
    let filters = ProviderSearchFilters {
        min_rating: Some(4.0),
        is_verified: Some(true),
        ..Default::default()
    };
    let explain = QueryCompiler::new()
        .for_provider_search(&filters)
        .compile()
        .explain();

    assert_eq!(explain.predicates.len(), 2);
    assert_eq!(explain.sort, vec!["rating desc", "createdAt desc"]);
    assert!(explain.bounded);
}
