//! Marketplace statistics pipelines
//!
//! Free functions; each builds a fresh pipeline from its arguments.

use super::compiler::{AggregationCompiler, DateParts, COUNT};
use super::stage::{Accumulator, AggregationPlan, GroupKey, LookupSpec};
use crate::query::{Constraint, DateRange, PredicateTree, QueryCompiler, SortSpec};

/// Review counts per star rating, lowest first. Over reviews.
pub fn provider_rating_distribution(provider_id: Option<&str>) -> AggregationPlan {
    let mut agg = AggregationCompiler::new();
    if let Some(provider) = provider_id {
        agg.match_tree(
            PredicateTree::new().with("providerId", Constraint::Equals(provider.into())),
        );
    }
    agg.group(
        GroupKey::Field("rating".to_string()),
        vec![(COUNT.to_string(), Accumulator::Count)],
    )
    .sort(SortSpec::new().asc("_id"))
    .get_pipeline()
}

/// Request counts per status, most common first. Over requests.
pub fn request_status_breakdown(customer_id: Option<&str>) -> AggregationPlan {
    let mut agg = AggregationCompiler::new();
    if let Some(customer) = customer_id {
        agg.match_tree(
            PredicateTree::new().with("customerId", Constraint::Equals(customer.into())),
        );
    }
    agg.group(
        GroupKey::Field("status".to_string()),
        vec![(COUNT.to_string(), Accumulator::Count)],
    )
    .sort(SortSpec::new().desc(COUNT).asc("_id"))
    .get_pipeline()
}

/// Documents created per day within `range`, oldest day first
pub fn daily_activity(date_field: &str, range: &DateRange) -> AggregationPlan {
    let mut agg = AggregationCompiler::new();
    if !range.is_open() {
        let mut filter = QueryCompiler::new();
        filter.date_range(date_field, range);
        agg.match_tree(filter.tree().clone());
    }
    agg.date_grouping(date_field, DateParts::daily())
        .sort(SortSpec::new().asc("_id.year").asc("_id.month").asc("_id.day"))
        .get_pipeline()
}

/// Best-rated providers by review average, among those with enough reviews
pub fn top_rated_providers(min_reviews: u64, min_rating: f64, n: u64) -> AggregationPlan {
    AggregationCompiler::new()
        .top_n(min_reviews, min_rating, n)
        .get_pipeline()
}

/// Verified providers joined with their user account, one row per provider
pub fn providers_with_users(limit: u64) -> AggregationPlan {
    AggregationCompiler::new()
        .match_tree(PredicateTree::new().with("isVerified", Constraint::Equals(true.into())))
        .lookup(LookupSpec::new("users", "userId", "_id", "user").unwind(true))
        .project([("user.password", false)])
        .sort(SortSpec::new().desc("rating"))
        .limit(limit)
        .get_pipeline()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::Stage;
    use serde_json::json;

    #[test]
    fn test_rating_distribution_shape() {
        let all = provider_rating_distribution(None);
        assert_eq!(all.stage_names(), vec!["group", "sort"]);

        let one = provider_rating_distribution(Some("0123456789abcdef01234567"));
        assert_eq!(one.stage_names(), vec!["match", "group", "sort"]);
        match &one.stages()[0] {
            Stage::Match(tree) => assert_eq!(
                tree.get("providerId"),
                Some(&Constraint::Equals(json!("0123456789abcdef01234567")))
            ),
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[test]
    fn test_daily_activity_open_range() {
        let plan = daily_activity("createdAt", &DateRange::default());
        assert_eq!(plan.stage_names(), vec!["group", "sort"]);
    }

    #[test]
    fn test_top_rated_providers() {
        let plan = top_rated_providers(3, 4.5, 5);
        assert_eq!(plan.stage_names(), vec!["group", "match", "sort", "limit"]);
    }

    #[test]
    fn test_providers_with_users() {
        let plan = providers_with_users(20);
        assert_eq!(
            plan.stage_names(),
            vec!["match", "lookup", "project", "sort", "limit"]
        );
        match &plan.stages()[1] {
            Stage::Lookup(spec) => assert!(spec.unwind),
            other => panic!("expected lookup, got {:?}", other),
        }
    }
}
