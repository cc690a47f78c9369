//! Entity search recipes
//!
//! Each recipe is a fixed sequence of compiler calls, one per filter field
//! that is present, followed by the sort (explicit `sortBy`, otherwise the
//! entity default) and pagination.

use super::compiler::QueryCompiler;
use super::params::TextSearch;
use super::sort::{SortDirection, SortSpec};
use crate::filter::{
    ChatSearchFilters, CommonFilters, ProviderSearchFilters, RequestSearchFilters,
    ReviewSearchFilters, UserSearchFilters,
};

const PROVIDER_SEARCH_FIELDS: &[&str] = &["businessName", "description", "services"];
const REQUEST_SEARCH_FIELDS: &[&str] = &["title", "description"];
const REVIEW_SEARCH_FIELDS: &[&str] = &["comment"];
const USER_SEARCH_FIELDS: &[&str] = &["firstName", "lastName", "email"];
const CHAT_SEARCH_FIELDS: &[&str] = &["lastMessage"];

/// Default provider ordering: best rated first, newest first on ties
pub fn provider_default_sort() -> SortSpec {
    SortSpec::new().desc("rating").desc("createdAt")
}

/// Default ordering for requests, reviews and users
pub fn created_default_sort() -> SortSpec {
    SortSpec::new().desc("createdAt")
}

/// Default chat ordering: most recently active first
pub fn chat_default_sort() -> SortSpec {
    SortSpec::new().desc("updatedAt")
}

impl QueryCompiler {
    pub fn for_provider_search(&mut self, filters: &ProviderSearchFilters) -> &mut Self {
        self.search(&filters.common, PROVIDER_SEARCH_FIELDS);
        if let Some(category) = &filters.category {
            self.array_contains("categories", category.as_str());
        }
        if let Some(services) = &filters.services {
            self.in_values("services", services.iter().map(String::as_str));
        }
        if let Some(languages) = &filters.languages {
            self.in_values("languages", languages.iter().map(String::as_str));
        }
        self.range("rating", filters.min_rating, None::<f64>);
        self.range("hourlyRate", filters.min_hourly_rate, filters.max_hourly_rate);
        if let Some(location) = &filters.location {
            self.geo_near("location", location);
        }
        if let Some(verified) = filters.is_verified {
            self.equals("isVerified", verified);
        }
        if let Some(available) = filters.is_available {
            self.equals("isAvailable", available);
        }
        self.created_within(&filters.common);
        self.finish(&filters.common, provider_default_sort())
    }

    pub fn for_request_search(&mut self, filters: &RequestSearchFilters) -> &mut Self {
        self.search(&filters.common, REQUEST_SEARCH_FIELDS);
        if let Some(status) = &filters.status {
            self.equals("status", status.as_str());
        }
        if let Some(urgency) = &filters.urgency {
            self.equals("urgency", urgency.as_str());
        }
        if let Some(category) = &filters.category {
            self.equals("category", category.as_str());
        }
        self.range("budget", filters.min_budget, filters.max_budget);
        if let Some(location) = &filters.location {
            self.geo_near("location", location);
        }
        if let Some(customer) = &filters.customer_id {
            self.equals("customerId", customer.as_str());
        }
        if let Some(provider) = &filters.provider_id {
            self.equals("providerId", provider.as_str());
        }
        self.created_within(&filters.common);
        self.finish(&filters.common, created_default_sort())
    }

    pub fn for_review_search(&mut self, filters: &ReviewSearchFilters) -> &mut Self {
        if let Some(provider) = &filters.provider_id {
            self.equals("providerId", provider.as_str());
        }
        if let Some(customer) = &filters.customer_id {
            self.equals("customerId", customer.as_str());
        }
        if let Some(request) = &filters.request_id {
            self.equals("requestId", request.as_str());
        }
        self.range("rating", filters.min_rating, filters.max_rating);
        if let Some(verified) = filters.is_verified {
            self.equals("isVerified", verified);
        }
        if let Some(has_response) = filters.has_response {
            self.exists("response", has_response);
        }
        self.created_within(&filters.common);
        self.search(&filters.common, REVIEW_SEARCH_FIELDS);
        self.finish(&filters.common, created_default_sort())
    }

    pub fn for_user_search(&mut self, filters: &UserSearchFilters) -> &mut Self {
        if let Some(role) = &filters.role {
            self.equals("role", role.as_str());
        }
        if let Some(active) = filters.is_active {
            self.equals("isActive", active);
        }
        if let Some(verified) = filters.is_verified {
            self.equals("isVerified", verified);
        }
        self.search(&filters.common, USER_SEARCH_FIELDS);
        self.created_within(&filters.common);
        self.finish(&filters.common, created_default_sort())
    }

    pub fn for_chat_search(&mut self, filters: &ChatSearchFilters) -> &mut Self {
        if let Some(participant) = &filters.participant_id {
            self.array_contains("participants", participant.as_str());
        }
        if let Some(request) = &filters.request_id {
            self.equals("requestId", request.as_str());
        }
        if let Some(active) = filters.is_active {
            self.equals("isActive", active);
        }
        self.search(&filters.common, CHAT_SEARCH_FIELDS);
        self.created_within(&filters.common);
        self.finish(&filters.common, chat_default_sort())
    }

    fn search(&mut self, common: &CommonFilters, fields: &[&str]) -> &mut Self {
        match &common.search {
            Some(term) => self.text_search(&TextSearch::new(term.as_str(), fields.iter().copied())),
            None => self,
        }
    }

    fn created_within(&mut self, common: &CommonFilters) -> &mut Self {
        match &common.date_range {
            Some(range) => self.date_range("createdAt", range),
            None => self,
        }
    }

    fn finish(&mut self, common: &CommonFilters, default_sort: SortSpec) -> &mut Self {
        let sort = match &common.sort_by {
            Some(field) => SortSpec::new().with(
                field.as_str(),
                common.sort_order.unwrap_or(SortDirection::Desc),
            ),
            None => with_primary_order(default_sort, common.sort_order),
        };
        self.sort(sort).paginate(common.page_request())
    }
}

/// A bare `sortOrder` flips the default's primary key; tie-breakers keep
/// their direction
fn with_primary_order(mut sort: SortSpec, order: Option<SortDirection>) -> SortSpec {
    let primary = sort.fields().first().map(|f| f.field.clone());
    if let (Some(order), Some(primary)) = (order, primary) {
        sort.set(primary, order);
    }
    sort
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Constraint, DateRange, GeoQuery, Predicate, RangeBounds};
    use serde_json::json;

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

    #[test]
    fn test_provider_empty_filters() {
        let plan = QueryCompiler::new()
            .for_provider_search(&ProviderSearchFilters::default())
            .compile();

        assert!(plan.predicates().is_empty());
        assert_eq!(*plan.sort(), provider_default_sort());
        assert_eq!(plan.pagination().skip, 0);
        assert_eq!(plan.pagination().limit, Some(10));
    }

    #[test]
    fn test_provider_full_sequence() {
        let filters = ProviderSearchFilters {
            common: CommonFilters {
                search: Some("leak".into()),
                ..Default::default()
            },
            category: Some("plumbing".into()),
            services: Some(vec!["plumbing".into(), "hvac".into()]),
            min_rating: Some(4.0),
            location: Some(GeoQuery::new(51.5, -0.12, 10.0)),
            is_available: Some(true),
            ..Default::default()
        };
        let plan = QueryCompiler::new().for_provider_search(&filters).compile();

        assert!(matches!(plan.predicates().predicates()[0], Predicate::Or(_)));
        assert_eq!(
            plan.predicates().fields(),
            vec!["categories", "services", "rating", "location", "isAvailable"]
        );
        match plan.predicates().get("location") {
            Some(Constraint::GeoNear(circle)) => assert_eq!(circle.radius_meters, 10_000.0),
            other => panic!("unexpected constraint: {:?}", other),
        }
    }

    #[test]
    fn test_explicit_sort_replaces_default() {
        let filters = RequestSearchFilters {
            common: CommonFilters {
                sort_by: Some("budget".into()),
                page: Some(3),
                limit: Some(5),
                ..Default::default()
            },
            ..Default::default()
        };
        let plan = QueryCompiler::new().for_request_search(&filters).compile();

        assert_eq!(*plan.sort(), SortSpec::new().desc("budget"));
        assert_eq!(plan.pagination().skip, 10);
        assert_eq!(plan.pagination().limit, Some(5));
    }

    #[test]
    fn test_default_sorts() {
        let review = QueryCompiler::new()
            .for_review_search(&ReviewSearchFilters::default())
            .compile();
        let user = QueryCompiler::new()
            .for_user_search(&UserSearchFilters::default())
            .compile();
        let chat = QueryCompiler::new()
            .for_chat_search(&ChatSearchFilters::default())
            .compile();

        assert_eq!(*review.sort(), created_default_sort());
        assert_eq!(*user.sort(), created_default_sort());
        assert_eq!(*chat.sort(), chat_default_sort());
    }

    #[test]
    fn test_review_has_response_is_exists() {
        let filters = ReviewSearchFilters {
            has_response: Some(false),
            min_rating: Some(1.0),
            max_rating: Some(3.0),
            ..Default::default()
        };
        let plan = QueryCompiler::new().for_review_search(&filters).compile();
        assert_eq!(plan.predicates().get("response"), Some(&Constraint::Exists(false)));
        assert_eq!(plan.predicates().fields(), vec!["rating", "response"]);
    }

    #[test]
    fn test_chat_participant() {
        let filters = ChatSearchFilters {
            participant_id: Some("0123456789abcdef01234567".into()),
            is_active: Some(true),
            ..Default::default()
        };
        let plan = QueryCompiler::new().for_chat_search(&filters).compile();
        assert_eq!(
            plan.predicates().get("participants"),
            Some(&Constraint::ArrayContains(json!("0123456789abcdef01234567")))
        );
    }

    #[test]
    fn test_provider_date_range_applies_to_created_at() {
        let from = crate::filter::parse_datetime("2024-01-01");
        let to = crate::filter::parse_datetime("2024-02-01");
        let filters = ProviderSearchFilters {
            common: CommonFilters {
                date_range: Some(DateRange::new(from, to)),
                ..Default::default()
            },
            min_rating: Some(4.0),
            ..Default::default()
        };
        let plan = QueryCompiler::new().for_provider_search(&filters).compile();

        assert_eq!(plan.predicates().fields(), vec!["rating", "createdAt"]);
        assert_eq!(
            plan.predicates().get("createdAt"),
            Some(&Constraint::Range(RangeBounds::new(
                Some(json!("2024-01-01T00:00:00.000Z")),
                Some(json!("2024-02-01T00:00:00.000Z"))
            )))
        );
    }

    #[test]
    fn test_sort_order_without_sort_by_flips_primary_key() {
        let filters = ProviderSearchFilters {
            common: CommonFilters {
                sort_order: Some(SortDirection::Asc),
                ..Default::default()
            },
            ..Default::default()
        };
        let plan = QueryCompiler::new().for_provider_search(&filters).compile();
        assert_eq!(*plan.sort(), SortSpec::new().asc("rating").desc("createdAt"));

        let chat = QueryCompiler::new()
            .for_chat_search(&ChatSearchFilters {
                common: CommonFilters {
                    sort_order: Some(SortDirection::Asc),
                    ..Default::default()
                },
                ..Default::default()
            })
            .compile();
        assert_eq!(*chat.sort(), SortSpec::new().asc("updatedAt"));
    }
}
