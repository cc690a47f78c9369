//! # Query Compiler
//!
//! Fluent builder over a predicate tree, a sort spec and pagination.
//! Every building method returns `&mut Self` so calls chain; `compile`
//! takes an immutable snapshot without touching the builder.
//!
//! The compiler trusts its inputs. Validation happens upstream in
//! `FilterBuilder`; malformed values produce malformed predicates.

use serde_json::Value;

use super::page::{PageRequest, Pagination};
use super::params::{DateRange, GeoQuery, TextSearch};
use super::plan::QueryPlan;
use super::predicate::{Constraint, GeoCircle, Predicate, PredicateTree, RangeBounds};
use super::sort::SortSpec;
use crate::filter::format_datetime;
use crate::observability::{log_event, Event};

/// Fluent query builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryCompiler {
    tree: PredicateTree,
    sort: SortSpec,
    pagination: Pagination,
}

impl QueryCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.tree.set(field, Constraint::Equals(value.into()));
        self
    }

    pub fn not_equals(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.tree.set(field, Constraint::NotEquals(value.into()));
        self
    }

    /// Membership; an empty list adds nothing
    pub fn in_values<I, V>(&mut self, field: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.tree.set(field, Constraint::In(values));
        }
        self
    }

    /// Inclusive range. Merges with an existing range on the same field;
    /// two open bounds add nothing.
    pub fn range(
        &mut self,
        field: impl Into<String>,
        min: Option<impl Into<Value>>,
        max: Option<impl Into<Value>>,
    ) -> &mut Self {
        let bounds = RangeBounds::new(min.map(Into::into), max.map(Into::into));
        if !bounds.is_open() {
            self.tree.set(field, Constraint::Range(bounds));
        }
        self
    }

    /// Range over RFC 3339 timestamps
    pub fn date_range(&mut self, field: impl Into<String>, range: &DateRange) -> &mut Self {
        let bound = |dt: Option<&chrono::DateTime<chrono::Utc>>| dt.map(format_datetime);
        self.range(field, bound(range.from.as_ref()), bound(range.to.as_ref()))
    }

    /// Proximity filter. The kilometer radius is converted to meters here,
    /// once, so every compile of this builder sees the same circle.
    pub fn geo_near(&mut self, field: impl Into<String>, geo: &GeoQuery) -> &mut Self {
        let circle = GeoCircle {
            latitude: geo.latitude,
            longitude: geo.longitude,
            radius_meters: geo.radius_meters(),
        };
        self.tree.set(field, Constraint::GeoNear(circle));
        self
    }

    pub fn regex(
        &mut self,
        field: impl Into<String>,
        pattern: impl Into<String>,
        case_sensitive: bool,
    ) -> &mut Self {
        self.tree.set(
            field,
            Constraint::Regex {
                pattern: pattern.into(),
                case_sensitive,
            },
        );
        self
    }

    pub fn exists(&mut self, field: impl Into<String>, exists: bool) -> &mut Self {
        self.tree.set(field, Constraint::Exists(exists));
        self
    }

    pub fn array_contains(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.tree.set(field, Constraint::ArrayContains(value.into()));
        self
    }

    pub fn array_size(&mut self, field: impl Into<String>, size: usize) -> &mut Self {
        self.tree.set(field, Constraint::ArraySize(size));
        self
    }

    /// Any branch matches; no branches adds nothing
    pub fn or(&mut self, branches: Vec<PredicateTree>) -> &mut Self {
        if !branches.is_empty() {
            self.tree.push_group(Predicate::Or(branches));
        }
        self
    }

    /// Every branch matches; no branches adds nothing
    pub fn and(&mut self, branches: Vec<PredicateTree>) -> &mut Self {
        if !branches.is_empty() {
            self.tree.push_group(Predicate::And(branches));
        }
        self
    }

    /// `Or` of one substring regex per field. The term is matched
    /// literally. Blank terms and empty field lists add nothing.
    pub fn text_search(&mut self, search: &TextSearch) -> &mut Self {
        let term = search.term.trim();
        if term.is_empty() || search.fields.is_empty() {
            return self;
        }

        let pattern = regex::escape(term);
        let branches = search
            .fields
            .iter()
            .map(|field| {
                PredicateTree::new().with(
                    field.clone(),
                    Constraint::Regex {
                        pattern: pattern.clone(),
                        case_sensitive: search.case_sensitive,
                    },
                )
            })
            .collect();
        self.or(branches)
    }

    /// Merge sort keys (last write per field wins)
    pub fn sort(&mut self, spec: SortSpec) -> &mut Self {
        self.sort.merge(spec);
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.pagination.limit = Some(limit);
        self
    }

    pub fn skip(&mut self, skip: u64) -> &mut Self {
        self.pagination.skip = skip;
        self
    }

    /// Set skip and limit together, overwriting both
    pub fn paginate(&mut self, page: PageRequest) -> &mut Self {
        self.pagination = Pagination::from(page);
        self
    }

    /// Predicates accumulated so far
    pub fn tree(&self) -> &PredicateTree {
        &self.tree
    }

    /// Snapshot the current state
    pub fn compile(&self) -> QueryPlan {
        let plan = QueryPlan {
            predicates: self.tree.clone(),
            sort: self.sort.clone(),
            pagination: self.pagination,
        };

        let predicates = plan.predicates.len().to_string();
        let sort_fields = plan.sort.len().to_string();
        let limit = plan
            .pagination
            .limit
            .map_or_else(|| "none".to_string(), |l| l.to_string());
        log_event(
            Event::QueryCompiled,
            &[
                ("predicates", &predicates),
                ("sort_fields", &sort_fields),
                ("skip", &plan.pagination.skip.to_string()),
                ("limit", &limit),
            ],
        );
        plan
    }

    /// Reset to an empty builder
    pub fn clear(&mut self) -> &mut Self {
        self.tree.clear();
        self.sort.clear();
        self.pagination = Pagination::default();
        self
    }
}
