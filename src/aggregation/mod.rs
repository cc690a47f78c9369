//! Aggregation pipeline subsystem for hubquery
//!
//! Composes ordered stages for statistics: counts by category, averages,
//! date-bucketed activity and top-N rankings.
//!
//! # Invariants
//!
//! - Stage order is exactly call order
//! - Stages are never reordered or merged
//! - `top_n` always appends Group, Match, Sort, Limit; the threshold
//!   match runs on grouped aggregates, never on raw documents

mod compiler;
mod recipes;
mod stage;

pub use compiler::{AggregationCompiler, DateParts, StatisticsSpec, AVERAGE, COUNT, GROUP, TOTAL};
pub use recipes::{
    daily_activity, provider_rating_distribution, providers_with_users, request_status_breakdown,
    top_rated_providers,
};
pub use stage::{Accumulator, AggregationPlan, DateUnit, GroupKey, KeyPart, LookupSpec, Stage};
