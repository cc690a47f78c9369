//! Plan execution subsystem for hubquery
//!
//! Consumes compiled plans and produces results.
//!
//! # Execution Flow (strict order)
//!
//! 1. Resolve the collection
//! 2. Compile regex predicates (fail on invalid patterns)
//! 3. Filter documents by the predicate tree
//! 4. Count matches (the page total ignores pagination)
//! 5. Apply sort keys in order
//! 6. Apply skip, then limit
//!
//! Aggregations run their stages exactly in plan order.

mod errors;
mod filters;
mod memory;
mod metrics;
mod pipeline;
mod sorter;

use std::future::Future;

use serde_json::Value;

use crate::aggregation::AggregationPlan;
use crate::query::{Page, QueryPlan};

pub use errors::{ExecutionError, ExecutionResult};
pub use filters::{haversine_meters, resolve_path, PredicateFilter, EARTH_RADIUS_METERS};
pub use memory::MemoryStore;
pub use metrics::{ExecutorMetrics, MetricsSnapshot};
pub use pipeline::{run_pipeline, CollectionSource};
pub use sorter::ResultSorter;

/// Storage contract for compiled plans
pub trait PlanExecutor {
    /// Run a query plan. `Page::total` counts every matching document,
    /// independent of pagination.
    fn execute(
        &self,
        collection: &str,
        plan: &QueryPlan,
    ) -> impl Future<Output = ExecutionResult<Page<Value>>> + Send;

    /// Run an aggregation pipeline
    fn aggregate(
        &self,
        collection: &str,
        plan: &AggregationPlan,
    ) -> impl Future<Output = ExecutionResult<Vec<Value>>> + Send;
}
