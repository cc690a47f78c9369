//! In-memory reference executor
//!
//! Collections are plain vectors of JSON documents behind a tokio
//! `RwLock`; concurrent plans read in parallel. Every execution is a full
//! scan in insertion order.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;

use super::errors::{ExecutionError, ExecutionResult};
use super::filters::PredicateFilter;
use super::metrics::{ExecutorMetrics, MetricsSnapshot};
use super::pipeline::run_pipeline;
use super::sorter::ResultSorter;
use super::PlanExecutor;
use crate::aggregation::AggregationPlan;
use crate::observability::{log_event, Event};
use crate::query::{Page, QueryPlan};

/// Named collections of JSON documents
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    metrics: ExecutorMetrics,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `{collection: [documents], ...}`
    pub fn from_json(data: Value) -> ExecutionResult<Self> {
        let Value::Object(map) = data else {
            return Err(ExecutionError::InvalidData(
                "expected an object of collections".to_string(),
            ));
        };

        let mut collections = HashMap::with_capacity(map.len());
        for (name, docs) in map {
            let Value::Array(docs) = docs else {
                return Err(ExecutionError::InvalidData(format!(
                    "collection '{}' must be an array",
                    name
                )));
            };
            collections.insert(name, docs);
        }

        Ok(Self {
            collections: RwLock::new(collections),
            metrics: ExecutorMetrics::new(),
        })
    }

    /// Append a document, creating the collection if needed
    pub async fn insert(&self, collection: &str, document: Value) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    pub async fn insert_many(&self, collection: &str, documents: impl IntoIterator<Item = Value>) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    /// Number of documents in a collection (0 if absent)
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn failed<T>(&self, collection: &str, err: ExecutionError) -> ExecutionResult<T> {
        self.metrics.record_failure();
        log_event(
            Event::ExecutionFailed,
            &[
                ("collection", collection),
                ("code", err.code()),
                ("error", &err.to_string()),
            ],
        );
        Err(err)
    }
}

impl PlanExecutor for MemoryStore {
    async fn execute(&self, collection: &str, plan: &QueryPlan) -> ExecutionResult<Page<Value>> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return self.failed(
                collection,
                ExecutionError::CollectionNotFound(collection.to_string()),
            );
        };
        let filter = match PredicateFilter::new(plan.predicates()) {
            Ok(filter) => filter,
            Err(err) => return self.failed(collection, err),
        };

        let mut matched: Vec<Value> = documents
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();
        let total = matched.len() as u64;
        ResultSorter::sort(&mut matched, plan.sort());

        let pagination = plan.pagination();
        let skip = usize::try_from(pagination.skip).unwrap_or(usize::MAX);
        let data: Vec<Value> = match pagination.limit {
            Some(limit) => matched
                .into_iter()
                .skip(skip)
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            None => matched.into_iter().skip(skip).collect(),
        };

        self.metrics
            .record_query(documents.len() as u64, data.len() as u64);
        log_event(
            Event::QueryExecuted,
            &[
                ("collection", collection),
                ("total", &total.to_string()),
                ("returned", &data.len().to_string()),
            ],
        );
        Ok(Page::new(data, total, &pagination))
    }

    async fn aggregate(
        &self,
        collection: &str,
        plan: &AggregationPlan,
    ) -> ExecutionResult<Vec<Value>> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return self.failed(
                collection,
                ExecutionError::CollectionNotFound(collection.to_string()),
            );
        };

        let scanned = documents.len() as u64;
        let rows = match run_pipeline(documents.clone(), plan, &*collections) {
            Ok(rows) => rows,
            Err(err) => return self.failed(collection, err),
        };

        self.metrics.record_aggregation(scanned, rows.len() as u64);
        log_event(
            Event::AggregationExecuted,
            &[
                ("collection", collection),
                ("stages", &plan.len().to_string()),
                ("rows", &rows.len().to_string()),
            ],
        );
        Ok(rows)
    }
}
