//! Executor counters
//!
//! Counters only, monotonic, reset on process start.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for a plan executor
///
/// Counters use Relaxed ordering; readers may observe slightly stale values.
#[derive(Debug, Default)]
pub struct ExecutorMetrics {
    /// Successful query plans
    queries_executed: AtomicU64,
    /// Successful aggregation plans
    aggregations_executed: AtomicU64,
    /// Plans that returned an error
    executions_failed: AtomicU64,
    /// Documents examined by predicates
    documents_scanned: AtomicU64,
    /// Documents or rows handed back to callers
    documents_returned: AtomicU64,
}

impl ExecutorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_query(&self, scanned: u64, returned: u64) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
        self.documents_scanned.fetch_add(scanned, Ordering::Relaxed);
        self.documents_returned.fetch_add(returned, Ordering::Relaxed);
    }

    pub fn record_aggregation(&self, scanned: u64, returned: u64) {
        self.aggregations_executed.fetch_add(1, Ordering::Relaxed);
        self.documents_scanned.fetch_add(scanned, Ordering::Relaxed);
        self.documents_returned.fetch_add(returned, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.executions_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            aggregations_executed: self.aggregations_executed.load(Ordering::Relaxed),
            executions_failed: self.executions_failed.load(Ordering::Relaxed),
            documents_scanned: self.documents_scanned.load(Ordering::Relaxed),
            documents_returned: self.documents_returned.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub aggregations_executed: u64,
    pub executions_failed: u64,
    pub documents_scanned: u64,
    pub documents_returned: u64,
}
