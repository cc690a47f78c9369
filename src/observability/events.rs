//! Observable events for hubquery
//!
//! Every log line carries exactly one of these event names.

use std::fmt;

use super::logger::Severity;

/// Observable events emitted by the query layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded
    ConfigLoaded,

    // Validation
    /// A filter validation produced errors
    FilterValidationRejected,

    // Compilation
    /// A query plan was compiled
    QueryCompiled,
    /// An aggregation pipeline snapshot was taken
    AggregationCompiled,

    // Execution
    /// A query plan was executed
    QueryExecuted,
    /// An aggregation plan was executed
    AggregationExecuted,
    /// Execution failed
    ExecutionFailed,
}

impl Event {
    /// Returns the event name written to the log
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::FilterValidationRejected => "FILTER_VALIDATION_REJECTED",
            Event::QueryCompiled => "QUERY_COMPILED",
            Event::AggregationCompiled => "AGGREGATION_COMPILED",
            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::AggregationExecuted => "AGGREGATION_EXECUTED",
            Event::ExecutionFailed => "EXECUTION_FAILED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryCompiled | Event::AggregationCompiled => Severity::Trace,
            Event::ConfigLoaded | Event::QueryExecuted | Event::AggregationExecuted => {
                Severity::Info
            }
            Event::FilterValidationRejected => Severity::Warn,
            Event::ExecutionFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
