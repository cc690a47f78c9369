//! Observability for hubquery
//!
//! Structured JSON logging only:
//! - one line per event, written to stderr
//! - deterministic key ordering
//! - a process-wide severity threshold (WARN unless configured)
//!
//! # Usage
//!
//! ```ignore
//! use hubquery::observability::{log_event, Event};
//!
//! log_event(Event::QueryCompiled, &[("predicates", "3")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
