//! Structured JSON logger
//!
//! Each record is one line on stderr: `event`, `severity`, `ts`, then the
//! caller's fields in key order. stdout stays free for command output.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Trace = 0,
    Info = 1,
    /// Rejected input and other recoverable issues
    Warn = 2,
    Error = 3,
    Fatal = 4,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Parse a configured `log_level` (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Severity::Trace),
            "info" => Some(Severity::Info),
            "warn" | "warning" => Some(Severity::Warn),
            "error" => Some(Severity::Error),
            "fatal" => Some(Severity::Fatal),
            _ => None,
        }
    }

    fn from_level(level: u8) -> Self {
        [
            Severity::Trace,
            Severity::Info,
            Severity::Warn,
            Severity::Error,
        ]
        .into_iter()
        .find(|s| *s as u8 == level)
        .unwrap_or(Severity::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static THRESHOLD: AtomicU8 = AtomicU8::new(Severity::Warn as u8);

#[derive(Serialize)]
struct Record<'a> {
    event: &'a str,
    severity: Severity,
    ts: String,
    #[serde(flatten)]
    fields: BTreeMap<&'a str, &'a str>,
}

/// Process-wide JSON line logger
pub struct Logger;

impl Logger {
    /// Lowest severity that is written; WARN until configured
    pub fn set_min_severity(severity: Severity) {
        THRESHOLD.store(severity as u8, Ordering::Relaxed);
    }

    pub fn min_severity() -> Severity {
        Severity::from_level(THRESHOLD.load(Ordering::Relaxed))
    }

    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::min_severity()
    }

    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if Self::enabled(severity) {
            Self::write_record(&mut io::stderr().lock(), severity, event, fields);
        }
    }

    fn write_record<W: Write>(
        writer: &mut W,
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
    ) {
        let record = Record {
            event,
            severity,
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            fields: fields.iter().copied().collect(),
        };
        let Ok(mut line) = serde_json::to_vec(&record) else {
            return;
        };
        line.push(b'\n');
        // Logging never fails the caller
        let _ = writer.write_all(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn capture(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut buffer = Vec::new();
        Logger::write_record(&mut buffer, severity, event, fields);
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_severity_ordering_and_names() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Error < Severity::Fatal);
        assert_eq!(Severity::from_name(" Warning "), Some(Severity::Warn));
        assert_eq!(Severity::from_name("verbose"), None);
        assert_eq!(Severity::from_level(3), Severity::Error);
        assert_eq!(Severity::from_level(9), Severity::Fatal);
    }

    #[test]
    fn test_record_shape() {
        let line = capture(
            Severity::Info,
            "QUERY_EXECUTED",
            &[("returned", "3"), ("collection", "providers")],
        );
        let parsed: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(parsed["event"], "QUERY_EXECUTED");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["collection"], "providers");
        assert!(parsed["ts"].as_str().is_some_and(|ts| ts.ends_with('Z')));
        assert!(line.find("collection").unwrap() < line.find("returned").unwrap());
    }

    #[test]
    fn test_record_is_one_line() {
        let line = capture(
            Severity::Warn,
            "FILTER_VALIDATION_REJECTED",
            &[("message", "Limit must be \"1..100\"\nsecond")],
        );
        let parsed: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(parsed["message"], "Limit must be \"1..100\"\nsecond");
        assert_eq!(line.matches('\n').count(), 1);
    }
}
