//! Value coercion for untrusted filter input
//!
//! Query strings deliver everything as text, JSON bodies deliver typed
//! values. These helpers accept both and return `None` for anything that
//! is not cleanly the requested type.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Finite number from a JSON number or numeric string
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Integer from an integral JSON number or integer string
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let f = n.as_f64()?;
            (f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Boolean from a JSON bool or "true"/"false" in any case
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Timestamp from RFC 3339, `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS`, or
/// epoch milliseconds
pub fn as_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_datetime(s.trim()),
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        _ => None,
    }
}

/// Parse a timestamp string in any accepted format
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Canonical string form used in sanitized filters and plans
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Present and not JSON null
pub fn is_present(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&json!(4)), Some(4.0));
        assert_eq!(as_number(&json!("12.5")), Some(12.5));
        assert_eq!(as_number(&json!(" 3 ")), Some(3.0));
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_number(&json!("NaN")), None);
        assert_eq!(as_number(&json!(true)), None);
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(as_integer(&json!(2)), Some(2));
        assert_eq!(as_integer(&json!("200")), Some(200));
        assert_eq!(as_integer(&json!(3.0)), Some(3));
        assert_eq!(as_integer(&json!(2.5)), None);
        assert_eq!(as_integer(&json!("2.5")), None);
        assert_eq!(as_integer(&json!(-1)), Some(-1));
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(as_bool(&json!(true)), Some(true));
        assert_eq!(as_bool(&json!("TRUE")), Some(true));
        assert_eq!(as_bool(&json!("False")), Some(false));
        assert_eq!(as_bool(&json!("yes")), None);
        assert_eq!(as_bool(&json!(1)), None);
    }

    #[test]
    fn test_as_datetime_formats() {
        let expected = "2024-03-01T00:00:00.000Z";
        let from_date = as_datetime(&json!("2024-03-01")).unwrap();
        let from_rfc = as_datetime(&json!("2024-03-01T00:00:00Z")).unwrap();
        let from_millis = as_datetime(&json!(1709251200000i64)).unwrap();

        assert_eq!(format_datetime(&from_date), expected);
        assert_eq!(format_datetime(&from_rfc), expected);
        assert_eq!(format_datetime(&from_millis), expected);
        assert!(as_datetime(&json!("not-a-date")).is_none());
    }

    #[test]
    fn test_is_present() {
        assert!(!is_present(None));
        assert!(!is_present(Some(&Value::Null)));
        assert!(is_present(Some(&json!(""))));
    }
}
