//! Result sorting for plan execution
//!
//! Multi-key, stable sort over JSON documents.

use std::cmp::Ordering;

use serde_json::Value;

use super::filters::resolve_path;
use crate::query::{SortDirection, SortSpec};

/// Sorts result documents
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts documents by every key of the spec, in order.
    ///
    /// Sort is stable: documents equal on all keys keep their input order.
    pub fn sort(documents: &mut [Value], spec: &SortSpec) {
        if spec.is_empty() {
            return;
        }
        documents.sort_by(|a, b| {
            spec.iter()
                .map(|key| {
                    let ordering =
                        compare_values(resolve_path(a, &key.field), resolve_path(b, &key.field));
                    match key.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                })
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }
}

/// Compares two JSON values for sorting.
///
/// Ordering rules:
/// - missing < null < bool < number < string < array < object
/// - For same types, natural ordering
pub(crate) fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a_val), Some(b_val)) => {
            let type_order = |v: &Value| -> u8 {
                match v {
                    Value::Null => 0,
                    Value::Bool(_) => 1,
                    Value::Number(_) => 2,
                    Value::String(_) => 3,
                    Value::Array(_) => 4,
                    Value::Object(_) => 5,
                }
            };

            let a_type = type_order(a_val);
            let b_type = type_order(b_val);
            if a_type != b_type {
                return a_type.cmp(&b_type);
            }

            match (a_val, b_val) {
                (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
                (Value::Number(x), Value::Number(y)) => {
                    let x = x.as_f64().unwrap_or(0.0);
                    let y = y.as_f64().unwrap_or(0.0);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
                (Value::String(x), Value::String(y)) => x.cmp(y),
                (Value::Object(x), Value::Object(y)) => {
                    // Composite group keys: compare field by field
                    x.iter()
                        .map(|(k, v)| compare_values(Some(v), y.get(k)))
                        .find(|o| o.is_ne())
                        .unwrap_or(Ordering::Equal)
                }
                _ => Ordering::Equal,
            }
        }
    }
}
