//! Predicate filtering for plan execution
//!
//! Evaluates a predicate tree against JSON documents. Field names may be
//! dotted paths into nested objects. Regex patterns are compiled once,
//! when the filter is built.

use std::cmp::Ordering;
use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use super::errors::{ExecutionError, ExecutionResult};
use super::sorter::compare_values;
use crate::filter::parse_datetime;
use crate::query::{Constraint, GeoCircle, Predicate, PredicateTree, RangeBounds};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Resolve a dotted path inside a document
pub fn resolve_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Evaluates a predicate tree against documents
#[derive(Debug)]
pub struct PredicateFilter<'a> {
    tree: &'a PredicateTree,
    patterns: HashMap<(String, bool), Regex>,
}

impl<'a> PredicateFilter<'a> {
    /// Prepare a filter, compiling every regex in the tree
    pub fn new(tree: &'a PredicateTree) -> ExecutionResult<Self> {
        let mut patterns = HashMap::new();
        collect_patterns(tree, &mut patterns)?;
        Ok(Self { tree, patterns })
    }

    /// Checks if a document matches all predicates
    pub fn matches(&self, document: &Value) -> bool {
        self.matches_tree(document, self.tree)
    }

    fn matches_tree(&self, document: &Value, tree: &PredicateTree) -> bool {
        tree.iter().all(|p| self.matches_predicate(document, p))
    }

    fn matches_predicate(&self, document: &Value, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::Field { field, constraint } => {
                self.matches_constraint(resolve_path(document, field), constraint)
            }
            Predicate::Or(branches) => branches.iter().any(|t| self.matches_tree(document, t)),
            Predicate::And(branches) => branches.iter().all(|t| self.matches_tree(document, t)),
        }
    }

    fn matches_constraint(&self, actual: Option<&Value>, constraint: &Constraint) -> bool {
        let actual = actual.filter(|v| !v.is_null());
        match constraint {
            Constraint::Equals(expected) => equals_match(actual, expected),
            Constraint::NotEquals(expected) => !equals_match(actual, expected),
            Constraint::In(values) => values.iter().any(|v| equals_match(actual, v)),
            Constraint::Range(bounds) => actual.is_some_and(|v| range_match(v, bounds)),
            Constraint::Regex {
                pattern,
                case_sensitive,
            } => match (actual, self.patterns.get(&(pattern.clone(), *case_sensitive))) {
                (Some(v), Some(re)) => any_element(v, |item| {
                    item.as_str().is_some_and(|s| re.is_match(s))
                }),
                _ => false,
            },
            Constraint::Exists(expected) => actual.is_some() == *expected,
            Constraint::ArrayContains(expected) => {
                actual.is_some_and(|v| any_element(v, |item| values_equal(item, expected)))
            }
            Constraint::ArraySize(n) => {
                matches!(actual, Some(Value::Array(items)) if items.len() == *n)
            }
            Constraint::GeoNear(circle) => actual
                .and_then(point_of)
                .is_some_and(|(lat, lon)| within(circle, lat, lon)),
        }
    }
}

fn collect_patterns(
    tree: &PredicateTree,
    patterns: &mut HashMap<(String, bool), Regex>,
) -> ExecutionResult<()> {
    for predicate in tree.iter() {
        match predicate {
            Predicate::Field {
                constraint:
                    Constraint::Regex {
                        pattern,
                        case_sensitive,
                    },
                ..
            } => {
                let key = (pattern.clone(), *case_sensitive);
                if patterns.contains_key(&key) {
                    continue;
                }
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(!case_sensitive)
                    .build()
                    .map_err(|e| ExecutionError::InvalidPattern {
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })?;
                patterns.insert(key, regex);
            }
            Predicate::Field { .. } => {}
            Predicate::Or(branches) | Predicate::And(branches) => {
                for branch in branches {
                    collect_patterns(branch, patterns)?;
                }
            }
        }
    }
    Ok(())
}

/// Arrays match when any element matches; scalars match themselves
fn any_element(value: &Value, mut check: impl FnMut(&Value) -> bool) -> bool {
    match value {
        Value::Array(items) => items.iter().any(check),
        other => check(other),
    }
}

/// Equality with numeric normalization (4 == 4.0)
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

fn equals_match(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(v) if expected.is_array() => values_equal(v, expected),
        Some(v) => any_element(v, |item| values_equal(item, expected)),
    }
}

fn range_match(actual: &Value, bounds: &RangeBounds) -> bool {
    let lower = bounds
        .min
        .as_ref()
        .map_or(true, |min| bound_cmp(actual, min).is_some_and(Ordering::is_ge));
    let upper = bounds
        .max
        .as_ref()
        .map_or(true, |max| bound_cmp(actual, max).is_some_and(Ordering::is_le));
    lower && upper
}

/// Compare a value to a bound of the same kind. Strings that both parse
/// as dates compare chronologically.
fn bound_cmp(actual: &Value, bound: &Value) -> Option<Ordering> {
    match (actual, bound) {
        (Value::Number(_), Value::Number(_)) => Some(compare_values(Some(actual), Some(bound))),
        (Value::String(a), Value::String(b)) => match (parse_datetime(a), parse_datetime(b)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => Some(a.cmp(b)),
        },
        _ => None,
    }
}

/// (latitude, longitude) of a point field: `{latitude, longitude}`,
/// GeoJSON `{coordinates: [lon, lat]}`, or a bare `[lon, lat]`
fn point_of(value: &Value) -> Option<(f64, f64)> {
    let pair = |coords: &Value| match coords.as_array()?.as_slice() {
        [lon, lat] => Some((lat.as_f64()?, lon.as_f64()?)),
        _ => None,
    };
    match value {
        Value::Object(map) => match (map.get("latitude"), map.get("longitude")) {
            (Some(lat), Some(lon)) => Some((lat.as_f64()?, lon.as_f64()?)),
            _ => map.get("coordinates").and_then(pair),
        },
        Value::Array(_) => pair(value),
        _ => None,
    }
}

fn within(circle: &GeoCircle, latitude: f64, longitude: f64) -> bool {
    haversine_meters(circle.latitude, circle.longitude, latitude, longitude) <= circle.radius_meters
}

/// Great-circle distance in meters
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
}
