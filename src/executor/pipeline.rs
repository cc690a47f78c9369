//! Aggregation pipeline evaluation
//!
//! Runs stages strictly in plan order over a row set. Group rows have the
//! shape `{"_id": key, <accumulator>: value, ...}`, with groups in order of
//! first appearance.

use std::collections::HashMap;

use chrono::{Datelike, Timelike};
use serde_json::{Map, Value};

use super::errors::{ExecutionError, ExecutionResult};
use super::filters::{resolve_path, values_equal, PredicateFilter};
use super::sorter::ResultSorter;
use crate::aggregation::{Accumulator, AggregationPlan, DateUnit, GroupKey, KeyPart, LookupSpec, Stage};
use crate::filter::as_datetime;

/// Source of documents for lookup stages
pub trait CollectionSource {
    fn collection(&self, name: &str) -> Option<&[Value]>;
}

impl CollectionSource for HashMap<String, Vec<Value>> {
    fn collection(&self, name: &str) -> Option<&[Value]> {
        self.get(name).map(Vec::as_slice)
    }
}

/// Run every stage of the plan over `rows`
pub fn run_pipeline(
    mut rows: Vec<Value>,
    plan: &AggregationPlan,
    source: &impl CollectionSource,
) -> ExecutionResult<Vec<Value>> {
    for stage in plan.stages() {
        rows = run_stage(rows, stage, source)?;
    }
    Ok(rows)
}

fn run_stage(
    mut rows: Vec<Value>,
    stage: &Stage,
    source: &impl CollectionSource,
) -> ExecutionResult<Vec<Value>> {
    match stage {
        Stage::Match(tree) => {
            let filter = PredicateFilter::new(tree)?;
            rows.retain(|row| filter.matches(row));
            Ok(rows)
        }
        Stage::Group { key, accumulators } => Ok(group(&rows, key, accumulators)),
        Stage::Sort(spec) => {
            ResultSorter::sort(&mut rows, spec);
            Ok(rows)
        }
        Stage::Limit(n) => {
            rows.truncate(usize::try_from(*n).unwrap_or(usize::MAX));
            Ok(rows)
        }
        Stage::Skip(n) => {
            let n = usize::try_from(*n).unwrap_or(usize::MAX).min(rows.len());
            rows.drain(..n);
            Ok(rows)
        }
        Stage::Lookup(spec) => {
            let foreign = source
                .collection(&spec.from)
                .ok_or_else(|| ExecutionError::CollectionNotFound(spec.from.clone()))?;
            Ok(lookup(rows, spec, foreign))
        }
        Stage::Project(fields) => project(rows, fields),
        Stage::Unwind(path) => Ok(unwind(rows, path)),
    }
}

struct GroupState {
    count: u64,
    sums: Vec<f64>,
    counts: Vec<u64>,
}

fn group(rows: &[Value], key: &GroupKey, accumulators: &[(String, Accumulator)]) -> Vec<Value> {
    let mut order: Vec<Value> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut states: Vec<GroupState> = Vec::new();

    for row in rows {
        let key_value = group_key(row, key);
        let slot = *index.entry(canonical_key(&key_value).to_string()).or_insert_with(|| {
            order.push(key_value.clone());
            states.push(GroupState {
                count: 0,
                sums: vec![0.0; accumulators.len()],
                counts: vec![0; accumulators.len()],
            });
            states.len() - 1
        });

        let state = &mut states[slot];
        state.count += 1;
        for (i, (_, acc)) in accumulators.iter().enumerate() {
            let path = match acc {
                Accumulator::Count => continue,
                Accumulator::Avg(path) | Accumulator::Sum(path) => path,
            };
            if let Some(n) = resolve_path(row, path).and_then(Value::as_f64) {
                state.sums[i] += n;
                state.counts[i] += 1;
            }
        }
    }

    order
        .into_iter()
        .zip(states)
        .map(|(key_value, state)| {
            let mut out = Map::new();
            out.insert("_id".to_string(), key_value);
            for (i, (name, acc)) in accumulators.iter().enumerate() {
                let value = match acc {
                    Accumulator::Count => Value::from(state.count),
                    Accumulator::Sum(_) => Value::from(state.sums[i]),
                    Accumulator::Avg(_) if state.counts[i] == 0 => Value::Null,
                    Accumulator::Avg(_) => Value::from(state.sums[i] / state.counts[i] as f64),
                };
                out.insert(name.clone(), value);
            }
            Value::Object(out)
        })
        .collect()
}

/// Group identity: numerically equal keys share a group, so `4` and
/// `4.0` land in one bucket
fn canonical_key(value: &Value) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT => Value::from(f as i64),
            _ => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(canonical_key).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), canonical_key(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn group_key(row: &Value, key: &GroupKey) -> Value {
    match key {
        GroupKey::None => Value::Null,
        GroupKey::Field(path) => resolve_path(row, path).cloned().unwrap_or(Value::Null),
        GroupKey::Composite(parts) => {
            let map = parts
                .iter()
                .map(|(name, part)| (name.clone(), key_part(row, part)))
                .collect();
            Value::Object(map)
        }
    }
}

fn key_part(row: &Value, part: &KeyPart) -> Value {
    match part {
        KeyPart::Field(path) => resolve_path(row, path).cloned().unwrap_or(Value::Null),
        KeyPart::DatePart { field, unit } => {
            let Some(dt) = resolve_path(row, field).and_then(as_datetime) else {
                return Value::Null;
            };
            let n = match unit {
                DateUnit::Year => i64::from(dt.year()),
                DateUnit::Month => i64::from(dt.month()),
                DateUnit::Day => i64::from(dt.day()),
                DateUnit::Hour => i64::from(dt.hour()),
            };
            Value::from(n)
        }
    }
}

fn lookup(rows: Vec<Value>, spec: &LookupSpec, foreign: &[Value]) -> Vec<Value> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let local = resolve_path(&row, &spec.local_field).cloned();
        let joined: Vec<Value> = match &local {
            Some(local) if !local.is_null() => foreign
                .iter()
                .filter(|doc| {
                    resolve_path(doc, &spec.foreign_field).is_some_and(|f| joins(local, f))
                })
                .cloned()
                .collect(),
            _ => Vec::new(),
        };

        if spec.unwind {
            // Rows without a match are dropped
            for item in joined {
                let mut copy = row.clone();
                set_path(&mut copy, &spec.alias, item);
                out.push(copy);
            }
        } else {
            let mut row = row;
            set_path(&mut row, &spec.alias, Value::Array(joined));
            out.push(row);
        }
    }
    out
}

fn joins(local: &Value, foreign: &Value) -> bool {
    match local {
        Value::Array(items) => items.iter().any(|item| values_equal(item, foreign)),
        _ => values_equal(local, foreign),
    }
}

fn project(rows: Vec<Value>, fields: &[(String, bool)]) -> ExecutionResult<Vec<Value>> {
    let inclusive = fields.iter().any(|(_, include)| *include);
    if inclusive && fields.iter().any(|(f, include)| !include && f != "_id") {
        return Err(ExecutionError::InvalidPlan(
            "projection cannot mix inclusion and exclusion".to_string(),
        ));
    }

    if !inclusive {
        return Ok(rows
            .into_iter()
            .map(|mut row| {
                for (field, _) in fields {
                    remove_path(&mut row, field);
                }
                row
            })
            .collect());
    }

    let keep_id = !fields.iter().any(|(f, include)| f == "_id" && !include);
    Ok(rows
        .into_iter()
        .map(|row| {
            let mut projected = Value::Object(Map::new());
            if keep_id {
                if let Some(id) = row.get("_id") {
                    set_path(&mut projected, "_id", id.clone());
                }
            }
            for (field, _) in fields.iter().filter(|(_, include)| *include) {
                if let Some(value) = resolve_path(&row, field) {
                    set_path(&mut projected, field, value.clone());
                }
            }
            projected
        })
        .collect())
}

fn unwind(rows: Vec<Value>, path: &str) -> Vec<Value> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let items = match resolve_path(&row, path) {
            Some(Value::Array(items)) => Some(items.clone()),
            Some(Value::Null) | None => continue,
            Some(_) => None,
        };
        match items {
            Some(items) => {
                for item in items {
                    let mut copy = row.clone();
                    set_path(&mut copy, path, item);
                    out.push(copy);
                }
            }
            None => out.push(row),
        }
    }
    out
}

/// Write `value` at a dotted path, creating intermediate objects
pub(crate) fn set_path(target: &mut Value, path: &str, value: Value) {
    let mut current = target;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Some(map) = current.as_object_mut() else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

fn remove_path(target: &mut Value, path: &str) {
    match path.rsplit_once('.') {
        Some((parent, last)) => {
            let mut current = target;
            for segment in parent.split('.') {
                match current.get_mut(segment) {
                    Some(next) => current = next,
                    None => return,
                }
            }
            if let Value::Object(map) = current {
                map.remove(last);
            }
        }
        None => {
            if let Value::Object(map) = target {
                map.remove(path);
            }
        }
    }
}
