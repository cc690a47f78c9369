//! # Query-String Input
//!
//! Turns `key=value` pairs into the JSON object the validators expect.
//! Values stay strings (validators coerce them). Dotted keys nest:
//! `location.latitude=51.5` becomes `{"location": {"latitude": "51.5"}}`.
//! A repeated key collects its values into an array.

use serde_json::{Map, Value};

/// Build a filter input object from query-string pairs
pub fn from_query_params<I, K, V>(pairs: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut input = Map::new();
    for (key, value) in pairs {
        let key = key.as_ref().trim();
        if key.is_empty() {
            continue;
        }
        let path: Vec<&str> = key.split('.').collect();
        insert_path(&mut input, &path, Value::String(value.as_ref().to_string()));
    }
    input
}

fn insert_path(target: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        match target.get_mut(*head) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                target.insert((*head).to_string(), value);
            }
        }
        return;
    }

    let child = target
        .entry((*head).to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() {
        *child = Value::Object(Map::new());
    }
    if let Value::Object(child) = child {
        insert_path(child, rest, value);
    }
}
