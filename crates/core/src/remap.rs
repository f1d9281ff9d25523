// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Placeholder id substitution.
//!
//! A create made offline hands out a `local-<n>` id. Later writes may refer to
//! that entity by its placeholder, in the endpoint path or in the payload.
//! Once the create is replayed and the server assigns a real id, the mapping
//! is stored and applied to every request just before it is sent.

use std::collections::HashMap;

use serde_json::Value;

use crate::mutation::is_placeholder;

/// JSON pointer tried when the configured one finds nothing.
const FALLBACK_ID_POINTER: &str = "/data/id";

/// Substitute known placeholders in an endpoint and payload.
///
/// Payload strings that are exactly a placeholder take the server id with its
/// original JSON type, so a numeric id stays a number.
pub fn resolve(endpoint: &str, payload: &Value, map: &HashMap<String, Value>) -> (String, Value) {
    if map.is_empty() {
        return (endpoint.to_string(), payload.clone());
    }
    let mut payload = payload.clone();
    substitute_value(&mut payload, map);
    (substitute_endpoint(endpoint, map), payload)
}

/// The form an id takes inside a URL path.
pub fn path_segment(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replace whole path segments. The query string is left untouched.
fn substitute_endpoint(endpoint: &str, map: &HashMap<String, Value>) -> String {
    let (path, query) = match endpoint.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (endpoint, None),
    };

    let path = path
        .split('/')
        .map(|segment| match lookup(segment, map) {
            Some(real) => path_segment(real),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/");

    match query {
        Some(query) => format!("{path}?{query}"),
        None => path,
    }
}

fn substitute_value(value: &mut Value, map: &HashMap<String, Value>) {
    match value {
        Value::String(s) => {
            if let Some(real) = lookup(s, map) {
                *value = real.clone();
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|v| substitute_value(v, map)),
        Value::Object(fields) => fields.values_mut().for_each(|v| substitute_value(v, map)),
        _ => {}
    }
}

fn lookup<'a>(candidate: &str, map: &'a HashMap<String, Value>) -> Option<&'a Value> {
    if !is_placeholder(candidate) {
        return None;
    }
    map.get(candidate)
}

/// Extract the server-assigned id from a create response.
///
/// Looks at `pointer` first, then `/data/id`. Only non-empty strings and
/// numbers count as ids; they are returned as found.
pub fn extract_id(response: &Value, pointer: &str) -> Option<Value> {
    [pointer, FALLBACK_ID_POINTER]
        .iter()
        .filter_map(|p| response.pointer(p))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(v.clone()),
            Value::Number(_) => Some(v.clone()),
            _ => None,
        })
}

#[cfg(test)]
#[path = "remap_tests.rs"]
mod tests;
