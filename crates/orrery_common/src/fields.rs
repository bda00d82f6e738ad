//! Priority-fallback field access over arbitrary JSON.
//!
//! Upstream payloads name the same concept differently (`time` vs `date` vs
//! `occursAt`). Handlers describe the candidates once, in priority order, and
//! take the first one present.

use serde_json::Value;

/// Look up a dot-separated path (`eventHighlights.peak.date`) inside a value.
///
/// Returns `None` as soon as any segment is missing; never fails on
/// non-object intermediates.
pub fn lookup<'a>(node: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(node, |v, key| v.get(key))
}

/// Return the first candidate path that resolves to a scalar, rendered as
/// display text. Candidates are tried strictly in order.
pub fn first_of(node: &Value, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find_map(|path| lookup(node, path).and_then(text))
}

/// Render a scalar JSON value as display text.
///
/// Strings pass through, numbers and booleans use their JSON form. Objects,
/// arrays, and null carry no displayable text.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Object(_) | Value::Array(_) => None,
    }
}

/// Like [`first_of`] but falls back to an empty string, the normalized
/// placeholder for "absent".
pub fn first_of_or_empty(node: &Value, candidates: &[&str]) -> String {
    first_of(node, candidates).unwrap_or_default()
}
