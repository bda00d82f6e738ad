//! Astronomical-events normalizer.
//!
//! The events API answers in one of two shapes: the structured table
//! (`data.table.rows[].cells[]`) or an arbitrary object graph from older
//! backends. Both are flattened into [`NormalizedEvent`] records. The two
//! paths are mutually exclusive per payload - when the structured table is
//! found the generic search is never consulted.
//!
//! Normalization never fails: missing or malformed fields become empty
//! strings (or the documented defaults) and processing continues.

use crate::fields;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum number of events handed to table rendering. The full count and
/// the raw payload stay available alongside the truncated list.
pub const DISPLAY_LIMIT: usize = 200;

/// Name-like keys recognized by the generic search, in priority order.
const NAME_KEYS: &[&str] = &["name", "body", "object", "target"];

/// Type-like keys recognized by the generic search, in priority order.
const TYPE_KEYS: &[&str] = &["type", "event_type", "category"];

/// Timestamp keys recognized by the generic search, in priority order.
const WHEN_KEYS: &[&str] = &["time", "date", "occursAt", "peak", "instant"];

/// Detail keys recognized by the generic search, in priority order.
const EXTRA_KEYS: &[&str] = &["magnitude", "mag", "altitude", "note"];

/// Event timestamp candidates on a structured-table cell. An event with a
/// peak is reported at its peak; partial/total phases are reported at their
/// start when no peak exists.
const CELL_WHEN_KEYS: &[&str] = &[
    "eventHighlights.peak.date",
    "eventHighlights.partialStart.date",
    "eventHighlights.totalStart.date",
    "date",
    "time",
];

/// One row of the uniform events table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub when: String,
    pub extra: String,
}

/// Shape detector: the rows of the structured table, if the payload carries
/// one. Absence is a normal outcome that selects the fallback search, never
/// an error.
pub fn structured_rows(payload: &Value) -> Option<&Vec<Value>> {
    fields::lookup(payload, "data.table.rows")?.as_array()
}

/// Flatten an events payload of either shape into normalized records.
///
/// Output order matches discovery order: row-then-cell for the structured
/// table, depth-first for the generic search.
pub fn normalize_events(payload: &Value) -> Vec<NormalizedEvent> {
    match structured_rows(payload) {
        Some(rows) => from_table(rows),
        None => {
            let mut out = Vec::new();
            search(payload, &mut out);
            out
        }
    }
}

/// Structured path: one event per cell, in row-then-cell order.
fn from_table(rows: &[Value]) -> Vec<NormalizedEvent> {
    let mut out = Vec::new();

    for row in rows {
        let body = fields::lookup(row, "entry.name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");

        let Some(cells) = row.get("cells").and_then(Value::as_array) else {
            continue;
        };

        for cell in cells {
            out.push(NormalizedEvent {
                name: body.to_string(),
                kind: cell
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                when: fields::first_of_or_empty(cell, CELL_WHEN_KEYS),
                extra: cell_extra(cell),
            });
        }
    }

    out
}

/// Cell detail column: obscuration percentage when reported, otherwise the
/// plain `extra` field, otherwise empty.
fn cell_extra(cell: &Value) -> String {
    if let Some(obscuration) = fields::lookup(cell, "extraInfo.obscuration").and_then(Value::as_f64)
    {
        return format!("Obscuration: {}%", (obscuration * 100.0).round() as i64);
    }
    fields::first_of_or_empty(cell, &["extra"])
}

/// Fallback path: exhaustive depth-first search over the object graph.
///
/// Arrays are visited by element, objects by value. A node is an event when
/// it carries both a type-like and a name-like field; its children are still
/// visited afterwards, so nested events under a match are not lost.
fn search(node: &Value, out: &mut Vec<NormalizedEvent>) {
    match node {
        Value::Array(items) => {
            for item in items {
                search(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(event) = match_generic(node) {
                out.push(event);
            }
            for child in map.values() {
                search(child, out);
            }
        }
        _ => {}
    }
}

/// Try to read a generic event off one object node. Both the type group and
/// the name group must resolve to non-empty text for the node to count.
fn match_generic(node: &Value) -> Option<NormalizedEvent> {
    let kind = fields::first_of(node, TYPE_KEYS).filter(|s| !s.is_empty())?;
    let name = fields::first_of(node, NAME_KEYS).filter(|s| !s.is_empty())?;

    Some(NormalizedEvent {
        name,
        kind,
        when: fields::first_of_or_empty(node, WHEN_KEYS),
        extra: fields::first_of_or_empty(node, EXTRA_KEYS),
    })
}
