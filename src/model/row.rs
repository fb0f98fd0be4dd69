//! Row payload access and derived row display state.
//!
//! Row payloads are caller-owned JSON objects. The grid only reads them.

use serde_json::Value;

/// Derived display state for one rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowState {
    /// Index in the display row list.
    pub index: usize,
    /// Height in pixels, fixed or measured.
    pub height: usize,
    /// Nested detail or group children shown.
    pub is_expanded: bool,
    /// Part of the current selection.
    pub is_selected: bool,
}

/// Stable identity of a row: its `id` (or `_id`) field, else `row-{index}`.
pub fn row_key(row: &Value, index: usize) -> String {
    ["id", "_id"]
        .iter()
        .filter_map(|k| row.get(k))
        .find_map(key_text)
        .unwrap_or_else(|| format!("row-{index}"))
}

fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Follow a dotted path (`"address.city"`) into a row.
pub fn value_at_path<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(row, |current, key| current.get(key))
}

/// Text shown in a cell: strings unquoted, `null`/missing empty.
pub fn display_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Numeric view of a cell, accepting numbers and numeric strings.
pub fn numeric_value(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
