//! Expandable detail rows beneath parent rows.

use super::DisplayRow;
use crate::model::row::row_key;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// How expanded rows interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestedMode {
    /// Any number of rows may be open.
    #[default]
    Inline,
    /// Opening a row closes the others.
    Accordion,
}

/// Nested row configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NestedConfig {
    /// Nested rows are active.
    pub enabled: bool,
    /// Expansion mode.
    pub mode: NestedMode,
    /// Default detail renderer name; when set every row has detail content.
    pub component: Option<String>,
    /// Field holding child rows.
    pub children_field: String,
}

impl Default for NestedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: NestedMode::Inline,
            component: None,
            children_field: "children".to_string(),
        }
    }
}

/// Expansion request for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NestedToggle {
    /// Flip the current state.
    Toggle,
    /// Open or close.
    SetVisible(bool),
    /// Pick the detail renderer and open or close.
    SetComponentAndVisible(String, bool),
}

/// Expansion state of nested detail rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NestedRows {
    config: NestedConfig,
    expanded: Vec<String>,
    components: HashMap<String, String>,
}

impl NestedRows {
    /// Nothing expanded.
    pub fn new(config: NestedConfig) -> Self {
        Self {
            config,
            expanded: Vec::new(),
            components: HashMap::new(),
        }
    }

    /// Configuration.
    pub fn config(&self) -> &NestedConfig {
        &self.config
    }

    /// Child rows stored on `row`.
    pub fn children<'a>(&self, row: &'a Value) -> &'a [Value] {
        row.get(&self.config.children_field)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `row` has anything to show when expanded.
    pub fn has_nested(&self, row: &Value) -> bool {
        self.config.enabled && (!self.children(row).is_empty() || self.config.component.is_some())
    }

    /// Whether the row with `key` is open.
    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.iter().any(|k| k == key)
    }

    /// Open row keys in opening order.
    pub fn expanded(&self) -> &[String] {
        &self.expanded
    }

    /// Detail renderer chosen for a row.
    pub fn component_for(&self, key: &str) -> Option<&str> {
        self.components
            .get(key)
            .or(self.config.component.as_ref())
            .map(String::as_str)
    }

    /// Apply a toggle request. Returns whether the row is open afterwards.
    pub fn toggle(&mut self, key: &str, request: NestedToggle) -> bool {
        let open = match request {
            NestedToggle::Toggle => !self.is_expanded(key),
            NestedToggle::SetVisible(visible) => visible,
            NestedToggle::SetComponentAndVisible(component, visible) => {
                self.components.insert(key.to_string(), component);
                visible
            }
        };
        if open {
            if self.config.mode == NestedMode::Accordion {
                self.expanded.retain(|k| k == key);
            }
            if !self.is_expanded(key) {
                self.expanded.push(key.to_string());
            }
        } else {
            self.expanded.retain(|k| k != key);
        }
        debug!(key, open, "Nested row toggled");
        open
    }

    /// Open every row with nested content. Accordion mode opens only the
    /// first.
    pub fn expand_all(&mut self, rows: &[Value]) {
        let keys = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| self.has_nested(row))
            .map(|(i, row)| row_key(row, i));
        let keys: Vec<String> = match self.config.mode {
            NestedMode::Inline => keys.collect(),
            NestedMode::Accordion => keys.take(1).collect(),
        };
        for key in keys {
            if !self.is_expanded(&key) {
                self.expanded.push(key);
            }
        }
    }

    /// Close every row.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Display rows with a detail row after each open parent.
    pub fn flatten(&self, rows: &[Value]) -> Vec<DisplayRow> {
        let mut out = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            out.push(DisplayRow::Data { index, level: 0 });
            if self.has_nested(row) && self.is_expanded(&row_key(row, index)) {
                out.push(DisplayRow::Detail { parent: index });
            }
        }
        out
    }
}
