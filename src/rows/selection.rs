//! Row selection keyed by row identity.

use crate::model::row::row_key;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How many rows may be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Any number.
    #[default]
    Multiple,
    /// At most one; selecting replaces.
    Single,
}

/// Selected row keys with the matching row payloads, kept parallel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    mode: SelectionMode,
    keys: Vec<String>,
    rows: Vec<Value>,
}

impl Selection {
    /// Empty selection.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            keys: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Selected keys in selection order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Selected rows, parallel to [`Selection::keys`].
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    /// Number of selected rows.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Nothing selected.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether `key` is selected.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Select a row. Returns `false` if it was already selected.
    pub fn select(&mut self, row: &Value, index: usize) -> bool {
        let key = row_key(row, index);
        if self.contains(&key) {
            return false;
        }
        if self.mode == SelectionMode::Single {
            self.clear();
        }
        self.keys.push(key);
        self.rows.push(row.clone());
        true
    }

    /// Deselect by key. Returns whether anything was removed.
    pub fn deselect(&mut self, key: &str) -> bool {
        let Some(pos) = self.keys.iter().position(|k| k == key) else {
            return false;
        };
        self.keys.remove(pos);
        self.rows.remove(pos);
        true
    }

    /// Flip a row. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, row: &Value, index: usize) -> bool {
        let key = row_key(row, index);
        if self.deselect(&key) {
            false
        } else {
            self.select(row, index)
        }
    }

    /// Select every row; in single mode only the first.
    pub fn select_all(&mut self, rows: &[Value]) {
        match self.mode {
            SelectionMode::Single => {
                if let Some(first) = rows.first() {
                    self.clear();
                    self.select(first, 0);
                }
            }
            SelectionMode::Multiple => {
                for (i, row) in rows.iter().enumerate() {
                    self.select(row, i);
                }
            }
        }
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.rows.clear();
    }

    /// Drop selections whose rows are no longer present.
    pub fn retain_present(&mut self, rows: &[Value]) {
        let present: Vec<String> = rows.iter().enumerate().map(|(i, r)| row_key(r, i)).collect();
        let mut i = 0;
        while i < self.keys.len() {
            if present.contains(&self.keys[i]) {
                i += 1;
            } else {
                self.keys.remove(i);
                self.rows.remove(i);
            }
        }
    }
}
