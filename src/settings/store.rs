//! Key-value persistence for grid settings.
//!
//! Stores never fail loudly: errors are logged and reported as "not
//! persisted" so a broken disk or full quota leaves the grid usable.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Key-value blob store.
pub trait SettingsStore {
    /// Persist `value` under `key`. Returns whether it was stored.
    fn save(&mut self, key: &str, value: &Value) -> bool;

    /// Stored value, or `None` when absent or unreadable.
    fn load(&self, key: &str) -> Option<Value>;

    /// Remove a key. Returns whether the store changed.
    fn remove(&mut self, key: &str) -> bool;
}

/// Store kept in memory for the life of the process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySettingsStore {
    entries: HashMap<String, Value>,
}

impl MemorySettingsStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No keys stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn save(&mut self, key: &str, value: &Value) -> bool {
        self.entries.insert(key.to_string(), value.clone());
        true
    }

    fn load(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}

/// Store backed by one JSON object on disk, rewritten on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    /// Store at `path`. Nothing is touched until the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `dirs::data_dir()/panegrid/settings.json`, or `None` when the platform
    /// has no data directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("panegrid").join("settings.json"))
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Option<Map<String, Value>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Some(Map::new()),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read settings file");
                return None;
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => {
                warn!(path = %self.path.display(), "Settings file is not a JSON object");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Settings file is not valid JSON");
                None
            }
        }
    }

    fn write_all(&self, map: Map<String, Value>) -> bool {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "Failed to create settings directory");
                return false;
            }
        }
        let content = match serde_json::to_string_pretty(&Value::Object(map)) {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "Failed to serialize settings");
                return false;
            }
        };
        match std::fs::write(&self.path, content) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to write settings file");
                false
            }
        }
    }
}

impl SettingsStore for FileSettingsStore {
    fn save(&mut self, key: &str, value: &Value) -> bool {
        let Some(mut map) = self.read_all() else {
            return false;
        };
        map.insert(key.to_string(), value.clone());
        self.write_all(map)
    }

    fn load(&self, key: &str) -> Option<Value> {
        self.read_all()?.remove(key)
    }

    fn remove(&mut self, key: &str) -> bool {
        let Some(mut map) = self.read_all() else {
            return false;
        };
        if map.remove(key).is_none() {
            return false;
        }
        self.write_all(map)
    }
}
