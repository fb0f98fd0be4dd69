//! Save, restore, export and import of column layout and query state.

use super::store::SettingsStore;
use crate::columns::{ColumnLayoutEngine, ColumnSnapshot};
use crate::model::query::TableQuery;
use crate::sync::Debouncer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Quiet period after the last change before settings are auto-saved.
pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(1000);

/// Failure decoding or encoding settings JSON.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings JSON did not parse.
    #[error("invalid settings JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// Settings could not be serialized.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Persisted grid state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSettings {
    /// Query at save time.
    #[serde(default)]
    pub query: Option<TableQuery>,
    /// Column state at save time.
    #[serde(default)]
    pub columns: Vec<ColumnSnapshot>,
    /// Save time in Unix milliseconds.
    #[serde(default)]
    pub timestamp: i64,
}

/// Human-facing export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedSettings {
    /// Column state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnSnapshot>>,
    /// Query state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<TableQuery>,
    /// Export time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

/// Storage key for a grid: `datatable-{grid_name}-{hash}` where the hash is
/// the first 20 characters of the JSON field list.
pub fn storage_key<S: AsRef<str>>(grid_name: &str, fields: &[S]) -> String {
    let fields: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
    let json = serde_json::to_string(&fields).unwrap_or_default();
    let hash: String = json.chars().take(20).collect();
    format!("datatable-{grid_name}-{hash}")
}

/// Settings persistence for one grid.
#[derive(Debug, Clone)]
pub struct SettingsBackup {
    key: Option<String>,
    autosave: Debouncer,
}

impl SettingsBackup {
    /// Backup for a grid.
    ///
    /// Disabled when `enabled` is false or `grid_name` is empty; a disabled
    /// backup ignores every save, load and auto-save.
    pub fn new<S: AsRef<str>>(grid_name: &str, enabled: bool, fields: &[S]) -> Self {
        let key = (enabled && !grid_name.is_empty()).then(|| storage_key(grid_name, fields));
        Self {
            key,
            autosave: Debouncer::new(AUTOSAVE_DELAY),
        }
    }

    /// Storage key, `None` when disabled.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Whether settings are persisted.
    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Persist current state. Returns whether it was stored.
    pub fn save(
        &self,
        store: &mut dyn SettingsStore,
        columns: &ColumnLayoutEngine,
        query: &TableQuery,
    ) -> bool {
        let Some(key) = &self.key else {
            return false;
        };
        let settings = GridSettings {
            query: Some(query.clone()),
            columns: columns.snapshot(),
            timestamp: Utc::now().timestamp_millis(),
        };
        let value = match serde_json::to_value(&settings) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to serialize grid settings");
                return false;
            }
        };
        let stored = store.save(key, &value);
        debug!(key, stored, "Grid settings saved");
        stored
    }

    /// Apply stored state. Saved columns are matched by field; unknown fields
    /// are skipped. Returns whether anything was applied.
    pub fn load(
        &self,
        store: &dyn SettingsStore,
        columns: &mut ColumnLayoutEngine,
        query: &mut TableQuery,
    ) -> bool {
        let Some(key) = &self.key else {
            return false;
        };
        let Some(value) = store.load(key) else {
            return false;
        };
        let settings: GridSettings = match serde_json::from_value(value) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(key, error = %e, "Ignoring unreadable grid settings");
                return false;
            }
        };
        if let Some(saved) = settings.query {
            *query = saved;
        }
        if !settings.columns.is_empty() {
            columns.restore(&settings.columns);
        }
        info!(key, "Grid settings restored");
        true
    }

    /// Pretty JSON export with an `exportedAt` timestamp.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Serialize` if serialization fails.
    pub fn export_json(
        &self,
        columns: &ColumnLayoutEngine,
        query: &TableQuery,
    ) -> Result<String, SettingsError> {
        let export = ExportedSettings {
            columns: Some(columns.snapshot()),
            query: Some(query.clone()),
            exported_at: Some(Utc::now()),
        };
        serde_json::to_string_pretty(&export).map_err(SettingsError::Serialize)
    }

    /// Apply an export document, then persist it when enabled.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Parse` for malformed JSON; nothing is changed.
    pub fn try_import_json(
        &self,
        json: &str,
        store: &mut dyn SettingsStore,
        columns: &mut ColumnLayoutEngine,
        query: &mut TableQuery,
    ) -> Result<(), SettingsError> {
        let imported: ExportedSettings = serde_json::from_str(json).map_err(SettingsError::Parse)?;
        if let Some(saved) = imported.columns {
            columns.restore(&saved);
        }
        if let Some(saved) = imported.query {
            *query = saved;
        }
        if self.is_enabled() {
            self.save(store, columns, query);
        }
        Ok(())
    }

    /// [`SettingsBackup::try_import_json`] reporting failure as `false`.
    pub fn import_json(
        &self,
        json: &str,
        store: &mut dyn SettingsStore,
        columns: &mut ColumnLayoutEngine,
        query: &mut TableQuery,
    ) -> bool {
        match self.try_import_json(json, store, columns, query) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to import grid settings");
                false
            }
        }
    }

    /// Forget stored state and return to the initial columns and a default
    /// query with the same page size.
    pub fn reset(
        &mut self,
        store: &mut dyn SettingsStore,
        columns: &mut ColumnLayoutEngine,
        query: &mut TableQuery,
    ) {
        self.autosave.cancel();
        if let Some(key) = &self.key {
            store.remove(key);
        }
        columns.reset();
        *query = TableQuery::with_page_size(query.limit);
    }

    /// Note a change; auto-save fires [`AUTOSAVE_DELAY`] after the last one.
    pub fn schedule(&mut self, now: Instant) {
        if self.is_enabled() {
            self.autosave.arm(now);
        }
    }

    /// An auto-save is waiting.
    pub fn is_pending(&self) -> bool {
        self.autosave.is_armed()
    }

    /// Save if the auto-save delay has elapsed. Returns whether a save ran.
    pub fn poll(
        &mut self,
        now: Instant,
        store: &mut dyn SettingsStore,
        columns: &ColumnLayoutEngine,
        query: &TableQuery,
    ) -> bool {
        self.autosave.poll(now) && self.save(store, columns, query)
    }

    /// Drop any pending auto-save.
    pub fn teardown(&mut self) {
        self.autosave.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnConfig, FixedSide, WidthBounds};
    use crate::settings::store::MemorySettingsStore;

    fn engine() -> ColumnLayoutEngine {
        let configs = ["id", "name", "dept"]
            .into_iter()
            .map(ColumnConfig::new)
            .collect();
        ColumnLayoutEngine::new(configs, WidthBounds::default())
    }

    fn backup() -> SettingsBackup {
        SettingsBackup::new("staff", true, &["id", "name", "dept"])
    }

    #[test]
    fn key_uses_truncated_field_json() {
        assert_eq!(
            storage_key("staff", &["id", "name", "dept"]),
            r#"datatable-staff-["id","name","dept"]"#
        );
        assert_eq!(
            storage_key("g", &["employeeNumber", "department"]),
            r#"datatable-g-["employeeNumber","d"#
        );
    }

    #[test]
    fn disabled_without_name_or_flag() {
        assert!(!SettingsBackup::new("", true, &["id"]).is_enabled());
        assert!(!SettingsBackup::new("staff", false, &["id"]).is_enabled());

        let mut store = MemorySettingsStore::new();
        let disabled = SettingsBackup::new("staff", false, &["id"]);
        assert!(!disabled.save(&mut store, &engine(), &TableQuery::default()));
        assert!(store.is_empty());
    }

    #[test]
    fn save_then_load_restores_columns_and_query() {
        let mut store = MemorySettingsStore::new();
        let mut columns = engine();
        columns.pin("dept", FixedSide::Left);
        columns.resize("name", 250);
        let mut query = TableQuery::with_page_size(50);
        query.go_to_page(2);
        assert!(backup().save(&mut store, &columns, &query));

        let mut fresh = engine();
        let mut fresh_query = TableQuery::default();
        assert!(backup().load(&store, &mut fresh, &mut fresh_query));
        assert_eq!(fresh.field_order(), vec!["dept", "id", "name"]);
        assert_eq!(fresh.column("name").map(|c| c.width), Some(250));
        assert_eq!(fresh_query.offset, 50);
    }

    #[test]
    fn export_import_round_trip() {
        let mut columns = engine();
        columns.set_visible("id", false);
        let query = TableQuery::with_page_size(40);
        let json = backup().export_json(&columns, &query).unwrap_or_default();
        assert!(json.contains("\"exportedAt\""));

        let mut store = MemorySettingsStore::new();
        let mut target = engine();
        let mut target_query = TableQuery::default();
        assert!(backup().import_json(&json, &mut store, &mut target, &mut target_query));
        assert_eq!(target.column("id").map(|c| c.visible), Some(false));
        assert_eq!(target_query.limit, 40);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn bad_import_changes_nothing() {
        let mut store = MemorySettingsStore::new();
        let mut columns = engine();
        let mut query = TableQuery::default();
        assert!(!backup().import_json("{not json", &mut store, &mut columns, &mut query));
        assert_eq!(query, TableQuery::default());
        assert!(store.is_empty());
    }

    #[test]
    fn reset_removes_key_and_restores_defaults() {
        let mut store = MemorySettingsStore::new();
        let mut columns = engine();
        let mut query = TableQuery::with_page_size(80);
        query.go_to_page(4);
        columns.pin("name", FixedSide::Right);
        let mut backup = backup();
        backup.save(&mut store, &columns, &query);

        backup.reset(&mut store, &mut columns, &mut query);
        assert!(store.is_empty());
        assert_eq!(columns.field_order(), vec!["id", "name", "dept"]);
        assert_eq!(query.offset, 0);
        assert_eq!(query.limit, 80);
    }

    #[test]
    fn autosave_is_debounced() {
        let mut store = MemorySettingsStore::new();
        let columns = engine();
        let query = TableQuery::default();
        let mut backup = backup();
        let t0 = Instant::now();

        backup.schedule(t0);
        backup.schedule(t0 + Duration::from_millis(600));
        assert!(!backup.poll(t0 + Duration::from_millis(1200), &mut store, &columns, &query));
        assert!(backup.poll(t0 + Duration::from_millis(1600), &mut store, &columns, &query));
        assert!(!backup.poll(t0 + Duration::from_millis(3000), &mut store, &columns, &query));
        assert_eq!(store.len(), 1);
    }
}
