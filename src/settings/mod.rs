//! Grid settings persistence.

pub mod backup;
pub mod store;

pub use backup::{
    storage_key, ExportedSettings, GridSettings, SettingsBackup, SettingsError, AUTOSAVE_DELAY,
};
pub use store::{FileSettingsStore, MemorySettingsStore, SettingsStore};
