//! Configuration file loading with precedence handling.

use crate::grid::{GridOptions, DEFAULT_ROW_HEIGHT};
use crate::model::column::{
    WidthBounds, DEFAULT_COLUMN_WIDTH, MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH,
};
use crate::model::query::DEFAULT_PAGE_SIZE;
use crate::virtual_scroll::{DEFAULT_BUFFER, DEFAULT_OVERSCAN};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "PANEGRID_CONFIG";
/// Environment variable overriding `row_height`.
pub const ROW_HEIGHT_ENV: &str = "PANEGRID_ROW_HEIGHT";
/// Environment variable overriding `page_size`.
pub const PAGE_SIZE_ENV: &str = "PANEGRID_PAGE_SIZE";
/// Environment variable overriding `log_file_path`.
pub const LOG_FILE_ENV: &str = "PANEGRID_LOG_FILE";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (permission issues, not a file).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional; unset fields fall back to defaults.
/// Corresponds to `~/.config/panegrid/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Fixed body row height in pixels. `0` selects measured rows.
    #[serde(default)]
    pub row_height: Option<usize>,

    /// Rows rendered beyond each viewport edge.
    #[serde(default)]
    pub buffer: Option<usize>,

    /// Extra viewport rows rendered while scrolling.
    #[serde(default)]
    pub overscan: Option<usize>,

    /// Smallest column width.
    #[serde(default)]
    pub min_column_width: Option<u32>,

    /// Largest column width.
    #[serde(default)]
    pub max_column_width: Option<u32>,

    /// Width of columns without one.
    #[serde(default)]
    pub default_column_width: Option<u32>,

    /// Rows per page.
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Grid name used for the settings key.
    #[serde(default)]
    pub grid_name: Option<String>,

    /// Persist column and query settings.
    #[serde(default)]
    pub support_backup: Option<bool>,

    /// Settings file location.
    #[serde(default)]
    pub settings_path: Option<PathBuf>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Row height; `0` means measured rows.
    pub row_height: usize,
    /// Row buffer.
    pub buffer: usize,
    /// Overscan rows.
    pub overscan: usize,
    /// Column width bounds.
    pub width_bounds: WidthBounds,
    /// Rows per page.
    pub page_size: usize,
    /// Grid name.
    pub grid_name: String,
    /// Settings backup enabled.
    pub support_backup: bool,
    /// Settings file, `None` when the platform has no data directory.
    pub settings_path: Option<PathBuf>,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            buffer: DEFAULT_BUFFER,
            overscan: DEFAULT_OVERSCAN,
            width_bounds: WidthBounds::default(),
            page_size: DEFAULT_PAGE_SIZE,
            grid_name: "panegrid".to_string(),
            support_backup: true,
            settings_path: crate::settings::FileSettingsStore::default_path(),
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Grid options for this configuration.
    pub fn grid_options(&self) -> GridOptions {
        GridOptions {
            row_height: self.row_height,
            dynamic_rows: self.row_height == 0,
            buffer: self.buffer,
            overscan: self.overscan,
            width_bounds: self.width_bounds,
            page_size: self.page_size,
            grid_name: self.grid_name.clone(),
            support_backup: self.support_backup,
            ..GridOptions::default()
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/panegrid/panegrid.log` on Unix-like systems,
/// or the platform equivalent. Falls back to the current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("panegrid").join("panegrid.log")
    } else {
        PathBuf::from("panegrid.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/panegrid/config.toml` on Unix, appropriate path on other
/// platforms. Returns `None` if the config directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("panegrid").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `PANEGRID_CONFIG` environment variable
/// 3. Default path `~/.config/panegrid/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed,
/// or if `PANEGRID_CONFIG` is not valid UTF-8.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    match std::env::var(CONFIG_ENV) {
        Ok(env_path) => return load_config_file(PathBuf::from(env_path)),
        Err(std::env::VarError::NotUnicode(raw)) => {
            return Err(ConfigError::InvalidPath(raw.to_string_lossy().into_owned()));
        }
        Err(std::env::VarError::NotPresent) => {}
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

fn env_number(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "Ignoring non-numeric environment override");
            None
        }
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `PANEGRID_ROW_HEIGHT`: Override row height
/// - `PANEGRID_PAGE_SIZE`: Override page size
/// - `PANEGRID_LOG_FILE`: Override log file path
///
/// Unparseable numbers are ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(row_height) = env_number(ROW_HEIGHT_ENV) {
        config.row_height = row_height;
    }
    if let Some(page_size) = env_number(PAGE_SIZE_ENV) {
        config.page_size = page_size.max(1);
    }
    if let Ok(log_file) = std::env::var(LOG_FILE_ENV) {
        config.log_file_path = PathBuf::from(log_file);
    }
    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use
/// default. Width bounds are clamped so that `min <= default <= max`.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let min = config.min_column_width.unwrap_or(MIN_COLUMN_WIDTH);
    let max = config.max_column_width.unwrap_or(MAX_COLUMN_WIDTH).max(min);
    let default = config
        .default_column_width
        .unwrap_or(DEFAULT_COLUMN_WIDTH)
        .clamp(min, max);

    ResolvedConfig {
        row_height: config.row_height.unwrap_or(defaults.row_height),
        buffer: config.buffer.unwrap_or(defaults.buffer),
        overscan: config.overscan.unwrap_or(defaults.overscan),
        width_bounds: WidthBounds { min, max, default },
        page_size: config.page_size.unwrap_or(defaults.page_size).max(1),
        grid_name: config.grid_name.unwrap_or(defaults.grid_name),
        support_backup: config.support_backup.unwrap_or(defaults.support_backup),
        settings_path: config.settings_path.or(defaults.settings_path),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
///
/// # Arguments
///
/// * `config` - Base resolved config (already merged with defaults, file, and env vars)
/// * `row_height_override` - Optional row height from `--row-height`
/// * `page_size_override` - Optional page size from `--page-size`
/// * `grid_name_override` - Optional grid name from `--grid-name`
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    row_height_override: Option<usize>,
    page_size_override: Option<usize>,
    grid_name_override: Option<String>,
) -> ResolvedConfig {
    if let Some(row_height) = row_height_override {
        config.row_height = row_height;
    }

    if let Some(page_size) = page_size_override {
        config.page_size = page_size.max(1);
    }

    if let Some(grid_name) = grid_name_override {
        config.grid_name = grid_name;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
