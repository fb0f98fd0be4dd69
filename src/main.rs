//! panegrid - Entry Point

use clap::Parser;
use panegrid::data::{infer_columns, load_rows, StaticDataSource};
use panegrid::grid::DataGrid;
use panegrid::model::AppError;
use panegrid::rows::{GroupConfig, NestedConfig};
use panegrid::settings::{FileSettingsStore, MemorySettingsStore, SettingsStore};
use panegrid::view::{ColorConfig, GridStyles};
use std::path::PathBuf;
use tracing::info;

/// panegrid - browse JSON rows in a virtualized, pinnable terminal grid
#[derive(Parser, Debug)]
#[command(name = "panegrid")]
#[command(version)]
#[command(about = "Browse JSON rows in a virtualized terminal grid with pinned columns")]
pub struct Args {
    /// JSON array or JSON Lines file of row objects
    pub file: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Name under which column settings are saved
    #[arg(long)]
    pub grid_name: Option<String>,

    /// Row height in pixels (0 for measured rows)
    #[arg(long)]
    pub row_height: Option<usize>,

    /// Rows per page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Group rows by this field (dotted paths allowed)
    #[arg(short, long)]
    pub group_by: Option<String>,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = panegrid::config::load_config_with_precedence(args.config.clone())?;
        let merged = panegrid::config::merge_config(config_file);
        let with_env = panegrid::config::apply_env_overrides(merged);
        panegrid::config::apply_cli_overrides(
            with_env,
            args.row_height,
            args.page_size.map(|size| size as usize),
            args.grid_name.clone(),
        )
    };

    panegrid::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let rows = load_rows(&args.file)?;
    let nested = NestedConfig::default();
    let has_children = rows.iter().any(|row| row.get(&nested.children_field).is_some());
    let columns = infer_columns(&rows, &[nested.children_field.as_str()]);

    let mut options = config.grid_options();
    options.group = args.group_by.clone().map(GroupConfig::by);
    if has_children {
        options.nested = Some(nested);
    }

    let store: Box<dyn SettingsStore> = match &config.settings_path {
        Some(path) => Box::new(FileSettingsStore::new(path)),
        None => Box::new(MemorySettingsStore::new()),
    };
    let mut grid = DataGrid::new(columns, options)
        .with_data_source(Box::new(StaticDataSource::new(rows)))
        .with_store(store);
    grid.refresh();
    if grid.restore_settings() {
        info!(key = ?grid.settings_key(), "Applied saved grid settings");
    }

    let styles = GridStyles::with_color_config(ColorConfig::from_env_and_args(args.no_color));
    panegrid::view::run_grid(grid, styles)?;

    Ok(())
}
