//! panegrid
//!
//! Headless data-grid engine with a terminal front end.
//!
//! The pure core owns everything a table needs between input and pixels:
//! virtual scrolling over fixed or measured rows ([`virtual_scroll`]),
//! pinned-column layout ([`columns`]), drag-to-reorder ([`drag`]), scroll
//! synchronization between panes ([`sync`]), grouping, nested rows and
//! selection ([`rows`]), paged loading ([`data`]) and persisted column
//! settings ([`settings`]). [`grid::DataGrid`] ties them together for one
//! table. The impure shell in [`view`] renders a grid with ratatui and feeds
//! it crossterm input.

pub mod columns;
pub mod config;
pub mod data;
pub mod drag;
pub mod grid;
pub mod logging;
pub mod model;
pub mod notify;
pub mod rows;
pub mod settings;
pub mod sync;
pub mod view;
pub mod virtual_scroll;
