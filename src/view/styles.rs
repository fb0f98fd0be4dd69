//! Grid styling.

use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// Priority (first match wins):
    /// 1. `--no-color` flag (disables colors)
    /// 2. `NO_COLOR` env var (any value disables colors)
    /// 3. Default: colors enabled
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var("NO_COLOR").is_err();
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== GridStyles =====

/// Styles for each part of the grid.
///
/// Without colors, emphasis falls back to bold, reversed and dim text so
/// focus and selection stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStyles {
    /// Header cells.
    pub header: Style,
    /// Header cell of the focused column.
    pub focused_header: Style,
    /// Insertion cue during a header drag.
    pub drop_cue: Style,
    /// Row under the cursor.
    pub cursor_row: Style,
    /// Selected rows.
    pub selected_row: Style,
    /// Group header rows.
    pub group_header: Style,
    /// Nested detail rows.
    pub detail: Style,
    /// Status bar.
    pub status: Style,
    /// Error notices in the status bar.
    pub error: Style,
}

impl GridStyles {
    /// Styles for the given color configuration.
    pub fn with_color_config(config: ColorConfig) -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        if config.colors_enabled() {
            Self {
                header: bold.fg(Color::Cyan),
                focused_header: bold.fg(Color::Black).bg(Color::Cyan),
                drop_cue: bold.fg(Color::Yellow),
                cursor_row: Style::default().bg(Color::DarkGray),
                selected_row: Style::default().fg(Color::Green),
                group_header: bold.fg(Color::Magenta),
                detail: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
                status: Style::default().fg(Color::Black).bg(Color::Gray),
                error: bold.fg(Color::Red).bg(Color::Gray),
            }
        } else {
            Self {
                header: bold,
                focused_header: bold.add_modifier(Modifier::REVERSED),
                drop_cue: bold,
                cursor_row: Style::default().add_modifier(Modifier::REVERSED),
                selected_row: bold,
                group_header: bold,
                detail: Style::default().add_modifier(Modifier::DIM),
                status: Style::default().add_modifier(Modifier::REVERSED),
                error: bold.add_modifier(Modifier::REVERSED),
            }
        }
    }
}

impl Default for GridStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env_and_args(false))
    }
}
