//! Column metadata.

use serde::{Deserialize, Serialize};

/// Smallest width a column may be resized to, in pixels.
pub const MIN_COLUMN_WIDTH: u32 = 60;
/// Largest width a column may be resized to, in pixels.
pub const MAX_COLUMN_WIDTH: u32 = 500;
/// Width used when nothing else is known.
pub const DEFAULT_COLUMN_WIDTH: u32 = 120;

/// Which edge a column is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedSide {
    /// Scrolls with the main pane.
    #[default]
    None,
    /// Pinned to the left edge.
    Left,
    /// Pinned to the right edge.
    Right,
}

/// Caller-supplied column configuration.
///
/// Only `field` is required; everything else falls back to layout defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnConfig {
    /// Unique key, also the dotted path into row objects.
    pub field: String,
    /// Header label. Defaults to `field`.
    pub title: Option<String>,
    /// Initial pinned side.
    pub fixed: FixedSide,
    /// Initial visibility. Defaults to visible.
    pub visible: Option<bool>,
    /// Initial width in pixels.
    pub width: Option<u32>,
    /// Columns sharing a group stay adjacent.
    pub group: Option<String>,
    /// Per-column lower width bound.
    pub min_width: Option<u32>,
    /// Per-column upper width bound.
    pub max_width: Option<u32>,
    /// Whether the resize handle is active. Defaults to true.
    pub resizable: Option<bool>,
    /// Whether the header can be dragged. Defaults to true.
    pub draggable: Option<bool>,
}

impl ColumnConfig {
    /// Config with just a field name.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Self::default()
        }
    }

    /// Set the header label.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the initial width.
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the pinned side.
    pub fn fixed(mut self, side: FixedSide) -> Self {
        self.fixed = side;
        self
    }

    /// Put the column in a group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Start hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = Some(false);
        self
    }
}

/// Live column state owned by the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Unique key.
    pub field: String,
    /// Header label.
    pub title: String,
    /// Pinned side.
    pub fixed_side: FixedSide,
    /// Shown in its pane.
    pub visible: bool,
    /// Width in pixels, always within the column's bounds.
    pub width: u32,
    /// Dense position in the full column order.
    pub order_index: usize,
    /// Contiguity group.
    pub group_id: Option<String>,
    /// Lower width bound.
    pub min_width: u32,
    /// Upper width bound.
    pub max_width: u32,
    /// Resize handle active.
    pub resizable: bool,
    /// Header draggable.
    pub draggable: bool,
}

impl Column {
    /// Build a column from configuration, clamping the width into
    /// `[min_width, max_width]`.
    pub fn from_config(config: ColumnConfig, order_index: usize, bounds: WidthBounds) -> Self {
        let min_width = config.min_width.unwrap_or(bounds.min);
        let max_width = config.max_width.unwrap_or(bounds.max).max(min_width);
        let width = config
            .width
            .unwrap_or(bounds.default)
            .clamp(min_width, max_width);
        Self {
            title: config.title.unwrap_or_else(|| config.field.clone()),
            field: config.field,
            fixed_side: config.fixed,
            visible: config.visible.unwrap_or(true),
            width,
            order_index,
            group_id: config.group,
            min_width,
            max_width,
            resizable: config.resizable.unwrap_or(true),
            draggable: config.draggable.unwrap_or(true),
        }
    }

    /// Clamp a requested width into this column's bounds.
    pub fn clamp_width(&self, width: u32) -> u32 {
        width.clamp(self.min_width, self.max_width)
    }

    /// True for left- or right-pinned columns.
    pub fn is_pinned(&self) -> bool {
        self.fixed_side != FixedSide::None
    }
}

/// Grid-wide width bounds applied to columns without their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthBounds {
    /// Minimum width.
    pub min: u32,
    /// Maximum width.
    pub max: u32,
    /// Width for columns configured without one.
    pub default: u32,
}

impl Default for WidthBounds {
    fn default() -> Self {
        Self {
            min: MIN_COLUMN_WIDTH,
            max: MAX_COLUMN_WIDTH,
            default: DEFAULT_COLUMN_WIDTH,
        }
    }
}
