//! Screen areas for the three grid panes.
//!
//! Pure layout logic: the header row and body are split into left-fixed,
//! main and right-fixed columns, with a status bar underneath. Fixed panes
//! take their column width first; the main pane gets the remainder.

use super::constants::{CELL_PX, HEADER_HEIGHT, STATUS_BAR_HEIGHT};
use crate::columns::PaneKind;
use ratatui::layout::{Constraint, Layout, Rect};

/// Terminal cells needed for `px` pixels, rounded up.
pub fn px_to_cells(px: u32) -> u16 {
    u16::try_from(px.div_ceil(CELL_PX)).unwrap_or(u16::MAX)
}

/// Pixels covered by `cells` terminal cells.
pub fn cells_to_px(cells: u16) -> u32 {
    u32::from(cells) * CELL_PX
}

/// Part of the screen under a terminal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaHit {
    /// Pane column.
    pub pane: PaneKind,
    /// In the header row rather than the body.
    pub header: bool,
}

/// Computed screen areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridAreas {
    headers: [Rect; 3],
    bodies: [Rect; 3],
    /// Status bar.
    pub status: Rect,
}

fn slot(pane: PaneKind) -> usize {
    match pane {
        PaneKind::Left => 0,
        PaneKind::Main => 1,
        PaneKind::Right => 2,
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

impl GridAreas {
    /// Header area of `pane`.
    pub fn header(&self, pane: PaneKind) -> Rect {
        self.headers[slot(pane)]
    }

    /// Body area of `pane`.
    pub fn body(&self, pane: PaneKind) -> Rect {
        self.bodies[slot(pane)]
    }

    /// Body height in lines.
    pub fn body_lines(&self) -> u16 {
        self.bodies[1].height
    }

    /// Pane and row kind at a terminal position.
    pub fn hit(&self, column: u16, row: u16) -> Option<AreaHit> {
        PaneKind::ALL.into_iter().find_map(|pane| {
            if contains(self.header(pane), column, row) {
                Some(AreaHit { pane, header: true })
            } else if contains(self.body(pane), column, row) {
                Some(AreaHit { pane, header: false })
            } else {
                None
            }
        })
    }
}

fn split_columns(row: Rect, left: u16, right: u16) -> [Rect; 3] {
    let main = row.width - left - right;
    [
        Rect::new(row.x, row.y, left, row.height),
        Rect::new(row.x + left, row.y, main, row.height),
        Rect::new(row.x + left + main, row.y, right, row.height),
    ]
}

/// Lay out the grid in `area` for fixed panes `left_px` and `right_px` wide.
///
/// When the fixed panes do not fit, the right pane shrinks first.
pub fn calculate_areas(area: Rect, left_px: u32, right_px: u32) -> GridAreas {
    let [header_row, body_row, status] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(STATUS_BAR_HEIGHT),
    ])
    .areas(area);

    let left = px_to_cells(left_px).min(area.width);
    let right = px_to_cells(right_px).min(area.width - left);

    GridAreas {
        headers: split_columns(header_row, left, right),
        bodies: split_columns(body_row, left, right),
        status,
    }
}
