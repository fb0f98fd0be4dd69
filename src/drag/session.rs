//! Header hit-testing behind a small trait, so gestures can be driven by a
//! terminal, a browser bridge or a test without a real pointer.

use crate::columns::{ColumnLayoutEngine, PaneKind};

/// Width of the resize grip at the right edge of each header cell, in the
/// same units as the header geometry.
pub const RESIZE_HANDLE_WIDTH: f64 = 4.0;

/// Part of a header cell under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRegion {
    /// Label area; drags start here.
    Label,
    /// Resize grip; never starts a drag.
    ResizeHandle,
}

/// Header cell under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderHit {
    /// Pane the cell belongs to.
    pub pane: PaneKind,
    /// Index among the pane's visible columns.
    pub index: usize,
    /// Sub-element hit.
    pub region: HitRegion,
    /// Left edge of the cell.
    pub left: f64,
    /// Cell width.
    pub width: f64,
}

/// Resolves pointer coordinates to header cells.
pub trait DragSession {
    /// Header cell at `(x, y)`, if any.
    fn hit_test(&self, x: f64, y: f64) -> Option<HeaderHit>;
}

/// Header cell geometry laid out from a [`ColumnLayoutEngine`].
///
/// Each pane starts at its own horizontal origin; the main pane origin
/// should already account for its horizontal scroll.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeaderStrip {
    cells: Vec<HeaderHit>,
    top: f64,
    height: f64,
}

impl HeaderStrip {
    /// Lay out header cells for the given pane origins.
    ///
    /// # Arguments
    /// * `engine` - column layout to read widths from
    /// * `origins` - left edge of each pane to include
    /// * `top` / `height` - vertical extent of the header row
    pub fn from_layout(
        engine: &ColumnLayoutEngine,
        origins: &[(PaneKind, f64)],
        top: f64,
        height: f64,
    ) -> Self {
        let mut cells = Vec::new();
        for &(pane, origin) in origins {
            let mut left = origin;
            for (index, column) in engine.pane_columns(pane).into_iter().enumerate() {
                let width = f64::from(column.width);
                cells.push(HeaderHit {
                    pane,
                    index,
                    region: HitRegion::Label,
                    left,
                    width,
                });
                left += width;
            }
        }
        Self { cells, top, height }
    }

    /// Every laid-out cell.
    pub fn cells(&self) -> &[HeaderHit] {
        &self.cells
    }
}

impl DragSession for HeaderStrip {
    fn hit_test(&self, x: f64, y: f64) -> Option<HeaderHit> {
        if y < self.top || y >= self.top + self.height {
            return None;
        }
        let cell = self
            .cells
            .iter()
            .find(|c| x >= c.left && x < c.left + c.width)?;
        let region = if x >= cell.left + cell.width - RESIZE_HANDLE_WIDTH {
            HitRegion::ResizeHandle
        } else {
            HitRegion::Label
        };
        Some(HeaderHit { region, ..*cell })
    }
}
