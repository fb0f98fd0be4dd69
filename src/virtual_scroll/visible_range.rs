//! Visible range calculation

use super::offset_index::OffsetIndex;
use serde::{Deserialize, Serialize};

/// Rows rendered above and below the strict viewport by default.
pub const DEFAULT_BUFFER: usize = 3;

/// Extra viewport padding, in assumed row heights on each side, by default.
pub const DEFAULT_OVERSCAN: usize = 2;

/// Window of rows that must be rendered for the current scroll position.
///
/// # Invariants
/// - `start_index <= end_index`
/// - `end_index <= row_count`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibleRange {
    /// First rendered row (inclusive).
    pub start_index: usize,
    /// One past the last rendered row (exclusive).
    pub end_index: usize,
    /// Pixel offset of `start_index` from the top of the content.
    pub offset_y: usize,
}

impl VisibleRange {
    /// Create a range.
    ///
    /// # Panics
    /// In debug builds, panics if `start_index > end_index`.
    pub fn new(start_index: usize, end_index: usize, offset_y: usize) -> Self {
        debug_assert!(
            start_index <= end_index,
            "start_index {} > end_index {}",
            start_index,
            end_index
        );
        Self {
            start_index,
            end_index,
            offset_y,
        }
    }

    /// Number of rows in the window.
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    /// True when nothing needs rendering.
    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// Row indices in the window.
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start_index..self.end_index
    }

    /// Whether `index` falls inside the window.
    pub fn contains(&self, index: usize) -> bool {
        self.indices().contains(&index)
    }
}

/// One row of the rendered window with its placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleItem {
    /// Row index.
    pub index: usize,
    /// Top of the row in content pixels.
    pub offset_y: usize,
    /// Row height in pixels.
    pub height: usize,
}

/// Computes which rows to render, padded by `buffer` rows and `overscan`
/// assumed row heights so fast scrolling does not reveal unrendered rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRangeCalculator {
    buffer: usize,
    overscan: usize,
}

impl Default for VisibleRangeCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER, DEFAULT_OVERSCAN)
    }
}

impl VisibleRangeCalculator {
    /// Create a calculator with explicit margins.
    pub fn new(buffer: usize, overscan: usize) -> Self {
        Self { buffer, overscan }
    }

    /// Rows of buffer on each side.
    pub fn buffer(&self) -> usize {
        self.buffer
    }

    /// Overscan factor.
    pub fn overscan(&self) -> usize {
        self.overscan
    }

    /// Compute the window for `scroll_top` within a viewport of
    /// `viewport_height` pixels.
    ///
    /// Deterministic in (scroll position, row count, row heights).
    ///
    /// # Examples
    ///
    /// ```
    /// # use panegrid::virtual_scroll::{OffsetIndex, VisibleRangeCalculator};
    /// let mut rows = OffsetIndex::uniform(40, 1_000);
    /// let range = VisibleRangeCalculator::default().compute(&mut rows, 0, 400);
    /// assert_eq!(range.start_index, 0);
    /// assert!(range.end_index >= 10);
    /// ```
    pub fn compute(
        &self,
        rows: &mut OffsetIndex,
        scroll_top: usize,
        viewport_height: usize,
    ) -> VisibleRange {
        let row_count = rows.row_count();
        if row_count == 0 {
            return VisibleRange::default();
        }

        let start_index = rows.index_at_offset(scroll_top).saturating_sub(self.buffer);

        let target_height = self
            .overscan
            .saturating_mul(2)
            .saturating_mul(rows.assumed_row_height())
            .saturating_add(viewport_height);
        let mut end_index = start_index;
        let mut accumulated = 0;
        while end_index < row_count && accumulated < target_height {
            accumulated = accumulated.saturating_add(rows.height_of(end_index));
            end_index += 1;
        }
        let end_index = end_index.saturating_add(self.buffer).min(row_count);

        VisibleRange::new(start_index, end_index, rows.offset_of(start_index))
    }

    /// Placement of every row in `range`.
    pub fn items(&self, rows: &mut OffsetIndex, range: VisibleRange) -> Vec<VisibleItem> {
        let count = rows.row_count();
        range
            .indices()
            .take_while(|&i| i < count)
            .map(|index| VisibleItem {
                index,
                offset_y: rows.offset_of(index),
                height: rows.height_of(index),
            })
            .collect()
    }
}
