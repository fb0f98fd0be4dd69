//! Row index ↔ vertical pixel offset mapping.

use super::height_index::HeightIndex;
use std::fmt;
use tracing::debug;

/// Row height assumed when estimating overscan in dynamic-height mode.
pub const DYNAMIC_ROW_ESTIMATE: usize = 50;

/// How row heights are determined.
pub enum RowHeights {
    /// Every row has the same height in pixels.
    Uniform(usize),
    /// Heights come from a caller function, measured lazily and cached.
    Dynamic(Box<dyn Fn(usize) -> usize>),
}

impl RowHeights {
    /// Dynamic heights from a closure.
    pub fn dynamic(measure: impl Fn(usize) -> usize + 'static) -> Self {
        Self::Dynamic(Box::new(measure))
    }
}

impl fmt::Debug for RowHeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform(h) => f.debug_tuple("Uniform").field(h).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Measured heights keyed by row index.
///
/// Monotone: entries are only added or overwritten, and the whole cache is
/// dropped when the row count changes. It is never the source of truth, so
/// clearing it is always safe.
#[derive(Debug, Clone, Default)]
pub struct HeightCache {
    sums: HeightIndex,
    known: Vec<bool>,
    /// Length of the contiguous measured prefix `0..filled`.
    filled: usize,
    entries: usize,
}

impl HeightCache {
    fn with_len(len: usize) -> Self {
        Self {
            sums: HeightIndex::with_len(len),
            known: vec![false; len],
            filled: 0,
            entries: 0,
        }
    }

    /// Cached height for `index`.
    pub fn get(&self, index: usize) -> Option<usize> {
        match self.known.get(index) {
            Some(true) => self.sums.get(index),
            _ => None,
        }
    }

    fn insert(&mut self, index: usize, height: usize) {
        let Some(known) = self.known.get_mut(index) else {
            return;
        };
        if !*known {
            *known = true;
            self.entries += 1;
        }
        self.sums.set(index, height);
        while self.known.get(self.filled).copied().unwrap_or(false) {
            self.filled += 1;
        }
    }

    fn reset(&mut self, len: usize) {
        self.sums.reset(len);
        self.known.clear();
        self.known.resize(len, false);
        self.filled = 0;
        self.entries = 0;
    }

    /// Number of measured rows.
    pub fn len(&self) -> usize {
        self.entries
    }

    /// True when nothing has been measured.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}

/// Maps row indices to pixel offsets and back, for uniform or dynamic
/// row heights.
///
/// Queries take `&mut self` because dynamic mode measures and caches rows on
/// demand; the observable results depend only on row count and heights.
#[derive(Debug)]
pub struct OffsetIndex {
    heights: RowHeights,
    row_count: usize,
    cache: HeightCache,
}

impl OffsetIndex {
    /// Create an index over `row_count` rows.
    pub fn new(heights: RowHeights, row_count: usize) -> Self {
        let cache = match heights {
            RowHeights::Uniform(_) => HeightCache::default(),
            RowHeights::Dynamic(_) => HeightCache::with_len(row_count),
        };
        Self {
            heights,
            row_count,
            cache,
        }
    }

    /// Uniform-height index.
    pub fn uniform(row_height: usize, row_count: usize) -> Self {
        Self::new(RowHeights::Uniform(row_height), row_count)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Change the row count. Any change drops the whole height cache.
    pub fn set_row_count(&mut self, row_count: usize) {
        if row_count == self.row_count {
            return;
        }
        debug!(
            old = self.row_count,
            new = row_count,
            cached = self.cache.len(),
            "Row count changed, invalidating height cache"
        );
        self.row_count = row_count;
        self.clear_cache();
    }

    /// Drop every measured height.
    pub fn clear_cache(&mut self) {
        if matches!(self.heights, RowHeights::Dynamic(_)) {
            self.cache.reset(self.row_count);
        }
    }

    /// Height cache (empty in uniform mode).
    pub fn cache(&self) -> &HeightCache {
        &self.cache
    }

    /// True in uniform-height mode.
    pub fn is_uniform(&self) -> bool {
        matches!(self.heights, RowHeights::Uniform(_))
    }

    /// Row height used to size overscan: the uniform height, or
    /// [`DYNAMIC_ROW_ESTIMATE`] in dynamic mode.
    pub fn assumed_row_height(&self) -> usize {
        match self.heights {
            RowHeights::Uniform(h) => h,
            RowHeights::Dynamic(_) => DYNAMIC_ROW_ESTIMATE,
        }
    }

    /// Height of row `index` in pixels; 0 past the end.
    pub fn height_of(&mut self, index: usize) -> usize {
        if index >= self.row_count {
            return 0;
        }
        match &self.heights {
            RowHeights::Uniform(h) => *h,
            RowHeights::Dynamic(measure) => {
                if let Some(h) = self.cache.get(index) {
                    return h;
                }
                let h = measure(index);
                self.cache.insert(index, h);
                h
            }
        }
    }

    /// Record a measured height for a rendered row (dynamic mode only).
    pub fn update_height(&mut self, index: usize, height: usize) {
        match self.heights {
            RowHeights::Uniform(_) => {
                debug!(index, "Ignoring measured height in uniform mode");
            }
            RowHeights::Dynamic(_) => self.cache.insert(index, height),
        }
    }

    /// Sum of the heights of every row before `index`.
    pub fn offset_of(&mut self, index: usize) -> usize {
        let index = index.min(self.row_count);
        match self.heights {
            RowHeights::Uniform(h) => index * h,
            RowHeights::Dynamic(_) => {
                self.measure_prefix(index);
                self.cache.sums.offset_of(index)
            }
        }
    }

    /// Greatest row whose offset does not exceed `offset`, clamped to the
    /// last row. Empty index answers 0.
    pub fn index_at_offset(&mut self, offset: usize) -> usize {
        if self.row_count == 0 {
            return 0;
        }
        let last = self.row_count - 1;
        match self.heights {
            RowHeights::Uniform(0) => 0,
            RowHeights::Uniform(h) => (offset / h).min(last),
            RowHeights::Dynamic(_) => {
                self.measure_prefix(self.row_count);
                self.cache.sums.index_at_offset(offset)
            }
        }
    }

    /// Total content height.
    pub fn total_height(&mut self) -> usize {
        self.offset_of(self.row_count)
    }

    /// Ensure rows `0..end` are measured.
    fn measure_prefix(&mut self, end: usize) {
        let end = end.min(self.row_count);
        let mut i = self.cache.filled;
        while i < end {
            if self.cache.get(i).is_none() {
                self.height_of(i);
            }
            i += 1;
        }
    }
}
