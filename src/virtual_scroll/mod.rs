//! Virtual scrolling: row offsets, the rendered window, and the logical
//! scroll position.

pub mod height_index;
pub mod offset_index;
pub mod scroll_state;
pub mod visible_range;

pub use offset_index::{HeightCache, OffsetIndex, RowHeights, DYNAMIC_ROW_ESTIMATE};
pub use scroll_state::{ScrollChanged, ScrollState, ScrollTarget, SCROLL_SETTLE_DELAY};
pub use visible_range::{
    VisibleItem, VisibleRange, VisibleRangeCalculator, DEFAULT_BUFFER, DEFAULT_OVERSCAN,
};
