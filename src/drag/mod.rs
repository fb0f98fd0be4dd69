//! Drag-to-reorder for column headers.

pub mod controller;
pub mod session;

pub use controller::{
    CancelReason, ColumnReorderEvent, CueSide, DragOutcome, DragPhase, DragReorderController,
    InsertionCue, DRAG_THRESHOLD,
};
pub use session::{DragSession, HeaderHit, HeaderStrip, HitRegion, RESIZE_HANDLE_WIDTH};
