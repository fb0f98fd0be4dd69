//! Scheduling and pane synchronization primitives.

pub mod debounce;
pub mod frame;
pub mod scroll_sync;

pub use debounce::Debouncer;
pub use frame::{FrameGate, FrameRequest};
pub use scroll_sync::{Axis, PaneGeometry, PaneId, ScrollPane, ScrollSynchronizer, Teardown, WheelOutcome};
