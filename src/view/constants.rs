//! Layout dimension constants for TUI rendering.
//!
//! The grid core measures in pixels. The terminal shell maps one display
//! cell to [`CELL_PX`] horizontal pixels and one text line to one row.

use std::time::Duration;

/// Horizontal pixels per terminal cell.
pub const CELL_PX: u32 = 8;

/// Height of the header row in lines.
pub const HEADER_HEIGHT: u16 = 1;

/// Height of the status bar in lines.
///
/// Single line for paging, focus and the latest notice.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Event poll timeout; doubles as the animation frame interval.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Pixels added or removed by one widen/narrow key press.
pub const WIDTH_STEP: u32 = 2 * CELL_PX;

/// Rows scrolled per wheel notch.
pub const WHEEL_ROWS: usize = 3;

/// Cells scrolled horizontally per `h`/`l` press.
pub const HORIZONTAL_STEP_CELLS: u32 = 4;
