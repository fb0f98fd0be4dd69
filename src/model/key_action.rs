//! Domain-level keyboard actions independent of key bindings.

/// Grid actions that can be mapped to configurable key bindings.
///
/// These represent user intent, not specific keys. The mapping from
/// `crossterm::event::KeyEvent` to `KeyAction` is handled by `KeyBindings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Scrolling
    /// Scroll the body up one row. Default: k/↑
    ScrollUp,
    /// Scroll the body down one row. Default: j/↓
    ScrollDown,
    /// Scroll the main pane left. Default: h/←
    ScrollLeft,
    /// Scroll the main pane right. Default: l/→
    ScrollRight,
    /// Scroll up one viewport. Default: Ctrl+u/Page Up
    PageUp,
    /// Scroll down one viewport. Default: Ctrl+d/Page Down
    PageDown,
    /// Jump to the first row. Default: g/Home
    ScrollToTop,
    /// Jump to the last row. Default: G/End
    ScrollToBottom,

    // Column focus
    /// Focus the next visible column. Default: Tab
    NextColumn,
    /// Focus the previous visible column. Default: Shift+Tab
    PrevColumn,

    // Column layout
    /// Pin the focused column to the left pane. Default: [
    PinLeft,
    /// Pin the focused column to the right pane. Default: ]
    PinRight,
    /// Return the focused column to the main pane. Default: u
    Unpin,
    /// Widen the focused column. Default: +
    Widen,
    /// Narrow the focused column. Default: -
    Narrow,
    /// Size the focused column from its content. Default: =
    Autosize,
    /// Fit all columns to the terminal width. Default: F
    FitColumns,
    /// Move the focused column one slot left. Default: <
    MoveColumnLeft,
    /// Move the focused column one slot right. Default: >
    MoveColumnRight,
    /// Hide the focused column. Default: x
    HideColumn,
    /// Show every hidden column. Default: X
    ShowAllColumns,

    // Query
    /// Cycle sorting on the focused column. Default: s
    ToggleSort,
    /// Next page of rows. Default: n
    NextPage,
    /// Previous page of rows. Default: p
    PrevPage,

    // Rows
    /// Select or deselect the cursor row. Default: Space
    ToggleSelect,
    /// Select every row on the page. Default: a
    SelectAll,
    /// Clear the selection. Default: Esc
    ClearSelection,
    /// Expand or collapse the cursor's group or detail. Default: Enter
    ToggleExpand,
    /// Expand every group. Default: e
    ExpandAll,
    /// Collapse every group. Default: c
    CollapseAll,

    // Application
    /// Save settings now. Default: Ctrl+s
    SaveSettings,
    /// Forget saved settings and restore the initial layout. Default: R
    ResetSettings,
    /// Reload the current page. Default: r
    Refresh,
    /// Exit the application. Default: q/Ctrl+c
    Quit,
}
