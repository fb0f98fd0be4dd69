//! Row-level view state: selection, grouping and nested detail rows.
//!
//! None of these touch row payloads. They produce [`DisplayRow`] lists that
//! index into the caller's rows.

pub mod grouping;
pub mod nested;
pub mod selection;

pub use grouping::{group_key, AggregateFn, Aggregation, GroupConfig, Grouping, RowGroup};
pub use nested::{NestedConfig, NestedMode, NestedRows, NestedToggle};
pub use selection::{Selection, SelectionMode};

/// One rendered line of the grid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayRow {
    /// A data row.
    Data {
        /// Index into the current rows.
        index: usize,
        /// Indent level; 1 under a group header.
        level: usize,
    },
    /// A group header.
    GroupHeader {
        /// Index into [`Grouping::groups`].
        group: usize,
    },
    /// Detail content for an expanded row.
    Detail {
        /// Index of the parent row.
        parent: usize,
    },
}
