//! Column layout: ordering, pinning, sizing and header hierarchy.

pub mod autosize;
pub mod header_tree;
pub mod layout;

pub use autosize::{
    measure_column, CellWidthMeasurer, ColumnMetrics, NoMeasurer, TextMeasurer,
    AUTOSIZE_SAMPLE_ROWS, DEFAULT_FONT,
};
pub use header_tree::{HeaderCell, HeaderNode, HeaderNodeId, HeaderSpec, HeaderTree};
pub use layout::{
    ColumnLayoutEngine, ColumnPartition, ColumnSnapshot, ColumnsChanged, PaneKind, WidthStrategy,
};
