//! Domain model: columns, rows, query state and errors.

pub mod column;
pub mod error;
pub mod key_action;
pub mod query;
pub mod row;

pub use column::{
    Column, ColumnConfig, FixedSide, WidthBounds, DEFAULT_COLUMN_WIDTH, MAX_COLUMN_WIDTH,
    MIN_COLUMN_WIDTH,
};
pub use error::{AppError, InputError};
pub use key_action::KeyAction;
pub use query::{
    FilterItem, FilterOperator, SortDirection, SortItem, TableQuery, DEFAULT_PAGE_SIZE,
    PAGE_SIZE_OPTIONS,
};
pub use row::{display_text, row_key, value_at_path, RowState};
