//! Paged row loading.
//!
//! The grid talks to a [`DataSource`] with a serialized [`DataRequest`]. The
//! raw response passes through an optional [`ResponseNormalizer`] before it
//! becomes a [`DataPage`]. A failed read never replaces rows already loaded.

use crate::model::query::{FilterItem, SortItem, TableQuery};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod file;
pub mod row_model;
pub mod static_source;

pub use file::{infer_columns, load_rows};
pub use row_model::RowModel;
pub use static_source::StaticDataSource;

/// Failure reported by a data source or while reading its response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// The source could not produce a response.
    #[error("data source failed: {0}")]
    Failed(String),

    /// The response did not contain rows.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The request parameters could not be decoded.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Request parameters sent to a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRequest {
    /// Filters as a JSON array.
    pub pq_filter: String,
    /// Sort keys as a JSON array.
    pub pq_sort: String,
    /// 1-based page.
    #[serde(rename = "pq_curPage")]
    pub cur_page: usize,
    /// Rows per page.
    #[serde(rename = "pq_rPP")]
    pub rows_per_page: usize,
}

impl DataRequest {
    /// Serialize a query.
    pub fn from_query(query: &TableQuery) -> Self {
        Self {
            pq_filter: serde_json::to_string(&query.filters).unwrap_or_else(|_| "[]".into()),
            pq_sort: serde_json::to_string(&query.sort).unwrap_or_else(|_| "[]".into()),
            cur_page: query.current_page(),
            rows_per_page: query.limit,
        }
    }

    /// Decode back into a query.
    ///
    /// # Errors
    ///
    /// Returns `DataSourceError::InvalidRequest` if the filter or sort JSON
    /// does not parse.
    pub fn to_query(&self) -> Result<TableQuery, DataSourceError> {
        let filters: Vec<FilterItem> = serde_json::from_str(&self.pq_filter)
            .map_err(|e| DataSourceError::InvalidRequest(format!("pq_filter: {e}")))?;
        let sort: Vec<SortItem> = serde_json::from_str(&self.pq_sort)
            .map_err(|e| DataSourceError::InvalidRequest(format!("pq_sort: {e}")))?;
        let mut query = TableQuery::with_page_size(self.rows_per_page);
        query.filters = filters;
        query.sort = sort;
        query.go_to_page(self.cur_page);
        Ok(query)
    }
}

/// One page of rows plus the filtered total.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataPage {
    /// Rows of the page.
    pub rows: Vec<Value>,
    /// Rows matching the query across all pages.
    pub total: usize,
}

impl DataPage {
    /// Read the default response shape.
    ///
    /// Accepts `{"rows": [...], "total": n}` (total defaults to the row
    /// count) or a bare array.
    ///
    /// # Errors
    ///
    /// Returns `DataSourceError::Malformed` for anything else.
    pub fn from_response(response: Value) -> Result<Self, DataSourceError> {
        match response {
            Value::Array(rows) => Ok(Self {
                total: rows.len(),
                rows,
            }),
            Value::Object(mut map) => {
                let rows = match map.remove("rows") {
                    Some(Value::Array(rows)) => rows,
                    _ => return Err(DataSourceError::Malformed("missing `rows` array".into())),
                };
                let total = map
                    .get("total")
                    .and_then(Value::as_u64)
                    .map_or(rows.len(), |t| t as usize);
                Ok(Self { rows, total })
            }
            other => Err(DataSourceError::Malformed(format!(
                "expected object or array, got {other}"
            ))),
        }
    }
}

/// Converts a raw response into a page.
pub type ResponseNormalizer = Box<dyn Fn(Value) -> Result<DataPage, DataSourceError>>;

/// Paged row provider.
pub trait DataSource {
    /// Fetch one page.
    ///
    /// # Errors
    ///
    /// Returns a `DataSourceError` when the page cannot be produced.
    fn read(&mut self, request: &DataRequest) -> Result<Value, DataSourceError>;
}

impl<F> DataSource for F
where
    F: FnMut(&DataRequest) -> Result<Value, DataSourceError>,
{
    fn read(&mut self, request: &DataRequest) -> Result<Value, DataSourceError> {
        self(request)
    }
}
