//! In-memory data source that filters, sorts and pages locally.

use super::{DataRequest, DataSource, DataSourceError};
use serde_json::{json, Value};

/// Serves pages from rows held in memory.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StaticDataSource {
    rows: Vec<Value>,
}

impl StaticDataSource {
    /// Source over `rows`.
    pub fn new(rows: Vec<Value>) -> Self {
        Self { rows }
    }

    /// All rows, unfiltered.
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }
}

impl DataSource for StaticDataSource {
    fn read(&mut self, request: &DataRequest) -> Result<Value, DataSourceError> {
        let query = request.to_query()?;
        let (rows, total) = query.apply(&self.rows);
        Ok(json!({ "rows": rows, "total": total }))
    }
}
