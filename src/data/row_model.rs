//! Current page of rows and the loading lifecycle around it.

use super::{DataPage, DataRequest, DataSource, DataSourceError, ResponseNormalizer};
use crate::model::query::TableQuery;
use serde_json::Value;
use tracing::{debug, warn};

/// Rows currently shown by the grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowModel {
    rows: Vec<Value>,
    total: usize,
    loading: bool,
    last_error: Option<DataSourceError>,
}

impl RowModel {
    /// Model over rows already in hand.
    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            total: rows.len(),
            rows,
            ..Self::default()
        }
    }

    /// Current rows.
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    /// Rows matching the query across all pages.
    pub fn total(&self) -> usize {
        self.total
    }

    /// A load is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error from the most recent load, cleared by a successful one.
    pub fn last_error(&self) -> Option<&DataSourceError> {
        self.last_error.as_ref()
    }

    /// Replace rows directly.
    pub fn set_rows(&mut self, rows: Vec<Value>, total: usize) {
        self.rows = rows;
        self.total = total;
        self.last_error = None;
    }

    /// Fetch the page described by `query`.
    ///
    /// On failure the previous rows and total stay in place.
    ///
    /// # Errors
    ///
    /// Returns the source or normalizer error.
    pub fn load(
        &mut self,
        source: &mut dyn DataSource,
        normalizer: Option<&ResponseNormalizer>,
        query: &TableQuery,
    ) -> Result<(), DataSourceError> {
        let request = DataRequest::from_query(query);
        self.loading = true;
        let result = source.read(&request).and_then(|response| match normalizer {
            Some(normalize) => normalize(response),
            None => DataPage::from_response(response),
        });
        self.loading = false;

        match result {
            Ok(page) => {
                debug!(rows = page.rows.len(), total = page.total, page = request.cur_page, "Page loaded");
                self.set_rows(page.rows, page.total);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Data load failed, keeping previous rows");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StaticDataSource;
    use serde_json::json;

    #[test]
    fn failed_load_keeps_previous_rows() {
        let mut model = RowModel::with_rows(vec![json!({"id": 1})]);
        let mut failing = |_: &DataRequest| -> Result<Value, DataSourceError> {
            Err(DataSourceError::Failed("offline".into()))
        };

        let result = model.load(&mut failing, None, &TableQuery::default());
        assert_eq!(result, Err(DataSourceError::Failed("offline".into())));
        assert_eq!(model.rows().len(), 1);
        assert_eq!(model.total(), 1);
        assert!(!model.is_loading());
        assert!(model.last_error().is_some());
    }

    #[test]
    fn successful_load_replaces_rows() {
        let rows = (0..30).map(|i| json!({"id": i + 1})).collect();
        let mut source = StaticDataSource::new(rows);
        let mut model = RowModel::default();
        assert!(model.load(&mut source, None, &TableQuery::default()).is_ok());
        assert_eq!(model.rows().len(), 20);
        assert_eq!(model.total(), 30);
    }

    #[test]
    fn normalizer_reshapes_response() {
        let mut source = |_: &DataRequest| -> Result<Value, DataSourceError> {
            Ok(json!({"data": [{"id": 1}], "count": 99}))
        };
        let normalizer: ResponseNormalizer = Box::new(|response: Value| {
            Ok(DataPage {
                rows: response["data"].as_array().cloned().unwrap_or_default(),
                total: response["count"].as_u64().unwrap_or(0) as usize,
            })
        });
        let mut model = RowModel::default();
        assert!(model
            .load(&mut source, Some(&normalizer), &TableQuery::default())
            .is_ok());
        assert_eq!(model.total(), 99);

        let mut bad = |_: &DataRequest| -> Result<Value, DataSourceError> { Ok(json!({"data": []})) };
        assert!(model.load(&mut bad, None, &TableQuery::default()).is_err());
        assert_eq!(model.total(), 99);
    }
}
