//! Sort, filter and paging state sent to the data source.

use super::row::{display_text, numeric_value, value_at_path};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Rows per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Page sizes offered to users.
pub const PAGE_SIZE_OPTIONS: [usize; 6] = [10, 20, 40, 50, 80, 100];

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// The other direction.
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortItem {
    /// Column field.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

/// Filter comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Equal.
    #[default]
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
}

/// One filter condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterItem {
    /// Column field.
    pub field: String,
    /// Comparison operand.
    pub value: Value,
    /// Comparison.
    #[serde(default)]
    pub operator: FilterOperator,
}

impl FilterItem {
    /// Whether `row` satisfies the condition.
    pub fn matches(&self, row: &Value) -> bool {
        let cell = value_at_path(row, &self.field);
        match self.operator {
            FilterOperator::Eq => compare(cell, &self.value) == Some(Ordering::Equal),
            FilterOperator::Ne => compare(cell, &self.value) != Some(Ordering::Equal),
            FilterOperator::Gt => compare(cell, &self.value) == Some(Ordering::Greater),
            FilterOperator::Gte => matches!(
                compare(cell, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::Lt => compare(cell, &self.value) == Some(Ordering::Less),
            FilterOperator::Lte => matches!(
                compare(cell, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::Contains => text_of(cell).contains(&text_of(Some(&self.value))),
            FilterOperator::StartsWith => text_of(cell).starts_with(&text_of(Some(&self.value))),
            FilterOperator::EndsWith => text_of(cell).ends_with(&text_of(Some(&self.value))),
        }
    }
}

fn text_of(value: Option<&Value>) -> String {
    display_text(value).to_lowercase()
}

/// Compare a cell with an operand: numerically when both are numeric,
/// otherwise by display text.
pub fn compare(cell: Option<&Value>, operand: &Value) -> Option<Ordering> {
    match (numeric_value(cell), numeric_value(Some(operand))) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => Some(display_text(cell).cmp(&display_text(Some(operand)))),
    }
}

/// Order two cells for sorting. Missing values sort first.
pub fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (numeric_value(a), numeric_value(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => display_text(a).cmp(&display_text(b)),
    }
}

/// Paging, sorting, filtering and group-expansion state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableQuery {
    /// Rows per page.
    pub limit: usize,
    /// Index of the first row of the page.
    pub offset: usize,
    /// Sort keys in priority order.
    #[serde(default)]
    pub sort: Vec<SortItem>,
    /// Conjunctive filters.
    #[serde(default)]
    pub filters: Vec<FilterItem>,
    /// Keys of explicitly expanded groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded_groups: Option<Vec<String>>,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl TableQuery {
    /// Empty query at page 1.
    pub fn with_page_size(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            offset: 0,
            sort: Vec::new(),
            filters: Vec::new(),
            expanded_groups: None,
        }
    }

    /// Set the direction for `field`, appending it if not sorted yet.
    pub fn sort(&mut self, field: &str, direction: SortDirection) {
        match self.sort.iter_mut().find(|s| s.field == field) {
            Some(existing) => existing.direction = direction,
            None => self.sort.push(SortItem {
                field: field.to_string(),
                direction,
            }),
        }
    }

    /// Remove every sort key.
    pub fn clear_sort(&mut self) {
        self.sort.clear();
    }

    /// Direction currently applied to `field`.
    pub fn sort_direction(&self, field: &str) -> Option<SortDirection> {
        self.sort
            .iter()
            .find(|s| s.field == field)
            .map(|s| s.direction)
    }

    /// Replace the filter on `field`, or add one.
    pub fn add_filter(&mut self, field: &str, value: Value, operator: FilterOperator) {
        let item = FilterItem {
            field: field.to_string(),
            value,
            operator,
        };
        match self.filters.iter_mut().find(|f| f.field == field) {
            Some(existing) => *existing = item,
            None => self.filters.push(item),
        }
    }

    /// Drop the filter on `field`.
    pub fn remove_filter(&mut self, field: &str) {
        self.filters.retain(|f| f.field != field);
    }

    /// Drop every filter.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Jump to a 1-based page. Page 0 is treated as page 1.
    pub fn go_to_page(&mut self, page: usize) {
        self.offset = page.saturating_sub(1) * self.limit;
    }

    /// Change rows per page and return to the first page.
    pub fn set_page_size(&mut self, size: usize) {
        self.limit = size.max(1);
        self.offset = 0;
    }

    /// 1-based current page.
    pub fn current_page(&self) -> usize {
        self.offset / self.limit.max(1) + 1
    }

    /// Page count for `total` rows.
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.limit.max(1))
    }

    /// Filter, sort and page `rows` locally.
    ///
    /// Returns the page of rows and the filtered total.
    pub fn apply(&self, rows: &[Value]) -> (Vec<Value>, usize) {
        let mut matching: Vec<&Value> = rows
            .iter()
            .filter(|row| self.filters.iter().all(|f| f.matches(row)))
            .collect();

        if !self.sort.is_empty() {
            matching.sort_by(|a, b| {
                self.sort
                    .iter()
                    .map(|key| {
                        let ord = compare_cells(
                            value_at_path(a, &key.field),
                            value_at_path(b, &key.field),
                        );
                        match key.direction {
                            SortDirection::Asc => ord,
                            SortDirection::Desc => ord.reverse(),
                        }
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let total = matching.len();
        let page = matching
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .cloned()
            .collect();
        (page, total)
    }
}
