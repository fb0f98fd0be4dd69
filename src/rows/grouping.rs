//! Group rows by a field value, with per-group aggregates.

use super::DisplayRow;
use crate::model::query::compare_cells;
use crate::model::row::{display_text, numeric_value, value_at_path};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Aggregate applied to a field within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFn {
    /// Sum of numeric values.
    Sum,
    /// Mean of numeric values, zero when there are none.
    Avg,
    /// Number of numeric values.
    Count,
    /// Smallest numeric value, zero when there are none.
    Min,
    /// Largest numeric value, zero when there are none.
    Max,
}

impl AggregateFn {
    fn name(self) -> &'static str {
        match self {
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Count => "count",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
        }
    }

    fn apply(self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            AggregateFn::Sum => values.iter().sum(),
            AggregateFn::Avg => values.iter().sum::<f64>() / values.len() as f64,
            AggregateFn::Count => values.len() as f64,
            AggregateFn::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggregateFn::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Fields and functions to aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Aggregation {
    /// Aggregated fields.
    pub fields: Vec<String>,
    /// Functions applied to every field.
    pub functions: Vec<AggregateFn>,
}

/// Grouping configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupConfig {
    /// Field (dotted path) to group by.
    pub field: String,
    /// Prefix for group titles.
    pub title: Option<String>,
    /// Sort groups by value instead of first appearance.
    pub sortable: bool,
    /// Expansion used until groups are expanded or collapsed explicitly.
    pub default_expanded: bool,
    /// Aggregates computed per group.
    pub aggregation: Option<Aggregation>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            field: String::new(),
            title: None,
            sortable: false,
            default_expanded: true,
            aggregation: None,
        }
    }
}

impl GroupConfig {
    /// Group by `field` with defaults.
    pub fn by(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Self::default()
        }
    }
}

/// One group of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup {
    /// Key used for expansion state.
    pub key: String,
    /// Grouped value of the first member.
    pub value: Value,
    /// Header label.
    pub title: String,
    /// Indices of member rows in the source slice.
    pub rows: Vec<usize>,
    /// Children shown.
    pub expanded: bool,
    /// `{field}_{func}` aggregates.
    pub aggregations: BTreeMap<String, f64>,
}

/// Grouping state: configuration, expansion and the last computed groups.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grouping {
    config: GroupConfig,
    explicit: Option<BTreeSet<String>>,
    groups: Vec<RowGroup>,
}

/// Expansion key for a grouped value.
pub fn group_key(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) if s.is_empty() => "null".to_string(),
        other => display_text(other),
    }
}

impl Grouping {
    /// Grouping with no rows yet.
    pub fn new(config: GroupConfig) -> Self {
        Self {
            config,
            explicit: None,
            groups: Vec::new(),
        }
    }

    /// Configuration.
    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    /// Groups from the last [`Grouping::set_rows`].
    pub fn groups(&self) -> &[RowGroup] {
        &self.groups
    }

    /// Recompute groups for `rows`, in first-seen order unless sortable.
    pub fn set_rows(&mut self, rows: &[Value]) {
        let mut order: Vec<String> = Vec::new();
        let mut members: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            let key = group_key(value_at_path(row, &self.config.field));
            members
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push(key);
                    Vec::new()
                })
                .push(i);
        }

        let mut groups: Vec<RowGroup> = order
            .into_iter()
            .map(|key| {
                let indices = members.remove(&key).unwrap_or_default();
                let value = indices
                    .first()
                    .and_then(|&i| rows.get(i))
                    .and_then(|row| value_at_path(row, &self.config.field))
                    .cloned()
                    .unwrap_or(Value::Null);
                let label = display_text(Some(&value));
                let title = match &self.config.title {
                    Some(prefix) => format!("{prefix}: {label}"),
                    None => label,
                };
                RowGroup {
                    expanded: self.is_expanded(&key),
                    aggregations: self.aggregate(rows, &indices),
                    key,
                    value,
                    title,
                    rows: indices,
                }
            })
            .collect();

        if self.config.sortable {
            groups.sort_by(|a, b| compare_cells(Some(&a.value), Some(&b.value)));
        }
        debug!(field = %self.config.field, groups = groups.len(), "Rows grouped");
        self.groups = groups;
    }

    fn aggregate(&self, rows: &[Value], indices: &[usize]) -> BTreeMap<String, f64> {
        let Some(aggregation) = &self.config.aggregation else {
            return BTreeMap::new();
        };
        let mut result = BTreeMap::new();
        for field in &aggregation.fields {
            let values: Vec<f64> = indices
                .iter()
                .filter_map(|&i| rows.get(i))
                .filter_map(|row| numeric_value(value_at_path(row, field)))
                .collect();
            for func in &aggregation.functions {
                result.insert(format!("{field}_{}", func.name()), func.apply(&values));
            }
        }
        result
    }

    /// Whether a group shows its rows.
    pub fn is_expanded(&self, key: &str) -> bool {
        match &self.explicit {
            Some(set) => set.contains(key),
            None => self.config.default_expanded,
        }
    }

    /// Explicitly expanded keys, `None` while the default applies.
    pub fn expanded_keys(&self) -> Option<Vec<String>> {
        self.explicit.as_ref().map(|set| set.iter().cloned().collect())
    }

    /// Adopt expansion persisted in a query.
    pub fn restore_expanded(&mut self, keys: Option<&[String]>) {
        self.explicit = keys.map(|keys| keys.iter().cloned().collect());
        self.refresh_flags();
    }

    /// Flip one group.
    pub fn toggle(&mut self, key: &str) {
        let current = self.is_expanded(key);
        let mut set = self.explicit.take().unwrap_or_else(|| {
            if self.config.default_expanded {
                self.groups.iter().map(|g| g.key.clone()).collect()
            } else {
                BTreeSet::new()
            }
        });
        if current {
            set.remove(key);
        } else {
            set.insert(key.to_string());
        }
        self.explicit = Some(set);
        self.refresh_flags();
    }

    /// Expand every known group.
    pub fn expand_all(&mut self) {
        self.explicit = Some(self.groups.iter().map(|g| g.key.clone()).collect());
        self.refresh_flags();
    }

    /// Collapse every group.
    pub fn collapse_all(&mut self) {
        self.explicit = Some(BTreeSet::new());
        self.refresh_flags();
    }

    fn refresh_flags(&mut self) {
        let flags: Vec<bool> = self.groups.iter().map(|g| self.is_expanded(&g.key)).collect();
        for (group, expanded) in self.groups.iter_mut().zip(flags) {
            group.expanded = expanded;
        }
    }

    /// Display rows: a header per group followed by its rows when expanded.
    pub fn flatten(&self) -> Vec<DisplayRow> {
        let mut out = Vec::new();
        for (g, group) in self.groups.iter().enumerate() {
            out.push(DisplayRow::GroupHeader { group: g });
            if group.expanded {
                out.extend(
                    group
                        .rows
                        .iter()
                        .map(|&index| DisplayRow::Data { index, level: 1 }),
                );
            }
        }
        out
    }
}
