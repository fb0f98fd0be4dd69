//! Text for header cells, body rows and the status bar.
//!
//! Pure functions from grid state to ratatui [`Line`]s; nothing here touches
//! the terminal.

use super::layout::px_to_cells;
use super::styles::GridStyles;
use crate::drag::{CueSide, InsertionCue};
use crate::model::query::{SortDirection, TableQuery};
use crate::model::row::{display_text, row_key, value_at_path};
use crate::model::Column;
use crate::rows::{DisplayRow, Grouping, NestedRows, Selection};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate or pad `text` to exactly `width` display cells.
///
/// Truncated text ends in an ellipsis.
pub fn fit(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let text_width = UnicodeWidthStr::width(text);
    if text_width <= width {
        let mut out = text.to_string();
        out.extend(std::iter::repeat_n(' ', width - text_width));
        return out;
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    out
}

fn cell_width(column: &Column) -> usize {
    usize::from(px_to_cells(column.width))
}

/// Header line for one pane.
pub fn header_line(
    columns: &[&Column],
    query: &TableQuery,
    focused: Option<&str>,
    cue: Option<InsertionCue>,
    styles: &GridStyles,
) -> Line<'static> {
    let spans = columns.iter().enumerate().map(|(index, column)| {
        let marker = match query.sort_direction(&column.field) {
            Some(SortDirection::Asc) => " ▲",
            Some(SortDirection::Desc) => " ▼",
            None => "",
        };
        let label = format!("{}{marker}", column.title);
        let width = cell_width(column);
        let cue_side = cue.filter(|c| c.target_index == index).map(|c| c.side);

        let (text, style) = match cue_side {
            Some(CueSide::Before) => (format!("▏{}", fit(&label, width.saturating_sub(1))), styles.drop_cue),
            Some(CueSide::After) => (format!("{}▕", fit(&label, width.saturating_sub(1))), styles.drop_cue),
            None if focused == Some(column.field.as_str()) => (fit(&label, width), styles.focused_header),
            None => (fit(&label, width), styles.header),
        };
        Span::styled(text, style)
    });
    Line::from(spans.collect::<Vec<_>>())
}

/// Row data and view state needed to draw body lines.
#[derive(Debug, Clone, Copy)]
pub struct BodyContext<'a> {
    /// Current page of rows.
    pub rows: &'a [Value],
    /// Group state, when grouping.
    pub grouping: Option<&'a Grouping>,
    /// Nested detail state, when nesting.
    pub nested: Option<&'a NestedRows>,
    /// Selected rows.
    pub selection: &'a Selection,
    /// Styles.
    pub styles: &'a GridStyles,
}

impl BodyContext<'_> {
    /// Line for `display` in a pane showing `columns`.
    ///
    /// Group headers and detail text are drawn only in the `lead` pane, the
    /// leftmost pane with columns.
    pub fn line(&self, display: DisplayRow, columns: &[&Column], lead: bool, cursor: bool) -> Line<'static> {
        let line = match display {
            DisplayRow::Data { index, level } => self.data_line(index, level, columns, lead),
            DisplayRow::GroupHeader { group } => {
                let text = if lead { self.group_text(group) } else { String::new() };
                Line::from(text).style(self.styles.group_header)
            }
            DisplayRow::Detail { parent } => {
                let text = if lead { self.detail_text(parent) } else { String::new() };
                Line::from(text).style(self.styles.detail)
            }
        };
        if cursor {
            line.patch_style(self.styles.cursor_row)
        } else {
            line
        }
    }

    fn data_line(&self, index: usize, level: usize, columns: &[&Column], lead: bool) -> Line<'static> {
        let Some(row) = self.rows.get(index) else {
            return Line::default();
        };
        let indent = if lead { 2 * level } else { 0 };
        let spans: Vec<Span<'static>> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let text = display_text(value_at_path(row, &column.field));
                let width = cell_width(column);
                if i == 0 && indent > 0 {
                    Span::raw(format!(
                        "{}{}",
                        " ".repeat(indent.min(width)),
                        fit(&text, width.saturating_sub(indent))
                    ))
                } else {
                    Span::raw(fit(&text, width))
                }
            })
            .collect();

        let style = if self.selection.contains(&row_key(row, index)) {
            self.styles.selected_row
        } else {
            Style::default()
        };
        Line::from(spans).style(style)
    }

    fn group_text(&self, group: usize) -> String {
        let Some(group) = self.grouping.and_then(|g| g.groups().get(group)) else {
            return String::new();
        };
        let arrow = if group.expanded { '▾' } else { '▸' };
        let mut text = format!("{arrow} {} ({})", group.title, group.rows.len());
        for (name, value) in &group.aggregations {
            text.push_str(&format!("  {name}={value}"));
        }
        text
    }

    fn detail_text(&self, parent: usize) -> String {
        let (Some(row), Some(nested)) = (self.rows.get(parent), self.nested) else {
            return String::new();
        };
        let children = nested.children(row);
        let key = row_key(row, parent);
        match nested.component_for(&key) {
            Some(component) => format!("  ↳ {component} ({} nested)", children.len()),
            None => {
                let ids: Vec<String> = children
                    .iter()
                    .enumerate()
                    .map(|(i, child)| row_key(child, i))
                    .collect();
                format!("  ↳ {}", ids.join(", "))
            }
        }
    }
}

/// Status bar summary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSummary {
    /// First and last row on screen, 1-based within the page.
    pub shown: Option<(usize, usize)>,
    /// Rows matching the query.
    pub total: usize,
    /// 1-based page.
    pub page: usize,
    /// Page count.
    pub pages: usize,
    /// Focused column title.
    pub focus: Option<String>,
    /// Selected rows.
    pub selected: usize,
    /// Latest notice.
    pub notice: Option<String>,
}

/// Status bar line.
pub fn status_line(summary: &StatusSummary, error: bool, styles: &GridStyles) -> Line<'static> {
    let shown = match summary.shown {
        Some((first, last)) => format!("{first}-{last}"),
        None => "0".to_string(),
    };
    let mut text = format!(
        " {shown} of {} | page {}/{}",
        summary.total,
        summary.page,
        summary.pages.max(1)
    );
    if let Some(focus) = &summary.focus {
        text.push_str(&format!(" | {focus}"));
    }
    if summary.selected > 0 {
        text.push_str(&format!(" | {} selected", summary.selected));
    }
    if let Some(notice) = &summary.notice {
        text.push_str(&format!(" | {notice}"));
    }
    let style = if error { styles.error } else { styles.status };
    Line::from(text).style(style)
}
