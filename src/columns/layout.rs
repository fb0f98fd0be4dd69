//! Ordered column state and its pane partition.
//!
//! The authoritative order always reads `[left.., normal.., right..]` with
//! grouped columns adjacent. Every mutation re-establishes that shape before
//! subscribers hear about it.

use super::autosize::{measure_column, TextMeasurer};
use crate::model::column::{Column, ColumnConfig, FixedSide, WidthBounds};
use crate::model::row::{display_text, value_at_path};
use crate::notify::{SubscriptionId, Subscribers};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// One of the three rendered column panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaneKind {
    /// Left-pinned columns.
    Left,
    /// Scrolling columns.
    Main,
    /// Right-pinned columns.
    Right,
}

impl PaneKind {
    /// Panes in render order.
    pub const ALL: [PaneKind; 3] = [PaneKind::Left, PaneKind::Main, PaneKind::Right];

    /// Pinned side rendered by this pane.
    pub fn side(self) -> FixedSide {
        match self {
            PaneKind::Left => FixedSide::Left,
            PaneKind::Main => FixedSide::None,
            PaneKind::Right => FixedSide::Right,
        }
    }

    /// Pane that renders columns pinned to `side`.
    pub fn for_side(side: FixedSide) -> Self {
        match side {
            FixedSide::Left => PaneKind::Left,
            FixedSide::None => PaneKind::Main,
            FixedSide::Right => PaneKind::Right,
        }
    }
}

/// Visible columns split by pane, each list in column order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnPartition<'a> {
    /// Left-pinned.
    pub left: Vec<&'a Column>,
    /// Unpinned.
    pub normal: Vec<&'a Column>,
    /// Right-pinned.
    pub right: Vec<&'a Column>,
}

impl<'a> ColumnPartition<'a> {
    /// Columns of one pane.
    pub fn pane(&self, pane: PaneKind) -> &[&'a Column] {
        match pane {
            PaneKind::Left => &self.left,
            PaneKind::Main => &self.normal,
            PaneKind::Right => &self.right,
        }
    }
}

/// How [`ColumnLayoutEngine::adjust_widths`] fits columns to a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthStrategy {
    /// Scale current widths proportionally.
    #[default]
    Content,
    /// Give every visible column the same width.
    Equal,
}

/// Persistable per-column state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSnapshot {
    /// Column key.
    pub field: String,
    /// Width in pixels.
    pub width: u32,
    /// Shown or hidden.
    pub visible: bool,
    /// Pinned side.
    #[serde(default)]
    pub fixed_side: FixedSide,
    /// Position in the full order.
    pub order_index: usize,
}

/// Change notification from [`ColumnLayoutEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnsChanged {
    /// Columns moved to another side.
    Pinned {
        /// Every field whose side changed, group members included.
        fields: Vec<String>,
        /// New side.
        side: FixedSide,
    },
    /// Column order changed.
    Reordered,
    /// A width changed.
    Resized {
        /// Column key.
        field: String,
        /// Stored width after clamping.
        width: u32,
    },
    /// Several widths changed at once.
    WidthsAdjusted,
    /// A column was shown or hidden.
    VisibilityChanged {
        /// Column key.
        field: String,
        /// New visibility.
        visible: bool,
    },
    /// Saved state was applied.
    Restored,
    /// Columns returned to their initial configuration.
    Reset,
}

/// Owner of the ordered column list.
#[derive(Debug)]
pub struct ColumnLayoutEngine {
    columns: Vec<Column>,
    initial: Vec<ColumnConfig>,
    bounds: WidthBounds,
    subscribers: Subscribers<ColumnsChanged>,
}

impl ColumnLayoutEngine {
    /// Build from caller configuration.
    ///
    /// Duplicate fields keep their first occurrence. Widths are clamped and
    /// the initial order is normalized.
    pub fn new(configs: Vec<ColumnConfig>, bounds: WidthBounds) -> Self {
        let mut engine = Self {
            columns: Vec::new(),
            initial: configs,
            bounds,
            subscribers: Subscribers::new(),
        };
        engine.rebuild();
        engine
    }

    fn rebuild(&mut self) {
        let mut seen = HashSet::new();
        self.columns = self
            .initial
            .iter()
            .filter(|config| {
                let fresh = seen.insert(config.field.clone());
                if !fresh {
                    warn!(field = %config.field, "Duplicate column field ignored");
                }
                fresh
            })
            .cloned()
            .enumerate()
            .map(|(i, config)| Column::from_config(config, i, self.bounds))
            .collect();
        self.normalize();
    }

    /// Every column in order, hidden ones included.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column.
    pub fn column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Global position of a column.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.field == field)
    }

    /// Fields in order.
    pub fn field_order(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.field.clone()).collect()
    }

    /// Grid-wide width bounds.
    pub fn bounds(&self) -> WidthBounds {
        self.bounds
    }

    /// Visible columns split into panes.
    pub fn partition(&self) -> ColumnPartition<'_> {
        let mut partition = ColumnPartition::default();
        for column in self.columns.iter().filter(|c| c.visible) {
            match column.fixed_side {
                FixedSide::Left => partition.left.push(column),
                FixedSide::None => partition.normal.push(column),
                FixedSide::Right => partition.right.push(column),
            }
        }
        partition
    }

    /// Visible columns of one pane.
    pub fn pane_columns(&self, pane: PaneKind) -> Vec<&Column> {
        let side = pane.side();
        self.columns
            .iter()
            .filter(|c| c.visible && c.fixed_side == side)
            .collect()
    }

    /// Number of columns ordered before `pane`.
    pub fn column_offset(&self, pane: PaneKind) -> usize {
        let count = |side: FixedSide| self.columns.iter().filter(|c| c.fixed_side == side).count();
        match pane {
            PaneKind::Left => 0,
            PaneKind::Main => count(FixedSide::Left),
            PaneKind::Right => self.columns.len() - count(FixedSide::Right),
        }
    }

    /// Global position of the `local`-th visible column of `pane`.
    pub fn global_index(&self, pane: PaneKind, local: usize) -> Option<usize> {
        let side = pane.side();
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.visible && c.fixed_side == side)
            .nth(local)
            .map(|(i, _)| i)
    }

    /// Sum of visible column widths.
    pub fn total_width(&self) -> u32 {
        self.columns
            .iter()
            .filter(|c| c.visible)
            .map(|c| c.width)
            .sum()
    }

    /// Sum of visible widths in one pane.
    pub fn pane_width(&self, pane: PaneKind) -> u32 {
        self.pane_columns(pane).iter().map(|c| c.width).sum()
    }

    /// Pin `field` (and the rest of its group) to `side`.
    pub fn pin(&mut self, field: &str, side: FixedSide) {
        let Some(column) = self.column(field) else {
            debug!(field, "pin ignored: unknown column");
            return;
        };
        let group = column.group_id.clone();
        let mut moved = Vec::new();
        for column in &mut self.columns {
            let member = match &group {
                Some(g) => column.group_id.as_ref() == Some(g),
                None => column.field == field,
            };
            if member && column.fixed_side != side {
                column.fixed_side = side;
                moved.push(column.field.clone());
            }
        }
        if moved.is_empty() {
            return;
        }
        self.normalize();
        debug!(?moved, ?side, "Columns pinned");
        self.subscribers
            .emit(&ColumnsChanged::Pinned { fields: moved, side });
    }

    /// Return `field` to the scrolling pane.
    pub fn unpin(&mut self, field: &str) {
        self.pin(field, FixedSide::None);
    }

    /// Apply a full or partial field order.
    ///
    /// Named columns are placed, in the given order, into the slots the
    /// named columns currently occupy; the rest stay where they are. Unknown
    /// and repeated names are skipped. Returns whether the order changed.
    pub fn reorder<S: AsRef<str>>(&mut self, order: &[S]) -> bool {
        let mut seen = HashSet::new();
        let named: Vec<usize> = order
            .iter()
            .filter_map(|f| self.position(f.as_ref()))
            .filter(|i| seen.insert(*i))
            .collect();
        if named.is_empty() {
            return false;
        }

        let before = self.field_order();
        let mut slots_sorted = named.clone();
        slots_sorted.sort_unstable();

        let mut slots: Vec<Option<Column>> =
            std::mem::take(&mut self.columns).into_iter().map(Some).collect();
        let moving: Vec<Column> = named.iter().filter_map(|&i| slots[i].take()).collect();
        for (slot, column) in slots_sorted.into_iter().zip(moving) {
            slots[slot] = Some(column);
        }
        self.columns = slots.into_iter().flatten().collect();
        self.normalize();

        let changed = self.columns.iter().map(|c| &c.field).ne(before.iter());
        if changed {
            debug!(order = ?self.field_order(), "Columns reordered");
            self.subscribers.emit(&ColumnsChanged::Reordered);
        }
        changed
    }

    /// Set a width, clamped to the column's bounds.
    pub fn resize(&mut self, field: &str, width: u32) {
        let Some(column) = self.columns.iter_mut().find(|c| c.field == field) else {
            debug!(field, "resize ignored: unknown column");
            return;
        };
        let width = column.clamp_width(width);
        if column.width == width {
            return;
        }
        column.width = width;
        self.subscribers.emit(&ColumnsChanged::Resized {
            field: field.to_string(),
            width,
        });
    }

    /// Show or hide a column.
    pub fn set_visible(&mut self, field: &str, visible: bool) {
        let Some(column) = self.columns.iter_mut().find(|c| c.field == field) else {
            return;
        };
        if column.visible == visible {
            return;
        }
        column.visible = visible;
        self.subscribers.emit(&ColumnsChanged::VisibilityChanged {
            field: field.to_string(),
            visible,
        });
    }

    /// Flip a column's visibility.
    pub fn toggle_visibility(&mut self, field: &str) {
        if let Some(visible) = self.column(field).map(|c| c.visible) {
            self.set_visible(field, !visible);
        }
    }

    /// Size `field` from its header and the first sampled rows.
    ///
    /// Returns the stored width, or `None` for an unknown field.
    pub fn autosize(
        &mut self,
        field: &str,
        rows: &[Value],
        measurer: &dyn TextMeasurer,
        font: &str,
    ) -> Option<u32> {
        let column = self.column(field)?;
        let values = rows
            .iter()
            .map(|row| display_text(value_at_path(row, field)));
        let metrics = measure_column(
            measurer,
            font,
            &column.title,
            values,
            column.min_width,
            column.max_width,
        );
        self.resize(field, metrics.recommended_width);
        self.column(field).map(|c| c.width)
    }

    /// Autosize every visible column.
    pub fn autosize_all(&mut self, rows: &[Value], measurer: &dyn TextMeasurer, font: &str) {
        let fields: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.visible)
            .map(|c| c.field.clone())
            .collect();
        for field in fields {
            self.autosize(&field, rows, measurer, font);
        }
    }

    /// Split `container_width` equally across visible columns.
    pub fn distribute_evenly(&mut self, container_width: u32) {
        let visible = self.columns.iter().filter(|c| c.visible).count() as u32;
        if visible == 0 {
            return;
        }
        let share = container_width / visible;
        for column in self.columns.iter_mut().filter(|c| c.visible) {
            column.width = column.clamp_width(share);
        }
        self.subscribers.emit(&ColumnsChanged::WidthsAdjusted);
    }

    /// Fit visible columns to `container_width`.
    pub fn adjust_widths(&mut self, container_width: u32, strategy: WidthStrategy) {
        match strategy {
            WidthStrategy::Equal => self.distribute_evenly(container_width),
            WidthStrategy::Content => {
                let total = self.total_width();
                if total == 0 {
                    return;
                }
                let ratio = f64::from(container_width) / f64::from(total);
                for column in self.columns.iter_mut().filter(|c| c.visible) {
                    let scaled = (f64::from(column.width) * ratio).round() as u32;
                    column.width = column.clamp_width(scaled);
                }
                self.subscribers.emit(&ColumnsChanged::WidthsAdjusted);
            }
        }
    }

    /// Current state of every column for persistence.
    pub fn snapshot(&self) -> Vec<ColumnSnapshot> {
        self.columns
            .iter()
            .map(|c| ColumnSnapshot {
                field: c.field.clone(),
                width: c.width,
                visible: c.visible,
                fixed_side: c.fixed_side,
                order_index: c.order_index,
            })
            .collect()
    }

    /// Apply saved state. Unknown fields are skipped and columns missing
    /// from `saved` keep their current state.
    pub fn restore(&mut self, saved: &[ColumnSnapshot]) {
        for snapshot in saved {
            if let Some(column) = self.columns.iter_mut().find(|c| c.field == snapshot.field) {
                column.width = column.clamp_width(snapshot.width);
                column.visible = snapshot.visible;
                column.fixed_side = snapshot.fixed_side;
            }
        }
        let mut ordered: Vec<&ColumnSnapshot> = saved.iter().collect();
        ordered.sort_by_key(|s| s.order_index);
        let order: Vec<&str> = ordered.iter().map(|s| s.field.as_str()).collect();

        let subscribers = std::mem::take(&mut self.subscribers);
        self.reorder(&order);
        self.normalize();
        self.subscribers = subscribers;
        self.subscribers.emit(&ColumnsChanged::Restored);
    }

    /// Rebuild columns from the initial configuration.
    pub fn reset(&mut self) {
        self.rebuild();
        self.subscribers.emit(&ColumnsChanged::Reset);
    }

    /// Register a change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&ColumnsChanged) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    /// Remove a change listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Drop every listener.
    pub fn teardown(&mut self) {
        self.subscribers.clear();
    }

    /// Stable partition into `[left, normal, right]`, cluster each group at
    /// its first member, then renumber.
    fn normalize(&mut self) {
        align_group_sides(&mut self.columns);
        let mut remaining = std::mem::take(&mut self.columns);
        let mut ordered = Vec::with_capacity(remaining.len());
        for side in [FixedSide::Left, FixedSide::None, FixedSide::Right] {
            let (on_side, rest): (Vec<Column>, Vec<Column>) =
                remaining.into_iter().partition(|c| c.fixed_side == side);
            remaining = rest;
            ordered.extend(cluster_groups(on_side));
        }
        for (i, column) in ordered.iter_mut().enumerate() {
            column.order_index = i;
        }
        self.columns = ordered;
    }
}

/// Give every member of a group the side of its first member.
fn align_group_sides(columns: &mut [Column]) {
    let mut sides: Vec<(String, FixedSide)> = Vec::new();
    for column in columns.iter_mut() {
        let Some(group) = &column.group_id else {
            continue;
        };
        match sides.iter().find(|(g, _)| g == group) {
            Some((_, side)) => column.fixed_side = *side,
            None => sides.push((group.clone(), column.fixed_side)),
        }
    }
}

fn cluster_groups(columns: Vec<Column>) -> Vec<Column> {
    let mut slots: Vec<Option<Column>> = columns.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(slots.len());
    for i in 0..slots.len() {
        let Some(column) = slots[i].take() else {
            continue;
        };
        let group = column.group_id.clone();
        out.push(column);
        let Some(group) = group else {
            continue;
        };
        for slot in slots.iter_mut().skip(i + 1) {
            if slot.as_ref().is_some_and(|c| c.group_id.as_ref() == Some(&group)) {
                out.extend(slot.take());
            }
        }
    }
    out
}
