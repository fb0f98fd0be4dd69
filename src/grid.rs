//! The grid facade.
//!
//! [`DataGrid`] is the single owner of scroll state, column layout, query
//! and rows for one table. Hosts drive it with input and clock ticks and read
//! plain data back out to render.

use crate::columns::{
    ColumnLayoutEngine, ColumnPartition, ColumnsChanged, PaneKind, TextMeasurer, WidthStrategy,
    DEFAULT_FONT,
};
use crate::data::{DataSource, DataSourceError, ResponseNormalizer, RowModel};
use crate::drag::{ColumnReorderEvent, DragOutcome, DragReorderController, DragSession, InsertionCue};
use crate::model::column::{ColumnConfig, FixedSide, WidthBounds};
use crate::model::query::{FilterOperator, SortDirection, TableQuery, DEFAULT_PAGE_SIZE};
use crate::model::row::row_key;
use crate::notify::{SubscriptionId, Subscribers};
use crate::rows::{
    DisplayRow, GroupConfig, Grouping, NestedConfig, NestedRows, NestedToggle, Selection,
    SelectionMode,
};
use crate::settings::{MemorySettingsStore, SettingsBackup, SettingsStore};
use crate::sync::FrameRequest;
use crate::virtual_scroll::{
    OffsetIndex, RowHeights, ScrollChanged, ScrollState, ScrollTarget, VisibleItem, VisibleRange,
    VisibleRangeCalculator, DEFAULT_BUFFER, DEFAULT_OVERSCAN, DYNAMIC_ROW_ESTIMATE,
};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, info};

/// Default body row height in pixels.
pub const DEFAULT_ROW_HEIGHT: usize = 40;

/// Grid construction options.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    /// Fixed row height, or the initial estimate when `dynamic_rows` is set.
    pub row_height: usize,
    /// Rows report measured heights through [`DataGrid::update_row_height`].
    pub dynamic_rows: bool,
    /// Extra rows rendered on each side of the viewport.
    pub buffer: usize,
    /// Extra viewport heights, in rows, rendered while scrolling.
    pub overscan: usize,
    /// Column width bounds.
    pub width_bounds: WidthBounds,
    /// Rows per page.
    pub page_size: usize,
    /// Name used in the settings storage key.
    pub grid_name: String,
    /// Persist settings.
    pub support_backup: bool,
    /// Row selection mode.
    pub selection_mode: SelectionMode,
    /// Group rows by a field.
    pub group: Option<GroupConfig>,
    /// Nested detail rows.
    pub nested: Option<NestedConfig>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            dynamic_rows: false,
            buffer: DEFAULT_BUFFER,
            overscan: DEFAULT_OVERSCAN,
            width_bounds: WidthBounds::default(),
            page_size: DEFAULT_PAGE_SIZE,
            grid_name: String::new(),
            support_backup: false,
            selection_mode: SelectionMode::default(),
            group: None,
            nested: None,
        }
    }
}

/// Notification from [`DataGrid`].
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// Logical scroll position or scrolling flag changed.
    Scrolled(ScrollChanged),
    /// Column state changed.
    ColumnsChanged(ColumnsChanged),
    /// A header drag reordered columns.
    ColumnsReordered(ColumnReorderEvent),
    /// A page of rows was loaded.
    DataLoaded {
        /// Rows in the page.
        rows: usize,
        /// Rows across all pages.
        total: usize,
    },
    /// Loading failed; the previous rows are still shown.
    DataError(DataSourceError),
    /// Sort, filter or paging changed.
    QueryChanged,
    /// Selection changed.
    SelectionChanged {
        /// Selected row keys.
        keys: Vec<String>,
    },
    /// Group or nested expansion changed.
    ExpansionChanged,
}

/// One data table.
pub struct DataGrid {
    options: GridOptions,
    columns: ColumnLayoutEngine,
    column_events: Rc<RefCell<VecDeque<ColumnsChanged>>>,
    rows: RowModel,
    query: TableQuery,
    source: Option<Box<dyn DataSource>>,
    normalizer: Option<ResponseNormalizer>,
    offsets: OffsetIndex,
    calculator: VisibleRangeCalculator,
    scroll: ScrollState,
    viewport_height: usize,
    viewport_width: usize,
    selection: Selection,
    grouping: Option<Grouping>,
    nested: Option<NestedRows>,
    display: Vec<DisplayRow>,
    drag: DragReorderController,
    backup: SettingsBackup,
    store: Box<dyn SettingsStore>,
    settings_dirty: bool,
    subscribers: Subscribers<GridEvent>,
}

impl std::fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("options", &self.options)
            .field("columns", &self.columns.columns().len())
            .field("rows", &self.rows.rows().len())
            .field("query", &self.query)
            .field("scroll_top", &self.scroll.scroll_top())
            .finish_non_exhaustive()
    }
}

impl DataGrid {
    /// Grid over `columns` with no rows and an in-memory settings store.
    pub fn new(columns: Vec<ColumnConfig>, options: GridOptions) -> Self {
        let fields: Vec<String> = columns.iter().map(|c| c.field.clone()).collect();
        let mut engine = ColumnLayoutEngine::new(columns, options.width_bounds);
        let column_events = Rc::new(RefCell::new(VecDeque::new()));
        let queue = Rc::clone(&column_events);
        engine.subscribe(move |event: &ColumnsChanged| queue.borrow_mut().push_back(event.clone()));

        let heights = if options.dynamic_rows {
            let estimate = if options.row_height == 0 {
                DYNAMIC_ROW_ESTIMATE
            } else {
                options.row_height
            };
            RowHeights::dynamic(move |_| estimate)
        } else {
            RowHeights::Uniform(options.row_height.max(1))
        };

        let mut grid = Self {
            columns: engine,
            column_events,
            rows: RowModel::default(),
            query: TableQuery::with_page_size(options.page_size),
            source: None,
            normalizer: None,
            offsets: OffsetIndex::new(heights, 0),
            calculator: VisibleRangeCalculator::new(options.buffer, options.overscan),
            scroll: ScrollState::new(),
            viewport_height: 0,
            viewport_width: 0,
            selection: Selection::new(options.selection_mode),
            grouping: options.group.clone().map(Grouping::new),
            nested: options.nested.clone().map(NestedRows::new),
            display: Vec::new(),
            drag: DragReorderController::default(),
            backup: SettingsBackup::new(&options.grid_name, options.support_backup, &fields),
            store: Box::new(MemorySettingsStore::new()),
            settings_dirty: false,
            subscribers: Subscribers::new(),
            options,
        };
        grid.rebuild_display();
        grid
    }

    /// Use `store` for settings persistence.
    pub fn with_store(mut self, store: Box<dyn SettingsStore>) -> Self {
        self.store = store;
        self
    }

    /// Load pages from `source`.
    pub fn with_data_source(mut self, source: Box<dyn DataSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Reshape source responses with `normalizer`.
    pub fn with_normalizer(mut self, normalizer: ResponseNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Construction options.
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    // ---- notification ----

    /// Register a listener for grid events.
    pub fn subscribe(&mut self, listener: impl FnMut(&GridEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    /// Remove a listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn emit(&mut self, event: GridEvent) {
        self.subscribers.emit(&event);
    }

    fn flush_column_events(&mut self) {
        let drained: Vec<ColumnsChanged> = self.column_events.borrow_mut().drain(..).collect();
        if drained.is_empty() {
            return;
        }
        self.settings_dirty = true;
        for event in drained {
            self.emit(GridEvent::ColumnsChanged(event));
        }
    }

    // ---- data ----

    /// Current page of rows.
    pub fn rows(&self) -> &[Value] {
        self.rows.rows()
    }

    /// Rows matching the query across all pages.
    pub fn total(&self) -> usize {
        self.rows.total()
    }

    /// Row model, including the last load error.
    pub fn row_model(&self) -> &RowModel {
        &self.rows
    }

    /// Replace rows directly, without a data source.
    pub fn set_rows(&mut self, rows: Vec<Value>) {
        let total = rows.len();
        self.rows.set_rows(rows, total);
        self.after_rows_changed();
    }

    /// Reload the current page from the data source.
    ///
    /// On failure a [`GridEvent::DataError`] is emitted and the previous
    /// rows stay. Without a source this does nothing and returns `false`.
    pub fn refresh(&mut self) -> bool {
        let Some(source) = self.source.as_mut() else {
            return false;
        };
        match self
            .rows
            .load(source.as_mut(), self.normalizer.as_ref(), &self.query)
        {
            Ok(()) => {
                self.after_rows_changed();
                let (rows, total) = (self.rows.rows().len(), self.rows.total());
                self.emit(GridEvent::DataLoaded { rows, total });
                true
            }
            Err(err) => {
                self.emit(GridEvent::DataError(err));
                false
            }
        }
    }

    fn after_rows_changed(&mut self) {
        self.selection.retain_present(self.rows.rows());
        if let Some(grouping) = &mut self.grouping {
            grouping.set_rows(self.rows.rows());
        }
        self.rebuild_display();
    }

    fn rebuild_display(&mut self) {
        let rows = self.rows.rows();
        self.display = match (&self.grouping, &self.nested) {
            (Some(grouping), _) => grouping.flatten(),
            (None, Some(nested)) => nested.flatten(rows),
            (None, None) => (0..rows.len())
                .map(|index| DisplayRow::Data { index, level: 0 })
                .collect(),
        };
        self.offsets.set_row_count(self.display.len());
        self.clamp_scroll();
    }

    /// Rendered body lines in order.
    pub fn display_rows(&self) -> &[DisplayRow] {
        &self.display
    }

    // ---- query ----

    /// Current query.
    pub fn query(&self) -> &TableQuery {
        &self.query
    }

    fn after_query_changed(&mut self) {
        self.settings_dirty = true;
        self.emit(GridEvent::QueryChanged);
        self.refresh();
    }

    /// Sort by `field`.
    pub fn sort(&mut self, field: &str, direction: SortDirection) {
        self.query.sort(field, direction);
        self.after_query_changed();
    }

    /// Cycle `field` through ascending, descending and unsorted.
    pub fn toggle_sort(&mut self, field: &str) {
        match self.query.sort_direction(field) {
            None => self.query.sort(field, SortDirection::Asc),
            Some(SortDirection::Asc) => self.query.sort(field, SortDirection::Desc),
            Some(SortDirection::Desc) => self.query.sort.retain(|s| s.field != field),
        }
        self.after_query_changed();
    }

    /// Filter `field`, returning to the first page.
    pub fn filter(&mut self, field: &str, value: Value, operator: FilterOperator) {
        self.query.add_filter(field, value, operator);
        self.query.go_to_page(1);
        self.after_query_changed();
    }

    /// Drop the filter on `field`.
    pub fn remove_filter(&mut self, field: &str) {
        self.query.remove_filter(field);
        self.query.go_to_page(1);
        self.after_query_changed();
    }

    /// Drop every filter.
    pub fn clear_filters(&mut self) {
        self.query.clear_filters();
        self.query.go_to_page(1);
        self.after_query_changed();
    }

    /// Jump to a 1-based page, clamped to the known page count.
    pub fn go_to_page(&mut self, page: usize) {
        let pages = self.query.total_pages(self.rows.total()).max(1);
        self.query.go_to_page(page.clamp(1, pages));
        self.scroll.jump_to(ScrollTarget::default());
        self.after_query_changed();
    }

    /// Change rows per page.
    pub fn set_page_size(&mut self, size: usize) {
        self.query.set_page_size(size);
        self.after_query_changed();
    }

    // ---- columns ----

    /// Column layout.
    pub fn columns(&self) -> &ColumnLayoutEngine {
        &self.columns
    }

    /// Mutable column layout. Changes are reported on the next grid call or
    /// [`DataGrid::tick`].
    pub fn columns_mut(&mut self) -> &mut ColumnLayoutEngine {
        &mut self.columns
    }

    /// Visible columns by pane.
    pub fn partition(&self) -> ColumnPartition<'_> {
        self.columns.partition()
    }

    /// Pin a column.
    pub fn pin(&mut self, field: &str, side: FixedSide) {
        self.columns.pin(field, side);
        self.flush_column_events();
    }

    /// Unpin a column.
    pub fn unpin(&mut self, field: &str) {
        self.columns.unpin(field);
        self.flush_column_events();
    }

    /// Reorder columns.
    pub fn reorder<S: AsRef<str>>(&mut self, order: &[S]) {
        self.columns.reorder(order);
        self.flush_column_events();
    }

    /// Resize a column.
    pub fn resize(&mut self, field: &str, width: u32) {
        self.columns.resize(field, width);
        self.flush_column_events();
    }

    /// Show or hide a column.
    pub fn set_column_visible(&mut self, field: &str, visible: bool) {
        self.columns.set_visible(field, visible);
        self.flush_column_events();
    }

    /// Flip a column's visibility.
    pub fn toggle_column(&mut self, field: &str) {
        self.columns.toggle_visibility(field);
        self.flush_column_events();
    }

    /// Size a column from its content.
    pub fn autosize(&mut self, field: &str, measurer: &dyn TextMeasurer) -> Option<u32> {
        let width = self
            .columns
            .autosize(field, self.rows.rows(), measurer, DEFAULT_FONT);
        self.flush_column_events();
        width
    }

    /// Size every visible column from its content.
    pub fn autosize_all(&mut self, measurer: &dyn TextMeasurer) {
        self.columns
            .autosize_all(self.rows.rows(), measurer, DEFAULT_FONT);
        self.flush_column_events();
    }

    /// Fit visible columns to the viewport width.
    pub fn fit_columns(&mut self, strategy: WidthStrategy) {
        let width = u32::try_from(self.viewport_width).unwrap_or(u32::MAX);
        self.columns.adjust_widths(width, strategy);
        self.flush_column_events();
    }

    // ---- drag ----

    /// Begin a header press.
    pub fn pointer_down(&mut self, session: &dyn DragSession, x: f64, y: f64) -> bool {
        self.drag.pointer_down(session, x, y, &self.columns)
    }

    /// Track a header drag.
    pub fn pointer_move(&mut self, session: &dyn DragSession, x: f64, y: f64) -> Option<InsertionCue> {
        self.drag.pointer_move(session, x, y)
    }

    /// Finish a header drag.
    pub fn pointer_up(&mut self, session: &dyn DragSession, x: f64, y: f64) -> DragOutcome {
        let outcome = self.drag.pointer_up(session, x, y, &mut self.columns);
        if let DragOutcome::Dropped(event) = &outcome {
            self.column_events.borrow_mut().clear();
            self.settings_dirty = true;
            self.emit(GridEvent::ColumnsReordered(event.clone()));
        }
        outcome
    }

    /// Drag controller, for phase and cue inspection.
    pub fn drag(&self) -> &DragReorderController {
        &self.drag
    }

    /// Abandon a drag in progress.
    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    // ---- scrolling ----

    /// Set the body viewport size in pixels.
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.clamp_scroll();
    }

    /// Body viewport height.
    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// Applied scroll position.
    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    /// Height of all body rows.
    pub fn content_height(&mut self) -> usize {
        self.offsets.total_height()
    }

    /// Width of the main pane's columns.
    pub fn content_width(&self) -> usize {
        self.columns.pane_width(PaneKind::Main) as usize
    }

    fn max_scroll_top(&mut self) -> usize {
        self.offsets.total_height().saturating_sub(self.viewport_height)
    }

    fn max_scroll_left(&self) -> usize {
        let fixed = self.columns.pane_width(PaneKind::Left) + self.columns.pane_width(PaneKind::Right);
        let main_view = self.viewport_width.saturating_sub(fixed as usize);
        self.content_width().saturating_sub(main_view)
    }

    fn clamp_scroll(&mut self) {
        let top = self.scroll.scroll_top().min(self.max_scroll_top());
        let left = self.scroll.scroll_left().min(self.max_scroll_left());
        if top != self.scroll.scroll_top() || left != self.scroll.scroll_left() {
            self.scroll.jump_to(ScrollTarget { top, left });
        }
    }

    /// Queue a scroll position for the next frame, clamped to the content.
    pub fn scroll_to(&mut self, top: usize, left: usize) -> FrameRequest {
        let target = ScrollTarget {
            top: top.min(self.max_scroll_top()),
            left: left.min(self.max_scroll_left()),
        };
        self.scroll.request(target)
    }

    /// Queue a relative scroll.
    pub fn scroll_by(&mut self, dy: i64, dx: i64) -> FrameRequest {
        let base = self.scroll.pending().unwrap_or(ScrollTarget {
            top: self.scroll.scroll_top(),
            left: self.scroll.scroll_left(),
        });
        let shift = |value: usize, delta: i64| {
            if delta < 0 {
                value.saturating_sub(delta.unsigned_abs() as usize)
            } else {
                value.saturating_add(delta as usize)
            }
        };
        self.scroll_to(shift(base.top, dy), shift(base.left, dx))
    }

    /// Bring display row `index` to the top immediately.
    pub fn scroll_to_row(&mut self, index: usize) {
        let top = self.offsets.offset_of(index).min(self.max_scroll_top());
        let left = self.scroll.scroll_left();
        self.scroll.jump_to(ScrollTarget { top, left });
        let changed = ScrollChanged {
            top,
            left,
            is_scrolling: self.scroll.is_scrolling(),
        };
        self.emit(GridEvent::Scrolled(changed));
    }

    /// Apply the queued scroll position. Call once per animation frame.
    pub fn on_animation_frame(&mut self, now: Instant) -> Option<ScrollChanged> {
        let changed = self.scroll.on_frame(now)?;
        self.emit(GridEvent::Scrolled(changed));
        Some(changed)
    }

    /// Advance timers: the scroll settle flag and settings auto-save.
    pub fn tick(&mut self, now: Instant) {
        self.flush_column_events();
        if self.scroll.tick(now) {
            let changed = ScrollChanged {
                top: self.scroll.scroll_top(),
                left: self.scroll.scroll_left(),
                is_scrolling: false,
            };
            self.emit(GridEvent::Scrolled(changed));
        }
        if std::mem::take(&mut self.settings_dirty) {
            self.backup.schedule(now);
        }
        if self
            .backup
            .poll(now, self.store.as_mut(), &self.columns, &self.query)
        {
            debug!("Settings auto-saved");
        }
    }

    /// Record a measured row height (dynamic rows only).
    pub fn update_row_height(&mut self, index: usize, height: usize) {
        self.offsets.update_height(index, height);
    }

    /// Rows to render for the current scroll position.
    pub fn visible_range(&mut self) -> VisibleRange {
        self.calculator.compute(
            &mut self.offsets,
            self.scroll.scroll_top(),
            self.viewport_height,
        )
    }

    /// Placement and content of every row in the visible range.
    pub fn visible_rows(&mut self) -> Vec<(VisibleItem, DisplayRow)> {
        let range = self.visible_range();
        self.calculator
            .items(&mut self.offsets, range)
            .into_iter()
            .filter_map(|item| self.display.get(item.index).map(|row| (item, *row)))
            .collect()
    }

    // ---- selection ----

    /// Current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Flip selection of row `index` of the current page.
    pub fn toggle_selection(&mut self, index: usize) -> bool {
        let Some(row) = self.rows.rows().get(index) else {
            return false;
        };
        let selected = self.selection.toggle(row, index);
        self.emit_selection();
        selected
    }

    /// Select every row of the current page.
    pub fn select_all(&mut self) {
        self.selection.select_all(self.rows.rows());
        self.emit_selection();
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.emit_selection();
    }

    fn emit_selection(&mut self) {
        let keys = self.selection.keys().to_vec();
        self.emit(GridEvent::SelectionChanged { keys });
    }

    // ---- grouping and nesting ----

    /// Grouping state, when configured.
    pub fn grouping(&self) -> Option<&Grouping> {
        self.grouping.as_ref()
    }

    /// Nested row state, when configured.
    pub fn nested(&self) -> Option<&NestedRows> {
        self.nested.as_ref()
    }

    fn after_expansion(&mut self) {
        if let Some(grouping) = &self.grouping {
            self.query.expanded_groups = grouping.expanded_keys();
            self.settings_dirty = true;
        }
        self.rebuild_display();
        self.emit(GridEvent::ExpansionChanged);
    }

    /// Flip a group.
    pub fn toggle_group(&mut self, key: &str) {
        if let Some(grouping) = &mut self.grouping {
            grouping.toggle(key);
            self.after_expansion();
        }
    }

    /// Expand every group.
    pub fn expand_all_groups(&mut self) {
        if let Some(grouping) = &mut self.grouping {
            grouping.expand_all();
            self.after_expansion();
        }
    }

    /// Collapse every group.
    pub fn collapse_all_groups(&mut self) {
        if let Some(grouping) = &mut self.grouping {
            grouping.collapse_all();
            self.after_expansion();
        }
    }

    /// Apply a nested-row toggle to row `index` of the current page.
    pub fn toggle_nested(&mut self, index: usize, request: NestedToggle) -> bool {
        let Some(key) = self.rows.rows().get(index).map(|row| row_key(row, index)) else {
            return false;
        };
        let Some(nested) = &mut self.nested else {
            return false;
        };
        let open = nested.toggle(&key, request);
        self.after_expansion();
        open
    }

    // ---- settings ----

    /// Persist settings now. Returns whether they were stored.
    pub fn save_settings(&mut self) -> bool {
        self.backup.save(self.store.as_mut(), &self.columns, &self.query)
    }

    /// Apply persisted settings and reload. Returns whether any were found.
    pub fn restore_settings(&mut self) -> bool {
        let restored = self
            .backup
            .load(self.store.as_ref(), &mut self.columns, &mut self.query);
        if restored {
            if let Some(grouping) = &mut self.grouping {
                grouping.restore_expanded(self.query.expanded_groups.as_deref());
            }
            self.column_events.borrow_mut().clear();
            self.emit(GridEvent::ColumnsChanged(ColumnsChanged::Restored));
            self.refresh();
            self.rebuild_display();
        }
        restored
    }

    /// Export settings as pretty JSON, or `None` if serialization fails.
    pub fn export_settings(&self) -> Option<String> {
        self.backup.export_json(&self.columns, &self.query).ok()
    }

    /// Import exported settings. Returns `false` for malformed input.
    pub fn import_settings(&mut self, json: &str) -> bool {
        let imported = self.backup.import_json(
            json,
            self.store.as_mut(),
            &mut self.columns,
            &mut self.query,
        );
        if imported {
            self.flush_column_events();
            self.settings_dirty = false;
            self.refresh();
        }
        imported
    }

    /// Forget persisted settings and restore the initial layout and query.
    pub fn reset_settings(&mut self) {
        self.backup
            .reset(self.store.as_mut(), &mut self.columns, &mut self.query);
        self.flush_column_events();
        self.settings_dirty = false;
        self.refresh();
    }

    /// Storage key used for settings, `None` when backup is off.
    pub fn settings_key(&self) -> Option<&str> {
        self.backup.key()
    }

    /// Cancel pending frames and timers and drop every listener.
    pub fn teardown(&mut self) {
        self.scroll.teardown();
        self.columns.teardown();
        self.drag.teardown();
        self.backup.teardown();
        self.subscribers.clear();
        self.column_events.borrow_mut().clear();
        info!(grid = %self.options.grid_name, "Grid torn down");
    }
}
