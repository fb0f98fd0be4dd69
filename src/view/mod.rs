//! TUI rendering and terminal management (impure shell)
//!
//! The terminal hosts four scrollable regions: left, main and right body
//! panes plus the main header row. They are registered with a
//! [`ScrollSynchronizer`]: bodies share `scroll_top`, the header follows the
//! main body's `scroll_left`. Fixed panes never scroll natively; wheel
//! events over them are redirected into the main body.

pub mod constants;
pub mod layout;
pub mod render;
pub mod styles;

pub use layout::{calculate_areas, AreaHit, GridAreas};
pub use render::{fit, header_line, status_line, BodyContext, StatusSummary};
pub use styles::{ColorConfig, GridStyles};

use crate::columns::{CellWidthMeasurer, PaneKind, WidthStrategy};
use crate::config::KeyBindings;
use crate::drag::{DragOutcome, DragPhase, DragSession, HeaderStrip, HitRegion};
use crate::grid::{DataGrid, GridEvent};
use crate::model::row::row_key;
use crate::model::{FixedSide, KeyAction};
use crate::rows::{DisplayRow, NestedToggle};
use crate::sync::{
    Axis, PaneGeometry, PaneId, ScrollPane, ScrollSynchronizer, Teardown, WheelOutcome,
};
use constants::{
    CELL_PX, FRAME_INTERVAL, HEADER_HEIGHT, HORIZONTAL_STEP_CELLS, WHEEL_ROWS, WIDTH_STEP,
};
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use layout::cells_to_px;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    text::Line,
    widgets::Paragraph,
    Terminal,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::rc::Rc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, trace};

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),
}

/// Scroll panes owned by the synchronizer.
#[derive(Debug, Clone, Copy)]
struct Panes {
    left: PaneId,
    main: PaneId,
    right: PaneId,
    header: PaneId,
}

impl Panes {
    fn body(&self, pane: PaneKind) -> PaneId {
        match pane {
            PaneKind::Left => self.left,
            PaneKind::Main => self.main,
            PaneKind::Right => self.right,
        }
    }
}

/// Pointer gesture on the header row.
#[derive(Debug, Clone)]
enum HeaderGesture {
    /// Reordering through the drag controller.
    Drag(HeaderStrip),
    /// Dragging a resize grip.
    Resize {
        field: String,
        start_x: f64,
        start_width: u32,
    },
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    grid: DataGrid,
    key_bindings: KeyBindings,
    styles: GridStyles,
    sync: ScrollSynchronizer<PaneGeometry>,
    panes: Panes,
    sync_handles: Vec<Teardown>,
    events: Rc<RefCell<VecDeque<GridEvent>>>,
    areas: GridAreas,
    focus: Option<String>,
    cursor: usize,
    gesture: Option<HeaderGesture>,
    notice: Option<(String, bool)>,
    needs_redraw: bool,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen and mouse capture.
    pub fn new(grid: DataGrid, styles: GridStyles) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(crossterm::event::EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self::with_terminal(terminal, grid, styles))
    }

    /// Run the main event loop
    ///
    /// Returns when user quits (q or Ctrl+C). Events are polled with a frame
    /// timeout so scroll frames, the settle timer and auto-save keep running
    /// while idle; the screen is redrawn only when something changed.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            if event::poll(FRAME_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(width, height) => {
                        debug!(width, height, "Terminal resized");
                        self.needs_redraw = true;
                    }
                    _ => {}
                }
            }

            self.frame(Instant::now());
            if self.needs_redraw {
                self.draw()?;
            }
        }

        self.shutdown();
        Ok(())
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Build the application around an existing terminal.
    pub fn with_terminal(terminal: Terminal<B>, mut grid: DataGrid, styles: GridStyles) -> Self {
        let events = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&events);
        grid.subscribe(move |event: &GridEvent| sink.borrow_mut().push_back(event.clone()));

        let mut sync = ScrollSynchronizer::new();
        let hidden = PaneGeometry {
            hidden_overflow: true,
            ..PaneGeometry::default()
        };
        let panes = Panes {
            left: sync.add_pane(hidden),
            main: sync.add_pane(PaneGeometry::default()),
            right: sync.add_pane(hidden),
            header: sync.add_pane(hidden),
        };
        let sync_handles = vec![
            sync.sync(&[panes.left, panes.main, panes.right], Axis::Vertical),
            sync.sync(&[panes.header, panes.main], Axis::Horizontal),
        ];

        let focus = visible_fields(&grid).into_iter().next();

        Self {
            terminal,
            grid,
            key_bindings: KeyBindings::default(),
            styles,
            sync,
            panes,
            sync_handles,
            events,
            areas: GridAreas::default(),
            focus,
            cursor: 0,
            gesture: None,
            notice: None,
            needs_redraw: true,
        }
    }

    /// The grid being shown.
    pub fn grid(&self) -> &DataGrid {
        &self.grid
    }

    /// Focused column field.
    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Display row under the cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Latest status notice.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(text, _)| text.as_str())
    }

    /// Terminal, for inspecting the rendered buffer.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    fn line_px(&self) -> usize {
        self.grid.options().row_height.max(1)
    }

    fn set_notice(&mut self, text: impl Into<String>, error: bool) {
        self.notice = Some((text.into(), error));
        self.needs_redraw = true;
    }


    // ===== Input =====

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        let Some(action) = self.key_bindings.get(KeyEvent::new(key.code, key.modifiers)) else {
            return false;
        };
        trace!(?action, "Key action");
        self.needs_redraw = true;

        let horizontal_step = i64::from(HORIZONTAL_STEP_CELLS * CELL_PX);
        match action {
            KeyAction::Quit => return true,

            KeyAction::ScrollDown => self.move_cursor(1),
            KeyAction::ScrollUp => self.move_cursor(-1),
            KeyAction::PageDown => self.move_cursor(self.page_rows() as isize),
            KeyAction::PageUp => self.move_cursor(-(self.page_rows() as isize)),
            KeyAction::ScrollToTop => self.move_cursor(isize::MIN / 2),
            KeyAction::ScrollToBottom => self.move_cursor(isize::MAX / 2),
            KeyAction::ScrollLeft => self.scroll_main(Axis::Horizontal, -horizontal_step),
            KeyAction::ScrollRight => self.scroll_main(Axis::Horizontal, horizontal_step),

            KeyAction::NextColumn => self.move_focus(1),
            KeyAction::PrevColumn => self.move_focus(-1),

            KeyAction::PinLeft => self.with_focus(|grid, field| grid.pin(field, FixedSide::Left)),
            KeyAction::PinRight => self.with_focus(|grid, field| grid.pin(field, FixedSide::Right)),
            KeyAction::Unpin => self.with_focus(|grid, field| grid.unpin(field)),
            KeyAction::Widen => self.resize_focused(i64::from(WIDTH_STEP)),
            KeyAction::Narrow => self.resize_focused(-i64::from(WIDTH_STEP)),
            KeyAction::Autosize => self.with_focus(|grid, field| {
                grid.autosize(field, &CellWidthMeasurer::default());
            }),
            KeyAction::FitColumns => self.grid.fit_columns(WidthStrategy::Content),
            KeyAction::MoveColumnLeft => self.move_focused_column(-1),
            KeyAction::MoveColumnRight => self.move_focused_column(1),
            KeyAction::HideColumn => self.hide_focused(),
            KeyAction::ShowAllColumns => {
                let hidden: Vec<String> = self
                    .grid
                    .columns()
                    .columns()
                    .iter()
                    .filter(|c| !c.visible)
                    .map(|c| c.field.clone())
                    .collect();
                for field in hidden {
                    self.grid.set_column_visible(&field, true);
                }
            }

            KeyAction::ToggleSort => self.with_focus(|grid, field| grid.toggle_sort(field)),
            KeyAction::NextPage => {
                let page = self.grid.query().current_page();
                self.grid.go_to_page(page + 1);
                self.reset_vertical();
            }
            KeyAction::PrevPage => {
                let page = self.grid.query().current_page();
                self.grid.go_to_page(page.saturating_sub(1));
                self.reset_vertical();
            }

            KeyAction::ToggleSelect => {
                if let Some(DisplayRow::Data { index, .. }) = self.cursor_row() {
                    self.grid.toggle_selection(index);
                }
            }
            KeyAction::SelectAll => self.grid.select_all(),
            KeyAction::ClearSelection => self.grid.clear_selection(),
            KeyAction::ToggleExpand => self.toggle_expand(),
            KeyAction::ExpandAll => self.grid.expand_all_groups(),
            KeyAction::CollapseAll => self.grid.collapse_all_groups(),

            KeyAction::SaveSettings => {
                if self.grid.save_settings() {
                    self.set_notice("settings saved", false);
                } else {
                    self.set_notice("settings not saved", true);
                }
            }
            KeyAction::ResetSettings => {
                self.grid.reset_settings();
                self.set_notice("settings reset", false);
            }
            KeyAction::Refresh => {
                self.grid.refresh();
            }
        }

        self.clamp_cursor();
        false
    }

    /// Hide the focused column and focus its neighbour. The last visible
    /// column stays.
    fn hide_focused(&mut self) {
        let fields = visible_fields(&self.grid);
        let Some(position) = self
            .focus
            .as_ref()
            .and_then(|f| fields.iter().position(|x| x == f))
        else {
            return;
        };
        if fields.len() < 2 {
            self.set_notice("cannot hide the last visible column", true);
            return;
        }
        self.grid.set_column_visible(&fields[position], false);
        let remaining = visible_fields(&self.grid);
        self.focus = remaining.get(position.min(remaining.len() - 1)).cloned();
    }

    fn with_focus(&mut self, op: impl FnOnce(&mut DataGrid, &str)) {
        if let Some(field) = self.focus.clone() {
            op(&mut self.grid, &field);
        }
    }

    fn resize_focused(&mut self, delta: i64) {
        let Some(field) = self.focus.clone() else {
            return;
        };
        let Some(width) = self.grid.columns().column(&field).map(|c| c.width) else {
            return;
        };
        let target = (i64::from(width) + delta).clamp(0, i64::from(u32::MAX));
        self.grid.resize(&field, u32::try_from(target).unwrap_or(width));
    }

    fn move_focus(&mut self, step: isize) {
        let fields = visible_fields(&self.grid);
        if fields.is_empty() {
            self.focus = None;
            return;
        }
        let current = self
            .focus
            .as_ref()
            .and_then(|f| fields.iter().position(|x| x == f))
            .unwrap_or(0);
        let next = (current as isize + step).clamp(0, fields.len() as isize - 1) as usize;
        self.focus = fields.get(next).cloned();
    }

    /// Move the focused column one slot within its pane by replaying a
    /// header drag from its label onto the neighbouring header.
    fn move_focused_column(&mut self, step: isize) {
        let Some(field) = self.focus.clone() else {
            return;
        };
        let Some(column) = self.grid.columns().column(&field) else {
            return;
        };
        let pane = PaneKind::for_side(column.fixed_side);
        let strip = HeaderStrip::from_layout(self.grid.columns(), &[(pane, 0.0)], 0.0, 1.0);
        let cells = strip.cells();
        let Some(origin) = cells.iter().position(|c| {
            self.grid
                .columns()
                .global_index(c.pane, c.index)
                .and_then(|g| self.grid.columns().columns().get(g))
                .is_some_and(|col| col.field == field)
        }) else {
            return;
        };
        let Some(target) = origin.checked_add_signed(step).and_then(|t| cells.get(t)) else {
            self.set_notice(format!("{field} is already at the edge of its pane"), false);
            return;
        };
        let (from_x, to_x) = (cells[origin].left + 1.0, target.left + 1.0);

        if self.grid.pointer_down(&strip, from_x, 0.5) {
            self.grid.pointer_move(&strip, to_x, 0.5);
            let outcome = self.grid.pointer_up(&strip, to_x, 0.5);
            self.report_drop(outcome);
        }
    }

    fn report_drop(&mut self, outcome: DragOutcome) {
        match outcome {
            DragOutcome::Dropped(event) => {
                self.focus = Some(event.field.clone());
                self.set_notice(
                    format!("moved {} from {} to {}", event.field, event.old_index, event.new_index),
                    false,
                );
            }
            DragOutcome::Cancelled(reason) => debug!(?reason, "Header drag cancelled"),
        }
    }

    fn page_rows(&self) -> usize {
        usize::from(self.areas.body_lines()).max(1)
    }

    fn cursor_row(&self) -> Option<DisplayRow> {
        self.grid.display_rows().get(self.cursor).copied()
    }

    fn clamp_cursor(&mut self) {
        let last = self.grid.display_rows().len().saturating_sub(1);
        self.cursor = self.cursor.min(last);
    }

    fn move_cursor(&mut self, delta: isize) {
        let last = self.grid.display_rows().len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
        self.reveal_cursor();
    }

    /// Scroll the main body so the cursor row is on screen.
    fn reveal_cursor(&mut self) {
        let line_px = self.line_px();
        let row_top = self.cursor * line_px;
        let body_px = usize::from(self.areas.body_lines()) * line_px;
        let Some(main) = self.sync.pane(self.panes.main).copied() else {
            return;
        };
        let top = if row_top < main.top {
            row_top
        } else if row_top + line_px > main.top + body_px {
            (row_top + line_px).saturating_sub(body_px)
        } else {
            return;
        };
        self.scroll_main(Axis::Vertical, top as i64 - main.top as i64);
    }

    fn reset_vertical(&mut self) {
        self.cursor = 0;
        if let Some(main) = self.sync.pane_mut(self.panes.main) {
            main.set_offset(Axis::Vertical, 0);
        }
        self.sync.on_scroll(self.panes.main);
    }

    /// Scroll the main body natively; the synchronizer mirrors the change.
    fn scroll_main(&mut self, axis: Axis, delta: i64) {
        let Some(main) = self.sync.pane_mut(self.panes.main) else {
            return;
        };
        let offset = main.offset(axis).saturating_add_signed(delta as isize);
        main.set_offset(axis, offset);
        self.sync.on_scroll(self.panes.main);
    }

    fn toggle_expand(&mut self) {
        match self.cursor_row() {
            Some(DisplayRow::GroupHeader { group }) => {
                let key = self
                    .grid
                    .grouping()
                    .and_then(|g| g.groups().get(group))
                    .map(|g| g.key.clone());
                if let Some(key) = key {
                    self.grid.toggle_group(&key);
                }
            }
            Some(DisplayRow::Data { index, .. }) | Some(DisplayRow::Detail { parent: index }) => {
                self.grid.toggle_nested(index, NestedToggle::Toggle);
            }
            None => {}
        }
    }

    /// Handle a single mouse event
    ///
    /// Wheel events go through the synchronizer; header presses start a
    /// reorder or resize gesture; body clicks move the cursor.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let hit = self.areas.hit(mouse.column, mouse.row);
        let x = f64::from(mouse.column) * f64::from(CELL_PX) + f64::from(CELL_PX) / 2.0;
        let y = f64::from(mouse.row) + 0.5;
        let wheel = (WHEEL_ROWS * self.line_px()) as i32;

        match mouse.kind {
            MouseEventKind::ScrollDown => self.wheel(hit, 0, wheel),
            MouseEventKind::ScrollUp => self.wheel(hit, 0, -wheel),
            MouseEventKind::ScrollRight => self.wheel(hit, wheel, 0),
            MouseEventKind::ScrollLeft => self.wheel(hit, -wheel, 0),
            MouseEventKind::Down(MouseButton::Left) => match hit {
                Some(AreaHit { header: true, .. }) => self.header_press(x, y),
                Some(AreaHit { header: false, .. }) => self.body_click(mouse.row),
                None => {}
            },
            MouseEventKind::Drag(MouseButton::Left) => self.header_drag(x, y),
            MouseEventKind::Up(MouseButton::Left) => self.header_release(x, y),
            _ => return,
        }
        self.needs_redraw = true;
    }

    fn wheel(&mut self, hit: Option<AreaHit>, dx: i32, dy: i32) {
        let Some(hit) = hit else {
            return;
        };
        let pane = if hit.header && hit.pane == PaneKind::Main {
            self.panes.header
        } else {
            self.panes.body(hit.pane)
        };
        match self.sync.on_wheel(pane, dx, dy) {
            WheelOutcome::Native => {
                if dy != 0 {
                    self.scroll_main(Axis::Vertical, i64::from(dy));
                }
                if dx != 0 {
                    self.scroll_main(Axis::Horizontal, i64::from(dx));
                }
            }
            WheelOutcome::Consumed | WheelOutcome::Bubble => {}
        }
    }

    fn header_strip(&self) -> HeaderStrip {
        let origin = |pane: PaneKind| f64::from(cells_to_px(self.areas.header(pane).x));
        let scroll_left = self.grid.scroll().scroll_left() as f64;
        let top = f64::from(self.areas.header(PaneKind::Main).y);
        HeaderStrip::from_layout(
            self.grid.columns(),
            &[
                (PaneKind::Left, origin(PaneKind::Left)),
                (PaneKind::Right, origin(PaneKind::Right)),
                (PaneKind::Main, origin(PaneKind::Main) - scroll_left),
            ],
            top,
            f64::from(HEADER_HEIGHT),
        )
    }

    fn header_press(&mut self, x: f64, y: f64) {
        let strip = self.header_strip();
        let Some(hit) = strip.hit_test(x, y) else {
            return;
        };
        let Some(column) = self
            .grid
            .columns()
            .global_index(hit.pane, hit.index)
            .and_then(|g| self.grid.columns().columns().get(g))
        else {
            return;
        };
        self.focus = Some(column.field.clone());

        if hit.region == HitRegion::ResizeHandle {
            if column.resizable {
                self.gesture = Some(HeaderGesture::Resize {
                    field: column.field.clone(),
                    start_x: x,
                    start_width: column.width,
                });
            }
        } else if self.grid.pointer_down(&strip, x, y) {
            self.gesture = Some(HeaderGesture::Drag(strip));
        }
    }

    fn header_drag(&mut self, x: f64, y: f64) {
        match &self.gesture {
            Some(HeaderGesture::Drag(strip)) => {
                let strip = strip.clone();
                self.grid.pointer_move(&strip, x, y);
            }
            Some(HeaderGesture::Resize {
                field,
                start_x,
                start_width,
            }) => {
                let width = (f64::from(*start_width) + x - start_x).max(0.0) as u32;
                let field = field.clone();
                self.grid.resize(&field, width);
            }
            None => {}
        }
    }

    fn header_release(&mut self, x: f64, y: f64) {
        if let Some(HeaderGesture::Drag(strip)) = self.gesture.take() {
            let outcome = self.grid.pointer_up(&strip, x, y);
            self.report_drop(outcome);
        }
    }

    fn body_click(&mut self, row: u16) {
        let body = self.areas.body(PaneKind::Main);
        let line = usize::from(row.saturating_sub(body.y));
        let offset = self.grid.scroll().scroll_top() + line * self.line_px();
        let hit = self
            .grid
            .visible_rows()
            .into_iter()
            .find(|(item, _)| offset >= item.offset_y && offset < item.offset_y + item.height);
        if let Some((item, _)) = hit {
            self.cursor = item.index;
        }
    }

    // ===== Frames =====

    /// Push pane geometry from the grid into the synchronizer.
    fn sync_geometry(&mut self) {
        let line_px = self.line_px();
        let content_height = self.grid.content_height();
        let client_height = usize::from(self.areas.body_lines()) * line_px;
        let content_width = self.grid.content_width();
        let main_width = cells_to_px(self.areas.body(PaneKind::Main).width) as usize;

        for pane in PaneKind::ALL {
            let id = self.panes.body(pane);
            let width = match pane {
                PaneKind::Main => content_width,
                _ => self.grid.columns().pane_width(pane) as usize,
            };
            let client_width = cells_to_px(self.areas.body(pane).width) as usize;
            if let Some(geometry) = self.sync.pane_mut(id) {
                geometry.content_height = content_height;
                geometry.client_height = client_height;
                geometry.content_width = width;
                geometry.client_width = client_width;
                geometry.top = geometry.top.min(geometry.max_offset(Axis::Vertical));
                geometry.left = geometry.left.min(geometry.max_offset(Axis::Horizontal));
            }
        }
        if let Some(header) = self.sync.pane_mut(self.panes.header) {
            header.content_width = content_width;
            header.client_width = main_width;
            header.left = header.left.min(header.max_offset(Axis::Horizontal));
        }
    }

    /// Run one animation frame: propagate pane scroll, hand the main body
    /// position to the grid and advance its timers.
    pub fn frame(&mut self, now: Instant) {
        let written = self.sync.on_animation_frame();
        if !written.is_empty() {
            trace!(panes = written.len(), "Scroll propagated");
        }
        // Mirrored panes report their write back as a scroll event, which the
        // synchronizer swallows.
        for id in written {
            self.sync.on_scroll(id);
        }

        if let Some(main) = self.sync.pane(self.panes.main).copied() {
            let scroll = self.grid.scroll();
            if main.top != scroll.scroll_top() || main.left != scroll.scroll_left() {
                self.grid.scroll_to(main.top, main.left);
            }
        }
        if self.grid.on_animation_frame(now).is_some() {
            self.needs_redraw = true;
        }
        self.grid.tick(now);
        self.drain_events();
    }

    fn drain_events(&mut self) {
        let events: Vec<GridEvent> = self.events.borrow_mut().drain(..).collect();
        for event in events {
            match event {
                GridEvent::DataError(err) => self.set_notice(err.to_string(), true),
                GridEvent::ColumnsReordered(_)
                | GridEvent::ColumnsChanged(_)
                | GridEvent::DataLoaded { .. }
                | GridEvent::QueryChanged
                | GridEvent::SelectionChanged { .. }
                | GridEvent::ExpansionChanged => self.needs_redraw = true,
                GridEvent::Scrolled(_) => {}
            }
        }
    }

    // ===== Rendering =====

    /// Render the current frame
    pub fn draw(&mut self) -> Result<(), TuiError> {
        let size = self.terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        let left_px = self.grid.columns().pane_width(PaneKind::Left);
        let right_px = self.grid.columns().pane_width(PaneKind::Right);
        self.areas = calculate_areas(area, left_px, right_px);

        let line_px = self.line_px();
        let body_lines = usize::from(self.areas.body_lines());
        self.grid
            .set_viewport(cells_to_px(area.width) as usize, body_lines * line_px);
        self.sync_geometry();
        self.drain_events();

        let scroll_top = self.grid.scroll().scroll_top();
        let mut on_screen: Vec<(usize, DisplayRow, usize)> = Vec::new();
        for (item, row) in self.grid.visible_rows() {
            if item.offset_y + item.height <= scroll_top {
                continue;
            }
            let line = item.offset_y.saturating_sub(scroll_top) / line_px;
            if line >= body_lines {
                break;
            }
            on_screen.push((line, row, item.index));
        }

        let summary = self.status_summary(&on_screen);
        let error = self.notice.as_ref().is_some_and(|(_, e)| *e);
        let areas = self.areas;
        let grid = &self.grid;
        let styles = &self.styles;
        let focus = self.focus.as_deref();
        let cursor = self.cursor;
        let scroll_left_cells =
            u16::try_from(grid.scroll().scroll_left() / CELL_PX as usize).unwrap_or(u16::MAX);
        let cue = grid.drag().cue();
        let lead = PaneKind::ALL
            .into_iter()
            .find(|&p| !grid.columns().pane_columns(p).is_empty())
            .unwrap_or(PaneKind::Main);

        self.terminal.draw(|frame| {
            let ctx = BodyContext {
                rows: grid.rows(),
                grouping: grid.grouping(),
                nested: grid.nested(),
                selection: grid.selection(),
                styles,
            };
            for pane in PaneKind::ALL {
                let columns = grid.columns().pane_columns(pane);
                let pane_cue = cue.filter(|c| c.pane == pane);
                let scroll = if pane == PaneKind::Main { scroll_left_cells } else { 0 };

                let header = header_line(&columns, grid.query(), focus, pane_cue, styles);
                frame.render_widget(
                    Paragraph::new(header).scroll((0, scroll)),
                    areas.header(pane),
                );

                let mut lines = vec![Line::default(); body_lines];
                for &(line, row, index) in &on_screen {
                    lines[line] = ctx.line(row, &columns, pane == lead, index == cursor);
                }
                frame.render_widget(Paragraph::new(lines).scroll((0, scroll)), areas.body(pane));
            }
            frame.render_widget(Paragraph::new(status_line(&summary, error, styles)), areas.status);
        })?;

        self.needs_redraw = false;
        Ok(())
    }

    fn status_summary(&self, on_screen: &[(usize, DisplayRow, usize)]) -> StatusSummary {
        let data_rows = on_screen.iter().filter_map(|(_, row, _)| match row {
            DisplayRow::Data { index, .. } => Some(*index + 1),
            _ => None,
        });
        let shown = data_rows.clone().min().zip(data_rows.max());
        let query = self.grid.query();
        let focus = self
            .focus
            .as_ref()
            .and_then(|f| self.grid.columns().column(f))
            .map(|c| c.title.clone());
        let mut notice = self.notice.as_ref().map(|(text, _)| text.clone());
        if self.grid.drag().phase() == DragPhase::Dragging {
            notice = Some("drop to reorder".to_string());
        }
        StatusSummary {
            shown,
            total: self.grid.total(),
            page: query.current_page(),
            pages: query.total_pages(self.grid.total()),
            focus,
            selected: self.grid.selection().len(),
            notice,
        }
    }

    /// Save settings, stop timers and release the sync groups.
    pub fn shutdown(&mut self) {
        self.grid.save_settings();
        for handle in &mut self.sync_handles {
            handle.run(&mut self.sync);
        }
        self.grid.teardown();
        info!(key = ?self.grid.settings_key(), "Grid closed");
    }

    /// Row key of the cursor row, for tests and status.
    pub fn cursor_key(&self) -> Option<String> {
        match self.cursor_row()? {
            DisplayRow::Data { index, .. } => self.grid.rows().get(index).map(|r| row_key(r, index)),
            _ => None,
        }
    }
}

/// Visible fields in screen order: left, main, right.
fn visible_fields(grid: &DataGrid) -> Vec<String> {
    PaneKind::ALL
        .into_iter()
        .flat_map(|pane| grid.columns().pane_columns(pane))
        .map(|c| c.field.clone())
        .collect()
}

/// Initialize and run the TUI application for `grid`
///
/// Handles terminal setup, runs the event loop, and restores the terminal
/// even when the loop fails.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run_grid(grid: DataGrid, styles: GridStyles) -> Result<(), TuiError> {
    let mut app = TuiApp::new(grid, styles)?;
    let result = app.run();
    restore_terminal()?;
    result
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(crossterm::event::DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests;
