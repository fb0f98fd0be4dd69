//! Terminal-level tests for [`TuiApp`] on a [`TestBackend`].

use super::*;
use crate::grid::GridOptions;
use crate::model::ColumnConfig;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::backend::TestBackend;
use serde_json::json;

fn grid(rows: usize) -> DataGrid {
    let columns = vec![
        ColumnConfig::new("id").width(80),
        ColumnConfig::new("name").width(80),
        ColumnConfig::new("email").width(160),
    ];
    let options = GridOptions {
        row_height: 1,
        ..GridOptions::default()
    };
    let mut grid = DataGrid::new(columns, options);
    grid.set_rows(
        (0..rows)
            .map(|i| json!({"id": i, "name": format!("row {i}"), "email": format!("r{i}@x.io")}))
            .collect(),
    );
    grid
}

fn app(rows: usize) -> TuiApp<TestBackend> {
    let terminal = Terminal::new(TestBackend::new(40, 10)).expect("test terminal");
    let mut app = TuiApp::with_terminal(terminal, grid(rows), GridStyles::default());
    app.draw().expect("draw");
    app
}

fn press(app: &mut TuiApp<TestBackend>, code: KeyCode) -> bool {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn mouse(app: &mut TuiApp<TestBackend>, kind: MouseEventKind, column: u16, row: u16) {
    app.handle_mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    });
}

fn buffer_line(app: &TuiApp<TestBackend>, y: u16) -> String {
    let buffer = app.terminal().backend().buffer();
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol().to_string())
        .collect()
}

/// Let scroll propagate and the grid apply it, then redraw.
fn settle(app: &mut TuiApp<TestBackend>) {
    let now = Instant::now();
    app.frame(now);
    app.frame(now);
    app.draw().expect("draw");
}

#[test]
fn draws_header_rows_and_status() {
    let app = app(30);
    assert!(buffer_line(&app, 0).starts_with("id        name      email"));
    assert!(buffer_line(&app, 1).starts_with("0         row 0"));
    assert!(buffer_line(&app, 8).starts_with("7         row 7"));
    assert!(buffer_line(&app, 9).starts_with(" 1-8 of 30 | page 1/2 | id"));
}

#[test]
fn cursor_keys_scroll_the_body() {
    let mut app = app(30);
    for _ in 0..10 {
        press(&mut app, KeyCode::Char('j'));
    }
    assert_eq!(app.cursor(), 10);
    settle(&mut app);

    assert_eq!(app.grid().scroll().scroll_top(), 3);
    assert!(buffer_line(&app, 1).starts_with("3 "));

    press(&mut app, KeyCode::Char('g'));
    settle(&mut app);
    assert_eq!(app.cursor(), 0);
    assert_eq!(app.grid().scroll().scroll_top(), 0);
}

#[test]
fn pinned_pane_follows_vertical_scroll() {
    let mut app = app(30);
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Char('['));
    assert_eq!(
        app.grid().columns().column("name").map(|c| c.fixed_side),
        Some(FixedSide::Left)
    );
    app.draw().expect("draw");
    assert!(buffer_line(&app, 0).starts_with("name      id"));

    // Wheel over the fixed pane is redirected into the main body.
    mouse(&mut app, MouseEventKind::ScrollDown, 2, 4);
    settle(&mut app);
    assert_eq!(app.grid().scroll().scroll_top(), 3);
    assert!(buffer_line(&app, 1).starts_with("row 3     3"));
}

#[test]
fn header_drag_reorders_columns() {
    let mut app = app(5);
    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 2, 0);
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 12, 0);
    assert_eq!(app.grid().drag().phase(), DragPhase::Dragging);
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 12, 0);

    assert_eq!(app.grid().columns().field_order(), ["name", "id", "email"]);
    assert_eq!(app.notice(), Some("moved id from 0 to 1"));
}

#[test]
fn header_grip_resizes_instead_of_dragging() {
    let mut app = app(5);
    // Last cell of `id` is its resize grip.
    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 9, 0);
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 12, 0);
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 12, 0);

    assert_eq!(app.grid().columns().field_order(), ["id", "name", "email"]);
    assert_eq!(app.grid().columns().column("id").map(|c| c.width), Some(104));
}

#[test]
fn move_keys_shift_the_focused_column() {
    let mut app = app(5);
    press(&mut app, KeyCode::Char('>'));
    assert_eq!(app.grid().columns().field_order(), ["name", "id", "email"]);
    assert_eq!(app.focus(), Some("id"));

    press(&mut app, KeyCode::Char('>'));
    press(&mut app, KeyCode::Char('>'));
    assert_eq!(app.grid().columns().field_order(), ["name", "email", "id"]);
    assert_eq!(app.notice(), Some("id is already at the edge of its pane"));
}

#[test]
fn hiding_keeps_one_column_visible() {
    let mut app = app(5);
    press(&mut app, KeyCode::Char('x'));
    assert_eq!(app.focus(), Some("name"));
    press(&mut app, KeyCode::Char('x'));
    press(&mut app, KeyCode::Char('x'));
    assert_eq!(app.focus(), Some("email"));
    assert!(app.grid().columns().column("email").is_some_and(|c| c.visible));

    app.handle_key(KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT));
    assert!(app.grid().columns().columns().iter().all(|c| c.visible));
}

#[test]
fn selection_and_quit() {
    let mut app = app(5);
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char(' '));
    assert_eq!(app.grid().selection().keys(), ["1"]);
    assert_eq!(app.cursor_key().as_deref(), Some("1"));

    assert!(!press(&mut app, KeyCode::Char('z')));
    assert!(press(&mut app, KeyCode::Char('q')));
}
