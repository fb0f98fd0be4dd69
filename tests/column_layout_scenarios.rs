//! Column layout through the public API: pinning, grouped columns,
//! reordering and content sizing.

use panegrid::columns::{
    measure_column, ColumnLayoutEngine, ColumnsChanged, PaneKind, TextMeasurer, DEFAULT_FONT,
};
use panegrid::model::{ColumnConfig, FixedSide, WidthBounds};
use proptest::prelude::*;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

const STAFF: [&str; 7] = ["id", "name", "email", "dept", "salary", "hireDate", "status"];

fn staff() -> ColumnLayoutEngine {
    let configs = STAFF.iter().map(|f| ColumnConfig::new(*f)).collect();
    ColumnLayoutEngine::new(configs, WidthBounds::default())
}

fn fields(columns: &[&panegrid::model::Column]) -> Vec<String> {
    columns.iter().map(|c| c.field.clone()).collect()
}

#[test]
fn pinned_columns_keep_their_relative_order() {
    let mut engine = staff();
    engine.pin("name", FixedSide::Left);
    engine.pin("status", FixedSide::Right);
    engine.pin("hireDate", FixedSide::Right);

    let partition = engine.partition();
    assert_eq!(fields(partition.pane(PaneKind::Left)), ["name"]);
    assert_eq!(fields(partition.pane(PaneKind::Right)), ["hireDate", "status"]);
    assert_eq!(
        fields(partition.pane(PaneKind::Main)),
        ["id", "email", "dept", "salary"]
    );
    assert_eq!(engine.column_offset(PaneKind::Main), 1);
    assert_eq!(engine.column_offset(PaneKind::Right), 5);
}

#[test]
fn pin_events_name_every_moved_column() {
    let configs = vec![
        ColumnConfig::new("id"),
        ColumnConfig::new("street").group("address"),
        ColumnConfig::new("city").group("address"),
        ColumnConfig::new("email"),
    ];
    let mut engine = ColumnLayoutEngine::new(configs, WidthBounds::default());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    engine.subscribe(move |event: &ColumnsChanged| sink.borrow_mut().push(event.clone()));

    engine.pin("city", FixedSide::Left);
    engine.pin("city", FixedSide::Left);

    assert_eq!(engine.field_order(), ["street", "city", "id", "email"]);
    assert_eq!(
        *seen.borrow(),
        [ColumnsChanged::Pinned {
            fields: vec!["street".into(), "city".into()],
            side: FixedSide::Left,
        }]
    );
}

#[test]
fn widths_clamp_to_column_bounds() {
    let configs = vec![ColumnConfig {
        min_width: Some(80),
        max_width: Some(200),
        ..ColumnConfig::new("name")
    }];
    let mut engine = ColumnLayoutEngine::new(configs, WidthBounds::default());
    engine.resize("name", 10);
    assert_eq!(engine.column("name").map(|c| c.width), Some(80));
    engine.resize("name", 999);
    assert_eq!(engine.column("name").map(|c| c.width), Some(200));
}

/// Measures every string as a fixed width, regardless of content.
struct Fixed {
    header: f64,
    value: f64,
}

impl TextMeasurer for Fixed {
    fn measure(&self, text: &str, _font: &str) -> Option<f64> {
        Some(if text == "Department" { self.header } else { self.value })
    }
}

#[test]
fn autosize_scales_average_content_width() {
    let measurer = Fixed {
        header: 90.0,
        value: 80.0,
    };
    let values = vec!["Engineering"; 100];
    let metrics = measure_column(&measurer, DEFAULT_FONT, "Department", values, 60, 500);

    let expected = 90.0_f64.max(80.0 * 1.2).clamp(60.0, 500.0).round() as u32;
    assert_eq!(metrics.recommended_width, expected);
    assert_eq!(metrics.recommended_width, 96);
    assert_eq!(metrics.average_content_width, 80.0);
}

#[test]
fn autosize_through_the_engine_stores_the_width() {
    let mut engine = ColumnLayoutEngine::new(
        vec![ColumnConfig::new("dept").title("Department")],
        WidthBounds::default(),
    );
    let rows: Vec<_> = (0..150).map(|_| json!({"dept": "Engineering"})).collect();
    let measurer = Fixed {
        header: 90.0,
        value: 300.0,
    };
    assert_eq!(engine.autosize("dept", &rows, &measurer, DEFAULT_FONT), Some(360));
    assert_eq!(engine.autosize("missing", &rows, &measurer, DEFAULT_FONT), None);
}

// ===== Properties =====

#[derive(Debug, Clone)]
enum Op {
    Pin(usize, FixedSide),
    Unpin(usize),
    Reorder(Vec<usize>),
}

fn arb_side() -> impl Strategy<Value = FixedSide> {
    prop_oneof![
        Just(FixedSide::Left),
        Just(FixedSide::None),
        Just(FixedSide::Right)
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..8, arb_side()).prop_map(|(i, s)| Op::Pin(i, s)),
        (0usize..8).prop_map(Op::Unpin),
        prop::collection::vec(0usize..8, 1..8).prop_map(Op::Reorder),
    ]
}

fn grouped() -> ColumnLayoutEngine {
    let configs = vec![
        ColumnConfig::new("id"),
        ColumnConfig::new("first").group("person"),
        ColumnConfig::new("last").group("person"),
        ColumnConfig::new("email"),
        ColumnConfig::new("street").group("address"),
        ColumnConfig::new("city").group("address"),
        ColumnConfig::new("zip").group("address"),
        ColumnConfig::new("status"),
    ];
    ColumnLayoutEngine::new(configs, WidthBounds::default())
}

fn field(engine: &ColumnLayoutEngine, i: usize) -> String {
    engine.columns()[i % engine.columns().len()].field.clone()
}

proptest! {
    #[test]
    fn pin_is_idempotent(ops in prop::collection::vec(arb_op(), 0..10), target in 0usize..8, side in arb_side()) {
        let mut engine = grouped();
        apply(&mut engine, &ops);
        let name = field(&engine, target);

        engine.pin(&name, side);
        let once = engine.field_order();
        engine.pin(&name, side);
        prop_assert_eq!(engine.field_order(), once);
    }

    #[test]
    fn layout_invariants_hold(ops in prop::collection::vec(arb_op(), 0..25)) {
        let mut engine = grouped();
        apply(&mut engine, &ops);
        let columns = engine.columns();

        // Order indices are dense.
        for (i, column) in columns.iter().enumerate() {
            prop_assert_eq!(column.order_index, i);
        }
        // Sides are partitioned left, none, right.
        let rank = |side: FixedSide| match side {
            FixedSide::Left => 0,
            FixedSide::None => 1,
            FixedSide::Right => 2,
        };
        prop_assert!(columns.windows(2).all(|w| rank(w[0].fixed_side) <= rank(w[1].fixed_side)));
        // Groups are contiguous and share one side.
        for group in ["person", "address"] {
            let members: Vec<usize> = columns
                .iter()
                .enumerate()
                .filter(|(_, c)| c.group_id.as_deref() == Some(group))
                .map(|(i, _)| i)
                .collect();
            prop_assert!(members.windows(2).all(|w| w[1] == w[0] + 1), "{group}: {members:?}");
            prop_assert!(members.iter().all(|&i| columns[i].fixed_side == columns[members[0]].fixed_side));
        }
    }
}

fn apply(engine: &mut ColumnLayoutEngine, ops: &[Op]) {
    for op in ops {
        match op {
            Op::Pin(i, side) => {
                let name = field(engine, *i);
                engine.pin(&name, *side);
            }
            Op::Unpin(i) => {
                let name = field(engine, *i);
                engine.unpin(&name);
            }
            Op::Reorder(indices) => {
                let order: Vec<String> = indices.iter().map(|i| field(engine, *i)).collect();
                engine.reorder(&order);
            }
        }
    }
}
