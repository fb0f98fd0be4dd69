//! End-to-end [`DataGrid`] behavior: loading, persistence, grouping and
//! nested rows.

use panegrid::data::{DataPage, DataRequest, DataSourceError, StaticDataSource};
use panegrid::grid::{DataGrid, GridEvent, GridOptions};
use panegrid::model::{ColumnConfig, FilterOperator, FixedSide, SortDirection};
use panegrid::rows::{AggregateFn, Aggregation, DisplayRow, GroupConfig, NestedConfig, NestedToggle};
use panegrid::settings::FileSettingsStore;
use panegrid::virtual_scroll::DYNAMIC_ROW_ESTIMATE;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

fn staff_rows(count: usize) -> Vec<Value> {
    let depts = ["Eng", "Ops", "Sales"];
    (0..count)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("person {i}"),
                "dept": depts[i % 3],
                "salary": 1000 + i * 10,
            })
        })
        .collect()
}

fn staff_columns() -> Vec<ColumnConfig> {
    ["id", "name", "dept", "salary"]
        .into_iter()
        .map(ColumnConfig::new)
        .collect()
}

fn temp_settings(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("panegrid-{tag}-{}.json", std::process::id()))
}

fn record(grid: &mut DataGrid) -> Rc<RefCell<Vec<GridEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    grid.subscribe(move |event: &GridEvent| sink.borrow_mut().push(event.clone()));
    events
}

#[test]
fn query_changes_reload_through_the_source() {
    let options = GridOptions {
        page_size: 20,
        ..GridOptions::default()
    };
    let mut grid = DataGrid::new(staff_columns(), options)
        .with_data_source(Box::new(StaticDataSource::new(staff_rows(45))));
    assert!(grid.refresh());
    assert_eq!((grid.rows().len(), grid.total()), (20, 45));

    grid.go_to_page(3);
    assert_eq!(grid.rows().len(), 5);
    grid.go_to_page(99);
    assert_eq!(grid.query().current_page(), 3);

    grid.filter("dept", json!("Eng"), FilterOperator::Eq);
    assert_eq!(grid.total(), 15);
    assert_eq!(grid.query().current_page(), 1);

    grid.sort("salary", SortDirection::Desc);
    assert_eq!(grid.rows().first().map(|r| r["id"].clone()), Some(json!(42)));
}

#[test]
fn failed_reload_keeps_last_rows() {
    let failing = Rc::new(Cell::new(false));
    let flag = Rc::clone(&failing);
    let source = move |_request: &DataRequest| -> Result<Value, DataSourceError> {
        if flag.get() {
            Err(DataSourceError::Failed("connection reset".into()))
        } else {
            Ok(json!({"rows": [{"id": 1}, {"id": 2}, {"id": 3}], "total": 3}))
        }
    };
    let mut grid = DataGrid::new(vec![ColumnConfig::new("id")], GridOptions::default())
        .with_data_source(Box::new(source));
    let events = record(&mut grid);

    assert!(grid.refresh());
    failing.set(true);
    assert!(!grid.refresh());

    assert_eq!(grid.rows().len(), 3);
    assert!(events
        .borrow()
        .iter()
        .any(|e| matches!(e, GridEvent::DataError(DataSourceError::Failed(_)))));
}

#[test]
fn normalizer_reads_custom_response_shapes() {
    let source = |request: &DataRequest| -> Result<Value, DataSourceError> {
        Ok(json!({"data": [{"id": "a"}, {"id": "b"}], "count": 40, "page": request.cur_page}))
    };
    let mut grid = DataGrid::new(vec![ColumnConfig::new("id")], GridOptions::default())
        .with_data_source(Box::new(source))
        .with_normalizer(Box::new(|response: Value| {
            let rows = response["data"]
                .as_array()
                .cloned()
                .ok_or_else(|| DataSourceError::Malformed("no data".into()))?;
            let total = response["count"].as_u64().unwrap_or(0) as usize;
            Ok(DataPage { rows, total })
        }));

    assert!(grid.refresh());
    assert_eq!((grid.rows().len(), grid.total()), (2, 40));
}

#[test]
fn settings_survive_a_restart() {
    let path = temp_settings("restart");
    let _ = std::fs::remove_file(&path);
    let options = GridOptions {
        grid_name: "staff".into(),
        support_backup: true,
        ..GridOptions::default()
    };
    let open = || {
        DataGrid::new(staff_columns(), options.clone())
            .with_data_source(Box::new(StaticDataSource::new(staff_rows(9))))
            .with_store(Box::new(FileSettingsStore::new(&path)))
    };

    let mut first = open();
    first.pin("name", FixedSide::Left);
    first.resize("salary", 220);
    first.sort("salary", SortDirection::Desc);
    assert!(first.save_settings());

    let mut second = open();
    assert_eq!(second.settings_key(), first.settings_key());
    assert!(second.restore_settings());
    let name = second.columns().column("name").map(|c| c.fixed_side);
    let salary = second.columns().column("salary").map(|c| c.width);
    let direction = second.query().sort_direction("salary");
    let top = second.rows().first().map(|r| r["id"].clone());

    second.reset_settings();
    let reset_side = second.columns().column("name").map(|c| c.fixed_side);
    let _ = std::fs::remove_file(&path);

    assert_eq!(name, Some(FixedSide::Left));
    assert_eq!(salary, Some(220));
    assert_eq!(direction, Some(SortDirection::Desc));
    assert_eq!(top, Some(json!(8)));
    assert_eq!(reset_side, Some(FixedSide::None));
}

#[test]
fn groups_aggregate_and_collapse() {
    let group = GroupConfig {
        title: Some("Dept".into()),
        aggregation: Some(Aggregation {
            fields: vec!["salary".into()],
            functions: vec![AggregateFn::Sum, AggregateFn::Max],
        }),
        ..GroupConfig::by("dept")
    };
    let options = GridOptions {
        group: Some(group),
        ..GridOptions::default()
    };
    let mut grid = DataGrid::new(staff_columns(), options);
    grid.set_rows(staff_rows(6));

    let groups = grid.grouping().map(|g| g.groups().to_vec()).unwrap_or_default();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].title, "Dept: Eng");
    assert_eq!(groups[0].aggregations.get("salary_sum"), Some(&2030.0));
    assert_eq!(groups[0].aggregations.get("salary_max"), Some(&1030.0));
    assert_eq!(grid.display_rows().len(), 9);

    let key = groups[1].key.clone();
    grid.toggle_group(&key);
    assert_eq!(grid.display_rows().len(), 7);
    assert_eq!(grid.query().expanded_groups.as_deref().map(<[String]>::len), Some(2));
}

#[test]
fn nested_rows_open_with_a_chosen_component() {
    let rows = vec![
        json!({"id": "p1", "children": [{"id": "c1"}, {"id": "c2"}]}),
        json!({"id": "p2"}),
    ];
    let options = GridOptions {
        nested: Some(NestedConfig::default()),
        ..GridOptions::default()
    };
    let mut grid = DataGrid::new(vec![ColumnConfig::new("id")], options);
    grid.set_rows(rows);

    assert!(grid.toggle_nested(0, NestedToggle::SetComponentAndVisible("orders".into(), true)));
    assert_eq!(
        grid.display_rows(),
        [
            DisplayRow::Data { index: 0, level: 0 },
            DisplayRow::Detail { parent: 0 },
            DisplayRow::Data { index: 1, level: 0 },
        ]
    );
    assert_eq!(grid.nested().and_then(|n| n.component_for("p1")), Some("orders"));

    assert!(!grid.toggle_nested(0, NestedToggle::Toggle));
    assert_eq!(grid.display_rows().len(), 2);
}

#[test]
fn measured_rows_update_content_height() {
    let options = GridOptions {
        row_height: 0,
        dynamic_rows: true,
        ..GridOptions::default()
    };
    let mut grid = DataGrid::new(staff_columns(), options);
    grid.set_rows(staff_rows(10));
    assert_eq!(grid.content_height(), 10 * DYNAMIC_ROW_ESTIMATE);

    grid.update_row_height(0, 120);
    assert_eq!(grid.content_height(), 120 + 9 * DYNAMIC_ROW_ESTIMATE);
}
