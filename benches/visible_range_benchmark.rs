//! Visible-window benchmarks for large row counts.
//!
//! Uniform rows answer offsets arithmetically; measured rows go through the
//! height cache. Both should stay flat as the scroll position moves.
//!
//! Run with: cargo bench --bench visible_range_benchmark

#![allow(missing_docs)] // criterion macros generate undocumented items

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use panegrid::grid::{DataGrid, GridOptions};
use panegrid::model::ColumnConfig;
use panegrid::virtual_scroll::{OffsetIndex, RowHeights, VisibleRangeCalculator};
use serde_json::json;
use std::time::Instant;

const ROWS: usize = 100_000;
const VIEWPORT: usize = 800;

/// Scroll position as a fraction of the content.
const POSITIONS: [(&str, f64); 4] = [("start", 0.0), ("quarter", 0.25), ("middle", 0.5), ("end", 1.0)];

fn measured_heights(index: usize) -> usize {
    24 + (index * 7) % 40
}

fn bench_uniform(c: &mut Criterion) {
    let mut group = c.benchmark_group("visible_range_uniform");
    let calculator = VisibleRangeCalculator::default();
    let mut rows = OffsetIndex::uniform(40, ROWS);
    let total = rows.total_height();

    for (name, fraction) in POSITIONS {
        let scroll_top = (total as f64 * fraction) as usize;
        group.bench_with_input(BenchmarkId::from_parameter(name), &scroll_top, |b, &top| {
            b.iter(|| calculator.compute(&mut rows, black_box(top), VIEWPORT));
        });
    }
    group.finish();
}

fn bench_measured(c: &mut Criterion) {
    let mut group = c.benchmark_group("visible_range_measured");
    let calculator = VisibleRangeCalculator::default();
    let mut rows = OffsetIndex::new(RowHeights::dynamic(measured_heights), ROWS);
    let total = rows.total_height();

    for (name, fraction) in POSITIONS {
        let scroll_top = (total as f64 * fraction) as usize;
        group.bench_with_input(BenchmarkId::from_parameter(name), &scroll_top, |b, &top| {
            b.iter(|| calculator.compute(&mut rows, black_box(top), VIEWPORT));
        });
    }

    // Cold cache: the row count changed and every height is re-measured.
    group.bench_function("cold_cache", |b| {
        b.iter(|| {
            let mut cold = OffsetIndex::new(RowHeights::dynamic(measured_heights), ROWS);
            calculator.compute(&mut cold, black_box(total / 2), VIEWPORT)
        });
    });
    group.finish();
}

fn bench_grid_scroll(c: &mut Criterion) {
    let rows = (0..ROWS)
        .map(|i| json!({"id": i, "name": format!("row {i}"), "score": i % 97}))
        .collect();
    let columns = ["id", "name", "score"].into_iter().map(ColumnConfig::new).collect();
    let mut grid = DataGrid::new(columns, GridOptions::default());
    grid.set_rows(rows);
    grid.set_viewport(1_200, VIEWPORT);

    let mut top = 0;
    c.bench_function("grid_scroll_frame", |b| {
        b.iter(|| {
            top = (top + 137) % (ROWS * 40);
            grid.scroll_to(top, 0);
            grid.on_animation_frame(Instant::now());
            black_box(grid.visible_rows().len())
        });
    });
}

criterion_group!(benches, bench_uniform, bench_measured, bench_grid_scroll);
criterion_main!(benches);
