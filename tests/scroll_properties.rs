//! Property-based tests for the virtual scroll core and pane sync.
//!
//! Properties under test:
//! 1. The visible window stays inside `[0, row_count]` and never inverts
//! 2. The window is a pure function of (scroll_top, row count, heights)
//! 3. Uniform rows: `index_at_offset(offset_of(i)) == i`
//! 4. Uniform rows with overscan: the window covers the whole viewport
//! 5. Rendered items are laid out back to back
//! 6. Synchronized panes agree after one animation frame

use panegrid::sync::{Axis, PaneGeometry, ScrollPane, ScrollSynchronizer, WheelOutcome};
use panegrid::virtual_scroll::{OffsetIndex, RowHeights, VisibleRangeCalculator};
use proptest::prelude::*;

// ===== Strategies =====

fn arb_heights() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..=120, 0..300)
}

fn dynamic_index(heights: Vec<usize>) -> OffsetIndex {
    let count = heights.len();
    OffsetIndex::new(
        RowHeights::dynamic(move |i| heights.get(i).copied().unwrap_or(0)),
        count,
    )
}

// ===== Visible range =====

proptest! {
    #[test]
    fn window_stays_in_bounds(
        heights in arb_heights(),
        scroll_top in 0usize..40_000,
        viewport in 0usize..2_000,
        buffer in 0usize..6,
        overscan in 0usize..4,
    ) {
        let count = heights.len();
        let mut rows = dynamic_index(heights);
        let range = VisibleRangeCalculator::new(buffer, overscan)
            .compute(&mut rows, scroll_top, viewport);

        prop_assert!(range.start_index <= range.end_index);
        prop_assert!(range.end_index <= count);
        prop_assert_eq!(range.offset_y, rows.offset_of(range.start_index));
    }

    #[test]
    fn window_is_deterministic(
        heights in arb_heights(),
        scroll_top in 0usize..40_000,
        viewport in 0usize..2_000,
    ) {
        let calculator = VisibleRangeCalculator::default();
        let first = calculator.compute(&mut dynamic_index(heights.clone()), scroll_top, viewport);

        // A warm cache must not change the answer.
        let mut warm = dynamic_index(heights);
        let _ = warm.total_height();
        let second = calculator.compute(&mut warm, scroll_top, viewport);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn uniform_offsets_round_trip(row_height in 1usize..200, count in 1usize..5_000) {
        let mut rows = OffsetIndex::uniform(row_height, count);
        for i in [0, count / 2, count - 1] {
            let offset = rows.offset_of(i);
            prop_assert_eq!(rows.index_at_offset(offset), i);
        }
        prop_assert_eq!(rows.total_height(), row_height * count);
    }

    #[test]
    fn uniform_window_covers_viewport(
        row_height in 1usize..100,
        count in 1usize..2_000,
        scroll_top in 0usize..200_000,
        viewport in 1usize..3_000,
        buffer in 0usize..5,
        overscan in 1usize..4,
    ) {
        let mut rows = OffsetIndex::uniform(row_height, count);
        let total = rows.total_height();
        let scroll_top = scroll_top.min(total);
        let range = VisibleRangeCalculator::new(buffer, overscan)
            .compute(&mut rows, scroll_top, viewport);

        prop_assert!(range.offset_y <= scroll_top);
        prop_assert!(rows.offset_of(range.end_index) >= (scroll_top + viewport).min(total));
    }

    #[test]
    fn items_are_contiguous(heights in arb_heights(), scroll_top in 0usize..20_000) {
        let mut rows = dynamic_index(heights.clone());
        let calculator = VisibleRangeCalculator::default();
        let range = calculator.compute(&mut rows, scroll_top, 600);
        let items = calculator.items(&mut rows, range);

        prop_assert_eq!(items.len(), range.len());
        for pair in items.windows(2) {
            prop_assert_eq!(pair[0].offset_y + pair[0].height, pair[1].offset_y);
        }
        for item in &items {
            prop_assert_eq!(item.height, heights[item.index]);
        }
    }
}

#[test]
fn forty_pixel_rows_fill_a_400_pixel_viewport() {
    let mut rows = OffsetIndex::uniform(40, 1_000);
    let range = VisibleRangeCalculator::new(3, 2).compute(&mut rows, 0, 400);
    assert_eq!(range.start_index, 0);
    assert!(range.end_index >= 10, "{range:?}");
}

#[test]
fn empty_grid_renders_nothing() {
    let mut rows = OffsetIndex::uniform(40, 0);
    let range = VisibleRangeCalculator::default().compute(&mut rows, 500, 400);
    assert!(range.is_empty());
    assert_eq!(rows.index_at_offset(500), 0);
}

// ===== Pane sync =====

fn body(height: usize) -> PaneGeometry {
    PaneGeometry {
        content_height: height,
        client_height: 400,
        content_width: 800,
        client_width: 400,
        ..PaneGeometry::default()
    }
}

proptest! {
    #[test]
    fn synced_panes_agree_after_a_frame(
        scrolls in prop::collection::vec((0usize..3, 0usize..5_000), 1..20),
    ) {
        let mut sync = ScrollSynchronizer::new();
        let panes = [
            sync.add_pane(body(4_000)),
            sync.add_pane(body(4_000)),
            sync.add_pane(body(4_000)),
        ];
        let mut teardown = sync.sync(&panes, Axis::Vertical);

        for (driver, offset) in scrolls {
            if let Some(pane) = sync.pane_mut(panes[driver]) {
                pane.set_offset(Axis::Vertical, offset);
            }
            sync.on_scroll(panes[driver]);
            for written in sync.on_animation_frame() {
                sync.on_scroll(written);
            }
            prop_assert!(!sync.has_pending_frame());

            let expected = offset.min(3_600);
            for id in panes {
                prop_assert_eq!(sync.pane(id).map(|p| p.top), Some(expected));
            }
        }
        prop_assert!(teardown.run(&mut sync));
        prop_assert_eq!(sync.group_count(), 0);
    }
}

#[test]
fn wheel_over_hidden_pane_without_overflow_bubbles() {
    let mut sync = ScrollSynchronizer::new();
    let fixed = sync.add_pane(PaneGeometry {
        hidden_overflow: true,
        ..body(300)
    });
    let main = sync.add_pane(body(300));
    let mut teardown = sync.sync(&[fixed, main], Axis::Vertical);

    assert_eq!(sync.on_wheel(fixed, 0, 120), WheelOutcome::Bubble);
    assert_eq!(sync.on_wheel(main, 0, 120), WheelOutcome::Native);
    assert!(teardown.run(&mut sync));
    assert!(!teardown.run(&mut sync));
}
