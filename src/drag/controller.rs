//! Drag-to-reorder state machine for header cells.
//!
//! A gesture is `Idle -> Pressed -> Dragging -> (Dropped | Cancelled)` and
//! then back to `Idle`. Drops are confined to the pane the drag started in.

use super::session::{DragSession, HeaderHit, HitRegion};
use crate::columns::{ColumnLayoutEngine, PaneKind};
use crate::model::Column;
use crate::notify::{SubscriptionId, Subscribers};
use tracing::debug;

/// Pointer travel needed before a press becomes a drag.
pub const DRAG_THRESHOLD: f64 = 4.0;

/// Observable phase of the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No gesture.
    Idle,
    /// Pointer is down on a draggable label, threshold not yet crossed.
    Pressed,
    /// Header is being dragged.
    Dragging,
}

/// Which side of the target the dragged header would land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueSide {
    /// Left of the target.
    Before,
    /// Right of the target.
    After,
}

/// Insertion indicator for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionCue {
    /// Pane being dragged within.
    pub pane: PaneKind,
    /// Pane-local index of the target header.
    pub target_index: usize,
    /// Side of the target.
    pub side: CueSide,
}

/// Result of a successful drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReorderEvent {
    /// Moved column.
    pub field: String,
    /// Global position before the move.
    pub old_index: usize,
    /// Global position after the move.
    pub new_index: usize,
    /// Full column list after the move.
    pub columns: Vec<Column>,
    /// Pane the drag happened in.
    pub pane: PaneKind,
}

/// Why a gesture ended without a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Released before the drag threshold was crossed.
    NotDragging,
    /// Released away from any header.
    NoTarget,
    /// Released over another pane.
    ForeignPane,
    /// Released over the starting header.
    SameIndex,
    /// The resulting order equals the current one.
    Unchanged,
    /// Cancelled by the host.
    Aborted,
}

/// How a gesture ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Columns were reordered and the event was emitted.
    Dropped(ColumnReorderEvent),
    /// Nothing changed.
    Cancelled(CancelReason),
}

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Idle,
    Pressed {
        origin: HeaderHit,
        start_x: f64,
        start_y: f64,
    },
    Dragging {
        origin: HeaderHit,
        cue: Option<InsertionCue>,
    },
}

/// Turns pointer gestures over header cells into column reorders.
#[derive(Debug)]
pub struct DragReorderController {
    gesture: Gesture,
    threshold: f64,
    subscribers: Subscribers<ColumnReorderEvent>,
}

impl Default for DragReorderController {
    fn default() -> Self {
        Self::new(DRAG_THRESHOLD)
    }
}

impl DragReorderController {
    /// Controller with a custom movement threshold.
    pub fn new(threshold: f64) -> Self {
        Self {
            gesture: Gesture::Idle,
            threshold: threshold.max(0.0),
            subscribers: Subscribers::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> DragPhase {
        match self.gesture {
            Gesture::Idle => DragPhase::Idle,
            Gesture::Pressed { .. } => DragPhase::Pressed,
            Gesture::Dragging { .. } => DragPhase::Dragging,
        }
    }

    /// Header the gesture started on.
    pub fn origin(&self) -> Option<HeaderHit> {
        match self.gesture {
            Gesture::Idle => None,
            Gesture::Pressed { origin, .. } | Gesture::Dragging { origin, .. } => Some(origin),
        }
    }

    /// Latest insertion cue while dragging.
    pub fn cue(&self) -> Option<InsertionCue> {
        match self.gesture {
            Gesture::Dragging { cue, .. } => cue,
            _ => None,
        }
    }

    /// Start a gesture.
    ///
    /// Presses on a resize handle, outside any header, or on a column that
    /// is not draggable leave the controller idle. Returns whether a press
    /// was recorded.
    pub fn pointer_down(
        &mut self,
        session: &dyn DragSession,
        x: f64,
        y: f64,
        engine: &ColumnLayoutEngine,
    ) -> bool {
        self.gesture = Gesture::Idle;
        let Some(hit) = session.hit_test(x, y) else {
            return false;
        };
        if hit.region == HitRegion::ResizeHandle {
            debug!(pane = ?hit.pane, index = hit.index, "Press on resize handle, not a drag");
            return false;
        }
        let draggable = engine
            .global_index(hit.pane, hit.index)
            .and_then(|i| engine.columns().get(i))
            .is_some_and(|c| c.draggable);
        if !draggable {
            return false;
        }
        self.gesture = Gesture::Pressed {
            origin: hit,
            start_x: x,
            start_y: y,
        };
        true
    }

    /// Track pointer movement and return the insertion cue, if any.
    pub fn pointer_move(&mut self, session: &dyn DragSession, x: f64, y: f64) -> Option<InsertionCue> {
        if let Gesture::Pressed {
            origin,
            start_x,
            start_y,
        } = self.gesture
        {
            if (x - start_x).hypot(y - start_y) < self.threshold {
                return None;
            }
            debug!(pane = ?origin.pane, index = origin.index, "Drag started");
            self.gesture = Gesture::Dragging { origin, cue: None };
        }

        let Gesture::Dragging { origin, .. } = self.gesture else {
            return None;
        };
        let cue = session
            .hit_test(x, y)
            .filter(|hit| hit.pane == origin.pane && hit.index != origin.index)
            .map(|hit| InsertionCue {
                pane: hit.pane,
                target_index: hit.index,
                side: if origin.left > hit.left {
                    CueSide::Before
                } else {
                    CueSide::After
                },
            });
        self.gesture = Gesture::Dragging { origin, cue };
        cue
    }

    /// Finish the gesture.
    ///
    /// # Behavior
    /// - A release over a different header in the same pane moves the
    ///   dragged column to that header's global position, applies the full
    ///   order through [`ColumnLayoutEngine::reorder`], and emits one
    ///   [`ColumnReorderEvent`].
    /// - Anything else cancels without touching the layout.
    pub fn pointer_up(
        &mut self,
        session: &dyn DragSession,
        x: f64,
        y: f64,
        engine: &mut ColumnLayoutEngine,
    ) -> DragOutcome {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        let Gesture::Dragging { origin, .. } = gesture else {
            return DragOutcome::Cancelled(CancelReason::NotDragging);
        };
        let Some(target) = session.hit_test(x, y) else {
            return DragOutcome::Cancelled(CancelReason::NoTarget);
        };
        if target.pane != origin.pane {
            debug!(from = ?origin.pane, to = ?target.pane, "Cross-pane drop rejected");
            return DragOutcome::Cancelled(CancelReason::ForeignPane);
        }
        if target.index == origin.index {
            return DragOutcome::Cancelled(CancelReason::SameIndex);
        }
        let (Some(old_index), Some(target_index)) = (
            engine.global_index(origin.pane, origin.index),
            engine.global_index(target.pane, target.index),
        ) else {
            return DragOutcome::Cancelled(CancelReason::NoTarget);
        };

        let mut order = engine.field_order();
        let field = order.remove(old_index);
        order.insert(target_index.min(order.len()), field.clone());
        if !engine.reorder(&order) {
            return DragOutcome::Cancelled(CancelReason::Unchanged);
        }

        let event = ColumnReorderEvent {
            new_index: engine.position(&field).unwrap_or(target_index),
            field,
            old_index,
            columns: engine.columns().to_vec(),
            pane: origin.pane,
        };
        debug!(
            field = %event.field,
            old_index = event.old_index,
            new_index = event.new_index,
            "Column dropped"
        );
        self.subscribers.emit(&event);
        DragOutcome::Dropped(event)
    }

    /// Abandon the current gesture.
    pub fn cancel(&mut self) -> DragOutcome {
        self.gesture = Gesture::Idle;
        DragOutcome::Cancelled(CancelReason::Aborted)
    }

    /// Register a reorder listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&ColumnReorderEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    /// Remove a reorder listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Drop listeners and any gesture in progress.
    pub fn teardown(&mut self) {
        self.gesture = Gesture::Idle;
        self.subscribers.clear();
    }
}
