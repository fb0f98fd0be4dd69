//! Logical scroll position shared by every pane of one grid.

use crate::notify::{SubscriptionId, Subscribers};
use crate::sync::debounce::Debouncer;
use crate::sync::frame::{FrameGate, FrameRequest};
use std::time::{Duration, Instant};
use tracing::trace;

/// Quiet period after the last applied scroll before `is_scrolling` clears.
pub const SCROLL_SETTLE_DELAY: Duration = Duration::from_millis(150);

/// Requested scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollTarget {
    /// Vertical offset in pixels.
    pub top: usize,
    /// Horizontal offset in pixels.
    pub left: usize,
}

/// Notification sent after the logical position or scrolling flag changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollChanged {
    /// Vertical offset in pixels.
    pub top: usize,
    /// Horizontal offset in pixels.
    pub left: usize,
    /// Whether a scroll gesture is still in progress.
    pub is_scrolling: bool,
}

/// Single source of truth for the grid's scroll position.
///
/// Native pane offsets are replicas of this state. Incoming positions are
/// coalesced so at most one update is applied per animation frame.
#[derive(Debug)]
pub struct ScrollState {
    top: usize,
    left: usize,
    is_scrolling: bool,
    momentum: i64,
    pending: FrameGate<ScrollTarget>,
    settle: Debouncer,
    subscribers: Subscribers<ScrollChanged>,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollState {
    /// State at the origin, not scrolling.
    pub fn new() -> Self {
        Self {
            top: 0,
            left: 0,
            is_scrolling: false,
            momentum: 0,
            pending: FrameGate::new(),
            settle: Debouncer::new(SCROLL_SETTLE_DELAY),
            subscribers: Subscribers::new(),
        }
    }

    /// Applied vertical offset.
    pub fn scroll_top(&self) -> usize {
        self.top
    }

    /// Applied horizontal offset.
    pub fn scroll_left(&self) -> usize {
        self.left
    }

    /// Whether a scroll gesture is in progress.
    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    /// Signed vertical distance of the last applied update.
    pub fn momentum(&self) -> i64 {
        self.momentum
    }

    /// Position waiting for the next frame, if any.
    pub fn pending(&self) -> Option<ScrollTarget> {
        self.pending.pending().copied()
    }

    /// Queue a new position for the next animation frame.
    ///
    /// A position queued before the frame fires replaces the earlier one.
    pub fn request(&mut self, target: ScrollTarget) -> FrameRequest {
        self.is_scrolling = true;
        let request = self.pending.schedule(target);
        trace!(?target, ?request, "Scroll requested");
        request
    }

    /// Apply the pending position. Called once per animation frame.
    pub fn on_frame(&mut self, now: Instant) -> Option<ScrollChanged> {
        let target = self.pending.take()?;
        self.momentum = target.top as i64 - self.top as i64;
        self.top = target.top;
        self.left = target.left;
        self.settle.arm(now);

        let changed = self.snapshot();
        self.subscribers.emit(&changed);
        Some(changed)
    }

    /// Clear the scrolling flag once the settle delay has elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.settle.poll(now) {
            return false;
        }
        self.is_scrolling = false;
        self.momentum = 0;
        let changed = self.snapshot();
        self.subscribers.emit(&changed);
        true
    }

    /// Set the position immediately, bypassing frame coalescing.
    ///
    /// Used for programmatic jumps (scroll-to-row, data reload).
    pub fn jump_to(&mut self, target: ScrollTarget) {
        self.pending.cancel();
        self.top = target.top;
        self.left = target.left;
        let changed = self.snapshot();
        self.subscribers.emit(&changed);
    }

    /// Listen for applied changes.
    pub fn subscribe(&mut self, listener: impl FnMut(&ScrollChanged) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    /// Stop listening.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Cancel the pending frame and settle timer and drop every listener.
    pub fn teardown(&mut self) {
        self.pending.cancel();
        self.settle.cancel();
        self.subscribers.clear();
        self.is_scrolling = false;
    }

    fn snapshot(&self) -> ScrollChanged {
        ScrollChanged {
            top: self.top,
            left: self.left,
            is_scrolling: self.is_scrolling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn target(top: usize) -> ScrollTarget {
        ScrollTarget { top, left: 0 }
    }

    #[test]
    fn requests_are_applied_on_frame_only() {
        let mut state = ScrollState::new();
        assert_eq!(state.request(target(100)), FrameRequest::RequestFrame);
        assert_eq!(state.scroll_top(), 0);
        assert!(state.is_scrolling());

        state.on_frame(Instant::now());
        assert_eq!(state.scroll_top(), 100);
    }

    #[test]
    fn last_request_before_frame_wins() {
        let mut state = ScrollState::new();
        state.request(target(100));
        assert_eq!(state.request(target(250)), FrameRequest::Coalesced);
        assert_eq!(state.request(target(180)), FrameRequest::Coalesced);

        let changed = state.on_frame(Instant::now());
        assert_eq!(changed.map(|c| c.top), Some(180));
        assert_eq!(state.on_frame(Instant::now()), None);
    }

    #[test]
    fn scrolling_flag_clears_after_settle_delay() {
        let start = Instant::now();
        let mut state = ScrollState::new();
        state.request(target(40));
        state.on_frame(start);
        assert_eq!(state.momentum(), 40);

        assert!(!state.tick(start + Duration::from_millis(100)));
        assert!(state.is_scrolling());
        assert!(state.tick(start + SCROLL_SETTLE_DELAY));
        assert!(!state.is_scrolling());
        assert_eq!(state.momentum(), 0);
    }

    #[test]
    fn subscribers_see_applied_positions() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut state = ScrollState::new();
        state.subscribe(move |c| sink.borrow_mut().push(c.top));

        state.request(target(10));
        state.request(target(20));
        state.on_frame(Instant::now());
        state.jump_to(target(5));

        assert_eq!(*seen.borrow(), vec![20, 5]);
    }

    #[test]
    fn teardown_cancels_pending_work() {
        let start = Instant::now();
        let mut state = ScrollState::new();
        state.request(target(10));
        state.teardown();

        assert_eq!(state.on_frame(start), None);
        assert!(!state.tick(start + Duration::from_secs(1)));
        assert_eq!(state.scroll_top(), 0);
    }
}
