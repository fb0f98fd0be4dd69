//! Keeps independently scrollable panes on one logical scroll position.
//!
//! Panes are registered into synchronization groups along one axis:
//!
//! - vertical: left-fixed body, main body and right-fixed body mirror `scroll_top`
//! - horizontal: header rows mirror the main body's `scroll_left`
//!
//! The pane that receives a native scroll event drives its groups. Writes
//! made to the other members are remembered so the echo scroll events they
//! produce are swallowed instead of starting a feedback loop. Propagation
//! runs at most once per animation frame.

use super::frame::{FrameGate, FrameRequest};
use tracing::{debug, trace};

/// Scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// `scroll_top`.
    Vertical,
    /// `scroll_left`.
    Horizontal,
}

/// A scrollable region the synchronizer can read and write.
pub trait ScrollPane {
    /// Current offset along `axis`.
    fn offset(&self, axis: Axis) -> usize;

    /// Write the offset along `axis`. Implementations clamp as the host does.
    fn set_offset(&mut self, axis: Axis, offset: usize);

    /// Full content extent along `axis` (`scrollHeight` / `scrollWidth`).
    fn content_extent(&self, axis: Axis) -> usize;

    /// Visible extent along `axis` (`clientHeight` / `clientWidth`).
    fn client_extent(&self, axis: Axis) -> usize;

    /// True for panes styled `overflow: hidden`: they never scroll natively
    /// and rely on wheel redirection.
    fn overflow_hidden(&self) -> bool {
        false
    }

    /// Whether content overflows the pane along `axis`.
    fn has_overflow(&self, axis: Axis) -> bool {
        self.content_extent(axis) > self.client_extent(axis)
    }

    /// Largest valid offset along `axis`.
    fn max_offset(&self, axis: Axis) -> usize {
        self.content_extent(axis)
            .saturating_sub(self.client_extent(axis))
    }
}

/// Plain pane geometry, used by hosts that own no native scroll widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaneGeometry {
    /// `scroll_top`.
    pub top: usize,
    /// `scroll_left`.
    pub left: usize,
    /// Content width.
    pub content_width: usize,
    /// Content height.
    pub content_height: usize,
    /// Visible width.
    pub client_width: usize,
    /// Visible height.
    pub client_height: usize,
    /// Pane is `overflow: hidden`.
    pub hidden_overflow: bool,
}

impl ScrollPane for PaneGeometry {
    fn offset(&self, axis: Axis) -> usize {
        match axis {
            Axis::Vertical => self.top,
            Axis::Horizontal => self.left,
        }
    }

    fn set_offset(&mut self, axis: Axis, offset: usize) {
        let clamped = offset.min(self.max_offset(axis));
        match axis {
            Axis::Vertical => self.top = clamped,
            Axis::Horizontal => self.left = clamped,
        }
    }

    fn content_extent(&self, axis: Axis) -> usize {
        match axis {
            Axis::Vertical => self.content_height,
            Axis::Horizontal => self.content_width,
        }
    }

    fn client_extent(&self, axis: Axis) -> usize {
        match axis {
            Axis::Vertical => self.client_height,
            Axis::Horizontal => self.client_width,
        }
    }

    fn overflow_hidden(&self) -> bool {
        self.hidden_overflow
    }
}

/// Identifies a pane owned by a [`ScrollSynchronizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneId(usize);

/// Teardown handle for one [`ScrollSynchronizer::sync`] registration.
///
/// [`Teardown::run`] removes everything the registration added; calling it
/// again is a no-op.
#[must_use = "dropping the handle leaves the panes synchronized with no way to undo it"]
#[derive(Debug, PartialEq, Eq)]
pub struct Teardown {
    group: usize,
    done: bool,
}

impl Teardown {
    /// Unregister the group. Returns `true` only on the first effective call.
    pub fn run<P: ScrollPane>(&mut self, sync: &mut ScrollSynchronizer<P>) -> bool {
        if self.done {
            return false;
        }
        self.done = true;
        sync.remove_group(self.group)
    }

    /// Whether the teardown already ran.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Result of a wheel event over a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    /// The pane scrolls natively; the host handles the event as usual.
    Native,
    /// The delta was redirected into the group; suppress the default action.
    Consumed,
    /// Nothing to scroll along the wheel axis; let the event reach the page.
    Bubble,
}

#[derive(Debug)]
struct SyncGroup {
    axis: Axis,
    members: Vec<PaneId>,
    /// Driver waiting for the next frame.
    pending: FrameGate<PaneId>,
    /// Panes written by propagation whose echo event is still expected.
    echoes: Vec<PaneId>,
}

/// Owns the panes of one grid and the groups that tie them together.
#[derive(Debug)]
pub struct ScrollSynchronizer<P> {
    panes: Vec<P>,
    groups: Vec<Option<SyncGroup>>,
}

impl<P: ScrollPane> Default for ScrollSynchronizer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ScrollPane> ScrollSynchronizer<P> {
    /// Synchronizer with no panes.
    pub fn new() -> Self {
        Self {
            panes: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Take ownership of a pane.
    pub fn add_pane(&mut self, pane: P) -> PaneId {
        self.panes.push(pane);
        PaneId(self.panes.len() - 1)
    }

    /// Borrow a pane.
    pub fn pane(&self, id: PaneId) -> Option<&P> {
        self.panes.get(id.0)
    }

    /// Mutably borrow a pane (for geometry updates by the host).
    pub fn pane_mut(&mut self, id: PaneId) -> Option<&mut P> {
        self.panes.get_mut(id.0)
    }

    /// Register `members` as one group along `axis`.
    pub fn sync(&mut self, members: &[PaneId], axis: Axis) -> Teardown {
        let members: Vec<PaneId> = members
            .iter()
            .copied()
            .filter(|id| id.0 < self.panes.len())
            .collect();
        debug!(?axis, count = members.len(), "Registering scroll sync group");
        self.groups.push(Some(SyncGroup {
            axis,
            members,
            pending: FrameGate::new(),
            echoes: Vec::new(),
        }));
        Teardown {
            group: self.groups.len() - 1,
            done: false,
        }
    }

    /// Number of live groups.
    pub fn group_count(&self) -> usize {
        self.groups.iter().flatten().count()
    }

    /// Whether any group waits for a frame.
    pub fn has_pending_frame(&self) -> bool {
        self.groups.iter().flatten().any(|g| g.pending.is_pending())
    }

    /// Report that `pane` scrolled natively.
    ///
    /// Returns [`FrameRequest::RequestFrame`] when the host must schedule an
    /// animation frame and call [`ScrollSynchronizer::on_animation_frame`].
    pub fn on_scroll(&mut self, pane: PaneId) -> FrameRequest {
        let mut request = FrameRequest::Coalesced;
        for group in self.groups.iter_mut().flatten() {
            if !group.members.contains(&pane) {
                continue;
            }
            if let Some(pos) = group.echoes.iter().position(|id| *id == pane) {
                group.echoes.swap_remove(pos);
                trace!(?pane, "Swallowing echo scroll event");
                continue;
            }
            if group.pending.schedule(pane) == FrameRequest::RequestFrame {
                request = FrameRequest::RequestFrame;
            }
        }
        request
    }

    /// Copy each pending driver's offset to the rest of its group.
    ///
    /// Returns the panes whose offset changed.
    pub fn on_animation_frame(&mut self) -> Vec<PaneId> {
        let mut written = Vec::new();
        for group in self.groups.iter_mut().flatten() {
            let Some(driver) = group.pending.take() else {
                continue;
            };
            let Some(value) = self.panes.get(driver.0).map(|p| p.offset(group.axis)) else {
                continue;
            };
            for &member in &group.members {
                if member == driver {
                    continue;
                }
                let Some(pane) = self.panes.get_mut(member.0) else {
                    continue;
                };
                let before = pane.offset(group.axis);
                if before == value {
                    continue;
                }
                pane.set_offset(group.axis, value);
                // A clamped write that moves nothing fires no scroll event.
                if pane.offset(group.axis) == before {
                    continue;
                }
                group.echoes.push(member);
                written.push(member);
            }
        }
        written
    }

    /// Handle a wheel event over `pane`.
    ///
    /// Panes that scroll natively are left alone. For `overflow: hidden`
    /// panes the delta is applied to the first natively scrollable member of
    /// each group the pane belongs to, which then drives the group. The
    /// event is consumed unless that destination has no overflow along the
    /// wheel's dominant axis, so short grids never trap page scrolling.
    pub fn on_wheel(&mut self, pane: PaneId, delta_x: i32, delta_y: i32) -> WheelOutcome {
        let Some(target) = self.panes.get(pane.0) else {
            return WheelOutcome::Bubble;
        };
        if !target.overflow_hidden() {
            return WheelOutcome::Native;
        }

        let destinations: Vec<PaneId> = self
            .groups
            .iter()
            .flatten()
            .filter(|g| g.members.contains(&pane))
            .filter_map(|g| {
                g.members.iter().copied().find(|id| {
                    self.panes
                        .get(id.0)
                        .is_some_and(|p| !p.overflow_hidden())
                })
            })
            .collect();
        let Some(&destination) = destinations.first() else {
            return WheelOutcome::Bubble;
        };

        let wheel_axis = if delta_y.unsigned_abs() >= delta_x.unsigned_abs() {
            Axis::Vertical
        } else {
            Axis::Horizontal
        };
        let consumes = self
            .panes
            .get(destination.0)
            .is_some_and(|p| p.has_overflow(wheel_axis));

        // Applied even when the event bubbles, so a cross-axis delta still moves the grid.
        if let Some(dest) = self.panes.get_mut(destination.0) {
            apply_delta(dest, Axis::Vertical, delta_y);
            apply_delta(dest, Axis::Horizontal, delta_x);
        }
        self.on_scroll(destination);

        if consumes {
            WheelOutcome::Consumed
        } else {
            WheelOutcome::Bubble
        }
    }

    fn remove_group(&mut self, index: usize) -> bool {
        match self.groups.get_mut(index) {
            Some(slot @ Some(_)) => {
                if let Some(group) = slot.take() {
                    debug!(axis = ?group.axis, "Scroll sync group removed");
                }
                true
            }
            _ => false,
        }
    }
}

fn apply_delta<P: ScrollPane>(pane: &mut P, axis: Axis, delta: i32) {
    if delta == 0 {
        return;
    }
    let current = pane.offset(axis) as i64;
    let next = (current + i64::from(delta)).clamp(0, pane.max_offset(axis) as i64);
    pane.set_offset(axis, next as usize);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(hidden: bool) -> PaneGeometry {
        PaneGeometry {
            content_height: 4000,
            client_height: 400,
            content_width: 1200,
            client_width: 600,
            hidden_overflow: hidden,
            ..PaneGeometry::default()
        }
    }

    fn three_bodies() -> (ScrollSynchronizer<PaneGeometry>, [PaneId; 3], Teardown) {
        let mut sync = ScrollSynchronizer::new();
        let left = sync.add_pane(body(true));
        let main = sync.add_pane(body(false));
        let right = sync.add_pane(body(true));
        let handle = sync.sync(&[main, left, right], Axis::Vertical);
        (sync, [left, main, right], handle)
    }

    fn top(sync: &ScrollSynchronizer<PaneGeometry>, id: PaneId) -> Option<usize> {
        sync.pane(id).map(|p| p.top)
    }

    #[test]
    fn driver_offset_propagates_on_frame() {
        let (mut sync, [left, main, right], _handle) = three_bodies();
        if let Some(p) = sync.pane_mut(main) {
            p.top = 320;
        }

        assert_eq!(sync.on_scroll(main), FrameRequest::RequestFrame);
        assert_eq!(top(&sync, left), Some(0), "nothing moves before the frame");

        let written = sync.on_animation_frame();
        assert_eq!(written, vec![left, right]);
        assert_eq!(top(&sync, left), Some(320));
        assert_eq!(top(&sync, right), Some(320));
    }

    #[test]
    fn echo_events_do_not_drive() {
        let (mut sync, [left, main, right], _handle) = three_bodies();
        if let Some(p) = sync.pane_mut(main) {
            p.top = 100;
        }
        sync.on_scroll(main);
        sync.on_animation_frame();

        // Host fires scroll events for the panes we wrote
        assert_eq!(sync.on_scroll(left), FrameRequest::Coalesced);
        assert_eq!(sync.on_scroll(right), FrameRequest::Coalesced);
        assert!(!sync.has_pending_frame());
    }

    #[test]
    fn clamped_write_leaves_no_echo_behind() {
        let mut sync = ScrollSynchronizer::new();
        let tall = sync.add_pane(body(false));
        let short = sync.add_pane(PaneGeometry {
            content_height: 700,
            ..body(false)
        });
        let _handle = sync.sync(&[tall, short], Axis::Vertical);

        fn drive(sync: &mut ScrollSynchronizer<PaneGeometry>, id: PaneId, offset: usize) -> Vec<PaneId> {
            if let Some(p) = sync.pane_mut(id) {
                p.top = offset;
            }
            sync.on_scroll(id);
            let written = sync.on_animation_frame();
            for pane in &written {
                sync.on_scroll(*pane);
            }
            written
        }

        assert_eq!(drive(&mut sync, tall, 500), vec![short]);
        assert_eq!(top(&sync, short), Some(300));
        // Already at its limit: nothing is written, so no event will follow.
        assert!(drive(&mut sync, tall, 600).is_empty());

        assert_eq!(drive(&mut sync, short, 100), vec![tall]);
        assert_eq!(top(&sync, tall), Some(100));
        assert!(!sync.has_pending_frame());
    }

    #[test]
    fn many_events_in_one_frame_propagate_once() {
        let (mut sync, [left, main, _], _handle) = three_bodies();
        for offset in [10, 20, 30] {
            if let Some(p) = sync.pane_mut(main) {
                p.top = offset;
            }
            sync.on_scroll(main);
        }
        sync.on_animation_frame();
        assert_eq!(top(&sync, left), Some(30));
        assert!(sync.on_animation_frame().is_empty());
    }

    #[test]
    fn horizontal_group_mirrors_scroll_left_only() {
        let mut sync = ScrollSynchronizer::new();
        let header = sync.add_pane(body(true));
        let main = sync.add_pane(body(false));
        let _handle = sync.sync(&[main, header], Axis::Horizontal);

        if let Some(p) = sync.pane_mut(main) {
            p.left = 250;
            p.top = 90;
        }
        sync.on_scroll(main);
        sync.on_animation_frame();

        let header = sync.pane(header).copied().unwrap_or_default();
        assert_eq!(header.left, 250);
        assert_eq!(header.top, 0);
    }

    #[test]
    fn wheel_over_hidden_pane_is_redirected_and_consumed() {
        let (mut sync, [left, main, right], _handle) = three_bodies();

        assert_eq!(sync.on_wheel(left, 0, 120), WheelOutcome::Consumed);
        assert_eq!(top(&sync, main), Some(120));

        sync.on_animation_frame();
        assert_eq!(top(&sync, right), Some(120));
        assert_eq!(top(&sync, left), Some(120));
    }

    #[test]
    fn wheel_bubbles_when_destination_has_no_overflow() {
        let mut sync = ScrollSynchronizer::new();
        let short = PaneGeometry {
            content_height: 200,
            client_height: 400,
            ..PaneGeometry::default()
        };
        let left = sync.add_pane(PaneGeometry {
            hidden_overflow: true,
            ..short
        });
        let main = sync.add_pane(short);
        let _handle = sync.sync(&[main, left], Axis::Vertical);

        assert_eq!(sync.on_wheel(left, 0, 120), WheelOutcome::Bubble);
    }

    #[test]
    fn wheel_over_native_pane_is_left_alone() {
        let (mut sync, [_, main, _], _handle) = three_bodies();
        assert_eq!(sync.on_wheel(main, 0, 50), WheelOutcome::Native);
        assert_eq!(top(&sync, main), Some(0));
    }

    #[test]
    fn wheel_clamps_to_content() {
        let (mut sync, [left, main, _], _handle) = three_bodies();
        sync.on_wheel(left, 0, -500);
        assert_eq!(top(&sync, main), Some(0));
        sync.on_wheel(left, 0, 100_000);
        assert_eq!(top(&sync, main), Some(3600));
    }

    #[test]
    fn teardown_is_idempotent_and_stops_sync() {
        let (mut sync, [left, main, _], mut handle) = three_bodies();
        assert!(handle.run(&mut sync));
        assert!(!handle.run(&mut sync));
        assert!(handle.is_done());
        assert_eq!(sync.group_count(), 0);

        if let Some(p) = sync.pane_mut(main) {
            p.top = 500;
        }
        sync.on_scroll(main);
        sync.on_animation_frame();
        assert_eq!(top(&sync, left), Some(0));
        assert_eq!(sync.on_wheel(left, 0, 10), WheelOutcome::Bubble);
    }
}
