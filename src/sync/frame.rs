//! Per-frame coalescing of scroll-driven work.
//!
//! At most one recomputation runs per animation frame. A new request that
//! arrives while a frame is pending overwrites the pending target instead of
//! queueing another one (last writer wins).

/// Pending-frame flag carrying the latest requested target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameGate<T> {
    pending: Option<T>,
    coalesced: u64,
}

/// What the caller must do after [`FrameGate::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// No frame was pending; the host must request an animation frame.
    RequestFrame,
    /// A frame is already pending; its target was replaced.
    Coalesced,
}

impl<T> FrameGate<T> {
    /// Create a gate with nothing pending.
    pub fn new() -> Self {
        Self {
            pending: None,
            coalesced: 0,
        }
    }

    /// Record `target` for the next frame.
    pub fn schedule(&mut self, target: T) -> FrameRequest {
        match self.pending.replace(target) {
            Some(_) => {
                self.coalesced += 1;
                FrameRequest::Coalesced
            }
            None => FrameRequest::RequestFrame,
        }
    }

    /// Take the pending target when the frame fires.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Drop the pending target without running it. Returns whether one existed.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Whether a frame is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Peek at the pending target.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    /// How many requests were folded into an already pending frame.
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }
}

impl<T> Default for FrameGate<T> {
    fn default() -> Self {
        Self::new()
    }
}
