//! Clear-then-set timer, driven by host-supplied instants.

use std::time::{Duration, Instant};

/// A single-shot timer that is re-armed (never duplicated) on every call to
/// [`Debouncer::arm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create an idle debouncer with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Cancel any pending deadline and start a new one from `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns `true` exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Cancel the pending deadline. Returns whether one was armed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Whether a deadline is armed.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}
