//! Explicit publish/subscribe notification for grid state containers.
//!
//! State containers (column layout, scroll state, the grid facade) own a
//! [`Subscribers`] list and call [`Subscribers::emit`] after every mutation.
//! Dependents recompute in their callbacks; nothing is tracked implicitly.

use std::fmt;

/// Handle returned by [`Subscribers::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Ordered list of listeners for events of type `E`.
pub struct Subscribers<E> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Box<dyn FnMut(&E)>)>,
}

impl<E> Subscribers<E> {
    /// Create an empty listener list.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    /// Register a listener. Listeners are called in registration order.
    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Deliver an event to every listener.
    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Drop every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True when nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
