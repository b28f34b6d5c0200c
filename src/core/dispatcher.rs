//! Deferred event inbox for handler-driven cascades.
//!
//! Handlers run while the engine holds `&mut self`, so they cannot call
//! `process_event` on it directly. Instead they post through a `Dispatcher`
//! and the engine drains the inbox iteratively once the current dispatch
//! completes. A chain of N handler-triggered transitions therefore runs in
//! constant stack depth, in the same order synchronous recursion would give
//! for a linear chain.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Cloneable handle that queues events for the owning [`Machine`](crate::Machine).
///
/// Posted events are drained at the end of the next `start` or
/// `process_event`. Posting while the engine is idle does not dispatch
/// anything by itself. `terminate`, `set_states` and a `start` that fails
/// with `NoInitialState` discard whatever is waiting.
///
/// # Example
///
/// ```rust
/// use switchyard::Machine;
///
/// let mut machine: Machine<u8, u8> = Machine::new();
/// machine.set_states([1, 2, 3]).unwrap();
/// machine.set_terminal_states(1, Some(3)).unwrap();
/// machine.add_transition(1, 2, 12, None).unwrap();
/// machine.add_transition(2, 3, 23, None).unwrap();
///
/// let dispatcher = machine.dispatcher();
/// machine
///     .add_enter_handler(2, move |_, _| dispatcher.post(23))
///     .unwrap();
///
/// machine.start();
/// machine.process_event(12);
///
/// assert_eq!(machine.current_state(), Some(&3));
/// assert!(!machine.is_started());
/// ```
pub struct Dispatcher<E> {
    inbox: Arc<Mutex<VecDeque<E>>>,
}

impl<E> Dispatcher<E> {
    pub(crate) fn new() -> Self {
        Self {
            inbox: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Queue an event behind any already-posted ones.
    pub fn post(&self, event: E) {
        self.inbox.lock().push_back(event);
    }

    /// Number of posted events not yet processed.
    pub fn pending(&self) -> usize {
        self.inbox.lock().len()
    }

    // The guard must drop before the caller dispatches, or a handler posting
    // from inside that dispatch would deadlock.
    pub(crate) fn take_next(&self) -> Option<E> {
        self.inbox.lock().pop_front()
    }

    pub(crate) fn clear(&self) -> usize {
        let mut inbox = self.inbox.lock();
        let dropped = inbox.len();
        inbox.clear();
        dropped
    }
}

impl<E> Clone for Dispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            inbox: Arc::clone(&self.inbox),
        }
    }
}

impl<E> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posts_are_fifo() {
        let dispatcher = Dispatcher::new();
        dispatcher.post(1);
        dispatcher.post(2);
        dispatcher.post(3);

        assert_eq!(dispatcher.pending(), 3);
        assert_eq!(dispatcher.take_next(), Some(1));
        assert_eq!(dispatcher.take_next(), Some(2));
        assert_eq!(dispatcher.take_next(), Some(3));
        assert_eq!(dispatcher.take_next(), None);
    }

    #[test]
    fn clones_share_one_inbox() {
        let dispatcher = Dispatcher::new();
        let clone = dispatcher.clone();
        clone.post("a");

        assert_eq!(dispatcher.pending(), 1);
        assert_eq!(dispatcher.clear(), 1);
        assert_eq!(clone.pending(), 0);
    }
}
