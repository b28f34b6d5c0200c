//! Weak handle for feeding a serial machine from inside its own handlers.

use crate::serial::queue::{Job, JobQueue};
use std::fmt;
use std::sync::Weak;

/// Cloneable, non-owning handle to a [`SerialMachine`](super::SerialMachine)'s queue.
///
/// Handlers registered on a serial machine run on its worker thread with the
/// engine locked, so they must not call the machine's locking accessors. This
/// handle only touches the queue: events posted through it are enqueued behind
/// whatever is already waiting, exactly like a call from any other thread.
///
/// The handle does not keep the machine alive. Once the machine is dropped,
/// posts are ignored and return `false`.
pub struct SerialHandle<E> {
    queue: Weak<JobQueue<E>>,
}

impl<E> SerialHandle<E> {
    pub(crate) fn new(queue: Weak<JobQueue<E>>) -> Self {
        Self { queue }
    }

    /// Enqueue an event. Returns `false` if the machine is gone.
    pub fn process_event(&self, event: E) -> bool {
        self.push(Job::Process(event))
    }

    /// Enqueue a start. Returns `false` if the machine is gone.
    pub fn start(&self) -> bool {
        self.push(Job::Start)
    }

    /// Drop queued jobs that have not started running.
    pub fn cancel_all_events(&self) -> usize {
        self.queue.upgrade().map_or(0, |queue| queue.cancel_all())
    }

    pub fn is_alive(&self) -> bool {
        self.queue.strong_count() > 0
    }

    fn push(&self, job: Job<E>) -> bool {
        match self.queue.upgrade() {
            Some(queue) => queue.push(job),
            None => {
                tracing::debug!(target: "switchyard", "post ignored: serial machine dropped");
                false
            }
        }
    }
}

impl<E> Clone for SerialHandle<E> {
    fn clone(&self) -> Self {
        Self {
            queue: Weak::clone(&self.queue),
        }
    }
}

impl<E> fmt::Debug for SerialHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
