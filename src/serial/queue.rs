//! Single-consumer job queue with pause and cancel.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

/// Queued runtime call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Job<E> {
    Start,
    Process(E),
}

struct QueueState<E> {
    jobs: VecDeque<Job<E>>,
    paused: bool,
    closed: bool,
}

/// FIFO of runtime calls waiting for the worker.
///
/// While paused, jobs accumulate but are not handed out. Closing wakes the
/// worker and makes it exit; anything still queued is dropped.
pub(crate) struct JobQueue<E> {
    state: Mutex<QueueState<E>>,
    ready: Condvar,
}

impl<E> JobQueue<E> {
    pub(crate) fn new(paused: bool) -> Self {
        Self {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                paused,
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Append a job. Returns `false` if the queue is closed.
    pub(crate) fn push(&self, job: Job<E>) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        state.jobs.push_back(job);
        if !state.paused {
            self.ready.notify_one();
        }
        true
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        let mut state = self.state.lock();
        state.paused = paused;
        if !paused {
            self.ready.notify_all();
        }
    }

    /// Drop every queued job. Returns how many were dropped.
    pub(crate) fn cancel_all(&self) -> usize {
        let mut state = self.state.lock();
        let dropped = state.jobs.len();
        state.jobs.clear();
        dropped
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().jobs.len()
    }

    pub(crate) fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.jobs.clear();
        self.ready.notify_all();
    }

    /// Block until a job is runnable or the queue closes.
    ///
    /// Returns `false` once closed. A `true` result is only a hint: the job
    /// may be cancelled or the queue paused before [`pop`](Self::pop).
    pub(crate) fn wait_ready(&self) -> bool {
        let mut state = self.state.lock();
        while !state.closed && (state.paused || state.jobs.is_empty()) {
            self.ready.wait(&mut state);
        }
        !state.closed
    }

    /// Take the next job unless paused or closed.
    pub(crate) fn pop(&self) -> Option<Job<E>> {
        let mut state = self.state.lock();
        if state.paused || state.closed {
            return None;
        }
        state.jobs.pop_front()
    }
}
