//! Thread-safe facade over one engine, driven by a single worker thread.

use crate::core::{Event, FsmError, Guard, Machine, State, StateHistory};
use crate::logger::Logger;
use crate::serial::handle::SerialHandle;
use crate::serial::queue::{Job, JobQueue};
use parking_lot::{Mutex, MutexGuard};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

/// Worker configuration for [`SerialMachine`].
#[derive(Debug, Clone)]
pub struct SerialOptions {
    /// Name given to the worker thread.
    pub thread_name: String,
    /// Start with the queue paused.
    pub start_paused: bool,
}

impl Default for SerialOptions {
    fn default() -> Self {
        Self {
            thread_name: "switchyard-worker".to_string(),
            start_paused: false,
        }
    }
}

/// Serializing facade around a [`Machine`].
///
/// `start` and `process_event` are queued onto one worker thread and return
/// immediately. `terminate` runs on the calling thread under the engine lock
/// and then cancels whatever is still queued. Read accessors take the same
/// lock, so they observe the engine between operations, never mid-transition.
///
/// Handlers run on the worker thread while the engine is locked. From inside
/// a handler, use a [`SerialHandle`] to post follow-up events; calling
/// `is_started`, `current_state`, `terminate` or a configuration method on
/// the same machine from a handler deadlocks.
///
/// Dropping the machine closes the queue, discards pending jobs and joins the
/// worker.
///
/// # Example
///
/// ```rust
/// use switchyard::{Machine, SerialMachine};
/// use std::time::{Duration, Instant};
///
/// let machine: SerialMachine<u8, u8> = SerialMachine::new(Machine::new()).unwrap();
/// machine.set_states([1, 2]).unwrap();
/// machine.set_terminal_states(1, Some(2)).unwrap();
/// machine.add_transition(1, 2, 12, None).unwrap();
///
/// machine.start();
/// machine.process_event(12);
///
/// let deadline = Instant::now() + Duration::from_secs(2);
/// while machine.current_state() != Some(2) && Instant::now() < deadline {
///     std::thread::sleep(Duration::from_millis(5));
/// }
/// assert_eq!(machine.current_state(), Some(2));
/// assert!(!machine.is_started());
/// ```
pub struct SerialMachine<S: State, E: Event> {
    machine: Arc<Mutex<Machine<S, E>>>,
    queue: Arc<JobQueue<E>>,
    worker: Option<JoinHandle<()>>,
    worker_id: ThreadId,
}

impl<S: State, E: Event> SerialMachine<S, E> {
    /// Wrap `machine` and spawn its worker with default options.
    pub fn new(machine: Machine<S, E>) -> Result<Self, FsmError> {
        Self::with_options(machine, SerialOptions::default())
    }

    pub fn with_options(machine: Machine<S, E>, options: SerialOptions) -> Result<Self, FsmError> {
        let machine = Arc::new(Mutex::new(machine));
        let queue = Arc::new(JobQueue::new(options.start_paused));

        let worker = {
            let machine = Arc::clone(&machine);
            let queue = Arc::clone(&queue);
            thread::Builder::new()
                .name(options.thread_name.clone())
                .spawn(move || run_worker(machine, queue))
                .map_err(|e| {
                    FsmError::Unexpected(format!(
                        "failed to spawn worker '{}': {e}",
                        options.thread_name
                    ))
                })?
        };
        let worker_id = worker.thread().id();

        tracing::debug!(
            target: "switchyard",
            thread = %options.thread_name,
            paused = options.start_paused,
            "serial machine worker started"
        );

        Ok(Self {
            machine,
            queue,
            worker: Some(worker),
            worker_id,
        })
    }

    // Setup, applied directly under the engine lock

    pub fn set_states<I>(&self, states: I) -> Result<(), FsmError>
    where
        I: IntoIterator<Item = S>,
    {
        self.machine.lock().set_states(states)
    }

    pub fn set_terminal_states(&self, initial: S, finish: Option<S>) -> Result<(), FsmError> {
        self.machine.lock().set_terminal_states(initial, finish)
    }

    pub fn add_enter_handler<F>(&self, state: S, handler: F) -> Result<(), FsmError>
    where
        F: Fn(&S, Option<&E>) + Send + Sync + 'static,
    {
        self.machine.lock().add_enter_handler(state, handler)
    }

    pub fn add_leave_handler<F>(&self, state: S, handler: F) -> Result<(), FsmError>
    where
        F: Fn(&S, Option<&E>) + Send + Sync + 'static,
    {
        self.machine.lock().add_leave_handler(state, handler)
    }

    pub fn add_no_transition_handler<F>(&self, state: S, handler: F) -> Result<(), FsmError>
    where
        F: Fn(&S, Option<&E>) + Send + Sync + 'static,
    {
        self.machine.lock().add_no_transition_handler(state, handler)
    }

    pub fn add_transition(
        &self,
        from: S,
        to: S,
        event: E,
        guard: Option<Guard<S, E>>,
    ) -> Result<(), FsmError> {
        self.machine.lock().add_transition(from, to, event, guard)
    }

    pub fn set_global_no_transition_handler<F>(&self, handler: F)
    where
        F: Fn(&S, Option<&E>) + Send + Sync + 'static,
    {
        self.machine.lock().set_global_no_transition_handler(handler);
    }

    pub fn set_finish_handler<F>(&self, handler: F)
    where
        F: Fn(&S, bool) + Send + Sync + 'static,
    {
        self.machine.lock().set_finish_handler(handler);
    }

    pub fn set_error_handler<F>(&self, handler: F)
    where
        F: Fn(&FsmError) + Send + Sync + 'static,
    {
        self.machine.lock().set_error_handler(handler);
    }

    pub fn set_logger<L>(&self, logger: L)
    where
        L: Logger + 'static,
    {
        self.machine.lock().set_logger(logger);
    }

    pub fn logger(&self) -> Arc<dyn Logger> {
        self.machine.lock().logger()
    }

    // Runtime

    /// Queue a `start`. Returns immediately.
    pub fn start(&self) {
        self.enqueue(Job::Start);
    }

    /// Queue an event. Returns immediately.
    pub fn process_event(&self, event: E) {
        self.enqueue(Job::Process(event));
    }

    /// Terminate synchronously, then cancel everything still queued.
    ///
    /// Waits for at most the one operation the worker may be running. When
    /// this returns the machine is stopped.
    pub fn terminate(&self) {
        let mut machine = self.machine.lock();
        machine.terminate();
        let dropped = self.queue.cancel_all();
        tracing::debug!(target: "switchyard", dropped, "serial machine terminated");
    }

    /// Discard queued jobs that have not started running.
    ///
    /// A job the worker is already executing completes normally.
    pub fn cancel_all_events(&self) -> usize {
        let dropped = self.queue.cancel_all();
        tracing::debug!(target: "switchyard", dropped, "cancelled queued events");
        dropped
    }

    pub fn is_paused(&self) -> bool {
        self.queue.is_paused()
    }

    /// Suspend or resume the worker. Jobs queued while paused run in order
    /// once resumed.
    pub fn set_paused(&self, paused: bool) {
        tracing::debug!(target: "switchyard", paused, "serial machine pause toggled");
        self.queue.set_paused(paused);
    }

    /// Jobs waiting for the worker.
    pub fn pending_jobs(&self) -> usize {
        self.queue.len()
    }

    /// Handle for posting from handlers or other threads without owning the machine.
    pub fn handle(&self) -> SerialHandle<E> {
        SerialHandle::new(Arc::downgrade(&self.queue))
    }

    // Accessors, under the engine lock

    pub fn is_started(&self) -> bool {
        self.machine.lock().is_started()
    }

    pub fn current_state(&self) -> Option<S> {
        self.machine.lock().current_state().cloned()
    }

    /// Snapshot of the transition history.
    pub fn history(&self) -> StateHistory<S, E> {
        self.machine.lock().history().clone()
    }

    fn enqueue(&self, job: Job<E>) {
        if !self.queue.push(job) {
            tracing::warn!(target: "switchyard", "job rejected: queue closed");
        }
    }
}

impl<S: State, E: Event> Drop for SerialMachine<S, E> {
    fn drop(&mut self) {
        self.queue.close();
        if let Some(worker) = self.worker.take() {
            if thread::current().id() == self.worker_id {
                return;
            }
            if worker.join().is_err() {
                tracing::error!(target: "switchyard", "serial machine worker panicked");
            }
        }
    }
}

impl<S: State, E: Event> fmt::Debug for SerialMachine<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialMachine")
            .field("paused", &self.is_paused())
            .field("pending_jobs", &self.pending_jobs())
            .finish_non_exhaustive()
    }
}

fn run_worker<S: State, E: Event>(machine: Arc<Mutex<Machine<S, E>>>, queue: Arc<JobQueue<E>>) {
    while queue.wait_ready() {
        let mut machine = machine.lock();
        // Popping under the engine lock means terminate() never races a job
        // that has left the queue but not yet run.
        let Some(job) = queue.pop() else {
            continue;
        };

        tracing::trace!(target: "switchyard", ?job, "running queued job");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match job {
            Job::Start => machine.start(),
            Job::Process(event) => machine.process_event(event),
        }));
        if let Err(payload) = outcome {
            let message = panic_message(payload.as_ref());
            tracing::error!(target: "switchyard", %message, "handler panicked");
            machine.recover_after_panic();
            machine.report(FsmError::Unexpected(format!("handler panicked: {message}")));
        }
        // Hand the engine to a blocked caller before taking the next job.
        MutexGuard::unlock_fair(machine);
    }
    tracing::debug!(target: "switchyard", "serial machine worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
