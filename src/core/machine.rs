//! The synchronous transition and dispatch engine.

use crate::core::dispatcher::Dispatcher;
use crate::core::error::FsmError;
use crate::core::guard::Guard;
use crate::core::handlers::{
    run_all, ErrorHandler, FinishHandler, HandlerKind, HandlerSet, StateHandler,
};
use crate::core::history::{StateHistory, TransitionRecord};
use crate::core::state::{Event, State};
use crate::core::transition::{select, Transition};
use crate::logger::{Logger, TracingLogger};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Outgoing transitions and handlers of one configured state.
struct StateDefinition<S, E> {
    outgoing: HashMap<E, Vec<Transition<S, E>>>,
    handlers: HandlerSet<S, E>,
}

impl<S, E> StateDefinition<S, E> {
    fn new() -> Self {
        Self {
            outgoing: HashMap::new(),
            handlers: HandlerSet::new(),
        }
    }
}

/// Finite state machine engine.
///
/// Lifecycle: configure (`set_states`, `set_terminal_states`, handlers and
/// transitions), then `start`, any number of `process_event` calls, and
/// finally reaching the finish state or calling `terminate`. A finished or
/// terminated machine can be started again with the same configuration.
///
/// Configuration calls return errors to the caller. Runtime calls report
/// errors through the error handler and otherwise leave the machine unchanged.
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
/// machine.start();
/// machine.process_event(12);
/// assert_eq!(machine.current_state(), Some(&2));
///
/// machine.process_event(23);
/// assert_eq!(machine.current_state(), Some(&3));
/// assert!(!machine.is_started());
/// ```
pub struct Machine<S: State, E: Event> {
    states: HashMap<S, StateDefinition<S, E>>,
    initial: Option<S>,
    finish: Option<S>,
    current: Option<S>,
    started: bool,
    no_transition_handler: Option<StateHandler<S, E>>,
    finish_handler: Option<FinishHandler<S>>,
    error_handler: Option<ErrorHandler>,
    logger: Arc<dyn Logger>,
    inbox: Dispatcher<E>,
    history: StateHistory<S, E>,
}

impl<S: State, E: Event> Machine<S, E> {
    /// Create an unconfigured machine that logs through [`TracingLogger`].
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            initial: None,
            finish: None,
            current: None,
            started: false,
            no_transition_handler: None,
            finish_handler: None,
            error_handler: None,
            logger: Arc::new(TracingLogger),
            inbox: Dispatcher::new(),
            history: StateHistory::default(),
        }
    }

    // Setup

    /// Replace the whole configuration with a fresh state set.
    ///
    /// Transitions, per-state handlers, terminal states, the current state and
    /// history are all cleared. Global handlers and the logger are kept.
    pub fn set_states<I>(&mut self, states: I) -> Result<(), FsmError>
    where
        I: IntoIterator<Item = S>,
    {
        self.ensure_stopped()?;

        self.states = states
            .into_iter()
            .map(|state| (state, StateDefinition::new()))
            .collect();
        self.initial = None;
        self.finish = None;
        self.current = None;
        self.history.clear();
        self.inbox.clear();
        Ok(())
    }

    /// Choose the state a run starts in and, optionally, the one that ends it.
    ///
    /// Both must already be configured. Without a finish state a run only
    /// ends through [`terminate`](Self::terminate).
    pub fn set_terminal_states(&mut self, initial: S, finish: Option<S>) -> Result<(), FsmError> {
        self.ensure_stopped()?;
        self.ensure_known(&initial)?;
        if let Some(finish) = &finish {
            self.ensure_known(finish)?;
        }

        self.initial = Some(initial);
        self.finish = finish;
        Ok(())
    }

    /// Append a handler run after the machine enters `state`.
    pub fn add_enter_handler<F>(&mut self, state: S, handler: F) -> Result<(), FsmError>
    where
        F: Fn(&S, Option<&E>) + Send + Sync + 'static,
    {
        self.push_handler(HandlerKind::Enter, state, Box::new(handler))
    }

    /// Append a handler run before the machine leaves `state`.
    ///
    /// Self-loops run leave handlers too.
    pub fn add_leave_handler<F>(&mut self, state: S, handler: F) -> Result<(), FsmError>
    where
        F: Fn(&S, Option<&E>) + Send + Sync + 'static,
    {
        self.push_handler(HandlerKind::Leave, state, Box::new(handler))
    }

    /// Add a handler that runs when `state` has no eligible transition for an
    /// event. While a state has any of these, the global handler is skipped.
    pub fn add_no_transition_handler<F>(&mut self, state: S, handler: F) -> Result<(), FsmError>
    where
        F: Fn(&S, Option<&E>) + Send + Sync + 'static,
    {
        self.push_handler(HandlerKind::NoTransition, state, Box::new(handler))
    }

    pub(crate) fn push_handler(
        &mut self,
        kind: HandlerKind,
        state: S,
        handler: StateHandler<S, E>,
    ) -> Result<(), FsmError> {
        self.ensure_stopped()?;
        let definition = self
            .states
            .get_mut(&state)
            .ok_or_else(|| FsmError::unknown_state(&state))?;
        definition.handlers.push(kind, handler);
        Ok(())
    }

    /// Append a transition to the sequence keyed by `(from, event)`.
    ///
    /// Transitions sharing a key are tried in registration order and the first
    /// one whose guard is absent or passes wins.
    pub fn add_transition(
        &mut self,
        from: S,
        to: S,
        event: E,
        guard: Option<Guard<S, E>>,
    ) -> Result<(), FsmError> {
        self.ensure_stopped()?;
        self.ensure_known(&to)?;
        let definition = self
            .states
            .get_mut(&from)
            .ok_or_else(|| FsmError::unknown_state(&from))?;

        definition
            .outgoing
            .entry(event)
            .or_default()
            .push(Transition::new(to, guard));
        Ok(())
    }

    /// Fallback used when the current state has no no-transition handlers.
    pub fn set_global_no_transition_handler<F>(&mut self, handler: F)
    where
        F: Fn(&S, Option<&E>) + Send + Sync + 'static,
    {
        self.no_transition_handler = Some(Box::new(handler));
    }

    /// Called once per run with the final state and whether the run was
    /// terminated rather than finished.
    pub fn set_finish_handler<F>(&mut self, handler: F)
    where
        F: Fn(&S, bool) + Send + Sync + 'static,
    {
        self.finish_handler = Some(Box::new(handler));
    }

    /// Receives runtime errors from `start` and `process_event`.
    pub fn set_error_handler<F>(&mut self, handler: F)
    where
        F: Fn(&FsmError) + Send + Sync + 'static,
    {
        self.error_handler = Some(Box::new(handler));
    }

    /// Replace the logger used for trace lines and unhandled fallbacks.
    pub fn set_logger<L>(&mut self, logger: L)
    where
        L: Logger + 'static,
    {
        self.logger = Arc::new(logger);
    }

    pub(crate) fn set_shared_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = logger;
    }

    /// Shared handle to the current logger.
    pub fn logger(&self) -> Arc<dyn Logger> {
        Arc::clone(&self.logger)
    }

    /// Set how many transitions the history keeps. Zero disables it.
    pub fn set_history_capacity(&mut self, capacity: usize) {
        self.history.set_capacity(capacity);
    }

    // Runtime

    /// Enter the initial state and begin a run.
    ///
    /// Enter handlers of the initial state receive `None` as the event. Events
    /// posted through the dispatcher are drained afterwards.
    ///
    /// Calling this on a running machine reports `AlreadyStarted` and still
    /// drains posted events, since the run they belong to is live. With no
    /// initial state, `NoInitialState` is reported and posted events are
    /// discarded.
    pub fn start(&mut self) {
        if self.started {
            self.report(FsmError::AlreadyStarted);
            self.drain_pending();
            return;
        }
        let Some(initial) = self.initial.clone() else {
            self.report(FsmError::NoInitialState);
            self.discard_pending("start");
            return;
        };

        self.logger
            .debug_log(&format!("start: entering initial state {initial:?}"));
        self.started = true;
        self.history.clear();
        self.current = Some(initial.clone());
        if let Some(definition) = self.states.get(&initial) {
            run_all(&definition.handlers.enter, &initial, None);
        }

        self.drain_pending();
    }

    /// Feed one event, then drain any events handlers posted meanwhile.
    pub fn process_event(&mut self, event: E) {
        self.dispatch(event);
        self.drain_pending();
    }

    /// End the run, firing the finish handler with `is_terminating = true`.
    ///
    /// Does nothing when the machine is not started. Undrained posted events
    /// are discarded.
    pub fn terminate(&mut self) {
        if !self.started {
            return;
        }
        self.discard_pending("terminate");
        self.finish_run(true);
    }

    /// Bring the machine back to a consistent point after a handler unwound
    /// out of `start` or `process_event`.
    ///
    /// A transition interrupted after the state switch has no history record.
    /// Posted events are discarded, and a run left sitting in the finish state
    /// is finished.
    pub(crate) fn recover_after_panic(&mut self) {
        self.discard_pending("recover");
        if self.started && self.finish.is_some() && self.current == self.finish {
            self.finish_run(false);
        }
    }

    // Accessors

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn current_state(&self) -> Option<&S> {
        self.current.as_ref()
    }

    pub fn initial_state(&self) -> Option<&S> {
        self.initial.as_ref()
    }

    pub fn finish_state(&self) -> Option<&S> {
        self.finish.as_ref()
    }

    pub fn contains_state(&self, state: &S) -> bool {
        self.states.contains_key(state)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Transitions selected during the current (or last) run.
    pub fn history(&self) -> &StateHistory<S, E> {
        &self.history
    }

    /// Handle for posting events from inside handlers.
    pub fn dispatcher(&self) -> Dispatcher<E> {
        self.inbox.clone()
    }

    /// Events posted through the dispatcher and not yet processed.
    pub fn pending_events(&self) -> usize {
        self.inbox.pending()
    }

    // Internals

    fn ensure_stopped(&self) -> Result<(), FsmError> {
        if self.started {
            Err(FsmError::AlreadyStarted)
        } else {
            Ok(())
        }
    }

    fn ensure_known(&self, state: &S) -> Result<(), FsmError> {
        if self.states.contains_key(state) {
            Ok(())
        } else {
            Err(FsmError::unknown_state(state))
        }
    }

    fn discard_pending(&self, operation: &str) {
        let dropped = self.inbox.clear();
        if dropped > 0 {
            self.logger
                .debug_log(&format!("{operation}: discarded {dropped} posted event(s)"));
        }
    }

    fn drain_pending(&mut self) {
        while let Some(event) = self.inbox.take_next() {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: E) {
        self.logger.debug_log(&format!(
            "process: event({event:?}), started({}), current({:?})",
            self.started, self.current
        ));

        if !self.started {
            self.report(FsmError::NotStarted);
            return;
        }
        let Some(state) = self.current.clone() else {
            self.report(FsmError::Unexpected("started without a current state".into()));
            return;
        };
        let Some(definition) = self.states.get(&state) else {
            self.report(FsmError::Unexpected(format!(
                "no definition for current state {state:?}"
            )));
            return;
        };

        // A missing entry for the event behaves like an empty sequence.
        let target = definition
            .outgoing
            .get(&event)
            .and_then(|candidates| select(candidates, &state, &event))
            .map(|transition| transition.target.clone());

        match target {
            Some(target) => self.change_state(state, target, event),
            None => self.handle_unmatched(&state, &event),
        }

        if self.finish.is_some() && self.current == self.finish {
            self.finish_run(false);
        }
    }

    /// Leave handlers of the old state, then the switch, then enter handlers
    /// of the new state.
    fn change_state(&mut self, from: S, to: S, event: E) {
        self.logger
            .debug_log(&format!("State changed from {from:?} to {to:?}"));

        if let Some(definition) = self.states.get(&from) {
            run_all(&definition.handlers.leave, &from, Some(&event));
        }

        self.current = Some(to.clone());

        if let Some(definition) = self.states.get(&to) {
            run_all(&definition.handlers.enter, &to, Some(&event));
        }

        self.history
            .record(TransitionRecord::new(from, to, event));
    }

    fn handle_unmatched(&self, state: &S, event: &E) {
        let per_state = self
            .states
            .get(state)
            .map(|definition| definition.handlers.no_transition.as_slice())
            .unwrap_or_default();

        if !per_state.is_empty() {
            run_all(per_state, state, Some(event));
        } else if let Some(handler) = &self.no_transition_handler {
            handler(state, Some(event));
        } else {
            self.logger.debug_log(&format!(
                "No transition from state {state:?} with event {event:?}"
            ));
        }
    }

    fn finish_run(&mut self, is_terminating: bool) {
        let Some(state) = self.current.clone() else {
            self.started = false;
            return;
        };

        match &self.finish_handler {
            Some(handler) => handler(&state, is_terminating),
            None => self.logger.debug_log(&format!(
                "Machine finished with state {state:?}, terminating {is_terminating}"
            )),
        }
        self.started = false;
    }

    /// Deliver a runtime error to the error handler, or log it when none is set.
    pub(crate) fn report(&self, error: FsmError) {
        match &self.error_handler {
            Some(handler) => handler(&error),
            None => self.logger.debug_log(&format!("Unexpected error: {error}")),
        }
    }
}

impl<S: State, E: Event> Default for Machine<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E: Event> fmt::Debug for Machine<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("states", &self.states.len())
            .field("initial", &self.initial)
            .field("finish", &self.finish)
            .field("current", &self.current)
            .field("started", &self.started)
            .field("pending", &self.inbox.pending())
            .finish_non_exhaustive()
    }
}
