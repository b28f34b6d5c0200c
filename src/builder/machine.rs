//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::core::{
    ErrorHandler, Event, FinishHandler, FsmError, Guard, HandlerKind, Machine, State,
    StateHandler,
};
use crate::logger::Logger;
use std::sync::Arc;

struct PendingTransition<S, E> {
    from: S,
    to: S,
    event: E,
    guard: Option<Guard<S, E>>,
}

/// Builder for constructing a [`Machine`] with a fluent API.
///
/// Declarations are collected first and applied through the machine's own
/// validated setters on [`build`](Self::build), so the same errors surface.
///
/// # Example
///
/// ```rust
/// use switchyard::MachineBuilder;
///
/// let mut machine = MachineBuilder::<&str, &str>::new()
///     .states(["idle", "running", "done"])
///     .initial("idle")
///     .finish("done")
///     .transition("idle", "running", "go")
///     .transition("running", "done", "stop")
///     .build()
///     .unwrap();
///
/// machine.start();
/// machine.process_event("go");
/// assert_eq!(machine.current_state(), Some(&"running"));
/// ```
pub struct MachineBuilder<S: State, E: Event> {
    states: Vec<S>,
    initial: Option<S>,
    finish: Option<S>,
    transitions: Vec<PendingTransition<S, E>>,
    handlers: Vec<(HandlerKind, S, StateHandler<S, E>)>,
    no_transition_handler: Option<StateHandler<S, E>>,
    finish_handler: Option<FinishHandler<S>>,
    error_handler: Option<ErrorHandler>,
    logger: Option<Arc<dyn Logger>>,
    history_capacity: Option<usize>,
}

impl<S: State, E: Event> MachineBuilder<S, E> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            initial: None,
            finish: None,
            transitions: Vec::new(),
            handlers: Vec::new(),
            no_transition_handler: None,
            finish_handler: None,
            error_handler: None,
            logger: None,
            history_capacity: None,
        }
    }

    /// Declare one state.
    pub fn state(mut self, state: S) -> Self {
        self.states.push(state);
        self
    }

    /// Declare several states at once.
    pub fn states<I>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        self.states.extend(states);
        self
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the finish state (optional).
    pub fn finish(mut self, state: S) -> Self {
        self.finish = Some(state);
        self
    }

    /// Add an unguarded transition.
    pub fn transition(mut self, from: S, to: S, event: E) -> Self {
        self.transitions.push(PendingTransition {
            from,
            to,
            event,
            guard: None,
        });
        self
    }

    /// Add a transition gated by a predicate over `(from, to, event)`.
    pub fn guarded_transition<F>(mut self, from: S, to: S, event: E, guard: F) -> Self
    where
        F: Fn(&S, &S, &E) -> bool + Send + Sync + 'static,
    {
        self.transitions.push(PendingTransition {
            from,
            to,
            event,
            guard: Some(Guard::new(guard)),
        });
        self
    }

    pub fn on_enter<F>(self, state: S, handler: F) -> Self
    where
        F: Fn(&S, Option<&E>) + Send + Sync + 'static,
    {
        self.handler(HandlerKind::Enter, state, Box::new(handler))
    }

    pub fn on_leave<F>(self, state: S, handler: F) -> Self
    where
        F: Fn(&S, Option<&E>) + Send + Sync + 'static,
    {
        self.handler(HandlerKind::Leave, state, Box::new(handler))
    }

    pub fn on_no_transition<F>(self, state: S, handler: F) -> Self
    where
        F: Fn(&S, Option<&E>) + Send + Sync + 'static,
    {
        self.handler(HandlerKind::NoTransition, state, Box::new(handler))
    }

    /// Set the global no-transition fallback.
    pub fn on_unhandled<F>(mut self, handler: F) -> Self
    where
        F: Fn(&S, Option<&E>) + Send + Sync + 'static,
    {
        self.no_transition_handler = Some(Box::new(handler));
        self
    }

    pub fn on_finish<F>(mut self, handler: F) -> Self
    where
        F: Fn(&S, bool) + Send + Sync + 'static,
    {
        self.finish_handler = Some(Box::new(handler));
        self
    }

    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&FsmError) + Send + Sync + 'static,
    {
        self.error_handler = Some(Box::new(handler));
        self
    }

    pub fn logger<L>(mut self, logger: L) -> Self
    where
        L: Logger + 'static,
    {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Set how many transitions the history keeps. Zero disables it.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    fn handler(mut self, kind: HandlerKind, state: S, handler: StateHandler<S, E>) -> Self {
        self.handlers.push((kind, state, handler));
        self
    }

    /// Build the machine.
    /// Returns an error if required fields are missing or a declaration
    /// references an undeclared state.
    pub fn build(self) -> Result<Machine<S, E>, BuildError> {
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        let mut machine = Machine::new();
        if let Some(logger) = self.logger {
            machine.set_shared_logger(logger);
        }
        if let Some(capacity) = self.history_capacity {
            machine.set_history_capacity(capacity);
        }

        machine.set_states(self.states)?;
        machine.set_terminal_states(initial, self.finish)?;

        for pending in self.transitions {
            machine.add_transition(pending.from, pending.to, pending.event, pending.guard)?;
        }
        for (kind, state, handler) in self.handlers {
            machine.push_handler(kind, state, handler)?;
        }

        if let Some(handler) = self.no_transition_handler {
            machine.set_global_no_transition_handler(handler);
        }
        if let Some(handler) = self.finish_handler {
            machine.set_finish_handler(handler);
        }
        if let Some(handler) = self.error_handler {
            machine.set_error_handler(handler);
        }

        Ok(machine)
    }
}

impl<S: State, E: Event> Default for MachineBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::NullLogger;
    use parking_lot::Mutex;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Initial,
        Processing,
        Complete,
        Failed,
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum TestEvent {
        Begin,
        Finish,
        Crash,
    }

    fn base() -> MachineBuilder<TestState, TestEvent> {
        MachineBuilder::new()
            .states([
                TestState::Initial,
                TestState::Processing,
                TestState::Complete,
                TestState::Failed,
            ])
            .logger(NullLogger)
    }

    #[test]
    fn builder_requires_states() {
        let result = MachineBuilder::<TestState, TestEvent>::new()
            .initial(TestState::Initial)
            .build();

        assert!(matches!(result, Err(BuildError::NoStates)));
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = base().build();

        assert!(matches!(result, Err(BuildError::MissingInitialState)));
    }

    #[test]
    fn builder_rejects_undeclared_states() {
        let result = MachineBuilder::new()
            .state(TestState::Initial)
            .initial(TestState::Initial)
            .transition(TestState::Initial, TestState::Complete, TestEvent::Finish)
            .build();

        assert!(matches!(
            result,
            Err(BuildError::Config(FsmError::UnknownState(ref s))) if s == "Complete"
        ));

        let result = MachineBuilder::<TestState, TestEvent>::new()
            .state(TestState::Initial)
            .initial(TestState::Initial)
            .on_enter(TestState::Failed, |_, _| {})
            .build();
        assert!(matches!(result, Err(BuildError::Config(_))));
    }

    #[test]
    fn fluent_api_builds_working_machine() {
        let finished = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&finished);

        let mut machine = base()
            .initial(TestState::Initial)
            .finish(TestState::Complete)
            .transition(TestState::Initial, TestState::Processing, TestEvent::Begin)
            .guarded_transition(
                TestState::Processing,
                TestState::Failed,
                TestEvent::Finish,
                |_, _, _| false,
            )
            .transition(TestState::Processing, TestState::Complete, TestEvent::Finish)
            .on_finish(move |state, terminating| *sink.lock() = Some((*state, terminating)))
            .history_capacity(1)
            .build()
            .unwrap();

        machine.start();
        machine.process_event(TestEvent::Begin);
        machine.process_event(TestEvent::Finish);

        assert_eq!(machine.current_state(), Some(&TestState::Complete));
        assert_eq!(*finished.lock(), Some((TestState::Complete, false)));
        assert_eq!(machine.history().len(), 1);
    }

    #[test]
    fn builder_installs_handlers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (l1, l2, l3) = (Arc::clone(&log), Arc::clone(&log), Arc::clone(&log));

        let mut machine = base()
            .initial(TestState::Initial)
            .transition(TestState::Initial, TestState::Processing, TestEvent::Begin)
            .on_leave(TestState::Initial, move |s, _| l1.lock().push(format!("leave {s:?}")))
            .on_no_transition(TestState::Processing, move |s, e| {
                l2.lock().push(format!("stuck {s:?} {e:?}"))
            })
            .on_error(move |e| l3.lock().push(format!("error {e}")))
            .build()
            .unwrap();

        machine.start();
        machine.start();
        machine.process_event(TestEvent::Begin);
        machine.process_event(TestEvent::Crash);

        assert_eq!(
            *log.lock(),
            vec![
                "error Machine is already started",
                "leave Initial",
                "stuck Processing Some(Crash)"
            ]
        );
    }
}
