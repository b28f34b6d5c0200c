//! Callback types and per-state handler registries.

use crate::core::error::FsmError;

/// Enter, leave and no-transition callback: `(state, event)`.
///
/// `event` is `None` only for the entry into the initial state on `start`.
pub type StateHandler<S, E> = Box<dyn Fn(&S, Option<&E>) + Send + Sync>;

/// Finish callback: `(state, is_terminating)`.
pub type FinishHandler<S> = Box<dyn Fn(&S, bool) + Send + Sync>;

/// Error callback for runtime failures.
pub type ErrorHandler = Box<dyn Fn(&FsmError) + Send + Sync>;

/// Which per-state sequence a handler is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HandlerKind {
    Enter,
    Leave,
    NoTransition,
}

/// Ordered callback sequences attached to one state.
pub(crate) struct HandlerSet<S, E> {
    pub(crate) enter: Vec<StateHandler<S, E>>,
    pub(crate) leave: Vec<StateHandler<S, E>>,
    pub(crate) no_transition: Vec<StateHandler<S, E>>,
}

impl<S, E> HandlerSet<S, E> {
    pub(crate) fn new() -> Self {
        Self {
            enter: Vec::new(),
            leave: Vec::new(),
            no_transition: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, kind: HandlerKind, handler: StateHandler<S, E>) {
        match kind {
            HandlerKind::Enter => self.enter.push(handler),
            HandlerKind::Leave => self.leave.push(handler),
            HandlerKind::NoTransition => self.no_transition.push(handler),
        }
    }
}

/// Invoke every handler in registration order.
pub(crate) fn run_all<S, E>(handlers: &[StateHandler<S, E>], state: &S, event: Option<&E>) {
    for handler in handlers {
        handler(state, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> StateHandler<u8, u8> {
        let log = Arc::clone(log);
        Box::new(move |state, event| log.lock().push(format!("{tag}:{state}:{event:?}")))
    }

    #[test]
    fn push_routes_by_kind() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut set = HandlerSet::new();
        set.push(HandlerKind::Enter, recorder(&log, "enter"));
        set.push(HandlerKind::Leave, recorder(&log, "leave"));
        set.push(HandlerKind::NoTransition, recorder(&log, "none"));
        set.push(HandlerKind::NoTransition, recorder(&log, "none2"));

        assert_eq!(set.enter.len(), 1);
        assert_eq!(set.leave.len(), 1);
        assert_eq!(set.no_transition.len(), 2);
    }

    #[test]
    fn run_all_preserves_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handlers = vec![
            recorder(&log, "first"),
            recorder(&log, "second"),
            recorder(&log, "third"),
        ];

        run_all(&handlers, &4, Some(&9));
        run_all(&handlers[..1], &1, None);

        assert_eq!(
            *log.lock(),
            vec![
                "first:4:Some(9)",
                "second:4:Some(9)",
                "third:4:Some(9)",
                "first:1:None"
            ]
        );
    }
}
