//! Error kinds reported by the engine.

use std::fmt::Debug;
use thiserror::Error;

/// Errors raised by configuration calls or delivered to the error handler.
///
/// Configuration mutators return these synchronously. Runtime operations
/// (`start`, `process_event`, `terminate`) never return them; they go to the
/// installed error handler instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsmError {
    /// A state referenced by a call is not part of the configured state set.
    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("No initial state configured. Call set_terminal_states() before start()")]
    NoInitialState,

    #[error("Machine is not started")]
    NotStarted,

    #[error("Machine is already started")]
    AlreadyStarted,

    /// An internal invariant did not hold.
    #[error("Unexpected: {0}")]
    Unexpected(String),
}

impl FsmError {
    pub(crate) fn unknown_state<S: Debug>(state: &S) -> Self {
        FsmError::UnknownState(format!("{state:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_state_renders_debug_form() {
        let err = FsmError::unknown_state(&"parked");
        assert_eq!(err, FsmError::UnknownState("\"parked\"".to_string()));
        assert_eq!(err.to_string(), "Unknown state: \"parked\"");
    }

    #[test]
    fn messages_are_stable() {
        assert_eq!(FsmError::NotStarted.to_string(), "Machine is not started");
        assert_eq!(
            FsmError::AlreadyStarted.to_string(),
            "Machine is already started"
        );
        assert_eq!(
            FsmError::Unexpected("boom".into()).to_string(),
            "Unexpected: boom"
        );
    }
}
