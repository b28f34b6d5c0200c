//! Build errors for the machine builder.

use crate::core::FsmError;
use thiserror::Error;

/// Errors that can occur when building a machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("No states declared. Call .states(..) or .state(..) before .build()")]
    NoStates,

    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    /// A declared transition, handler or terminal state was rejected.
    #[error("Invalid configuration: {0}")]
    Config(#[from] FsmError),
}
