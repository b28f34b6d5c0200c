//! Core engine types and logic.
//!
//! This module contains the synchronous engine and everything it is built on:
//! - `State` / `Event` capability traits
//! - Guard predicates and the ordered transition table
//! - Per-state handler registries
//! - The deferred event inbox used for handler-driven cascades
//! - Bounded transition history
//!
//! Nothing in here spawns threads or blocks; see [`crate::serial`] for the
//! thread-safe wrapper.

mod dispatcher;
mod error;
mod guard;
mod handlers;
mod history;
mod machine;
mod state;
mod transition;

pub use dispatcher::Dispatcher;
pub use error::FsmError;
pub use guard::Guard;
pub use handlers::{ErrorHandler, FinishHandler, StateHandler};
pub(crate) use handlers::HandlerKind;
pub use history::{StateHistory, TransitionRecord, DEFAULT_HISTORY_CAPACITY};
pub use machine::Machine;
pub use state::{Event, State};
