//! Switchyard: an embeddable finite state machine engine
//!
//! Callers declare a set of states, an initial/finish pair, a transition table
//! keyed by `(state, event)` with optional guards, and lifecycle callbacks.
//! The engine drives state changes in response to fed events and invokes the
//! callbacks deterministically.
//!
//! # Core Concepts
//!
//! - **Machine**: the synchronous engine owning the table, handlers and current state
//! - **Guards**: predicates over `(from, to, event)`; first eligible transition wins
//! - **Handlers**: enter / leave / no-transition callbacks per state, plus global
//!   no-transition, finish and error callbacks
//! - **SerialMachine**: a thread-safe facade running every runtime call on one
//!   worker thread, with pause and cancel controls
//!
//! # Example
//!
//! ```rust
//! use switchyard::{Guard, Machine};
//!
//! let mut machine: Machine<u8, u8> = Machine::new();
//! machine.set_states([1, 2, 3]).unwrap();
//! machine.set_terminal_states(1, Some(3)).unwrap();
//! machine.add_transition(1, 2, 12, None).unwrap();
//! machine
//!     .add_transition(2, 3, 23, Some(Guard::new(|_, to, _| *to == 3)))
//!     .unwrap();
//!
//! machine.start();
//! machine.process_event(12);
//! machine.process_event(23);
//!
//! assert_eq!(machine.current_state(), Some(&3));
//! assert!(!machine.is_started());
//! ```

pub mod builder;
pub mod core;
pub mod logger;
pub mod serial;

// Re-export commonly used types
pub use crate::builder::{BuildError, MachineBuilder};
pub use crate::core::{
    Dispatcher, Event, FsmError, Guard, Machine, State, StateHistory, TransitionRecord,
};
pub use crate::logger::{Logger, NullLogger, TracingLogger};
pub use crate::serial::{SerialHandle, SerialMachine, SerialOptions};
