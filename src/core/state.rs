//! Capability traits for machine states and events.
//!
//! States and events are opaque to the engine: all it needs is equality and
//! hashing for table lookups, cloning for handler arguments and history, and
//! `Debug` for diagnostics. Both traits are blanket-implemented, so integers,
//! strings and plain enums qualify without any extra code.

use std::fmt::Debug;
use std::hash::Hash;

/// A node in the machine's configured vertex set.
///
/// # Example
///
/// ```rust
/// use switchyard::core::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// fn assert_state<S: State>(_: &S) {}
///
/// assert_state(&Door::Open);
/// assert_state(&42u32);
/// assert_state(&"idle".to_string());
/// ```
pub trait State: Clone + Eq + Hash + Debug + Send + 'static {}

impl<T> State for T where T: Clone + Eq + Hash + Debug + Send + 'static {}

/// A stimulus that may trigger a transition out of the current state.
pub trait Event: Clone + Eq + Hash + Debug + Send + 'static {}

impl<T> Event for T where T: Clone + Eq + Hash + Debug + Send + 'static {}
