//! Builder API for ergonomic machine construction.
//!
//! This module provides a fluent builder and a declaration macro for creating
//! machines with minimal boilerplate while keeping the engine's validation.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::MachineBuilder;

use crate::core::{Event, Machine, State};

/// Build a linear machine `states[0] -> states[1] -> ... -> states[n-1]`.
///
/// Each step is triggered by the event at the same index in `events`. The
/// first state is initial and the last one finishes the run.
///
/// # Example
///
/// ```
/// use switchyard::builder::linear;
///
/// let mut machine = linear([1u8, 2, 3], [12u8, 23]).unwrap();
/// machine.start();
/// machine.process_event(12);
/// machine.process_event(23);
/// assert_eq!(machine.current_state(), Some(&3));
/// assert!(!machine.is_started());
/// ```
pub fn linear<S, E, SI, EI>(states: SI, events: EI) -> Result<Machine<S, E>, BuildError>
where
    S: State,
    E: Event,
    SI: IntoIterator<Item = S>,
    EI: IntoIterator<Item = E>,
{
    let states: Vec<S> = states.into_iter().collect();
    let (Some(first), Some(last)) = (states.first().cloned(), states.last().cloned()) else {
        return Err(BuildError::NoStates);
    };

    let builder = states
        .windows(2)
        .zip(events)
        .fold(MachineBuilder::new(), |builder, (pair, event)| {
            builder.transition(pair[0].clone(), pair[1].clone(), event)
        });

    builder.states(states).initial(first).finish(last).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_builds_chain() {
        let mut machine = linear(["a", "b", "c"], ["ab", "bc"]).unwrap();

        assert_eq!(machine.initial_state(), Some(&"a"));
        assert_eq!(machine.finish_state(), Some(&"c"));

        machine.start();
        machine.process_event("ab");
        assert_eq!(machine.current_state(), Some(&"b"));
    }

    #[test]
    fn linear_requires_states() {
        let result = linear(Vec::<u8>::new(), Vec::<u8>::new());
        assert!(matches!(result, Err(BuildError::NoStates)));
    }
}
