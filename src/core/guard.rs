//! Guard predicates for controlling state transitions.
//!
//! A guard gates one candidate transition. It sees the source state, the
//! candidate target and the event being processed, and must not have side
//! effects: the engine may evaluate it any number of times.

use std::fmt;

/// Predicate that decides whether a candidate transition may be taken.
///
/// A transition without a guard is always eligible.
///
/// # Example
///
/// ```rust
/// use switchyard::core::Guard;
///
/// let only_forward = Guard::new(|from: &u32, to: &u32, _event: &&str| to > from);
///
/// assert!(only_forward.check(&1, &2, &"next"));
/// assert!(!only_forward.check(&2, &1, &"next"));
/// ```
pub struct Guard<S, E> {
    predicate: Box<dyn Fn(&S, &S, &E) -> bool + Send + Sync>,
}

impl<S, E> Guard<S, E> {
    /// Create a guard from a predicate over `(from, to, event)`.
    ///
    /// The predicate must be deterministic and thread-safe (`Send + Sync`).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S, &S, &E) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the guard for a candidate transition.
    pub fn check(&self, from: &S, to: &S, event: &E) -> bool {
        (self.predicate)(from, to, event)
    }
}

impl<S, E> fmt::Debug for Guard<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Idle,
        Busy,
        Done,
    }

    #[test]
    fn guard_sees_all_three_arguments() {
        let guard = Guard::new(|from: &TestState, to: &TestState, event: &u8| {
            *from == TestState::Idle && *to == TestState::Busy && *event == 7
        });

        assert!(guard.check(&TestState::Idle, &TestState::Busy, &7));
        assert!(!guard.check(&TestState::Busy, &TestState::Busy, &7));
        assert!(!guard.check(&TestState::Idle, &TestState::Done, &7));
        assert!(!guard.check(&TestState::Idle, &TestState::Busy, &8));
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = Guard::new(|_: &TestState, to: &TestState, _: &u8| *to != TestState::Done);

        let result1 = guard.check(&TestState::Idle, &TestState::Busy, &1);
        let result2 = guard.check(&TestState::Idle, &TestState::Busy, &1);

        assert_eq!(result1, result2);
    }

    #[test]
    fn guard_can_read_shared_flags() {
        let condition = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&condition);
        let guard = Guard::new(move |_: &TestState, _: &TestState, _: &u8| {
            flag.load(Ordering::SeqCst)
        });

        assert!(!guard.check(&TestState::Idle, &TestState::Busy, &0));
        condition.store(true, Ordering::SeqCst);
        assert!(guard.check(&TestState::Idle, &TestState::Busy, &0));
    }
}
