//! Transition table entries.

use crate::core::guard::Guard;

/// An edge out of a `(source state, event)` pair, optionally guarded.
///
/// Transitions sharing a key are kept in registration order and tried
/// first-match-wins.
#[derive(Debug)]
pub(crate) struct Transition<S, E> {
    pub(crate) guard: Option<Guard<S, E>>,
    pub(crate) target: S,
}

impl<S, E> Transition<S, E> {
    pub(crate) fn new(target: S, guard: Option<Guard<S, E>>) -> Self {
        Self { guard, target }
    }

    /// Check if this transition may fire from `from` on `event`.
    pub(crate) fn admits(&self, from: &S, event: &E) -> bool {
        self.guard
            .as_ref()
            .map_or(true, |g| g.check(from, &self.target, event))
    }
}

/// Pick the first admissible transition, in registration order.
pub(crate) fn select<'a, S, E>(
    candidates: &'a [Transition<S, E>],
    from: &S,
    event: &E,
) -> Option<&'a Transition<S, E>> {
    candidates.iter().find(|t| t.admits(from, event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unguarded_transition_always_admits() {
        let transition: Transition<u8, u8> = Transition::new(2, None);
        assert!(transition.admits(&1, &12));
    }

    #[test]
    fn guard_receives_target_state() {
        let transition: Transition<u8, u8> =
            Transition::new(3, Some(Guard::new(|from, to, _| *to == from + 2)));

        assert!(transition.admits(&1, &0));
        assert!(!transition.admits(&2, &0));
    }

    #[test]
    fn select_is_first_match_wins() {
        let candidates: Vec<Transition<u8, u8>> = vec![
            Transition::new(10, Some(Guard::new(|_, _, _| false))),
            Transition::new(20, None),
            Transition::new(30, None),
        ];

        let chosen = select(&candidates, &1, &0).map(|t| t.target);
        assert_eq!(chosen, Some(20));
    }

    #[test]
    fn select_returns_none_when_every_guard_refuses() {
        let candidates: Vec<Transition<u8, u8>> = vec![
            Transition::new(10, Some(Guard::new(|_, _, _| false))),
            Transition::new(20, Some(Guard::new(|_, _, e| *e == 99))),
        ];

        assert!(select(&candidates, &1, &0).is_none());
        assert!(select(&[], &1, &0).is_none());
    }
}
