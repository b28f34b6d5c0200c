//! Bounded transition history.
//!
//! The engine records every selected transition of the current run. History
//! is kept in memory only; the types derive serde traits so a host can export
//! them if it wants to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Number of records kept when no explicit capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 64;

/// Record of a single selected transition.
///
/// Self-loops are recorded too, since they run leave and enter handlers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord<S, E> {
    /// The state being left
    pub from: S,
    /// The state being entered
    pub to: S,
    /// The event that selected the transition
    pub event: E,
    /// When the state changed
    pub timestamp: DateTime<Utc>,
}

impl<S, E> TransitionRecord<S, E> {
    pub fn new(from: S, to: S, event: E) -> Self {
        Self {
            from,
            to,
            event,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered, bounded history of transitions.
///
/// When full, the oldest record is dropped. A capacity of zero disables
/// recording.
///
/// # Example
///
/// ```rust
/// use switchyard::core::{StateHistory, TransitionRecord};
///
/// let mut history = StateHistory::with_capacity(2);
/// history.record(TransitionRecord::new("a", "b", 1));
/// history.record(TransitionRecord::new("b", "c", 2));
/// history.record(TransitionRecord::new("c", "d", 3));
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.get_path(), vec![&"b", &"c", &"d"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory<S, E> {
    records: VecDeque<TransitionRecord<S, E>>,
    capacity: usize,
}

impl<S, E> Default for StateHistory<S, E> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<S, E> StateHistory<S, E> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, dropping the oldest records if it shrank.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.trim();
    }

    pub fn record(&mut self, record: TransitionRecord<S, E>) {
        if self.capacity == 0 {
            return;
        }
        self.records.push_back(record);
        self.trim();
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records from oldest to newest.
    pub fn records(&self) -> impl ExactSizeIterator<Item = &TransitionRecord<S, E>> + '_ {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord<S, E>> {
        self.records.back()
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest retained record followed by the
    /// `to` state of each record.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(&first.from);
        }
        path.extend(self.records.iter().map(|r| &r.to));
        path
    }

    /// Time between the oldest and newest retained records.
    ///
    /// Returns `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    fn trim(&mut self) {
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestState {
        Initial,
        Processing,
        Complete,
    }

    fn record(from: TestState, to: TestState) -> TransitionRecord<TestState, u8> {
        TransitionRecord::new(from, to, 0)
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<TestState, u8> = StateHistory::default();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
        assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let mut history = StateHistory::default();
        history.record(record(TestState::Initial, TestState::Processing));
        history.record(record(TestState::Processing, TestState::Complete));

        let path = history.get_path();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], &TestState::Initial);
        assert_eq!(path[1], &TestState::Processing);
        assert_eq!(path[2], &TestState::Complete);
    }

    #[test]
    fn oldest_records_are_dropped_at_capacity() {
        let mut history = StateHistory::with_capacity(2);
        history.record(record(TestState::Initial, TestState::Processing));
        history.record(record(TestState::Processing, TestState::Complete));
        history.record(record(TestState::Complete, TestState::Initial));

        assert_eq!(history.len(), 2);
        assert_eq!(
            history.records().next().map(|r| &r.from),
            Some(&TestState::Processing)
        );
        assert_eq!(history.last().map(|r| &r.to), Some(&TestState::Initial));
    }

    #[test]
    fn zero_capacity_disables_recording() {
        let mut history = StateHistory::with_capacity(0);
        history.record(record(TestState::Initial, TestState::Processing));
        assert!(history.is_empty());
    }

    #[test]
    fn shrinking_capacity_trims() {
        let mut history = StateHistory::with_capacity(8);
        for _ in 0..5 {
            history.record(record(TestState::Initial, TestState::Processing));
        }
        history.set_capacity(3);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let mut history = StateHistory::default();
        history.record(record(TestState::Initial, TestState::Processing));

        std::thread::sleep(std::time::Duration::from_millis(10));

        history.record(record(TestState::Processing, TestState::Complete));

        let duration = history.duration();
        assert!(duration.is_some());
        assert!(duration.unwrap() >= std::time::Duration::from_millis(10));
    }

    #[test]
    fn history_serializes_correctly() {
        let mut history = StateHistory::default();
        history.record(record(TestState::Initial, TestState::Processing));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<TestState, u8> = serde_json::from_str(&json).unwrap();

        assert_eq!(history.len(), deserialized.len());
        assert_eq!(history.last(), deserialized.last());
    }
}
