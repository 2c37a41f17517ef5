//! Deferred, pure transitions over state and queue.
//!
//! An event does not mutate anything when it fires; it returns a
//! [`Changes`] value describing what should be different afterwards. The
//! driver applies those changes to whichever snapshot it chooses, which is
//! what makes branching, retrying, and replaying a timeline safe.
//!
//! # Design Principles
//!
//! - Changes are functions, not patches. A [`StateChanges`] owns its input
//!   and returns a fresh value, so "must not mutate the old state" is
//!   enforced by the type rather than by convention. Callers that want to
//!   keep the old snapshot clone before applying.
//! - Changes compose. Independently authored changes chain with
//!   [`StateChanges::then`] / [`OccurrencesChanges::then`], and removing an
//!   occurrence that is already gone is a queue-level no-op, so composed
//!   changes never have to coordinate about ordering.
//! - Applying the same changes to equal inputs yields equal outputs. The
//!   wrapped functions are deterministic by the same contract as
//!   [`Event::affect`](crate::event::Event::affect).

use std::fmt;
use std::sync::Arc;

use crate::occurrence::Occurrence;
use crate::queue::Occurrences;

/// A pure transition from one simulation state to the next.
///
/// Wraps an `Fn(State) -> State` behind a shared handle; cloning shares
/// the function. Use [`StateChanges::identity`] for "the state stays as
/// it is".
pub struct StateChanges<State: 'static> {
    apply: Arc<dyn Fn(State) -> State + Send + Sync>,
}

impl<State: 'static> StateChanges<State> {
    /// Wrap a pure transition function.
    ///
    /// The function must be deterministic: equal inputs produce equal
    /// outputs, with no effects beyond the returned value.
    pub fn new(apply: impl Fn(State) -> State + Send + Sync + 'static) -> Self {
        Self {
            apply: Arc::new(apply),
        }
    }

    /// The transition that changes nothing.
    pub fn identity() -> Self {
        Self::new(|state| state)
    }

    /// Consume a state and produce the changed one.
    #[must_use]
    pub fn apply_to(&self, state: State) -> State {
        (self.apply)(state)
    }

    /// Chain another transition after this one.
    #[must_use]
    pub fn then(self, next: Self) -> Self {
        let first = self.apply;
        let second = next.apply;
        Self {
            apply: Arc::new(move |state| second(first(state))),
        }
    }
}

impl<State: 'static> Clone for StateChanges<State> {
    fn clone(&self) -> Self {
        Self {
            apply: Arc::clone(&self.apply),
        }
    }
}

impl<State: 'static> Default for StateChanges<State> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<State: 'static> fmt::Debug for StateChanges<State> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateChanges").finish_non_exhaustive()
    }
}

/// A pure transition from one occurrence queue to the next.
///
/// Same shape as [`StateChanges`], specialized to [`Occurrences`]. The
/// [`OccurrencesChanges::schedule`] and [`OccurrencesChanges::cancel`]
/// constructors cover the two transitions nearly every event wants; in
/// particular, an event that should fire once cancels its own occurrence
/// with `cancel(vec![occurrence])` as part of its changes.
pub struct OccurrencesChanges<State: 'static> {
    apply: Arc<dyn Fn(Occurrences<State>) -> Occurrences<State> + Send + Sync>,
}

impl<State: 'static> OccurrencesChanges<State> {
    /// Wrap a pure queue transition function.
    pub fn new(
        apply: impl Fn(Occurrences<State>) -> Occurrences<State> + Send + Sync + 'static,
    ) -> Self {
        Self {
            apply: Arc::new(apply),
        }
    }

    /// The transition that changes nothing.
    pub fn identity() -> Self {
        Self::new(|occurrences| occurrences)
    }

    /// The transition that adds the given occurrences to the queue.
    pub fn schedule(occurrences: Vec<Occurrence<State>>) -> Self {
        Self::new(move |queue: Occurrences<State>| queue.with_new(occurrences.iter().cloned()))
    }

    /// The transition that removes the given occurrences from the queue.
    ///
    /// Entries are matched by value; occurrences that are not present are
    /// skipped silently, so independently authored cancellations compose.
    pub fn cancel(occurrences: Vec<Occurrence<State>>) -> Self {
        Self::new(move |queue: Occurrences<State>| queue.without(occurrences.iter().cloned()))
    }

    /// Consume a queue and produce the changed one.
    #[must_use]
    pub fn apply_to(&self, occurrences: Occurrences<State>) -> Occurrences<State> {
        (self.apply)(occurrences)
    }

    /// Chain another transition after this one.
    #[must_use]
    pub fn then(self, next: Self) -> Self {
        let first = self.apply;
        let second = next.apply;
        Self {
            apply: Arc::new(move |occurrences| second(first(occurrences))),
        }
    }
}

impl<State: 'static> Clone for OccurrencesChanges<State> {
    fn clone(&self) -> Self {
        Self {
            apply: Arc::clone(&self.apply),
        }
    }
}

impl<State: 'static> Default for OccurrencesChanges<State> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<State: 'static> fmt::Debug for OccurrencesChanges<State> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccurrencesChanges").finish_non_exhaustive()
    }
}

/// Everything an event wants to be different after it happens.
///
/// Carries the state transition and the queue transition side by side;
/// the driver applies each to its own axis of the timeline. Events that
/// change nothing return [`Changes::none`] explicitly.
pub struct Changes<State: 'static> {
    /// Transition for the simulation state.
    pub to_state: StateChanges<State>,
    /// Transition for the occurrence queue.
    pub to_occurrences: OccurrencesChanges<State>,
}

impl<State: 'static> Changes<State> {
    /// Bundle a state transition and a queue transition.
    pub const fn new(
        to_state: StateChanges<State>,
        to_occurrences: OccurrencesChanges<State>,
    ) -> Self {
        Self {
            to_state,
            to_occurrences,
        }
    }

    /// The changes that leave both state and queue exactly as they are.
    pub fn none() -> Self {
        Self::new(StateChanges::identity(), OccurrencesChanges::identity())
    }
}

impl<State: 'static> Clone for Changes<State> {
    fn clone(&self) -> Self {
        Self {
            to_state: self.to_state.clone(),
            to_occurrences: self.to_occurrences.clone(),
        }
    }
}

impl<State: 'static> Default for Changes<State> {
    fn default() -> Self {
        Self::none()
    }
}

impl<State: 'static> fmt::Debug for Changes<State> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Changes").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::event::{Event, EventRef};
    use crate::time::{Duration, Time};

    #[derive(Debug, PartialEq, Eq, Hash)]
    struct Ping;

    impl Event<u64> for Ping {
        fn affect(&self, _state: &u64, _at: Time) -> Changes<u64> {
            Changes::none()
        }
    }

    fn occurrence_at(tick: i64) -> Occurrence<u64> {
        let event: EventRef<u64> = std::sync::Arc::new(Ping);
        Occurrence::new(Time::EPOCH.after(Duration::new(tick)), event)
    }

    #[test]
    fn identity_returns_the_input_unchanged() {
        let changes = StateChanges::<u64>::identity();
        assert_eq!(changes.apply_to(41), 41);
    }

    #[test]
    fn new_wraps_an_arbitrary_transition() {
        let changes = StateChanges::new(|n: u64| n + 1);
        assert_eq!(changes.apply_to(41), 42);
    }

    #[test]
    fn then_composes_left_to_right() {
        let add_then_double = StateChanges::new(|n: u64| n + 1).then(StateChanges::new(|n| n * 2));
        assert_eq!(add_then_double.apply_to(3), 8);
    }

    #[test]
    fn applying_twice_to_equal_inputs_agrees() {
        let changes = StateChanges::new(|n: u64| n * 3);
        assert_eq!(changes.apply_to(14), changes.apply_to(14));
    }

    #[test]
    fn clone_shares_the_same_transition() {
        let original = StateChanges::new(|n: u64| n + 10);
        let shared = original.clone();
        assert_eq!(original.apply_to(1), shared.apply_to(1));
    }

    #[test]
    fn schedule_adds_to_the_queue() {
        let queue = Occurrences::<u64>::new();
        let scheduled = OccurrencesChanges::schedule(vec![occurrence_at(5)]).apply_to(queue);
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled.next_occurrence().unwrap(), occurrence_at(5));
    }

    #[test]
    fn cancel_removes_by_value() {
        let queue = Occurrences::new().with_new(vec![occurrence_at(5), occurrence_at(9)]);
        let cancelled = OccurrencesChanges::cancel(vec![occurrence_at(5)]).apply_to(queue);
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled.next_occurrence().unwrap(), occurrence_at(9));
    }

    #[test]
    fn cancel_of_absent_occurrence_is_a_no_op() {
        let queue = Occurrences::new().with_new(vec![occurrence_at(5)]);
        let unchanged = OccurrencesChanges::cancel(vec![occurrence_at(77)]).apply_to(queue.clone());
        assert_eq!(unchanged, queue);
    }

    #[test]
    fn queue_then_composes_left_to_right() {
        let swap = OccurrencesChanges::schedule(vec![occurrence_at(3)])
            .then(OccurrencesChanges::cancel(vec![occurrence_at(3)]));
        let queue = swap.apply_to(Occurrences::new());
        assert!(queue.is_empty());
    }

    #[test]
    fn none_is_identity_on_both_axes() {
        let changes = Changes::<u64>::none();
        assert_eq!(changes.to_state.apply_to(7), 7);

        let queue = Occurrences::new().with_new(vec![occurrence_at(2)]);
        assert_eq!(changes.to_occurrences.apply_to(queue.clone()), queue);
    }
}
