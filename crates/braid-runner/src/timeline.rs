//! Timeline stepping: fire the earliest occurrence against the current state.
//!
//! A [`Timeline`] pairs a state snapshot with its pending [`Occurrences`].
//! [`Timeline::step`] runs one firing in three phases:
//!
//! 1. **Fetch** -- take the earliest occurrence from the queue (ties break
//!    by insertion order).
//! 2. **Affect** -- call the event's [`affect`] with the current state and
//!    the occurrence's time, producing a [`Changes`] bundle.
//! 3. **Apply** -- apply `to_state` to the state and `to_occurrences` to
//!    the queue, yielding the successor timeline.
//!
//! Stepping never removes the fired occurrence on its own. An event that
//! should fire once cancels its own occurrence through
//! [`OccurrencesChanges::cancel`]; leaving it in place is how an event
//! keeps firing. Each step consumes its timeline and returns a new one, so
//! a caller that clones before stepping keeps a usable snapshot of the
//! past.
//!
//! [`affect`]: braid_core::event::Event::affect
//! [`Changes`]: braid_core::changes::Changes
//! [`OccurrencesChanges::cancel`]: braid_core::changes::OccurrencesChanges::cancel

use braid_core::occurrence::Occurrence;
use braid_core::queue::Occurrences;

/// A simulation state paired with the occurrences still ahead of it.
///
/// Equality compares the state and the canonical queue contents, so a
/// timeline rebuilt from scratch equals one that stepped its way to the
/// same place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline<State: 'static> {
    /// The simulation state as of the last firing.
    state: State,
    /// Occurrences that have not fired yet.
    occurrences: Occurrences<State>,
}

impl<State: 'static> Timeline<State> {
    /// Pair an initial state with its scheduled occurrences.
    pub const fn new(state: State, occurrences: Occurrences<State>) -> Self {
        Self { state, occurrences }
    }

    /// The current simulation state.
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// The occurrences that have not fired yet.
    pub const fn occurrences(&self) -> &Occurrences<State> {
        &self.occurrences
    }

    /// Split the timeline back into its state and queue.
    pub fn into_parts(self) -> (State, Occurrences<State>) {
        (self.state, self.occurrences)
    }

    /// Fire the earliest occurrence, consuming this timeline.
    ///
    /// The event's changes see the whole queue, fired occurrence included;
    /// see the module docs for the firing phases. Equal timelines step to
    /// equal successors, since [`affect`] is pure and tie order is part of
    /// queue equality.
    ///
    /// [`affect`]: braid_core::event::Event::affect
    pub fn step(self) -> StepResult<State> {
        match self.occurrences.next_occurrence() {
            None => StepResult::Exhausted { timeline: self },
            Some(occurrence) => {
                let changes = occurrence.event().affect(&self.state, occurrence.time());
                let state = changes.to_state.apply_to(self.state);
                let occurrences = changes.to_occurrences.apply_to(self.occurrences);
                StepResult::Fired {
                    timeline: Self { state, occurrences },
                    occurrence,
                }
            }
        }
    }
}

/// What one call to [`Timeline::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult<State: 'static> {
    /// The earliest occurrence fired and produced a successor timeline.
    Fired {
        /// The timeline after applying the event's changes.
        timeline: Timeline<State>,
        /// The occurrence that fired.
        occurrence: Occurrence<State>,
    },
    /// The queue was empty; the timeline comes back unchanged.
    Exhausted {
        /// The untouched timeline.
        timeline: Timeline<State>,
    },
}
