//! An event placed at a point in time.
//!
//! An [`Occurrence`] is the unit the queue stores and the driver consumes:
//! this event, at this time. Both halves are always present; there is no
//! way to build a partial occurrence, so downstream code never checks.
//!
//! Ordering lives in the [`ByTime`] comparator rather than on
//! [`Occurrence`] itself. The comparator looks at times only, which makes
//! it deliberately inconsistent with occurrence equality (two different
//! events at the same time compare as equal but are not equal values).
//! Keeping `Ord` off the type makes that inconsistency impossible to
//! trip over through sorting APIs by accident.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use thiserror::Error;

use crate::event::EventRef;
use crate::time::Time;

/// An immutable pairing of an event with the time it happens.
///
/// Equality and hashing are structural over both halves: two occurrences
/// are equal when their times are equal and their events are value-equal,
/// which is what queue removal matches on. Cloning shares the event.
pub struct Occurrence<State: 'static> {
    time: Time,
    event: EventRef<State>,
}

impl<State: 'static> Occurrence<State> {
    /// Pair an event with the time it should happen.
    pub const fn new(time: Time, event: EventRef<State>) -> Self {
        Self { time, event }
    }

    /// The time this occurrence happens.
    pub const fn time(&self) -> Time {
        self.time
    }

    /// The event that happens.
    pub const fn event(&self) -> &EventRef<State> {
        &self.event
    }
}

impl<State: 'static> Clone for Occurrence<State> {
    fn clone(&self) -> Self {
        Self {
            time: self.time,
            event: EventRef::clone(&self.event),
        }
    }
}

impl<State: 'static> fmt::Debug for Occurrence<State> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Occurrence")
            .field("time", &self.time)
            .field("event", &self.event)
            .finish()
    }
}

impl<State: 'static> PartialEq for Occurrence<State> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.event.dyn_eq(other.event.as_ref())
    }
}

impl<State: 'static> Eq for Occurrence<State> {}

impl<State: 'static> Hash for Occurrence<State> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.time.hash(state);
        self.event.dyn_hash(state);
    }
}

/// Which operand of a comparison was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandSide {
    /// The first operand.
    Left,
    /// The second operand.
    Right,
}

impl fmt::Display for OperandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Errors from comparing optional occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompareError {
    /// An operand was absent and the comparator does not permit absence.
    ///
    /// The left operand is checked first, so when both are absent the
    /// reported side is `Left`.
    #[error("cannot compare absent {side} operand; absence was not permitted")]
    AbsentOperand {
        /// Which operand was absent.
        side: OperandSide,
    },
}

/// Orders occurrences by time alone.
///
/// Events are ignored, so this ordering is deliberately inconsistent with
/// [`Occurrence`] equality: distinct events at the same time compare as
/// equal. The queue resolves such ties by insertion order; this comparator
/// exists for driver-side decisions like "has the next occurrence passed
/// the horizon".
///
/// Absent operands are rejected unless the comparator was built with
/// [`ByTime::permitting_absent`]. Permitting absence is an explicit
/// capability, never a default, and under it absence sorts before every
/// present occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByTime {
    permit_absent: bool,
}

impl ByTime {
    /// A comparator that requires both operands to be present.
    pub const fn new() -> Self {
        Self {
            permit_absent: false,
        }
    }

    /// A comparator that additionally accepts absent operands.
    ///
    /// Absent compares equal to absent and before every present operand.
    pub const fn permitting_absent() -> Self {
        Self {
            permit_absent: true,
        }
    }

    /// Whether this comparator accepts absent operands.
    pub const fn permits_absent(self) -> bool {
        self.permit_absent
    }

    /// Order two occurrences by their times.
    #[allow(clippy::unused_self)]
    pub fn compare<State>(
        self,
        left: &Occurrence<State>,
        right: &Occurrence<State>,
    ) -> Ordering {
        left.time().cmp(&right.time())
    }

    /// Order two optional occurrences by their times.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::AbsentOperand`] when an operand is `None`
    /// and this comparator was not built with
    /// [`ByTime::permitting_absent`].
    pub fn compare_opt<State>(
        self,
        left: Option<&Occurrence<State>>,
        right: Option<&Occurrence<State>>,
    ) -> Result<Ordering, CompareError> {
        match (left, right) {
            (Some(present_left), Some(present_right)) => {
                Ok(self.compare(present_left, present_right))
            }
            (None, None) if self.permit_absent => Ok(Ordering::Equal),
            (None, Some(_)) if self.permit_absent => Ok(Ordering::Less),
            (Some(_), None) if self.permit_absent => Ok(Ordering::Greater),
            (None, _) => Err(CompareError::AbsentOperand {
                side: OperandSide::Left,
            }),
            (_, None) => Err(CompareError::AbsentOperand {
                side: OperandSide::Right,
            }),
        }
    }
}
