//! Discrete logical time for the simulation.
//!
//! Time in Braid is a discrete tick counter: it only ever advances at the
//! points where something happens, and there is a smallest step by which it
//! advances. Nothing in this module reads a wall clock.
//!
//! # Design Principles
//!
//! - A [`Time`] cannot be fabricated from a raw number by application code.
//!   The only ways to obtain one are the [`Time::EPOCH`] constant (owned by
//!   simulation setup) and [`Time::after`], which advances an existing time
//!   by a [`Duration`]. This keeps every time value traceable to the start
//!   of the simulation.
//! - Arithmetic is exact and total. [`Time::after`] saturates at
//!   `i64::MIN` / `i64::MAX` instead of wrapping or failing; a simulation
//!   that runs its clock into saturation has exceeded the representable
//!   horizon and pins there deterministically.
//! - [`Duration`] is a signed offset. Zero and negative durations are
//!   representable by design; the queue orders purely by time, so
//!   scheduling "into the past" is permitted and such occurrences simply
//!   fire first.

use serde::{Deserialize, Serialize};

/// A point in discrete simulation time, measured in ticks from the epoch.
///
/// `Time` is totally ordered by its tick value. Instances are immutable;
/// advancing produces a new value. The serde derives exist so applications
/// can persist and resume a simulation they own -- inside a running
/// simulation, times come only from [`Time::EPOCH`] and [`Time::after`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Time(i64);

impl Time {
    /// The start of simulation time, tick zero.
    ///
    /// Owned by simulation setup: models receive times from occurrences
    /// and advance them with [`Time::after`] rather than minting new ones.
    pub const EPOCH: Self = Self(0);

    /// Return the absolute tick value, measured from [`Time::EPOCH`].
    pub const fn tick(self) -> i64 {
        self.0
    }

    /// Return the time after the given duration has passed.
    ///
    /// The tick arithmetic is exact. At the representable extremes the
    /// result saturates at `i64::MIN` / `i64::MAX` rather than wrapping,
    /// so time never jumps backwards through overflow.
    #[must_use]
    pub const fn after(self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration.0))
    }

    /// Return the signed offset from `earlier` to `self`.
    ///
    /// Negative when `earlier` is actually later. Saturates at the
    /// representable extremes, mirroring [`Time::after`].
    pub const fn since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }
}

impl core::fmt::Display for Time {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A span of simulation time: the signed difference between two [`Time`]s.
///
/// Durations exist to make time arithmetic type-safe -- a tick count can
/// only move a clock when explicitly wrapped as a `Duration`. Unlike
/// [`Time`], durations may be constructed freely, and zero or negative
/// values are valid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Duration(i64);

impl Duration {
    /// The empty span.
    pub const ZERO: Self = Self(0);

    /// Construct a duration of the given number of ticks.
    pub const fn new(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Return the tick count of this duration.
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for Duration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ticks", self.0)
    }
}
