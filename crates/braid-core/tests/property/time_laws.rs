//! Arithmetic and ordering laws for discrete time.

use std::cmp::Ordering;
use std::sync::Arc;

use braid_core::changes::Changes;
use braid_core::event::Event;
use braid_core::occurrence::{ByTime, CompareError, Occurrence, OperandSide};
use braid_core::time::{Duration, Time};
use proptest::prelude::*;

/// Bound on generated ticks so the exact-arithmetic laws never hit
/// saturation.
const SAFE: i64 = 1 << 30;

#[derive(Debug, PartialEq, Eq, Hash)]
struct Nil;

impl Event<()> for Nil {
    fn affect(&self, (): &(), _at: Time) -> Changes<()> {
        Changes::none()
    }
}

fn time_at(tick: i64) -> Time {
    Time::EPOCH.after(Duration::new(tick))
}

fn occurrence_at(tick: i64) -> Occurrence<()> {
    Occurrence::new(time_at(tick), Arc::new(Nil))
}

proptest! {
    /// Advancing is exact tick addition away from the extremes.
    #[test]
    fn prop_after_is_exact_addition(base in -SAFE..SAFE, delta in -SAFE..SAFE) {
        prop_assert_eq!(time_at(base).after(Duration::new(delta)).tick(), base + delta);
    }

    /// Time order is exactly tick order.
    #[test]
    fn prop_order_matches_tick_order(a in -SAFE..SAFE, b in -SAFE..SAFE) {
        prop_assert_eq!(time_at(a).cmp(&time_at(b)), a.cmp(&b));
    }

    /// `since` recovers the duration that `after` applied.
    #[test]
    fn prop_since_inverts_after(base in -SAFE..SAFE, delta in -SAFE..SAFE) {
        let start = time_at(base);
        let moved = start.after(Duration::new(delta));
        prop_assert_eq!(moved.since(start), Duration::new(delta));
        prop_assert_eq!(start.after(moved.since(start)), moved);
    }

    /// At the top of the representable range, advancing pins instead of
    /// wrapping.
    #[test]
    fn prop_after_saturates_at_the_top(delta in 0i64..SAFE) {
        let top = Time::EPOCH.after(Duration::new(i64::MAX));
        prop_assert_eq!(top.after(Duration::new(delta)), top);
    }

    /// The zero duration never moves a time.
    #[test]
    fn prop_zero_duration_is_identity(base in -SAFE..SAFE) {
        prop_assert_eq!(time_at(base).after(Duration::ZERO), time_at(base));
    }

    /// The comparator agrees with tick order, with or without the
    /// absence capability.
    #[test]
    fn prop_comparator_agrees_with_time_order(a in -SAFE..SAFE, b in -SAFE..SAFE) {
        let left = occurrence_at(a);
        let right = occurrence_at(b);
        prop_assert_eq!(ByTime::new().compare(&left, &right), a.cmp(&b));
        prop_assert_eq!(
            ByTime::permitting_absent().compare_opt(Some(&left), Some(&right)),
            Ok(a.cmp(&b)),
        );
    }

    /// Absent operands fail without the capability and sort first with
    /// it.
    #[test]
    fn prop_absence_needs_the_capability(tick in -SAFE..SAFE) {
        let present = occurrence_at(tick);

        prop_assert_eq!(
            ByTime::new().compare_opt(Some(&present), None),
            Err(CompareError::AbsentOperand { side: OperandSide::Right }),
        );
        prop_assert_eq!(
            ByTime::new().compare_opt(None, Some(&present)),
            Err(CompareError::AbsentOperand { side: OperandSide::Left }),
        );
        prop_assert_eq!(
            ByTime::permitting_absent().compare_opt(Some(&present), None),
            Ok(Ordering::Greater),
        );
        prop_assert_eq!(
            ByTime::permitting_absent().compare_opt(None, Some(&present)),
            Ok(Ordering::Less),
        );
    }
}
