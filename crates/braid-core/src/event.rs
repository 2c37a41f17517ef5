//! The event contract: pure descriptions of what happens.
//!
//! An event is the only place where model logic lives. When the driver
//! reaches an occurrence it asks the event what it would change, handing it
//! a read-only view of the current state and the current time. The event
//! answers with a [`Changes`] value and touches nothing itself.
//!
//! # Design Principles
//!
//! - [`Event::affect`] is pure. Same state, same time, same answer. The
//!   engine relies on this for reproducible runs and for speculatively
//!   re-evaluating an event (branching, retry) without side effects.
//! - Events are compared by value, not identity. Two separately built
//!   events of the same type with the same fields are the same event.
//!   This is what makes removal by value from the queue expressible.
//! - An event never removes itself from the queue implicitly. If its
//!   changes do not cancel the occurrence that triggered it, the driver
//!   will find that same occurrence again next step. Self-cancellation is
//!   part of the model author's contract.

use std::any::Any;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::changes::Changes;
use crate::time::Time;

/// A pure description of something that can happen to a simulation.
///
/// Implementors describe, never perform: [`Event::affect`] inspects the
/// state it is given and returns the changes that should follow, leaving
/// both the state and the queue untouched.
///
/// The supertraits make events loggable and shareable across threads;
/// `'static` allows the type-erased layer to recover the concrete type
/// for value comparison.
pub trait Event<State>: std::fmt::Debug + Send + Sync + 'static {
    /// Describe the changes this event causes when it happens.
    ///
    /// `state` is the simulation state at the moment the event fires and
    /// `at` is that moment. The returned [`Changes`] carries both the
    /// state transition and the queue transition; returning
    /// [`Changes::none`] is the explicit way to say "nothing happens".
    fn affect(&self, state: &State, at: Time) -> Changes<State>;
}

/// Object-safe layer over [`Event`] adding value equality and hashing.
///
/// Trait objects cannot require `PartialEq` or `Hash` directly, so the
/// queue stores `dyn DynEvent<State>` and routes comparisons through
/// [`DynEvent::dyn_eq`], which downcasts to the concrete type. The
/// blanket impl below covers every event type that derives the usual
/// comparison traits; application code never implements this by hand.
pub trait DynEvent<State>: Event<State> {
    /// View the event as [`Any`] for concrete-type recovery.
    fn as_any(&self) -> &dyn Any;

    /// Value equality across type-erased events.
    ///
    /// Events of different concrete types are never equal.
    fn dyn_eq(&self, other: &dyn DynEvent<State>) -> bool;

    /// Feed the event's value into `hasher`.
    fn dyn_hash(&self, hasher: &mut dyn Hasher);
}

impl<State: 'static, E> DynEvent<State> for E
where
    E: Event<State> + PartialEq + Eq + Hash,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynEvent<State>) -> bool {
        other.as_any().downcast_ref::<E>().is_some_and(|event| event == self)
    }

    fn dyn_hash(&self, mut hasher: &mut dyn Hasher) {
        self.hash(&mut hasher);
    }
}

/// A shared handle to a type-erased event.
///
/// Cloning is cheap and never copies the event itself, which is what lets
/// one event value sit in an occurrence, a snapshot of the queue, and a
/// model's own bookkeeping at the same time.
pub type EventRef<State> = Arc<dyn DynEvent<State>>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    #[derive(Debug, PartialEq, Eq, Hash)]
    struct Bump(u32);

    impl Event<u64> for Bump {
        fn affect(&self, _state: &u64, _at: Time) -> Changes<u64> {
            Changes::none()
        }
    }

    #[derive(Debug, PartialEq, Eq, Hash)]
    struct Halt;

    impl Event<u64> for Halt {
        fn affect(&self, _state: &u64, _at: Time) -> Changes<u64> {
            Changes::none()
        }
    }

    fn hash_of(event: &dyn DynEvent<u64>) -> u64 {
        let mut hasher = DefaultHasher::new();
        event.dyn_hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn same_type_same_fields_are_equal() {
        let a: EventRef<u64> = Arc::new(Bump(3));
        let b: EventRef<u64> = Arc::new(Bump(3));
        assert!(a.dyn_eq(b.as_ref()));
        assert!(b.dyn_eq(a.as_ref()));
    }

    #[test]
    fn same_type_different_fields_are_unequal() {
        let a: EventRef<u64> = Arc::new(Bump(3));
        let b: EventRef<u64> = Arc::new(Bump(4));
        assert!(!a.dyn_eq(b.as_ref()));
    }

    #[test]
    fn different_types_are_never_equal() {
        let a: EventRef<u64> = Arc::new(Bump(0));
        let b: EventRef<u64> = Arc::new(Halt);
        assert!(!a.dyn_eq(b.as_ref()));
        assert!(!b.dyn_eq(a.as_ref()));
    }

    #[test]
    fn equal_events_hash_alike() {
        let a: EventRef<u64> = Arc::new(Bump(7));
        let b: EventRef<u64> = Arc::new(Bump(7));
        assert_eq!(hash_of(a.as_ref()), hash_of(b.as_ref()));
    }

    #[test]
    fn clone_shares_the_same_event() {
        let a: EventRef<u64> = Arc::new(Bump(1));
        let b = Arc::clone(&a);
        assert!(a.dyn_eq(b.as_ref()));
        assert_eq!(Arc::strong_count(&a), 2);
    }
}
