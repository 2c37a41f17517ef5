//! Core contract and data structures for the Braid discrete-event
//! simulation substrate.
//!
//! Braid models a simulation as a value: an application-defined state
//! plus a persistent queue of [`Occurrence`]s, advanced by pure events
//! that describe changes instead of performing them. Everything in this
//! crate is immutable and deterministic, which is what lets a driver
//! replay, branch, and retry timelines freely.
//!
//! # Modules
//!
//! - [`time`] -- Discrete [`Time`] and [`Duration`]; logical ticks, no
//!   wall clock.
//! - [`event`] -- The pure [`Event`] contract and the type-erased
//!   [`EventRef`] handle with value equality.
//! - [`changes`] -- Deferred [`Changes`] an event returns: a state
//!   transition and a queue transition, composable and pure.
//! - [`occurrence`] -- [`Occurrence`] pairs an event with its time; the
//!   [`ByTime`] comparator orders them.
//! - [`queue`] -- [`Occurrences`], the persistent structurally-shared
//!   priority queue with deterministic tie-breaking.
//!
//! [`Time`]: time::Time
//! [`Duration`]: time::Duration
//! [`Event`]: event::Event
//! [`EventRef`]: event::EventRef
//! [`Changes`]: changes::Changes
//! [`Occurrence`]: occurrence::Occurrence
//! [`ByTime`]: occurrence::ByTime
//! [`Occurrences`]: queue::Occurrences

pub mod changes;
pub mod event;
pub mod occurrence;
pub mod queue;
pub mod time;
