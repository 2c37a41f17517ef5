//! The demo model: a deterministic single-server workshop.
//!
//! Jobs arrive on a fixed cadence and are served one at a time for a
//! fixed duration; whoever finds the server busy waits in line. With both
//! intervals fixed there is no randomness anywhere, so every run of the
//! same parameters produces the same trace.
//!
//! Two event types drive the model:
//!
//! - [`Arrival`] -- a job shows up. It enters service if the server is
//!   idle (scheduling its own [`ServiceCompletion`]) or joins the queue,
//!   and schedules the next arrival while any remain.
//! - [`ServiceCompletion`] -- the server finishes a job. If jobs are
//!   waiting, the next one enters service immediately.
//!
//! Both events cancel their own occurrence as part of their changes, so
//! the run ends by exhaustion once the last job completes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use braid_core::changes::{Changes, OccurrencesChanges, StateChanges};
use braid_core::event::{Event, EventRef};
use braid_core::occurrence::Occurrence;
use braid_core::queue::Occurrences;
use braid_core::time::{Duration, Time};
use braid_runner::timeline::Timeline;

/// Counters for the single-server workshop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkshopState {
    /// Jobs that have arrived and are waiting for the server.
    pub waiting: u32,
    /// Whether a job is currently being served.
    pub in_service: bool,
    /// Jobs that have finished service.
    pub completed: u32,
}

/// Model parameters, as written in the `model` section of
/// `braid-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelSection {
    /// Ticks between consecutive job arrivals.
    #[serde(default = "default_interarrival_ticks")]
    pub interarrival_ticks: i64,

    /// Ticks the server spends on each job.
    #[serde(default = "default_service_ticks")]
    pub service_ticks: i64,

    /// Total number of jobs that will arrive.
    #[serde(default = "default_jobs")]
    pub jobs: u32,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            interarrival_ticks: default_interarrival_ticks(),
            service_ticks: default_service_ticks(),
            jobs: default_jobs(),
        }
    }
}

const fn default_interarrival_ticks() -> i64 {
    3
}

const fn default_service_ticks() -> i64 {
    5
}

const fn default_jobs() -> u32 {
    4
}

/// Build the initial timeline for the model: an idle workshop with the
/// first arrival scheduled at the epoch.
pub fn initial_timeline(model: &ModelSection) -> Timeline<WorkshopState> {
    if model.jobs == 0 {
        return Timeline::new(WorkshopState::default(), Occurrences::new());
    }

    let first: EventRef<WorkshopState> = Arc::new(Arrival {
        job: 1,
        remaining: model.jobs.saturating_sub(1),
        interarrival: Duration::new(model.interarrival_ticks),
        service: Duration::new(model.service_ticks),
    });
    let occurrences = Occurrences::new().with_new([Occurrence::new(Time::EPOCH, first)]);
    Timeline::new(WorkshopState::default(), occurrences)
}

/// A job arriving at the workshop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arrival {
    /// 1-based number of the arriving job.
    pub job: u32,
    /// Jobs still to arrive after this one.
    pub remaining: u32,
    /// Spacing between consecutive arrivals.
    pub interarrival: Duration,
    /// Fixed service duration for every job.
    pub service: Duration,
}

impl Event<WorkshopState> for Arrival {
    fn affect(&self, state: &WorkshopState, at: Time) -> Changes<WorkshopState> {
        let own: EventRef<WorkshopState> = Arc::new(*self);
        let mut to_occurrences = OccurrencesChanges::cancel(vec![Occurrence::new(at, own)]);

        // An arrival to an idle server enters service on the spot, which
        // fixes its completion time now.
        if !state.in_service {
            let completion: EventRef<WorkshopState> = Arc::new(ServiceCompletion {
                service: self.service,
            });
            to_occurrences = to_occurrences.then(OccurrencesChanges::schedule(vec![
                Occurrence::new(at.after(self.service), completion),
            ]));
        }

        if self.remaining > 0 {
            let next: EventRef<WorkshopState> = Arc::new(Self {
                job: self.job.saturating_add(1),
                remaining: self.remaining.saturating_sub(1),
                ..*self
            });
            to_occurrences = to_occurrences.then(OccurrencesChanges::schedule(vec![
                Occurrence::new(at.after(self.interarrival), next),
            ]));
        }

        Changes::new(
            StateChanges::new(|mut state: WorkshopState| {
                if state.in_service {
                    state.waiting = state.waiting.saturating_add(1);
                } else {
                    state.in_service = true;
                }
                state
            }),
            to_occurrences,
        )
    }
}

/// The server finishing the job currently in service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceCompletion {
    /// Fixed service duration for every job.
    pub service: Duration,
}

impl Event<WorkshopState> for ServiceCompletion {
    fn affect(&self, state: &WorkshopState, at: Time) -> Changes<WorkshopState> {
        let own: EventRef<WorkshopState> = Arc::new(*self);
        let mut to_occurrences = OccurrencesChanges::cancel(vec![Occurrence::new(at, own)]);

        // A waiting job takes the server the moment it frees up.
        if state.waiting > 0 {
            let next: EventRef<WorkshopState> = Arc::new(*self);
            to_occurrences = to_occurrences.then(OccurrencesChanges::schedule(vec![
                Occurrence::new(at.after(self.service), next),
            ]));
        }

        Changes::new(
            StateChanges::new(|mut state: WorkshopState| {
                state.completed = state.completed.saturating_add(1);
                if state.waiting > 0 {
                    state.waiting = state.waiting.saturating_sub(1);
                } else {
                    state.in_service = false;
                }
                state
            }),
            to_occurrences,
        )
    }
}
