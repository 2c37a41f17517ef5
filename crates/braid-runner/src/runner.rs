//! Bounded driver loop for timelines.
//!
//! This module provides [`run`], the top-level function that repeatedly
//! steps a [`Timeline`] with support for:
//!
//! - **Bounded runs**: stop once `max_steps` occurrences have fired
//! - **Time horizon**: stop before firing anything later than `until`
//! - **Step observation**: a callback after every firing
//! - **Exhaustion**: clean stop when the queue empties
//!
//! The runner wraps the single-step [`Timeline::step`] function and adds
//! the stopping rules and logging around it. It owns no policy beyond
//! that; which occurrence fires, and what firing means, is decided
//! entirely by the core.

use braid_core::occurrence::Occurrence;
use braid_core::time::Time;
use tracing::{debug, info, warn};

use crate::timeline::{StepResult, Timeline};

/// Stopping rules for a run.
///
/// The default is unbounded on both axes: the run only ends when the
/// queue is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunBounds {
    /// Stop once this many occurrences have fired. `None` means no limit.
    pub max_steps: Option<u64>,
    /// Inclusive time horizon. An occurrence fires iff its time is at or
    /// before this. `None` means no horizon.
    pub until: Option<Time>,
}

impl RunBounds {
    /// Whether `steps` firings have used up the step budget.
    pub fn step_limit_reached(&self, steps: u64) -> bool {
        self.max_steps.is_some_and(|max| steps >= max)
    }

    /// Whether an occurrence at `next` lies beyond the horizon.
    pub fn horizon_passed(&self, next: Time) -> bool {
        self.until.is_some_and(|until| next > until)
    }
}

/// The reason a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The occurrence queue became empty.
    Exhausted,
    /// The configured number of steps fired.
    StepLimit,
    /// The next occurrence lies beyond the configured horizon.
    TimeHorizon,
}

/// Result of a run.
#[derive(Debug)]
pub struct RunResult<State: 'static> {
    /// The reason the run ended.
    pub end_reason: EndReason,
    /// Total number of occurrences fired.
    pub steps: u64,
    /// The timeline as of the last firing.
    pub timeline: Timeline<State>,
}

/// Callback invoked after each occurrence fires.
///
/// Implementations can use this to collect traces, update progress
/// displays, etc. The callback receives the step count so far, the
/// occurrence that fired, and the timeline it produced.
pub trait StepObserver<State: 'static> {
    /// Called after an occurrence fires.
    fn on_step(&mut self, steps: u64, occurrence: &Occurrence<State>, timeline: &Timeline<State>);
}

/// A no-op step observer for unobserved runs.
pub struct NoOpObserver;

impl<State: 'static> StepObserver<State> for NoOpObserver {
    fn on_step(
        &mut self,
        _steps: u64,
        _occurrence: &Occurrence<State>,
        _timeline: &Timeline<State>,
    ) {
    }
}

/// Run a timeline until a stopping rule fires.
///
/// This is the main entry point for a bounded run. Stopping rules are
/// checked before each firing, in this order: step limit, time horizon,
/// queue exhaustion. An occurrence exactly at the horizon still fires.
///
/// # Arguments
///
/// * `timeline` - The initial state and its scheduled occurrences
/// * `bounds` - Stopping rules for the run
/// * `observer` - Called after each firing
///
/// # Returns
///
/// Returns a [`RunResult`] describing why the run ended, how many
/// occurrences fired, and the timeline they produced.
pub fn run<State: 'static>(
    timeline: Timeline<State>,
    bounds: &RunBounds,
    observer: &mut dyn StepObserver<State>,
) -> RunResult<State> {
    let mut current = timeline;
    let mut steps: u64 = 0;

    info!(
        max_steps = ?bounds.max_steps,
        until = ?bounds.until,
        queued = current.occurrences().len(),
        "Run starting"
    );

    loop {
        // --- Check step limit (before firing) ---
        if bounds.step_limit_reached(steps) {
            info!(steps, max_steps = ?bounds.max_steps, "Step limit reached");
            return RunResult {
                end_reason: EndReason::StepLimit,
                steps,
                timeline: current,
            };
        }

        // --- Check time horizon (before firing) ---
        if let Some(next) = current.occurrences().next_occurrence()
            && bounds.horizon_passed(next.time())
        {
            info!(next_time = %next.time(), until = ?bounds.until, "Time horizon reached");
            return RunResult {
                end_reason: EndReason::TimeHorizon,
                steps,
                timeline: current,
            };
        }

        // --- Fire the next occurrence ---
        match current.step() {
            StepResult::Fired {
                timeline,
                occurrence,
            } => {
                steps = steps.saturating_add(1);
                debug!(
                    step = steps,
                    time = %occurrence.time(),
                    event = ?occurrence.event(),
                    "Occurrence fired"
                );
                observer.on_step(steps, &occurrence, &timeline);
                current = timeline;
            }
            StepResult::Exhausted { timeline } => {
                info!(steps, "Occurrence queue exhausted");
                return RunResult {
                    end_reason: EndReason::Exhausted,
                    steps,
                    timeline,
                };
            }
        }
    }
}

/// Log the end of a run.
///
/// This should be called after [`run`] returns to emit the terminal
/// summary alongside whatever the driver does with the final state.
pub fn log_run_end<State: 'static>(result: &RunResult<State>) {
    info!(
        reason = ?result.end_reason,
        steps = result.steps,
        queued = result.timeline.occurrences().len(),
        "Run ended"
    );

    if result.steps == 0 {
        warn!("Run ended with no occurrences fired");
    }
}
