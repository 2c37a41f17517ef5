//! Demo engine binary for the Braid simulation engine.
//!
//! Drives the deterministic single-server workshop model with the bounded
//! runner: jobs arrive on a fixed cadence, wait their turn, and are served
//! one at a time. The run is fully reproducible; rerunning the same
//! configuration prints the same trace and the same final state.
//!
//! # Startup Sequence
//!
//! 1. Load run configuration and model parameters from `braid-config.yaml`
//! 2. Initialize structured logging (tracing; `RUST_LOG` overrides the
//!    configured level)
//! 3. Build the initial timeline from the model parameters
//! 4. Run the bounded loop
//! 5. Log the result and print the final state as JSON

mod error;
mod model;

use std::path::Path;

use braid_core::occurrence::Occurrence;
use braid_runner::config::RunConfig;
use braid_runner::runner::{self, StepObserver};
use braid_runner::timeline::Timeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::model::{ModelSection, WorkshopState};

/// Logs each firing with the workshop counters it produced.
struct StepTrace;

impl StepObserver<WorkshopState> for StepTrace {
    fn on_step(
        &mut self,
        steps: u64,
        occurrence: &Occurrence<WorkshopState>,
        timeline: &Timeline<WorkshopState>,
    ) {
        let state = timeline.state();
        info!(
            step = steps,
            time = %occurrence.time(),
            waiting = state.waiting,
            in_service = state.in_service,
            completed = state.completed,
            "Workshop advanced"
        );
    }
}

/// Application entry point for the demo engine.
///
/// Loads configuration, builds the workshop timeline, and runs it to one
/// of the configured stopping rules.
///
/// # Errors
///
/// Returns an error if configuration loading fails or the final state
/// cannot be serialized.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_source) = load_run_config()?;
    let model = load_model_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("braid-engine starting");
    info!(
        source = config_source,
        max_steps = config.run.max_steps,
        until_time = ?config.run.until_time,
        level = config.logging.level,
        "Configuration loaded"
    );
    info!(
        interarrival_ticks = model.interarrival_ticks,
        service_ticks = model.service_ticks,
        jobs = model.jobs,
        "Model parameters loaded"
    );

    // 3. Build the initial timeline.
    let timeline = model::initial_timeline(&model);
    info!(queued = timeline.occurrences().len(), "Initial timeline built");

    // 4. Run the bounded loop.
    let bounds = config.bounds();
    let result = runner::run(timeline, &bounds, &mut StepTrace);

    // 5. Log the result and print the final state.
    runner::log_run_end(&result);

    let final_state = serde_json::to_string_pretty(result.timeline.state())?;
    println!("{final_state}");

    info!(
        end_reason = ?result.end_reason,
        steps = result.steps,
        "braid-engine shutdown complete"
    );

    Ok(())
}

/// Load the run configuration from `braid-config.yaml`.
///
/// Looks for the config file relative to the current working directory;
/// if it does not exist, defaults are used. The returned string names the
/// source, for logging once the subscriber is up.
fn load_run_config() -> Result<(RunConfig, &'static str), EngineError> {
    let config_path = Path::new("braid-config.yaml");
    if config_path.exists() {
        let config = RunConfig::from_file(config_path)?;
        Ok((config, "braid-config.yaml"))
    } else {
        Ok((RunConfig::default(), "defaults"))
    }
}

/// Load model parameters from `braid-config.yaml`.
///
/// Reads the `model` section from the YAML config file. If the file does
/// not exist or lacks the `model` key, defaults are used.
fn load_model_config() -> Result<ModelSection, EngineError> {
    let config_path = Path::new("braid-config.yaml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path).map_err(|e| EngineError::Model {
            message: format!("could not read braid-config.yaml: {e}"),
        })?;

        // Parse the full YAML and extract just the "model" section.
        let raw: serde_yml::Value =
            serde_yml::from_str(&contents).map_err(|e| EngineError::Model {
                message: format!("braid-config.yaml is not valid YAML: {e}"),
            })?;

        if let Some(model_value) = raw.get("model") {
            let model: ModelSection =
                serde_yml::from_value(model_value.clone()).map_err(|e| EngineError::Model {
                    message: format!("the `model` section is malformed: {e}"),
                })?;
            Ok(model)
        } else {
            Ok(ModelSection::default())
        }
    } else {
        Ok(ModelSection::default())
    }
}
