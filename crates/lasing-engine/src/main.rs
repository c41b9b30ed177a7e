//! Headless engine binary for the lasing threshold simulation.
//!
//! Loads configuration, builds the simulation, runs it for the configured
//! number of ticks and prints a JSON run report on stdout. Logs go to
//! stderr so the report can be piped.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `lasing-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Build the simulation
//! 4. Run the bounded simulation loop with the output recorder
//! 5. Log the result and print the report
//!
//! A runaway photon population is fatal: the report is still printed, then
//! the process exits with an error.

mod error;
mod recorder;

use std::path::{Path, PathBuf};

use lasing_core::config::SimulationConfig;
use lasing_core::runner::{self, RunResult};
use lasing_core::tick::Simulation;
use lasing_types::RunEndReason;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::recorder::{OutputRecorder, OutputSample};

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "lasing-config.yaml";

/// Everything the engine reports about a run.
#[derive(Debug, Serialize)]
struct RunReport {
    /// Outcome of the run loop.
    result: RunResult,
    /// Highest live photon count seen.
    peak_live_photons: u32,
    /// The output curve.
    samples: Vec<OutputSample>,
    /// The configuration the run used.
    config: SimulationConfig,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration or start-up fails, or if the run ends
/// in runaway divergence.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, found) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("lasing-engine starting");
    if found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Build the simulation.
    let mut simulation = Simulation::new(&config)?;
    info!(
        cells = simulation.grid().cell_count(),
        max_live_photons = config.photons.max_live,
        max_ticks = config.simulation.max_ticks,
        "Simulation state assembled, entering tick loop"
    );

    // 4. Run.
    let mut recorder = OutputRecorder::new(config.logging.summary_interval_ticks);
    let result = runner::run_simulation(
        &mut simulation,
        config.simulation.max_ticks,
        &config.logging,
        &mut recorder,
    )?;

    // 5. Report.
    runner::log_simulation_end(&result);
    let end_reason = result.end_reason;
    let final_frame = result.final_frame;
    let report = RunReport {
        result,
        peak_live_photons: recorder.peak_live(),
        samples: recorder.into_samples(),
        config,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if end_reason == RunEndReason::RunawayDivergence {
        error!(frame = final_frame, "lasing-engine aborted");
        return Err(EngineError::Runaway { frame: final_frame });
    }

    info!("lasing-engine shutdown complete");
    Ok(())
}

/// Load the simulation configuration.
///
/// A missing file is not an error: the defaults are used and the second
/// element of the result is `false`.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}
