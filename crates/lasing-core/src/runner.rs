//! Bounded simulation loop.
//!
//! [`run_simulation`] drives [`Simulation::step`] until a tick bound is
//! reached or the photon population runs away, and adds the diagnostics
//! around it:
//!
//! - **Periodic summaries**: population and photon counters at `info`
//!   every `summary_interval_ticks`.
//! - **Conservation audits**: a full lattice rescan every
//!   `audit_interval_ticks`, logged at `error` on mismatch.
//! - **Callbacks**: a [`TickCallback`] sees every completed tick, for
//!   renderers and recorders.
//!
//! [`Simulation::step`]: crate::tick::Simulation::step

use chrono::{DateTime, Utc};
use lasing_medium::ConservationResult;
use lasing_types::{RunEndReason, RunId, TickSummary};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::LoggingConfig;
use crate::tick::{Simulation, SimulationError};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A step failed for a reason other than runaway divergence.
    #[error("step error: {source}")]
    Step {
        /// The underlying simulation error.
        #[from]
        source: SimulationError,
    },
}

/// Result of a simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Unique identifier of this run.
    pub run_id: RunId,
    /// Seed of the random stream, for replay.
    pub seed: u64,
    /// Wall-clock start time.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end time.
    pub ended_at: DateTime<Utc>,
    /// The reason the run ended.
    pub end_reason: RunEndReason,
    /// Total number of ticks that completed.
    pub total_ticks: u64,
    /// Frame at which the run ended.
    pub final_frame: u64,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Conservation anomalies found by periodic audits.
    pub anomalies: u32,
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to feed a renderer, record a trace, or
/// forward Q control events. The callback receives the tick summary and
/// mutable access to the simulation, so it may call the Q control methods
/// between ticks.
pub trait TickCallback {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, simulation: &mut Simulation);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _simulation: &mut Simulation) {}
}

/// Run the simulation until `max_ticks` ticks have completed (0 = no bound)
/// or the photon population runs away.
///
/// Runaway divergence ends the run with
/// [`RunEndReason::RunawayDivergence`]; the simulation is left halted and
/// deciding whether that is fatal is up to the caller.
///
/// # Errors
///
/// Returns [`RunnerError`] if a step fails for any other reason (the
/// simulation was already halted, or the frame counter overflowed).
pub fn run_simulation(
    simulation: &mut Simulation,
    max_ticks: u64,
    logging: &LoggingConfig,
    callback: &mut dyn TickCallback,
) -> Result<RunResult, RunnerError> {
    let run_id = RunId::new();
    let started_at = Utc::now();
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut anomalies: u32 = 0;

    info!(
        %run_id,
        seed = simulation.seed(),
        max_ticks,
        start_frame = simulation.frame(),
        q_mode = ?simulation.q_mode(),
        "Simulation starting"
    );

    let end_reason = loop {
        if max_ticks > 0 && total_ticks >= max_ticks {
            info!(total_ticks, max_ticks, "Tick limit reached");
            break RunEndReason::MaxTicksReached;
        }

        let summary = match simulation.step() {
            Ok(summary) => summary,
            Err(SimulationError::Runaway { frame, source }) => {
                error!(frame, %source, "Run aborted");
                break RunEndReason::RunawayDivergence;
            }
            Err(other) => return Err(other.into()),
        };
        total_ticks = total_ticks.saturating_add(1);

        callback.on_tick(&summary, simulation);

        if is_due(summary.frame, logging.summary_interval_ticks) {
            log_summary(&summary);
        }
        if is_due(summary.frame, logging.audit_interval_ticks)
            && let ConservationResult::Anomaly(anomaly) = simulation.audit()
        {
            error!(frame = summary.frame, %anomaly, "Population counters out of balance");
            anomalies = anomalies.saturating_add(1);
        }

        last_summary = Some(summary);
    };

    Ok(RunResult {
        run_id,
        seed: simulation.seed(),
        started_at,
        ended_at: Utc::now(),
        end_reason,
        total_ticks,
        final_frame: simulation.frame(),
        final_summary: last_summary,
        anomalies,
    })
}

/// Whether a periodic action with `interval` is due at `frame`.
fn is_due(frame: u64, interval: u64) -> bool {
    interval > 0 && frame.checked_rem(interval) == Some(0)
}

fn log_summary(summary: &TickSummary) {
    info!(
        frame = summary.frame,
        q = ?summary.q_level,
        ground = summary.population.ground,
        excited = summary.population.excited,
        lasing = summary.population.lasing,
        live = summary.photons.live,
        in_cavity = summary.photons.in_cavity,
        output_total = summary.photons.output_total,
        "Population summary"
    );
}

/// Log the simulation end sequence.
///
/// This should be called after [`run_simulation`] returns.
pub fn log_simulation_end(result: &RunResult) {
    let elapsed_ms = result
        .ended_at
        .signed_duration_since(result.started_at)
        .num_milliseconds();
    info!(
        run_id = %result.run_id,
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_frame = result.final_frame,
        elapsed_ms,
        anomalies = result.anomalies,
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            frame = summary.frame,
            ground = summary.population.ground,
            excited = summary.population.excited,
            lasing = summary.population.lasing,
            live = summary.photons.live,
            output_total = summary.photons.output_total,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}
