//! Tick callback that records the output curve of a run.
//!
//! Every `interval` frames the recorder takes one [`OutputSample`]: the
//! populations, the photon counters and the photons transmitted since the
//! previous sample. The samples are the data a renderer would plot as the
//! population and output graphs; the engine writes them into its report.

use lasing_core::runner::TickCallback;
use lasing_core::tick::Simulation;
use lasing_types::{PhotonCounts, PopulationCounts, TickSummary};
use serde::Serialize;
use tracing::debug;

/// One point on the output curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSample {
    /// Frame the sample was taken at.
    pub frame: u64,
    /// Fluorophore populations.
    pub population: PopulationCounts,
    /// Photon counters.
    pub photons: PhotonCounts,
    /// Photons transmitted since the previous sample.
    pub output_delta: u64,
}

/// Callback that samples the run at a fixed frame interval and tracks the
/// peak live photon count.
#[derive(Debug)]
pub struct OutputRecorder {
    /// Frames between samples (0 = never sample).
    interval: u64,
    /// Samples taken so far.
    samples: Vec<OutputSample>,
    /// Cumulative output at the previous sample.
    last_output: u64,
    /// Highest live photon count seen.
    peak_live: u32,
}

impl OutputRecorder {
    /// Create a recorder that samples every `interval` frames.
    pub const fn new(interval: u64) -> Self {
        Self {
            interval,
            samples: Vec::new(),
            last_output: 0,
            peak_live: 0,
        }
    }

    /// Highest live photon count seen.
    pub const fn peak_live(&self) -> u32 {
        self.peak_live
    }

    /// Consume the recorder and return its samples.
    pub fn into_samples(self) -> Vec<OutputSample> {
        self.samples
    }
}

impl TickCallback for OutputRecorder {
    fn on_tick(&mut self, summary: &TickSummary, _simulation: &mut Simulation) {
        self.peak_live = self.peak_live.max(summary.photons.live);

        if self.interval == 0 || summary.frame.checked_rem(self.interval) != Some(0) {
            return;
        }

        let output_total = summary.photons.output_total;
        let output_delta = output_total.saturating_sub(self.last_output);
        self.last_output = output_total;
        self.samples.push(OutputSample {
            frame: summary.frame,
            population: summary.population,
            photons: summary.photons,
            output_delta,
        });
        debug!(frame = summary.frame, output_delta, "Output sample recorded");
    }
}
