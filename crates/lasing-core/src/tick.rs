//! The simulation step: one frame of medium and photon dynamics.
//!
//! Each call to [`Simulation::step`] runs these phases in a fixed order:
//!
//! 1. **Clock** -- advance the frame counter.
//! 2. **Cavity** -- let the Q controller select this frame's level, so every
//!    output coupler draw in the frame sees the same reflectivity.
//! 3. **Medium** -- one independent trial per fluorophore; decays that emit
//!    are collected as spontaneous emission sites.
//! 4. **Emission** -- one photon per site, random direction.
//! 5. **Photons** -- move, reflect, transmit and remove every live photon,
//!    and apply stimulated emission against the freshly updated medium.
//!
//! All state is owned by [`Simulation`] and changes only through
//! [`Simulation::step`], [`Simulation::reset`] and the Q control methods.
//! Given the same seed and the same sequence of calls, a run is fully
//! reproducible.

use lasing_cavity::{CavityController, CavityError, CavityGeometry, PassReport, PhotonPool};
use lasing_medium::{ConservationResult, FluorophoreGrid};
use lasing_types::{
    CellPosition, FrameSnapshot, PhotonCounts, PopulationCounts, QLevel, QMode, TickSummary,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info};

use crate::clock::{ClockError, FrameClock};
use crate::config::{ConfigError, SimulationConfig};

/// Errors that can occur while building or stepping the simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The configuration was rejected.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The photon population diverged. The simulation is halted.
    #[error("frame {frame}: {source}")]
    Runaway {
        /// Frame during which the ceiling was crossed.
        frame: u64,
        /// The underlying cavity error.
        source: CavityError,
    },

    /// A previous runaway halted the simulation; only [`Simulation::reset`]
    /// can resume it.
    #[error("simulation halted after runaway divergence at frame {frame}")]
    Halted {
        /// Frame at which the simulation halted.
        frame: u64,
    },
}

/// The complete simulation state.
///
/// Owns the medium, the photon pool, the cavity controller, the frame clock
/// and the random stream. Readers take snapshots between steps; nothing
/// else holds references into it.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Frame counter.
    clock: FrameClock,
    /// The fluorophore lattice.
    grid: FluorophoreGrid,
    /// The live photon set.
    pool: PhotonPool,
    /// Output coupler Q control.
    cavity: CavityController,
    /// The single random stream for every draw in the model.
    rng: SmallRng,
    /// Seed the random stream was created from.
    seed: u64,
    /// Set on runaway divergence; cleared by reset.
    halted: bool,
}

impl Simulation {
    /// Build a simulation in its initial condition: frame 0, every cell in
    /// the ground state, no photons.
    ///
    /// The random stream is seeded from `simulation.seed`, or from OS
    /// entropy when no seed is configured. The seed is logged either way.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] if any section of `config` is
    /// invalid.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let grid = FluorophoreGrid::new(&config.medium).map_err(ConfigError::from)?;
        let geometry = CavityGeometry::new(&config.cavity, grid.width(), grid.height())
            .map_err(ConfigError::from)?;
        let cavity = CavityController::new(&config.cavity, &geometry).map_err(ConfigError::from)?;
        let pool = PhotonPool::new(&config.photons, geometry).map_err(ConfigError::from)?;

        let seed = config
            .simulation
            .seed
            .unwrap_or_else(|| rand::rng().random());

        info!(
            seed,
            seeded = config.simulation.seed.is_some(),
            width = grid.width(),
            height = grid.height(),
            cavity_length = config.cavity.length,
            round_trip_period = cavity.period(),
            q_mode = ?cavity.mode(),
            "Simulation created"
        );

        Ok(Self {
            clock: FrameClock::new(),
            grid,
            pool,
            cavity,
            rng: SmallRng::seed_from_u64(seed),
            seed,
            halted: false,
        })
    }

    /// Advance the simulation by one frame.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Runaway`] if the live photon count crosses
    /// the ceiling during this frame; the simulation is then halted and
    /// every later call returns [`SimulationError::Halted`] until
    /// [`Simulation::reset`]. Returns [`SimulationError::Clock`] if the
    /// frame counter would overflow.
    pub fn step(&mut self) -> Result<TickSummary, SimulationError> {
        if self.halted {
            return Err(SimulationError::Halted {
                frame: self.clock.frame(),
            });
        }

        let frame = self.clock.advance()?;
        self.cavity.tick(frame);
        let q_level = self.cavity.current_level();
        let q_value = self.cavity.current_q();

        let sites = self.grid.update_all(&mut self.rng);
        let report = match self.advance_photons(&sites) {
            Ok(report) => report,
            Err(source) => {
                self.halted = true;
                error!(frame, %source, "Runaway divergence, simulation halted");
                return Err(SimulationError::Runaway { frame, source });
            }
        };

        let summary = TickSummary {
            frame,
            q_level,
            q_value,
            population: self.grid.counts(),
            photons: self.pool.counts(),
            spontaneous_emissions: u32::try_from(sites.len()).unwrap_or(u32::MAX),
            stimulated_emissions: report.stimulated,
            transmitted: report.transmitted,
            removed: report.removed,
        };

        debug!(
            frame,
            q = ?q_level,
            ground = summary.population.ground,
            excited = summary.population.excited,
            lasing = summary.population.lasing,
            live = summary.photons.live,
            output_total = summary.photons.output_total,
            "Frame complete"
        );

        Ok(summary)
    }

    /// Emit this frame's spontaneous photons, then run the photon pass.
    fn advance_photons(&mut self, sites: &[CellPosition]) -> Result<PassReport, CavityError> {
        for &cell in sites {
            self.pool.emit_spontaneous(cell, &mut self.rng)?;
        }
        self.pool
            .update_all(&mut self.grid, &self.cavity, &mut self.rng)
    }

    /// Return to the initial condition: frame 0, every cell in the ground
    /// state, no photons, zero output.
    ///
    /// The Q mode and manual level are kept; the automatic schedule is
    /// re-evaluated for frame 0. The random stream is not reseeded.
    /// Clears a runaway halt.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.grid.reset();
        self.pool.clear();
        self.cavity.tick(0);
        self.halted = false;
        info!(
            cells = self.grid.cell_count(),
            q_mode = ?self.cavity.mode(),
            "Simulation reset"
        );
    }

    // --- Q control ------------------------------------------------------

    /// Switch between automatic and manual Q control.
    pub fn set_q_mode(&mut self, mode: QMode) {
        self.cavity.set_mode(mode);
    }

    /// Flip between automatic and manual Q control. Returns the new mode.
    pub fn toggle_q_mode(&mut self) -> QMode {
        self.cavity.toggle_mode()
    }

    /// Set the level used in manual mode.
    pub fn set_manual_q_level(&mut self, level: QLevel) {
        self.cavity.set_manual_level(level);
    }

    // --- Read accessors -------------------------------------------------

    /// Frames executed since the last reset.
    pub const fn frame(&self) -> u64 {
        self.clock.frame()
    }

    /// Seed of the random stream.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether a runaway has halted the simulation.
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// Current Q control mode.
    pub const fn q_mode(&self) -> QMode {
        self.cavity.mode()
    }

    /// Current Q level.
    pub const fn q_level(&self) -> QLevel {
        self.cavity.current_level()
    }

    /// Current output coupler reflectivity.
    pub const fn q_value(&self) -> f64 {
        self.cavity.current_q()
    }

    /// Fluorophore populations.
    pub const fn population(&self) -> PopulationCounts {
        self.grid.counts()
    }

    /// Photon counters.
    pub fn photon_counts(&self) -> PhotonCounts {
        self.pool.counts()
    }

    /// The fluorophore lattice.
    pub const fn grid(&self) -> &FluorophoreGrid {
        &self.grid
    }

    /// The live photon set.
    pub const fn pool(&self) -> &PhotonPool {
        &self.pool
    }

    /// The Q controller.
    pub const fn cavity(&self) -> &CavityController {
        &self.cavity
    }

    /// Rescan the lattice and compare it with the population counters.
    pub fn audit(&self) -> ConservationResult {
        self.grid.audit()
    }

    /// Everything a renderer reads between two frames.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame(),
            q_mode: self.q_mode(),
            q_level: self.q_level(),
            q_value: self.q_value(),
            population: self.population(),
            photons: self.photon_counts(),
            cells: self.grid.cells().collect(),
            photon_positions: self.pool.photons().collect(),
        }
    }
}
