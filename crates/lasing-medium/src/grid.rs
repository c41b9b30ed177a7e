//! The fluorophore lattice and its per-cell stochastic rule.
//!
//! [`FluorophoreGrid`] owns a row-major array of [`FluorophoreState`] cells
//! and the three population counters. Every state mutation goes through a
//! single private transition method that updates the counters in the same
//! step, so `ground + excited + lasing == cell_count` holds after every
//! call without ever rescanning the lattice.
//!
//! # Per-cell rule
//!
//! | From    | Draw                          | To      |
//! |---------|-------------------------------|---------|
//! | Ground  | `pump`                        | Excited |
//! | Excited | `pump` (checked first)        | Ground  |
//! | Excited | else `isc`                    | Lasing  |
//! | Lasing  | `decay`                       | Ground  |
//!
//! A Lasing -> Ground decay additionally emits a spontaneous photon with
//! probability `spontaneous_fraction`. The grid only reports the emission
//! site; the photon pool creates the photon.

use lasing_types::{CellPosition, CellSnapshot, FluorophoreState, PopulationCounts};
use rand::Rng;
use tracing::debug;

use crate::config::{self, MediumConfig, TransitionRates};
use crate::conservation::{self, ConservationResult};
use crate::error::MediumError;

/// Outcome of one stochastic trial on a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellUpdate {
    /// State before the trial.
    pub from: FluorophoreState,
    /// State after the trial.
    pub to: FluorophoreState,
    /// Whether a Lasing -> Ground decay emitted a spontaneous photon.
    pub emitted: bool,
}

/// The 2-D lattice of fluorophores.
#[derive(Debug, Clone)]
pub struct FluorophoreGrid {
    /// Number of columns.
    width: u32,
    /// Number of rows.
    height: u32,
    /// Row-major cell states, `width * height` entries.
    cells: Vec<FluorophoreState>,
    /// Incrementally maintained population counters.
    counts: PopulationCounts,
    /// Validated transition probabilities.
    rates: TransitionRates,
}

impl FluorophoreGrid {
    /// Build a lattice from configuration with every cell in the ground state.
    ///
    /// # Errors
    ///
    /// Returns a [`MediumError`] if a dimension is zero, the lattice is too
    /// large, or any rate is not a probability.
    pub fn new(config: &MediumConfig) -> Result<Self, MediumError> {
        let rates = config.rates()?;
        Self::from_parts(config.width, config.height, rates)
    }

    /// Build a lattice from explicit dimensions and validated rates.
    ///
    /// # Errors
    ///
    /// Returns [`MediumError::InvalidDimension`] or
    /// [`MediumError::LatticeTooLarge`] for unusable dimensions.
    pub fn from_parts(width: u32, height: u32, rates: TransitionRates) -> Result<Self, MediumError> {
        let cell_count = config::cell_count(width, height)?;
        let len = usize::try_from(cell_count)
            .map_err(|_err| MediumError::LatticeTooLarge { width, height })?;

        Ok(Self {
            width,
            height,
            cells: vec![FluorophoreState::Ground; len],
            counts: PopulationCounts {
                ground: cell_count,
                excited: 0,
                lasing: 0,
            },
            rates,
        })
    }

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells. Never changes after construction.
    pub fn cell_count(&self) -> u32 {
        u32::try_from(self.cells.len()).unwrap_or(u32::MAX)
    }

    /// Current population counters.
    pub const fn counts(&self) -> PopulationCounts {
        self.counts
    }

    /// The transition probabilities in force.
    pub const fn rates(&self) -> TransitionRates {
        self.rates
    }

    /// Row-major index of `position`, or `None` if it is off the lattice.
    fn index(&self, position: CellPosition) -> Option<usize> {
        if position.row >= self.height || position.column >= self.width {
            return None;
        }
        let flat = position
            .row
            .checked_mul(self.width)?
            .checked_add(position.column)?;
        usize::try_from(flat).ok()
    }

    /// State of the cell at `position`, or `None` if it is off the lattice.
    pub fn state(&self, position: CellPosition) -> Option<FluorophoreState> {
        let index = self.index(position)?;
        self.cells.get(index).copied()
    }

    /// Map signed lattice coordinates to a position on the lattice.
    ///
    /// Used by photons, whose coordinates can be negative or past the far
    /// edge of the medium.
    pub fn position_at(&self, column: i64, row: i64) -> Option<CellPosition> {
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        let position = CellPosition::new(row, column);
        self.index(position).map(|_| position)
    }

    /// Move the cell at `index` to `next`, updating the counters in the same
    /// step. Returns the previous state.
    fn transition(&mut self, index: usize, next: FluorophoreState) -> Option<FluorophoreState> {
        let cell = self.cells.get_mut(index)?;
        let previous = *cell;
        if previous != next {
            *cell = next;
            let from = counter_mut(&mut self.counts, previous);
            *from = from.saturating_sub(1);
            let to = counter_mut(&mut self.counts, next);
            *to = to.saturating_add(1);
        }
        Some(previous)
    }

    /// Apply one stochastic trial to the cell at `index`.
    fn trial(&mut self, index: usize, rng: &mut impl Rng) -> Option<CellUpdate> {
        let from = self.cells.get(index).copied()?;
        let (to, emitted) = next_state(from, &self.rates, rng);
        self.transition(index, to)?;
        Some(CellUpdate { from, to, emitted })
    }

    /// Apply one stochastic trial to a single cell.
    ///
    /// # Errors
    ///
    /// Returns [`MediumError::CellOutOfBounds`] if `position` is off the
    /// lattice.
    pub fn update_cell(
        &mut self,
        position: CellPosition,
        rng: &mut impl Rng,
    ) -> Result<CellUpdate, MediumError> {
        let out_of_bounds = MediumError::CellOutOfBounds {
            row: position.row,
            column: position.column,
        };
        let index = self.index(position).ok_or_else(|| out_of_bounds.clone())?;
        self.trial(index, rng).ok_or(out_of_bounds)
    }

    /// Apply one independent trial to every cell, in row-major order.
    ///
    /// Returns the positions of cells that emitted a spontaneous photon this
    /// tick, in traversal order.
    pub fn update_all(&mut self, rng: &mut impl Rng) -> Vec<CellPosition> {
        let width = self.width;
        let positions = (0..self.height)
            .flat_map(move |row| (0..width).map(move |column| CellPosition::new(row, column)));

        let mut emissions = Vec::new();
        for (index, position) in positions.enumerate() {
            if self.trial(index, rng).is_some_and(|update| update.emitted) {
                emissions.push(position);
            }
        }
        emissions
    }

    /// Stimulated emission: force a Lasing cell to the ground state.
    ///
    /// Returns `true` if the cell was Lasing and has been de-excited. Cells
    /// in any other state, and positions off the lattice, are left alone.
    /// This path never applies the spontaneous emission fraction.
    pub fn stimulate(&mut self, position: CellPosition) -> bool {
        let Some(index) = self.index(position) else {
            return false;
        };
        if self.cells.get(index) != Some(&FluorophoreState::Lasing) {
            return false;
        }
        self.transition(index, FluorophoreState::Ground).is_some()
    }

    /// Overwrite the state of one cell, keeping the counters consistent.
    ///
    /// This bypasses the transition rule and exists for seeding scenarios
    /// (for example a pre-inverted medium). Returns the previous state.
    ///
    /// # Errors
    ///
    /// Returns [`MediumError::CellOutOfBounds`] if `position` is off the
    /// lattice.
    pub fn set_state(
        &mut self,
        position: CellPosition,
        state: FluorophoreState,
    ) -> Result<FluorophoreState, MediumError> {
        let out_of_bounds = MediumError::CellOutOfBounds {
            row: position.row,
            column: position.column,
        };
        let index = self.index(position).ok_or_else(|| out_of_bounds.clone())?;
        self.transition(index, state).ok_or(out_of_bounds)
    }

    /// Return every cell to the ground state.
    pub fn reset(&mut self) {
        self.cells.fill(FluorophoreState::Ground);
        self.counts = PopulationCounts {
            ground: self.cell_count(),
            excited: 0,
            lasing: 0,
        };
        debug!(cells = self.cells.len(), "Medium reset to ground state");
    }

    /// Enumerate every cell with its position, row-major.
    pub fn cells(&self) -> impl Iterator<Item = CellSnapshot> + '_ {
        let width = self.width;
        (0..self.height)
            .flat_map(move |row| (0..width).map(move |column| CellPosition::new(row, column)))
            .zip(self.cells.iter().copied())
            .map(|(position, state)| CellSnapshot { position, state })
    }

    /// Rescan the lattice and compare it with the incremental counters.
    pub fn audit(&self) -> ConservationResult {
        conservation::verify_population(&self.cells, self.counts)
    }
}

/// The counter that tracks `state`.
const fn counter_mut(counts: &mut PopulationCounts, state: FluorophoreState) -> &mut u32 {
    match state {
        FluorophoreState::Ground => &mut counts.ground,
        FluorophoreState::Excited => &mut counts.excited,
        FluorophoreState::Lasing => &mut counts.lasing,
    }
}

/// The per-cell rule. Returns the next state and whether a spontaneous
/// photon was emitted.
fn next_state(
    state: FluorophoreState,
    rates: &TransitionRates,
    rng: &mut impl Rng,
) -> (FluorophoreState, bool) {
    match state {
        FluorophoreState::Ground => {
            if rates.pump.sample(rng) {
                (FluorophoreState::Excited, false)
            } else {
                (FluorophoreState::Ground, false)
            }
        }
        FluorophoreState::Excited => {
            // The two draws are exclusive: isc is only tried if reversion failed.
            if rates.pump.sample(rng) {
                (FluorophoreState::Ground, false)
            } else if rates.isc.sample(rng) {
                (FluorophoreState::Lasing, false)
            } else {
                (FluorophoreState::Excited, false)
            }
        }
        FluorophoreState::Lasing => {
            if rates.decay.sample(rng) {
                let emitted = rates.spontaneous_fraction.sample(rng);
                (FluorophoreState::Ground, emitted)
            } else {
                (FluorophoreState::Lasing, false)
            }
        }
    }
}
