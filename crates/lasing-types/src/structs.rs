//! Read-only snapshot structs consumed by the visualization layer.
//!
//! None of these types carry behavior: the simulation crates produce them
//! between ticks and renderers only read them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{FluorophoreState, QLevel, QMode};

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A lattice position inside the lasing medium.
///
/// `column` runs along the cavity axis (x), `row` across it (y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CellPosition {
    /// Row index, `0..medium_height`.
    pub row: u32,
    /// Column index, `0..medium_width`.
    pub column: u32,
}

impl CellPosition {
    /// Create a position from row and column indices.
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// A photon position in cavity/domain coordinates.
///
/// `x` is measured along the cavity axis from the left edge of the domain;
/// `y` is the medium row the photon travels along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PhotonPosition {
    /// Axial coordinate.
    pub x: i64,
    /// Transverse coordinate (medium row).
    pub y: i64,
}

// ---------------------------------------------------------------------------
// Aggregate counters
// ---------------------------------------------------------------------------

/// Fluorophore population split by state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PopulationCounts {
    /// Cells in the ground state.
    pub ground: u32,
    /// Cells in the excited state.
    pub excited: u32,
    /// Cells in the lasing state.
    pub lasing: u32,
}

impl PopulationCounts {
    /// Sum of all three populations (saturating).
    pub const fn total(&self) -> u32 {
        self.ground
            .saturating_add(self.excited)
            .saturating_add(self.lasing)
    }

    /// Population of a single state.
    pub const fn of(&self, state: FluorophoreState) -> u32 {
        match state {
            FluorophoreState::Ground => self.ground,
            FluorophoreState::Excited => self.excited,
            FluorophoreState::Lasing => self.lasing,
        }
    }
}

/// Photon bookkeeping for the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PhotonCounts {
    /// Photons currently in the live set (inside the cavity or in flight
    /// toward the domain edge).
    pub live: u32,
    /// Photons still between the mirrors.
    pub in_cavity: u32,
    /// Cumulative photons transmitted through the output coupler.
    pub output_total: u64,
}

// ---------------------------------------------------------------------------
// Per-tick summary
// ---------------------------------------------------------------------------

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TickSummary {
    /// The frame number that was executed (1 for the first tick).
    pub frame: u64,
    /// Q level in force during this tick.
    pub q_level: QLevel,
    /// Output coupler reflectivity in force during this tick.
    pub q_value: f64,
    /// Fluorophore populations at end of tick.
    pub population: PopulationCounts,
    /// Photon counters at end of tick.
    pub photons: PhotonCounts,
    /// Photons created by spontaneous decay this tick.
    pub spontaneous_emissions: u32,
    /// Photons created by stimulated emission this tick.
    pub stimulated_emissions: u32,
    /// Photons transmitted through the output coupler this tick.
    pub transmitted: u32,
    /// Photons removed at the domain edge this tick.
    pub removed: u32,
}

// ---------------------------------------------------------------------------
// Render snapshots
// ---------------------------------------------------------------------------

/// One lattice cell for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CellSnapshot {
    /// Lattice position.
    pub position: CellPosition,
    /// Current state.
    pub state: FluorophoreState,
}

/// One live photon for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PhotonSnapshot {
    /// Current position.
    pub position: PhotonPosition,
    /// Emission generation (0 = spontaneous). Visualization only.
    pub group: u32,
    /// Whether the photon has already left through the output coupler.
    pub escaped: bool,
}

/// Everything the visualization layer reads between two ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FrameSnapshot {
    /// Frames executed since the last reset.
    pub frame: u64,
    /// Current Q control mode.
    pub q_mode: QMode,
    /// Current Q level.
    pub q_level: QLevel,
    /// Current output coupler reflectivity.
    pub q_value: f64,
    /// Fluorophore populations.
    pub population: PopulationCounts,
    /// Photon counters.
    pub photons: PhotonCounts,
    /// Every lattice cell, row-major.
    pub cells: Vec<CellSnapshot>,
    /// Every live photon.
    pub photon_positions: Vec<PhotonSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_total_sums_states() {
        let counts = PopulationCounts {
            ground: 10,
            excited: 5,
            lasing: 2,
        };
        assert_eq!(counts.total(), 17);
        assert_eq!(counts.of(FluorophoreState::Excited), 5);
    }

    #[test]
    fn population_total_saturates() {
        let counts = PopulationCounts {
            ground: u32::MAX,
            excited: 1,
            lasing: 0,
        };
        assert_eq!(counts.total(), u32::MAX);
    }

    #[test]
    fn cell_positions_order_row_major() {
        let a = CellPosition::new(0, 5);
        let b = CellPosition::new(1, 0);
        assert!(a < b);
    }
}
