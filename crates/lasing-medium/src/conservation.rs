//! Population conservation audit for the fluorophore lattice.
//!
//! The grid maintains its three population counters incrementally, alongside
//! every state mutation. The conservation law is:
//!
//! ```text
//! ground + excited + lasing == cell_count
//! ```
//!
//! and each counter must equal the number of cells actually in that state.
//! Both hold by construction; this audit rescans the lattice to detect
//! corruption or future bugs. It is a diagnostic only: the displayed
//! counters are never replaced by the scanned ones.

use lasing_types::{FluorophoreState, PopulationCounts};

/// The result of a conservation audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// The incremental counters agree with the lattice.
    Balanced,
    /// The counters and the lattice disagree.
    Anomaly(PopulationAnomaly),
}

/// A disagreement between the incremental counters and a full rescan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationAnomaly {
    /// Counters as maintained by the grid.
    pub recorded: PopulationCounts,
    /// Counters obtained by scanning every cell.
    pub scanned: PopulationCounts,
    /// Number of cells in the lattice.
    pub cell_count: u32,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for PopulationAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Count the cells in each state.
pub fn scan(cells: &[FluorophoreState]) -> PopulationCounts {
    let mut counts = PopulationCounts::default();
    for state in cells {
        let slot = match state {
            FluorophoreState::Ground => &mut counts.ground,
            FluorophoreState::Excited => &mut counts.excited,
            FluorophoreState::Lasing => &mut counts.lasing,
        };
        *slot = slot.saturating_add(1);
    }
    counts
}

/// Compare `recorded` against a rescan of `cells`.
pub fn verify_population(cells: &[FluorophoreState], recorded: PopulationCounts) -> ConservationResult {
    let scanned = scan(cells);
    let cell_count = u32::try_from(cells.len()).unwrap_or(u32::MAX);

    if scanned == recorded && recorded.total() == cell_count {
        return ConservationResult::Balanced;
    }

    ConservationResult::Anomaly(PopulationAnomaly {
        recorded,
        scanned,
        cell_count,
        message: format!(
            "POPULATION_ANOMALY: recorded {}/{}/{} (sum {}) but lattice holds {}/{}/{} of {cell_count} cells",
            recorded.ground,
            recorded.excited,
            recorded.lasing,
            recorded.total(),
            scanned.ground,
            scanned.excited,
            scanned.lasing,
        ),
    })
}
