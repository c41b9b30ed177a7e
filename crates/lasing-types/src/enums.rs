//! Enumeration types for the lasing threshold simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Fluorophore states
// ---------------------------------------------------------------------------

/// The state of a single fluorophore in the lasing medium.
///
/// The only legal transitions are Ground -> Excited, Excited -> Ground,
/// Excited -> Lasing and Lasing -> Ground. There is no direct edge between
/// Ground and Lasing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FluorophoreState {
    /// Unpumped molecule.
    #[default]
    Ground,
    /// Absorbed pump energy but not yet population-inverted.
    Excited,
    /// Population-inverted; can amplify light by stimulated emission.
    Lasing,
}

impl FluorophoreState {
    /// All states in lattice-rendering order.
    pub const ALL: [Self; 3] = [Self::Ground, Self::Excited, Self::Lasing];

    /// Returns `true` if a single tick may move a cell from `self` to `next`.
    ///
    /// Staying in the same state is always legal.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Ground, Self::Ground | Self::Excited)
                | (Self::Excited, _)
                | (Self::Lasing, Self::Lasing | Self::Ground)
        )
    }
}

// ---------------------------------------------------------------------------
// Cavity Q control
// ---------------------------------------------------------------------------

/// How the output coupler reflectivity is chosen each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum QMode {
    /// Periodic High/Low schedule synchronized to the cavity round trip.
    Automatic,
    /// Level fixed by the last explicit control event.
    #[default]
    Manual,
}

impl QMode {
    /// Return the other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Automatic => Self::Manual,
            Self::Manual => Self::Automatic,
        }
    }
}

/// Output coupler reflectivity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum QLevel {
    /// High reflectivity: photons are kept in the cavity.
    #[default]
    High,
    /// Low reflectivity: stored light is dumped through the coupler.
    Low,
}

// ---------------------------------------------------------------------------
// Run termination
// ---------------------------------------------------------------------------

/// Reason a bounded simulation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RunEndReason {
    /// Reached the configured tick limit.
    MaxTicksReached,
    /// The live photon count exceeded the failsafe ceiling.
    RunawayDivergence,
}
