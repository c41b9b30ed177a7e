//! The lasing medium: a lattice of three-state fluorophores.
//!
//! This crate is the leaf of the simulation. It knows nothing about photons
//! or the cavity; it applies the pump / inter-system crossing / decay rule
//! to every cell once per tick and reports where spontaneous photons were
//! emitted.
//!
//! # Modules
//!
//! - [`config`] -- [`MediumConfig`] (YAML `medium` section) and validated
//!   [`TransitionRates`].
//! - [`conservation`] -- Rescan audit of the incremental population
//!   counters.
//! - [`error`] -- Error types for lattice construction and addressing.
//! - [`grid`] -- [`FluorophoreGrid`]: the lattice, per-cell rule, stimulated
//!   de-excitation and reset.
//! - [`probability`] -- [`Probability`] newtype and Bernoulli draws.

pub mod config;
pub mod conservation;
pub mod error;
pub mod grid;
pub mod probability;

// Re-export primary types at crate root.
pub use config::{MediumConfig, TransitionRates};
pub use conservation::{ConservationResult, PopulationAnomaly};
pub use error::MediumError;
pub use grid::{CellUpdate, FluorophoreGrid};
pub use probability::Probability;
