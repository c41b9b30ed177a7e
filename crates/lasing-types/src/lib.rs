//! Shared type definitions for the lasing threshold simulation.
//!
//! This crate is the single source of truth for the types exchanged between
//! the simulation crates and the external visualization layer. Types flow
//! downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers (run identifiers)
//! - [`enums`] -- Fluorophore states, Q mode and level, run end reasons
//! - [`structs`] -- Counters, positions, tick summaries and render snapshots

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{FluorophoreState, QLevel, QMode, RunEndReason};
pub use ids::RunId;
pub use structs::{
    CellPosition, CellSnapshot, FrameSnapshot, PhotonCounts, PhotonPosition, PhotonSnapshot,
    PopulationCounts, TickSummary,
};
