//! The optical cavity: mirrors, output coupler Q control and the photons
//! travelling between them.
//!
//! The cavity sits on top of `lasing-medium`. Photons read the medium to
//! find Lasing cells and write back to it when they stimulate emission; the
//! medium never sees photons.
//!
//! # Modules
//!
//! - [`config`] -- [`CavityConfig`] and [`PhotonConfig`] (YAML `cavity` and
//!   `photons` sections).
//! - [`controller`] -- [`CavityController`]: manual Q levels and the
//!   automatic Q-switch schedule.
//! - [`error`] -- Error types for geometry, parameters and runaway growth.
//! - [`geometry`] -- [`CavityGeometry`] axial layout and [`Region`]
//!   classification.
//! - [`photon`] -- [`PhotonPool`]: movement, reflection, transmission,
//!   removal and stimulated emission.

pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod photon;

// Re-export primary types at crate root.
pub use config::{CavityConfig, PhotonConfig};
pub use controller::CavityController;
pub use error::CavityError;
pub use geometry::{CavityGeometry, Region};
pub use photon::{PassReport, Photon, PhotonPool};
