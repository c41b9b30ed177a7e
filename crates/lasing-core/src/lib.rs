//! Frame clock, step/reset cycle and run loop for the lasing threshold
//! simulation.
//!
//! This crate ties the medium and the cavity together into a single
//! [`Simulation`] value that advances one frame per [`Simulation::step`].
//!
//! # Modules
//!
//! - [`clock`] -- [`FrameClock`] frame counter with checked overflow.
//! - [`config`] -- Configuration loading from `lasing-config.yaml` into
//!   strongly-typed structs.
//! - [`runner`] -- [`run_simulation`] bounded loop with periodic summaries
//!   and conservation audits.
//! - [`tick`] -- [`Simulation`]: step, reset, Q control and read accessors.
//!
//! [`FrameClock`]: clock::FrameClock
//! [`run_simulation`]: runner::run_simulation
//! [`Simulation`]: tick::Simulation
//! [`Simulation::step`]: tick::Simulation::step

pub mod clock;
pub mod config;
pub mod runner;
pub mod tick;
