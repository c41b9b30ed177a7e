//! Error types for the `lasing-cavity` crate.

use lasing_medium::MediumError;

/// Errors that can occur when building the cavity or advancing photons.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CavityError {
    /// A reflectivity or cross-section was not a probability.
    #[error("invalid rate: {source}")]
    Rate {
        /// The underlying validation error.
        #[from]
        source: MediumError,
    },

    /// A numeric parameter was out of its allowed range.
    #[error("{name} must be at least 1, got {value}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: u32,
    },

    /// The mirrors, medium and domain do not fit together.
    #[error("invalid cavity geometry: {reason}")]
    InvalidGeometry {
        /// Explanation of what does not fit.
        reason: String,
    },

    /// The live photon count exceeded the failsafe ceiling.
    ///
    /// The configured rates produce unbounded exponential growth; the run
    /// cannot continue.
    #[error("runaway divergence: {live} live photons exceeds ceiling of {ceiling}")]
    Runaway {
        /// Live photons when the ceiling was crossed.
        live: usize,
        /// The configured ceiling.
        ceiling: u32,
    },
}
