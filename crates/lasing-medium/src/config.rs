//! Tunable parameters for the lasing medium.
//!
//! These values correspond to the `medium` key of `lasing-config.yaml`. The
//! [`MediumConfig`] struct bundles every tunable so that callers (the
//! simulation, tests) can override defaults, and [`MediumConfig::rates`]
//! turns the raw YAML numbers into validated [`TransitionRates`].

use serde::{Deserialize, Serialize};

use crate::error::MediumError;
use crate::probability::Probability;

/// Raw medium configuration as it appears in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediumConfig {
    /// Number of lattice columns (along the cavity axis).
    #[serde(default = "default_width")]
    pub width: u32,

    /// Number of lattice rows (across the cavity axis).
    #[serde(default = "default_height")]
    pub height: u32,

    /// Ground -> Excited probability per tick, also the Excited -> Ground
    /// reversion probability.
    #[serde(default = "default_pump")]
    pub pump: f64,

    /// Excited -> Lasing (inter-system crossing) probability per tick.
    #[serde(default = "default_isc")]
    pub isc: f64,

    /// Lasing -> Ground spontaneous decay probability per tick.
    #[serde(default = "default_decay")]
    pub decay: f64,

    /// Fraction of spontaneous decays that emit a photon.
    #[serde(default = "default_spontaneous_fraction")]
    pub spontaneous_fraction: f64,
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            pump: default_pump(),
            isc: default_isc(),
            decay: default_decay(),
            spontaneous_fraction: default_spontaneous_fraction(),
        }
    }
}

impl MediumConfig {
    /// Validate the lattice dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`MediumError::InvalidDimension`] for a zero width or height,
    /// or [`MediumError::LatticeTooLarge`] if the cell count overflows `u32`.
    pub fn validate_dimensions(&self) -> Result<u32, MediumError> {
        cell_count(self.width, self.height)
    }

    /// Convert the raw rates into validated probabilities.
    ///
    /// # Errors
    ///
    /// Returns [`MediumError::InvalidProbability`] naming the first rate
    /// that is NaN or outside `[0, 1]`.
    pub fn rates(&self) -> Result<TransitionRates, MediumError> {
        Ok(TransitionRates {
            pump: Probability::new("medium.pump", self.pump)?,
            isc: Probability::new("medium.isc", self.isc)?,
            decay: Probability::new("medium.decay", self.decay)?,
            spontaneous_fraction: Probability::new(
                "medium.spontaneous_fraction",
                self.spontaneous_fraction,
            )?,
        })
    }

    /// Validate dimensions and rates together.
    ///
    /// # Errors
    ///
    /// Returns the first [`MediumError`] found.
    pub fn validate(&self) -> Result<(), MediumError> {
        self.validate_dimensions()?;
        self.rates()?;
        Ok(())
    }
}

/// Number of cells in a `width` x `height` lattice.
///
/// # Errors
///
/// Returns [`MediumError::InvalidDimension`] for a zero dimension, or
/// [`MediumError::LatticeTooLarge`] if the product overflows `u32`.
pub fn cell_count(width: u32, height: u32) -> Result<u32, MediumError> {
    if width == 0 {
        return Err(MediumError::InvalidDimension {
            name: "medium.width",
            value: width,
        });
    }
    if height == 0 {
        return Err(MediumError::InvalidDimension {
            name: "medium.height",
            value: height,
        });
    }
    width
        .checked_mul(height)
        .ok_or(MediumError::LatticeTooLarge { width, height })
}

/// Validated per-tick transition probabilities for every cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionRates {
    /// Ground -> Excited, and Excited -> Ground (checked first).
    pub pump: Probability,
    /// Excited -> Lasing, drawn only if the reversion draw failed.
    pub isc: Probability,
    /// Lasing -> Ground.
    pub decay: Probability,
    /// Sub-probability that a Lasing -> Ground decay emits a photon.
    pub spontaneous_fraction: Probability,
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_width() -> u32 {
    51
}

const fn default_height() -> u32 {
    21
}

const fn default_pump() -> f64 {
    0.002
}

const fn default_isc() -> f64 {
    0.02
}

const fn default_decay() -> f64 {
    0.000_04
}

const fn default_spontaneous_fraction() -> f64 {
    0.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MediumConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.validate_dimensions().ok(), Some(1071));
    }

    #[test]
    fn zero_width_is_rejected() {
        let config = MediumConfig {
            width: 0,
            ..MediumConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MediumError::InvalidDimension {
                name: "medium.width",
                ..
            })
        ));
    }

    #[test]
    fn zero_height_is_rejected() {
        let config = MediumConfig {
            height: 0,
            ..MediumConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_lattice_is_rejected() {
        let config = MediumConfig {
            width: u32::MAX,
            height: 2,
            ..MediumConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MediumError::LatticeTooLarge { .. })
        ));
    }

    #[test]
    fn out_of_range_rate_is_rejected() {
        let config = MediumConfig {
            isc: 1.5,
            ..MediumConfig::default()
        };
        assert!(matches!(
            config.rates(),
            Err(MediumError::InvalidProbability {
                name: "medium.isc",
                ..
            })
        ));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: MediumConfig =
            serde_json::from_str(r#"{"width": 7}"#).unwrap_or_default();
        assert_eq!(config.width, 7);
        assert_eq!(config.height, 21);
    }
}
