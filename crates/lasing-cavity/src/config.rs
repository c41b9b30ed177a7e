//! Tunable parameters for the cavity and its photons.
//!
//! These mirror the `cavity` and `photons` keys of `lasing-config.yaml`.

use lasing_types::{QLevel, QMode};
use serde::{Deserialize, Serialize};

/// Cavity layout and output coupler configuration.
///
/// Coordinates run along the cavity axis from the left edge of the domain.
/// The far (lossless) mirror sits at `offset`, the output coupler at
/// `offset + length - 1`, and transmitted photons travel on to
/// `domain_width - 1` where they leave the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CavityConfig {
    /// Mirror-to-coupler distance in cells.
    #[serde(default = "default_length")]
    pub length: u32,

    /// Axial coordinate of the far mirror.
    #[serde(default = "default_offset")]
    pub offset: u32,

    /// Width of the whole domain; photons are removed at its edge.
    #[serde(default = "default_domain_width")]
    pub domain_width: u32,

    /// Output coupler reflectivity at high Q.
    #[serde(default = "default_high_q")]
    pub high_q: f64,

    /// Output coupler reflectivity at low Q.
    #[serde(default = "default_low_q")]
    pub low_q: f64,

    /// Ticks at the end of each round-trip period spent at low Q in
    /// automatic mode.
    #[serde(default = "default_auto_switch_tail_length")]
    pub auto_switch_tail_length: u32,

    /// Q control mode at start-up.
    #[serde(default)]
    pub initial_mode: QMode,

    /// Manual Q level at start-up.
    #[serde(default)]
    pub initial_level: QLevel,
}

impl Default for CavityConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            offset: default_offset(),
            domain_width: default_domain_width(),
            high_q: default_high_q(),
            low_q: default_low_q(),
            auto_switch_tail_length: default_auto_switch_tail_length(),
            initial_mode: QMode::default(),
            initial_level: QLevel::default(),
        }
    }
}

/// Photon behavior configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotonConfig {
    /// Probability that a photon crossing a Lasing cell triggers
    /// stimulated emission.
    #[serde(default = "default_cross")]
    pub cross: f64,

    /// Velocity magnitude in cells per tick.
    #[serde(default = "default_speed")]
    pub speed: u32,

    /// Failsafe ceiling on live photons. Exceeding it aborts the run.
    #[serde(default = "default_max_live")]
    pub max_live: u32,
}

impl Default for PhotonConfig {
    fn default() -> Self {
        Self {
            cross: default_cross(),
            speed: default_speed(),
            max_live: default_max_live(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_length() -> u32 {
    301
}

const fn default_offset() -> u32 {
    100
}

const fn default_domain_width() -> u32 {
    625
}

const fn default_high_q() -> f64 {
    0.9
}

const fn default_low_q() -> f64 {
    0.1
}

const fn default_auto_switch_tail_length() -> u32 {
    50
}

const fn default_cross() -> f64 {
    0.15
}

const fn default_speed() -> u32 {
    1
}

const fn default_max_live() -> u32 {
    50_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_parse_from_lowercase() {
        let config: CavityConfig =
            serde_json::from_str(r#"{"initial_mode": "automatic", "initial_level": "low"}"#)
                .unwrap_or_default();
        assert_eq!(config.initial_mode, QMode::Automatic);
        assert_eq!(config.initial_level, QLevel::Low);
        assert_eq!(config.length, 301);
    }

    #[test]
    fn photon_defaults() {
        let config = PhotonConfig::default();
        assert_eq!(config.speed, 1);
        assert_eq!(config.max_live, 50_000);
    }
}
