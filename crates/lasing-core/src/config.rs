//! Configuration loading and typed config structures for the lasing
//! threshold simulation.
//!
//! The canonical configuration lives in `lasing-config.yaml` at the project
//! root. Every key is optional: a missing file section or field falls back
//! to the defaults below, which reproduce the reference 51x21 medium in a
//! 301-cell cavity.
//!
//! Loading always validates. A configuration that would produce an invalid
//! lattice, cavity or photon pool is rejected here, before any simulation
//! state is built.

use std::path::Path;

use lasing_cavity::{CavityConfig, CavityController, CavityError, CavityGeometry, PhotonConfig, PhotonPool};
use lasing_medium::{MediumConfig, MediumError};
use serde::{Deserialize, Serialize};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The `medium` section is invalid.
    #[error("invalid medium configuration: {source}")]
    Medium {
        /// The underlying validation error.
        #[from]
        source: MediumError,
    },

    /// The `cavity` or `photons` section is invalid.
    #[error("invalid cavity configuration: {source}")]
    Cavity {
        /// The underlying validation error.
        #[from]
        source: CavityError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `lasing-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Run-level settings (seed, tick bound).
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Fluorophore lattice and transition rates.
    #[serde(default)]
    pub medium: MediumConfig,

    /// Cavity layout and Q control.
    #[serde(default)]
    pub cavity: CavityConfig,

    /// Photon behavior.
    #[serde(default)]
    pub photons: PhotonConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error (see [`SimulationConfig::validate`]).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error (see [`SimulationConfig::validate`]).
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every section without building simulation state.
    ///
    /// Rejects rates or reflectivities outside `[0, 1]` (or NaN), zero
    /// dimensions, a medium that does not fit inside the cavity, a domain
    /// with no room past the output coupler, a Q-switch tail longer than
    /// the round-trip period, and a zero photon speed or ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Medium`] or [`ConfigError::Cavity`] describing
    /// the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.medium.validate()?;
        let geometry = CavityGeometry::new(&self.cavity, self.medium.width, self.medium.height)?;
        CavityController::new(&self.cavity, &geometry)?;
        PhotonPool::new(&self.photons, geometry)?;
        Ok(())
    }
}

/// Run-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationBoundsConfig {
    /// RNG seed. When absent a seed is drawn from OS entropy at start-up
    /// and logged so the run can be replayed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Maximum number of ticks the engine runs (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_ticks: default_max_ticks(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Ticks between periodic population summaries (0 = never).
    #[serde(default = "default_summary_interval_ticks")]
    pub summary_interval_ticks: u64,

    /// Ticks between conservation audits (0 = never).
    #[serde(default = "default_audit_interval_ticks")]
    pub audit_interval_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            summary_interval_ticks: default_summary_interval_ticks(),
            audit_interval_ticks: default_audit_interval_ticks(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_max_ticks() -> u64 {
    100_000
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_summary_interval_ticks() -> u64 {
    10_000
}

const fn default_audit_interval_ticks() -> u64 {
    50_000
}

#[cfg(test)]
mod tests {
    use lasing_types::{QLevel, QMode};

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.medium.width, 51);
        assert_eq!(config.medium.height, 21);
        assert_eq!(config.cavity.length, 301);
        assert_eq!(config.photons.max_live, 50_000);
        assert_eq!(config.simulation.seed, None);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
simulation:
  seed: 1234
  max_ticks: 5000

medium:
  width: 31
  height: 11
  pump: 0.004
  isc: 0.03
  decay: 0.0001
  spontaneous_fraction: 0.2

cavity:
  length: 201
  offset: 50
  domain_width: 400
  high_q: 0.95
  low_q: 0.05
  auto_switch_tail_length: 40
  initial_mode: automatic
  initial_level: low

photons:
  cross: 0.2
  speed: 1
  max_live: 20000

logging:
  level: "debug"
  summary_interval_ticks: 500
  audit_interval_ticks: 1000
"#;

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.simulation.seed, Some(1234));
        assert_eq!(config.simulation.max_ticks, 5000);
        assert_eq!(config.medium.width, 31);
        assert_eq!(config.cavity.initial_mode, QMode::Automatic);
        assert_eq!(config.cavity.initial_level, QLevel::Low);
        assert_eq!(config.photons.max_live, 20_000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "simulation:\n  seed: 7\n";
        let config = SimulationConfig::parse(yaml).ok().unwrap_or_default();
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.medium.width, 51);
        assert_eq!(config.logging.summary_interval_ticks, 10_000);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn out_of_range_rate_is_rejected() {
        let yaml = "medium:\n  pump: 1.5\n";
        assert!(matches!(
            SimulationConfig::parse(yaml),
            Err(ConfigError::Medium { .. })
        ));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let yaml = "medium:\n  height: 0\n";
        assert!(SimulationConfig::parse(yaml).is_err());
    }

    #[test]
    fn medium_wider_than_cavity_is_rejected() {
        let yaml = "medium:\n  width: 400\n";
        assert!(matches!(
            SimulationConfig::parse(yaml),
            Err(ConfigError::Cavity { .. })
        ));
    }

    #[test]
    fn tail_longer_than_round_trip_is_rejected() {
        let yaml = "cavity:\n  auto_switch_tail_length: 603\n";
        assert!(SimulationConfig::parse(yaml).is_err());
        let yaml = "cavity:\n  auto_switch_tail_length: 602\n";
        assert!(SimulationConfig::parse(yaml).is_ok());
    }

    #[test]
    fn invalid_reflectivity_is_rejected() {
        let yaml = "cavity:\n  high_q: -0.1\n";
        assert!(SimulationConfig::parse(yaml).is_err());
    }

    #[test]
    fn zero_photon_ceiling_is_rejected() {
        let yaml = "photons:\n  max_live: 0\n";
        assert!(SimulationConfig::parse(yaml).is_err());
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        assert!(matches!(
            SimulationConfig::parse("medium: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("lasing-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
