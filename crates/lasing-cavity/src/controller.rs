//! Output coupler Q control: manual levels and the automatic Q-switch
//! schedule.
//!
//! In automatic mode the level is a pure function of the frame number:
//!
//! ```text
//! phase = frame mod P            (P = round-trip period = 2 * cavity length)
//! level = Low  if phase >= P - T (T = tail length)
//!         High otherwise
//! ```
//!
//! which produces one low-Q window per cavity round trip, a periodic
//! Q-switch pulse train. In manual mode the level is whatever was last
//! set explicitly and does not depend on the frame.

use lasing_medium::Probability;
use lasing_types::{QLevel, QMode};
use tracing::{debug, info};

use crate::config::CavityConfig;
use crate::error::CavityError;
use crate::geometry::CavityGeometry;

/// Owns the current Q mode and level and maps them to a reflectivity.
#[derive(Debug, Clone, PartialEq)]
pub struct CavityController {
    /// Current control mode.
    mode: QMode,
    /// Level last set explicitly; used in manual mode.
    manual_level: QLevel,
    /// Level chosen by the schedule at the last tick; used in automatic mode.
    scheduled_level: QLevel,
    /// Reflectivity at high Q.
    high_q: Probability,
    /// Reflectivity at low Q.
    low_q: Probability,
    /// Round-trip period `P` in ticks.
    period: u64,
    /// Low-Q tail `T` in ticks, `T <= P`.
    tail: u64,
}

impl CavityController {
    /// Build a controller from configuration and the resolved geometry.
    ///
    /// # Errors
    ///
    /// Returns [`CavityError::Rate`] if a reflectivity is not a probability,
    /// or [`CavityError::InvalidGeometry`] if the tail is longer than the
    /// round-trip period.
    pub fn new(config: &CavityConfig, geometry: &CavityGeometry) -> Result<Self, CavityError> {
        let high_q = Probability::new("cavity.high_q", config.high_q)?;
        let low_q = Probability::new("cavity.low_q", config.low_q)?;
        let period = geometry.round_trip_period();
        let tail = u64::from(config.auto_switch_tail_length);

        if period == 0 {
            return Err(CavityError::InvalidGeometry {
                reason: "round-trip period is zero".to_owned(),
            });
        }
        if tail > period {
            return Err(CavityError::InvalidGeometry {
                reason: format!(
                    "auto switch tail of {tail} ticks exceeds the round-trip period of {period}"
                ),
            });
        }

        let mut controller = Self {
            mode: config.initial_mode,
            manual_level: config.initial_level,
            scheduled_level: QLevel::High,
            high_q,
            low_q,
            period,
            tail,
        };
        controller.scheduled_level = controller.level_for_frame(0);
        Ok(controller)
    }

    /// Current control mode.
    pub const fn mode(&self) -> QMode {
        self.mode
    }

    /// Level last set explicitly.
    pub const fn manual_level(&self) -> QLevel {
        self.manual_level
    }

    /// Round-trip period `P`.
    pub const fn period(&self) -> u64 {
        self.period
    }

    /// Low-Q tail length `T`.
    pub const fn tail(&self) -> u64 {
        self.tail
    }

    /// Level in force right now.
    pub const fn current_level(&self) -> QLevel {
        match self.mode {
            QMode::Automatic => self.scheduled_level,
            QMode::Manual => self.manual_level,
        }
    }

    /// Output coupler reflectivity in force right now.
    pub const fn current_q(&self) -> f64 {
        self.reflectivity().value()
    }

    /// Output coupler reflectivity as a validated probability.
    pub const fn reflectivity(&self) -> Probability {
        match self.current_level() {
            QLevel::High => self.high_q,
            QLevel::Low => self.low_q,
        }
    }

    /// Switch between automatic and manual control.
    pub fn set_mode(&mut self, mode: QMode) {
        if self.mode != mode {
            info!(from = ?self.mode, to = ?mode, "Q mode changed");
        }
        self.mode = mode;
    }

    /// Flip between automatic and manual control. Returns the new mode.
    pub fn toggle_mode(&mut self) -> QMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    /// Set the level used in manual mode.
    ///
    /// In automatic mode the level is remembered and takes effect when the
    /// controller is switched back to manual.
    pub fn set_manual_level(&mut self, level: QLevel) {
        if self.manual_level != level {
            info!(from = ?self.manual_level, to = ?level, mode = ?self.mode, "Manual Q level changed");
        }
        self.manual_level = level;
    }

    /// The scheduled level for `frame`, independent of the current mode.
    pub fn level_for_frame(&self, frame: u64) -> QLevel {
        let phase = frame.checked_rem(self.period).unwrap_or(0);
        let low_from = self.period.saturating_sub(self.tail);
        if self.tail > 0 && phase >= low_from {
            QLevel::Low
        } else {
            QLevel::High
        }
    }

    /// Advance the schedule to `frame`. Called once per simulation step.
    pub fn tick(&mut self, frame: u64) {
        let level = self.level_for_frame(frame);
        if self.mode == QMode::Automatic && level != self.scheduled_level {
            debug!(frame, level = ?level, "Q switched");
        }
        self.scheduled_level = level;
    }
}
