//! Validated per-tick probabilities and Bernoulli draws.
//!
//! Every rate in the model is a tick-rate probability, not a continuous-time
//! rate: no time-step scaling is applied, so callers keep the values small
//! relative to 1 when they want continuous kinetics.

use rand::Rng;
use serde::Serialize;

use crate::error::MediumError;

/// A probability in the closed interval `[0, 1]`.
///
/// The bounds are checked once at construction, so draws against it never
/// need to handle invalid values.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Probability(f64);

impl Probability {
    /// The impossible event.
    pub const NEVER: Self = Self(0.0);

    /// The certain event.
    pub const ALWAYS: Self = Self(1.0);

    /// Validate `value` as a probability.
    ///
    /// # Errors
    ///
    /// Returns [`MediumError::InvalidProbability`] if `value` is NaN or lies
    /// outside `[0, 1]`.
    pub fn new(name: &'static str, value: f64) -> Result<Self, MediumError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(MediumError::InvalidProbability { name, value })
        }
    }

    /// Return the raw value.
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Draw once against this probability.
    ///
    /// A uniform sample in `[0, 1)` strictly below the probability counts as
    /// success, so [`Probability::NEVER`] never fires and
    /// [`Probability::ALWAYS`] always does.
    pub fn sample(self, rng: &mut impl Rng) -> bool {
        rng.random::<f64>() < self.0
    }
}
