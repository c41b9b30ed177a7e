//! Frame clock for the lasing simulation.
//!
//! The frame number is the only notion of time in the model. It advances
//! by exactly one per [`Simulation::step`] and returns to zero on reset.
//! The cavity's automatic Q schedule is derived from it and never stored
//! independently.
//!
//! [`Simulation::step`]: crate::tick::Simulation::step

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Frame counter would overflow.
    #[error("frame counter overflow: cannot advance beyond u64::MAX")]
    FrameOverflow,
}

/// Monotonic frame counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameClock {
    /// Frames completed since the last reset.
    frame: u64,
}

impl FrameClock {
    /// Create a clock at frame 0.
    pub const fn new() -> Self {
        Self { frame: 0 }
    }

    /// Create a clock at an explicit frame (useful for testing).
    pub const fn from_frame(frame: u64) -> Self {
        Self { frame }
    }

    /// Advance by one frame. Returns the new frame number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::FrameOverflow`] if the counter would exceed
    /// `u64::MAX`. The clock is left unchanged.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.frame = self.frame.checked_add(1).ok_or(ClockError::FrameOverflow)?;
        Ok(self.frame)
    }

    /// Current frame number.
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Return to frame 0.
    pub const fn reset(&mut self) {
        self.frame = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_frame_zero() {
        assert_eq!(FrameClock::new().frame(), 0);
        assert_eq!(FrameClock::default(), FrameClock::new());
    }

    #[test]
    fn clock_advances() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(), Ok(1));
        assert_eq!(clock.advance(), Ok(2));
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn reset_returns_to_zero() {
        let mut clock = FrameClock::from_frame(9_999);
        clock.reset();
        assert_eq!(clock.frame(), 0);
    }

    #[test]
    fn overflow_is_an_error() {
        let mut clock = FrameClock::from_frame(u64::MAX);
        assert_eq!(clock.advance(), Err(ClockError::FrameOverflow));
        assert_eq!(clock.frame(), u64::MAX);
    }
}
