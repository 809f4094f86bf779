//! Per-side countdown clock.
//!
//! A [`Clock`] only keeps time. It does not read the system clock; whoever
//! drives the game reports elapsed time through [`Clock::tick`].

use std::time::Duration;

/// What a tick did to a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStatus {
    /// The clock is paused; nothing was deducted.
    Idle,
    Running,
    /// This tick consumed the last remaining time. The clock stops.
    Expired,
}

/// A countdown timer for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    remaining: Duration,
    running: bool,
}

impl Clock {
    /// Creates a paused clock holding `initial` time.
    pub const fn new(initial: Duration) -> Self {
        Clock {
            remaining: initial,
            running: false,
        }
    }

    /// Deducts `elapsed` from a running clock, saturating at zero.
    pub fn tick(&mut self, elapsed: Duration) -> ClockStatus {
        if !self.running {
            return ClockStatus::Idle;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            self.running = false;
            ClockStatus::Expired
        } else {
            ClockStatus::Running
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Starts the clock unless it has already run out.
    pub fn resume(&mut self) {
        self.running = !self.remaining.is_zero();
    }

    #[inline]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    #[inline]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }
}
