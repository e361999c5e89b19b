//! Converts real elapsed time into whole simulation ticks.

use crate::error::ClockError;
use std::time::Duration;

/// Accumulates frame time and releases it as whole ticks at a fixed rate.
///
/// Leftover time below one tick interval is carried into the next call, so
/// no simulated minute is lost to frame jitter. While the simulation is not
/// running, elapsed time is discarded rather than banked.
#[derive(Debug, Clone)]
pub struct TickAccumulator {
    interval: Duration,
    carried: Duration,
}

impl TickAccumulator {
    /// Creates an accumulator for the given rate.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidTickRate`] unless the rate is finite,
    /// positive and slow enough to give a non-zero interval.
    pub fn new(ticks_per_second: f64) -> Result<Self, ClockError> {
        if !ticks_per_second.is_finite() || ticks_per_second <= 0.0 {
            return Err(ClockError::InvalidTickRate(ticks_per_second));
        }
        let interval = Duration::try_from_secs_f64(ticks_per_second.recip())
            .map_err(|_| ClockError::InvalidTickRate(ticks_per_second))?;
        if interval.is_zero() {
            return Err(ClockError::InvalidTickRate(ticks_per_second));
        }
        Ok(Self {
            interval,
            carried: Duration::ZERO,
        })
    }

    /// Real time per tick.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time banked towards the next tick.
    pub fn carried(&self) -> Duration {
        self.carried
    }

    /// Adds `elapsed` and returns how many whole ticks are now due.
    pub fn accumulate(&mut self, elapsed: Duration, running: bool) -> u64 {
        if !running {
            return 0;
        }
        let total = (self.carried + elapsed).as_nanos();
        let interval = self.interval.as_nanos();
        self.carried = Duration::from_nanos((total % interval) as u64);
        u64::try_from(total / interval).unwrap_or(u64::MAX)
    }

    pub fn reset(&mut self) {
        self.carried = Duration::ZERO;
    }
}
