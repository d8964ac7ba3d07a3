//! Fixed timestep accumulation.
//!
//! Presentation frames arrive with arbitrary deltas; the simulation only ever
//! advances in whole fixed ticks.

use tracing::debug;

/// Maximum ticks run for a single frame before the backlog is dropped.
const MAX_STEPS_PER_FRAME: u32 = 8;

/// Fixed timestep accumulator.
#[derive(Debug, Clone)]
pub struct FixedStep {
    /// Seconds per tick
    fixed_dt: f32,
    /// Frame time not yet consumed by a tick
    accumulator: f32,
}

impl FixedStep {
    /// Create an accumulator for the given tick length.
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            fixed_dt: fixed_dt.max(0.001),
            accumulator: 0.0,
        }
    }

    /// Get the fixed timestep value.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Accumulate frame time.
    /// Returns the number of fixed ticks that should be run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind after the cap: drop the backlog.
        if self.accumulator > self.fixed_dt * 2.0 {
            debug!(backlog = self.accumulator, "dropping frame backlog");
            self.accumulator = 0.0;
        }

        count
    }

    /// Fraction of a tick left in the accumulator, for interpolation.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.fixed_dt
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}
