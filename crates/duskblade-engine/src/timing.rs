//! Fixed timestep accumulation.
//!
//! Real frame time is scaled by the current time scale (hit-stop) and fed to
//! an accumulator that releases whole fixed ticks.

/// Fixed timestep accumulator.
#[derive(Debug, Clone)]
pub struct FixedStep {
    /// Accumulated simulation time not yet consumed by ticks
    accumulator: f32,
    /// Fixed timestep delta
    fixed_dt: f32,
    /// Maximum frame delta to prevent spiral of death
    max_dt: f32,
    /// Maximum ticks released per frame
    max_updates: u32,
    /// Total ticks released
    total_ticks: u64,
    /// Total scaled simulation time released
    sim_time: f64,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl FixedStep {
    /// Creates an accumulator with the given fixed timestep.
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            accumulator: 0.0,
            fixed_dt: fixed_dt.max(0.001), // Minimum 1ms
            max_dt: 0.25,
            max_updates: 10,
            total_ticks: 0,
            sim_time: 0.0,
        }
    }

    /// Get the fixed timestep value.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Accumulates one frame of real time at the given time scale.
    /// Returns the number of fixed ticks that should run.
    pub fn accumulate(&mut self, real_dt: f32, time_scale: f32) -> u32 {
        let dt = real_dt.clamp(0.0, self.max_dt) * time_scale.max(0.0);
        self.accumulator += dt;
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < self.max_updates {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // If we're still behind, drop the backlog
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        self.total_ticks += u64::from(count);
        self.sim_time += f64::from(self.fixed_dt) * f64::from(count);
        count
    }

    /// Fraction of a tick waiting in the accumulator (0.0-1.0).
    #[must_use]
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.fixed_dt).clamp(0.0, 1.0)
    }

    /// Ticks released so far.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Simulation time released so far (seconds).
    #[must_use]
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }
}
