//! Global hit-stop.
//!
//! A successful hit briefly drops the simulation time scale. The pause is
//! measured in real time so it lasts the same regardless of the scale it sets,
//! and triggering while a pause is running does not restart it.

use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{emit, GameEvent};

/// Hit-stop tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitStopConfig {
    /// Real-time length of the pause (seconds).
    pub duration: f32,
    /// Simulation time scale while paused.
    pub time_scale: f32,
}

impl Default for HitStopConfig {
    fn default() -> Self {
        Self {
            duration: 0.1,
            time_scale: 0.01,
        }
    }
}

/// Handle to the single hit-stop coordinator shared by every character.
pub type SharedHitStop = Arc<Mutex<HitStop>>;

/// Owns the global time-scale freeze.
#[derive(Debug, Default)]
pub struct HitStop {
    config: HitStopConfig,
    remaining: f32,
    active: bool,
    events: Option<Sender<GameEvent>>,
}

impl HitStop {
    /// Creates a coordinator.
    #[must_use]
    pub fn new(config: HitStopConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Creates a coordinator wrapped for sharing.
    #[must_use]
    pub fn shared(config: HitStopConfig) -> SharedHitStop {
        Arc::new(Mutex::new(Self::new(config)))
    }

    /// Wraps an already configured coordinator for sharing.
    #[must_use]
    pub fn into_shared(self) -> SharedHitStop {
        Arc::new(Mutex::new(self))
    }

    /// Publishes start/end notifications on the given channel.
    #[must_use]
    pub fn with_events(mut self, sender: Sender<GameEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Starts a pause. Returns false if one is already running.
    pub fn trigger(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.remaining = self.config.duration;
        debug!(duration = self.config.duration, "hit-stop started");
        emit(self.events.as_ref(), GameEvent::HitStopStarted);
        true
    }

    /// Advances the pause by real (unscaled) time. Returns true on the call
    /// that ends it.
    pub fn advance_real(&mut self, real_dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.remaining = (self.remaining - real_dt).max(0.0);
        if self.remaining > 0.0 {
            return false;
        }
        self.active = false;
        debug!("hit-stop ended");
        emit(self.events.as_ref(), GameEvent::HitStopEnded);
        true
    }

    /// Whether a pause is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current simulation time scale.
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        if self.active {
            self.config.time_scale
        } else {
            1.0
        }
    }

    /// Real time left in the current pause.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}
