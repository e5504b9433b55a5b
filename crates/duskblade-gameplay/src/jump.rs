//! Jump physics helpers.
//!
//! Handles coyote time, jump buffering, variable jump height (release to cut)
//! and the gravity multiplier the physics collaborator should apply each tick.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Jump tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    /// Upward velocity given by a jump
    pub jump_impulse: f32,
    /// Low-gravity phase right after take-off (seconds)
    pub initial_boost_duration: f32,
    /// Gravity multiplier during the boost phase
    pub boost_gravity_mult: f32,
    /// Grace period after leaving ground (seconds)
    pub coyote_time: f32,
    /// How long an early press is remembered (seconds)
    pub jump_buffer_time: f32,
    /// Gravity multiplier after releasing jump while rising
    pub jump_cut_multiplier: f32,
    /// Gravity multiplier while falling
    pub fall_gravity_mult: f32,
    /// Gravity multiplier while falling and holding down
    pub fast_fall_gravity_mult: f32,
    /// Vertical speed below which a jump is considered at its apex
    pub hang_time_threshold: f32,
    /// Gravity multiplier at the apex
    pub hang_gravity_mult: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            jump_impulse: 14.0,
            initial_boost_duration: 0.1,
            boost_gravity_mult: 0.03,
            coyote_time: 0.2,
            jump_buffer_time: 0.2,
            jump_cut_multiplier: 0.5,
            fall_gravity_mult: 2.0,
            fast_fall_gravity_mult: 2.5,
            hang_time_threshold: 1.0,
            hang_gravity_mult: 0.4,
        }
    }
}

/// Per-tick inputs to the jump controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JumpInputs {
    /// Standing on ground this tick
    pub grounded: bool,
    /// Jumping is allowed (can move, not dodging or dashing)
    pub can_jump: bool,
    /// An air dash owns vertical motion
    pub dashing: bool,
    /// Down is held on the move axis
    pub holding_down: bool,
}

/// Result of one jump update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpStep {
    /// Vertical velocity after the update
    pub velocity_y: f32,
    /// A jump started this tick
    pub jumped: bool,
    /// Gravity multiplier to apply, `None` to leave gravity alone
    pub gravity_scale: Option<f32>,
}

/// Jump state of one character.
#[derive(Debug, Clone, Default)]
pub struct JumpController {
    config: JumpConfig,
    last_grounded_remaining: f32,
    jump_pressed_remaining: f32,
    is_jumping: bool,
    jump_cut: bool,
    boost_remaining: f32,
}

impl JumpController {
    /// Creates a controller.
    #[must_use]
    pub fn new(config: JumpConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Jump pressed; remembered for the buffer time.
    pub fn press(&mut self) {
        self.jump_pressed_remaining = self.config.jump_buffer_time;
    }

    /// Jump released. Cuts the jump short if still rising.
    pub fn release(&mut self, velocity_y: f32) {
        if self.is_jumping && velocity_y > 0.0 {
            self.jump_cut = true;
        }
    }

    /// Advances timers, starts a jump if one is due, and picks gravity.
    pub fn update(&mut self, dt: f32, velocity_y: f32, inputs: JumpInputs) -> JumpStep {
        self.last_grounded_remaining -= dt;
        self.jump_pressed_remaining -= dt;

        if inputs.grounded {
            self.last_grounded_remaining = self.config.coyote_time;
            if !self.is_jumping {
                self.jump_cut = false;
            }
        }

        if self.is_jumping && velocity_y < 0.0 {
            self.is_jumping = false;
        }

        let mut vy = velocity_y;
        let mut jumped = false;
        if inputs.can_jump
            && !inputs.dashing
            && self.last_grounded_remaining > 0.0
            && self.jump_pressed_remaining > 0.0
        {
            self.last_grounded_remaining = 0.0;
            self.jump_pressed_remaining = 0.0;

            // Falling speed is compensated so the jump height stays consistent
            vy = self.config.jump_impulse - velocity_y.min(0.0);
            self.is_jumping = true;
            self.jump_cut = false;
            self.boost_remaining = self.config.initial_boost_duration;
            jumped = true;
            trace!(vy, "jump");
        }

        let gravity_scale = self.gravity_scale(dt, vy, inputs);
        JumpStep {
            velocity_y: vy,
            jumped,
            gravity_scale,
        }
    }

    fn gravity_scale(&mut self, dt: f32, vy: f32, inputs: JumpInputs) -> Option<f32> {
        if inputs.dashing {
            return None;
        }

        if self.boost_remaining > 0.0 {
            self.boost_remaining -= dt;
            if self.boost_remaining > 0.0 {
                return Some(self.config.boost_gravity_mult);
            }
        }

        let scale = if inputs.grounded && !self.is_jumping {
            1.0
        } else if vy < 0.0 {
            if inputs.holding_down {
                self.config.fast_fall_gravity_mult
            } else {
                self.config.fall_gravity_mult
            }
        } else if self.jump_cut {
            self.config.jump_cut_multiplier
        } else if self.at_apex(vy) {
            self.config.hang_gravity_mult
        } else {
            1.0
        };
        Some(scale)
    }

    /// Whether a jump is hanging near its apex.
    #[must_use]
    pub fn at_apex(&self, velocity_y: f32) -> bool {
        self.is_jumping && velocity_y.abs() < self.config.hang_time_threshold
    }

    /// Whether a jump is rising.
    #[must_use]
    pub fn is_jumping(&self) -> bool {
        self.is_jumping
    }

    /// Whether the current jump was cut short.
    #[must_use]
    pub fn is_jump_cut(&self) -> bool {
        self.jump_cut
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &JumpConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn ground() -> JumpInputs {
        JumpInputs {
            grounded: true,
            can_jump: true,
            ..JumpInputs::default()
        }
    }

    fn air() -> JumpInputs {
        JumpInputs {
            grounded: false,
            can_jump: true,
            ..JumpInputs::default()
        }
    }

    #[test]
    fn test_jump_from_ground() {
        let mut jump = JumpController::new(JumpConfig::default());
        jump.press();
        let step = jump.update(DT, 0.0, ground());
        assert!(step.jumped);
        assert_eq!(step.velocity_y, 14.0);
        assert!(jump.is_jumping());
        assert_eq!(step.gravity_scale, Some(0.03));
    }

    #[test]
    fn test_falling_speed_compensated() {
        let mut jump = JumpController::new(JumpConfig::default());
        jump.update(DT, 0.0, ground());
        jump.press();
        let step = jump.update(DT, -3.0, air());
        assert!(step.jumped);
        assert_eq!(step.velocity_y, 17.0);
    }

    #[test]
    fn test_coyote_time() {
        let mut jump = JumpController::new(JumpConfig::default());
        jump.update(DT, 0.0, ground());
        for _ in 0..5 {
            jump.update(DT, -1.0, air());
        }
        jump.press();
        assert!(jump.update(DT, -1.0, air()).jumped);
    }

    #[test]
    fn test_coyote_time_expires() {
        let mut jump = JumpController::new(JumpConfig::default());
        jump.update(DT, 0.0, ground());
        for _ in 0..15 {
            jump.update(DT, -1.0, air());
        }
        jump.press();
        assert!(!jump.update(DT, -1.0, air()).jumped);
    }

    #[test]
    fn test_jump_buffer_on_landing() {
        let mut jump = JumpController::new(JumpConfig::default());
        for _ in 0..20 {
            jump.update(DT, -5.0, air());
        }
        jump.press();
        assert!(!jump.update(DT, -5.0, air()).jumped);
        assert!(!jump.update(DT, -5.0, air()).jumped);
        assert!(jump.update(DT, 0.0, ground()).jumped);
    }

    #[test]
    fn test_blocked_while_unable() {
        let mut jump = JumpController::new(JumpConfig::default());
        jump.press();
        let inputs = JumpInputs {
            can_jump: false,
            ..ground()
        };
        assert!(!jump.update(DT, 0.0, inputs).jumped);
    }

    #[test]
    fn test_release_cuts_rising_jump() {
        let mut jump = JumpController::new(JumpConfig::default());
        jump.press();
        jump.update(DT, 0.0, ground());
        // Run out the boost phase
        for _ in 0..10 {
            jump.update(DT, 10.0, air());
        }
        jump.release(10.0);
        assert!(jump.is_jump_cut());
        assert_eq!(jump.update(DT, 9.0, air()).gravity_scale, Some(0.5));
    }

    #[test]
    fn test_gravity_phases() {
        let mut jump = JumpController::new(JumpConfig::default());
        assert_eq!(jump.update(DT, 0.0, ground()).gravity_scale, Some(1.0));
        assert_eq!(jump.update(DT, -2.0, air()).gravity_scale, Some(2.0));
        let down = JumpInputs {
            holding_down: true,
            ..air()
        };
        assert_eq!(jump.update(DT, -2.0, down).gravity_scale, Some(2.5));
        let dashing = JumpInputs {
            dashing: true,
            ..air()
        };
        assert_eq!(jump.update(DT, 0.0, dashing).gravity_scale, None);
    }

    #[test]
    fn test_apex_hang() {
        let mut jump = JumpController::new(JumpConfig::default());
        jump.press();
        jump.update(DT, 0.0, ground());
        for _ in 0..10 {
            jump.update(DT, 5.0, air());
        }
        assert!(jump.at_apex(0.5));
        assert_eq!(jump.update(DT, 0.5, air()).gravity_scale, Some(0.4));
        // Falling ends the jump
        jump.update(DT, -0.5, air());
        assert!(!jump.is_jumping());
    }
}
