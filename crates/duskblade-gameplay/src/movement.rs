//! Horizontal movement integration.
//!
//! Once per fixed tick the integrator moves horizontal velocity toward the
//! input target at a rate picked from the character's situation. While another
//! system owns velocity (a dodge, a knockback, an attack lunge) it leaves
//! velocity alone.

use serde::{Deserialize, Serialize};

use crate::blackboard::{AnimationBlackboard, BoolParam};
use crate::input::Vec2;

/// Direction a character faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing left (-x)
    Left,
    /// Facing right (+x, default)
    #[default]
    Right,
}

impl Facing {
    /// Horizontal sign of this facing.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Facing implied by a horizontal axis value, if any.
    #[must_use]
    pub fn from_axis(x: f32) -> Option<Self> {
        if x > 0.0 {
            Some(Self::Right)
        } else if x < 0.0 {
            Some(Self::Left)
        } else {
            None
        }
    }

    /// The opposite facing.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Ground movement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Target speed at full input (units/second).
    pub walk_speed: f32,
    /// Hard cap on horizontal speed under acceleration control.
    pub max_speed: f32,
    /// Rate toward a non-zero target (units/second^2).
    pub acceleration: f32,
    /// Rate toward zero when there is no input.
    pub deceleration: f32,
    /// Rate when input opposes current velocity.
    pub direction_change_deceleration: f32,
    /// Rate while an attack is playing.
    pub attacking_deceleration: f32,
    /// Rate and target multiplier near a jump apex.
    pub jump_apex_multiplier: f32,
    /// Speeds below this snap to zero.
    pub dead_zone: f32,
    /// Targets below this count as no input.
    pub input_epsilon: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            max_speed: 8.0,
            acceleration: 120.0,
            deceleration: 120.0,
            direction_change_deceleration: 200.0,
            attacking_deceleration: 5000.0,
            jump_apex_multiplier: 1.1,
            dead_zone: 0.1,
            input_epsilon: 0.01,
        }
    }
}

/// Gating flags read once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementFlags {
    /// Movement input is honored
    pub can_move: bool,
    /// Another system owns horizontal velocity this tick
    pub locked: bool,
    /// An attack is playing
    pub attacking: bool,
    /// A dodge or dash is playing
    pub dodging: bool,
    /// Rising slowly near the top of a jump
    pub at_jump_apex: bool,
}

impl MovementFlags {
    /// Free movement with no gates set.
    #[must_use]
    pub const fn free() -> Self {
        Self {
            can_move: true,
            locked: false,
            attacking: false,
            dodging: false,
            at_jump_apex: false,
        }
    }

    /// Reads the flags from an animation blackboard.
    #[must_use]
    pub fn from_blackboard<B: AnimationBlackboard + ?Sized>(bb: &B, at_jump_apex: bool) -> Self {
        Self {
            can_move: bb.get_bool(BoolParam::CanMove),
            locked: bb.get_bool(BoolParam::LockVelocity),
            attacking: bb.get_bool(BoolParam::IsAttacking),
            dodging: bb.get_bool(BoolParam::IsDodging) || bb.get_bool(BoolParam::IsDashing),
            at_jump_apex,
        }
    }
}

/// Moves `current` toward `target` by at most `max_delta`.
#[must_use]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// Per-character horizontal velocity controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementIntegrator {
    config: MovementConfig,
    velocity: Vec2,
    facing: Facing,
    move_input: Vec2,
}

impl Default for MovementIntegrator {
    fn default() -> Self {
        Self::new(MovementConfig::default())
    }
}

impl MovementIntegrator {
    /// Creates an integrator at rest, facing right.
    #[must_use]
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            velocity: Vec2::ZERO,
            facing: Facing::Right,
            move_input: Vec2::ZERO,
        }
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Overwrites velocity (physics collaborator write-back).
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Current facing.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Last movement axis received.
    #[must_use]
    pub fn move_input(&self) -> Vec2 {
        self.move_input
    }

    /// Stores the movement axis, clamped to [-1, 1] per component.
    pub fn set_move_input(&mut self, axis: Vec2) {
        self.move_input = Vec2::new(axis.x.clamp(-1.0, 1.0), axis.y.clamp(-1.0, 1.0));
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Replaces velocity with a knockback impulse.
    pub fn apply_knockback(&mut self, knockback: Vec2) {
        self.velocity = Vec2::ZERO;
        self.velocity += knockback;
    }

    /// Sets a scripted horizontal velocity and zeroes vertical velocity.
    pub fn drive_horizontal(&mut self, vx: f32) {
        self.velocity = Vec2::new(vx, 0.0);
    }

    /// Turns to match the input unless the facing is locked.
    pub fn update_facing(&mut self, flags: MovementFlags) {
        if flags.dodging || flags.attacking {
            return;
        }
        if let Some(wanted) = Facing::from_axis(self.move_input.x) {
            self.facing = wanted;
        }
    }

    /// Advances horizontal velocity by one fixed tick and returns it.
    pub fn integrate(&mut self, dt: f32, flags: MovementFlags) -> Vec2 {
        self.update_facing(flags);

        if flags.locked || !flags.can_move {
            return self.velocity;
        }

        let cfg = &self.config;
        let current = self.velocity.x;
        let mut target = self.move_input.x * cfg.walk_speed;
        let has_target = target.abs() > cfg.input_epsilon;

        let mut rate = if has_target {
            cfg.acceleration
        } else {
            cfg.deceleration
        };

        if has_target && target.signum() != current.signum() && current.abs() > cfg.dead_zone {
            rate = cfg.direction_change_deceleration;
        }

        if flags.attacking {
            rate = cfg.attacking_deceleration;
        }

        if flags.at_jump_apex {
            rate *= cfg.jump_apex_multiplier;
            target *= cfg.jump_apex_multiplier;
        }

        let mut speed =
            move_towards(current, target, rate * dt).clamp(-cfg.max_speed, cfg.max_speed);
        if speed.abs() < cfg.dead_zone {
            speed = 0.0;
        }

        self.velocity.x = speed;
        self.velocity
    }
}
