//! Animation parameter blackboard.
//!
//! The animation runtime and gameplay code coordinate through a table of
//! named booleans, floats and triggers. Keys are closed enums so a typo is a
//! compile error instead of a silently missing parameter.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Boolean parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolParam {
    /// Horizontal input is held
    IsMoving,
    /// Standing on ground
    IsGrounded,
    /// Pressed against a wall
    IsOnWall,
    /// Touching a ceiling
    IsOnCeiling,
    /// An attack animation is playing
    IsAttacking,
    /// Movement input is honored
    CanMove,
    /// Enemy sees an attack target
    HasTarget,
    /// Character is alive
    IsAlive,
    /// Horizontal velocity is owned by another system (hit, attack lunge)
    LockVelocity,
    /// An air dash is available
    CanDash,
    /// Ground dodge in progress
    IsDodging,
    /// Air dash in progress
    IsDashing,
}

impl BoolParam {
    /// Value a freshly spawned character starts with.
    #[must_use]
    pub const fn default_value(self) -> bool {
        matches!(self, Self::CanMove | Self::IsAlive | Self::CanDash)
    }
}

/// Float parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatParam {
    /// Vertical velocity, drives jump/fall blend
    YVelocity,
    /// Seconds until the enemy may attack again
    AttackCooldown,
}

/// One-shot triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Jump take-off
    Jump,
    /// First combo swing
    Attack,
    /// Second combo swing
    Attack2,
    /// Took a hit
    Hit,
    /// Ground dodge roll
    Roll,
    /// Air dash
    Dash,
    /// Enemy retaliation attempt
    TryAttack,
}

/// Read/write access to an animation parameter table.
pub trait AnimationBlackboard {
    /// Reads a boolean parameter.
    fn get_bool(&self, param: BoolParam) -> bool;

    /// Writes a boolean parameter.
    fn set_bool(&mut self, param: BoolParam, value: bool);

    /// Reads a float parameter.
    fn get_float(&self, param: FloatParam) -> f32;

    /// Writes a float parameter.
    fn set_float(&mut self, param: FloatParam, value: f32);

    /// Latches a trigger until the animation runtime consumes it.
    fn set_trigger(&mut self, trigger: Trigger);
}

/// In-memory blackboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Blackboard {
    bools: HashMap<BoolParam, bool>,
    floats: HashMap<FloatParam, f32>,
    triggers: HashSet<Trigger>,
}

impl Blackboard {
    /// Creates an empty blackboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes a latched trigger, returning whether it was set.
    pub fn take_trigger(&mut self, trigger: Trigger) -> bool {
        self.triggers.remove(&trigger)
    }

    /// Checks a trigger without consuming it.
    #[must_use]
    pub fn is_triggered(&self, trigger: Trigger) -> bool {
        self.triggers.contains(&trigger)
    }

    /// Clears all latched triggers.
    pub fn clear_triggers(&mut self) {
        self.triggers.clear();
    }
}

impl AnimationBlackboard for Blackboard {
    fn get_bool(&self, param: BoolParam) -> bool {
        self.bools
            .get(&param)
            .copied()
            .unwrap_or_else(|| param.default_value())
    }

    fn set_bool(&mut self, param: BoolParam, value: bool) {
        self.bools.insert(param, value);
    }

    fn get_float(&self, param: FloatParam) -> f32 {
        self.floats.get(&param).copied().unwrap_or(0.0)
    }

    fn set_float(&mut self, param: FloatParam, value: f32) {
        self.floats.insert(param, value);
    }

    fn set_trigger(&mut self, trigger: Trigger) {
        self.triggers.insert(trigger);
    }
}
