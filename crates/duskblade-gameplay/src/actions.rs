//! Timed evasive actions (ground dodge and air dash).
//!
//! An action drives horizontal velocity at a fixed speed for a fixed duration,
//! advanced once per fixed tick. Dropping the action cancels it.

use serde::{Deserialize, Serialize};

use crate::blackboard::{BoolParam, Trigger};
use crate::combat_gate::CombatState;
use crate::movement::Facing;

/// Kind of evasive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvasionKind {
    /// Grounded roll
    Dodge,
    /// Airborne dash
    Dash,
}

impl EvasionKind {
    /// Blackboard flag raised while the action runs.
    #[must_use]
    pub const fn flag(self) -> BoolParam {
        match self {
            Self::Dodge => BoolParam::IsDodging,
            Self::Dash => BoolParam::IsDashing,
        }
    }

    /// Trigger fired when the action starts.
    #[must_use]
    pub const fn trigger(self) -> Trigger {
        match self {
            Self::Dodge => Trigger::Roll,
            Self::Dash => Trigger::Dash,
        }
    }

    /// Combat state the action plays in.
    #[must_use]
    pub const fn state(self) -> CombatState {
        match self {
            Self::Dodge => CombatState::Dodge,
            Self::Dash => CombatState::Dash,
        }
    }
}

/// A dodge or dash in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedAction {
    /// What kind of action this is.
    pub kind: EvasionKind,
    /// Horizontal direction (+1 right, -1 left).
    pub direction: f32,
    /// Speed while active.
    pub speed: f32,
    /// Total duration (seconds).
    pub duration: f32,
    /// Time elapsed so far.
    pub elapsed: f32,
}

impl TimedAction {
    /// Starts an action in the direction the character faces.
    #[must_use]
    pub fn new(kind: EvasionKind, facing: Facing, speed: f32, duration: f32) -> Self {
        Self {
            kind,
            direction: facing.sign(),
            speed,
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    /// Horizontal velocity the action imposes.
    #[must_use]
    pub fn velocity_x(&self) -> f32 {
        self.direction * self.speed
    }

    /// Advances one tick. Returns the velocity to impose this tick, or `None`
    /// once the duration has run out.
    pub fn step(&mut self, dt: f32) -> Option<f32> {
        if self.is_finished() {
            return None;
        }
        self.elapsed += dt;
        Some(self.velocity_x())
    }

    /// Whether the duration has run out.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Progress through the action (0.0-1.0).
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dodge_runs_for_duration() {
        let mut action = TimedAction::new(EvasionKind::Dodge, Facing::Left, 8.0, 0.05);
        let dt = 1.0 / 60.0;
        let mut ticks = 0;
        while let Some(vx) = action.step(dt) {
            assert_eq!(vx, -8.0);
            ticks += 1;
        }
        assert_eq!(ticks, 3);
        assert!(action.is_finished());
        assert_eq!(action.progress(), 1.0);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut action = TimedAction::new(EvasionKind::Dash, Facing::Right, 18.0, 0.0);
        assert!(action.step(0.1).is_none());
    }

    #[test]
    fn test_kind_mappings() {
        assert_eq!(EvasionKind::Dodge.flag(), BoolParam::IsDodging);
        assert_eq!(EvasionKind::Dash.trigger(), Trigger::Dash);
        assert_eq!(EvasionKind::Dash.state(), CombatState::Dash);
    }
}
