//! Discrete input events delivered by the engine's input system.
//!
//! Actions arrive as start/perform/cancel callbacks. Move carries a 2D axis
//! payload; the others are plain button presses.

use serde::{Deserialize, Serialize};

/// 2D vector for velocities, knockback and input axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Unit vector pointing up (positive y is up).
    pub const UP: Self = Self { x: 0.0, y: 1.0 };

    /// Unit vector pointing left.
    pub const LEFT: Self = Self { x: -1.0, y: 0.0 };

    /// Unit vector pointing right.
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0 };

    /// Creates a new Vec2.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the length (magnitude) of the vector.
    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Scale the vector by a scalar.
    #[must_use]
    pub fn scale(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// Returns the vector with its horizontal component negated.
    #[must_use]
    pub fn mirrored_x(self) -> Self {
        Self {
            x: -self.x,
            y: self.y,
        }
    }

    /// Returns a copy with a different x component.
    #[must_use]
    pub fn with_x(self, x: f32) -> Self {
        Self { x, y: self.y }
    }

    /// Returns a copy with a different y component.
    #[must_use]
    pub fn with_y(self, y: f32) -> Self {
        Self { x: self.x, y }
    }

    /// Distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Whether both components are exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        self.scale(rhs)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Named gameplay actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Horizontal/vertical movement axis
    Move,
    /// Jump button
    Jump,
    /// Melee attack button
    Attack,
    /// Dodge on the ground, dash in the air
    Dodge,
    /// Drink a potion
    Heal,
}

/// Callback phase of an input action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputPhase {
    /// Button went down
    Started,
    /// Interaction completed (press for buttons, value change for axes)
    Performed,
    /// Button released or axis returned to rest
    Canceled,
}

/// A single input callback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Which action fired
    pub action: InputAction,
    /// Callback phase
    pub phase: InputPhase,
    /// Axis payload (only meaningful for Move)
    pub axis: Vec2,
}

impl InputEvent {
    /// Creates a button event with no axis payload.
    #[must_use]
    pub const fn button(action: InputAction, phase: InputPhase) -> Self {
        Self {
            action,
            phase,
            axis: Vec2::ZERO,
        }
    }

    /// Creates a Move event. A zero axis is reported as `Canceled`.
    #[must_use]
    pub fn movement(axis: Vec2) -> Self {
        let phase = if axis.is_zero() {
            InputPhase::Canceled
        } else {
            InputPhase::Performed
        };
        Self {
            action: InputAction::Move,
            phase,
            axis,
        }
    }

    /// Shorthand for a performed press (attack, jump).
    #[must_use]
    pub const fn pressed(action: InputAction) -> Self {
        Self::button(action, InputPhase::Performed)
    }

    /// Shorthand for a started press (dodge, heal).
    #[must_use]
    pub const fn started(action: InputAction) -> Self {
        Self::button(action, InputPhase::Started)
    }

    /// Shorthand for a release.
    #[must_use]
    pub const fn released(action: InputAction) -> Self {
        Self::button(action, InputPhase::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_mirror() {
        assert_eq!(Vec2::new(5.0, 2.0).mirrored_x(), Vec2::new(-5.0, 2.0));
    }

    #[test]
    fn test_vec2_ops() {
        let mut v = Vec2::new(1.0, 2.0) + Vec2::new(2.0, 2.0);
        assert_eq!(v, Vec2::new(3.0, 4.0));
        assert_eq!(v.length(), 5.0);
        v += Vec2::UP;
        assert_eq!(v * 2.0, Vec2::new(6.0, 10.0));
    }

    #[test]
    fn test_movement_event_phase() {
        assert_eq!(
            InputEvent::movement(Vec2::RIGHT).phase,
            InputPhase::Performed
        );
        assert_eq!(InputEvent::movement(Vec2::ZERO).phase, InputPhase::Canceled);
    }
}
