//! Contact queries.
//!
//! The physics collaborator answers "am I touching X" questions through
//! [`ContactProbe`]. [`TouchingDirections`] samples the probe once per fixed
//! tick and mirrors changes onto the animation blackboard.

use std::collections::HashSet;

use tracing::trace;

use crate::blackboard::{AnimationBlackboard, BoolParam};
use crate::movement::Facing;

/// Contact query interface provided by the physics collaborator.
pub trait ContactProbe {
    /// Checks for ground directly below.
    fn is_grounded(&self) -> bool;

    /// Checks for a wall in the facing direction.
    fn is_on_wall(&self, facing: Facing) -> bool;

    /// Checks for a ceiling directly above.
    fn is_on_ceiling(&self) -> bool;

    /// Checks whether an enemy overlaps the character.
    fn is_touching_enemy(&self) -> bool;

    /// Checks whether the ground ends just ahead.
    fn is_cliff_ahead(&self, _facing: Facing) -> bool {
        false
    }
}

/// Mock contact probe for testing.
#[derive(Debug, Default, Clone)]
pub struct MockContacts {
    /// Ground below
    pub grounded: bool,
    /// Ceiling above
    pub ceiling: bool,
    /// Enemy overlapping
    pub enemy: bool,
    /// Sides with a wall
    walls: HashSet<Facing>,
    /// Sides where the ground ends
    cliffs: HashSet<Facing>,
}

impl MockContacts {
    /// Creates a probe touching nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a probe standing on ground.
    #[must_use]
    pub fn on_ground() -> Self {
        Self {
            grounded: true,
            ..Self::default()
        }
    }

    /// Places a wall on one side.
    pub fn set_wall(&mut self, side: Facing) {
        self.walls.insert(side);
    }

    /// Places a cliff edge on one side.
    pub fn set_cliff(&mut self, side: Facing) {
        self.cliffs.insert(side);
    }
}

impl ContactProbe for MockContacts {
    fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn is_on_wall(&self, facing: Facing) -> bool {
        self.walls.contains(&facing)
    }

    fn is_on_ceiling(&self) -> bool {
        self.ceiling
    }

    fn is_touching_enemy(&self) -> bool {
        self.enemy
    }

    fn is_cliff_ahead(&self, facing: Facing) -> bool {
        self.cliffs.contains(&facing)
    }
}

/// Contact state sampled once per tick.
#[derive(Debug, Clone, Default)]
pub struct TouchingDirections {
    grounded: bool,
    on_wall: bool,
    on_ceiling: bool,
    touching_enemy: bool,
    cliff_ahead: bool,
    /// Skip wall checks (wall always reported as absent)
    pub disable_wall_detection: bool,
}

impl TouchingDirections {
    /// Creates contact state touching nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables wall detection.
    #[must_use]
    pub fn without_walls(mut self) -> Self {
        self.disable_wall_detection = true;
        self
    }

    /// Samples the probe. Blackboard flags are only written when they change.
    pub fn refresh<P, B>(&mut self, probe: &P, facing: Facing, bb: &mut B)
    where
        P: ContactProbe + ?Sized,
        B: AnimationBlackboard + ?Sized,
    {
        let grounded = probe.is_grounded();
        let on_wall = !self.disable_wall_detection && probe.is_on_wall(facing);
        let on_ceiling = probe.is_on_ceiling();

        if grounded != self.grounded {
            trace!(grounded, "ground contact changed");
            bb.set_bool(BoolParam::IsGrounded, grounded);
        }
        if on_wall != self.on_wall {
            bb.set_bool(BoolParam::IsOnWall, on_wall);
        }
        if on_ceiling != self.on_ceiling {
            bb.set_bool(BoolParam::IsOnCeiling, on_ceiling);
        }

        self.grounded = grounded;
        self.on_wall = on_wall;
        self.on_ceiling = on_ceiling;
        self.touching_enemy = probe.is_touching_enemy();
        self.cliff_ahead = probe.is_cliff_ahead(facing);
    }

    /// Standing on ground.
    #[must_use]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Pressed against a wall in the facing direction.
    #[must_use]
    pub fn is_on_wall(&self) -> bool {
        self.on_wall
    }

    /// Touching a ceiling.
    #[must_use]
    pub fn is_on_ceiling(&self) -> bool {
        self.on_ceiling
    }

    /// Overlapping an enemy.
    #[must_use]
    pub fn is_touching_enemy(&self) -> bool {
        self.touching_enemy
    }

    /// Ground ends just ahead.
    #[must_use]
    pub fn is_cliff_ahead(&self) -> bool {
        self.cliff_ahead
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::Blackboard;

    #[test]
    fn test_refresh_mirrors_to_blackboard() {
        let mut touching = TouchingDirections::new();
        let mut bb = Blackboard::new();
        let mut probe = MockContacts::on_ground();
        probe.set_wall(Facing::Right);

        touching.refresh(&probe, Facing::Right, &mut bb);
        assert!(touching.is_grounded());
        assert!(touching.is_on_wall());
        assert!(bb.get_bool(BoolParam::IsGrounded));
        assert!(bb.get_bool(BoolParam::IsOnWall));

        // Facing away from the wall
        touching.refresh(&probe, Facing::Left, &mut bb);
        assert!(!touching.is_on_wall());
        assert!(!bb.get_bool(BoolParam::IsOnWall));
    }

    #[test]
    fn test_unchanged_flags_not_rewritten() {
        let mut touching = TouchingDirections::new();
        let mut bb = Blackboard::new();
        let probe = MockContacts::new();

        // External writer sets the flag; the probe agrees with the cached
        // state so the refresh leaves it alone.
        bb.set_bool(BoolParam::IsGrounded, true);
        touching.refresh(&probe, Facing::Right, &mut bb);
        assert!(bb.get_bool(BoolParam::IsGrounded));
    }

    #[test]
    fn test_wall_detection_disabled() {
        let mut touching = TouchingDirections::new().without_walls();
        let mut bb = Blackboard::new();
        let mut probe = MockContacts::new();
        probe.set_wall(Facing::Left);
        touching.refresh(&probe, Facing::Left, &mut bb);
        assert!(!touching.is_on_wall());
    }

    #[test]
    fn test_cliff_and_enemy() {
        let mut touching = TouchingDirections::new();
        let mut bb = Blackboard::new();
        let mut probe = MockContacts::on_ground();
        probe.enemy = true;
        probe.set_cliff(Facing::Left);
        touching.refresh(&probe, Facing::Left, &mut bb);
        assert!(touching.is_touching_enemy());
        assert!(touching.is_cliff_ahead());
    }
}
