//! Minimal animation runtime for the headless arena.
//!
//! Stands in for the animation state graph: consumes triggers from a
//! character's blackboard, advances through timed combat states, and reports
//! the current state back to the combat gate each tick.

use serde::{Deserialize, Serialize};

use duskblade_gameplay::{AnimationBlackboard, Blackboard, BoolParam, CombatState, Trigger};

/// Clip lengths for the player's combat states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipTimings {
    /// First swing length (seconds)
    pub attack1: f32,
    /// Second swing length (seconds)
    pub attack2: f32,
    /// Recovery after the first swing
    pub transition: f32,
    /// Time into a swing when the hitbox connects
    pub strike_at: f32,
}

impl Default for ClipTimings {
    fn default() -> Self {
        Self {
            attack1: 0.35,
            attack2: 0.4,
            transition: 0.15,
            strike_at: 0.15,
        }
    }
}

/// Output of one animator update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimatorFrame {
    /// State playing after the update
    pub state: CombatState,
    /// The swing's hitbox connects this tick
    pub strike: bool,
}

/// Player animation state graph.
#[derive(Debug, Clone, Default)]
pub struct PlayerAnimator {
    clips: ClipTimings,
    state: CombatState,
    elapsed: f32,
    struck: bool,
}

impl PlayerAnimator {
    /// Creates an animator in Idle.
    #[must_use]
    pub fn new(clips: ClipTimings) -> Self {
        Self {
            clips,
            ..Self::default()
        }
    }

    fn enter(&mut self, state: CombatState) {
        self.state = state;
        self.elapsed = 0.0;
        self.struck = false;
    }

    fn locomotion(bb: &Blackboard) -> CombatState {
        if bb.get_bool(BoolParam::IsMoving) {
            CombatState::Walk
        } else {
            CombatState::Idle
        }
    }

    /// Advances one tick. Transitions requested by triggers are taken before
    /// the state's own timer runs.
    pub fn advance(&mut self, dt: f32, bb: &mut Blackboard) -> AnimatorFrame {
        if bb.take_trigger(Trigger::Attack) {
            self.enter(CombatState::Attack1);
        } else if bb.take_trigger(Trigger::Attack2) {
            self.enter(CombatState::Attack2);
        } else if bb.take_trigger(Trigger::Roll) {
            self.enter(CombatState::Dodge);
        } else if bb.take_trigger(Trigger::Dash) {
            self.enter(CombatState::Dash);
        }
        bb.take_trigger(Trigger::Jump);

        self.elapsed += dt;
        match self.state {
            CombatState::Attack1 if self.elapsed >= self.clips.attack1 => {
                self.enter(CombatState::Transition);
            },
            CombatState::Attack2 if self.elapsed >= self.clips.attack2 => {
                self.enter(Self::locomotion(bb));
            },
            CombatState::Transition if self.elapsed >= self.clips.transition => {
                self.enter(Self::locomotion(bb));
            },
            CombatState::Dodge if !bb.get_bool(BoolParam::IsDodging) => {
                self.enter(Self::locomotion(bb));
            },
            CombatState::Dash if !bb.get_bool(BoolParam::IsDashing) => {
                self.enter(Self::locomotion(bb));
            },
            CombatState::Idle | CombatState::Walk => {
                self.state = Self::locomotion(bb);
            },
            _ => {},
        }

        bb.set_bool(BoolParam::IsAttacking, self.state.is_attack());
        let strike = self.state.is_attack() && !self.struck && self.elapsed >= self.clips.strike_at;
        if strike {
            self.struck = true;
        }
        AnimatorFrame {
            state: self.state,
            strike,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CombatState {
        self.state
    }
}

/// Hit reaction: holds `LockVelocity` for a fixed time after a `Hit` trigger.
#[derive(Debug, Clone, Default)]
pub struct HitRecovery {
    duration: f32,
    remaining: f32,
}

impl HitRecovery {
    /// Creates a recovery timer.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: 0.0,
        }
    }

    /// Consumes a pending `Hit` trigger and releases the lock when time is up.
    pub fn advance(&mut self, dt: f32, bb: &mut Blackboard) {
        if bb.take_trigger(Trigger::Hit) {
            self.remaining = self.duration;
            return;
        }
        if self.remaining <= 0.0 {
            return;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            bb.set_bool(BoolParam::LockVelocity, false);
        }
    }

    /// Whether the reaction is still playing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.05;

    #[test]
    fn test_combo_states() {
        let mut anim = PlayerAnimator::new(ClipTimings::default());
        let mut bb = Blackboard::new();

        bb.set_trigger(Trigger::Attack);
        let frame = anim.advance(DT, &mut bb);
        assert_eq!(frame.state, CombatState::Attack1);
        assert!(!frame.strike);
        assert!(bb.get_bool(BoolParam::IsAttacking));

        let strikes = (0..10)
            .map(|_| anim.advance(DT, &mut bb))
            .take_while(|f| f.state == CombatState::Attack1)
            .filter(|f| f.strike)
            .count();
        assert_eq!(strikes, 1);
        assert_eq!(anim.state(), CombatState::Transition);

        bb.set_trigger(Trigger::Attack2);
        assert_eq!(anim.advance(DT, &mut bb).state, CombatState::Attack2);
        for _ in 0..10 {
            anim.advance(DT, &mut bb);
        }
        assert_eq!(anim.state(), CombatState::Idle);
        assert!(!bb.get_bool(BoolParam::IsAttacking));
    }

    #[test]
    fn test_walk_follows_blackboard() {
        let mut anim = PlayerAnimator::default();
        let mut bb = Blackboard::new();
        bb.set_bool(BoolParam::IsMoving, true);
        assert_eq!(anim.advance(DT, &mut bb).state, CombatState::Walk);
        bb.set_bool(BoolParam::IsMoving, false);
        assert_eq!(anim.advance(DT, &mut bb).state, CombatState::Idle);
    }

    #[test]
    fn test_dodge_state_follows_flag() {
        let mut anim = PlayerAnimator::default();
        let mut bb = Blackboard::new();
        bb.set_trigger(Trigger::Roll);
        bb.set_bool(BoolParam::IsDodging, true);
        assert_eq!(anim.advance(DT, &mut bb).state, CombatState::Dodge);
        assert_eq!(anim.advance(DT, &mut bb).state, CombatState::Dodge);
        bb.set_bool(BoolParam::IsDodging, false);
        assert_eq!(anim.advance(DT, &mut bb).state, CombatState::Idle);
    }

    #[test]
    fn test_hit_recovery_releases_lock() {
        let mut recovery = HitRecovery::new(0.1);
        let mut bb = Blackboard::new();
        bb.set_bool(BoolParam::LockVelocity, true);
        bb.set_trigger(Trigger::Hit);
        recovery.advance(DT, &mut bb);
        assert!(recovery.is_active());
        recovery.advance(DT, &mut bb);
        assert!(bb.get_bool(BoolParam::LockVelocity));
        recovery.advance(DT, &mut bb);
        assert!(!bb.get_bool(BoolParam::LockVelocity));
        assert!(!recovery.is_active());
    }
}
