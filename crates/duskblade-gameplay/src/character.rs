//! Character composition.
//!
//! Wires the per-entity components together in tick order. Position and
//! collision stay with the physics collaborator; characters only own velocity
//! and the gravity multiplier they want applied.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use duskblade_common::EntityId;

use crate::blackboard::{AnimationBlackboard, Blackboard, BoolParam, FloatParam, Trigger};
use crate::combat_gate::{CombatConfig, CombatInputGate, CombatState, ComboStage, GateRejection};
use crate::contacts::{ContactProbe, TouchingDirections};
use crate::goblin::{GoblinBrain, GoblinConfig, GoblinSenses};
use crate::hit::{AttackHitbox, HitOutcome};
use crate::input::{InputAction, InputEvent, InputPhase, Vec2};
use crate::jump::{JumpConfig, JumpController, JumpInputs};
use crate::movement::{Facing, MovementConfig, MovementFlags, MovementIntegrator};
use crate::resources::{HealthConfig, ResourcePool, StaminaConfig};

// ============================================================================
// Player
// ============================================================================

/// Player tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Health pool
    pub health: HealthConfig,
    /// Stamina pool
    pub stamina: StaminaConfig,
    /// Attack/dodge gate
    pub combat: CombatConfig,
    /// Horizontal movement
    pub movement: MovementConfig,
    /// Jumping
    pub jump: JumpConfig,
    /// Health restored by the heal action
    pub heal_amount: f32,
    /// Sword hitbox
    pub attack: AttackHitbox,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            health: HealthConfig::default(),
            stamina: StaminaConfig::default(),
            combat: CombatConfig::default(),
            movement: MovementConfig::default(),
            jump: JumpConfig::default(),
            heal_amount: 30.0,
            attack: AttackHitbox::new(10.0, Vec2::new(3.0, 2.0)),
        }
    }
}

/// Velocity and gravity the physics collaborator should apply after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterStep {
    /// Velocity to write back
    pub velocity: Vec2,
    /// Gravity multiplier to apply
    pub gravity_scale: f32,
}

/// The player character.
#[derive(Debug)]
pub struct PlayerCharacter {
    pool: ResourcePool,
    gate: CombatInputGate,
    movement: MovementIntegrator,
    jump: JumpController,
    contacts: TouchingDirections,
    blackboard: Blackboard,
    attack: AttackHitbox,
    heal_amount: f32,
    gravity_scale: f32,
}

impl PlayerCharacter {
    /// Creates a player at full health and stamina.
    #[must_use]
    pub fn new(entity_id: EntityId, config: PlayerConfig) -> Self {
        Self::with_pool(
            ResourcePool::new(entity_id, config.health.clone(), config.stamina.clone()),
            config,
        )
    }

    /// Creates a player around an already wired pool (events, hit-stop).
    #[must_use]
    pub fn with_pool(pool: ResourcePool, config: PlayerConfig) -> Self {
        Self {
            pool,
            gate: CombatInputGate::new(config.combat),
            movement: MovementIntegrator::new(config.movement),
            jump: JumpController::new(config.jump),
            contacts: TouchingDirections::new(),
            blackboard: Blackboard::new(),
            attack: config.attack,
            heal_amount: config.heal_amount,
            gravity_scale: 1.0,
        }
    }

    /// Dispatches an input callback.
    ///
    /// Returns the gate's rejection for attack and dodge requests that were
    /// turned down. Phases an action does not react to are ignored.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<(), GateRejection> {
        match (event.action, event.phase) {
            (InputAction::Move, _) => {
                self.movement.set_move_input(event.axis);
                let moving = self.pool.is_alive() && !event.axis.is_zero();
                self.blackboard.set_bool(BoolParam::IsMoving, moving);
            },
            (InputAction::Jump, InputPhase::Performed) => self.jump.press(),
            (InputAction::Jump, InputPhase::Canceled) => {
                self.jump.release(self.movement.velocity().y);
            },
            (InputAction::Attack, InputPhase::Performed) => {
                self.request_attack()?;
            },
            (InputAction::Dodge, InputPhase::Started) => {
                self.gate.request_dodge(
                    self.contacts.is_grounded(),
                    self.movement.facing(),
                    &mut self.pool,
                    &mut self.blackboard,
                )?;
            },
            (InputAction::Heal, InputPhase::Started) => {
                if !self.pool.heal(self.heal_amount) {
                    return Err(GateRejection::NotAllowed("cannot heal"));
                }
            },
            _ => {},
        }
        Ok(())
    }

    /// Requests an attack directly.
    pub fn request_attack(&mut self) -> Result<ComboStage, GateRejection> {
        self.gate.request_attack(&mut self.pool, &mut self.blackboard)
    }

    /// State callback from the animation runtime.
    pub fn on_animation_state(&mut self, state: CombatState) -> Option<ComboStage> {
        self.gate
            .handle_state(state, &mut self.pool, &mut self.blackboard)
    }

    /// Like [`on_animation_state`](Self::on_animation_state) with a raw label.
    pub fn on_animation_label(&mut self, label: &str) -> Option<ComboStage> {
        self.gate
            .handle_state_label(label, &mut self.pool, &mut self.blackboard)
    }

    /// Runs one fixed tick.
    ///
    /// Order: contacts, dodge/dash override or movement, jump, then the pool's
    /// regeneration tick. Stamina spent by input this tick is already applied.
    pub fn step<P: ContactProbe + ?Sized>(&mut self, dt: f32, probe: &P) -> CharacterStep {
        let bb = &mut self.blackboard;
        self.contacts.refresh(probe, self.movement.facing(), bb);
        let grounded = self.contacts.is_grounded();
        if grounded && !bb.get_bool(BoolParam::IsDashing) {
            bb.set_bool(BoolParam::CanDash, true);
        }

        if let Some(vx) = self.gate.tick(dt, bb) {
            self.movement.drive_horizontal(vx);
        } else {
            let vy = self.movement.velocity().y;
            let flags = MovementFlags::from_blackboard(bb, self.jump.at_apex(vy));
            self.movement.integrate(dt, flags);
        }

        let velocity = self.movement.velocity();
        let inputs = JumpInputs {
            grounded,
            can_jump: bb.get_bool(BoolParam::CanMove)
                && !bb.get_bool(BoolParam::IsDodging)
                && !bb.get_bool(BoolParam::IsDashing),
            dashing: bb.get_bool(BoolParam::IsDashing),
            holding_down: self.movement.move_input().y < 0.0,
        };
        let jump = self.jump.update(dt, velocity.y, inputs);
        if jump.jumped {
            bb.set_trigger(Trigger::Jump);
        }
        if let Some(scale) = jump.gravity_scale {
            self.gravity_scale = scale;
        }
        self.movement
            .set_velocity(velocity.with_y(jump.velocity_y));
        bb.set_float(FloatParam::YVelocity, jump.velocity_y);

        self.pool.tick(dt);

        CharacterStep {
            velocity: self.movement.velocity(),
            gravity_scale: self.gravity_scale,
        }
    }

    /// Takes a hit from an attacker's hitbox.
    pub fn receive_hit(&mut self, attacker_facing: Facing, hitbox: &AttackHitbox) -> HitOutcome {
        let outcome = hitbox.strike(attacker_facing, &mut self.pool);
        if outcome.applied {
            self.movement.apply_knockback(outcome.delivered_knockback);
            react_to_hit(&mut self.blackboard, &self.pool);
            if !self.pool.is_alive() {
                self.gate.cancel_action(&mut self.blackboard);
            }
        }
        outcome
    }

    /// Physics write-back after the collaborator integrated position.
    pub fn sync_velocity(&mut self, velocity: Vec2) {
        self.movement.set_velocity(velocity);
    }

    /// Health and stamina.
    #[must_use]
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Mutable health and stamina.
    pub fn pool_mut(&mut self) -> &mut ResourcePool {
        &mut self.pool
    }

    /// Combat gate.
    #[must_use]
    pub fn gate(&self) -> &CombatInputGate {
        &self.gate
    }

    /// Animation parameters.
    #[must_use]
    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    /// Mutable animation parameters (for the animation runtime).
    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.movement.velocity()
    }

    /// Current facing.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.movement.facing()
    }

    /// Contact state from the last tick.
    #[must_use]
    pub fn contacts(&self) -> &TouchingDirections {
        &self.contacts
    }

    /// Sword hitbox.
    #[must_use]
    pub fn attack_hitbox(&self) -> &AttackHitbox {
        &self.attack
    }
}

fn react_to_hit<B: AnimationBlackboard + ?Sized>(bb: &mut B, pool: &ResourcePool) {
    bb.set_trigger(Trigger::Hit);
    bb.set_bool(BoolParam::LockVelocity, true);
    if !pool.is_alive() {
        bb.set_bool(BoolParam::IsAlive, false);
        bb.set_bool(BoolParam::CanMove, false);
    }
}

// ============================================================================
// Goblin
// ============================================================================

/// Goblin tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoblinCharacterConfig {
    /// Health pool
    pub health: HealthConfig,
    /// Behaviour
    pub brain: GoblinConfig,
    /// Club hitbox
    pub attack: AttackHitbox,
    /// Seconds between attacks
    pub attack_cooldown: f32,
}

impl Default for GoblinCharacterConfig {
    fn default() -> Self {
        Self {
            health: HealthConfig::default(),
            brain: GoblinConfig::default(),
            attack: AttackHitbox::new(10.0, Vec2::new(4.0, 2.0)),
            attack_cooldown: 1.5,
        }
    }
}

/// A goblin enemy.
#[derive(Debug)]
pub struct GoblinCharacter {
    pool: ResourcePool,
    brain: GoblinBrain,
    blackboard: Blackboard,
    velocity: Vec2,
    attack: AttackHitbox,
    attack_cooldown: f32,
}

impl GoblinCharacter {
    /// Creates a goblin. `seed` drives its retaliation rolls.
    #[must_use]
    pub fn new(entity_id: EntityId, config: GoblinCharacterConfig, seed: u64) -> Self {
        Self::with_pool(
            ResourcePool::new(entity_id, config.health.clone(), StaminaConfig::default()),
            config,
            seed,
        )
    }

    /// Creates a goblin around an already wired pool.
    #[must_use]
    pub fn with_pool(pool: ResourcePool, config: GoblinCharacterConfig, seed: u64) -> Self {
        Self {
            pool,
            brain: GoblinBrain::new(config.brain, seed),
            blackboard: Blackboard::new(),
            velocity: Vec2::ZERO,
            attack: config.attack,
            attack_cooldown: config.attack_cooldown,
        }
    }

    /// Runs one fixed tick and returns the velocity to write back.
    pub fn step(&mut self, dt: f32, senses: &GoblinSenses) -> Vec2 {
        if self.pool.is_alive() {
            self.velocity = self
                .brain
                .tick(dt, senses, self.velocity, &mut self.blackboard);
        }
        self.pool.tick(dt);
        self.velocity
    }

    /// Swings the club if a target is in range and the cooldown allows it, or
    /// a retaliation roll is pending. Dead goblins never swing. Starts the
    /// cooldown on success.
    pub fn try_begin_attack(&mut self) -> bool {
        let bb = &mut self.blackboard;
        if !self.pool.is_alive() {
            bb.take_trigger(Trigger::TryAttack);
            return false;
        }
        let ready =
            bb.get_bool(BoolParam::HasTarget) && bb.get_float(FloatParam::AttackCooldown) <= 0.0;
        if !ready && !bb.take_trigger(Trigger::TryAttack) {
            return false;
        }
        bb.set_float(FloatParam::AttackCooldown, self.attack_cooldown);
        bb.set_bool(BoolParam::HasTarget, false);
        debug!(entity = %self.pool.entity_id(), "goblin attacks");
        true
    }

    /// Takes a hit from an attacker's hitbox.
    pub fn receive_hit(&mut self, attacker_facing: Facing, hitbox: &AttackHitbox) -> HitOutcome {
        let outcome = hitbox.strike(attacker_facing, &mut self.pool);
        if outcome.applied {
            self.velocity = Vec2::ZERO;
            self.velocity += outcome.delivered_knockback;
            react_to_hit(&mut self.blackboard, &self.pool);
            if self.pool.is_alive() {
                self.brain.on_hit(&mut self.blackboard);
            } else {
                info!(entity = %self.pool.entity_id(), "goblin defeated");
            }
        }
        outcome
    }

    /// Physics write-back after the collaborator integrated position.
    pub fn sync_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Health.
    #[must_use]
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Behaviour state.
    #[must_use]
    pub fn brain(&self) -> &GoblinBrain {
        &self.brain
    }

    /// Animation parameters.
    #[must_use]
    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    /// Mutable animation parameters (for the animation runtime).
    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Current facing.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.brain.facing()
    }

    /// Club hitbox.
    #[must_use]
    pub fn attack_hitbox(&self) -> &AttackHitbox {
        &self.attack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::MockContacts;

    const DT: f32 = 1.0 / 60.0;

    fn player() -> PlayerCharacter {
        PlayerCharacter::new(EntityId::from_raw(1), PlayerConfig::default())
    }

    #[test]
    fn test_move_input_walks() {
        let mut p = player();
        let ground = MockContacts::on_ground();
        p.handle_input(InputEvent::movement(Vec2::LEFT)).ok();
        assert!(p.blackboard().get_bool(BoolParam::IsMoving));
        for _ in 0..10 {
            p.step(DT, &ground);
        }
        assert_eq!(p.velocity().x, -5.0);
        assert_eq!(p.facing(), Facing::Left);

        p.handle_input(InputEvent::movement(Vec2::ZERO)).ok();
        assert!(!p.blackboard().get_bool(BoolParam::IsMoving));
    }

    #[test]
    fn test_attack_spends_before_regen() {
        let mut p = player();
        let ground = MockContacts::on_ground();
        assert!(p.handle_input(InputEvent::pressed(InputAction::Attack)).is_ok());
        assert_eq!(p.pool().stamina(), 80.0);
        assert!(p.blackboard().is_triggered(Trigger::Attack));

        // Second press before the runtime re-arms input
        assert!(matches!(
            p.handle_input(InputEvent::pressed(InputAction::Attack)),
            Err(GateRejection::InputLocked(_))
        ));

        p.on_animation_state(CombatState::Attack1);
        p.step(DT, &ground);
        assert_eq!(p.pool().stamina(), 80.0);
    }

    #[test]
    fn test_attack_ignores_other_phases() {
        let mut p = player();
        assert!(p.handle_input(InputEvent::started(InputAction::Attack)).is_ok());
        assert_eq!(p.pool().stamina(), 100.0);
    }

    #[test]
    fn test_dodge_then_control_returns() {
        let mut p = player();
        let ground = MockContacts::on_ground();
        p.step(DT, &ground);
        assert!(p.handle_input(InputEvent::started(InputAction::Dodge)).is_ok());
        assert!(p.blackboard().get_bool(BoolParam::IsDodging));

        let step = p.step(DT, &ground);
        assert_eq!(step.velocity.x, 8.0);

        for _ in 0..60 {
            p.step(DT, &ground);
        }
        assert!(!p.blackboard().get_bool(BoolParam::IsDodging));
        assert!(p.blackboard().get_bool(BoolParam::CanMove));
        // No input held, so the integrator brought the character to rest
        assert_eq!(p.velocity().x, 0.0);
    }

    #[test]
    fn test_air_dash_restored_on_landing() {
        let mut p = player();
        let air = MockContacts::new();
        let ground = MockContacts::on_ground();
        p.step(DT, &air);
        assert!(p.handle_input(InputEvent::started(InputAction::Dodge)).is_ok());
        assert!(p.blackboard().get_bool(BoolParam::IsDashing));
        for _ in 0..30 {
            p.step(DT, &air);
        }
        assert!(!p.blackboard().get_bool(BoolParam::CanDash));
        p.step(DT, &ground);
        assert!(p.blackboard().get_bool(BoolParam::CanDash));
    }

    #[test]
    fn test_jump_sets_velocity_and_trigger() {
        let mut p = player();
        let ground = MockContacts::on_ground();
        p.step(DT, &ground);
        p.handle_input(InputEvent::pressed(InputAction::Jump)).ok();
        let step = p.step(DT, &ground);
        assert_eq!(step.velocity.y, 14.0);
        assert!(p.blackboard().is_triggered(Trigger::Jump));
        assert_eq!(p.blackboard().get_float(FloatParam::YVelocity), 14.0);
    }

    #[test]
    fn test_heal() {
        let mut p = player();
        p.pool_mut().apply_damage(50.0);
        assert!(p.handle_input(InputEvent::started(InputAction::Heal)).is_ok());
        assert_eq!(p.pool().health(), 80.0);
    }

    #[test]
    fn test_receive_hit_applies_knockback() {
        let mut p = player();
        let hitbox = AttackHitbox::new(10.0, Vec2::new(5.0, 2.0));
        let outcome = p.receive_hit(Facing::Left, &hitbox);
        assert!(outcome.applied);
        assert_eq!(p.velocity(), Vec2::new(-5.0, 2.0));
        assert!(p.blackboard().get_bool(BoolParam::LockVelocity));
        assert!(p.blackboard().is_triggered(Trigger::Hit));

        // Invincible right after the hit
        let again = p.receive_hit(Facing::Left, &hitbox);
        assert!(!again.applied);
        assert_eq!(p.pool().health(), 90.0);
    }

    #[test]
    fn test_locked_velocity_kept_by_integrator() {
        let mut p = player();
        let ground = MockContacts::on_ground();
        p.receive_hit(Facing::Right, &AttackHitbox::new(10.0, Vec2::new(5.0, 0.0)));
        p.step(DT, &ground);
        assert_eq!(p.velocity().x, 5.0);
    }

    #[test]
    fn test_fatal_hit_disables_movement() {
        let mut p = player();
        p.receive_hit(Facing::Right, &AttackHitbox::new(500.0, Vec2::ZERO));
        assert!(!p.pool().is_alive());
        assert!(!p.blackboard().get_bool(BoolParam::IsAlive));
        assert!(!p.blackboard().get_bool(BoolParam::CanMove));
    }

    #[test]
    fn test_forced_regen_stop_outlasts_idle_state() {
        let mut p = player();
        let ground = MockContacts::on_ground();
        assert!(p.pool_mut().try_use_stamina(50.0));
        p.pool_mut().force_stop_regeneration();
        for _ in 0..60 {
            p.on_animation_state(CombatState::Idle);
            p.step(DT, &ground);
        }
        assert_eq!(p.pool().stamina(), 50.0);

        p.pool_mut().force_start_regeneration();
        p.on_animation_state(CombatState::Idle);
        p.step(DT, &ground);
        assert!(p.pool().stamina() > 50.0);
    }

    #[test]
    fn test_killed_mid_dodge_stays_down() {
        let mut p = player();
        let ground = MockContacts::on_ground();
        p.step(DT, &ground);
        assert!(p.handle_input(InputEvent::started(InputAction::Dodge)).is_ok());
        p.step(DT, &ground);

        p.receive_hit(Facing::Left, &AttackHitbox::new(500.0, Vec2::ZERO));
        assert!(!p.pool().is_alive());
        assert!(p.gate().active_action().is_none());
        assert!(!p.blackboard().get_bool(BoolParam::IsDodging));

        p.blackboard_mut().set_bool(BoolParam::LockVelocity, false);
        p.handle_input(InputEvent::movement(Vec2::RIGHT)).ok();
        p.handle_input(InputEvent::pressed(InputAction::Jump)).ok();
        for _ in 0..60 {
            p.step(DT, &ground);
        }
        assert!(!p.blackboard().get_bool(BoolParam::CanMove));
        assert_eq!(p.velocity().x, 0.0);
        assert_eq!(p.velocity().y, 0.0);
    }

    #[test]
    fn test_goblin_hit_and_retaliation() {
        let config = GoblinCharacterConfig {
            brain: GoblinConfig {
                base_attack_chance: 1.0,
                ..GoblinConfig::default()
            },
            ..GoblinCharacterConfig::default()
        };
        let mut goblin = GoblinCharacter::new(EntityId::from_raw(2), config, 3);
        let outcome = goblin.receive_hit(Facing::Right, &AttackHitbox::new(10.0, Vec2::new(3.0, 2.0)));
        assert!(outcome.applied);
        assert_eq!(goblin.velocity(), Vec2::new(3.0, 2.0));
        assert_eq!(goblin.brain().hit_count(), 1);
        assert!(goblin.blackboard().is_triggered(Trigger::TryAttack));
        assert!(goblin.try_begin_attack());
        assert!(goblin.blackboard().get_float(FloatParam::AttackCooldown) > 0.0);
        assert!(!goblin.try_begin_attack());
    }

    #[test]
    fn test_goblin_killed_after_roll_does_not_swing() {
        let config = GoblinCharacterConfig {
            health: HealthConfig {
                invincibility_time: 0.0,
                ..HealthConfig::default()
            },
            brain: GoblinConfig {
                base_attack_chance: 1.0,
                ..GoblinConfig::default()
            },
            ..GoblinCharacterConfig::default()
        };
        let mut goblin = GoblinCharacter::new(EntityId::from_raw(2), config, 3);
        goblin.receive_hit(Facing::Right, &AttackHitbox::new(10.0, Vec2::ZERO));
        assert!(goblin.blackboard().is_triggered(Trigger::TryAttack));

        assert!(goblin.receive_hit(Facing::Right, &AttackHitbox::new(500.0, Vec2::ZERO)).applied);
        assert!(!goblin.pool().is_alive());
        assert!(!goblin.try_begin_attack());
        assert!(!goblin.blackboard().is_triggered(Trigger::TryAttack));
    }

    #[test]
    fn test_goblin_attacks_target_in_range() {
        let mut goblin =
            GoblinCharacter::new(EntityId::from_raw(2), GoblinCharacterConfig::default(), 3);
        let senses = GoblinSenses {
            grounded: true,
            player_position: Some(Vec2::new(1.0, 0.0)),
            target_in_attack_zone: true,
            ..GoblinSenses::default()
        };
        goblin.step(DT, &senses);
        assert!(goblin.blackboard().get_bool(BoolParam::HasTarget));
        assert!(goblin.try_begin_attack());
        goblin.step(DT, &senses);
        assert!(goblin.brain().in_attack_cooldown());
        assert!(!goblin.try_begin_attack());
    }
}
