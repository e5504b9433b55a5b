//! Health and stamina bookkeeping.
//!
//! This module provides:
//! - Health with post-hit invincibility and terminal death
//! - Stamina spending with a regeneration delay after each spend
//! - A lockout that blocks all spending after depletion until the pool is full
//! - Smoothed stamina values for the UI bar

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use duskblade_common::EntityId;

use crate::events::{emit, GameEvent};
use crate::hit_stop::SharedHitStop;
use crate::input::Vec2;

// ============================================================================
// Configuration
// ============================================================================

/// Health tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Maximum (and starting) health.
    pub max_health: f32,
    /// Seconds of invincibility after taking a hit.
    pub invincibility_time: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            invincibility_time: 0.25,
        }
    }
}

/// Stamina tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaConfig {
    /// Maximum (and starting) stamina.
    pub max_stamina: f32,
    /// Regeneration per second above the critical threshold.
    pub normal_regen_rate: f32,
    /// Regeneration per second at or below the critical threshold.
    pub depleted_regen_rate: f32,
    /// Stamina at or below this value counts as depleted.
    pub critical_threshold: f32,
    /// After a spend leaves the pool depleted, block spending until full.
    pub require_full_regen_after_depletion: bool,
    /// Seconds after a spend before regeneration resumes.
    pub regen_delay_after_use: f32,
    /// Lerp speed of the displayed stamina value.
    pub display_speed: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            max_stamina: 100.0,
            normal_regen_rate: 15.0,
            depleted_regen_rate: 5.0,
            critical_threshold: 1.0,
            require_full_regen_after_depletion: true,
            regen_delay_after_use: 1.0,
            display_speed: 2.0,
        }
    }
}

// ============================================================================
// Stamina display
// ============================================================================

/// Displayed values closer than this snap to the real value.
const DISPLAY_SNAP: f32 = 0.1;

/// Smoothed stamina value for the UI bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaminaDisplay {
    displayed: f32,
    speed: f32,
    moving: bool,
}

impl StaminaDisplay {
    /// Creates a display resting at `value`.
    #[must_use]
    pub fn new(value: f32, speed: f32) -> Self {
        Self {
            displayed: value,
            speed,
            moving: false,
        }
    }

    /// Current displayed value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.displayed
    }

    /// Whether the display is still catching up.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Restarts smoothing toward a new target.
    pub fn mark_changed(&mut self) {
        self.moving = true;
    }

    /// Jumps straight to `value`.
    pub fn snap(&mut self, value: f32) {
        self.displayed = value;
        self.moving = true;
    }

    /// Moves the displayed value toward `target`. Returns the new value if it
    /// changed this tick.
    pub fn advance(&mut self, target: f32, dt: f32) -> Option<f32> {
        if !self.moving {
            return None;
        }
        if (self.displayed - target).abs() > DISPLAY_SNAP {
            let t = (self.speed * dt).clamp(0.0, 1.0);
            self.displayed += (target - self.displayed) * t;
        } else {
            self.displayed = target;
            self.moving = false;
        }
        Some(self.displayed)
    }
}

// ============================================================================
// Resource pool
// ============================================================================

/// Health and stamina of one character.
#[derive(Debug)]
pub struct ResourcePool {
    entity_id: EntityId,
    health_config: HealthConfig,
    stamina_config: StaminaConfig,

    health: f32,
    is_alive: bool,
    is_invincible: bool,
    invincibility_remaining: f32,

    stamina: f32,
    regeneration_enabled: bool,
    regen_blocked: bool,
    regen_blocked_remaining: f32,
    regen_forced_off: bool,
    waiting_for_full_regen: bool,
    display: StaminaDisplay,

    events: Option<Sender<GameEvent>>,
    hit_stop: Option<SharedHitStop>,
    warned_missing_hit_stop: bool,
}

impl ResourcePool {
    /// Creates a pool at full health and stamina.
    #[must_use]
    pub fn new(entity_id: EntityId, health: HealthConfig, stamina: StaminaConfig) -> Self {
        let max_health = health.max_health.max(f32::EPSILON);
        let max_stamina = stamina.max_stamina.max(f32::EPSILON);
        Self {
            entity_id,
            health_config: HealthConfig {
                max_health,
                ..health
            },
            display: StaminaDisplay::new(max_stamina, stamina.display_speed),
            stamina_config: StaminaConfig {
                max_stamina,
                ..stamina
            },
            health: max_health,
            is_alive: true,
            is_invincible: false,
            invincibility_remaining: 0.0,
            stamina: max_stamina,
            regeneration_enabled: true,
            regen_blocked: false,
            regen_blocked_remaining: 0.0,
            regen_forced_off: false,
            waiting_for_full_regen: false,
            events: None,
            hit_stop: None,
            warned_missing_hit_stop: false,
        }
    }

    /// Publishes health/stamina notifications on the given channel.
    #[must_use]
    pub fn with_events(mut self, sender: Sender<GameEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Triggers the shared hit-stop on every successful hit.
    #[must_use]
    pub fn with_hit_stop(mut self, hit_stop: SharedHitStop) -> Self {
        self.hit_stop = Some(hit_stop);
        self
    }

    // ------------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------------

    /// Applies damage with no knockback. See [`Self::apply_hit`].
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        self.apply_hit(amount, Vec2::ZERO)
    }

    /// Applies a hit. Fails with no mutation if the character is dead,
    /// invincible, or `amount` is not a positive number.
    pub fn apply_hit(&mut self, amount: f32, knockback: Vec2) -> bool {
        if !self.is_alive || self.is_invincible {
            return false;
        }
        if !(amount.is_finite() && amount > 0.0) {
            debug!(entity = %self.entity_id, amount, "ignoring non-positive damage");
            return false;
        }

        self.trigger_hit_stop();

        self.health = (self.health - amount).clamp(0.0, self.health_config.max_health);
        self.is_invincible = true;
        self.invincibility_remaining = self.health_config.invincibility_time;

        self.emit_health();
        emit(
            self.events.as_ref(),
            GameEvent::CharacterDamaged {
                entity_id: self.entity_id,
                damage: amount,
                knockback,
            },
        );

        if self.health <= 0.0 {
            self.health = 0.0;
            self.is_alive = false;
            info!(entity = %self.entity_id, "character died");
            emit(
                self.events.as_ref(),
                GameEvent::CharacterDied {
                    entity_id: self.entity_id,
                },
            );
        }
        true
    }

    /// Restores health, clamped to max. Fails if dead.
    pub fn heal(&mut self, amount: f32) -> bool {
        if !self.is_alive {
            return false;
        }
        if !(amount.is_finite() && amount > 0.0) {
            return false;
        }
        self.health = (self.health + amount).min(self.health_config.max_health);
        self.emit_health();
        emit(
            self.events.as_ref(),
            GameEvent::CharacterHealed {
                entity_id: self.entity_id,
                amount,
            },
        );
        true
    }

    fn trigger_hit_stop(&mut self) {
        match &self.hit_stop {
            Some(hit_stop) => {
                hit_stop.lock().trigger();
            },
            None => {
                if !self.warned_missing_hit_stop {
                    warn!(entity = %self.entity_id, "no hit-stop coordinator, hit-stop disabled");
                    self.warned_missing_hit_stop = true;
                }
            },
        }
    }

    fn emit_health(&self) {
        emit(
            self.events.as_ref(),
            GameEvent::HealthChanged {
                entity_id: self.entity_id,
                health: self.health,
                max_health: self.health_config.max_health,
            },
        );
    }

    // ------------------------------------------------------------------------
    // Stamina
    // ------------------------------------------------------------------------

    /// Spends stamina. Fails with no mutation while locked out after depletion,
    /// when `amount` is not a positive finite number, or when the pool holds
    /// less than `amount`.
    pub fn try_use_stamina(&mut self, amount: f32) -> bool {
        if self.waiting_for_full_regen {
            debug!(entity = %self.entity_id, "stamina locked until fully regenerated");
            return false;
        }
        if !(amount.is_finite() && amount > 0.0) || self.stamina < amount {
            return false;
        }

        self.stamina = (self.stamina - amount).max(0.0);
        self.display.mark_changed();

        self.regen_blocked = true;
        self.regen_blocked_remaining = self.stamina_config.regen_delay_after_use.max(0.0);

        if self.stamina <= self.stamina_config.critical_threshold
            && self.stamina_config.require_full_regen_after_depletion
            && self.stamina < self.stamina_config.max_stamina
        {
            self.waiting_for_full_regen = true;
            debug!(entity = %self.entity_id, "stamina depleted, waiting for full regeneration");
        }
        true
    }

    /// Whether a spend of `amount` would currently succeed.
    #[must_use]
    pub fn can_afford(&self, amount: f32) -> bool {
        !self.waiting_for_full_regen && amount.is_finite() && amount > 0.0 && self.stamina >= amount
    }

    /// Enables or disables regeneration. Enabling also clears any pending delay.
    pub fn set_stamina_regeneration(&mut self, enabled: bool) {
        self.regeneration_enabled = enabled;
        if enabled {
            self.regen_blocked = false;
            self.regen_blocked_remaining = 0.0;
        }
    }

    /// Starts regenerating immediately, skipping any delay.
    pub fn force_start_regeneration(&mut self) {
        self.regen_blocked = false;
        self.regen_blocked_remaining = 0.0;
        self.regen_forced_off = false;
        self.regeneration_enabled = true;
    }

    /// Blocks regeneration until [`force_start_regeneration`] or
    /// [`full_restore_stamina`]. State changes do not lift it.
    ///
    /// [`force_start_regeneration`]: Self::force_start_regeneration
    /// [`full_restore_stamina`]: Self::full_restore_stamina
    pub fn force_stop_regeneration(&mut self) {
        self.regen_forced_off = true;
    }

    /// Refills stamina and clears every stamina flag.
    pub fn full_restore_stamina(&mut self) {
        self.stamina = self.stamina_config.max_stamina;
        self.display.snap(self.stamina);
        self.waiting_for_full_regen = false;
        self.regen_blocked = false;
        self.regen_blocked_remaining = 0.0;
        self.regen_forced_off = false;
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advances timers and regeneration by `dt` seconds of simulation time.
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);

        if self.is_invincible {
            self.invincibility_remaining = (self.invincibility_remaining - dt).max(0.0);
            if self.invincibility_remaining <= 0.0 {
                self.is_invincible = false;
            }
        }

        self.regenerate(dt);

        if let Some(displayed) = self.display.advance(self.stamina, dt) {
            emit(
                self.events.as_ref(),
                GameEvent::StaminaChanged {
                    entity_id: self.entity_id,
                    displayed,
                    max_stamina: self.stamina_config.max_stamina,
                },
            );
        }
    }

    fn regenerate(&mut self, dt: f32) {
        if !self.regeneration_enabled || self.regen_forced_off {
            return;
        }

        if self.regen_blocked {
            self.regen_blocked_remaining = (self.regen_blocked_remaining - dt).max(0.0);
            if self.regen_blocked_remaining <= 0.0 {
                self.regen_blocked = false;
                debug!(entity = %self.entity_id, "stamina regeneration resumed");
            }
            // The tick that ends the delay does not regenerate.
            return;
        }

        let max = self.stamina_config.max_stamina;
        if self.stamina >= max {
            return;
        }

        let rate = if self.is_depleted() {
            self.stamina_config.depleted_regen_rate
        } else {
            self.stamina_config.normal_regen_rate
        };
        self.stamina = (self.stamina + rate * dt).clamp(0.0, max);
        self.display.mark_changed();

        if self.stamina >= max {
            self.stamina = max;
            if self.waiting_for_full_regen {
                self.waiting_for_full_regen = false;
                debug!(entity = %self.entity_id, "stamina fully regenerated, abilities available");
            }
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Owning entity.
    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub fn max_health(&self) -> f32 {
        self.health_config.max_health
    }

    /// Health as a fraction of max.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        self.health / self.health_config.max_health
    }

    /// Whether the character is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    /// Whether hits are currently ignored.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        self.is_invincible
    }

    /// Seconds of invincibility left.
    #[must_use]
    pub fn invincibility_remaining(&self) -> f32 {
        self.invincibility_remaining
    }

    /// Current stamina.
    #[must_use]
    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    /// Maximum stamina.
    #[must_use]
    pub fn max_stamina(&self) -> f32 {
        self.stamina_config.max_stamina
    }

    /// Stamina as a fraction of max.
    #[must_use]
    pub fn stamina_fraction(&self) -> f32 {
        self.stamina / self.stamina_config.max_stamina
    }

    /// Smoothed stamina for the UI.
    #[must_use]
    pub fn displayed_stamina(&self) -> f32 {
        self.display.value()
    }

    /// Whether stamina is at or below the critical threshold.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.stamina <= self.stamina_config.critical_threshold
    }

    /// Whether spending is locked until the pool is full.
    #[must_use]
    pub fn is_waiting_for_full_regen(&self) -> bool {
        self.waiting_for_full_regen
    }

    /// Whether stamina would regenerate on the next tick.
    #[must_use]
    pub fn is_regenerating(&self) -> bool {
        self.regeneration_enabled && !self.regen_blocked && !self.regen_forced_off
    }

    /// Seconds until regeneration resumes after the last spend.
    #[must_use]
    pub fn regen_blocked_remaining(&self) -> f32 {
        if self.regen_blocked {
            self.regen_blocked_remaining
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::hit_stop::{HitStop, HitStopConfig};
    use proptest::prelude::*;

    fn pool() -> ResourcePool {
        ResourcePool::new(
            EntityId::from_raw(1),
            HealthConfig::default(),
            StaminaConfig::default(),
        )
    }

    #[test]
    fn test_starts_full() {
        let pool = pool();
        assert_eq!(pool.health(), 100.0);
        assert_eq!(pool.stamina(), 100.0);
        assert!(pool.is_alive());
        assert!(!pool.is_invincible());
    }

    #[test]
    fn test_damage_reduces_health() {
        let mut pool = pool();
        assert!(pool.apply_damage(30.0));
        assert_eq!(pool.health(), 70.0);
        assert!(pool.is_invincible());
    }

    #[test]
    fn test_invincible_blocks_damage() {
        let mut pool = pool();
        assert!(pool.apply_damage(10.0));
        assert!(!pool.apply_damage(10.0));
        assert_eq!(pool.health(), 90.0);

        pool.tick(0.3);
        assert!(!pool.is_invincible());
        assert!(pool.apply_damage(10.0));
        assert_eq!(pool.health(), 80.0);
    }

    #[test]
    fn test_death_is_terminal() {
        let mut pool = pool();
        assert!(pool.apply_damage(250.0));
        assert_eq!(pool.health(), 0.0);
        assert!(!pool.is_alive());

        pool.tick(1.0);
        assert!(!pool.apply_damage(10.0));
        assert!(!pool.heal(50.0));
        assert_eq!(pool.health(), 0.0);
        assert!(!pool.is_alive());
    }

    #[test]
    fn test_non_positive_damage_rejected() {
        let mut pool = pool();
        assert!(!pool.apply_damage(0.0));
        assert!(!pool.apply_damage(-5.0));
        assert!(!pool.apply_damage(f32::NAN));
        assert!(!pool.is_invincible());
        assert_eq!(pool.health(), 100.0);
    }

    #[test]
    fn test_heal_clamps() {
        let mut pool = pool();
        pool.apply_damage(20.0);
        assert!(pool.heal(30.0));
        assert_eq!(pool.health(), 100.0);
    }

    #[test]
    fn test_damage_events() {
        let bus = EventBus::new(16);
        let id = EntityId::from_raw(9);
        let mut pool = ResourcePool::new(id, HealthConfig::default(), StaminaConfig::default())
            .with_events(bus.sender());
        pool.apply_hit(100.0, Vec2::new(5.0, 2.0));

        let events = bus.drain();
        assert!(events.contains(&GameEvent::HealthChanged {
            entity_id: id,
            health: 0.0,
            max_health: 100.0,
        }));
        assert!(events.contains(&GameEvent::CharacterDamaged {
            entity_id: id,
            damage: 100.0,
            knockback: Vec2::new(5.0, 2.0),
        }));
        assert!(events.contains(&GameEvent::CharacterDied { entity_id: id }));
    }

    #[test]
    fn test_hit_triggers_shared_hit_stop() {
        let hit_stop = HitStop::shared(HitStopConfig::default());
        let mut a = pool().with_hit_stop(hit_stop.clone());
        let mut b = pool().with_hit_stop(hit_stop.clone());

        assert!(a.apply_damage(5.0));
        assert!(hit_stop.lock().is_active());
        let remaining = hit_stop.lock().remaining();

        // Second hit while paused does not restart the pause
        hit_stop.lock().advance_real(0.04);
        assert!(b.apply_damage(5.0));
        assert!(hit_stop.lock().remaining() < remaining);
    }

    #[test]
    fn test_failed_hit_does_not_trigger_hit_stop() {
        let hit_stop = HitStop::shared(HitStopConfig::default());
        let mut pool = pool().with_hit_stop(hit_stop.clone());
        pool.apply_damage(5.0);
        hit_stop.lock().advance_real(1.0);

        assert!(!pool.apply_damage(5.0));
        assert!(!hit_stop.lock().is_active());
    }

    #[test]
    fn test_stamina_spend() {
        let mut pool = pool();
        assert!(pool.try_use_stamina(20.0));
        assert_eq!(pool.stamina(), 80.0);
        assert!(!pool.is_regenerating());
        assert_eq!(pool.regen_blocked_remaining(), 1.0);
    }

    #[test]
    fn test_insufficient_stamina() {
        let mut pool = pool();
        assert!(pool.try_use_stamina(90.0));
        assert!(!pool.try_use_stamina(20.0));
        assert_eq!(pool.stamina(), 10.0);
    }

    #[test]
    fn test_regen_delay() {
        let mut pool = pool();
        pool.try_use_stamina(20.0);

        pool.tick(0.5);
        assert_eq!(pool.stamina(), 80.0);
        // Delay expires on this tick; regeneration starts next tick
        pool.tick(0.5);
        assert_eq!(pool.stamina(), 80.0);
        pool.tick(0.1);
        assert!((pool.stamina() - 81.5).abs() < 1e-4);
    }

    #[test]
    fn test_regen_clamps_at_max() {
        let mut pool = pool();
        pool.try_use_stamina(1.0);
        pool.tick(1.0);
        pool.tick(10.0);
        assert_eq!(pool.stamina(), 100.0);
    }

    #[test]
    fn test_depletion_lockout() {
        let mut pool = pool();
        for _ in 0..5 {
            assert!(pool.try_use_stamina(20.0));
        }
        assert_eq!(pool.stamina(), 0.0);
        assert!(pool.is_waiting_for_full_regen());

        pool.tick(1.0);
        pool.tick(3.0); // 0 -> 15 at the depleted rate... then normal
        assert!(pool.stamina() > 1.0);
        assert!(pool.stamina() < 100.0);
        assert!(!pool.try_use_stamina(1.0));

        for _ in 0..20 {
            pool.tick(1.0);
        }
        assert_eq!(pool.stamina(), 100.0);
        assert!(!pool.is_waiting_for_full_regen());
        assert!(pool.try_use_stamina(1.0));
    }

    #[test]
    fn test_lockout_disabled_by_config() {
        let config = StaminaConfig {
            require_full_regen_after_depletion: false,
            ..StaminaConfig::default()
        };
        let mut pool = ResourcePool::new(EntityId::from_raw(1), HealthConfig::default(), config);
        assert!(pool.try_use_stamina(100.0));
        assert!(!pool.is_waiting_for_full_regen());
        pool.tick(1.0);
        pool.tick(1.0);
        assert!(pool.try_use_stamina(1.0));
    }

    #[test]
    fn test_regen_rate_straddles_threshold() {
        let mut pool = pool();
        assert!(pool.try_use_stamina(99.5));
        assert!(pool.is_depleted());
        pool.tick(1.0); // delay expires

        pool.tick(0.1); // depleted rate: 0.5 -> 1.0
        assert!((pool.stamina() - 1.0).abs() < 1e-4);
        pool.tick(0.1); // still at threshold: 1.0 -> 1.5
        assert!((pool.stamina() - 1.5).abs() < 1e-4);
        pool.tick(0.1); // above threshold, normal rate: 1.5 -> 3.0
        assert!((pool.stamina() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_regeneration_disabled() {
        let mut pool = pool();
        pool.try_use_stamina(50.0);
        pool.set_stamina_regeneration(false);
        pool.tick(5.0);
        assert_eq!(pool.stamina(), 50.0);

        // Enabling clears the delay, so regeneration is immediate
        pool.set_stamina_regeneration(true);
        pool.tick(1.0);
        assert_eq!(pool.stamina(), 65.0);
    }

    #[test]
    fn test_force_stop_and_start() {
        let mut pool = pool();
        pool.try_use_stamina(50.0);
        pool.force_stop_regeneration();
        for _ in 0..10 {
            pool.tick(1.0);
        }
        assert_eq!(pool.stamina(), 50.0);

        pool.force_start_regeneration();
        pool.tick(1.0);
        assert_eq!(pool.stamina(), 65.0);
    }

    #[test]
    fn test_force_stop_survives_regeneration_toggles() {
        let mut pool = pool();
        pool.try_use_stamina(50.0);
        pool.force_stop_regeneration();
        for _ in 0..10 {
            pool.set_stamina_regeneration(true);
            pool.tick(1.0);
        }
        assert_eq!(pool.stamina(), 50.0);
        assert!(!pool.is_regenerating());

        pool.full_restore_stamina();
        pool.try_use_stamina(50.0);
        pool.set_stamina_regeneration(true);
        pool.tick(1.0);
        assert_eq!(pool.stamina(), 65.0);
    }

    #[test]
    fn test_zero_spend_rejected() {
        let mut pool = pool();
        assert!(!pool.try_use_stamina(0.0));
        assert!(!pool.try_use_stamina(-5.0));
        assert!(!pool.try_use_stamina(f32::NAN));
        assert_eq!(pool.stamina(), 100.0);
        assert_eq!(pool.regen_blocked_remaining(), 0.0);
        assert!(pool.is_regenerating());
    }

    #[test]
    fn test_full_restore() {
        let mut pool = pool();
        pool.try_use_stamina(100.0);
        assert!(pool.is_waiting_for_full_regen());
        pool.full_restore_stamina();
        assert_eq!(pool.stamina(), 100.0);
        assert!(!pool.is_waiting_for_full_regen());
        assert!(pool.is_regenerating());
        assert_eq!(pool.displayed_stamina(), 100.0);
    }

    #[test]
    fn test_display_smoothing() {
        let bus = EventBus::new(256);
        let mut pool = pool().with_events(bus.sender());
        pool.try_use_stamina(50.0);
        pool.set_stamina_regeneration(false);

        pool.tick(0.1);
        let shown = pool.displayed_stamina();
        assert!(shown < 100.0 && shown > 50.0);

        for _ in 0..200 {
            pool.tick(0.1);
        }
        assert_eq!(pool.displayed_stamina(), 50.0);
        assert!(bus
            .drain()
            .iter()
            .any(|e| matches!(e, GameEvent::StaminaChanged { displayed, .. } if *displayed == 50.0)));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Spend(f32),
        Tick(f32),
        Regen(bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0.0f32..60.0).prop_map(Op::Spend),
            (0.0f32..2.0).prop_map(Op::Tick),
            any::<bool>().prop_map(Op::Regen),
        ]
    }

    proptest! {
        #[test]
        fn prop_damage_result(h_loss in 0.0f32..99.0, d in 0.01f32..300.0) {
            let mut pool = pool();
            if h_loss > 0.0 {
                pool.apply_damage(h_loss);
                pool.tick(1.0);
            }
            let h = pool.health();
            prop_assert!(pool.apply_damage(d));
            let expected = (h - d).max(0.0);
            prop_assert!((pool.health() - expected).abs() < 1e-3);
            prop_assert_eq!(pool.is_alive(), pool.health() > 0.0);
        }

        #[test]
        fn prop_stamina_bounds(ops in prop::collection::vec(op(), 1..80)) {
            let mut pool = pool();
            for op in ops {
                let waiting = pool.is_waiting_for_full_regen();
                match op {
                    Op::Spend(amount) => {
                        let ok = pool.try_use_stamina(amount);
                        if waiting {
                            prop_assert!(!ok);
                        }
                    },
                    Op::Tick(dt) => pool.tick(dt),
                    Op::Regen(enabled) => pool.set_stamina_regeneration(enabled),
                }
                prop_assert!(pool.stamina() >= 0.0);
                prop_assert!(pool.stamina() <= pool.max_stamina());
                if pool.is_waiting_for_full_regen() {
                    prop_assert!(pool.stamina() < pool.max_stamina());
                }
            }
        }
    }
}
