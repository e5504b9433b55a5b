//! Hit resolution.
//!
//! Knockback is authored for an attacker facing right and mirrored when the
//! attacker faces left. Applying the delivered knockback to the victim's
//! velocity is left to the victim's movement code.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::input::Vec2;
use crate::movement::Facing;
use crate::resources::ResourcePool;

/// Result of resolving one hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitOutcome {
    /// Whether damage was applied.
    pub applied: bool,
    /// Knockback the victim should receive (zero when not applied).
    pub delivered_knockback: Vec2,
}

impl HitOutcome {
    /// A hit that did nothing.
    pub const MISSED: Self = Self {
        applied: false,
        delivered_knockback: Vec2::ZERO,
    };
}

/// Knockback as delivered by an attacker with the given facing.
#[must_use]
pub fn facing_knockback(attacker_facing: Facing, knockback: Vec2) -> Vec2 {
    match attacker_facing {
        Facing::Right => knockback,
        Facing::Left => knockback.mirrored_x(),
    }
}

/// Applies `damage` to `victim` and works out the knockback to deliver.
pub fn resolve_hit(
    attacker_facing: Facing,
    damage: f32,
    knockback: Vec2,
    victim: &mut ResourcePool,
) -> HitOutcome {
    let delivered = facing_knockback(attacker_facing, knockback);
    if !victim.apply_hit(damage, delivered) {
        trace!(victim = %victim.entity_id(), "hit ignored");
        return HitOutcome::MISSED;
    }
    HitOutcome {
        applied: true,
        delivered_knockback: delivered,
    }
}

/// Damage and knockback carried by an attack's hitbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackHitbox {
    /// Damage per hit.
    pub damage: f32,
    /// Knockback for a right-facing attacker.
    pub knockback: Vec2,
}

impl Default for AttackHitbox {
    fn default() -> Self {
        Self {
            damage: 10.0,
            knockback: Vec2::ZERO,
        }
    }
}

impl AttackHitbox {
    /// Creates a hitbox.
    #[must_use]
    pub const fn new(damage: f32, knockback: Vec2) -> Self {
        Self { damage, knockback }
    }

    /// Strikes a victim overlapping this hitbox.
    pub fn strike(&self, attacker_facing: Facing, victim: &mut ResourcePool) -> HitOutcome {
        resolve_hit(attacker_facing, self.damage, self.knockback, victim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{HealthConfig, StaminaConfig};
    use duskblade_common::EntityId;

    fn victim() -> ResourcePool {
        ResourcePool::new(
            EntityId::from_raw(2),
            HealthConfig::default(),
            StaminaConfig::default(),
        )
    }

    #[test]
    fn test_knockback_mirrored_for_left_facing() {
        let mut v = victim();
        let outcome = resolve_hit(Facing::Left, 10.0, Vec2::new(5.0, 2.0), &mut v);
        assert!(outcome.applied);
        assert_eq!(outcome.delivered_knockback, Vec2::new(-5.0, 2.0));
        assert_eq!(v.health(), 90.0);
    }

    #[test]
    fn test_knockback_unchanged_for_right_facing() {
        let mut v = victim();
        let outcome = resolve_hit(Facing::Right, 10.0, Vec2::new(5.0, 2.0), &mut v);
        assert_eq!(outcome.delivered_knockback, Vec2::new(5.0, 2.0));
    }

    #[test]
    fn test_invincible_victim_gets_nothing() {
        let mut v = victim();
        let hitbox = AttackHitbox::new(10.0, Vec2::new(5.0, 2.0));
        assert!(hitbox.strike(Facing::Right, &mut v).applied);

        let outcome = hitbox.strike(Facing::Right, &mut v);
        assert_eq!(outcome, HitOutcome::MISSED);
        assert_eq!(v.health(), 90.0);
    }

    #[test]
    fn test_dead_victim_gets_nothing() {
        let mut v = victim();
        v.apply_damage(100.0);
        v.tick(1.0);
        let outcome = resolve_hit(Facing::Left, 10.0, Vec2::new(5.0, 2.0), &mut v);
        assert!(!outcome.applied);
        assert_eq!(outcome.delivered_knockback, Vec2::ZERO);
    }
}
