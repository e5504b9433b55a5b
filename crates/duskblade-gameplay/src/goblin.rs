//! Goblin enemy brain.
//!
//! The goblin patrols back and forth, chases the player when close, holds
//! position while its attack is cooling down, and sometimes retaliates when
//! hit. Retaliation grows more likely with every hit taken.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::blackboard::{AnimationBlackboard, BoolParam, FloatParam, Trigger};
use crate::input::Vec2;
use crate::movement::Facing;

// ============================================================================
// Configuration
// ============================================================================

/// Goblin tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoblinConfig {
    /// Horizontal acceleration (units/s²)
    pub walk_acceleration: f32,
    /// Horizontal speed cap
    pub max_speed: f32,
    /// Lerp factor per tick when stopping
    pub walk_stop_rate: f32,
    /// Multiplier on the stop rate while holding for an attack cooldown
    pub cooldown_stop_mult: f32,
    /// Starts chasing within this distance of the player
    pub chase_distance: f32,
    /// Length of each patrol phase (seconds)
    pub patrol_duration: f32,
    /// Holds position within this distance while the attack cools down
    pub attack_idle_distance: f32,
    /// Minimum time between direction flips (seconds)
    pub flip_cooldown: f32,
    /// Retaliation chance before any hit
    pub base_attack_chance: f32,
    /// Retaliation chance added per hit taken
    pub attack_chance_per_hit: f32,
}

impl Default for GoblinConfig {
    fn default() -> Self {
        Self {
            walk_acceleration: 30.0,
            max_speed: 3.0,
            walk_stop_rate: 0.05,
            cooldown_stop_mult: 3.0,
            chase_distance: 5.0,
            patrol_duration: 4.0,
            attack_idle_distance: 2.0,
            flip_cooldown: 0.2,
            base_attack_chance: 0.1,
            attack_chance_per_hit: 0.1,
        }
    }
}

// ============================================================================
// Patrol
// ============================================================================

/// Phase of a patrol cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatrolPhase {
    /// Walking in the current direction
    Moving,
    /// Standing still before turning around
    Idle,
}

/// Move, idle, turn around, repeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatrolTask {
    /// Current phase
    pub phase: PatrolPhase,
    /// Time left in the phase
    pub remaining: f32,
    duration: f32,
}

impl PatrolTask {
    /// Starts a patrol in the moving phase.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        Self {
            phase: PatrolPhase::Moving,
            remaining: duration,
            duration,
        }
    }

    /// Advances the patrol. Returns true when the cycle completes and the
    /// walker should turn around.
    pub fn step(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        if self.remaining > 0.0 {
            return false;
        }
        self.remaining = self.duration;
        match self.phase {
            PatrolPhase::Moving => {
                self.phase = PatrolPhase::Idle;
                false
            },
            PatrolPhase::Idle => {
                self.phase = PatrolPhase::Moving;
                true
            },
        }
    }
}

// ============================================================================
// Brain
// ============================================================================

/// What the goblin perceives this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GoblinSenses {
    /// Goblin position
    pub position: Vec2,
    /// Player position, if there is a player
    pub player_position: Option<Vec2>,
    /// Standing on ground
    pub grounded: bool,
    /// Walking into a wall
    pub on_wall: bool,
    /// Ground ends ahead
    pub cliff_ahead: bool,
    /// Something is inside the attack zone
    pub target_in_attack_zone: bool,
}

/// What the goblin decided to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoblinMode {
    /// Walking a patrol
    Patrol,
    /// Closing in on the player
    Chase,
    /// Waiting out an attack cooldown next to the player
    Hold,
}

/// Decision-making for one goblin.
#[derive(Debug, Clone)]
pub struct GoblinBrain {
    config: GoblinConfig,
    move_direction: f32,
    patrol: Option<PatrolTask>,
    mode: GoblinMode,
    clock: f32,
    last_flip: Option<f32>,
    hit_count: u32,
    in_attack_cooldown: bool,
    cliff_was_ahead: bool,
    rng: fastrand::Rng,
    warned_no_player: bool,
}

impl GoblinBrain {
    /// Creates a brain facing right. `seed` drives the retaliation rolls.
    #[must_use]
    pub fn new(config: GoblinConfig, seed: u64) -> Self {
        let patrol = Some(PatrolTask::new(config.patrol_duration));
        Self {
            config,
            move_direction: 1.0,
            patrol,
            mode: GoblinMode::Patrol,
            clock: 0.0,
            last_flip: None,
            hit_count: 0,
            in_attack_cooldown: false,
            cliff_was_ahead: false,
            rng: fastrand::Rng::with_seed(seed),
            warned_no_player: false,
        }
    }

    /// Advances the brain one fixed tick and returns the new velocity.
    pub fn tick<B: AnimationBlackboard + ?Sized>(
        &mut self,
        dt: f32,
        senses: &GoblinSenses,
        velocity: Vec2,
        bb: &mut B,
    ) -> Vec2 {
        self.clock += dt;
        self.update_cooldown(dt, senses, bb);

        if senses.player_position.is_none() && !self.warned_no_player {
            warn!("goblin has no player reference, chasing disabled");
            self.warned_no_player = true;
        }
        let distance = senses
            .player_position
            .map_or(f32::MAX, |p| p.distance(senses.position));

        let can_move = bb.get_bool(BoolParam::CanMove);
        if senses.grounded && senses.on_wall && can_move {
            self.flip();
        }
        // Ledges turn the goblin when they come into view, not while in view
        if senses.cliff_ahead && !self.cliff_was_ahead {
            self.on_cliff_detected(senses.grounded);
        }
        self.cliff_was_ahead = senses.cliff_ahead;

        let locked = bb.get_bool(BoolParam::LockVelocity);
        let mut velocity = velocity;
        if self.in_attack_cooldown && distance <= self.config.attack_idle_distance {
            self.mode = GoblinMode::Hold;
            self.patrol = None;
            self.face_towards(senses);
            if !locked {
                let rate = self.config.walk_stop_rate * self.config.cooldown_stop_mult;
                velocity.x = lerp(velocity.x, 0.0, rate);
            }
        } else if distance <= self.config.chase_distance {
            self.mode = GoblinMode::Chase;
            self.patrol = None;
            self.face_towards(senses);
            velocity = self.accelerate(dt, velocity, can_move, locked);
        } else {
            self.mode = GoblinMode::Patrol;
            let duration = self.config.patrol_duration;
            let patrol = self.patrol.get_or_insert_with(|| PatrolTask::new(duration));
            let turn = patrol.step(dt);
            let walking = patrol.phase == PatrolPhase::Moving;
            if turn {
                self.flip();
            }
            velocity = self.accelerate(dt, velocity, can_move && walking, locked);
        }

        bb.set_bool(BoolParam::IsMoving, velocity.x.abs() > 0.01);
        velocity
    }

    fn update_cooldown<B: AnimationBlackboard + ?Sized>(
        &mut self,
        dt: f32,
        senses: &GoblinSenses,
        bb: &mut B,
    ) {
        let cooldown = bb.get_float(FloatParam::AttackCooldown);
        if cooldown > 0.0 {
            bb.set_float(FloatParam::AttackCooldown, (cooldown - dt).max(0.0));
            bb.set_bool(BoolParam::HasTarget, false);
            self.in_attack_cooldown = true;
        } else {
            bb.set_bool(BoolParam::HasTarget, senses.target_in_attack_zone);
            self.in_attack_cooldown = false;
        }
    }

    fn accelerate(&self, dt: f32, velocity: Vec2, can_move: bool, locked: bool) -> Vec2 {
        if locked {
            return velocity;
        }
        let vx = if can_move {
            (velocity.x + self.config.walk_acceleration * self.move_direction * dt)
                .clamp(-self.config.max_speed, self.config.max_speed)
        } else {
            lerp(velocity.x, 0.0, self.config.walk_stop_rate)
        };
        velocity.with_x(vx)
    }

    fn face_towards(&mut self, senses: &GoblinSenses) {
        if let Some(player) = senses.player_position {
            self.move_direction = if player.x - senses.position.x > 0.0 {
                1.0
            } else {
                -1.0
            };
        }
    }

    /// Turns around unless a flip happened within the cooldown.
    pub fn flip(&mut self) -> bool {
        if let Some(last) = self.last_flip {
            if self.clock - last < self.config.flip_cooldown {
                return false;
            }
        }
        self.last_flip = Some(self.clock);
        self.move_direction = -self.move_direction;
        true
    }

    /// Turns around at a ledge while grounded.
    pub fn on_cliff_detected(&mut self, grounded: bool) -> bool {
        grounded && self.flip()
    }

    /// Registers a hit and rolls for retaliation. Returns true if the goblin
    /// fired its `TryAttack` trigger.
    pub fn on_hit<B: AnimationBlackboard + ?Sized>(&mut self, bb: &mut B) -> bool {
        self.hit_count += 1;
        let chance = self.attack_chance();
        if self.rng.f32() <= chance {
            debug!(chance, hits = self.hit_count, "goblin retaliating");
            bb.set_trigger(Trigger::TryAttack);
            return true;
        }
        false
    }

    /// Current retaliation chance.
    #[must_use]
    pub fn attack_chance(&self) -> f32 {
        self.config.base_attack_chance + self.hit_count as f32 * self.config.attack_chance_per_hit
    }

    /// Hits taken so far.
    #[must_use]
    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }

    /// Direction of travel.
    #[must_use]
    pub fn facing(&self) -> Facing {
        if self.move_direction > 0.0 {
            Facing::Right
        } else {
            Facing::Left
        }
    }

    /// What the goblin did on the last tick.
    #[must_use]
    pub fn mode(&self) -> GoblinMode {
        self.mode
    }

    /// Active patrol, if patrolling.
    #[must_use]
    pub fn patrol(&self) -> Option<&PatrolTask> {
        self.patrol.as_ref()
    }

    /// Whether the attack is cooling down.
    #[must_use]
    pub fn in_attack_cooldown(&self) -> bool {
        self.in_attack_cooldown
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &GoblinConfig {
        &self.config
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
