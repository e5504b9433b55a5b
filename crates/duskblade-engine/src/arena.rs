//! Headless arena.
//!
//! One player against one goblin on a flat floor between two walls. The
//! player is driven by the scripted inputs from the config; the goblin runs
//! its own brain. Real frames are fed through hit-stop and the fixed-step
//! accumulator, and every event published during a tick is tallied.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, trace};

use duskblade_common::{EntityAllocator, EntityId};
use duskblade_gameplay::{
    AnimationBlackboard, BoolParam, ContactProbe, EventBus, Facing, GoblinCharacter,
    GoblinSenses, HitStop, InputAction, PlayerCharacter, ResourcePool, SharedHitStop,
    StaminaConfig, Vec2,
};

use crate::animator::{HitRecovery, PlayerAnimator};
use crate::config::{GameplayConfig, ScriptedInput, SimulationConfig};
use crate::timing::FixedStep;

/// Bodies closer than this are pushed apart.
const MIN_SEPARATION: f32 = 0.8;
/// Bodies further apart vertically than this pass over each other.
const BODY_HEIGHT: f32 = 1.0;
const GROUND_EPSILON: f32 = 1e-3;

// ============================================================================
// Physics
// ============================================================================

/// A point body on the arena floor.
#[derive(Debug, Clone, Copy, Default)]
struct Body {
    position: Vec2,
    velocity: Vec2,
}

impl Body {
    fn at(x: f32) -> Self {
        Self {
            position: Vec2::new(x, 0.0),
            velocity: Vec2::ZERO,
        }
    }

    fn is_grounded(&self) -> bool {
        self.position.y <= GROUND_EPSILON && self.velocity.y <= 0.0
    }

    /// Applies gravity and moves, resolving against the floor and walls.
    fn integrate(&mut self, dt: f32, gravity: f32, half_width: f32) {
        self.velocity.y -= gravity * dt;
        self.position += self.velocity * dt;

        if self.position.y <= 0.0 {
            self.position.y = 0.0;
            self.velocity.y = self.velocity.y.max(0.0);
        }
        if self.position.x.abs() >= half_width {
            self.position.x = self.position.x.clamp(-half_width, half_width);
            self.velocity.x = 0.0;
        }
    }
}

/// Contact probe backed by the arena geometry.
#[derive(Debug, Clone, Copy)]
struct ArenaProbe {
    grounded: bool,
    wall_left: bool,
    wall_right: bool,
    enemy: bool,
}

impl ArenaProbe {
    fn sample(body: &Body, other: &Body, half_width: f32) -> Self {
        let edge = half_width - GROUND_EPSILON;
        Self {
            grounded: body.is_grounded(),
            wall_left: body.position.x <= -edge,
            wall_right: body.position.x >= edge,
            enemy: overlapping(body, other, MIN_SEPARATION + 0.05),
        }
    }
}

impl ContactProbe for ArenaProbe {
    fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn is_on_wall(&self, facing: Facing) -> bool {
        match facing {
            Facing::Left => self.wall_left,
            Facing::Right => self.wall_right,
        }
    }

    fn is_on_ceiling(&self) -> bool {
        false
    }

    fn is_touching_enemy(&self) -> bool {
        self.enemy
    }
}

fn overlapping(a: &Body, b: &Body, distance: f32) -> bool {
    (a.position.x - b.position.x).abs() < distance
        && (a.position.y - b.position.y).abs() < BODY_HEIGHT
}

/// Pushes two overlapping bodies apart along x, half each.
fn separate(a: &mut Body, b: &mut Body) {
    if !overlapping(a, b, MIN_SEPARATION) {
        return;
    }
    let dx = b.position.x - a.position.x;
    let side = if dx < 0.0 { -1.0 } else { 1.0 };
    let push = (MIN_SEPARATION - dx.abs()) * 0.5;
    a.position.x -= side * push;
    b.position.x += side * push;
}

/// Whether `target` is within `reach` in front of a body facing `facing`.
fn in_reach(from: &Body, facing: Facing, target: &Body, reach: f32) -> bool {
    let dx = target.position.x - from.position.x;
    dx * facing.sign() >= 0.0
        && dx.abs() <= reach
        && (target.position.y - from.position.y).abs() < BODY_HEIGHT
}

// ============================================================================
// Summary
// ============================================================================

/// End-of-run state of one character.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterSummary {
    /// Entity id
    pub entity: EntityId,
    /// Health left
    pub health: f32,
    /// Maximum health
    pub max_health: f32,
    /// Stamina left
    pub stamina: f32,
    /// Still standing
    pub alive: bool,
    /// Final position
    pub position: Vec2,
}

impl CharacterSummary {
    fn capture(pool: &ResourcePool, body: &Body) -> Self {
        Self {
            entity: pool.entity_id(),
            health: pool.health(),
            max_health: pool.max_health(),
            stamina: pool.stamina(),
            alive: pool.is_alive(),
            position: body.position,
        }
    }
}

/// A scripted input the player could not act on.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    /// Simulation time of the input
    pub at: f32,
    /// Action requested
    pub action: InputAction,
    /// Why it was turned down
    pub reason: String,
}

/// Outcome of an arena run.
#[derive(Debug, Clone, Serialize)]
pub struct ArenaSummary {
    /// Real frames simulated
    pub frames: u64,
    /// Fixed ticks released
    pub ticks: u64,
    /// Simulation time released (seconds)
    pub sim_time: f64,
    /// Player state at the end
    pub player: CharacterSummary,
    /// Goblin state at the end
    pub goblin: CharacterSummary,
    /// Player swings that landed
    pub player_hits: u32,
    /// Goblin swings that landed
    pub goblin_hits: u32,
    /// Hit-stops started
    pub hit_stops: u32,
    /// Inputs turned down
    pub rejections: Vec<Rejection>,
    /// Published events by kind
    pub events: BTreeMap<&'static str, u32>,
}

// ============================================================================
// Arena
// ============================================================================

/// The running arena.
pub struct Arena {
    sim: SimulationConfig,
    player: PlayerCharacter,
    goblin: GoblinCharacter,
    player_body: Body,
    goblin_body: Body,
    animator: PlayerAnimator,
    player_recovery: HitRecovery,
    goblin_recovery: HitRecovery,
    goblin_windup: Option<f32>,
    hit_stop: SharedHitStop,
    bus: EventBus,
    timing: FixedStep,
    script: Vec<ScriptedInput>,
    next_input: usize,
    clock: f32,
    frames: u64,
    player_hits: u32,
    goblin_hits: u32,
    rejections: Vec<Rejection>,
    events: BTreeMap<&'static str, u32>,
}

impl Arena {
    /// Builds the arena from a validated configuration.
    #[must_use]
    pub fn new(config: &GameplayConfig) -> Self {
        let sim = config.simulation.clone();
        let bus = EventBus::new(sim.event_capacity);
        let hit_stop = HitStop::new(config.hit_stop.clone())
            .with_events(bus.sender())
            .into_shared();

        let mut ids = EntityAllocator::new();
        let player_pool = ResourcePool::new(
            ids.allocate(),
            config.player.health.clone(),
            config.player.stamina.clone(),
        )
        .with_events(bus.sender())
        .with_hit_stop(hit_stop.clone());
        let goblin_pool = ResourcePool::new(
            ids.allocate(),
            config.goblin.health.clone(),
            StaminaConfig::default(),
        )
        .with_events(bus.sender())
        .with_hit_stop(hit_stop.clone());

        Self {
            player: PlayerCharacter::with_pool(player_pool, config.player.clone()),
            goblin: GoblinCharacter::with_pool(goblin_pool, config.goblin.clone(), sim.seed),
            player_body: Body::at(sim.player_spawn_x),
            goblin_body: Body::at(sim.goblin_spawn_x),
            animator: PlayerAnimator::new(sim.clips.clone()),
            player_recovery: HitRecovery::new(sim.hit_recovery),
            goblin_recovery: HitRecovery::new(sim.hit_recovery),
            goblin_windup: None,
            hit_stop,
            bus,
            timing: FixedStep::new(sim.fixed_dt),
            script: sim.script.clone(),
            next_input: 0,
            clock: 0.0,
            frames: 0,
            player_hits: 0,
            goblin_hits: 0,
            rejections: Vec::new(),
            events: BTreeMap::new(),
            sim,
        }
    }

    /// Runs real frames for the configured duration.
    pub fn run(mut self) -> ArenaSummary {
        let real_dt = self.sim.fixed_dt;
        let frames = (self.sim.duration / real_dt).ceil() as u64;
        info!(frames, "arena started");

        for _ in 0..frames {
            self.frame(real_dt);
            if !self.player.pool().is_alive() && !self.goblin.pool().is_alive() {
                break;
            }
        }

        let summary = self.summary();
        info!(
            ticks = summary.ticks,
            player_hits = summary.player_hits,
            goblin_hits = summary.goblin_hits,
            "arena finished"
        );
        summary
    }

    /// One real frame: the hit-stop scale sets how many ticks run.
    pub fn frame(&mut self, real_dt: f32) {
        let scale = self.hit_stop.lock().time_scale();
        let ticks = self.timing.accumulate(real_dt, scale);
        for _ in 0..ticks {
            self.tick();
        }
        self.hit_stop.lock().advance_real(real_dt);
        self.tally_events();
        self.frames += 1;
        trace!(frame = self.frames, ticks, alpha = self.timing.alpha(), "frame");
    }

    fn tick(&mut self) {
        let dt = self.timing.fixed_dt();
        self.feed_script();

        // Player
        let frame = self.animator.advance(dt, self.player.blackboard_mut());
        self.player.on_animation_state(frame.state);
        let half_width = self.sim.arena_half_width;
        let probe = ArenaProbe::sample(&self.player_body, &self.goblin_body, half_width);
        let step = self.player.step(dt, &probe);
        self.player_body.velocity = step.velocity;
        self.player_body
            .integrate(dt, self.sim.gravity * step.gravity_scale, half_width);

        if frame.strike && self.goblin.pool().is_alive() {
            self.player_swing();
        }

        // Goblin
        let probe = ArenaProbe::sample(&self.goblin_body, &self.player_body, half_width);
        let player_alive = self.player.pool().is_alive();
        let senses = GoblinSenses {
            position: self.goblin_body.position,
            player_position: player_alive.then_some(self.player_body.position),
            grounded: probe.is_grounded(),
            on_wall: probe.is_on_wall(self.goblin.facing()),
            cliff_ahead: probe.is_cliff_ahead(self.goblin.facing()),
            target_in_attack_zone: player_alive
                && in_reach(
                    &self.goblin_body,
                    self.goblin.facing(),
                    &self.player_body,
                    self.sim.melee_reach,
                ),
        };
        self.goblin_body.velocity = self.goblin.step(dt, &senses);
        self.goblin_body.integrate(dt, self.sim.gravity, half_width);
        self.goblin_recovery.advance(dt, self.goblin.blackboard_mut());
        self.goblin_attack(dt);

        separate(&mut self.player_body, &mut self.goblin_body);
        self.player.sync_velocity(self.player_body.velocity);
        self.goblin.sync_velocity(self.goblin_body.velocity);

        self.player_recovery.advance(dt, self.player.blackboard_mut());
        self.clock += dt;
    }

    /// Feeds every scripted input that is due.
    fn feed_script(&mut self) {
        while let Some(input) = self.script.get(self.next_input).copied() {
            if input.at > self.clock {
                break;
            }
            self.next_input += 1;
            if let Err(rejection) = self.player.handle_input(input.event) {
                debug!(at = input.at, action = ?input.event.action, %rejection, "input rejected");
                self.rejections.push(Rejection {
                    at: input.at,
                    action: input.event.action,
                    reason: rejection.to_string(),
                });
            }
        }
    }

    fn player_swing(&mut self) {
        let facing = self.player.facing();
        if !in_reach(&self.player_body, facing, &self.goblin_body, self.sim.melee_reach) {
            return;
        }
        let hitbox = self.player.attack_hitbox().clone();
        let outcome = self.goblin.receive_hit(facing, &hitbox);
        if outcome.applied {
            self.player_hits += 1;
            self.goblin_body.velocity = self.goblin.velocity();
            // A staggered goblin loses its swing
            self.goblin_windup = None;
        }
    }

    /// Starts and resolves the goblin's club swing.
    fn goblin_attack(&mut self, dt: f32) {
        if let Some(remaining) = self.goblin_windup.as_mut() {
            *remaining -= dt;
            if *remaining > 0.0 {
                return;
            }
            self.goblin_windup = None;
            let facing = self.goblin.facing();
            if self.player.pool().is_alive()
                && in_reach(&self.goblin_body, facing, &self.player_body, self.sim.melee_reach)
            {
                let hitbox = self.goblin.attack_hitbox().clone();
                if self.player.receive_hit(facing, &hitbox).applied {
                    self.goblin_hits += 1;
                    self.player_body.velocity = self.player.velocity();
                }
            }
            return;
        }

        let staggered = self.goblin_recovery.is_active()
            || self.goblin.blackboard().get_bool(BoolParam::LockVelocity);
        if !staggered && self.goblin.try_begin_attack() {
            self.goblin_windup = Some(self.sim.goblin_windup);
        }
    }

    fn tally_events(&mut self) {
        for event in self.bus.drain() {
            *self.events.entry(event.kind()).or_default() += 1;
        }
    }

    /// Snapshot of the run so far.
    #[must_use]
    pub fn summary(&self) -> ArenaSummary {
        ArenaSummary {
            frames: self.frames,
            ticks: self.timing.total_ticks(),
            sim_time: self.timing.sim_time(),
            player: CharacterSummary::capture(self.player.pool(), &self.player_body),
            goblin: CharacterSummary::capture(self.goblin.pool(), &self.goblin_body),
            player_hits: self.player_hits,
            goblin_hits: self.goblin_hits,
            hit_stops: self.events.get("hit_stop_started").copied().unwrap_or(0),
            rejections: self.rejections.clone(),
            events: self.events.clone(),
        }
    }
}
