//! Gameplay configuration.
//!
//! Every tunable of the gameplay crate plus the simulation settings of the
//! headless driver. Loaded from and saved to a TOML file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use duskblade_common::{ConfigError, DuskbladeResult};
use duskblade_gameplay::{
    GoblinCharacterConfig, HitStopConfig, InputAction, InputEvent, PlayerConfig, Vec2,
};

use crate::animator::ClipTimings;

/// Configuration file name.
pub const CONFIG_FILE: &str = "duskblade.toml";

/// Smallest stamina cost `validate` lets through.
const MIN_ACTION_COST: f32 = 0.1;

/// An input fed to the player at a given simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedInput {
    /// Simulation time (seconds) at which the input fires
    pub at: f32,
    /// The input
    pub event: InputEvent,
}

impl ScriptedInput {
    /// Creates a scripted input.
    #[must_use]
    pub const fn new(at: f32, event: InputEvent) -> Self {
        Self { at, event }
    }
}

/// Headless simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed timestep (seconds)
    pub fixed_dt: f32,
    /// Real-time length of the run (seconds)
    pub duration: f32,
    /// Downward acceleration at gravity scale 1 (units/s²)
    pub gravity: f32,
    /// Arena walls sit at ±this x
    pub arena_half_width: f32,
    /// Player spawn x
    pub player_spawn_x: f32,
    /// Goblin spawn x
    pub goblin_spawn_x: f32,
    /// Reach of a melee swing
    pub melee_reach: f32,
    /// Goblin wind-up before its club lands (seconds)
    pub goblin_windup: f32,
    /// Seconds the hit reaction holds velocity locked
    pub hit_recovery: f32,
    /// Player clip lengths
    pub clips: ClipTimings,
    /// Seed for enemy randomness
    pub seed: u64,
    /// Event bus capacity
    pub event_capacity: usize,
    /// Player inputs, in time order
    pub script: Vec<ScriptedInput>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            duration: 12.0,
            gravity: 25.0,
            arena_half_width: 12.0,
            player_spawn_x: -4.0,
            goblin_spawn_x: 0.0,
            melee_reach: 1.5,
            goblin_windup: 0.3,
            hit_recovery: 0.2,
            clips: ClipTimings::default(),
            seed: 0x5EED,
            event_capacity: 1024,
            script: default_script(),
        }
    }
}

/// Walk in, swing two combos, back off with a dodge, jump and air dash,
/// heal, then go back in swinging until stamina runs dry.
fn default_script() -> Vec<ScriptedInput> {
    let attack = || InputEvent::pressed(InputAction::Attack);
    vec![
        ScriptedInput::new(0.0, InputEvent::movement(Vec2::RIGHT)),
        ScriptedInput::new(0.35, InputEvent::movement(Vec2::ZERO)),
        ScriptedInput::new(0.6, attack()),
        ScriptedInput::new(0.85, attack()),
        ScriptedInput::new(1.7, attack()),
        ScriptedInput::new(1.95, attack()),
        ScriptedInput::new(2.8, InputEvent::movement(Vec2::LEFT)),
        ScriptedInput::new(2.9, InputEvent::started(InputAction::Dodge)),
        ScriptedInput::new(3.5, InputEvent::movement(Vec2::ZERO)),
        ScriptedInput::new(3.7, InputEvent::pressed(InputAction::Jump)),
        ScriptedInput::new(3.8, InputEvent::released(InputAction::Jump)),
        ScriptedInput::new(3.9, InputEvent::started(InputAction::Dodge)),
        ScriptedInput::new(4.5, InputEvent::started(InputAction::Heal)),
        ScriptedInput::new(5.0, InputEvent::movement(Vec2::RIGHT)),
        ScriptedInput::new(5.4, InputEvent::movement(Vec2::ZERO)),
        ScriptedInput::new(5.6, attack()),
        ScriptedInput::new(5.85, attack()),
        ScriptedInput::new(6.7, attack()),
        ScriptedInput::new(6.95, attack()),
        ScriptedInput::new(8.0, attack()),
        ScriptedInput::new(8.25, attack()),
        ScriptedInput::new(9.3, attack()),
        ScriptedInput::new(9.55, attack()),
    ]
}

/// All gameplay configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Player tuning
    pub player: PlayerConfig,
    /// Goblin tuning
    pub goblin: GoblinCharacterConfig,
    /// Hit-stop tuning
    pub hit_stop: HitStopConfig,
    /// Driver settings
    pub simulation: SimulationConfig,
}

impl GameplayConfig {
    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Load configuration, reporting why it could not be read.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> DuskbladeResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> DuskbladeResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Encode(e.to_string()))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        let player = &mut self.player;
        player.health.max_health = player.health.max_health.clamp(1.0, 10_000.0);
        player.health.invincibility_time = player.health.invincibility_time.clamp(0.0, 5.0);
        player.stamina.max_stamina = player.stamina.max_stamina.clamp(1.0, 10_000.0);
        player.stamina.normal_regen_rate = player.stamina.normal_regen_rate.max(0.0);
        player.stamina.depleted_regen_rate = player.stamina.depleted_regen_rate.max(0.0);
        player.stamina.critical_threshold = player
            .stamina
            .critical_threshold
            .clamp(0.0, player.stamina.max_stamina);
        player.stamina.regen_delay_after_use =
            player.stamina.regen_delay_after_use.clamp(0.0, 10.0);
        player.stamina.display_speed = player.stamina.display_speed.clamp(0.1, 100.0);

        let combat = &mut player.combat;
        // Spends must be positive to be accepted at all
        combat.attack_cost = combat.attack_cost.max(MIN_ACTION_COST);
        combat.dodge_cost = combat.dodge_cost.max(MIN_ACTION_COST);
        combat.dash_cost = combat.dash_cost.max(MIN_ACTION_COST);
        combat.dodge_duration = combat.dodge_duration.clamp(0.0, 2.0);
        combat.dash_duration = combat.dash_duration.clamp(0.0, 2.0);

        let movement = &mut player.movement;
        movement.walk_speed = movement.walk_speed.max(0.0);
        movement.max_speed = movement.max_speed.max(movement.walk_speed);

        player.heal_amount = player.heal_amount.max(0.0);

        let goblin = &mut self.goblin;
        goblin.health.max_health = goblin.health.max_health.clamp(1.0, 10_000.0);
        goblin.brain.max_speed = goblin.brain.max_speed.max(0.0);
        goblin.brain.walk_stop_rate = goblin.brain.walk_stop_rate.clamp(0.0, 1.0);
        goblin.brain.patrol_duration = goblin.brain.patrol_duration.max(0.1);
        goblin.brain.flip_cooldown = goblin.brain.flip_cooldown.max(0.0);
        goblin.attack_cooldown = goblin.attack_cooldown.max(0.0);

        self.hit_stop.duration = self.hit_stop.duration.clamp(0.0, 1.0);
        self.hit_stop.time_scale = self.hit_stop.time_scale.clamp(0.0, 1.0);

        let sim = &mut self.simulation;
        sim.fixed_dt = sim.fixed_dt.clamp(0.001, 0.1);
        sim.duration = sim.duration.clamp(0.0, 3600.0);
        sim.arena_half_width = sim.arena_half_width.max(1.0);
        sim.player_spawn_x = sim
            .player_spawn_x
            .clamp(-sim.arena_half_width, sim.arena_half_width);
        sim.goblin_spawn_x = sim
            .goblin_spawn_x
            .clamp(-sim.arena_half_width, sim.arena_half_width);
        sim.clips.attack1 = sim.clips.attack1.max(sim.fixed_dt);
        sim.clips.attack2 = sim.clips.attack2.max(sim.fixed_dt);
        sim.clips.transition = sim.clips.transition.max(0.0);
        // A swing must connect before its clip ends
        sim.clips.strike_at = sim
            .clips
            .strike_at
            .clamp(0.0, sim.clips.attack1.min(sim.clips.attack2));
        sim.event_capacity = sim.event_capacity.clamp(16, 1 << 16);
        sim.script.sort_by(|a, b| a.at.total_cmp(&b.at));
    }
}
