//! Combat input gate.
//!
//! Serializes attack and dodge requests against stamina and the current
//! combat state. The animation runtime reports the state it is playing via
//! [`CombatInputGate::handle_state`], which re-arms input and toggles stamina
//! regeneration.
//!
//! Two-hit combo:
//! ```text
//! Idle --attack--> Attack1 --attack--> Attack2 --> Idle --attack--> Attack1
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::actions::{EvasionKind, TimedAction};
use crate::blackboard::{AnimationBlackboard, BoolParam, Trigger};
use crate::movement::Facing;
use crate::resources::ResourcePool;

// ============================================================================
// States
// ============================================================================

/// Combat states reported by the animation runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatState {
    /// Standing still
    #[default]
    Idle,
    /// Walking
    Walk,
    /// First combo swing
    Attack1,
    /// Second combo swing
    Attack2,
    /// Recovery between swings
    Transition,
    /// Ground dodge
    Dodge,
    /// Air dash
    Dash,
}

impl CombatState {
    /// All states.
    pub const ALL: [Self; 7] = [
        Self::Idle,
        Self::Walk,
        Self::Attack1,
        Self::Attack2,
        Self::Transition,
        Self::Dodge,
        Self::Dash,
    ];

    /// Label used by the animation runtime.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Walk => "Walk",
            Self::Attack1 => "Attack1",
            Self::Attack2 => "Attack2",
            Self::Transition => "Transition",
            Self::Dodge => "Dodge",
            Self::Dash => "Dash",
        }
    }

    /// Parses a state label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    /// Whether attack input is accepted while this state plays.
    #[must_use]
    pub const fn accepts_input(self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Walk | Self::Transition | Self::Attack1
        )
    }

    /// Whether stamina regenerates while this state plays.
    #[must_use]
    pub const fn regenerates(self) -> bool {
        matches!(self, Self::Idle | Self::Walk | Self::Transition)
    }

    /// Whether entering this state ends the combo.
    #[must_use]
    pub const fn clears_combo(self) -> bool {
        matches!(self, Self::Idle | Self::Walk)
    }

    /// Whether this is one of the swing states.
    #[must_use]
    pub const fn is_attack(self) -> bool {
        matches!(self, Self::Attack1 | Self::Attack2)
    }
}

impl fmt::Display for CombatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label that does not name a combat state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown combat state label: {0}")]
pub struct UnknownCombatState(pub String);

impl FromStr for CombatState {
    type Err = UnknownCombatState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownCombatState(s.to_string()))
    }
}

/// Which swing of the combo an accepted attack starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComboStage {
    /// Opening swing
    First,
    /// Follow-up swing
    Second,
}

impl ComboStage {
    /// Trigger that starts the swing.
    #[must_use]
    pub const fn trigger(self) -> Trigger {
        match self {
            Self::First => Trigger::Attack,
            Self::Second => Trigger::Attack2,
        }
    }

    /// State the swing plays in.
    #[must_use]
    pub const fn state(self) -> CombatState {
        match self {
            Self::First => CombatState::Attack1,
            Self::Second => CombatState::Attack2,
        }
    }
}

// ============================================================================
// Configuration & errors
// ============================================================================

/// Combat tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Stamina per attack
    pub attack_cost: f32,
    /// Stamina per ground dodge
    pub dodge_cost: f32,
    /// Stamina per air dash
    pub dash_cost: f32,
    /// Dodge speed (units/s)
    pub dodge_speed: f32,
    /// Dodge duration (seconds)
    pub dodge_duration: f32,
    /// Dash speed (units/s)
    pub dash_speed: f32,
    /// Dash duration (seconds)
    pub dash_duration: f32,
    /// Remember one attack pressed while input is locked mid-combo
    pub buffer_combo_input: bool,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_cost: 20.0,
            dodge_cost: 15.0,
            dash_cost: 15.0,
            dodge_speed: 8.0,
            dodge_duration: 0.4,
            dash_speed: 18.0,
            dash_duration: 0.2,
            buffer_combo_input: false,
        }
    }
}

/// Reason a combat request was turned down. Nothing is mutated on rejection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GateRejection {
    /// Input is locked by the current state
    #[error("input locked during {0}")]
    InputLocked(CombatState),

    /// Not enough stamina, or locked out until full regeneration
    #[error("insufficient stamina: need {required}, have {available}")]
    InsufficientStamina {
        /// Cost of the request
        required: f32,
        /// Stamina at the time of the request
        available: f32,
    },

    /// A dodge or dash is already running
    #[error("{0:?} already in flight")]
    ActionInFlight(EvasionKind),

    /// The request is not possible right now
    #[error("not allowed: {0}")]
    NotAllowed(&'static str),
}

// ============================================================================
// Gate
// ============================================================================

/// Attack/dodge gate for one character.
#[derive(Debug, Clone)]
pub struct CombatInputGate {
    config: CombatConfig,
    state: CombatState,
    can_receive_input: bool,
    in_combo: bool,
    action: Option<TimedAction>,
    buffered_attack: bool,
}

impl CombatInputGate {
    /// Creates a gate ready for input.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            state: CombatState::Idle,
            can_receive_input: true,
            in_combo: false,
            action: None,
            buffered_attack: false,
        }
    }

    /// Requests an attack.
    ///
    /// On success the matching swing trigger is set and input stays locked
    /// until the animation runtime reports a state that re-arms it.
    pub fn request_attack<B: AnimationBlackboard + ?Sized>(
        &mut self,
        pool: &mut ResourcePool,
        bb: &mut B,
    ) -> Result<ComboStage, GateRejection> {
        if !self.can_receive_input {
            if self.config.buffer_combo_input
                && matches!(
                    self.state,
                    CombatState::Attack1 | CombatState::Attack2 | CombatState::Transition
                )
                && !self.buffered_attack
            {
                self.buffered_attack = true;
                debug!(state = %self.state, "attack buffered");
            }
            return Err(GateRejection::InputLocked(self.state));
        }
        if !pool.is_alive() {
            return Err(GateRejection::NotAllowed("character is dead"));
        }
        if let Some(action) = &self.action {
            return Err(GateRejection::ActionInFlight(action.kind));
        }
        self.spend(pool, self.config.attack_cost)?;

        let stage = if self.in_combo {
            ComboStage::Second
        } else {
            ComboStage::First
        };
        self.in_combo = stage == ComboStage::First;
        self.state = stage.state();
        self.can_receive_input = false;
        bb.set_trigger(stage.trigger());
        debug!(entity = %pool.entity_id(), ?stage, "attack accepted");
        Ok(stage)
    }

    /// Requests a dodge (grounded) or dash (airborne).
    pub fn request_dodge<B: AnimationBlackboard + ?Sized>(
        &mut self,
        grounded: bool,
        facing: Facing,
        pool: &mut ResourcePool,
        bb: &mut B,
    ) -> Result<EvasionKind, GateRejection> {
        if !pool.is_alive() {
            return Err(GateRejection::NotAllowed("character is dead"));
        }
        if let Some(action) = &self.action {
            return Err(GateRejection::ActionInFlight(action.kind));
        }

        let kind = if grounded {
            EvasionKind::Dodge
        } else {
            EvasionKind::Dash
        };
        if bb.get_bool(kind.flag()) {
            return Err(GateRejection::ActionInFlight(kind));
        }
        if kind == EvasionKind::Dash && !bb.get_bool(BoolParam::CanDash) {
            return Err(GateRejection::NotAllowed("air dash already used"));
        }

        let (cost, speed, duration) = match kind {
            EvasionKind::Dodge => (
                self.config.dodge_cost,
                self.config.dodge_speed,
                self.config.dodge_duration,
            ),
            EvasionKind::Dash => (
                self.config.dash_cost,
                self.config.dash_speed,
                self.config.dash_duration,
            ),
        };
        self.spend(pool, cost)?;

        bb.set_trigger(kind.trigger());
        bb.set_bool(kind.flag(), true);
        bb.set_bool(BoolParam::CanMove, false);
        if kind == EvasionKind::Dash {
            bb.set_bool(BoolParam::CanDash, false);
        }
        self.state = kind.state();
        self.action = Some(TimedAction::new(kind, facing, speed, duration));
        debug!(entity = %pool.entity_id(), ?kind, "evasion started");
        Ok(kind)
    }

    fn spend(&self, pool: &mut ResourcePool, cost: f32) -> Result<(), GateRejection> {
        if pool.try_use_stamina(cost) {
            return Ok(());
        }
        debug!(
            entity = %pool.entity_id(),
            cost,
            stamina = pool.stamina(),
            waiting = pool.is_waiting_for_full_regen(),
            "stamina spend rejected"
        );
        Err(GateRejection::InsufficientStamina {
            required: cost,
            available: pool.stamina(),
        })
    }

    /// Advances the in-flight dodge or dash.
    ///
    /// Returns the horizontal velocity to impose this tick. When the action
    /// runs out its flag is cleared and movement control is handed back,
    /// unless the character died meanwhile.
    pub fn tick<B: AnimationBlackboard + ?Sized>(&mut self, dt: f32, bb: &mut B) -> Option<f32> {
        let action = self.action.as_mut()?;
        if let Some(vx) = action.step(dt) {
            return Some(vx);
        }
        let kind = action.kind;
        self.action = None;
        bb.set_bool(kind.flag(), false);
        if bb.get_bool(BoolParam::IsAlive) {
            bb.set_bool(BoolParam::CanMove, true);
        }
        debug!(?kind, "evasion finished");
        None
    }

    /// Applies the state-entry table for `state`.
    ///
    /// | state            | input | regen | combo   |
    /// |------------------|-------|-------|---------|
    /// | Idle, Walk       | on    | on    | cleared |
    /// | Transition       | on    | on    | kept    |
    /// | Attack1          | on    | off   | kept    |
    /// | Attack2, Dodge, Dash | off | off | kept    |
    ///
    /// If a buffered attack is pending and input comes back on, it is replayed
    /// and the resulting stage is returned.
    pub fn handle_state<B: AnimationBlackboard + ?Sized>(
        &mut self,
        state: CombatState,
        pool: &mut ResourcePool,
        bb: &mut B,
    ) -> Option<ComboStage> {
        self.state = state;
        self.can_receive_input = state.accepts_input();
        if state.clears_combo() {
            self.in_combo = false;
        }
        pool.set_stamina_regeneration(state.regenerates());

        if self.buffered_attack && self.can_receive_input {
            self.buffered_attack = false;
            return match self.request_attack(pool, bb) {
                Ok(stage) => Some(stage),
                Err(err) => {
                    debug!(%err, "buffered attack dropped");
                    None
                }
            };
        }
        None
    }

    /// Like [`handle_state`](Self::handle_state) but takes the runtime's
    /// label. Unknown labels are logged and ignored.
    pub fn handle_state_label<B: AnimationBlackboard + ?Sized>(
        &mut self,
        label: &str,
        pool: &mut ResourcePool,
        bb: &mut B,
    ) -> Option<ComboStage> {
        match label.parse::<CombatState>() {
            Ok(state) => self.handle_state(state, pool, bb),
            Err(err) => {
                warn!(%err, "ignoring state callback");
                None
            }
        }
    }

    /// Forces input reception on or off.
    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.can_receive_input = enabled;
    }

    /// Cancels any in-flight dodge or dash and clears its flag. Movement
    /// control is not handed back.
    pub fn cancel_action<B: AnimationBlackboard + ?Sized>(
        &mut self,
        bb: &mut B,
    ) -> Option<EvasionKind> {
        let kind = self.action.take()?.kind;
        bb.set_bool(kind.flag(), false);
        debug!(?kind, "evasion cancelled");
        Some(kind)
    }

    /// Whether attack input is currently accepted.
    #[must_use]
    pub fn can_receive_input(&self) -> bool {
        self.can_receive_input
    }

    /// Whether the next accepted attack is the second swing.
    #[must_use]
    pub fn in_combo(&self) -> bool {
        self.in_combo
    }

    /// Last known combat state.
    #[must_use]
    pub fn state(&self) -> CombatState {
        self.state
    }

    /// In-flight dodge or dash.
    #[must_use]
    pub fn active_action(&self) -> Option<&TimedAction> {
        self.action.as_ref()
    }

    /// Whether an attack is waiting in the buffer.
    #[must_use]
    pub fn has_buffered_attack(&self) -> bool {
        self.buffered_attack
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }
}

impl Default for CombatInputGate {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}
