//! Event bus for UI and effect notifications.
//!
//! Health bars, stamina bars and floating damage text subscribe here. Delivery
//! is fire-and-forget.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use duskblade_common::EntityId;

use crate::input::Vec2;

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Health value changed
    HealthChanged {
        /// Entity ID
        entity_id: EntityId,
        /// Health after the change
        health: f32,
        /// Maximum health
        max_health: f32,
    },
    /// Displayed stamina value changed
    StaminaChanged {
        /// Entity ID
        entity_id: EntityId,
        /// Smoothed value shown on the bar
        displayed: f32,
        /// Maximum stamina
        max_stamina: f32,
    },
    /// Entity took damage
    CharacterDamaged {
        /// Entity ID
        entity_id: EntityId,
        /// Damage amount
        damage: f32,
        /// Knockback delivered with the hit
        knockback: Vec2,
    },
    /// Entity was healed
    CharacterHealed {
        /// Entity ID
        entity_id: EntityId,
        /// Amount requested
        amount: f32,
    },
    /// Entity health reached zero
    CharacterDied {
        /// Entity ID
        entity_id: EntityId,
    },
    /// Global hit-stop began
    HitStopStarted,
    /// Global hit-stop ended
    HitStopEnded,
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl GameEvent {
    /// Short name of the event kind, for logs and tallies.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HealthChanged { .. } => "health_changed",
            Self::StaminaChanged { .. } => "stamina_changed",
            Self::CharacterDamaged { .. } => "character_damaged",
            Self::CharacterHealed { .. } => "character_healed",
            Self::CharacterDied { .. } => "character_died",
            Self::HitStopStarted => "hit_stop_started",
            Self::HitStopEnded => "hit_stop_ended",
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: GameEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<GameEvent> {
        self.sender.clone()
    }
}

/// Publishes through an optional sender, dropping the event when the channel
/// is full or absent.
pub(crate) fn emit(sender: Option<&Sender<GameEvent>>, event: GameEvent) {
    if let Some(sender) = sender {
        let _ = sender.try_send(event);
    }
}
