//! # Duskblade Gameplay
//!
//! Engine-independent gameplay core for Duskblade.
//!
//! This crate provides the per-entity state holders driven once per fixed tick:
//! - Health/stamina pools with regeneration and invincibility
//! - Hit resolution with facing-mirrored knockback
//! - Combat input gate (two-hit combo, dodge, air dash)
//! - Horizontal movement integration and jump physics
//! - Contact sampling and the typed animation blackboard
//! - Goblin enemy behaviour
//! - Global hit-stop and an event bus for UI notifications

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod actions;
pub mod blackboard;
pub mod character;
pub mod combat_gate;
pub mod contacts;
pub mod events;
pub mod goblin;
pub mod hit;
pub mod hit_stop;
pub mod input;
pub mod jump;
pub mod movement;
pub mod resources;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::actions::*;
    pub use crate::blackboard::*;
    pub use crate::character::*;
    pub use crate::combat_gate::*;
    pub use crate::contacts::*;
    pub use crate::events::*;
    pub use crate::goblin::*;
    pub use crate::hit::*;
    pub use crate::hit_stop::*;
    pub use crate::input::*;
    pub use crate::jump::*;
    pub use crate::movement::*;
    pub use crate::resources::*;
}

pub use prelude::*;
