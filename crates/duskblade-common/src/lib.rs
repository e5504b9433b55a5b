//! # Duskblade Common
//!
//! Common types shared by the Duskblade crates:
//! - Entity ids and their per-run allocator
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_numbers_from_one() {
        let mut ids = EntityAllocator::new();
        let first = ids.allocate();
        let second = ids.allocate();
        assert_eq!(first.raw(), 1);
        assert_ne!(first, second);
        assert!(first.is_valid());
        assert!(!EntityId::NULL.is_valid());
        assert_eq!(ids.allocated(), 2);

        // A fresh allocator repeats the sequence
        assert_eq!(EntityAllocator::new().allocate(), first);
    }

    #[test]
    fn test_entity_id_display() {
        assert_eq!(EntityId::from_raw(42).to_string(), "#42");
    }

    #[test]
    fn test_entity_id_serde() {
        let id = EntityId::from_raw(7);
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "7");
        let back: EntityId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, back);
    }

    #[test]
    fn test_config_error_converts() {
        let err: DuskbladeError = ConfigError::Parse("expected `=`".to_string()).into();
        assert!(matches!(err, DuskbladeError::Config(ConfigError::Parse(_))));
        assert!(err.to_string().contains("expected `=`"));
    }
}
