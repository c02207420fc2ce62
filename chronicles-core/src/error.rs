//! Error taxonomy for game rules.
//!
//! Every variant is an expected, recoverable condition. Callers decide how
//! to present them; nothing in the core treats them as fatal.

use thiserror::Error;

/// Errors raised by character, inventory and combat operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Invalid class '{0}'. Valid classes: Warrior, Mage, Rogue, Cleric")]
    InvalidCharacterClass(String),

    #[error("{0} is dead")]
    CharacterDead(String),

    #[error("Inventory is full ({capacity}/{capacity})")]
    InventoryFull { capacity: usize },

    #[error("Item '{0}' not found")]
    ItemNotFound(String),

    #[error("Item '{item_id}' is a {actual}, expected {expected}")]
    InvalidItemType {
        item_id: String,
        expected: String,
        actual: String,
    },

    #[error("Needs {needed} gold, only has {available}")]
    InsufficientResources { needed: u32, available: u32 },

    #[error("Combat is not active")]
    CombatNotActive,

    #[error("No special ability available for {0}")]
    AbilityOnCooldown(String),

    #[error("Enemy type '{0}' is not valid")]
    InvalidTarget(String),

    #[error("Invalid effect segment '{0}': expected stat:value")]
    InvalidEffect(String),
}
