//! Text-adventure RPG engine.
//!
//! This crate provides:
//! - Characters with four classes, experience and leveling
//! - Stat effects carried by items, applied and reversed on equip
//! - A bounded inventory with equipment slots and a shop
//! - A turn-based battle state machine with class special abilities
//! - Quests with level and prerequisite requirements
//! - Item catalog loading and character persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use chronicles_core::{Character, CharacterClass, GameSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::new().with_save_dir("saves");
//!     let hero = Character::new("Thorin", CharacterClass::Warrior);
//!
//!     let mut session = GameSession::new(hero, config).await?;
//!
//!     let outcome = session.explore()?;
//!     println!("{:?}", outcome.aftermath);
//!
//!     session.buy("health_potion")?;
//!     session.save().await?;
//!     Ok(())
//! }
//! ```

pub mod character_builder;
pub mod class_data;
pub mod combat;
pub mod dice;
pub mod effects;
pub mod error;
pub mod headless;
pub mod inventory;
pub mod items;
pub mod persist;
pub mod progression;
pub mod quests;
pub mod session;
pub mod testing;
pub mod world;

// Primary public API
pub use character_builder::{create_character, CharacterBuilder};
pub use combat::{Battle, BattleResult, BattleState, PlayerAction, SpecialAbility, Winner};
pub use dice::{Dice, RandomDice};
pub use error::GameError;
pub use headless::{HeadlessConfig, HeadlessGame};
pub use inventory::{EquipSlot, MAX_INVENTORY_SIZE};
pub use items::{Catalog, CatalogError, Item, ItemType};
pub use persist::PersistError;
pub use quests::{Quest, QuestDataError, QuestError, QuestLog, QuestReward};
pub use session::{Aftermath, GameSession, SessionConfig, SessionError};
pub use testing::ScriptedDice;
pub use world::{create_enemy, Character, CharacterClass, Enemy, EnemyKind};
