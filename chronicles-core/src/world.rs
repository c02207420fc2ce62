//! Game world types.
//!
//! Contains the persistent player [`Character`], the transient [`Enemy`]
//! records spawned per encounter, and the ids and enums that describe them.

use crate::combat::SpecialAbility;
use crate::error::GameError;
use crate::inventory::Inventory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Classes
// ============================================================================

/// Playable character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Warrior,
    Mage,
    Rogue,
    Cleric,
}

impl CharacterClass {
    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "Warrior",
            CharacterClass::Mage => "Mage",
            CharacterClass::Rogue => "Rogue",
            CharacterClass::Cleric => "Cleric",
        }
    }

    pub fn all() -> [CharacterClass; 4] {
        [
            CharacterClass::Warrior,
            CharacterClass::Mage,
            CharacterClass::Rogue,
            CharacterClass::Cleric,
        ]
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CharacterClass {
    type Err = GameError;

    /// Class names match case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CharacterClass::all()
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GameError::InvalidCharacterClass(s.to_string()))
    }
}

// ============================================================================
// Character
// ============================================================================

/// The player-controlled character.
///
/// Mutated in place by progression, inventory and combat operations, and
/// persisted between sessions by [`crate::persist`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub id: CharacterId,
    pub name: String,
    pub class: CharacterClass,

    // Progression
    pub level: u32,
    pub experience: u32,
    pub gold: u32,

    // Combat stats
    pub health: i32,
    pub max_health: i32,
    pub strength: i32,
    pub magic: i32,

    /// Stats named by item effects that have no dedicated field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bonus_stats: BTreeMap<String, i32>,

    // Collections
    pub inventory: Inventory,
    #[serde(default)]
    pub active_quests: Vec<String>,
    #[serde(default)]
    pub completed_quests: Vec<String>,
    #[serde(default)]
    pub equipped_weapon: Option<String>,
    #[serde(default)]
    pub equipped_armor: Option<String>,

    /// Bound once when the class is assigned.
    #[serde(default)]
    pub special_ability: Option<SpecialAbility>,
}

impl Character {
    /// Create a level 1 character with the base stats of `class`.
    pub fn new(name: impl Into<String>, class: CharacterClass) -> Self {
        let data = class.data();
        Self {
            id: CharacterId::new(),
            name: name.into(),
            class,
            level: 1,
            experience: 0,
            gold: data.starting_gold,
            health: data.base_health,
            max_health: data.base_health,
            strength: data.base_strength,
            magic: data.base_magic,
            bonus_stats: BTreeMap::new(),
            inventory: Inventory::new(),
            active_quests: Vec::new(),
            completed_quests: Vec::new(),
            equipped_weapon: None,
            equipped_armor: None,
            special_ability: Some(data.special_ability),
        }
    }

    /// Experience needed to reach the next level.
    pub fn experience_to_next_level(&self) -> u32 {
        self.level * 100
    }

    /// Read any stat by name, including bonus stats.
    pub fn stat(&self, stat_name: &str) -> Option<i32> {
        match stat_name {
            "health" => Some(self.health),
            "max_health" => Some(self.max_health),
            "strength" => Some(self.strength),
            "magic" => Some(self.magic),
            other => self.bonus_stats.get(other).copied(),
        }
    }
}

// ============================================================================
// Enemies
// ============================================================================

/// Enemy templates with fixed stats and rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Goblin,
    Orc,
    Dragon,
}

/// Stats for one enemy template.
pub struct EnemyTemplate {
    pub health: i32,
    pub strength: i32,
    pub magic: i32,
    pub xp_reward: u32,
    pub gold_reward: u32,
}

impl EnemyKind {
    pub fn name(&self) -> &'static str {
        match self {
            EnemyKind::Goblin => "Goblin",
            EnemyKind::Orc => "Orc",
            EnemyKind::Dragon => "Dragon",
        }
    }

    pub fn template(&self) -> EnemyTemplate {
        match self {
            EnemyKind::Goblin => EnemyTemplate {
                health: 50,
                strength: 8,
                magic: 2,
                xp_reward: 25,
                gold_reward: 10,
            },
            EnemyKind::Orc => EnemyTemplate {
                health: 80,
                strength: 12,
                magic: 5,
                xp_reward: 50,
                gold_reward: 25,
            },
            EnemyKind::Dragon => EnemyTemplate {
                health: 200,
                strength: 25,
                magic: 15,
                xp_reward: 200,
                gold_reward: 100,
            },
        }
    }

    /// Pick the template that fits a character level.
    pub fn for_level(level: u32) -> EnemyKind {
        match level {
            0..=2 => EnemyKind::Goblin,
            3..=5 => EnemyKind::Orc,
            _ => EnemyKind::Dragon,
        }
    }
}

impl FromStr for EnemyKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "goblin" => Ok(EnemyKind::Goblin),
            "orc" => Ok(EnemyKind::Orc),
            "dragon" => Ok(EnemyKind::Dragon),
            _ => Err(GameError::InvalidTarget(s.to_string())),
        }
    }
}

/// A transient opponent, created per encounter and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub strength: i32,
    pub magic: i32,
    pub level: u32,
    pub xp_reward: Option<u32>,
    pub gold_reward: Option<u32>,
}

impl Enemy {
    /// An ad-hoc enemy with no stored rewards.
    ///
    /// Victory rewards fall back to the level-scaled formula.
    pub fn new(
        name: impl Into<String>,
        level: u32,
        health: i32,
        strength: i32,
        magic: i32,
    ) -> Self {
        Self {
            name: name.into(),
            health,
            max_health: health,
            strength,
            magic,
            level,
            xp_reward: None,
            gold_reward: None,
        }
    }

    /// Spawn a level 1 enemy from a template.
    pub fn spawn(kind: EnemyKind) -> Self {
        let template = kind.template();
        Self {
            name: kind.name().to_string(),
            health: template.health,
            max_health: template.health,
            strength: template.strength,
            magic: template.magic,
            level: 1,
            xp_reward: Some(template.xp_reward),
            gold_reward: Some(template.gold_reward),
        }
    }

    /// Spawn an enemy suited to a character of the given level.
    pub fn for_level(character_level: u32) -> Self {
        let mut enemy = Self::spawn(EnemyKind::for_level(character_level));
        enemy.level = character_level;
        enemy
    }

    /// Experience and gold granted for defeating this enemy.
    pub fn rewards(&self) -> (u32, u32) {
        match (self.xp_reward, self.gold_reward) {
            (Some(xp), Some(gold)) => (xp, gold),
            _ => (
                self.level.saturating_mul(5).saturating_add(20),
                self.level.saturating_mul(3).saturating_add(5),
            ),
        }
    }
}

/// Create an enemy from a template name like `"goblin"`.
pub fn create_enemy(kind: &str) -> Result<Enemy, GameError> {
    Ok(Enemy::spawn(kind.parse()?))
}
