//! Class data for character creation.
//!
//! Contains the starting stats and the special ability bound to each of
//! the four playable classes.

use crate::combat::SpecialAbility;
use crate::world::CharacterClass;

/// Class-specific data for character creation.
pub struct ClassData {
    /// Starting (and maximum) health at level 1.
    pub base_health: i32,
    pub base_strength: i32,
    pub base_magic: i32,
    /// Gold every new character starts with.
    pub starting_gold: u32,
    /// The ability used by the "special ability" battle action.
    pub special_ability: SpecialAbility,
}

/// Gold granted to every new character regardless of class.
pub const STARTING_GOLD: u32 = 100;

impl CharacterClass {
    /// Get class data for character creation.
    pub fn data(&self) -> ClassData {
        match self {
            CharacterClass::Warrior => ClassData {
                base_health: 120,
                base_strength: 15,
                base_magic: 5,
                starting_gold: STARTING_GOLD,
                special_ability: SpecialAbility::PowerStrike,
            },
            CharacterClass::Mage => ClassData {
                base_health: 80,
                base_strength: 8,
                base_magic: 20,
                starting_gold: STARTING_GOLD,
                special_ability: SpecialAbility::Fireball,
            },
            CharacterClass::Rogue => ClassData {
                base_health: 90,
                base_strength: 12,
                base_magic: 10,
                starting_gold: STARTING_GOLD,
                special_ability: SpecialAbility::CriticalStrike,
            },
            CharacterClass::Cleric => ClassData {
                base_health: 100,
                base_strength: 10,
                base_magic: 15,
                starting_gold: STARTING_GOLD,
                special_ability: SpecialAbility::Heal,
            },
        }
    }

    /// Short description shown during character creation.
    pub fn description(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "Sturdy melee fighter. Power Strike hits for double strength.",
            CharacterClass::Mage => "Fragile spellcaster. Fireball burns for double magic.",
            CharacterClass::Rogue => "Agile striker. Critical Strike may deal triple damage.",
            CharacterClass::Cleric => "Devoted healer. Heal restores 30 health mid-battle.",
        }
    }
}
