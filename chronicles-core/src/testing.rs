//! Testing utilities.
//!
//! This module provides tools for deterministic tests:
//! - `ScriptedDice` for coin flips decided in advance
//! - sample characters and catalogs
//! - assertion helpers for character state

use crate::dice::Dice;
use crate::items::{Catalog, Item, ItemType};
use crate::world::{Character, CharacterClass};
use std::collections::VecDeque;

/// Dice that return scripted flips in order.
///
/// Once the script runs out every flip is tails (`false`).
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    flips: VecDeque<bool>,
    used: usize,
}

impl ScriptedDice {
    /// Dice with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_flips(flips: impl IntoIterator<Item = bool>) -> Self {
        Self {
            flips: flips.into_iter().collect(),
            used: 0,
        }
    }

    /// Queue another flip.
    pub fn push(&mut self, heads: bool) -> &mut Self {
        self.flips.push_back(heads);
        self
    }

    /// How many flips have been taken.
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.flips.len()
    }
}

impl Dice for ScriptedDice {
    fn coin_flip(&mut self) -> bool {
        self.used += 1;
        self.flips.pop_front().unwrap_or(false)
    }
}

/// A level 1 character of the given class named "Tester".
pub fn sample_character(class: CharacterClass) -> Character {
    Character::new("Tester", class)
}

/// A level 1 Warrior with a sword equipped and two potions.
pub fn sample_equipped_warrior(catalog: &Catalog) -> Character {
    let mut warrior = sample_character(CharacterClass::Warrior);
    for id in ["iron_sword", "health_potion", "health_potion"] {
        if warrior.add_item(id).is_err() {
            break;
        }
    }
    if catalog.contains("iron_sword") {
        warrior
            .equip_weapon("iron_sword", catalog)
            .expect("sample catalog iron_sword should be equippable");
    }
    warrior
}

/// A small catalog covering every item type.
pub fn sample_catalog() -> Catalog {
    let mut catalog = Catalog::default_items();
    catalog.insert(
        Item::new("steel_axe", "Steel Axe", ItemType::Weapon)
            .with_effect("strength:8")
            .with_cost(80)
            .with_description("Heavy and sharp."),
    );
    catalog.insert(
        Item::new("lucky_charm", "Lucky Charm", ItemType::Armor)
            .with_effect("luck:3")
            .with_cost(15)
            .with_description("Said to bring good fortune."),
    );
    catalog
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Assert current and maximum health.
pub fn assert_health(character: &Character, current: i32, max: i32) {
    assert_eq!(
        (character.health, character.max_health),
        (current, max),
        "expected {} to have {current}/{max} health, got {}/{}",
        character.name,
        character.health,
        character.max_health
    );
}

/// Assert the record invariants every operation must keep.
pub fn assert_invariants(character: &Character) {
    assert!(
        character.health >= 0,
        "{} has negative health {}",
        character.name,
        character.health
    );
    assert!(
        character.health <= character.max_health,
        "{} has {} health over max {}",
        character.name,
        character.health,
        character.max_health
    );
    assert!(
        character.inventory.len() <= crate::inventory::MAX_INVENTORY_SIZE,
        "{} carries {} items",
        character.name,
        character.inventory.len()
    );
    assert!(character.level >= 1, "{} is level 0", character.name);
}
