//! Inventory, equipment and shop operations.
//!
//! The inventory is an ordered list of item ids capped at
//! [`MAX_INVENTORY_SIZE`]. Equipping moves an item out of the inventory into
//! a slot and applies its effect string; unequipping reverses both.

use crate::effects::StatDelta;
use crate::error::GameError;
use crate::items::{Catalog, Item, ItemType};
use crate::world::Character;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of items a character can carry.
pub const MAX_INVENTORY_SIZE: usize = 20;

/// Ordered collection of carried item ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: Vec<String>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_INVENTORY_SIZE
    }

    pub fn space_remaining(&self) -> usize {
        MAX_INVENTORY_SIZE.saturating_sub(self.items.len())
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Append an item, failing when the inventory is full.
    pub fn add(&mut self, item_id: &str) -> Result<(), GameError> {
        if self.is_full() {
            return Err(GameError::InventoryFull {
                capacity: MAX_INVENTORY_SIZE,
            });
        }
        self.items.push(item_id.to_string());
        Ok(())
    }

    /// Remove the first occurrence of an item.
    pub fn remove(&mut self, item_id: &str) -> Result<(), GameError> {
        let idx = self
            .items
            .iter()
            .position(|i| i == item_id)
            .ok_or_else(|| GameError::ItemNotFound(item_id.to_string()))?;
        self.items.remove(idx);
        Ok(())
    }

    pub fn has(&self, item_id: &str) -> bool {
        self.items.iter().any(|i| i == item_id)
    }

    pub fn count(&self, item_id: &str) -> usize {
        self.items.iter().filter(|i| *i == item_id).count()
    }

    /// Remove everything, returning what was carried.
    pub fn clear(&mut self) -> Vec<String> {
        std::mem::take(&mut self.items)
    }

    /// Append without the capacity check. Only for swaps that free a slot
    /// again before returning.
    fn push_swapped(&mut self, item_id: String) {
        self.items.push(item_id);
    }
}

impl FromIterator<String> for Inventory {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Equipment slots
// ============================================================================

/// The two equipment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    Armor,
}

impl EquipSlot {
    pub fn name(&self) -> &'static str {
        match self {
            EquipSlot::Weapon => "weapon",
            EquipSlot::Armor => "armor",
        }
    }

    /// The item type this slot accepts.
    pub fn accepts(&self) -> ItemType {
        match self {
            EquipSlot::Weapon => ItemType::Weapon,
            EquipSlot::Armor => ItemType::Armor,
        }
    }

    /// The slot an item type goes in, if any.
    pub fn for_item_type(item_type: ItemType) -> Option<EquipSlot> {
        match item_type {
            ItemType::Weapon => Some(EquipSlot::Weapon),
            ItemType::Armor => Some(EquipSlot::Armor),
            ItemType::Consumable => None,
        }
    }
}

impl fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EquipSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weapon" => Ok(EquipSlot::Weapon),
            "armor" | "armour" => Ok(EquipSlot::Armor),
            other => Err(format!("unknown equipment slot '{other}'")),
        }
    }
}

fn wrong_type(item: &Item, expected: ItemType) -> GameError {
    GameError::InvalidItemType {
        item_id: item.id.clone(),
        expected: expected.name().to_string(),
        actual: item.item_type.name().to_string(),
    }
}

// ============================================================================
// Character operations
// ============================================================================

impl Character {
    pub fn add_item(&mut self, item_id: &str) -> Result<(), GameError> {
        self.inventory.add(item_id)
    }

    pub fn remove_item(&mut self, item_id: &str) -> Result<(), GameError> {
        self.inventory.remove(item_id)
    }

    pub fn has_item(&self, item_id: &str) -> bool {
        self.inventory.has(item_id)
    }

    pub fn count_item(&self, item_id: &str) -> usize {
        self.inventory.count(item_id)
    }

    /// Consume one unit of a consumable, applying its effects.
    pub fn use_item(&mut self, item: &Item) -> Result<Vec<StatDelta>, GameError> {
        if !self.has_item(&item.id) {
            return Err(GameError::ItemNotFound(item.id.clone()));
        }
        if item.item_type != ItemType::Consumable {
            return Err(wrong_type(item, ItemType::Consumable));
        }

        let applied = self.apply_effect_string(&item.effect)?;
        self.inventory.remove(&item.id)?;
        tracing::debug!(character = %self.name, item = %item.id, "used item");
        Ok(applied)
    }

    /// The item id in a slot, if any.
    pub fn equipped(&self, slot: EquipSlot) -> Option<&str> {
        match slot {
            EquipSlot::Weapon => self.equipped_weapon.as_deref(),
            EquipSlot::Armor => self.equipped_armor.as_deref(),
        }
    }

    fn slot_mut(&mut self, slot: EquipSlot) -> &mut Option<String> {
        match slot {
            EquipSlot::Weapon => &mut self.equipped_weapon,
            EquipSlot::Armor => &mut self.equipped_armor,
        }
    }

    /// Equip an item from the inventory into `slot`.
    ///
    /// Any item already in the slot is unequipped first: its bonus is
    /// removed and it goes back to the inventory before the new bonus is
    /// applied. Returns the id of the replaced item.
    pub fn equip(
        &mut self,
        slot: EquipSlot,
        item_id: &str,
        catalog: &Catalog,
    ) -> Result<Option<String>, GameError> {
        if !self.has_item(item_id) {
            return Err(GameError::ItemNotFound(item_id.to_string()));
        }
        let item = catalog.get_item(item_id)?;
        if item.item_type != slot.accepts() {
            return Err(wrong_type(item, slot.accepts()));
        }

        // Validate both effect strings before touching any stat.
        item.effects()?;
        let previous = self.equipped(slot).map(str::to_string);
        let previous_effect = match previous.as_deref().and_then(|id| catalog.get(id)) {
            Some(old) => {
                old.effects()?;
                Some(old.effect.clone())
            }
            None => None,
        };

        if let Some(old_id) = previous.clone() {
            match &previous_effect {
                Some(effect) => {
                    self.reverse_effect_string(effect)?;
                }
                None => {
                    tracing::warn!(item = %old_id, "equipped item missing from catalog, bonus not reversed");
                }
            }
            self.inventory.push_swapped(old_id);
        }

        *self.slot_mut(slot) = Some(item.id.clone());
        self.apply_effect_string(&item.effect)?;
        self.inventory.remove(&item.id)?;

        tracing::debug!(
            character = %self.name,
            %slot,
            item = %item.id,
            replaced = ?previous,
            "equipped item"
        );
        Ok(previous)
    }

    pub fn equip_weapon(
        &mut self,
        item_id: &str,
        catalog: &Catalog,
    ) -> Result<Option<String>, GameError> {
        self.equip(EquipSlot::Weapon, item_id, catalog)
    }

    pub fn equip_armor(
        &mut self,
        item_id: &str,
        catalog: &Catalog,
    ) -> Result<Option<String>, GameError> {
        self.equip(EquipSlot::Armor, item_id, catalog)
    }

    /// Move the item in `slot` back to the inventory, removing its bonus.
    ///
    /// Returns `Ok(None)` when nothing is equipped.
    pub fn unequip(
        &mut self,
        slot: EquipSlot,
        catalog: &Catalog,
    ) -> Result<Option<String>, GameError> {
        let Some(item_id) = self.equipped(slot).map(str::to_string) else {
            return Ok(None);
        };
        if self.inventory.is_full() {
            return Err(GameError::InventoryFull {
                capacity: MAX_INVENTORY_SIZE,
            });
        }

        match catalog.get(&item_id) {
            Some(item) => {
                self.reverse_effect_string(&item.effect)?;
            }
            None => {
                tracing::warn!(item = %item_id, "equipped item missing from catalog, bonus not reversed");
            }
        }
        self.inventory.add(&item_id)?;
        *self.slot_mut(slot) = None;

        tracing::debug!(character = %self.name, %slot, item = %item_id, "unequipped item");
        Ok(Some(item_id))
    }

    pub fn unequip_weapon(&mut self, catalog: &Catalog) -> Result<Option<String>, GameError> {
        self.unequip(EquipSlot::Weapon, catalog)
    }

    pub fn unequip_armor(&mut self, catalog: &Catalog) -> Result<Option<String>, GameError> {
        self.unequip(EquipSlot::Armor, catalog)
    }

    /// Buy an item. Gold is checked before inventory space.
    pub fn purchase_item(&mut self, item: &Item) -> Result<(), GameError> {
        if self.gold < item.cost {
            return Err(GameError::InsufficientResources {
                needed: item.cost,
                available: self.gold,
            });
        }
        if self.inventory.is_full() {
            return Err(GameError::InventoryFull {
                capacity: MAX_INVENTORY_SIZE,
            });
        }

        self.gold -= item.cost;
        self.inventory.add(&item.id)?;
        tracing::debug!(character = %self.name, item = %item.id, cost = item.cost, "purchased item");
        Ok(())
    }

    /// Sell one unit of an item for half its cost. Returns the gold received.
    pub fn sell_item(&mut self, item: &Item) -> Result<u32, GameError> {
        self.inventory.remove(&item.id)?;
        let price = item.sell_price();
        self.gold = self.gold.saturating_add(price);
        tracing::debug!(character = %self.name, item = %item.id, price, "sold item");
        Ok(price)
    }
}
