//! Item catalog.
//!
//! The catalog is read-only reference data mapping an item id to its type,
//! effect string and cost. It is loaded once per session, either from a
//! plain-text data file or from the built-in defaults below.
//!
//! # File format
//!
//! Items are blocks of `KEY: value` lines separated by blank lines:
//!
//! ```text
//! ITEM_ID: health_potion
//! NAME: Health Potion
//! TYPE: consumable
//! EFFECT: health:20
//! COST: 25
//! DESCRIPTION: Restores 20 health points
//! ```

use crate::effects::{parse_effect_string, StatDelta};
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tokio::fs;

/// Errors from loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Item data file not found: {0}")]
    MissingFile(String),

    #[error("Invalid item data (block {block}): {reason}")]
    InvalidFormat { block: usize, reason: String },
}

// ============================================================================
// Items
// ============================================================================

/// What an item can be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Weapon,
    Armor,
    Consumable,
}

impl ItemType {
    pub fn name(&self) -> &'static str {
        match self {
            ItemType::Weapon => "weapon",
            ItemType::Armor => "armor",
            ItemType::Consumable => "consumable",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weapon" => Ok(ItemType::Weapon),
            "armor" => Ok(ItemType::Armor),
            "consumable" => Ok(ItemType::Consumable),
            other => Err(format!("invalid item type '{other}'")),
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub item_type: ItemType,
    /// Comma-separated `stat:delta` pairs.
    pub effect: String,
    pub cost: u32,
    pub description: String,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            item_type,
            effect: String::new(),
            cost: 0,
            description: String::new(),
        }
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = effect.into();
        self
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The parsed stat deltas of this item's effect.
    pub fn effects(&self) -> Result<Vec<StatDelta>, GameError> {
        parse_effect_string(&self.effect)
    }

    /// Gold received when selling: half the cost, rounded down.
    pub fn sell_price(&self) -> u32 {
        self.cost / 2
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Read-only mapping from item id to item metadata.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: BTreeMap<String, Item>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from items. Later duplicates replace earlier ones.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(item);
        }
        catalog
    }

    /// The built-in item set used when no data file is configured.
    pub fn default_items() -> Self {
        Self::from_items(DEFAULT_ITEMS.iter().cloned())
    }

    pub fn insert(&mut self, item: Item) {
        self.items.insert(item.id.clone(), item);
    }

    pub fn get(&self, item_id: &str) -> Option<&Item> {
        self.items.get(item_id)
    }

    /// Look up an item, failing with `ItemNotFound` for unknown ids.
    pub fn get_item(&self, item_id: &str) -> Result<&Item, GameError> {
        self.get(item_id)
            .ok_or_else(|| GameError::ItemNotFound(item_id.to_string()))
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items.contains_key(item_id)
    }

    /// Items in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Parse the block text format.
    ///
    /// Every field is required; effect strings are validated here so the
    /// rest of the game can rely on them.
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        let mut block: Vec<&str> = Vec::new();
        let mut block_index = 0;

        for line in text.lines().chain(std::iter::once("")) {
            let line = line.trim();
            if line.is_empty() {
                if !block.is_empty() {
                    block_index += 1;
                    let item = parse_item_block(&block).map_err(|reason| {
                        CatalogError::InvalidFormat {
                            block: block_index,
                            reason,
                        }
                    })?;
                    if catalog.contains(&item.id) {
                        tracing::warn!(item_id = %item.id, "duplicate item id, keeping the later entry");
                    }
                    catalog.insert(item);
                    block.clear();
                }
                continue;
            }
            block.push(line);
        }

        Ok(catalog)
    }

    /// Render the catalog in the block text format accepted by [`Catalog::parse`].
    pub fn to_text(&self) -> String {
        self.iter()
            .map(|item| {
                format!(
                    "ITEM_ID: {}\nNAME: {}\nTYPE: {}\nEFFECT: {}\nCOST: {}\nDESCRIPTION: {}\n",
                    item.id, item.name, item.item_type, item.effect, item.cost, item.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Load a catalog from a data file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::MissingFile(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let catalog = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), items = catalog.len(), "loaded item catalog");
        Ok(catalog)
    }

    /// Load a catalog, writing the defaults to `path` first if it is missing.
    pub async fn load_or_create(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        match Self::load(path).await {
            Err(CatalogError::MissingFile(_)) => {
                let defaults = Self::default_items();
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).await?;
                    }
                }
                fs::write(path, defaults.to_text()).await?;
                tracing::info!(path = %path.display(), "created default item data file");
                Ok(defaults)
            }
            other => other,
        }
    }
}

fn parse_item_block(lines: &[&str]) -> Result<Item, String> {
    let mut fields: BTreeMap<String, String> = BTreeMap::new();

    for line in lines {
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| format!("line '{line}' is not KEY: value"))?;
        let key = key.trim().to_lowercase();
        match key.as_str() {
            "item_id" | "name" | "type" | "effect" | "cost" | "description" => {
                fields.insert(key, value.trim().to_string());
            }
            _ => return Err(format!("unknown item field '{key}'")),
        }
    }

    let mut take = |key: &str| {
        fields
            .remove(key)
            .ok_or_else(|| format!("missing item field '{key}'"))
    };

    let id = take("item_id")?;
    let name = take("name")?;
    let item_type: ItemType = take("type")?.parse()?;
    let effect = take("effect")?;
    let cost: u32 = take("cost")?
        .parse()
        .map_err(|_| format!("cost of '{id}' must be a non-negative integer"))?;
    let description = take("description")?;

    parse_effect_string(&effect).map_err(|e| format!("item '{id}': {e}"))?;

    Ok(Item {
        id,
        name,
        item_type,
        effect,
        cost,
        description,
    })
}

// ============================================================================
// Default items
// ============================================================================

lazy_static::lazy_static! {
    /// Items available when no data file is configured.
    pub static ref DEFAULT_ITEMS: Vec<Item> = vec![
        Item::new("health_potion", "Health Potion", ItemType::Consumable)
            .with_effect("health:20")
            .with_cost(25)
            .with_description("Restores 20 health points"),
        Item::new("iron_sword", "Iron Sword", ItemType::Weapon)
            .with_effect("strength:5")
            .with_cost(50)
            .with_description("A basic iron sword"),
        Item::new("expensive_item", "Expensive Sword", ItemType::Weapon)
            .with_effect("strength:50")
            .with_cost(100)
            .with_description("A very expensive weapon"),
        Item::new("leather_armor", "Leather Armor", ItemType::Armor)
            .with_effect("max_health:10")
            .with_cost(40)
            .with_description("Boiled leather that softens blows"),
    ];
}
