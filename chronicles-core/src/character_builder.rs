//! Character creation.
//!
//! [`create_character`] covers the common case of a name and a class name.
//! [`CharacterBuilder`] is for callers that want a starting kit or a
//! different purse, such as tests and scripted scenarios.

use crate::error::GameError;
use crate::world::{Character, CharacterClass};

/// Create a level 1 character from a class name like `"warrior"`.
pub fn create_character(name: &str, class_name: &str) -> Result<Character, GameError> {
    let class: CharacterClass = class_name.parse()?;
    Ok(Character::new(name, class))
}

/// Builder for new characters.
#[derive(Debug, Clone, Default)]
pub struct CharacterBuilder {
    name: Option<String>,
    class: Option<CharacterClass>,
    class_name: Option<String>,
    gold: Option<u32>,
    items: Vec<String>,
}

/// Error from character building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    MissingName,
    MissingClass,
    Game(GameError),
}

impl std::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuilderError::MissingName => write!(f, "Character name is required"),
            BuilderError::MissingClass => write!(f, "Class selection is required"),
            BuilderError::Game(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for BuilderError {}

impl From<GameError> for BuilderError {
    fn from(err: GameError) -> Self {
        BuilderError::Game(err)
    }
}

impl CharacterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the character's name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the character's class.
    pub fn class(mut self, class: CharacterClass) -> Self {
        self.class = Some(class);
        self.class_name = None;
        self
    }

    /// Set the class by name. Parsed when building.
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self.class = None;
        self
    }

    /// Override the starting gold.
    pub fn gold(mut self, gold: u32) -> Self {
        self.gold = Some(gold);
        self
    }

    /// Add an item to the starting inventory.
    pub fn item(mut self, item_id: impl Into<String>) -> Self {
        self.items.push(item_id.into());
        self
    }

    /// Build the character, returning an error if any required field is missing.
    pub fn build(self) -> Result<Character, BuilderError> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or(BuilderError::MissingName)?;
        let class = match (self.class, self.class_name) {
            (Some(class), _) => class,
            (None, Some(class_name)) => class_name.parse()?,
            (None, None) => return Err(BuilderError::MissingClass),
        };

        let mut character = Character::new(name.trim(), class);
        if let Some(gold) = self.gold {
            character.gold = gold;
        }
        for item_id in &self.items {
            character.add_item(item_id)?;
        }
        Ok(character)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::MAX_INVENTORY_SIZE;

    #[test]
    fn test_create_character() {
        let hero = create_character("Aria", "mage").unwrap();
        assert_eq!(hero.name, "Aria");
        assert_eq!(hero.class, CharacterClass::Mage);
        assert_eq!(hero.health, 80);
    }

    #[test]
    fn test_create_character_unknown_class() {
        assert_eq!(
            create_character("Aria", "Bard"),
            Err(GameError::InvalidCharacterClass("Bard".to_string()))
        );
    }

    #[test]
    fn test_build_with_kit() {
        let hero = CharacterBuilder::new()
            .name("  Thorin ")
            .class(CharacterClass::Warrior)
            .gold(10)
            .item("health_potion")
            .item("iron_sword")
            .build()
            .expect("Should build successfully");

        assert_eq!(hero.name, "Thorin");
        assert_eq!(hero.gold, 10);
        assert_eq!(hero.inventory.items(), ["health_potion", "iron_sword"]);
    }

    #[test]
    fn test_build_missing_fields() {
        assert_eq!(
            CharacterBuilder::new().class(CharacterClass::Rogue).build(),
            Err(BuilderError::MissingName)
        );
        assert_eq!(
            CharacterBuilder::new().name("   ").class(CharacterClass::Rogue).build(),
            Err(BuilderError::MissingName)
        );
        assert_eq!(
            CharacterBuilder::new().name("Vex").build(),
            Err(BuilderError::MissingClass)
        );
    }

    #[test]
    fn test_build_class_by_name() {
        let hero = CharacterBuilder::new()
            .name("Vex")
            .class_name("ROGUE")
            .build()
            .unwrap();
        assert_eq!(hero.class, CharacterClass::Rogue);

        let err = CharacterBuilder::new()
            .name("Vex")
            .class_name("Bard")
            .build()
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid class 'Bard'"));
    }

    #[test]
    fn test_build_kit_too_large() {
        let mut builder = CharacterBuilder::new().name("Mule").class(CharacterClass::Warrior);
        for _ in 0..=MAX_INVENTORY_SIZE {
            builder = builder.item("rock");
        }
        assert_eq!(
            builder.build(),
            Err(BuilderError::Game(GameError::InventoryFull { capacity: 20 }))
        );
    }
}
