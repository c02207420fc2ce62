//! GameSession - the primary public API for gameplay.
//!
//! This module wraps the character, the item catalog, the dice and
//! persistence into a single context object. Everything the outer game loop
//! does (exploring, shopping, quests, interactive fights, death handling,
//! saving) goes through it.

use crate::combat::{Battle, BattleEvent, BattleResult, BattleState, PlayerAction, Winner};
use crate::dice::{Dice, RandomDice};
use crate::effects::StatDelta;
use crate::error::GameError;
use crate::inventory::EquipSlot;
use crate::items::{Catalog, CatalogError, Item};
use crate::persist::{self, PersistError};
use crate::quests::{Quest, QuestDataError, QuestError, QuestLog, QuestReward};
use crate::world::{Character, Enemy};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Gold paid to come back after losing a battle.
pub const DEFAULT_REVIVE_COST: u32 = 50;

/// Errors from GameSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Save error: {0}")]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Quest(#[from] QuestError),

    #[error("Quest data error: {0}")]
    QuestData(#[from] QuestDataError),

    #[error("Game over: {0} has fallen for good")]
    GameOver(String),

    #[error("Already fighting {0}")]
    EncounterInProgress(String),
}

/// Configuration for creating a new game session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory holding character saves.
    pub save_dir: PathBuf,

    /// Item catalog file. The built-in items are used when unset.
    pub catalog_path: Option<PathBuf>,

    /// Quest data file. The built-in quests are used when unset.
    pub quests_path: Option<PathBuf>,

    /// Seed for reproducible dice.
    pub seed: Option<u64>,

    /// Gold deducted to revive after a defeat.
    pub revive_cost: u32,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            save_dir: PathBuf::from("saves"),
            catalog_path: None,
            quests_path: None,
            seed: None,
            revive_cost: DEFAULT_REVIVE_COST,
        }
    }

    /// Set the save directory.
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    /// Load items from a catalog file instead of the built-in list.
    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    /// Load quests from a data file instead of the built-in list.
    pub fn with_quests_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.quests_path = Some(path.into());
        self
    }

    /// Seed the dice.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the revive cost.
    pub fn with_revive_cost(mut self, cost: u32) -> Self {
        self.revive_cost = cost;
        self
    }

    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CHRONICLES_SAVE_DIR` - Save directory (default: `saves`)
    /// - `CHRONICLES_CATALOG` - Item catalog file (default: built-in items)
    /// - `CHRONICLES_QUESTS` - Quest data file (default: built-in quests)
    /// - `CHRONICLES_SEED` - Dice seed (default: random)
    /// - `CHRONICLES_REVIVE_COST` - Gold to revive (default: 50)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`SessionConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();

        if let Some(dir) = lookup("CHRONICLES_SAVE_DIR").filter(|d| !d.is_empty()) {
            config.save_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("CHRONICLES_CATALOG").filter(|p| !p.is_empty()) {
            config.catalog_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("CHRONICLES_QUESTS").filter(|p| !p.is_empty()) {
            config.quests_path = Some(PathBuf::from(path));
        }
        if let Some(seed) = read_var(&lookup, "CHRONICLES_SEED") {
            config.seed = Some(seed);
        }
        if let Some(cost) = read_var(&lookup, "CHRONICLES_REVIVE_COST") {
            config.revive_cost = cost;
        }

        config
    }

    /// Load the configured catalog.
    ///
    /// A configured path that does not exist yet is created with the
    /// built-in items.
    pub async fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::load_or_create(path).await,
            None => Ok(Catalog::default_items()),
        }
    }

    /// Load the configured quest log, creating a missing file with the
    /// built-in quests.
    pub async fn load_quests(&self) -> Result<QuestLog, QuestDataError> {
        match &self.quests_path {
            Some(path) => QuestLog::load_or_create(path).await,
            None => Ok(QuestLog::default_quests()),
        }
    }
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let value = lookup(key)?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value = %value, "ignoring unparsable environment variable");
            None
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to the character after a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aftermath {
    /// Rewards were applied.
    Victory {
        xp_gained: u32,
        gold_gained: u32,
        levels_gained: u32,
    },
    /// The character lost, paid to revive and is back at `health`.
    Revived { cost: u32, health: i32 },
    /// The character lost and could not pay. The session is over.
    GameOver,
}

/// Outcome of an auto-resolved exploration battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreOutcome {
    pub enemy: Enemy,
    pub result: BattleResult,
    pub aftermath: Aftermath,
}

/// Outcome of one interactive round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub events: Vec<BattleEvent>,
    pub state: BattleState,
    pub result: Option<BattleResult>,
    pub aftermath: Option<Aftermath>,
}

/// An interactive fight spread over several commands.
#[derive(Debug, Clone)]
struct Encounter {
    enemy: Enemy,
    round: u32,
}

/// A game session.
///
/// This is the main entry point for gameplay. It manages:
/// - The player character
/// - The item catalog used by shop, equipment and consumables
/// - The quest log
/// - The dice used by combat
/// - An optional interactive encounter
pub struct GameSession<D: Dice = RandomDice> {
    character: Character,
    catalog: Catalog,
    quests: QuestLog,
    dice: D,
    config: SessionConfig,
    encounter: Option<Encounter>,
    over: bool,
}

impl GameSession<RandomDice> {
    /// Create a session for `character`, loading the configured catalog.
    pub async fn new(character: Character, config: SessionConfig) -> Result<Self, SessionError> {
        let catalog = config.load_catalog().await?;
        let quests = config.load_quests().await?;
        let dice = RandomDice::from_seed(config.seed);
        tracing::info!(
            character = %character.name,
            class = %character.class,
            items = catalog.len(),
            quests = quests.len(),
            "session started"
        );
        Ok(Self::with_parts(character, catalog, dice, config).with_quests(quests))
    }

    /// Resume the character saved under `name` in the configured save directory.
    pub async fn load(name: &str, config: SessionConfig) -> Result<Self, SessionError> {
        let character = persist::load_character(&config.save_dir, name).await?;
        tracing::info!(character = %character.name, level = character.level, "character loaded");
        Self::new(character, config).await
    }
}

impl<D: Dice> GameSession<D> {
    /// Assemble a session from already-built parts.
    ///
    /// The session starts with the built-in quests.
    pub fn with_parts(character: Character, catalog: Catalog, dice: D, config: SessionConfig) -> Self {
        Self {
            character,
            catalog,
            quests: QuestLog::default_quests(),
            dice,
            config,
            encounter: None,
            over: false,
        }
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    /// Get a mutable reference to the character.
    ///
    /// Use with caution - direct modifications bypass the rules.
    pub fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    /// Replace the quest log.
    pub fn with_quests(mut self, quests: QuestLog) -> Self {
        self.quests = quests;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn quests(&self) -> &QuestLog {
        &self.quests
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether the character has died without the gold to revive.
    pub fn is_over(&self) -> bool {
        self.over
    }

    fn ensure_playing(&self) -> Result<(), SessionError> {
        if self.over {
            Err(SessionError::GameOver(self.character.name.clone()))
        } else {
            Ok(())
        }
    }

    fn ensure_no_encounter(&self) -> Result<(), SessionError> {
        match &self.encounter {
            Some(encounter) => Err(SessionError::EncounterInProgress(
                encounter.enemy.name.clone(),
            )),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Combat
    // ========================================================================

    /// Meet an enemy suited to the character's level and fight it out.
    pub fn explore(&mut self) -> Result<ExploreOutcome, SessionError> {
        self.ensure_playing()?;
        self.ensure_no_encounter()?;

        let enemy = Enemy::for_level(self.character.level);
        tracing::info!(enemy = %enemy.name, level = enemy.level, "enemy appears");

        let (result, enemy) = {
            let mut battle = Battle::new(&mut self.character, enemy, &mut self.dice)?;
            let result = battle.start_battle()?;
            (result, battle.into_enemy())
        };
        let aftermath = self.apply_battle_result(&result)?;

        Ok(ExploreOutcome {
            enemy,
            result,
            aftermath,
        })
    }

    /// A battle against `enemy` driven by the caller.
    ///
    /// Pass the finished battle's result to [`apply_battle_result`].
    ///
    /// [`apply_battle_result`]: GameSession::apply_battle_result
    pub fn fight(&mut self, enemy: Enemy) -> Result<Battle<'_, &mut D>, SessionError> {
        self.ensure_playing()?;
        Ok(Battle::new(&mut self.character, enemy, &mut self.dice)?)
    }

    /// Apply a battle result: rewards on victory, death handling on defeat.
    pub fn apply_battle_result(&mut self, result: &BattleResult) -> Result<Aftermath, SessionError> {
        match result.winner {
            Winner::Player => {
                let levels_gained = self.character.gain_experience(result.xp_gained)?;
                self.character.add_gold(i64::from(result.gold_gained))?;
                tracing::info!(
                    xp = result.xp_gained,
                    gold = result.gold_gained,
                    level = self.character.level,
                    "victory"
                );
                Ok(Aftermath::Victory {
                    xp_gained: result.xp_gained,
                    gold_gained: result.gold_gained,
                    levels_gained,
                })
            }
            Winner::Enemy => Ok(self.handle_death()),
        }
    }

    /// Revive a dead character for the configured cost, or end the session.
    ///
    /// Does nothing for a living character.
    pub fn handle_death(&mut self) -> Aftermath {
        if !self.character.is_dead() {
            return Aftermath::Revived {
                cost: 0,
                health: self.character.health,
            };
        }

        let cost = self.config.revive_cost;
        if self.character.gold >= cost {
            self.character.gold -= cost;
            self.character.revive();
            tracing::info!(cost, health = self.character.health, "revived");
            Aftermath::Revived {
                cost,
                health: self.character.health,
            }
        } else {
            self.over = true;
            tracing::warn!(
                character = %self.character.name,
                gold = self.character.gold,
                cost,
                "game over"
            );
            Aftermath::GameOver
        }
    }

    /// The enemy of the current interactive encounter.
    pub fn encounter(&self) -> Option<&Enemy> {
        self.encounter.as_ref().map(|e| &e.enemy)
    }

    pub fn in_combat(&self) -> bool {
        self.encounter.is_some()
    }

    /// Start an interactive encounter with an enemy suited to the character.
    pub fn start_encounter(&mut self) -> Result<&Enemy, SessionError> {
        self.ensure_playing()?;
        self.ensure_no_encounter()?;
        if self.character.is_dead() {
            return Err(GameError::CharacterDead(self.character.name.clone()).into());
        }

        let enemy = Enemy::for_level(self.character.level);
        tracing::info!(enemy = %enemy.name, level = enemy.level, "encounter started");
        let encounter = self.encounter.insert(Encounter { enemy, round: 1 });
        Ok(&encounter.enemy)
    }

    /// Play one round of the current encounter.
    pub fn encounter_round(&mut self, action: PlayerAction) -> Result<RoundReport, SessionError> {
        let Encounter { enemy, round } = self
            .encounter
            .take()
            .ok_or(GameError::CombatNotActive)?;

        if self.character.is_dead() {
            self.encounter = Some(Encounter { enemy, round });
            return Err(GameError::CharacterDead(self.character.name.clone()).into());
        }
        let mut battle = Battle::new(&mut self.character, enemy, &mut self.dice)?.with_round(round);
        let events = match battle.play_round(action) {
            Ok(events) => events,
            Err(err) => {
                let round = battle.round();
                self.encounter = Some(Encounter {
                    enemy: battle.into_enemy(),
                    round,
                });
                return Err(err.into());
            }
        };
        let state = battle.state();
        let result = battle.result();
        let round = battle.round();
        let enemy = battle.into_enemy();

        if state == BattleState::Active {
            self.encounter = Some(Encounter { enemy, round });
        }
        let aftermath = match &result {
            Some(result) => Some(self.apply_battle_result(result)?),
            None => None,
        };

        Ok(RoundReport {
            events,
            state,
            result,
            aftermath,
        })
    }

    // ========================================================================
    // Items
    // ========================================================================

    /// Items for sale, in id order.
    pub fn shop_items(&self) -> impl Iterator<Item = &Item> {
        self.catalog.iter()
    }

    /// Buy an item from the shop. Returns the price paid.
    pub fn buy(&mut self, item_id: &str) -> Result<u32, SessionError> {
        self.ensure_playing()?;
        let item = self.catalog.get_item(item_id)?;
        self.character.purchase_item(item)?;
        Ok(item.cost)
    }

    /// Sell an item to the shop. Returns the gold received.
    pub fn sell(&mut self, item_id: &str) -> Result<u32, SessionError> {
        self.ensure_playing()?;
        if !self.character.has_item(item_id) {
            return Err(GameError::ItemNotFound(item_id.to_string()).into());
        }
        let item = self.catalog.get_item(item_id)?;
        Ok(self.character.sell_item(item)?)
    }

    /// Use a consumable from the inventory.
    pub fn use_item(&mut self, item_id: &str) -> Result<Vec<StatDelta>, SessionError> {
        self.ensure_playing()?;
        if !self.character.has_item(item_id) {
            return Err(GameError::ItemNotFound(item_id.to_string()).into());
        }
        let item = self.catalog.get_item(item_id)?;
        Ok(self.character.use_item(item)?)
    }

    /// Equip a weapon or armor, picking the slot from the item type.
    ///
    /// Returns the id of the item it replaced.
    pub fn equip(&mut self, item_id: &str) -> Result<Option<String>, SessionError> {
        self.ensure_playing()?;
        if !self.character.has_item(item_id) {
            return Err(GameError::ItemNotFound(item_id.to_string()).into());
        }
        let item = self.catalog.get_item(item_id)?;
        let slot = EquipSlot::for_item_type(item.item_type).ok_or_else(|| {
            GameError::InvalidItemType {
                item_id: item.id.clone(),
                expected: "weapon or armor".to_string(),
                actual: item.item_type.name().to_string(),
            }
        })?;
        Ok(self.character.equip(slot, item_id, &self.catalog)?)
    }

    /// Unequip a slot. Returns the id of the removed item, if any.
    pub fn unequip(&mut self, slot: EquipSlot) -> Result<Option<String>, SessionError> {
        self.ensure_playing()?;
        Ok(self.character.unequip(slot, &self.catalog)?)
    }

    // ========================================================================
    // Quests
    // ========================================================================

    /// Accept a quest from the log.
    pub fn accept_quest(&mut self, quest_id: &str) -> Result<&Quest, SessionError> {
        self.ensure_playing()?;
        let quest = self.quests.get_quest(quest_id)?;
        self.character.accept_quest(quest)?;
        tracing::info!(quest = %quest.id, "quest accepted");
        Ok(quest)
    }

    /// Complete an active quest and collect its rewards.
    pub fn complete_quest(&mut self, quest_id: &str) -> Result<QuestReward, SessionError> {
        self.ensure_playing()?;
        let quest = self.quests.get_quest(quest_id)?;
        let reward = self.character.complete_quest(quest)?;
        tracing::info!(
            quest = %quest.id,
            xp = reward.xp,
            gold = reward.gold,
            level = self.character.level,
            "quest completed"
        );
        Ok(reward)
    }

    /// Abandon an active quest.
    pub fn abandon_quest(&mut self, quest_id: &str) -> Result<(), SessionError> {
        self.ensure_playing()?;
        self.character.abandon_quest(quest_id)?;
        tracing::info!(quest = quest_id, "quest abandoned");
        Ok(())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Save the character to the configured save directory.
    pub async fn save(&self) -> Result<PathBuf, SessionError> {
        self.save_to(&self.config.save_dir).await
    }

    /// Save the character to `dir`.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, SessionError> {
        let path = persist::save_character(dir, &self.character).await?;
        tracing::info!(path = %path.display(), character = %self.character.name, "game saved");
        Ok(path)
    }
}
