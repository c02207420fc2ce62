//! Quests: the quest log and quest progress on a character.
//!
//! The [`QuestLog`] is read-only reference data, loaded like the item
//! catalog. Progress lives on the character as the `active_quests` and
//! `completed_quests` id lists.
//!
//! # File format
//!
//! ```text
//! QUEST_ID: first_steps
//! TITLE: First Steps
//! DESCRIPTION: Complete your first adventure
//! REWARD_XP: 25
//! REWARD_GOLD: 15
//! REQUIRED_LEVEL: 1
//! PREREQUISITE: NONE
//! ```

use crate::error::GameError;
use crate::world::Character;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Written in data files for a quest without a prerequisite.
const NO_PREREQUISITE: &str = "NONE";

/// Errors from quest operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestError {
    #[error("Quest '{0}' not found")]
    NotFound(String),

    #[error("Quest '{quest}' requires level {required} (you are level {current})")]
    InsufficientLevel {
        quest: String,
        required: u32,
        current: u32,
    },

    #[error("Quest '{quest}' requires completing '{prerequisite}' first")]
    PrerequisiteNotMet { quest: String, prerequisite: String },

    #[error("Quest '{0}' already completed")]
    AlreadyCompleted(String),

    #[error("Quest '{0}' already active")]
    AlreadyActive(String),

    #[error("Quest '{0}' is not active")]
    NotActive(String),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Errors from loading quest data.
#[derive(Debug, Error)]
pub enum QuestDataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Quest data file not found: {0}")]
    MissingFile(String),

    #[error("Invalid quest data (block {block}): {reason}")]
    InvalidFormat { block: usize, reason: String },
}

// ============================================================================
// Quests
// ============================================================================

/// A quest definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reward_xp: u32,
    pub reward_gold: u32,
    pub required_level: u32,
    pub prerequisite: Option<String>,
}

impl Quest {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            reward_xp: 0,
            reward_gold: 0,
            required_level: 1,
            prerequisite: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_rewards(mut self, xp: u32, gold: u32) -> Self {
        self.reward_xp = xp;
        self.reward_gold = gold;
        self
    }

    pub fn with_required_level(mut self, level: u32) -> Self {
        self.required_level = level;
        self
    }

    pub fn with_prerequisite(mut self, quest_id: impl Into<String>) -> Self {
        self.prerequisite = Some(quest_id.into());
        self
    }
}

/// Rewards granted by completing quests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestReward {
    pub xp: u32,
    pub gold: u32,
    pub levels_gained: u32,
}

// ============================================================================
// Character quest progress
// ============================================================================

impl Character {
    pub fn is_quest_active(&self, quest_id: &str) -> bool {
        self.active_quests.iter().any(|q| q == quest_id)
    }

    pub fn is_quest_completed(&self, quest_id: &str) -> bool {
        self.completed_quests.iter().any(|q| q == quest_id)
    }

    /// Why `quest` cannot be accepted right now, if anything.
    fn check_can_accept(&self, quest: &Quest) -> Result<(), QuestError> {
        if self.level < quest.required_level {
            return Err(QuestError::InsufficientLevel {
                quest: quest.id.clone(),
                required: quest.required_level,
                current: self.level,
            });
        }
        if let Some(prerequisite) = &quest.prerequisite {
            if !self.is_quest_completed(prerequisite) {
                return Err(QuestError::PrerequisiteNotMet {
                    quest: quest.id.clone(),
                    prerequisite: prerequisite.clone(),
                });
            }
        }
        if self.is_quest_completed(&quest.id) {
            return Err(QuestError::AlreadyCompleted(quest.id.clone()));
        }
        if self.is_quest_active(&quest.id) {
            return Err(QuestError::AlreadyActive(quest.id.clone()));
        }
        Ok(())
    }

    pub fn can_accept_quest(&self, quest: &Quest) -> bool {
        self.check_can_accept(quest).is_ok()
    }

    /// Add a quest to the active list.
    ///
    /// Checks the level requirement, then the prerequisite, then that the
    /// quest is neither completed nor already active.
    pub fn accept_quest(&mut self, quest: &Quest) -> Result<(), QuestError> {
        self.check_can_accept(quest)?;
        self.active_quests.push(quest.id.clone());
        tracing::debug!(character = %self.name, quest = %quest.id, "quest accepted");
        Ok(())
    }

    /// Finish an active quest and collect its rewards.
    ///
    /// Experience goes through the normal level-up path.
    pub fn complete_quest(&mut self, quest: &Quest) -> Result<QuestReward, QuestError> {
        let position = self
            .active_quests
            .iter()
            .position(|q| *q == quest.id)
            .ok_or_else(|| QuestError::NotActive(quest.id.clone()))?;
        if self.is_dead() {
            return Err(GameError::CharacterDead(self.name.clone()).into());
        }

        self.active_quests.remove(position);
        self.completed_quests.push(quest.id.clone());
        let levels_gained = self.gain_experience(quest.reward_xp)?;
        self.add_gold(i64::from(quest.reward_gold))?;

        tracing::debug!(
            character = %self.name,
            quest = %quest.id,
            xp = quest.reward_xp,
            gold = quest.reward_gold,
            "quest completed"
        );
        Ok(QuestReward {
            xp: quest.reward_xp,
            gold: quest.reward_gold,
            levels_gained,
        })
    }

    /// Drop an active quest without rewards.
    pub fn abandon_quest(&mut self, quest_id: &str) -> Result<(), QuestError> {
        let position = self
            .active_quests
            .iter()
            .position(|q| q == quest_id)
            .ok_or_else(|| QuestError::NotActive(quest_id.to_string()))?;
        self.active_quests.remove(position);
        Ok(())
    }
}

// ============================================================================
// Quest log
// ============================================================================

/// Read-only mapping from quest id to quest definition.
#[derive(Debug, Clone, Default)]
pub struct QuestLog {
    quests: BTreeMap<String, Quest>,
}

impl QuestLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from quests. Later duplicates replace earlier ones.
    pub fn from_quests(quests: impl IntoIterator<Item = Quest>) -> Self {
        let mut log = Self::new();
        for quest in quests {
            log.insert(quest);
        }
        log
    }

    /// The built-in quests used when no data file is configured.
    pub fn default_quests() -> Self {
        Self::from_quests(DEFAULT_QUESTS.iter().cloned())
    }

    pub fn insert(&mut self, quest: Quest) {
        self.quests.insert(quest.id.clone(), quest);
    }

    pub fn get(&self, quest_id: &str) -> Option<&Quest> {
        self.quests.get(quest_id)
    }

    /// Look up a quest, failing with `NotFound` for unknown ids.
    pub fn get_quest(&self, quest_id: &str) -> Result<&Quest, QuestError> {
        self.get(quest_id)
            .ok_or_else(|| QuestError::NotFound(quest_id.to_string()))
    }

    pub fn contains(&self, quest_id: &str) -> bool {
        self.quests.contains_key(quest_id)
    }

    /// Quests in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    /// The character's active quests, in acceptance order.
    ///
    /// Ids missing from the log are skipped.
    pub fn active_quests<'a>(&'a self, character: &'a Character) -> impl Iterator<Item = &'a Quest> {
        character.active_quests.iter().filter_map(|id| self.get(id))
    }

    /// The character's completed quests, in completion order.
    pub fn completed_quests<'a>(
        &'a self,
        character: &'a Character,
    ) -> impl Iterator<Item = &'a Quest> {
        character.completed_quests.iter().filter_map(|id| self.get(id))
    }

    /// Quests the character could accept right now.
    pub fn available_quests<'a>(
        &'a self,
        character: &'a Character,
    ) -> impl Iterator<Item = &'a Quest> {
        self.iter().filter(|quest| character.can_accept_quest(quest))
    }

    /// Quests whose required level lies in `min..=max`.
    pub fn quests_by_level(&self, min: u32, max: u32) -> impl Iterator<Item = &Quest> {
        self.iter()
            .filter(move |quest| (min..=max).contains(&quest.required_level))
    }

    /// Share of all quests the character has completed, from 0 to 100.
    pub fn completion_percentage(&self, character: &Character) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let done = self.completed_quests(character).count();
        let percentage = done as f64 / self.len() as f64 * 100.0;
        (percentage * 100.0).round() / 100.0
    }

    /// Experience and gold earned from the character's completed quests.
    pub fn total_rewards_earned(&self, character: &Character) -> QuestReward {
        self.completed_quests(character)
            .fold(QuestReward::default(), |total, quest| QuestReward {
                xp: total.xp.saturating_add(quest.reward_xp),
                gold: total.gold.saturating_add(quest.reward_gold),
                levels_gained: 0,
            })
    }

    /// Parse the block text format.
    ///
    /// Every field is required. A prerequisite must name a quest in the
    /// same data.
    pub fn parse(text: &str) -> Result<Self, QuestDataError> {
        let mut log = Self::new();
        let mut block: Vec<&str> = Vec::new();
        let mut block_index = 0;

        for line in text.lines().chain(std::iter::once("")) {
            let line = line.trim();
            if line.is_empty() {
                if !block.is_empty() {
                    block_index += 1;
                    let quest = parse_quest_block(&block).map_err(|reason| {
                        QuestDataError::InvalidFormat {
                            block: block_index,
                            reason,
                        }
                    })?;
                    if log.contains(&quest.id) {
                        tracing::warn!(quest_id = %quest.id, "duplicate quest id, keeping the later entry");
                    }
                    log.insert(quest);
                    block.clear();
                }
                continue;
            }
            block.push(line);
        }

        log.validate_prerequisites()?;
        Ok(log)
    }

    fn validate_prerequisites(&self) -> Result<(), QuestDataError> {
        for (index, quest) in self.iter().enumerate() {
            if let Some(prerequisite) = &quest.prerequisite {
                if !self.contains(prerequisite) {
                    return Err(QuestDataError::InvalidFormat {
                        block: index + 1,
                        reason: format!(
                            "prerequisite '{prerequisite}' of '{}' does not exist",
                            quest.id
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Render the log in the block text format accepted by [`QuestLog::parse`].
    pub fn to_text(&self) -> String {
        self.iter()
            .map(|quest| {
                format!(
                    "QUEST_ID: {}\nTITLE: {}\nDESCRIPTION: {}\nREWARD_XP: {}\nREWARD_GOLD: {}\nREQUIRED_LEVEL: {}\nPREREQUISITE: {}\n",
                    quest.id,
                    quest.title,
                    quest.description,
                    quest.reward_xp,
                    quest.reward_gold,
                    quest.required_level,
                    quest.prerequisite.as_deref().unwrap_or(NO_PREREQUISITE)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Load quests from a data file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, QuestDataError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(QuestDataError::MissingFile(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let log = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), quests = log.len(), "loaded quest log");
        Ok(log)
    }

    /// Load quests, writing the defaults to `path` first if it is missing.
    pub async fn load_or_create(path: impl AsRef<Path>) -> Result<Self, QuestDataError> {
        let path = path.as_ref();
        match Self::load(path).await {
            Err(QuestDataError::MissingFile(_)) => {
                let defaults = Self::default_quests();
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).await?;
                    }
                }
                fs::write(path, defaults.to_text()).await?;
                tracing::info!(path = %path.display(), "created default quest data file");
                Ok(defaults)
            }
            other => other,
        }
    }
}

fn parse_quest_block(lines: &[&str]) -> Result<Quest, String> {
    let mut fields: BTreeMap<String, String> = BTreeMap::new();

    for line in lines {
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| format!("line '{line}' is not KEY: value"))?;
        let key = key.trim().to_lowercase();
        match key.as_str() {
            "quest_id" | "title" | "description" | "reward_xp" | "reward_gold"
            | "required_level" | "prerequisite" => {
                fields.insert(key, value.trim().to_string());
            }
            _ => return Err(format!("unknown quest field '{key}'")),
        }
    }

    let mut take = |key: &str| {
        fields
            .remove(key)
            .ok_or_else(|| format!("missing quest field '{key}'"))
    };

    let id = take("quest_id")?;
    let title = take("title")?;
    let description = take("description")?;
    let number = |field: &str, value: String| {
        value
            .parse::<u32>()
            .map_err(|_| format!("{field} of '{id}' must be a non-negative integer"))
    };
    let reward_xp = number("reward_xp", take("reward_xp")?)?;
    let reward_gold = number("reward_gold", take("reward_gold")?)?;
    let required_level = number("required_level", take("required_level")?)?;
    let prerequisite = take("prerequisite")?;

    Ok(Quest {
        title,
        description,
        reward_xp,
        reward_gold,
        required_level,
        prerequisite: match prerequisite.as_str() {
            "" | NO_PREREQUISITE => None,
            _ => Some(prerequisite),
        },
        id,
    })
}

// ============================================================================
// Default quests
// ============================================================================

lazy_static::lazy_static! {
    /// Quests available when no data file is configured.
    pub static ref DEFAULT_QUESTS: Vec<Quest> = vec![
        Quest::new("first_steps", "First Steps")
            .with_description("Complete your first adventure")
            .with_rewards(25, 15),
        Quest::new("goblin_menace", "Goblin Menace")
            .with_description("Drive the goblins out of the old mill")
            .with_rewards(50, 25)
            .with_prerequisite("first_steps"),
        Quest::new("orc_warband", "Orc Warband")
            .with_description("Break the warband camped on the ridge")
            .with_rewards(150, 60)
            .with_required_level(3)
            .with_prerequisite("goblin_menace"),
        Quest::new("dragon_lair", "The Dragon's Lair")
            .with_description("Face the dragon beneath the mountain")
            .with_rewards(500, 250)
            .with_required_level(6)
            .with_prerequisite("orc_warband"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::CharacterClass;

    const SAMPLE: &str = "\
QUEST_ID: first_steps
TITLE: First Steps
DESCRIPTION: Complete your first adventure
REWARD_XP: 25
REWARD_GOLD: 15
REQUIRED_LEVEL: 1
PREREQUISITE: NONE

QUEST_ID: test_quest
TITLE: Test Quest
DESCRIPTION: A test quest
REWARD_XP: 50
REWARD_GOLD: 25
REQUIRED_LEVEL: 2
PREREQUISITE: first_steps
";

    fn hero() -> Character {
        Character::new("Hero", CharacterClass::Warrior)
    }

    #[test]
    fn test_parse_quests() {
        let log = QuestLog::parse(SAMPLE).unwrap();
        assert_eq!(log.len(), 2);

        let quest = log.get_quest("test_quest").unwrap();
        assert_eq!(quest.title, "Test Quest");
        assert_eq!((quest.reward_xp, quest.reward_gold), (50, 25));
        assert_eq!(quest.required_level, 2);
        assert_eq!(quest.prerequisite.as_deref(), Some("first_steps"));
        assert_eq!(log.get_quest("first_steps").unwrap().prerequisite, None);
    }

    #[test]
    fn test_parse_rejects_bad_blocks() {
        let missing = "QUEST_ID: a\nTITLE: A\n";
        assert!(matches!(
            QuestLog::parse(missing),
            Err(QuestDataError::InvalidFormat { block: 1, .. })
        ));

        let bad_number = SAMPLE.replace("REWARD_XP: 50", "REWARD_XP: lots");
        assert!(matches!(
            QuestLog::parse(&bad_number),
            Err(QuestDataError::InvalidFormat { block: 2, .. })
        ));

        let unknown_field = SAMPLE.replace("TITLE: Test Quest", "BOSS: Test Quest");
        assert!(QuestLog::parse(&unknown_field).is_err());

        let dangling = SAMPLE.replace("PREREQUISITE: first_steps", "PREREQUISITE: nowhere");
        assert!(QuestLog::parse(&dangling).is_err());
    }

    #[test]
    fn test_default_quests_text_parses_back() {
        let defaults = QuestLog::default_quests();
        let parsed = QuestLog::parse(&defaults.to_text()).unwrap();
        assert_eq!(parsed.len(), defaults.len());
        for quest in defaults.iter() {
            assert_eq!(parsed.get(&quest.id), Some(quest));
        }
    }

    #[test]
    fn test_accept_checks_in_order() {
        let log = QuestLog::parse(SAMPLE).unwrap();
        let first = log.get_quest("first_steps").unwrap();
        let second = log.get_quest("test_quest").unwrap();
        let mut hero = hero();

        assert_eq!(
            hero.accept_quest(second),
            Err(QuestError::InsufficientLevel {
                quest: "test_quest".to_string(),
                required: 2,
                current: 1,
            })
        );
        hero.level = 2;
        assert_eq!(
            hero.accept_quest(second),
            Err(QuestError::PrerequisiteNotMet {
                quest: "test_quest".to_string(),
                prerequisite: "first_steps".to_string(),
            })
        );

        hero.accept_quest(first).unwrap();
        assert_eq!(
            hero.accept_quest(first),
            Err(QuestError::AlreadyActive("first_steps".to_string()))
        );
        hero.complete_quest(first).unwrap();
        assert_eq!(
            hero.accept_quest(first),
            Err(QuestError::AlreadyCompleted("first_steps".to_string()))
        );
        hero.accept_quest(second).unwrap();
        assert_eq!(hero.active_quests, vec!["test_quest"]);
    }

    #[test]
    fn test_complete_grants_rewards_through_progression() {
        let quest = Quest::new("big", "Big Job").with_rewards(250, 40);
        let mut hero = hero();
        hero.health = 30;
        hero.accept_quest(&quest).unwrap();

        let reward = hero.complete_quest(&quest).unwrap();
        assert_eq!(
            reward,
            QuestReward {
                xp: 250,
                gold: 40,
                levels_gained: 1,
            }
        );
        assert_eq!((hero.level, hero.experience), (2, 150));
        assert_eq!(hero.gold, 140);
        assert_eq!(hero.health, hero.max_health);
        assert!(hero.active_quests.is_empty());
        assert_eq!(hero.completed_quests, vec!["big"]);
    }

    #[test]
    fn test_complete_requires_active_and_alive() {
        let quest = Quest::new("errand", "Errand").with_rewards(10, 5);
        let mut hero = hero();
        assert_eq!(
            hero.complete_quest(&quest),
            Err(QuestError::NotActive("errand".to_string()))
        );

        hero.accept_quest(&quest).unwrap();
        hero.health = 0;
        assert!(matches!(
            hero.complete_quest(&quest),
            Err(QuestError::Game(GameError::CharacterDead(_)))
        ));
        assert!(hero.is_quest_active("errand"));
        assert_eq!(hero.gold, 100);
    }

    #[test]
    fn test_abandon() {
        let quest = Quest::new("errand", "Errand");
        let mut hero = hero();
        assert_eq!(
            hero.abandon_quest("errand"),
            Err(QuestError::NotActive("errand".to_string()))
        );
        hero.accept_quest(&quest).unwrap();
        hero.abandon_quest("errand").unwrap();
        assert!(!hero.is_quest_active("errand"));
        assert!(hero.can_accept_quest(&quest));
    }

    #[test]
    fn test_log_queries() {
        let log = QuestLog::default_quests();
        let mut hero = hero();

        let available: Vec<&str> = log.available_quests(&hero).map(|q| q.id.as_str()).collect();
        assert_eq!(available, ["first_steps"]);

        let first = log.get_quest("first_steps").unwrap().clone();
        hero.accept_quest(&first).unwrap();
        assert_eq!(log.active_quests(&hero).count(), 1);
        assert_eq!(log.available_quests(&hero).count(), 0);

        hero.complete_quest(&first).unwrap();
        let available: Vec<&str> = log.available_quests(&hero).map(|q| q.id.as_str()).collect();
        assert_eq!(available, ["goblin_menace"]);
        assert_eq!(log.completion_percentage(&hero), 25.0);
        assert_eq!(
            log.total_rewards_earned(&hero),
            QuestReward {
                xp: 25,
                gold: 15,
                levels_gained: 0,
            }
        );

        let mid: Vec<&str> = log.quests_by_level(2, 5).map(|q| q.id.as_str()).collect();
        assert_eq!(mid, ["orc_warband"]);
        assert_eq!(QuestLog::new().completion_percentage(&hero), 0.0);
    }
}
