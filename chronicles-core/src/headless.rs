//! Headless game interface for programmatic use.
//!
//! This module runs the game as a line protocol: every input line is one
//! `#command`, and every reply is a list of tagged output lines such as
//! `[STATUS]` or `[ERROR]`. It's designed for:
//! - The `chronicles` command-line front end
//! - Script-driven game sessions
//! - Integration tests that play whole games
//!
//! # Example
//!
//! ```ignore
//! use chronicles_core::headless::{HeadlessConfig, HeadlessGame};
//! use chronicles_core::CharacterClass;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HeadlessConfig::custom("Thorin", CharacterClass::Warrior);
//!     let mut game = HeadlessGame::new(config).await?;
//!
//!     for line in game.execute("#explore").await.lines {
//!         println!("{line}");
//!     }
//!
//!     game.execute("#save").await;
//!     Ok(())
//! }
//! ```

use crate::combat::{BattleState, PlayerAction};
use crate::dice::{Dice, RandomDice};
use crate::inventory::{EquipSlot, MAX_INVENTORY_SIZE};
use crate::session::{Aftermath, GameSession, SessionConfig, SessionError};
use crate::world::{Character, CharacterClass};
use std::fmt;
use std::str::FromStr;

/// Configuration for a headless game session.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Character name, for a new character or the save to load.
    pub name: String,
    /// Class of a new character.
    pub class: CharacterClass,
    /// Resume the saved character called `name` instead of creating one.
    pub load: bool,
    /// Session settings.
    pub session: SessionConfig,
}

impl HeadlessConfig {
    /// Create a quick-start configuration with sensible defaults.
    ///
    /// Uses a new Warrior and the default session settings.
    pub fn quick_start(name: impl Into<String>) -> Self {
        Self::custom(name, CharacterClass::Warrior)
    }

    /// Create a new character of the given class.
    pub fn custom(name: impl Into<String>, class: CharacterClass) -> Self {
        Self {
            name: name.into(),
            class,
            load: false,
            session: SessionConfig::new(),
        }
    }

    /// Resume the saved character called `name`.
    pub fn resume(name: impl Into<String>) -> Self {
        Self {
            load: true,
            ..Self::quick_start(name)
        }
    }

    /// Set the session settings.
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }
}

// ============================================================================
// Commands
// ============================================================================

/// One protocol command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Inventory,
    Explore,
    Fight,
    Attack,
    Ability,
    Run,
    Buy(String),
    Sell(String),
    Use(String),
    Equip(String),
    Unequip(EquipSlot),
    Shop,
    Quests,
    Accept(String),
    Complete(String),
    Abandon(String),
    Save,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        let mut parts = s.split_whitespace();
        let name = parts.next().unwrap_or("").to_lowercase();
        let arg = parts.next();

        let need_arg = |usage: &str| {
            arg.map(str::to_string)
                .ok_or_else(|| format!("Usage: {usage}"))
        };

        match name.as_str() {
            "status" => Ok(Command::Status),
            "inventory" | "inv" => Ok(Command::Inventory),
            "explore" => Ok(Command::Explore),
            "fight" => Ok(Command::Fight),
            "attack" => Ok(Command::Attack),
            "ability" | "special" => Ok(Command::Ability),
            "run" | "escape" => Ok(Command::Run),
            "buy" => need_arg("#buy <item_id>").map(Command::Buy),
            "sell" => need_arg("#sell <item_id>").map(Command::Sell),
            "use" => need_arg("#use <item_id>").map(Command::Use),
            "equip" => need_arg("#equip <item_id>").map(Command::Equip),
            "unequip" => {
                let slot = need_arg("#unequip weapon|armor")?;
                slot.parse().map(Command::Unequip)
            }
            "shop" => Ok(Command::Shop),
            "quests" => Ok(Command::Quests),
            "accept" => need_arg("#accept <quest_id>").map(Command::Accept),
            "complete" => need_arg("#complete <quest_id>").map(Command::Complete),
            "abandon" => need_arg("#abandon <quest_id>").map(Command::Abandon),
            "save" => Ok(Command::Save),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "" => Err("Empty command. Type #help for help.".to_string()),
            other => Err(format!("Unknown command '#{other}'. Type #help for help.")),
        }
    }
}

const HELP: &[&str] = &[
    "  #status            - Show character status",
    "  #inventory         - List carried and equipped items",
    "  #explore           - Fight a level-appropriate enemy automatically",
    "  #fight             - Start an interactive fight",
    "  #attack            - Basic attack (in a fight)",
    "  #ability           - Use your class ability (in a fight)",
    "  #run               - Try to escape (in a fight)",
    "  #shop              - List items for sale",
    "  #buy <item_id>     - Buy an item",
    "  #sell <item_id>    - Sell an item for half its cost",
    "  #use <item_id>     - Use a consumable",
    "  #equip <item_id>   - Equip a weapon or armor",
    "  #unequip weapon|armor",
    "  #quests            - List active and available quests",
    "  #accept <quest_id> - Accept a quest",
    "  #complete <quest_id> - Turn in an active quest",
    "  #abandon <quest_id> - Give up an active quest",
    "  #save              - Save your character",
    "  #help              - Show this help",
    "  #quit              - Exit the game",
];

/// Output of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    /// The front end should stop reading input.
    pub quit: bool,
}

impl Reply {
    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn error(err: impl fmt::Display) -> Self {
        Self {
            lines: vec![format!("[ERROR] {err}")],
            quit: false,
        }
    }
}

// ============================================================================
// Game
// ============================================================================

/// A headless game session.
pub struct HeadlessGame<D: Dice = RandomDice> {
    session: GameSession<D>,
    commands: usize,
}

impl HeadlessGame<RandomDice> {
    /// Create or resume a game with the given configuration.
    pub async fn new(config: HeadlessConfig) -> Result<Self, SessionError> {
        let session = if config.load {
            GameSession::load(&config.name, config.session).await?
        } else {
            GameSession::new(Character::new(&config.name, config.class), config.session).await?
        };
        Ok(Self::from_session(session))
    }
}

impl<D: Dice> HeadlessGame<D> {
    /// Wrap an existing session.
    pub fn from_session(session: GameSession<D>) -> Self {
        Self {
            session,
            commands: 0,
        }
    }

    pub fn session(&self) -> &GameSession<D> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession<D> {
        &mut self.session
    }

    /// Number of commands executed so far.
    pub fn command_count(&self) -> usize {
        self.commands
    }

    /// Lines shown when the game starts.
    pub fn banner(&mut self) -> Vec<String> {
        let mut reply = Reply::default();
        reply.line("=== Quest Chronicles ===");
        self.status(&mut reply);

        // A character saved while dead has to settle up before playing.
        if self.session.character().is_dead() {
            let aftermath = self.session.handle_death();
            self.aftermath(&mut reply, aftermath);
        }
        reply.line("Type #help for commands.");
        reply.lines
    }

    /// Parse and run one input line. Errors become `[ERROR]` lines.
    pub async fn execute(&mut self, line: &str) -> Reply {
        self.commands += 1;
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => return Reply::error(err),
        };
        tracing::debug!(?command, "command");

        let mut reply = Reply::default();
        if let Err(err) = self.run(command, &mut reply).await {
            reply.lines.push(format!("[ERROR] {err}"));
        }
        if self.session.is_over() {
            reply.quit = true;
        }
        reply
    }

    async fn run(&mut self, command: Command, reply: &mut Reply) -> Result<(), SessionError> {
        match command {
            Command::Status => self.status(reply),
            Command::Inventory => self.inventory(reply),
            Command::Shop => self.shop(reply),
            Command::Quests => self.quests(reply),
            Command::Accept(id) => {
                let quest = self.session.accept_quest(&id)?;
                reply.line(format!("[QUEST] Accepted {}: {}", quest.title, quest.description));
            }
            Command::Complete(id) => {
                let reward = self.session.complete_quest(&id)?;
                reply.line(format!(
                    "[QUEST] Completed {id}! Gained {} experience and {} gold.",
                    reward.xp, reward.gold
                ));
                if reward.levels_gained > 0 {
                    reply.line(format!(
                        "[LEVEL UP] You are now level {}!",
                        self.session.character().level
                    ));
                }
            }
            Command::Abandon(id) => {
                self.session.abandon_quest(&id)?;
                reply.line(format!("[QUEST] Abandoned {id}."));
            }
            Command::Help => {
                reply.line("[HELP]");
                reply.lines.extend(HELP.iter().map(|l| l.to_string()));
            }
            Command::Quit => {
                reply.line("Goodbye!");
                reply.quit = true;
            }
            Command::Save => {
                let path = self.session.save().await?;
                reply.line(format!("[SAVED] {}", path.display()));
            }
            Command::Explore => {
                let outcome = self.session.explore()?;
                reply.line(format!(
                    "[COMBAT] A level {} {} appears!",
                    outcome.enemy.level, outcome.enemy.name
                ));
                self.aftermath(reply, outcome.aftermath);
            }
            Command::Fight => {
                let enemy = self.session.start_encounter()?;
                reply.line(format!(
                    "[COMBAT] A level {} {} appears! ({} health)",
                    enemy.level, enemy.name, enemy.health
                ));
                reply.line("#attack, #ability or #run?");
            }
            Command::Attack => self.round(PlayerAction::Attack, reply)?,
            Command::Ability => self.round(PlayerAction::SpecialAbility, reply)?,
            Command::Run => self.round(PlayerAction::Escape, reply)?,
            Command::Buy(id) => {
                let cost = self.session.buy(&id)?;
                reply.line(format!(
                    "[SHOP] Bought {id} for {cost} gold. {} gold left.",
                    self.session.character().gold
                ));
            }
            Command::Sell(id) => {
                let price = self.session.sell(&id)?;
                reply.line(format!(
                    "[SHOP] Sold {id} for {price} gold. {} gold now.",
                    self.session.character().gold
                ));
            }
            Command::Use(id) => {
                let applied = self.session.use_item(&id)?;
                let effects: Vec<String> = applied.iter().map(ToString::to_string).collect();
                if effects.is_empty() {
                    reply.line(format!("[ITEM] Used {id}. Nothing happens."));
                } else {
                    reply.line(format!("[ITEM] Used {id}: {}", effects.join(", ")));
                }
            }
            Command::Equip(id) => {
                match self.session.equip(&id)? {
                    Some(old) => reply.line(format!("[ITEM] Equipped {id}, unequipped {old}.")),
                    None => reply.line(format!("[ITEM] Equipped {id}.")),
                }
            }
            Command::Unequip(slot) => match self.session.unequip(slot)? {
                Some(id) => reply.line(format!("[ITEM] Unequipped {id}.")),
                None => reply.line(format!("[ITEM] No {slot} equipped.")),
            },
        }
        Ok(())
    }

    fn round(&mut self, action: PlayerAction, reply: &mut Reply) -> Result<(), SessionError> {
        let report = self.session.encounter_round(action)?;
        for event in &report.events {
            reply.line(format!("[COMBAT] {event}"));
        }
        match report.state {
            BattleState::Active => {
                let health = self.session.character().health;
                let enemy_health = self.session.encounter().map(|e| e.health).unwrap_or(0);
                reply.line(format!(
                    "[COMBAT] You: {health} health, enemy: {enemy_health} health"
                ));
            }
            BattleState::Escaped => reply.line("[COMBAT] The fight is over."),
            BattleState::PlayerWon | BattleState::EnemyWon => {}
        }
        if let Some(aftermath) = report.aftermath {
            self.aftermath(reply, aftermath);
        }
        Ok(())
    }

    fn aftermath(&self, reply: &mut Reply, aftermath: Aftermath) {
        let character = self.session.character();
        match aftermath {
            Aftermath::Victory {
                xp_gained,
                gold_gained,
                levels_gained,
            } => {
                reply.line(format!(
                    "[VICTORY] Gained {xp_gained} experience and {gold_gained} gold."
                ));
                if levels_gained > 0 {
                    reply.line(format!("[LEVEL UP] You are now level {}!", character.level));
                }
            }
            Aftermath::Revived { cost, health } => {
                reply.line(format!(
                    "[DEFEAT] You were defeated. Paid {cost} gold to revive with {health} health."
                ));
            }
            Aftermath::GameOver => {
                reply.line("[GAME OVER] You were defeated and cannot afford to revive.");
            }
        }
    }

    fn status(&self, reply: &mut Reply) {
        let c = self.session.character();
        reply.line("[STATUS]");
        reply.line(format!("  Character: {} ({})", c.name, c.class));
        reply.line(format!(
            "  Level: {} ({}/{} experience)",
            c.level,
            c.experience,
            c.experience_to_next_level()
        ));
        reply.line(format!("  Health: {}/{}", c.health, c.max_health));
        reply.line(format!("  Strength: {}  Magic: {}", c.strength, c.magic));
        for (stat, value) in &c.bonus_stats {
            reply.line(format!("  {stat}: {value}"));
        }
        reply.line(format!("  Gold: {}", c.gold));
        if let Some(ability) = c.special_ability {
            reply.line(format!("  Ability: {ability}"));
        }
        if let Some(enemy) = self.session.encounter() {
            reply.line(format!(
                "  In combat with {} ({} health)",
                enemy.name, enemy.health
            ));
        }
    }

    fn inventory(&self, reply: &mut Reply) {
        let c = self.session.character();
        reply.line(format!(
            "[INVENTORY] {}/{MAX_INVENTORY_SIZE}",
            c.inventory.len()
        ));
        for id in c.inventory.iter() {
            let name = self
                .session
                .catalog()
                .get(id)
                .map(|item| item.name.as_str())
                .unwrap_or(id);
            reply.line(format!("  {id} ({name})"));
        }
        for slot in [EquipSlot::Weapon, EquipSlot::Armor] {
            reply.line(format!(
                "  {slot}: {}",
                c.equipped(slot).unwrap_or("(none)")
            ));
        }
    }

    fn quests(&self, reply: &mut Reply) {
        let c = self.session.character();
        let log = self.session.quests();
        reply.line(format!(
            "[QUEST] {}/{} completed ({}%)",
            log.completed_quests(c).count(),
            log.len(),
            log.completion_percentage(c)
        ));
        for quest in log.active_quests(c) {
            reply.line(format!("  active: {} - {}", quest.id, quest.title));
        }
        for quest in log.available_quests(c) {
            reply.line(format!(
                "  available: {} - {} ({} xp, {} gold)",
                quest.id, quest.title, quest.reward_xp, quest.reward_gold
            ));
        }
    }

    fn shop(&self, reply: &mut Reply) {
        reply.line(format!(
            "[SHOP] You have {} gold.",
            self.session.character().gold
        ));
        for item in self.session.shop_items() {
            let effect = if item.effect.is_empty() {
                "no effect"
            } else {
                item.effect.as_str()
            };
            reply.line(format!(
                "  {} - {} ({}, {effect}) {} gold",
                item.id, item.name, item.item_type, item.cost
            ));
        }
    }
}
