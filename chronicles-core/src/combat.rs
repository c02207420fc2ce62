//! Turn-based battle between one character and one enemy.
//!
//! A [`Battle`] borrows the character mutably for its whole lifetime, so
//! damage and healing land on the real record. Rewards are only reported
//! through [`BattleResult`]; applying them is the caller's job.

use crate::dice::Dice;
use crate::error::GameError;
use crate::world::{Character, Enemy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Health restored by the Cleric's Heal ability.
pub const HEAL_ABILITY_AMOUNT: u32 = 30;

// ============================================================================
// Combatants and damage
// ============================================================================

/// Anything that can trade blows in a battle.
pub trait Combatant {
    fn name(&self) -> &str;
    fn health(&self) -> i32;
    fn max_health(&self) -> i32;
    fn strength(&self) -> i32;
    fn magic(&self) -> i32;
    fn set_health(&mut self, health: i32);

    fn is_defeated(&self) -> bool {
        self.health() <= 0
    }
}

impl Combatant for Character {
    fn name(&self) -> &str {
        &self.name
    }

    fn health(&self) -> i32 {
        self.health
    }

    fn max_health(&self) -> i32 {
        self.max_health
    }

    fn strength(&self) -> i32 {
        self.strength
    }

    fn magic(&self) -> i32 {
        self.magic
    }

    fn set_health(&mut self, health: i32) {
        self.health = health;
    }
}

impl Combatant for Enemy {
    fn name(&self) -> &str {
        &self.name
    }

    fn health(&self) -> i32 {
        self.health
    }

    fn max_health(&self) -> i32 {
        self.max_health
    }

    fn strength(&self) -> i32 {
        self.strength
    }

    fn magic(&self) -> i32 {
        self.magic
    }

    fn set_health(&mut self, health: i32) {
        self.health = health;
    }
}

/// Basic attack damage: `max(1, attacker.strength - defender.strength / 4)`.
pub fn calculate_damage(attacker: &impl Combatant, defender: &impl Combatant) -> i32 {
    attacker
        .strength()
        .saturating_sub(defender.strength() / 4)
        .max(1)
}

/// Subtract damage, keeping health within `[0, max_health]`. Returns the
/// remaining health.
pub fn apply_damage(target: &mut impl Combatant, damage: i32) -> i32 {
    let remaining = target
        .health()
        .saturating_sub(damage)
        .clamp(0, target.max_health().max(0));
    target.set_health(remaining);
    remaining
}

// ============================================================================
// Special abilities
// ============================================================================

/// Class-bound battle ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialAbility {
    /// Double strength damage.
    PowerStrike,
    /// Double magic damage.
    Fireball,
    /// Coin flip between triple and plain strength damage.
    CriticalStrike,
    /// Restore health to the user.
    Heal,
}

impl SpecialAbility {
    pub fn name(&self) -> &'static str {
        match self {
            SpecialAbility::PowerStrike => "Power Strike",
            SpecialAbility::Fireball => "Fireball",
            SpecialAbility::CriticalStrike => "Critical Strike",
            SpecialAbility::Heal => "Heal",
        }
    }
}

impl fmt::Display for SpecialAbility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Battle state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleState {
    Active,
    PlayerWon,
    EnemyWon,
    /// The player got away. There is no winner and no result.
    Escaped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player,
    Enemy,
}

/// Outcome of a finished battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub winner: Winner,
    pub xp_gained: u32,
    pub gold_gained: u32,
}

/// What the player does on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Attack,
    SpecialAbility,
    Escape,
}

/// Something that happened during a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleEvent {
    Attack {
        attacker: String,
        defender: String,
        damage: i32,
        remaining: i32,
    },
    AbilityDamage {
        ability: SpecialAbility,
        attacker: String,
        defender: String,
        damage: i32,
        remaining: i32,
        critical: bool,
    },
    Healed {
        name: String,
        amount: u32,
    },
    Escaped,
    EscapeFailed,
    Defeated {
        name: String,
    },
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleEvent::Attack {
                attacker,
                defender,
                damage,
                remaining,
            } => write!(
                f,
                "{attacker} attacks {defender} for {damage} damage ({remaining} health left)"
            ),
            BattleEvent::AbilityDamage {
                ability,
                attacker,
                defender,
                damage,
                remaining,
                critical,
            } => {
                if *critical {
                    write!(f, "Critical hit! ")?;
                }
                write!(
                    f,
                    "{attacker} uses {ability} on {defender} for {damage} damage ({remaining} health left)"
                )
            }
            BattleEvent::Healed { name, amount } => {
                write!(f, "{name} heals for {amount} health")
            }
            BattleEvent::Escaped => write!(f, "You escaped!"),
            BattleEvent::EscapeFailed => write!(f, "You failed to escape!"),
            BattleEvent::Defeated { name } => write!(f, "{name} is defeated!"),
        }
    }
}

// ============================================================================
// Battle
// ============================================================================

/// A battle in progress.
pub struct Battle<'c, D: Dice> {
    character: &'c mut Character,
    enemy: Enemy,
    state: BattleState,
    round: u32,
    dice: D,
}

impl<'c, D: Dice> Battle<'c, D> {
    /// Start a battle. A dead character cannot fight.
    pub fn new(character: &'c mut Character, enemy: Enemy, dice: D) -> Result<Self, GameError> {
        if character.is_dead() {
            return Err(GameError::CharacterDead(character.name.clone()));
        }
        tracing::debug!(
            character = %character.name,
            enemy = %enemy.name,
            enemy_level = enemy.level,
            "battle started"
        );
        let mut battle = Self {
            character,
            enemy,
            state: BattleState::Active,
            round: 1,
            dice,
        };
        battle.check_battle_end();
        Ok(battle)
    }

    /// Resume at a later round, for fights spread over several calls.
    pub fn with_round(mut self, round: u32) -> Self {
        self.round = round.max(1);
        self
    }

    pub fn character(&self) -> &Character {
        &*self.character
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_active(&self) -> bool {
        self.state == BattleState::Active
    }

    fn ensure_active(&self) -> Result<(), GameError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(GameError::CombatNotActive)
        }
    }

    /// End the battle if either side is at 0 health.
    ///
    /// The enemy is checked first, since the player always strikes first.
    pub fn check_battle_end(&mut self) -> Option<Winner> {
        let winner = if self.enemy.is_defeated() {
            Winner::Player
        } else if self.character.is_defeated() {
            Winner::Enemy
        } else {
            return None;
        };

        if self.is_active() {
            self.state = match winner {
                Winner::Player => BattleState::PlayerWon,
                Winner::Enemy => BattleState::EnemyWon,
            };
            tracing::debug!(state = ?self.state, round = self.round, "battle over");
        }
        Some(winner)
    }

    fn defeated_event(&mut self) -> Option<BattleEvent> {
        match self.check_battle_end()? {
            Winner::Player => Some(BattleEvent::Defeated {
                name: self.enemy.name.clone(),
            }),
            Winner::Enemy => Some(BattleEvent::Defeated {
                name: self.character.name.clone(),
            }),
        }
    }

    /// Resolve the player's action.
    pub fn player_turn(&mut self, action: PlayerAction) -> Result<Vec<BattleEvent>, GameError> {
        self.ensure_active()?;

        let mut events = Vec::new();
        match action {
            PlayerAction::Attack => {
                let damage = calculate_damage(&*self.character, &self.enemy);
                let remaining = apply_damage(&mut self.enemy, damage);
                events.push(BattleEvent::Attack {
                    attacker: self.character.name.clone(),
                    defender: self.enemy.name.clone(),
                    damage,
                    remaining,
                });
            }
            PlayerAction::SpecialAbility => {
                let ability = self
                    .character
                    .special_ability
                    .ok_or_else(|| GameError::AbilityOnCooldown(self.character.name.clone()))?;
                events.push(self.use_ability(ability));
            }
            PlayerAction::Escape => {
                if self.dice.coin_flip() {
                    self.state = BattleState::Escaped;
                    tracing::debug!(round = self.round, "player escaped");
                    events.push(BattleEvent::Escaped);
                } else {
                    events.push(BattleEvent::EscapeFailed);
                }
            }
        }

        tracing::debug!(?action, round = self.round, "player turn");
        events.extend(self.defeated_event());
        Ok(events)
    }

    fn use_ability(&mut self, ability: SpecialAbility) -> BattleEvent {
        let (damage, critical) = match ability {
            SpecialAbility::Heal => {
                let amount = self.character.heal(HEAL_ABILITY_AMOUNT);
                return BattleEvent::Healed {
                    name: self.character.name.clone(),
                    amount,
                };
            }
            SpecialAbility::PowerStrike => (self.character.strength.saturating_mul(2), false),
            SpecialAbility::Fireball => (self.character.magic.saturating_mul(2), false),
            SpecialAbility::CriticalStrike => {
                if self.dice.coin_flip() {
                    (self.character.strength.saturating_mul(3), true)
                } else {
                    (self.character.strength, false)
                }
            }
        };

        // Negative strength or magic from item effects never heals the enemy.
        let damage = damage.max(0);
        let remaining = apply_damage(&mut self.enemy, damage);
        BattleEvent::AbilityDamage {
            ability,
            attacker: self.character.name.clone(),
            defender: self.enemy.name.clone(),
            damage,
            remaining,
            critical,
        }
    }

    /// The enemy's basic attack. Ends the round.
    pub fn enemy_turn(&mut self) -> Result<Vec<BattleEvent>, GameError> {
        self.ensure_active()?;

        let damage = calculate_damage(&self.enemy, &*self.character);
        let remaining = apply_damage(&mut *self.character, damage);
        let mut events = vec![BattleEvent::Attack {
            attacker: self.enemy.name.clone(),
            defender: self.character.name.clone(),
            damage,
            remaining,
        }];

        tracing::debug!(damage, remaining, round = self.round, "enemy turn");
        events.extend(self.defeated_event());
        if self.is_active() {
            self.round += 1;
        }
        Ok(events)
    }

    /// Player turn, then the enemy's turn if the battle is still on.
    pub fn play_round(&mut self, action: PlayerAction) -> Result<Vec<BattleEvent>, GameError> {
        let mut events = self.player_turn(action)?;
        if self.is_active() {
            events.extend(self.enemy_turn()?);
        }
        Ok(events)
    }

    /// Fight to the end with basic attacks only.
    pub fn start_battle(&mut self) -> Result<BattleResult, GameError> {
        if self.character.is_dead() {
            return Err(GameError::CharacterDead(self.character.name.clone()));
        }
        while self.is_active() {
            self.play_round(PlayerAction::Attack)?;
        }
        self.result().ok_or(GameError::CombatNotActive)
    }

    /// The result once a side has won. `None` while active or after an escape.
    pub fn result(&self) -> Option<BattleResult> {
        match self.state {
            BattleState::PlayerWon => {
                let (xp_gained, gold_gained) = self.enemy.rewards();
                Some(BattleResult {
                    winner: Winner::Player,
                    xp_gained,
                    gold_gained,
                })
            }
            BattleState::EnemyWon => Some(BattleResult {
                winner: Winner::Enemy,
                xp_gained: 0,
                gold_gained: 0,
            }),
            BattleState::Active | BattleState::Escaped => None,
        }
    }

    /// Give the enemy back, e.g. to inspect it after the battle.
    pub fn into_enemy(self) -> Enemy {
        self.enemy
    }
}
