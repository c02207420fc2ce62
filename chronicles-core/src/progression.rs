//! Character progression: experience, leveling, healing, death and gold.

use crate::error::GameError;
use crate::world::Character;

/// Max health gained per level.
pub const MAX_HEALTH_PER_LEVEL: i32 = 10;
/// Strength and magic gained per level.
pub const STAT_PER_LEVEL: i32 = 2;

impl Character {
    /// Whether the character is at 0 health.
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Add experience and apply every level-up it pays for.
    ///
    /// Each level costs `level * 100` experience, is paid from the pool,
    /// and fully restores health. Returns the number of levels gained.
    pub fn gain_experience(&mut self, amount: u32) -> Result<u32, GameError> {
        if self.is_dead() {
            return Err(GameError::CharacterDead(self.name.clone()));
        }

        self.experience = self.experience.saturating_add(amount);

        let mut gained = 0;
        while self.experience >= self.experience_to_next_level() {
            self.experience -= self.experience_to_next_level();
            self.level_up();
            gained += 1;
        }

        if gained > 0 {
            tracing::debug!(
                character = %self.name,
                level = self.level,
                levels_gained = gained,
                "level up"
            );
        }
        Ok(gained)
    }

    fn level_up(&mut self) {
        self.level += 1;
        self.max_health = self.max_health.saturating_add(MAX_HEALTH_PER_LEVEL);
        self.strength = self.strength.saturating_add(STAT_PER_LEVEL);
        self.magic = self.magic.saturating_add(STAT_PER_LEVEL);
        self.health = self.max_health;
    }

    /// Restore up to `amount` health. Returns how much was actually healed.
    ///
    /// The dead cannot be healed and get 0.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.is_dead() {
            return 0;
        }
        let missing = (self.max_health - self.health).max(0) as u32;
        let healed = amount.min(missing);
        self.health += healed as i32;
        healed
    }

    /// Bring a dead character back at half health (at least 1).
    ///
    /// Returns `false` and changes nothing if the character is alive.
    pub fn revive(&mut self) -> bool {
        if !self.is_dead() {
            return false;
        }
        self.health = (self.max_health / 2).max(1);
        tracing::debug!(character = %self.name, health = self.health, "revived");
        true
    }

    /// Add (or with a negative amount, spend) gold. Returns the new total.
    pub fn add_gold(&mut self, amount: i64) -> Result<u32, GameError> {
        let total = i64::from(self.gold) + amount;
        if total < 0 {
            return Err(GameError::InsufficientResources {
                needed: amount.unsigned_abs().min(u64::from(u32::MAX)) as u32,
                available: self.gold,
            });
        }
        self.gold = total.min(i64::from(u32::MAX)) as u32;
        Ok(self.gold)
    }
}
