//! Stat effects carried by items.
//!
//! Items encode their effect as a compact string of comma-separated
//! `stat:delta` pairs, e.g. `"strength:5"` or `"health:20,magic:-2"`.
//! Consumables apply it once; weapons and armor apply it on equip and
//! apply the negation on unequip.

use crate::error::GameError;
use crate::world::Character;
use std::fmt;

/// One `stat:delta` pair from an effect string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatDelta {
    pub stat: String,
    pub delta: i32,
}

impl StatDelta {
    pub fn new(stat: impl Into<String>, delta: i32) -> Self {
        Self {
            stat: stat.into(),
            delta,
        }
    }

    /// The same stat with the opposite sign.
    pub fn negated(&self) -> Self {
        Self {
            stat: self.stat.clone(),
            delta: -self.delta,
        }
    }
}

impl fmt::Display for StatDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.stat, self.delta)
    }
}

/// Parse an effect string into its stat deltas.
///
/// Empty segments are skipped, so `""` and `"strength:5,"` are fine. A
/// segment without a colon or with a non-integer value is an error.
pub fn parse_effect_string(effect: &str) -> Result<Vec<StatDelta>, GameError> {
    let mut deltas = Vec::new();

    for segment in effect.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let (stat, value) = segment
            .split_once(':')
            .ok_or_else(|| GameError::InvalidEffect(segment.to_string()))?;
        let stat = stat.trim();
        if stat.is_empty() {
            return Err(GameError::InvalidEffect(segment.to_string()));
        }
        let delta: i32 = value
            .trim()
            .parse()
            .map_err(|_| GameError::InvalidEffect(segment.to_string()))?;

        deltas.push(StatDelta::new(stat, delta));
    }

    Ok(deltas)
}

impl Character {
    /// Add `delta` to the named stat.
    ///
    /// Unknown stats are created at 0 in `bonus_stats`. Health always ends
    /// up within `[0, max_health]`.
    pub fn apply_stat_effect(&mut self, stat_name: &str, delta: i32) {
        match stat_name {
            "health" => {
                self.health = self.health.saturating_add(delta);
                self.clamp_health();
            }
            "max_health" => {
                self.max_health = self.max_health.saturating_add(delta);
                self.clamp_health();
            }
            "strength" => self.strength = self.strength.saturating_add(delta),
            "magic" => self.magic = self.magic.saturating_add(delta),
            other => {
                let entry = self.bonus_stats.entry(other.to_string()).or_insert(0);
                *entry = entry.saturating_add(delta);
            }
        }
    }

    /// Apply every delta of an effect string.
    ///
    /// The whole string is parsed first; a malformed string changes nothing.
    pub fn apply_effect_string(&mut self, effect: &str) -> Result<Vec<StatDelta>, GameError> {
        let deltas = parse_effect_string(effect)?;
        for delta in &deltas {
            self.apply_stat_effect(&delta.stat, delta.delta);
        }
        Ok(deltas)
    }

    /// Undo an effect string previously applied with [`apply_effect_string`].
    ///
    /// [`apply_effect_string`]: Character::apply_effect_string
    pub fn reverse_effect_string(&mut self, effect: &str) -> Result<Vec<StatDelta>, GameError> {
        let deltas: Vec<_> = parse_effect_string(effect)?
            .iter()
            .map(StatDelta::negated)
            .collect();
        for delta in &deltas {
            self.apply_stat_effect(&delta.stat, delta.delta);
        }
        Ok(deltas)
    }

    fn clamp_health(&mut self) {
        self.health = self.health.min(self.max_health).max(0);
    }
}
