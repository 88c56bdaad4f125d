//! Declarative engine configuration.
//!
//! One table describes a whole game variant: starting state, milestone and
//! reward rules, recipes, event weights, spawn chances, combat stats and the
//! tick cadence. Every field has a default, so a config file only needs the
//! values it changes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::NightRules;
use crate::constants::cadence;
use crate::events::{EventKind, EventTable};
use crate::ledger::RecipeBook;
use crate::session::LobbyPolicy;
use crate::state::StartingState;
use crate::threats::{CombatRules, MobKind, SpawnTable};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How often the engine fires each kind of tick, in seconds of play.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cadence {
    pub night_secs: f32,
    pub event_secs: f32,
    pub spawn_secs: f32,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            night_secs: cadence::NIGHT_SECS,
            event_secs: cadence::EVENT_SECS,
            spawn_secs: cadence::SPAWN_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub start: StartingState,
    pub night: NightRules,
    pub lobby_policy: LobbyPolicy,
    pub recipes: RecipeBook,
    pub events: EventTable,
    pub spawns: SpawnTable,
    pub combat: CombatRules,
    pub cadence: Cadence,
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let start = &self.start;
        if start.max_health < 1 {
            return invalid("start.max_health must be at least 1");
        }
        if start.health < 1 || start.health > start.max_health {
            return invalid("start.health must be within 1..=max_health");
        }
        if start.night < 1 {
            return invalid("start.night must be at least 1");
        }
        if start.multiplier < 1.0 {
            return invalid("start.multiplier must be at least 1");
        }
        if self.night.milestone.final_night < 1 {
            return invalid("night.milestone.final_night must be at least 1");
        }
        if !(self.night.multiplier_step >= 0.0) {
            return invalid("night.multiplier_step must be non-negative");
        }

        let mut names = HashSet::new();
        for recipe in self.recipes.iter() {
            if !recipe.is_valid() {
                return invalid(format!("recipe '{}' needs inputs and an effect", recipe.name));
            }
            if !names.insert(recipe.name.as_str()) {
                return invalid(format!("duplicate recipe '{}'", recipe.name));
            }
            if recipe.health < 0 || recipe.max_health < 0 {
                return invalid(format!("recipe '{}' has a negative health effect", recipe.name));
            }
        }

        if self.events.total_weight() == 0 {
            return invalid("events need at least one positive weight");
        }
        if self.events.total_weight() > u32::MAX as u64 {
            return invalid("event weights overflow");
        }
        for entry in &self.events.entries {
            if let EventKind::TakeDamage { amount } = entry.kind {
                if amount < 0 {
                    return invalid("take_damage amount must be non-negative");
                }
            }
        }

        for entry in &self.spawns.entries {
            if !(0.0..=1.0).contains(&entry.chance) {
                return invalid(format!("spawn chance for {} outside 0..=1", entry.mob.name()));
            }
        }

        for mob in [MobKind::Wolf, MobKind::Bear] {
            let stats = self.combat.stats(mob);
            if stats.damage < 0 {
                return invalid(format!("{} damage must be non-negative", mob.name()));
            }
            if !(0.0..=1.0).contains(&stats.win_chance) {
                return invalid(format!("{} win chance outside 0..=1", mob.name()));
            }
        }

        let c = &self.cadence;
        if !(c.night_secs > 0.0 && c.event_secs > 0.0 && c.spawn_secs > 0.0) {
            return invalid("cadence intervals must be positive");
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(msg.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceKind;

    #[test]
    fn test_default_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_json(
            r#"{
                "start": { "health": 50, "resources": { "wood": 10 } },
                "night": { "milestone": { "final_night": 10, "modulo_base": 5 } },
                "lobby_policy": "reset_session"
            }"#,
        )
        .unwrap();
        assert_eq!(config.start.health, 50);
        assert_eq!(config.start.max_health, 100);
        assert_eq!(config.start.resources.get(&ResourceKind::Wood), 10);
        assert_eq!(config.night.milestone.final_night, 10);
        assert_eq!(config.lobby_policy, LobbyPolicy::ResetSession);
        assert!(config.recipes.get("health_potion").is_some());
    }

    #[test]
    fn test_round_trip_through_json() {
        let json = EngineConfig::default().to_json().unwrap();
        let back = EngineConfig::from_json(&json).unwrap();
        assert_eq!(back, EngineConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"start": {"health": 200}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"events": [{"weight": 0, "type": "nothing"}]}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"cadence": {"night_secs": 0}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"spawns": [{"mob": "wolf", "chance": 1.5}]}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_negative_damage_and_healing() {
        let cases = [
            r#"{"events": [{"weight": 1, "type": "take_damage", "amount": -2147483648}]}"#,
            r#"{"combat": {"wolf": {"damage": -5, "win_chance": 0.5, "loot": {}}}}"#,
            r#"{"recipes": [{"name": "poison", "inputs": {"herb": 1}, "health": -10}]}"#,
            r#"{"recipes": [{"name": "curse", "inputs": {"herb": 1}, "max_health": -10}]}"#,
        ];
        for json in cases {
            assert!(
                matches!(EngineConfig::from_json(json), Err(ConfigError::Invalid(_))),
                "accepted {}",
                json
            );
        }
    }

    #[test]
    fn test_rejects_duplicate_recipes() {
        let json = r#"{"recipes": [
            {"name": "torch", "inputs": {"wood": 2}, "outputs": {"torch": 1}},
            {"name": "torch", "inputs": {"wood": 1}, "outputs": {"torch": 1}}
        ]}"#;
        assert!(matches!(
            EngineConfig::from_json(json),
            Err(ConfigError::Invalid(_))
        ));
    }
}
