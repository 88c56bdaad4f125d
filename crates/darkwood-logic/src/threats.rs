//! Mob spawn rolls and combat resolution.
//!
//! Spawning is one independent roll per table entry, scaled by the difficulty
//! multiplier. Combat is a single uniform draw compared against the mob's win
//! chance.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::combat;
use crate::resources::{ResourceBundle, ResourceKind};
use crate::state::{SurvivalState, Terminal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobKind {
    Wolf,
    Bear,
}

impl MobKind {
    pub const ALL: [MobKind; 2] = [MobKind::Wolf, MobKind::Bear];

    pub fn name(self) -> &'static str {
        match self {
            Self::Wolf => "wolf",
            Self::Bear => "bear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub mob: MobKind,
    /// Base chance per roll, before the multiplier.
    pub chance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpawnTable {
    pub entries: Vec<SpawnEntry>,
}

impl Default for SpawnTable {
    fn default() -> Self {
        Self {
            entries: vec![
                SpawnEntry {
                    mob: MobKind::Wolf,
                    chance: combat::WOLF_SPAWN_CHANCE,
                },
                SpawnEntry {
                    mob: MobKind::Bear,
                    chance: combat::BEAR_SPAWN_CHANCE,
                },
            ],
        }
    }
}

/// Roll every spawn entry once. Chances scale with `multiplier`, capped at 1.
pub fn roll_spawns<R: Rng + ?Sized>(
    table: &SpawnTable,
    multiplier: f32,
    rng: &mut R,
) -> Vec<MobKind> {
    table
        .entries
        .iter()
        .filter(|entry| {
            let chance = (entry.chance * multiplier).clamp(0.0, 1.0);
            rng.gen::<f32>() < chance
        })
        .map(|entry| entry.mob)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobStats {
    pub damage: i32,
    pub win_chance: f32,
    pub loot: ResourceBundle,
}

/// Stats for every mob kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    pub wolf: MobStats,
    pub bear: MobStats,
    /// Added to the win chance while the player holds a weapon.
    pub weapon_bonus: f32,
}

impl CombatRules {
    pub fn stats(&self, mob: MobKind) -> &MobStats {
        match mob {
            MobKind::Wolf => &self.wolf,
            MobKind::Bear => &self.bear,
        }
    }
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            wolf: MobStats {
                damage: combat::WOLF_DAMAGE,
                win_chance: combat::WOLF_WIN_CHANCE,
                loot: ResourceBundle::new().with(ResourceKind::Food, 1),
            },
            bear: MobStats {
                damage: combat::BEAR_DAMAGE,
                win_chance: combat::BEAR_WIN_CHANCE,
                loot: ResourceBundle::new().with(ResourceKind::Food, 2),
            },
            weapon_bonus: combat::WEAPON_BONUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("session is over ({0:?})")]
    SessionOver(Terminal),
    #[error("no hostile with id {0}")]
    UnknownHostile(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CombatOutcome {
    Won { mob: MobKind, loot: ResourceBundle },
    Lost { mob: MobKind, health_delta: i32 },
}

/// Fight one mob.
pub fn resolve_combat<R: Rng + ?Sized>(
    state: &mut SurvivalState,
    mob: MobKind,
    rules: &CombatRules,
    rng: &mut R,
) -> Result<CombatOutcome, CombatError> {
    if let Some(terminal) = state.terminal_or_fallen() {
        return Err(CombatError::SessionOver(terminal));
    }

    let stats = rules.stats(mob);
    let armed = state.inventory.count(&ResourceKind::Weapon) > 0;
    let threshold = stats.win_chance + if armed { rules.weapon_bonus } else { 0.0 };

    if rng.gen::<f32>() < threshold {
        state.inventory.grant(&stats.loot);
        state.last_message = format!("You drove off the {}!", mob.name());
        Ok(CombatOutcome::Won {
            mob,
            loot: stats.loot.clone(),
        })
    } else {
        let health_delta = state.change_health(stats.damage.saturating_abs().saturating_neg());
        state.last_message = format!("The {} mauled you! {} HP", mob.name(), health_delta);
        Ok(CombatOutcome::Lost { mob, health_delta })
    }
}
