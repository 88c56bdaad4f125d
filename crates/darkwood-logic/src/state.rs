//! Survival state for one session.
//!
//! A [`SurvivalState`] is created from a [`StartingState`], mutated only by
//! the rule functions in [`crate::clock`], [`crate::ledger`],
//! [`crate::events`], [`crate::threats`] and [`crate::session`], and
//! discarded when the session ends.

use serde::{Deserialize, Serialize};

use crate::clock::Milestone;
use crate::constants::session;
use crate::resources::{Inventory, ResourceBundle, ResourceKind};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Active,
    /// A milestone prompt is open; night progression is held.
    Prompting(Milestone),
    Dead,
    Won,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Dead | Self::Won)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Prompting(_) => "Milestone",
            Self::Dead => "Dead",
            Self::Won => "Won",
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminal {
    Death,
    Victory,
}

/// Session defaults, usually read from config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingState {
    pub health: i32,
    pub max_health: i32,
    pub night: u32,
    pub multiplier: f32,
    pub resources: ResourceBundle,
}

impl Default for StartingState {
    fn default() -> Self {
        Self {
            health: session::START_HEALTH,
            max_health: session::START_MAX_HEALTH,
            night: session::START_NIGHT,
            multiplier: session::START_MULTIPLIER,
            resources: ResourceBundle::new()
                .with(ResourceKind::Herb, session::START_HERBS)
                .with(ResourceKind::Bandage, session::START_BANDAGES),
        }
    }
}

/// The player's survival record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalState {
    pub night: u32,
    pub health: i32,
    pub max_health: i32,
    pub multiplier: f32,
    pub inventory: Inventory,
    pub phase: SessionPhase,
    /// Most recent status line. Never read by the rules.
    pub last_message: String,
}

impl SurvivalState {
    pub fn new(start: &StartingState) -> Self {
        let max_health = start.max_health.max(1);
        Self {
            night: start.night.max(1),
            health: start.health.clamp(0, max_health),
            max_health,
            multiplier: start.multiplier.max(session::MIN_MULTIPLIER),
            inventory: Inventory::from(start.resources.clone()),
            phase: SessionPhase::Active,
            last_message: String::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// The terminal outcome, if the session has ended.
    pub fn terminal(&self) -> Option<Terminal> {
        match self.phase {
            SessionPhase::Dead => Some(Terminal::Death),
            SessionPhase::Won => Some(Terminal::Victory),
            _ => None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// [`terminal`](Self::terminal), but a player at 0 HP who is still
    /// waiting on the night tick already counts as dead.
    pub fn terminal_or_fallen(&self) -> Option<Terminal> {
        match self.terminal() {
            Some(terminal) => Some(terminal),
            None if !self.is_alive() => Some(Terminal::Death),
            None => None,
        }
    }

    /// Apply a health delta and clamp into `[0, max_health]`.
    /// Returns the delta actually applied.
    pub fn change_health(&mut self, delta: i32) -> i32 {
        let before = self.health;
        self.health = before.saturating_add(delta).clamp(0, self.max_health);
        self.health - before
    }

    /// Raise (or lower) the health ceiling, keeping `health` inside it.
    pub fn change_max_health(&mut self, delta: i32) {
        self.max_health = self.max_health.saturating_add(delta).max(1);
        self.health = self.health.min(self.max_health);
    }

    pub fn change_multiplier(&mut self, delta: f32) {
        self.multiplier = (self.multiplier + delta).max(session::MIN_MULTIPLIER);
    }
}

impl Default for SurvivalState {
    fn default() -> Self {
        Self::new(&StartingState::default())
    }
}
