//! Random event table — weighted forest events rolled on a cadence.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resources::{ResourceBundle, ResourceKind};
use crate::state::{SurvivalState, Terminal};

/// What an event does when drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Nothing,
    FindResource { kind: ResourceKind, quantity: u32 },
    TakeDamage { amount: i32 },
    FindItem { kind: ResourceKind, quantity: u32 },
}

/// Tag of an applied event, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTag {
    Nothing,
    FindResource,
    TakeDamage,
    FindItem,
}

impl EventKind {
    pub fn tag(&self) -> EventTag {
        match self {
            Self::Nothing => EventTag::Nothing,
            Self::FindResource { .. } => EventTag::FindResource,
            Self::TakeDamage { .. } => EventTag::TakeDamage,
            Self::FindItem { .. } => EventTag::FindItem,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    pub weight: u32,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Ordered, weighted set of events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTable {
    pub entries: Vec<EventEntry>,
}

impl EventTable {
    pub fn new(entries: Vec<EventEntry>) -> Self {
        Self { entries }
    }

    /// Table with one equally-weighted entry per kind.
    pub fn uniform(kinds: impl IntoIterator<Item = EventKind>) -> Self {
        Self::new(
            kinds
                .into_iter()
                .map(|kind| EventEntry { weight: 1, kind })
                .collect(),
        )
    }

    pub fn total_weight(&self) -> u64 {
        self.entries.iter().map(|e| e.weight as u64).sum()
    }

    /// Draw one entry. `None` when the table has no positive weight.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&EventKind> {
        let index = WeightedIndex::new(self.entries.iter().map(|e| e.weight)).ok()?;
        Some(&self.entries[index.sample(rng)].kind)
    }
}

impl Default for EventTable {
    fn default() -> Self {
        Self::uniform([
            EventKind::Nothing,
            EventKind::FindResource {
                kind: ResourceKind::Herb,
                quantity: 2,
            },
            EventKind::TakeDamage { amount: 25 },
            EventKind::FindItem {
                kind: ResourceKind::Bandage,
                quantity: 1,
            },
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("event table has no positive weight")]
    EmptyTable,
    #[error("session is over ({0:?})")]
    SessionOver(Terminal),
}

/// What an event roll changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome {
    pub tag: EventTag,
    /// Health change after clamping.
    pub health_delta: i32,
    pub found: ResourceBundle,
}

/// Roll one event and apply it.
///
/// Health is clamped into `[0, max_health]`. A roll that drops health to zero
/// does not end the session by itself; the next night tick does. Until then
/// no further events apply.
pub fn apply_random_event<R: Rng + ?Sized>(
    state: &mut SurvivalState,
    table: &EventTable,
    rng: &mut R,
) -> Result<EventOutcome, EventError> {
    if let Some(terminal) = state.terminal_or_fallen() {
        return Err(EventError::SessionOver(terminal));
    }
    let kind = table.draw(rng).ok_or(EventError::EmptyTable)?;

    let mut outcome = EventOutcome {
        tag: kind.tag(),
        health_delta: 0,
        found: ResourceBundle::new(),
    };

    match kind {
        EventKind::Nothing => {
            state.last_message = "The forest is quiet.".to_string();
        }
        EventKind::FindResource { kind, quantity } => {
            outcome.found = ResourceBundle::new().with(kind.clone(), *quantity);
            state.inventory.add(kind.clone(), *quantity);
            state.last_message = format!("You found {} {}!", quantity, kind);
        }
        EventKind::FindItem { kind, quantity } => {
            outcome.found = ResourceBundle::new().with(kind.clone(), *quantity);
            state.inventory.add(kind.clone(), *quantity);
            state.last_message = format!("You found an item: {} x{}!", kind.label(), quantity);
        }
        EventKind::TakeDamage { amount } => {
            outcome.health_delta = state.change_health(amount.saturating_abs().saturating_neg());
            state.last_message = format!("Something bit you! {} HP", outcome.health_delta);
        }
    }

    Ok(outcome)
}
