//! Night clock — night advancement and milestone detection.
//!
//! The clock owns no timer. The caller decides when a night has passed and
//! calls [`advance_night`] once per tick; [`check_milestone`] is a pure query
//! on the current night.

use serde::{Deserialize, Serialize};

use crate::constants::milestones;
use crate::resources::ResourceBundle;
use crate::session::{on_death, on_victory};
use crate::state::{SessionPhase, SurvivalState, Terminal};

/// Which milestone clause matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilestoneReason {
    /// `night == final_night`
    FinalNight,
    /// `night % modulo_base == 0`
    Multiple,
}

/// A night that pauses progression and asks the player what to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub night: u32,
    pub reason: MilestoneReason,
}

impl Milestone {
    /// The two choices every milestone offers, in display order.
    pub const CHOICES: [MilestoneChoice; 2] =
        [MilestoneChoice::Continue, MilestoneChoice::ReturnToLobby];
}

/// Player response to a milestone prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilestoneChoice {
    Continue,
    ReturnToLobby,
}

/// When milestones fire and when the session is won.
///
/// Both clauses are kept even though they coincide for the defaults:
/// `final_night` can be reconfigured independently of `modulo_base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilestoneRule {
    pub final_night: u32,
    /// 0 disables the modulo clause.
    pub modulo_base: u32,
}

impl Default for MilestoneRule {
    fn default() -> Self {
        Self {
            final_night: milestones::FINAL_NIGHT,
            modulo_base: milestones::MODULO_BASE,
        }
    }
}

/// Per-night rules applied by [`advance_night`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NightRules {
    pub milestone: MilestoneRule,
    /// Flat grant on every successful advance.
    pub reward: ResourceBundle,
    /// Added to the difficulty multiplier on every successful advance.
    pub multiplier_step: f32,
}

impl Default for NightRules {
    fn default() -> Self {
        Self {
            milestone: MilestoneRule::default(),
            reward: ResourceBundle::new().with("food", 1),
            multiplier_step: 0.0,
        }
    }
}

/// Result of one night tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The night advanced; carries the new night index.
    Continuing(u32),
    /// A milestone prompt is open. Nothing changed.
    Paused(Milestone),
    Terminal(Terminal),
}

/// Advance the session by one night.
///
/// Death is checked before victory, and victory before the increment, so a
/// player sitting on `final_night` wins on the next tick instead of moving
/// past it.
pub fn advance_night(state: &mut SurvivalState, rules: &NightRules) -> AdvanceOutcome {
    match state.phase {
        SessionPhase::Dead => {
            state.last_message = "You did not survive the night.".to_string();
            return AdvanceOutcome::Terminal(Terminal::Death);
        }
        SessionPhase::Won => {
            state.last_message = format!("You survived {} nights!", state.night);
            return AdvanceOutcome::Terminal(Terminal::Victory);
        }
        SessionPhase::Prompting(milestone) => {
            state.last_message = format!(
                "Night {} is waiting on your choice.",
                milestone.night
            );
            return AdvanceOutcome::Paused(milestone);
        }
        SessionPhase::Active => {}
    }

    if !state.is_alive() {
        on_death(state);
        return AdvanceOutcome::Terminal(Terminal::Death);
    }

    if state.night >= rules.milestone.final_night {
        on_victory(state);
        return AdvanceOutcome::Terminal(Terminal::Victory);
    }

    state.night += 1;
    state.inventory.grant(&rules.reward);
    state.change_multiplier(rules.multiplier_step);
    state.last_message = format!("Night {} begins.", state.night);
    AdvanceOutcome::Continuing(state.night)
}

/// The milestone for the current night, if any.
///
/// Pure: asking twice gives the same answer.
pub fn check_milestone(state: &SurvivalState, rule: &MilestoneRule) -> Option<Milestone> {
    milestone_for(state.night, rule)
}

/// Milestone test on a bare night index.
pub fn milestone_for(night: u32, rule: &MilestoneRule) -> Option<Milestone> {
    if night == rule.final_night {
        return Some(Milestone {
            night,
            reason: MilestoneReason::FinalNight,
        });
    }
    if rule.modulo_base != 0 && night % rule.modulo_base == 0 {
        return Some(Milestone {
            night,
            reason: MilestoneReason::Multiple,
        });
    }
    None
}
