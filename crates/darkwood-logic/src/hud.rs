//! Read model for the presentation layer.
//!
//! Nothing in here mutates state. The renderer builds a [`HudView`] after
//! each tick and shows the strings as-is.

use crate::clock::{AdvanceOutcome, Milestone, MilestoneChoice};
use crate::events::EventOutcome;
use crate::hub::{HubNotice, HubProfile};
use crate::ledger::{display_name, CraftOutcome, LedgerError};
use crate::session::{LobbyPolicy, Resolution};
use crate::state::{SurvivalState, Terminal};
use crate::threats::CombatOutcome;

#[derive(Debug, Clone, PartialEq)]
pub struct HudView {
    pub night: String,
    pub multiplier: String,
    pub health: String,
    pub inventory: String,
    pub phase: &'static str,
    pub message: String,
}

impl HudView {
    pub fn from_state(state: &SurvivalState) -> Self {
        Self {
            night: state.night.to_string(),
            multiplier: format_multiplier(state.multiplier),
            health: format!("{}/{}", state.health, state.max_health),
            inventory: state.inventory.to_string(),
            phase: state.phase.label(),
            message: state.last_message.clone(),
        }
    }
}

fn format_multiplier(m: f32) -> String {
    if m.fract() == 0.0 {
        format!("{:.0}", m)
    } else {
        format!("{:.2}", m)
    }
}

/// Two-choice modal shown when a milestone fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestonePrompt {
    pub text: String,
    pub choices: [(MilestoneChoice, &'static str); 2],
}

impl MilestonePrompt {
    pub fn new(milestone: &Milestone) -> Self {
        let [a, b] = Milestone::CHOICES;
        Self {
            text: format!(
                "Congratulations! You survived Night {}. Choose:",
                milestone.night
            ),
            choices: [(a, choice_label(a)), (b, choice_label(b))],
        }
    }
}

pub fn choice_label(choice: MilestoneChoice) -> &'static str {
    match choice {
        MilestoneChoice::Continue => "Continue",
        MilestoneChoice::ReturnToLobby => "Back to Lobby",
    }
}

pub fn describe_advance(outcome: &AdvanceOutcome) -> String {
    match outcome {
        AdvanceOutcome::Continuing(night) => format!("Night {}", night),
        AdvanceOutcome::Paused(m) => format!("Paused on night {}", m.night),
        AdvanceOutcome::Terminal(Terminal::Death) => "Game over".to_string(),
        AdvanceOutcome::Terminal(Terminal::Victory) => "Victory!".to_string(),
    }
}

pub fn describe_craft(result: &Result<CraftOutcome, LedgerError>) -> String {
    match result {
        Ok(out) if out.health_gained > 0 => format!(
            "Crafted {}! +{} HP",
            display_name(&out.recipe),
            out.health_gained
        ),
        Ok(out) => format!("Crafted {}!", display_name(&out.recipe)),
        Err(LedgerError::InsufficientResources(_)) => "Not enough materials!".to_string(),
        Err(e) => e.to_string(),
    }
}

pub fn describe_event(outcome: &EventOutcome) -> String {
    let found: Vec<String> = outcome
        .found
        .iter()
        .map(|(k, q)| format!("{} x{}", k.label(), q))
        .collect();
    match (outcome.health_delta, found.is_empty()) {
        (0, true) => "Nothing happened.".to_string(),
        (0, false) => format!("Found {}", found.join(", ")),
        (d, _) => format!("{} HP", d),
    }
}

pub fn describe_combat(outcome: &CombatOutcome) -> String {
    match outcome {
        CombatOutcome::Won { mob, .. } => format!("Defeated a {}", mob.name()),
        CombatOutcome::Lost { mob, health_delta } => {
            format!("Hurt by a {} ({} HP)", mob.name(), health_delta)
        }
    }
}

pub fn describe_resolution(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Continued => "Continuing the hunt.".to_string(),
        Resolution::Lobby(out) => match out.policy {
            LobbyPolicy::KeepProgress => format!("Back in the lobby (night {} kept)", out.night),
            LobbyPolicy::ResetSession => "Back in the lobby (fresh start)".to_string(),
        },
    }
}

/// Colour band of the XP bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpBarBand {
    Low,
    Mid,
    High,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HubView {
    pub player: String,
    pub xp: String,
    pub coins: String,
    pub progress_percent: f32,
    pub band: XpBarBand,
    pub friends: Vec<String>,
}

impl HubView {
    pub fn from_profile(profile: &HubProfile) -> Self {
        let progress_percent = profile.level_progress() * 100.0;
        let band = if progress_percent < 40.0 {
            XpBarBand::Low
        } else if progress_percent < 70.0 {
            XpBarBand::Mid
        } else {
            XpBarBand::High
        };
        Self {
            player: format!("Player: {} (Lv.{})", profile.name, profile.level),
            xp: format!("XP: {}", profile.xp),
            coins: format!("Coins: {}", profile.coins),
            progress_percent,
            band,
            friends: profile
                .friends
                .iter()
                .map(|f| {
                    let badge = if f.online { "online" } else { "offline" };
                    format!("{} ({})", f.name, badge)
                })
                .collect(),
        }
    }
}

pub fn describe_notice(notice: &HubNotice) -> String {
    match notice {
        HubNotice::System(msg) => format!("System: {}", msg),
        HubNotice::LevelUp(level) => format!("Level Up! Lv.{}", level),
        HubNotice::Coins(amount) => format!("+{} Coins", amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MilestoneReason;
    use crate::resources::{ResourceBundle, ResourceKind, Shortfall};

    #[test]
    fn test_hud_from_default_state() {
        let hud = HudView::from_state(&SurvivalState::default());
        assert_eq!(hud.night, "1");
        assert_eq!(hud.multiplier, "1");
        assert_eq!(hud.health, "100/100");
        assert_eq!(hud.inventory, "Herb:5,Bandage:2");
        assert_eq!(hud.phase, "Active");
    }

    #[test]
    fn test_fractional_multiplier() {
        let state = SurvivalState {
            multiplier: 1.5,
            ..SurvivalState::default()
        };
        assert_eq!(HudView::from_state(&state).multiplier, "1.50");
    }

    #[test]
    fn test_huge_multiplier_not_truncated() {
        let state = SurvivalState {
            multiplier: 1e20,
            ..SurvivalState::default()
        };
        assert_eq!(
            HudView::from_state(&state).multiplier,
            "100000002004087734272"
        );
    }

    #[test]
    fn test_prompt_text() {
        let prompt = MilestonePrompt::new(&Milestone {
            night: 99,
            reason: MilestoneReason::FinalNight,
        });
        assert_eq!(prompt.text, "Congratulations! You survived Night 99. Choose:");
        assert_eq!(prompt.choices[0], (MilestoneChoice::Continue, "Continue"));
        assert_eq!(
            prompt.choices[1],
            (MilestoneChoice::ReturnToLobby, "Back to Lobby")
        );
    }

    #[test]
    fn test_describe_craft_failure() {
        let err = Err(LedgerError::InsufficientResources(Shortfall {
            kind: ResourceKind::Herb,
            needed: 3,
            available: 2,
        }));
        assert_eq!(describe_craft(&err), "Not enough materials!");
    }

    #[test]
    fn test_describe_event() {
        let found = EventOutcome {
            tag: crate::events::EventTag::FindItem,
            health_delta: 0,
            found: ResourceBundle::new().with("torch", 1),
        };
        assert_eq!(describe_event(&found), "Found Torch x1");
    }

    #[test]
    fn test_hub_view_bands() {
        let mut p = HubProfile::new("Ash");
        p.add_xp(100);
        assert_eq!(HubView::from_profile(&p).band, XpBarBand::Low);
        p.add_xp(150);
        assert_eq!(HubView::from_profile(&p).band, XpBarBand::Mid);
        p.add_xp(150);
        let view = HubView::from_profile(&p);
        assert_eq!(view.band, XpBarBand::High);
        assert_eq!(view.player, "Player: Ash (Lv.1)");
        assert_eq!(view.xp, "XP: 400");
    }
}
