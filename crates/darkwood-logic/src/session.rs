//! Session boundary — milestone resolution, lobby returns, terminal transitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::MilestoneChoice;
use crate::state::{SessionPhase, StartingState, SurvivalState, Terminal};

/// What a lobby return does to the survival record.
///
/// Position and camera state belong to the presentation layer and are reset
/// by it either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LobbyPolicy {
    /// Night, health and inventory carry over. Only the prompt closes.
    #[default]
    KeepProgress,
    /// The record is replaced by a fresh one built from [`StartingState`].
    ResetSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no milestone prompt is open")]
    NoPrompt,
    #[error("session is over ({0:?})")]
    SessionOver(Terminal),
}

/// Result of a lobby return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobbyOutcome {
    pub policy: LobbyPolicy,
    /// Night before the return.
    pub left_night: u32,
    /// Night after the return.
    pub night: u32,
}

/// Result of answering a milestone prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Continued,
    Lobby(LobbyOutcome),
}

/// Answer the open milestone prompt.
pub fn resolve_milestone(
    state: &mut SurvivalState,
    choice: MilestoneChoice,
    start: &StartingState,
    policy: LobbyPolicy,
) -> Result<Resolution, SessionError> {
    let milestone = match state.phase {
        SessionPhase::Prompting(m) => m,
        SessionPhase::Active => return Err(SessionError::NoPrompt),
        _ => return Err(terminal_error(state)),
    };

    match choice {
        MilestoneChoice::Continue => {
            state.phase = SessionPhase::Active;
            state.last_message = format!("Night {} survived. Onward.", milestone.night);
            Ok(Resolution::Continued)
        }
        MilestoneChoice::ReturnToLobby => {
            return_to_lobby(state, start, policy).map(Resolution::Lobby)
        }
    }
}

/// Leave the forest for the lobby, closing any open prompt.
pub fn return_to_lobby(
    state: &mut SurvivalState,
    start: &StartingState,
    policy: LobbyPolicy,
) -> Result<LobbyOutcome, SessionError> {
    if state.terminal_or_fallen().is_some() {
        return Err(terminal_error(state));
    }

    let left_night = state.night;
    match policy {
        LobbyPolicy::KeepProgress => {
            state.phase = SessionPhase::Active;
        }
        LobbyPolicy::ResetSession => {
            *state = SurvivalState::new(start);
        }
    }
    state.last_message = "You are in the lobby!".to_string();

    Ok(LobbyOutcome {
        policy,
        left_night,
        night: state.night,
    })
}

/// One-way transition to [`SessionPhase::Dead`].
pub fn on_death(state: &mut SurvivalState) {
    state.health = 0;
    state.phase = SessionPhase::Dead;
    state.last_message = format!("You fell on night {}.", state.night);
}

/// One-way transition to [`SessionPhase::Won`].
pub fn on_victory(state: &mut SurvivalState) {
    state.phase = SessionPhase::Won;
    state.last_message = format!("You survived {} nights!", state.night);
}

pub(crate) fn terminal_error(state: &SurvivalState) -> SessionError {
    SessionError::SessionOver(state.terminal().unwrap_or(Terminal::Death))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Milestone, MilestoneReason};
    use crate::resources::ResourceKind;

    fn prompting_at(night: u32) -> SurvivalState {
        let mut state = SurvivalState {
            night,
            ..SurvivalState::default()
        };
        state.phase = SessionPhase::Prompting(Milestone {
            night,
            reason: MilestoneReason::FinalNight,
        });
        state
    }

    #[test]
    fn test_continue_closes_prompt_only() {
        let mut state = prompting_at(99);
        let before = state.inventory.clone();
        let res = resolve_milestone(
            &mut state,
            MilestoneChoice::Continue,
            &StartingState::default(),
            LobbyPolicy::KeepProgress,
        )
        .unwrap();
        assert_eq!(res, Resolution::Continued);
        assert_eq!(state.phase, SessionPhase::Active);
        assert_eq!(state.night, 99);
        assert_eq!(state.inventory, before);
    }

    #[test]
    fn test_resolve_without_prompt() {
        let mut state = SurvivalState::default();
        let err = resolve_milestone(
            &mut state,
            MilestoneChoice::Continue,
            &StartingState::default(),
            LobbyPolicy::KeepProgress,
        )
        .unwrap_err();
        assert_eq!(err, SessionError::NoPrompt);
    }

    #[test]
    fn test_lobby_keep_progress() {
        let mut state = prompting_at(99);
        state.health = 40;
        state.inventory.add(ResourceKind::Gem, 3);
        let outcome = resolve_milestone(
            &mut state,
            MilestoneChoice::ReturnToLobby,
            &StartingState::default(),
            LobbyPolicy::KeepProgress,
        )
        .unwrap();
        assert_eq!(
            outcome,
            Resolution::Lobby(LobbyOutcome {
                policy: LobbyPolicy::KeepProgress,
                left_night: 99,
                night: 99,
            })
        );
        assert_eq!(state.phase, SessionPhase::Active);
        assert_eq!(state.health, 40);
        assert_eq!(state.inventory.count(&ResourceKind::Gem), 3);
        assert_eq!(state.last_message, "You are in the lobby!");
    }

    #[test]
    fn test_lobby_reset_session() {
        let mut state = prompting_at(99);
        state.health = 40;
        let outcome =
            return_to_lobby(&mut state, &StartingState::default(), LobbyPolicy::ResetSession)
                .unwrap();
        assert_eq!(outcome.left_night, 99);
        assert_eq!(outcome.night, 1);
        assert_eq!(state.night, 1);
        assert_eq!(state.health, 100);
        assert_eq!(state.phase, SessionPhase::Active);
    }

    #[test]
    fn test_terminal_rejects_lobby() {
        let mut state = SurvivalState::default();
        on_death(&mut state);
        let err = return_to_lobby(&mut state, &StartingState::default(), LobbyPolicy::ResetSession)
            .unwrap_err();
        assert_eq!(err, SessionError::SessionOver(Terminal::Death));
        assert_eq!(state.phase, SessionPhase::Dead);
    }

    #[test]
    fn test_fallen_player_cannot_reset_in_lobby() {
        let mut state = prompting_at(99);
        state.health = 0;
        let err = resolve_milestone(
            &mut state,
            MilestoneChoice::ReturnToLobby,
            &StartingState::default(),
            LobbyPolicy::ResetSession,
        )
        .unwrap_err();
        assert_eq!(err, SessionError::SessionOver(Terminal::Death));
        assert_eq!(state.night, 99);
        assert_eq!(state.health, 0);
    }

    #[test]
    fn test_policy_from_json() {
        let p: LobbyPolicy = serde_json::from_str("\"reset_session\"").unwrap();
        assert_eq!(p, LobbyPolicy::ResetSession);
        assert_eq!(LobbyPolicy::default(), LobbyPolicy::KeepProgress);
    }
}
