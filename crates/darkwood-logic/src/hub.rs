//! Hub progression — XP, levels, coins, friends, mini-games, daily reward.
//!
//! Every operation returns [`HubNotice`]s describing what happened; the
//! presentation layer decides whether they become chat lines, toasts or log
//! entries.
//!
//! ```
//! use darkwood_logic::hub::HubProfile;
//!
//! let mut profile = HubProfile::new("Ash");
//! let notices = profile.add_xp(500);
//! assert_eq!(profile.level, 2);
//! assert_eq!(notices.len(), 1);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::hub;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("{0} is already your friend")]
    AlreadyFriend(String),
    #[error("no friend named {0}")]
    UnknownFriend(String),
    #[error("mini-game {0} not found")]
    UnknownMiniGame(String),
    #[error("daily reward already claimed today")]
    AlreadyClaimed,
}

/// A system message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubNotice {
    System(String),
    LevelUp(u32),
    Coins(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub name: String,
    pub online: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubProfile {
    pub name: String,
    pub level: u32,
    /// Cumulative XP; never reset on level-up.
    pub xp: u32,
    pub coins: u32,
    pub friends: Vec<Friend>,
    /// Caller-supplied day index of the last claimed daily reward.
    pub last_reward_day: Option<u32>,
}

impl Default for HubProfile {
    fn default() -> Self {
        Self::new(hub::DEFAULT_PLAYER_NAME)
    }
}

impl HubProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: 1,
            xp: 0,
            coins: 0,
            friends: Vec::new(),
            last_reward_day: None,
        }
    }

    pub fn rename(&mut self, new_name: &str) -> Result<Vec<HubNotice>, HubError> {
        let new_name = clean_name(new_name)?;
        let old = std::mem::replace(&mut self.name, new_name);
        Ok(vec![HubNotice::System(format!(
            "You changed your name from {} to {}",
            old, self.name
        ))])
    }

    pub fn friend(&self, name: &str) -> Option<&Friend> {
        self.friends.iter().find(|f| f.name == name)
    }

    pub fn add_friend(&mut self, name: &str) -> Result<Vec<HubNotice>, HubError> {
        let name = clean_name(name)?;
        if self.friend(&name).is_some() {
            return Err(HubError::AlreadyFriend(name));
        }
        let mut notices = vec![HubNotice::System(format!("{} joined your hub.", name))];
        self.friends.push(Friend { name, online: true });
        notices.extend(self.add_xp(hub::FRIEND_ADDED_XP));
        Ok(notices)
    }

    pub fn remove_friend(&mut self, name: &str) -> Result<Vec<HubNotice>, HubError> {
        let before = self.friends.len();
        self.friends.retain(|f| f.name != name);
        if self.friends.len() == before {
            return Err(HubError::UnknownFriend(name.to_string()));
        }
        Ok(vec![HubNotice::System(format!("{} was removed.", name))])
    }

    pub fn toggle_friend(&mut self, name: &str) -> Result<Vec<HubNotice>, HubError> {
        let friend = self
            .friends
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| HubError::UnknownFriend(name.to_string()))?;
        friend.online = !friend.online;
        let status = if friend.online { "online" } else { "offline" };
        Ok(vec![HubNotice::System(format!(
            "{} is now {}",
            friend.name, status
        ))])
    }

    pub fn rename_friend(&mut self, old: &str, new: &str) -> Result<Vec<HubNotice>, HubError> {
        let new = clean_name(new)?;
        if self.friend(&new).is_some() {
            return Err(HubError::AlreadyFriend(new));
        }
        let friend = self
            .friends
            .iter_mut()
            .find(|f| f.name == old)
            .ok_or_else(|| HubError::UnknownFriend(old.to_string()))?;
        friend.name = new;
        Ok(vec![HubNotice::System(format!(
            "Renamed friend {} to {}",
            old, friend.name
        ))])
    }

    /// XP required to leave the current level.
    pub fn xp_for_next_level(&self) -> u32 {
        self.level.saturating_mul(hub::XP_PER_LEVEL)
    }

    /// Add XP. Levels up at most once per call.
    pub fn add_xp(&mut self, amount: u32) -> Vec<HubNotice> {
        self.xp = self.xp.saturating_add(amount);
        if self.xp >= self.xp_for_next_level() {
            self.level += 1;
            return vec![HubNotice::LevelUp(self.level)];
        }
        Vec::new()
    }

    pub fn add_coins(&mut self, amount: u32) -> Vec<HubNotice> {
        self.coins = self.coins.saturating_add(amount);
        vec![HubNotice::Coins(amount)]
    }

    /// Fill fraction of the XP bar, `0.0..1.0`.
    pub fn level_progress(&self) -> f32 {
        (self.xp % hub::XP_PER_LEVEL) as f32 / hub::XP_PER_LEVEL as f32
    }

    /// Claim the once-per-day reward for day index `day`.
    pub fn claim_daily_reward(&mut self, day: u32) -> Result<Vec<HubNotice>, HubError> {
        if self.last_reward_day == Some(day) {
            return Err(HubError::AlreadyClaimed);
        }
        self.last_reward_day = Some(day);
        let mut notices = self.add_coins(hub::DAILY_REWARD_COINS);
        notices.extend(self.add_xp(hub::DAILY_REWARD_XP));
        notices.push(HubNotice::System("Daily reward claimed!".to_string()));
        Ok(notices)
    }
}

fn clean_name(name: &str) -> Result<String, HubError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(HubError::EmptyName);
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniGame {
    pub name: String,
    pub description: String,
}

/// Result of one mini-game round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniGameResult {
    pub game: String,
    pub won: bool,
    pub notices: Vec<HubNotice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MiniGameRegistry {
    games: Vec<MiniGame>,
}

impl MiniGameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, description: impl Into<String>) {
        self.games.push(MiniGame {
            name: name.into(),
            description: description.into(),
        });
    }

    pub fn get(&self, name: &str) -> Option<&MiniGame> {
        self.games.iter().find(|g| g.name == name)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Play one round. A win is a coin-flip; playing with a known friend
    /// earns bonus XP either way.
    pub fn play<R: Rng + ?Sized>(
        &self,
        profile: &mut HubProfile,
        name: &str,
        friend: Option<&str>,
        rng: &mut R,
    ) -> Result<MiniGameResult, HubError> {
        let game = self
            .get(name)
            .ok_or_else(|| HubError::UnknownMiniGame(name.to_string()))?;

        let mut notices = vec![HubNotice::System(format!("Starting {}...", game.name))];
        let won = rng.gen::<f64>() > 0.5;
        if won {
            notices.push(HubNotice::System(format!("You won {}!", game.name)));
            notices.extend(profile.add_xp(hub::MINI_GAME_WIN_XP));
            notices.extend(profile.add_coins(hub::MINI_GAME_WIN_COINS));
        } else {
            notices.push(HubNotice::System(format!("You lost {}", game.name)));
        }

        if let Some(friend_name) = friend.and_then(|f| profile.friend(f)).map(|f| f.name.clone()) {
            notices.extend(profile.add_xp(hub::PLAYED_WITH_FRIEND_XP));
            notices.push(HubNotice::System(format!(
                "You played {} with {}",
                game.name, friend_name
            )));
        }

        Ok(MiniGameResult {
            game: game.name.clone(),
            won,
            notices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn registry() -> MiniGameRegistry {
        let mut r = MiniGameRegistry::new();
        r.register("Coin Collector", "Grab every coin before time runs out");
        r
    }

    #[test]
    fn test_level_up_once_per_call() {
        let mut p = HubProfile::default();
        let notices = p.add_xp(1200);
        assert_eq!(notices, vec![HubNotice::LevelUp(2)]);
        assert_eq!(p.level, 2);
        // 1200 >= 2 * 500, so the next grant levels again
        assert_eq!(p.add_xp(0), vec![HubNotice::LevelUp(3)]);
        assert!(p.add_xp(0).is_empty());
    }

    #[test]
    fn test_level_progress() {
        let mut p = HubProfile::default();
        p.add_xp(250);
        assert!((p.level_progress() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_add_friend_grants_xp_and_rejects_duplicates() {
        let mut p = HubProfile::default();
        p.add_friend("  Mira ").unwrap();
        assert_eq!(p.xp, 100);
        assert_eq!(p.friends[0].name, "Mira");
        assert_eq!(
            p.add_friend("Mira").unwrap_err(),
            HubError::AlreadyFriend("Mira".into())
        );
        assert_eq!(p.xp, 100);
    }

    #[test]
    fn test_friend_management() {
        let mut p = HubProfile::default();
        p.add_friend("Mira").unwrap();
        p.toggle_friend("Mira").unwrap();
        assert!(!p.friend("Mira").unwrap().online);
        p.rename_friend("Mira", "Mira K").unwrap();
        assert!(p.friend("Mira K").is_some());
        p.remove_friend("Mira K").unwrap();
        assert!(p.friends.is_empty());
        assert_eq!(
            p.remove_friend("Mira K").unwrap_err(),
            HubError::UnknownFriend("Mira K".into())
        );
    }

    #[test]
    fn test_rename_rejects_blank() {
        let mut p = HubProfile::default();
        assert_eq!(p.rename("   ").unwrap_err(), HubError::EmptyName);
        assert_eq!(p.name, "Player1");
        p.rename(" Ash ").unwrap();
        assert_eq!(p.name, "Ash");
    }

    #[test]
    fn test_mini_game_win() {
        let mut p = HubProfile::default();
        let res = registry()
            .play(&mut p, "Coin Collector", None, &mut StepRng::new(u64::MAX, 0))
            .unwrap();
        assert!(res.won);
        assert_eq!(p.xp, 100);
        assert_eq!(p.coins, 50);
    }

    #[test]
    fn test_mini_game_loss_with_friend() {
        let mut p = HubProfile::default();
        p.add_friend("Mira").unwrap();
        let res = registry()
            .play(&mut p, "Coin Collector", Some("Mira"), &mut StepRng::new(0, 0))
            .unwrap();
        assert!(!res.won);
        assert_eq!(p.xp, 150);
        assert_eq!(p.coins, 0);
    }

    #[test]
    fn test_unknown_mini_game() {
        let mut p = HubProfile::default();
        let err = registry()
            .play(&mut p, "Chess", None, &mut StepRng::new(0, 0))
            .unwrap_err();
        assert_eq!(err, HubError::UnknownMiniGame("Chess".into()));
    }

    #[test]
    fn test_daily_reward_once_per_day() {
        let mut p = HubProfile::default();
        p.claim_daily_reward(10).unwrap();
        assert_eq!(p.coins, 100);
        assert_eq!(p.xp, 200);
        assert_eq!(p.claim_daily_reward(10).unwrap_err(), HubError::AlreadyClaimed);
        p.claim_daily_reward(11).unwrap();
        assert_eq!(p.coins, 200);
    }
}
