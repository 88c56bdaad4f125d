//! Tuning constants — session defaults, milestone numbers, hub rewards.
//!
//! Everything here is a plain constant. Values that a session may override
//! live in [`crate::config::EngineConfig`] and default to these.

pub mod session {
    pub const START_HEALTH: i32 = 100;
    pub const START_MAX_HEALTH: i32 = 100;
    pub const START_NIGHT: u32 = 1;
    pub const START_MULTIPLIER: f32 = 1.0;
    pub const START_HERBS: u32 = 5;
    pub const START_BANDAGES: u32 = 2;
    /// Floor for the difficulty multiplier.
    pub const MIN_MULTIPLIER: f32 = 1.0;
}

pub mod milestones {
    /// Night on which the session is won.
    pub const FINAL_NIGHT: u32 = 99;
    /// Base for the "every Nth night" milestone clause.
    pub const MODULO_BASE: u32 = 99;
}

pub mod cadence {
    /// Seconds of play per night.
    pub const NIGHT_SECS: f32 = 60.0;
    /// Seconds between random event rolls.
    pub const EVENT_SECS: f32 = 20.0;
    /// Seconds between mob spawn rolls.
    pub const SPAWN_SECS: f32 = 5.0;
}

pub mod combat {
    pub const WOLF_DAMAGE: i32 = 10;
    pub const WOLF_WIN_CHANCE: f32 = 0.6;
    pub const WOLF_SPAWN_CHANCE: f32 = 0.3;
    pub const BEAR_DAMAGE: i32 = 25;
    pub const BEAR_WIN_CHANCE: f32 = 0.35;
    pub const BEAR_SPAWN_CHANCE: f32 = 0.2;
    /// Added to the win chance when the player carries a weapon.
    pub const WEAPON_BONUS: f32 = 0.2;
    /// Hostiles tracked at once; later spawns are dropped.
    pub const MAX_HOSTILES: usize = 16;
}

pub mod hub {
    /// XP needed per level: `level * XP_PER_LEVEL`.
    pub const XP_PER_LEVEL: u32 = 500;
    pub const FRIEND_ADDED_XP: u32 = 100;
    pub const MINI_GAME_WIN_XP: u32 = 100;
    pub const MINI_GAME_WIN_COINS: u32 = 50;
    pub const PLAYED_WITH_FRIEND_XP: u32 = 50;
    pub const DAILY_REWARD_COINS: u32 = 100;
    pub const DAILY_REWARD_XP: u32 = 200;
    pub const DEFAULT_PLAYER_NAME: &str = "Player1";
}
