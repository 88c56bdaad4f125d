//! Pure survival rules for Darkwood.
//!
//! This crate contains all game logic that is independent of any renderer
//! or timer. Functions take plain data (and, where a roll is involved,
//! an injected `rand::Rng`) and return results, so every rule is
//! unit-testable and deterministic under a seeded generator.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`clock`] | Night advancement, victory/death checks, milestone detection |
//! | [`config`] | Declarative engine tables loaded from JSON |
//! | [`constants`] | Session defaults, cadence, combat and hub tuning |
//! | [`events`] | Weighted random event table |
//! | [`hub`] | XP, levels, coins, friends, mini-games, daily reward |
//! | [`hud`] | Read model: HUD lines, milestone prompt, outcome descriptions |
//! | [`ledger`] | Recipes and all-or-nothing crafting |
//! | [`resources`] | Resource kinds, bundles, inventory |
//! | [`session`] | Milestone resolution, lobby policy, terminal transitions |
//! | [`state`] | `SurvivalState` and session phases |
//! | [`threats`] | Mob spawn rolls and combat |

pub mod clock;
pub mod config;
pub mod constants;
pub mod events;
pub mod hub;
pub mod hud;
pub mod ledger;
pub mod resources;
pub mod session;
pub mod state;
pub mod threats;
