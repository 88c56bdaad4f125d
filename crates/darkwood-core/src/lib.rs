//! Darkwood Core - Survival Session Engine
//!
//! Wraps the pure rules of `darkwood_logic` in a session object that owns the
//! survival state, a seeded RNG, and the tick scheduler that fires nights,
//! events and spawns from a single `update` call.
//!
//! # Architecture
//!
//! - **State**: one `SurvivalState`, mutated only through engine methods
//! - **Scheduler**: `update(delta_seconds)` fires night ticks, event rolls and
//!   spawn rolls on their configured cadences
//! - **Output**: every call returns values (`EngineEvent`, outcomes, errors);
//!   the presentation layer renders them through `darkwood_logic::hud`
//!
//! # Example
//!
//! ```rust,no_run
//! use darkwood_core::prelude::*;
//!
//! let mut engine = SurvivalEngine::new(EngineConfig::default(), 42);
//!
//! loop {
//!     for event in engine.update(1.0 / 60.0) {
//!         println!("{:?}", event);
//!     }
//!     if engine.state().is_terminal() {
//!         break;
//!     }
//! }
//! ```

pub mod engine;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::engine::{EngineEvent, Hostile, SurvivalEngine};
    pub use darkwood_logic::clock::{Milestone, MilestoneChoice};
    pub use darkwood_logic::config::EngineConfig;
    pub use darkwood_logic::state::{SessionPhase, SurvivalState, Terminal};
}
