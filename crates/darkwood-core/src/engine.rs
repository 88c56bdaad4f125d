//! Session engine - main entry point for running a survival session

use darkwood_logic::clock::{advance_night, check_milestone, AdvanceOutcome, Milestone, MilestoneChoice};
use darkwood_logic::config::{ConfigError, EngineConfig};
use darkwood_logic::constants::combat;
use darkwood_logic::events::{apply_random_event, EventError, EventOutcome};
use darkwood_logic::hud::{HudView, MilestonePrompt};
use darkwood_logic::ledger::{craft_named, CraftOutcome, LedgerError};
use darkwood_logic::session::{self, LobbyOutcome, Resolution, SessionError};
use darkwood_logic::state::{SessionPhase, SurvivalState, Terminal};
use darkwood_logic::threats::{self, resolve_combat, CombatError, CombatOutcome, MobKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// The timed schedules driven by [`SurvivalEngine::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Night,
    Event,
    Spawn,
}

/// Next firing time of a schedule, or `None` if it can never advance.
fn due_at(last: f64, interval_secs: f32) -> Option<f64> {
    let next = last + interval_secs as f64;
    (next > last && next.is_finite()).then_some(next)
}

/// A spawned mob waiting to be fought.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hostile {
    pub id: u32,
    pub kind: MobKind,
    /// Night on which it appeared.
    pub night: u32,
}

/// Something the presentation layer should show.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    NightAdvanced(u32),
    MilestoneReached(Milestone),
    Ended(Terminal),
    Event(EventOutcome),
    HostileSpawned(Hostile),
}

/// Owns one survival session and drives it on the configured cadence.
pub struct SurvivalEngine {
    state: SurvivalState,
    config: EngineConfig,
    rng: StdRng,
    hostiles: Vec<Hostile>,
    next_hostile_id: u32,

    /// Seconds of play since the session started
    play_time: f64,

    // Update timing
    last_night_tick: f64,
    last_event_roll: f64,
    last_spawn_roll: f64,
}

impl SurvivalEngine {
    /// Start a session. The same config and seed replay the same session.
    ///
    /// The config is not required to pass [`EngineConfig::validate`]; a
    /// schedule with a non-positive interval simply never fires.
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("Starting with an unvalidated config: {}", e);
        }
        Self {
            state: SurvivalState::new(&config.start),
            config,
            rng: StdRng::seed_from_u64(seed),
            hostiles: Vec::new(),
            next_hostile_id: 0,
            play_time: 0.0,
            last_night_tick: 0.0,
            last_event_roll: 0.0,
            last_spawn_roll: 0.0,
        }
    }

    /// Parse, validate, and start.
    pub fn from_json(json: &str, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self::new(EngineConfig::from_json(json)?, seed))
    }

    /// Throw the session away and start a fresh one with the same config.
    /// The RNG stream continues.
    pub fn restart(&mut self) {
        log::info!("Restarting session (was night {})", self.state.night);
        self.state = SurvivalState::new(&self.config.start);
        self.hostiles.clear();
        self.reset_timers();
    }

    /// Advance play time by `delta_seconds` and fire every tick that came due.
    ///
    /// Due ticks fire in time order across all three schedules, so one large
    /// step and many small ones reach the same state. Ended sessions produce
    /// nothing; the caller is expected to stop calling. While a milestone
    /// prompt is open the night clock is held but events and spawns keep
    /// rolling.
    pub fn update(&mut self, delta_seconds: f32) -> Vec<EngineEvent> {
        let mut out = Vec::new();
        if self.state.is_terminal() {
            return out;
        }
        self.play_time += delta_seconds.max(0.0) as f64;

        while let Some((tick, due)) = self.next_due() {
            match tick {
                Tick::Night => {
                    self.last_night_tick = due;
                    out.extend(self.tick_night());
                }
                Tick::Event => {
                    self.last_event_roll = due;
                    match self.roll_event() {
                        Ok(outcome) => out.push(EngineEvent::Event(outcome)),
                        Err(e) => log::debug!("Event roll skipped: {}", e),
                    }
                }
                Tick::Spawn => {
                    self.last_spawn_roll = due;
                    out.extend(self.roll_spawns().into_iter().map(EngineEvent::HostileSpawned));
                }
            }
            if self.state.is_terminal() {
                return out;
            }
        }

        if self.is_prompting() {
            self.last_night_tick = self.play_time;
        }
        out
    }

    /// The earliest schedule that has come due, nights first on a tie.
    fn next_due(&self) -> Option<(Tick, f64)> {
        let cadence = self.config.cadence;
        let night = if self.is_prompting() {
            None
        } else {
            due_at(self.last_night_tick, cadence.night_secs)
        };
        [
            (Tick::Night, night),
            (Tick::Event, due_at(self.last_event_roll, cadence.event_secs)),
            (Tick::Spawn, due_at(self.last_spawn_roll, cadence.spawn_secs)),
        ]
        .into_iter()
        .filter_map(|(tick, due)| due.map(|d| (tick, d)))
        .filter(|&(_, due)| due <= self.play_time)
        .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    fn is_prompting(&self) -> bool {
        matches!(self.state.phase, SessionPhase::Prompting(_))
    }

    /// One night tick: advance, then open a prompt if the new night is a milestone.
    pub fn tick_night(&mut self) -> Vec<EngineEvent> {
        let outcome = advance_night(&mut self.state, &self.config.night);
        match outcome {
            AdvanceOutcome::Continuing(night) => {
                log::info!("Night {} (multiplier {:.2})", night, self.state.multiplier);
                let before = self.hostiles.len();
                self.hostiles.retain(|h| h.night == night);
                if self.hostiles.len() < before {
                    log::debug!("{} hostile(s) dispersed at dawn", before - self.hostiles.len());
                }
                let mut events = vec![EngineEvent::NightAdvanced(night)];
                if let Some(milestone) = check_milestone(&self.state, &self.config.night.milestone) {
                    log::info!("Milestone reached on night {} ({:?})", night, milestone.reason);
                    self.state.phase = SessionPhase::Prompting(milestone);
                    events.push(EngineEvent::MilestoneReached(milestone));
                }
                events
            }
            AdvanceOutcome::Paused(milestone) => {
                log::debug!("Night tick held: prompt open on night {}", milestone.night);
                Vec::new()
            }
            AdvanceOutcome::Terminal(terminal) => {
                log::info!("Session ended on night {}: {:?}", self.state.night, terminal);
                self.hostiles.clear();
                vec![EngineEvent::Ended(terminal)]
            }
        }
    }

    /// Roll the random event table once.
    pub fn roll_event(&mut self) -> Result<EventOutcome, EventError> {
        let outcome = apply_random_event(&mut self.state, &self.config.events, &mut self.rng)?;
        log::debug!(
            "Event {:?} (health {:+}) on night {}",
            outcome.tag,
            outcome.health_delta,
            self.state.night
        );
        Ok(outcome)
    }

    /// Roll the spawn table once and track whatever appears.
    pub fn roll_spawns(&mut self) -> Vec<Hostile> {
        if self.state.is_terminal() {
            return Vec::new();
        }
        let mobs = threats::roll_spawns(&self.config.spawns, self.state.multiplier, &mut self.rng);
        let night = self.state.night;
        let room = combat::MAX_HOSTILES.saturating_sub(self.hostiles.len());
        let spawned: Vec<Hostile> = mobs
            .into_iter()
            .take(room)
            .map(|kind| {
                let id = self.next_hostile_id;
                self.next_hostile_id += 1;
                Hostile { id, kind, night }
            })
            .collect();
        if !spawned.is_empty() {
            log::debug!("Spawned {} hostile(s) on night {}", spawned.len(), night);
        }
        self.hostiles.extend(spawned.iter().copied());
        spawned
    }

    /// Fight a tracked hostile. It is removed whatever the result.
    pub fn engage(&mut self, hostile_id: u32) -> Result<CombatOutcome, CombatError> {
        if let Some(terminal) = self.state.terminal_or_fallen() {
            return Err(CombatError::SessionOver(terminal));
        }
        let index = self
            .hostiles
            .iter()
            .position(|h| h.id == hostile_id)
            .ok_or(CombatError::UnknownHostile(hostile_id))?;
        let hostile = self.hostiles.remove(index);
        let outcome = resolve_combat(&mut self.state, hostile.kind, &self.config.combat, &mut self.rng)?;
        log::info!("Combat with {} #{}: {:?}", hostile.kind.name(), hostile.id, outcome);
        Ok(outcome)
    }

    /// Craft a recipe from the configured book by name.
    pub fn craft(&mut self, recipe: &str) -> Result<CraftOutcome, LedgerError> {
        match craft_named(&mut self.state, &self.config.recipes, recipe) {
            Ok(outcome) => {
                log::info!("Crafted {}", outcome.recipe);
                Ok(outcome)
            }
            Err(e) => {
                log::warn!("Craft '{}' rejected: {}", recipe, e);
                if let LedgerError::InsufficientResources(_) = e {
                    self.state.last_message = "Not enough materials!".to_string();
                }
                Err(e)
            }
        }
    }

    /// Answer the open milestone prompt.
    pub fn resolve_milestone(&mut self, choice: MilestoneChoice) -> Result<Resolution, SessionError> {
        let resolution = session::resolve_milestone(
            &mut self.state,
            choice,
            &self.config.start,
            self.config.lobby_policy,
        )?;
        if let Resolution::Lobby(outcome) = resolution {
            self.after_lobby(outcome);
        }
        Ok(resolution)
    }

    /// Leave for the lobby under the configured policy.
    pub fn return_to_lobby(&mut self) -> Result<LobbyOutcome, SessionError> {
        let outcome =
            session::return_to_lobby(&mut self.state, &self.config.start, self.config.lobby_policy)?;
        self.after_lobby(outcome);
        Ok(outcome)
    }

    fn after_lobby(&mut self, outcome: LobbyOutcome) {
        log::info!(
            "Returned to lobby from night {} ({:?})",
            outcome.left_night,
            outcome.policy
        );
        self.hostiles.clear();
        self.reset_timers();
    }

    fn reset_timers(&mut self) {
        self.last_night_tick = self.play_time;
        self.last_event_roll = self.play_time;
        self.last_spawn_roll = self.play_time;
    }

    pub fn state(&self) -> &SurvivalState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn hostiles(&self) -> &[Hostile] {
        &self.hostiles
    }

    /// Seconds of play since the session started.
    pub fn play_time(&self) -> f64 {
        self.play_time
    }

    pub fn hud(&self) -> HudView {
        HudView::from_state(&self.state)
    }

    /// The prompt to show, if a milestone is open.
    pub fn prompt(&self) -> Option<MilestonePrompt> {
        match self.state.phase {
            SessionPhase::Prompting(m) => Some(MilestonePrompt::new(&m)),
            _ => None,
        }
    }
}

impl Default for SurvivalEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darkwood_logic::config::Cadence;
    use darkwood_logic::events::{EventKind, EventTable};
    use darkwood_logic::threats::{SpawnEntry, SpawnTable};

    fn quiet_config() -> EngineConfig {
        EngineConfig {
            events: EventTable::uniform([EventKind::Nothing]),
            spawns: SpawnTable { entries: vec![] },
            cadence: Cadence {
                night_secs: 10.0,
                event_secs: 10.0,
                spawn_secs: 10.0,
            },
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = SurvivalEngine::default();
        assert_eq!(engine.state().night, 1);
        assert_eq!(engine.play_time(), 0.0);
        assert!(engine.hostiles().is_empty());
    }

    #[test]
    fn test_update_fires_on_cadence() {
        let mut engine = SurvivalEngine::new(quiet_config(), 1);
        assert!(engine.update(9.0).is_empty());
        let events = engine.update(1.0);
        assert!(events.contains(&EngineEvent::NightAdvanced(2)));
        assert_eq!(engine.state().night, 2);
    }

    #[test]
    fn test_large_delta_catches_up() {
        let mut engine = SurvivalEngine::new(quiet_config(), 1);
        engine.update(35.0);
        assert_eq!(engine.state().night, 4);
    }

    #[test]
    fn test_prompt_holds_night_clock() {
        let mut config = quiet_config();
        config.start.night = 98;
        let mut engine = SurvivalEngine::new(config, 1);

        let events = engine.update(10.0);
        assert!(events.iter().any(|e| matches!(e, EngineEvent::MilestoneReached(_))));
        assert!(engine.prompt().is_some());

        engine.update(100.0);
        assert_eq!(engine.state().night, 99);
        assert!(engine.prompt().is_some());
    }

    #[test]
    fn test_terminal_stops_updates() {
        let mut config = quiet_config();
        config.start.night = 99;
        let mut engine = SurvivalEngine::new(config, 1);
        let events = engine.update(10.0);
        assert_eq!(events, vec![EngineEvent::Ended(Terminal::Victory)]);
        assert!(engine.update(1000.0).is_empty());
        assert_eq!(engine.state().night, 99);
    }

    #[test]
    fn test_zero_interval_never_fires() {
        let mut config = quiet_config();
        config.cadence.event_secs = 0.0;
        config.cadence.spawn_secs = -1.0;
        let mut engine = SurvivalEngine::new(config, 1);
        let events = engine.update(25.0);
        assert_eq!(
            events,
            vec![EngineEvent::NightAdvanced(2), EngineEvent::NightAdvanced(3)]
        );
    }

    #[test]
    fn test_due_at() {
        assert_eq!(due_at(10.0, 5.0), Some(15.0));
        assert_eq!(due_at(10.0, 0.0), None);
        assert_eq!(due_at(10.0, f32::NAN), None);
        assert_eq!(due_at(1e300, 1.0), None);
    }

    #[test]
    fn test_fallen_player_keeps_hostiles() {
        let mut config = quiet_config();
        config.start.health = 10;
        config.events = EventTable::uniform([EventKind::TakeDamage { amount: 25 }]);
        config.spawns = SpawnTable {
            entries: vec![SpawnEntry {
                mob: MobKind::Wolf,
                chance: 1.0,
            }],
        };
        let mut engine = SurvivalEngine::new(config, 1);
        engine.update(10.0);
        assert_eq!(engine.state().health, 0);
        let id = engine.hostiles()[0].id;
        assert_eq!(
            engine.engage(id).unwrap_err(),
            CombatError::SessionOver(Terminal::Death)
        );
        assert_eq!(engine.hostiles().len(), 1);
    }

    #[test]
    fn test_engage_unknown_hostile() {
        let mut engine = SurvivalEngine::new(quiet_config(), 1);
        assert_eq!(
            engine.engage(7).unwrap_err(),
            CombatError::UnknownHostile(7)
        );
    }

    #[test]
    fn test_craft_failure_sets_message() {
        let mut engine = SurvivalEngine::new(quiet_config(), 1);
        engine.craft("health_potion").unwrap();
        assert!(engine.craft("health_potion").is_err());
        assert_eq!(engine.state().last_message, "Not enough materials!");
    }
}
