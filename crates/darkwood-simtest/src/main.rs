//! Darkwood Headless Session Harness
//!
//! Validates the survival rules and the shipped config without a renderer.
//! Sessions run in-process on seeded RNGs, so every run is reproducible.
//!
//! Usage:
//!   cargo run -p darkwood-simtest
//!   cargo run -p darkwood-simtest -- --verbose

use darkwood_core::prelude::*;
use darkwood_logic::clock::{self, AdvanceOutcome, MilestoneReason, NightRules};
use darkwood_logic::events::{self, EventKind, EventTable};
use darkwood_logic::hub::{HubProfile, MiniGameRegistry};
use darkwood_logic::hud::{self, HubView, MilestonePrompt};
use darkwood_logic::ledger::{self, LedgerError};
use darkwood_logic::resources::ResourceKind;
use darkwood_logic::session::{self, LobbyPolicy, Resolution};
use darkwood_logic::state::StartingState;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Shipped config (same JSON a game client loads) ──────────────────────
const CONFIG_JSON: &str = include_str!("../../../data/darkwood.json");

const SESSION_SEEDS: u64 = 25;
const MAX_STEPS: usize = 20_000;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Darkwood Session Harness ===\n");

    let mut results = Vec::new();

    // 1. Config file validation
    let config = match validate_config(&mut results) {
        Some(config) => config,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 2. Crafting ledger
    results.extend(validate_crafting(&config));

    // 3. Random event clamping
    results.extend(validate_events(&config));

    // 4. Night clock & milestones
    results.extend(validate_night_clock(&config));

    // 5. Terminal states
    results.extend(validate_terminality(&config));

    // 6. Full sessions over many seeds
    results.extend(validate_sessions(&config));

    // 7. Social hub
    results.extend(validate_hub());

    if !report(&results, verbose) {
        std::process::exit(1);
    }
}

/// Print the summary; returns `true` when every check passed.
fn report(results: &[TestResult], verbose: bool) -> bool {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );
    failed == 0
}

// ── 1. Config ───────────────────────────────────────────────────────────

fn validate_config(results: &mut Vec<TestResult>) -> Option<EngineConfig> {
    println!("--- Config ---");

    let config = match EngineConfig::from_json(CONFIG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "config_parse".into(),
                passed: false,
                detail: format!("{}", e),
            });
            return None;
        }
    };

    results.push(TestResult {
        name: "config_parse".into(),
        passed: true,
        detail: format!(
            "{} recipes, {} events, {} spawn entries",
            config.recipes.len(),
            config.events.entries.len(),
            config.spawns.entries.len()
        ),
    });

    // The potion recipe is what keeps long sessions alive
    let potion = config.recipes.get("health_potion");
    results.push(TestResult {
        name: "config_has_potion".into(),
        passed: potion.map(|r| r.health > 0).unwrap_or(false),
        detail: match potion {
            Some(r) => format!("heals {} / raises max by {}", r.health, r.max_health),
            None => "health_potion missing".into(),
        },
    });

    let rule = &config.night.milestone;
    results.push(TestResult {
        name: "config_final_night".into(),
        passed: rule.final_night >= config.start.night,
        detail: format!(
            "start night {}, final night {}",
            config.start.night, rule.final_night
        ),
    });

    // Serialized form must parse back to the same config
    let round_trip = config
        .to_json()
        .ok()
        .and_then(|json| EngineConfig::from_json(&json).ok());
    results.push(TestResult {
        name: "config_round_trip".into(),
        passed: round_trip.as_ref() == Some(&config),
        detail: "to_json → from_json preserves every field".into(),
    });

    Some(config)
}

// ── 2. Crafting ─────────────────────────────────────────────────────────

fn validate_crafting(config: &EngineConfig) -> Vec<TestResult> {
    println!("--- Crafting ---");
    let mut results = Vec::new();

    // Starting kit affords exactly one potion
    let mut state = SurvivalState::new(&config.start);
    let first = ledger::craft_named(&mut state, &config.recipes, "health_potion");
    let second = ledger::craft_named(&mut state, &config.recipes, "health_potion");
    results.push(TestResult {
        name: "craft_starting_kit".into(),
        passed: first.is_ok() && matches!(second, Err(LedgerError::InsufficientResources(_))),
        detail: format!(
            "first: {}, second: {}",
            hud::describe_craft(&first),
            hud::describe_craft(&second)
        ),
    });

    // A failed craft leaves the state untouched
    let before = state.clone();
    let _ = ledger::craft_named(&mut state, &config.recipes, "health_potion");
    results.push(TestResult {
        name: "craft_failure_atomic".into(),
        passed: state == before,
        detail: format!("inventory after failure: {}", state.inventory),
    });

    // Health never exceeds max after any craft
    let mut bounded = true;
    for recipe in config.recipes.iter() {
        let mut s = SurvivalState::new(&config.start);
        s.inventory.grant(&recipe.inputs);
        if ledger::craft(&mut s, recipe).is_ok() && s.health > s.max_health {
            bounded = false;
        }
    }
    results.push(TestResult {
        name: "craft_health_bounded".into(),
        passed: bounded,
        detail: "health ≤ max_health after every recipe".into(),
    });

    // Unknown names are rejected without mutation
    let mut s = SurvivalState::new(&config.start);
    let unknown = ledger::craft_named(&mut s, &config.recipes, "no_such_recipe");
    results.push(TestResult {
        name: "craft_unknown_recipe".into(),
        passed: matches!(unknown, Err(LedgerError::InvalidRecipe(_)))
            && s == SurvivalState::new(&config.start),
        detail: hud::describe_craft(&unknown),
    });

    results
}

// ── 3. Events ───────────────────────────────────────────────────────────

fn validate_events(config: &EngineConfig) -> Vec<TestResult> {
    println!("--- Random Events ---");
    let mut results = Vec::new();

    // Heavy damage clamps at zero and leaves the session active
    let table = EventTable::uniform([EventKind::TakeDamage { amount: 1_000 }]);
    let mut state = SurvivalState::new(&config.start);
    let mut rng = StdRng::seed_from_u64(1);
    let outcome = events::apply_random_event(&mut state, &table, &mut rng);
    results.push(TestResult {
        name: "event_damage_clamps".into(),
        passed: state.health == 0 && state.phase == SessionPhase::Active,
        detail: match outcome {
            Ok(o) => format!("{} → health {}", hud::describe_event(&o), state.health),
            Err(e) => format!("error: {}", e),
        },
    });

    // Sweep the shipped table; health stays within bounds throughout
    let mut state = SurvivalState::new(&config.start);
    let mut rng = StdRng::seed_from_u64(2);
    let mut in_bounds = true;
    let mut rolls = 0;
    for _ in 0..1_000 {
        if events::apply_random_event(&mut state, &config.events, &mut rng).is_err() {
            break;
        }
        rolls += 1;
        if state.health < 0 || state.health > state.max_health {
            in_bounds = false;
        }
    }
    // Rolls only stop once the player has fallen
    results.push(TestResult {
        name: "event_sweep_bounds".into(),
        passed: in_bounds && (rolls == 1_000 || state.health == 0),
        detail: format!(
            "{} rolls, health {}, final inventory {}",
            rolls, state.health, state.inventory
        ),
    });

    // A fallen player cannot craft their way back
    let mut fallen = SurvivalState::new(&config.start);
    fallen.change_health(-fallen.max_health);
    let revive = ledger::craft_named(&mut fallen, &config.recipes, "health_potion");
    let outcome = clock::advance_night(&mut fallen, &config.night);
    results.push(TestResult {
        name: "event_no_revive_at_zero".into(),
        passed: revive.is_err() && outcome == AdvanceOutcome::Terminal(Terminal::Death),
        detail: hud::describe_advance(&outcome),
    });

    results
}

// ── 4. Night Clock ──────────────────────────────────────────────────────

fn validate_night_clock(config: &EngineConfig) -> Vec<TestResult> {
    println!("--- Night Clock ---");
    let mut results = Vec::new();
    let rules = &config.night;

    // Milestones over the whole range
    let hits: Vec<u32> = (1..=rules.milestone.final_night)
        .filter(|&n| clock::milestone_for(n, &rules.milestone).is_some())
        .collect();
    results.push(TestResult {
        name: "milestone_nights".into(),
        passed: hits.last() == Some(&rules.milestone.final_night),
        detail: format!("milestones at {:?}", hits),
    });

    let final_reason = clock::milestone_for(rules.milestone.final_night, &rules.milestone)
        .map(|m| m.reason);
    results.push(TestResult {
        name: "milestone_final_reason".into(),
        passed: final_reason == Some(MilestoneReason::FinalNight),
        detail: format!("{:?}", final_reason),
    });

    // Night index is strictly increasing while active
    let start = StartingState {
        night: 1,
        ..config.start.clone()
    };
    let mut state = SurvivalState::new(&start);
    let mut monotonic = true;
    let mut last = state.night;
    while let AdvanceOutcome::Continuing(n) = clock::advance_night(&mut state, rules) {
        if n != last + 1 {
            monotonic = false;
        }
        last = n;
    }
    results.push(TestResult {
        name: "night_monotonic".into(),
        passed: monotonic && state.phase == SessionPhase::Won,
        detail: format!("stopped at night {} ({})", state.night, state.phase.label()),
    });

    // Reward is granted once per advanced night
    let expected_food = (rules.milestone.final_night - 1) * rules.reward.get(&ResourceKind::Food);
    results.push(TestResult {
        name: "night_rewards".into(),
        passed: state.inventory.count(&ResourceKind::Food) == expected_food,
        detail: format!(
            "{} food after {} nights",
            state.inventory.count(&ResourceKind::Food),
            state.night
        ),
    });

    // A paused state does not advance
    let mut paused = SurvivalState::new(&config.start);
    if let Some(m) = clock::check_milestone(&paused, &config.night.milestone) {
        paused.phase = SessionPhase::Prompting(m);
    } else {
        paused.night = rules.milestone.final_night;
        paused.phase = SessionPhase::Prompting(Milestone {
            night: paused.night,
            reason: MilestoneReason::FinalNight,
        });
    }
    let night = paused.night;
    let outcome = clock::advance_night(&mut paused, &NightRules::default());
    results.push(TestResult {
        name: "night_paused_while_prompting".into(),
        passed: matches!(outcome, AdvanceOutcome::Paused(_)) && paused.night == night,
        detail: hud::describe_advance(&outcome),
    });

    results
}

// ── 5. Terminality ──────────────────────────────────────────────────────

fn validate_terminality(config: &EngineConfig) -> Vec<TestResult> {
    println!("--- Terminal States ---");
    let mut results = Vec::new();

    let mut dead = SurvivalState::new(&config.start);
    session::on_death(&mut dead);
    let snapshot = dead.clone();
    let mut rng = StdRng::seed_from_u64(3);

    let advance = clock::advance_night(&mut dead, &config.night);
    let craft = ledger::craft_named(&mut dead, &config.recipes, "health_potion");
    let event = events::apply_random_event(&mut dead, &config.events, &mut rng);
    let lobby = session::return_to_lobby(&mut dead, &config.start, config.lobby_policy);

    let unchanged = SurvivalState {
        last_message: snapshot.last_message.clone(),
        ..dead.clone()
    } == snapshot;
    results.push(TestResult {
        name: "death_is_terminal".into(),
        passed: matches!(advance, AdvanceOutcome::Terminal(Terminal::Death))
            && craft.is_err()
            && event.is_err()
            && lobby.is_err()
            && unchanged,
        detail: format!("health {}, phase {}", dead.health, dead.phase.label()),
    });

    // Victory on the final night needs Continue first
    let mut state = SurvivalState::new(&StartingState {
        night: config.night.milestone.final_night,
        ..config.start.clone()
    });
    let milestone = clock::check_milestone(&state, &config.night.milestone);
    if let Some(m) = milestone {
        state.phase = SessionPhase::Prompting(m);
    }
    let prompt = milestone.map(|m| MilestonePrompt::new(&m).text);
    let resolution = session::resolve_milestone(
        &mut state,
        MilestoneChoice::Continue,
        &config.start,
        LobbyPolicy::KeepProgress,
    );
    let outcome = clock::advance_night(&mut state, &config.night);
    results.push(TestResult {
        name: "victory_after_continue".into(),
        passed: matches!(resolution, Ok(Resolution::Continued))
            && outcome == AdvanceOutcome::Terminal(Terminal::Victory)
            && state.phase == SessionPhase::Won,
        detail: format!(
            "{} → {}",
            prompt.unwrap_or_default(),
            hud::describe_advance(&outcome)
        ),
    });

    results
}

// ── 6. Sessions ─────────────────────────────────────────────────────────

fn validate_sessions(config: &EngineConfig) -> Vec<TestResult> {
    println!("--- Sessions ({} seeds) ---", SESSION_SEEDS);
    let mut results = Vec::new();

    let mut deaths = 0;
    let mut victories = 0;
    let mut unfinished = 0;
    let mut bounds_ok = true;
    let mut single_end = true;
    let mut longest = 0;

    for seed in 0..SESSION_SEEDS {
        let mut engine = SurvivalEngine::new(config.clone(), seed);
        let mut ends = 0;
        for _ in 0..MAX_STEPS {
            let events = engine.update(config.cadence.spawn_secs);
            ends += events
                .iter()
                .filter(|e| matches!(e, EngineEvent::Ended(_)))
                .count();

            play_turn(&mut engine);

            let s = engine.state();
            if s.health < 0 || s.health > s.max_health || s.multiplier < 1.0 {
                bounds_ok = false;
            }
            if s.is_terminal() {
                break;
            }
        }

        let state = engine.state();
        longest = longest.max(state.night);
        match state.terminal() {
            Some(Terminal::Death) => deaths += 1,
            Some(Terminal::Victory) => victories += 1,
            None => unfinished += 1,
        }
        if state.is_terminal() && ends != 1 {
            single_end = false;
        }
    }

    results.push(TestResult {
        name: "sessions_terminate".into(),
        passed: unfinished == 0,
        detail: format!(
            "{} deaths, {} victories, {} unfinished, longest night {}",
            deaths, victories, unfinished, longest
        ),
    });
    results.push(TestResult {
        name: "sessions_bounds".into(),
        passed: bounds_ok,
        detail: "health and multiplier stayed in range every step".into(),
    });
    results.push(TestResult {
        name: "sessions_single_end".into(),
        passed: single_end,
        detail: "exactly one Ended event per finished session".into(),
    });

    // Same seed, same session
    let run = |seed| {
        let mut engine = SurvivalEngine::new(config.clone(), seed);
        for _ in 0..500 {
            engine.update(config.cadence.spawn_secs);
            play_turn(&mut engine);
        }
        engine.state().clone()
    };
    results.push(TestResult {
        name: "sessions_deterministic".into(),
        passed: run(11) == run(11),
        detail: "seed 11 replayed twice".into(),
    });

    results
}

/// A simple player: heal when low, fight whatever shows up, always continue.
fn play_turn(engine: &mut SurvivalEngine) {
    if engine.prompt().is_some() {
        if let Err(e) = engine.resolve_milestone(MilestoneChoice::Continue) {
            log::warn!("continue rejected: {}", e);
        }
    }
    let state = engine.state();
    if !state.is_terminal() && state.health * 2 < state.max_health {
        let _ = engine.craft("bandage");
        let _ = engine.craft("health_potion");
    }
    let ids: Vec<u32> = engine.hostiles().iter().map(|h| h.id).collect();
    for id in ids {
        if engine.engage(id).is_err() {
            break;
        }
    }
}

// ── 7. Social Hub ───────────────────────────────────────────────────────

fn validate_hub() -> Vec<TestResult> {
    println!("--- Social Hub ---");
    let mut results = Vec::new();

    let mut profile = HubProfile::default();
    let _ = profile.add_friend("Alex");
    let _ = profile.add_friend("Sam");
    let duplicate = profile.add_friend("Alex");
    results.push(TestResult {
        name: "hub_friends".into(),
        passed: profile.friends.len() == 2 && duplicate.is_err(),
        detail: format!("{} friends, xp {}", profile.friends.len(), profile.xp),
    });

    let notices = profile.claim_daily_reward(1).unwrap_or_default();
    let again = profile.claim_daily_reward(1);
    results.push(TestResult {
        name: "hub_daily_reward_once".into(),
        passed: !notices.is_empty() && again.is_err(),
        detail: notices
            .iter()
            .map(hud::describe_notice)
            .collect::<Vec<_>>()
            .join(" | "),
    });

    let mut games = MiniGameRegistry::new();
    games.register("Fishing", "Catch the biggest fish");
    let mut rng = StdRng::seed_from_u64(4);
    let mut wins = 0;
    for _ in 0..200 {
        if let Ok(result) = games.play(&mut profile, "Fishing", Some("Sam"), &mut rng) {
            if result.won {
                wins += 1;
            }
        }
    }
    let view = HubView::from_profile(&profile);
    results.push(TestResult {
        name: "hub_mini_games".into(),
        passed: wins > 50 && wins < 150 && profile.level > 1,
        detail: format!("{} wins / 200; {} | {}", wins, view.player, view.coins),
    });

    results
}
