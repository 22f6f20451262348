use std::time::Duration;

use hex_defence_core::{Event, HexCoord};
use hex_defence_game::{Game, GameConfig};

/// Runs a two-minute session with two towers guarding the castle approach
/// and folds every drained event into per-kind counters.
fn run_session(seed: u64, ticks: usize) -> (Game, Vec<Event>) {
    let mut game = Game::new(GameConfig {
        session_seed: seed,
        ..GameConfig::default()
    });

    // Two sentries on the cells flanking the castle: every breacher path
    // converges there, and sappers come to them.
    let _ = game.build(HexCoord::new(0, 4)).expect("first tower");
    let _ = game.build(HexCoord::new(1, 3)).expect("second tower");

    let mut events = Vec::new();
    for _ in 0..ticks {
        game.tick(Duration::from_millis(100));
        events.extend(game.drain_events());
    }
    (game, events)
}

#[test]
fn every_enemy_resolves_exactly_one_terminal_outcome() {
    let (game, events) = run_session(7, 1800);

    let spawned = events
        .iter()
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count();
    let died = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyDied { .. }))
        .count();
    let breached = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyReachedObjective { .. }))
        .count();
    let still_active = game.enemy_view().len();

    assert!(spawned > 0, "waves must spawn enemies");
    assert_eq!(
        died + breached + still_active,
        spawned,
        "every spawned enemy is either active or raised exactly one terminal event",
    );

    let stats = game.stats();
    assert_eq!(stats.kills as usize, died);
    assert_eq!(stats.breaches as usize, breached);
}

#[test]
fn towers_earn_reputation_for_kills() {
    let (game, events) = run_session(7, 1800);

    assert!(game.stats().kills > 0, "sentries at the choke point must score kills");
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ReputationChanged { .. })));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ProjectileFired { .. })));
}

#[test]
fn supply_drips_during_a_long_session() {
    let (_, events) = run_session(11, 1800);

    let drips = events
        .iter()
        .filter(|event| matches!(event, Event::SupplyGranted { .. }))
        .count();
    // 180 simulated seconds with a 20-second interval.
    assert_eq!(drips, 9);
}

#[test]
fn difficulty_advances_past_the_first_wave() {
    let (game, _) = run_session(13, 1800);
    assert!(game.wave() > 1);
}

#[test]
fn equal_seeds_replay_identical_sessions() {
    let (first_game, first_events) = run_session(42, 600);
    let (second_game, second_events) = run_session(42, 600);

    assert_eq!(first_events, second_events, "replay diverged between runs");
    assert_eq!(first_game.stats().kills, second_game.stats().kills);
    assert_eq!(first_game.stats().breaches, second_game.stats().breaches);
}
