use std::time::Duration;

use hex_defence_core::{Command, Event, MapBounds, Position};
use hex_defence_system_spawning::{Config, Spawning};
use hex_defence_world::{self as world, query, World};

fn configured_world() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureMap {
            bounds: MapBounds::new(Position::new(-25.0, -25.0), Position::new(25.0, 25.0)),
            hex_radius: 1.0,
            castle: Position::new(0.3, 6.6),
        },
        &mut events,
    );
    world
}

#[test]
fn spawned_commands_register_enemies_up_to_the_cap() {
    let mut world = configured_world();
    let mut spawning = Spawning::new(Config::default(), 0x1234_5678);
    spawning.start();

    let castle = query::castle(&world);
    let mut spawned = 0;

    // Two simulated minutes at a half-second tick.
    for _ in 0..240 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(500),
            },
            &mut events,
        );

        let active = query::enemy_view(&world).len();
        let mut commands = Vec::new();
        spawning.handle(&events, castle, active, &mut commands);

        for command in commands {
            let mut spawn_events = Vec::new();
            world::apply(&mut world, command, &mut spawn_events);
            spawned += spawn_events
                .iter()
                .filter(|event| matches!(event, Event::EnemySpawned { .. }))
                .count();
        }

        assert!(
            query::enemy_view(&world).len() <= Config::default().max_enemies,
            "population must never exceed the cap",
        );
    }

    assert!(spawned > 0, "expected at least one spawn");
    assert_eq!(
        query::enemy_view(&world).len(),
        Config::default().max_enemies,
        "idle enemies should fill the cap",
    );
    assert!(spawning.wave() > 1, "difficulty should have advanced");
}

#[test]
fn replay_with_equal_seeds_produces_identical_worlds() {
    let run = |seed: u64| {
        let mut world = configured_world();
        let mut spawning = Spawning::new(Config::default(), seed);
        spawning.start();
        let castle = query::castle(&world);

        for _ in 0..120 {
            let mut events = Vec::new();
            world::apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(500),
                },
                &mut events,
            );

            let active = query::enemy_view(&world).len();
            let mut commands = Vec::new();
            spawning.handle(&events, castle, active, &mut commands);
            for command in commands {
                world::apply(&mut world, command, &mut Vec::new());
            }
        }

        query::enemy_view(&world)
            .into_vec()
            .into_iter()
            .map(|snapshot| (snapshot.id, snapshot.kind, snapshot.health, snapshot.position))
            .collect::<Vec<_>>()
    };

    assert_eq!(run(42), run(42), "replay diverged between runs");
    assert_ne!(run(42), run(43), "distinct seeds should diverge");
}
