use std::time::Duration;

use hex_defence_core::{Command, EnemyKind, Event, HexCoord, MapBounds, Position};
use hex_defence_system_enemy_ai::{DirectPath, EnemyAi};
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

/// Runs one simulation step: world tick, then the AI pass, then the AI's
/// commands applied back onto the world. Returns every event raised.
fn step(world: &mut World, system: &mut EnemyAi, oracle: &mut DirectPath, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);

    let enemies = query::enemy_view(world);
    let towers = query::tower_view(world);
    let castle = query::castle(world);
    let mut commands = Vec::new();
    system.handle(&events, &enemies, &towers, castle, oracle, &mut commands);

    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn breacher_walks_to_the_castle_and_breaches() {
    let mut world = configured_world();
    let mut system = EnemyAi::new();
    let mut oracle = DirectPath;

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Breacher,
            position: Position::new(0.0, -7.0),
            health: 100,
            speed: 2.0,
        },
        &mut events,
    );

    let mut breached = 0;
    for _ in 0..200 {
        let events = step(&mut world, &mut system, &mut oracle, Duration::from_millis(100));
        breached += events
            .iter()
            .filter(|event| matches!(event, Event::EnemyReachedObjective { .. }))
            .count();
        if breached > 0 {
            break;
        }
    }

    assert_eq!(breached, 1, "breacher must reach the castle exactly once");
    assert!(query::enemy_view(&world).is_empty());
}

#[test]
fn sapper_dismantles_the_tower_then_retargets_the_castle() {
    let mut world = configured_world();
    let mut system = EnemyAi::new();
    let mut oracle = DirectPath;

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::BuildTower {
            cell: HexCoord::new(0, -3),
        },
        &mut events,
    );
    let tower = query::tower_view(&world)
        .iter()
        .next()
        .map(|snapshot| snapshot.id)
        .expect("tower built");

    world::apply(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Sapper,
            position: Position::new(0.0, -8.0),
            health: 80,
            speed: 2.5,
        },
        &mut events,
    );

    let mut destroyed = 0;
    for _ in 0..400 {
        let events = step(&mut world, &mut system, &mut oracle, Duration::from_millis(100));
        destroyed += events
            .iter()
            .filter(|event| matches!(event, Event::TowerDestroyed { .. }))
            .count();
        if destroyed > 0 {
            break;
        }
    }

    assert_eq!(destroyed, 1, "sapper must break the tower");
    assert!(query::tower_view(&world).snapshot(tower).is_none());

    // With no towers left the sapper falls back to the castle.
    let mut castle_assigned = false;
    for _ in 0..5 {
        let _ = step(&mut world, &mut system, &mut oracle, Duration::from_millis(100));
        if let Some(snapshot) = query::enemy_view(&world).iter().next() {
            if snapshot.objective == Some(hex_defence_core::Objective::Castle) {
                castle_assigned = true;
                break;
            }
        }
    }
    assert!(castle_assigned, "sapper should retarget the castle");
}
