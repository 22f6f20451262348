#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter that scripts a Hex Defence session.

use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use hex_defence_core::{Event, HexCoord, ResourceKind};
use hex_defence_game::{Game, GameConfig};

/// Runs a scripted defence session and prints the outcome.
#[derive(Debug, Parser)]
#[command(name = "hex-defence")]
struct Args {
    /// Seed driving every randomized decision in the session.
    #[arg(long, default_value_t = 0x6865_7864)]
    seed: u64,

    /// Simulated session length in seconds.
    #[arg(long, default_value_t = 120)]
    seconds: u64,

    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.tick_ms == 0 {
        bail!("tick length must be positive");
    }

    let mut game = Game::new(GameConfig {
        session_seed: args.seed,
        ..GameConfig::default()
    });

    // Two sentries guarding the castle approach; the first build starts the
    // waves.
    for cell in [HexCoord::new(0, 4), HexCoord::new(1, 3)] {
        let tower = game
            .build(cell)
            .with_context(|| format!("building on cell ({}, {})", cell.q(), cell.r()))?;
        println!("built tower {} on cell ({}, {})", tower.get(), cell.q(), cell.r());
    }

    let dt = Duration::from_millis(args.tick_ms);
    let ticks = (args.seconds * 1000) / args.tick_ms;
    for _ in 0..ticks {
        game.tick(dt);
        for event in game.drain_events() {
            match event {
                Event::RankChanged { rank } => println!("rank up: now rank {}", rank.get()),
                Event::SupplyGranted {
                    wood,
                    people,
                    stone,
                } => println!("supply arrived: +{wood} wood, +{people} people, +{stone} stone"),
                Event::TowerDestroyed { tower, .. } => {
                    println!("tower {} was destroyed", tower.get());
                }
                _ => {}
            }
        }
    }

    let stats = game.stats();
    println!("--- after {} simulated seconds ---", args.seconds);
    println!("wave reached:    {}", game.wave());
    println!("enemies killed:  {}", stats.kills);
    println!("castle breaches: {}", stats.breaches);
    println!("towers lost:     {}", stats.towers_lost);
    println!(
        "reputation {} (rank {})",
        game.reputation(),
        game.rank().get()
    );
    println!(
        "stockpile: {} wood, {} people, {} stone",
        game.resource(ResourceKind::Wood),
        game.resource(ResourceKind::People),
        game.resource(ResourceKind::Stone)
    );

    Ok(())
}
