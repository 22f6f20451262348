#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits projectile firing commands from targeting data.

use hex_defence_core::{Command, TowerTarget, TowerView};

/// Tower combat system that queues firing commands for ready towers.
///
/// Readiness is owned by the world: each tower accumulates simulated time
/// toward `1 / fire_rate` and the accumulator resets to zero when a shot
/// goes out. This system only reads the resulting flag.
#[derive(Debug, Default)]
pub struct TowerCombat;

impl TowerCombat {
    /// Creates a new tower combat system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits `Command::FireProjectile` entries for towers ready to fire.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        for target in tower_targets {
            let Some(snapshot) = towers.snapshot(target.tower) else {
                continue;
            };

            if snapshot.ready_to_fire {
                out.push(Command::FireProjectile {
                    tower: target.tower,
                    target: target.enemy,
                });
            }
        }
    }
}
