#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use hex_defence_core::{EnemyId, EnemyView, TowerTarget, TowerView};

/// Tower targeting system that selects the nearest enemy inside each tower's
/// detection radius.
///
/// Selection runs from fresh views every tick, so a target that died or left
/// the radius since the previous tick simply stops being selected; stale
/// references cannot survive a recomputation.
#[derive(Debug, Default)]
pub struct TowerTargeting;

impl TowerTargeting {
    /// Creates a new tower targeting system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Distance ties resolve to the enemy encountered first in
    /// the id-ordered view.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if enemies.is_empty() {
            return;
        }

        for tower in towers.iter() {
            let range_squared = tower.range * tower.range;
            let mut best: Option<(f32, EnemyId)> = None;

            for enemy in enemies.iter() {
                let distance_squared = tower.position.distance_squared_to(enemy.position);
                if distance_squared > range_squared {
                    continue;
                }

                match best {
                    Some((best_distance, _)) if distance_squared >= best_distance => {}
                    _ => best = Some((distance_squared, enemy.id)),
                }
            }

            if let Some((_, enemy)) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy,
                });
            }
        }
    }
}
