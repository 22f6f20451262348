#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic enemy AI system: objective acquisition, path following,
//! stuck detection, and attack resolution.

use std::collections::BTreeMap;
use std::time::Duration;

use hex_defence_core::{
    AttackKind, Command, EnemyId, EnemySnapshot, EnemyView, Event, Objective, Position,
    TargetKind, TowerView,
};

/// Net displacement below which an enemy counts as making no progress.
const STUCK_EPSILON: f32 = 0.1;

/// Time an enemy may make no progress before a path replan is forced.
const STUCK_DURATION: Duration = Duration::from_secs(2);

/// Navigation seam consulted for the next waypoint toward a goal.
///
/// The mesh and its internals stay a black box; the AI only ever asks for
/// the next point to walk toward and, on stuck recovery, for a replan.
pub trait PathOracle {
    /// Next waypoint on the route from `from` to `goal`.
    fn next_waypoint(&mut self, enemy: EnemyId, from: Position, goal: Position) -> Position;

    /// Drops any cached route for the enemy so the next waypoint query
    /// recomputes from scratch.
    fn replan(&mut self, enemy: EnemyId);
}

/// Straight-line oracle used when no navigation mesh is wired in.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectPath;

impl PathOracle for DirectPath {
    fn next_waypoint(&mut self, _enemy: EnemyId, _from: Position, goal: Position) -> Position {
        goal
    }

    fn replan(&mut self, _enemy: EnemyId) {}
}

#[derive(Clone, Copy, Debug)]
struct ProgressTracker {
    last_position: Position,
    stuck_timer: Duration,
}

/// Pure system that reacts to world events and emits enemy commands.
#[derive(Debug, Default)]
pub struct EnemyAi {
    trackers: BTreeMap<EnemyId, ProgressTracker>,
}

impl EnemyAi {
    /// Creates a new enemy AI system with no tracked enemies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and immutable views to emit enemy commands.
    ///
    /// Commands follow a fixed per-enemy order: objective acquisition when
    /// the current objective is invalid or the acquisition interval elapsed,
    /// then stuck recovery, then either attack resolution (in range) or a
    /// movement step toward the oracle's waypoint.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        towers: &TowerView,
        castle: Position,
        oracle: &mut dyn PathOracle,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                elapsed = elapsed.saturating_add(*dt);
            }
        }

        self.trackers
            .retain(|id, _| enemies.snapshot(*id).is_some());

        if elapsed.is_zero() {
            return;
        }

        for enemy in enemies.iter() {
            let objective = self.resolve_objective(enemy, towers, castle, out);
            let Some(objective) = objective else {
                continue;
            };

            let Some(goal) = objective_position(objective, towers, castle) else {
                continue;
            };

            self.track_progress(enemy, elapsed, oracle);

            if enemy.position.distance_to(goal) <= enemy.kind.attack_range() {
                self.resolve_attack(enemy, objective, out);
                continue;
            }

            let waypoint = oracle.next_waypoint(enemy.id, enemy.position, goal);
            let step = enemy.speed * elapsed.as_secs_f32();
            out.push(Command::MoveEnemy {
                enemy: enemy.id,
                to: enemy.position.stepped_toward(waypoint, step),
            });
        }
    }

    /// Returns the objective the enemy should pursue this tick, emitting an
    /// assignment command when acquisition ran.
    fn resolve_objective(
        &mut self,
        enemy: &EnemySnapshot,
        towers: &TowerView,
        castle: Position,
        out: &mut Vec<Command>,
    ) -> Option<Objective> {
        let current = enemy.objective.filter(|objective| match objective {
            Objective::Castle => true,
            Objective::Tower(tower) => towers.snapshot(*tower).is_some(),
        });

        if current.is_some() && !enemy.retarget_due {
            return current;
        }

        // The assignment also goes out when re-acquisition confirms the
        // existing objective, so the world resets the acquisition interval.
        let acquired = acquire(enemy.kind.target_priorities(), enemy.position, towers)?;
        out.push(Command::AssignObjective {
            enemy: enemy.id,
            objective: acquired,
        });
        Some(acquired)
    }

    fn track_progress(
        &mut self,
        enemy: &EnemySnapshot,
        elapsed: Duration,
        oracle: &mut dyn PathOracle,
    ) {
        let tracker = self
            .trackers
            .entry(enemy.id)
            .or_insert(ProgressTracker {
                last_position: enemy.position,
                stuck_timer: Duration::ZERO,
            });

        let moved = tracker.last_position.distance_to(enemy.position);
        if moved < STUCK_EPSILON {
            tracker.stuck_timer = tracker.stuck_timer.saturating_add(elapsed);
            if tracker.stuck_timer >= STUCK_DURATION {
                oracle.replan(enemy.id);
                tracker.stuck_timer = Duration::ZERO;
            }
        } else {
            tracker.stuck_timer = Duration::ZERO;
        }
        tracker.last_position = enemy.position;
    }

    fn resolve_attack(&self, enemy: &EnemySnapshot, objective: Objective, out: &mut Vec<Command>) {
        // Castle contact is always terminal, whatever the attack kind: the
        // castle cannot be whittled down by sustained strikes.
        let one_shot =
            matches!(objective, Objective::Castle) || enemy.kind.attack() == AttackKind::OneShot;

        if one_shot {
            out.push(Command::ResolveArrival { enemy: enemy.id });
        } else if enemy.ready_to_strike {
            out.push(Command::StrikeObjective { enemy: enemy.id });
        }
    }
}

fn objective_position(
    objective: Objective,
    towers: &TowerView,
    castle: Position,
) -> Option<Position> {
    match objective {
        Objective::Castle => Some(castle),
        Objective::Tower(tower) => towers.snapshot(tower).map(|snapshot| snapshot.position),
    }
}

/// Walks the archetype's priority list and resolves the first satisfiable
/// entry: the nearest alive tower, or the castle landmark.
fn acquire(
    priorities: &[TargetKind],
    position: Position,
    towers: &TowerView,
) -> Option<Objective> {
    for target_kind in priorities {
        match target_kind {
            TargetKind::Tower => {
                let mut best: Option<(f32, Objective)> = None;
                for tower in towers.iter() {
                    let distance_squared = position.distance_squared_to(tower.position);
                    match best {
                        Some((best_distance, _)) if distance_squared >= best_distance => {}
                        _ => best = Some((distance_squared, Objective::Tower(tower.id))),
                    }
                }
                if let Some((_, objective)) = best {
                    return Some(objective);
                }
            }
            TargetKind::Castle => return Some(Objective::Castle),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_defence_core::{EnemyKind, HexCoord, TowerId, TowerKind, TowerSnapshot};

    const CASTLE: Position = Position::new(0.0, 10.0);

    #[derive(Debug, Default)]
    struct CountingOracle {
        replans: usize,
    }

    impl PathOracle for CountingOracle {
        fn next_waypoint(&mut self, _enemy: EnemyId, _from: Position, goal: Position) -> Position {
            goal
        }

        fn replan(&mut self, _enemy: EnemyId) {
            self.replans += 1;
        }
    }

    fn tower_snapshot(id: u32, position: Position) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKind::Sentry,
            cell: HexCoord::new(0, 0),
            position,
            level: 1,
            health: 100,
            max_health: 100,
            damage: 25,
            range: 5.0,
            ready_to_fire: false,
        }
    }

    fn enemy_snapshot(id: u32, kind: EnemyKind, position: Position) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind,
            position,
            health: kind.base_health(),
            max_health: kind.base_health(),
            speed: kind.base_speed(),
            objective: None,
            ready_to_strike: false,
            retarget_due: true,
        }
    }

    fn tick_events(dt: Duration) -> Vec<Event> {
        vec![Event::TimeAdvanced { dt }]
    }

    #[test]
    fn breacher_acquires_the_castle() {
        let mut system = EnemyAi::new();
        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(
            1,
            EnemyKind::Breacher,
            Position::new(0.0, 0.0),
        )]);
        let towers = TowerView::from_snapshots(vec![tower_snapshot(1, Position::new(1.0, 0.0))]);
        let mut oracle = DirectPath;
        let mut out = Vec::new();

        system.handle(
            &tick_events(Duration::from_millis(500)),
            &enemies,
            &towers,
            CASTLE,
            &mut oracle,
            &mut out,
        );

        assert!(out.contains(&Command::AssignObjective {
            enemy: EnemyId::new(1),
            objective: Objective::Castle,
        }));
    }

    #[test]
    fn sapper_prefers_nearest_tower_and_falls_back_to_castle() {
        let mut system = EnemyAi::new();
        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(
            1,
            EnemyKind::Sapper,
            Position::new(0.0, 0.0),
        )]);
        let towers = TowerView::from_snapshots(vec![
            tower_snapshot(4, Position::new(8.0, 0.0)),
            tower_snapshot(9, Position::new(3.0, 0.0)),
        ]);
        let mut oracle = DirectPath;
        let mut out = Vec::new();

        system.handle(
            &tick_events(Duration::from_millis(500)),
            &enemies,
            &towers,
            CASTLE,
            &mut oracle,
            &mut out,
        );
        assert!(out.contains(&Command::AssignObjective {
            enemy: EnemyId::new(1),
            objective: Objective::Tower(TowerId::new(9)),
        }));

        out.clear();
        let no_towers = TowerView::from_snapshots(Vec::new());
        system.handle(
            &tick_events(Duration::from_millis(500)),
            &enemies,
            &no_towers,
            CASTLE,
            &mut oracle,
            &mut out,
        );
        assert!(out.contains(&Command::AssignObjective {
            enemy: EnemyId::new(1),
            objective: Objective::Castle,
        }));
    }

    #[test]
    fn movement_steps_toward_the_waypoint_at_speed() {
        let mut system = EnemyAi::new();
        let mut enemy = enemy_snapshot(1, EnemyKind::Breacher, Position::new(0.0, 0.0));
        enemy.objective = Some(Objective::Castle);
        enemy.retarget_due = false;
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let towers = TowerView::from_snapshots(Vec::new());
        let mut oracle = DirectPath;
        let mut out = Vec::new();

        system.handle(
            &tick_events(Duration::from_secs(1)),
            &enemies,
            &towers,
            CASTLE,
            &mut oracle,
            &mut out,
        );

        // Base breacher speed is 2.0: one second moves two units along +y.
        assert_eq!(out.len(), 1);
        let Command::MoveEnemy { enemy, to } = out[0] else {
            panic!("unexpected command emitted: {:?}", out[0]);
        };
        assert_eq!(enemy, EnemyId::new(1));
        assert!(to.x().abs() < 1e-5);
        assert!((to.y() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn breacher_in_range_resolves_arrival() {
        let mut system = EnemyAi::new();
        let mut enemy = enemy_snapshot(1, EnemyKind::Breacher, Position::new(0.0, 9.2));
        enemy.objective = Some(Objective::Castle);
        enemy.retarget_due = false;
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let towers = TowerView::from_snapshots(Vec::new());
        let mut oracle = DirectPath;
        let mut out = Vec::new();

        system.handle(
            &tick_events(Duration::from_millis(500)),
            &enemies,
            &towers,
            CASTLE,
            &mut oracle,
            &mut out,
        );

        assert_eq!(out, vec![Command::ResolveArrival { enemy: EnemyId::new(1) }]);
    }

    #[test]
    fn sapper_strikes_only_when_cooldown_is_ready() {
        let mut system = EnemyAi::new();
        let tower = tower_snapshot(3, Position::new(1.0, 0.0));
        let towers = TowerView::from_snapshots(vec![tower]);

        let mut enemy = enemy_snapshot(1, EnemyKind::Sapper, Position::new(0.0, 0.0));
        enemy.objective = Some(Objective::Tower(TowerId::new(3)));
        enemy.retarget_due = false;

        let mut oracle = DirectPath;
        let mut out = Vec::new();
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        system.handle(
            &tick_events(Duration::from_millis(500)),
            &enemies,
            &towers,
            CASTLE,
            &mut oracle,
            &mut out,
        );
        assert!(out.is_empty(), "cooldown not ready: no strike, no movement");

        enemy.ready_to_strike = true;
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        out.clear();
        system.handle(
            &tick_events(Duration::from_millis(500)),
            &enemies,
            &towers,
            CASTLE,
            &mut oracle,
            &mut out,
        );
        assert_eq!(out, vec![Command::StrikeObjective { enemy: EnemyId::new(1) }]);
    }

    #[test]
    fn sapper_at_castle_fallback_breaches_instead_of_striking() {
        let mut system = EnemyAi::new();
        let mut enemy = enemy_snapshot(1, EnemyKind::Sapper, Position::new(0.0, 9.0));
        enemy.objective = Some(Objective::Castle);
        enemy.retarget_due = false;
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let towers = TowerView::from_snapshots(Vec::new());
        let mut oracle = DirectPath;
        let mut out = Vec::new();

        system.handle(
            &tick_events(Duration::from_millis(500)),
            &enemies,
            &towers,
            CASTLE,
            &mut oracle,
            &mut out,
        );

        assert_eq!(out, vec![Command::ResolveArrival { enemy: EnemyId::new(1) }]);
    }

    #[test]
    fn stuck_enemy_forces_exactly_one_replan_per_episode() {
        let mut system = EnemyAi::new();
        let mut enemy = enemy_snapshot(1, EnemyKind::Breacher, Position::new(0.0, 0.0));
        enemy.objective = Some(Objective::Castle);
        enemy.retarget_due = false;
        // Zero speed pins the enemy in place however often it is stepped.
        enemy.speed = 0.0;
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let towers = TowerView::from_snapshots(Vec::new());
        let mut oracle = CountingOracle::default();
        let mut out = Vec::new();

        // Four half-second ticks reach the two-second stuck threshold.
        for _ in 0..4 {
            system.handle(
                &tick_events(Duration::from_millis(500)),
                &enemies,
                &towers,
                CASTLE,
                &mut oracle,
                &mut out,
            );
        }
        assert_eq!(oracle.replans, 1, "exactly one replan per stuck episode");

        // The timer reset: three more ticks stay under the threshold.
        for _ in 0..3 {
            system.handle(
                &tick_events(Duration::from_millis(500)),
                &enemies,
                &towers,
                CASTLE,
                &mut oracle,
                &mut out,
            );
        }
        assert_eq!(oracle.replans, 1);

        // A fourth tick completes the second episode.
        system.handle(
            &tick_events(Duration::from_millis(500)),
            &enemies,
            &towers,
            CASTLE,
            &mut oracle,
            &mut out,
        );
        assert_eq!(oracle.replans, 2);
    }

    #[test]
    fn trackers_are_pruned_for_vanished_enemies() {
        let mut system = EnemyAi::new();
        let mut enemy = enemy_snapshot(1, EnemyKind::Breacher, Position::new(0.0, 0.0));
        enemy.objective = Some(Objective::Castle);
        enemy.retarget_due = false;
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let towers = TowerView::from_snapshots(Vec::new());
        let mut oracle = DirectPath;
        let mut out = Vec::new();

        system.handle(
            &tick_events(Duration::from_millis(500)),
            &enemies,
            &towers,
            CASTLE,
            &mut oracle,
            &mut out,
        );
        assert_eq!(system.trackers.len(), 1);

        let empty = EnemyView::from_snapshots(Vec::new());
        system.handle(
            &tick_events(Duration::from_millis(500)),
            &empty,
            &towers,
            CASTLE,
            &mut oracle,
            &mut out,
        );
        assert!(system.trackers.is_empty());
    }
}
