#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Hex Defence.
//!
//! The world owns every piece of mutable gameplay state: the economy ledger,
//! the reputation ladder, the hex grid, and the tower, enemy, and projectile
//! registries. All mutation flows through [`apply`]; all reads flow through
//! the [`query`] module. Systems never touch the world directly.

mod grid;
mod ledger;
mod towers;

use std::collections::BTreeMap;
use std::time::Duration;

use hex_defence_core::{
    BuildError, Command, DemolishError, EnemyId, EnemyKind, Event, HexCoord, Objective, Position,
    Price, ProjectileId, RepairError, ResourceKind, TowerId, TowerKind, UpgradeError,
};

use grid::HexGrid;
use ledger::{Ledger, RankLadder};
use towers::TowerRegistry;

/// Simulated time between enemy objective re-acquisitions.
const RETARGET_INTERVAL: Duration = Duration::from_millis(500);

/// Extra distance tolerated when validating strike and arrival commands.
const ARRIVAL_SLACK: f32 = 0.5;

/// Distance at which a projectile resolves against its target.
const PROJECTILE_IMPACT_RADIUS: f32 = 0.5;

const DEFAULT_CASTLE: Position = Position::new(0.3, 6.6);

/// Policy knobs that vary between rule variants.
#[derive(Clone, Copy, Debug)]
pub struct TowerPolicy {
    /// Restores a tower to full health when an upgrade succeeds.
    pub heal_on_upgrade: bool,
}

impl Default for TowerPolicy {
    fn default() -> Self {
        Self {
            heal_on_upgrade: true,
        }
    }
}

#[derive(Clone, Debug)]
struct EnemyState {
    id: EnemyId,
    kind: EnemyKind,
    position: Position,
    health: u32,
    max_health: u32,
    speed: f32,
    objective: Option<Objective>,
    strike_accumulator: Duration,
    retarget_accumulator: Duration,
    doomed: bool,
}

impl EnemyState {
    fn new(id: EnemyId, kind: EnemyKind, position: Position, health: u32, speed: f32) -> Self {
        Self {
            id,
            kind,
            position,
            health,
            max_health: health,
            speed,
            objective: None,
            strike_accumulator: Duration::ZERO,
            // Due immediately so acquisition runs on the first tick.
            retarget_accumulator: RETARGET_INTERVAL,
            doomed: false,
        }
    }

    fn ready_to_strike(&self) -> bool {
        self.strike_accumulator >= self.kind.attack_cooldown()
    }

    fn retarget_due(&self) -> bool {
        self.retarget_accumulator >= RETARGET_INTERVAL
    }
}

#[derive(Clone, Copy, Debug)]
struct ProjectileState {
    id: ProjectileId,
    position: Position,
    damage: u32,
    speed: f32,
    target: EnemyId,
}

/// Represents the authoritative Hex Defence world state.
#[derive(Debug)]
pub struct World {
    policy: TowerPolicy,
    ledger: Ledger,
    ladder: RankLadder,
    grid: HexGrid,
    castle: Position,
    towers: TowerRegistry,
    enemies: BTreeMap<EnemyId, EnemyState>,
    next_enemy_id: u32,
    projectiles: BTreeMap<ProjectileId, ProjectileState>,
    next_projectile_id: u32,
}

impl World {
    /// Creates a new world with default policy and an empty map.
    ///
    /// The map stays empty until a `Command::ConfigureMap` generates the
    /// grid.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(TowerPolicy::default())
    }

    /// Creates a new world using the provided rule-variant policy.
    #[must_use]
    pub fn with_policy(policy: TowerPolicy) -> Self {
        Self {
            policy,
            ledger: Ledger::new(),
            ladder: RankLadder::new(),
            grid: HexGrid::default(),
            castle: DEFAULT_CASTLE,
            towers: TowerRegistry::new(),
            enemies: BTreeMap::new(),
            next_enemy_id: 0,
            projectiles: BTreeMap::new(),
            next_projectile_id: 0,
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });

        self.ledger.tick(dt, self.ladder.rank(), out_events);

        for tower in self.towers.iter_mut() {
            tower.cooldown = tower.cooldown.saturating_add(dt);
        }

        for enemy in self.enemies.values_mut() {
            enemy.strike_accumulator = enemy.strike_accumulator.saturating_add(dt);
            enemy.retarget_accumulator = enemy.retarget_accumulator.saturating_add(dt);
        }

        self.advance_projectiles(dt, out_events);
        self.reap_dead_enemies(out_events);
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let step_seconds = dt.as_secs_f32();
        let mut resolved: Vec<(ProjectileId, Option<(EnemyId, u32)>)> = Vec::new();

        {
            let enemies = &self.enemies;
            for projectile in self.projectiles.values_mut() {
                let Some(target) = enemies.get(&projectile.target) else {
                    resolved.push((projectile.id, None));
                    continue;
                };

                projectile.position = projectile
                    .position
                    .stepped_toward(target.position, projectile.speed * step_seconds);

                if projectile.position.distance_to(target.position) <= PROJECTILE_IMPACT_RADIUS {
                    resolved.push((projectile.id, Some((projectile.target, projectile.damage))));
                }
            }
        }

        for (projectile, impact) in resolved {
            let _ = self.projectiles.remove(&projectile);

            let Some((target, damage)) = impact else {
                out_events.push(Event::ProjectileExpired { projectile });
                continue;
            };

            match self.enemies.get_mut(&target) {
                Some(enemy) if !enemy.doomed => {
                    enemy.health = enemy.health.saturating_sub(damage);
                    out_events.push(Event::EnemyDamaged {
                        enemy: target,
                        health: enemy.health,
                    });
                    if enemy.health == 0 {
                        enemy.doomed = true;
                    }
                }
                // The target died earlier in this tick: the projectile is
                // consumed without applying damage.
                _ => out_events.push(Event::ProjectileExpired { projectile }),
            }
        }
    }

    /// End-of-tick cleanup pass removing enemies marked dead during the
    /// tick, so nothing mutates the registry while it is being iterated.
    fn reap_dead_enemies(&mut self, out_events: &mut Vec<Event>) {
        let dead: Vec<EnemyId> = self
            .enemies
            .values()
            .filter(|enemy| enemy.doomed)
            .map(|enemy| enemy.id)
            .collect();

        for id in dead {
            if let Some(enemy) = self.enemies.remove(&id) {
                out_events.push(Event::EnemyDied {
                    enemy: id,
                    kind: enemy.kind,
                });
            }
        }
    }

    fn build_tower(&mut self, cell: HexCoord, out_events: &mut Vec<Event>) {
        let Some(state) = self.grid.cell(cell) else {
            out_events.push(Event::BuildRejected {
                cell,
                reason: BuildError::UnknownCell,
            });
            return;
        };

        if state.occupied {
            out_events.push(Event::BuildRejected {
                cell,
                reason: BuildError::CellOccupied,
            });
            return;
        }

        let position = state.position;
        let kind = TowerKind::Sentry;
        if !self.ledger.try_spend(kind.build_cost(), out_events) {
            out_events.push(Event::BuildRejected {
                cell,
                reason: BuildError::InsufficientResources,
            });
            return;
        }

        let tower = self.towers.insert(kind, cell, position);
        if let Some(state) = self.grid.cell_mut(cell) {
            state.occupied = true;
            state.tower = Some(tower);
        }
        out_events.push(Event::TowerBuilt { tower, kind, cell });
    }

    fn upgrade_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.get(tower) else {
            out_events.push(Event::UpgradeRejected {
                tower,
                reason: UpgradeError::UnknownTower,
            });
            return;
        };

        let Some(cost) = state.kind.upgrade_cost(state.level) else {
            out_events.push(Event::UpgradeRejected {
                tower,
                reason: UpgradeError::MaxLevelReached,
            });
            return;
        };

        if !self.ledger.try_spend(cost, out_events) {
            out_events.push(Event::UpgradeRejected {
                tower,
                reason: UpgradeError::InsufficientResources,
            });
            return;
        }

        let heal = self.policy.heal_on_upgrade;
        if let Some(state) = self.towers.get_mut(tower) {
            state.level += 1;
            state.invested_wood = state.invested_wood.saturating_add(cost.wood());
            if heal {
                state.health = state.stats().max_health;
            }
            out_events.push(Event::TowerUpgraded {
                tower,
                level: state.level,
            });
        }
    }

    fn repair_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.get(tower) else {
            out_events.push(Event::RepairRejected {
                tower,
                reason: RepairError::UnknownTower,
            });
            return;
        };

        if state.health >= state.stats().max_health {
            out_events.push(Event::RepairRejected {
                tower,
                reason: RepairError::AlreadyFullHealth,
            });
            return;
        }

        let fee = Price::new(state.repair_cost(), 0, 0);
        if !self.ledger.try_spend(fee, out_events) {
            out_events.push(Event::RepairRejected {
                tower,
                reason: RepairError::InsufficientResources,
            });
            return;
        }

        if let Some(state) = self.towers.get_mut(tower) {
            state.health = state.stats().max_health;
        }
        out_events.push(Event::TowerRepaired { tower });
    }

    fn demolish_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.remove(tower) else {
            out_events.push(Event::DemolishRejected {
                tower,
                reason: DemolishError::UnknownTower,
            });
            return;
        };

        self.vacate_cell(state.cell, tower);
        let refund = state.kind.demolish_refund();
        self.ledger.add(ResourceKind::Wood, refund, out_events);
        out_events.push(Event::TowerDemolished {
            tower,
            cell: state.cell,
            refund,
        });
    }

    /// Applies damage to a tower, destroying it synchronously at zero
    /// health: the owning cell is vacated and every enemy objective that
    /// pointed at the tower is invalidated before the event goes out.
    fn damage_tower(&mut self, tower: TowerId, amount: u32, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };

        state.health = state.health.saturating_sub(amount);
        let health = state.health;
        out_events.push(Event::TowerDamaged { tower, health });

        if health > 0 {
            return;
        }

        if let Some(state) = self.towers.remove(tower) {
            self.vacate_cell(state.cell, tower);
            out_events.push(Event::TowerDestroyed {
                tower,
                cell: state.cell,
            });
        }
    }

    fn vacate_cell(&mut self, cell: HexCoord, tower: TowerId) {
        if let Some(state) = self.grid.cell_mut(cell) {
            state.occupied = false;
            state.tower = None;
        }

        for enemy in self.enemies.values_mut() {
            if enemy.objective == Some(Objective::Tower(tower)) {
                enemy.objective = None;
                // Force acquisition on the next AI pass.
                enemy.retarget_accumulator = RETARGET_INTERVAL;
            }
        }
    }

    fn objective_position(&self, objective: Objective) -> Option<Position> {
        match objective {
            Objective::Castle => Some(self.castle),
            Objective::Tower(tower) => self.towers.get(tower).map(|state| state.position),
        }
    }

    fn strike_objective(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let Some(state) = self.enemies.get(&enemy) else {
            return;
        };
        let (kind, position, ready) = (state.kind, state.position, state.ready_to_strike());
        let Some(Objective::Tower(tower)) = state.objective else {
            return;
        };

        if !ready {
            return;
        }

        let Some(target) = self.towers.get(tower) else {
            // Stale handle: degrade to "no objective" and re-acquire.
            if let Some(state) = self.enemies.get_mut(&enemy) {
                state.objective = None;
                state.retarget_accumulator = RETARGET_INTERVAL;
            }
            return;
        };

        if position.distance_to(target.position) > kind.attack_range() + ARRIVAL_SLACK {
            return;
        }

        self.damage_tower(tower, kind.damage(), out_events);
        if let Some(state) = self.enemies.get_mut(&enemy) {
            state.strike_accumulator = Duration::ZERO;
        }
    }

    fn resolve_arrival(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let Some(state) = self.enemies.get(&enemy) else {
            return;
        };
        let (kind, position) = (state.kind, state.position);
        let Some(objective) = state.objective else {
            return;
        };

        let Some(goal) = self.objective_position(objective) else {
            if let Some(state) = self.enemies.get_mut(&enemy) {
                state.objective = None;
                state.retarget_accumulator = RETARGET_INTERVAL;
            }
            return;
        };

        if position.distance_to(goal) > kind.attack_range() + ARRIVAL_SLACK {
            return;
        }

        if let Objective::Tower(tower) = objective {
            self.damage_tower(tower, kind.damage(), out_events);
        }

        // Terminal outcome: the enemy resolved its objective, so it leaves
        // the registry here and can never also raise EnemyDied.
        if let Some(state) = self.enemies.remove(&enemy) {
            out_events.push(Event::EnemyReachedObjective {
                enemy,
                kind: state.kind,
            });
        }
    }

    fn fire_projectile(&mut self, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.get(tower) else {
            return;
        };
        if !state.ready_to_fire() {
            return;
        }
        if !self.enemies.contains_key(&target) {
            return;
        }

        let (position, damage, speed) = (
            state.position,
            state.stats().damage,
            state.kind.projectile_speed(),
        );

        let projectile = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id += 1;
        let _ = self.projectiles.insert(
            projectile,
            ProjectileState {
                id: projectile,
                position,
                damage,
                speed,
                target,
            },
        );

        if let Some(state) = self.towers.get_mut(tower) {
            state.cooldown = Duration::ZERO;
        }
        out_events.push(Event::ProjectileFired {
            projectile,
            tower,
            target,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureMap {
            bounds,
            hex_radius,
            castle,
        } => {
            world.grid = HexGrid::generate(bounds, hex_radius);
            world.castle = castle;
            world.towers = TowerRegistry::new();
            world.enemies.clear();
            world.next_enemy_id = 0;
            world.projectiles.clear();
            world.next_projectile_id = 0;
        }
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::BuildTower { cell } => world.build_tower(cell, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
        Command::RepairTower { tower } => world.repair_tower(tower, out_events),
        Command::DemolishTower { tower } => world.demolish_tower(tower, out_events),
        Command::SpawnEnemy {
            kind,
            position,
            health,
            speed,
        } => {
            let enemy = EnemyId::new(world.next_enemy_id);
            world.next_enemy_id += 1;
            let _ = world
                .enemies
                .insert(enemy, EnemyState::new(enemy, kind, position, health, speed));
            out_events.push(Event::EnemySpawned {
                enemy,
                kind,
                position,
            });
        }
        Command::AssignObjective { enemy, objective } => {
            if let Objective::Tower(tower) = objective {
                if world.towers.get(tower).is_none() {
                    return;
                }
            }
            if let Some(state) = world.enemies.get_mut(&enemy) {
                state.objective = Some(objective);
                state.retarget_accumulator = Duration::ZERO;
            }
        }
        Command::MoveEnemy { enemy, to } => {
            if let Some(state) = world.enemies.get_mut(&enemy) {
                state.position = to;
            }
        }
        Command::StrikeObjective { enemy } => world.strike_objective(enemy, out_events),
        Command::ResolveArrival { enemy } => world.resolve_arrival(enemy, out_events),
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::GrantResource { kind, amount } => {
            world.ledger.add(kind, amount, out_events);
        }
        Command::AdjustReputation { delta } => {
            let changed = world.ladder.adjust(delta);
            out_events.push(Event::ReputationChanged {
                reputation: world.ladder.reputation(),
            });
            if let Some(rank) = changed {
                out_events.push(Event::RankChanged { rank });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use hex_defence_core::{
        CellSnapshot, EnemySnapshot, EnemyView, HexCoord, Position, Price, ProjectileSnapshot,
        ProjectileView, Rank, ResourceKind, TowerId, TowerSnapshot, TowerView,
    };

    use super::World;

    /// Current count of the provided resource kind.
    #[must_use]
    pub fn resource(world: &World, kind: ResourceKind) -> u32 {
        world.ledger.amount(kind)
    }

    /// Reports whether the ledger holds at least the provided amount.
    #[must_use]
    pub fn has_resource(world: &World, kind: ResourceKind, amount: u32) -> bool {
        world.ledger.has(kind, amount)
    }

    /// Current reputation total.
    #[must_use]
    pub fn reputation(world: &World) -> u32 {
        world.ladder.reputation()
    }

    /// Current supply rank.
    #[must_use]
    pub fn rank(world: &World) -> Rank {
        world.ladder.rank()
    }

    /// Simulated time remaining until the next supply drip.
    #[must_use]
    pub fn time_until_supply(world: &World) -> Duration {
        world.ledger.time_until_supply()
    }

    /// World-space location of the castle landmark.
    #[must_use]
    pub fn castle(world: &World) -> Position {
        world.castle
    }

    /// Number of cells generated for the current map.
    #[must_use]
    pub fn cell_count(world: &World) -> usize {
        world.grid.len()
    }

    /// Snapshot of the provided cell, if it exists on the map.
    #[must_use]
    pub fn cell(world: &World, coord: HexCoord) -> Option<CellSnapshot> {
        world.grid.cell(coord).map(|state| CellSnapshot {
            coord,
            position: state.position,
            occupied: state.occupied,
            tower: state.tower,
        })
    }

    /// Iterator over every generated cell in deterministic order.
    pub fn cells(world: &World) -> impl Iterator<Item = CellSnapshot> + '_ {
        world.grid.iter().map(|(coord, state)| CellSnapshot {
            coord: *coord,
            position: state.position,
            occupied: state.occupied,
            tower: state.tower,
        })
    }

    /// Tower hosted by the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, coord: HexCoord) -> Option<TowerId> {
        world.grid.cell(coord).and_then(|state| state.tower)
    }

    /// Captures a read-only view of every tower on the map.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let snapshots: Vec<TowerSnapshot> = world
            .towers
            .iter()
            .map(|state| {
                let stats = state.stats();
                TowerSnapshot {
                    id: state.id,
                    kind: state.kind,
                    cell: state.cell,
                    position: state.position,
                    level: state.level,
                    health: state.health,
                    max_health: stats.max_health,
                    damage: stats.damage,
                    range: stats.range,
                    ready_to_fire: state.ready_to_fire(),
                }
            })
            .collect();
        TowerView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every active enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world
            .enemies
            .values()
            .map(|state| EnemySnapshot {
                id: state.id,
                kind: state.kind,
                position: state.position,
                health: state.health,
                max_health: state.max_health,
                speed: state.speed,
                objective: state.objective,
                ready_to_strike: state.ready_to_strike(),
                retarget_due: state.retarget_due(),
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let snapshots: Vec<ProjectileSnapshot> = world
            .projectiles
            .values()
            .map(|state| ProjectileSnapshot {
                id: state.id,
                position: state.position,
                target: state.target,
                damage: state.damage,
            })
            .collect();
        ProjectileView::from_snapshots(snapshots)
    }

    /// Price of the provided tower's next upgrade, if one exists.
    ///
    /// Backed by the same table the upgrade transaction uses, so previews
    /// can never disagree with the spend.
    #[must_use]
    pub fn upgrade_cost(world: &World, tower: TowerId) -> Option<Price> {
        let state = world.towers.get(tower)?;
        state.kind.upgrade_cost(state.level)
    }

    /// Fee the provided tower would charge for a repair right now.
    ///
    /// Shares the investment-scaled formula with the repair transaction.
    #[must_use]
    pub fn repair_cost(world: &World, tower: TowerId) -> Option<Price> {
        let state = world.towers.get(tower)?;
        Some(Price::new(state.repair_cost(), 0, 0))
    }
}
