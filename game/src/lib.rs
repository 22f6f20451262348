#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game orchestrator that wires the world and the pure systems together.
//!
//! The orchestrator owns the authoritative [`World`], every system, and the
//! path oracle. Each [`Game::tick`] runs a fixed pipeline (world clock,
//! spawning, enemy AI, targeting, combat, reputation bookkeeping) with no
//! preemption, so all entity creation and destruction happens at
//! well-defined points inside the tick. Player commands apply synchronously
//! between ticks and report a typed reason on rejection.

use std::time::Duration;

use hex_defence_core::{
    BuildError, CellSnapshot, Command, DemolishError, EnemyView, Event, HexCoord, MapBounds,
    Position, Price, ProjectileView, Rank, RepairError, ResourceKind, TowerId, TowerTarget,
    TowerView, UpgradeError, REACHED_OBJECTIVE_PENALTY,
};
use hex_defence_system_enemy_ai::{DirectPath, EnemyAi, PathOracle};
use hex_defence_system_spawning::Spawning;
use hex_defence_system_tower_combat::TowerCombat;
use hex_defence_system_tower_targeting::TowerTargeting;
use hex_defence_world::{self as world, query, TowerPolicy, World};

/// Session configuration assembled by the hosting adapter.
#[derive(Clone, Copy, Debug)]
pub struct GameConfig {
    /// World-space box bounding the generated hex grid.
    pub bounds: MapBounds,
    /// Circumradius of a single hex cell.
    pub hex_radius: f32,
    /// World-space location of the castle landmark.
    pub castle: Position,
    /// Seed driving every randomized decision in the session.
    pub session_seed: u64,
    /// Wave controller tuning.
    pub spawning: hex_defence_system_spawning::Config,
    /// Rule-variant policy applied to towers.
    pub tower_policy: TowerPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bounds: MapBounds::new(Position::new(-25.0, -25.0), Position::new(25.0, 25.0)),
            hex_radius: 1.0,
            castle: Position::new(0.3, 6.6),
            session_seed: 0x6865_7864,
            spawning: hex_defence_system_spawning::Config::default(),
            tower_policy: TowerPolicy::default(),
        }
    }
}

/// Reason a player command was rejected.
///
/// Every rejection is a pure no-op on the simulation: nothing was deducted,
/// mutated, or partially applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    /// The named coordinate does not exist on the generated grid.
    #[error("cell does not exist on the map")]
    UnknownCell,
    /// The named cell already hosts a tower.
    #[error("cell is already occupied")]
    CellOccupied,
    /// The ledger cannot cover the full price of the command.
    #[error("insufficient resources")]
    InsufficientResources,
    /// The named tower does not exist (stale or invalid reference).
    #[error("no such tower")]
    UnknownTower,
    /// The tower already sits at its maximum level.
    #[error("tower is already at maximum level")]
    MaxLevelReached,
    /// The tower already holds full health.
    #[error("tower is already at full health")]
    AlreadyFullHealth,
}

impl From<BuildError> for TransactionError {
    fn from(reason: BuildError) -> Self {
        match reason {
            BuildError::UnknownCell => Self::UnknownCell,
            BuildError::CellOccupied => Self::CellOccupied,
            BuildError::InsufficientResources => Self::InsufficientResources,
        }
    }
}

impl From<UpgradeError> for TransactionError {
    fn from(reason: UpgradeError) -> Self {
        match reason {
            UpgradeError::UnknownTower => Self::UnknownTower,
            UpgradeError::MaxLevelReached => Self::MaxLevelReached,
            UpgradeError::InsufficientResources => Self::InsufficientResources,
        }
    }
}

impl From<RepairError> for TransactionError {
    fn from(reason: RepairError) -> Self {
        match reason {
            RepairError::UnknownTower => Self::UnknownTower,
            RepairError::AlreadyFullHealth => Self::AlreadyFullHealth,
            RepairError::InsufficientResources => Self::InsufficientResources,
        }
    }
}

impl From<DemolishError> for TransactionError {
    fn from(reason: DemolishError) -> Self {
        match reason {
            DemolishError::UnknownTower => Self::UnknownTower,
        }
    }
}

/// Running totals folded from the session's event stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionStats {
    /// Enemies killed before resolving their objective.
    pub kills: u32,
    /// Enemies that resolved their objective.
    pub breaches: u32,
    /// Towers destroyed by enemy action.
    pub towers_lost: u32,
}

/// Orchestrates a single Hex Defence session.
pub struct Game {
    world: World,
    spawning: Spawning,
    enemy_ai: EnemyAi,
    targeting: TowerTargeting,
    combat: TowerCombat,
    oracle: Box<dyn PathOracle>,
    targets: Vec<TowerTarget>,
    command_scratch: Vec<Command>,
    pending_events: Vec<Event>,
    stats: SessionStats,
}

impl Game {
    /// Creates a session using the built-in straight-line path oracle.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self::with_oracle(config, Box::new(DirectPath))
    }

    /// Creates a session routing enemies through the provided oracle.
    #[must_use]
    pub fn with_oracle(config: GameConfig, oracle: Box<dyn PathOracle>) -> Self {
        let mut world = World::with_policy(config.tower_policy);
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::ConfigureMap {
                bounds: config.bounds,
                hex_radius: config.hex_radius,
                castle: config.castle,
            },
            &mut events,
        );

        Self {
            world,
            spawning: Spawning::new(config.spawning, config.session_seed),
            enemy_ai: EnemyAi::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            oracle,
            targets: Vec::new(),
            command_scratch: Vec::new(),
            pending_events: events,
            stats: SessionStats::default(),
        }
    }

    /// Advances the simulation by one tick.
    ///
    /// Pipeline order is fixed: world clock, spawner, enemy AI, targeting,
    /// combat, then reputation bookkeeping over the terminal events the tick
    /// produced. Every event raised is retained for [`Game::drain_events`].
    pub fn tick(&mut self, dt: Duration) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let castle = query::castle(&self.world);

        let active = query::enemy_view(&self.world).len();
        self.spawning
            .handle(&events, castle, active, &mut self.command_scratch);
        self.drain_commands(&mut events);

        let enemies = query::enemy_view(&self.world);
        let towers = query::tower_view(&self.world);
        self.enemy_ai.handle(
            &events,
            &enemies,
            &towers,
            castle,
            self.oracle.as_mut(),
            &mut self.command_scratch,
        );
        self.drain_commands(&mut events);

        let enemies = query::enemy_view(&self.world);
        let towers = query::tower_view(&self.world);
        self.targeting.handle(&towers, &enemies, &mut self.targets);
        self.combat
            .handle(&towers, &self.targets, &mut self.command_scratch);
        self.drain_commands(&mut events);

        let mut reputation_delta = 0i32;
        for event in &events {
            match event {
                Event::EnemyDied { kind, .. } => {
                    self.stats.kills += 1;
                    reputation_delta += kind.kill_reward();
                }
                Event::EnemyReachedObjective { .. } => {
                    self.stats.breaches += 1;
                    reputation_delta -= REACHED_OBJECTIVE_PENALTY;
                }
                Event::TowerDestroyed { .. } => self.stats.towers_lost += 1,
                _ => {}
            }
        }
        if reputation_delta != 0 {
            world::apply(
                &mut self.world,
                Command::AdjustReputation {
                    delta: reputation_delta,
                },
                &mut events,
            );
        }

        self.pending_events.append(&mut events);
    }

    fn drain_commands(&mut self, events: &mut Vec<Event>) {
        for command in self.command_scratch.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }

    /// Builds a tower on the provided cell.
    ///
    /// The first successful build also starts the wave controller, matching
    /// the session flow where enemies only march once defences exist.
    pub fn build(&mut self, cell: HexCoord) -> Result<TowerId, TransactionError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::BuildTower { cell }, &mut events);

        let result = events
            .iter()
            .find_map(|event| match event {
                Event::TowerBuilt { tower, .. } => Some(Ok(*tower)),
                Event::BuildRejected { reason, .. } => Some(Err((*reason).into())),
                _ => None,
            })
            .unwrap_or(Err(TransactionError::UnknownCell));

        self.pending_events.append(&mut events);
        if result.is_ok() && !self.spawning.is_active() {
            self.spawning.start();
        }
        result
    }

    /// Upgrades the provided tower to its next level.
    pub fn upgrade(&mut self, tower: TowerId) -> Result<(), TransactionError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::UpgradeTower { tower }, &mut events);

        let result = events
            .iter()
            .find_map(|event| match event {
                Event::TowerUpgraded { .. } => Some(Ok(())),
                Event::UpgradeRejected { reason, .. } => Some(Err((*reason).into())),
                _ => None,
            })
            .unwrap_or(Err(TransactionError::UnknownTower));

        self.pending_events.append(&mut events);
        result
    }

    /// Restores the provided tower to full health for a fee.
    pub fn repair(&mut self, tower: TowerId) -> Result<(), TransactionError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::RepairTower { tower }, &mut events);

        let result = events
            .iter()
            .find_map(|event| match event {
                Event::TowerRepaired { .. } => Some(Ok(())),
                Event::RepairRejected { reason, .. } => Some(Err((*reason).into())),
                _ => None,
            })
            .unwrap_or(Err(TransactionError::UnknownTower));

        self.pending_events.append(&mut events);
        result
    }

    /// Demolishes the provided tower, refunding part of its cost.
    pub fn demolish(&mut self, tower: TowerId) -> Result<(), TransactionError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::DemolishTower { tower }, &mut events);

        let result = events
            .iter()
            .find_map(|event| match event {
                Event::TowerDemolished { .. } => Some(Ok(())),
                Event::DemolishRejected { reason, .. } => Some(Err((*reason).into())),
                _ => None,
            })
            .unwrap_or(Err(TransactionError::UnknownTower));

        self.pending_events.append(&mut events);
        result
    }

    /// Starts the wave controller.
    pub fn start_waves(&mut self) {
        self.spawning.start();
    }

    /// Freezes the wave controller; no spawn or difficulty timers advance.
    pub fn stop_waves(&mut self) {
        self.spawning.stop();
    }

    /// Wave the session is currently on.
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.spawning.wave()
    }

    /// Current count of the provided resource kind.
    #[must_use]
    pub fn resource(&self, kind: ResourceKind) -> u32 {
        query::resource(&self.world, kind)
    }

    /// Current reputation total.
    #[must_use]
    pub fn reputation(&self) -> u32 {
        query::reputation(&self.world)
    }

    /// Current supply rank.
    #[must_use]
    pub fn rank(&self) -> Rank {
        query::rank(&self.world)
    }

    /// Simulated time remaining until the next supply drip.
    #[must_use]
    pub fn time_until_supply(&self) -> Duration {
        query::time_until_supply(&self.world)
    }

    /// Running session statistics.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Snapshot of the provided cell, if it exists on the map.
    #[must_use]
    pub fn cell(&self, coord: HexCoord) -> Option<CellSnapshot> {
        query::cell(&self.world, coord)
    }

    /// Read-only view of every tower on the map.
    #[must_use]
    pub fn tower_view(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Read-only view of every active enemy.
    #[must_use]
    pub fn enemy_view(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Read-only view of every projectile in flight.
    #[must_use]
    pub fn projectile_view(&self) -> ProjectileView {
        query::projectile_view(&self.world)
    }

    /// Price of the provided tower's next upgrade, for cost previews.
    #[must_use]
    pub fn upgrade_cost(&self, tower: TowerId) -> Option<Price> {
        query::upgrade_cost(&self.world, tower)
    }

    /// Current repair fee for the provided tower, for cost previews.
    #[must_use]
    pub fn repair_cost(&self, tower: TowerId) -> Option<Price> {
        query::repair_cost(&self.world, tower)
    }

    /// Takes every event raised since the previous drain.
    ///
    /// Presentation layers consume these to refresh widgets and close
    /// panels; each terminal state transition appears at most once.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending_events)
    }
}
