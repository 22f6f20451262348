#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hex Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Reputation points deducted whenever an enemy resolves its objective.
pub const REACHED_OBJECTIVE_PENALTY: i32 = 20;

/// World-space point used for enemy, tower, and projectile positions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new world-space position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the position.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component of the position.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Squared Euclidean distance to another position.
    ///
    /// Systems compare squared distances wherever possible so ordering never
    /// depends on a square-root rounding step.
    #[must_use]
    pub fn distance_squared_to(self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f32 {
        self.distance_squared_to(other).sqrt()
    }

    /// Position advanced toward `goal` by at most `step` world units.
    ///
    /// Stops exactly on the goal when it lies closer than the step so callers
    /// never overshoot the point they asked for.
    #[must_use]
    pub fn stepped_toward(self, goal: Position, step: f32) -> Position {
        let distance = self.distance_to(goal);
        if distance <= step || distance == 0.0 {
            return goal;
        }

        let scale = step / distance;
        Position::new(
            self.x + (goal.x - self.x) * scale,
            self.y + (goal.y - self.y) * scale,
        )
    }
}

/// Axis-aligned world-space box bounding the generated map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    min: Position,
    max: Position,
}

impl MapBounds {
    /// Creates a new bounding box from its corner positions.
    #[must_use]
    pub const fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    /// Minimum corner of the box.
    #[must_use]
    pub const fn min(&self) -> Position {
        self.min
    }

    /// Maximum corner of the box.
    #[must_use]
    pub const fn max(&self) -> Position {
        self.max
    }

    /// Reports whether the provided position lies inside the box.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position.x() >= self.min.x()
            && position.x() <= self.max.x()
            && position.y() >= self.min.y()
            && position.y() <= self.max.y()
    }
}

/// Axial coordinate identifying a single hex cell.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct HexCoord {
    q: i32,
    r: i32,
}

impl HexCoord {
    /// Creates a new axial hex coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Column component of the coordinate.
    #[must_use]
    pub const fn q(&self) -> i32 {
        self.q
    }

    /// Row component of the coordinate.
    #[must_use]
    pub const fn r(&self) -> i32 {
        self.r
    }
}

/// Unique identifier assigned to a tower.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of resources tracked by the economy ledger.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ResourceKind {
    /// Primary construction material.
    Wood,
    /// Workforce required to crew towers.
    People,
    /// Masonry used by higher tower levels.
    Stone,
}

impl ResourceKind {
    /// Every resource kind in canonical order.
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Wood, ResourceKind::People, ResourceKind::Stone];
}

/// Quantity of every resource kind named by a single transaction.
///
/// Multi-resource spends check the full price before deducting anything so a
/// shortfall in one kind never produces a partial spend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    wood: u32,
    people: u32,
    stone: u32,
}

impl Price {
    /// Creates a new price from explicit per-kind amounts.
    #[must_use]
    pub const fn new(wood: u32, people: u32, stone: u32) -> Self {
        Self {
            wood,
            people,
            stone,
        }
    }

    /// Amount of the provided resource kind named by the price.
    #[must_use]
    pub const fn amount(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.wood,
            ResourceKind::People => self.people,
            ResourceKind::Stone => self.stone,
        }
    }

    /// Wood component of the price.
    #[must_use]
    pub const fn wood(&self) -> u32 {
        self.wood
    }

    /// People component of the price.
    #[must_use]
    pub const fn people(&self) -> u32 {
        self.people
    }

    /// Stone component of the price.
    #[must_use]
    pub const fn stone(&self) -> u32 {
        self.stone
    }
}

/// Supply tier in the range `1..=10` derived from reputation points.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Rank(u8);

impl Rank {
    /// Lowest attainable rank.
    pub const MIN: Rank = Rank(1);
    /// Highest attainable rank.
    pub const MAX: Rank = Rank(10);

    /// Creates a rank, clamping the value into the valid `1..=10` range.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value < 1 {
            Rank(1)
        } else if value > 10 {
            Rank(10)
        } else {
            Rank(value)
        }
    }

    /// Retrieves the numeric tier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Types of towers that can be constructed on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Standard projectile tower.
    Sentry,
}

/// Combat statistics a tower carries at a specific level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Damage applied by each projectile.
    pub damage: u32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Detection and firing radius in world units.
    pub range: f32,
    /// Health granted at this level.
    pub max_health: u32,
}

impl TowerStats {
    /// Minimum simulated time that must accumulate between shots.
    #[must_use]
    pub fn fire_period(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.fire_rate)
    }
}

impl TowerKind {
    /// Highest level the tower kind can reach.
    #[must_use]
    pub const fn max_level(self) -> u8 {
        match self {
            Self::Sentry => 3,
        }
    }

    /// Combat statistics at the provided level.
    ///
    /// Levels outside `1..=max_level` clamp to the nearest defined row so
    /// callers never observe a hole in the table.
    #[must_use]
    pub const fn stats(self, level: u8) -> TowerStats {
        match self {
            Self::Sentry => match level {
                0 | 1 => TowerStats {
                    damage: 25,
                    fire_rate: 1.0,
                    range: 5.0,
                    max_health: 100,
                },
                2 => TowerStats {
                    damage: 40,
                    fire_rate: 1.5,
                    range: 6.0,
                    max_health: 150,
                },
                _ => TowerStats {
                    damage: 60,
                    fire_rate: 2.0,
                    range: 7.0,
                    max_health: 200,
                },
            },
        }
    }

    /// Resources consumed when constructing the tower.
    #[must_use]
    pub const fn build_cost(self) -> Price {
        match self {
            Self::Sentry => Price::new(20, 5, 0),
        }
    }

    /// Resources consumed when upgrading from the provided level.
    ///
    /// Returns `None` at or above the maximum level.
    #[must_use]
    pub const fn upgrade_cost(self, level: u8) -> Option<Price> {
        match self {
            Self::Sentry => match level {
                1 => Some(Price::new(30, 3, 10)),
                2 => Some(Price::new(40, 5, 20)),
                _ => None,
            },
        }
    }

    /// Wood refunded when the tower is demolished.
    #[must_use]
    pub const fn demolish_refund(self) -> u32 {
        match self {
            Self::Sentry => 10,
        }
    }

    /// Travel speed of projectiles fired by the tower.
    #[must_use]
    pub const fn projectile_speed(self) -> f32 {
        match self {
            Self::Sentry => 10.0,
        }
    }
}

/// How an enemy resolves contact with its objective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    /// Applies damage once on arrival, then terminates.
    OneShot,
    /// Stops at attack range and strikes once per cooldown indefinitely.
    Continuous,
}

/// Categories of objective an enemy may pursue, in priority-list form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// Any alive tower, resolved to the nearest instance.
    Tower,
    /// The fixed castle landmark.
    Castle,
}

/// Enemy archetypes with their per-kind policy tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Rushes the castle and detonates on arrival.
    Breacher,
    /// Seeks out towers and dismantles them with sustained strikes.
    Sapper,
}

impl EnemyKind {
    /// Health granted at wave one, before wave scaling.
    #[must_use]
    pub const fn base_health(self) -> u32 {
        match self {
            Self::Breacher => 100,
            Self::Sapper => 80,
        }
    }

    /// Movement speed at wave one, before wave scaling.
    #[must_use]
    pub const fn base_speed(self) -> f32 {
        match self {
            Self::Breacher => 2.0,
            Self::Sapper => 2.5,
        }
    }

    /// Damage applied to the objective per attack resolution.
    #[must_use]
    pub const fn damage(self) -> u32 {
        match self {
            Self::Breacher => 10,
            Self::Sapper => 15,
        }
    }

    /// Arrival/attack behavior of the archetype.
    #[must_use]
    pub const fn attack(self) -> AttackKind {
        match self {
            Self::Breacher => AttackKind::OneShot,
            Self::Sapper => AttackKind::Continuous,
        }
    }

    /// Ordered list of objective categories the archetype pursues.
    #[must_use]
    pub const fn target_priorities(self) -> &'static [TargetKind] {
        match self {
            Self::Breacher => &[TargetKind::Castle],
            Self::Sapper => &[TargetKind::Tower, TargetKind::Castle],
        }
    }

    /// Distance at which the archetype engages its objective.
    #[must_use]
    pub const fn attack_range(self) -> f32 {
        match self {
            Self::Breacher => 1.0,
            Self::Sapper => 1.5,
        }
    }

    /// Minimum simulated time between continuous strikes.
    #[must_use]
    pub const fn attack_cooldown(self) -> Duration {
        match self {
            Self::Breacher => Duration::from_secs(1),
            Self::Sapper => Duration::from_millis(1500),
        }
    }

    /// Reputation points awarded when the enemy is killed.
    #[must_use]
    pub const fn kill_reward(self) -> i32 {
        match self {
            Self::Breacher => 2,
            Self::Sapper => 15,
        }
    }
}

/// Concrete objective an enemy is currently pursuing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Objective {
    /// The fixed castle landmark.
    Castle,
    /// A specific tower instance.
    Tower(TowerId),
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Generates the hex grid bounded by the provided box.
    ConfigureMap {
        /// World-space box every generated cell center must fall inside.
        bounds: MapBounds,
        /// Circumradius of a single hex cell in world units.
        hex_radius: f32,
        /// World-space location of the castle landmark.
        castle: Position,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests construction of a tower on the provided cell.
    BuildTower {
        /// Cell the tower should occupy.
        cell: HexCoord,
    },
    /// Requests an upgrade of an existing tower to its next level.
    UpgradeTower {
        /// Identifier of the tower targeted for upgrade.
        tower: TowerId,
    },
    /// Requests restoration of an existing tower to full health.
    RepairTower {
        /// Identifier of the tower targeted for repair.
        tower: TowerId,
    },
    /// Requests removal of an existing tower with a partial refund.
    DemolishTower {
        /// Identifier of the tower targeted for demolition.
        tower: TowerId,
    },
    /// Requests that a new enemy enter the world with wave-scaled stats.
    SpawnEnemy {
        /// Archetype selecting the enemy's policy table.
        kind: EnemyKind,
        /// World-space spawn position.
        position: Position,
        /// Wave-scaled starting health.
        health: u32,
        /// Wave-scaled movement speed.
        speed: f32,
    },
    /// Assigns the objective an enemy should pursue.
    AssignObjective {
        /// Identifier of the enemy receiving the objective.
        enemy: EnemyId,
        /// Objective the enemy should pursue.
        objective: Objective,
    },
    /// Requests that an enemy move to the provided position.
    MoveEnemy {
        /// Identifier of the enemy attempting to move.
        enemy: EnemyId,
        /// Destination computed by the enemy AI for this tick.
        to: Position,
    },
    /// Requests a cooldown-gated strike against the enemy's objective.
    StrikeObjective {
        /// Identifier of the striking enemy.
        enemy: EnemyId,
    },
    /// Resolves a one-shot enemy's arrival at its objective.
    ResolveArrival {
        /// Identifier of the arriving enemy.
        enemy: EnemyId,
    },
    /// Requests that a tower fire a projectile at the provided enemy.
    FireProjectile {
        /// Identifier of the firing tower.
        tower: TowerId,
        /// Enemy the projectile should pursue.
        target: EnemyId,
    },
    /// Unconditionally grants resources to the ledger.
    GrantResource {
        /// Resource kind receiving the grant.
        kind: ResourceKind,
        /// Amount added to the counter.
        amount: u32,
    },
    /// Applies a reputation delta and recomputes the rank.
    AdjustReputation {
        /// Signed reputation change; the total clamps at zero.
        delta: i32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports the new total for a resource kind after any mutation.
    ResourceChanged {
        /// Resource kind whose count changed.
        kind: ResourceKind,
        /// Count after the change.
        amount: u32,
    },
    /// Announces a completed supply drip with the granted amounts.
    SupplyGranted {
        /// Wood granted by the drip.
        wood: u32,
        /// People granted by the drip.
        people: u32,
        /// Stone granted by the drip.
        stone: u32,
    },
    /// Reports the reputation total after an adjustment.
    ReputationChanged {
        /// Clamped reputation total.
        reputation: u32,
    },
    /// Announces that the rank moved to a new tier.
    RankChanged {
        /// Tier that became active.
        rank: Rank,
    },
    /// Confirms that a tower was constructed.
    TowerBuilt {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Kind of tower that was constructed.
        kind: TowerKind,
        /// Cell the tower occupies.
        cell: HexCoord,
    },
    /// Reports that a build request was rejected.
    BuildRejected {
        /// Cell named by the rejected request.
        cell: HexCoord,
        /// Specific reason the build failed.
        reason: BuildError,
    },
    /// Confirms that a tower reached a new level.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level the tower now holds.
        level: u8,
    },
    /// Reports that an upgrade request was rejected.
    UpgradeRejected {
        /// Identifier named by the rejected request.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower was restored to full health.
    TowerRepaired {
        /// Identifier of the repaired tower.
        tower: TowerId,
    },
    /// Reports that a repair request was rejected.
    RepairRejected {
        /// Identifier named by the rejected request.
        tower: TowerId,
        /// Specific reason the repair failed.
        reason: RepairError,
    },
    /// Confirms that a tower was demolished and its cell vacated.
    TowerDemolished {
        /// Identifier of the demolished tower.
        tower: TowerId,
        /// Cell the tower previously occupied.
        cell: HexCoord,
        /// Wood refunded to the ledger.
        refund: u32,
    },
    /// Reports that a demolish request was rejected.
    DemolishRejected {
        /// Identifier named by the rejected request.
        tower: TowerId,
        /// Specific reason the demolition failed.
        reason: DemolishError,
    },
    /// Reports a tower's health after taking damage.
    TowerDamaged {
        /// Identifier of the damaged tower.
        tower: TowerId,
        /// Health remaining after the damage, floored at zero.
        health: u32,
    },
    /// Announces that a tower was destroyed and its cell vacated.
    TowerDestroyed {
        /// Identifier of the destroyed tower.
        tower: TowerId,
        /// Cell the tower previously occupied.
        cell: HexCoord,
    },
    /// Confirms that an enemy entered the world.
    EnemySpawned {
        /// Identifier assigned to the enemy by the world.
        enemy: EnemyId,
        /// Archetype of the spawned enemy.
        kind: EnemyKind,
        /// World-space spawn position.
        position: Position,
    },
    /// Reports an enemy's health after taking damage.
    EnemyDamaged {
        /// Identifier of the damaged enemy.
        enemy: EnemyId,
        /// Health remaining after the damage, floored at zero.
        health: u32,
    },
    /// Announces that an enemy was killed before resolving its objective.
    EnemyDied {
        /// Identifier of the dead enemy.
        enemy: EnemyId,
        /// Archetype of the dead enemy.
        kind: EnemyKind,
    },
    /// Announces that an enemy resolved its objective.
    ///
    /// Mutually exclusive with [`Event::EnemyDied`]: every enemy raises
    /// exactly one of the two terminal events.
    EnemyReachedObjective {
        /// Identifier of the resolving enemy.
        enemy: EnemyId,
        /// Archetype of the resolving enemy.
        kind: EnemyKind,
    },
    /// Confirms that a tower fired a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile by the world.
        projectile: ProjectileId,
        /// Tower that fired the projectile.
        tower: TowerId,
        /// Enemy the projectile pursues.
        target: EnemyId,
    },
    /// Announces that a projectile despawned without applying damage.
    ProjectileExpired {
        /// Identifier of the expired projectile.
        projectile: ProjectileId,
    },
}

/// Reasons a build request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildError {
    /// The named coordinate does not exist on the generated grid.
    UnknownCell,
    /// The named cell already hosts a tower.
    CellOccupied,
    /// The ledger cannot cover the full build price.
    InsufficientResources,
}

/// Reasons an upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    UnknownTower,
    /// The tower already sits at its maximum level.
    MaxLevelReached,
    /// The ledger cannot cover the full upgrade price.
    InsufficientResources,
}

/// Reasons a repair request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepairError {
    /// No tower with the provided identifier exists.
    UnknownTower,
    /// The tower already holds full health.
    AlreadyFullHealth,
    /// The ledger cannot cover the repair fee.
    InsufficientResources,
}

/// Reasons a demolish request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemolishError {
    /// No tower with the provided identifier exists.
    UnknownTower,
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell the tower occupies.
    pub cell: HexCoord,
    /// World-space center of the occupied cell.
    pub position: Position,
    /// Level the tower currently holds.
    pub level: u8,
    /// Current health, floored at zero.
    pub health: u32,
    /// Maximum health at the current level.
    pub max_health: u32,
    /// Damage applied by each projectile at the current level.
    pub damage: u32,
    /// Detection and firing radius at the current level.
    pub range: f32,
    /// Indicates whether the fire cooldown has fully accumulated.
    pub ready_to_fire: bool,
}

/// Read-only snapshot describing all towers placed on the map.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Retrieves the snapshot for the provided tower, if it exists.
    #[must_use]
    pub fn snapshot(&self, tower: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy by the world.
    pub id: EnemyId,
    /// Archetype selecting the enemy's policy table.
    pub kind: EnemyKind,
    /// World-space position.
    pub position: Position,
    /// Current health, floored at zero.
    pub health: u32,
    /// Maximum health assigned at spawn.
    pub max_health: u32,
    /// Wave-scaled movement speed.
    pub speed: f32,
    /// Objective currently pursued, if any.
    pub objective: Option<Objective>,
    /// Indicates whether the strike cooldown has fully accumulated.
    pub ready_to_strike: bool,
    /// Indicates whether the acquisition interval elapsed since the last
    /// objective assignment.
    pub retarget_due: bool,
}

/// Read-only snapshot describing all enemies active in the world.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Retrieves the snapshot for the provided enemy, if it exists.
    #[must_use]
    pub fn snapshot(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile by the world.
    pub id: ProjectileId,
    /// World-space position.
    pub position: Position,
    /// Enemy the projectile pursues.
    pub target: EnemyId,
    /// Damage applied on impact.
    pub damage: u32,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single grid cell used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSnapshot {
    /// Axial coordinate identifying the cell.
    pub coord: HexCoord,
    /// World-space center of the cell.
    pub position: Position,
    /// Indicates whether the cell hosts a tower.
    pub occupied: bool,
    /// Tower hosted by the cell, if any.
    pub tower: Option<TowerId>,
}

/// Pairing of a tower with the enemy it should engage this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy selected as the nearest candidate in range.
    pub enemy: EnemyId,
}

#[cfg(test)]
mod tests {
    use super::{
        BuildError, DemolishError, EnemyKind, HexCoord, Position, Price, Rank, RepairError,
        ResourceKind, TargetKind, TowerId, TowerKind, UpgradeError,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tower_id_round_trips_through_bincode() {
        assert_round_trip(&TowerId::new(42));
    }

    #[test]
    fn hex_coord_round_trips_through_bincode() {
        assert_round_trip(&HexCoord::new(-3, 7));
    }

    #[test]
    fn price_round_trips_through_bincode() {
        assert_round_trip(&Price::new(20, 5, 0));
    }

    #[test]
    fn rejection_reasons_round_trip_through_bincode() {
        assert_round_trip(&BuildError::CellOccupied);
        assert_round_trip(&UpgradeError::MaxLevelReached);
        assert_round_trip(&RepairError::AlreadyFullHealth);
        assert_round_trip(&DemolishError::UnknownTower);
    }

    #[test]
    fn rank_clamps_into_valid_range() {
        assert_eq!(Rank::new(0), Rank::MIN);
        assert_eq!(Rank::new(11), Rank::MAX);
        assert_eq!(Rank::new(4).get(), 4);
    }

    #[test]
    fn price_amount_matches_component_accessors() {
        let price = Price::new(30, 3, 10);
        assert_eq!(price.amount(ResourceKind::Wood), price.wood());
        assert_eq!(price.amount(ResourceKind::People), price.people());
        assert_eq!(price.amount(ResourceKind::Stone), price.stone());
    }

    #[test]
    fn sentry_stats_grow_monotonically_with_level() {
        let kind = TowerKind::Sentry;
        for level in 1..kind.max_level() {
            let current = kind.stats(level);
            let next = kind.stats(level + 1);
            assert!(next.damage > current.damage);
            assert!(next.fire_rate > current.fire_rate);
            assert!(next.range > current.range);
            assert!(next.max_health > current.max_health);
        }
    }

    #[test]
    fn sentry_upgrade_cost_ends_at_max_level() {
        let kind = TowerKind::Sentry;
        assert!(kind.upgrade_cost(1).is_some());
        assert!(kind.upgrade_cost(2).is_some());
        assert!(kind.upgrade_cost(kind.max_level()).is_none());
    }

    #[test]
    fn sapper_prefers_towers_before_castle() {
        assert_eq!(
            EnemyKind::Sapper.target_priorities(),
            &[TargetKind::Tower, TargetKind::Castle],
        );
        assert_eq!(EnemyKind::Breacher.target_priorities(), &[TargetKind::Castle]);
    }

    #[test]
    fn stepped_toward_stops_on_goal() {
        let start = Position::new(0.0, 0.0);
        let goal = Position::new(3.0, 4.0);

        let partial = start.stepped_toward(goal, 2.5);
        assert!((partial.distance_to(start) - 2.5).abs() < 1e-4);

        let clamped = start.stepped_toward(goal, 10.0);
        assert_eq!(clamped, goal);
    }

    #[test]
    fn fire_period_inverts_fire_rate() {
        let stats = TowerKind::Sentry.stats(2);
        let period = stats.fire_period();
        assert!((period.as_secs_f32() - 1.0 / stats.fire_rate).abs() < 1e-6);
    }
}
