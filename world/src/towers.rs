//! Authoritative tower state management utilities.

use std::collections::BTreeMap;
use std::time::Duration;

use hex_defence_core::{HexCoord, Position, TowerId, TowerKind, TowerStats};

/// State tracked for a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) cell: HexCoord,
    pub(crate) position: Position,
    pub(crate) level: u8,
    pub(crate) health: u32,
    /// Simulated time accumulated toward the next shot. Resets to zero when
    /// a projectile is fired.
    pub(crate) cooldown: Duration,
    /// Cumulative wood sunk into the tower, driving the repair fee.
    pub(crate) invested_wood: u32,
}

impl TowerState {
    pub(crate) fn stats(&self) -> TowerStats {
        self.kind.stats(self.level)
    }

    pub(crate) fn ready_to_fire(&self) -> bool {
        self.cooldown >= self.stats().fire_period()
    }

    /// Repair fee in wood: cumulative investment scaled by the missing
    /// health fraction, plus one. Never free, never below one.
    pub(crate) fn repair_cost(&self) -> u32 {
        let stats = self.stats();
        let missing = stats.max_health.saturating_sub(self.health);
        self.invested_wood * missing / stats.max_health + 1
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug, Default)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: u32,
}

impl TowerRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores a freshly built tower at level one and full health.
    pub(crate) fn insert(&mut self, kind: TowerKind, cell: HexCoord, position: Position) -> TowerId {
        let id = TowerId::new(self.next_tower_id);
        self.next_tower_id += 1;

        let state = TowerState {
            id,
            kind,
            cell,
            position,
            level: 1,
            health: kind.stats(1).max_health,
            cooldown: Duration::ZERO,
            invested_wood: kind.build_cost().wood(),
        };
        let _ = self.entries.insert(id, state);
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }
}
