//! Economy ledger and reputation ladder owned by the world.

use std::time::Duration;

use hex_defence_core::{Event, Price, Rank, ResourceKind};

/// Simulated time between supply drips.
pub(crate) const SUPPLY_INTERVAL: Duration = Duration::from_secs(20);

const SUPPLY_WOOD_PER_RANK: u32 = 5;
const SUPPLY_PEOPLE_PER_RANK: u32 = 2;
const SUPPLY_STONE_PER_RANK: u32 = 1;

const STARTING_WOOD: u32 = 100;
const STARTING_PEOPLE: u32 = 10;
const STARTING_STONE: u32 = 0;

/// Resource counters plus the supply-drip timer.
///
/// Counts are unsigned so they can never go negative; the only way a count
/// decreases is through [`Ledger::try_spend`], which checks the full price
/// before deducting anything.
#[derive(Clone, Debug)]
pub(crate) struct Ledger {
    wood: u32,
    people: u32,
    stone: u32,
    supply_timer: Duration,
}

impl Ledger {
    pub(crate) fn new() -> Self {
        Self {
            wood: STARTING_WOOD,
            people: STARTING_PEOPLE,
            stone: STARTING_STONE,
            supply_timer: Duration::ZERO,
        }
    }

    pub(crate) fn amount(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.wood,
            ResourceKind::People => self.people,
            ResourceKind::Stone => self.stone,
        }
    }

    pub(crate) fn has(&self, kind: ResourceKind, amount: u32) -> bool {
        self.amount(kind) >= amount
    }

    pub(crate) fn add(&mut self, kind: ResourceKind, amount: u32, out_events: &mut Vec<Event>) {
        if amount == 0 {
            return;
        }

        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(amount);
        out_events.push(Event::ResourceChanged {
            kind,
            amount: self.amount(kind),
        });
    }

    /// Deducts the full price atomically.
    ///
    /// Every component is checked before any deduction; a shortfall in one
    /// kind leaves all counters untouched.
    pub(crate) fn try_spend(&mut self, price: Price, out_events: &mut Vec<Event>) -> bool {
        for kind in ResourceKind::ALL {
            if !self.has(kind, price.amount(kind)) {
                return false;
            }
        }

        for kind in ResourceKind::ALL {
            let amount = price.amount(kind);
            if amount == 0 {
                continue;
            }

            *self.slot_mut(kind) -= amount;
            out_events.push(Event::ResourceChanged {
                kind,
                amount: self.amount(kind),
            });
        }

        true
    }

    /// Advances the supply timer, granting rank-scaled resources on elapse.
    ///
    /// The timer resets to zero rather than carrying the overshoot, so a
    /// long frame never banks more than one drip.
    pub(crate) fn tick(&mut self, dt: Duration, rank: Rank, out_events: &mut Vec<Event>) {
        self.supply_timer = self.supply_timer.saturating_add(dt);
        if self.supply_timer < SUPPLY_INTERVAL {
            return;
        }

        let multiplier = u32::from(rank.get());
        let wood = SUPPLY_WOOD_PER_RANK * multiplier;
        let people = SUPPLY_PEOPLE_PER_RANK * multiplier;
        let stone = SUPPLY_STONE_PER_RANK * multiplier;

        self.add(ResourceKind::Wood, wood, out_events);
        self.add(ResourceKind::People, people, out_events);
        self.add(ResourceKind::Stone, stone, out_events);
        out_events.push(Event::SupplyGranted {
            wood,
            people,
            stone,
        });

        self.supply_timer = Duration::ZERO;
    }

    pub(crate) fn time_until_supply(&self) -> Duration {
        SUPPLY_INTERVAL.saturating_sub(self.supply_timer)
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::People => &mut self.people,
            ResourceKind::Stone => &mut self.stone,
        }
    }
}

const STARTING_REPUTATION: u32 = 100;
const DEMOTION_PENALTY: u32 = 20;

/// Promotion thresholds checked high-to-low so the highest qualifying rank
/// wins.
const PROMOTIONS: [(u32, u8); 9] = [
    (1000, 10),
    (800, 9),
    (600, 8),
    (450, 7),
    (350, 6),
    (250, 5),
    (200, 4),
    (150, 3),
    (100, 2),
];

/// Demotion thresholds checked low-to-high once no promotion applies. The
/// gap between each demotion floor and the matching promotion threshold is
/// the hysteresis band that keeps the rank from flapping at a boundary.
const DEMOTIONS: [(u32, u8); 9] = [
    (40, 1),
    (80, 2),
    (120, 3),
    (170, 4),
    (220, 5),
    (320, 6),
    (420, 7),
    (520, 8),
    (750, 9),
];

/// Reputation scalar plus the rank derived from it.
#[derive(Clone, Debug)]
pub(crate) struct RankLadder {
    reputation: u32,
    rank: Rank,
}

impl RankLadder {
    pub(crate) fn new() -> Self {
        Self {
            reputation: STARTING_REPUTATION,
            rank: Rank::MIN,
        }
    }

    pub(crate) fn reputation(&self) -> u32 {
        self.reputation
    }

    pub(crate) fn rank(&self) -> Rank {
        self.rank
    }

    /// Applies a signed reputation delta and recomputes the rank.
    ///
    /// Returns the new rank when the tier changed. Demotions cost a flat
    /// [`DEMOTION_PENALTY`] on top of whatever loss triggered them.
    pub(crate) fn adjust(&mut self, delta: i32) -> Option<Rank> {
        self.reputation = if delta >= 0 {
            self.reputation.saturating_add(delta as u32)
        } else {
            self.reputation.saturating_sub(delta.unsigned_abs())
        };

        let new_rank = self.recompute();
        if new_rank == self.rank {
            return None;
        }

        if new_rank < self.rank {
            self.reputation = self.reputation.saturating_sub(DEMOTION_PENALTY);
        }
        self.rank = new_rank;
        Some(new_rank)
    }

    fn recompute(&self) -> Rank {
        for (threshold, rank) in PROMOTIONS {
            if self.reputation >= threshold && self.rank.get() < rank {
                return Rank::new(rank);
            }
        }

        for (below, rank) in DEMOTIONS {
            if self.reputation < below && self.rank.get() > rank {
                return Rank::new(rank);
            }
        }

        self.rank
    }
}
