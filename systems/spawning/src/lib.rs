#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave controller that emits enemy spawn commands.

use std::time::Duration;

use hex_defence_core::{Command, EnemyKind, Event, Position};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Tuning knobs controlling wave pacing and difficulty growth.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Seconds between spawn attempts on wave one.
    pub initial_spawn_interval: Duration,
    /// Hard floor the spawn interval can never shrink below.
    pub min_spawn_interval: Duration,
    /// Amount the spawn interval shrinks per wave.
    pub spawn_interval_step: Duration,
    /// Simulated time between difficulty increases.
    pub difficulty_interval: Duration,
    /// Health added to spawned enemies per wave beyond the first.
    pub health_increase_per_wave: u32,
    /// Speed added to spawned enemies per wave beyond the first.
    pub speed_increase_per_wave: f32,
    /// Ceiling clamped onto wave-scaled enemy speed.
    pub max_speed: f32,
    /// Maximum number of concurrently active enemies.
    pub max_enemies: usize,
    /// Probability of spawning a sapper instead of a breacher.
    pub sapper_ratio: f32,
    /// Minimum corner of the spawn region.
    pub spawn_min: Position,
    /// Maximum corner of the spawn region.
    pub spawn_max: Position,
    /// Spawns landing closer than this to the castle are discarded.
    pub castle_exclusion_radius: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_spawn_interval: Duration::from_millis(1500),
            min_spawn_interval: Duration::from_millis(500),
            spawn_interval_step: Duration::from_millis(100),
            difficulty_interval: Duration::from_secs(20),
            health_increase_per_wave: 20,
            speed_increase_per_wave: 0.2,
            max_speed: 5.0,
            max_enemies: 15,
            sapper_ratio: 0.3,
            spawn_min: Position::new(-20.0, -8.0),
            spawn_max: Position::new(20.0, -6.0),
            castle_exclusion_radius: 5.0,
        }
    }
}

/// Pure system that deterministically emits spawn commands while active.
///
/// Randomness is drawn from a per-wave `ChaCha8Rng` whose seed is derived
/// from the session seed and the wave number, so a session replayed with the
/// same seed and tick sequence emits the same spawns.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    session_seed: u64,
    wave: u32,
    spawn_interval: Duration,
    spawn_timer: Duration,
    difficulty_timer: Duration,
    active: bool,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new wave controller using the supplied configuration.
    #[must_use]
    pub fn new(config: Config, session_seed: u64) -> Self {
        Self {
            config,
            session_seed,
            wave: 1,
            spawn_interval: config.initial_spawn_interval,
            spawn_timer: Duration::ZERO,
            difficulty_timer: Duration::ZERO,
            active: false,
            rng: wave_rng(session_seed, 1),
        }
    }

    /// Enables spawn and difficulty timers.
    pub fn start(&mut self) {
        self.active = true;
    }

    /// Freezes spawn and difficulty timers.
    ///
    /// Neither timer advances while stopped, so pausing never banks a burst
    /// of deferred spawns or wave jumps.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Reports whether the controller is currently spawning.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Wave the controller is currently on.
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Seconds between spawn attempts at the current wave.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Health an enemy of the provided kind receives at the current wave.
    #[must_use]
    pub fn wave_health(&self, kind: EnemyKind) -> u32 {
        kind.base_health() + self.config.health_increase_per_wave * (self.wave - 1)
    }

    /// Speed an enemy of the provided kind receives at the current wave.
    #[must_use]
    pub fn wave_speed(&self, kind: EnemyKind) -> f32 {
        let scaled = kind.base_speed() + self.config.speed_increase_per_wave * (self.wave - 1) as f32;
        scaled.min(self.config.max_speed)
    }

    /// Consumes tick events to emit spawn commands.
    ///
    /// `active_enemies` is the world's current enemy count; the controller
    /// never pushes the population past the configured cap.
    pub fn handle(
        &mut self,
        events: &[Event],
        castle: Position,
        active_enemies: usize,
        out: &mut Vec<Command>,
    ) {
        if !self.active {
            return;
        }

        let mut elapsed = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                elapsed = elapsed.saturating_add(*dt);
            }
        }

        if elapsed.is_zero() {
            return;
        }

        self.difficulty_timer = self.difficulty_timer.saturating_add(elapsed);
        if self.difficulty_timer >= self.config.difficulty_interval {
            self.advance_wave();
            self.difficulty_timer = Duration::ZERO;
        }

        self.spawn_timer = self.spawn_timer.saturating_add(elapsed);
        if self.spawn_timer >= self.spawn_interval && active_enemies < self.config.max_enemies {
            self.spawn_one(castle, out);
            self.spawn_timer = Duration::ZERO;
        }
    }

    fn advance_wave(&mut self) {
        self.wave += 1;
        self.spawn_interval = self
            .spawn_interval
            .saturating_sub(self.config.spawn_interval_step)
            .max(self.config.min_spawn_interval);
        self.rng = wave_rng(self.session_seed, self.wave);
    }

    fn spawn_one(&mut self, castle: Position, out: &mut Vec<Command>) {
        let kind = if self.rng.gen::<f32>() < self.config.sapper_ratio {
            EnemyKind::Sapper
        } else {
            EnemyKind::Breacher
        };

        let x = self
            .rng
            .gen_range(self.config.spawn_min.x()..=self.config.spawn_max.x());
        let y = self
            .rng
            .gen_range(self.config.spawn_min.y()..=self.config.spawn_max.y());
        let position = Position::new(x, y);

        // The spawn attempt is discarded, not retried, when it lands inside
        // the castle buffer; the timer has already reset.
        if position.distance_to(castle) < self.config.castle_exclusion_radius {
            return;
        }

        out.push(Command::SpawnEnemy {
            kind,
            position,
            health: self.wave_health(kind),
            speed: self.wave_speed(kind),
        });
    }
}

fn wave_rng(session_seed: u64, wave: u32) -> ChaCha8Rng {
    let mut hasher = Sha256::new();
    hasher.update(session_seed.to_le_bytes());
    hasher.update(wave.to_le_bytes());
    let digest = hasher.finalize();
    let seed: [u8; 32] = digest.into();
    ChaCha8Rng::from_seed(seed)
}
