#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use std::time::Duration;

use grid_defence_core::{Command, EnemyKind, Event, WavePhase, WaveStatus};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Fraction by which the spawn interval can shrink at most.
pub const MAX_INTERVAL_REDUCTION: f32 = 0.7;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    base_interval: Duration,
    reduction_per_wave: f32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence and seed.
    #[must_use]
    pub const fn new(base_interval: Duration, reduction_per_wave: f32, rng_seed: u64) -> Self {
        Self {
            base_interval,
            reduction_per_wave,
            rng_seed,
        }
    }

    /// Interval between two spawns of the provided wave.
    ///
    /// Each wave after the first shortens the base interval by
    /// `reduction_per_wave`, up to [`MAX_INTERVAL_REDUCTION`]. The result is
    /// never shorter than one microsecond.
    #[must_use]
    pub fn spawn_interval(&self, wave: u32) -> Duration {
        let elapsed_waves = f64::from(wave.saturating_sub(1));
        let reduction = (elapsed_waves * f64::from(self.reduction_per_wave))
            .clamp(0.0, f64::from(MAX_INTERVAL_REDUCTION));
        let micros = self.base_interval.as_micros() as f64 * (1.0 - reduction);
        Duration::from_micros((micros.round() as u64).max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 0.02, 0x5eed)
    }
}

/// Pure system that emits spawn commands while a wave is spawning.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and the wave status to emit spawn commands.
    ///
    /// Wave starts and stops reset the accumulator, so the first enemy of a
    /// wave appears one full interval after the wave began.
    pub fn handle(&mut self, events: &[Event], wave: &WaveStatus, out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                Event::WaveStarted { .. } | Event::WaveStopped { .. } => {
                    accumulated = Duration::ZERO;
                    self.accumulator = Duration::ZERO;
                }
                _ => {}
            }
        }

        if wave.phase != WavePhase::Spawning {
            self.accumulator = Duration::ZERO;
            return;
        }

        let interval = self.config.spawn_interval(wave.wave);
        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let spawn_attempts = self.resolve_spawn_attempts(interval, wave.remaining_to_spawn());

        for _ in 0..spawn_attempts {
            let kind = self.select_kind(&wave.kinds);
            out.push(Command::SpawnEnemy { kind });
        }
    }

    fn resolve_spawn_attempts(&mut self, interval: Duration, remaining: u32) -> u32 {
        let mut attempts = 0;
        while self.accumulator >= interval && attempts < remaining {
            self.accumulator -= interval;
            attempts += 1;
        }
        if attempts == remaining {
            self.accumulator = Duration::ZERO;
        }
        attempts
    }

    fn select_kind(&mut self, kinds: &[EnemyKind]) -> EnemyKind {
        kinds
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(EnemyKind::Normal)
    }
}
