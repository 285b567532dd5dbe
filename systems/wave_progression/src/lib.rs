#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave progression system that plans waves and schedules their start.
//!
//! The system owns the countdown between waves. It listens for completion
//! events, waits the configured delay in simulation time and then emits a
//! `StartWave` command carrying the plan of the following wave.

use std::time::Duration;

use grid_defence_core::{Command, EnemyKind, Event, WavePlan, WaveScaling};

/// Enemy count of the opening wave.
pub const FIRST_WAVE_ENEMIES: u32 = 12;

/// Enemy count of every wave after the first.
pub const WAVE_ENEMIES: u32 = 15;

/// Wave from which each enemy kind joins the mix.
const UNLOCKS: [(EnemyKind, u32); 6] = [
    (EnemyKind::Normal, 1),
    (EnemyKind::Fast, 5),
    (EnemyKind::Tough, 10),
    (EnemyKind::Armored, 15),
    (EnemyKind::Boss, 20),
    (EnemyKind::Elite, 25),
];

/// Configuration parameters required to construct the progression system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    max_waves: u32,
    first_wave_delay: Duration,
    next_wave_delay: Duration,
    auto_start: bool,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(
        max_waves: u32,
        first_wave_delay: Duration,
        next_wave_delay: Duration,
        auto_start: bool,
    ) -> Self {
        Self {
            max_waves,
            first_wave_delay,
            next_wave_delay,
            auto_start,
        }
    }

    /// Number of waves that make up a full game.
    #[must_use]
    pub const fn max_waves(&self) -> u32 {
        self.max_waves
    }

    /// Whether waves start on their own once the countdown elapses.
    #[must_use]
    pub const fn auto_start(&self) -> bool {
        self.auto_start
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(30, Duration::from_secs(10), Duration::from_secs(5), true)
    }
}

/// Builds the plan of the provided wave.
#[must_use]
pub fn plan_for_wave(wave: u32, max_waves: u32) -> WavePlan {
    let enemy_count = if wave <= 1 {
        FIRST_WAVE_ENEMIES
    } else {
        WAVE_ENEMIES
    };

    WavePlan {
        wave,
        enemy_count,
        kinds: unlocked_kinds(wave),
        scaling: scaling_for_wave(wave, max_waves),
    }
}

/// Enemy kinds available in the provided wave, in unlock order.
#[must_use]
pub fn unlocked_kinds(wave: u32) -> Vec<EnemyKind> {
    UNLOCKS
        .iter()
        .filter(|(_, from)| wave >= *from)
        .map(|(kind, _)| *kind)
        .collect()
}

/// Eased stat scaling of the provided wave.
///
/// Progress through the game is squared, so early waves stay close to base
/// stats while the last wave reaches eight times the base health.
#[must_use]
pub fn scaling_for_wave(wave: u32, max_waves: u32) -> WaveScaling {
    let span = max_waves.saturating_sub(1);
    if span == 0 {
        return WaveScaling::IDENTITY;
    }

    let progress = (f64::from(wave.saturating_sub(1)) / f64::from(span)).clamp(0.0, 1.0);
    let eased = progress * progress;

    WaveScaling {
        health: (1.0 + 7.0 * eased) as f32,
        speed: (1.0 + 1.5 * eased) as f32,
        armor: (1.0 + 0.5 * eased) as f32,
    }
}

/// Orchestrator that decides when the next wave starts.
#[derive(Debug)]
pub struct WaveProgression {
    config: Config,
    next_wave: u32,
    countdown: Option<Duration>,
    requested: Option<u32>,
    finished: bool,
}

impl WaveProgression {
    /// Creates a new progression system waiting for the first wave.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            next_wave: 1,
            countdown: config.auto_start.then_some(config.first_wave_delay),
            requested: None,
            finished: config.max_waves == 0,
        }
    }

    /// Consumes world events, emitting `StartWave` once a countdown elapses.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    if let Some(remaining) = self.countdown.as_mut() {
                        *remaining = remaining.saturating_sub(*dt);
                    }
                }
                Event::WaveStarted { wave, .. } => {
                    self.countdown = None;
                    self.requested = None;
                    self.next_wave = wave.saturating_add(1);
                }
                Event::WaveStartRejected { wave, .. } => {
                    if self.requested == Some(*wave) {
                        self.requested = None;
                        self.next_wave = *wave;
                        self.arm(self.config.next_wave_delay);
                    }
                }
                Event::WaveCompleted { wave, next_wave } => {
                    if *wave >= self.config.max_waves {
                        self.finished = true;
                        self.countdown = None;
                        continue;
                    }
                    self.next_wave = *next_wave;
                    self.arm(self.config.next_wave_delay);
                }
                Event::WaveStopped { .. } => self.countdown = None,
                _ => {}
            }
        }

        if self.finished || self.countdown.is_some_and(|remaining| !remaining.is_zero()) {
            return;
        }

        if self.countdown.take().is_some() {
            self.requested = Some(self.next_wave);
            out.push(Command::StartWave {
                plan: plan_for_wave(self.next_wave, self.config.max_waves),
            });
        }
    }

    /// Plan of the wave that would start next, unless every wave was played.
    #[must_use]
    pub fn next_plan(&self) -> Option<WavePlan> {
        (!self.finished).then(|| plan_for_wave(self.next_wave, self.config.max_waves))
    }

    /// Number of the wave that starts next.
    #[must_use]
    pub fn next_wave(&self) -> u32 {
        self.next_wave
    }

    /// Simulation time left before the next automatic start, if one is pending.
    #[must_use]
    pub fn countdown_remaining(&self) -> Option<Duration> {
        self.countdown
    }

    /// Reports whether the final wave has been completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn arm(&mut self, delay: Duration) {
        if self.config.auto_start {
            self.countdown = Some(delay);
        }
    }
}
