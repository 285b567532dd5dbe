#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session that owns the world, the systems and the player's resources.
//!
//! A [`Session`] drives one game from creation to disposal. It runs the tick
//! pipeline, routes player input through the world, keeps the money and lives
//! ledger and buffers every world event until [`Session::drain_events`]
//! collects it.

mod config;
mod ledger;

use std::time::Duration;

use glam::Vec2;
use grid_defence_core::{
    BoardError, CellCoord, Command, EnemyId, EnemySnapshot, Event, Path, PlacementError,
    TowerCatalog, TowerId, TowerTypeId, WavePlan, WaveStartError, WaveStatus,
};
use grid_defence_system_movement::Movement;
use grid_defence_system_spawning::Spawning;
use grid_defence_system_tower_combat::TowerCombat;
use grid_defence_system_tower_targeting::TowerTargeting;
use grid_defence_system_wave_progression::WaveProgression;
use grid_defence_world::{self as world, query, World};
use thiserror::Error;

pub use config::{ConfigError, EconomyConfig, SessionConfig, SpawnSettings, WaveSettings};
pub use ledger::{kill_reward, wave_bonus, Ledger};

/// Reasons a tower could not be built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The player cannot pay for the tower.
    #[error("tower costs {cost} but only {available} is available")]
    InsufficientFunds {
        /// Price of the requested tower.
        cost: u32,
        /// Money held by the player.
        available: u32,
    },
    /// The board refused the placement.
    #[error(transparent)]
    Placement(#[from] PlacementError),
    /// The game already ended.
    #[error("the session is over")]
    SessionOver,
}

/// Errors raised by session lifecycle and wave control.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The board described by the configuration cannot be built.
    #[error("invalid board: {0}")]
    Board(#[from] BoardError),
    /// A time scale must be positive and finite.
    #[error("time scale must be positive and finite, got {0}")]
    InvalidTimeScale(f32),
    /// The world refused to start the wave.
    #[error("wave {wave} could not start: {reason}")]
    WaveStart {
        /// Wave that was requested.
        wave: u32,
        /// Reason reported by the world.
        reason: WaveStartError,
    },
    /// Every wave of the game has been played.
    #[error("no waves left to start")]
    NoWavesLeft,
    /// The game already ended.
    #[error("the session is over")]
    SessionOver,
}

/// Lifecycle state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// The game is in progress.
    Running,
    /// Every life was lost.
    GameOver,
    /// The final wave was completed.
    Victory,
}

/// Final report produced when a session is disposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    /// Number of the last completed wave.
    pub waves_completed: u32,
    /// Money left.
    pub money: u32,
    /// Lives left.
    pub lives: u32,
    /// How the session ended, or `Running` if it was abandoned.
    pub state: SessionState,
    /// Total simulated time.
    pub elapsed: Duration,
}

#[derive(Debug)]
struct Systems {
    progression: WaveProgression,
    spawning: Spawning,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
}

impl Systems {
    fn new(config: &SessionConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            progression: WaveProgression::new(config.progression()?),
            spawning: Spawning::new(config.spawning()?),
            movement: Movement::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
        })
    }
}

/// One game from creation to disposal.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    world: World,
    systems: Systems,
    ledger: Ledger,
    time_scale: f32,
    paused: bool,
    state: SessionState,
    waves_completed: u32,
    /// Events raised since wave progression last ran.
    progression_backlog: Vec<Event>,
    outbound: Vec<Event>,
}

impl Session {
    /// Creates a session from the provided configuration.
    pub fn create(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let world = World::new(&config.board, TowerCatalog::for_faction(config.faction))?;
        let systems = Systems::new(&config)?;
        tracing::debug!(
            size = config.board.size,
            faction = ?config.faction,
            "session created"
        );

        Ok(Self {
            ledger: Ledger::new(&config.economy),
            time_scale: config.time_scale,
            config,
            world,
            systems,
            paused: false,
            state: SessionState::Running,
            waves_completed: 0,
            progression_backlog: Vec::new(),
            outbound: Vec::new(),
        })
    }

    /// Rebuilds the world, systems, ledger and clock from the stored configuration.
    ///
    /// Undelivered events are discarded.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        *self = Self::create(self.config.clone())?;
        Ok(())
    }

    /// Ends the session and reports its outcome.
    #[must_use]
    pub fn dispose(self) -> SessionSummary {
        let summary = self.summary();
        tracing::debug!(?summary, "session disposed");
        summary
    }

    /// Advances the simulation by `frame_dt` of real time.
    ///
    /// The step is multiplied by the time scale before it reaches the world.
    /// Paused or finished sessions ignore the call.
    pub fn tick(&mut self, frame_dt: Duration) {
        if self.paused || self.state != SessionState::Running {
            return;
        }

        let dt = scale_duration(frame_dt, self.time_scale);
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        let mut inbox = std::mem::take(&mut self.progression_backlog);
        inbox.extend_from_slice(&events);
        self.systems.progression.handle(&inbox, &mut commands);
        let seen_by_progression = events.len();
        self.dispatch(&mut commands, &mut events);

        self.run_simulation_stages(&mut events);
        self.deliver(events, seen_by_progression);
    }

    /// Runs spawning, movement, targeting and combat in order, stopping as
    /// soon as the session is no longer running.
    fn run_simulation_stages(&mut self, events: &mut Vec<Event>) {
        let mut commands = Vec::new();
        if self.state != SessionState::Running {
            return;
        }
        self.systems.spawning.handle(
            events,
            &query::wave_status(&self.world),
            &mut commands,
        );
        self.dispatch(&mut commands, events);

        if self.state != SessionState::Running {
            return;
        }
        self.systems.movement.handle(
            events,
            &query::enemy_view(&self.world),
            query::geometry(&self.world),
            &mut commands,
        );
        self.dispatch(&mut commands, events);

        if self.state != SessionState::Running {
            return;
        }
        self.systems.targeting.handle(
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        self.dispatch(&mut commands, events);

        if self.state != SessionState::Running {
            return;
        }
        self.systems.combat.handle(
            &query::tower_view(&self.world),
            query::tower_cooldowns(&self.world),
            &mut commands,
        );
        self.dispatch(&mut commands, events);
    }

    /// Builds a tower of `kind` on `cell`, paying its cost.
    ///
    /// Enemies already on the board are rerouted before this returns.
    pub fn place_tower(
        &mut self,
        cell: CellCoord,
        kind: TowerTypeId,
    ) -> Result<TowerId, BuildError> {
        if self.state != SessionState::Running {
            return Err(BuildError::SessionOver);
        }
        let cost = query::tower_catalog(&self.world)
            .get(kind)
            .map(|tower_type| tower_type.cost)
            .ok_or(PlacementError::UnknownTowerType)?;
        self.ledger.ensure_affordable(cost)?;

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::PlaceTower { kind, cell }, &mut events);
        self.book(&mut events, 0);

        let outcome = events
            .iter()
            .find_map(|event| match event {
                Event::TowerPlaced { tower, .. } => Some(Ok(*tower)),
                Event::TowerPlacementRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(PlacementError::UnknownTowerType));

        if outcome.is_ok() {
            self.ledger.spend(cost);
            let mut commands = Vec::new();
            self.systems.movement.handle(
                &events,
                &query::enemy_view(&self.world),
                query::geometry(&self.world),
                &mut commands,
            );
            self.dispatch(&mut commands, &mut events);
        }

        self.deliver(events, 0);
        outcome.map_err(BuildError::from)
    }

    /// Starts the next wave of the progression immediately.
    ///
    /// A pending countdown is cancelled. Returns the started wave number.
    pub fn start_wave(&mut self) -> Result<u32, SessionError> {
        let plan = self
            .systems
            .progression
            .next_plan()
            .ok_or(SessionError::NoWavesLeft)?;
        self.start_wave_with(plan)
    }

    /// Starts a wave described by `plan`, bypassing the progression's own plan.
    pub fn start_wave_with(&mut self, plan: WavePlan) -> Result<u32, SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::SessionOver);
        }

        let wave = plan.wave;
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::StartWave { plan }, &mut events);
        let rejection = events.iter().find_map(|event| match event {
            Event::WaveStartRejected { reason, .. } => Some(*reason),
            _ => None,
        });

        self.book(&mut events, 0);
        self.deliver(events, 0);
        match rejection {
            Some(reason) => Err(SessionError::WaveStart { wave, reason }),
            None => Ok(wave),
        }
    }

    /// Applies `amount` raw damage to an enemy. Returns whether it landed.
    pub fn apply_damage(&mut self, enemy: EnemyId, amount: f32) -> bool {
        if self.state != SessionState::Running {
            return false;
        }

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::DamageEnemy { enemy, amount }, &mut events);
        let landed = events
            .iter()
            .any(|event| matches!(event, Event::EnemyDamaged { .. }));
        self.book(&mut events, 0);
        self.deliver(events, 0);
        landed
    }

    /// Changes the simulation speed multiplier.
    pub fn set_time_scale(&mut self, scale: f32) -> Result<(), SessionError> {
        if !config::is_valid_time_scale(scale) {
            return Err(SessionError::InvalidTimeScale(scale));
        }
        self.time_scale = scale;
        Ok(())
    }

    /// Current simulation speed multiplier.
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Suspends tick processing without losing accumulated progress.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes tick processing.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Reports whether ticks are currently ignored because of a pause.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Takes every event raised since the previous call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbound)
    }

    /// Lifecycle state of the session.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Player resources.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Read-only access to the world for [`grid_defence_world::query`].
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Configuration the session was created from.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Reports whether a tower could be built on `cell`, ignoring its price.
    #[must_use]
    pub fn is_placement_valid(&self, cell: CellCoord) -> bool {
        query::is_placement_valid(&self.world, cell)
    }

    /// Current path from start to end.
    #[must_use]
    pub fn path(&self) -> Option<Path> {
        query::path(&self.world)
    }

    /// Number of enemies still walking.
    #[must_use]
    pub fn active_enemy_count(&self) -> usize {
        query::active_enemy_count(&self.world)
    }

    /// Live enemies within `radius` of `position`.
    #[must_use]
    pub fn enemies_in_range(&self, position: Vec2, radius: f32) -> Vec<EnemySnapshot> {
        query::enemies_in_range(&self.world, position, radius)
    }

    /// Counters of the current or most recent wave.
    #[must_use]
    pub fn wave_status(&self) -> WaveStatus {
        query::wave_status(&self.world)
    }

    /// Number of the wave that starts next.
    #[must_use]
    pub fn next_wave(&self) -> u32 {
        self.systems.progression.next_wave()
    }

    /// Simulation time left before the next automatic wave, if one is pending.
    #[must_use]
    pub fn countdown_remaining(&self) -> Option<Duration> {
        self.systems.progression.countdown_remaining()
    }

    /// Snapshot of the session outcome so far.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            waves_completed: self.waves_completed,
            money: self.ledger.money(),
            lives: self.ledger.lives(),
            state: self.state,
            elapsed: query::elapsed(&self.world),
        }
    }

    /// Applies `commands` one at a time and books what each one raised.
    ///
    /// Commands still queued when the session ends are dropped.
    fn dispatch(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            if self.state != SessionState::Running {
                break;
            }
            let first = events.len();
            world::apply(&mut self.world, command, events);
            self.book(events, first);
        }
    }

    /// Books `events[first..]` in the ledger and applies the resulting state change.
    ///
    /// The arrival that costs the last life ends the game: every event raised
    /// after it is discarded and the wave is stopped in its place.
    fn book(&mut self, events: &mut Vec<Event>, first: usize) {
        let wave = query::wave_status(&self.world).wave;
        let max_waves = self.config.waves.max_waves;
        for index in first..events.len() {
            if self.state != SessionState::Running {
                return;
            }
            let event = &events[index];
            self.ledger.record(event, wave);

            if self.ledger.is_depleted() {
                events.truncate(index + 1);
                self.state = SessionState::GameOver;
                tracing::info!(wave, money = self.ledger.money(), "game over");
                world::apply(&mut self.world, Command::StopWave, events);
                return;
            }

            if let Event::WaveCompleted { wave, next_wave } = *event {
                self.waves_completed = wave;
                tracing::info!(
                    wave,
                    next_wave,
                    money = self.ledger.money(),
                    lives = self.ledger.lives(),
                    "wave completed"
                );
                if wave >= max_waves {
                    self.state = SessionState::Victory;
                    tracing::info!(wave, money = self.ledger.money(), "victory");
                }
            }
        }
    }

    /// Queues `events` for delivery. Progression already saw the first
    /// `seen_by_progression` of them.
    fn deliver(&mut self, mut events: Vec<Event>, seen_by_progression: usize) {
        self.progression_backlog
            .extend_from_slice(events.get(seen_by_progression..).unwrap_or_default());
        self.outbound.append(&mut events);
    }
}

fn scale_duration(dt: Duration, scale: f32) -> Duration {
    let nanos = (dt.as_nanos() as f64 * f64::from(scale)).round();
    if nanos >= u64::MAX as f64 {
        return Duration::MAX;
    }
    Duration::from_nanos(nanos as u64)
}
