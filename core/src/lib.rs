#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Defence simulation.
//!
//! This crate defines the message surface that connects the session, the
//! authoritative world, and pure systems. The session submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems
//! and external consumers to react to. Systems consume event streams, query
//! immutable views, and respond exclusively with new command batches.

mod catalog;

use std::{sync::Arc, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use catalog::{
    mitigated_damage, EnemyKind, EnemyStats, Faction, TowerCatalog, TowerType, TowerTypeId,
    BASE_ENEMY_HEALTH, BASE_ENEMY_SPEED, MAX_ARMOR,
};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided, already scaled, delta.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests placement of a tower of the given type on a board cell.
    PlaceTower {
        /// Catalog identifier of the tower type to construct.
        kind: TowerTypeId,
        /// Cell that will hold the tower.
        cell: CellCoord,
    },
    /// Requests that a new wave begins using the supplied plan.
    StartWave {
        /// Parameters describing the wave.
        plan: WavePlan,
    },
    /// Cancels the active wave without reporting kills or completion.
    StopWave,
    /// Requests that the active wave spawns one enemy of the given kind.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
    },
    /// Moves an enemy to a new position along its current path.
    AdvanceEnemy {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Updated world position on the horizontal plane.
        position: Vec2,
        /// Index of the last waypoint the enemy has reached.
        path_index: usize,
    },
    /// Rebinds an enemy to a freshly computed path.
    RerouteEnemy {
        /// Identifier of the enemy to reroute.
        enemy: EnemyId,
        /// Path the enemy follows from now on.
        path: Path,
        /// Index within the new path the enemy resumes from.
        path_index: usize,
    },
    /// Records the enemy a tower is locked onto, or clears it.
    AssignTowerTarget {
        /// Tower whose target changes.
        tower: TowerId,
        /// Newly held target, `None` to release the current one.
        target: Option<EnemyId>,
    },
    /// Requests that a tower fires at its target.
    FireTower {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy receiving the shot.
        target: EnemyId,
    },
    /// Applies raw damage to an enemy, before armor mitigation.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Raw damage amount.
        amount: f32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a tower was placed on the board.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Catalog type of the tower.
        kind: TowerTypeId,
        /// Cell occupied by the tower.
        cell: CellCoord,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Catalog type that was requested.
        kind: TowerTypeId,
        /// Cell that was requested.
        cell: CellCoord,
        /// Reason the placement failed.
        reason: PlacementError,
    },
    /// Announces that the board topology changed.
    PathChanged {
        /// Path after the change, `None` when the end became unreachable.
        path: Option<Path>,
    },
    /// Confirms that a wave began spawning.
    WaveStarted {
        /// Number of the wave that started.
        wave: u32,
        /// Number of enemies the wave will spawn.
        total: u32,
    },
    /// Reports that a wave start request was rejected.
    WaveStartRejected {
        /// Number of the wave that was requested.
        wave: u32,
        /// Reason the wave could not start.
        reason: WaveStartError,
    },
    /// Confirms that an enemy entered the board.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of enemy that spawned.
        kind: EnemyKind,
    },
    /// Reports damage that landed on an enemy after armor mitigation.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Damage applied after mitigation.
        amount: f32,
        /// Health remaining after the hit, negative on overkill.
        health: f32,
    },
    /// Reports that an enemy died. Emitted exactly once per enemy.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Kind of the enemy, used for rewards.
        kind: EnemyKind,
    },
    /// Reports that an enemy reached the end of its path.
    EnemyReachedEnd {
        /// Enemy that escaped.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
    },
    /// Confirms that a tower fired at an enemy.
    TowerFired {
        /// Tower that fired.
        tower: TowerId,
        /// Enemy that was targeted.
        target: EnemyId,
    },
    /// Reports that every enemy of a wave was resolved.
    WaveCompleted {
        /// Number of the wave that completed.
        wave: u32,
        /// Number of the wave that should follow.
        next_wave: u32,
    },
    /// Reports that an active wave was cancelled early.
    WaveStopped {
        /// Number of the wave that was cancelled.
        wave: u32,
    },
}

/// Unique identifier assigned to each enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided value.
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

/// Unique identifier assigned to each placed tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided value.
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

/// Location of a single board cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Returns the coordinate shifted by the provided offsets, if it stays non-negative.
    #[must_use]
    pub fn offset(self, columns: i32, rows: i32) -> Option<CellCoord> {
        let column = self.column.checked_add_signed(columns)?;
        let row = self.row.checked_add_signed(rows)?;
        Some(CellCoord::new(column, row))
    }
}

/// Designation of a board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Regular buildable cell.
    Empty,
    /// Cell where enemies enter the board.
    Start,
    /// Cell enemies try to reach.
    End,
}

/// Largest number of cells accepted along a board edge.
pub const MAX_BOARD_SIZE: u32 = 1_024;

/// Parameters used to construct a square board.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of cells along each board edge.
    pub size: u32,
    /// Side length of a cell in world units.
    pub cell_length: f32,
    /// Start cell, defaults to the upper-left corner.
    pub start: Option<CellCoord>,
    /// End cell, defaults to the lower-right corner.
    pub end: Option<CellCoord>,
    /// Whether enemies may move diagonally.
    pub allow_diagonal: bool,
}

impl BoardConfig {
    /// Start cell after resolving the default.
    #[must_use]
    pub fn start_cell(&self) -> CellCoord {
        self.start.unwrap_or(CellCoord::new(0, 0))
    }

    /// End cell after resolving the default.
    #[must_use]
    pub fn end_cell(&self) -> CellCoord {
        let last = self.size.saturating_sub(1);
        self.end.unwrap_or(CellCoord::new(last, last))
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size: 15,
            cell_length: 2.0,
            start: None,
            end: None,
            allow_diagonal: true,
        }
    }
}

/// Maps board cells onto the horizontal world plane.
///
/// The board is centred on the origin: the world `x` axis follows columns and
/// the world `z` axis (stored in [`Vec2::y`]) follows rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardGeometry {
    size: u32,
    cell_length: f32,
}

impl BoardGeometry {
    /// Creates a new geometry description.
    #[must_use]
    pub const fn new(size: u32, cell_length: f32) -> Self {
        Self { size, cell_length }
    }

    /// Number of cells along each board edge.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Side length of a cell in world units.
    #[must_use]
    pub const fn cell_length(&self) -> f32 {
        self.cell_length
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.size && cell.row() < self.size
    }

    /// World position of the centre of a cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        let half = self.size as f32 / 2.0;
        Vec2::new(
            (cell.column() as f32 - half + 0.5) * self.cell_length,
            (cell.row() as f32 - half + 0.5) * self.cell_length,
        )
    }
}

/// Ordered sequence of cells connecting the start to the end, inclusive.
///
/// Paths are immutable and shared: cloning only bumps a reference count, so
/// every enemy bound to the same computation holds the same cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path {
    cells: Arc<[CellCoord]>,
}

impl Path {
    /// Creates a path from the provided cells.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>) -> Self {
        Self {
            cells: cells.into(),
        }
    }

    /// Cells of the path from start to end.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Number of cells in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the path holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Index of the final waypoint.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Cell stored at the provided index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<CellCoord> {
        self.cells.get(index).copied()
    }

    /// Reports whether both paths come from the same computation.
    #[must_use]
    pub fn is_same_computation(&self, other: &Path) -> bool {
        Arc::ptr_eq(&self.cells, &other.cells)
    }
}

/// Scaling factors applied to every enemy of a wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveScaling {
    /// Multiplier applied to maximum health.
    pub health: f32,
    /// Multiplier applied to movement speed.
    pub speed: f32,
    /// Multiplier applied to base armor.
    pub armor: f32,
}

impl WaveScaling {
    /// Scaling that leaves base stats untouched.
    pub const IDENTITY: Self = Self {
        health: 1.0,
        speed: 1.0,
        armor: 1.0,
    };
}

impl Default for WaveScaling {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Parameters of a single wave.
#[derive(Clone, Debug, PartialEq)]
pub struct WavePlan {
    /// Wave number, starting at one.
    pub wave: u32,
    /// Number of enemies to spawn.
    pub enemy_count: u32,
    /// Kinds the spawner chooses from.
    pub kinds: Vec<EnemyKind>,
    /// Stat scaling applied to spawned enemies.
    pub scaling: WaveScaling,
}

/// Lifecycle phase of the wave controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// No wave is active.
    Idle,
    /// Enemies are still being spawned.
    Spawning,
    /// Every enemy spawned; waiting for them to die or escape.
    Draining,
}

/// Read-only description of the wave controller.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveStatus {
    /// Number of the current or most recent wave, zero before the first one.
    pub wave: u32,
    /// Current lifecycle phase.
    pub phase: WavePhase,
    /// Number of enemies the wave spawns.
    pub total: u32,
    /// Enemies spawned so far.
    pub spawned: u32,
    /// Enemies killed so far.
    pub killed: u32,
    /// Enemies that reached the end so far.
    pub reached_end: u32,
    /// Kinds the spawner chooses from.
    pub kinds: Vec<EnemyKind>,
}

impl WaveStatus {
    /// Number of enemies that still have to spawn.
    #[must_use]
    pub fn remaining_to_spawn(&self) -> u32 {
        self.total.saturating_sub(self.spawned)
    }

    /// Reports whether a wave is spawning or draining.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != WavePhase::Idle
    }
}

/// Lifecycle state of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyState {
    /// Enemy is moving along its path.
    Alive,
    /// Enemy was killed.
    Dead,
    /// Enemy reached the end cell.
    ReachedEnd,
}

/// Snapshot describing an enemy at the moment it was captured.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Lifecycle state.
    pub state: EnemyState,
    /// Remaining health.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Fraction of incoming damage absorbed.
    pub armor: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Current world position.
    pub position: Vec2,
    /// Path the enemy follows.
    pub path: Path,
    /// Index of the last waypoint reached.
    pub path_index: usize,
}

impl EnemySnapshot {
    /// Reports whether the enemy is still moving.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state == EnemyState::Alive
    }
}

/// Read-only view of every enemy, ordered by identifier.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new view from the provided snapshots, sorting them by id.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for an enemy.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of snapshots in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
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

/// Snapshot describing a placed tower.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier of the tower.
    pub id: TowerId,
    /// Catalog type of the tower.
    pub kind: TowerTypeId,
    /// Cell holding the tower.
    pub cell: CellCoord,
    /// World position of the tower.
    pub position: Vec2,
    /// Targeting radius in world units.
    pub range: f32,
    /// Raw damage per shot.
    pub damage: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Enemy currently held as target.
    pub target: Option<EnemyId>,
}

/// Read-only view of every tower, ordered by identifier.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new view from the provided snapshots, sorting them by id.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Cooldown state captured for a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Tower whose cooldown is described.
    pub tower: TowerId,
    /// Time left until the tower may fire again.
    pub ready_in: Duration,
}

/// Read-only view of tower cooldowns, ordered by tower identifier.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new view from the provided snapshots, sorting them by tower.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in tower order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Reasons a tower placement can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PlacementError {
    /// The cell lies outside the board.
    #[error("cell lies outside the board")]
    OutOfBounds,
    /// The cell is the start or the end and can never hold a tower.
    #[error("start and end cells cannot hold towers")]
    Reserved,
    /// The cell already holds a tower.
    #[error("cell is already occupied")]
    Occupied,
    /// Occupying the cell would leave the end unreachable.
    #[error("placement would disconnect the start from the end")]
    BlocksPath,
    /// The requested tower type is not part of the catalog.
    #[error("tower type is not part of the catalog")]
    UnknownTowerType,
}

/// Reasons a wave start can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum WaveStartError {
    /// Another wave is still spawning or draining.
    #[error("a wave is already in progress")]
    AlreadyInProgress,
    /// The board currently has no path from start to end.
    #[error("no path connects the start to the end")]
    NoPath,
}

/// Reasons a board configuration is invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum BoardError {
    /// The board has no cells.
    #[error("board size must be at least one cell")]
    Empty,
    /// The board exceeds [`MAX_BOARD_SIZE`] cells per edge.
    #[error("board size {0} exceeds the limit of {}", MAX_BOARD_SIZE)]
    TooLarge(u32),
    /// The cell length is not a positive finite number.
    #[error("cell length must be positive")]
    InvalidCellLength,
    /// The start lies outside the board.
    #[error("start cell lies outside the board")]
    StartOutOfBounds,
    /// The end lies outside the board.
    #[error("end cell lies outside the board")]
    EndOutOfBounds,
    /// Start and end designate the same cell.
    #[error("start and end must be different cells")]
    StartEqualsEnd,
}
