#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grid Defence.
//!
//! The world owns the board, the live enemies, the placed towers and the wave
//! controller. It is mutated exclusively through [`apply`], which reports every
//! observable change as an [`Event`]. Read access goes through [`query`].

mod board;
mod enemies;
mod grid;
mod pathfinding;
mod towers;
mod wave;

use std::time::Duration;

use grid_defence_core::{
    BoardConfig, BoardError, Command, EnemyId, Event, PlacementError, TowerCatalog,
};

use crate::{
    board::Board,
    enemies::{DamageOutcome, EnemyRegistry},
    towers::TowerRegistry,
    wave::WaveController,
};

/// Represents the authoritative simulation state.
#[derive(Debug)]
pub struct World {
    board: Board,
    catalog: TowerCatalog,
    enemies: EnemyRegistry,
    towers: TowerRegistry,
    wave: WaveController,
    clock: Duration,
}

impl World {
    /// Creates a world with an empty board and the provided tower catalog.
    pub fn new(config: &BoardConfig, catalog: TowerCatalog) -> Result<Self, BoardError> {
        Ok(Self {
            board: Board::new(config)?,
            catalog,
            enemies: EnemyRegistry::new(),
            towers: TowerRegistry::new(),
            wave: WaveController::new(),
            clock: Duration::ZERO,
        })
    }

    fn damage_enemy(&mut self, enemy: EnemyId, amount: f32, out_events: &mut Vec<Event>) {
        let Some(agent) = self.enemies.get_mut(enemy) else {
            return;
        };

        match agent.apply_damage(amount) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Wounded { applied, health } => {
                out_events.push(Event::EnemyDamaged {
                    enemy,
                    amount: applied,
                    health,
                });
            }
            DamageOutcome::Killed { applied, health } => {
                let kind = agent.kind();
                out_events.push(Event::EnemyDamaged {
                    enemy,
                    amount: applied,
                    health,
                });
                out_events.push(Event::EnemyKilled { enemy, kind });
                self.wave.record_kill();
                self.complete_wave_if_resolved(out_events);
            }
        }
    }

    fn record_arrival(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let Some(kind) = self.enemies.get(enemy).map(|agent| agent.kind()) else {
            return;
        };
        out_events.push(Event::EnemyReachedEnd { enemy, kind });
        self.wave.record_arrival();
        self.complete_wave_if_resolved(out_events);
    }

    fn complete_wave_if_resolved(&mut self, out_events: &mut Vec<Event>) {
        if let Some((wave, next_wave)) = self.wave.take_completion() {
            tracing::debug!(wave, next_wave, "wave completed");
            out_events.push(Event::WaveCompleted { wave, next_wave });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.enemies.prune_resolved();
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::PlaceTower { kind, cell } => {
            let Some(tower_type) = world.catalog.get(kind) else {
                out_events.push(Event::TowerPlacementRejected {
                    kind,
                    cell,
                    reason: PlacementError::UnknownTowerType,
                });
                return;
            };

            match world.board.place(cell) {
                Ok(path) => {
                    let position = world.board.geometry().cell_center(cell);
                    let tower = world.towers.insert(tower_type, cell, position);
                    out_events.push(Event::TowerPlaced { tower, kind, cell });
                    out_events.push(Event::PathChanged { path });
                }
                Err(reason) => {
                    out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
                }
            }
        }
        Command::StartWave { plan } => {
            let wave = plan.wave;
            let total = plan.enemy_count;
            match world.wave.start(plan, world.board.path()) {
                Ok(()) => {
                    let leftover = world.enemies.clear();
                    if leftover > 0 {
                        tracing::warn!(
                            wave,
                            leftover,
                            "cleared enemies left over from a previous wave"
                        );
                    }
                    world.towers.clear_targets();
                    tracing::debug!(wave, total, "wave started");
                    out_events.push(Event::WaveStarted { wave, total });
                    world.complete_wave_if_resolved(out_events);
                }
                Err(reason) => {
                    tracing::debug!(wave, %reason, "wave start rejected");
                    out_events.push(Event::WaveStartRejected { wave, reason });
                }
            }
        }
        Command::StopWave => {
            if let Some(wave) = world.wave.stop() {
                let _ = world.enemies.clear();
                world.towers.clear_targets();
                tracing::debug!(wave, "wave stopped");
                out_events.push(Event::WaveStopped { wave });
            }
        }
        Command::SpawnEnemy { kind } => {
            let Some(path) = world.wave.spawn_path().cloned() else {
                return;
            };
            let scaling = world.wave.scaling();
            let enemy = world
                .enemies
                .spawn(kind, scaling, path, world.board.geometry());
            world.wave.record_spawn();
            tracing::debug!(?enemy, ?kind, "enemy spawned");
            out_events.push(Event::EnemySpawned { enemy, kind });
            world.complete_wave_if_resolved(out_events);
        }
        Command::AdvanceEnemy {
            enemy,
            position,
            path_index,
        } => {
            let arrived = world
                .enemies
                .get_mut(enemy)
                .is_some_and(|agent| agent.advance_to(position, path_index));
            if arrived {
                world.record_arrival(enemy, out_events);
            }
        }
        Command::RerouteEnemy {
            enemy,
            path,
            path_index,
        } => {
            let arrived = world
                .enemies
                .get_mut(enemy)
                .is_some_and(|agent| agent.reroute(path, path_index));
            if arrived {
                world.record_arrival(enemy, out_events);
            }
        }
        Command::AssignTowerTarget { tower, target } => {
            if let Some(state) = world.towers.get_mut(tower) {
                state.target = target;
            }
        }
        Command::FireTower { tower, target } => {
            let target_alive = world
                .enemies
                .get(target)
                .is_some_and(|agent| agent.is_alive());
            if !target_alive {
                return;
            }

            let now = world.clock;
            let Some(state) = world.towers.get_mut(tower) else {
                return;
            };
            if !state.ready_in(now).is_zero() {
                return;
            }
            state.last_fired_at = Some(now);
            let damage = state.damage;

            out_events.push(Event::TowerFired { tower, target });
            world.damage_enemy(target, damage, out_events);
        }
        Command::DamageEnemy { enemy, amount } => {
            world.damage_enemy(enemy, amount, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use grid_defence_core::{
        BoardGeometry, CellCoord, CellKind, EnemySnapshot, EnemyView, Path, PlacementError,
        TowerCatalog, TowerCooldownView, TowerView, WaveStatus,
    };

    use super::World;

    /// Geometry used to map cells onto world positions.
    #[must_use]
    pub fn geometry(world: &World) -> BoardGeometry {
        world.board.geometry()
    }

    /// Cell where enemies enter the board.
    #[must_use]
    pub fn start(world: &World) -> CellCoord {
        world.board.start()
    }

    /// Cell enemies try to reach.
    #[must_use]
    pub fn end(world: &World) -> CellCoord {
        world.board.end()
    }

    /// Designation of a cell, `None` outside the board.
    #[must_use]
    pub fn cell_kind(world: &World, cell: CellCoord) -> Option<CellKind> {
        world.board.cell_kind(cell)
    }

    /// Reports whether a tower stands on the cell.
    #[must_use]
    pub fn is_occupied(world: &World, cell: CellCoord) -> bool {
        world.board.is_occupied(cell)
    }

    /// Row-major occupancy flags of every cell.
    #[must_use]
    pub fn occupancy(world: &World) -> Vec<bool> {
        world.board.occupancy()
    }

    /// Explains whether a tower could be placed on the cell.
    pub fn placement(world: &World, cell: CellCoord) -> Result<(), PlacementError> {
        world.board.check_placement(cell)
    }

    /// Reports whether a tower could be placed on the cell.
    #[must_use]
    pub fn is_placement_valid(world: &World, cell: CellCoord) -> bool {
        world.board.check_placement(cell).is_ok()
    }

    /// Recomputes the current path from start to end.
    #[must_use]
    pub fn path(world: &World) -> Option<Path> {
        world.board.path()
    }

    /// Captures a read-only view of every enemy still tracked by the world.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Number of enemies that are still walking.
    #[must_use]
    pub fn active_enemy_count(world: &World) -> usize {
        world.enemies.alive_count()
    }

    /// Live enemies within `radius` of `position` on the horizontal plane, in id order.
    #[must_use]
    pub fn enemies_in_range(world: &World, position: Vec2, radius: f32) -> Vec<EnemySnapshot> {
        world
            .enemies
            .iter()
            .filter(|enemy| enemy.is_alive() && enemy.position().distance(position) <= radius)
            .map(|enemy| enemy.snapshot())
            .collect()
    }

    /// Captures a read-only view of every placed tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures the cooldown of every tower at the current simulation time.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| tower.cooldown(world.clock))
                .collect(),
        )
    }

    /// Tower types that can be placed.
    #[must_use]
    pub fn tower_catalog(world: &World) -> &TowerCatalog {
        &world.catalog
    }

    /// Counters and phase of the wave controller.
    #[must_use]
    pub fn wave_status(world: &World) -> WaveStatus {
        world.wave.status()
    }

    /// Number of the most recently completed wave.
    #[must_use]
    pub fn completed_waves(world: &World) -> u32 {
        world.wave.completed()
    }

    /// Total simulated time.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock
    }
}
