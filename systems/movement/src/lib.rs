#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure movement system that walks enemies along their paths.
//!
//! Each tick moves every live enemy toward its next waypoint by
//! `speed × dt`, snapping onto the waypoint when it would overshoot. When the
//! board topology changes, enemies are rebound to the new path at the
//! waypoint matching their geometric progress.

use std::time::Duration;

use glam::Vec2;
use grid_defence_core::{BoardGeometry, Command, EnemySnapshot, EnemyView, Event, Path};

/// Movement system that emits reroute and advance commands.
#[derive(Debug, Default)]
pub struct Movement {
    latest_path: Option<Path>,
    scratch: Vec<Command>,
}

impl Movement {
    /// Creates a new movement system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and the enemy view to emit movement commands.
    ///
    /// Every live enemy that does not follow the most recently announced path
    /// is rerouted onto it, including enemies spawned on the path captured
    /// when their wave started. A reroute is resolved before the same tick's
    /// advance, so the emitted `AdvanceEnemy` already follows the new path.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        geometry: BoardGeometry,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                Event::PathChanged { path: Some(path) } if !path.is_empty() => {
                    self.latest_path = Some(path.clone());
                }
                _ => {}
            }
        }

        if elapsed.is_zero() && self.latest_path.is_none() {
            return;
        }

        self.scratch.clear();

        for enemy in enemies.iter().filter(|enemy| enemy.is_alive()) {
            let mut path = enemy.path.clone();
            let mut path_index = enemy.path_index;

            if let Some(replacement) = &self.latest_path {
                if !replacement.is_same_computation(&enemy.path)
                    && replacement.cells() != enemy.path.cells()
                {
                    path = replacement.clone();
                    path_index = resolve_path_index(enemy.position, &path, geometry);
                    self.scratch.push(Command::RerouteEnemy {
                        enemy: enemy.id,
                        path: path.clone(),
                        path_index,
                    });
                }
            }

            if elapsed.is_zero() || path_index >= path.last_index() {
                continue;
            }

            if let Some((position, next_index)) =
                advance_along(enemy, &path, path_index, elapsed, geometry)
            {
                self.scratch.push(Command::AdvanceEnemy {
                    enemy: enemy.id,
                    position,
                    path_index: next_index,
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

/// Picks the index on `path` an enemy at `position` should resume from.
///
/// The closest waypoint wins, with the earliest index winning exact ties. If
/// the enemy already passed the midpoint of the segment leaving that waypoint,
/// the following index is used so it never walks back.
#[must_use]
pub fn resolve_path_index(position: Vec2, path: &Path, geometry: BoardGeometry) -> usize {
    let mut closest = 0;
    let mut best = f32::INFINITY;
    for (index, cell) in path.cells().iter().enumerate() {
        let distance = geometry.cell_center(*cell).distance_squared(position);
        if distance < best {
            best = distance;
            closest = index;
        }
    }

    if closest >= path.last_index() {
        return closest;
    }

    let (Some(here), Some(next)) = (path.get(closest), path.get(closest + 1)) else {
        return closest;
    };
    let here = geometry.cell_center(here);
    let segment = geometry.cell_center(next) - here;
    let length = segment.length();
    if length <= f32::EPSILON {
        return closest;
    }

    let progress = (position - here).dot(segment / length);
    if progress > length / 2.0 {
        closest + 1
    } else {
        closest
    }
}

fn advance_along(
    enemy: &EnemySnapshot,
    path: &Path,
    path_index: usize,
    elapsed: Duration,
    geometry: BoardGeometry,
) -> Option<(Vec2, usize)> {
    let waypoint = geometry.cell_center(path.get(path_index + 1)?);
    let travel = enemy.speed * elapsed.as_secs_f32();
    if !travel.is_finite() || travel <= 0.0 {
        return None;
    }

    let to_waypoint = waypoint - enemy.position;
    let remaining = to_waypoint.length();
    if remaining <= travel {
        return Some((waypoint, path_index + 1));
    }

    Some((enemy.position + to_waypoint / remaining * travel, path_index))
}
