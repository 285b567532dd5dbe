#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.
//!
//! Targets are sticky: a tower keeps its enemy until the enemy dies, reaches
//! the end or walks out of range. Only then does it pick the live enemy in
//! range that progressed furthest along its path.

use grid_defence_core::{Command, EnemyId, EnemySnapshot, EnemyView, TowerSnapshot, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `AssignTowerTarget` commands for every tower whose target changes.
    ///
    /// A held target that drifted out of range is cleared without choosing a
    /// replacement, so the tower picks a new one on the following tick.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<Command>) {
        self.prepare_enemy_workspace(enemies);

        for tower in towers.iter() {
            let next = match tower.target {
                Some(current) => match enemies.get(current).filter(|enemy| enemy.is_alive()) {
                    Some(enemy) if !in_range(tower, enemy.position.distance(tower.position)) => {
                        None
                    }
                    Some(_) => Some(current),
                    None => self.select(tower),
                },
                None => self.select(tower),
            };

            if next != tower.target {
                out.push(Command::AssignTowerTarget {
                    tower: tower.id,
                    target: next,
                });
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.extend(
            enemies
                .iter()
                .filter(|enemy| enemy.is_alive())
                .map(EnemyCandidate::from_snapshot),
        );
    }

    fn select(&self, tower: &TowerSnapshot) -> Option<EnemyId> {
        let mut best: Option<&EnemyCandidate> = None;
        for candidate in &self.enemy_workspace {
            if !in_range(tower, candidate.position.distance(tower.position)) {
                continue;
            }
            match best {
                Some(existing) if !candidate.precedes(existing) => {}
                _ => best = Some(candidate),
            }
        }
        best.map(|candidate| candidate.id)
    }
}

fn in_range(tower: &TowerSnapshot, distance: f32) -> bool {
    distance <= tower.range
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    path_index: usize,
    position: glam::Vec2,
}

impl EnemyCandidate {
    fn from_snapshot(snapshot: &EnemySnapshot) -> Self {
        Self {
            id: snapshot.id,
            path_index: snapshot.path_index,
            position: snapshot.position,
        }
    }

    /// Further progress wins; the workspace is in id order so ties keep the first.
    fn precedes(&self, other: &Self) -> bool {
        self.path_index > other.path_index
    }
}
