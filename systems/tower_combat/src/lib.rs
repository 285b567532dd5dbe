#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that gates tower fire on cooldowns and held targets.

use grid_defence_core::{Command, TowerCooldownSnapshot, TowerCooldownView, TowerId, TowerView};

/// Tower combat system that queues fire commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireTower` for every tower that holds a target and
    /// whose cooldown has elapsed.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        tower_cooldowns: TowerCooldownView,
        out: &mut Vec<Command>,
    ) {
        let cooldowns = tower_cooldowns.into_vec();
        if cooldowns.is_empty() {
            return;
        }

        self.scratch.clear();

        for tower in towers.iter() {
            let Some(target) = tower.target else {
                continue;
            };
            let ready = find_cooldown(&cooldowns, tower.id)
                .is_some_and(|snapshot| snapshot.ready_in.is_zero());
            if ready {
                self.scratch.push(Command::FireTower {
                    tower: tower.id,
                    target,
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

fn find_cooldown(
    cooldowns: &[TowerCooldownSnapshot],
    tower: TowerId,
) -> Option<&TowerCooldownSnapshot> {
    cooldowns
        .binary_search_by_key(&tower, |snapshot| snapshot.tower)
        .ok()
        .map(|index| &cooldowns[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use grid_defence_core::{CellCoord, EnemyId, TowerSnapshot, TowerTypeId};
    use std::time::Duration;

    fn tower(id: u32, target: Option<u32>) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerTypeId::new(1),
            cell: CellCoord::new(id, 0),
            position: Vec2::ZERO,
            range: 4.0,
            damage: 20.0,
            fire_rate: 1.0,
            target: target.map(EnemyId::new),
        }
    }

    fn cooldown(tower: u32, ready_in: Duration) -> TowerCooldownSnapshot {
        TowerCooldownSnapshot {
            tower: TowerId::new(tower),
            ready_in,
        }
    }

    #[test]
    fn ready_towers_with_targets_fire() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![tower(5, Some(1)), tower(2, Some(4))]);
        let cooldowns = TowerCooldownView::from_snapshots(vec![
            cooldown(2, Duration::ZERO),
            cooldown(5, Duration::ZERO),
        ]);
        let mut out = Vec::new();

        system.handle(&towers, cooldowns, &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireTower {
                    tower: TowerId::new(2),
                    target: EnemyId::new(4),
                },
                Command::FireTower {
                    tower: TowerId::new(5),
                    target: EnemyId::new(1),
                },
            ],
        );
    }

    #[test]
    fn cooling_down_idle_or_unknown_towers_hold_fire() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![
            tower(3, Some(9)),
            tower(6, None),
            tower(8, Some(2)),
            tower(42, Some(3)),
        ]);
        let cooldowns = TowerCooldownView::from_snapshots(vec![
            cooldown(3, Duration::from_millis(250)),
            cooldown(6, Duration::ZERO),
            cooldown(8, Duration::ZERO),
        ]);
        let mut out = Vec::new();

        system.handle(&towers, cooldowns, &mut out);

        assert_eq!(
            out,
            vec![Command::FireTower {
                tower: TowerId::new(8),
                target: EnemyId::new(2),
            }],
        );
    }
}
