//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use grid_defence_core::{
    CellCoord, EnemyId, TowerCooldownSnapshot, TowerId, TowerSnapshot, TowerType, TowerTypeId,
};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Catalog type that was constructed.
    pub(crate) kind: TowerTypeId,
    /// Cell holding the tower.
    pub(crate) cell: CellCoord,
    /// World position of the cell centre.
    pub(crate) position: Vec2,
    /// Targeting radius in world units.
    pub(crate) range: f32,
    /// Raw damage per shot.
    pub(crate) damage: f32,
    /// Shots per second.
    pub(crate) fire_rate: f32,
    /// Simulation time of the most recent shot.
    pub(crate) last_fired_at: Option<Duration>,
    /// Enemy the tower is locked onto.
    pub(crate) target: Option<EnemyId>,
}

impl TowerState {
    /// Minimum time between two shots, `None` when the tower can never fire.
    pub(crate) fn fire_interval(&self) -> Option<Duration> {
        if !self.fire_rate.is_finite() || self.fire_rate <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(1.0 / f64::from(self.fire_rate)).ok()
    }

    /// Time left until the tower may fire, measured from `now`.
    pub(crate) fn ready_in(&self, now: Duration) -> Duration {
        let Some(interval) = self.fire_interval() else {
            return Duration::MAX;
        };
        match self.last_fired_at {
            None => Duration::ZERO,
            Some(fired_at) => fired_at.saturating_add(interval).saturating_sub(now),
        }
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            range: self.range,
            damage: self.damage,
            fire_rate: self.fire_rate,
            target: self.target,
        }
    }

    pub(crate) fn cooldown(&self, now: Duration) -> TowerCooldownSnapshot {
        TowerCooldownSnapshot {
            tower: self.id,
            ready_in: self.ready_in(now),
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower built from the catalog entry and returns its identifier.
    pub(crate) fn insert(
        &mut self,
        tower_type: &TowerType,
        cell: CellCoord,
        position: Vec2,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind: tower_type.id,
                cell,
                position,
                range: tower_type.range,
                damage: tower_type.damage,
                fire_rate: tower_type.fire_rate,
                last_fired_at: None,
                target: None,
            },
        );
        id
    }

    pub(crate) fn get_mut(&mut self, tower: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&tower)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    /// Releases every held target.
    pub(crate) fn clear_targets(&mut self) {
        for tower in self.entries.values_mut() {
            tower.target = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_defence_core::TowerCatalog;

    fn registry_with_sentinel() -> (TowerRegistry, TowerId) {
        let catalog = TowerCatalog::default();
        let sentinel = catalog.get(TowerTypeId::new(1)).expect("tier one exists");
        let mut registry = TowerRegistry::new();
        let id = registry.insert(sentinel, CellCoord::new(2, 3), Vec2::new(1.0, 2.0));
        (registry, id)
    }

    #[test]
    fn registry_allocates_sequential_identifiers() {
        let catalog = TowerCatalog::default();
        let sentinel = catalog.get(TowerTypeId::new(1)).expect("tier one exists");
        let (mut registry, first) = registry_with_sentinel();
        let second = registry.insert(sentinel, CellCoord::new(4, 4), Vec2::ZERO);

        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert_eq!(registry.iter().count(), 2);
    }

    #[test]
    fn fresh_towers_are_ready_immediately() {
        let (registry, id) = registry_with_sentinel();
        let tower = registry.entries.get(&id).expect("tower exists");

        assert_eq!(tower.ready_in(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn cooldown_counts_down_from_last_shot() {
        let (mut registry, id) = registry_with_sentinel();
        let tower = registry.get_mut(id).expect("tower exists");
        tower.last_fired_at = Some(Duration::from_millis(500));

        assert_eq!(
            tower.ready_in(Duration::from_millis(750)),
            Duration::from_millis(750)
        );
        assert_eq!(tower.ready_in(Duration::from_millis(1_500)), Duration::ZERO);
        assert_eq!(tower.ready_in(Duration::from_secs(9)), Duration::ZERO);
    }

    #[test]
    fn zero_fire_rate_never_becomes_ready() {
        let (mut registry, id) = registry_with_sentinel();
        let tower = registry.get_mut(id).expect("tower exists");
        tower.fire_rate = 0.0;

        assert_eq!(tower.fire_interval(), None);
        assert_eq!(tower.ready_in(Duration::from_secs(100)), Duration::MAX);
    }
}
