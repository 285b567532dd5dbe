//! Enemy agent state and the registry that owns live agents.

use glam::Vec2;
use grid_defence_core::{
    mitigated_damage, BoardGeometry, EnemyId, EnemyKind, EnemySnapshot, EnemyState, Path,
    WaveScaling, BASE_ENEMY_HEALTH, BASE_ENEMY_SPEED, MAX_ARMOR,
};

/// Result of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum DamageOutcome {
    /// The enemy was already resolved or the amount was not a positive number.
    Ignored,
    /// Damage landed and the enemy survived.
    Wounded { applied: f32, health: f32 },
    /// Damage landed and killed the enemy.
    Killed { applied: f32, health: f32 },
}

/// Single agent walking the path.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    state: EnemyState,
    health: f32,
    max_health: f32,
    armor: f32,
    speed: f32,
    position: Vec2,
    path: Path,
    path_index: usize,
}

impl Enemy {
    fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        scaling: WaveScaling,
        path: Path,
        geometry: BoardGeometry,
    ) -> Self {
        let stats = kind.stats();
        let max_health = (BASE_ENEMY_HEALTH * stats.health_multiplier * scaling.health)
            .floor()
            .max(1.0);
        let armor = if stats.armor > 0.0 {
            (stats.armor * scaling.armor).clamp(0.0, MAX_ARMOR)
        } else {
            0.0
        };
        let position = path
            .get(0)
            .map_or(Vec2::ZERO, |cell| geometry.cell_center(cell));

        Self {
            id,
            kind,
            state: EnemyState::Alive,
            health: max_health,
            max_health,
            armor,
            speed: BASE_ENEMY_SPEED * stats.speed_multiplier * scaling.speed,
            position,
            path,
            path_index: 0,
        }
    }

    pub(crate) fn id(&self) -> EnemyId {
        self.id
    }

    pub(crate) fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.state == EnemyState::Alive
    }

    /// Applies armor-mitigated damage, reporting the kill exactly once.
    pub(crate) fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.is_alive() || !amount.is_finite() || amount <= 0.0 {
            return DamageOutcome::Ignored;
        }

        let applied = mitigated_damage(amount, self.armor);
        self.health -= applied;
        if self.health <= 0.0 {
            self.state = EnemyState::Dead;
            DamageOutcome::Killed {
                applied,
                health: self.health,
            }
        } else {
            DamageOutcome::Wounded {
                applied,
                health: self.health,
            }
        }
    }

    /// Moves the enemy and reports whether it reached the final waypoint.
    pub(crate) fn advance_to(&mut self, position: Vec2, path_index: usize) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.position = position;
        self.settle_at(path_index)
    }

    /// Rebinds the enemy to a new path and reports whether it now sits on the final waypoint.
    pub(crate) fn reroute(&mut self, path: Path, path_index: usize) -> bool {
        if !self.is_alive() || path.is_empty() {
            return false;
        }
        self.path = path;
        self.settle_at(path_index)
    }

    fn settle_at(&mut self, path_index: usize) -> bool {
        let last = self.path.last_index();
        self.path_index = path_index.min(last);
        if self.path_index == last {
            self.state = EnemyState::ReachedEnd;
            return true;
        }
        false
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            state: self.state,
            health: self.health,
            max_health: self.max_health,
            armor: self.armor,
            speed: self.speed,
            position: self.position,
            path: self.path.clone(),
            path_index: self.path_index,
        }
    }
}

/// Registry storing enemies in identifier order.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: Vec<Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    /// Creates a new enemy at the start of the provided path.
    pub(crate) fn spawn(
        &mut self,
        kind: EnemyKind,
        scaling: WaveScaling,
        path: Path,
        geometry: BoardGeometry,
    ) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        self.entries
            .push(Enemy::spawn(id, kind, scaling, path, geometry));
        id
    }

    pub(crate) fn get_mut(&mut self, enemy: EnemyId) -> Option<&mut Enemy> {
        self.entries
            .binary_search_by_key(&enemy, Enemy::id)
            .ok()
            .map(|index| &mut self.entries[index])
    }

    pub(crate) fn get(&self, enemy: EnemyId) -> Option<&Enemy> {
        self.entries
            .binary_search_by_key(&enemy, Enemy::id)
            .ok()
            .map(|index| &self.entries[index])
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.iter()
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.entries.iter().filter(|enemy| enemy.is_alive()).count()
    }

    /// Drops enemies that died or escaped.
    pub(crate) fn prune_resolved(&mut self) {
        self.entries.retain(Enemy::is_alive);
    }

    /// Removes every enemy and returns how many were still alive.
    pub(crate) fn clear(&mut self) -> usize {
        let alive = self.alive_count();
        self.entries.clear();
        alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_defence_core::CellCoord;

    fn straight_path() -> Path {
        Path::new((0..4).map(|row| CellCoord::new(0, row)).collect())
    }

    fn enemy_with_armor(armor: f32) -> Enemy {
        let mut enemy = Enemy::spawn(
            EnemyId::new(0),
            EnemyKind::Normal,
            WaveScaling::IDENTITY,
            straight_path(),
            BoardGeometry::new(4, 1.0),
        );
        enemy.armor = armor;
        enemy
    }

    #[test]
    fn half_armor_halves_damage() {
        let mut enemy = enemy_with_armor(0.5);

        let outcome = enemy.apply_damage(10.0);

        assert_eq!(
            outcome,
            DamageOutcome::Wounded {
                applied: 5.0,
                health: 95.0
            }
        );
        assert_eq!(enemy.health, 95.0);
    }

    #[test]
    fn heavy_armor_still_takes_one_point() {
        let mut enemy = enemy_with_armor(0.99);

        let _ = enemy.apply_damage(10.0);

        assert_eq!(enemy.health, 99.0);
    }

    #[test]
    fn kill_is_reported_once_despite_overkill() {
        let mut enemy = enemy_with_armor(0.0);

        assert!(matches!(
            enemy.apply_damage(250.0),
            DamageOutcome::Killed { .. }
        ));
        assert_eq!(enemy.apply_damage(250.0), DamageOutcome::Ignored);
        assert_eq!(enemy.state, EnemyState::Dead);
        assert!(enemy.health < 0.0);
    }

    #[test]
    fn non_positive_damage_is_ignored() {
        let mut enemy = enemy_with_armor(0.0);

        assert_eq!(enemy.apply_damage(0.0), DamageOutcome::Ignored);
        assert_eq!(enemy.apply_damage(-5.0), DamageOutcome::Ignored);
        assert_eq!(enemy.apply_damage(f32::NAN), DamageOutcome::Ignored);
        assert_eq!(enemy.health, 100.0);
    }

    #[test]
    fn spawn_stats_combine_kind_and_wave_scaling() {
        let boss = Enemy::spawn(
            EnemyId::new(3),
            EnemyKind::Boss,
            WaveScaling {
                health: 2.0,
                speed: 1.5,
                armor: 4.0,
            },
            straight_path(),
            BoardGeometry::new(4, 1.0),
        );

        assert_eq!(boss.max_health, 600.0);
        assert!((boss.speed - 4.5).abs() < 1e-5);
        assert_eq!(boss.armor, MAX_ARMOR);
        assert_eq!(boss.position, Vec2::new(-1.5, -1.5));

        let fast = Enemy::spawn(
            EnemyId::new(4),
            EnemyKind::Fast,
            WaveScaling {
                armor: 3.0,
                ..WaveScaling::IDENTITY
            },
            straight_path(),
            BoardGeometry::new(4, 1.0),
        );
        assert_eq!(fast.armor, 0.0);
        assert_eq!(fast.max_health, 70.0);
    }

    #[test]
    fn reaching_the_final_waypoint_resolves_the_enemy() {
        let mut enemy = enemy_with_armor(0.0);

        assert!(!enemy.advance_to(Vec2::new(-1.5, -0.5), 1));
        assert!(enemy.advance_to(Vec2::new(-1.5, 1.5), 3));
        assert_eq!(enemy.state, EnemyState::ReachedEnd);
        assert!(!enemy.advance_to(Vec2::ZERO, 3));
    }

    #[test]
    fn clear_reports_only_live_enemies() {
        let mut registry = EnemyRegistry::new();
        let first = registry.spawn(
            EnemyKind::Normal,
            WaveScaling::IDENTITY,
            straight_path(),
            BoardGeometry::new(4, 1.0),
        );
        let _ = registry.spawn(
            EnemyKind::Normal,
            WaveScaling::IDENTITY,
            straight_path(),
            BoardGeometry::new(4, 1.0),
        );
        let _ = registry
            .get_mut(first)
            .expect("enemy exists")
            .apply_damage(1_000.0);

        assert_eq!(registry.alive_count(), 1);
        assert_eq!(registry.clear(), 1);
        assert!(registry.get(first).is_none());
    }
}
