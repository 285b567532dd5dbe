use glam::Vec2;
use grid_defence_core::{
    BoardConfig, CellCoord, Command, EnemyId, EnemyKind, TowerCatalog, TowerId, TowerTypeId,
    WavePlan, WaveScaling,
};
use grid_defence_system_tower_targeting::TowerTargeting;
use grid_defence_world::{self as world, query, World};

fn apply_all(world: &mut World, commands: Vec<Command>) {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
}

fn retarget(world: &mut World, targeting: &mut TowerTargeting) -> Vec<Command> {
    let mut commands = Vec::new();
    targeting.handle(
        &query::tower_view(world),
        &query::enemy_view(world),
        &mut commands,
    );
    apply_all(world, commands.clone());
    commands
}

fn current_target(world: &World) -> Option<EnemyId> {
    query::tower_view(world)
        .iter()
        .next()
        .and_then(|tower| tower.target)
}

/// Board with a sentinel beside the start and two enemies waiting on it.
fn guarded_start() -> World {
    let mut world =
        World::new(&BoardConfig::default(), TowerCatalog::default()).expect("valid board");
    apply_all(
        &mut world,
        vec![
            Command::PlaceTower {
                kind: TowerTypeId::new(1),
                cell: CellCoord::new(1, 0),
            },
            Command::StartWave {
                plan: WavePlan {
                    wave: 1,
                    enemy_count: 2,
                    kinds: vec![EnemyKind::Normal],
                    scaling: WaveScaling::IDENTITY,
                },
            },
            Command::SpawnEnemy {
                kind: EnemyKind::Normal,
            },
            Command::SpawnEnemy {
                kind: EnemyKind::Normal,
            },
        ],
    );
    world
}

#[test]
fn tower_locks_on_and_releases_when_the_enemy_walks_away() {
    let mut world = guarded_start();
    let mut targeting = TowerTargeting::new();

    let _ = retarget(&mut world, &mut targeting);
    assert_eq!(current_target(&world), Some(EnemyId::new(0)));

    apply_all(
        &mut world,
        vec![Command::AdvanceEnemy {
            enemy: EnemyId::new(0),
            position: Vec2::ZERO,
            path_index: 0,
        }],
    );
    let released = retarget(&mut world, &mut targeting);
    assert_eq!(
        released,
        vec![Command::AssignTowerTarget {
            tower: TowerId::new(0),
            target: None,
        }]
    );

    let _ = retarget(&mut world, &mut targeting);
    assert_eq!(
        current_target(&world),
        Some(EnemyId::new(1)),
        "remaining enemy near the start is picked on the next pass"
    );
}

#[test]
fn killed_target_hands_over_to_the_next_enemy() {
    let mut world = guarded_start();
    let mut targeting = TowerTargeting::new();
    let _ = retarget(&mut world, &mut targeting);

    apply_all(
        &mut world,
        vec![Command::DamageEnemy {
            enemy: EnemyId::new(0),
            amount: 1_000.0,
        }],
    );
    let _ = retarget(&mut world, &mut targeting);

    assert_eq!(current_target(&world), Some(EnemyId::new(1)));
}
