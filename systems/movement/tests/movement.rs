use std::time::Duration;

use grid_defence_core::{
    BoardConfig, CellCoord, Command, EnemyId, EnemyKind, Event, TowerCatalog, TowerTypeId,
    WavePlan, WaveScaling,
};
use grid_defence_system_movement::{resolve_path_index, Movement};
use grid_defence_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(16);

fn world_with_one_enemy() -> World {
    let mut world =
        World::new(&BoardConfig::default(), TowerCatalog::default()).expect("valid board");
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartWave {
            plan: WavePlan {
                wave: 1,
                enemy_count: 1,
                kinds: vec![EnemyKind::Normal],
                scaling: WaveScaling::IDENTITY,
            },
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Normal,
        },
        &mut events,
    );
    world
}

fn frame(world: &mut World, movement: &mut Movement, extra: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in extra {
        world::apply(world, command, &mut events);
    }
    world::apply(world, Command::Tick { dt: FRAME }, &mut events);

    let mut commands = Vec::new();
    movement.handle(
        &events,
        &query::enemy_view(world),
        query::geometry(world),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn enemy_walks_the_open_board_to_the_end() {
    let mut world = world_with_one_enemy();
    let mut movement = Movement::new();

    let mut arrivals = 0;
    let mut frames = 0;
    while frames < 1_000 {
        let events = frame(&mut world, &mut movement, Vec::new());
        arrivals += events
            .iter()
            .filter(|event| matches!(event, Event::EnemyReachedEnd { .. }))
            .count();
        frames += 1;
        if arrivals > 0 {
            break;
        }
    }

    assert_eq!(arrivals, 1, "enemy never arrived");
    // 14 diagonal steps of 2√2 units at five units per second.
    let travel_seconds = 14.0 * 2.0 * std::f32::consts::SQRT_2 / 5.0;
    let expected_frames = (travel_seconds / FRAME.as_secs_f32()) as u32;
    assert!(
        frames >= expected_frames && frames <= expected_frames + 20,
        "unexpected travel time: {frames} frames"
    );
}

#[test]
fn placing_a_tower_reroutes_without_walking_back() {
    let mut world = world_with_one_enemy();
    let mut movement = Movement::new();

    for _ in 0..80 {
        let _ = frame(&mut world, &mut movement, Vec::new());
    }
    let before = query::enemy_view(&world)
        .get(EnemyId::new(0))
        .cloned()
        .expect("enemy still walking");
    assert!(before.path_index >= 2, "enemy should have progressed");

    let blocked = before
        .path
        .get(before.path_index + 2)
        .expect("path continues");
    let events = frame(
        &mut world,
        &mut movement,
        vec![Command::PlaceTower {
            kind: TowerTypeId::new(1),
            cell: blocked,
        }],
    );
    let new_path = events
        .iter()
        .find_map(|event| match event {
            Event::PathChanged { path } => path.clone(),
            _ => None,
        })
        .expect("placement announced a path");

    let after = query::enemy_view(&world)
        .get(EnemyId::new(0))
        .cloned()
        .expect("enemy still walking");
    assert!(after.path.is_same_computation(&new_path));
    assert!(!after.path.cells().contains(&blocked));

    let resolved = resolve_path_index(before.position, &new_path, query::geometry(&world));
    assert!(after.path_index >= resolved);

    let end = query::geometry(&world).cell_center(CellCoord::new(14, 14));
    assert!(
        after.position.distance(end) < before.position.distance(end),
        "enemy moved away from the end"
    );
}
