use std::time::Duration;

use pathway_core::{
    CellState, Command, Direction, Efficiency, Event, Grid, GridView, Level, MazeLayout, Position,
};
use pathway_system_mutator::{Config, Mutator, DEFAULT_INTERVAL, MAX_FLIPS_PER_TICK};
use pathway_world::{self as world, navigation, query, World};

fn open_world(size: u32) -> World {
    let grid = Grid::filled(size, size, CellState::Open);
    let optimal = navigation::shortest_path(&grid, grid.start(), grid.goal())
        .steps()
        .expect("open grid is connected");
    World::new(Level::new(9), MazeLayout::new(grid, optimal))
}

fn view(grid: &Grid) -> GridView<'_> {
    GridView::new(grid, grid.start(), false)
}

fn tick(dt: Duration) -> Vec<Event> {
    vec![Event::TimeAdvanced { dt }]
}

#[test]
fn emits_one_toggle_per_interval() {
    let grid = Grid::filled(6, 6, CellState::Open);
    let mut mutator = Mutator::new(Config::new(DEFAULT_INTERVAL, 0x1234_5678));
    let mut commands = Vec::new();

    mutator.handle(&tick(Duration::from_millis(1_500)), view(&grid), &mut commands);
    assert!(commands.is_empty(), "no flip before a full interval");

    mutator.handle(&tick(Duration::from_millis(500)), view(&grid), &mut commands);
    assert_eq!(commands.len(), 1);

    commands.clear();
    mutator.handle(&tick(Duration::from_secs(6)), view(&grid), &mut commands);
    assert_eq!(commands.len(), 3, "expected one flip per elapsed interval");

    for command in &commands {
        match command {
            Command::ToggleCell { cell } => {
                assert!(cell.x() < 6 && cell.y() < 6, "cell {cell:?} out of bounds");
                assert_ne!(*cell, grid.start());
                assert_ne!(*cell, grid.goal());
            }
            other => panic!("unexpected command emitted: {other:?}"),
        }
    }
}

#[test]
fn same_seed_flips_same_cells() {
    let grid = Grid::filled(8, 8, CellState::Open);
    let run = || {
        let mut mutator = Mutator::new(Config::new(DEFAULT_INTERVAL, 42));
        let mut commands = Vec::new();
        for _ in 0..10 {
            mutator.handle(&tick(DEFAULT_INTERVAL), view(&grid), &mut commands);
        }
        commands
    };

    assert_eq!(run(), run());
}

#[test]
fn disarms_after_win() {
    let grid = Grid::filled(6, 6, CellState::Open);
    let mut mutator = Mutator::new(Config::new(DEFAULT_INTERVAL, 7));
    let mut commands = Vec::new();

    mutator.handle(
        &[Event::MazeWon {
            move_count: 10,
            optimal_distance: 10,
            efficiency: Efficiency::PERFECT,
        }],
        view(&grid),
        &mut commands,
    );
    mutator.handle(&tick(Duration::from_secs(10)), view(&grid), &mut commands);

    assert!(!mutator.is_armed());
    assert!(commands.is_empty(), "won sessions must not mutate");
}

#[test]
fn disarms_when_maze_is_replaced() {
    let grid = Grid::filled(6, 6, CellState::Open);
    let mut mutator = Mutator::new(Config::new(DEFAULT_INTERVAL, 7));
    let mut commands = Vec::new();

    mutator.handle(
        &[
            Event::MazeLoaded {
                width: 6,
                height: 6,
                optimal_distance: 10,
            },
            Event::TimeAdvanced {
                dt: Duration::from_secs(4),
            },
        ],
        view(&grid),
        &mut commands,
    );

    assert!(commands.is_empty());
}

#[test]
fn world_survives_sustained_mutation() {
    let mut world = open_world(10);
    let mut mutator = Mutator::new(Config::new(DEFAULT_INTERVAL, 0xdead_beef));

    for _ in 0..200 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: DEFAULT_INTERVAL,
            },
            &mut events,
        );

        let mut commands = Vec::new();
        mutator.handle(&events, query::grid_view(&world), &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }

        let grid = query::grid(&world);
        assert!(grid.is_open(grid.start()));
        assert!(grid.is_open(grid.goal()));
        assert!(grid.is_open(query::player(&world)));

        let reachable = query::remaining_distance(&world).is_reachable();
        assert_eq!(reachable, query::status(&world).goal_reachable);
    }

    assert_eq!(query::player(&world), Position::new(0, 0));
}

#[test]
fn each_interval_toggles_exactly_one_cell() {
    let mut world = open_world(10);
    let mut mutator = Mutator::new(Config::new(DEFAULT_INTERVAL, 0xdead_beef));
    let mut events = Vec::new();
    for direction in [Direction::East, Direction::East, Direction::South] {
        world::apply(&mut world, Command::Move { direction }, &mut events);
    }

    for _ in 0..300 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: DEFAULT_INTERVAL,
            },
            &mut events,
        );

        let mut commands = Vec::new();
        mutator.handle(&events, query::grid_view(&world), &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }

        let toggled = events
            .iter()
            .filter(|event| matches!(event, Event::CellToggled { .. }))
            .count();
        let rejected = events
            .iter()
            .filter(|event| matches!(event, Event::ToggleRejected { .. }))
            .count();
        assert_eq!((toggled, rejected), (1, 0));
    }

    assert_eq!(query::player(&world), Position::new(2, 1));
}

#[test]
fn one_long_tick_flips_a_bounded_number_of_cells() {
    let grid = Grid::filled(8, 8, CellState::Open);
    let mut mutator = Mutator::new(Config::new(DEFAULT_INTERVAL, 3));
    let mut commands = Vec::new();

    mutator.handle(&tick(Duration::from_secs(3_600)), view(&grid), &mut commands);
    assert_eq!(commands.len(), MAX_FLIPS_PER_TICK);

    commands.clear();
    mutator.handle(&tick(Duration::MAX), view(&grid), &mut commands);
    assert_eq!(commands.len(), MAX_FLIPS_PER_TICK);
}
