use std::time::Duration;

use pathway_core::{
    CompletionReport, Direction, Efficiency, Grid, Level, PathResult, Phase, Position,
    ProgressReporter, ReportError, GAME_ID, MAX_SCORE,
};
use pathway_session::{Config, Session};
use pathway_system_generator::GeneratorTuning;
use pathway_world::navigation;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Default)]
struct Recorder {
    reports: Vec<CompletionReport>,
    attempts: usize,
    fail: bool,
}

impl ProgressReporter for Recorder {
    fn report_completion(&mut self, report: &CompletionReport) -> Result<(), ReportError> {
        self.attempts += 1;
        if self.fail {
            return Err(ReportError::Unavailable("offline".to_owned()));
        }
        self.reports.push(report.clone());
        Ok(())
    }
}

fn session(level: u8, seed: u64) -> Session<Recorder> {
    Session::new(Config::new(Level::new(level), seed), Recorder::default())
}

fn step_towards(from: Position, to: Position) -> Direction {
    let dx = i32::try_from(to.x()).expect("x fits") - i32::try_from(from.x()).expect("x fits");
    let dy = i32::try_from(to.y()).expect("y fits") - i32::try_from(from.y()).expect("y fits");
    Direction::from_offset(dx, dy).expect("route cells are adjacent")
}

fn solve<P: ProgressReporter>(session: &mut Session<P>) -> u32 {
    let grid = session.grid_snapshot().grid().clone();
    let route = navigation::shortest_route(&grid, session.player(), grid.goal())
        .expect("goal is reachable");
    for cell in &route {
        let direction = step_towards(session.player(), *cell);
        assert!(session.move_player(direction));
    }
    u32::try_from(route.len()).expect("route length fits")
}

#[test]
fn level_one_plays_a_six_by_six_maze() {
    let session = session(1, 42);
    let view = session.grid_snapshot();

    assert_eq!(view.dimensions(), (6, 6));
    assert_eq!(view.player(), Position::new(0, 0));
    assert_eq!(view.goal(), Position::new(5, 5));

    let status = session.status();
    assert_eq!(status.phase, Phase::InProgress);
    assert_eq!(status.move_count, 0);
    assert!(!status.fog_enabled);
    assert!(!status.dynamic_enabled);
    assert!(status.goal_reachable);
    assert!(status.optimal_distance >= 10);
}

#[test]
fn following_the_shortest_route_scores_perfect() {
    let mut session = session(1, 42);
    let par = session.status().optimal_distance;

    let moves = solve(&mut session);

    let status = session.status();
    assert_eq!(moves, par);
    assert_eq!(status.phase, Phase::Won);
    assert_eq!(status.move_count, par);
    assert_eq!(status.efficiency, Some(Efficiency::PERFECT));

    let recorder = session.into_reporter();
    assert_eq!(
        recorder.reports,
        vec![CompletionReport {
            game_id: GAME_ID.to_owned(),
            level: Level::new(1),
            score: 100,
            max_score: MAX_SCORE,
        }]
    );
}

#[test]
fn blocked_and_out_of_bounds_moves_change_nothing() {
    let mut session = session(1, 7);

    assert!(!session.move_player(Direction::North));
    assert!(!session.move_player(Direction::West));
    assert!(!session.move_by(1, 1));
    assert_eq!(session.player(), Position::new(0, 0));
    assert_eq!(session.status().move_count, 0);

    let grid = session.grid_snapshot().grid().clone();
    let route =
        navigation::shortest_route(&grid, grid.start(), grid.goal()).expect("goal is reachable");
    let mut bumped = false;
    for cell in route {
        let blocked = Direction::ALL.into_iter().find(|direction| {
            session
                .player()
                .step(*direction, grid.width(), grid.height())
                .is_some_and(|next| !grid.is_open(next))
        });
        if let Some(direction) = blocked {
            let before = (session.player(), session.status().move_count);
            assert!(!session.move_player(direction));
            assert_eq!((session.player(), session.status().move_count), before);
            bumped = true;
            break;
        }
        assert!(session.move_player(step_towards(session.player(), cell)));
    }

    assert!(bumped, "expected a wall next to the route");
}

#[test]
fn random_walks_never_enter_walls() {
    for seed in 0..8 {
        let mut session = session(5, seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for _ in 0..300 {
            let direction = *Direction::ALL.choose(&mut rng).expect("four directions");
            let before = session.status().move_count;
            let moved = session.move_player(direction);

            let view = session.grid_snapshot();
            assert!(view.grid().is_open(view.player()));
            assert_eq!(session.status().move_count, before + u32::from(moved));
        }
    }
}

#[test]
fn reset_produces_fresh_connected_mazes() {
    let mut session = session(3, 5);
    let _ = session.move_player(Direction::East);
    let _ = session.move_player(Direction::South);

    for _ in 0..20 {
        session.reset();

        let status = session.status();
        assert_eq!(status.move_count, 0);
        assert_eq!(status.phase, Phase::InProgress);
        assert_eq!(session.player(), Position::new(0, 0));
        assert_eq!(session.level(), Level::new(3));
        assert_eq!(
            session.remaining_distance(),
            PathResult::Steps(status.optimal_distance)
        );
    }
}

#[test]
fn completion_is_reported_exactly_once() {
    let mut session = session(2, 9);
    let _ = solve(&mut session);
    assert!(session.has_reported());

    for direction in Direction::ALL {
        let _ = session.move_player(direction);
    }
    session.tick(Duration::from_secs(30));

    assert_eq!(session.reporter().attempts, 1);
    assert_eq!(session.reporter().reports.len(), 1);
}

#[test]
fn each_reset_may_report_again() {
    let mut session = session(1, 3);
    let _ = solve(&mut session);
    session.reset();
    assert!(!session.has_reported());
    let _ = solve(&mut session);

    assert_eq!(session.reporter().reports.len(), 2);
}

#[test]
fn failing_reporter_leaves_session_won() {
    let reporter = Recorder {
        fail: true,
        ..Recorder::default()
    };
    let mut session = Session::new(Config::new(Level::new(1), 11), reporter);

    let _ = solve(&mut session);

    assert_eq!(session.status().phase, Phase::Won);
    assert_eq!(session.reporter().attempts, 1);
    assert!(session.reporter().reports.is_empty());
}

#[test]
fn fog_levels_hide_distant_cells() {
    let session = session(7, 1);
    assert!(session.status().fog_enabled);
    assert!(session.is_visible(Position::new(0, 0)));
    assert!(session.is_visible(Position::new(1, 1)));
    assert!(!session.is_visible(Position::new(2, 1)));
    assert_eq!(session.visible_cells().count(), 6);

    let clear = self::session(6, 1);
    assert!(clear.is_visible(Position::new(7, 7)));
    assert_eq!(clear.visible_cells().count(), 64);
}

#[test]
fn change_level_switches_size_and_flags() {
    let mut session = session(1, 4);
    session.change_level(Level::new(9));

    assert_eq!(session.level(), Level::new(9));
    assert_eq!(session.grid_snapshot().dimensions(), (10, 10));
    let status = session.status();
    assert!(status.fog_enabled);
    assert!(status.dynamic_enabled);
    assert_eq!(status.move_count, 0);

    session.change_level(Level::new(2));
    assert_eq!(session.grid_snapshot().dimensions(), (6, 6));
    assert!(!session.status().dynamic_enabled);
}

#[test]
fn live_maze_keeps_a_consistent_grid_while_ticking() {
    let mut session = session(9, 21);
    let original = session.grid_snapshot().grid().clone();
    let par = session.status().optimal_distance;

    for _ in 0..par {
        session.tick(Duration::from_secs(2));

        let view = session.grid_snapshot();
        let grid = view.grid();
        assert!(grid.is_open(grid.start()));
        assert!(grid.is_open(grid.goal()));
        assert!(grid.is_open(view.player()));
        assert_eq!(
            session.status().goal_reachable,
            session.remaining_distance().is_reachable()
        );
    }

    assert_eq!(session.status().optimal_distance, par);
    assert_ne!(session.grid_snapshot().grid(), &original);
}

#[test]
fn static_levels_never_mutate() {
    let mut session = session(8, 21);
    let original = session.grid_snapshot().grid().clone();

    session.tick(Duration::from_secs(60));

    assert_eq!(session.grid_snapshot().grid(), &original);
}

#[test]
fn replays_are_deterministic_for_a_seed() {
    let script = [
        Direction::East,
        Direction::South,
        Direction::South,
        Direction::East,
        Direction::North,
        Direction::East,
    ];

    let play = || {
        let mut session = session(10, 77);
        for direction in script {
            let _ = session.move_player(direction);
            session.tick(Duration::from_millis(1_500));
        }
        (session.grid_snapshot().grid().clone(), session.player(), session.status())
    };

    assert_eq!(play(), play());
}

fn changed_cells(before: &Grid, after: &Grid) -> usize {
    before
        .positions()
        .filter(|cell| before.cell(*cell) != after.cell(*cell))
        .count()
}

#[test]
fn every_live_maze_interval_flips_exactly_one_cell() {
    let mut session = session(10, 0xdead_beef);

    for _ in 0..300 {
        let before = session.grid_snapshot().grid().clone();
        session.tick(Duration::from_secs(2));
        assert_eq!(changed_cells(&before, session.grid_snapshot().grid()), 1);
    }
}

#[test]
fn mutation_interval_is_configurable() {
    let config = Config::new(Level::new(9), 8).with_mutation_interval(Duration::from_millis(500));
    let mut session = Session::new(config, Recorder::default());
    let before = session.grid_snapshot().grid().clone();

    session.tick(Duration::from_millis(500));

    assert_eq!(changed_cells(&before, session.grid_snapshot().grid()), 1);
}

#[test]
fn generator_tuning_reaches_the_maze() {
    let config = Config::new(Level::new(1), 8).with_generator(GeneratorTuning {
        loop_opening_ratio: 0.0,
    });
    let session = Session::new(config, Recorder::default());

    // Nine lattice cells, eight opened walls, and two connector cells to the goal.
    assert_eq!(session.grid_snapshot().grid().open_count(), 19);
}
