#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game controller tying the world, its systems, and the progress
//! collaborator together.
//!
//! A [`Session`] is the only entry point a shell needs: it translates player
//! input into world commands, pumps world events through the live-maze
//! mutator until no further commands are produced, and reports a won session
//! to its [`ProgressReporter`] exactly once.

use std::time::Duration;

use log::{debug, info, warn};
use pathway_core::{
    Command, CompletionReport, Direction, Efficiency, Event, GridView, Level, PathResult, Phase,
    Position, ProgressReporter, Status,
};
use pathway_system_generator::{Generator, GeneratorTuning};
use pathway_system_mutator::{self as mutator, Mutator, DEFAULT_INTERVAL};
use pathway_system_visibility::Visibility;
use pathway_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to start a session.
#[derive(Clone, Debug)]
pub struct Config {
    level: Level,
    seed: u64,
    mutation_interval: Duration,
    generator: GeneratorTuning,
}

impl Config {
    /// Creates a configuration for the provided level and random seed.
    #[must_use]
    pub fn new(level: Level, seed: u64) -> Self {
        Self {
            level,
            seed,
            mutation_interval: DEFAULT_INTERVAL,
            generator: GeneratorTuning::default(),
        }
    }

    /// Overrides the cadence of wall flips on live-maze levels.
    #[must_use]
    pub fn with_mutation_interval(mut self, interval: Duration) -> Self {
        self.mutation_interval = interval;
        self
    }

    /// Overrides the generator tuning.
    #[must_use]
    pub fn with_generator(mut self, tuning: GeneratorTuning) -> Self {
        self.generator = tuning;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Level::MIN, 0)
    }
}

/// One player's run through a sequence of mazes.
#[derive(Debug)]
pub struct Session<P> {
    world: World,
    generator: Generator,
    rng: ChaCha8Rng,
    mutation_interval: Duration,
    mutator: Option<Mutator>,
    visibility: Visibility,
    reporter: P,
    reported: bool,
}

impl<P> Session<P>
where
    P: ProgressReporter,
{
    /// Generates the first maze for the configured level and starts playing it.
    #[must_use]
    pub fn new(config: Config, reporter: P) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let generator = Generator::new(config.generator);
        let layout = generator.generate_for_level(config.level, &mut rng);
        info!(
            "starting level {} on a {}x{} maze, par {}",
            config.level.get(),
            layout.grid().width(),
            layout.grid().height(),
            layout.optimal_distance()
        );

        let mut session = Self {
            world: World::new(config.level, layout),
            generator,
            rng,
            mutation_interval: config.mutation_interval,
            mutator: None,
            visibility: Visibility::for_level(config.level),
            reporter,
            reported: false,
        };
        session.mutator = session.spawn_mutator();

        // Degenerate layouts can be won before the first move.
        if let Some(efficiency) = query::status(&session.world).efficiency {
            session.report(efficiency);
        }
        session
    }

    /// Attempts to step the player one cell. Returns whether the player moved.
    ///
    /// Moves into walls, off the grid, or after the goal was reached are
    /// ignored.
    pub fn move_player(&mut self, direction: Direction) -> bool {
        let events = self.execute(Command::Move { direction });
        events
            .iter()
            .any(|event| matches!(event, Event::PlayerMoved { .. }))
    }

    /// Attempts a move expressed as a unit offset.
    ///
    /// Offsets that are not exactly one orthogonal step are ignored.
    pub fn move_by(&mut self, dx: i32, dy: i32) -> bool {
        match Direction::from_offset(dx, dy) {
            Some(direction) => self.move_player(direction),
            None => false,
        }
    }

    /// Advances session time, letting live-maze levels flip walls.
    pub fn tick(&mut self, dt: Duration) {
        let _ = self.execute(Command::Tick { dt });
    }

    /// Discards the current maze and plays a freshly generated one of the
    /// same level.
    pub fn reset(&mut self) {
        let level = query::level(&self.world);
        self.start_level(level);
    }

    /// Switches to another level and generates a maze for it.
    pub fn change_level(&mut self, level: Level) {
        self.start_level(level);
    }

    /// Read-only view of the maze for rendering.
    #[must_use]
    pub fn grid_snapshot(&self) -> GridView<'_> {
        query::grid_view(&self.world)
    }

    /// Summary of the running session.
    #[must_use]
    pub fn status(&self) -> Status {
        query::status(&self.world)
    }

    /// Level currently played.
    #[must_use]
    pub fn level(&self) -> Level {
        query::level(&self.world)
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub fn player(&self) -> Position {
        query::player(&self.world)
    }

    /// Live distance from the player to the goal.
    #[must_use]
    pub fn remaining_distance(&self) -> PathResult {
        query::remaining_distance(&self.world)
    }

    /// Whether `cell` may be rendered given the level's fog policy.
    #[must_use]
    pub fn is_visible(&self, cell: Position) -> bool {
        self.visibility.is_visible(self.player(), cell)
    }

    /// Every renderable cell in row-major order.
    pub fn visible_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.visibility.visible_cells(self.grid_snapshot())
    }

    /// Whether the completion of the current maze has been handed to the
    /// reporter.
    #[must_use]
    pub const fn has_reported(&self) -> bool {
        self.reported
    }

    /// Progress collaborator receiving completions.
    #[must_use]
    pub const fn reporter(&self) -> &P {
        &self.reporter
    }

    /// Ends the session and hands the progress collaborator back.
    #[must_use]
    pub fn into_reporter(self) -> P {
        self.reporter
    }

    fn start_level(&mut self, level: Level) {
        let layout = self.generator.generate_for_level(level, &mut self.rng);
        info!(
            "loading level {} on a {}x{} maze, par {}",
            level.get(),
            layout.grid().width(),
            layout.grid().height(),
            layout.optimal_distance()
        );

        self.reported = false;
        self.visibility = Visibility::for_level(level);
        let _ = self.execute(Command::LoadMaze { level, layout });
        self.mutator = self.spawn_mutator();
    }

    fn spawn_mutator(&mut self) -> Option<Mutator> {
        if !query::level(&self.world).dynamic_enabled() {
            return None;
        }

        let config = mutator::Config::new(self.mutation_interval, self.rng.gen());
        Some(Mutator::new(config))
    }

    /// Applies `command` and every command the systems derive from its
    /// events, returning all events in order.
    fn execute(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut pending = vec![command];

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            self.observe(&events);
            if let Some(mutator) = self.mutator.as_mut() {
                mutator.handle(&events, query::grid_view(&self.world), &mut pending);
            }
            log.extend(events);
        }

        log
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::MazeWon {
                    move_count,
                    optimal_distance,
                    efficiency,
                } => {
                    info!(
                        "maze solved in {} moves (par {}), efficiency {}",
                        move_count,
                        optimal_distance,
                        efficiency.get()
                    );
                    self.report(*efficiency);
                }
                Event::GoalSealed => {
                    warn!("the goal is sealed off; reset to continue");
                }
                Event::GoalReopened => debug!("the goal is reachable again"),
                Event::CellToggled { cell, state } => {
                    debug!("cell ({}, {}) is now {:?}", cell.x(), cell.y(), state);
                }
                _ => {}
            }
        }
    }

    fn report(&mut self, efficiency: Efficiency) {
        if self.reported || query::phase(&self.world) != Phase::Won {
            return;
        }
        self.reported = true;

        let report = CompletionReport::maze(query::level(&self.world), efficiency);
        match self.reporter.report_completion(&report) {
            Ok(()) => info!(
                "recorded level {} completion with score {}/{}",
                report.level.get(),
                report.score,
                report.max_score
            ),
            Err(error) => warn!("failed to record maze completion: {error}"),
        }
    }
}
