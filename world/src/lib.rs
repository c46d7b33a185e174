#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative play-session state for the Pathway maze.

pub mod navigation;

use pathway_core::{
    Command, Direction, Efficiency, Event, Grid, Level, MazeLayout, Phase, Position, ToggleError,
};

/// Represents the authoritative state of a single maze session.
///
/// The world owns the grid exclusively. It is created on level entry, mutated
/// only through [`apply`], and replaced wholesale when a new maze is loaded.
#[derive(Debug)]
pub struct World {
    level: Level,
    grid: Grid,
    player: Position,
    move_count: u32,
    phase: Phase,
    optimal_distance: u32,
    efficiency: Option<Efficiency>,
    goal_reachable: bool,
}

impl World {
    /// Creates a world for the provided level, ready to play `layout`.
    #[must_use]
    pub fn new(level: Level, layout: MazeLayout) -> Self {
        let (grid, optimal_distance) = layout.into_parts();
        let mut world = Self {
            level,
            player: grid.start(),
            grid,
            move_count: 0,
            phase: Phase::InProgress,
            optimal_distance,
            efficiency: None,
            goal_reachable: true,
        };
        let mut discarded = Vec::new();
        world.settle_after_load(&mut discarded);
        world
    }

    fn load(&mut self, level: Level, layout: MazeLayout, out_events: &mut Vec<Event>) {
        let (grid, optimal_distance) = layout.into_parts();
        self.level = level;
        self.player = grid.start();
        self.grid = grid;
        self.move_count = 0;
        self.phase = Phase::InProgress;
        self.optimal_distance = optimal_distance;
        self.efficiency = None;

        out_events.push(Event::MazeLoaded {
            width: self.grid.width(),
            height: self.grid.height(),
            optimal_distance,
        });
        self.settle_after_load(out_events);
    }

    fn settle_after_load(&mut self, out_events: &mut Vec<Event>) {
        self.goal_reachable =
            navigation::shortest_path(&self.grid, self.player, self.grid.goal()).is_reachable();

        if self.player == self.grid.goal() {
            self.win(out_events);
        }
    }

    fn step_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if self.phase == Phase::Won {
            return;
        }

        let (width, height) = self.grid.dimensions();
        let Some(next) = self.player.step(direction, width, height) else {
            return;
        };

        if !self.grid.is_open(next) {
            return;
        }

        let from = self.player;
        self.player = next;
        self.move_count = self.move_count.saturating_add(1);
        out_events.push(Event::PlayerMoved {
            from,
            to: next,
            move_count: self.move_count,
        });

        if next == self.grid.goal() {
            self.win(out_events);
        }
    }

    fn win(&mut self, out_events: &mut Vec<Event>) {
        let efficiency = Efficiency::from_moves(self.optimal_distance, self.move_count);
        self.phase = Phase::Won;
        self.efficiency = Some(efficiency);
        out_events.push(Event::MazeWon {
            move_count: self.move_count,
            optimal_distance: self.optimal_distance,
            efficiency,
        });
    }

    fn toggle_cell(&mut self, cell: Position, out_events: &mut Vec<Event>) {
        if cell == self.player && self.grid.contains(cell) {
            out_events.push(Event::ToggleRejected {
                cell,
                reason: ToggleError::Occupied,
            });
            return;
        }

        match self.grid.toggle(cell) {
            Ok(state) => {
                out_events.push(Event::CellToggled { cell, state });
                self.refresh_reachability(out_events);
            }
            Err(reason) => out_events.push(Event::ToggleRejected { cell, reason }),
        }
    }

    fn refresh_reachability(&mut self, out_events: &mut Vec<Event>) {
        if self.phase == Phase::Won {
            return;
        }

        let reachable =
            navigation::shortest_path(&self.grid, self.player, self.grid.goal()).is_reachable();
        if reachable == self.goal_reachable {
            return;
        }

        self.goal_reachable = reachable;
        if reachable {
            out_events.push(Event::GoalReopened);
        } else {
            out_events.push(Event::GoalSealed);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Moves into blocked or out-of-bounds cells, and moves after the goal was
/// reached, are ignored without emitting any event.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadMaze { level, layout } => world.load(level, layout, out_events),
        Command::Move { direction } => world.step_player(direction, out_events),
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        Command::ToggleCell { cell } => world.toggle_cell(cell, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use pathway_core::{Grid, GridView, Level, PathResult, Phase, Position, Status};

    use super::{navigation, World};

    /// Level the world was created for.
    #[must_use]
    pub fn level(world: &World) -> Level {
        world.level
    }

    /// Provides read-only access to the live grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub fn player(world: &World) -> Position {
        world.player
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Captures a read-only view of the maze for rendering.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        GridView::new(&world.grid, world.player, world.level.fog_enabled())
    }

    /// Summarises the session for the surrounding shell.
    #[must_use]
    pub fn status(world: &World) -> Status {
        Status {
            phase: world.phase,
            move_count: world.move_count,
            optimal_distance: world.optimal_distance,
            fog_enabled: world.level.fog_enabled(),
            dynamic_enabled: world.level.dynamic_enabled(),
            goal_reachable: world.goal_reachable,
            efficiency: world.efficiency,
        }
    }

    /// Live shortest distance from the player to the goal.
    ///
    /// Unlike the par stored in [`status`], this reflects every mutation
    /// applied since generation.
    #[must_use]
    pub fn remaining_distance(world: &World) -> PathResult {
        navigation::shortest_path(&world.grid, world.player, world.grid.goal())
    }
}
