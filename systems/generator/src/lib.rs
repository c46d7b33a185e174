#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Maze generation system producing connected grids and their par distance.
//!
//! Passages are carved by a randomized depth-first backtracker that walks a
//! lattice of every other cell, opening the wall cell between each pair of
//! lattice cells it links. Every lattice cell is therefore connected to the
//! start. When the goal falls off the lattice a short connector joins it to
//! the nearest lattice cell, and a final pass forces a share of random cells
//! open to create loops. Opening cells never removes a route, so the goal is
//! always reachable.

use log::debug;
use pathway_core::{CellState, Direction, Grid, Level, MazeLayout, Position};
use pathway_world::navigation;
use rand::{seq::SliceRandom, Rng};

/// Tuning knobs controlling the generated layouts.
#[derive(Clone, Debug)]
pub struct GeneratorTuning {
    /// Share of all cells forced open after carving; larger values add more loops.
    pub loop_opening_ratio: f32,
}

impl Default for GeneratorTuning {
    fn default() -> Self {
        Self {
            loop_opening_ratio: 0.10,
        }
    }
}

/// Randomized maze generator.
#[derive(Clone, Debug, Default)]
pub struct Generator {
    tuning: GeneratorTuning,
}

impl Generator {
    /// Creates a generator with the provided tuning.
    #[must_use]
    pub fn new(tuning: GeneratorTuning) -> Self {
        Self { tuning }
    }

    /// Generates a maze of the requested dimensions.
    ///
    /// Zero dimensions are raised to one. The start sits at `(0, 0)` and the
    /// goal at `(width - 1, height - 1)`.
    pub fn generate<R>(&self, width: u32, height: u32, rng: &mut R) -> MazeLayout
    where
        R: Rng + ?Sized,
    {
        let mut grid = Grid::filled(width, height, CellState::Blocked);
        carve_passages(&mut grid, rng);
        connect_goal(&mut grid);
        let loop_count = self.loop_opening_count(&grid);
        let opened = open_loops(&mut grid, loop_count, rng);

        let par = navigation::shortest_path(&grid, grid.start(), grid.goal()).steps();
        debug_assert!(par.is_some(), "carved mazes always connect start and goal");
        let optimal_distance = par.unwrap_or_default();

        debug!(
            "generated {}x{} maze: {} open cells, {} opened by loop pass, par {}",
            grid.width(),
            grid.height(),
            grid.open_count(),
            opened,
            optimal_distance
        );

        MazeLayout::new(grid, optimal_distance)
    }

    /// Generates a square maze sized for the provided level.
    pub fn generate_for_level<R>(&self, level: Level, rng: &mut R) -> MazeLayout
    where
        R: Rng + ?Sized,
    {
        let size = level.grid_size();
        self.generate(size, size, rng)
    }

    fn loop_opening_count(&self, grid: &Grid) -> usize {
        let ratio = f64::from(self.tuning.loop_opening_ratio.max(0.0));
        let cells = grid.cells().len() as f64;
        (cells * ratio).floor() as usize
    }
}

/// Pending work for one cell of the depth-first walk.
struct Frame {
    cell: Position,
    directions: [Direction; 4],
    cursor: usize,
}

impl Frame {
    fn new<R>(cell: Position, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut directions = Direction::ALL;
        directions.shuffle(rng);
        Self {
            cell,
            directions,
            cursor: 0,
        }
    }

    fn next_direction(&mut self) -> Option<Direction> {
        let direction = self.directions.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(direction)
    }
}

fn carve_passages<R>(grid: &mut Grid, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let (width, height) = grid.dimensions();
    let Ok(row_length) = usize::try_from(width) else {
        return;
    };
    let mut visited = vec![false; grid.cells().len()];
    let start = grid.start();

    if let Some(offset) = index(row_length, start) {
        visited[offset] = true;
    }
    let _ = grid.open(start);

    let mut stack = vec![Frame::new(start, rng)];
    loop {
        let Some(frame) = stack.last_mut() else {
            break;
        };
        let Some(direction) = frame.next_direction() else {
            let _ = stack.pop();
            continue;
        };
        let cell = frame.cell;

        let Some(wall) = cell.step(direction, width, height) else {
            continue;
        };
        let Some(next) = wall.step(direction, width, height) else {
            continue;
        };
        let Some(offset) = index(row_length, next) else {
            continue;
        };
        if visited[offset] {
            continue;
        }

        visited[offset] = true;
        let _ = grid.open(wall);
        let _ = grid.open(next);
        stack.push(Frame::new(next, rng));
    }
}

/// Opens a corridor from the nearest lattice cell to the goal.
///
/// The backtracker only reaches cells with even coordinates, so a goal in an
/// odd column or row needs an explicit link.
fn connect_goal(grid: &mut Grid) {
    let goal = grid.goal();
    let anchor = Position::new(goal.x() - goal.x() % 2, goal.y() - goal.y() % 2);

    for x in anchor.x()..=goal.x() {
        let _ = grid.open(Position::new(x, anchor.y()));
    }
    for y in anchor.y()..=goal.y() {
        let _ = grid.open(Position::new(goal.x(), y));
    }
}

fn open_loops<R>(grid: &mut Grid, count: usize, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    let (width, height) = grid.dimensions();
    let mut opened = 0;
    for _ in 0..count {
        let cell = Position::new(rng.gen_range(0..width), rng.gen_range(0..height));
        if grid.open(cell) {
            opened += 1;
        }
    }
    opened
}

fn index(width: usize, cell: Position) -> Option<usize> {
    let column = usize::try_from(cell.x()).ok()?;
    let row = usize::try_from(cell.y()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
