#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pathway maze engine.
//!
//! This crate defines the message surface that connects the session
//! controller, the authoritative world, and pure systems. The controller
//! submits [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values for systems to react to deterministically. Systems consume event
//! streams, query immutable views, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier under which maze completions are reported.
pub const GAME_ID: &str = "maze";

/// Human readable name of the maze game.
pub const GAME_NAME: &str = "Pathway / Maze";

/// Highest score a maze completion can earn.
pub const MAX_SCORE: u32 = 100;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the current maze with a freshly generated layout.
    LoadMaze {
        /// Level the new maze is played on.
        level: Level,
        /// Generated grid together with its par distance.
        layout: MazeLayout,
    },
    /// Requests that the player advance a single cell in the given direction.
    Move {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of session time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the state of a single cell is flipped.
    ToggleCell {
        /// Cell whose state should flip between open and blocked.
        cell: Position,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a new maze replaced the previous one.
    MazeLoaded {
        /// Number of columns in the new grid.
        width: u32,
        /// Number of rows in the new grid.
        height: u32,
        /// Shortest start-to-goal distance measured at generation time.
        optimal_distance: u32,
    },
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of session time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: Position,
        /// Cell the player occupies after the move.
        to: Position,
        /// Total number of accepted moves, including this one.
        move_count: u32,
    },
    /// Announces that the player reached the goal.
    MazeWon {
        /// Number of moves the player needed.
        move_count: u32,
        /// Par distance the moves are compared against.
        optimal_distance: u32,
        /// Efficiency score earned by the run.
        efficiency: Efficiency,
    },
    /// Confirms that a cell changed state.
    CellToggled {
        /// Cell that flipped.
        cell: Position,
        /// State the cell holds after the flip.
        state: CellState,
    },
    /// Reports that a toggle request was refused.
    ToggleRejected {
        /// Cell targeted by the request.
        cell: Position,
        /// Specific reason the toggle failed.
        reason: ToggleError,
    },
    /// Reports that no open route connects the player to the goal anymore.
    GoalSealed,
    /// Reports that a route to the goal exists again after being sealed.
    GoalReopened,
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Column and row offsets applied by a step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Resolves a raw `(dx, dy)` offset into a direction.
    ///
    /// Only unit steps along a single axis map to a direction; diagonal,
    /// zero, and longer offsets yield `None`.
    #[must_use]
    pub const fn from_offset(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::North),
            (1, 0) => Some(Self::East),
            (0, 1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Neighbouring position one step away, if it lies within `width × height`.
    #[must_use]
    pub fn step(self, direction: Direction, width: u32, height: u32) -> Option<Position> {
        let (dx, dy) = direction.offset();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        if x < width && y < height {
            Some(Position::new(x, y))
        } else {
            None
        }
    }
}

/// State of a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// The player may walk through the cell.
    Open,
    /// The cell is a wall.
    Blocked,
}

impl CellState {
    /// Reports whether the cell can be traversed.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// State obtained by flipping the cell.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Open => Self::Blocked,
            Self::Blocked => Self::Open,
        }
    }
}

/// Reasons a toggle request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToggleError {
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell is the start or the goal, which must stay open.
    Protected,
    /// The player currently stands on the requested cell.
    Occupied,
}

/// Errors raised while building a grid from a textual layout.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The layout contained no cells.
    #[error("grid layout is empty")]
    Empty,
    /// A row had a different width than the first row.
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The start or goal cell was marked as blocked.
    #[error("start and goal cells must be open")]
    BlockedEndpoint,
}

/// Rectangular matrix of open and blocked cells with a start and a goal.
///
/// The start sits in the upper-left corner and the goal in the lower-right
/// corner. Both always hold [`CellState::Open`]; [`Grid::toggle`] refuses to
/// flip them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<CellState>,
    start: Position,
    goal: Position,
}

impl Grid {
    /// Creates a grid whose cells all hold `state`, apart from the open
    /// start and goal. Zero dimensions are raised to one.
    #[must_use]
    pub fn filled(width: u32, height: u32, state: CellState) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        let mut grid = Self {
            width,
            height,
            cells: vec![state; capacity],
            start: Position::new(0, 0),
            goal: Position::new(width - 1, height - 1),
        };
        let (start, goal) = (grid.start, grid.goal);
        let _ = grid.open(start);
        let _ = grid.open(goal);
        grid
    }

    /// Builds a grid from text rows where `#` marks a blocked cell and any
    /// other character an open one.
    pub fn from_rows<I, S>(rows: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut width = None;
        let mut height = 0_usize;
        let mut cells = Vec::new();

        for (row, line) in rows.into_iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            let expected = *width.get_or_insert(found);
            if found != expected {
                return Err(GridError::Ragged {
                    row,
                    expected,
                    found,
                });
            }
            cells.extend(line.chars().map(|symbol| match symbol {
                '#' => CellState::Blocked,
                _ => CellState::Open,
            }));
            height += 1;
        }

        let width = width.unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }

        let width = u32::try_from(width).map_err(|_| GridError::Empty)?;
        let height = u32::try_from(height).map_err(|_| GridError::Empty)?;
        let grid = Self {
            width,
            height,
            cells,
            start: Position::new(0, 0),
            goal: Position::new(width - 1, height - 1),
        };

        if !grid.is_open(grid.start) || !grid.is_open(grid.goal) {
            return Err(GridError::BlockedEndpoint);
        }

        Ok(grid)
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Provides the dimensions of the grid as `(width, height)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Cell the player starts from.
    #[must_use]
    pub const fn start(&self) -> Position {
        self.start
    }

    /// Cell the player must reach.
    #[must_use]
    pub const fn goal(&self) -> Position {
        self.goal
    }

    /// Reports whether the position lies within the grid bounds.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.x() < self.width && position.y() < self.height
    }

    /// State of the cell at `position`, if it lies within the grid.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<CellState> {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell exists and can be traversed.
    #[must_use]
    pub fn is_open(&self, position: Position) -> bool {
        self.cell(position).is_some_and(CellState::is_open)
    }

    /// Forces the cell open. Returns `true` when the cell was blocked before.
    pub fn open(&mut self, position: Position) -> bool {
        let Some(slot) = self.index(position).and_then(|index| self.cells.get_mut(index)) else {
            return false;
        };

        let was_blocked = *slot == CellState::Blocked;
        *slot = CellState::Open;
        was_blocked
    }

    /// Flips the cell between open and blocked, returning its new state.
    pub fn toggle(&mut self, position: Position) -> Result<CellState, ToggleError> {
        if position == self.start || position == self.goal {
            return Err(ToggleError::Protected);
        }

        let slot = self
            .index(position)
            .and_then(|index| self.cells.get_mut(index))
            .ok_or(ToggleError::OutOfBounds)?;
        *slot = slot.toggled();
        Ok(*slot)
    }

    /// Dense cell states stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// Iterator over every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Open in-bounds neighbours of the provided position.
    pub fn open_neighbors(&self, position: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL.into_iter().filter_map(move |direction| {
            position
                .step(direction, self.width, self.height)
                .filter(|next| self.is_open(*next))
        })
    }

    /// Number of open cells in the grid.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|state| state.is_open()).count()
    }

    fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }

        let row = usize::try_from(position.y()).ok()?;
        let column = usize::try_from(position.x()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Generated grid together with the par distance measured on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeLayout {
    grid: Grid,
    optimal_distance: u32,
}

impl MazeLayout {
    /// Pairs a grid with its start-to-goal shortest distance.
    #[must_use]
    pub const fn new(grid: Grid, optimal_distance: u32) -> Self {
        Self {
            grid,
            optimal_distance,
        }
    }

    /// Generated grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Shortest start-to-goal distance at generation time.
    #[must_use]
    pub const fn optimal_distance(&self) -> u32 {
        self.optimal_distance
    }

    /// Splits the layout into its grid and par distance.
    #[must_use]
    pub fn into_parts(self) -> (Grid, u32) {
        (self.grid, self.optimal_distance)
    }
}

/// Outcome of a shortest-path query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathResult {
    /// Number of edges on the shortest route.
    Steps(u32),
    /// No open route connects the two cells.
    Unreachable,
}

impl PathResult {
    /// Number of steps when a route exists.
    #[must_use]
    pub const fn steps(self) -> Option<u32> {
        match self {
            Self::Steps(steps) => Some(steps),
            Self::Unreachable => None,
        }
    }

    /// Reports whether a route exists.
    #[must_use]
    pub const fn is_reachable(self) -> bool {
        matches!(self, Self::Steps(_))
    }
}

/// Lifecycle phase of a play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// The player is still looking for the goal.
    InProgress,
    /// The player reached the goal. Terminal.
    Won,
}

/// Difficulty level selecting grid size, fog, and live mutation.
///
/// Deserialized values are clamped the same way as [`Level::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    /// Lowest selectable level.
    pub const MIN: Level = Level(1);
    /// Highest selectable level.
    pub const MAX: Level = Level(10);

    const BASE_GRID_SIZE: u32 = 6;
    const MAX_GRID_SIZE: u32 = 12;
    const FOG_THRESHOLD: u8 = 7;
    const DYNAMIC_THRESHOLD: u8 = 9;

    /// Creates a level, clamping the value into `1..=10`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value < Self::MIN.0 {
            Self::MIN
        } else if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Retrieves the numeric level.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Edge length of the square grid played on this level.
    ///
    /// Starts at six cells and grows by one every second level, capped at
    /// twelve.
    #[must_use]
    pub const fn grid_size(&self) -> u32 {
        let size = Self::BASE_GRID_SIZE + (self.0 as u32).saturating_sub(1) / 2;
        if size > Self::MAX_GRID_SIZE {
            Self::MAX_GRID_SIZE
        } else {
            size
        }
    }

    /// Whether only cells near the player are rendered.
    #[must_use]
    pub const fn fog_enabled(&self) -> bool {
        self.0 >= Self::FOG_THRESHOLD
    }

    /// Whether walls flip while the session runs.
    #[must_use]
    pub const fn dynamic_enabled(&self) -> bool {
        self.0 >= Self::DYNAMIC_THRESHOLD
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<u8> for Level {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

/// Efficiency score in the range `0..=100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Efficiency(u8);

impl Efficiency {
    /// Score of a run that matched par.
    pub const PERFECT: Efficiency = Efficiency(100);

    /// Compares the moves taken against the par distance.
    ///
    /// Computes `round(optimal / max(moves, 1) * 100)` clamped to `0..=100`.
    /// A run that needed no more moves than par always scores 100, including
    /// the degenerate case where start and goal coincide.
    #[must_use]
    pub fn from_moves(optimal_distance: u32, moves: u32) -> Self {
        if moves <= optimal_distance {
            return Self::PERFECT;
        }

        let ratio = f64::from(optimal_distance) / f64::from(moves.max(1));
        let score = (ratio * 100.0).round().clamp(0.0, 100.0);
        Self(score as u8)
    }

    /// Retrieves the numeric score.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Read-only view of the maze used for rendering.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    grid: &'a Grid,
    player: Position,
    fog_enabled: bool,
}

impl<'a> GridView<'a> {
    /// Captures a new view over the grid and the player's location.
    #[must_use]
    pub const fn new(grid: &'a Grid, player: Position, fog_enabled: bool) -> Self {
        Self {
            grid,
            player,
            fog_enabled,
        }
    }

    /// Underlying grid.
    #[must_use]
    pub const fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// State of the cell at `position`, if it lies within the grid.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<CellState> {
        self.grid.cell(position)
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub const fn player(&self) -> Position {
        self.player
    }

    /// Cell the player must reach.
    #[must_use]
    pub const fn goal(&self) -> Position {
        self.grid.goal()
    }

    /// Whether the view should be rendered through fog of war.
    #[must_use]
    pub const fn fog_enabled(&self) -> bool {
        self.fog_enabled
    }

    /// Provides the dimensions of the grid as `(width, height)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        self.grid.dimensions()
    }
}

/// Summary of a session exposed to the surrounding shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    /// Current lifecycle phase.
    pub phase: Phase,
    /// Number of accepted moves.
    pub move_count: u32,
    /// Par distance measured when the maze was generated. Live mutations do
    /// not update it.
    pub optimal_distance: u32,
    /// Whether fog of war applies.
    pub fog_enabled: bool,
    /// Whether walls flip while the session runs.
    pub dynamic_enabled: bool,
    /// Whether an open route from the player to the goal exists.
    pub goal_reachable: bool,
    /// Score earned once the session is won.
    pub efficiency: Option<Efficiency>,
}

/// Completion record handed to the progress collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReport {
    /// Identifier of the game that was completed.
    pub game_id: String,
    /// Level that was completed.
    pub level: Level,
    /// Score earned, between zero and `max_score`.
    pub score: u32,
    /// Highest attainable score.
    pub max_score: u32,
}

impl CompletionReport {
    /// Builds the report for a won maze session.
    #[must_use]
    pub fn maze(level: Level, efficiency: Efficiency) -> Self {
        Self {
            game_id: GAME_ID.to_owned(),
            level,
            score: u32::from(efficiency.get()),
            max_score: MAX_SCORE,
        }
    }
}

/// Errors a progress collaborator may surface when recording a completion.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The backing store cannot be reached.
    #[error("progress store unavailable: {0}")]
    Unavailable(String),
    /// The store refused the report.
    #[error("progress store rejected the report: {0}")]
    Rejected(String),
}

/// Receiver of completed sessions, typically the shared progress store.
pub trait ProgressReporter {
    /// Records a completed session.
    fn report_completion(&mut self, report: &CompletionReport) -> Result<(), ReportError>;
}

impl<P> ProgressReporter for &mut P
where
    P: ProgressReporter + ?Sized,
{
    fn report_completion(&mut self, report: &CompletionReport) -> Result<(), ReportError> {
        (**self).report_completion(report)
    }
}

impl<P> ProgressReporter for Box<P>
where
    P: ProgressReporter + ?Sized,
{
    fn report_completion(&mut self, report: &CompletionReport) -> Result<(), ReportError> {
        (**self).report_completion(report)
    }
}
