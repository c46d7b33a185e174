//! Text rendering of the maze.

use pathway_core::{CellState, GridView, Position, Status};

const PLAYER: char = '@';
const GOAL: char = 'G';
const WALL: char = '#';
const FLOOR: char = '.';
const FOG: char = ' ';

/// Draws the maze row by row, hiding cells `visible` rejects.
pub(crate) fn maze<F>(view: GridView<'_>, visible: F) -> String
where
    F: Fn(Position) -> bool,
{
    let (width, height) = view.dimensions();
    let mut out = String::new();
    for y in 0..height {
        for x in 0..width {
            let cell = Position::new(x, y);
            out.push(glyph(view, cell, visible(cell)));
        }
        out.push('\n');
    }
    out
}

fn glyph(view: GridView<'_>, cell: Position, visible: bool) -> char {
    if cell == view.player() {
        return PLAYER;
    }
    if !visible {
        return FOG;
    }
    if cell == view.goal() {
        return GOAL;
    }
    match view.cell(cell) {
        Some(CellState::Open) => FLOOR,
        Some(CellState::Blocked) | None => WALL,
    }
}

/// One-line summary printed below the maze.
pub(crate) fn status_line(level: u8, status: &Status) -> String {
    let mut line = format!(
        "level {level} | moves {} | par {}",
        status.move_count, status.optimal_distance
    );
    if status.fog_enabled {
        line.push_str(" | fog");
    }
    if status.dynamic_enabled {
        line.push_str(" | live walls");
    }
    if !status.goal_reachable {
        line.push_str(" | goal sealed, press r");
    }
    if let Some(efficiency) = status.efficiency {
        line.push_str(&format!(" | solved, efficiency {}%", efficiency.get()));
    }
    line
}
