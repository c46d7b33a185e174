//! Breadth-first path finding over open maze cells.

use std::collections::VecDeque;

use pathway_core::{Grid, PathResult, Position};

/// Computes the shortest open route length between two cells.
///
/// Neighbours are the four in-bounds cells sharing an edge; only open cells
/// are traversable. Returns [`PathResult::Unreachable`] when either endpoint
/// is blocked or out of bounds, or when the frontier empties before `to` is
/// reached.
#[must_use]
pub fn shortest_path(grid: &Grid, from: Position, to: Position) -> PathResult {
    match BreadthFirst::run(grid, from, to) {
        Some(search) => PathResult::Steps(search.depth),
        None => PathResult::Unreachable,
    }
}

/// Reconstructs one shortest route from `from` to `to`.
///
/// The returned cells exclude `from` and end with `to`, so the route length
/// equals the distance reported by [`shortest_path`]. An empty route means
/// both endpoints coincide.
#[must_use]
pub fn shortest_route(grid: &Grid, from: Position, to: Position) -> Option<Vec<Position>> {
    let search = BreadthFirst::run(grid, from, to)?;
    let width = usize::try_from(grid.width()).ok()?;

    let mut route = Vec::with_capacity(usize::try_from(search.depth).unwrap_or(0));
    let mut cursor = to;
    while cursor != from {
        route.push(cursor);
        cursor = search.parents.get(index(width, cursor)?).copied().flatten()?;
    }
    route.reverse();
    Some(route)
}

struct BreadthFirst {
    depth: u32,
    parents: Vec<Option<Position>>,
}

impl BreadthFirst {
    fn run(grid: &Grid, from: Position, to: Position) -> Option<Self> {
        if !grid.is_open(from) || !grid.is_open(to) {
            return None;
        }

        let width = usize::try_from(grid.width()).ok()?;
        let cell_count = grid.cells().len();
        let mut visited = vec![false; cell_count];
        let mut parents = vec![None; cell_count];
        let mut queue = VecDeque::new();

        visited[index(width, from)?] = true;
        queue.push_back((from, 0_u32));

        while let Some((cell, depth)) = queue.pop_front() {
            if cell == to {
                return Some(Self { depth, parents });
            }

            for neighbor in grid.open_neighbors(cell) {
                let Some(offset) = index(width, neighbor) else {
                    continue;
                };

                if visited[offset] {
                    continue;
                }

                visited[offset] = true;
                parents[offset] = Some(cell);
                queue.push_back((neighbor, depth + 1));
            }
        }

        None
    }
}

fn index(width: usize, cell: Position) -> Option<usize> {
    let column = usize::try_from(cell.x()).ok()?;
    let row = usize::try_from(cell.y()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
