//! Parsing of the line-based player input.

use pathway_core::Direction;

/// Action requested by one line of input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Move(Direction),
    Reset,
    Tick,
    Quit,
}

/// Parses a single input line. Blank or unknown lines yield `None`.
pub(crate) fn parse(line: &str) -> Option<Action> {
    let action = match line.trim().to_ascii_lowercase().as_str() {
        "w" | "up" => Action::Move(Direction::North),
        "s" | "down" => Action::Move(Direction::South),
        "a" | "left" => Action::Move(Direction::West),
        "d" | "right" => Action::Move(Direction::East),
        "r" | "reset" => Action::Reset,
        "t" | "tick" => Action::Tick,
        "q" | "quit" => Action::Quit,
        _ => return None,
    };
    Some(action)
}
