#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fog-of-war policy deciding which cells may be rendered.

use pathway_core::{GridView, Level, Position};

/// Manhattan radius around the player that stays visible under fog.
pub const FOG_RADIUS: u32 = 2;

/// Reports whether `cell` is renderable for a player standing on `player`.
///
/// Without fog every cell is visible. With fog only cells within
/// [`FOG_RADIUS`] steps (Manhattan distance) of the player are.
#[must_use]
pub fn is_visible(player: Position, cell: Position, fog_enabled: bool) -> bool {
    !fog_enabled || player.manhattan_distance(cell) <= FOG_RADIUS
}

/// Stateless visibility policy bound to a level's fog flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visibility {
    fog_enabled: bool,
}

impl Visibility {
    /// Creates a policy with fog explicitly enabled or disabled.
    #[must_use]
    pub const fn new(fog_enabled: bool) -> Self {
        Self { fog_enabled }
    }

    /// Creates the policy that applies on the provided level.
    #[must_use]
    pub const fn for_level(level: Level) -> Self {
        Self::new(level.fog_enabled())
    }

    /// Whether fog of war applies.
    #[must_use]
    pub const fn fog_enabled(&self) -> bool {
        self.fog_enabled
    }

    /// Reports whether `cell` is renderable for a player standing on `player`.
    #[must_use]
    pub fn is_visible(&self, player: Position, cell: Position) -> bool {
        is_visible(player, cell, self.fog_enabled)
    }

    /// Iterator over every renderable cell of the view in row-major order.
    pub fn visible_cells<'a>(&self, view: GridView<'a>) -> impl Iterator<Item = Position> + 'a {
        let policy = *self;
        let player = view.player();
        view.grid()
            .positions()
            .filter(move |cell| policy.is_visible(player, *cell))
    }
}
