#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Live-maze system that periodically requests random wall flips.

use std::time::Duration;

use log::debug;
use pathway_core::{Command, Event, GridView, Position};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Interval between two flips on live-maze levels.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2_000);

/// Most flips emitted for a single batch of events. Time beyond the cap is
/// dropped rather than replayed later.
pub const MAX_FLIPS_PER_TICK: usize = 4;

/// Configuration parameters required to construct the mutator.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided flip cadence and seed.
    #[must_use]
    pub const fn new(interval: Duration, rng_seed: u64) -> Self {
        Self { interval, rng_seed }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL, 0)
    }
}

/// Pure system that emits one toggle command per elapsed interval.
///
/// Each flip targets a cell drawn uniformly from those that may change: every
/// cell except the start, the goal, and the player's cell.
///
/// The mutator belongs to a single maze. It disarms permanently once it
/// observes the maze being won or replaced, so a stale instance can never
/// flip cells of a newer maze.
#[derive(Debug)]
pub struct Mutator {
    interval: Duration,
    accumulator: Duration,
    rng: ChaCha8Rng,
    armed: bool,
}

impl Mutator {
    /// Creates a new mutator using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            interval: config.interval,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            armed: true,
        }
    }

    /// Whether the mutator still reacts to elapsed time.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Stops all further flips.
    pub fn disarm(&mut self) {
        self.armed = false;
        self.accumulator = Duration::ZERO;
    }

    /// Consumes world events and emits toggle commands for the viewed grid.
    pub fn handle(&mut self, events: &[Event], view: GridView<'_>, out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                Event::MazeWon { .. } | Event::MazeLoaded { .. } => self.disarm(),
                _ => {}
            }
        }

        if !self.armed || self.interval.is_zero() || accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let attempts = self.resolve_flip_attempts();
        if attempts == 0 {
            return;
        }

        let candidates = flippable_cells(view);
        for _ in 0..attempts {
            let Some(&cell) = candidates.choose(&mut self.rng) else {
                return;
            };
            debug!("flipping cell ({}, {})", cell.x(), cell.y());
            out.push(Command::ToggleCell { cell });
        }
    }

    fn resolve_flip_attempts(&mut self) -> usize {
        let interval = self.interval.as_nanos();
        if interval == 0 {
            return 0;
        }

        let elapsed = self.accumulator.as_nanos();
        let remainder = u64::try_from(elapsed % interval).unwrap_or(u64::MAX);
        self.accumulator = Duration::from_nanos(remainder);

        usize::try_from(elapsed / interval)
            .unwrap_or(usize::MAX)
            .min(MAX_FLIPS_PER_TICK)
    }
}

fn flippable_cells(view: GridView<'_>) -> Vec<Position> {
    let grid = view.grid();
    let protected = [grid.start(), grid.goal(), view.player()];
    grid.positions()
        .filter(|cell| !protected.contains(cell))
        .collect()
}
