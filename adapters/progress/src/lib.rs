#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Progress collaborator recording completed mazes.
//!
//! [`ProgressBook`] keeps per-game progress and a leaderboard holding the
//! latest score of every level. It is restored from and saved to disk by
//! [`ProgressStore`].

mod store;

use std::collections::BTreeMap;
use std::time::SystemTime;

use log::debug;
use pathway_core::{CompletionReport, Level, ProgressReporter, ReportError};
use serde::{Deserialize, Serialize};

pub use store::{ProgressStore, StoreError};

/// Number of leaderboard entries returned when no limit is requested.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Progress accumulated for a single game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProgress {
    /// Highest level completed so far.
    pub best_level: Option<Level>,
    /// Every completed level, sorted and without duplicates.
    pub completed_levels: Vec<Level>,
    /// Highest score reported so far.
    pub best_score: u32,
}

impl GameProgress {
    fn record(&mut self, report: &CompletionReport) {
        self.best_level = self.best_level.max(Some(report.level));
        if let Err(slot) = self.completed_levels.binary_search(&report.level) {
            self.completed_levels.insert(slot, report.level);
        }
        self.best_score = self.best_score.max(report.score);
    }
}

/// Latest recorded score for one level of one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Unique identifier of the entry.
    pub id: u64,
    /// Game the score belongs to.
    pub game_id: String,
    /// Level that was completed.
    pub level: Level,
    /// Score earned.
    pub score: u32,
    /// Highest attainable score.
    pub max_score: u32,
    /// Completion timestamp.
    pub when: SystemTime,
}

/// In-memory record of all completions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProgressBook {
    games: BTreeMap<String, GameProgress>,
    leaderboard: Vec<LeaderboardEntry>,
    next_id: u64,
    #[serde(skip)]
    unavailable: bool,
}

impl ProgressBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress recorded for `game_id`, if any.
    #[must_use]
    pub fn game(&self, game_id: &str) -> Option<&GameProgress> {
        self.games.get(game_id)
    }

    /// Leaderboard entries sorted by score, highest first.
    ///
    /// Ties keep the most recent entry first.
    #[must_use]
    pub fn leaderboard(&self, limit: usize) -> Vec<&LeaderboardEntry> {
        let mut entries: Vec<&LeaderboardEntry> = self.leaderboard.iter().collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then(b.id.cmp(&a.id)));
        entries.truncate(limit);
        entries
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty() && self.leaderboard.is_empty()
    }

    /// Clears all progress and the leaderboard.
    pub fn reset_all(&mut self) {
        self.games.clear();
        self.leaderboard.clear();
        self.next_id = 0;
    }

    /// Marks the book as reachable or not. An unavailable book refuses every
    /// report.
    pub fn set_available(&mut self, available: bool) {
        self.unavailable = !available;
    }

    /// Whether reports are currently accepted.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !self.unavailable
    }

    fn record_entry(&mut self, report: &CompletionReport) {
        self.next_id += 1;
        let entry = LeaderboardEntry {
            id: self.next_id,
            game_id: report.game_id.clone(),
            level: report.level,
            score: report.score,
            max_score: report.max_score,
            when: SystemTime::now(),
        };

        let existing = self
            .leaderboard
            .iter_mut()
            .find(|slot| slot.game_id == entry.game_id && slot.level == entry.level);
        match existing {
            Some(slot) => *slot = entry,
            None => self.leaderboard.push(entry),
        }
    }
}

impl ProgressReporter for ProgressBook {
    fn report_completion(&mut self, report: &CompletionReport) -> Result<(), ReportError> {
        if self.unavailable {
            return Err(ReportError::Unavailable("progress book is offline".to_owned()));
        }
        if report.game_id.is_empty() {
            return Err(ReportError::Rejected("missing game id".to_owned()));
        }
        if report.score > report.max_score {
            return Err(ReportError::Rejected(format!(
                "score {} exceeds maximum {}",
                report.score, report.max_score
            )));
        }

        self.games
            .entry(report.game_id.clone())
            .or_default()
            .record(report);
        self.record_entry(report);
        debug!(
            "recorded {} level {} with score {}",
            report.game_id,
            report.level.get(),
            report.score
        );
        Ok(())
    }
}
