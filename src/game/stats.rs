//! Aggregate win/loss statistics across games

use super::state::Outcome;
use serde::{Deserialize, Serialize};

/// Persisted aggregate counters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub games_played: u64,
    pub games_won: u64,
    /// Running mean of questions used per finished game
    pub average_questions: f64,
}

impl Stats {
    /// Percentage of games won by the question asker, rounded
    pub fn win_rate(&self) -> u64 {
        if self.games_played == 0 {
            return 0;
        }
        (self.games_won * 100 + self.games_played / 2) / self.games_played
    }
}

/// Fold one finished game into the stats.
///
/// Pure: persisting the result is up to the caller.
#[allow(clippy::cast_precision_loss)] // counts stay far below 2^52
pub fn apply_outcome(old: &Stats, outcome: Outcome, question_count: usize) -> Stats {
    let old_count = old.games_played as f64;
    let average_questions =
        (old.average_questions * old_count + question_count as f64) / (old_count + 1.0);

    Stats {
        games_played: old.games_played + 1,
        games_won: old.games_won + u64::from(outcome == Outcome::Won),
        average_questions,
    }
}
