//! Session state types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty chosen at session start; fixes the question budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn max_questions(self) -> usize {
        match self {
            Difficulty::Easy => 25,
            Difficulty::Normal => 20,
            Difficulty::Hard => 15,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's answer to a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Yes,
    No,
    Maybe,
}

impl Answer {
    pub fn as_str(self) -> &'static str {
        match self {
            Answer::Yes => "yes",
            Answer::No => "no",
            Answer::Maybe => "maybe",
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One committed turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswer {
    /// 1-based, assigned when the question was answered
    pub question_number: usize,
    pub question: String,
    pub answer: Answer,
}

/// Lifecycle status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    #[default]
    Idle,
    Playing,
    Won,
    Lost,
    GaveUp,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Won | GameStatus::Lost | GameStatus::GaveUp)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Idle => "idle",
            GameStatus::Playing => "playing",
            GameStatus::Won => "won",
            GameStatus::Lost => "lost",
            GameStatus::GaveUp => "gave-up",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Won,
    Lost,
    GaveUp,
}

impl From<Outcome> for GameStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Won => GameStatus::Won,
            Outcome::Lost => GameStatus::Lost,
            Outcome::GaveUp => GameStatus::GaveUp,
        }
    }
}

/// The provider call currently outstanding, with the history it was made for.
///
/// The candidate history is only committed to the session once the provider
/// answers successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PendingRequest {
    FirstQuestion,
    Answer { candidate: Vec<QuestionAnswer> },
    Undo {
        candidate: Vec<QuestionAnswer>,
        /// Restored if the re-query fails
        was_guess_pending: bool,
    },
}

/// Classification of a failure surfaced to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionErrorKind {
    /// Provider is misconfigured; retrying will keep failing until fixed
    Configuration,
    /// Network, malformed reply or provider-reported failure
    Transient,
}

/// Dismissible error shown inline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionError {
    pub kind: SessionErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A single game session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    pub difficulty: Difficulty,
    pub status: GameStatus,
    pub history: Vec<QuestionAnswer>,
    /// Most recent text from the provider; a question or a guess
    pub current_question: Option<String>,
    /// `current_question` is a guess awaiting confirmation
    pub guess_pending: bool,
    /// Outstanding provider call (the in-flight flag)
    pub pending: Option<PendingRequest>,
    pub error: Option<SessionError>,
}

impl Session {
    /// Fresh idle session
    pub fn idle(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    pub fn max_questions(&self) -> usize {
        self.difficulty.max_questions()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn questions_remaining(&self) -> usize {
        self.max_questions().saturating_sub(self.history.len())
    }

    pub fn budget_exhausted(&self) -> bool {
        self.history.len() >= self.max_questions()
    }
}
