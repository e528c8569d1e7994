//! API request and response types

use crate::game::state::SessionError;
use crate::game::{Answer, Difficulty, GameStatus, QuestionAnswer, Session, Stats};
use serde::{Deserialize, Serialize};

/// Request to create (and start) a new session
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// Request to start a game; keeps the session's difficulty when omitted
#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: Answer,
}

#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    pub correct: bool,
}

/// Everything the UI needs to render a session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub difficulty: Difficulty,
    pub max_questions: usize,
    pub status: GameStatus,
    pub history: Vec<QuestionAnswer>,
    pub current_question: Option<String>,
    pub is_guess_pending: bool,
    pub busy: bool,
    pub questions_used: usize,
    pub questions_remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SessionError>,
}

impl SessionSnapshot {
    pub fn new(id: &str, session: &Session) -> Self {
        Self {
            id: id.to_string(),
            difficulty: session.difficulty,
            max_questions: session.max_questions(),
            status: session.status,
            history: session.history.clone(),
            current_question: session.current_question.clone(),
            is_guess_pending: session.guess_pending,
            busy: session.is_busy(),
            questions_used: session.history.len(),
            questions_remaining: session.questions_remaining(),
            error: session.error.clone(),
        }
    }
}

/// Stats plus the derived win rate
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: Stats,
    pub win_rate: u64,
}

impl From<Stats> for StatsResponse {
    fn from(stats: Stats) -> Self {
        Self {
            win_rate: stats.win_rate(),
            stats,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyInfo {
    pub difficulty: Difficulty,
    pub max_questions: usize,
}

/// Model information with metadata
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub provider: String,
    pub description: String,
}

/// Response for model list
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: Option<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }
}
