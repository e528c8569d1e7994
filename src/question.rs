//! Question provider wire types
//!
//! The request/response shapes exchanged between the turn controller and
//! whatever produces the next question.

use crate::game::{Difficulty, QuestionAnswer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request for the next question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    pub history: Vec<QuestionAnswer>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub max_questions: usize,
}

impl QuestionRequest {
    pub fn new(history: Vec<QuestionAnswer>, difficulty: Difficulty) -> Self {
        Self {
            history,
            difficulty,
            max_questions: difficulty.max_questions(),
        }
    }

    pub fn questions_remaining(&self) -> usize {
        self.max_questions.saturating_sub(self.history.len())
    }
}

/// A question (or guess) produced by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionReply {
    pub question: String,
    pub is_guess: bool,
}

impl QuestionReply {
    #[allow(dead_code)] // Used in tests
    pub fn question(text: impl Into<String>) -> Self {
        Self {
            question: text.into(),
            is_guess: false,
        }
    }

    pub fn guess(text: impl Into<String>) -> Self {
        Self {
            question: text.into(),
            is_guess: true,
        }
    }
}

/// Provider failure with classification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub details: Option<String>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Configuration, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Provider, message)
    }

    pub fn invalid_reply(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidReply, message)
    }

    pub fn is_configuration(&self) -> bool {
        self.kind == ProviderErrorKind::Configuration
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Missing credentials or misconfigured provider - fatal for the call
    Configuration,
    /// Network failure or timeout
    Transport,
    /// The provider answered with an error payload
    Provider,
    /// Empty or malformed question text
    InvalidReply,
}
