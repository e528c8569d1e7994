//! Events that can occur during a game

use super::state::{Answer, Difficulty};
use crate::question::{ProviderError, QuestionReply};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User intents
    Start { difficulty: Difficulty },
    Answer { answer: Answer },
    ConfirmGuess { correct: bool },
    Undo,
    GiveUp,
    PlayAgain,
    DismissError,

    // Provider outcomes
    QuestionReceived { reply: QuestionReply },
    ProviderFailed { error: ProviderError },
}

impl Event {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start { .. } => "start",
            Event::Answer { .. } => "answer",
            Event::ConfirmGuess { .. } => "confirm_guess",
            Event::Undo => "undo",
            Event::GiveUp => "give_up",
            Event::PlayAgain => "play_again",
            Event::DismissError => "dismiss_error",
            Event::QuestionReceived { .. } => "question_received",
            Event::ProviderFailed { .. } => "provider_failed",
        }
    }
}
