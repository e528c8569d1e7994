//! Effects produced by state transitions

use super::state::Outcome;
use crate::question::QuestionRequest;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the question provider; the result comes back as
    /// `Event::QuestionReceived` or `Event::ProviderFailed`
    RequestQuestion { request: QuestionRequest },

    /// Fold a finished game into the persisted stats
    RecordOutcome {
        outcome: Outcome,
        question_count: usize,
    },
}

impl Effect {
    pub fn request_question(request: QuestionRequest) -> Self {
        Effect::RequestQuestion { request }
    }

    pub fn record_outcome(outcome: Outcome, question_count: usize) -> Self {
        Effect::RecordOutcome {
            outcome,
            question_count,
        }
    }
}
