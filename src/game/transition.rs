//! Pure state transition function
//!
//! Given the same session and event, `transition` always produces the same
//! new session and effects. Provider calls and stats persistence are
//! expressed as effects and carried out by the runtime.

use super::state::{
    Answer, Difficulty, GameStatus, Outcome, PendingRequest, QuestionAnswer, Session,
    SessionError, SessionErrorKind,
};
use super::{Effect, Event};
use crate::question::{ProviderError, QuestionReply, QuestionRequest};
use thiserror::Error;

const FIRST_QUESTION_FAILED: &str =
    "I'm having a little trouble thinking of a question right now. Please try again in a moment.";
const ANSWER_FAILED: &str = "Oops! I had a brain-freeze. Could you try answering again?";
const UNDO_FAILED: &str = "I got a bit confused trying to go back. Please try again.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: Session) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Intents the controller refuses in the current state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Still thinking about the last answer, please wait")]
    Busy,
    #[error("No game in progress (status: {0})")]
    NotPlaying(GameStatus),
    #[error("A guess is waiting for confirmation")]
    GuessPending,
    #[error("There is no guess to confirm")]
    NoGuessPending,
    #[error("The game is still in progress")]
    GameInProgress,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(state: &Session, event: Event) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::Start { difficulty } => start(state, difficulty),
        Event::Answer { answer } => submit_answer(state, answer),
        Event::ConfirmGuess { correct } => resolve_guess(state, correct),
        Event::Undo => undo(state),
        Event::GiveUp => give_up(state),
        Event::PlayAgain => play_again(state),
        Event::DismissError => Ok(TransitionResult::new(Session {
            error: None,
            ..state.clone()
        })),
        Event::QuestionReceived { reply } => question_received(state, &reply),
        Event::ProviderFailed { error } => provider_failed(state, &error),
    }
}

// ============================================================
// User intents
// ============================================================

fn start(state: &Session, difficulty: Difficulty) -> Result<TransitionResult, TransitionError> {
    if state.is_busy() {
        return Err(TransitionError::Busy);
    }

    let request = QuestionRequest::new(Vec::new(), difficulty);
    Ok(TransitionResult::new(Session {
        difficulty,
        status: GameStatus::Playing,
        pending: Some(PendingRequest::FirstQuestion),
        ..Session::default()
    })
    .with_effect(Effect::request_question(request)))
}

fn submit_answer(state: &Session, answer: Answer) -> Result<TransitionResult, TransitionError> {
    ensure_playing(state)?;
    if state.guess_pending {
        return Err(TransitionError::GuessPending);
    }
    let Some(question) = state.current_question.clone() else {
        return Err(TransitionError::InvalidTransition(
            "no question to answer".to_string(),
        ));
    };
    if state.budget_exhausted() {
        return Err(TransitionError::InvalidTransition(
            "question budget exhausted".to_string(),
        ));
    }

    let mut candidate = state.history.clone();
    candidate.push(QuestionAnswer {
        question_number: candidate.len() + 1,
        question,
        answer,
    });
    let request = QuestionRequest::new(candidate.clone(), state.difficulty);

    Ok(TransitionResult::new(Session {
        pending: Some(PendingRequest::Answer { candidate }),
        error: None,
        ..state.clone()
    })
    .with_effect(Effect::request_question(request)))
}

fn resolve_guess(state: &Session, correct: bool) -> Result<TransitionResult, TransitionError> {
    ensure_playing(state)?;
    if !state.guess_pending {
        return Err(TransitionError::NoGuessPending);
    }

    if correct {
        return Ok(finish(state, Outcome::Won));
    }

    // A wrong guess is an implicit "no" to the guess question
    let cleared = Session {
        guess_pending: false,
        ..state.clone()
    };
    if cleared.budget_exhausted() {
        Ok(finish(&cleared, Outcome::Lost))
    } else {
        submit_answer(&cleared, Answer::No)
    }
}

fn undo(state: &Session) -> Result<TransitionResult, TransitionError> {
    let Some((_, rest)) = state.history.split_last() else {
        return Ok(TransitionResult::new(state.clone()));
    };
    ensure_playing(state)?;

    let candidate = rest.to_vec();
    let request = QuestionRequest::new(candidate.clone(), state.difficulty);

    Ok(TransitionResult::new(Session {
        pending: Some(PendingRequest::Undo {
            candidate,
            was_guess_pending: state.guess_pending,
        }),
        guess_pending: false,
        error: None,
        ..state.clone()
    })
    .with_effect(Effect::request_question(request)))
}

fn give_up(state: &Session) -> Result<TransitionResult, TransitionError> {
    ensure_playing(state)?;
    Ok(finish(state, Outcome::GaveUp))
}

fn play_again(state: &Session) -> Result<TransitionResult, TransitionError> {
    if state.is_busy() {
        return Err(TransitionError::Busy);
    }
    if state.status == GameStatus::Playing {
        return Err(TransitionError::GameInProgress);
    }
    Ok(TransitionResult::new(Session::idle(state.difficulty)))
}

// ============================================================
// Provider outcomes
// ============================================================

fn question_received(
    state: &Session,
    reply: &QuestionReply,
) -> Result<TransitionResult, TransitionError> {
    let Some(pending) = &state.pending else {
        return Err(TransitionError::InvalidTransition(
            "question received with no request outstanding".to_string(),
        ));
    };
    let text = reply.question.trim();

    match pending {
        PendingRequest::FirstQuestion if !text.is_empty() => Ok(TransitionResult::new(Session {
            current_question: Some(text.to_string()),
            guess_pending: reply.is_guess,
            pending: None,
            ..state.clone()
        })),

        PendingRequest::Answer { candidate } => {
            if reply.is_guess && !text.is_empty() {
                // The guess consumes a turn: the answer that led to it is committed
                Ok(TransitionResult::new(Session {
                    history: candidate.clone(),
                    current_question: Some(text.to_string()),
                    guess_pending: true,
                    pending: None,
                    ..state.clone()
                }))
            } else if candidate.len() >= state.max_questions() {
                let committed = Session {
                    history: candidate.clone(),
                    pending: None,
                    ..state.clone()
                };
                Ok(finish(&committed, Outcome::Lost))
            } else if text.is_empty() {
                provider_failed(state, &empty_question())
            } else {
                Ok(TransitionResult::new(Session {
                    history: candidate.clone(),
                    current_question: Some(text.to_string()),
                    guess_pending: false,
                    pending: None,
                    ..state.clone()
                }))
            }
        }

        PendingRequest::Undo { candidate, .. } if !text.is_empty() => {
            Ok(TransitionResult::new(Session {
                history: candidate.clone(),
                current_question: Some(text.to_string()),
                guess_pending: reply.is_guess,
                pending: None,
                ..state.clone()
            }))
        }

        PendingRequest::FirstQuestion | PendingRequest::Undo { .. } => {
            provider_failed(state, &empty_question())
        }
    }
}

fn provider_failed(
    state: &Session,
    error: &ProviderError,
) -> Result<TransitionResult, TransitionError> {
    let Some(pending) = &state.pending else {
        return Err(TransitionError::InvalidTransition(
            "provider failure with no request outstanding".to_string(),
        ));
    };

    let session_error = if error.is_configuration() {
        SessionError {
            kind: SessionErrorKind::Configuration,
            message: format!("The question provider is not available: {}", error.message),
            details: error.details.clone(),
        }
    } else {
        let message = match pending {
            PendingRequest::FirstQuestion => FIRST_QUESTION_FAILED,
            PendingRequest::Answer { .. } => ANSWER_FAILED,
            PendingRequest::Undo { .. } => UNDO_FAILED,
        };
        SessionError {
            kind: SessionErrorKind::Transient,
            message: message.to_string(),
            details: Some(error.message.clone()),
        }
    };

    let new_state = match pending {
        // Abandon the session rather than retrying the first question
        PendingRequest::FirstQuestion => Session {
            error: Some(session_error),
            ..Session::idle(state.difficulty)
        },
        // Candidate history is dropped; the committed history stays as it was
        PendingRequest::Answer { .. } => Session {
            pending: None,
            error: Some(session_error),
            ..state.clone()
        },
        PendingRequest::Undo {
            was_guess_pending, ..
        } => Session {
            pending: None,
            guess_pending: *was_guess_pending,
            error: Some(session_error),
            ..state.clone()
        },
    };

    Ok(TransitionResult::new(new_state))
}

// Helper functions

fn ensure_playing(state: &Session) -> Result<(), TransitionError> {
    if state.is_busy() {
        return Err(TransitionError::Busy);
    }
    if state.status != GameStatus::Playing {
        return Err(TransitionError::NotPlaying(state.status));
    }
    Ok(())
}

fn finish(state: &Session, outcome: Outcome) -> TransitionResult {
    let question_count = state.history.len();
    TransitionResult::new(Session {
        status: outcome.into(),
        guess_pending: false,
        error: None,
        ..state.clone()
    })
    .with_effect(Effect::record_outcome(outcome, question_count))
}

fn empty_question() -> ProviderError {
    ProviderError::invalid_reply("Provider returned an empty question")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::ProviderErrorKind;

    fn apply(state: &Session, event: Event) -> TransitionResult {
        transition(state, event).unwrap()
    }

    fn question(text: &str) -> Event {
        Event::QuestionReceived {
            reply: QuestionReply::question(text),
        }
    }

    fn guess(text: &str) -> Event {
        Event::QuestionReceived {
            reply: QuestionReply::guess(text),
        }
    }

    fn network_failure() -> Event {
        Event::ProviderFailed {
            error: ProviderError::transport("connection reset"),
        }
    }

    /// Session in `playing` with `answers` committed turns and a question on screen
    fn playing(difficulty: Difficulty, answers: usize) -> Session {
        let mut state = apply(&Session::default(), Event::Start { difficulty }).new_state;
        state = apply(&state, question("Q1?")).new_state;
        for i in 0..answers {
            state = apply(&state, Event::Answer { answer: Answer::Yes }).new_state;
            state = apply(&state, question(&format!("Q{}?", i + 2))).new_state;
        }
        state
    }

    #[test]
    fn test_start_requests_first_question() {
        let result = apply(
            &Session::default(),
            Event::Start {
                difficulty: Difficulty::Hard,
            },
        );

        assert_eq!(result.new_state.status, GameStatus::Playing);
        assert_eq!(result.new_state.pending, Some(PendingRequest::FirstQuestion));
        assert_eq!(
            result.effects,
            vec![Effect::request_question(QuestionRequest {
                history: vec![],
                difficulty: Difficulty::Hard,
                max_questions: 15,
            })]
        );
    }

    #[test]
    fn test_first_question_is_not_recorded() {
        let started = apply(
            &Session::default(),
            Event::Start {
                difficulty: Difficulty::Normal,
            },
        )
        .new_state;
        let result = apply(&started, question("Is it alive?"));

        assert_eq!(result.new_state.status, GameStatus::Playing);
        assert_eq!(
            result.new_state.current_question.as_deref(),
            Some("Is it alive?")
        );
        assert!(result.new_state.history.is_empty());
        assert!(!result.new_state.is_busy());
    }

    #[test]
    fn test_first_question_failure_reverts_to_idle() {
        let started = apply(
            &Session::default(),
            Event::Start {
                difficulty: Difficulty::Normal,
            },
        )
        .new_state;

        let result = apply(&started, network_failure());
        assert_eq!(result.new_state.status, GameStatus::Idle);
        assert!(!result.new_state.is_busy());
        let error = result.new_state.error.unwrap();
        assert_eq!(error.kind, SessionErrorKind::Transient);
        assert_eq!(error.message, FIRST_QUESTION_FAILED);

        let result = apply(&started, question("   "));
        assert_eq!(result.new_state.status, GameStatus::Idle);
        assert!(result.new_state.error.is_some());
    }

    #[test]
    fn test_answer_commits_only_on_success() {
        let state = playing(Difficulty::Normal, 2);
        let asked = apply(&state, Event::Answer { answer: Answer::No });

        assert_eq!(asked.new_state.history, state.history);
        assert!(asked.new_state.is_busy());
        match &asked.effects[..] {
            [Effect::RequestQuestion { request }] => {
                assert_eq!(request.history.len(), 3);
                assert_eq!(request.history[2].question_number, 3);
                assert_eq!(request.history[2].question, "Q3?");
                assert_eq!(request.history[2].answer, Answer::No);
            }
            other => panic!("unexpected effects: {other:?}"),
        }

        let answered = apply(&asked.new_state, question("Is it big?"));
        assert_eq!(answered.new_state.history.len(), 3);
        assert_eq!(
            answered.new_state.current_question.as_deref(),
            Some("Is it big?")
        );
    }

    #[test]
    fn test_transient_failure_keeps_history() {
        let state = playing(Difficulty::Normal, 4);
        let asked = apply(&state, Event::Answer { answer: Answer::Maybe }).new_state;
        let failed = apply(&asked, network_failure()).new_state;

        assert_eq!(failed.history, state.history);
        assert_eq!(failed.current_question, state.current_question);
        assert_eq!(failed.status, GameStatus::Playing);
        assert!(!failed.is_busy());
        assert_eq!(failed.error.as_ref().unwrap().message, ANSWER_FAILED);

        // The same answer can be retried
        let retried = apply(&failed, Event::Answer { answer: Answer::Maybe });
        assert!(retried.new_state.error.is_none());
        assert_eq!(retried.effects.len(), 1);
    }

    #[test]
    fn test_configuration_failure_is_reported_as_such() {
        let state = playing(Difficulty::Easy, 1);
        let asked = apply(&state, Event::Answer { answer: Answer::Yes }).new_state;
        let failed = apply(
            &asked,
            Event::ProviderFailed {
                error: ProviderError::configuration("GOOGLE_GENERATIVE_AI_API_KEY is not set"),
            },
        )
        .new_state;

        let error = failed.error.unwrap();
        assert_eq!(error.kind, SessionErrorKind::Configuration);
        assert!(error.message.contains("GOOGLE_GENERATIVE_AI_API_KEY"));
        assert_eq!(failed.history, state.history);
    }

    #[test]
    fn test_busy_rejects_intents() {
        let state = playing(Difficulty::Normal, 1);
        let busy = apply(&state, Event::Answer { answer: Answer::Yes }).new_state;

        for event in [
            Event::Answer { answer: Answer::No },
            Event::Undo,
            Event::GiveUp,
            Event::PlayAgain,
            Event::Start {
                difficulty: Difficulty::Easy,
            },
        ] {
            assert!(matches!(
                transition(&busy, event),
                Err(TransitionError::Busy)
            ));
        }
    }

    #[test]
    fn test_hard_game_lost_after_fifteen_answers() {
        let state = playing(Difficulty::Hard, 14);
        assert_eq!(state.history.len(), 14);

        let asked = apply(&state, Event::Answer { answer: Answer::No }).new_state;
        let result = apply(&asked, question("Is it red?"));

        assert_eq!(result.new_state.status, GameStatus::Lost);
        assert_eq!(result.new_state.history.len(), 15);
        assert_eq!(
            result.effects,
            vec![Effect::record_outcome(Outcome::Lost, 15)]
        );
    }

    #[test]
    fn test_guess_confirmed_wins() {
        let state = playing(Difficulty::Normal, 5);
        let asked = apply(&state, Event::Answer { answer: Answer::Yes }).new_state;
        let guessed = apply(&asked, guess("Is it a banana?")).new_state;

        assert!(guessed.guess_pending);
        assert_eq!(guessed.history.len(), 6);
        assert_eq!(guessed.status, GameStatus::Playing);

        let won = apply(&guessed, Event::ConfirmGuess { correct: true });
        assert_eq!(won.new_state.status, GameStatus::Won);
        assert_eq!(won.effects, vec![Effect::record_outcome(Outcome::Won, 6)]);
    }

    #[test]
    fn test_rejected_guess_continues_with_no() {
        let state = playing(Difficulty::Normal, 3);
        let asked = apply(&state, Event::Answer { answer: Answer::Yes }).new_state;
        let guessed = apply(&asked, guess("Is it a cat?")).new_state;

        assert!(matches!(
            transition(&guessed, Event::Answer { answer: Answer::Yes }),
            Err(TransitionError::GuessPending)
        ));

        let rejected = apply(&guessed, Event::ConfirmGuess { correct: false });
        assert!(!rejected.new_state.guess_pending);
        match &rejected.effects[..] {
            [Effect::RequestQuestion { request }] => {
                let last = request.history.last().unwrap();
                assert_eq!(last.question, "Is it a cat?");
                assert_eq!(last.answer, Answer::No);
                assert_eq!(last.question_number, 5);
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_rejected_guess_with_exhausted_budget_loses() {
        let state = playing(Difficulty::Hard, 14);
        let asked = apply(&state, Event::Answer { answer: Answer::Yes }).new_state;
        let guessed = apply(&asked, guess("Is it a piano?")).new_state;
        assert_eq!(guessed.history.len(), 15);
        assert!(guessed.guess_pending);

        let result = apply(&guessed, Event::ConfirmGuess { correct: false });
        assert_eq!(result.new_state.status, GameStatus::Lost);
        assert_eq!(result.new_state.history.len(), 15);
        assert_eq!(
            result.effects,
            vec![Effect::record_outcome(Outcome::Lost, 15)]
        );
    }

    #[test]
    fn test_confirm_without_guess_is_rejected() {
        let state = playing(Difficulty::Normal, 1);
        assert!(matches!(
            transition(&state, Event::ConfirmGuess { correct: true }),
            Err(TransitionError::NoGuessPending)
        ));
    }

    #[test]
    fn test_undo_on_empty_history_is_noop() {
        let state = playing(Difficulty::Normal, 0);
        let result = apply(&state, Event::Undo);
        assert_eq!(result.new_state, state);
        assert!(result.effects.is_empty());

        let idle = Session::default();
        let result = apply(&idle, Event::Undo);
        assert_eq!(result.new_state, idle);
    }

    #[test]
    fn test_undo_requeries_with_shortened_history() {
        let state = playing(Difficulty::Normal, 3);
        let undoing = apply(&state, Event::Undo);

        assert_eq!(undoing.new_state.history.len(), 3);
        match &undoing.effects[..] {
            [Effect::RequestQuestion { request }] => assert_eq!(request.history.len(), 2),
            other => panic!("unexpected effects: {other:?}"),
        }

        let undone = apply(&undoing.new_state, question("Is it soft?")).new_state;
        assert_eq!(undone.history.len(), 2);
        assert_eq!(undone.current_question.as_deref(), Some("Is it soft?"));
        assert!(!undone.guess_pending);
    }

    #[test]
    fn test_undo_failure_restores_previous_state() {
        let state = playing(Difficulty::Normal, 3);
        let undoing = apply(&state, Event::Undo).new_state;
        let failed = apply(&undoing, network_failure()).new_state;

        assert_eq!(failed.history, state.history);
        assert_eq!(failed.current_question, state.current_question);
        assert_eq!(failed.error.as_ref().unwrap().message, UNDO_FAILED);
    }

    #[test]
    fn test_undo_clears_pending_guess_until_reply() {
        let state = playing(Difficulty::Normal, 2);
        let state = apply(&state, Event::Answer { answer: Answer::Yes }).new_state;
        let guessing = apply(&state, guess("Is it a cow?")).new_state;
        assert!(guessing.guess_pending);

        let undoing = apply(&guessing, Event::Undo).new_state;
        assert!(!undoing.guess_pending);
        assert!(undoing.is_busy());

        let undone = apply(&undoing, question("Does it live on a farm?")).new_state;
        assert!(!undone.guess_pending);
        assert_eq!(undone.history.len(), 2);

        // A failed re-query puts the guess back on screen
        let failed = apply(&undoing, network_failure()).new_state;
        assert!(failed.guess_pending);
        assert_eq!(failed.history, guessing.history);
        assert_eq!(failed.current_question, guessing.current_question);
    }

    #[test]
    fn test_give_up() {
        let state = playing(Difficulty::Easy, 7);
        let result = apply(&state, Event::GiveUp);
        assert_eq!(result.new_state.status, GameStatus::GaveUp);
        assert_eq!(
            result.effects,
            vec![Effect::record_outcome(Outcome::GaveUp, 7)]
        );

        assert!(matches!(
            transition(&result.new_state, Event::GiveUp),
            Err(TransitionError::NotPlaying(GameStatus::GaveUp))
        ));
    }

    #[test]
    fn test_terminal_states_only_leave_via_start_or_play_again() {
        let state = playing(Difficulty::Normal, 2);
        let over = apply(&state, Event::GiveUp).new_state;

        assert!(transition(&over, Event::Answer { answer: Answer::Yes }).is_err());
        assert!(transition(&over, Event::ConfirmGuess { correct: true }).is_err());
        assert!(transition(&over, Event::Undo).is_err());

        let reset = apply(&over, Event::PlayAgain).new_state;
        assert_eq!(reset, Session::idle(Difficulty::Normal));

        let restarted = apply(
            &over,
            Event::Start {
                difficulty: Difficulty::Easy,
            },
        );
        assert_eq!(restarted.new_state.status, GameStatus::Playing);
        assert!(restarted.new_state.history.is_empty());
    }

    #[test]
    fn test_play_again_rejected_mid_game() {
        let state = playing(Difficulty::Normal, 2);
        assert!(matches!(
            transition(&state, Event::PlayAgain),
            Err(TransitionError::GameInProgress)
        ));
    }

    #[test]
    fn test_stale_provider_event_is_rejected() {
        let state = playing(Difficulty::Normal, 2);
        assert!(matches!(
            transition(&state, question("late?")),
            Err(TransitionError::InvalidTransition(_))
        ));
        assert!(matches!(
            transition(&state, network_failure()),
            Err(TransitionError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_dismiss_error() {
        let state = playing(Difficulty::Normal, 1);
        let asked = apply(&state, Event::Answer { answer: Answer::Yes }).new_state;
        let failed = apply(
            &asked,
            Event::ProviderFailed {
                error: ProviderError::new(ProviderErrorKind::Provider, "quota"),
            },
        )
        .new_state;
        assert!(failed.error.is_some());

        let dismissed = apply(&failed, Event::DismissError).new_state;
        assert!(dismissed.error.is_none());
        assert_eq!(dismissed.history, failed.history);
    }
}
