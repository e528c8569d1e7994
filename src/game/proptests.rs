//! Property-based tests for the turn controller
//!
//! These tests drive the transition function with arbitrary event sequences
//! and check that the session invariants hold after every step.

use super::state::*;
use super::stats::{apply_outcome, Stats};
use super::transition::*;
use super::{Effect, Event};
use crate::question::{ProviderError, ProviderErrorKind, QuestionReply};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Normal),
        Just(Difficulty::Hard),
    ]
}

fn arb_answer() -> impl Strategy<Value = Answer> {
    prop_oneof![Just(Answer::Yes), Just(Answer::No), Just(Answer::Maybe)]
}

fn arb_error_kind() -> impl Strategy<Value = ProviderErrorKind> {
    prop_oneof![
        Just(ProviderErrorKind::Configuration),
        Just(ProviderErrorKind::Transport),
        Just(ProviderErrorKind::Provider),
        Just(ProviderErrorKind::InvalidReply),
    ]
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![Just(Outcome::Won), Just(Outcome::Lost), Just(Outcome::GaveUp)]
}

fn arb_reply() -> impl Strategy<Value = QuestionReply> {
    // Mostly plain questions, some guesses, occasionally blank text
    (
        prop_oneof![
            6 => "Is it [a-z]{3,10}\\?".prop_map(String::from),
            1 => Just("  ".to_string()),
        ],
        prop::bool::weighted(0.2),
    )
        .prop_map(|(question, is_guess)| QuestionReply { question, is_guess })
}

fn arb_user_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        6 => arb_answer().prop_map(|answer| Event::Answer { answer }),
        2 => any::<bool>().prop_map(|correct| Event::ConfirmGuess { correct }),
        1 => Just(Event::Undo),
        1 => Just(Event::GiveUp),
        1 => Just(Event::PlayAgain),
        1 => Just(Event::DismissError),
        1 => arb_difficulty().prop_map(|difficulty| Event::Start { difficulty }),
    ]
}

fn arb_provider_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        5 => arb_reply().prop_map(|reply| Event::QuestionReceived { reply }),
        1 => ("[a-z ]{1,20}", arb_error_kind()).prop_map(|(message, kind)| {
            Event::ProviderFailed {
                error: ProviderError::new(kind, message),
            }
        }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![arb_user_event(), arb_provider_event()]
}

// ============================================================================
// Invariant Checkers
// ============================================================================

fn history_is_valid(state: &Session) -> bool {
    state.history.len() <= state.max_questions()
        && state
            .history
            .iter()
            .enumerate()
            .all(|(i, qa)| qa.question_number == i + 1)
}

fn effects_are_valid(effects: &[Effect], old: &Session, new: &Session) -> bool {
    let requests = effects
        .iter()
        .filter(|e| matches!(e, Effect::RequestQuestion { .. }))
        .count();
    let outcomes = effects
        .iter()
        .filter(|e| matches!(e, Effect::RecordOutcome { .. }))
        .count();

    // A provider call is made exactly when a request becomes outstanding
    let request_ok = requests == usize::from(new.is_busy() && !old.is_busy());

    // Stats are recorded exactly when a game ends
    let finished = new.status.is_terminal() && !old.status.is_terminal();
    let outcome_ok = outcomes == usize::from(finished);

    request_ok && outcome_ok && requests + outcomes <= 1
}

/// Run a sequence of events, dropping rejected ones
fn run(start: Difficulty, events: Vec<Event>) -> Vec<(Session, TransitionResult)> {
    let mut state = Session::default();
    let mut steps = Vec::new();
    let first = transition(&state, Event::Start { difficulty: start }).unwrap();
    state = first.new_state.clone();
    steps.push((Session::default(), first));

    for event in events {
        if let Ok(result) = transition(&state, event) {
            let old = std::mem::replace(&mut state, result.new_state.clone());
            steps.push((old, result));
        }
    }
    steps
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_history_never_exceeds_budget(
        difficulty in arb_difficulty(),
        events in proptest::collection::vec(arb_event(), 0..120),
    ) {
        for (_, result) in run(difficulty, events) {
            prop_assert!(history_is_valid(&result.new_state));
            if let Some(PendingRequest::Answer { candidate } | PendingRequest::Undo { candidate, .. }) =
                &result.new_state.pending
            {
                prop_assert!(candidate.len() <= result.new_state.max_questions());
            }
        }
    }

    #[test]
    fn prop_effects_match_state_changes(
        difficulty in arb_difficulty(),
        events in proptest::collection::vec(arb_event(), 0..120),
    ) {
        for (old, result) in run(difficulty, events) {
            prop_assert!(
                effects_are_valid(&result.effects, &old, &result.new_state),
                "effects {:?} from {:?} to {:?}",
                result.effects,
                old.status,
                result.new_state.status
            );
        }
    }

    #[test]
    fn prop_terminal_states_are_sticky(
        difficulty in arb_difficulty(),
        events in proptest::collection::vec(arb_event(), 0..120),
    ) {
        for (old, result) in run(difficulty, events) {
            if old.status.is_terminal() {
                // Only play-again or a fresh start leave a finished game
                let left = result.new_state.status != old.status;
                prop_assert!(
                    !left
                        || result.new_state.status == GameStatus::Idle
                        || (result.new_state.status == GameStatus::Playing
                            && result.new_state.history.is_empty())
                );
                let recorded = result
                    .effects
                    .iter()
                    .any(|e| matches!(e, Effect::RecordOutcome { .. }));
                prop_assert!(!recorded, "outcome recorded after game end");
            }
        }
    }

    #[test]
    fn prop_provider_failure_never_commits(
        difficulty in arb_difficulty(),
        events in proptest::collection::vec(arb_event(), 0..120),
        error_kind in arb_error_kind(),
    ) {
        for (_, result) in run(difficulty, events) {
            let state = &result.new_state;
            if matches!(
                state.pending,
                Some(PendingRequest::Answer { .. } | PendingRequest::Undo { .. })
            ) {
                let failed = transition(
                    state,
                    Event::ProviderFailed { error: ProviderError::new(error_kind, "boom") },
                )
                .unwrap();
                prop_assert_eq!(&failed.new_state.history, &state.history);
                prop_assert_eq!(failed.new_state.status, state.status);
                prop_assert!(!failed.new_state.is_busy());
                prop_assert!(failed.new_state.error.is_some());
            }
        }
    }

    #[test]
    fn prop_busy_session_rejects_user_intents(
        difficulty in arb_difficulty(),
        events in proptest::collection::vec(arb_event(), 0..60),
        intent in arb_user_event(),
    ) {
        for (_, result) in run(difficulty, events) {
            let state = &result.new_state;
            if state.is_busy() {
                let outcome = transition(state, intent.clone());
                match intent {
                    Event::DismissError => prop_assert!(outcome.is_ok()),
                    Event::Undo if state.history.is_empty() => prop_assert!(outcome.is_ok()),
                    Event::ConfirmGuess { .. } | Event::Answer { .. } | Event::Undo
                    | Event::GiveUp | Event::PlayAgain | Event::Start { .. } => {
                        prop_assert_eq!(outcome.err(), Some(TransitionError::Busy));
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn prop_stats_counters_monotonic(
        outcomes in proptest::collection::vec((arb_outcome(), 0usize..=25), 0..50),
    ) {
        let mut stats = Stats::default();
        for (outcome, count) in outcomes {
            let next = apply_outcome(&stats, outcome, count);
            prop_assert_eq!(next.games_played, stats.games_played + 1);
            prop_assert!(next.games_won >= stats.games_won);
            prop_assert!(next.games_won <= next.games_played);
            prop_assert!(next.average_questions >= 0.0 && next.average_questions <= 25.0);
            stats = next;
        }
    }
}
