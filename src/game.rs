//! Turn controller for a game of 20 Questions
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the controller never performs I/O itself, it returns effects that the
//! runtime executes and feeds back as events.

mod effect;
pub mod event;
pub mod state;
pub mod stats;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{Answer, Difficulty, GameStatus, Outcome, QuestionAnswer, Session};
pub use stats::{apply_outcome, Stats};
pub use transition::{transition, TransitionError};
