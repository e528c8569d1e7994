//! Prompt construction and reply interpretation for the question asker
//!
//! The model gets a fixed persona/strategy system prompt plus a per-turn
//! prompt listing every answered question. Its reply is either a narrowing
//! question or a final guess.

use crate::question::{ProviderError, QuestionReply, QuestionRequest};
use std::fmt::Write;

/// Marker the model is told to put in front of a final guess
pub const GUESS_MARKER: &str = "GUESS:";

/// Persona phrasing that also signals a guess
const GUESS_PHRASE: &str = "i think i've got it";

/// Upper bound on the reply; questions are one sentence
pub const MAX_OUTPUT_TOKENS: u32 = 150;

pub const TEMPERATURE: f32 = 0.7;

/// Fixed system prompt: a friendly host for young players backed by a
/// systematic questioning strategy
pub const SYSTEM_PROMPT: &str = r#"You are hosting a game of "20 Questions" for a young child. The child thinks of something and you try to work out what it is by asking yes/no questions.

How you talk:
- Be cheerful, warm and encouraging. Keep sentences short and words simple.
- If a harder word is unavoidable, explain it right away in plain words, for example: "Is it a mammal? That's an animal that drinks milk from its mommy, like a puppy!"
- Make the game fun.

How you play:
- Work like an expert: start broad and narrow down step by step.
- Good early splits: real thing or idea, natural or made by people, alive or not, bigger or smaller than a car, what it is used for.
- Every question must follow from the answers so far. If the child says "yes" to "Is it alive?", keep asking about living things.
- The child may make mistakes. After about ten questions, briefly check what you know so far. If answers contradict each other, ask a gentle question to clear it up.
- "maybe" means the child is not sure; do not rely on it.
- Once you have a strong candidate (usually around question 15, earlier if you are sure), make a guess.

Output rules:
- Reply with exactly ONE yes/no question and nothing else.
- When you make a final guess, start the line with "GUESS:" and ask about one specific thing, for example: GUESS: I think I've got it! Is it a banana?"#;

/// Build the per-turn prompt from the answered questions
pub fn build_turn_prompt(request: &QuestionRequest) -> String {
    let mut prompt = String::new();

    if !request.history.is_empty() {
        prompt.push_str("Previous questions and answers:\n");
        for qa in &request.history {
            let _ = writeln!(prompt, "Q{}: {}", qa.question_number, qa.question);
            let _ = writeln!(prompt, "A: {}", qa.answer);
        }
        prompt.push('\n');
    }

    let _ = writeln!(
        prompt,
        "You have {} questions remaining out of {} total.",
        request.questions_remaining(),
        request.max_questions
    );
    prompt.push('\n');

    if request.history.is_empty() {
        prompt.push_str(
            "Ask your first question to begin narrowing down what the player is thinking of.\n",
        );
    } else {
        prompt.push_str("Based on the answers so far, ask your next question.\n");
    }

    prompt.push_str(
        "\nRemember: ask only ONE clear yes/no question. If you are confident, make a specific guess and start it with \"GUESS:\".",
    );
    prompt
}

/// Interpret raw model text as a question or a guess
pub fn parse_reply(text: &str) -> Result<QuestionReply, ProviderError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ProviderError::invalid_reply(
            "Provider returned an empty question",
        ));
    }

    if let Some(rest) = strip_marker(text) {
        let guess = rest.trim();
        if guess.is_empty() {
            return Err(ProviderError::invalid_reply(
                "Provider returned an empty guess",
            ));
        }
        return Ok(QuestionReply::guess(guess));
    }

    Ok(QuestionReply {
        question: text.to_string(),
        is_guess: text
            .to_lowercase()
            .replace('\u{2019}', "'")
            .contains(GUESS_PHRASE),
    })
}

/// Strip a leading guess marker, ignoring case and stray markdown emphasis
fn strip_marker(line: &str) -> Option<&str> {
    let unstyled = line.trim_start_matches(['*', '_']).trim_start();
    let head = unstyled.get(..GUESS_MARKER.len())?;
    if head.eq_ignore_ascii_case(GUESS_MARKER) {
        unstyled
            .get(GUESS_MARKER.len()..)
            .map(|rest| rest.trim_start_matches(['*', '_']))
    } else {
        None
    }
}
