//! Autoplay - plays scripted games against a running server
//!
//! Each built-in item answers questions from a keyword table, so a full
//! game can be exercised end to end without a human at the keyboard.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "autoplay", about = "Play scripted 20 Questions games against a server")]
struct Args {
    /// Server base URL
    #[arg(long, default_value = "http://localhost:3000")]
    base_url: String,

    /// Item to play (repeatable); defaults to every built-in item
    #[arg(long = "item")]
    items: Vec<String>,

    /// Questions allowed per game
    #[arg(long, default_value_t = 20)]
    max_questions: usize,
}

/// A thing the player can be thinking of
struct Item {
    name: &'static str,
    /// First keyword contained in the question decides the answer
    answers: &'static [(&'static str, &'static str)],
}

const ITEMS: &[Item] = &[
    Item {
        name: "apple",
        answers: &[
            ("apple", "yes"),
            ("fruit", "yes"),
            ("food", "yes"),
            ("eat", "yes"),
            ("plant", "yes"),
            ("tree", "yes"),
            ("red", "yes"),
            ("round", "yes"),
            ("sweet", "yes"),
            ("natural", "yes"),
            ("grow", "yes"),
            ("alive", "maybe"),
            ("living", "maybe"),
            ("animal", "no"),
            ("vegetable", "no"),
            ("man-made", "no"),
            ("made by", "no"),
            ("machine", "no"),
            ("bigger", "no"),
            ("larger", "no"),
            ("electronic", "no"),
        ],
    },
    Item {
        name: "truck",
        answers: &[
            ("truck", "yes"),
            ("vehicle", "yes"),
            ("wheels", "yes"),
            ("drive", "yes"),
            ("road", "yes"),
            ("transport", "yes"),
            ("engine", "yes"),
            ("man-made", "yes"),
            ("made by", "yes"),
            ("machine", "yes"),
            ("metal", "yes"),
            ("bigger", "yes"),
            ("larger", "yes"),
            ("car", "maybe"),
            ("alive", "no"),
            ("living", "no"),
            ("animal", "no"),
            ("food", "no"),
            ("eat", "no"),
            ("natural", "no"),
            ("fly", "no"),
            ("water", "no"),
        ],
    },
    Item {
        name: "cow",
        answers: &[
            ("cow", "yes"),
            ("animal", "yes"),
            ("alive", "yes"),
            ("living", "yes"),
            ("mammal", "yes"),
            ("farm", "yes"),
            ("milk", "yes"),
            ("legs", "yes"),
            ("four", "yes"),
            ("natural", "yes"),
            ("bigger", "yes"),
            ("larger", "yes"),
            ("grass", "yes"),
            ("pet", "no"),
            ("wild", "no"),
            ("fly", "no"),
            ("water", "no"),
            ("man-made", "no"),
            ("made by", "no"),
            ("machine", "no"),
        ],
    },
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRequest<'a> {
    history: &'a [QuestionAnswer],
    max_questions: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionAnswer {
    question_number: usize,
    question: String,
    answer: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionReply {
    question: String,
    is_guess: bool,
}

#[derive(Debug, PartialEq)]
enum GameResult {
    Won { questions: usize },
    Lost { questions: usize },
    Failed(String),
}

impl Item {
    fn answer(&self, question: &str) -> &'static str {
        let question = question.to_lowercase();
        if let Some(&(_, answer)) = self
            .answers
            .iter()
            .find(|&&(keyword, _)| question.contains(keyword))
        {
            return answer;
        }
        if question.contains("is it a ") || question.contains("is it an ") {
            "no"
        } else {
            "maybe"
        }
    }

    fn is_named_in(&self, guess: &str) -> bool {
        guess.to_lowercase().contains(self.name)
    }
}

fn ask(agent: &ureq::Agent, base_url: &str, request: &QuestionRequest<'_>) -> Result<QuestionReply, String> {
    let url = format!("{}/api/question", base_url.trim_end_matches('/'));
    match agent.post(&url).send_json(request) {
        Ok(response) => response
            .into_json()
            .map_err(|e| format!("invalid reply: {e}")),
        Err(ureq::Error::Status(code, response)) => {
            let body = response.into_string().unwrap_or_default();
            Err(format!("HTTP {code}: {body}"))
        }
        Err(e) => Err(e.to_string()),
    }
}

fn play(agent: &ureq::Agent, base_url: &str, item: &Item, max_questions: usize) -> GameResult {
    let mut history: Vec<QuestionAnswer> = Vec::new();

    while history.len() < max_questions {
        let reply = match ask(
            agent,
            base_url,
            &QuestionRequest {
                history: &history,
                max_questions,
            },
        ) {
            Ok(reply) => reply,
            Err(e) => return GameResult::Failed(e),
        };

        println!("  Q{}: {}", history.len() + 1, reply.question);

        if reply.is_guess && item.is_named_in(&reply.question) {
            println!("  A: yes, you got it!");
            return GameResult::Won {
                questions: history.len() + 1,
            };
        }

        let answer = if reply.is_guess {
            "no"
        } else {
            item.answer(&reply.question)
        };
        println!("  A: {answer}");
        history.push(QuestionAnswer {
            question_number: history.len() + 1,
            question: reply.question,
            answer,
        });
    }

    GameResult::Lost {
        questions: history.len(),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let items: Vec<&Item> = if args.items.is_empty() {
        ITEMS.iter().collect()
    } else {
        let mut selected = Vec::new();
        for name in &args.items {
            match ITEMS.iter().find(|item| item.name.eq_ignore_ascii_case(name)) {
                Some(item) => selected.push(item),
                None => {
                    let known: Vec<_> = ITEMS.iter().map(|item| item.name).collect();
                    eprintln!("Unknown item {name:?}; known items: {}", known.join(", "));
                    return ExitCode::FAILURE;
                }
            }
        }
        selected
    };

    let agent = ureq::AgentBuilder::new()
        .timeout(std::time::Duration::from_secs(120))
        .build();

    let mut failed = false;
    let mut results = Vec::new();
    for item in items {
        println!("Playing with {:?}", item.name);
        let result = play(&agent, &args.base_url, item, args.max_questions);
        failed |= matches!(result, GameResult::Failed(_));
        results.push((item.name, result));
    }

    println!();
    for (name, result) in &results {
        match result {
            GameResult::Won { questions } => println!("{name:>8}: won in {questions} questions"),
            GameResult::Lost { questions } => println!("{name:>8}: lost after {questions} questions"),
            GameResult::Failed(e) => println!("{name:>8}: error: {e}"),
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
