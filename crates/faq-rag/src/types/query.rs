//! Query request types

use serde::{Deserialize, Serialize};

/// Single-word greetings
const GREETING_WORDS: &[&str] = &["hi", "hello", "hey", "hiya", "greetings"];

/// Two-word greetings, matched as a pair
const GREETING_PHRASES: &[(&str, &str)] = &[
    ("good", "morning"),
    ("good", "afternoon"),
    ("good", "evening"),
];

/// Query request from the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,
}

impl QueryRequest {
    /// Create a new query request
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }

    /// Question with surrounding whitespace removed
    pub fn trimmed(&self) -> &str {
        self.question.trim()
    }

    /// True if the question holds no text at all
    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }

    /// True if the question is nothing but greetings
    ///
    /// Words are compared whole after stripping punctuation: "Hello!" is a
    /// greeting, "which plan" is not.
    pub fn is_greeting(&self) -> bool {
        let words: Vec<String> = self
            .question
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return false;
        }

        let mut i = 0;
        while i < words.len() {
            if GREETING_WORDS.contains(&words[i].as_str()) {
                i += 1;
                continue;
            }
            let pair = words
                .get(i + 1)
                .map(|next| (words[i].as_str(), next.as_str()));
            match pair {
                Some(pair) if GREETING_PHRASES.contains(&pair) => i += 2,
                _ => return false,
            }
        }
        true
    }
}
