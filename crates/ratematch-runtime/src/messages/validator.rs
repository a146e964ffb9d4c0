//! Validation of model-written messages.
//!
//! A message the model produced is only shown if it is non-empty, short, and
//! does not open with a sequencing word. Messages are displayed one at a time
//! in rotation, so "First, ..." or "Next, ..." would read wrong.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Longest message accepted, in characters.
pub const MAX_MESSAGE_CHARS: usize = 400;

lazy_static! {
    static ref SEQUENCING_OPENER: Regex = Regex::new(
        r"(?i)^\W*(to get started|to begin|to start|first(ly)?|second(ly)?|third(ly)?|next|then|finally|lastly|last but not least|after that|step \d+)\b"
    )
    .unwrap();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageValidationError {
    #[error("message is empty")]
    Empty,

    #[error("message is {length} characters, limit is {limit}")]
    TooLong { length: usize, limit: usize },

    #[error("message opens with sequencing phrase '{phrase}'")]
    SequencingOpener { phrase: String },
}

/// Checks a model-written message before it reaches the user.
#[derive(Debug, Clone)]
pub struct MessageValidator {
    max_chars: usize,
}

impl Default for MessageValidator {
    fn default() -> Self {
        Self {
            max_chars: MAX_MESSAGE_CHARS,
        }
    }
}

impl MessageValidator {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Trim `message` and validate it. Returns the trimmed text.
    pub fn validate(&self, message: &str) -> Result<String, MessageValidationError> {
        let trimmed = message.trim();

        if trimmed.is_empty() {
            return Err(MessageValidationError::Empty);
        }

        let length = trimmed.chars().count();
        if length > self.max_chars {
            return Err(MessageValidationError::TooLong {
                length,
                limit: self.max_chars,
            });
        }

        if let Some(captures) = SEQUENCING_OPENER.captures(trimmed) {
            let phrase = captures
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            return Err(MessageValidationError::SequencingOpener { phrase });
        }

        Ok(trimmed.to_string())
    }
}
