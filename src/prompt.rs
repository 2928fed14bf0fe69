//! Prompt loading and tweet-length handling.
//!
//! The persona prompt is plain data: it ships embedded from `prompts/persona.txt` and can be
//! replaced at runtime by pointing `PROMPT_FILE` at another file.

use log::{error, info};

use crate::config::{Environment, PROMPT_FILE};
use crate::error::BotError;

/// Maximum length of a published tweet, in characters.
pub const MAX_TWEET_CHARS: usize = 280;

const DEFAULT_PROMPT: &str = include_str!("../prompts/persona.txt");

/// The prompt sent to the generation model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    /// Wraps literal prompt text.
    pub fn new(text: impl Into<String>) -> Self {
        Prompt(text.into())
    }

    /// Loads the prompt named by `PROMPT_FILE`, or the built-in persona prompt.
    pub fn from_environment(env: &Environment) -> Result<Self, BotError> {
        match env.get(PROMPT_FILE) {
            Some(path) => {
                info!("Loading prompt from {}", path);
                std::fs::read_to_string(path)
                    .map(Prompt)
                    .map_err(|source| {
                        error!("Failed to read prompt file {}: {}", path, source);
                        BotError::Prompt {
                            path: path.to_string(),
                            source,
                        }
                    })
            }
            None => Ok(Prompt::default()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Prompt(DEFAULT_PROMPT.to_string())
    }
}

/// Truncates `text` to at most `max_chars` Unicode scalar values.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_text() {
        let text = "A".repeat(300);
        let truncated = truncate_chars(&text, MAX_TWEET_CHARS);
        assert_eq!(truncated, "A".repeat(280));
    }

    #[test]
    fn test_truncate_short_text_is_unchanged() {
        assert_eq!(truncate_chars("short tweet", MAX_TWEET_CHARS), "short tweet");
        assert_eq!(truncate_chars("", MAX_TWEET_CHARS), "");
        let exact = "b".repeat(280);
        assert_eq!(truncate_chars(&exact, MAX_TWEET_CHARS), exact);
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let text = "🚀".repeat(281);
        let truncated = truncate_chars(&text, MAX_TWEET_CHARS);
        assert_eq!(truncated.chars().count(), 280);
        assert_eq!(truncated.len(), 280 * '🚀'.len_utf8());
    }

    #[test]
    fn test_default_prompt_has_persona_and_examples() {
        let prompt = Prompt::default();
        assert!(prompt.as_str().starts_with("Generate a tweet in the style of Om Bhojane"));
        for n in 1..=5 {
            assert!(prompt.as_str().contains(&format!("{}:", n)));
        }
    }

    #[test]
    fn test_missing_prompt_file_is_an_error() {
        let env = Environment::from_pairs([(PROMPT_FILE, "/nonexistent/botx/prompt.txt")]);
        let err = Prompt::from_environment(&env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to load prompt from /nonexistent/botx/prompt.txt"
        );
    }
}
