use serde::Serialize;
use thiserror::Error;

use crate::text::{fold, is_punctuation, tokenize};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SentenceError {
    #[error("expected token {index} is blank")]
    BlankToken { index: usize },

    #[error("expected tokens do not spell the expected text")]
    TokensDoNotMatchText,
}

/// Unvalidated sentence definition as authored in an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SentenceDraft {
    pub expected: Option<String>,
    pub tokens: Vec<String>,
    pub punctuation_required: bool,
    pub exact_order_required: bool,
    pub exact_grammar_required: bool,
}

/// Sentence the learner is asked to type, with its grading flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectedSentence {
    text: String,
    tokens: Vec<String>,
    punctuation_required: bool,
    exact_order_required: bool,
    exact_grammar_required: bool,
}

impl SentenceDraft {
    /// Draft from a token list, comparing in exact order and ignoring punctuation.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expected: None,
            tokens: tokens.into_iter().map(Into::into).collect(),
            punctuation_required: false,
            exact_order_required: true,
            exact_grammar_required: false,
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.expected = Some(text.into());
        self
    }

    #[must_use]
    pub fn punctuation_required(mut self, required: bool) -> Self {
        self.punctuation_required = required;
        self
    }

    #[must_use]
    pub fn exact_order_required(mut self, required: bool) -> Self {
        self.exact_order_required = required;
        self
    }

    #[must_use]
    pub fn exact_grammar_required(mut self, required: bool) -> Self {
        self.exact_grammar_required = required;
        self
    }

    /// Validate the draft into an `ExpectedSentence`.
    ///
    /// A missing text is rendered from the tokens. An empty token list is
    /// accepted; such a sentence grades every input as correct.
    ///
    /// # Errors
    ///
    /// - `BlankToken` if any token is empty after trimming
    /// - `TokensDoNotMatchText` if the tokens spell different words (or, when
    ///   punctuation is required, different marks) than the text
    pub fn validate(self) -> Result<ExpectedSentence, SentenceError> {
        let mut tokens = Vec::with_capacity(self.tokens.len());
        for (index, token) in self.tokens.into_iter().enumerate() {
            let trimmed = token.trim();
            if trimmed.is_empty() {
                return Err(SentenceError::BlankToken { index });
            }
            tokens.push(trimmed.to_string());
        }

        let text = match self.expected {
            Some(text) if !text.trim().is_empty() => text,
            _ => render_tokens(&tokens),
        };

        if !tokens.is_empty() {
            let from_text = tokenize(&fold(&text));
            let from_tokens = tokenize(&fold(&tokens.join(" ")));
            let same_words = from_text.len() == from_tokens.len()
                && from_text.iter().zip(&from_tokens).all(|(a, b)| {
                    a.text == b.text && (!self.punctuation_required || a.marks == b.marks)
                });
            if !same_words {
                return Err(SentenceError::TokensDoNotMatchText);
            }
        }

        Ok(ExpectedSentence {
            text,
            tokens,
            punctuation_required: self.punctuation_required,
            exact_order_required: self.exact_order_required,
            exact_grammar_required: self.exact_grammar_required,
        })
    }
}

// Join tokens with spaces, gluing punctuation-only tokens to the word before them.
fn render_tokens(tokens: &[String]) -> String {
    let mut out = String::new();
    for token in tokens {
        let glue = !out.is_empty() && token.chars().all(is_punctuation);
        if !out.is_empty() && !glue {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}

impl ExpectedSentence {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[must_use]
    pub fn punctuation_required(&self) -> bool {
        self.punctuation_required
    }

    #[must_use]
    pub fn exact_order_required(&self) -> bool {
        self.exact_order_required
    }

    #[must_use]
    pub fn exact_grammar_required(&self) -> bool {
        self.exact_grammar_required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_rendered_from_tokens() {
        let sentence = SentenceDraft::from_tokens(["המטופל", "מתלונן", "על", "כאב", "."])
            .validate()
            .unwrap();
        assert_eq!(sentence.text(), "המטופל מתלונן על כאב.");
        assert_eq!(sentence.tokens().len(), 5);
    }

    #[test]
    fn blank_token_is_rejected() {
        let err = SentenceDraft::from_tokens(["a", "  ", "b"])
            .validate()
            .unwrap_err();
        assert_eq!(err, SentenceError::BlankToken { index: 1 });
    }

    #[test]
    fn mismatched_text_is_rejected() {
        let err = SentenceDraft::from_tokens(["the", "dog"])
            .with_text("the cat")
            .validate()
            .unwrap_err();
        assert_eq!(err, SentenceError::TokensDoNotMatchText);
    }

    #[test]
    fn marks_only_matter_when_punctuation_is_required() {
        let loose = SentenceDraft::from_tokens(["the", "cat"])
            .with_text("The cat!")
            .validate();
        assert!(loose.is_ok());

        let strict = SentenceDraft::from_tokens(["the", "cat"])
            .with_text("The cat!")
            .punctuation_required(true)
            .validate();
        assert_eq!(strict.unwrap_err(), SentenceError::TokensDoNotMatchText);
    }

    #[test]
    fn empty_sentence_is_accepted() {
        let sentence = SentenceDraft::default().validate().unwrap();
        assert!(sentence.tokens().is_empty());
        assert_eq!(sentence.text(), "");
    }
}
