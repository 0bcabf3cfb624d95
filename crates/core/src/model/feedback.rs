use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown error kind: {0}")]
pub struct UnknownErrorKind(pub String);

/// Category of a token-level mistake.
///
/// Declaration order is the tie-break order when two errors share a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingWord,
    ExtraWord,
    WrongOrder,
    SpellingError,
    MissingPunctuation,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::MissingWord,
        ErrorKind::ExtraWord,
        ErrorKind::WrongOrder,
        ErrorKind::SpellingError,
        ErrorKind::MissingPunctuation,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingWord => "missing_word",
            ErrorKind::ExtraWord => "extra_word",
            ErrorKind::WrongOrder => "wrong_order",
            ErrorKind::SpellingError => "spelling_error",
            ErrorKind::MissingPunctuation => "missing_punctuation",
        }
    }

    /// Learner-facing name of the error kind.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::MissingWord => "מילה חסרה (missing word)",
            ErrorKind::ExtraWord => "מילה מיותרת (extra word)",
            ErrorKind::WrongOrder => "סדר מילים שגוי (wrong word order)",
            ErrorKind::SpellingError => "שגיאת כתיב (spelling error)",
            ErrorKind::MissingPunctuation => "פיסוק חסר (missing punctuation)",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = UnknownErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| UnknownErrorKind(s.trim().to_string()))
    }
}

/// One detected mistake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub kind: ErrorKind,
    /// Token index the error refers to. Missing words and punctuation point
    /// into the expected sequence, extra words into the input sequence.
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    pub message: String,
}

/// Outcome of grading one typed sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_correct: bool,
    pub errors: Vec<ValidationError>,
    pub normalized_input: String,
    pub normalized_expected: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<Duration>,
}

impl ValidationResult {
    /// Attach the time the learner spent on the sentence.
    #[must_use]
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    /// Kind of every error, in result order (duplicates kept).
    #[must_use]
    pub fn error_kinds(&self) -> Vec<ErrorKind> {
        self.errors.iter().map(|e| e.kind).collect()
    }

    #[must_use]
    pub fn count_of(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_order_by_declaration() {
        let mut kinds = vec![
            ErrorKind::MissingPunctuation,
            ErrorKind::WrongOrder,
            ErrorKind::MissingWord,
        ];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::MissingWord,
                ErrorKind::WrongOrder,
                ErrorKind::MissingPunctuation
            ]
        );
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::SpellingError).unwrap();
        assert_eq!(json, "\"spelling_error\"");
        assert_eq!(
            "missing_punctuation".parse::<ErrorKind>().unwrap(),
            ErrorKind::MissingPunctuation
        );
        assert!("typo".parse::<ErrorKind>().is_err());
    }
}
