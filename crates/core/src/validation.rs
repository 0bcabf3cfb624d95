use std::collections::HashMap;

use crate::model::{ErrorKind, ExpectedSentence, ValidationError, ValidationResult};
use crate::settings::ValidationRules;
use crate::text::{self, Token};

/// Grades typed sentences against an [`ExpectedSentence`].
///
/// Stateless: identical arguments always give identical results.
///
/// # Examples
///
/// ```
/// # use soap_core::model::{ErrorKind, SentenceDraft};
/// # use soap_core::validation::validate;
/// let expected = SentenceDraft::from_tokens(["the", "dog", "sat"]).validate()?;
/// let result = validate("the cat sat", &expected);
///
/// assert!(!result.is_correct);
/// assert_eq!(result.errors.len(), 1);
/// assert_eq!(result.errors[0].kind, ErrorKind::SpellingError);
/// assert_eq!(result.errors[0].position, 1);
/// # Ok::<(), soap_core::model::SentenceError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SentenceValidator {
    rules: ValidationRules,
}

/// Grade `input` with the default rules.
#[must_use]
pub fn validate(input: &str, expected: &ExpectedSentence) -> ValidationResult {
    SentenceValidator::default().validate(input, expected)
}

impl SentenceValidator {
    #[must_use]
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    #[must_use]
    pub fn validate(&self, input: &str, expected: &ExpectedSentence) -> ValidationResult {
        let keep_marks = expected.punctuation_required();
        let normalized_input = text::normalize_text(input, keep_marks);
        let normalized_expected = text::normalize_text(expected.text(), keep_marks);

        let expected_tokens = text::tokenize(&text::fold(&expected.tokens().join(" ")));
        if expected_tokens.is_empty() {
            return ValidationResult {
                is_correct: true,
                errors: Vec::new(),
                normalized_input,
                normalized_expected,
                elapsed: None,
            };
        }

        let input_tokens = text::tokenize(&text::fold(input));
        let mut errors = if input_tokens.is_empty() {
            expected_tokens.iter().map(missing_word).collect()
        } else {
            let mut found = if expected.exact_order_required() {
                self.compare_in_order(&input_tokens, &expected_tokens)
            } else {
                compare_unordered(&input_tokens, &expected_tokens)
            };
            if keep_marks {
                found.extend(punctuation_errors(
                    &input_tokens,
                    &expected_tokens,
                    expected.exact_order_required(),
                ));
            }
            found
        };

        errors.sort_by_key(|e| (e.position, e.kind));

        let grammar_ok =
            !expected.exact_grammar_required() || normalized_input == normalized_expected;
        let is_correct = errors.is_empty() && grammar_ok;

        tracing::trace!(
            errors = errors.len(),
            is_correct,
            exact_order = expected.exact_order_required(),
            "validated sentence"
        );

        ValidationResult {
            is_correct,
            errors,
            normalized_input,
            normalized_expected,
            elapsed: None,
        }
    }

    fn compare_in_order(&self, input: &[Token], expected: &[Token]) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for i in 0..input.len().max(expected.len()) {
            match (input.get(i), expected.get(i)) {
                (Some(got), Some(want)) if got.text == want.text => {}
                (Some(got), Some(want)) => errors.push(self.substitution(i, got, want)),
                (None, Some(want)) => errors.push(missing_word(want)),
                (Some(got), None) => errors.push(extra_word(got)),
                (None, None) => {}
            }
        }
        errors
    }

    // Near misses and unrelated words share one kind; only the message differs.
    fn substitution(&self, position: usize, got: &Token, want: &Token) -> ValidationError {
        let distance = strsim::levenshtein(&got.text, &want.text);
        let message = if distance <= self.rules.near_miss_distance() {
            format!("Spelling error: \"{}\" instead of \"{}\"", got.text, want.text)
        } else {
            format!("Wrong word: \"{}\" instead of \"{}\"", got.text, want.text)
        };
        ValidationError {
            kind: ErrorKind::SpellingError,
            position,
            expected: Some(want.text.clone()),
            actual: Some(got.text.clone()),
            message,
        }
    }
}

fn missing_word(want: &Token) -> ValidationError {
    ValidationError {
        kind: ErrorKind::MissingWord,
        position: want.position,
        expected: Some(want.text.clone()),
        actual: None,
        message: format!("Missing word: \"{}\"", want.text),
    }
}

fn extra_word(got: &Token) -> ValidationError {
    ValidationError {
        kind: ErrorKind::ExtraWord,
        position: got.position,
        expected: None,
        actual: Some(got.text.clone()),
        message: format!("Unexpected word: \"{}\"", got.text),
    }
}

fn counts(tokens: &[Token]) -> HashMap<&str, usize> {
    let mut map = HashMap::new();
    for token in tokens {
        *map.entry(token.text.as_str()).or_insert(0) += 1;
    }
    map
}

// Later duplicates are the ones reported when an occurrence is short.
fn compare_unordered(input: &[Token], expected: &[Token]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut available = counts(input);
    for want in expected {
        match available.get_mut(want.text.as_str()) {
            Some(n) if *n > 0 => *n -= 1,
            _ => errors.push(missing_word(want)),
        }
    }

    let mut wanted = counts(expected);
    for got in input {
        match wanted.get_mut(got.text.as_str()) {
            Some(n) if *n > 0 => *n -= 1,
            _ => errors.push(extra_word(got)),
        }
    }

    if errors.is_empty() {
        if let Some((got, want)) = input
            .iter()
            .zip(expected)
            .find(|(got, want)| got.text != want.text)
        {
            errors.push(ValidationError {
                kind: ErrorKind::WrongOrder,
                position: want.position,
                expected: Some(want.text.clone()),
                actual: Some(got.text.clone()),
                message: format!("Word order differs: \"{}\" is out of place", got.text),
            });
        }
    }

    errors
}

/// Every expected mark must appear on the learner's matching token.
///
/// The terminal marks of the sentence are always compared with the learner's
/// last token, whatever happened to the words before it.
fn punctuation_errors(
    input: &[Token],
    expected: &[Token],
    exact_order: bool,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut used = vec![false; input.len()];
    let last = expected.len().saturating_sub(1);

    for want in expected {
        if want.marks.is_empty() {
            continue;
        }

        let counterpart = if want.position == last {
            input.last()
        } else if exact_order {
            input.get(want.position)
        } else {
            let matched = input
                .iter()
                .position(|got| !used[got.position] && got.text == want.text);
            match matched {
                Some(i) => {
                    used[i] = true;
                    input.get(i)
                }
                None => input.get(want.position),
            }
        };

        let mut pool: Vec<char> = counterpart
            .map(|t| t.marks.chars().collect())
            .unwrap_or_default();
        for mark in want.marks.chars() {
            match pool.iter().position(|c| *c == mark) {
                Some(i) => {
                    pool.remove(i);
                }
                None => errors.push(ValidationError {
                    kind: ErrorKind::MissingPunctuation,
                    position: want.position,
                    expected: Some(mark.to_string()),
                    actual: counterpart
                        .filter(|t| !t.marks.is_empty())
                        .map(|t| t.marks.clone()),
                    message: format!("Missing punctuation: \"{mark}\" after \"{}\"", want.text),
                }),
            }
        }
    }

    errors
}
