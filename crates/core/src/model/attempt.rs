use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::{ErrorKind, ExerciseId, Section, ValidationResult};

/// One graded submission, as fed into progress aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseAttempt {
    pub exercise_id: ExerciseId,
    pub section: Section,
    pub timestamp: DateTime<Utc>,
    pub is_correct: bool,
    pub time_taken: Duration,
    pub error_kinds: Vec<ErrorKind>,
}

impl ExerciseAttempt {
    /// Derive an attempt from a validation result. Missing elapsed time counts as zero.
    #[must_use]
    pub fn from_result(
        exercise_id: ExerciseId,
        section: Section,
        timestamp: DateTime<Utc>,
        result: &ValidationResult,
    ) -> Self {
        Self {
            exercise_id,
            section,
            timestamp,
            is_correct: result.is_correct,
            time_taken: result.elapsed.unwrap_or_default(),
            error_kinds: result.error_kinds(),
        }
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_kinds.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SentenceDraft;
    use crate::time::fixed_now;
    use crate::validation::validate;

    #[test]
    fn attempt_carries_every_error_of_the_result() {
        let expected = SentenceDraft::from_tokens(["כאב", "ראש", "חזק"])
            .validate()
            .unwrap();
        let result = validate("כאב בטן חזק מאוד", &expected)
            .with_elapsed(Duration::from_secs(17));

        let attempt = ExerciseAttempt::from_result(
            ExerciseId::new("S-002").unwrap(),
            Section::Subjective,
            fixed_now(),
            &result,
        );

        assert!(!attempt.is_correct);
        assert_eq!(attempt.time_taken, Duration::from_secs(17));
        assert_eq!(
            attempt.error_kinds,
            vec![ErrorKind::SpellingError, ErrorKind::ExtraWord]
        );
        assert_eq!(attempt.error_count(), 2);
    }

    #[test]
    fn correct_attempt_without_timer_is_free() {
        let expected = SentenceDraft::from_tokens(["חום", "תקין"]).validate().unwrap();
        let result = validate("חום תקין", &expected);
        let attempt = ExerciseAttempt::from_result(
            ExerciseId::new("O-002").unwrap(),
            Section::Objective,
            fixed_now(),
            &result,
        );

        assert!(attempt.is_correct);
        assert_eq!(attempt.time_taken, Duration::ZERO);
        assert_eq!(attempt.error_count(), 0);
    }
}
