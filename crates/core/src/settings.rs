use serde::Serialize;
use thiserror::Error;

use crate::model::{ErrorKind, ValidationError};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("at least one error kind must be reported")]
    NothingReported,

    #[error("weak success rate must be in (0, 100], got {provided}")]
    InvalidWeakSuccessRate { provided: f64 },

    #[error("minimum attempts for a success-rate signal must be > 0")]
    InvalidMinAttempts,
}

/// Per-exercise grading knobs.
///
/// `reported` only decides which errors are highlighted to the learner; every
/// error still counts against correctness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationRules {
    near_miss_distance: usize,
    reported: Vec<ErrorKind>,
}

impl Default for ValidationRules {
    /// Edits of up to two characters read as misspellings; every kind is reported.
    fn default() -> Self {
        Self {
            near_miss_distance: 2,
            reported: ErrorKind::ALL.to_vec(),
        }
    }
}

impl ValidationRules {
    /// # Errors
    ///
    /// Returns `SettingsError::NothingReported` if `reported` is empty.
    pub fn new(
        near_miss_distance: usize,
        reported: impl IntoIterator<Item = ErrorKind>,
    ) -> Result<Self, SettingsError> {
        let mut kinds: Vec<ErrorKind> = reported.into_iter().collect();
        kinds.sort();
        kinds.dedup();
        if kinds.is_empty() {
            return Err(SettingsError::NothingReported);
        }
        Ok(Self {
            near_miss_distance,
            reported: kinds,
        })
    }

    /// Build rules from an exercise's `validation` block.
    ///
    /// With spelling tolerance off every substitution is described as a wrong
    /// word; it is still reported as `spelling_error`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::NothingReported` if `error_types` is empty.
    pub fn from_exercise_flags(
        allow_spelling_errors: bool,
        error_types: impl IntoIterator<Item = ErrorKind>,
    ) -> Result<Self, SettingsError> {
        let distance = if allow_spelling_errors { 2 } else { 0 };
        Self::new(distance, error_types)
    }

    #[must_use]
    pub fn near_miss_distance(&self) -> usize {
        self.near_miss_distance
    }

    #[must_use]
    pub fn reported(&self) -> &[ErrorKind] {
        &self.reported
    }

    #[must_use]
    pub fn reports(&self, kind: ErrorKind) -> bool {
        self.reported.contains(&kind)
    }

    /// Errors of the kinds this exercise highlights, in result order.
    #[must_use]
    pub fn highlighted<'a>(&self, errors: &'a [ValidationError]) -> Vec<&'a ValidationError> {
        errors.iter().filter(|e| self.reports(e.kind)).collect()
    }
}

/// Thresholds of the "weakest with signal" recommendation rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecommenderSettings {
    min_attempts: u32,
    weak_success_rate: f64,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            min_attempts: 3,
            weak_success_rate: 80.0,
        }
    }
}

impl RecommenderSettings {
    /// # Errors
    ///
    /// - `InvalidMinAttempts` if `min_attempts` is zero
    /// - `InvalidWeakSuccessRate` if the rate is not in `(0, 100]`
    pub fn new(min_attempts: u32, weak_success_rate: f64) -> Result<Self, SettingsError> {
        if min_attempts == 0 {
            return Err(SettingsError::InvalidMinAttempts);
        }
        if !(weak_success_rate > 0.0 && weak_success_rate <= 100.0) {
            return Err(SettingsError::InvalidWeakSuccessRate {
                provided: weak_success_rate,
            });
        }
        Ok(Self {
            min_attempts,
            weak_success_rate,
        })
    }

    #[must_use]
    pub fn min_attempts(&self) -> u32 {
        self.min_attempts
    }

    #[must_use]
    pub fn weak_success_rate(&self) -> f64 {
        self.weak_success_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_report_everything() {
        let rules = ValidationRules::default();
        assert_eq!(rules.near_miss_distance(), 2);
        assert!(ErrorKind::ALL.into_iter().all(|k| rules.reports(k)));
    }

    #[test]
    fn rules_require_a_reported_kind() {
        let err = ValidationRules::new(2, []).unwrap_err();
        assert_eq!(err, SettingsError::NothingReported);
    }

    #[test]
    fn rules_dedup_kinds() {
        let rules = ValidationRules::new(
            1,
            [ErrorKind::ExtraWord, ErrorKind::MissingWord, ErrorKind::ExtraWord],
        )
        .unwrap();
        assert_eq!(
            rules.reported(),
            &[ErrorKind::MissingWord, ErrorKind::ExtraWord]
        );
    }

    #[test]
    fn spelling_tolerance_off_means_zero_distance() {
        let rules = ValidationRules::from_exercise_flags(false, ErrorKind::ALL).unwrap();
        assert_eq!(rules.near_miss_distance(), 0);
    }

    #[test]
    fn highlighted_keeps_reported_kinds_in_order() {
        let rules =
            ValidationRules::new(2, [ErrorKind::ExtraWord, ErrorKind::SpellingError]).unwrap();
        let error = |kind, position| ValidationError {
            kind,
            position,
            expected: None,
            actual: None,
            message: String::new(),
        };
        let errors = vec![
            error(ErrorKind::SpellingError, 0),
            error(ErrorKind::MissingWord, 1),
            error(ErrorKind::ExtraWord, 2),
        ];

        let shown: Vec<(ErrorKind, usize)> = rules
            .highlighted(&errors)
            .into_iter()
            .map(|e| (e.kind, e.position))
            .collect();
        assert_eq!(
            shown,
            vec![(ErrorKind::SpellingError, 0), (ErrorKind::ExtraWord, 2)]
        );
    }

    #[test]
    fn recommender_settings_validate_rate() {
        assert!(RecommenderSettings::new(3, 0.0).is_err());
        assert!(RecommenderSettings::new(3, f64::NAN).is_err());
        assert!(RecommenderSettings::new(0, 50.0).is_err());
        let settings = RecommenderSettings::new(5, 100.0).unwrap();
        assert_eq!(settings.min_attempts(), 5);
    }
}
