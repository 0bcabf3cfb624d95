use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::model::{ErrorKind, ExerciseAttempt, Section};
use crate::time::utc_day;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("success rate must be within [0, 100], got {provided}")]
    InvalidSuccessRate { provided: f64 },

    #[error("successful attempts ({successful}) exceed total attempts ({total})")]
    SuccessExceedsAttempts { successful: u32, total: u32 },

    #[error("error kind {0} is tallied more than once")]
    DuplicateErrorKind(ErrorKind),
}

//
// ─── SECTION STATS ─────────────────────────────────────────────────────────────
//

/// Occurrences of one error kind within a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorCount {
    pub kind: ErrorKind,
    pub count: u32,
}

/// Aggregate counters for one SOAP section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionStats {
    section: Section,
    total_attempts: u32,
    successful_attempts: u32,
    success_rate: f64,
    total_time: Duration,
    last_practiced: Option<DateTime<Utc>>,
    common_errors: Vec<ErrorCount>,
}

impl SectionStats {
    /// Stats for a section that has never been practiced.
    #[must_use]
    pub fn new(section: Section) -> Self {
        Self {
            section,
            total_attempts: 0,
            successful_attempts: 0,
            success_rate: 0.0,
            total_time: Duration::ZERO,
            last_practiced: None,
            common_errors: Vec::new(),
        }
    }

    /// Rehydrate stats from a stored record.
    ///
    /// `common_errors` keeps the stored order; ranking ties fall back to it.
    ///
    /// # Errors
    ///
    /// - `SuccessExceedsAttempts` if counts are inconsistent
    /// - `InvalidSuccessRate` if the rate is NaN or outside `[0, 100]`
    /// - `DuplicateErrorKind` if an error kind appears twice
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        section: Section,
        total_attempts: u32,
        successful_attempts: u32,
        success_rate: f64,
        total_time: Duration,
        last_practiced: Option<DateTime<Utc>>,
        common_errors: Vec<ErrorCount>,
    ) -> Result<Self, ProgressError> {
        if successful_attempts > total_attempts {
            return Err(ProgressError::SuccessExceedsAttempts {
                successful: successful_attempts,
                total: total_attempts,
            });
        }
        if !(0.0..=100.0).contains(&success_rate) {
            return Err(ProgressError::InvalidSuccessRate {
                provided: success_rate,
            });
        }
        for (i, entry) in common_errors.iter().enumerate() {
            if common_errors[..i].iter().any(|e| e.kind == entry.kind) {
                return Err(ProgressError::DuplicateErrorKind(entry.kind));
            }
        }

        Ok(Self {
            section,
            total_attempts,
            successful_attempts,
            success_rate,
            total_time,
            last_practiced,
            common_errors,
        })
    }

    #[must_use]
    pub fn section(&self) -> Section {
        self.section
    }

    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.total_attempts
    }

    #[must_use]
    pub fn successful_attempts(&self) -> u32 {
        self.successful_attempts
    }

    /// Percentage of successful attempts, always within `[0, 100]`.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    #[must_use]
    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    #[must_use]
    pub fn average_time(&self) -> Duration {
        if self.total_attempts == 0 {
            return Duration::ZERO;
        }
        self.total_time / self.total_attempts
    }

    #[must_use]
    pub fn last_practiced(&self) -> Option<DateTime<Utc>> {
        self.last_practiced
    }

    #[must_use]
    pub fn common_errors(&self) -> &[ErrorCount] {
        &self.common_errors
    }

    #[must_use]
    pub fn total_errors(&self) -> u64 {
        self.common_errors.iter().map(|e| u64::from(e.count)).sum()
    }

    fn record(&mut self, attempt: &ExerciseAttempt) {
        self.total_attempts = self.total_attempts.saturating_add(1);
        if attempt.is_correct {
            self.successful_attempts = self.successful_attempts.saturating_add(1);
        }
        self.success_rate =
            f64::from(self.successful_attempts) / f64::from(self.total_attempts) * 100.0;
        self.total_time = self.total_time.saturating_add(attempt.time_taken);
        self.last_practiced = Some(match self.last_practiced {
            Some(prev) => prev.max(attempt.timestamp),
            None => attempt.timestamp,
        });

        for kind in &attempt.error_kinds {
            match self.common_errors.iter_mut().find(|e| e.kind == *kind) {
                Some(entry) => entry.count = entry.count.saturating_add(1),
                None => self.common_errors.push(ErrorCount {
                    kind: *kind,
                    count: 1,
                }),
            }
        }
        // stable: equal counts keep first-seen order
        self.common_errors.sort_by(|a, b| b.count.cmp(&a.count));
    }
}

//
// ─── OVERALL PROGRESS ──────────────────────────────────────────────────────────
//

/// A learner's progress across all sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallProgress {
    sections: [SectionStats; 4],
    total_exercises_completed: u32,
    total_time_spent: Duration,
    current_streak: u32,
    last_practice_date: Option<DateTime<Utc>>,
}

impl Default for OverallProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl OverallProgress {
    /// Progress with every section unpracticed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sections: Section::ALL.map(SectionStats::new),
            total_exercises_completed: 0,
            total_time_spent: Duration::ZERO,
            current_streak: 0,
            last_practice_date: None,
        }
    }

    /// Replace the stats of `stats.section()`.
    #[must_use]
    pub fn with_section(mut self, stats: SectionStats) -> Self {
        let index = stats.section().index();
        self.sections[index] = stats;
        self
    }

    /// Restore the overall counters of a stored snapshot.
    #[must_use]
    pub fn with_totals(
        mut self,
        total_exercises_completed: u32,
        total_time_spent: Duration,
        current_streak: u32,
        last_practice_date: Option<DateTime<Utc>>,
    ) -> Self {
        self.total_exercises_completed = total_exercises_completed;
        self.total_time_spent = total_time_spent;
        self.current_streak = current_streak;
        self.last_practice_date = last_practice_date;
        self
    }

    #[must_use]
    pub fn section(&self, section: Section) -> &SectionStats {
        &self.sections[section.index()]
    }

    /// Section stats in [`Section::ALL`] order.
    pub fn sections(&self) -> impl Iterator<Item = &SectionStats> {
        self.sections.iter()
    }

    #[must_use]
    pub fn attempts_by_section(&self) -> Vec<(Section, u32)> {
        self.sections
            .iter()
            .map(|s| (s.section(), s.total_attempts()))
            .collect()
    }

    #[must_use]
    pub fn total_exercises_completed(&self) -> u32 {
        self.total_exercises_completed
    }

    #[must_use]
    pub fn total_time_spent(&self) -> Duration {
        self.total_time_spent
    }

    /// Consecutive UTC days with at least one attempt.
    #[must_use]
    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    #[must_use]
    pub fn last_practice_date(&self) -> Option<DateTime<Utc>> {
        self.last_practice_date
    }

    /// Fold one attempt into the section stats and overall counters.
    pub fn record_attempt(&mut self, attempt: &ExerciseAttempt) {
        self.sections[attempt.section.index()].record(attempt);

        self.total_exercises_completed = self.total_exercises_completed.saturating_add(1);
        self.total_time_spent = self.total_time_spent.saturating_add(attempt.time_taken);
        self.current_streak =
            next_streak(self.last_practice_date, self.current_streak, attempt.timestamp);
        self.last_practice_date = Some(match self.last_practice_date {
            Some(prev) => prev.max(attempt.timestamp),
            None => attempt.timestamp,
        });
    }
}

// Same day keeps the streak, the next day extends it, a gap restarts it.
// Attempts dated before the last practice day leave the streak alone.
fn next_streak(last: Option<DateTime<Utc>>, current: u32, at: DateTime<Utc>) -> u32 {
    let Some(last) = last else {
        return 1;
    };
    let days = (utc_day(at) - utc_day(last)).num_days();
    match days {
        d if d <= 0 => current.max(1),
        1 => current.saturating_add(1),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExerciseId;
    use crate::time::fixed_now;
    use chrono::Duration as ChronoDuration;

    fn attempt(
        section: Section,
        correct: bool,
        at: DateTime<Utc>,
        errors: &[ErrorKind],
    ) -> ExerciseAttempt {
        ExerciseAttempt {
            exercise_id: ExerciseId::new("S-001").unwrap(),
            section,
            timestamp: at,
            is_correct: correct,
            time_taken: Duration::from_secs(30),
            error_kinds: errors.to_vec(),
        }
    }

    #[test]
    fn new_progress_has_every_section_unpracticed() {
        let progress = OverallProgress::new();
        let sections: Vec<Section> = progress.sections().map(SectionStats::section).collect();
        assert_eq!(sections, Section::ALL.to_vec());
        assert!(progress.sections().all(|s| s.total_attempts() == 0));
    }

    #[test]
    fn record_updates_rate_and_time() {
        let mut progress = OverallProgress::new();
        progress.record_attempt(&attempt(Section::Plan, true, fixed_now(), &[]));
        progress.record_attempt(&attempt(
            Section::Plan,
            false,
            fixed_now(),
            &[ErrorKind::MissingWord],
        ));

        let plan = progress.section(Section::Plan);
        assert_eq!(plan.total_attempts(), 2);
        assert_eq!(plan.successful_attempts(), 1);
        assert!((plan.success_rate() - 50.0).abs() < f64::EPSILON);
        assert_eq!(plan.average_time(), Duration::from_secs(30));
        assert_eq!(plan.last_practiced(), Some(fixed_now()));
        assert_eq!(progress.total_exercises_completed(), 2);
        assert_eq!(progress.total_time_spent(), Duration::from_secs(60));
    }

    #[test]
    fn attempts_by_section_follows_section_order() {
        let mut progress = OverallProgress::new();
        for section in [Section::Plan, Section::Objective, Section::Plan] {
            progress.record_attempt(&attempt(section, true, fixed_now(), &[]));
        }

        assert_eq!(
            progress.attempts_by_section(),
            vec![
                (Section::Subjective, 0),
                (Section::Objective, 1),
                (Section::Assessment, 0),
                (Section::Plan, 2),
            ]
        );
    }

    #[test]
    fn error_tally_sorts_by_count_keeping_first_seen_order() {
        let mut progress = OverallProgress::new();
        progress.record_attempt(&attempt(
            Section::Objective,
            false,
            fixed_now(),
            &[ErrorKind::ExtraWord, ErrorKind::MissingWord, ErrorKind::MissingWord],
        ));
        progress.record_attempt(&attempt(
            Section::Objective,
            false,
            fixed_now(),
            &[ErrorKind::WrongOrder],
        ));

        let kinds: Vec<(ErrorKind, u32)> = progress
            .section(Section::Objective)
            .common_errors()
            .iter()
            .map(|e| (e.kind, e.count))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ErrorKind::MissingWord, 2),
                (ErrorKind::ExtraWord, 1),
                (ErrorKind::WrongOrder, 1),
            ]
        );
    }

    #[test]
    fn streak_counts_consecutive_days() {
        let mut progress = OverallProgress::new();
        let day0 = fixed_now();
        progress.record_attempt(&attempt(Section::Subjective, true, day0, &[]));
        assert_eq!(progress.current_streak(), 1);

        progress.record_attempt(&attempt(Section::Subjective, true, day0, &[]));
        assert_eq!(progress.current_streak(), 1);

        progress.record_attempt(&attempt(
            Section::Subjective,
            true,
            day0 + ChronoDuration::days(1),
            &[],
        ));
        assert_eq!(progress.current_streak(), 2);

        progress.record_attempt(&attempt(
            Section::Subjective,
            true,
            day0 + ChronoDuration::days(4),
            &[],
        ));
        assert_eq!(progress.current_streak(), 1);
    }

    #[test]
    fn backdated_attempt_keeps_latest_practice_date() {
        let mut progress = OverallProgress::new();
        let now = fixed_now();
        progress.record_attempt(&attempt(Section::Plan, true, now, &[]));
        progress.record_attempt(&attempt(
            Section::Plan,
            true,
            now - ChronoDuration::days(3),
            &[],
        ));
        assert_eq!(progress.last_practice_date(), Some(now));
        assert_eq!(progress.section(Section::Plan).last_practiced(), Some(now));
        assert_eq!(progress.current_streak(), 1);
    }

    #[test]
    fn persisted_stats_are_validated() {
        let over = SectionStats::from_persisted(
            Section::Plan,
            2,
            3,
            100.0,
            Duration::ZERO,
            None,
            Vec::new(),
        );
        assert!(matches!(
            over,
            Err(ProgressError::SuccessExceedsAttempts { .. })
        ));

        let rate = SectionStats::from_persisted(
            Section::Plan,
            2,
            1,
            120.0,
            Duration::ZERO,
            None,
            Vec::new(),
        );
        assert!(matches!(rate, Err(ProgressError::InvalidSuccessRate { .. })));

        let dup = SectionStats::from_persisted(
            Section::Plan,
            2,
            1,
            50.0,
            Duration::ZERO,
            None,
            vec![
                ErrorCount {
                    kind: ErrorKind::ExtraWord,
                    count: 1,
                },
                ErrorCount {
                    kind: ErrorKind::ExtraWord,
                    count: 2,
                },
            ],
        );
        assert_eq!(
            dup.unwrap_err(),
            ProgressError::DuplicateErrorKind(ErrorKind::ExtraWord)
        );
    }
}
