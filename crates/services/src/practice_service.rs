use chrono::{DateTime, Utc};
use std::sync::Arc;

use soap_core::model::{
    Exercise, ExerciseAttempt, ExerciseId, OverallProgress, Section, UserId, ValidationError,
    ValidationResult,
};
use soap_core::validation::SentenceValidator;
use storage::repository::{ExerciseRepository, ProgressRepository, Storage};

use crate::Clock;
use crate::catalog::{filter_by_difficulty, random_exercise};
use crate::error::PracticeServiceError;

/// Graded submission together with the attempt folded into progress.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeOutcome {
    pub result: ValidationResult,
    /// Errors of the kinds the exercise marks for the learner.
    pub highlighted: Vec<ValidationError>,
    pub attempt: ExerciseAttempt,
    pub progress: OverallProgress,
}

/// Grades typed sentences against catalog exercises and records the attempts.
#[derive(Clone)]
pub struct PracticeService {
    clock: Clock,
    exercises: Arc<dyn ExerciseRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl PracticeService {
    #[must_use]
    pub fn new(
        clock: Clock,
        exercises: Arc<dyn ExerciseRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            exercises,
            progress,
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(
            clock,
            Arc::clone(&storage.exercises),
            Arc::clone(&storage.progress),
        )
    }

    /// Grade `input` against an exercise without touching progress.
    ///
    /// # Errors
    ///
    /// Returns `PracticeServiceError::Storage` if the exercise cannot be loaded.
    pub async fn check(
        &self,
        exercise_id: &ExerciseId,
        input: &str,
    ) -> Result<ValidationResult, PracticeServiceError> {
        let exercise = self.exercises.get_exercise(exercise_id).await?;
        Ok(grade(&exercise, input))
    }

    /// Grade `input`, stamp the time spent since `started_at`, and fold the
    /// attempt into the learner's stored progress.
    ///
    /// Without a start time, or for exercises with the timer disabled, the
    /// attempt counts zero seconds.
    ///
    /// # Errors
    ///
    /// Returns `PracticeServiceError::Storage` if loading the exercise or
    /// reading/writing progress fails.
    pub async fn submit(
        &self,
        user: UserId,
        exercise_id: &ExerciseId,
        input: &str,
        started_at: Option<DateTime<Utc>>,
    ) -> Result<PracticeOutcome, PracticeServiceError> {
        let exercise = self.exercises.get_exercise(exercise_id).await?;
        let now = self.clock.now();

        let mut result = grade(&exercise, input);
        if let Some(started_at) = started_at.filter(|_| exercise.timer_enabled()) {
            result = result.with_elapsed(self.clock.elapsed_since(started_at));
        }

        let attempt =
            ExerciseAttempt::from_result(exercise.id().clone(), exercise.section(), now, &result);

        let progress = self.progress.record_attempt(user, &attempt).await?;
        let highlighted: Vec<ValidationError> = exercise
            .rules()
            .highlighted(&result.errors)
            .into_iter()
            .cloned()
            .collect();

        tracing::info!(
            %user,
            exercise = %exercise.id(),
            section = %exercise.section(),
            correct = result.is_correct,
            errors = attempt.error_count(),
            highlighted = highlighted.len(),
            "attempt recorded"
        );

        Ok(PracticeOutcome {
            result,
            highlighted,
            attempt,
            progress,
        })
    }

    /// Random exercise, optionally restricted to a section and a difficulty level.
    ///
    /// # Errors
    ///
    /// Returns `PracticeServiceError::NoExercises` if nothing matches, or
    /// `PracticeServiceError::Storage` if the catalog cannot be read.
    pub async fn next_exercise(
        &self,
        section: Option<Section>,
        level: Option<&str>,
    ) -> Result<Exercise, PracticeServiceError> {
        let all = self.exercises.list_exercises().await?;
        let candidates: Vec<&Exercise> = filter_by_difficulty(&all, level)
            .into_iter()
            .filter(|e| section.is_none_or(|s| e.section() == s))
            .collect();

        tracing::debug!(
            candidates = candidates.len(),
            ?section,
            ?level,
            "picking next exercise"
        );

        random_exercise(&candidates)
            .map(|e| (*e).clone())
            .ok_or(PracticeServiceError::NoExercises)
    }
}

fn grade(exercise: &Exercise, input: &str) -> ValidationResult {
    SentenceValidator::new(exercise.rules().clone()).validate(input, exercise.sentence())
}
