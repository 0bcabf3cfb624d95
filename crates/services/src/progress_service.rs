use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use soap_core::model::{OverallProgress, Section, SectionStats, UserId};
use soap_core::recommend::{
    ErrorShare, PerformanceLevel, ProgressRecommender, Recommendation, performance_level,
    top_errors,
};
use storage::repository::ProgressRepository;

use crate::error::ProgressServiceError;

const TOP_ERRORS_PER_SECTION: usize = 3;

//
// ─── OVERVIEW ──────────────────────────────────────────────────────────────────
//

/// Dashboard row for one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionOverview {
    pub section: Section,
    pub total_attempts: u32,
    pub success_rate: f64,
    pub average_time: Duration,
    /// `None` until the section has been practiced.
    pub level: Option<PerformanceLevel>,
    pub top_errors: Vec<ErrorShare>,
}

/// Everything the progress dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressOverview {
    pub recommendation: Recommendation,
    pub sections: Vec<SectionOverview>,
    pub total_exercises_completed: u32,
    pub total_time_spent: Duration,
    pub current_streak: u32,
}

impl SectionOverview {
    fn from_stats(stats: &SectionStats) -> Self {
        let practiced = stats.total_attempts() > 0;
        Self {
            section: stats.section(),
            total_attempts: stats.total_attempts(),
            success_rate: stats.success_rate(),
            average_time: stats.average_time(),
            level: practiced.then(|| performance_level(stats.success_rate())),
            top_errors: top_errors(stats, TOP_ERRORS_PER_SECTION),
        }
    }
}

impl ProgressOverview {
    #[must_use]
    pub fn build(progress: &OverallProgress, recommender: &ProgressRecommender) -> Self {
        Self {
            recommendation: recommender.recommend(progress),
            sections: progress.sections().map(SectionOverview::from_stats).collect(),
            total_exercises_completed: progress.total_exercises_completed(),
            total_time_spent: progress.total_time_spent(),
            current_streak: progress.current_streak(),
        }
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Read side of learner progress: snapshots, recommendations and reset.
#[derive(Clone)]
pub struct ProgressService {
    progress: Arc<dyn ProgressRepository>,
    recommender: ProgressRecommender,
}

impl ProgressService {
    #[must_use]
    pub fn new(progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            progress,
            recommender: ProgressRecommender::default(),
        }
    }

    /// Override the recommendation thresholds.
    #[must_use]
    pub fn with_recommender(mut self, recommender: ProgressRecommender) -> Self {
        self.recommender = recommender;
        self
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the snapshot cannot be read.
    pub async fn progress(&self, user: UserId) -> Result<OverallProgress, ProgressServiceError> {
        Ok(self.progress.get_progress(user).await?)
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the snapshot cannot be read.
    pub async fn recommend(&self, user: UserId) -> Result<Recommendation, ProgressServiceError> {
        let progress = self.progress.get_progress(user).await?;
        let recommendation = self.recommender.recommend(&progress);
        tracing::debug!(
            %user,
            section = %recommendation.section,
            priority = ?recommendation.priority,
            "recommendation computed"
        );
        Ok(recommendation)
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the snapshot cannot be read.
    pub async fn overview(&self, user: UserId) -> Result<ProgressOverview, ProgressServiceError> {
        let progress = self.progress.get_progress(user).await?;
        Ok(ProgressOverview::build(&progress, &self.recommender))
    }

    /// Forget all progress for a learner.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the snapshot cannot be removed.
    pub async fn reset(&self, user: UserId) -> Result<(), ProgressServiceError> {
        self.progress.reset_progress(user).await?;
        tracing::info!(%user, "progress reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soap_core::model::{ErrorKind, ExerciseAttempt, ExerciseId};
    use soap_core::recommend::Priority;
    use soap_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn attempt(section: Section, correct: bool, errors: &[ErrorKind]) -> ExerciseAttempt {
        ExerciseAttempt {
            exercise_id: ExerciseId::new("X-1").unwrap(),
            section,
            timestamp: fixed_now(),
            is_correct: correct,
            time_taken: Duration::from_secs(10),
            error_kinds: errors.to_vec(),
        }
    }

    #[tokio::test]
    async fn overview_marks_unpracticed_sections() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let mut progress = OverallProgress::new();
        progress.record_attempt(&attempt(Section::Objective, false, &[ErrorKind::ExtraWord]));
        progress.record_attempt(&attempt(Section::Objective, true, &[]));
        repo.save_progress(user, &progress).await.unwrap();

        let svc = ProgressService::new(Arc::new(repo));
        let overview = svc.overview(user).await.unwrap();

        assert_eq!(overview.sections.len(), 4);
        assert_eq!(overview.sections[0].level, None);
        let objective = &overview.sections[1];
        assert_eq!(objective.level, Some(PerformanceLevel::NeedsImprovement));
        assert_eq!(objective.top_errors.len(), 1);
        assert_eq!(overview.recommendation.section, Section::Subjective);
        assert_eq!(overview.recommendation.priority, Priority::High);
        assert_eq!(overview.total_exercises_completed, 2);
    }

    #[tokio::test]
    async fn reset_returns_learner_to_fresh_progress() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let mut progress = OverallProgress::new();
        progress.record_attempt(&attempt(Section::Plan, true, &[]));
        repo.save_progress(user, &progress).await.unwrap();

        let svc = ProgressService::new(Arc::new(repo));
        svc.reset(user).await.unwrap();
        assert_eq!(svc.progress(user).await.unwrap(), OverallProgress::new());
        assert_eq!(
            svc.recommend(user).await.unwrap().section,
            Section::Subjective
        );
    }
}
