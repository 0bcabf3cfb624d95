//! "What should I practice next?" heuristics over aggregated progress.

use serde::Serialize;

use crate::model::{ErrorKind, OverallProgress, Section, SectionStats};
use crate::settings::RecommenderSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// The section to practice next and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub section: Section,
    pub reason: String,
    pub priority: Priority,
}

/// Picks the next section from a learner's progress.
///
/// Rules, first match wins, sections always visited in [`Section::ALL`] order:
/// 1. a section never practiced (high)
/// 2. the weakest section with enough attempts, if below the weak threshold (high)
/// 3. the section practiced longest ago (medium)
/// 4. the first section (low)
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressRecommender {
    settings: RecommenderSettings,
}

/// Recommend with the default thresholds (3 attempts, 80%).
#[must_use]
pub fn recommend(progress: &OverallProgress) -> Recommendation {
    ProgressRecommender::default().recommend(progress)
}

impl ProgressRecommender {
    #[must_use]
    pub fn new(settings: RecommenderSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> RecommenderSettings {
        self.settings
    }

    #[must_use]
    pub fn recommend(&self, progress: &OverallProgress) -> Recommendation {
        if let Some(stats) = progress.sections().find(|s| s.total_attempts() == 0) {
            return Recommendation {
                section: stats.section(),
                reason: format!(
                    "Start practicing {}: you have not practiced this section yet",
                    stats.section().display_name()
                ),
                priority: Priority::High,
            };
        }

        let weakest = progress
            .sections()
            .filter(|s| s.total_attempts() >= self.settings.min_attempts())
            .fold(None::<&SectionStats>, |best, s| match best {
                Some(b) if b.success_rate() <= s.success_rate() => Some(b),
                _ => Some(s),
            });
        if let Some(stats) = weakest {
            if stats.success_rate() < self.settings.weak_success_rate() {
                return Recommendation {
                    section: stats.section(),
                    reason: format!(
                        "Improve {}: {:.0}% accuracy",
                        stats.section().display_name(),
                        stats.success_rate().round()
                    ),
                    priority: Priority::High,
                };
            }
        }

        let stalest = progress
            .sections()
            .filter_map(|s| s.last_practiced().map(|at| (s, at)))
            .fold(None, |best, (s, at)| match best {
                Some((b, b_at)) if b_at <= at => Some((b, b_at)),
                _ => Some((s, at)),
            });
        if let Some((stats, _)) = stalest {
            return Recommendation {
                section: stats.section(),
                reason: format!(
                    "Refresh {}: not practiced recently",
                    stats.section().display_name()
                ),
                priority: Priority::Medium,
            };
        }

        Recommendation {
            section: Section::ALL[0],
            reason: "Keep practicing to hold your pace".to_string(),
            priority: Priority::Low,
        }
    }
}

/// Share of one error kind within a section's tally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorShare {
    pub kind: ErrorKind,
    pub count: u32,
    pub percentage: f64,
}

/// Most frequent error kinds of a section, at most `limit` of them.
///
/// Ties keep the tally's stored order. Returns nothing when no errors were recorded.
#[must_use]
pub fn top_errors(stats: &SectionStats, limit: usize) -> Vec<ErrorShare> {
    let total = stats.total_errors();
    if total == 0 {
        return Vec::new();
    }

    #[allow(clippy::cast_precision_loss)]
    let total = total as f64;

    let mut ranked: Vec<_> = stats.common_errors().to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
        .into_iter()
        .take(limit)
        .map(|e| ErrorShare {
            kind: e.kind,
            count: e.count,
            percentage: f64::from(e.count) / total * 100.0,
        })
        .collect()
}

/// Coarse band of a success rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceLevel {
    Excellent,
    Good,
    NeedsImprovement,
    Beginner,
}

impl PerformanceLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PerformanceLevel::Excellent => "excellent",
            PerformanceLevel::Good => "good",
            PerformanceLevel::NeedsImprovement => "needs-improvement",
            PerformanceLevel::Beginner => "beginner",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PerformanceLevel::Excellent => "מצוין! (Excellent)",
            PerformanceLevel::Good => "טוב מאוד (Very good)",
            PerformanceLevel::NeedsImprovement => "יש מקום לשיפור (Room to improve)",
            PerformanceLevel::Beginner => "המשך לתרגל (Keep practicing)",
        }
    }
}

/// Lower bounds are inclusive: 90 is excellent, 75 good, 50 needs-improvement.
#[must_use]
pub fn performance_level(success_rate: f64) -> PerformanceLevel {
    if success_rate >= 90.0 {
        PerformanceLevel::Excellent
    } else if success_rate >= 75.0 {
        PerformanceLevel::Good
    } else if success_rate >= 50.0 {
        PerformanceLevel::NeedsImprovement
    } else {
        PerformanceLevel::Beginner
    }
}
