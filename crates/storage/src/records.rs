//! JSON layouts of the exercise catalog and progress snapshots.
//!
//! Records mirror the files byte-for-byte (camelCase keys, millisecond
//! timestamps, durations in seconds) and are converted into validated
//! domain types before anything else sees them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use soap_core::ValidationRules;
use soap_core::model::{
    Difficulty, ErrorCount, ErrorKind, Exercise, ExerciseDraft, ExerciseId, OverallProgress,
    Section, SectionStats, SentenceDraft,
};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn default_true() -> bool {
    true
}

//
// ─── EXERCISES ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct ExerciseFile {
    exercises: Vec<ExerciseRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    pub id: String,
    pub soap_section: Section,
    #[serde(default)]
    pub back_story: BackStoryRecord,
    pub task: TaskRecord,
    pub sentence: SentenceRecord,
    #[serde(default)]
    pub word_bank: WordBankRecord,
    #[serde(default)]
    pub validation: Option<ValidationRecord>,
    #[serde(default)]
    pub timing: TimingRecord,
    #[serde(default)]
    pub difficulty: DifficultyRecord,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackStoryRecord {
    #[serde(default)]
    pub text: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskRecord {
    pub instruction: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceRecord {
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub punctuation_required: bool,
    #[serde(default = "default_true")]
    pub exact_order_required: bool,
    #[serde(default)]
    pub exact_grammar_required: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordBankRecord {
    #[serde(default)]
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRecord {
    #[serde(default = "default_true")]
    pub allow_spelling_errors: bool,
    #[serde(default)]
    pub error_types: Option<Vec<ErrorKind>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingRecord {
    #[serde(default)]
    pub enable_timer: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DifficultyRecord {
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub note: String,
}

impl ExerciseRecord {
    /// Convert the record into an unvalidated domain draft.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for a blank ID or an empty `errorTypes` list.
    pub fn into_draft(self) -> Result<ExerciseDraft, StorageError> {
        let id = ExerciseId::new(self.id).map_err(ser)?;

        let rules = match self.validation {
            None => ValidationRules::default(),
            Some(v) => ValidationRules::from_exercise_flags(
                v.allow_spelling_errors,
                v.error_types.unwrap_or_else(|| ErrorKind::ALL.to_vec()),
            )
            .map_err(|e| StorageError::Serialization(format!("exercise {id}: {e}")))?,
        };

        let sentence = SentenceDraft {
            expected: self.sentence.expected,
            tokens: self.sentence.tokens,
            punctuation_required: self.sentence.punctuation_required,
            exact_order_required: self.sentence.exact_order_required,
            exact_grammar_required: self.sentence.exact_grammar_required,
        };

        Ok(ExerciseDraft {
            id,
            section: self.soap_section,
            back_story: self.back_story.text,
            instruction: self.task.instruction,
            sentence,
            word_bank: self.word_bank.words,
            rules,
            difficulty: Difficulty {
                level: self.difficulty.level,
                note: self.difficulty.note,
            },
            timer_enabled: self.timing.enable_timer,
        })
    }
}

/// Parse an `{"exercises": [...]}` document into validated exercises, in file order.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the JSON is malformed, an exercise
/// fails validation, or two exercises share an ID.
pub fn parse_exercises(json: &str) -> Result<Vec<Exercise>, StorageError> {
    let file: ExerciseFile = serde_json::from_str(json).map_err(ser)?;

    let mut seen = HashSet::new();
    let mut exercises = Vec::with_capacity(file.exercises.len());
    for record in file.exercises {
        let draft = record.into_draft()?;
        let id = draft.id.clone();
        if !seen.insert(id.clone()) {
            return Err(StorageError::Serialization(format!(
                "duplicate exercise id {id}"
            )));
        }
        let exercise = draft
            .validate()
            .map_err(|e| StorageError::Serialization(format!("exercise {id}: {e}")))?;
        exercises.push(exercise);
    }

    tracing::debug!(count = exercises.len(), "parsed exercise catalog");
    Ok(exercises)
}

/// # Errors
///
/// Returns `StorageError::Io` if the file cannot be read, otherwise see [`parse_exercises`].
pub fn load_exercises(path: impl AsRef<Path>) -> Result<Vec<Exercise>, StorageError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "loading exercises");
    let json = std::fs::read_to_string(path)?;
    parse_exercises(&json)
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCountRecord {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionStatsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    #[serde(default)]
    pub total_attempts: u32,
    #[serde(default)]
    pub successful_attempts: u32,
    #[serde(default)]
    pub success_rate: f64,
    /// Derived on load; written for readers of the file.
    #[serde(default)]
    pub average_time: f64,
    #[serde(default)]
    pub last_practiced: Option<i64>,
    #[serde(default)]
    pub total_time_taken: f64,
    #[serde(default)]
    pub common_errors: Vec<ErrorCountRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default)]
    pub total_exercises_completed: u32,
    #[serde(default)]
    pub total_time_spent: f64,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub last_practice_date: Option<i64>,
    #[serde(default)]
    pub section_stats: BTreeMap<Section, SectionStatsRecord>,
}

fn millis_to_datetime(field: &'static str, ms: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StorageError::Serialization(format!("{field} out of range: {ms}")))
}

fn seconds_to_duration(field: &'static str, secs: f64) -> Result<Duration, StorageError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| StorageError::Serialization(format!("invalid {field}: {secs}")))
}

impl SectionStatsRecord {
    #[must_use]
    pub fn from_stats(stats: &SectionStats) -> Self {
        Self {
            section: Some(stats.section()),
            total_attempts: stats.total_attempts(),
            successful_attempts: stats.successful_attempts(),
            success_rate: stats.success_rate(),
            average_time: stats.average_time().as_secs_f64(),
            last_practiced: stats.last_practiced().map(|at| at.timestamp_millis()),
            total_time_taken: stats.total_time().as_secs_f64(),
            common_errors: stats
                .common_errors()
                .iter()
                .map(|e| ErrorCountRecord {
                    kind: e.kind,
                    count: e.count,
                })
                .collect(),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the record is inconsistent or
    /// names a different section than the key it is stored under.
    pub fn into_stats(self, section: Section) -> Result<SectionStats, StorageError> {
        if let Some(inner) = self.section {
            if inner != section {
                return Err(StorageError::Serialization(format!(
                    "stats stored under {section} describe {inner}"
                )));
            }
        }
        SectionStats::from_persisted(
            section,
            self.total_attempts,
            self.successful_attempts,
            self.success_rate,
            seconds_to_duration("totalTimeTaken", self.total_time_taken)?,
            self.last_practiced
                .map(|ms| millis_to_datetime("lastPracticed", ms))
                .transpose()?,
            self.common_errors
                .into_iter()
                .map(|e| ErrorCount {
                    kind: e.kind,
                    count: e.count,
                })
                .collect(),
        )
        .map_err(|e| StorageError::Serialization(format!("{section}: {e}")))
    }
}

impl ProgressRecord {
    #[must_use]
    pub fn from_progress(progress: &OverallProgress) -> Self {
        Self {
            total_exercises_completed: progress.total_exercises_completed(),
            total_time_spent: progress.total_time_spent().as_secs_f64(),
            current_streak: progress.current_streak(),
            last_practice_date: progress.last_practice_date().map(|at| at.timestamp_millis()),
            section_stats: progress
                .sections()
                .map(|s| (s.section(), SectionStatsRecord::from_stats(s)))
                .collect(),
        }
    }

    /// Sections missing from the record start unpracticed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if any value is out of range.
    pub fn into_progress(self) -> Result<OverallProgress, StorageError> {
        let mut progress = OverallProgress::new().with_totals(
            self.total_exercises_completed,
            seconds_to_duration("totalTimeSpent", self.total_time_spent)?,
            self.current_streak,
            self.last_practice_date
                .map(|ms| millis_to_datetime("lastPracticeDate", ms))
                .transpose()?,
        );
        for (section, record) in self.section_stats {
            progress = progress.with_section(record.into_stats(section)?);
        }
        Ok(progress)
    }
}

/// # Errors
///
/// Returns `StorageError::Serialization` if the JSON is malformed or inconsistent.
pub fn parse_progress(json: &str) -> Result<OverallProgress, StorageError> {
    let record: ProgressRecord = serde_json::from_str(json).map_err(ser)?;
    record.into_progress()
}

/// # Errors
///
/// Returns `StorageError::Io` if the file cannot be read, otherwise see [`parse_progress`].
pub fn load_progress(path: impl AsRef<Path>) -> Result<OverallProgress, StorageError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "loading progress snapshot");
    let json = std::fs::read_to_string(path)?;
    parse_progress(&json)
}

/// Render a snapshot in the same layout [`parse_progress`] reads.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn render_progress(progress: &OverallProgress) -> Result<String, StorageError> {
    serde_json::to_string_pretty(&ProgressRecord::from_progress(progress)).map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
      "exercises": [
        {
          "id": "S-001",
          "language": "he",
          "soapSection": "Subjective",
          "backStory": { "type": "paragraph", "text": ["מטופל בן 45 מגיע עם כאב בחזה."] },
          "task": { "instruction": "כתוב את התלונה העיקרית" },
          "sentence": {
            "expected": "המטופל מתלונן על כאב בחזה.",
            "tokens": ["המטופל", "מתלונן", "על", "כאב", "בחזה", "."],
            "punctuationRequired": true,
            "exactOrderRequired": true,
            "exactGrammarRequired": false
          },
          "wordBank": { "words": ["כאב", "בחזה"], "suggestionMode": "autocomplete-only" },
          "validation": {
            "allowSpellingErrors": false,
            "markErrorsOnSubmit": true,
            "errorTypes": ["missing_word", "spelling_error"]
          },
          "timing": { "enableTimer": true, "startOn": "story_shown" },
          "difficulty": { "level": "B1", "note": "present tense" }
        }
      ]
    }"#;

    #[test]
    fn parses_catalog_into_domain_exercise() {
        let exercises = parse_exercises(CATALOG).unwrap();
        assert_eq!(exercises.len(), 1);

        let ex = &exercises[0];
        assert_eq!(ex.id().as_str(), "S-001");
        assert_eq!(ex.section(), Section::Subjective);
        assert!(ex.sentence().punctuation_required());
        assert_eq!(ex.rules().near_miss_distance(), 0);
        assert!(ex.rules().reports(ErrorKind::SpellingError));
        assert!(!ex.rules().reports(ErrorKind::ExtraWord));
        assert_eq!(ex.difficulty().level, "B1");
        assert!(ex.timer_enabled());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let doc: serde_json::Value = serde_json::from_str(CATALOG).unwrap();
        let one = doc["exercises"][0].clone();
        let twice = serde_json::json!({ "exercises": [one.clone(), one] }).to_string();
        let err = parse_exercises(&twice).unwrap_err();
        assert!(err.to_string().contains("duplicate"), "{err}");
    }

    #[test]
    fn progress_sections_default_when_missing() {
        let json = r#"{
          "totalExercisesCompleted": 3,
          "totalTimeSpent": 95.5,
          "currentStreak": 2,
          "lastPracticeDate": 1700000000000,
          "sectionStats": {
            "Plan": {
              "section": "Plan",
              "totalAttempts": 3,
              "successfulAttempts": 1,
              "successRate": 33.33,
              "averageTime": 31.8,
              "lastPracticed": 1700000000000,
              "totalTimeTaken": 95.5,
              "commonErrors": [{ "type": "missing_word", "count": 2 }]
            }
          },
          "lastUpdated": 1700000000000
        }"#;

        let progress = parse_progress(json).unwrap();
        assert_eq!(progress.total_exercises_completed(), 3);
        assert_eq!(progress.current_streak(), 2);
        assert_eq!(progress.section(Section::Plan).total_attempts(), 3);
        assert_eq!(progress.section(Section::Subjective).total_attempts(), 0);
        assert_eq!(
            progress.section(Section::Plan).common_errors()[0].kind,
            ErrorKind::MissingWord
        );
    }

    #[test]
    fn mismatched_section_key_is_rejected() {
        let json = r#"{ "sectionStats": { "Plan": { "section": "Objective" } } }"#;
        assert!(matches!(
            parse_progress(json),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn rendered_progress_reads_back() {
        let progress = parse_progress(
            r#"{ "sectionStats": { "Objective": { "totalAttempts": 4, "successfulAttempts": 4, "successRate": 100, "lastPracticed": 1700000000000 } } }"#,
        )
        .unwrap();
        let again = parse_progress(&render_progress(&progress).unwrap()).unwrap();
        assert_eq!(again, progress);
    }
}
