use serde::Serialize;
use thiserror::Error;

use crate::model::{ExerciseId, ExpectedSentence, Section, SentenceDraft, SentenceError};
use crate::settings::ValidationRules;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExerciseError {
    #[error("exercise task instruction cannot be empty")]
    EmptyInstruction,

    #[error("exercise sentence has no tokens")]
    NoTokens,

    #[error(transparent)]
    Sentence(#[from] SentenceError),
}

/// Difficulty tag as authored, e.g. level "B1" with a short note.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Difficulty {
    pub level: String,
    pub note: String,
}

/// Unvalidated exercise, as produced by record parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseDraft {
    pub id: ExerciseId,
    pub section: Section,
    pub back_story: Vec<String>,
    pub instruction: String,
    pub sentence: SentenceDraft,
    pub word_bank: Vec<String>,
    pub rules: ValidationRules,
    pub difficulty: Difficulty,
    pub timer_enabled: bool,
}

/// A SOAP sentence-typing exercise: a patient back story and the sentence to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exercise {
    id: ExerciseId,
    section: Section,
    back_story: Vec<String>,
    instruction: String,
    sentence: ExpectedSentence,
    word_bank: Vec<String>,
    rules: ValidationRules,
    difficulty: Difficulty,
    timer_enabled: bool,
}

impl ExerciseDraft {
    /// # Errors
    ///
    /// - `EmptyInstruction` if the task instruction is blank
    /// - `NoTokens` if the sentence has no tokens; catalog exercises always grade something
    /// - `Sentence` if the sentence definition is malformed
    pub fn validate(self) -> Result<Exercise, ExerciseError> {
        let instruction = self.instruction.trim().to_string();
        if instruction.is_empty() {
            return Err(ExerciseError::EmptyInstruction);
        }
        if self.sentence.tokens.is_empty() {
            return Err(ExerciseError::NoTokens);
        }
        let sentence = self.sentence.validate()?;

        let back_story = self
            .back_story
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        let word_bank = self
            .word_bank
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        Ok(Exercise {
            id: self.id,
            section: self.section,
            back_story,
            instruction,
            sentence,
            word_bank,
            rules: self.rules,
            difficulty: self.difficulty,
            timer_enabled: self.timer_enabled,
        })
    }
}

impl Exercise {
    #[must_use]
    pub fn id(&self) -> &ExerciseId {
        &self.id
    }

    #[must_use]
    pub fn section(&self) -> Section {
        self.section
    }

    #[must_use]
    pub fn back_story(&self) -> &[String] {
        &self.back_story
    }

    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    #[must_use]
    pub fn sentence(&self) -> &ExpectedSentence {
        &self.sentence
    }

    #[must_use]
    pub fn word_bank(&self) -> &[String] {
        &self.word_bank
    }

    #[must_use]
    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    #[must_use]
    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    #[must_use]
    pub fn timer_enabled(&self) -> bool {
        self.timer_enabled
    }
}
