mod attempt;
mod exercise;
mod feedback;
mod ids;
mod progress;
mod section;
mod sentence;

pub use ids::{ExerciseId, ParseIdError, UserId};
pub use section::{Section, UnknownSection};

pub use attempt::ExerciseAttempt;
pub use exercise::{Difficulty, Exercise, ExerciseDraft, ExerciseError};
pub use feedback::{ErrorKind, UnknownErrorKind, ValidationError, ValidationResult};
pub use progress::{ErrorCount, OverallProgress, ProgressError, SectionStats};
pub use sentence::{ExpectedSentence, SentenceDraft, SentenceError};
