use thiserror::Error;

use crate::model::{
    ExerciseError, ParseIdError, ProgressError, SentenceError, UnknownErrorKind, UnknownSection,
};
use crate::settings::SettingsError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Sentence(#[from] SentenceError),
    #[error(transparent)]
    Exercise(#[from] ExerciseError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    Section(#[from] UnknownSection),
    #[error(transparent)]
    ErrorKind(#[from] UnknownErrorKind),
}
