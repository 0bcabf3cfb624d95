//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by `PracticeService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PracticeServiceError {
    #[error("no exercise matches the requested filters")]
    NoExercises,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
