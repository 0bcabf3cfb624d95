use async_trait::async_trait;
use soap_core::model::{Exercise, ExerciseAttempt, ExerciseId, OverallProgress, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Repository contract for the exercise catalog.
#[async_trait]
pub trait ExerciseRepository: Send + Sync {
    /// All exercises, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be read.
    async fn list_exercises(&self) -> Result<Vec<Exercise>, StorageError>;

    /// Fetch an exercise by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_exercise(&self, id: &ExerciseId) -> Result<Exercise, StorageError>;

    /// Persist or replace an exercise. New exercises go to the end of the catalog.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the exercise cannot be stored.
    async fn upsert_exercise(&self, exercise: &Exercise) -> Result<(), StorageError>;
}

/// Repository contract for per-learner progress snapshots.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load a learner's progress. A learner with nothing stored starts empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be read.
    async fn get_progress(&self, user: UserId) -> Result<OverallProgress, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_progress(&self, user: UserId, progress: &OverallProgress)
    -> Result<(), StorageError>;

    /// Fold one attempt into the learner's stored progress and return the
    /// updated snapshot. The read and the write happen as one step, so
    /// concurrent attempts for the same learner are never lost.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be read or stored.
    async fn record_attempt(
        &self,
        user: UserId,
        attempt: &ExerciseAttempt,
    ) -> Result<OverallProgress, StorageError>;

    /// Drop everything stored for a learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be removed.
    async fn reset_progress(&self, user: UserId) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and the CLI.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    exercises: Arc<Mutex<Vec<Exercise>>>,
    progress: Arc<Mutex<HashMap<UserId, OverallProgress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            exercises: Arc::new(Mutex::new(Vec::new())),
            progress: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Repository seeded with a parsed catalog.
    #[must_use]
    pub fn with_exercises(exercises: Vec<Exercise>) -> Self {
        Self {
            exercises: Arc::new(Mutex::new(exercises)),
            progress: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ExerciseRepository for InMemoryRepository {
    async fn list_exercises(&self) -> Result<Vec<Exercise>, StorageError> {
        let guard = self
            .exercises
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn get_exercise(&self, id: &ExerciseId) -> Result<Exercise, StorageError> {
        let guard = self
            .exercises
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|e| e.id() == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn upsert_exercise(&self, exercise: &Exercise) -> Result<(), StorageError> {
        let mut guard = self
            .exercises
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.iter_mut().find(|e| e.id() == exercise.id()) {
            Some(slot) => *slot = exercise.clone(),
            None => guard.push(exercise.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(&self, user: UserId) -> Result<OverallProgress, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&user).cloned().unwrap_or_default())
    }

    async fn save_progress(
        &self,
        user: UserId,
        progress: &OverallProgress,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(user, progress.clone());
        Ok(())
    }

    async fn record_attempt(
        &self,
        user: UserId,
        attempt: &ExerciseAttempt,
    ) -> Result<OverallProgress, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let progress = guard.entry(user).or_default();
        progress.record_attempt(attempt);
        Ok(progress.clone())
    }

    async fn reset_progress(&self, user: UserId) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&user);
        Ok(())
    }
}

/// Aggregates the catalog and progress repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub exercises: Arc<dyn ExerciseRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    #[must_use]
    pub fn with_exercises(exercises: Vec<Exercise>) -> Self {
        Self::from_repository(InMemoryRepository::with_exercises(exercises))
    }

    fn from_repository(repo: InMemoryRepository) -> Self {
        let exercises: Arc<dyn ExerciseRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self {
            exercises,
            progress,
        }
    }
}
