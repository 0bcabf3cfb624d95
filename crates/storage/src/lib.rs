#![forbid(unsafe_code)]

pub mod records;
pub mod repository;

pub use records::{
    load_exercises, load_progress, parse_exercises, parse_progress, render_progress,
};
pub use repository::{
    ExerciseRepository, InMemoryRepository, ProgressRepository, Storage, StorageError,
};
