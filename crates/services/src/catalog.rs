//! Selection helpers over a loaded exercise catalog.

use rand::Rng;
use rand::seq::IndexedRandom;

use soap_core::model::{Exercise, ExerciseId, Section};

/// Exercises of one section, or all of them when `section` is `None`.
#[must_use]
pub fn filter_by_section(exercises: &[Exercise], section: Option<Section>) -> Vec<&Exercise> {
    exercises
        .iter()
        .filter(|e| section.is_none_or(|s| e.section() == s))
        .collect()
}

/// Exercises tagged with a difficulty level, or all of them when `level` is `None`.
///
/// Levels compare case-insensitively ("b1" matches "B1").
#[must_use]
pub fn filter_by_difficulty<'a>(
    exercises: &'a [Exercise],
    level: Option<&str>,
) -> Vec<&'a Exercise> {
    exercises
        .iter()
        .filter(|e| level.is_none_or(|l| e.difficulty().level.eq_ignore_ascii_case(l.trim())))
        .collect()
}

#[must_use]
pub fn find_by_id<'a>(exercises: &'a [Exercise], id: &ExerciseId) -> Option<&'a Exercise> {
    exercises.iter().find(|e| e.id() == id)
}

/// Uniformly random pick; `None` for an empty slice.
#[must_use]
pub fn random_exercise<'a, T>(exercises: &'a [T]) -> Option<&'a T> {
    random_exercise_with(exercises, &mut rand::rng())
}

pub fn random_exercise_with<'a, T, R: Rng + ?Sized>(
    exercises: &'a [T],
    rng: &mut R,
) -> Option<&'a T> {
    exercises.choose(rng)
}
