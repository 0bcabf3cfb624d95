//! Word-bank helpers: shuffled copies and distractor words.

use rand::Rng;
use rand::seq::SliceRandom;

use soap_core::text::fold;

/// Shuffled copy of `items`; the input is left untouched.
#[must_use]
pub fn shuffle_copy<T: Clone>(items: &[T]) -> Vec<T> {
    shuffle_copy_with(items, &mut rand::rng())
}

pub fn shuffle_copy_with<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut copy = items.to_vec();
    copy.shuffle(rng);
    copy
}

/// Up to `count` random words from `words` that differ from `correct`.
///
/// Words are compared after diacritic and case folding, so a pointed
/// spelling of the correct word is never offered as a distractor.
#[must_use]
pub fn random_distractors(words: &[String], correct: &str, count: usize) -> Vec<String> {
    random_distractors_with(words, correct, count, &mut rand::rng())
}

pub fn random_distractors_with<R: Rng + ?Sized>(
    words: &[String],
    correct: &str,
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let correct = fold(correct);
    let candidates: Vec<String> = words
        .iter()
        .filter(|w| fold(w) != correct)
        .cloned()
        .collect();
    let mut picked = shuffle_copy_with(&candidates, rng);
    picked.truncate(count);
    picked
}
