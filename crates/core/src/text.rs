//! Hebrew-aware text folding and tokenization used by the sentence validator.
//!
//! Folding removes niqqud and other combining marks, lowercases and collapses
//! whitespace. Tokenization splits punctuation off words and hangs each mark on
//! the word it follows, so word comparison and punctuation checks stay separate.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Marks treated as punctuation. Everything else is part of a word.
pub const PUNCTUATION: [char; 9] = ['.', ',', ';', ':', '!', '?', '،', '؛', '׃'];

/// A normalized word with its 0-based position and the punctuation attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub position: usize,
    /// Punctuation marks following the word, in source order.
    pub marks: String,
}

#[must_use]
pub fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(&c)
}

// Cantillation and vowel points. Maqaf, paseq, sof pasuq and nun hafukha are
// punctuation-like and stay.
fn is_hebrew_point(c: char) -> bool {
    matches!(c, '\u{0591}'..='\u{05C7}')
        && !matches!(c, '\u{05BE}' | '\u{05C0}' | '\u{05C3}' | '\u{05C6}')
}

/// Remove niqqud, cantillation and combining accents, returning NFC text.
#[must_use]
pub fn strip_diacritics(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c) && !is_hebrew_point(*c))
        .nfc()
        .collect()
}

/// Collapse runs of whitespace into single spaces and trim the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Diacritic-free, lowercased, whitespace-collapsed form. Punctuation is kept.
#[must_use]
pub fn fold(text: &str) -> String {
    collapse_whitespace(&strip_diacritics(text).to_lowercase())
}

/// Normalized comparison string. With `keep_punctuation == false` the marks are
/// removed and the remaining words are re-joined by single spaces.
#[must_use]
pub fn normalize_text(text: &str, keep_punctuation: bool) -> String {
    let folded = fold(text);
    if keep_punctuation {
        return folded;
    }
    tokenize(&folded)
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

// A period or comma between two digits is a decimal separator ("38.5"), not punctuation.
fn is_mark_at(chars: &[char], i: usize) -> bool {
    let c = chars[i];
    if !is_punctuation(c) {
        return false;
    }
    let inside_number = matches!(c, '.' | ',')
        && i > 0
        && i + 1 < chars.len()
        && chars[i - 1].is_numeric()
        && chars[i + 1].is_numeric();
    !inside_number
}

/// Split already-folded text into word tokens.
///
/// Marks attach to the preceding word; marks before the first word attach to
/// the first word. Marks with no word anywhere are dropped.
#[must_use]
pub fn tokenize(folded: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut leading = String::new();

    for chunk in folded.split_whitespace() {
        let chars: Vec<char> = chunk.chars().collect();
        let mut word = String::new();
        for i in 0..chars.len() {
            if is_mark_at(&chars, i) {
                flush_word(&mut tokens, &mut word, &mut leading);
                match tokens.last_mut() {
                    Some(last) => last.marks.push(chars[i]),
                    None => leading.push(chars[i]),
                }
            } else {
                word.push(chars[i]);
            }
        }
        flush_word(&mut tokens, &mut word, &mut leading);
    }

    tokens
}

fn flush_word(tokens: &mut Vec<Token>, word: &mut String, leading: &mut String) {
    if word.is_empty() {
        return;
    }
    tokens.push(Token {
        text: std::mem::take(word),
        position: tokens.len(),
        marks: std::mem::take(leading),
    });
}
