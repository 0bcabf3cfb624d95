use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown SOAP section: {0}")]
pub struct UnknownSection(pub String);

/// The four parts of a SOAP note. Exercises and progress are bucketed by section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    Subjective,
    Objective,
    Assessment,
    Plan,
}

impl Section {
    /// Fixed enumeration order. Every deterministic tie-break walks this list.
    pub const ALL: [Section; 4] = [
        Section::Subjective,
        Section::Objective,
        Section::Assessment,
        Section::Plan,
    ];

    /// Position of the section inside [`Section::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Section::Subjective => 0,
            Section::Objective => 1,
            Section::Assessment => 2,
            Section::Plan => 3,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Subjective => "Subjective",
            Section::Objective => "Objective",
            Section::Assessment => "Assessment",
            Section::Plan => "Plan",
        }
    }

    /// Bilingual label shown to learners.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Section::Subjective => "Subjective (נתונים סובייקטיביים)",
            Section::Objective => "Objective (נתונים אובייקטיביים)",
            Section::Assessment => "Assessment (הערכה)",
            Section::Plan => "Plan (תוכנית טיפול)",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Section::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownSection(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_enumeration_order() {
        for (i, section) in Section::ALL.into_iter().enumerate() {
            assert_eq!(section.index(), i);
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("plan".parse::<Section>().unwrap(), Section::Plan);
        assert_eq!(" Objective ".parse::<Section>().unwrap(), Section::Objective);
        let err = "History".parse::<Section>().unwrap_err();
        assert_eq!(err, UnknownSection("History".into()));
    }
}
