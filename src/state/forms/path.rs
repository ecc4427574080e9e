//! Positional keys for sections, answers and notes
//!
//! A section is addressed by its chain of indices: the top-level index
//! followed by one subsection index per nesting level. Keys are positional,
//! so reordering a template's content moves answers to different keys.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix shared by every answer key
pub const RESPONSES_PREFIX: &str = "responses";

/// Suffix of the free-text note paired with a question
pub const NOTE_SUFFIX: &str = "observacion";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("path must start with 'responses.': {0}")]
    MissingPrefix(String),
    #[error("invalid path segment '{segment}' in {path}")]
    InvalidSegment { path: String, segment: String },
    #[error("path has no question segment: {0}")]
    MissingQuestion(String),
}

/// Position of a section within the template forest
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionPath {
    chain: Vec<usize>,
}

impl SectionPath {
    /// Path of a top-level section
    pub fn root(index: usize) -> Self {
        Self { chain: vec![index] }
    }

    /// Path of the `index`-th subsection of this section
    pub fn child(&self, index: usize) -> Self {
        let mut chain = self.chain.clone();
        chain.push(index);
        Self { chain }
    }

    /// Nesting depth, 0 for top-level sections
    pub fn depth(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }

    /// Key of the `index`-th question of this section
    pub fn question(&self, index: usize) -> FieldPath {
        FieldPath {
            section: self.clone(),
            question: index,
        }
    }
}

impl fmt::Display for SectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(RESPONSES_PREFIX)?;
        for (level, index) in self.chain.iter().enumerate() {
            if level == 0 {
                write!(f, ".s{index}")?;
            } else {
                write!(f, ".sub{index}")?;
            }
        }
        Ok(())
    }
}

/// Key of a single question's answer slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    section: SectionPath,
    question: usize,
}

impl FieldPath {
    pub fn section(&self) -> &SectionPath {
        &self.section
    }

    /// Key of the note slot paired with this question
    pub fn note_key(&self) -> String {
        format!("{self}.{NOTE_SUFFIX}")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.q{}", self.section, self.question)
    }
}

impl FromStr for FieldPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(RESPONSES_PREFIX)
            .and_then(|r| r.strip_prefix('.'))
            .ok_or_else(|| PathParseError::MissingPrefix(s.to_string()))?;

        let invalid = |segment: &str| PathParseError::InvalidSegment {
            path: s.to_string(),
            segment: segment.to_string(),
        };

        let segments: Vec<&str> = rest.split('.').collect();
        let (last, sections) = segments
            .split_last()
            .ok_or_else(|| PathParseError::MissingQuestion(s.to_string()))?;

        let question = last
            .strip_prefix('q')
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| PathParseError::MissingQuestion(s.to_string()))?;

        let mut chain = Vec::with_capacity(sections.len());
        for (level, segment) in sections.iter().enumerate() {
            let digits = if level == 0 {
                segment.strip_prefix('s')
            } else {
                segment.strip_prefix("sub")
            };
            let index = digits
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| invalid(segment))?;
            chain.push(index);
        }

        if chain.is_empty() {
            return Err(PathParseError::MissingQuestion(s.to_string()));
        }

        Ok(Self {
            section: SectionPath { chain },
            question,
        })
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_section_key() {
        assert_eq!(SectionPath::root(0).to_string(), "responses.s0");
        assert_eq!(SectionPath::root(0).depth(), 0);
    }

    #[test]
    fn test_nested_section_key() {
        let path = SectionPath::root(2).child(1).child(0);
        assert_eq!(path.to_string(), "responses.s2.sub1.sub0");
        assert_eq!(path.depth(), 2);
    }

    #[test]
    fn test_question_and_note_keys() {
        let field = SectionPath::root(1).child(3).question(4);
        assert_eq!(field.to_string(), "responses.s1.sub3.q4");
        assert_eq!(field.note_key(), "responses.s1.sub3.q4.observacion");
    }

    #[test]
    fn test_parse_round_trip() {
        let field = SectionPath::root(10).child(2).question(7);
        let parsed: FieldPath = field.to_string().parse().unwrap();
        assert_eq!(parsed, field);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            "answers.s0.q0".parse::<FieldPath>(),
            Err(PathParseError::MissingPrefix(_))
        ));
        assert!(matches!(
            "responses.s0.s1.q0".parse::<FieldPath>(),
            Err(PathParseError::InvalidSegment { .. })
        ));
        assert!(matches!(
            "responses.s0".parse::<FieldPath>(),
            Err(PathParseError::MissingQuestion(_))
        ));
        assert!(matches!(
            "responses.q0".parse::<FieldPath>(),
            Err(PathParseError::MissingQuestion(_))
        ));
    }

    #[test]
    fn test_ordering_follows_position() {
        let a = SectionPath::root(2).question(0);
        let b = SectionPath::root(10).question(0);
        let c = SectionPath::root(2).child(0).question(0);
        assert!(a < b);
        assert!(a < c);
        assert!(c < b);
    }

    #[test]
    fn test_serializes_as_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(SectionPath::root(0).question(1), 5);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"responses.s0.q1":5}"#);

        let back: std::collections::BTreeMap<FieldPath, i32> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
