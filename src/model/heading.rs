//! Heading and text-run types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse heading tier inferred from font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Numeric level (1 for H1).
    pub fn as_u8(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.as_u8())
    }
}

/// The joined text of one line, with the largest font size seen on it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font_size: f64,
    pub page: u32,
}

impl TextRun {
    pub fn new(text: impl Into<String>, font_size: f64, page: u32) -> Self {
        Self {
            text: text.into(),
            font_size,
            page,
        }
    }
}

/// A classified heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading tier
    pub level: HeadingLevel,

    /// Whitespace-normalized text
    pub text: String,

    /// Page number (1-indexed)
    pub page: u32,

    /// Font size in points, rounded to two decimals
    pub font_size: f64,
}

impl Heading {
    /// Key used to drop repeated headings: level, case-folded text and page.
    pub fn dedup_key(&self) -> (HeadingLevel, String, u32) {
        (self.level, self.text.to_lowercase(), self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_serializes_as_tag() {
        let json = serde_json::to_string(&HeadingLevel::H2).unwrap();
        assert_eq!(json, "\"H2\"");
        assert_eq!(HeadingLevel::H3.to_string(), "H3");
    }

    #[test]
    fn test_heading_field_names() {
        let heading = Heading {
            level: HeadingLevel::H1,
            text: "Chapter 1".to_string(),
            page: 1,
            font_size: 20.0,
        };
        let value = serde_json::to_value(&heading).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"level": "H1", "text": "Chapter 1", "page": 1, "font_size": 20.0})
        );
    }

    #[test]
    fn test_dedup_key_is_case_insensitive() {
        let a = Heading {
            level: HeadingLevel::H2,
            text: "Contents".to_string(),
            page: 4,
            font_size: 14.0,
        };
        let b = Heading {
            text: "CONTENTS".to_string(),
            font_size: 14.5,
            ..a.clone()
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
    }
}
