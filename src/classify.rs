//! Font-size heading classification.
//!
//! A line is a heading purely because of its size: the largest span on the
//! line is compared against three fixed cutoffs. No font weight, casing or
//! position is consulted.

use crate::model::{Heading, HeadingLevel, TextRun};
use crate::options::HeadingThresholds;

/// Map a font size to a heading tier.
///
/// Tiers are strict cutoffs checked from the top, so a size exactly on a
/// threshold lands in the higher tier. NaN is never a heading.
pub fn classify(font_size: f64, thresholds: &HeadingThresholds) -> Option<HeadingLevel> {
    if font_size >= thresholds.min_h1 {
        Some(HeadingLevel::H1)
    } else if font_size >= thresholds.min_h2 {
        Some(HeadingLevel::H2)
    } else if font_size >= thresholds.min_h3 {
        Some(HeadingLevel::H3)
    } else {
        None
    }
}

/// Collapse whitespace runs to single spaces and trim both ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Round a font size to two decimals for display.
pub fn round_font_size(size: f64) -> f64 {
    (size * 100.0).round() / 100.0
}

/// Turn a text run into a heading when its size qualifies.
///
/// Classification uses the unrounded size; only the stored value is rounded.
pub fn classify_run(run: &TextRun, thresholds: &HeadingThresholds) -> Option<Heading> {
    let level = classify(run.font_size, thresholds)?;
    let text = normalize_text(&run.text);
    if text.is_empty() {
        return None;
    }

    Some(Heading {
        level,
        text,
        page: run.page,
        font_size: round_font_size(run.font_size),
    })
}
