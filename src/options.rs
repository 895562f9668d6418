//! Extraction options and configuration.

use crate::error::{Error, Result};

/// Default minimum font size (points) for an H1 heading.
pub const DEFAULT_MIN_H1: f64 = 18.0;
/// Default minimum font size (points) for an H2 heading.
pub const DEFAULT_MIN_H2: f64 = 14.0;
/// Default minimum font size (points) for an H3 heading.
pub const DEFAULT_MIN_H3: f64 = 10.0;
/// Default bound (pixels) on either side of an image preview.
pub const DEFAULT_PREVIEW_MAX_SIZE: u32 = 160;

/// Font-size cutoffs for the three heading tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingThresholds {
    pub min_h1: f64,
    pub min_h2: f64,
    pub min_h3: f64,
}

impl HeadingThresholds {
    pub fn new(min_h1: f64, min_h2: f64, min_h3: f64) -> Self {
        Self {
            min_h1,
            min_h2,
            min_h3,
        }
    }

    /// Check that the cutoffs are finite and non-increasing.
    pub fn validate(&self) -> Result<()> {
        let all = [self.min_h1, self.min_h2, self.min_h3];
        if all.iter().any(|t| !t.is_finite()) {
            return Err(Error::InvalidOptions(format!(
                "heading thresholds must be finite, got {:?}",
                all
            )));
        }
        if self.min_h3 < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "min_h3 must not be negative, got {}",
                self.min_h3
            )));
        }
        if self.min_h1 < self.min_h2 || self.min_h2 < self.min_h3 {
            return Err(Error::InvalidOptions(format!(
                "heading thresholds must satisfy min_h1 >= min_h2 >= min_h3, got {} / {} / {}",
                self.min_h1, self.min_h2, self.min_h3
            )));
        }
        Ok(())
    }
}

impl Default for HeadingThresholds {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_H1, DEFAULT_MIN_H2, DEFAULT_MIN_H3)
    }
}

/// Options for a single extraction call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Heading font-size cutoffs
    pub thresholds: HeadingThresholds,

    /// Maximum width and height of an image preview, in pixels
    pub image_preview_max_size: u32,

    /// Build a preview for the first image reference on each page only
    pub detect_first_image_only: bool,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all three heading thresholds.
    pub fn with_thresholds(mut self, min_h1: f64, min_h2: f64, min_h3: f64) -> Self {
        self.thresholds = HeadingThresholds::new(min_h1, min_h2, min_h3);
        self
    }

    /// Set the preview size bound.
    pub fn with_preview_max_size(mut self, size: u32) -> Self {
        self.image_preview_max_size = size;
        self
    }

    /// Build a preview for every image reference on a page.
    pub fn with_all_images(mut self) -> Self {
        self.detect_first_image_only = false;
        self
    }

    /// Build a preview for the first image reference on a page only.
    pub fn first_image_only(mut self) -> Self {
        self.detect_first_image_only = true;
        self
    }

    /// Reject option sets the extractor cannot honor.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        if self.image_preview_max_size == 0 {
            return Err(Error::InvalidOptions(
                "image_preview_max_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            thresholds: HeadingThresholds::default(),
            image_preview_max_size: DEFAULT_PREVIEW_MAX_SIZE,
            detect_first_image_only: true,
        }
    }
}
