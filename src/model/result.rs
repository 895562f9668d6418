//! Extraction result types.

use serde::{Deserialize, Serialize};

use super::Heading;
use crate::error::PageScanWarning;

/// Title used when the document carries no usable title metadata.
pub const UNTITLED: &str = "Untitled";

/// An external hyperlink found on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub page: u32,
    pub uri: String,
}

/// A thumbnail of one image, embedded as a data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePreview {
    pub page: u32,
    /// `data:image/png;base64,...`
    pub preview: String,
}

/// Link and image information gathered across all pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Pages with at least one image reference, ascending and unique
    pub pages_with_images: Vec<u32>,

    /// External links in page order
    pub links: Vec<LinkRef>,

    /// Image previews in page order
    pub image_previews: Vec<ImagePreview>,
}

/// The outcome of one extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Document title, never empty
    pub title: String,

    /// Deduplicated headings in encounter order
    pub headings: Vec<Heading>,

    /// Links, image pages and previews
    pub metadata: Metadata,

    /// Per-page failures that were recovered during the scan
    #[serde(skip)]
    pub warnings: Vec<PageScanWarning>,
}

impl ExtractionResult {
    /// Whether any page failed partially during the scan.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
