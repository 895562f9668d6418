//! Merging per-page output into one result.

use std::collections::{BTreeSet, HashSet};

use crate::error::PageScanWarning;
use crate::model::{ExtractionResult, Heading, ImagePreview, LinkRef, Metadata, UNTITLED};

/// Everything one page contributed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageOutput {
    pub page: u32,
    pub has_images: bool,
    pub headings: Vec<Heading>,
    pub links: Vec<LinkRef>,
    pub previews: Vec<ImagePreview>,
    pub warnings: Vec<PageScanWarning>,
}

impl PageOutput {
    pub fn new(page: u32) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }
}

/// Combine page outputs (in page order) into the final result.
pub fn assemble<I>(title: Option<&str>, pages: I) -> ExtractionResult
where
    I: IntoIterator<Item = PageOutput>,
{
    let mut headings = Vec::new();
    let mut image_pages = BTreeSet::new();
    let mut metadata = Metadata::default();
    let mut warnings = Vec::new();

    for page in pages {
        if page.has_images {
            image_pages.insert(page.page);
        }
        headings.extend(page.headings);
        metadata.links.extend(page.links);
        metadata.image_previews.extend(page.previews);
        warnings.extend(page.warnings);
    }

    metadata.pages_with_images = image_pages.into_iter().collect();

    ExtractionResult {
        title: resolve_title(title),
        headings: dedup_headings(headings),
        metadata,
        warnings,
    }
}

/// Drop repeated headings, keeping the first occurrence.
///
/// Two headings repeat when level, page and case-folded text all match.
pub fn dedup_headings(headings: Vec<Heading>) -> Vec<Heading> {
    let mut seen = HashSet::new();
    headings
        .into_iter()
        .filter(|h| seen.insert(h.dedup_key()))
        .collect()
}

/// Trimmed title, or [`UNTITLED`] when missing or blank.
pub fn resolve_title(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => UNTITLED.to_string(),
    }
}
