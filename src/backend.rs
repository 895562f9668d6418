//! PDF backend abstraction layer.
//!
//! The extraction engine talks to documents only through [`PdfBackend`], so
//! page scanning and result assembly never touch `lopdf` types directly.

use crate::document::PdfDocument;
use crate::error::Result;
use crate::model::{ImagePayload, ImageRef, TextRun};
use crate::scanner;

/// Abstract interface for the per-page reads an extraction needs.
///
/// Each page method fails independently; the engine treats an error from
/// one of them as a partial failure of that page only.
pub trait PdfBackend {
    /// Page numbers (1-based), ascending.
    fn page_numbers(&self) -> Vec<u32>;

    /// Raw title metadata, untrimmed.
    fn title(&self) -> Option<String>;

    /// Image XObjects referenced by a page.
    fn image_refs(&self, page: u32) -> Result<Vec<ImageRef>>;

    /// Bytes of one image, ready for preview building.
    fn image_payload(&self, image: &ImageRef) -> Result<ImagePayload>;

    /// External URIs of the page's link annotations.
    fn links(&self, page: u32) -> Result<Vec<String>>;

    /// Text lines of the page reduced to runs.
    fn text_runs(&self, page: u32) -> Result<Vec<TextRun>>;
}

impl PdfBackend for PdfDocument {
    fn page_numbers(&self) -> Vec<u32> {
        PdfDocument::page_numbers(self).collect()
    }

    fn title(&self) -> Option<String> {
        PdfDocument::title(self)
    }

    fn image_refs(&self, page: u32) -> Result<Vec<ImageRef>> {
        scanner::page_image_refs(self, page)
    }

    fn image_payload(&self, image: &ImageRef) -> Result<ImagePayload> {
        scanner::image_payload(self, image)
    }

    fn links(&self, page: u32) -> Result<Vec<String>> {
        scanner::page_links(self, page)
    }

    fn text_runs(&self, page: u32) -> Result<Vec<TextRun>> {
        let blocks = scanner::page_blocks(self, page)?;
        Ok(scanner::text_runs(&blocks, page))
    }
}
