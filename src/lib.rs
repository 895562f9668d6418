//! # outlineiq
//!
//! Heading outlines, hyperlinks and image thumbnails from PDF documents.
//!
//! Headings are inferred from font size alone: every text line is measured by
//! its largest span and sorted into H1, H2 or H3 by fixed cutoffs. Links are
//! read from URI link annotations, and the first image on each page (or every
//! image, if asked) is turned into a small PNG data URI.
//!
//! ## Quick Start
//!
//! ```no_run
//! use outlineiq::{extract_file, render, ExtractOptions};
//!
//! fn main() -> outlineiq::Result<()> {
//!     let result = extract_file("document.pdf", &ExtractOptions::default())?;
//!
//!     for heading in &result.headings {
//!         println!("{} {} (p. {})", heading.level, heading.text, heading.page);
//!     }
//!
//!     let json = render::to_json(&result, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Only failing to open the document is fatal. A page whose images, links
//! or text cannot be read contributes nothing for that part and is reported
//! in [`ExtractionResult::warnings`]; an image that cannot be decoded simply
//! gets no preview.

pub mod assemble;
pub mod backend;
pub mod batch;
pub mod classify;
pub mod detect;
pub mod document;
pub mod error;
pub mod extract;
pub mod model;
pub mod options;
pub mod preview;
pub mod render;
pub mod scanner;

// Re-export commonly used types
pub use backend::PdfBackend;
pub use batch::{BatchOptions, BatchOutcome, BatchReport};
pub use detect::{detect_format_from_bytes, detect_format_from_path, PdfFormat};
pub use document::{PdfDocument, Source};
pub use error::{Error, PageScanWarning, Result, ScanStage};
pub use extract::extract_document;
pub use model::{
    ExtractionResult, Heading, HeadingLevel, ImagePreview, LinkRef, Metadata, TextRun, UNTITLED,
};
pub use options::{ExtractOptions, HeadingThresholds};
pub use render::JsonFormat;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

/// Extract the outline of a PDF from a path or a byte buffer.
///
/// The document is opened, scanned page by page and released before this
/// returns, whatever the outcome.
///
/// # Example
///
/// ```no_run
/// use outlineiq::{extract, ExtractOptions, Source};
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let result = extract(Source::Bytes(&data), &ExtractOptions::default()).unwrap();
/// println!("{}: {} headings", result.title, result.headings.len());
/// ```
pub fn extract<'a>(
    source: impl Into<Source<'a>>,
    options: &ExtractOptions,
) -> Result<ExtractionResult> {
    options.validate()?;
    let doc = PdfDocument::open(source.into())?;
    scan(&doc, options)
}

/// Extract the outline of a document that is already open.
///
/// Options are checked and a panic during the scan is reported as
/// [`Error::Extraction`], exactly as in [`extract`]. Use this when the
/// caller also needs the document itself, e.g. for its page count.
pub fn extract_opened(doc: &PdfDocument, options: &ExtractOptions) -> Result<ExtractionResult> {
    options.validate()?;
    scan(doc, options)
}

fn scan(doc: &PdfDocument, options: &ExtractOptions) -> Result<ExtractionResult> {
    catch_unwind(AssertUnwindSafe(|| extract_document(doc, options)))
        .map_err(|panic| Error::extraction("scanning document", panic_message(panic.as_ref())))
}

/// Extract the outline of a PDF file.
///
/// # Example
///
/// ```no_run
/// use outlineiq::{extract_file, ExtractOptions};
///
/// let options = ExtractOptions::new().with_thresholds(20.0, 14.0, 11.0);
/// let result = extract_file("report.pdf", &options).unwrap();
/// println!("Pages with images: {:?}", result.metadata.pages_with_images);
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<ExtractionResult> {
    extract(Source::Path(path.as_ref()), options)
}

/// Extract the outline of a PDF held in memory.
pub fn extract_bytes(data: &[u8], options: &ExtractOptions) -> Result<ExtractionResult> {
    extract(Source::Bytes(data), options)
}

/// Extract a file without blocking the async runtime.
///
/// The file is read asynchronously and the scan runs on the blocking pool.
#[cfg(feature = "async")]
pub async fn extract_file_async<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
) -> Result<ExtractionResult> {
    let data = tokio::fs::read(path.as_ref()).await?;
    let options = options.clone();

    tokio::task::spawn_blocking(move || extract_bytes(&data, &options))
        .await
        .map_err(|e| Error::extraction("extraction task", e))?
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic during extraction".to_string()
    }
}
