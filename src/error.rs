//! Error types for outlineiq.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for outlineiq operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during outline extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and cannot be opened without a password.
    #[error("Document is encrypted")]
    Encrypted,

    /// Extraction options were rejected before opening the document.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// An image payload could not be decoded into a preview.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Unexpected failure after the document was opened.
    #[error("Extraction failed: {context}: {source}")]
    Extraction {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Wrap an unexpected failure, keeping the original cause.
    pub fn extraction(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Extraction {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Whether this error means the document could not be opened at all.
    pub fn is_open_error(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::PdfParse(_)
                | Error::Encrypted
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageDecode(err.to_string())
    }
}

/// Which part of a page scan failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStage {
    Images,
    Links,
    Text,
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanStage::Images => "image",
            ScanStage::Links => "link",
            ScanStage::Text => "text",
        };
        f.write_str(name)
    }
}

/// A recovered per-page failure.
///
/// The failing stage contributes nothing for that page; the remaining stages
/// and pages are still scanned.
#[derive(Debug, Clone, PartialEq)]
pub struct PageScanWarning {
    /// 1-based page number
    pub page: u32,
    /// Stage that failed
    pub stage: ScanStage,
    /// Description of the underlying error
    pub message: String,
}

impl PageScanWarning {
    pub fn new(page: u32, stage: ScanStage, err: &Error) -> Self {
        Self {
            page,
            stage,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for PageScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} extraction failed on page {}: {}",
            self.stage, self.page, self.message
        )
    }
}
