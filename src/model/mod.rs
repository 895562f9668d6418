//! Data model for extraction results.
//!
//! Everything here is created fresh for each extraction call. `TextRun` and
//! the image resource types live only while a page is being processed; the
//! remaining types make up the serialized `ExtractionResult`.

mod heading;
mod resource;
mod result;

pub use heading::{Heading, HeadingLevel, TextRun};
pub use resource::{ColorModel, ImagePayload, ImageRef, ObjectId};
pub use result::{ExtractionResult, ImagePreview, LinkRef, Metadata, UNTITLED};
