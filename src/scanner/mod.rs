//! Per-page scanners.
//!
//! Each scanner reads one aspect of a page (image references, link
//! annotations, text lines) and fails independently of the others.

pub mod images;
pub mod links;
pub mod text;

pub use images::{image_payload, page_image_refs};
pub use links::page_links;
pub use text::{page_blocks, text_runs, PageBlock, TextBlock, TextLine, TextSpan};
