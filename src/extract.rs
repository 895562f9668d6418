//! The extraction engine.
//!
//! Pages are scanned strictly in order. Every page runs three independent
//! stages (images, links, text); a failing stage is logged, recorded as a
//! [`PageScanWarning`] and contributes nothing, while the other stages and
//! pages carry on.

use crate::assemble::{assemble, PageOutput};
use crate::backend::PdfBackend;
use crate::classify::classify_run;
use crate::error::{PageScanWarning, Result, ScanStage};
use crate::model::{ExtractionResult, ImagePreview, ImageRef, LinkRef};
use crate::options::ExtractOptions;
use crate::preview::build_preview;

/// Run the full extraction over an opened document.
pub fn extract_document<B>(backend: &B, options: &ExtractOptions) -> ExtractionResult
where
    B: PdfBackend + ?Sized,
{
    let pages = backend.page_numbers();
    log::debug!("Extracting outline from {} pages", pages.len());

    let outputs = pages
        .into_iter()
        .map(|page| scan_page(backend, page, options));

    let result = assemble(backend.title().as_deref(), outputs);

    if result.has_warnings() {
        log::info!(
            "Extraction finished with {} page warnings",
            result.warnings.len()
        );
    }
    result
}

/// Scan one page.
pub fn scan_page<B>(backend: &B, page: u32, options: &ExtractOptions) -> PageOutput
where
    B: PdfBackend + ?Sized,
{
    let mut output = PageOutput::new(page);

    if let Some(images) = stage(&mut output, ScanStage::Images, backend.image_refs(page)) {
        output.has_images = !images.is_empty();
        output.previews = page_previews(backend, page, &images, options);
    }

    if let Some(uris) = stage(&mut output, ScanStage::Links, backend.links(page)) {
        output.links = uris
            .into_iter()
            .map(|uri| LinkRef { page, uri })
            .collect();
    }

    if let Some(runs) = stage(&mut output, ScanStage::Text, backend.text_runs(page)) {
        output.headings = runs
            .iter()
            .filter_map(|run| classify_run(run, &options.thresholds))
            .collect();
    }

    output
}

/// Unwrap a stage result, turning a failure into a page warning.
fn stage<T>(output: &mut PageOutput, stage: ScanStage, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            let warning = PageScanWarning::new(output.page, stage, &err);
            log::warn!("{}", warning);
            output.warnings.push(warning);
            None
        }
    }
}

/// Previews for a page's images; undecodable images are skipped.
fn page_previews<B>(
    backend: &B,
    page: u32,
    images: &[ImageRef],
    options: &ExtractOptions,
) -> Vec<ImagePreview>
where
    B: PdfBackend + ?Sized,
{
    let limit = if options.detect_first_image_only {
        1
    } else {
        images.len()
    };

    images
        .iter()
        .take(limit)
        .filter_map(|image| {
            let preview = backend
                .image_payload(image)
                .and_then(|payload| build_preview(&payload, options.image_preview_max_size));
            match preview {
                Ok(preview) => Some(ImagePreview { page, preview }),
                Err(err) => {
                    log::debug!(
                        "Skipping preview of image {} on page {}: {}",
                        image.name,
                        page,
                        err
                    );
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    use crate::error::Error;
    use crate::model::{HeadingLevel, ImagePayload, TextRun};

    /// In-memory backend with per-page canned answers.
    #[derive(Default)]
    struct MockBackend {
        title: Option<String>,
        pages: Vec<u32>,
        images: HashMap<u32, Vec<ImageRef>>,
        payloads: HashMap<String, ImagePayload>,
        links: HashMap<u32, Vec<String>>,
        runs: HashMap<u32, Vec<TextRun>>,
        broken_text: Vec<u32>,
        broken_images: Vec<u32>,
    }

    impl PdfBackend for MockBackend {
        fn page_numbers(&self) -> Vec<u32> {
            self.pages.clone()
        }

        fn title(&self) -> Option<String> {
            self.title.clone()
        }

        fn image_refs(&self, page: u32) -> Result<Vec<ImageRef>> {
            if self.broken_images.contains(&page) {
                return Err(Error::PdfParse("bad XObject".into()));
            }
            Ok(self.images.get(&page).cloned().unwrap_or_default())
        }

        fn image_payload(&self, image: &ImageRef) -> Result<ImagePayload> {
            self.payloads
                .get(&image.name)
                .cloned()
                .ok_or_else(|| Error::ImageDecode("missing".into()))
        }

        fn links(&self, page: u32) -> Result<Vec<String>> {
            Ok(self.links.get(&page).cloned().unwrap_or_default())
        }

        fn text_runs(&self, page: u32) -> Result<Vec<TextRun>> {
            if self.broken_text.contains(&page) {
                return Err(Error::PdfParse("Invalid content stream".into()));
            }
            Ok(self.runs.get(&page).cloned().unwrap_or_default())
        }
    }

    fn png(width: u32, height: u32) -> ImagePayload {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([0, 128, 255])))
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        ImagePayload::Encoded(buffer.into_inner())
    }

    fn image(id: u32, name: &str) -> ImageRef {
        ImageRef::new((id, 0), name)
    }

    fn runs(page: u32, lines: &[(&str, f64)]) -> Vec<TextRun> {
        lines
            .iter()
            .map(|(text, size)| TextRun::new(*text, *size, page))
            .collect()
    }

    #[test]
    fn test_single_page_outline() {
        let mut backend = MockBackend {
            pages: vec![1],
            ..Default::default()
        };
        backend
            .runs
            .insert(1, runs(1, &[("Chapter 1", 20.0), ("Section 1.1", 12.0), ("body", 9.0)]));
        backend
            .links
            .insert(1, vec!["https://example.com".to_string()]);
        backend.images.insert(1, vec![image(10, "Im1")]);
        backend.payloads.insert("Im1".into(), png(320, 240));

        let options = ExtractOptions::default().with_thresholds(18.0, 12.0, 10.0);
        let result = extract_document(&backend, &options);

        assert_eq!(result.title, "Untitled");
        assert_eq!(result.headings.len(), 2);
        assert_eq!(result.headings[0].level, HeadingLevel::H1);
        assert_eq!(result.headings[1].level, HeadingLevel::H2);
        assert_eq!(result.headings[1].font_size, 12.0);
        assert_eq!(result.metadata.links[0].uri, "https://example.com");
        assert_eq!(result.metadata.pages_with_images, vec![1]);
        assert_eq!(result.metadata.image_previews.len(), 1);
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_broken_text_keeps_other_stages() {
        let mut backend = MockBackend {
            pages: vec![1, 2],
            broken_text: vec![1],
            ..Default::default()
        };
        backend.links.insert(1, vec!["https://a.example".into()]);
        backend.runs.insert(2, runs(2, &[("Results", 16.0)]));

        let result = extract_document(&backend, &ExtractOptions::default());

        assert_eq!(result.metadata.links.len(), 1);
        assert_eq!(result.headings.len(), 1);
        assert_eq!(result.headings[0].page, 2);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].page, 1);
        assert_eq!(result.warnings[0].stage, ScanStage::Text);
    }

    #[test]
    fn test_broken_images_stage_records_no_image_page() {
        let mut backend = MockBackend {
            pages: vec![1],
            broken_images: vec![1],
            ..Default::default()
        };
        backend.runs.insert(1, runs(1, &[("Heading", 24.0)]));

        let result = extract_document(&backend, &ExtractOptions::default());
        assert!(result.metadata.pages_with_images.is_empty());
        assert_eq!(result.headings.len(), 1);
        assert_eq!(result.warnings[0].stage, ScanStage::Images);
    }

    #[test]
    fn test_undecodable_image_still_marks_page() {
        let mut backend = MockBackend {
            pages: vec![1],
            ..Default::default()
        };
        backend.images.insert(1, vec![image(10, "Bad")]);
        backend
            .payloads
            .insert("Bad".into(), ImagePayload::Encoded(vec![0xFF, 0xD8, 0x00]));

        let result = extract_document(&backend, &ExtractOptions::default());
        assert_eq!(result.metadata.pages_with_images, vec![1]);
        assert!(result.metadata.image_previews.is_empty());
        // Image decode failures are not page warnings
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_first_image_only() {
        let mut backend = MockBackend {
            pages: vec![1],
            ..Default::default()
        };
        backend
            .images
            .insert(1, vec![image(10, "A"), image(11, "B"), image(12, "C")]);
        for name in ["A", "B", "C"] {
            backend.payloads.insert(name.into(), png(8, 8));
        }

        let first = extract_document(&backend, &ExtractOptions::default());
        assert_eq!(first.metadata.image_previews.len(), 1);

        let all = extract_document(&backend, &ExtractOptions::default().with_all_images());
        assert_eq!(all.metadata.image_previews.len(), 3);
        assert_eq!(first.metadata.pages_with_images, all.metadata.pages_with_images);
    }

    #[test]
    fn test_first_image_failure_is_not_retried() {
        let mut backend = MockBackend {
            pages: vec![1],
            ..Default::default()
        };
        backend.images.insert(1, vec![image(10, "Bad"), image(11, "Good")]);
        backend.payloads.insert("Good".into(), png(8, 8));

        let result = extract_document(&backend, &ExtractOptions::default());
        assert!(result.metadata.image_previews.is_empty());
        assert_eq!(result.metadata.pages_with_images, vec![1]);
    }

    #[test]
    fn test_repeated_header_deduplicated_per_page() {
        let mut backend = MockBackend {
            pages: vec![1, 2],
            title: Some("  Field Guide ".into()),
            ..Default::default()
        };
        backend
            .runs
            .insert(1, runs(1, &[("Field Guide", 20.0), ("FIELD  GUIDE", 20.0)]));
        backend.runs.insert(2, runs(2, &[("Field Guide", 20.0)]));

        let result = extract_document(&backend, &ExtractOptions::default());
        assert_eq!(result.title, "Field Guide");
        let pages: Vec<u32> = result.headings.iter().map(|h| h.page).collect();
        assert_eq!(pages, vec![1, 2]);
    }

    #[test]
    fn test_scan_page_directly() {
        let mut backend = MockBackend::default();
        backend.runs.insert(7, runs(7, &[("   ", 30.0), ("Appendix", 10.0)]));

        let output = scan_page(&backend, 7, &ExtractOptions::default());
        assert_eq!(output.page, 7);
        assert!(!output.has_images);
        assert_eq!(output.headings.len(), 1);
        assert_eq!(output.headings[0].level, HeadingLevel::H3);
    }
}
