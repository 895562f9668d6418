//! In-memory PDF fixtures for integration tests.

#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// An image placed on a fixture page.
#[derive(Debug, Clone)]
pub enum FixtureImage {
    /// A real JPEG stored with DCTDecode
    Jpeg { width: u32, height: u32 },
    /// Uncompressed 8-bit RGB samples
    RawRgb { width: u32, height: u32 },
    /// DCTDecode stream with garbage bytes
    Corrupt,
    /// A few raw RGB samples under arbitrary declared dimensions and depth
    Declared { width: u32, height: u32, bits: i64 },
}

/// A link annotation on a fixture page.
#[derive(Debug, Clone)]
pub enum FixtureLink {
    /// URI action
    Uri(String),
    /// Jump to another page of the same document
    Internal,
}

/// One page of a fixture document.
#[derive(Debug, Clone, Default)]
pub struct FixturePage {
    /// Lines as (text, font size); each becomes its own text object
    pub lines: Vec<(String, f32)>,
    /// Lines made of several differently sized spans on one baseline
    pub mixed_lines: Vec<Vec<(String, f32)>>,
    pub links: Vec<FixtureLink>,
    pub images: Vec<FixtureImage>,
    /// Content stream operators appended verbatim
    pub raw: Vec<String>,
    /// Replace `/Contents` with a non-stream value
    pub broken_contents: bool,
}

impl FixturePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, text: &str, size: f32) -> Self {
        self.lines.push((text.to_string(), size));
        self
    }

    pub fn mixed_line(mut self, spans: &[(&str, f32)]) -> Self {
        self.mixed_lines
            .push(spans.iter().map(|(t, s)| (t.to_string(), *s)).collect());
        self
    }

    pub fn raw(mut self, content: &str) -> Self {
        self.raw.push(content.to_string());
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        self.links.push(FixtureLink::Uri(uri.to_string()));
        self
    }

    pub fn internal_link(mut self) -> Self {
        self.links.push(FixtureLink::Internal);
        self
    }

    pub fn image(mut self, image: FixtureImage) -> Self {
        self.images.push(image);
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken_contents = true;
        self
    }
}

/// Builds a complete PDF file from fixture pages.
#[derive(Debug, Clone, Default)]
pub struct PdfBuilder {
    title: Option<String>,
    pages: Vec<FixturePage>,
    encrypted: bool,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn page(mut self, page: FixturePage) -> Self {
        self.pages.push(page);
        self
    }

    /// Protect the document with a user password that is not empty.
    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let page_ids: Vec<ObjectId> = (0..self.pages.len()).map(|_| doc.new_object_id()).collect();

        for (page, &page_id) in self.pages.iter().zip(&page_ids) {
            let page_dict = build_page(&mut doc, page, pages_id, font_id, &page_ids);
            doc.objects.insert(page_id, Object::Dictionary(page_dict));
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.pages.len() as i64,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if let Some(title) = &self.title {
            let info_id = doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_str()),
            });
            doc.trailer.set("Info", info_id);
        }

        if self.encrypted {
            // RC4 40-bit handler whose /U does not match the empty password
            let encrypt_id = doc.add_object(dictionary! {
                "Filter" => "Standard",
                "V" => 1,
                "R" => 2,
                "O" => Object::string_literal(vec![0x11u8; 32]),
                "U" => Object::string_literal(vec![0x22u8; 32]),
                "P" => -4,
            });
            doc.trailer.set("Encrypt", encrypt_id);
            doc.trailer.set(
                "ID",
                vec![
                    Object::string_literal(vec![0x33u8; 16]),
                    Object::string_literal(vec![0x33u8; 16]),
                ],
            );
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}

fn build_page(
    doc: &mut Document,
    page: &FixturePage,
    pages_id: ObjectId,
    font_id: ObjectId,
    all_pages: &[ObjectId],
) -> Dictionary {
    let mut content = String::new();
    let mut y = 750;

    for (text, size) in &page.lines {
        content.push_str(&format!("BT /F1 {} Tf 72 {} Td ({}) Tj ET\n", size, y, text));
        y -= 40;
    }

    for spans in &page.mixed_lines {
        content.push_str("BT\n");
        let mut x = 72;
        for (text, size) in spans {
            content.push_str(&format!("/F1 {} Tf 1 0 0 1 {} {} Tm ({}) Tj\n", size, x, y, text));
            x += 20 * (text.len() as i32 + 1);
        }
        content.push_str("ET\n");
        y -= 40;
    }

    for raw in &page.raw {
        content.push_str(raw);
        content.push('\n');
    }

    let mut xobjects = Dictionary::new();
    for (i, image) in page.images.iter().enumerate() {
        let name = format!("Im{}", i + 1);
        let image_id = doc.add_object(image_stream(image));
        xobjects.set(name.as_str(), image_id);
        content.push_str(&format!("q 100 0 0 100 72 {} cm /{} Do Q\n", 100 + i * 110, name));
    }

    let mut annots = Vec::new();
    for link in &page.links {
        let action = match link {
            FixtureLink::Uri(uri) => dictionary! {
                "S" => "URI",
                "URI" => Object::string_literal(uri.as_str()),
            },
            FixtureLink::Internal => dictionary! {
                "S" => "GoTo",
                "D" => vec![Object::Reference(all_pages[0]), "Fit".into()],
            },
        };
        annots.push(Object::Reference(doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![72.into(), 700.into(), 200.into(), 720.into()],
            "A" => action,
        })));
    }

    let contents: Object = if page.broken_contents {
        Object::Integer(42)
    } else {
        Object::Reference(doc.add_object(Stream::new(Dictionary::new(), content.into_bytes())))
    };

    let mut page_dict = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => xobjects,
        },
        "Contents" => contents,
    };
    if !annots.is_empty() {
        page_dict.set("Annots", annots);
    }
    page_dict
}

fn image_stream(image: &FixtureImage) -> Stream {
    match image {
        FixtureImage::Jpeg { width, height } => {
            let mut buffer = Cursor::new(Vec::new());
            DynamicImage::ImageRgb8(gradient(*width, *height))
                .write_to(&mut buffer, ImageFormat::Jpeg)
                .unwrap();
            Stream::new(image_dict(*width, *height, Some("DCTDecode")), buffer.into_inner())
        }
        FixtureImage::RawRgb { width, height } => Stream::new(
            image_dict(*width, *height, None),
            gradient(*width, *height).into_raw(),
        ),
        FixtureImage::Corrupt => Stream::new(
            image_dict(64, 64, Some("DCTDecode")),
            vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xDE, 0xAD, 0xBE, 0xEF],
        ),
        FixtureImage::Declared {
            width,
            height,
            bits,
        } => {
            let mut dict = image_dict(*width, *height, None);
            dict.set("BitsPerComponent", *bits);
            Stream::new(dict, vec![0x80; 12])
        }
    }
}

fn image_dict(width: u32, height: u32, filter: Option<&str>) -> Dictionary {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };
    if let Some(filter) = filter {
        dict.set("Filter", filter);
    }
    dict
}

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

/// The single-page document with a 20pt and a 12pt line, a link and an image.
pub fn chapter_document() -> Vec<u8> {
    PdfBuilder::new()
        .page(
            FixturePage::new()
                .line("Chapter 1", 20.0)
                .line("Section 1.1", 12.0)
                .uri("https://example.com")
                .image(FixtureImage::Jpeg {
                    width: 320,
                    height: 240,
                }),
        )
        .build()
}

/// Prefix a built document with bytes that precede the `%PDF-` header.
pub fn with_leading_junk(data: &[u8]) -> Vec<u8> {
    let mut junk = b"Content-Type: application/pdf\r\n\r\n".to_vec();
    junk.extend_from_slice(data);
    junk
}
