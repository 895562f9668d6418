//! Image reference discovery and image stream access.

use std::collections::HashSet;

use lopdf::{Dictionary, Object, Stream};

use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::model::{ColorModel, ImagePayload, ImageRef, ObjectId};

/// Depth limit for `/Parent` chains and nested form XObjects.
const MAX_NESTING: usize = 32;

/// List the image XObjects a page references, in resource order.
///
/// Images drawn through form XObjects are included. Each image object is
/// reported once per page even when referenced under several names.
pub fn page_image_refs(doc: &PdfDocument, page_num: u32) -> Result<Vec<ImageRef>> {
    let page_id = doc.page_id(page_num)?;
    let page = doc.raw_doc().get_dictionary(page_id)?;

    let mut collector = ImageCollector::default();
    if let Some(resources) = page_resources(doc, page) {
        collector.collect(doc, resources, 0)?;
    }
    Ok(collector.refs)
}

#[derive(Default)]
struct ImageCollector {
    refs: Vec<ImageRef>,
    seen_images: HashSet<ObjectId>,
    seen_forms: HashSet<ObjectId>,
}

impl ImageCollector {
    fn collect(&mut self, doc: &PdfDocument, resources: &Dictionary, depth: usize) -> Result<()> {
        let xobjects = match resources.get(b"XObject") {
            Ok(obj) => doc
                .resolve_dict(obj)
                .ok_or_else(|| Error::PdfParse("XObject resource is not a dictionary".into()))?,
            Err(_) => return Ok(()),
        };

        for (name, obj) in xobjects.iter() {
            let Object::Reference(id) = obj else {
                continue;
            };
            let stream = match doc.raw_doc().get_object(*id) {
                Ok(Object::Stream(stream)) => stream,
                _ => {
                    log::debug!("XObject {:?} does not resolve to a stream", id);
                    continue;
                }
            };

            match stream.dict.get(b"Subtype").and_then(Object::as_name).ok() {
                Some(b"Image") => {
                    if self.seen_images.insert(*id) {
                        self.refs
                            .push(ImageRef::new(*id, String::from_utf8_lossy(name)));
                    }
                }
                Some(b"Form") => {
                    if depth >= MAX_NESTING || !self.seen_forms.insert(*id) {
                        continue;
                    }
                    let form_resources = stream
                        .dict
                        .get(b"Resources")
                        .ok()
                        .and_then(|r| doc.resolve_dict(r));
                    if let Some(form_resources) = form_resources {
                        self.collect(doc, form_resources, depth + 1)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Resources of a page, following inheritance through `/Parent`.
fn page_resources<'a>(doc: &'a PdfDocument, page: &'a Dictionary) -> Option<&'a Dictionary> {
    let mut node = page;
    for _ in 0..MAX_NESTING {
        if let Ok(resources) = node.get(b"Resources") {
            return doc.resolve_dict(resources);
        }
        node = doc.resolve_dict(node.get(b"Parent").ok()?)?;
    }
    None
}

/// Read the bytes of an image object in a form the preview builder accepts.
pub fn image_payload(doc: &PdfDocument, image: &ImageRef) -> Result<ImagePayload> {
    let stream = match doc.raw_doc().get_object(image.object_id)? {
        Object::Stream(stream) => stream,
        _ => {
            return Err(Error::ImageDecode(format!(
                "image {} is not a stream",
                image.name
            )))
        }
    };
    payload_from_stream(doc, stream)
}

fn payload_from_stream(doc: &PdfDocument, stream: &Stream) -> Result<ImagePayload> {
    let filters = stream_filters(&stream.dict);

    let samples = match filters.last().map(Vec::as_slice) {
        Some(b"DCTDecode") if filters.len() == 1 => {
            return Ok(ImagePayload::Encoded(stream.content.clone()));
        }
        Some(b"FlateDecode") | Some(b"LZWDecode") => stream
            .decompressed_content()
            .map_err(|e| Error::ImageDecode(format!("failed to decompress image: {}", e)))?,
        Some(other) => {
            return Ok(ImagePayload::Unsupported(format!(
                "unsupported image filter: {}",
                String::from_utf8_lossy(other)
            )));
        }
        None => stream.content.clone(),
    };

    let dict = &stream.dict;
    if dict
        .get(b"ImageMask")
        .and_then(Object::as_bool)
        .unwrap_or(false)
    {
        return Ok(ImagePayload::Unsupported("stencil image mask".to_string()));
    }

    let width = dimension(dict, b"Width")?;
    let height = dimension(dict, b"Height")?;
    let bits = dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    let Ok(bits_per_component) = u8::try_from(bits) else {
        return Ok(ImagePayload::Unsupported(format!(
            "unsupported bits per component: {}",
            bits
        )));
    };

    let color = match dict.get(b"ColorSpace") {
        Ok(cs) => match color_model(doc, cs) {
            Some(color) => color,
            None => {
                return Ok(ImagePayload::Unsupported(
                    "unsupported image color space".to_string(),
                ))
            }
        },
        Err(_) => {
            return Ok(ImagePayload::Unsupported(
                "image has no color space".to_string(),
            ))
        }
    };

    Ok(ImagePayload::Raw {
        width,
        height,
        bits_per_component,
        color,
        samples,
    })
}

fn dimension(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    dict.get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            Error::ImageDecode(format!(
                "image has no valid /{}",
                String::from_utf8_lossy(key)
            ))
        })
}

/// Filter names of a stream, in application order.
fn stream_filters(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

/// Map a `/ColorSpace` entry to a color model we can convert.
fn color_model(doc: &PdfDocument, cs: &Object) -> Option<ColorModel> {
    match doc.resolve(cs).ok()? {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" | b"G" => Some(ColorModel::Gray),
            b"DeviceRGB" | b"CalRGB" | b"RGB" => Some(ColorModel::Rgb),
            b"DeviceCMYK" | b"CMYK" => Some(ColorModel::Cmyk),
            _ => None,
        },
        Object::Array(arr) => {
            let family = arr.first()?.as_name().ok()?;
            match family {
                b"ICCBased" => {
                    let profile = doc.resolve_dict(arr.get(1)?)?;
                    let n = profile.get(b"N").and_then(Object::as_i64).ok()?;
                    ColorModel::from_components(n)
                }
                b"CalGray" => Some(ColorModel::Gray),
                b"CalRGB" => Some(ColorModel::Rgb),
                _ => None,
            }
        }
        _ => None,
    }
}
