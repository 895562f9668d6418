//! Image thumbnails as embeddable data URIs.
//!
//! A payload is decoded to an RGB raster, shrunk so neither side exceeds the
//! configured bound, re-encoded as PNG and wrapped in a base64 data URI so a
//! consumer can render it inline.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};

use crate::error::{Error, Result};
use crate::model::{ColorModel, ImagePayload};

/// MIME prefix of every preview produced here.
pub const PREVIEW_PREFIX: &str = "data:image/png;base64,";

/// Build a PNG data URI thumbnail from an image payload.
pub fn build_preview(payload: &ImagePayload, max_size: u32) -> Result<String> {
    let image = decode_payload(payload)?;
    let thumbnail = make_thumbnail(&image, max_size);

    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(thumbnail).write_to(&mut buffer, ImageFormat::Png)?;

    Ok(to_data_uri(&buffer.into_inner()))
}

/// Wrap PNG bytes as a data URI.
pub fn to_data_uri(png: &[u8]) -> String {
    format!("{}{}", PREVIEW_PREFIX, BASE64.encode(png))
}

/// Decode a payload into an in-memory raster.
pub fn decode_payload(payload: &ImagePayload) -> Result<DynamicImage> {
    match payload {
        ImagePayload::Encoded(bytes) => {
            if bytes.is_empty() {
                return Err(Error::ImageDecode("empty image stream".to_string()));
            }
            Ok(image::load_from_memory(bytes)?)
        }
        ImagePayload::Raw {
            width,
            height,
            bits_per_component,
            color,
            samples,
        } => decode_raw(*width, *height, *bits_per_component, *color, samples),
        ImagePayload::Unsupported(reason) => Err(Error::ImageDecode(reason.clone())),
    }
}

fn decode_raw(
    width: u32,
    height: u32,
    bits_per_component: u8,
    color: ColorModel,
    samples: &[u8],
) -> Result<DynamicImage> {
    if width == 0 || height == 0 {
        return Err(Error::ImageDecode(format!(
            "invalid image dimensions {}x{}",
            width, height
        )));
    }
    if bits_per_component != 8 {
        return Err(Error::ImageDecode(format!(
            "unsupported bits per component: {}",
            bits_per_component
        )));
    }

    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(color.components()))
        .ok_or_else(|| {
            Error::ImageDecode(format!("image dimensions {}x{} are too large", width, height))
        })?;
    if samples.len() < expected {
        return Err(Error::ImageDecode(format!(
            "image data too short: expected {} bytes, got {}",
            expected,
            samples.len()
        )));
    }
    let samples = &samples[..expected];

    let too_short = || Error::ImageDecode("image buffer size mismatch".to_string());
    let image = match color {
        ColorModel::Gray => DynamicImage::ImageLuma8(
            GrayImage::from_raw(width, height, samples.to_vec()).ok_or_else(too_short)?,
        ),
        ColorModel::Rgb => DynamicImage::ImageRgb8(
            RgbImage::from_raw(width, height, samples.to_vec()).ok_or_else(too_short)?,
        ),
        ColorModel::Cmyk => {
            let rgb = samples.chunks_exact(4).flat_map(cmyk_to_rgb).collect();
            DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, rgb).ok_or_else(too_short)?)
        }
    };
    Ok(image)
}

/// Naive CMYK to RGB conversion.
fn cmyk_to_rgb(px: &[u8]) -> [u8; 3] {
    let k = 255 - px[3] as u32;
    let channel = |c: u8| ((255 - c as u32) * k / 255) as u8;
    [channel(px[0]), channel(px[1]), channel(px[2])]
}

/// Target size that fits within `max_size` on both sides, keeping aspect ratio.
///
/// Images already within the bound keep their size.
pub fn thumbnail_dimensions(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    if width <= max_size && height <= max_size {
        return (width, height);
    }

    let scale = max_size as f64 / width.max(height) as f64;
    let fit = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_size);
    (fit(width), fit(height))
}

/// Convert to RGB without alpha and shrink with a Lanczos filter.
pub fn make_thumbnail(image: &DynamicImage, max_size: u32) -> RgbImage {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let (target_w, target_h) = thumbnail_dimensions(width, height, max_size);

    if (target_w, target_h) == (width, height) {
        return rgb;
    }
    image::imageops::resize(&rgb, target_w, target_h, FilterType::Lanczos3)
}
