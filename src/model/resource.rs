//! Image resource types.

/// Identifier of a PDF object: (object number, generation number).
pub type ObjectId = (u32, u16);

/// A pointer into a page's image resources, not the pixel data itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    /// Indirect object holding the image stream
    pub object_id: ObjectId,

    /// Resource name the page uses for it (e.g., "Im1")
    pub name: String,
}

impl ImageRef {
    pub fn new(object_id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            object_id,
            name: name.into(),
        }
    }
}

/// Color model of raw image samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorModel {
    /// Number of components per pixel.
    pub fn components(self) -> usize {
        match self {
            ColorModel::Gray => 1,
            ColorModel::Rgb => 3,
            ColorModel::Cmyk => 4,
        }
    }

    /// Map a component count (e.g., ICCBased /N) to a color model.
    pub fn from_components(n: i64) -> Option<Self> {
        match n {
            1 => Some(ColorModel::Gray),
            3 => Some(ColorModel::Rgb),
            4 => Some(ColorModel::Cmyk),
            _ => None,
        }
    }
}

/// Bytes of one image object, ready for preview decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePayload {
    /// A self-describing encoded image (JPEG, PNG, ...)
    Encoded(Vec<u8>),

    /// Decompressed samples with the geometry needed to interpret them
    Raw {
        width: u32,
        height: u32,
        bits_per_component: u8,
        color: ColorModel,
        samples: Vec<u8>,
    },

    /// A stream whose filter or color space cannot be decoded
    Unsupported(String),
}
