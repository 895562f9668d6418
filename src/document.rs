//! Document loading.
//!
//! [`PdfDocument`] owns the parsed `lopdf` document for the duration of one
//! extraction call. It is released when dropped, on success and on every
//! error path alike.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::{Error, Result};

/// Where to read a PDF from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// A file on disk
    Path(&'a Path),
    /// An in-memory buffer
    Bytes(&'a [u8]),
}

impl<'a> From<&'a Path> for Source<'a> {
    fn from(path: &'a Path) -> Self {
        Source::Path(path)
    }
}

impl<'a> From<&'a std::path::PathBuf> for Source<'a> {
    fn from(path: &'a std::path::PathBuf) -> Self {
        Source::Path(path.as_path())
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Source::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Source<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Source::Bytes(bytes.as_slice())
    }
}

/// An opened PDF document.
pub struct PdfDocument {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfDocument {
    /// Open a document from either a path or a byte buffer.
    pub fn open(source: Source<'_>) -> Result<Self> {
        match source {
            Source::Path(path) => Self::load_file(path),
            Source::Bytes(data) => Self::load_bytes(data),
        }
    }

    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = detect_format_from_path(path)?;
        if format.offset > 0 {
            let data = std::fs::read(path)?;
            return Self::load_bytes(&data);
        }
        let doc = LopdfDocument::load(path)?;
        Self::from_lopdf(doc)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let format = detect_format_from_bytes(data)?;
        if format.offset > 0 {
            log::debug!("Skipping {} bytes before the PDF header", format.offset);
        }
        // Offsets in such files count from the header, not the first byte
        let doc = LopdfDocument::load_mem(&data[format.offset..])?;
        Self::from_lopdf(doc)
    }

    // lopdf leaves encrypted documents as they are on disk. Try the empty
    // user password; anything else needs a password we do not take.
    fn from_lopdf(mut doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            doc.decrypt("").map_err(|e| {
                log::debug!("Empty password rejected: {}", e);
                Error::Encrypted
            })?;
        }
        let pages = doc.get_pages();
        log::debug!("Loaded PDF {} with {} pages", doc.version, pages.len());
        Ok(Self { doc, pages })
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Page numbers in ascending order (1-indexed).
    pub fn page_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    /// Object id of a page.
    pub fn page_id(&self, page_num: u32) -> Result<ObjectId> {
        self.pages
            .get(&page_num)
            .copied()
            .ok_or_else(|| Error::PdfParse(format!("page {} not found", page_num)))
    }

    /// Title from the document information dictionary, if present.
    pub fn title(&self) -> Option<String> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        let info = self.resolve_dict(info)?;
        get_string_from_dict(info, b"Title")
    }

    /// PDF version string from the header.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Follow a reference to its target, or return the object itself.
    pub(crate) fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        match obj {
            Object::Reference(id) => Ok(self.doc.get_object(*id)?),
            other => Ok(other),
        }
    }

    /// Resolve an object that should be a dictionary.
    pub(crate) fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj).ok()? {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8, or Latin-1).
pub(crate) fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Helper to get a string from a PDF dictionary.
pub(crate) fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).to_string()),
        _ => None,
    }
}
