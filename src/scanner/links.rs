//! Hyperlink annotations.

use lopdf::{Dictionary, Object};

use crate::document::{get_string_from_dict, PdfDocument};
use crate::error::Result;

/// External URIs of the link annotations on a page, in annotation order.
///
/// Links without a URI action (page jumps, named destinations, launch
/// actions) are skipped.
pub fn page_links(doc: &PdfDocument, page_num: u32) -> Result<Vec<String>> {
    let page_id = doc.page_id(page_num)?;
    let page = doc.raw_doc().get_dictionary(page_id)?;

    let annots = match page.get(b"Annots") {
        Ok(obj) => doc.resolve(obj)?.as_array()?,
        Err(_) => return Ok(Vec::new()),
    };

    let mut uris = Vec::new();
    for annot in annots {
        let Some(annot) = doc.resolve_dict(annot) else {
            log::debug!("Skipping unreadable annotation on page {}", page_num);
            continue;
        };
        if !is_link(annot) {
            continue;
        }
        if let Some(uri) = link_uri(doc, annot) {
            uris.push(uri);
        }
    }
    Ok(uris)
}

fn is_link(annot: &Dictionary) -> bool {
    matches!(
        annot.get(b"Subtype").and_then(Object::as_name),
        Ok(b"Link")
    )
}

/// URI of a link's `/A` action, when it is a URI action.
fn link_uri(doc: &PdfDocument, annot: &Dictionary) -> Option<String> {
    let action = doc.resolve_dict(annot.get(b"A").ok()?)?;
    if action.get(b"S").and_then(Object::as_name).ok()? != b"URI" {
        return None;
    }

    let uri = get_string_from_dict(action, b"URI")?;
    let uri = uri.trim();
    if uri.is_empty() {
        None
    } else {
        Some(uri.to_string())
    }
}
