//! JSON output.
//!
//! The document is written as `{title, headings, metadata}`; per-page scan
//! warnings are kept in memory only and never serialized.

use std::io::Write;

use crate::error::{Error, Result};
use crate::model::ExtractionResult;

/// Layout of the JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Two-space indentation, one field per line
    #[default]
    Pretty,
    /// Single line
    Compact,
}

/// Render a result as a JSON string.
pub fn to_json(result: &ExtractionResult, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(result),
        JsonFormat::Compact => serde_json::to_string(result),
    };
    json.map_err(|e| Error::extraction("JSON serialization", e))
}

/// Stream a result as JSON into `writer`, ending with a newline.
pub fn write_json<W: Write>(
    result: &ExtractionResult,
    mut writer: W,
    format: JsonFormat,
) -> Result<()> {
    let written = match format {
        JsonFormat::Pretty => serde_json::to_writer_pretty(&mut writer, result),
        JsonFormat::Compact => serde_json::to_writer(&mut writer, result),
    };
    written.map_err(|e| Error::extraction("JSON serialization", e))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
