//! Structured text extraction from page content streams.
//!
//! A page's content stream is interpreted into blocks, lines and spans:
//! every `BT`…`ET` text object becomes one text block, and XObjects painted
//! with `Do` become non-text blocks. Inside a text block, spans that share a
//! baseline are grouped into a line. Positions are only used for grouping and
//! joining and do not survive past line construction.
//!
//! Sizes and positions are measured in user space: the text matrix is
//! combined with the current transformation matrix (`cm`, saved and restored
//! by `q`/`Q`), so text drawn inside a scaled coordinate system reports the
//! size it is rendered at.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::document::{decode_pdf_string, PdfDocument};
use crate::error::{Error, Result};
use crate::model::TextRun;

/// Default font size before any `Tf` operator.
const DEFAULT_FONT_SIZE: f32 = 12.0;

/// `TJ` adjustments (thousandths of an em) wider than this become a space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Advance width assumed for glyphs the font does not describe (thousandths of an em).
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// A gap wider than this share of the average character width separates words.
const WORD_GAP_RATIO: f32 = 0.2;

/// A piece of text drawn with a single font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// Effective font size in points
    pub font_size: f32,
    x: f32,
    y: f32,
    /// Horizontal extent; 0 when unknown
    width: f32,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self::at(text, font_size, 0.0, 0.0, 0.0)
    }

    fn at(text: impl Into<String>, font_size: f32, x: f32, y: f32, width: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            x,
            y,
            width,
        }
    }

    fn end_x(&self) -> f32 {
        self.x + self.width
    }
}

/// Spans on one baseline, in reading order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    pub fn from_spans(spans: Vec<TextSpan>) -> Self {
        Self { spans }
    }

    /// Build a line from spans on one baseline, ordered left to right.
    fn from_baseline(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        Self { spans }
    }

    /// Span texts in span order.
    ///
    /// Neighbouring spans are joined directly when they touch, so a word
    /// split across several show operators reads as one word. A visible gap
    /// becomes a single space. Spans without a measured extent are always
    /// separated.
    pub fn text(&self) -> String {
        let mut result = String::new();
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 && needs_space(&self.spans[i - 1], span) {
                result.push(' ');
            }
            result.push_str(&span.text);
        }
        result
    }

    /// Largest span font size on the line.
    ///
    /// A line is represented by its biggest glyphs, so one large drop cap
    /// makes the whole line large. Non-finite sizes are ignored and a line
    /// without a usable size reports 0.
    pub fn max_font_size(&self) -> f32 {
        self.spans
            .iter()
            .map(|s| s.font_size)
            .filter(|size| size.is_finite())
            .fold(0.0, f32::max)
    }

    /// Reduce the line to a text run, or `None` when it has no visible text.
    pub fn to_run(&self, page: u32) -> Option<TextRun> {
        let text = self.text();
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(TextRun::new(text, self.max_font_size() as f64, page))
    }
}

/// Lines of one text object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

/// A block of page content.
#[derive(Debug, Clone, PartialEq)]
pub enum PageBlock {
    /// A text object with its lines
    Text(TextBlock),
    /// An XObject (image or form) painted by name; carries no lines
    XObject(String),
}

impl PageBlock {
    /// Lines of a text block; `None` for blocks without text.
    pub fn lines(&self) -> Option<&[TextLine]> {
        match self {
            PageBlock::Text(block) => Some(&block.lines),
            PageBlock::XObject(_) => None,
        }
    }
}

/// Whether a space goes between two neighbouring spans on a line.
fn needs_space(prev: &TextSpan, span: &TextSpan) -> bool {
    if prev.text.ends_with(char::is_whitespace) || span.text.starts_with(char::is_whitespace) {
        return false;
    }
    if prev.width <= 0.0 {
        return true;
    }

    let gap = span.x - prev.end_x();
    let char_count = span.text.chars().count().max(1);
    let avg_char_width = if span.width > 0.0 {
        span.width / char_count as f32
    } else {
        span.font_size * DEFAULT_GLYPH_WIDTH / 1000.0
    };
    if gap <= avg_char_width * WORD_GAP_RATIO {
        return false;
    }

    let joins_cjk = prev.text.chars().last().map_or(false, is_spaceless_script_char)
        && span.text.chars().next().map_or(false, is_spaceless_script_char);
    !joins_cjk
}

/// Interpret a page's content stream into blocks.
pub fn page_blocks(doc: &PdfDocument, page_num: u32) -> Result<Vec<PageBlock>> {
    let page_id = doc.page_id(page_num)?;
    let content = page_content(doc, page_id)?;
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let fonts = doc
        .raw_doc()
        .get_page_fonts(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    ContentInterpreter::new(doc.raw_doc(), &fonts).run(&content)
}

/// Turn blocks into text runs, skipping non-text blocks and blank lines.
pub fn text_runs(blocks: &[PageBlock], page: u32) -> Vec<TextRun> {
    blocks
        .iter()
        .filter_map(PageBlock::lines)
        .flatten()
        .filter_map(|line| line.to_run(page))
        .collect()
}

/// Concatenated, decompressed content streams of a page.
fn page_content(doc: &PdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.raw_doc().get_dictionary(page_id)?;

    let contents = match page_dict.get(b"Contents") {
        Ok(contents) => doc.resolve(contents)?,
        // A page without content is blank
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Stream(stream) => stream_bytes(stream),
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                match doc.resolve(obj) {
                    Ok(Object::Stream(stream)) => {
                        content.extend_from_slice(&stream_bytes(stream)?);
                        content.push(b' ');
                    }
                    _ => log::debug!("Skipping non-stream content entry on page {:?}", page_id),
                }
            }
            Ok(content)
        }
        _ => Err(Error::PdfParse("Invalid content stream".to_string())),
    }
}

fn stream_bytes(stream: &lopdf::Stream) -> Result<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        stream
            .decompressed_content()
            .map_err(|e| Error::PdfParse(e.to_string()))
    } else {
        Ok(stream.content.clone())
    }
}

/// Walks content stream operators, tracking the graphics and text state.
struct ContentInterpreter<'a> {
    doc: &'a LopdfDocument,
    fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
    font_name: Vec<u8>,
    font_size: f32,
    metrics: FontMetrics,
    leading: f32,
    /// Current transformation matrix
    ctm: Matrix,
    saved: Vec<Matrix>,
    /// Text matrix, advanced by every show operator
    matrix: Matrix,
    /// Text line matrix, moved by `Td`, `TD`, `T*` and `Tm`
    line_matrix: Matrix,
    in_text: bool,
    spans: Vec<TextSpan>,
    blocks: Vec<PageBlock>,
}

impl<'a> ContentInterpreter<'a> {
    fn new(doc: &'a LopdfDocument, fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        Self {
            doc,
            fonts,
            font_name: Vec::new(),
            font_size: DEFAULT_FONT_SIZE,
            metrics: FontMetrics::default(),
            leading: 0.0,
            ctm: Matrix::default(),
            saved: Vec::new(),
            matrix: Matrix::default(),
            line_matrix: Matrix::default(),
            in_text: false,
            spans: Vec::new(),
            blocks: Vec::new(),
        }
    }

    fn run(mut self, content: &[u8]) -> Result<Vec<PageBlock>> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => self.saved.push(self.ctm.clone()),
                "Q" => {
                    // Unbalanced Q leaves the state alone
                    if let Some(ctm) = self.saved.pop() {
                        self.ctm = ctm;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_operands(operands) {
                        self.ctm = m.concat(&self.ctm);
                    }
                }
                "BT" => {
                    self.in_text = true;
                    self.matrix = Matrix::default();
                    self.line_matrix = Matrix::default();
                }
                "ET" => self.end_text_object(),
                "Tf" => {
                    if operands.len() >= 2 {
                        if let Object::Name(name) = &operands[0] {
                            self.font_name = name.clone();
                            self.metrics =
                                FontMetrics::load(self.doc, self.fonts.get(name).copied());
                        }
                        self.font_size = get_number(&operands[1]).unwrap_or(DEFAULT_FONT_SIZE);
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        self.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if operands.len() >= 2 {
                        let tx = get_number(&operands[0]).unwrap_or(0.0);
                        let ty = get_number(&operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            self.leading = -ty;
                        }
                        self.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix_operands(operands) {
                        self.line_matrix = m.clone();
                        self.matrix = m;
                    }
                }
                "T*" => self.move_line(0.0, -self.leading),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show_string(bytes);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        self.show_array(items);
                    }
                }
                "'" | "\"" => {
                    self.move_line(0.0, -self.leading);
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = operands.get(text_idx) {
                        self.show_string(bytes);
                    }
                }
                "Do" => {
                    if !self.in_text {
                        if let Some(Object::Name(name)) = operands.first() {
                            let name = String::from_utf8_lossy(name).to_string();
                            self.blocks.push(PageBlock::XObject(name));
                        }
                    }
                }
                _ => {}
            }
        }

        // Unterminated text object at end of stream
        self.end_text_object();
        Ok(self.blocks)
    }

    fn end_text_object(&mut self) {
        self.in_text = false;
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);
        self.blocks.push(PageBlock::Text(TextBlock {
            lines: group_spans_into_lines(spans),
        }));
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix.translate(tx, ty);
        self.matrix = self.line_matrix.clone();
    }

    fn show_string(&mut self, bytes: &[u8]) {
        let text = self.decode(bytes);
        let advance = self.metrics.string_width(bytes) / 1000.0 * self.font_size;
        self.push_span(text, advance);
    }

    /// Show a `TJ` array, turning wide negative adjustments into spaces.
    fn show_array(&mut self, items: &[Object]) {
        let mut combined = String::new();
        let mut advance = 0.0;
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    combined.push_str(&self.decode(bytes));
                    advance += self.metrics.string_width(bytes) / 1000.0 * self.font_size;
                }
                other => {
                    let adjustment = -get_number(other).unwrap_or(0.0);
                    advance += adjustment / 1000.0 * self.font_size;
                    if adjustment > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(char::is_whitespace)
                        && !combined.chars().last().map_or(false, is_spaceless_script_char)
                    {
                        combined.push(' ');
                    }
                }
            }
        }
        self.push_span(combined, advance);
    }

    /// Record shown text at the current position, then advance past it.
    fn push_span(&mut self, text: String, advance: f32) {
        let start = self.matrix.concat(&self.ctm);
        self.matrix.translate(advance, 0.0);
        if !self.in_text || text.trim().is_empty() {
            return;
        }

        let (x, y) = start.position();
        let (end_x, _) = self.matrix.concat(&self.ctm).position();
        let size = self.font_size * start.vertical_scale();
        self.spans.push(TextSpan::at(text, size, x, y, (end_x - x).abs()));
    }

    /// Decode a string operand with the current font's encoding.
    fn decode(&self, bytes: &[u8]) -> String {
        let encoding = self
            .fonts
            .get(&self.font_name)
            .and_then(|f| f.get_font_encoding(self.doc).ok());

        match encoding {
            Some(ref enc) => LopdfDocument::decode_text(enc, bytes)
                .unwrap_or_else(|_| decode_pdf_string(bytes)),
            None => decode_pdf_string(bytes),
        }
    }
}

/// Glyph advance widths of a font, in thousandths of an em.
#[derive(Debug, Clone, Default)]
struct FontMetrics {
    first_char: u32,
    widths: Vec<f32>,
    /// Composite fonts use two-byte codes
    two_byte: bool,
}

impl FontMetrics {
    fn load(doc: &LopdfDocument, font: Option<&Dictionary>) -> Self {
        let Some(font) = font else {
            return Self::default();
        };

        let two_byte = matches!(font.get(b"Subtype").and_then(Object::as_name), Ok(b"Type0"));
        let first_char = font
            .get(b"FirstChar")
            .and_then(Object::as_i64)
            .ok()
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0);
        let widths = match font.get(b"Widths") {
            Ok(Object::Reference(id)) => doc.get_object(*id).ok(),
            Ok(obj) => Some(obj),
            Err(_) => None,
        }
        .and_then(|obj| obj.as_array().ok())
        .map(|arr| {
            arr.iter()
                .map(|w| get_number(w).unwrap_or(DEFAULT_GLYPH_WIDTH))
                .collect()
        })
        .unwrap_or_default();

        Self {
            first_char,
            widths,
            two_byte,
        }
    }

    fn string_width(&self, bytes: &[u8]) -> f32 {
        if self.two_byte {
            return (bytes.len() / 2) as f32 * DEFAULT_GLYPH_WIDTH;
        }
        bytes
            .iter()
            .map(|&code| {
                (code as u32)
                    .checked_sub(self.first_char)
                    .and_then(|i| self.widths.get(i as usize))
                    .copied()
                    .unwrap_or(DEFAULT_GLYPH_WIDTH)
            })
            .sum()
    }
}

/// Group spans into lines by baseline, top to bottom and left to right.
fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    // PDF Y grows upward; stable sort keeps content order for equal positions
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size.abs() * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_baseline(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_baseline(current));
    }
    lines
}

/// Affine matrix `[a b c d e f]`, applied to row vectors as in the PDF model.
#[derive(Debug, Clone, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }
}

impl Matrix {
    fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// `self × other`: apply `self` first, then `other`.
    fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Pre-multiply by a translation.
    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    /// Length of the transformed unit vertical, i.e. how tall one unit of
    /// text space is drawn.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Six numeric operands of `cm` or `Tm`.
fn matrix_operands(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let n: Vec<f32> = operands[..6]
        .iter()
        .map(|o| get_number(o).unwrap_or(0.0))
        .collect();
    Some(Matrix::new(n[0], n[1], n[2], n[3], n[4], n[5]))
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Scripts written without spaces between words (Chinese, Japanese kana).
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}
