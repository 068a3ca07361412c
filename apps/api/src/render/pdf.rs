//! PDF rendering for plain-text resumes.
//!
//! US letter, 0.75" margins, built-in Helvetica fonts. Each input line is classified:
//! - blank → 0.1" spacer
//! - all caps and under 50 chars → title (bold 18pt, centered)
//! - starts with `#` → heading (hashes stripped, bold 14pt)
//! - ends with `:` and under 50 chars → heading
//! - anything else → body (11pt)
//!
//! Lines are word-wrapped with the static width tables in `metrics`; a new page is
//! started when the cursor reaches the bottom margin.

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use crate::render::metrics::{FontMetricTable, HELVETICA, HELVETICA_BOLD};
use crate::render::RenderError;

const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 19.05;
const SPACER_MM: f32 = 2.54;
const PT_TO_MM: f32 = 25.4 / 72.0;
const LEADING: f32 = 1.2;
const SHORT_LINE_CHARS: usize = 50;
const LAYER_NAME: &str = "Layer 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Heading,
    Body,
}

/// A classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block<'a> {
    Spacer,
    Text { style: LineStyle, text: &'a str },
}

struct StyleSpec {
    bold: bool,
    size_pt: f32,
    space_before_pt: f32,
    space_after_pt: f32,
    centered: bool,
}

impl LineStyle {
    fn spec(self) -> StyleSpec {
        match self {
            LineStyle::Title => StyleSpec {
                bold: true,
                size_pt: 18.0,
                space_before_pt: 0.0,
                space_after_pt: 12.0,
                centered: true,
            },
            LineStyle::Heading => StyleSpec {
                bold: true,
                size_pt: 14.0,
                space_before_pt: 12.0,
                space_after_pt: 8.0,
                centered: false,
            },
            LineStyle::Body => StyleSpec {
                bold: false,
                size_pt: 11.0,
                space_before_pt: 0.0,
                space_after_pt: 6.0,
                centered: false,
            },
        }
    }
}

/// True when the line has at least one cased letter and no lowercase ones.
fn is_all_caps(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}

pub fn classify_line(line: &str) -> Block<'_> {
    let line = line.trim();
    let short = line.chars().count() < SHORT_LINE_CHARS;

    if line.is_empty() {
        Block::Spacer
    } else if is_all_caps(line) && short {
        Block::Text {
            style: LineStyle::Title,
            text: line,
        }
    } else if line.starts_with('#') {
        Block::Text {
            style: LineStyle::Heading,
            text: line.trim_start_matches('#').trim(),
        }
    } else if line.ends_with(':') && short {
        Block::Text {
            style: LineStyle::Heading,
            text: line,
        }
    } else {
        Block::Text {
            style: LineStyle::Body,
            text: line,
        }
    }
}

/// Tracks the current page layer and the vertical write position.
struct PageCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y_mm: f32,
}

impl PageCursor {
    fn new(doc: PdfDocumentReference, layer: PdfLayerReference) -> Self {
        Self {
            doc,
            layer,
            y_mm: PAGE_HEIGHT_MM - MARGIN_MM,
        }
    }

    /// Moves down by `height_mm`, starting a new page if that would cross the bottom margin.
    fn advance(&mut self, height_mm: f32) {
        if self.y_mm - height_mm < MARGIN_MM {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y_mm = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        self.y_mm -= height_mm;
    }

    /// Drops vertical space without forcing a page break.
    fn skip(&mut self, height_mm: f32) {
        self.y_mm = (self.y_mm - height_mm).max(MARGIN_MM);
    }
}

pub fn render_pdf(text: &str) -> Result<Vec<u8>, RenderError> {
    let (doc, page, layer) = PdfDocument::new(
        "Resume",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;

    let first_layer = doc.get_page(page).get_layer(layer);
    let mut cursor = PageCursor::new(doc, first_layer);
    let text_width_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

    for line in text.lines() {
        let (style, content) = match classify_line(line) {
            Block::Spacer => {
                cursor.skip(SPACER_MM);
                continue;
            }
            Block::Text { style, text } => (style, text),
        };

        let spec = style.spec();
        let (font, metrics): (&IndirectFontRef, &FontMetricTable) = if spec.bold {
            (&bold, &HELVETICA_BOLD)
        } else {
            (&regular, &HELVETICA)
        };
        let em_mm = spec.size_pt * PT_TO_MM;

        cursor.skip(spec.space_before_pt * PT_TO_MM);
        for wrapped in metrics.wrap(content, text_width_mm / em_mm) {
            cursor.advance(em_mm * LEADING);
            let x_mm = if spec.centered {
                MARGIN_MM + (text_width_mm - metrics.measure_str(&wrapped) * em_mm).max(0.0) / 2.0
            } else {
                MARGIN_MM
            };
            cursor
                .layer
                .use_text(wrapped, spec.size_pt, Mm(x_mm), Mm(cursor.y_mm), font);
        }
        cursor.skip(spec.space_after_pt * PT_TO_MM);
    }

    cursor
        .doc
        .save_to_bytes()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}
