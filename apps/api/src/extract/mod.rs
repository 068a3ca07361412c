//! Text extraction from uploaded resume files (PDF, DOCX, plain text).
//!
//! Parsing is CPU-bound; handlers run `detect_and_extract` inside `spawn_blocking`.
//! Extraction never fails outright: an unreadable file yields empty text, which the
//! caller rejects as a validation error.

use std::fmt;

use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use tracing::warn;

/// Extensions accepted at the upload boundary.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Docx,
    Txt,
    /// Undecodable binary content.
    Bin,
}

impl SourceFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Pdf => "pdf",
            SourceFormat::Docx => "docx",
            SourceFormat::Txt => "txt",
            SourceFormat::Bin => "bin",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub format: SourceFormat,
    pub text: String,
}

/// Lower-cased extension of `filename`, if it has one.
fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

pub fn is_allowed_filename(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Picks an extractor from the (case-insensitive) extension and returns the plain text.
/// Anything that is not `.pdf` or `.docx` is decoded as UTF-8 text.
pub fn detect_and_extract(filename: &str, bytes: &[u8]) -> Extracted {
    match extension(filename).as_deref() {
        Some("pdf") => Extracted {
            format: SourceFormat::Pdf,
            text: extract_pdf(bytes),
        },
        Some("docx") => Extracted {
            format: SourceFormat::Docx,
            text: extract_docx(bytes),
        },
        _ => decode_text(bytes),
    }
}

fn extract_pdf(bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("PDF text extraction failed: {e}");
            String::new()
        }
    }
}

/// Paragraph text joined by newlines. Tables, headers and footers are not read.
fn extract_docx(bytes: &[u8]) -> String {
    let docx = match docx_rs::read_docx(bytes) {
        Ok(docx) => docx,
        Err(e) => {
            warn!("DOCX text extraction failed: {e}");
            return String::new();
        }
    };

    docx.document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph_text(&paragraph.children)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn paragraph_text(children: &[ParagraphChild]) -> String {
    let mut text = String::new();
    for child in children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

/// UTF-8 decode that drops invalid sequences. NUL bytes mark the input as binary.
fn decode_text(bytes: &[u8]) -> Extracted {
    if bytes.contains(&0) {
        return Extracted {
            format: SourceFormat::Bin,
            text: String::new(),
        };
    }

    Extracted {
        format: SourceFormat::Txt,
        text: String::from_utf8_lossy(bytes).replace('\u{FFFD}', ""),
    }
}
