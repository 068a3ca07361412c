//! DOCX rendering: one paragraph per line, blank lines kept as empty paragraphs.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};

use crate::render::RenderError;

pub fn render_docx(text: &str) -> Result<Vec<u8>, RenderError> {
    let docx = text.lines().fold(Docx::new(), |docx, line| {
        let paragraph = if line.trim().is_empty() {
            Paragraph::new()
        } else {
            Paragraph::new().add_run(Run::new().add_text(line))
        };
        docx.add_paragraph(paragraph)
    });

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| RenderError::Docx(e.to_string()))?;

    Ok(buffer.into_inner())
}
