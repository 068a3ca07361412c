// Document rendering for downloads: plain text, DOCX and PDF.
// docx-rs and printpdf are synchronous; handlers call `render` inside tokio::task::spawn_blocking.

pub mod docx;
pub mod handlers;
pub mod metrics;
pub mod pdf;

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("DOCX generation failed: {0}")]
    Docx(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Txt,
    Docx,
    Pdf,
}

impl DownloadFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            DownloadFormat::Txt => "text/plain; charset=utf-8",
            DownloadFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DownloadFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DownloadFormat::Txt => "txt",
            DownloadFormat::Docx => "docx",
            DownloadFormat::Pdf => "pdf",
        }
    }
}

impl FromStr for DownloadFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" => Ok(DownloadFormat::Txt),
            "docx" => Ok(DownloadFormat::Docx),
            "pdf" => Ok(DownloadFormat::Pdf),
            _ => Err(()),
        }
    }
}

/// Renders resume text into the bytes of the requested document format.
pub fn render(format: DownloadFormat, text: &str) -> Result<Vec<u8>, RenderError> {
    match format {
        DownloadFormat::Txt => Ok(render_txt(text)),
        DownloadFormat::Docx => docx::render_docx(text),
        DownloadFormat::Pdf => pdf::render_pdf(text),
    }
}

/// UTF-8 bytes of the text, unchanged.
pub fn render_txt(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("pdf".parse(), Ok(DownloadFormat::Pdf));
        assert_eq!("DOCX".parse(), Ok(DownloadFormat::Docx));
        assert_eq!("txt".parse(), Ok(DownloadFormat::Txt));
        assert!("doc".parse::<DownloadFormat>().is_err());
        assert!("".parse::<DownloadFormat>().is_err());
    }

    #[test]
    fn test_txt_is_verbatim() {
        let text = "Jane Doe\n- Résumé bullet";
        assert_eq!(render(DownloadFormat::Txt, text).unwrap(), text.as_bytes());
    }

    #[test]
    fn test_each_format_renders() {
        let text = "JANE DOE\nSkills:\n- Rust, SQL";
        assert!(render(DownloadFormat::Docx, text).unwrap().starts_with(b"PK"));
        assert!(render(DownloadFormat::Pdf, text).unwrap().starts_with(b"%PDF"));
    }
}
