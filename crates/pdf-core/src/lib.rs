//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening a PDF template from bytes and saving it back to bytes
//! - Reading the geometry of a page (MediaBox, with inheritance)
//! - Using the 14 standard PDF fonts with their AFM metrics
//! - Embedding TrueType fonts as CID fonts (Identity-H)
//! - Drawing text at PDF-space coordinates
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Color, PdfDocument, StandardFont};
//!
//! let mut doc = PdfDocument::open_from_bytes(&template_bytes)?;
//! let font = doc.add_standard_font(StandardFont::Helvetica);
//! let page = doc.page_size(1)?;
//! doc.draw_text(1, font, "Hello, World!", 72.0, page.height - 72.0, 24.0, Color::black())?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod metrics;
mod standard;
mod text;

pub use document::{Color, FontId, PageSize, PdfDocument};
pub use font::FontData;
pub use metrics::FontMetrics;
pub use standard::StandardFont;
pub use text::{align_offset, generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_default() {
        assert_eq!(Align::default(), Align::Left);
    }

    #[test]
    fn test_error_messages() {
        let err = PdfError::InvalidPage(3, 1);
        assert_eq!(
            err.to_string(),
            "Invalid page number: 3 (document has 1 pages)"
        );

        let err = PdfError::FontNotFound("F9".to_string());
        assert_eq!(err.to_string(), "Font not found: F9");
    }
}
