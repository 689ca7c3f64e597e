//! Bulk PDF - fill one PDF template with many rows of text
//!
//! This crate provides:
//! - The variable data model and a keyed editing session
//! - Mapping between on-screen viewport pixels and PDF page space
//! - Single-line text layout with alignment and fit-to-box sizing
//! - A font catalog that downloads and caches named fonts
//! - Rendering of text substitutions onto the first page of a template
//! - Batch generation of one PDF per data row, packed into a zip archive
//! - Debounced, cancellable preview rendering
//!
//! # Example
//!
//! ```ignore
//! use bulkpdf::{batch, DocumentRenderer, FontCatalog, TemplateDocument};
//! use std::sync::Arc;
//!
//! let template = TemplateDocument::new(Some("certificate.pdf".into()), pdf_bytes);
//! let renderer = DocumentRenderer::new(Arc::new(FontCatalog::builtin()));
//! let rows = batch::parse_rows("Jane Doe\tACME\nJohn Roe\tInitech");
//! let output = batch::generate(&renderer, &template, &variables, &rows, "{variable-1}.pdf").await?;
//! std::fs::write(&output.archive_name, &output.archive)?;
//! ```

pub mod batch;
pub mod coords;
pub mod fonts;
pub mod layout;
pub mod overlay;
pub mod parser;
pub mod preview;
mod renderer;
mod schema;
mod session;

pub use fonts::{FontCatalog, FontFetcher, HttpFontFetcher, ResolvedFont};
pub use parser::parse_project;
pub use layout::SkipReason;
pub use renderer::{DocumentRender, DocumentRenderer, RenderedDocument, VariableOutcome};
pub use schema::*;
pub use session::EditSession;

use thiserror::Error;

/// Errors that can occur while editing, rendering or generating
#[derive(Debug, Error)]
pub enum BulkError {
    #[error("Failed to parse project: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Font error: {0}")]
    FontError(String),

    #[error("Font download failed for {url}: {reason}")]
    FetchError { url: String, reason: String },

    #[error("Render cancelled")]
    Cancelled,

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),
}

/// Result type for bulk PDF operations
pub type Result<T> = std::result::Result<T, BulkError>;
