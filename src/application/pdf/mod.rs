//! HTML → PDF conversion.
//!
//! Conversion is synchronous and all-or-nothing: either the engine produces a
//! complete PDF in memory or the call fails with a [`ConversionError`].

mod wkhtmltopdf;

use std::io;

use thiserror::Error;

pub use wkhtmltopdf::{WkhtmltopdfOptions, WkhtmltopdfRenderer};

/// Leading bytes of every PDF file.
pub const PDF_MAGIC: &[u8] = b"%PDF";

/// Message shown to users when conversion fails, whatever the cause.
pub const CONVERSION_FAILED_MESSAGE: &str =
    "could not generate the PDF file from the supplied Markdown";

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("PDF engine unavailable: {0}")]
    NotFound(io::Error),
    #[error("failed to stage conversion files: {0}")]
    Io(io::Error),
    #[error("PDF engine failed (exit {exit_code:?}): {stderr}")]
    Engine {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("PDF engine output is not a PDF ({bytes} bytes)")]
    InvalidOutput { bytes: usize },
}

impl ConversionError {
    pub fn public_message(&self) -> &'static str {
        CONVERSION_FAILED_MESSAGE
    }
}

/// Synchronous HTML → PDF conversion seam.
pub trait PdfRenderer: Send + Sync {
    fn render_pdf(&self, html: &str) -> Result<Vec<u8>, ConversionError>;
}

/// True when `bytes` is non-empty and begins with the PDF header.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}
