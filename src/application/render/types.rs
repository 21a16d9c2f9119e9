use thiserror::Error;

use crate::domain::types::RenderTarget;

/// Rendering request passed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Decoded markdown source.
    pub markdown: String,
    /// Selects the embedded style sheet.
    pub target: RenderTarget,
}

impl RenderRequest {
    pub fn new(markdown: impl Into<String>, target: RenderTarget) -> Self {
        Self {
            markdown: markdown.into(),
            target,
        }
    }
}

/// Complete HTML document produced for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub target: RenderTarget,
    pub html: String,
}

impl RenderedDocument {
    pub fn into_bytes(self) -> Vec<u8> {
        self.html.into_bytes()
    }
}

/// Structured errors surfaced by the rendering pipeline.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("markdown rendering failed: {message}")]
    Markdown { message: String },
    #[error("document processing failed: {message}")]
    Document { message: String },
    #[error("document template failed: {message}")]
    Template { message: String },
}

/// Trait exposed by the rendering pipeline. Implementations must be pure and
/// deterministic: given the same input, they return identical outputs or errors.
pub trait RenderService: Send + Sync {
    fn render(&self, request: &RenderRequest) -> Result<RenderedDocument, RenderError>;
}
