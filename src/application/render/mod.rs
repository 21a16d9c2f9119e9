//! Markdown rendering pipeline.
//!
//! The pipeline is pure: it accepts markdown input and a target, produces a
//! complete HTML document, and surfaces structured errors. Turning that
//! document into a PDF is the job of [`crate::application::pdf`].

mod document;
mod service;
mod stylesheet;
mod types;

pub use document::DocumentTemplate;
pub use service::{
    ComrakRenderService, RenderConfigError, RenderPipelineConfig, configure_render_service,
    render_service,
};
pub use stylesheet::stylesheet_for;
pub use types::{RenderError, RenderRequest, RenderService, RenderedDocument};
