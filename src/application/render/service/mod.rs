mod anchors;
mod config;
mod outline;

use std::sync::Arc;

use askama::Template;
use comrak::{Arena, format_html, nodes::AstNode, parse_document};
use once_cell::sync::{Lazy, OnceCell};
use thiserror::Error;
use tracing::debug;

use crate::application::render::{
    document::DocumentTemplate,
    stylesheet::stylesheet_for,
    types::{RenderError, RenderRequest, RenderService, RenderedDocument},
};

use anchors::apply_heading_ids;
use config::{build_document_sanitizer, default_options};
use outline::{Outline, build_outline};

const DEFAULT_TITLE: &str = "Document";

/// Comrak-based pipeline: markdown → fragment with anchors and table of
/// contents → complete document with the target's style sheet.
pub struct ComrakRenderService {
    options: comrak::Options<'static>,
    sanitizer: Option<ammonia::Builder<'static>>,
}

impl ComrakRenderService {
    pub fn new(config: RenderPipelineConfig) -> Self {
        let sanitizer = config.sanitize_html.then(build_document_sanitizer);
        Self {
            options: default_options(),
            sanitizer,
        }
    }

    fn fragment_stage<'a>(
        &self,
        root: &'a AstNode<'a>,
    ) -> Result<(String, Outline), RenderError> {
        let outline = build_outline(root);
        let rendered_html = render_html_stage(root, &self.options)?;
        let anchored_html = apply_heading_ids(&rendered_html, &outline.headings)?;
        let html = match &self.sanitizer {
            Some(sanitizer) => sanitizer.clean(&anchored_html).to_string(),
            None => anchored_html,
        };
        Ok((html, outline))
    }
}

impl Default for ComrakRenderService {
    fn default() -> Self {
        Self::new(active_render_config())
    }
}

static RENDER_SERVICE: Lazy<Arc<ComrakRenderService>> =
    Lazy::new(|| Arc::new(ComrakRenderService::default()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<ComrakRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

impl RenderService for ComrakRenderService {
    fn render(&self, request: &RenderRequest) -> Result<RenderedDocument, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, &request.markdown, &self.options);

        let (body, outline) = self.fragment_stage(root)?;

        let template = DocumentTemplate {
            title: outline.title().unwrap_or(DEFAULT_TITLE),
            stylesheet: stylesheet_for(request.target),
            body: &body,
        };
        let html = template.render().map_err(|err| RenderError::Template {
            message: err.to_string(),
        })?;

        debug!(
            target = "application::render",
            render_target = %request.target,
            headings = outline.headings.len(),
            toc_markers = outline.toc_markers,
            html_bytes = html.len(),
            "Markdown document rendered"
        );

        Ok(RenderedDocument {
            target: request.target,
            html,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderPipelineConfig {
    pub sanitize_html: bool,
}

impl From<&crate::config::RenderSettings> for RenderPipelineConfig {
    fn from(settings: &crate::config::RenderSettings) -> Self {
        Self {
            sanitize_html: settings.sanitize_html,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderConfigError {
    #[error("render service already configured")]
    AlreadyConfigured,
}

static RENDER_PIPELINE_CONFIG: OnceCell<RenderPipelineConfig> = OnceCell::new();

/// Set the configuration used by [`render_service`]. Must run before the
/// first call to it.
pub fn configure_render_service(config: RenderPipelineConfig) -> Result<(), RenderConfigError> {
    RENDER_PIPELINE_CONFIG
        .set(config)
        .map_err(|_| RenderConfigError::AlreadyConfigured)
}

fn active_render_config() -> RenderPipelineConfig {
    RENDER_PIPELINE_CONFIG.get().cloned().unwrap_or_default()
}

fn render_html_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    format_html(root, options, &mut html).map_err(|err| RenderError::Markdown {
        message: err.to_string(),
    })?;
    Ok(html)
}
