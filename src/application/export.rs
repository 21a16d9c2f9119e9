//! Upload → artifact orchestration shared by the web handler and the CLI.

use std::{sync::Arc, time::Instant};

use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    application::{
        pdf::{ConversionError, PdfRenderer},
        render::{RenderError, RenderRequest, RenderService},
    },
    domain::{
        documents::{OutputArtifact, UploadedDocument},
        types::RenderTarget,
    },
};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

#[derive(Clone)]
pub struct ExportService {
    renderer: Arc<dyn RenderService>,
    pdf: Arc<dyn PdfRenderer>,
}

impl ExportService {
    pub fn new(renderer: Arc<dyn RenderService>, pdf: Arc<dyn PdfRenderer>) -> Self {
        Self { renderer, pdf }
    }

    /// Convert one upload into its download. Every call builds a fresh
    /// document; nothing is kept between calls.
    pub fn export(
        &self,
        document: &UploadedDocument,
        target: RenderTarget,
    ) -> Result<OutputArtifact, ExportError> {
        let started_at = Instant::now();
        let result = self.export_inner(document, target);
        let elapsed_ms = started_at.elapsed().as_millis() as u64;

        match &result {
            Ok(artifact) => {
                counter!("mdexport_conversions_total", "format" => target.as_str()).increment(1);
                info!(
                    target = "application::export",
                    op = "export",
                    result = "ok",
                    format = %target,
                    input_bytes = document.bytes.len(),
                    output_bytes = artifact.bytes.len(),
                    elapsed_ms,
                    "Document exported"
                );
            }
            Err(err) => {
                counter!("mdexport_conversion_failures_total", "format" => target.as_str())
                    .increment(1);
                warn!(
                    target = "application::export",
                    op = "export",
                    result = "error",
                    format = %target,
                    input_bytes = document.bytes.len(),
                    elapsed_ms,
                    error = %err,
                    "Document export failed"
                );
            }
        }

        result
    }

    fn export_inner(
        &self,
        document: &UploadedDocument,
        target: RenderTarget,
    ) -> Result<OutputArtifact, ExportError> {
        let request = RenderRequest::new(document.markdown(), target);
        let rendered = self.renderer.render(&request)?;
        let filename = document.download_name(target);

        let bytes = match target {
            RenderTarget::Html => rendered.into_bytes(),
            RenderTarget::Pdf => self.pdf.render_pdf(&rendered.html)?,
        };

        Ok(OutputArtifact::new(bytes, target, filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::application::render::{ComrakRenderService, RenderPipelineConfig};

    #[derive(Default)]
    struct RecordingPdf {
        seen: Mutex<Vec<String>>,
        fail: bool,
    }

    impl PdfRenderer for RecordingPdf {
        fn render_pdf(&self, html: &str) -> Result<Vec<u8>, ConversionError> {
            self.seen.lock().expect("lock").push(html.to_string());
            if self.fail {
                Err(ConversionError::Engine {
                    exit_code: Some(1),
                    stderr: "nope".to_string(),
                })
            } else {
                Ok(b"%PDF-1.4 stub".to_vec())
            }
        }
    }

    fn service(pdf: Arc<RecordingPdf>) -> ExportService {
        ExportService::new(
            Arc::new(ComrakRenderService::new(RenderPipelineConfig::default())),
            pdf,
        )
    }

    #[test]
    fn html_export_names_and_types_the_artifact() {
        let pdf = Arc::new(RecordingPdf::default());
        let service = service(Arc::clone(&pdf));

        let artifact = service
            .export(
                &UploadedDocument::new("notes/report.v2.md", "# Hi\n"),
                RenderTarget::Html,
            )
            .expect("export");

        assert_eq!(artifact.filename, "report.v2.html");
        assert_eq!(artifact.content_type, "text/html; charset=utf-8");
        let html = std::str::from_utf8(&artifact.bytes).expect("utf8");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(pdf.seen.lock().expect("lock").is_empty());
    }

    #[test]
    fn pdf_export_feeds_print_document_to_engine() {
        let pdf = Arc::new(RecordingPdf::default());
        let service = service(Arc::clone(&pdf));

        let artifact = service
            .export(&UploadedDocument::new("a.md", "# Hi\n"), RenderTarget::Pdf)
            .expect("export");

        assert_eq!(artifact.filename, "a.pdf");
        assert_eq!(artifact.content_type, "application/pdf");
        assert!(artifact.bytes.starts_with(b"%PDF"));

        let seen = pdf.seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].contains("var(--"));
    }

    #[test]
    fn engine_failure_surfaces_as_conversion_error() {
        let pdf = Arc::new(RecordingPdf {
            fail: true,
            ..RecordingPdf::default()
        });
        let service = service(pdf);

        let err = service
            .export(&UploadedDocument::new("a.md", "text"), RenderTarget::Pdf)
            .expect_err("engine failure");
        assert!(matches!(err, ExportError::Conversion(_)));
    }
}
