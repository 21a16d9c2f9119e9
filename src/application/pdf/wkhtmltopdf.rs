use std::{
    fs,
    io::{ErrorKind, Write},
    path::PathBuf,
    process::{Command, Stdio},
    time::Instant,
};

use metrics::histogram;
use tracing::{info, warn};

use super::{ConversionError, PdfRenderer, looks_like_pdf};

/// Engine invocation settings.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfOptions {
    pub engine_path: PathBuf,
    pub page_size: String,
    pub margin_mm: u32,
    pub allow_local_file_access: bool,
}

impl Default for WkhtmltopdfOptions {
    fn default() -> Self {
        Self {
            engine_path: PathBuf::from(crate::config::DEFAULT_PDF_ENGINE_PATH),
            page_size: crate::config::DEFAULT_PDF_PAGE_SIZE.to_string(),
            margin_mm: crate::config::DEFAULT_PDF_MARGIN_MM,
            allow_local_file_access: false,
        }
    }
}

impl From<&crate::config::PdfSettings> for WkhtmltopdfOptions {
    fn from(settings: &crate::config::PdfSettings) -> Self {
        Self {
            engine_path: settings.engine_path.clone(),
            page_size: settings.page_size.clone(),
            margin_mm: settings.margin_mm,
            allow_local_file_access: settings.allow_local_file_access,
        }
    }
}

/// Renders through the `wkhtmltopdf` command-line tool. The document is staged
/// in a temporary `.html` file and the engine writes a temporary `.pdf` file
/// that is read back into memory.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfRenderer {
    options: WkhtmltopdfOptions,
}

impl WkhtmltopdfRenderer {
    pub fn new(options: WkhtmltopdfOptions) -> Self {
        Self { options }
    }

    fn engine_args(&self) -> Vec<String> {
        let margin = format!("{}mm", self.options.margin_mm);
        let mut args = vec![
            "--quiet".to_string(),
            "--encoding".to_string(),
            "utf-8".to_string(),
            "--page-size".to_string(),
            self.options.page_size.clone(),
            "--load-error-handling".to_string(),
            "ignore".to_string(),
            "--load-media-error-handling".to_string(),
            "ignore".to_string(),
        ];
        for side in ["--margin-top", "--margin-right", "--margin-bottom", "--margin-left"] {
            args.push(side.to_string());
            args.push(margin.clone());
        }
        if !self.options.allow_local_file_access {
            args.push("--disable-local-file-access".to_string());
        }
        args
    }
}

impl PdfRenderer for WkhtmltopdfRenderer {
    fn render_pdf(&self, html: &str) -> Result<Vec<u8>, ConversionError> {
        let started_at = Instant::now();

        let mut input_file = tempfile::Builder::new()
            .prefix("mdexport-")
            .suffix(".html")
            .tempfile()
            .map_err(ConversionError::Io)?;
        input_file
            .write_all(html.as_bytes())
            .map_err(ConversionError::Io)?;
        input_file.flush().map_err(ConversionError::Io)?;

        let output_file = tempfile::Builder::new()
            .prefix("mdexport-")
            .suffix(".pdf")
            .tempfile()
            .map_err(ConversionError::Io)?;

        let output = Command::new(&self.options.engine_path)
            .args(self.engine_args())
            .arg(input_file.path())
            .arg(output_file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| {
                warn!(
                    target = "application::pdf::wkhtmltopdf",
                    op = "wkhtmltopdf::render_pdf",
                    result = "error",
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    engine_path = %self.options.engine_path.display(),
                    error_code = "spawn_engine",
                    error = %err,
                    "Failed to spawn PDF engine"
                );
                if err.kind() == ErrorKind::NotFound {
                    ConversionError::NotFound(err)
                } else {
                    ConversionError::Io(err)
                }
            })?;

        let pdf = fs::read(output_file.path()).map_err(ConversionError::Io)?;
        let exit_code = output.status.code();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !looks_like_pdf(&pdf) {
            if !output.status.success() {
                warn!(
                    target = "application::pdf::wkhtmltopdf",
                    op = "wkhtmltopdf::render_pdf",
                    result = "error",
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    exit_code = exit_code.map(i64::from).unwrap_or(-1),
                    error_code = "engine_failed",
                    stderr = %stderr,
                    "PDF engine reported an error"
                );
                return Err(ConversionError::Engine { exit_code, stderr });
            }

            warn!(
                target = "application::pdf::wkhtmltopdf",
                op = "wkhtmltopdf::render_pdf",
                result = "error",
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                pdf_bytes = pdf.len(),
                error_code = "invalid_output",
                "PDF engine output has no PDF header"
            );
            return Err(ConversionError::InvalidOutput { bytes: pdf.len() });
        }

        // Unreachable sub-resources make the engine exit non-zero after it
        // has written a complete document.
        if !output.status.success() {
            warn!(
                target = "application::pdf::wkhtmltopdf",
                op = "wkhtmltopdf::render_pdf",
                exit_code = exit_code.map(i64::from).unwrap_or(-1),
                stderr = %stderr,
                "PDF engine exited with an error but produced a document"
            );
        }

        let elapsed_ms = started_at.elapsed().as_millis() as u64;
        histogram!("mdexport_pdf_render_ms").record(elapsed_ms as f64);
        info!(
            target = "application::pdf::wkhtmltopdf",
            op = "wkhtmltopdf::render_pdf",
            result = "ok",
            elapsed_ms,
            html_bytes = html.len(),
            pdf_bytes = pdf.len(),
            "PDF rendered via engine"
        );

        Ok(pdf)
    }
}
