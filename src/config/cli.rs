use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

use crate::domain::types::RenderTarget;

/// Command-line arguments for the mdexport binary.
#[derive(Debug, Parser)]
#[command(
    name = "mdexport",
    version,
    about = "Convert Markdown uploads into styled HTML or PDF downloads"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "MDEXPORT_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the upload form HTTP server.
    Serve(Box<ServeArgs>),
    /// Convert a local Markdown file without starting the server.
    Convert(ConvertArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Clone)]
pub struct ConvertArgs {
    /// Markdown file to convert.
    #[arg(value_name = "INPUT", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output format.
    #[arg(long, value_name = "FORMAT", default_value = "html")]
    pub format: RenderTarget,

    /// Destination file; defaults to `<stem>.<ext>` next to the input.
    #[arg(long, short = 'o', value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub render: RenderOverrides,

    #[command(flatten)]
    pub pdf: PdfOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderOverrides {
    /// Strip raw HTML that is not on the document allow-list.
    #[arg(
        long = "render-sanitize-html",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub sanitize_html: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct PdfOverrides {
    /// Override the wkhtmltopdf executable path.
    #[arg(long = "pdf-engine-path", value_name = "PATH")]
    pub engine_path: Option<PathBuf>,

    /// Override the PDF page size (e.g. A4, Letter).
    #[arg(long = "pdf-page-size", value_name = "SIZE")]
    pub page_size: Option<String>,

    /// Override the page margin in millimetres.
    #[arg(long = "pdf-margin-mm", value_name = "MM")]
    pub margin_mm: Option<u32>,

    /// Allow the engine to read local files referenced by the document.
    #[arg(
        long = "pdf-allow-local-file-access",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub allow_local_file_access: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub render: RenderOverrides,

    #[command(flatten)]
    pub pdf: PdfOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout in seconds.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the maximum accepted request body in bytes.
    #[arg(long = "uploads-max-request-bytes", value_name = "BYTES")]
    pub uploads_max_request_bytes: Option<u64>,
}
