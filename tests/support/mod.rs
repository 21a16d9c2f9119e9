//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, header},
};
use mdexport::{
    application::{
        export::ExportService,
        pdf::{WkhtmltopdfOptions, WkhtmltopdfRenderer},
        render::{ComrakRenderService, RenderPipelineConfig},
    },
    infra::http::{HttpState, build_router},
};

pub const BOUNDARY: &str = "mdexport-test-boundary";
pub const DEFAULT_LIMIT_BYTES: u64 = 10 * 1024 * 1024;

pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        content: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                filename,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: text/markdown\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .expect("request should build")
}

pub fn export_service(engine_path: PathBuf) -> Arc<ExportService> {
    let pdf = WkhtmltopdfRenderer::new(WkhtmltopdfOptions {
        engine_path,
        ..WkhtmltopdfOptions::default()
    });
    Arc::new(ExportService::new(
        Arc::new(ComrakRenderService::new(RenderPipelineConfig::default())),
        Arc::new(pdf),
    ))
}

pub fn app_with_engine(engine_path: PathBuf, limit_bytes: u64) -> Router {
    build_router(HttpState::new(export_service(engine_path), limit_bytes))
}

pub fn app() -> Router {
    app_with_engine(PathBuf::from("/nonexistent/wkhtmltopdf"), DEFAULT_LIMIT_BYTES)
}

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).expect("fixture should be readable")
}

/// Write an executable shell script standing in for the PDF engine.
#[cfg(unix)]
pub fn fake_engine(dir: &tempfile::TempDir, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join("fake-wkhtmltopdf");
    std::fs::write(&path, script).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("set perms");
    path
}

/// Engine that writes a minimal PDF to its last argument.
pub const WORKING_ENGINE: &str = r#"#!/bin/sh
for last; do :; done
printf '%%PDF-1.4\n%%fake engine\n%%%%EOF\n' > "$last"
"#;

/// Engine that fails before producing any output.
pub const FAILING_ENGINE: &str = r#"#!/bin/sh
echo "Error: Failed loading page file:///tmp/mdexport.html" >&2
exit 1
"#;

/// Engine that writes a complete PDF and still exits 1, as wkhtmltopdf does
/// when an image cannot be loaded.
pub const LOAD_ERROR_ENGINE: &str = r#"#!/bin/sh
for last; do :; done
printf '%%PDF-1.4\n%%fake engine\n%%%%EOF\n' > "$last"
echo "Exit with code 1 due to network error: ContentNotFoundError" >&2
exit 1
"#;
