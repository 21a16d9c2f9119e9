use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{application::export::ExportError, infra::error::InfraError};

const EXPORT_ERROR_SOURCE: &str = "application::error::export_error_to_http_error";
const RENDER_FAILED_MESSAGE: &str = "Could not render the supplied Markdown";

/// Diagnostic detail attached to failing responses and consumed by the
/// response logging middleware. Never sent to the client.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

impl From<ExportError> for HttpError {
    fn from(error: ExportError) -> Self {
        let public_message = match &error {
            ExportError::Conversion(conversion) => conversion.public_message(),
            ExportError::Render(_) => RENDER_FAILED_MESSAGE,
        };
        HttpError::from_error(
            EXPORT_ERROR_SOURCE,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

/// Errors surfaced by the binary entry point.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        pdf::{CONVERSION_FAILED_MESSAGE, ConversionError},
        render::RenderError,
    };

    #[test]
    fn conversion_failure_maps_to_500_with_fixed_message() {
        let error = ExportError::Conversion(ConversionError::Engine {
            exit_code: Some(1),
            stderr: "Exit with code 1 due to network error".to_string(),
        });

        let response = HttpError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );

        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert!(report.messages[0].contains("network error"));
    }

    #[test]
    fn every_conversion_failure_shares_the_public_message() {
        let errors = [
            ConversionError::NotFound(std::io::Error::from(std::io::ErrorKind::NotFound)),
            ConversionError::InvalidOutput { bytes: 0 },
        ];
        for error in errors {
            assert_eq!(error.public_message(), CONVERSION_FAILED_MESSAGE);
        }
    }

    #[test]
    fn render_failure_maps_to_500() {
        let error = ExportError::Render(RenderError::Template {
            message: "boom".to_string(),
        });

        let response = HttpError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert_eq!(report.source, EXPORT_ERROR_SOURCE);
    }

    #[test]
    fn report_walks_the_source_chain() {
        let io = std::io::Error::other("disk gone");
        let error = InfraError::from(io);
        let report = ErrorReport::from_error("test", StatusCode::INTERNAL_SERVER_ERROR, &error);

        assert_eq!(report.messages.len(), 2);
        assert_eq!(report.messages[1], "disk gone");
    }
}
