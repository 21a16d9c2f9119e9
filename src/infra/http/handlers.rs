use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Multipart, multipart::MultipartRejection};
use tracing::error;

use crate::{
    application::error::{ErrorReport, HttpError},
    domain::documents::validate_submission,
    presentation::views::{IndexTemplate, render_template_response},
};

use super::{
    HttpState,
    middleware::ConversionLabel,
    multipart::{FormPayloadError, read_conversion_form},
    response::build_download_response,
};

const SOURCE_BASE: &str = "infra::http::handlers";
const INVALID_FORM_MESSAGE: &str = "The upload form data was invalid.";

pub(super) async fn index(State(state): State<HttpState>) -> Response {
    render_template_response(IndexTemplate::new(state.upload_limit_mib()), StatusCode::OK)
}

pub(super) async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub(super) async fn convert(
    State(state): State<HttpState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            return form_error(
                &state,
                StatusCode::BAD_REQUEST,
                INVALID_FORM_MESSAGE.to_string(),
                rejection.body_text(),
            );
        }
    };

    let form = match read_conversion_form(&mut multipart).await {
        Ok(form) => form,
        Err(err) => return payload_error(&state, err),
    };

    let (document, target) = match validate_submission(form.document, form.format.as_deref()) {
        Ok(valid) => valid,
        Err(err) => {
            return form_error(
                &state,
                StatusCode::BAD_REQUEST,
                err.public_message().to_string(),
                err.to_string(),
            );
        }
    };

    let label = ConversionLabel {
        format: target,
        upload: document.filename.clone(),
    };
    let export = Arc::clone(&state.export);
    let joined = tokio::task::spawn_blocking(move || export.export(&document, target)).await;
    let mut response = match joined {
        Ok(Ok(artifact)) => build_download_response(artifact),
        Ok(Err(err)) => HttpError::from(err).into_response(),
        Err(join_error) => {
            error!(
                target = SOURCE_BASE,
                error = %join_error,
                "conversion task did not complete"
            );
            HttpError::from_error(
                SOURCE_BASE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                &join_error,
            )
            .into_response()
        }
    };
    response.extensions_mut().insert(label);
    response
}

fn payload_error(state: &HttpState, err: FormPayloadError) -> Response {
    match err {
        FormPayloadError::PayloadTooLarge => form_error(
            state,
            StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "The uploaded file is too large (limit is {} MiB).",
                state.upload_limit_mib()
            ),
            err.to_string(),
        ),
        FormPayloadError::InvalidFormData { .. } => form_error(
            state,
            StatusCode::BAD_REQUEST,
            INVALID_FORM_MESSAGE.to_string(),
            err.to_string(),
        ),
    }
}

/// Re-render the form with `message` and attach `detail` for the response log.
fn form_error(state: &HttpState, status: StatusCode, message: String, detail: String) -> Response {
    let template = IndexTemplate::new(state.upload_limit_mib()).with_error(message);
    let mut response = render_template_response(template, status);
    ErrorReport::from_message(SOURCE_BASE, status, detail).attach(&mut response);
    response
}
