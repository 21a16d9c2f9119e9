//! Multipart form parsing for the conversion endpoint.

use axum::http::StatusCode;
use axum_extra::extract::Multipart;
use thiserror::Error;
use tracing::warn;

use crate::domain::documents::UploadedDocument;

const SOURCE_BASE: &str = "infra::http::multipart";

const FILE_FIELD: &str = "file";
const FORMAT_FIELD: &str = "format";

/// Raw form values before validation. Either may be absent.
#[derive(Debug, Default)]
pub(super) struct ConversionForm {
    pub(super) document: Option<UploadedDocument>,
    pub(super) format: Option<String>,
}

#[derive(Debug, Error)]
pub(super) enum FormPayloadError {
    #[error("request body exceeded the configured limit")]
    PayloadTooLarge,
    #[error("multipart body could not be parsed: {detail}")]
    InvalidFormData { detail: String },
}

/// Read the `file` and `format` fields; unknown fields are skipped. When a
/// field repeats, the first occurrence wins.
pub(super) async fn read_conversion_form(
    multipart: &mut Multipart,
) -> Result<ConversionForm, FormPayloadError> {
    let mut form = ConversionForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return Err(classify(err.status(), err.to_string())),
        };

        match field.name() {
            Some(FILE_FIELD) if form.document.is_none() => {
                let filename = field.file_name().map(str::to_string).unwrap_or_default();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| classify(err.status(), err.to_string()))?;
                form.document = Some(UploadedDocument::new(filename, bytes));
            }
            Some(FORMAT_FIELD) if form.format.is_none() => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| classify(err.status(), err.to_string()))?;
                form.format = Some(value);
            }
            _ => continue,
        }
    }

    Ok(form)
}

fn classify(status: StatusCode, detail: String) -> FormPayloadError {
    warn!(
        target = SOURCE_BASE,
        status = status.as_u16(),
        error = %detail,
        "failed to read multipart payload"
    );
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => FormPayloadError::PayloadTooLarge,
        _ => FormPayloadError::InvalidFormData { detail },
    }
}
