//! Request-scoped document values: the upload coming in and the artifact going out.

use bytes::Bytes;

use super::{error::DomainError, types::RenderTarget};

const FALLBACK_STEM: &str = "document";
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Raw upload as received from the form. Never outlives its request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Decode the upload as UTF-8, discarding invalid sequences instead of
    /// replacing them.
    pub fn markdown(&self) -> String {
        decode_dropping_invalid(&self.bytes)
    }

    /// Filename without its directory and final extension.
    pub fn stem(&self) -> String {
        download_stem(&self.filename)
    }

    /// Suggested name for the converted download, e.g. `report.v2.pdf`.
    pub fn download_name(&self, target: RenderTarget) -> String {
        format!("{}.{}", self.stem(), target.extension())
    }
}

/// Final bytes plus the metadata the response layer needs.
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    pub bytes: Bytes,
    pub content_type: &'static str,
    pub filename: String,
}

impl OutputArtifact {
    pub fn new(bytes: impl Into<Bytes>, target: RenderTarget, filename: String) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: target.content_type(),
            filename,
        }
    }
}

/// Validate the two form inputs in the order the form presents them: the file
/// first, then the format.
pub fn validate_submission(
    document: Option<UploadedDocument>,
    format: Option<&str>,
) -> Result<(UploadedDocument, RenderTarget), DomainError> {
    let document = document
        .filter(|document| !document.filename.is_empty())
        .ok_or(DomainError::MissingDocument)?;
    let target = format.unwrap_or_default().parse::<RenderTarget>()?;
    Ok((document, target))
}

pub fn decode_dropping_invalid(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    match text.strip_prefix(BYTE_ORDER_MARK) {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// Strip the directory part (either separator) and only the final extension.
/// Dotfiles such as `.bashrc` keep their name; an empty result becomes
/// `document`.
pub fn download_stem(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => &name[..idx],
        _ => name,
    };

    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem.to_string()
    }
}
