use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("no markdown document was uploaded")]
    MissingDocument,
    #[error("unsupported export format `{value}`")]
    UnsupportedFormat { value: String },
}

impl DomainError {
    pub fn unsupported_format(value: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            value: value.into(),
        }
    }

    /// Message shown to the person who submitted the form.
    pub fn public_message(&self) -> &'static str {
        match self {
            DomainError::MissingDocument => "Please upload a valid Markdown file.",
            DomainError::UnsupportedFormat { .. } => "Choose an export format (HTML or PDF).",
        }
    }
}
