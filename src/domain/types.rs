use std::{fmt, str::FromStr};

use super::error::DomainError;

/// Requested output kind. Drives the embedded style sheet, the MIME type and
/// the extension of the downloaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    Html,
    Pdf,
}

impl RenderTarget {
    pub const fn as_str(self) -> &'static str {
        match self {
            RenderTarget::Html => "html",
            RenderTarget::Pdf => "pdf",
        }
    }

    pub const fn extension(self) -> &'static str {
        self.as_str()
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            RenderTarget::Html => "text/html; charset=utf-8",
            RenderTarget::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderTarget {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "html" => Ok(RenderTarget::Html),
            "pdf" => Ok(RenderTarget::Pdf),
            other => Err(DomainError::unsupported_format(other)),
        }
    }
}
