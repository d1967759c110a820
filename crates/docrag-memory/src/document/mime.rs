use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DocumentError;

/// Document types the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MimeType {
    Pdf,
    Csv,
    Json,
    PlainText,
    Html,
}

impl MimeType {
    pub const ALL: [Self; 5] = [
        Self::Pdf,
        Self::Csv,
        Self::Json,
        Self::PlainText,
        Self::Html,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::PlainText => "text/plain",
            Self::Html => "text/html",
        }
    }

    /// File extension used when a document of this type is written to disk.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::PlainText => "txt",
            Self::Html => "html",
        }
    }
}

impl FromStr for MimeType {
    type Err = DocumentError;

    /// Parameters such as `; charset=utf-8` are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let essence = s.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" => Ok(Self::Pdf),
            "text/csv" => Ok(Self::Csv),
            "application/json" => Ok(Self::Json),
            "text/plain" => Ok(Self::PlainText),
            "text/html" | "application/xhtml+xml" => Ok(Self::Html),
            _ => Err(DocumentError::UnsupportedMimeType(s.to_owned())),
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
