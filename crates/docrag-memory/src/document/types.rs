use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::MimeType;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitMetadata {
    pub source: String,
    pub page: Option<usize>,
    pub row: Option<usize>,
    pub title: Option<String>,
}

/// One loader-defined logical unit: a PDF page, a CSV row, a JSON record, a whole text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    pub content: String,
    pub metadata: UnitMetadata,
}

#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub mime_type: MimeType,
    pub units: Vec<TextUnit>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    /// Char offset into the concatenated text of every unit of `source`.
    pub start_offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}
