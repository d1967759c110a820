use std::path::PathBuf;

use docrag_llm::LlmError;
use docrag_memory::IndexError;

use crate::retriever::Provenance;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("unsupported file type: {0}")]
    UnsupportedMimeType(String),

    #[error("file is empty: {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("failed to load {}: {reason}", path.display())]
    LoadFailure { path: PathBuf, reason: String },

    #[error("document produced no chunks: {}", .0.display())]
    ChunkingFailure(PathBuf),

    /// First-time index creation failed; no index directory was left behind.
    #[error("index creation failed: {0}")]
    IndexCreation(String),

    #[error("index error: {0}")]
    Index(#[source] IndexError),

    #[error("drive error: {0}")]
    Drive(#[from] DriveError),
}

impl From<IndexError> for IngestError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::IndexCreation(msg) => Self::IndexCreation(msg),
            other => Self::Index(other),
        }
    }
}

/// Model call failure, kept apart from successful answers.
///
/// Carries the provenance of the passage that was being answered so callers
/// can still show where the context came from.
#[derive(Debug, thiserror::Error)]
#[error("Error generating response: {cause}")]
pub struct GenerationError {
    #[source]
    pub cause: LlmError,
    pub provenance: Option<Provenance>,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] IndexError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("metadata file not found at: {}", .0.display())]
    MetadataNotFound(PathBuf),

    #[error("invalid JSON format in metadata file {}: {source}", path.display())]
    InvalidMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid drive file id: {0:?}")]
    InvalidFileId(String),

    #[error("credentials unavailable: {0}")]
    Credentials(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("drive API returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_creation_is_lifted() {
        let e: IngestError = IndexError::IndexCreation("disk full".into()).into();
        assert!(matches!(e, IngestError::IndexCreation(ref m) if m == "disk full"));

        let e: IngestError = IndexError::InvalidLimit.into();
        assert!(matches!(e, IngestError::Index(IndexError::InvalidLimit)));
    }

    #[test]
    fn generation_error_display() {
        let e = GenerationError {
            cause: LlmError::Other("quota exceeded".into()),
            provenance: None,
        };
        assert_eq!(
            e.to_string(),
            "Error generating response: quota exceeded"
        );
    }
}
