#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file type: {0}")]
    UnsupportedMimeType(String),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTML error: {0}")]
    Html(String),

    #[error("invalid splitter config: chunk_overlap ({overlap}) must be less than chunk_size ({size}) and chunk_size must be positive")]
    InvalidSplitter { size: usize, overlap: usize },

    #[error("loader task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
