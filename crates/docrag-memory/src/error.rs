/// Errors raised by the vector index and its `SQLite` backing store.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("no documents provided to create new embeddings")]
    NoDocumentsToIndex,

    /// First-time creation failed; nothing was left on disk.
    #[error("index creation failed: {0}")]
    IndexCreation(String),

    #[error("search limit must be greater than zero")]
    InvalidLimit,

    #[error("embedding dimension mismatch: index has {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding service returned an empty vector")]
    EmptyEmbedding,

    #[error("embedding failed: {0}")]
    Embedding(#[from] docrag_llm::LlmError),

    #[error("database error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("integer conversion: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),
}
