//! Document loading and chunking plus the persisted vector index they feed.

pub mod document;
pub mod error;
pub mod index;
pub mod sqlite_store;

pub use error::IndexError;
pub use index::{IndexConfig, IndexStatus, ScoredChunk, VectorIndex};
pub use sqlite_store::{EmbeddedChunk, SqliteVectorStore};
