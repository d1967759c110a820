//! Retrieval, prompting, generation, ingestion, Drive sync and configuration.

pub mod bootstrap;
pub mod config;
pub mod drive;
pub mod error;
pub mod generator;
pub mod ingest;
pub mod prompt;
pub mod query;
pub mod retriever;
pub mod secret;

pub use bootstrap::AppContext;
pub use config::Config;
pub use error::{DriveError, GenerationError, IngestError, QueryError};
pub use generator::{GenerationResult, ResponseGenerator};
pub use ingest::{ChunkAnnotations, DriveIngestReport, IngestReport, IngestService};
pub use prompt::{PromptPackage, build_prompt};
pub use query::{QueryAnswer, QueryService};
pub use retriever::{NO_RELEVANT_PASSAGE, Provenance, RetrievalResult, Retriever};
