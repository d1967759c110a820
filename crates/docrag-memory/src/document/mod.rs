pub mod error;
pub mod loader;
pub mod mime;
pub mod splitter;
pub mod types;

pub use error::DocumentError;
pub use loader::{CsvLoader, HtmlLoader, JsonLoader, TextLoader, load_document, loader_for};
pub use mime::MimeType;
pub use splitter::{SplitterConfig, TextSplitter};
pub use types::{Chunk, ChunkMetadata, SourceDocument, TextUnit, UnitMetadata};

#[cfg(feature = "pdf")]
pub use loader::PdfLoader;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub type LoadFuture<'a> = std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<Vec<TextUnit>, DocumentError>> + Send + 'a>,
>;

/// One loading strategy per MIME type.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &std::path::Path) -> LoadFuture<'_>;

    fn mime_type(&self) -> MimeType;
}
