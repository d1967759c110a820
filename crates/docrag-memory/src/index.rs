//! Create-or-load management of the persisted vector index.
//!
//! The index directory is the unit of existence: if it is absent the first
//! ingestion creates it, otherwise it is opened and appended to. Creation is
//! staged in a sibling temporary directory and renamed into place, so a failed
//! first ingestion leaves nothing behind.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docrag_llm::LlmProvider;
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::document::Chunk;
use crate::error::IndexError;
use crate::sqlite_store::{EmbeddedChunk, SqliteVectorStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    pub persist_dir: PathBuf,
    pub collection: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            persist_dir: PathBuf::from("./pdf-embeddings"),
            collection: "pdf_docs".into(),
        }
    }
}

/// Outcome of [`VectorIndex::get_or_create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStatus {
    /// `true` when this call created the index.
    pub created: bool,
    pub appended: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Persisted index with one writer and any number of concurrent readers.
pub struct VectorIndex<P> {
    config: IndexConfig,
    provider: Arc<P>,
    store: RwLock<Option<SqliteVectorStore>>,
}

impl<P> std::fmt::Debug for VectorIndex<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P: LlmProvider> VectorIndex<P> {
    #[must_use]
    pub fn new(config: IndexConfig, provider: Arc<P>) -> Self {
        Self {
            config,
            provider,
            store: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Whether the index directory exists on disk.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.config.persist_dir.is_dir()
    }

    /// Create the index from `chunks` if absent, otherwise open it and append them.
    ///
    /// Embeddings are computed before the write lock is taken; the create-or-append
    /// decision is made again under the lock.
    ///
    /// # Errors
    ///
    /// - `NoDocumentsToIndex` if the index is absent and no chunks were supplied.
    /// - `IndexCreation` if first-time creation fails at any step. An embedding
    ///   failure after a concurrent ingestion created the index is reported as
    ///   `Embedding` instead.
    /// - `Embedding` / `Sqlite` / `DimensionMismatch` on append failures.
    pub async fn get_or_create(&self, chunks: Option<Vec<Chunk>>) -> Result<IndexStatus, IndexError> {
        let chunks = chunks.unwrap_or_default();
        let creating = !self.exists();
        if creating && chunks.is_empty() {
            return Err(IndexError::NoDocumentsToIndex);
        }

        let embedded = match self.embed_all(chunks).await {
            Ok(e) => e,
            // another ingestion may have created the index while we embedded
            Err(e) if creating && !self.exists() => {
                return Err(IndexError::IndexCreation(e.to_string()));
            }
            Err(e) => return Err(e),
        };

        let mut guard = self.store.write().await;
        if guard.is_none() && self.exists() {
            *guard = Some(SqliteVectorStore::open(&self.config.persist_dir, &self.config.collection).await?);
        }

        if let Some(store) = guard.as_mut() {
            let appended = store.append(embedded).await?;
            let total = store.count().await?;
            tracing::info!(
                dir = %self.config.persist_dir.display(),
                appended,
                total,
                "appended to existing index"
            );
            return Ok(IndexStatus {
                created: false,
                appended,
                total,
            });
        }

        if embedded.is_empty() {
            return Err(IndexError::NoDocumentsToIndex);
        }
        let appended = embedded.len();
        let store = self.create_atomic(embedded).await?;
        let total = store.count().await?;
        *guard = Some(store);

        tracing::info!(
            dir = %self.config.persist_dir.display(),
            collection = %self.config.collection,
            total,
            "created new index"
        );
        Ok(IndexStatus {
            created: true,
            appended,
            total,
        })
    }

    /// Top `k` chunks for `query`. An absent index yields no hits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLimit` for `k == 0`, or any embedding or storage error.
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        if k == 0 {
            return Err(IndexError::InvalidLimit);
        }
        if !self.exists() {
            tracing::debug!("similarity search on absent index");
            return Ok(Vec::new());
        }

        // no lock is held while the query is embedded
        let embedding = self.provider.embed(query).await?;
        let guard = self.read_store().await?;
        let Some(store) = guard.as_ref() else {
            return Ok(Vec::new());
        };
        let hits = store.search(&embedding, k).await?;
        tracing::debug!(k, hits = hits.len(), "similarity search");

        Ok(hits
            .into_iter()
            .map(|(chunk, score)| ScoredChunk { chunk, score })
            .collect())
    }

    /// # Errors
    ///
    /// Returns an error if the index cannot be opened or queried.
    pub async fn count(&self) -> Result<usize, IndexError> {
        let guard = self.read_store().await?;
        match guard.as_ref() {
            Some(store) => store.count().await,
            None => Ok(0),
        }
    }

    /// Stored rows whose content duplicates an earlier row.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be opened or queried.
    pub async fn duplicate_count(&self) -> Result<usize, IndexError> {
        let guard = self.read_store().await?;
        match guard.as_ref() {
            Some(store) => store.duplicate_count().await,
            None => Ok(0),
        }
    }

    async fn embed_all(&self, chunks: Vec<Chunk>) -> Result<Vec<EmbeddedChunk>, IndexError> {
        let mut embedded = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let embedding = self.provider.embed(&chunk.content).await?;
            if embedding.is_empty() {
                return Err(IndexError::EmptyEmbedding);
            }
            embedded.push(EmbeddedChunk { chunk, embedding });
        }
        Ok(embedded)
    }

    /// Read access to the store, opening it first if the directory exists.
    async fn read_store(&self) -> Result<RwLockReadGuard<'_, Option<SqliteVectorStore>>, IndexError> {
        {
            let guard = self.store.read().await;
            if guard.is_some() || !self.exists() {
                return Ok(guard);
            }
        }
        let mut guard = self.store.write().await;
        if guard.is_none() && self.exists() {
            *guard = Some(SqliteVectorStore::open(&self.config.persist_dir, &self.config.collection).await?);
        }
        Ok(guard.downgrade())
    }

    async fn create_atomic(&self, embedded: Vec<EmbeddedChunk>) -> Result<SqliteVectorStore, IndexError> {
        let target = &self.config.persist_dir;
        let staging = staging_dir(target);

        match self.build_staged(&staging, target, embedded).await {
            Ok(store) => Ok(store),
            Err(e) => {
                if staging.exists()
                    && let Err(cleanup) = tokio::fs::remove_dir_all(&staging).await
                {
                    tracing::warn!(dir = %staging.display(), "failed to remove staging dir: {cleanup}");
                }
                Err(IndexError::IndexCreation(e.to_string()))
            }
        }
    }

    async fn build_staged(
        &self,
        staging: &Path,
        target: &Path,
        embedded: Vec<EmbeddedChunk>,
    ) -> Result<SqliteVectorStore, IndexError> {
        if let Some(parent) = staging.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::create_dir(staging).await?;
        let store = SqliteVectorStore::create(staging, &self.config.collection, embedded).await?;
        store.close().await;
        tokio::fs::rename(staging, target).await?;
        SqliteVectorStore::open(target, &self.config.collection).await
    }
}

/// Hidden sibling of `target` used while the index is being built.
fn staging_dir(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map_or_else(|| "index".into(), |n| n.to_string_lossy().into_owned());
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    parent.join(format!(".{name}.tmp-{}", uuid::Uuid::new_v4()))
}
