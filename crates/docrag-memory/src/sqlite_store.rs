use std::path::Path;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::document::{Chunk, ChunkMetadata};
use crate::error::IndexError;

/// Database file inside an index directory.
pub const FILE_NAME: &str = "index.sqlite";

/// A chunk paired with its embedding. The only shape the store accepts.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// One collection of embedded chunks in a `SQLite` file.
///
/// Search is an exhaustive cosine scan over the collection.
#[derive(Debug, Clone)]
pub struct SqliteVectorStore {
    pool: SqlitePool,
    collection: String,
    dimension: Option<usize>,
}

impl SqliteVectorStore {
    /// Open the database in `dir` (creating the file if needed) and run migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub async fn open(dir: &Path, collection: &str) -> Result<Self, IndexError> {
        let opts = SqliteConnectOptions::new()
            .filename(dir.join(FILE_NAME))
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        sqlx::migrate!("../../migrations").run(&pool).await?;

        let dimension: Option<i64> =
            sqlx::query_scalar("SELECT dimension FROM index_meta WHERE collection = ?")
                .bind(collection)
                .fetch_optional(&pool)
                .await?;
        let dimension = dimension.map(usize::try_from).transpose()?;

        tracing::debug!(dir = %dir.display(), collection, ?dimension, "vector store opened");

        Ok(Self {
            pool,
            collection: collection.to_owned(),
            dimension,
        })
    }

    /// Open a fresh database in `dir` and write `chunks` into it.
    ///
    /// # Errors
    ///
    /// Returns `NoDocumentsToIndex` for an empty batch, or any open/write error.
    pub async fn create(
        dir: &Path,
        collection: &str,
        chunks: Vec<EmbeddedChunk>,
    ) -> Result<Self, IndexError> {
        if chunks.is_empty() {
            return Err(IndexError::NoDocumentsToIndex);
        }
        let mut store = Self::open(dir, collection).await?;
        store.append(chunks).await?;
        Ok(store)
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Embedding dimension fixed by the first write, if any.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Insert every chunk in one transaction. Existing rows are never touched.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if any embedding disagrees with the collection
    /// dimension; nothing is written in that case.
    pub async fn append(&mut self, chunks: Vec<EmbeddedChunk>) -> Result<usize, IndexError> {
        let Some(first) = chunks.first() else {
            return Ok(0);
        };
        let dimension = self.dimension.unwrap_or(first.embedding.len());
        if dimension == 0 {
            return Err(IndexError::EmptyEmbedding);
        }
        for c in &chunks {
            if c.embedding.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: c.embedding.len(),
                });
            }
        }

        let mut tx = self.pool.begin().await?;

        if self.dimension.is_none() {
            sqlx::query("INSERT OR IGNORE INTO index_meta (collection, dimension) VALUES (?, ?)")
                .bind(&self.collection)
                .bind(i64::try_from(dimension)?)
                .execute(&mut *tx)
                .await?;
        }

        for c in &chunks {
            let hash = blake3::hash(c.chunk.content.as_bytes()).to_hex().to_string();
            let metadata = serde_json::to_string(&c.chunk.metadata)?;
            sqlx::query(
                "INSERT INTO chunks (collection, content, content_hash, metadata, embedding) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&self.collection)
            .bind(&c.chunk.content)
            .bind(hash)
            .bind(metadata)
            .bind(encode_embedding(&c.embedding))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.dimension = Some(dimension);

        tracing::debug!(collection = %self.collection, count = chunks.len(), "chunks appended");
        Ok(chunks.len())
    }

    /// Top `k` chunks by descending cosine similarity. Ties keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `query` does not match the collection dimension.
    pub async fn search(&self, query: &[f32], k: usize) -> Result<Vec<(Chunk, f32)>, IndexError> {
        let Some(dimension) = self.dimension else {
            return Ok(Vec::new());
        };
        if query.len() != dimension {
            return Err(IndexError::DimensionMismatch {
                expected: dimension,
                actual: query.len(),
            });
        }

        let rows: Vec<(String, String, Vec<u8>)> = sqlx::query_as(
            "SELECT content, metadata, embedding FROM chunks WHERE collection = ? ORDER BY id",
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;

        let mut scored = Vec::with_capacity(rows.len());
        for (content, metadata, blob) in rows {
            let score = cosine_similarity(query, &decode_embedding(&blob));
            let metadata: ChunkMetadata = serde_json::from_str(&metadata)?;
            scored.push((Chunk { content, metadata }, score));
        }
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        Ok(scored)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count(&self) -> Result<usize, IndexError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks WHERE collection = ?")
            .bind(&self.collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(n)?)
    }

    /// Rows whose content already exists earlier in the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn duplicate_count(&self) -> Result<usize, IndexError> {
        let n: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(n - 1), 0) FROM \
             (SELECT COUNT(*) AS n FROM chunks WHERE collection = ? GROUP BY content_hash)",
        )
        .bind(&self.collection)
        .fetch_one(&self.pool)
        .await?;
        Ok(usize::try_from(n)?)
    }

    /// Close every pooled connection, flushing the WAL into the main file.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn encode_embedding(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|x| x.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
