use std::sync::Arc;

use docrag_llm::LlmProvider;
use docrag_memory::{IndexError, ScoredChunk, VectorIndex};
use serde::Serialize;

/// Passage text returned when the index has nothing for a query.
pub const NO_RELEVANT_PASSAGE: &str = "No relevant passages found for the above query.";

/// Source label used when a chunk carries no source metadata.
pub const UNKNOWN_SOURCE: &str = "Unknown sources";

/// Where the top-ranked passage came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub source: String,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalResult {
    pub passage_text: String,
    pub provenance: Option<Provenance>,
}

impl RetrievalResult {
    /// The no-hit sentinel. Not an error.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            passage_text: NO_RELEVANT_PASSAGE.to_owned(),
            provenance: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.provenance.is_none()
    }

    /// Join all hits in rank order; provenance comes from the first hit only.
    #[must_use]
    pub fn from_hits(hits: &[ScoredChunk], excerpt_chars: usize) -> Self {
        let Some(top) = hits.first() else {
            return Self::empty();
        };

        let passage_text = hits
            .iter()
            .map(|h| h.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let meta = &top.chunk.metadata;
        let source = if meta.source.is_empty() {
            UNKNOWN_SOURCE.to_owned()
        } else {
            meta.source.clone()
        };

        Self {
            passage_text,
            provenance: Some(Provenance {
                source,
                excerpt: top.chunk.content.chars().take(excerpt_chars).collect(),
                web_view_link: meta.web_view_link.clone(),
                document_name: meta.document_name.clone(),
                page: meta.page,
            }),
        }
    }
}

pub struct Retriever<P> {
    index: Arc<VectorIndex<P>>,
    excerpt_chars: usize,
}

impl<P: LlmProvider> Retriever<P> {
    #[must_use]
    pub fn new(index: Arc<VectorIndex<P>>, excerpt_chars: usize) -> Self {
        Self {
            index,
            excerpt_chars,
        }
    }

    /// Top `k` passages for `query`, or the empty sentinel when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLimit` for `k == 0`, or any embedding or storage failure.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievalResult, IndexError> {
        let hits = self.index.similarity_search(query, k).await?;
        if hits.is_empty() {
            tracing::info!("no relevant passages for query");
        }
        Ok(RetrievalResult::from_hits(&hits, self.excerpt_chars))
    }
}
