use std::sync::Arc;

use docrag_llm::LlmProvider;
use docrag_memory::VectorIndex;
use serde::Serialize;

use crate::error::QueryError;
use crate::generator::{GenerationResult, ResponseGenerator};
use crate::prompt::build_prompt;
use crate::retriever::Retriever;

/// Final answer with the provenance of the top-ranked passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryAnswer {
    pub response_text: String,
    pub source: Option<String>,
    pub excerpt: Option<String>,
    pub web_view_link: Option<String>,
    pub document_name: Option<String>,
}

impl From<GenerationResult> for QueryAnswer {
    fn from(result: GenerationResult) -> Self {
        let (source, excerpt, web_view_link, document_name) = match result.provenance {
            Some(p) => (Some(p.source), Some(p.excerpt), p.web_view_link, p.document_name),
            None => (None, None, None, None),
        };
        Self {
            response_text: result.text,
            source,
            excerpt,
            web_view_link,
            document_name,
        }
    }
}

pub struct QueryService<P> {
    retriever: Retriever<P>,
    generator: ResponseGenerator<P>,
    default_k: usize,
    not_found_message: String,
}

impl<P: LlmProvider> QueryService<P> {
    #[must_use]
    pub fn new(
        index: Arc<VectorIndex<P>>,
        default_k: usize,
        excerpt_chars: usize,
        not_found_message: impl Into<String>,
    ) -> Self {
        let generator = ResponseGenerator::new(Arc::clone(index.provider()));
        Self {
            retriever: Retriever::new(index, excerpt_chars),
            generator,
            default_k,
            not_found_message: not_found_message.into(),
        }
    }

    /// Retrieve, prompt and generate. `k` falls back to the configured default.
    ///
    /// An empty retrieval answers with the not-found message and never calls the model.
    ///
    /// # Errors
    ///
    /// Returns `Retrieval` on index failures and `Generation` when the model call fails.
    pub async fn answer(&self, query: &str, k: Option<usize>) -> Result<QueryAnswer, QueryError> {
        let k = k.unwrap_or(self.default_k);
        let retrieved = self.retriever.retrieve(query, k).await?;

        if retrieved.is_empty() {
            return Ok(QueryAnswer {
                response_text: self.not_found_message.clone(),
                source: None,
                excerpt: None,
                web_view_link: None,
                document_name: None,
            });
        }

        let prompt = build_prompt(query, &retrieved, &self.not_found_message);
        let result = self.generator.generate(&prompt).await?;
        tracing::debug!(k, chars = result.text.len(), "query answered");
        Ok(result.into())
    }
}

#[cfg(test)]
mod tests {
    use docrag_llm::mock::MockProvider;
    use docrag_memory::IndexConfig;
    use docrag_memory::document::{Chunk, ChunkMetadata};

    use super::*;

    const NOT_FOUND: &str = "I'm sorry, but I couldn't find that information in the uploaded document.";

    fn index(dir: &std::path::Path, provider: MockProvider) -> Arc<VectorIndex<MockProvider>> {
        Arc::new(VectorIndex::new(
            IndexConfig {
                persist_dir: dir.join("idx"),
                collection: "pdf_docs".into(),
            },
            Arc::new(provider),
        ))
    }

    fn chunk(content: &str) -> Chunk {
        Chunk {
            content: content.into(),
            metadata: ChunkMetadata {
                source: "/docs/policy.txt".into(),
                document_name: Some("policy.txt".into()),
                ..ChunkMetadata::default()
            },
        }
    }

    #[tokio::test]
    async fn empty_index_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::default();
        let svc = QueryService::new(index(dir.path(), provider.clone()), 3, 200, NOT_FOUND);

        let answer = svc.answer("anything?", None).await.unwrap();
        assert_eq!(answer.response_text, NOT_FOUND);
        assert!(answer.source.is_none());
        assert!(provider.prompts().is_empty());
        assert_eq!(provider.embed_calls(), 0);
    }

    #[tokio::test]
    async fn answer_carries_provenance() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::with_responses(vec!["Refunds take 14 days.".into()]);
        let idx = index(dir.path(), provider.clone());
        idx.get_or_create(Some(vec![chunk("Refunds are processed within 14 days.")]))
            .await
            .unwrap();

        let svc = QueryService::new(idx, 3, 200, NOT_FOUND);
        let answer = svc.answer("How long do refunds take?", Some(1)).await.unwrap();

        assert_eq!(answer.response_text, "Refunds take 14 days.");
        assert_eq!(answer.source.as_deref(), Some("/docs/policy.txt"));
        assert_eq!(answer.excerpt.as_deref(), Some("Refunds are processed within 14 days."));
        assert_eq!(answer.document_name.as_deref(), Some("policy.txt"));
        assert_eq!(provider.prompts().len(), 1);
    }

    #[tokio::test]
    async fn generation_failure_is_distinct_error() {
        let dir = tempfile::tempdir().unwrap();
        let idx = index(dir.path(), MockProvider::failing());
        // failing() only breaks chat; embeddings still work
        idx.get_or_create(Some(vec![chunk("Refunds are processed within 14 days.")]))
            .await
            .unwrap();

        let svc = QueryService::new(idx, 3, 200, NOT_FOUND);
        let err = svc.answer("refunds?", None).await.unwrap_err();
        let QueryError::Generation(gen_err) = err else {
            panic!("expected generation error, got {err:?}");
        };
        assert!(gen_err.to_string().starts_with("Error generating response: "));
        assert_eq!(
            gen_err.provenance.map(|p| p.source).as_deref(),
            Some("/docs/policy.txt")
        );
    }

    #[tokio::test]
    async fn zero_k_is_retrieval_error() {
        let dir = tempfile::tempdir().unwrap();
        let svc = QueryService::new(index(dir.path(), MockProvider::default()), 3, 200, NOT_FOUND);
        let err = svc.answer("q", Some(0)).await.unwrap_err();
        assert!(matches!(err, QueryError::Retrieval(_)));
    }
}
