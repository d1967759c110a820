use std::sync::Arc;

use docrag_llm::LlmProvider;

use crate::error::GenerationError;
use crate::prompt::PromptPackage;
use crate::retriever::Provenance;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub text: String,
    pub provenance: Option<Provenance>,
}

impl GenerationError {
    /// Fold the failure into a result whose text is the error message.
    #[must_use]
    pub fn into_fallback(self) -> GenerationResult {
        GenerationResult {
            text: self.to_string(),
            provenance: self.provenance,
        }
    }
}

pub struct ResponseGenerator<P> {
    provider: Arc<P>,
}

impl<P: LlmProvider> ResponseGenerator<P> {
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Send the prompt as a single completion request. No retries.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] carrying the prompt's provenance if the model call fails.
    pub async fn generate(&self, prompt: &PromptPackage) -> Result<GenerationResult, GenerationError> {
        match self.provider.generate(&prompt.text).await {
            Ok(text) => Ok(GenerationResult {
                text,
                provenance: prompt.provenance.clone(),
            }),
            Err(cause) => {
                tracing::error!(provider = self.provider.name(), "generation failed: {cause}");
                Err(GenerationError {
                    cause,
                    provenance: prompt.provenance.clone(),
                })
            }
        }
    }
}
