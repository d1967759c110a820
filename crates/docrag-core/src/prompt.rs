//! Deterministic prompt assembly.

use crate::retriever::{Provenance, RetrievalResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPackage {
    pub text: String,
    pub provenance: Option<Provenance>,
}

/// Strip quote characters and flatten line breaks so the passage sits on one quoted line.
#[must_use]
pub fn normalize_passage(passage: &str) -> String {
    passage
        .chars()
        .filter(|c| !matches!(c, '\'' | '"'))
        .map(|c| if matches!(c, '\n' | '\r') { ' ' } else { c })
        .collect()
}

/// Render the instruction prompt for `query` over `result`.
///
/// The query is embedded verbatim; only the passage is normalized.
#[must_use]
pub fn build_prompt(query: &str, result: &RetrievalResult, not_found_message: &str) -> PromptPackage {
    let passage = normalize_passage(&result.passage_text);
    let text = format!(
        "You are a helpful and informative assistant that answers questions using the passage below.\n\
         The one who asks the question is not very technical, so keep your answer clear and simple.\n\
         Respond in a clear and concise manner and make it at least two sentences.\n\
         Answer only from the passage. If the passage does not contain the answer, reply exactly with: \
         {not_found_message}\n\
         \n\
         QUESTION: '{query}'\n\
         PASSAGE: '{passage}'\n\
         \n\
         ANSWER:"
    );

    PromptPackage {
        text,
        provenance: result.provenance.clone(),
    }
}
