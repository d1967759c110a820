//! Application bootstrap: config resolution, provider and service construction.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use docrag_llm::LlmProvider;
use docrag_llm::any::AnyProvider;
use docrag_llm::ollama::OllamaProvider;
use docrag_llm::openai::OpenAiProvider;
use docrag_memory::VectorIndex;
use docrag_memory::document::TextSplitter;

use crate::config::{Config, ProviderKind, resolve_config_path};
use crate::drive::{AnyCredentials, DriveClient, DriveFilter, StaticTokenProvider, TokenFileProvider};
use crate::ingest::IngestService;
use crate::query::QueryService;

/// Resolve the config path, load, resolve secrets and validate.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or a setting is invalid.
pub fn load_config(cli_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = resolve_config_path(cli_path);
    let mut config = Config::load(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    config.resolve_secrets();
    config.validate()?;
    tracing::debug!(path = %path.display(), provider = %config.llm.provider, "config loaded");
    Ok(config)
}

/// # Errors
///
/// Returns an error if the OpenAI-compatible provider is selected without an API key.
pub fn create_provider(config: &Config) -> anyhow::Result<AnyProvider> {
    let timeout = Duration::from_secs(config.timeouts.llm_seconds);
    match config.llm.provider {
        ProviderKind::OpenAi => {
            let api_key = config
                .secrets
                .llm_api_key
                .as_ref()
                .context("DOCRAG_LLM_API_KEY (or GOOGLE_API_KEY) not found")?
                .expose()
                .to_owned();
            let mut provider = OpenAiProvider::new(
                api_key,
                config.llm.base_url.clone(),
                config.llm.model.clone(),
                Some(config.llm.embedding_model.clone()),
            )
            .with_timeout(timeout);
            if let Some(max_tokens) = config.llm.max_tokens {
                provider = provider.with_max_tokens(max_tokens);
            }
            Ok(AnyProvider::OpenAi(provider))
        }
        ProviderKind::Ollama => Ok(AnyProvider::Ollama(
            OllamaProvider::new(
                &config.llm.base_url,
                config.llm.model.clone(),
                config.llm.embedding_model.clone(),
            )
            .with_timeout(timeout),
        )),
    }
}

/// Pick the Drive token source: a token file if configured, else `DOCRAG_DRIVE_TOKEN`.
///
/// # Errors
///
/// Returns an error if neither source is configured.
pub fn create_drive_credentials(config: &Config) -> anyhow::Result<AnyCredentials> {
    if let Some(path) = &config.drive.token_file {
        return Ok(AnyCredentials::TokenFile(TokenFileProvider::new(path)));
    }
    let token = config
        .secrets
        .drive_token
        .clone()
        .context("no drive credentials: set [drive] token_file or DOCRAG_DRIVE_TOKEN")?;
    Ok(AnyCredentials::Static(StaticTokenProvider::new(token)))
}

/// # Errors
///
/// Returns an error if no Drive credentials are configured.
pub fn create_drive_client(config: &Config) -> anyhow::Result<DriveClient<AnyCredentials>> {
    let credentials = create_drive_credentials(config)?;
    Ok(DriveClient::new(
        &config.drive,
        credentials,
        Duration::from_secs(config.timeouts.drive_seconds),
    ))
}

/// Shared services over one index.
pub struct AppContext<P> {
    pub index: Arc<VectorIndex<P>>,
    pub ingest: Arc<IngestService<P>>,
    pub query: Arc<QueryService<P>>,
}

impl<P> Clone for AppContext<P> {
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
            ingest: Arc::clone(&self.ingest),
            query: Arc::clone(&self.query),
        }
    }
}

impl<P: LlmProvider> AppContext<P> {
    /// # Errors
    ///
    /// Returns an error if the splitter settings or Drive filter patterns are invalid.
    pub fn build(config: &Config, provider: P) -> anyhow::Result<Self> {
        let index = Arc::new(VectorIndex::new((&config.index).into(), Arc::new(provider)));
        let splitter = TextSplitter::new(config.splitter).context("invalid [splitter] section")?;
        let filter = DriveFilter::new(&config.drive.allow, &config.drive.deny)
            .context("invalid [drive] allow/deny pattern")?;

        let ingest = IngestService::new(
            Arc::clone(&index),
            splitter,
            filter,
            config.drive.download_dir.clone(),
        );
        let query = QueryService::new(
            Arc::clone(&index),
            config.retrieval.top_k,
            config.retrieval.excerpt_chars,
            config.prompt.not_found_message.clone(),
        );

        Ok(Self {
            index,
            ingest: Arc::new(ingest),
            query: Arc::new(query),
        })
    }
}
