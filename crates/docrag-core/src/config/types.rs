use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use docrag_memory::document::SplitterConfig;

use crate::secret::Secret;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub index: VectorIndexConfig,
    #[serde(default)]
    pub splitter: SplitterConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

/// LLM backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Any `OpenAI`-compatible endpoint, Gemini by default.
    #[default]
    OpenAi,
    Ollama,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".into()
}

fn default_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_embedding_model() -> String {
    "gemini-embedding-001".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            max_tokens: None,
        }
    }
}

fn default_persist_dir() -> PathBuf {
    PathBuf::from("./pdf-embeddings")
}

fn default_collection() -> String {
    "pdf_docs".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VectorIndexConfig {
    #[serde(default = "default_persist_dir")]
    pub persist_dir: PathBuf,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            persist_dir: default_persist_dir(),
            collection: default_collection(),
        }
    }
}

impl From<&VectorIndexConfig> for docrag_memory::IndexConfig {
    fn from(c: &VectorIndexConfig) -> Self {
        Self {
            persist_dir: c.persist_dir.clone(),
            collection: c.collection.clone(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

fn default_excerpt_chars() -> usize {
    200
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Length of the provenance excerpt, in chars.
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

fn default_not_found_message() -> String {
    "I'm sorry, but I couldn't find that information in the uploaded document.".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptConfig {
    #[serde(default = "default_not_found_message")]
    pub not_found_message: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            not_found_message: default_not_found_message(),
        }
    }
}

fn default_metadata_path() -> PathBuf {
    PathBuf::from("./temp/demo_file_info.json")
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloaded-files")
}

fn default_drive_api_base() -> String {
    "https://www.googleapis.com/drive/v3".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriveConfig {
    /// Manifest of synced files, a JSON array of `{id, name, mimeType, webViewLink}`.
    #[serde(default = "default_metadata_path")]
    pub metadata_path: PathBuf,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    /// Glob patterns on the file name; empty means every file.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Glob patterns on the file name; a match always excludes.
    #[serde(default)]
    pub deny: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
    #[serde(default = "default_drive_api_base")]
    pub api_base: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            metadata_path: default_metadata_path(),
            download_dir: default_download_dir(),
            allow: Vec::new(),
            deny: Vec::new(),
            token_file: None,
            api_base: default_drive_api_base(),
        }
    }
}

fn default_gateway_bind() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    8000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploaded_files")
}

fn default_gateway_max_body() -> usize {
    52_428_800
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_gateway_max_body")]
    pub max_body_size: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_gateway_bind(),
            port: default_gateway_port(),
            upload_dir: default_upload_dir(),
            max_body_size: default_gateway_max_body(),
        }
    }
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_drive_timeout() -> u64 {
    60
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_llm_timeout")]
    pub llm_seconds: u64,
    #[serde(default = "default_drive_timeout")]
    pub drive_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_seconds: default_llm_timeout(),
            drive_seconds: default_drive_timeout(),
        }
    }
}

/// Values resolved from the environment, never read from or written to the file.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSecrets {
    pub llm_api_key: Option<Secret>,
    pub drive_token: Option<Secret>,
}
