use std::path::PathBuf;

use super::Config;
use crate::secret::Secret;

fn split_list(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_llm();
        self.apply_env_overrides_storage();
        self.apply_env_overrides_drive();
        self.apply_env_overrides_gateway();
    }

    fn apply_env_overrides_llm(&mut self) {
        if let Ok(v) = std::env::var("DOCRAG_LLM_PROVIDER") {
            if let Ok(kind) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.llm.provider = kind;
            } else {
                tracing::warn!("ignoring invalid DOCRAG_LLM_PROVIDER value: {v}");
            }
        }
        if let Ok(v) = std::env::var("DOCRAG_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("DOCRAG_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("DOCRAG_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("DOCRAG_TIMEOUT_LLM")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.llm_seconds = secs;
        }
        if let Ok(v) = std::env::var("DOCRAG_PROMPT_NOT_FOUND_MESSAGE") {
            self.prompt.not_found_message = v;
        }
    }

    fn apply_env_overrides_storage(&mut self) {
        if let Ok(v) = std::env::var("DOCRAG_INDEX_DIR") {
            self.index.persist_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DOCRAG_INDEX_COLLECTION") {
            self.index.collection = v;
        }
        if let Ok(v) = std::env::var("DOCRAG_CHUNK_SIZE")
            && let Ok(n) = v.parse::<usize>()
        {
            self.splitter.chunk_size = n;
        }
        if let Ok(v) = std::env::var("DOCRAG_CHUNK_OVERLAP")
            && let Ok(n) = v.parse::<usize>()
        {
            self.splitter.chunk_overlap = n;
        }
        if let Ok(v) = std::env::var("DOCRAG_RETRIEVAL_TOP_K")
            && let Ok(k) = v.parse::<usize>()
        {
            self.retrieval.top_k = k;
        }
    }

    fn apply_env_overrides_drive(&mut self) {
        if let Ok(v) = std::env::var("DOCRAG_DRIVE_METADATA_PATH") {
            self.drive.metadata_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DOCRAG_DRIVE_DOWNLOAD_DIR") {
            self.drive.download_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DOCRAG_DRIVE_ALLOW") {
            self.drive.allow = split_list(&v);
        }
        if let Ok(v) = std::env::var("DOCRAG_DRIVE_DENY") {
            self.drive.deny = split_list(&v);
        }
        if let Ok(v) = std::env::var("DOCRAG_DRIVE_TOKEN_FILE") {
            self.drive.token_file = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("DOCRAG_TIMEOUT_DRIVE")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.drive_seconds = secs;
        }
    }

    fn apply_env_overrides_gateway(&mut self) {
        if let Ok(v) = std::env::var("DOCRAG_GATEWAY_BIND") {
            self.gateway.bind = v;
        }
        if let Ok(v) = std::env::var("DOCRAG_GATEWAY_PORT")
            && let Ok(port) = v.parse::<u16>()
        {
            self.gateway.port = port;
        }
        if let Ok(v) = std::env::var("DOCRAG_UPLOAD_DIR") {
            self.gateway.upload_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DOCRAG_GATEWAY_MAX_BODY")
            && let Ok(bytes) = v.parse::<usize>()
        {
            self.gateway.max_body_size = bytes;
        }
    }

    /// Pick up API keys and tokens from the environment.
    ///
    /// `DOCRAG_LLM_API_KEY` takes precedence over `GOOGLE_API_KEY`.
    pub fn resolve_secrets(&mut self) {
        let llm_key = std::env::var("DOCRAG_LLM_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty());
        if let Some(key) = llm_key {
            self.secrets.llm_api_key = Some(Secret::new(key));
        }
        if let Ok(token) = std::env::var("DOCRAG_DRIVE_TOKEN")
            && !token.is_empty()
        {
            self.secrets.drive_token = Some(Secret::new(token));
        }
    }
}
