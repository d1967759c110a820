mod env;
mod types;


pub use types::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "DOCRAG_CONFIG";

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error naming the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.splitter
            .validate()
            .context("invalid [splitter] section")?;
        if self.retrieval.top_k == 0 {
            bail!("[retrieval] top_k must be greater than zero");
        }
        if self.retrieval.excerpt_chars == 0 {
            bail!("[retrieval] excerpt_chars must be greater than zero");
        }
        if self.index.collection.trim().is_empty() {
            bail!("[index] collection must not be empty");
        }
        if self.prompt.not_found_message.trim().is_empty() {
            bail!("[prompt] not_found_message must not be empty");
        }
        if self.gateway.max_body_size == 0 {
            bail!("[gateway] max_body_size must be greater than zero");
        }
        if self.timeouts.llm_seconds == 0 || self.timeouts.drive_seconds == 0 {
            bail!("[timeouts] values must be greater than zero");
        }
        for pattern in self.drive.allow.iter().chain(&self.drive.deny) {
            glob::Pattern::new(pattern)
                .with_context(|| format!("invalid [drive] glob pattern: {pattern}"))?;
        }
        Ok(())
    }
}

/// Config path precedence: explicit flag, then `DOCRAG_CONFIG`, then the default.
#[must_use]
pub fn resolve_config_path(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_owned();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}
