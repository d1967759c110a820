use std::future::Future;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::DriveError;
use crate::secret::Secret;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: Secret,
}

/// Source of Drive access tokens. Token refresh and consent flows live behind it.
pub trait CredentialProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `DriveError::Credentials` if no usable token is available.
    fn credentials(&self) -> impl Future<Output = Result<Credentials, DriveError>> + Send;
}

/// Fixed bearer token, e.g. from `DOCRAG_DRIVE_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: Secret,
}

impl StaticTokenProvider {
    #[must_use]
    pub fn new(token: Secret) -> Self {
        Self { token }
    }
}

impl CredentialProvider for StaticTokenProvider {
    async fn credentials(&self) -> Result<Credentials, DriveError> {
        Ok(Credentials {
            access_token: self.token.clone(),
        })
    }
}

/// Reads the `token` field of an authorized-user token file on every call,
/// so an external refresher can rewrite the file in place.
#[derive(Debug, Clone)]
pub struct TokenFileProvider {
    path: PathBuf,
}

#[derive(Deserialize)]
struct TokenFile {
    token: Option<Secret>,
}

impl TokenFileProvider {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for TokenFileProvider {
    async fn credentials(&self) -> Result<Credentials, DriveError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            DriveError::Credentials(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let file: TokenFile = serde_json::from_slice(&bytes).map_err(|e| {
            DriveError::Credentials(format!("invalid token file {}: {e}", self.path.display()))
        })?;
        let token = file
            .token
            .filter(|t| !t.expose().is_empty())
            .ok_or_else(|| {
                DriveError::Credentials(format!("no token in {}", self.path.display()))
            })?;
        Ok(Credentials {
            access_token: token,
        })
    }
}

/// Either token source, chosen at startup from config.
#[derive(Debug, Clone)]
pub enum AnyCredentials {
    Static(StaticTokenProvider),
    TokenFile(TokenFileProvider),
}

impl CredentialProvider for AnyCredentials {
    async fn credentials(&self) -> Result<Credentials, DriveError> {
        match self {
            Self::Static(p) => p.credentials().await,
            Self::TokenFile(p) => p.credentials().await,
        }
    }
}
