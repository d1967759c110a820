use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::DriveConfig;
use crate::error::DriveError;

use super::credentials::CredentialProvider;
use super::manifest::{DriveFileMetadata, write_manifest};

const METADATA_FIELDS: &str = "id,name,mimeType,webViewLink";

/// Minimal Drive v3 client: file metadata and media download.
pub struct DriveClient<C> {
    http: reqwest::Client,
    api_base: String,
    download_dir: PathBuf,
    metadata_path: PathBuf,
    credentials: C,
}

impl<C> std::fmt::Debug for DriveClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveClient")
            .field("api_base", &self.api_base)
            .field("download_dir", &self.download_dir)
            .finish_non_exhaustive()
    }
}

impl<C: CredentialProvider> DriveClient<C> {
    #[must_use]
    pub fn new(config: &DriveConfig, credentials: C, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .user_agent(concat!("docrag/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            download_dir: config.download_dir.clone(),
            metadata_path: config.metadata_path.clone(),
            credentials,
        }
    }

    /// Fetch `{id, name, mimeType, webViewLink}` for one file.
    ///
    /// # Errors
    ///
    /// Returns an error on credential, transport or non-success HTTP failures.
    pub async fn fetch_metadata(&self, file_id: &str) -> Result<DriveFileMetadata, DriveError> {
        let url = format!(
            "{}/files/{file_id}?fields={METADATA_FIELDS}",
            self.api_base
        );
        let resp = self.get(&url).await?;
        Ok(resp.json().await?)
    }

    /// Download the file content into `download_dir/<id>.<ext>`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFileId` for ids that are not plain file names, or an
    /// error on credential, transport, HTTP or filesystem failures.
    pub async fn download(&self, file: &DriveFileMetadata) -> Result<PathBuf, DriveError> {
        let path = file.local_path(&self.download_dir)?;
        let url = format!("{}/files/{}?alt=media", self.api_base, file.id);
        let bytes = self.get(&url).await?.bytes().await?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        tokio::fs::write(&path, &bytes).await?;
        tracing::info!(id = %file.id, name = %file.name, bytes = bytes.len(), "drive file downloaded");
        Ok(path)
    }

    /// Fetch metadata and content for every id, then write the manifest.
    ///
    /// Stops at the first failure; the manifest is only written when every
    /// file was fetched.
    ///
    /// # Errors
    ///
    /// Returns the first metadata, download or manifest error.
    pub async fn sync(&self, file_ids: &[String]) -> Result<Vec<DriveFileMetadata>, DriveError> {
        let mut files = Vec::with_capacity(file_ids.len());
        for id in file_ids {
            let meta = self.fetch_metadata(id).await?;
            self.download(&meta).await?;
            files.push(meta);
        }
        write_manifest(&self.metadata_path, &files).await?;
        tracing::info!(count = files.len(), manifest = %self.metadata_path.display(), "drive sync complete");
        Ok(files)
    }

    #[must_use]
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, DriveError> {
        let creds = self.credentials.credentials().await?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(creds.access_token.expose())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, url, "drive request failed");
            return Err(DriveError::Status {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(resp)
    }
}
