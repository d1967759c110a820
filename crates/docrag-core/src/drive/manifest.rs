use std::path::{Path, PathBuf};

use docrag_memory::document::MimeType;
use serde::{Deserialize, Serialize};

use crate::error::DriveError;

/// One entry of the synced-files manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileMetadata {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
}

impl DriveFileMetadata {
    /// `<id>.<ext>` for supported types, bare `<id>` otherwise.
    #[must_use]
    pub fn local_file_name(&self) -> String {
        match self.mime_type.parse::<MimeType>() {
            Ok(mime) => format!("{}.{}", self.id, mime.extension()),
            Err(_) => self.id.clone(),
        }
    }

    /// Location of the downloaded file inside `download_dir`.
    ///
    /// # Errors
    ///
    /// `InvalidFileId` if the id is empty or could name a path outside `download_dir`.
    pub fn local_path(&self, download_dir: &Path) -> Result<PathBuf, DriveError> {
        if self.id.is_empty() || self.id.contains(['/', '\\']) || self.id.contains("..") {
            return Err(DriveError::InvalidFileId(self.id.clone()));
        }
        Ok(download_dir.join(self.local_file_name()))
    }
}

/// Read the manifest at `path`.
///
/// # Errors
///
/// `MetadataNotFound` if the file is missing, `InvalidMetadata` if it is not a
/// JSON array of file records.
pub async fn load_manifest(path: &Path) -> Result<Vec<DriveFileMetadata>, DriveError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DriveError::MetadataNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes).map_err(|source| DriveError::InvalidMetadata {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `files` to `path` as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn write_manifest(path: &Path, files: &[DriveFileMetadata]) -> Result<(), DriveError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(files).map_err(|source| DriveError::InvalidMetadata {
        path: path.to_path_buf(),
        source,
    })?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
