use std::path::Path;

use super::super::{DocumentLoader, LoadFuture, MimeType, TextUnit, UnitMetadata};
use super::{default_max_size, read_bounded};

/// Whole file as a single unit.
pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: default_max_size(),
        }
    }
}

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let (path, bytes) = read_bounded(&path, max_size).await?;
            let content = String::from_utf8_lossy(&bytes).into_owned();

            Ok(vec![TextUnit {
                content,
                metadata: UnitMetadata {
                    source: path.display().to_string(),
                    ..UnitMetadata::default()
                },
            }])
        })
    }

    fn mime_type(&self) -> MimeType {
        MimeType::PlainText
    }
}
