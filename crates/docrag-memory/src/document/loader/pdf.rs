use std::path::Path;

use super::super::{DocumentError, DocumentLoader, LoadFuture, MimeType, TextUnit, UnitMetadata};
use super::{default_max_size, read_bounded};

/// One unit per page, `page` is the 0-based page index.
pub struct PdfLoader {
    pub max_file_size: u64,
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self {
            max_file_size: default_max_size(),
        }
    }
}

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let (path, bytes) = read_bounded(&path, max_size).await?;
            let source = path.display().to_string();

            let pages = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem_by_pages(&bytes)
                    .map_err(|e| DocumentError::Pdf(e.to_string()))
            })
            .await??;

            Ok(pages
                .into_iter()
                .enumerate()
                .map(|(page, content)| TextUnit {
                    content,
                    metadata: UnitMetadata {
                        source: source.clone(),
                        page: Some(page),
                        ..UnitMetadata::default()
                    },
                })
                .collect())
        })
    }

    fn mime_type(&self) -> MimeType {
        MimeType::Pdf
    }
}
