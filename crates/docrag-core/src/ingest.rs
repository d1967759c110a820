use std::path::{Path, PathBuf};
use std::sync::Arc;

use docrag_llm::LlmProvider;
use docrag_memory::VectorIndex;
use docrag_memory::document::{MimeType, TextSplitter, load_document};
use serde::Serialize;

use crate::drive::{DriveFilter, load_manifest};
use crate::error::IngestError;

/// Extra metadata stamped onto every chunk of one ingested file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkAnnotations {
    pub document_name: Option<String>,
    pub web_view_link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Chunks produced from this file.
    pub chunks: usize,
    /// Whether this ingestion created the index.
    pub created: bool,
    /// Chunks in the index afterwards.
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriveIngestReport {
    pub ingested: Vec<String>,
    pub skipped: Vec<String>,
    pub chunks: usize,
}

/// Loader, chunker and index wired together.
pub struct IngestService<P> {
    index: Arc<VectorIndex<P>>,
    splitter: TextSplitter,
    filter: DriveFilter,
    download_dir: PathBuf,
}

impl<P: LlmProvider> IngestService<P> {
    #[must_use]
    pub fn new(
        index: Arc<VectorIndex<P>>,
        splitter: TextSplitter,
        filter: DriveFilter,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            index,
            splitter,
            filter,
            download_dir,
        }
    }

    #[must_use]
    pub fn index(&self) -> &Arc<VectorIndex<P>> {
        &self.index
    }

    /// Load, split and index one file.
    ///
    /// The MIME type is checked before the file is touched, so an unsupported
    /// upload never reaches the loader or the index.
    ///
    /// # Errors
    ///
    /// See [`IngestError`]; index creation failures leave no index behind.
    pub async fn ingest_file(
        &self,
        path: &Path,
        mime: &str,
        annotations: ChunkAnnotations,
    ) -> Result<IngestReport, IngestError> {
        let mime_type: MimeType = mime
            .parse()
            .map_err(|_| IngestError::UnsupportedMimeType(mime.to_owned()))?;

        let size = tokio::fs::metadata(path)
            .await
            .map_err(|e| IngestError::LoadFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .len();
        if size == 0 {
            return Err(IngestError::EmptyFile(path.to_path_buf()));
        }

        let document =
            load_document(path, mime_type)
                .await
                .map_err(|e| IngestError::LoadFailure {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
        if document.units.is_empty() {
            return Err(IngestError::LoadFailure {
                path: path.to_path_buf(),
                reason: "no extractable text".into(),
            });
        }

        let mut chunks = self.splitter.split(&document.units);
        if chunks.is_empty() {
            return Err(IngestError::ChunkingFailure(path.to_path_buf()));
        }
        for chunk in &mut chunks {
            chunk
                .metadata
                .document_name
                .clone_from(&annotations.document_name);
            chunk
                .metadata
                .web_view_link
                .clone_from(&annotations.web_view_link);
        }

        let count = chunks.len();
        let status = self.index.get_or_create(Some(chunks)).await?;
        tracing::info!(
            path = %path.display(),
            %mime_type,
            chunks = count,
            created = status.created,
            total = status.total,
            "document ingested"
        );

        Ok(IngestReport {
            chunks: count,
            created: status.created,
            total: status.total,
        })
    }

    /// Ingest every permitted file listed in the Drive manifest at `manifest`.
    ///
    /// Files are read from `download_dir/<id>.<ext>`. Entries that are filtered
    /// out, of unsupported type, not yet downloaded, or whose id is not a plain
    /// file name are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Drive` if the manifest cannot be read, or the first ingestion error.
    pub async fn ingest_drive(&self, manifest: &Path) -> Result<DriveIngestReport, IngestError> {
        let files = load_manifest(manifest).await?;
        let mut report = DriveIngestReport::default();

        for file in files {
            if !self.filter.permits(&file.name) {
                tracing::info!(name = %file.name, "drive file excluded by filter");
                report.skipped.push(file.name);
                continue;
            }
            if file.mime_type.parse::<MimeType>().is_err() {
                tracing::warn!(name = %file.name, mime = %file.mime_type, "skipping unsupported drive file");
                report.skipped.push(file.name);
                continue;
            }
            let path = match file.local_path(&self.download_dir) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(name = %file.name, "skipping drive file: {e}");
                    report.skipped.push(file.name);
                    continue;
                }
            };
            if !path.is_file() {
                tracing::warn!(name = %file.name, path = %path.display(), "drive file not downloaded, skipping");
                report.skipped.push(file.name);
                continue;
            }

            let annotations = ChunkAnnotations {
                document_name: Some(file.name.clone()),
                web_view_link: file.web_view_link.clone(),
            };
            let result = self
                .ingest_file(&path, &file.mime_type, annotations)
                .await?;
            report.chunks += result.chunks;
            report.ingested.push(file.name);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use docrag_llm::mock::MockProvider;
    use docrag_memory::IndexConfig;
    use docrag_memory::document::SplitterConfig;

    use super::*;

    fn service(dir: &Path, provider: MockProvider, filter: DriveFilter) -> IngestService<MockProvider> {
        let index = VectorIndex::new(
            IndexConfig {
                persist_dir: dir.join("pdf-embeddings"),
                collection: "pdf_docs".into(),
            },
            Arc::new(provider),
        );
        IngestService::new(
            Arc::new(index),
            TextSplitter::new(SplitterConfig::default()).unwrap(),
            filter,
            dir.join("downloaded-files"),
        )
    }

    #[tokio::test]
    async fn unsupported_mime_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::default();
        let svc = service(dir.path(), provider.clone(), DriveFilter::default());

        let err = svc
            .ingest_file(
                Path::new("/does/not/matter.zip"),
                "application/zip",
                ChunkAnnotations::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::UnsupportedMimeType(ref m) if m == "application/zip"));
        assert!(!svc.index().exists());
        assert_eq!(provider.embed_calls(), 0);
    }

    #[tokio::test]
    async fn empty_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("empty.txt");
        std::fs::write(&file, "").unwrap();
        let svc = service(dir.path(), MockProvider::default(), DriveFilter::default());

        let err = svc
            .ingest_file(&file, "text/plain", ChunkAnnotations::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::EmptyFile(_)));
    }

    #[tokio::test]
    async fn whitespace_only_file_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("blank.txt");
        std::fs::write(&file, " \n\n ").unwrap();
        let svc = service(dir.path(), MockProvider::default(), DriveFilter::default());

        let err = svc
            .ingest_file(&file, "text/plain", ChunkAnnotations::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::LoadFailure { .. }));
        assert!(!svc.index().exists());
    }

    #[tokio::test]
    async fn annotations_reach_every_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("long.txt");
        std::fs::write(&file, "word ".repeat(500)).unwrap();
        let svc = service(dir.path(), MockProvider::default(), DriveFilter::default());

        let report = svc
            .ingest_file(
                &file,
                "text/plain",
                ChunkAnnotations {
                    document_name: Some("long.txt".into()),
                    web_view_link: Some("https://drive.example/long".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(report.chunks, 3);
        assert!(report.created);

        let hits = svc.index().similarity_search("word", 10).await.unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|h| {
            h.chunk.metadata.document_name.as_deref() == Some("long.txt")
                && h.chunk.metadata.web_view_link.as_deref() == Some("https://drive.example/long")
        }));
    }

    #[tokio::test]
    async fn embedding_failure_on_first_ingest_is_index_creation() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "content").unwrap();
        let svc = service(dir.path(), MockProvider::failing_embeddings(), DriveFilter::default());

        let err = svc
            .ingest_file(&file, "text/plain", ChunkAnnotations::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::IndexCreation(_)));
        assert!(!svc.index().exists());
    }

    #[tokio::test]
    async fn drive_manifest_respects_filter_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let downloads = dir.path().join("downloaded-files");
        std::fs::create_dir_all(&downloads).unwrap();
        std::fs::write(downloads.join("a1.txt"), "alpha handbook text").unwrap();
        std::fs::write(downloads.join("d1.txt"), "demo content").unwrap();

        let manifest = dir.path().join("info.json");
        std::fs::write(
            &manifest,
            serde_json::json!([
                {"id": "a1", "name": "handbook.txt", "mimeType": "text/plain", "webViewLink": "https://drive.example/a1"},
                {"id": "d1", "name": "demo.txt", "mimeType": "text/plain", "webViewLink": "https://drive.example/d1"},
                {"id": "m1", "name": "missing.txt", "mimeType": "text/plain", "webViewLink": "https://drive.example/m1"},
                {"id": "z1", "name": "bundle.zip", "mimeType": "application/zip", "webViewLink": "https://drive.example/z1"}
            ])
            .to_string(),
        )
        .unwrap();

        let filter = DriveFilter::new(&[], &["demo*".into()]).unwrap();
        let svc = service(dir.path(), MockProvider::default(), filter);
        let report = svc.ingest_drive(&manifest).await.unwrap();

        assert_eq!(report.ingested, vec!["handbook.txt"]);
        assert_eq!(report.skipped, vec!["demo.txt", "missing.txt", "bundle.zip"]);
        assert_eq!(report.chunks, 1);

        let hits = svc.index().similarity_search("handbook", 1).await.unwrap();
        assert_eq!(
            hits[0].chunk.metadata.web_view_link.as_deref(),
            Some("https://drive.example/a1")
        );
    }

    #[tokio::test]
    async fn drive_ids_outside_download_dir_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("downloaded-files")).unwrap();
        std::fs::write(dir.path().join("escape.txt"), "outside the download dir").unwrap();

        let manifest = dir.path().join("info.json");
        std::fs::write(
            &manifest,
            serde_json::json!([
                {"id": "../escape", "name": "escape.txt", "mimeType": "text/plain"}
            ])
            .to_string(),
        )
        .unwrap();

        let svc = service(dir.path(), MockProvider::default(), DriveFilter::default());
        let report = svc.ingest_drive(&manifest).await.unwrap();

        assert!(report.ingested.is_empty());
        assert_eq!(report.skipped, vec!["escape.txt"]);
        assert!(!svc.index().exists());
    }

    #[tokio::test]
    async fn missing_manifest_is_drive_error() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), MockProvider::default(), DriveFilter::default());
        let err = svc
            .ingest_drive(&dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IngestError::Drive(crate::error::DriveError::MetadataNotFound(_))
        ));
    }
}
