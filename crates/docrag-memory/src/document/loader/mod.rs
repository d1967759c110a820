mod delimited;
mod html;
mod json;
#[cfg(feature = "pdf")]
mod pdf;
mod text;

use std::path::{Path, PathBuf};

pub use delimited::CsvLoader;
pub use html::HtmlLoader;
pub use json::JsonLoader;
#[cfg(feature = "pdf")]
pub use pdf::PdfLoader;
pub use text::TextLoader;

use super::{DEFAULT_MAX_FILE_SIZE, DocumentError, DocumentLoader, MimeType, SourceDocument};

/// Loader table: one strategy per supported MIME type.
///
/// # Errors
///
/// Returns `UnsupportedMimeType` for PDF when built without the `pdf` feature.
pub fn loader_for(mime: MimeType) -> Result<Box<dyn DocumentLoader>, DocumentError> {
    match mime {
        #[cfg(feature = "pdf")]
        MimeType::Pdf => Ok(Box::new(PdfLoader::default())),
        #[cfg(not(feature = "pdf"))]
        MimeType::Pdf => Err(DocumentError::UnsupportedMimeType(format!(
            "{mime} (built without pdf support)"
        ))),
        MimeType::Csv => Ok(Box::new(CsvLoader::default())),
        MimeType::Json => Ok(Box::new(JsonLoader::default())),
        MimeType::PlainText => Ok(Box::new(TextLoader::default())),
        MimeType::Html => Ok(Box::new(HtmlLoader::default())),
    }
}

/// Load `path` with the strategy registered for `mime`.
///
/// Units without extractable text are dropped, so an empty or text-free
/// document yields an empty `units` list rather than an error.
///
/// # Errors
///
/// Returns an error if the file is missing, too large, or cannot be parsed.
pub async fn load_document(path: &Path, mime: MimeType) -> Result<SourceDocument, DocumentError> {
    let loader = loader_for(mime)?;
    let mut units = loader.load(path).await?;
    units.retain(|u| !u.content.trim().is_empty());
    tracing::debug!(path = %path.display(), %mime, units = units.len(), "document loaded");
    Ok(SourceDocument {
        path: path.to_path_buf(),
        mime_type: mime,
        units,
    })
}

/// Canonicalize `path`, enforce the size limit and read the raw bytes.
async fn read_bounded(path: &Path, max_size: u64) -> Result<(PathBuf, Vec<u8>), DocumentError> {
    let path = tokio::fs::canonicalize(path).await?;
    let meta = tokio::fs::metadata(&path).await?;
    if meta.len() > max_size {
        return Err(DocumentError::FileTooLarge(meta.len()));
    }
    let bytes = tokio::fs::read(&path).await?;
    Ok((path, bytes))
}

fn default_max_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mime_type_has_a_loader() {
        for mime in MimeType::ALL {
            #[cfg(not(feature = "pdf"))]
            if mime == MimeType::Pdf {
                continue;
            }
            let loader = loader_for(mime).unwrap();
            assert_eq!(loader.mime_type(), mime);
        }
    }

    #[tokio::test]
    async fn blank_document_yields_no_units() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("blank.txt");
        std::fs::write(&file, "   \n\t  ").unwrap();

        let doc = load_document(&file, MimeType::PlainText).await.unwrap();
        assert!(doc.units.is_empty());
        assert_eq!(doc.mime_type, MimeType::PlainText);
    }

    #[tokio::test]
    async fn blank_csv_rows_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("rows.csv");
        std::fs::write(&file, "q,a\nfirst,one\n").unwrap();

        let doc = load_document(&file, MimeType::Csv).await.unwrap();
        assert_eq!(doc.units.len(), 1);
        assert_eq!(doc.units[0].metadata.row, Some(0));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = load_document(Path::new("/nonexistent/doc.txt"), MimeType::PlainText)
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Io(_)));
    }
}
