use std::fmt::Write as _;
use std::path::Path;

use super::super::{DocumentError, DocumentLoader, LoadFuture, MimeType, TextUnit, UnitMetadata};
use super::{default_max_size, read_bounded};

/// One unit per data row, rendered as `header: value` lines.
pub struct CsvLoader {
    pub max_file_size: u64,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self {
            max_file_size: default_max_size(),
        }
    }
}

impl DocumentLoader for CsvLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let (path, bytes) = read_bounded(&path, max_size).await?;
            let source = path.display().to_string();
            parse_rows(&bytes, &source)
        })
    }

    fn mime_type(&self) -> MimeType {
        MimeType::Csv
    }
}

fn parse_rows(bytes: &[u8], source: &str) -> Result<Vec<TextUnit>, DocumentError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    let mut units = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let mut content = String::new();
        for (col, value) in record.iter().enumerate() {
            if !content.is_empty() {
                content.push('\n');
            }
            match headers.get(col) {
                Some(h) if !h.is_empty() => {
                    let _ = write!(content, "{h}: {value}");
                }
                _ => {
                    let _ = write!(content, "{col}: {value}");
                }
            }
        }
        units.push(TextUnit {
            content,
            metadata: UnitMetadata {
                source: source.to_owned(),
                row: Some(row),
                ..UnitMetadata::default()
            },
        });
    }
    Ok(units)
}
