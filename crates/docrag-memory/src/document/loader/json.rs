use std::path::Path;

use serde_json::Value;

use super::super::{DocumentError, DocumentLoader, LoadFuture, MimeType, TextUnit, UnitMetadata};
use super::{default_max_size, read_bounded};

/// A top-level array yields one unit per element; any other value is a single unit.
pub struct JsonLoader {
    pub max_file_size: u64,
}

impl Default for JsonLoader {
    fn default() -> Self {
        Self {
            max_file_size: default_max_size(),
        }
    }
}

impl DocumentLoader for JsonLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let (path, bytes) = read_bounded(&path, max_size).await?;
            let value: Value = serde_json::from_slice(&bytes)?;
            to_units(value, &path.display().to_string())
        })
    }

    fn mime_type(&self) -> MimeType {
        MimeType::Json
    }
}

fn to_units(value: Value, source: &str) -> Result<Vec<TextUnit>, DocumentError> {
    let unit = |content: String, row: Option<usize>| TextUnit {
        content,
        metadata: UnitMetadata {
            source: source.to_owned(),
            row,
            ..UnitMetadata::default()
        },
    };

    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| Ok(unit(render(item)?, Some(i))))
            .collect(),
        other => Ok(vec![unit(render(other)?, None)]),
    }
}

fn render(value: Value) -> Result<String, DocumentError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Ok(serde_json::to_string_pretty(&other)?),
    }
}
