use std::path::Path;

use super::super::{DocumentError, DocumentLoader, LoadFuture, MimeType, TextUnit, UnitMetadata};
use super::{default_max_size, read_bounded};

/// Visible text of the page as one unit; the `<title>` lands in metadata.
pub struct HtmlLoader {
    pub max_file_size: u64,
}

impl Default for HtmlLoader {
    fn default() -> Self {
        Self {
            max_file_size: default_max_size(),
        }
    }
}

impl DocumentLoader for HtmlLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let (path, bytes) = read_bounded(&path, max_size).await?;
            let html = String::from_utf8_lossy(&bytes);
            let (title, content) = extract(&html)?;

            Ok(vec![TextUnit {
                content,
                metadata: UnitMetadata {
                    source: path.display().to_string(),
                    title,
                    ..UnitMetadata::default()
                },
            }])
        })
    }

    fn mime_type(&self) -> MimeType {
        MimeType::Html
    }
}

fn first_text(soup: &scrape_core::Soup, selector: &str) -> Result<Option<String>, DocumentError> {
    let tags = soup
        .find_all(selector)
        .map_err(|e| DocumentError::Html(format!("invalid selector {selector}: {e}")))?;
    Ok(tags.into_iter().next().map(|tag| tag.text()))
}

fn extract(html: &str) -> Result<(Option<String>, String), DocumentError> {
    let soup = scrape_core::Soup::parse(html);

    let title = first_text(&soup, "title")?
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty());

    let raw = match first_text(&soup, "body")? {
        Some(body) => body,
        None => first_text(&soup, "html")?.unwrap_or_default(),
    };

    let content = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Ok((title, content))
}
