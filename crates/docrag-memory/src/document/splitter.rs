use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::DocumentError;
use super::types::{Chunk, ChunkMetadata, TextUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 250,
        }
    }
}

impl SplitterConfig {
    /// # Errors
    ///
    /// Returns `InvalidSplitter` if `chunk_size` is zero or the overlap is not smaller than it.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(DocumentError::InvalidSplitter {
                size: self.chunk_size,
                overlap: self.chunk_overlap,
            });
        }
        Ok(())
    }

    fn step(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

/// Fixed-size character windows with overlap.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    /// # Errors
    ///
    /// Returns `InvalidSplitter` if the config cannot make progress.
    pub fn new(config: SplitterConfig) -> Result<Self, DocumentError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> SplitterConfig {
        self.config
    }

    /// Split every unit into windows. Offsets run across all units of a source,
    /// so a second page starts where the first one ended.
    #[must_use]
    pub fn split(&self, units: &[TextUnit]) -> Vec<Chunk> {
        let mut bases: HashMap<&str, usize> = HashMap::new();
        let mut chunks = Vec::new();

        for unit in units {
            let base = bases.entry(unit.metadata.source.as_str()).or_insert(0);
            let windows = split_chars(
                &unit.content,
                self.config.chunk_size,
                self.config.step(),
            );
            chunks.extend(windows.into_iter().map(|(offset, content)| Chunk {
                content,
                metadata: ChunkMetadata {
                    source: unit.metadata.source.clone(),
                    start_offset: *base + offset,
                    page: unit.metadata.page,
                    row: unit.metadata.row,
                    title: unit.metadata.title.clone(),
                    ..ChunkMetadata::default()
                },
            }));
            *base += unit.content.chars().count();
        }

        chunks
    }
}

/// Windows of `chunk_size` chars every `step` chars; stops once a window reaches the end.
fn split_chars(text: &str, chunk_size: usize, step: usize) -> Vec<(usize, String)> {
    let chars: Vec<char> = text.chars().collect();
    let mut windows = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        windows.push((start, chars[start..end].iter().collect()));
        if end == chars.len() {
            break;
        }
        start += step;
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::types::UnitMetadata;

    fn unit(source: &str, content: &str) -> TextUnit {
        TextUnit {
            content: content.to_owned(),
            metadata: UnitMetadata {
                source: source.to_owned(),
                ..UnitMetadata::default()
            },
        }
    }

    fn default_splitter() -> TextSplitter {
        TextSplitter::new(SplitterConfig::default()).unwrap()
    }

    #[test]
    fn empty_unit_yields_nothing() {
        assert!(default_splitter().split(&[unit("a", "")]).is_empty());
    }

    #[test]
    fn short_unit_is_single_chunk() {
        let chunks = default_splitter().split(&[unit("a", "Hello world.")]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello world.");
        assert_eq!(chunks[0].metadata.start_offset, 0);
    }

    #[test]
    fn exact_chunk_size_is_single_chunk() {
        let text = "x".repeat(1000);
        assert_eq!(default_splitter().split(&[unit("a", &text)]).len(), 1);
    }

    #[test]
    fn twenty_five_hundred_chars() {
        let text: String = (0..2500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = default_splitter().split(&[unit("doc.txt", &text)]);

        let offsets: Vec<usize> = chunks.iter().map(|c| c.metadata.start_offset).collect();
        assert_eq!(offsets, vec![0, 750, 1500]);
        assert_eq!(chunks[0].content.chars().count(), 1000);
        assert_eq!(chunks[2].content.chars().count(), 1000);
        // consecutive windows share 250 chars
        assert_eq!(&chunks[0].content[750..], &chunks[1].content[..250]);
    }

    #[test]
    fn twenty_six_hundred_chars() {
        let text = "y".repeat(2600);
        let chunks = default_splitter().split(&[unit("doc.txt", &text)]);

        let offsets: Vec<usize> = chunks.iter().map(|c| c.metadata.start_offset).collect();
        assert_eq!(offsets, vec![0, 750, 1500, 2250]);
        assert_eq!(chunks[3].content.chars().count(), 350);
    }

    #[test]
    fn offsets_accumulate_across_units_of_one_source() {
        let mut first = unit("book.pdf", &"p".repeat(100));
        first.metadata.page = Some(0);
        let mut second = unit("book.pdf", &"q".repeat(100));
        second.metadata.page = Some(1);

        let chunks = default_splitter().split(&[first, second]);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].metadata.start_offset, 100);
        assert_eq!(chunks[1].metadata.page, Some(1));
    }

    #[test]
    fn offsets_restart_per_source() {
        let chunks = default_splitter().split(&[unit("a", "one"), unit("b", "two")]);
        assert_eq!(chunks[1].metadata.source, "b");
        assert_eq!(chunks[1].metadata.start_offset, 0);
    }

    #[test]
    fn multibyte_text_split_on_chars() {
        let splitter = TextSplitter::new(SplitterConfig {
            chunk_size: 4,
            chunk_overlap: 1,
        })
        .unwrap();
        let chunks = splitter.split(&[unit("u", "héllo wörld")]);
        assert_eq!(chunks[0].content, "héll");
        assert_eq!(chunks[1].content, "lo w");
        assert_eq!(chunks[1].metadata.start_offset, 3);
    }

    #[test]
    fn overlap_not_smaller_than_size_rejected() {
        let err = TextSplitter::new(SplitterConfig {
            chunk_size: 10,
            chunk_overlap: 10,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::InvalidSplitter {
                size: 10,
                overlap: 10
            }
        ));
    }

    #[test]
    fn zero_size_rejected() {
        assert!(
            SplitterConfig {
                chunk_size: 0,
                chunk_overlap: 0
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn char_split_no_overlap() {
        let windows = split_chars("abcdefghij", 5, 5);
        assert_eq!(
            windows,
            vec![(0, "abcde".to_owned()), (5, "fghij".to_owned())]
        );
    }

    mod proptest_splitter {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn split_never_panics(
                content in "\\PC{0,3000}",
                chunk_size in 1usize..1500,
                overlap_ratio in 0usize..100,
            ) {
                let chunk_overlap = chunk_size * overlap_ratio / 100;
                let splitter = TextSplitter::new(SplitterConfig { chunk_size, chunk_overlap }).unwrap();
                let _ = splitter.split(&[unit("p", &content)]);
            }

            #[test]
            fn chunks_bounded_and_overlapping(
                content in "[a-z ]{1,3000}",
                chunk_size in 2usize..400,
                overlap_ratio in 0usize..100,
            ) {
                let chunk_overlap = chunk_size * overlap_ratio / 100;
                let splitter = TextSplitter::new(SplitterConfig { chunk_size, chunk_overlap }).unwrap();
                let chunks = splitter.split(&[unit("p", &content)]);

                prop_assert!(!chunks.is_empty());
                for chunk in &chunks {
                    prop_assert!(chunk.content.chars().count() <= chunk_size);
                    prop_assert!(!chunk.content.is_empty());
                }
                for pair in chunks.windows(2) {
                    let (a, b) = (&pair[0], &pair[1]);
                    prop_assert!(b.metadata.start_offset > a.metadata.start_offset);
                    prop_assert_eq!(a.content.len(), chunk_size);
                    prop_assert_eq!(&a.content[chunk_size - chunk_overlap..], &b.content[..chunk_overlap]);
                }
            }

            #[test]
            fn chunks_cover_all_content(
                content in "[a-z]{1,2000}",
                chunk_size in 2usize..300,
            ) {
                let splitter = TextSplitter::new(SplitterConfig { chunk_size, chunk_overlap: chunk_size / 4 }).unwrap();
                let chunks = splitter.split(&[unit("p", &content)]);

                let last = chunks.last().unwrap();
                prop_assert_eq!(last.metadata.start_offset + last.content.len(), content.len());
                prop_assert_eq!(chunks[0].metadata.start_offset, 0);
            }

            #[test]
            fn split_is_deterministic(content in "\\PC{0,1500}") {
                let splitter = default_splitter();
                let units = [unit("d", &content)];
                prop_assert_eq!(splitter.split(&units), splitter.split(&units));
            }
        }
    }
}
