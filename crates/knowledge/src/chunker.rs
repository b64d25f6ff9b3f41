//! Character-window chunking with overlap.
//!
//! Windows are measured in characters, not bytes, so Cyrillic text splits
//! cleanly. Inside each window the splitter prefers to break at a paragraph,
//! then a line, then a sentence, then a word.

use serde::Serialize;

use crate::document::Document;

const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// A retrievable piece of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// `<source>#<index>`, unique within one index.
    pub id: String,
    pub source: String,
    pub index: usize,
    pub content: String,
}

/// Splits documents into overlapping chunks.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    /// `overlap` is clamped below `chunk_size`; a zero size is treated as one.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    pub fn chunk_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents.iter().flat_map(|doc| self.chunk_document(doc)).collect()
    }

    pub fn chunk_document(&self, document: &Document) -> Vec<Chunk> {
        self.split(&document.content)
            .into_iter()
            .enumerate()
            .map(|(index, content)| Chunk {
                id: format!("{}#{index}", document.source),
                source: document.source.clone(),
                index,
                content,
            })
            .collect()
    }

    /// Split raw text into trimmed, non-empty pieces of at most `chunk_size`
    /// characters.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut pieces = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let hard_end = (start + self.chunk_size).min(chars.len());
            let end = if hard_end == chars.len() {
                hard_end
            } else {
                self.break_point(&chars[start..hard_end])
                    .map_or(hard_end, |offset| start + offset)
            };

            let piece: String = chars[start..end].iter().collect();
            let piece = piece.trim();
            if !piece.is_empty() {
                pieces.push(piece.to_string());
            }

            if end >= chars.len() {
                break;
            }

            // Step back by the overlap, but always move forward.
            let next = end.saturating_sub(self.overlap);
            start = if next > start { next } else { end };
        }

        pieces
    }

    /// Offset just past the last preferred separator in the window's back half.
    fn break_point(&self, window: &[char]) -> Option<usize> {
        let text: String = window.iter().collect();
        let min_offset = window.len() / 2;

        SEPARATORS.iter().find_map(|sep| {
            let byte_pos = text.rfind(sep)?;
            let offset = text[..byte_pos].chars().count() + sep.chars().count();
            (offset > min_offset && offset > self.overlap).then_some(offset)
        })
    }
}
