//! Text segmentation: paragraphs, sentences and speakable chunks.

pub mod chunker;
pub mod normalize;
pub mod paragraph;
pub mod sentence;

use serde::Serialize;

pub use chunker::{chunk_paragraph, split_into_chunks, verify_round_trip};
pub use normalize::{normalize_whitespace, word_count};
pub use paragraph::{ParagraphLimits, split_paragraphs};
pub use sentence::split_sentences;

/// A whitespace-normalized paragraph of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    /// Position in the input, 0-based
    pub index: usize,
    pub text: String,
}

impl Paragraph {
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }
}

/// A short speakable run of words inside one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Position within the paragraph, 0-based and contiguous
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_creation() {
        let chunk = Chunk::new(3, "Hello there world".to_string());
        assert_eq!(chunk.index, 3);
        assert_eq!(chunk.text, "Hello there world");
        assert_eq!(chunk.word_count(), 3);
    }

    #[test]
    fn test_chunk_serializes_index_and_text() {
        let json = serde_json::to_value(Chunk::new(0, "Hi.".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"index": 0, "text": "Hi."}));
    }
}
