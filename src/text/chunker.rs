// file: src/text/chunker.rs
// description: word-count based text splitting for chunked uploads
// reference: fixed-size grouping over whitespace-delimited words

use crate::error::{DemoError, Result};

/// Splits text into segments of at most `max_words` words.
///
/// Words are separated by any run of whitespace and rejoined with a single
/// space. Empty or whitespace-only input produces no chunks.
#[derive(Debug, Clone, Copy)]
pub struct WordChunker {
    max_words: usize,
}

impl WordChunker {
    pub fn new(max_words: usize) -> Result<Self> {
        if max_words == 0 {
            return Err(DemoError::InvalidArgument(
                "max_words must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_words })
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();

        words
            .chunks(self.max_words)
            .map(|group| group.join(" "))
            .collect()
    }

    /// Number of chunks `chunk` would produce, without allocating them.
    pub fn count(&self, text: &str) -> usize {
        text.split_whitespace().count().div_ceil(self.max_words)
    }
}

/// Convenience wrapper over [`WordChunker`].
pub fn split_into_chunks(text: &str, max_words: usize) -> Result<Vec<String>> {
    Ok(WordChunker::new(max_words)?.chunk(text))
}
