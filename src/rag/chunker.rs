//! Page-aware word chunking.
//!
//! Pages are cut into non-overlapping windows of `word_length` words. A short
//! trailing window is carried onto the front of the next page instead of
//! being emitted, so only the final page can produce a short chunk. Emitted
//! chunks are tagged with the page whose iteration produced them, which for
//! carried words is the destination page, not the page they came from.

use crate::types::{AppError, Result};

/// Collapse every whitespace run (newlines included) to a single space and trim.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format a chunk as `[Page no. N] "<text>"`.
pub fn format_chunk(page: u32, words: &[&str]) -> String {
    format!("[Page no. {}] \"{}\"", page, words.join(" "))
}

/// Split a tagged chunk back into its page number and text.
pub fn parse_chunk(chunk: &str) -> Option<(u32, &str)> {
    let rest = chunk.strip_prefix("[Page no. ")?;
    let (page, rest) = rest.split_once("] ")?;
    let text = rest.strip_prefix('"')?.strip_suffix('"')?;
    Some((page.parse().ok()?, text))
}

pub struct PageChunker {
    word_length: usize,
    start_page: u32,
}

impl PageChunker {
    pub fn new(word_length: usize) -> Result<Self> {
        if word_length == 0 {
            return Err(AppError::InvalidInput(
                "word_length must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            word_length,
            start_page: 1,
        })
    }

    /// Number given to the first page's tag.
    pub fn with_start_page(mut self, start_page: u32) -> Self {
        self.start_page = start_page;
        self
    }

    pub fn word_length(&self) -> usize {
        self.word_length
    }

    pub fn chunk_pages<S: AsRef<str>>(&self, pages: &[S]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut carry: Vec<&str> = Vec::new();
        let last = pages.len().saturating_sub(1);

        for (idx, page) in pages.iter().enumerate() {
            let mut words = std::mem::take(&mut carry);
            words.extend(page.as_ref().split_whitespace());

            let page_no = self.start_page + idx as u32;

            for window in words.chunks(self.word_length) {
                if window.len() < self.word_length && idx != last {
                    carry = window.to_vec();
                    continue;
                }
                chunks.push(format_chunk(page_no, window));
            }
        }

        chunks
    }
}
