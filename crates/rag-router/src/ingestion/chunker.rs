//! Token-bounded text chunking with position tracking

use std::sync::Arc;
use tiktoken_rs::CoreBPE;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};
use crate::types::Chunk;

type CountFn = dyn Fn(&str) -> usize + Send + Sync;

/// Text chunker with a token budget and no overlap
///
/// Chunks are exact, contiguous substrings of the input: concatenating them in
/// order gives back the original text. Sentence segments are packed greedily;
/// a segment larger than the budget is split on word boundaries, and a word
/// larger than the budget on characters.
pub struct TextChunker {
    /// Maximum chunk size in tokens
    chunk_size: usize,
    /// Token measure
    count: Arc<CountFn>,
}

impl TextChunker {
    /// Chunker measuring with the cl100k_base encoding
    pub fn cl100k(chunk_size: usize) -> Result<Self> {
        let bpe: CoreBPE = tiktoken_rs::cl100k_base()
            .map_err(|e| Error::config(format!("Failed to load cl100k_base tokenizer: {}", e)))?;
        Ok(Self::with_counter(chunk_size, move |text| {
            bpe.encode_ordinary(text).len()
        }))
    }

    /// Chunker with a custom token measure
    pub fn with_counter(
        chunk_size: usize,
        count: impl Fn(&str) -> usize + Send + Sync + 'static,
    ) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            count: Arc::new(count),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Token count of `text` under this chunker's measure
    pub fn count_tokens(&self, text: &str) -> usize {
        (self.count)(text)
    }

    /// Split `text` from `source` into chunks
    pub fn chunk(&self, source: &str, text: &str) -> Vec<Chunk> {
        self.chunk_from(source, text, 0)
    }

    /// Like [`chunk`](Self::chunk), numbering chunks from `first_index`.
    ///
    /// Used when one source yields several documents so chunk IDs stay
    /// distinct across them.
    pub fn chunk_from(&self, source: &str, text: &str, first_index: u32) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut start = 0usize;
        let mut end = 0usize;

        for (offset, piece) in self.pieces(text) {
            let piece_end = offset + piece.len();
            if end > start && !self.fits(&text[start..piece_end]) {
                chunks.push(self.make_chunk(source, text, start, end, first_index + chunks.len() as u32));
                start = end;
            }
            end = piece_end;
        }
        if end > start {
            chunks.push(self.make_chunk(source, text, start, end, first_index + chunks.len() as u32));
        }

        chunks
    }

    fn make_chunk(&self, source: &str, text: &str, start: usize, end: usize, index: u32) -> Chunk {
        Chunk::new(source, text[start..end].to_string(), start, end, index)
    }

    fn fits(&self, text: &str) -> bool {
        self.count_tokens(text) <= self.chunk_size
    }

    /// Contiguous pieces no larger than the budget (except single characters),
    /// with their byte offsets
    fn pieces<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        let mut pieces = Vec::new();
        for (offset, sentence) in text.split_sentence_bound_indices() {
            if self.fits(sentence) {
                pieces.push((offset, sentence));
                continue;
            }
            for (word_offset, word) in sentence.split_word_bound_indices() {
                if self.fits(word) {
                    pieces.push((offset + word_offset, word));
                } else {
                    pieces.extend(
                        word.char_indices()
                            .map(|(i, c)| (offset + word_offset + i, &word[i..i + c.len_utf8()])),
                    );
                }
            }
        }
        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_chunker(size: usize) -> TextChunker {
        TextChunker::with_counter(size, |s| s.split_whitespace().count())
    }

    fn reassemble(chunks: &[Chunk]) -> String {
        chunks.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn test_partition_is_lossless() {
        let text = "Agents plan. They remember things!  Memory is short-term or long-term.\n\n\
                    Tools extend what an agent can do. Reflection helps.";
        let chunker = word_chunker(6);
        let chunks = chunker.chunk("doc", text);

        assert!(chunks.len() > 1);
        assert_eq!(reassemble(&chunks), text);
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(chunker.count_tokens(&chunk.content) <= 6, "chunk {} too large", i);
            assert_eq!(chunk.chunk_index, i as u32);
            assert_eq!(&text[chunk.char_start..chunk.char_end], chunk.content);
        }
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].char_end, pair[1].char_start);
        }
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = word_chunker(500).chunk("doc", "One sentence. Two sentences.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "One sentence. Two sentences.");
        assert_eq!(chunks[0].id, Chunk::entry_id("doc", 0));
    }

    #[test]
    fn test_chunk_from_offsets_indices() {
        let chunker = word_chunker(3);
        let first = chunker.chunk("doc", "one two three four five");
        let second = chunker.chunk_from("doc", "six seven eight nine", first.len() as u32);

        assert_eq!(second[0].chunk_index, first.len() as u32);
        assert_eq!(second[0].char_start, 0);
        for chunk in &second {
            assert!(first.iter().all(|c| c.id != chunk.id));
        }
    }

    #[test]
    fn test_empty_text() {
        assert!(word_chunker(10).chunk("doc", "").is_empty());
    }

    #[test]
    fn test_long_sentence_splits_on_words() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = word_chunker(3).chunk("doc", text);
        assert_eq!(reassemble(&chunks), text);
        assert!(chunks.iter().all(|c| c.content.split_whitespace().count() <= 3));
        assert_eq!(chunks.len(), 4);
    }

    #[test]
    fn test_long_word_splits_on_chars() {
        let chunker = TextChunker::with_counter(4, |s| s.chars().count());
        let text = "abcdéfghij";
        let chunks = chunker.chunk("doc", text);
        assert_eq!(
            chunks.iter().map(|c| c.content.as_str()).collect::<Vec<_>>(),
            vec!["abcd", "éfgh", "ij"]
        );
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_cl100k_budget() {
        let chunker = TextChunker::cl100k(50).unwrap();
        let text = "Prompt engineering steers model behaviour without updating weights. ".repeat(40);
        let chunks = chunker.chunk("https://example.com/prompt", &text);

        assert!(chunks.len() > 1);
        assert_eq!(reassemble(&chunks), text);
        assert!(chunks.iter().all(|c| chunker.count_tokens(&c.content) <= 50));
    }
}
