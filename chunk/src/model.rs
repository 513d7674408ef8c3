/// One chunk produced by a [`crate::Chunker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// 0-based position of this chunk within its source text.
    pub chunk_index: usize,
    /// The chunk's text, sliced verbatim from the source (original
    /// whitespace between the paragraphs/sentences it spans is preserved).
    pub text: String,
    /// Byte offset of `text` within the source text.
    pub start_offset: usize,
    /// Byte offset one past the end of `text` within the source text.
    pub end_offset: usize,
    /// Estimated token count (`ceil(chars / 4)`).
    pub token_count: usize,
    /// The nearest preceding Markdown-style heading, if any was found
    /// before this chunk in the source text.
    pub section: Option<String>,
}

/// The full output of a [`crate::Chunker`] run: the chunks themselves plus
/// the bookkeeping a caller needs to report on how the split went.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkResult {
    /// The chunks produced, in source order.
    pub chunks: Vec<TextChunk>,
    /// Name of the strategy that produced `chunks` (e.g. `"cascading"`).
    pub strategy: &'static str,
    /// Sum of `token_count` across `chunks`.
    pub total_tokens: usize,
    /// `total_tokens / chunks.len()`, or `0.0` for an empty result.
    pub average_chunk_tokens: f64,
}

impl ChunkResult {
    /// Builds a result from a strategy name and its produced chunks,
    /// deriving the token totals/average.
    #[must_use]
    pub fn new(strategy: &'static str, chunks: Vec<TextChunk>) -> Self {
        let total_tokens: usize = chunks.iter().map(|c| c.token_count).sum();
        #[allow(clippy::cast_precision_loss)]
        let average_chunk_tokens = if chunks.is_empty() {
            0.0
        } else {
            total_tokens as f64 / chunks.len() as f64
        };
        Self {
            chunks,
            strategy,
            total_tokens,
            average_chunk_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(token_count: usize) -> TextChunk {
        TextChunk {
            chunk_index: 0,
            text: String::new(),
            start_offset: 0,
            end_offset: 0,
            token_count,
            section: None,
        }
    }

    #[test]
    fn derives_total_and_average_tokens() {
        let result = ChunkResult::new("cascading", vec![chunk(10), chunk(20), chunk(30)]);
        assert_eq!(result.strategy, "cascading");
        assert_eq!(result.total_tokens, 60);
        assert!((result.average_chunk_tokens - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_chunks_yield_zero_average() {
        let result = ChunkResult::new("cascading", Vec::new());
        assert_eq!(result.total_tokens, 0);
        assert_eq!(result.average_chunk_tokens, 0.0);
    }
}
