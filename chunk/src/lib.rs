//! Paragraph/sentence/whitespace cascading chunker.
//!
//! This is the C3 "Chunker" component: it turns a page or document's full
//! text into token-budgeted [`TextChunk`]s, generalizing the workspace's
//! previous `FixedSizeChunker` and `SentenceChunker` into one cascading
//! strategy that never splits inside a word.

mod cascade;
mod config;
mod model;

pub use cascade::CascadingChunker;
pub use config::{ChunkerConfig, ChunkerConfigBuilder, estimate_tokens};
pub use model::{ChunkResult, TextChunk};

/// Splits text into chunks suitable for embedding and retrieval.
pub trait Chunker: Send + Sync {
    /// Splits `text` into chunks, along with the strategy used and its
    /// token-budget totals.
    fn chunk(&self, text: &str) -> ChunkResult;
}

impl Chunker for CascadingChunker {
    fn chunk(&self, text: &str) -> ChunkResult {
        Self::chunk(self, text)
    }
}
