use inkwell_core::ids::{CampaignId, ChunkId, DocumentId};
use inkwell_core::types::Metadata;

/// A chunk as stored by a [`crate::ChunkStoreBackend`], including its
/// embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredChunk {
    /// This chunk's identifier.
    pub chunk_id: ChunkId,
    /// The document this chunk was produced from.
    pub document_id: DocumentId,
    /// The owning campaign.
    pub campaign_id: CampaignId,
    /// 0-based position of this chunk within its document.
    pub chunk_index: usize,
    /// The chunk's text.
    pub text: String,
    /// Estimated token count.
    pub token_count: usize,
    /// The chunk's dense embedding vector.
    pub embedding: Vec<f32>,
    /// Source page, for paginated formats (PDF).
    pub page: Option<usize>,
    /// Nearest preceding heading, if any.
    pub section: Option<String>,
    /// Byte offset of this chunk's text within its page/document text.
    pub start_offset: usize,
    /// Byte offset one past the end of this chunk's text.
    pub end_offset: usize,
    /// Content hash used for duplicate detection.
    pub content_hash: u64,
    /// Free-form metadata carried from the source document.
    pub metadata: Metadata,
}

/// A [`StoredChunk`] with a relevance score from a search call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// The matched chunk.
    pub chunk: StoredChunk,
    /// Higher is more relevant. Scale is search-method specific: cosine
    /// similarity for vector search, term-overlap score for lexical search,
    /// RRF score for hybrid search (computed in `inkwell-retrieval`).
    pub score: f32,
}

/// Computes a content hash for duplicate detection, grounded on the
/// workspace's existing `xxh3`-based `content_hash`.
#[must_use]
pub fn content_hash(text: &str) -> u64 {
    xxhash_rust::xxh3::xxh3_64(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_content_same_hash() {
        assert_eq!(content_hash("hello"), content_hash("hello"));
    }

    #[test]
    fn different_content_different_hash() {
        assert_ne!(content_hash("hello"), content_hash("world"));
    }
}
