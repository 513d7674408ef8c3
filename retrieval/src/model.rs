use inkwell_core::ids::DocumentId;
use inkwell_core::types::DocumentClass;
use inkwell_store::StoredChunk;

/// Filters shared by vector, lexical, and hybrid search.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Restrict results to these documents, if given.
    pub document_ids: Option<Vec<DocumentId>>,
    /// Restrict results to documents of these classes, if given. Matched
    /// against the `document_class` metadata key a chunk's source document
    /// was tagged with.
    pub document_types: Option<Vec<DocumentClass>>,
    /// Full-text search language configuration. Only consulted by lexical
    /// search; ignored by vector search.
    pub language: Option<String>,
}

impl SearchFilters {
    fn matches(&self, chunk: &StoredChunk) -> bool {
        if let Some(ids) = &self.document_ids {
            if !ids.contains(&chunk.document_id) {
                return false;
            }
        }
        if let Some(types) = &self.document_types {
            let class = chunk.metadata.get("document_class").map(String::as_str);
            let matches_any = types
                .iter()
                .any(|t| Some(t.to_string().as_str()) == class);
            if !matches_any {
                return false;
            }
        }
        true
    }

    pub(crate) fn retain(&self, chunks: Vec<StoredChunk>) -> Vec<StoredChunk> {
        chunks.into_iter().filter(|c| self.matches(c)).collect()
    }
}

/// One dense-vector search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    /// The matched chunk.
    pub chunk: StoredChunk,
    /// Cosine similarity clipped to `[0, 1]`.
    pub score: f32,
}

/// One lexical search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalHit {
    /// The matched chunk.
    pub chunk: StoredChunk,
    /// 1-indexed position in the lexical ranking.
    pub rank: usize,
}

/// One hybrid search result: a chunk with its fused relevance score and the
/// per-source contributions that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridResult {
    /// The matched chunk. Neighbor expansion mutates its `text`.
    pub chunk: StoredChunk,
    /// The fused relevance score, descending order.
    pub score: f32,
    /// This chunk's RRF contribution from vector search, or `None` if it was
    /// only found by lexical search.
    pub vector_score: Option<f32>,
    /// This chunk's RRF contribution from lexical search, or `None` if it
    /// was only found by vector search.
    pub keyword_score: Option<f32>,
}
