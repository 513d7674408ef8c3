use inkwell_core::ids::CampaignId;
use inkwell_store::ChunkStoreBackend;

use crate::error::Result;
use crate::model::{SearchFilters, VectorHit};

/// Nearest-neighbor dense-vector search, scoped to a campaign.
///
/// Wraps a [`ChunkStoreBackend`], over-fetching when filters are present
/// since the backend applies no document-level filtering of its own.
pub struct VectorSearch<'a, S: ChunkStoreBackend> {
    store: &'a S,
}

impl<'a, S: ChunkStoreBackend> VectorSearch<'a, S> {
    /// Wraps `store` for vector search.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Returns up to `limit` chunks nearest to `query` within `campaign_id`,
    /// most similar first.
    pub async fn search(
        &self,
        campaign_id: CampaignId,
        query: &[f32],
        limit: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<VectorHit>> {
        let over_fetch = if filters.document_ids.is_some() || filters.document_types.is_some() {
            (limit * 4).max(limit)
        } else {
            limit
        };
        let scored = self.store.search_vector(campaign_id, query, over_fetch).await?;
        let chunks = filters.retain(scored.iter().map(|s| s.chunk.clone()).collect());
        let scores: std::collections::HashMap<_, _> =
            scored.into_iter().map(|s| (s.chunk.chunk_id, s.score)).collect();

        let mut hits: Vec<VectorHit> = chunks
            .into_iter()
            .map(|chunk| {
                let raw = scores.get(&chunk.chunk_id).copied().unwrap_or(0.0);
                VectorHit {
                    chunk,
                    score: raw.clamp(0.0, 1.0),
                }
            })
            .collect();
        hits.truncate(limit);
        Ok(hits)
    }
}
