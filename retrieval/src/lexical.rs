use inkwell_core::ids::CampaignId;
use inkwell_store::ChunkStoreBackend;

use crate::error::Result;
use crate::model::{LexicalHit, SearchFilters};

/// Full-text keyword search, scoped to a campaign.
///
/// Query rewriting (AND-first, OR-fallback with stopword filtering) is the
/// chunk store's responsibility; this layer only applies document-level
/// filters and assigns 1-indexed ranks.
pub struct LexicalSearch<'a, S: ChunkStoreBackend> {
    store: &'a S,
}

impl<'a, S: ChunkStoreBackend> LexicalSearch<'a, S> {
    /// Wraps `store` for lexical search. `filters.language` is accepted for
    /// API symmetry with vector search but the in-memory reference backend
    /// is not language-aware.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Returns up to `limit` chunks matching `query` within `campaign_id`,
    /// highest-ranked first.
    pub async fn search(
        &self,
        campaign_id: CampaignId,
        query: &str,
        limit: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<LexicalHit>> {
        let over_fetch = if filters.document_ids.is_some() || filters.document_types.is_some() {
            (limit * 4).max(limit)
        } else {
            limit
        };
        let scored = self
            .store
            .search_lexical(campaign_id, query, over_fetch)
            .await?;
        let chunks = filters.retain(scored.into_iter().map(|s| s.chunk).collect());

        let mut hits: Vec<LexicalHit> = chunks
            .into_iter()
            .enumerate()
            .map(|(idx, chunk)| LexicalHit {
                chunk,
                rank: idx + 1,
            })
            .collect();
        hits.truncate(limit);
        Ok(hits)
    }
}
