use std::collections::HashMap;

use inkwell_core::ids::{CampaignId, ChunkId};
use inkwell_store::{ChunkStoreBackend, StoredChunk};

use crate::error::{RetrievalError, Result};
use crate::lexical::LexicalSearch;
use crate::model::{HybridResult, SearchFilters};
use crate::vector::VectorSearch;

/// The reciprocal-rank-fusion smoothing constant. Fixed per the fusion
/// algorithm; not exposed as a knob.
const RRF_K: f32 = 60.0;

/// Options for [`HybridSearch::search`].
#[derive(Debug, Clone)]
pub struct HybridSearchOptions {
    /// Maximum number of results to return.
    pub limit: usize,
    /// Weight given to the vector-search RRF contribution before
    /// renormalization.
    pub vector_weight: f32,
    /// Weight given to the lexical-search RRF contribution before
    /// renormalization.
    pub keyword_weight: f32,
    /// Filters applied to both subsearches.
    pub filters: SearchFilters,
}

impl Default for HybridSearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            vector_weight: 0.7,
            keyword_weight: 0.3,
            filters: SearchFilters::default(),
        }
    }
}

struct Entry {
    chunk: StoredChunk,
    vector_score: Option<f32>,
    keyword_score: Option<f32>,
}

fn rrf_contribution(rank: usize) -> f32 {
    1.0 / (RRF_K + rank as f32)
}

/// Fuses dense-vector and lexical search into one ranked list via
/// Reciprocal Rank Fusion.
pub struct HybridSearch<'a, S: ChunkStoreBackend> {
    store: &'a S,
}

impl<'a, S: ChunkStoreBackend> HybridSearch<'a, S> {
    /// Wraps `store` for hybrid search.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Runs vector and lexical search concurrently and fuses the results.
    ///
    /// `query` feeds lexical search, `vector` feeds vector search. If both
    /// subsearches fail the call fails; if exactly one fails or returns no
    /// rows, the surviving side's weight is rescaled to 1.
    pub async fn search(
        &self,
        campaign_id: CampaignId,
        query: &str,
        vector: &[f32],
        opts: &HybridSearchOptions,
    ) -> Result<Vec<HybridResult>> {
        if opts.vector_weight < 0.0 || opts.keyword_weight < 0.0 {
            return Err(RetrievalError::InvalidWeights);
        }
        if opts.vector_weight == 0.0 && opts.keyword_weight == 0.0 {
            return Err(RetrievalError::InvalidWeights);
        }

        let fetch_limit = opts.limit * 2;
        let vector_search = VectorSearch::new(self.store);
        let lexical_search = LexicalSearch::new(self.store);

        let (vector_res, lexical_res) = tokio::join!(
            vector_search.search(campaign_id, vector, fetch_limit, &opts.filters),
            lexical_search.search(campaign_id, query, fetch_limit, &opts.filters),
        );

        if let (Err(ve), Err(le)) = (&vector_res, &lexical_res) {
            return Err(RetrievalError::BothSearchesFailed {
                vector_error: ve.to_string(),
                lexical_error: le.to_string(),
            });
        }

        let vector_hits = vector_res.unwrap_or_default();
        let lexical_hits = lexical_res.unwrap_or_default();

        let vector_usable = !vector_hits.is_empty();
        let lexical_usable = !lexical_hits.is_empty();

        let (w_v, w_k) = if vector_usable && lexical_usable {
            let sum = opts.vector_weight + opts.keyword_weight;
            (opts.vector_weight / sum, opts.keyword_weight / sum)
        } else if vector_usable {
            (1.0, 0.0)
        } else if lexical_usable {
            (0.0, 1.0)
        } else {
            return Ok(Vec::new());
        };

        let mut merged: HashMap<ChunkId, Entry> = HashMap::new();

        for (idx, hit) in vector_hits.into_iter().enumerate() {
            merged.insert(
                hit.chunk.chunk_id,
                Entry {
                    chunk: hit.chunk,
                    vector_score: Some(rrf_contribution(idx + 1)),
                    keyword_score: None,
                },
            );
        }

        for (idx, hit) in lexical_hits.into_iter().enumerate() {
            let contribution = rrf_contribution(idx + 1);
            merged
                .entry(hit.chunk.chunk_id)
                .and_modify(|entry| entry.keyword_score = Some(contribution))
                .or_insert(Entry {
                    chunk: hit.chunk,
                    vector_score: None,
                    keyword_score: Some(contribution),
                });
        }

        let mut results: Vec<HybridResult> = merged
            .into_values()
            .map(|entry| {
                let score = w_v * entry.vector_score.unwrap_or(0.0)
                    + w_k * entry.keyword_score.unwrap_or(0.0);
                HybridResult {
                    chunk: entry.chunk,
                    score,
                    vector_score: entry.vector_score,
                    keyword_score: entry.keyword_score,
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.chunk_id.cmp(&b.chunk.chunk_id))
        });
        results.truncate(opts.limit);
        Ok(results)
    }
}
