use std::collections::HashMap;
use std::sync::Arc;

use inkwell_core::ids::{CampaignId, ChunkId, DocumentId};
use ordered_float::OrderedFloat;
use parking_lot::RwLock;

use crate::error::{Result, StoreError};
use crate::model::{ScoredChunk, StoredChunk};

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "were", "who", "will", "with",
];

#[derive(Default)]
struct State {
    chunks: HashMap<ChunkId, StoredChunk>,
    by_document: HashMap<DocumentId, Vec<ChunkId>>,
}

/// An in-memory [`crate::ChunkStoreBackend`], exact rather than approximate:
/// vector search is brute-force cosine similarity over every chunk in the
/// campaign, broken ties by chunk id so results are reproducible across
/// runs. Intended as the reference backend for tests and small campaigns,
/// not as a production store.
pub struct InMemoryChunkStore {
    dim: usize,
    state: Arc<RwLock<State>>,
}

impl InMemoryChunkStore {
    /// Creates an empty store configured for embeddings of length `dim`.
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            state: Arc::new(RwLock::new(State::default())),
        }
    }
}

impl Clone for InMemoryChunkStore {
    fn clone(&self) -> Self {
        Self {
            dim: self.dim,
            state: Arc::clone(&self.state),
        }
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Splits and lowercases `text` into tokens without discarding anything,
/// the full-text tokenization used to build the AND-first query.
fn tokenize_raw(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Discards short tokens (length <= 2) and stop-words, the filter chain used
/// for the OR-fallback query.
fn filter_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .filter(|t| t.len() > 2 && !STOPWORDS.contains(&t.as_str()))
        .cloned()
        .collect()
}

impl crate::ChunkStoreBackend for InMemoryChunkStore {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn insert_document(&self, document_id: DocumentId, chunks: Vec<StoredChunk>) -> Result<()> {
        for chunk in &chunks {
            if chunk.embedding.len() != self.dim {
                return Err(StoreError::DimensionMismatch {
                    expected: self.dim,
                    actual: chunk.embedding.len(),
                });
            }
        }
        let mut state = self.state.write();
        if let Some(old) = state.by_document.remove(&document_id) {
            for chunk_id in old {
                state.chunks.remove(&chunk_id);
            }
        }
        let ids = chunks.iter().map(|c| c.chunk_id).collect();
        for chunk in chunks {
            state.chunks.insert(chunk.chunk_id, chunk);
        }
        state.by_document.insert(document_id, ids);
        Ok(())
    }

    async fn delete_document(&self, document_id: DocumentId) -> Result<()> {
        let mut state = self.state.write();
        if let Some(ids) = state.by_document.remove(&document_id) {
            for chunk_id in ids {
                state.chunks.remove(&chunk_id);
            }
        }
        Ok(())
    }

    async fn is_ready(&self, document_id: DocumentId) -> Result<bool> {
        let state = self.state.read();
        Ok(state
            .by_document
            .get(&document_id)
            .is_some_and(|ids| !ids.is_empty()))
    }

    async fn get_chunk(&self, chunk_id: ChunkId) -> Result<StoredChunk> {
        self.state
            .read()
            .chunks
            .get(&chunk_id)
            .cloned()
            .ok_or(StoreError::ChunkNotFound(chunk_id))
    }

    async fn search_vector(
        &self,
        campaign_id: CampaignId,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if query.len() != self.dim {
            return Err(StoreError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        let state = self.state.read();
        let mut scored: Vec<ScoredChunk> = state
            .chunks
            .values()
            .filter(|chunk| chunk.campaign_id == campaign_id)
            .map(|chunk| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine(query, &chunk.embedding),
            })
            .collect();
        scored.sort_by(|a, b| {
            OrderedFloat(b.score)
                .cmp(&OrderedFloat(a.score))
                .then_with(|| a.chunk.chunk_id.cmp(&b.chunk.chunk_id))
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn search_lexical(
        &self,
        campaign_id: CampaignId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        // AND-first is built from the full user text, unfiltered.
        let raw_terms = tokenize_raw(query);
        if raw_terms.is_empty() {
            return Ok(Vec::new());
        }
        let state = self.state.read();
        let candidates: Vec<&StoredChunk> = state
            .chunks
            .values()
            .filter(|chunk| chunk.campaign_id == campaign_id)
            .collect();

        let score_against = |chunk: &StoredChunk, terms: &[String]| -> usize {
            let doc_terms = tokenize_raw(&chunk.text);
            terms
                .iter()
                .map(|term| doc_terms.iter().filter(|t| *t == term).count())
                .sum()
        };

        // AND-first: every term must appear at least once.
        let and_matches: Vec<ScoredChunk> = candidates
            .iter()
            .filter_map(|chunk| {
                let doc_terms = tokenize_raw(&chunk.text);
                let all_present = raw_terms.iter().all(|term| doc_terms.contains(term));
                if !all_present {
                    return None;
                }
                Some(ScoredChunk {
                    chunk: (*chunk).clone(),
                    score: score_against(chunk, &raw_terms) as f32,
                })
            })
            .collect();

        // OR-fallback strips stop-words and tokens of length <= 2; if that
        // leaves nothing (e.g. the query is all stop-words), fall back to
        // the raw, unfiltered query terms instead.
        let filtered_terms = filter_terms(&raw_terms);
        let or_terms = if filtered_terms.is_empty() {
            &raw_terms
        } else {
            &filtered_terms
        };

        // OR-fallback: fewer than 3 AND-matches, so also try matching any term
        // and keep whichever variant returned more rows. AND wins ties.
        let mut scored = if and_matches.len() >= 3 {
            and_matches
        } else {
            let or_matches: Vec<ScoredChunk> = candidates
                .iter()
                .filter_map(|chunk| {
                    let score = score_against(chunk, or_terms) as f32;
                    if score > 0.0 {
                        Some(ScoredChunk {
                            chunk: (*chunk).clone(),
                            score,
                        })
                    } else {
                        None
                    }
                })
                .collect();
            if or_matches.len() > and_matches.len() {
                or_matches
            } else {
                and_matches
            }
        };

        scored.sort_by(|a, b| {
            OrderedFloat(b.score)
                .cmp(&OrderedFloat(a.score))
                .then_with(|| a.chunk.chunk_id.cmp(&b.chunk.chunk_id))
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn fetch_neighbors(&self, chunk_id: ChunkId, window: usize) -> Result<Vec<StoredChunk>> {
        let state = self.state.read();
        let anchor = state
            .chunks
            .get(&chunk_id)
            .ok_or(StoreError::ChunkNotFound(chunk_id))?;
        let siblings = state
            .by_document
            .get(&anchor.document_id)
            .ok_or(StoreError::DocumentNotFound(anchor.document_id))?;

        let anchor_index = anchor.chunk_index;
        let mut neighbors: Vec<StoredChunk> = siblings
            .iter()
            .filter_map(|id| state.chunks.get(id))
            .filter(|chunk| {
                chunk.chunk_index != anchor_index
                    && chunk.chunk_index.abs_diff(anchor_index) <= window
            })
            .cloned()
            .collect();
        neighbors.sort_by_key(|chunk| chunk.chunk_index);
        Ok(neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChunkStoreBackend;
    use inkwell_core::types::Metadata;

    fn chunk(
        campaign_id: CampaignId,
        document_id: DocumentId,
        chunk_index: usize,
        text: &str,
        embedding: Vec<f32>,
    ) -> StoredChunk {
        StoredChunk {
            chunk_id: ChunkId::new(),
            document_id,
            campaign_id,
            chunk_index,
            text: text.to_string(),
            token_count: text.len().div_ceil(4),
            embedding,
            page: None,
            section: None,
            start_offset: 0,
            end_offset: text.len(),
            content_hash: crate::model::content_hash(text),
            metadata: Metadata::new(),
        }
    }

    #[tokio::test]
    async fn insert_then_search_vector_ranks_by_cosine_similarity() {
        let store = InMemoryChunkStore::new(2);
        let campaign = CampaignId::new();
        let document = DocumentId::new();
        let near = chunk(campaign, document, 0, "alpha", vec![1.0, 0.0]);
        let far = chunk(campaign, document, 1, "beta", vec![0.0, 1.0]);
        store
            .insert_document(document, vec![near.clone(), far.clone()])
            .await
            .unwrap();

        let results = store.search_vector(campaign, &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results[0].chunk.chunk_id, near.chunk_id);
        assert_eq!(results[1].chunk.chunk_id, far.chunk_id);
    }

    #[tokio::test]
    async fn search_vector_rejects_wrong_dimension() {
        let store = InMemoryChunkStore::new(3);
        let err = store
            .search_vector(CampaignId::new(), &[1.0, 0.0], 10)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DimensionMismatch { expected: 3, actual: 2 }));
    }

    #[tokio::test]
    async fn lexical_search_prefers_documents_matching_every_term() {
        let store = InMemoryChunkStore::new(1);
        let campaign = CampaignId::new();
        let document = DocumentId::new();
        let both = chunk(campaign, document, 0, "goblin ambush in the forest", vec![0.0]);
        let one = chunk(campaign, document, 1, "goblin market prices", vec![0.0]);
        store
            .insert_document(document, vec![both.clone(), one.clone()])
            .await
            .unwrap();

        let results = store
            .search_lexical(campaign, "goblin ambush", 10)
            .await
            .unwrap();
        assert_eq!(results[0].chunk.chunk_id, both.chunk_id);
    }

    #[tokio::test]
    async fn lexical_search_falls_back_to_any_term_when_no_document_has_all() {
        let store = InMemoryChunkStore::new(1);
        let campaign = CampaignId::new();
        let document = DocumentId::new();
        let has_goblin = chunk(campaign, document, 0, "a goblin camp", vec![0.0]);
        store
            .insert_document(document, vec![has_goblin.clone()])
            .await
            .unwrap();

        let results = store
            .search_lexical(campaign, "goblin dragon", 10)
            .await
            .unwrap();
        assert_eq!(results[0].chunk.chunk_id, has_goblin.chunk_id);
    }

    #[tokio::test]
    async fn lexical_search_and_first_uses_full_unfiltered_query_text() {
        let store = InMemoryChunkStore::new(1);
        let campaign = CampaignId::new();
        let document = DocumentId::new();
        let both_a = chunk(campaign, document, 0, "who saw the goblin ambush", vec![0.0]);
        let both_b = chunk(campaign, document, 1, "the ambush who struck first", vec![0.0]);
        let both_c = chunk(campaign, document, 2, "who planned this ambush", vec![0.0]);
        let ambush_only_a = chunk(campaign, document, 3, "a goblin ambush at dawn", vec![0.0]);
        let ambush_only_b = chunk(campaign, document, 4, "another ambush near camp", vec![0.0]);
        store
            .insert_document(
                document,
                vec![
                    both_a.clone(),
                    both_b.clone(),
                    both_c.clone(),
                    ambush_only_a.clone(),
                    ambush_only_b.clone(),
                ],
            )
            .await
            .unwrap();

        // "who" is a stop-word, but AND-first is built from the full query
        // text, so only chunks containing both literal words qualify.
        let results = store.search_lexical(campaign, "ambush who", 10).await.unwrap();
        let ids: std::collections::HashSet<_> = results.iter().map(|r| r.chunk.chunk_id).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&both_a.chunk_id));
        assert!(ids.contains(&both_b.chunk_id));
        assert!(ids.contains(&both_c.chunk_id));
    }

    #[tokio::test]
    async fn lexical_search_or_fallback_ignores_stopwords_and_short_tokens() {
        let store = InMemoryChunkStore::new(1);
        let campaign = CampaignId::new();
        let document = DocumentId::new();
        let has_dragon = chunk(campaign, document, 0, "a dragon sleeps in the cave", vec![0.0]);
        let no_dragon = chunk(campaign, document, 1, "is it near the village", vec![0.0]);
        store
            .insert_document(document, vec![has_dragon.clone(), no_dragon.clone()])
            .await
            .unwrap();

        // "is" is both a stop-word and <= 2 chars; only "dragon" should
        // survive into the OR-fallback query.
        let results = store.search_lexical(campaign, "dragon is", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.chunk_id, has_dragon.chunk_id);
    }

    #[tokio::test]
    async fn lexical_search_or_fallback_uses_raw_query_when_all_terms_are_stopwords() {
        let store = InMemoryChunkStore::new(1);
        let campaign = CampaignId::new();
        let document = DocumentId::new();
        let has_who = chunk(campaign, document, 0, "who goes there in the dark", vec![0.0]);
        store.insert_document(document, vec![has_who.clone()]).await.unwrap();

        let results = store.search_lexical(campaign, "who is", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.chunk_id, has_who.chunk_id);
    }

    #[tokio::test]
    async fn fetch_neighbors_returns_window_around_anchor_in_order() {
        let store = InMemoryChunkStore::new(1);
        let campaign = CampaignId::new();
        let document = DocumentId::new();
        let chunks: Vec<StoredChunk> = (0..5)
            .map(|i| chunk(campaign, document, i, "x", vec![0.0]))
            .collect();
        let anchor_id = chunks[2].chunk_id;
        store.insert_document(document, chunks).await.unwrap();

        let neighbors = store.fetch_neighbors(anchor_id, 1).await.unwrap();
        let indices: Vec<usize> = neighbors.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[tokio::test]
    async fn insert_document_replaces_previous_chunks_atomically() {
        let store = InMemoryChunkStore::new(1);
        let campaign = CampaignId::new();
        let document = DocumentId::new();
        let first = chunk(campaign, document, 0, "first version", vec![0.0]);
        store
            .insert_document(document, vec![first.clone()])
            .await
            .unwrap();

        let second = chunk(campaign, document, 0, "second version", vec![0.0]);
        store
            .insert_document(document, vec![second.clone()])
            .await
            .unwrap();

        assert!(store.get_chunk(first.chunk_id).await.is_err());
        assert!(store.get_chunk(second.chunk_id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_document_is_idempotent() {
        let store = InMemoryChunkStore::new(1);
        let document = DocumentId::new();
        store.delete_document(document).await.unwrap();
        store.delete_document(document).await.unwrap();
    }

    #[tokio::test]
    async fn is_ready_reflects_presence_of_chunks() {
        let store = InMemoryChunkStore::new(1);
        let campaign = CampaignId::new();
        let document = DocumentId::new();
        assert!(!store.is_ready(document).await.unwrap());
        store
            .insert_document(document, vec![chunk(campaign, document, 0, "x", vec![0.0])])
            .await
            .unwrap();
        assert!(store.is_ready(document).await.unwrap());
    }
}
