//! Chunk store capability trait and in-memory reference backend.
//!
//! [`ChunkStoreBackend`] stands in for "a relational store with a
//! vector-index extension and full-text search" — the external collaborator
//! named only by its operations in the component design. This crate ships
//! [`InMemoryChunkStore`] as the reference implementation, playing the same
//! role the workspace's previous `HnswIndex` played for `VectorIndex`,
//! generalized to also answer keyword queries.

mod error;
mod memory;
mod model;

pub use error::{Result, StoreError};
pub use memory::InMemoryChunkStore;
pub use model::{ScoredChunk, StoredChunk, content_hash};

use inkwell_core::ids::{CampaignId, ChunkId, DocumentId};

/// The capability trait a chunk-store backend must implement.
///
/// Every method that touches storage is async so a real backend can be a
/// networked database; [`InMemoryChunkStore`] simply never awaits.
pub trait ChunkStoreBackend: Send + Sync {
    /// The embedding dimension this store was configured for. Every
    /// embedding passed to [`insert_document`](Self::insert_document) or
    /// [`search_vector`](Self::search_vector) must have this length.
    fn dim(&self) -> usize;

    /// Atomically replaces all chunks for `document_id` with `chunks`.
    ///
    /// A document's chunks become visible to search all at once: readers
    /// never see a partial set.
    fn insert_document(
        &self,
        document_id: DocumentId,
        chunks: Vec<StoredChunk>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Removes every chunk belonging to `document_id`. Idempotent.
    fn delete_document(
        &self,
        document_id: DocumentId,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Whether `document_id` has at least one stored chunk.
    fn is_ready(
        &self,
        document_id: DocumentId,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Fetches a single chunk by id.
    fn get_chunk(
        &self,
        chunk_id: ChunkId,
    ) -> impl std::future::Future<Output = Result<StoredChunk>> + Send;

    /// Dense vector search within `campaign_id`, returning the `limit`
    /// highest-scoring chunks.
    ///
    /// Must be deterministic: two calls with the same query vector and
    /// store state return identically ordered results. `query` must have
    /// length [`dim`](Self::dim).
    fn search_vector(
        &self,
        campaign_id: CampaignId,
        query: &[f32],
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ScoredChunk>>> + Send;

    /// Lexical (keyword) search within `campaign_id`.
    fn search_lexical(
        &self,
        campaign_id: CampaignId,
        query: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ScoredChunk>>> + Send;

    /// Fetches up to `window` chunks before and after `chunk_id` within its
    /// document, in chunk-index order, for neighbor expansion.
    fn fetch_neighbors(
        &self,
        chunk_id: ChunkId,
        window: usize,
    ) -> impl std::future::Future<Output = Result<Vec<StoredChunk>>> + Send;
}
