//! # inkwell
//!
//! Façade crate for the campaign knowledge service: ingest tabletop-RPG
//! source material (rulebooks, adventure modules, homebrew notes) into a
//! per-campaign knowledge base, then answer questions against it with a
//! hybrid dense-vector + lexical retrieval engine.
//!
//! Everything here is built from capability traits defined in
//! [`inkwell_core`] — `BlobStore`, `ChunkStoreBackend`, `JobQueue`,
//! `EmbeddingModel`, `ChatModel` — so a caller can swap any collaborator
//! (a real object store, a real vector database, a real queue) without
//! touching the ingestion pipeline or the retrieval engine.
//!
//! ## What's inside?
//!
//! - [`core`] — identifiers, the shared error taxonomy, and the capability
//!   traits every other module implements against.
//! - [`storage`] — content-addressed blob storage for raw uploads.
//! - [`extract`] — per-MIME text extraction (plain text, Markdown, PDF,
//!   DOCX).
//! - [`chunk`] — cascading paragraph/sentence/whitespace chunking.
//! - [`embed`] — an HTTP embedding client with batching, retry, and
//!   cancellation.
//! - [`store`] — the chunk store: dense vector search, lexical search,
//!   neighbor-chunk fetch.
//! - [`retrieval`] — hybrid retrieval fusing dense and lexical results with
//!   Reciprocal Rank Fusion.
//! - [`queue`] — a durable, retryable, priority-aware job queue.
//! - [`worker`] — a concurrency-bounded pool that drains a job queue.
//! - [`ingest`] — the document ingestion pipeline: validate, extract,
//!   chunk, embed, store, finalize.
//!
//! Each module is behind its own feature flag; `ingest` and `retrieval` are
//! enabled by default since together they cover the whole service. Enable
//! `full` to pull in every module.

pub use inkwell_core as core;

#[cfg(feature = "storage")]
pub use inkwell_storage as storage;

#[cfg(feature = "extract")]
pub use inkwell_extract as extract;

#[cfg(feature = "chunk")]
pub use inkwell_chunk as chunk;

#[cfg(feature = "embed")]
pub use inkwell_embed as embed;

#[cfg(feature = "store")]
pub use inkwell_store as store;

#[cfg(feature = "retrieval")]
pub use inkwell_retrieval as retrieval;

#[cfg(feature = "queue")]
pub use inkwell_queue as queue;

#[cfg(feature = "worker")]
pub use inkwell_worker as worker;

#[cfg(feature = "ingest")]
pub use inkwell_ingest as ingest;

#[cfg(all(test, feature = "ingest", feature = "retrieval"))]
mod tests {
    use std::time::Duration;

    use inkwell_core::ids::{CampaignId, DocumentId};
    use inkwell_ingest::{
        BatchEmbedder, DocumentRepository, IndexDocumentPayload, IngestionPipeline, InMemoryDocumentRepository,
    };
    use inkwell_queue::{EnqueueOptions, InMemoryJobQueue, JobQueue};
    use inkwell_retrieval::{HybridSearch, HybridSearchOptions};
    use inkwell_storage::{BlobStore, FsBlobStore, blob_key};
    use inkwell_store::InMemoryChunkStore;
    use inkwell_worker::WorkerPoolBuilder;
    use tokio_util::sync::CancellationToken;

    const DIM: usize = 3;

    /// Embeds every chunk to the same vector, so a query with that same
    /// vector is guaranteed a perfect vector-search match regardless of the
    /// chunk's actual text.
    struct FixedEmbedder(Vec<f32>);

    impl BatchEmbedder for FixedEmbedder {
        fn dim(&self) -> usize {
            DIM
        }

        async fn embed_batch(
            &self,
            texts: &[String],
            _cancel: &CancellationToken,
        ) -> inkwell_core::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.0.clone()).collect())
        }
    }

    #[tokio::test]
    async fn ingesting_a_document_makes_it_findable_by_hybrid_search() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blob_store = FsBlobStore::new(dir.path());
        let repository = InMemoryDocumentRepository::new();
        let chunk_store = InMemoryChunkStore::new(DIM);

        let document_id = DocumentId::new();
        let campaign_id = CampaignId::new();
        let key = blob_key(campaign_id, document_id);
        blob_store
            .put(&key, b"The ancient lighthouse keeper guards the sunken ruins.")
            .await
            .unwrap();
        repository.seed_pending(document_id, campaign_id);

        let query_vector = vec![0.3, 0.6, 0.1];
        let pipeline = IngestionPipeline::new(
            blob_store,
            repository.clone(),
            chunk_store.clone(),
            FixedEmbedder(query_vector.clone()),
        );

        let queue = InMemoryJobQueue::<IndexDocumentPayload>::default();
        queue
            .enqueue(
                "index-document",
                IndexDocumentPayload {
                    document_id: document_id.to_string(),
                    campaign_id: campaign_id.to_string(),
                    storage_key: key,
                    mime_type: "text/plain".to_string(),
                },
                EnqueueOptions::default(),
            )
            .await
            .unwrap();

        let pool = WorkerPoolBuilder::new(queue, pipeline).build();
        pool.run();
        tokio::time::sleep(Duration::from_millis(300)).await;
        pool.shutdown(Duration::from_secs(1)).await.unwrap();

        let record = repository.get(document_id).await.unwrap();
        assert_eq!(record.chunk_count, Some(1));

        let search = HybridSearch::new(&chunk_store);
        let results = search
            .search(campaign_id, "lighthouse keeper", &query_vector, &HybridSearchOptions::default())
            .await
            .unwrap();
        assert!(!results.is_empty());
        assert!(results[0].chunk.text.contains("lighthouse"));
    }
}
