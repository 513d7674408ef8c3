//! Document ingestion pipeline: the asynchronous validate → extract → chunk
//! → embed → store → finalize flow run for every uploaded document.
//!
//! [`repository::DocumentRepository`] tracks a document's lifecycle state
//! (`pending | processing | ready | failed`), [`embedder::BatchEmbedder`] is
//! the narrow embedding capability the pipeline drives directly, and
//! [`pipeline::IngestionPipeline`] is the [`inkwell_worker::Handler`] that
//! ties them together with [`inkwell_storage::BlobStore`],
//! [`inkwell_store::ChunkStoreBackend`], [`inkwell_extract::Dispatcher`], and
//! [`inkwell_chunk::CascadingChunker`].

mod embedder;
mod payload;
mod pipeline;
mod repository;

pub use embedder::BatchEmbedder;
pub use payload::IndexDocumentPayload;
pub use pipeline::IngestionPipeline;
pub use repository::{DocumentRecord, DocumentRepository, DocumentStatus, InMemoryDocumentRepository, RepositoryError};
