use std::str::FromStr;

use inkwell_chunk::{CascadingChunker, ChunkerConfig, TextChunk};
use inkwell_core::ids::{CampaignId, ChunkId, DocumentId};
use inkwell_core::types::{Metadata, SupportedMime};
use inkwell_core::{CoreError, ErrorKind};
use inkwell_extract::{Dispatcher, ExtractedDocument};
use inkwell_queue::Progress;
use inkwell_storage::BlobStore;
use inkwell_store::{ChunkStoreBackend, StoredChunk, content_hash};
use inkwell_worker::{Handler, JobContext};

use crate::embedder::BatchEmbedder;
use crate::payload::IndexDocumentPayload;
use crate::repository::DocumentRepository;

/// How many chunk texts are embedded per batch for progress-reporting
/// purposes. Independent of whatever batching the embedder itself does
/// internally against its HTTP endpoint.
const EMBED_BATCH_SIZE: usize = 20;

struct PageChunk {
    chunk: TextChunk,
    page: Option<usize>,
}

/// The `index-document` [`Handler`]: validate, extract, chunk, embed,
/// persist, finalize — the C8 "Ingestion Pipeline" component driving C1–C5
/// for a single document.
pub struct IngestionPipeline<B, R, S, E> {
    blob_store: B,
    repository: R,
    chunk_store: S,
    embedder: E,
    dispatcher: Dispatcher,
    chunker: CascadingChunker,
}

impl<B, R, S, E> IngestionPipeline<B, R, S, E>
where
    B: BlobStore,
    R: DocumentRepository,
    S: ChunkStoreBackend,
    E: BatchEmbedder,
{
    /// Builds a pipeline from its collaborators, using the default chunker
    /// budgets.
    pub fn new(blob_store: B, repository: R, chunk_store: S, embedder: E) -> Self {
        Self {
            blob_store,
            repository,
            chunk_store,
            embedder,
            dispatcher: Dispatcher,
            chunker: CascadingChunker::default(),
        }
    }

    /// Overrides the default chunker target/overlap/max token budgets.
    #[must_use]
    pub fn with_chunker_config(mut self, config: ChunkerConfig) -> Self {
        self.chunker = CascadingChunker::new(config);
        self
    }

    async fn report(&self, ctx: &JobContext, percent: u8, message: &str) {
        ctx.report_progress(Progress::new(percent, message)).await;
    }

    async fn fail(&self, document_id: DocumentId, err: &CoreError) {
        if let Err(repo_err) = self.repository.mark_failed(document_id, err.to_string()).await {
            tracing::warn!(?document_id, error = %repo_err, "failed to persist document failure state");
        }
    }

    async fn cleanup(&self, document_id: DocumentId) {
        if let Err(err) = self.chunk_store.delete_document(document_id).await {
            tracing::warn!(?document_id, error = %err, "cleanup failed to delete document chunks");
        }
    }

    async fn start_processing(&self, document_id: DocumentId) -> inkwell_core::Result<()> {
        self.repository.mark_processing(document_id).await?;
        // Idempotence: a retry of the same documentId never accumulates
        // duplicate chunks.
        self.chunk_store.delete_document(document_id).await?;
        Ok(())
    }

    fn chunk_pages(&self, extracted: &ExtractedDocument, mime: SupportedMime) -> Vec<PageChunk> {
        let paginated = matches!(mime, SupportedMime::ApplicationPdf);
        let mut out = Vec::new();
        let mut next_index = 0usize;
        for page in &extracted.pages {
            if !page.has_extracted_text {
                continue;
            }
            for mut chunk in self.chunker.chunk(&page.text).chunks {
                chunk.chunk_index = next_index;
                next_index += 1;
                out.push(PageChunk {
                    page: paginated.then_some(page.index),
                    chunk,
                });
            }
        }
        out
    }

    async fn embed_chunks(
        &self,
        chunks: &[PageChunk],
        ctx: &JobContext,
    ) -> inkwell_core::Result<Vec<Vec<f32>>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }
        let texts: Vec<String> = chunks.iter().map(|c| c.chunk.text.clone()).collect();
        let total = texts.len();
        let mut embeddings = Vec::with_capacity(total);

        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            check_cancelled(ctx)?;
            let vectors = self.embedder.embed_batch(batch, ctx.cancellation()).await?;
            embeddings.extend(vectors);
            let done = embeddings.len();
            let pct = 45 + (done * 40 / total).min(40);
            self.report(ctx, u8::try_from(pct).unwrap_or(85), "embedding").await;
        }
        Ok(embeddings)
    }

    fn build_stored_chunks(
        &self,
        document_id: DocumentId,
        campaign_id: CampaignId,
        chunks: Vec<PageChunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Vec<StoredChunk> {
        chunks
            .into_iter()
            .zip(embeddings)
            .map(|(page_chunk, embedding)| StoredChunk {
                chunk_id: ChunkId::new(),
                document_id,
                campaign_id,
                chunk_index: page_chunk.chunk.chunk_index,
                content_hash: content_hash(&page_chunk.chunk.text),
                text: page_chunk.chunk.text,
                token_count: page_chunk.chunk.token_count,
                embedding,
                page: page_chunk.page,
                section: page_chunk.chunk.section,
                start_offset: page_chunk.chunk.start_offset,
                end_offset: page_chunk.chunk.end_offset,
                metadata: Metadata::new(),
            })
            .collect()
    }

    #[allow(clippy::too_many_lines)]
    async fn run_pipeline(
        &self,
        document_id: DocumentId,
        campaign_id: CampaignId,
        mime: SupportedMime,
        storage_key: &str,
        ctx: &JobContext,
    ) -> inkwell_core::Result<()> {
        check_cancelled(ctx)?;
        self.report(ctx, 10, "extracting").await;
        let bytes = self.blob_store.get(storage_key).await?;
        let extracted = self.dispatcher.extract(mime, &bytes)?;
        self.report(ctx, 30, "extracted").await;

        check_cancelled(ctx)?;
        self.report(ctx, 30, "chunking").await;
        let chunks = self.chunk_pages(&extracted, mime);
        self.report(ctx, 45, "chunked").await;

        check_cancelled(ctx)?;
        let embeddings = self.embed_chunks(&chunks, ctx).await?;

        check_cancelled(ctx)?;
        self.report(ctx, 85, "storing").await;
        let chunk_count = chunks.len();
        let stored = self.build_stored_chunks(document_id, campaign_id, chunks, embeddings);
        self.chunk_store.insert_document(document_id, stored).await?;
        self.report(ctx, 95, "stored").await;

        check_cancelled(ctx)?;
        self.repository.finalize(document_id, chunk_count).await?;
        self.report(ctx, 100, "finalized").await;
        Ok(())
    }
}

fn check_cancelled(ctx: &JobContext) -> inkwell_core::Result<()> {
    if ctx.is_cancelled() {
        return Err(CoreError::new(ErrorKind::Cancelled, "cancelled at stage boundary"));
    }
    Ok(())
}

fn parse_id<T: FromStr>(raw: &str, field: &str) -> inkwell_core::Result<T> {
    raw.parse()
        .map_err(|_| CoreError::new(ErrorKind::ValidationError, format!("invalid {field}: {raw}")))
}

impl<B, R, S, E> Handler<IndexDocumentPayload> for IngestionPipeline<B, R, S, E>
where
    B: BlobStore + 'static,
    R: DocumentRepository + 'static,
    S: ChunkStoreBackend + 'static,
    E: BatchEmbedder + 'static,
{
    async fn handle(&self, payload: IndexDocumentPayload, ctx: JobContext) -> inkwell_core::Result<()> {
        let document_id = parse_id::<DocumentId>(&payload.document_id, "documentId")?;
        let campaign_id = parse_id::<CampaignId>(&payload.campaign_id, "campaignId")?;

        self.report(&ctx, 5, "validating").await;
        self.repository.get(document_id).await?;

        let validated = SupportedMime::parse(&payload.mime_type)
            .and_then(|mime| {
                if ctx.is_cancelled() {
                    Err(CoreError::new(ErrorKind::Cancelled, "cancelled before mark-processing"))
                } else {
                    Ok(mime)
                }
            });
        let mime = match validated {
            Ok(mime) => mime,
            Err(err) => {
                self.fail(document_id, &err).await;
                return Err(err);
            }
        };

        self.report(&ctx, 8, "marking processing").await;
        if let Err(err) = self.start_processing(document_id).await {
            self.fail(document_id, &err).await;
            return Err(err);
        }

        let result = self
            .run_pipeline(document_id, campaign_id, mime, &payload.storage_key, &ctx)
            .await;
        if let Err(err) = &result {
            self.fail(document_id, err).await;
            self.cleanup(document_id).await;
        }
        result
    }
}
