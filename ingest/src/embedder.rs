use tokio_util::sync::CancellationToken;

/// The batch embedding capability the ingestion pipeline drives directly,
/// narrower than [`inkwell_core::EmbeddingModel`] (one text in, one vector
/// out) because the embed stage needs to batch many chunks per request and
/// honor cancellation mid-batch.
pub trait BatchEmbedder: Send + Sync {
    /// The dimension of vectors this embedder returns.
    fn dim(&self) -> usize;

    /// Embeds every text in `texts`, in order, racing `cancel` against each
    /// in-flight request.
    fn embed_batch(
        &self,
        texts: &[String],
        cancel: &CancellationToken,
    ) -> impl std::future::Future<Output = inkwell_core::Result<Vec<Vec<f32>>>> + Send;
}

impl BatchEmbedder for inkwell_embed::HttpEmbeddingClient {
    fn dim(&self) -> usize {
        inkwell_core::EmbeddingModel::dim(self)
    }

    async fn embed_batch(
        &self,
        texts: &[String],
        cancel: &CancellationToken,
    ) -> inkwell_core::Result<Vec<Vec<f32>>> {
        Self::embed_batch(self, texts, cancel)
            .await
            .map_err(inkwell_core::CoreError::from)
    }
}
