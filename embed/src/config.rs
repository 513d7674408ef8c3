use std::time::Duration;

/// Tunables for [`crate::HttpEmbeddingClient`], following the workspace's
/// `RagConfig`/`RagConfigBuilder` convention.
#[derive(Debug, Clone)]
pub struct EmbeddingClientConfig {
    base_url: String,
    model: String,
    dim: usize,
    batch_size: usize,
    request_timeout: Duration,
    max_retries: u32,
}

impl EmbeddingClientConfig {
    /// Starts building a config for `base_url`/`model` producing `dim`-length
    /// vectors.
    #[must_use]
    pub fn builder(base_url: impl Into<String>, model: impl Into<String>, dim: usize) -> EmbeddingClientConfigBuilder {
        EmbeddingClientConfigBuilder {
            inner: Self {
                base_url: base_url.into(),
                model: model.into(),
                dim,
                batch_size: 20,
                request_timeout: Duration::from_secs(30),
                max_retries: 3,
            },
        }
    }

    /// The embedding endpoint's base URL (without a trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The model name sent in each request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The expected embedding vector dimension.
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// How many texts are sent per HTTP request.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Total timeout for a single batch request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// How many times a failed batch is retried before giving up.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

/// Fluent builder for [`EmbeddingClientConfig`].
#[derive(Debug, Clone)]
pub struct EmbeddingClientConfigBuilder {
    inner: EmbeddingClientConfig,
}

impl EmbeddingClientConfigBuilder {
    /// Overrides the default batch size of 20.
    #[must_use]
    pub const fn batch_size(mut self, batch_size: usize) -> Self {
        self.inner.batch_size = batch_size;
        self
    }

    /// Overrides the default 30s request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.inner.request_timeout = timeout;
        self
    }

    /// Overrides the default retry budget of 3.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.inner.max_retries = max_retries;
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> EmbeddingClientConfig {
        self.inner
    }
}
