/// Tunable budgets for [`crate::CascadingChunker`].
///
/// Token counts use the workspace-wide estimate of `ceil(chars / 4)`, never
/// a real model-specific tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    target_tokens: usize,
    overlap_tokens: usize,
    max_tokens: usize,
}

impl ChunkerConfig {
    /// Starts building a config from the defaults.
    #[must_use]
    pub fn builder() -> ChunkerConfigBuilder {
        ChunkerConfigBuilder::default()
    }

    /// The soft per-chunk token target the packer aims for.
    #[must_use]
    pub const fn target_tokens(&self) -> usize {
        self.target_tokens
    }

    /// How many trailing tokens of one chunk are carried into the next.
    #[must_use]
    pub const fn overlap_tokens(&self) -> usize {
        self.overlap_tokens
    }

    /// The hard token cap a single chunk (or a single unsplittable unit)
    /// may not exceed without being force-split further.
    #[must_use]
    pub const fn max_tokens(&self) -> usize {
        self.max_tokens
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            target_tokens: 400,
            overlap_tokens: 50,
            max_tokens: 600,
        }
    }
}

/// Fluent builder for [`ChunkerConfig`], following the workspace's
/// `RagConfig`/`RagConfigBuilder` convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkerConfigBuilder {
    inner: ChunkerConfig,
}

impl ChunkerConfigBuilder {
    /// Sets the soft per-chunk token target.
    #[must_use]
    pub const fn target_tokens(mut self, target_tokens: usize) -> Self {
        self.inner.target_tokens = target_tokens;
        self
    }

    /// Sets the trailing-overlap token count.
    #[must_use]
    pub const fn overlap_tokens(mut self, overlap_tokens: usize) -> Self {
        self.inner.overlap_tokens = overlap_tokens;
        self
    }

    /// Sets the hard per-chunk token cap.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.inner.max_tokens = max_tokens;
        self
    }

    /// Finishes the builder.
    ///
    /// # Panics
    ///
    /// Panics if `overlap_tokens >= target_tokens` or
    /// `target_tokens > max_tokens`.
    #[must_use]
    pub fn build(self) -> ChunkerConfig {
        assert!(
            self.inner.overlap_tokens < self.inner.target_tokens,
            "overlap_tokens must be less than target_tokens"
        );
        assert!(
            self.inner.target_tokens <= self.inner.max_tokens,
            "target_tokens must not exceed max_tokens"
        );
        self.inner
    }
}

/// Estimates a token count from character count: `ceil(chars / 4)`.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_internally_consistent() {
        let config = ChunkerConfig::default();
        assert!(config.overlap_tokens() < config.target_tokens());
        assert!(config.target_tokens() <= config.max_tokens());
    }

    #[test]
    #[should_panic(expected = "overlap_tokens")]
    fn builder_rejects_overlap_ge_target() {
        let _ = ChunkerConfig::builder()
            .target_tokens(10)
            .overlap_tokens(10)
            .build();
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens(""), 0);
    }
}
