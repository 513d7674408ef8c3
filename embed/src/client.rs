use std::time::Duration;

use inkwell_core::EmbeddingModel;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::EmbeddingClientConfig;
use crate::error::{EmbedError, Result};

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    truncate: bool,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embeds text over HTTP against the `POST {base_url}/api/embed` contract:
/// `{model, input, truncate: true}` -> `{embeddings: number[][]}`.
///
/// Requests are batched at [`EmbeddingClientConfig::batch_size`] texts per
/// call, each bounded by [`EmbeddingClientConfig::request_timeout`] and
/// retried up to [`EmbeddingClientConfig::max_retries`] times on transient
/// failure with exponential backoff.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingClient {
    http: reqwest::Client,
    config: EmbeddingClientConfig,
}

impl HttpEmbeddingClient {
    /// Builds a client from `config`, reusing one [`reqwest::Client`]
    /// (and therefore one connection pool) for all requests.
    #[must_use]
    pub fn new(config: EmbeddingClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Embeds every text in `texts`, batching and retrying as configured.
    ///
    /// Returns vectors in the same order as `texts`. `cancel` is raced
    /// against each in-flight HTTP call so a shutdown request interrupts
    /// mid-batch rather than waiting for the batch to finish.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::Cancelled`] if `cancel` fires first,
    /// [`EmbedError::DimensionMismatch`] if a returned vector's length
    /// doesn't match [`EmbeddingClientConfig::dim`], or
    /// [`EmbedError::MaxRetriesExceeded`] once the retry budget is spent.
    pub async fn embed_batch(&self, texts: &[String], cancel: &CancellationToken) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.batch_size()) {
            let embeddings = self.embed_one_batch(batch, cancel).await?;
            out.extend(embeddings);
        }
        Ok(out)
    }

    async fn embed_one_batch(&self, batch: &[String], cancel: &CancellationToken) -> Result<Vec<Vec<f32>>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            tracing::debug!(batch_size = batch.len(), attempt, "embedding batch");

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(EmbedError::Cancelled),
                result = self.send_once(batch) => result,
            };

            match result {
                Ok(embeddings) => return self.validate_dimensions(embeddings),
                Err(err) if attempt >= self.config.max_retries() => {
                    tracing::warn!(attempt, error = %err, "embedding batch exhausted retries");
                    return Err(EmbedError::MaxRetriesExceeded { attempts: attempt });
                }
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "embedding batch failed, retrying");
                    let backoff = Duration::from_millis(200 * 2u64.pow(attempt.saturating_sub(1)));
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(EmbedError::Cancelled),
                        () = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }
    }

    async fn send_once(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.config.base_url());
        let request = EmbedRequest {
            model: self.config.model(),
            input: batch,
            truncate: true,
        };

        let response = self
            .http
            .post(&url)
            .timeout(self.config.request_timeout())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbedError::Timeout
                } else {
                    EmbedError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedError::Status { status, body });
        }

        let parsed: EmbedResponse = response.json().await.map_err(EmbedError::Request)?;
        Ok(parsed.embeddings)
    }

    fn validate_dimensions(&self, embeddings: Vec<Vec<f32>>) -> Result<Vec<Vec<f32>>> {
        for embedding in &embeddings {
            if embedding.len() != self.config.dim() {
                return Err(EmbedError::DimensionMismatch {
                    expected: self.config.dim(),
                    actual: embedding.len(),
                });
            }
        }
        Ok(embeddings)
    }
}

impl EmbeddingModel for HttpEmbeddingClient {
    fn dim(&self) -> usize {
        self.config.dim()
    }

    async fn embed(&self, text: &str) -> inkwell_core::Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut embeddings = self
            .embed_batch(&texts, &CancellationToken::new())
            .await
            .map_err(inkwell_core::CoreError::from)?;
        Ok(embeddings.pop().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, dim: usize) -> HttpEmbeddingClient {
        let config = EmbeddingClientConfig::builder(server.uri(), "test-model", dim).build();
        HttpEmbeddingClient::new(config)
    }

    #[tokio::test]
    async fn embeds_a_batch_of_texts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[0.1, 0.2], [0.3, 0.4]],
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, 2);
        let texts = vec!["a".to_string(), "b".to_string()];
        let result = client.embed_batch(&texts, &CancellationToken::new()).await.unwrap();
        assert_eq!(result, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[0.1, 0.2, 0.3]],
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, 2);
        let texts = vec!["a".to_string()];
        let err = client
            .embed_batch(&texts, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EmbedError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn cancellation_short_circuits_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = client_for(&server, 2);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let texts = vec!["a".to_string()];
        let err = client.embed_batch(&texts, &cancel).await.unwrap_err();
        assert!(matches!(err, EmbedError::Cancelled));
    }

    #[tokio::test]
    async fn server_error_is_retried_then_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = EmbeddingClientConfig::builder(server.uri(), "test-model", 2)
            .max_retries(2)
            .build();
        let client = HttpEmbeddingClient::new(config);
        let texts = vec!["a".to_string()];
        let err = client
            .embed_batch(&texts, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EmbedError::MaxRetriesExceeded { attempts: 2 }));
    }
}
