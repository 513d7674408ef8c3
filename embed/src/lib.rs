//! HTTP embedding client.
//!
//! This is the C4 "Embedding Client" component: it implements
//! `inkwell_core::EmbeddingModel` over HTTP, plus a batch entrypoint the
//! ingestion pipeline uses directly so it can embed many chunks per request.

mod client;
mod config;
mod error;

pub use client::HttpEmbeddingClient;
pub use config::{EmbeddingClientConfig, EmbeddingClientConfigBuilder};
pub use error::{EmbedError, Result};
