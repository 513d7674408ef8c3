//! # inkwell-core
//!
//! Shared identifiers, value types, error taxonomy, and capability traits for
//! the campaign knowledge ingestion and retrieval service.
//!
//! `inkwell-core` has no opinion about storage backends, HTTP clients, or
//! embedding providers — it only describes the shapes every other crate in
//! the workspace agrees on:
//!
//! - [`CampaignId`], [`DocumentId`], [`ChunkId`], [`JobId`] — identifier
//!   newtypes wrapping [`uuid::Uuid`].
//! - [`Metadata`], [`DocumentClass`], [`SupportedMime`] — the shared value
//!   types that appear on documents and chunks.
//! - [`ErrorKind`] / [`CoreError`] — the error taxonomy every crate's own
//!   error enum converts into at its public boundary.
//! - [`EmbeddingModel`] / [`ChatModel`] — the two model capabilities the
//!   pipeline depends on, implemented by external providers.
//!
//! ## Modules
//!
//! - [`chat`] — the chat-completion capability used by answer synthesis.
//! - [`embedding`] — turn text into dense vectors.
//! - [`error`] — the shared error taxonomy.
//! - [`ids`] — identifier newtypes.
//! - [`types`] — metadata, document classification, MIME whitelist.

pub mod chat;
pub mod embedding;
pub mod error;
pub mod ids;
pub mod types;

#[doc(inline)]
pub use chat::{ChatMessage, ChatModel, ChatRole};
#[doc(inline)]
pub use embedding::{Embedding, EmbeddingModel};
#[doc(inline)]
pub use error::{CoreError, ErrorKind, ErrorKindExt};
#[doc(inline)]
pub use ids::{CampaignId, ChunkId, DocumentId, JobId};
#[doc(inline)]
pub use types::{DocumentClass, Metadata, SupportedMime};

/// Result type used throughout the crate.
pub type Result<T = String, E = CoreError> = std::result::Result<T, E>;
