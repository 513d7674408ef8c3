use std::collections::HashMap;
use std::sync::Arc;

use inkwell_core::ids::{CampaignId, DocumentId};
use inkwell_core::{CoreError, ErrorKind, ErrorKindExt};
use parking_lot::RwLock;
use thiserror::Error;

/// Errors raised by a [`DocumentRepository`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No document row exists with the requested id.
    #[error("document not found: {0:?}")]
    NotFound(DocumentId),
    /// The requested state transition isn't legal from the document's
    /// current status.
    #[error("cannot {action} document {document_id:?} in state {from:?}")]
    InvalidTransition {
        /// The document being transitioned.
        document_id: DocumentId,
        /// Its status at the time of the attempted transition.
        from: DocumentStatus,
        /// A short description of the attempted transition, for the error
        /// message.
        action: &'static str,
    },
}

impl ErrorKindExt for RepositoryError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidTransition { .. } => ErrorKind::ValidationError,
        }
    }
}

impl From<RepositoryError> for CoreError {
    fn from(err: RepositoryError) -> Self {
        let kind = err.kind();
        CoreError::new(kind, err.to_string()).with_source(err)
    }
}

/// Result alias for this module.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// A document row's position in its ingestion lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Uploaded, not yet (or no longer) being processed.
    Pending,
    /// An ingestion attempt is currently running.
    Processing,
    /// Ingestion completed successfully; chunks are queryable.
    Ready,
    /// The most recent ingestion attempt failed.
    Failed,
}

/// A document's metadata row, independent of its chunk content.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    /// This document's identifier.
    pub id: DocumentId,
    /// The owning campaign.
    pub campaign_id: CampaignId,
    /// Current lifecycle status.
    pub status: DocumentStatus,
    /// Set once ingestion finalizes successfully.
    pub chunk_count: Option<usize>,
    /// The error message from the most recent failed attempt, if any.
    pub error: Option<String>,
}

impl DocumentRecord {
    fn pending(id: DocumentId, campaign_id: CampaignId) -> Self {
        Self {
            id,
            campaign_id,
            status: DocumentStatus::Pending,
            chunk_count: None,
            error: None,
        }
    }
}

/// The document row state machine the ingestion pipeline drives: `pending |
/// failed -> processing -> (ready | failed)`.
///
/// This stands in for the relational "durable store" named in the external
/// interfaces — a production deployment backs this with the same database
/// that holds chunk rows, guarded by row-level locking so only one writer
/// touches a document at a time.
pub trait DocumentRepository: Send + Sync {
    /// Fetches a document's current row.
    fn get(&self, document_id: DocumentId) -> impl std::future::Future<Output = Result<DocumentRecord>> + Send;

    /// Transitions `pending | failed -> processing`.
    fn mark_processing(&self, document_id: DocumentId) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Records a failure and transitions the document to `failed`,
    /// regardless of its current status.
    fn mark_failed(&self, document_id: DocumentId, error: String) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Records the final chunk count and transitions the document to
    /// `ready`.
    fn finalize(&self, document_id: DocumentId, chunk_count: usize) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// In-memory reference [`DocumentRepository`], analogous to
/// `InMemoryChunkStore`/`InMemoryJobQueue` elsewhere in the workspace.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentRepository {
    records: Arc<RwLock<HashMap<DocumentId, DocumentRecord>>>,
}

impl InMemoryDocumentRepository {
    /// Builds an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a `pending` row, as the upload path would after accepting a
    /// blob. Overwrites any existing row for `document_id`.
    pub fn seed_pending(&self, document_id: DocumentId, campaign_id: CampaignId) {
        self.records
            .write()
            .insert(document_id, DocumentRecord::pending(document_id, campaign_id));
    }
}

impl DocumentRepository for InMemoryDocumentRepository {
    async fn get(&self, document_id: DocumentId) -> Result<DocumentRecord> {
        self.records
            .read()
            .get(&document_id)
            .cloned()
            .ok_or(RepositoryError::NotFound(document_id))
    }

    async fn mark_processing(&self, document_id: DocumentId) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .get_mut(&document_id)
            .ok_or(RepositoryError::NotFound(document_id))?;
        match record.status {
            DocumentStatus::Pending | DocumentStatus::Failed => {
                record.status = DocumentStatus::Processing;
                record.error = None;
                Ok(())
            }
            from => Err(RepositoryError::InvalidTransition {
                document_id,
                from,
                action: "mark-processing",
            }),
        }
    }

    async fn mark_failed(&self, document_id: DocumentId, error: String) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .get_mut(&document_id)
            .ok_or(RepositoryError::NotFound(document_id))?;
        record.status = DocumentStatus::Failed;
        record.error = Some(error);
        Ok(())
    }

    async fn finalize(&self, document_id: DocumentId, chunk_count: usize) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .get_mut(&document_id)
            .ok_or(RepositoryError::NotFound(document_id))?;
        record.status = DocumentStatus::Ready;
        record.chunk_count = Some(chunk_count);
        record.error = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mark_processing_then_finalize_reaches_ready() {
        let repo = InMemoryDocumentRepository::new();
        let document_id = DocumentId::new();
        repo.seed_pending(document_id, CampaignId::new());

        repo.mark_processing(document_id).await.unwrap();
        assert_eq!(repo.get(document_id).await.unwrap().status, DocumentStatus::Processing);

        repo.finalize(document_id, 7).await.unwrap();
        let record = repo.get(document_id).await.unwrap();
        assert_eq!(record.status, DocumentStatus::Ready);
        assert_eq!(record.chunk_count, Some(7));
    }

    #[tokio::test]
    async fn mark_processing_twice_without_failure_is_rejected() {
        let repo = InMemoryDocumentRepository::new();
        let document_id = DocumentId::new();
        repo.seed_pending(document_id, CampaignId::new());

        repo.mark_processing(document_id).await.unwrap();
        let err = repo.mark_processing(document_id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn failed_document_can_be_retried() {
        let repo = InMemoryDocumentRepository::new();
        let document_id = DocumentId::new();
        repo.seed_pending(document_id, CampaignId::new());

        repo.mark_processing(document_id).await.unwrap();
        repo.mark_failed(document_id, "boom".to_string()).await.unwrap();
        repo.mark_processing(document_id).await.unwrap();
        assert_eq!(repo.get(document_id).await.unwrap().status, DocumentStatus::Processing);
    }

    #[tokio::test]
    async fn get_missing_document_is_not_found() {
        let repo = InMemoryDocumentRepository::new();
        let err = repo.get(DocumentId::new()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}
