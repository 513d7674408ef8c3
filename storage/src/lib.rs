//! Content-addressed blob storage facade.
//!
//! [`BlobStore`] is the capability trait standing in for whatever physical
//! object store (S3, GCS, a local disk in development) backs campaign
//! document uploads. This crate ships one reference backend, [`FsBlobStore`],
//! rooted at a directory on disk.

use std::io;
use std::path::{Path, PathBuf};

use futures_lite::io::AsyncWriteExt;
use inkwell_core::ids::{CampaignId, DocumentId};
use inkwell_core::{CoreError, ErrorKind, ErrorKindExt};
use thiserror::Error;

/// Errors raised by a [`BlobStore`] implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No blob exists at the requested key.
    #[error("blob not found: {0}")]
    NotFound(String),
    /// The backend rejected a read or write.
    #[error("storage backend error for {key}")]
    Backend {
        /// The key that was being accessed.
        key: String,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

impl ErrorKindExt for StorageError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Backend { .. } => ErrorKind::StorageError,
        }
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        let kind = err.kind();
        CoreError::new(kind, err.to_string()).with_source(err)
    }
}

/// Result type returned by [`BlobStore`] operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Composes the storage key for a document's raw bytes.
///
/// This is a pure function, independent of any backend, so the key scheme
/// can be unit tested on its own.
#[must_use]
pub fn blob_key(campaign_id: CampaignId, document_id: DocumentId) -> String {
    format!("campaigns/{campaign_id}/documents/{document_id}")
}

/// A content-addressed object store for raw document bytes.
///
/// Every method is idempotent: calling `put` twice with the same key
/// overwrites rather than errors, and calling `delete` on an already-deleted
/// key succeeds silently.
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` to `key`, replacing any existing content.
    fn put(
        &self,
        key: &str,
        bytes: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Reads the full contents stored at `key`.
    ///
    /// Returns [`StorageError::NotFound`] if no blob exists at `key`.
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// Deletes the blob at `key`, if any.
    fn delete(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Produces a backend-specific reference to `key` suitable for handing
    /// to an external reader (a signed URL, a file path, etc).
    fn sign(&self, key: &str) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// A [`BlobStore`] backed by a directory on the local filesystem.
///
/// Keys are mapped directly onto relative paths under the store's root, so
/// `campaigns/{id}/documents/{id}` becomes a two-level directory structure.
/// Used as the default backend in tests and local development, the way the
/// teacher's `rag` crate ships `RedbPersistence` as its default `Persistence`
/// implementation.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates a store rooted at `root`. The directory is created lazily on
    /// first write, not at construction time.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Backend {
                    key: key.to_string(),
                    source,
                })?;
        }
        tracing::debug!(key, bytes = bytes.len(), "blob store put");
        let mut file =
            async_fs::File::create(&path)
                .await
                .map_err(|source| StorageError::Backend {
                    key: key.to_string(),
                    source,
                })?;
        file.write_all(bytes)
            .await
            .map_err(|source| StorageError::Backend {
                key: key.to_string(),
                source,
            })?;
        file.flush().await.map_err(|source| StorageError::Backend {
            key: key.to_string(),
            source,
        })
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key);
        match async_fs::read(&path).await {
            Ok(bytes) => {
                tracing::debug!(key, bytes = bytes.len(), "blob store get");
                Ok(bytes)
            }
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(source) => Err(StorageError::Backend {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match async_fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(key, "blob store delete");
                Ok(())
            }
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Backend {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn sign(&self, key: &str) -> Result<String> {
        let path: &Path = &self.path_for(key);
        Ok(format!("file://{}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_core::ids::{CampaignId, DocumentId};

    #[test]
    fn blob_key_composes_campaign_and_document() {
        let campaign = CampaignId::new();
        let document = DocumentId::new();
        let key = blob_key(campaign, document);
        assert_eq!(
            key,
            format!("campaigns/{campaign}/documents/{document}")
        );
    }

    #[test]
    fn put_then_get_round_trips() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().expect("tempdir");
            let store = FsBlobStore::new(dir.path());
            let key = "campaigns/c1/documents/d1";

            store.put(key, b"hello world").await.expect("put");
            let bytes = store.get(key).await.expect("get");
            assert_eq!(bytes, b"hello world");
        });
    }

    #[test]
    fn get_missing_key_is_not_found() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().expect("tempdir");
            let store = FsBlobStore::new(dir.path());
            let err = store.get("campaigns/c1/documents/missing").await.unwrap_err();
            assert!(matches!(err, StorageError::NotFound(_)));
        });
    }

    #[test]
    fn put_is_idempotent() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().expect("tempdir");
            let store = FsBlobStore::new(dir.path());
            let key = "campaigns/c1/documents/d1";

            store.put(key, b"first").await.expect("put");
            store.put(key, b"second").await.expect("overwrite");
            let bytes = store.get(key).await.expect("get");
            assert_eq!(bytes, b"second");
        });
    }

    #[test]
    fn delete_is_idempotent() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().expect("tempdir");
            let store = FsBlobStore::new(dir.path());
            let key = "campaigns/c1/documents/d1";

            store.put(key, b"data").await.expect("put");
            store.delete(key).await.expect("first delete");
            store.delete(key).await.expect("second delete is a no-op");
            assert!(matches!(
                store.get(key).await.unwrap_err(),
                StorageError::NotFound(_)
            ));
        });
    }

    #[test]
    fn sign_returns_a_file_reference() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().expect("tempdir");
            let store = FsBlobStore::new(dir.path());
            let reference = store.sign("campaigns/c1/documents/d1").await.expect("sign");
            assert!(reference.starts_with("file://"));
        });
    }
}
