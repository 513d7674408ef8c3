//! Shared error taxonomy.
//!
//! Every crate in the workspace defines its own `thiserror` enum for its own
//! failure modes, but converts into [`CoreError`] at its public boundary so
//! callers further up the pipeline (the ingestion handler, in particular) can
//! classify any propagated error without downcasting.

use std::fmt;

/// A coarse classification of why an operation failed.
///
/// This is the taxonomy referenced throughout the component design: every
/// `thiserror` enum in the workspace maps each of its variants onto exactly
/// one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The requested resource does not exist.
    NotFound,
    /// The document's MIME type has no registered extractor.
    UnsupportedMime,
    /// Caller-supplied input failed validation.
    ValidationError,
    /// The operation was cancelled before completing.
    Cancelled,
    /// The blob store rejected a read or write.
    StorageError,
    /// Text could not be decoded (bad UTF-8, truncated container, etc).
    EncodingError,
    /// Extraction produced no usable text.
    EmptyContent,
    /// The source document is encrypted and cannot be read without a password.
    EncryptedSource,
    /// The source bytes are not a valid instance of the declared MIME type.
    InvalidSource,
    /// A format-specific parser failed.
    ParseError,
    /// The embedding provider failed to return vectors.
    EmbeddingFailed,
    /// The chunk store / database rejected a read or write.
    DatabaseError,
    /// A job's lease expired before it reported completion.
    Stalled,
    /// A job exhausted its retry budget.
    MaxRetriesExceeded,
    /// An operation exceeded its deadline.
    Timeout,
    /// A job handler returned an application-level error.
    HandlerError,
    /// Catch-all for errors that don't fit another kind.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not_found",
            Self::UnsupportedMime => "unsupported_mime",
            Self::ValidationError => "validation_error",
            Self::Cancelled => "cancelled",
            Self::StorageError => "storage_error",
            Self::EncodingError => "encoding_error",
            Self::EmptyContent => "empty_content",
            Self::EncryptedSource => "encrypted_source",
            Self::InvalidSource => "invalid_source",
            Self::ParseError => "parse_error",
            Self::EmbeddingFailed => "embedding_failed",
            Self::DatabaseError => "database_error",
            Self::Stalled => "stalled",
            Self::MaxRetriesExceeded => "max_retries_exceeded",
            Self::Timeout => "timeout",
            Self::HandlerError => "handler_error",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// The common error shape crate-specific errors convert into at a public
/// boundary.
#[derive(Debug)]
pub struct CoreError {
    kind: ErrorKind,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl CoreError {
    /// Build a new error of the given kind with a message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The coarse classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Implemented by every crate-local error enum so that propagated errors can
/// be classified uniformly without downcasting.
pub trait ErrorKindExt {
    /// The coarse classification of this error.
    fn kind(&self) -> ErrorKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = CoreError::new(ErrorKind::NotFound, "chunk 42 missing");
        assert_eq!(err.to_string(), "not_found: chunk 42 missing");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn with_source_is_retrievable() {
        let io_err = std::io::Error::other("disk full");
        let err = CoreError::new(ErrorKind::StorageError, "write failed").with_source(io_err);
        assert!(std::error::Error::source(&err).is_some());
    }
}
