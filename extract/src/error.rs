use inkwell_core::{CoreError, ErrorKind, ErrorKindExt};
use thiserror::Error;

/// Errors raised while extracting text from a document's raw bytes.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No extractor is registered for this MIME type.
    #[error(transparent)]
    UnsupportedMime(#[from] inkwell_core::CoreError),
    /// The bytes do not decode as a valid instance of the declared MIME type.
    #[error("invalid {mime} source: {detail}")]
    InvalidSource {
        /// The declared MIME type.
        mime: &'static str,
        /// What went wrong.
        detail: String,
    },
    /// The source requires a password or other credential this crate does
    /// not have.
    #[error("{mime} source is encrypted")]
    Encrypted {
        /// The declared MIME type.
        mime: &'static str,
    },
    /// Extraction completed but produced no usable text.
    #[error("extraction of {mime} produced no text")]
    EmptyContent {
        /// The declared MIME type.
        mime: &'static str,
    },
}

impl ErrorKindExt for ExtractError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedMime(err) => err.kind(),
            Self::InvalidSource { .. } => ErrorKind::InvalidSource,
            Self::Encrypted { .. } => ErrorKind::EncryptedSource,
            Self::EmptyContent { .. } => ErrorKind::EmptyContent,
        }
    }
}

impl From<ExtractError> for CoreError {
    fn from(err: ExtractError) -> Self {
        let kind = err.kind();
        CoreError::new(kind, err.to_string()).with_source(err)
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, ExtractError>;
