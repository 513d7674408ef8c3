use inkwell_core::{CoreError, ErrorKind, ErrorKindExt};
use thiserror::Error;

/// Errors emitted by the PDF extraction pipeline.
#[derive(Debug, Error)]
pub enum PdfProcessError {
    /// The input bytes do not decode as a valid PDF structure.
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    /// The source PDF could not be read from the filesystem.
    #[error("failed to read PDF: {0}")]
    Io(#[from] std::io::Error),
    /// The PDF's cross-reference table declares an `Encrypt` entry; this
    /// crate does not attempt password-protected documents.
    #[error("PDF is encrypted and cannot be read without a password")]
    Encrypted,
    /// The requested page range selected zero pages.
    #[error("page range {0:?} selected no pages out of {1}")]
    EmptyPageRange(std::ops::RangeInclusive<usize>, usize),
}

impl ErrorKindExt for PdfProcessError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::ParseError,
            Self::Io(_) => ErrorKind::InvalidSource,
            Self::Encrypted => ErrorKind::EncryptedSource,
            Self::EmptyPageRange(..) => ErrorKind::ValidationError,
        }
    }
}

impl From<PdfProcessError> for CoreError {
    fn from(err: PdfProcessError) -> Self {
        let kind = err.kind();
        CoreError::new(kind, err.to_string()).with_source(err)
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, PdfProcessError>;
