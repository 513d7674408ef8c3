//! PDF text extraction for the document-ingestion pipeline.
//!
//! This crate turns PDF bytes into a per-page structured model
//! ([`ProcessedDocument`]); chunking, embedding, and storage happen further
//! down the pipeline in other crates.

mod error;
mod model;
mod parser;

pub use error::{PdfProcessError, Result};
pub use model::{DocumentMeta, MetadataVerbosity, Page, PageMode, PdfProcessOptions, ProcessedDocument};

use std::path::{Path, PathBuf};

/// PDF extraction entrypoint.
#[derive(Debug, Clone)]
pub struct PdfProcessor {
    source: PdfSource,
}

#[derive(Debug, Clone)]
enum PdfSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl PdfProcessor {
    /// Build a processor from a PDF file path.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: PdfSource::Path(path.into()),
        }
    }

    /// Build a processor from PDF bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: PdfSource::Bytes(bytes.into()),
        }
    }

    /// Parse the PDF into the structured page model.
    ///
    /// # Errors
    ///
    /// Returns [`PdfProcessError::Parse`] if the bytes are not a valid PDF,
    /// [`PdfProcessError::Encrypted`] if the document requires a password,
    /// or [`PdfProcessError::EmptyPageRange`] if `options.page_range`
    /// selects no pages.
    pub fn to_model(&self, options: &PdfProcessOptions) -> Result<ProcessedDocument> {
        match &self.source {
            PdfSource::Path(path) => parser::parse_from_path(path, options),
            PdfSource::Bytes(bytes) => parser::parse_from_bytes(bytes, "memory", options),
        }
    }

    /// Returns source path if this processor was built from one.
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        match &self.source {
            PdfSource::Path(path) => Some(path.as_path()),
            PdfSource::Bytes(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pdf_bytes_error() {
        let processor = PdfProcessor::from_bytes(b"not-a-pdf".to_vec());
        let result = processor.to_model(&PdfProcessOptions::default());
        assert!(result.is_err());
    }
}
