//! MIME-dispatched text extraction.
//!
//! [`Extractor`] is implemented once per supported MIME type; [`Dispatcher`]
//! picks the right one. This is the C2 "Text Extractors" component: a
//! document's raw bytes go in, an [`ExtractedDocument`] comes out, ready for
//! chunking.

pub mod error;
pub mod extractors;
pub mod model;

pub use error::{ExtractError, Result};
pub use model::{ExtractedDocument, ExtractedPage, Section};

use inkwell_core::types::SupportedMime;

/// Extracts text from a document's raw bytes.
pub trait Extractor: Send + Sync {
    /// Parses `bytes` into an [`ExtractedDocument`].
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument>;
}

impl Extractor for extractors::PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        Self::extract(self, bytes)
    }
}

impl Extractor for extractors::MarkdownExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        Self::extract(self, bytes)
    }
}

impl Extractor for extractors::PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        Self::extract(self, bytes)
    }
}

impl Extractor for extractors::DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        Self::extract(self, bytes)
    }
}

impl Extractor for extractors::ImageExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        Self::extract(self, bytes)
    }
}

/// Selects and invokes the right [`Extractor`] for a MIME type.
#[derive(Debug, Default)]
pub struct Dispatcher;

impl Dispatcher {
    /// Extracts `bytes`, declared as `mime`, using the matching extractor.
    ///
    /// # Errors
    ///
    /// Propagates whatever the selected extractor returns.
    pub fn extract(&self, mime: SupportedMime, bytes: &[u8]) -> Result<ExtractedDocument> {
        tracing::debug!(mime = mime.as_str(), bytes = bytes.len(), "dispatching extraction");
        match mime {
            SupportedMime::TextPlain => extractors::PlainTextExtractor.extract(bytes),
            SupportedMime::TextMarkdown => extractors::MarkdownExtractor.extract(bytes),
            SupportedMime::ApplicationPdf => extractors::PdfExtractor.extract(bytes),
            SupportedMime::ApplicationDocx => extractors::DocxExtractor.extract(bytes),
            SupportedMime::ImagePng | SupportedMime::ImageJpeg | SupportedMime::ImageWebp => {
                extractors::ImageExtractor.extract(bytes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_plain_text() {
        let doc = Dispatcher
            .extract(SupportedMime::TextPlain, b"hello")
            .unwrap();
        assert_eq!(doc.pages[0].text, "hello");
    }

    #[test]
    fn dispatches_image_without_error() {
        let doc = Dispatcher
            .extract(SupportedMime::ImagePng, b"\x89PNG")
            .unwrap();
        assert!(!doc.pages[0].has_extracted_text);
    }
}
