use crate::error::Result;
use crate::model::{ExtractedDocument, ExtractedPage};

/// Extracts image MIME types (`image/png`, `image/jpeg`).
///
/// Images carry no extractable text; this extractor always succeeds with a
/// single empty page so the pipeline can still store and index a
/// zero-text chunk placeholder.
#[derive(Debug, Default)]
pub struct ImageExtractor;

impl ImageExtractor {
    /// Always succeeds: images produce one page with
    /// `has_extracted_text = false`.
    pub fn extract(&self, _bytes: &[u8]) -> Result<ExtractedDocument> {
        Ok(ExtractedDocument::new(None, vec![ExtractedPage::empty(1)], Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extraction_always_succeeds_with_no_text() {
        let doc = ImageExtractor.extract(b"\x89PNG...").unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert!(!doc.pages[0].has_extracted_text);
    }
}
