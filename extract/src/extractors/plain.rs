use crate::error::{ExtractError, Result};
use crate::model::{ExtractedDocument, ExtractedPage, Section};

/// Extracts `text/plain` sources: the bytes are decoded as UTF-8 and passed
/// through verbatim as a single page.
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    /// Decodes `bytes` as UTF-8 plain text.
    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ExtractError::InvalidSource {
                mime: "text/plain",
                detail: e.to_string(),
            })?
            .to_string();

        if text.trim().is_empty() {
            return Err(ExtractError::EmptyContent { mime: "text/plain" });
        }

        let end_line = text.lines().count().saturating_sub(1);
        let sections = vec![Section {
            heading: None,
            level: 0,
            start_line: 0,
            end_line,
        }];

        Ok(ExtractedDocument::new(
            None,
            vec![ExtractedPage::with_text(1, text)],
            sections,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_utf8_text_verbatim() {
        let doc = PlainTextExtractor.extract(b"hello world").unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].text, "hello world");
    }

    #[test]
    fn rejects_non_utf8_bytes() {
        let err = PlainTextExtractor.extract(&[0xff, 0xfe, 0xfd]).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidSource { .. }));
    }

    #[test]
    fn rejects_blank_text() {
        let err = PlainTextExtractor.extract(b"   \n\t  ").unwrap_err();
        assert!(matches!(err, ExtractError::EmptyContent { .. }));
    }
}
