use docx_rs::{DocumentChild, ParagraphChild, RunChild, read_docx};

use crate::error::{ExtractError, Result};
use crate::model::{ExtractedDocument, ExtractedPage, Section};

/// Extracts `.docx` sources via `docx-rs`.
///
/// DOCX has no native pagination; the whole document becomes a single page,
/// with paragraph breaks preserved as blank lines so downstream chunking can
/// still find paragraph boundaries.
#[derive(Debug, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    /// Parses `bytes` as a DOCX package.
    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        let docx = read_docx(bytes).map_err(|e| ExtractError::InvalidSource {
            mime: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            detail: e.to_string(),
        })?;

        let mut paragraphs = Vec::new();
        for child in &docx.document.children {
            if let DocumentChild::Paragraph(paragraph) = child {
                let mut text = String::new();
                for run_child in &paragraph.children {
                    if let ParagraphChild::Run(run) = run_child {
                        for rc in &run.children {
                            if let RunChild::Text(t) = rc {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
                if !text.trim().is_empty() {
                    paragraphs.push(text);
                }
            }
        }

        if paragraphs.is_empty() {
            return Err(ExtractError::EmptyContent {
                mime: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            });
        }

        let text = paragraphs.join("\n\n");
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
    fn rejects_non_docx_bytes() {
        let err = DocxExtractor.extract(b"not a docx").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidSource { .. }));
    }
}
