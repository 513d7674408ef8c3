use inkwell_pdf::{PdfProcessError, PdfProcessOptions, PdfProcessor};

use crate::error::{ExtractError, Result};
use crate::model::{ExtractedDocument, ExtractedPage, Section};

/// Extracts `application/pdf` sources via [`inkwell_pdf`].
#[derive(Debug, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Parses `bytes` as a PDF and converts each page into an
    /// [`ExtractedPage`].
    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        let processor = PdfProcessor::from_bytes(bytes.to_vec());
        let processed = processor
            .to_model(&PdfProcessOptions::default())
            .map_err(|e| match e {
                PdfProcessError::Encrypted => ExtractError::Encrypted {
                    mime: "application/pdf",
                },
                other => ExtractError::InvalidSource {
                    mime: "application/pdf",
                    detail: other.to_string(),
                },
            })?;

        let pages = processed
            .pages
            .into_iter()
            .map(|page| {
                if page.mode == inkwell_pdf::PageMode::Native {
                    ExtractedPage::with_text(page.index, page.text)
                } else {
                    ExtractedPage::empty(page.index)
                }
            })
            .collect::<Vec<_>>();

        // A scanned/textless PDF (every page `hasExtractedText=false`) still
        // reaches `ready` downstream with whatever whitespace survives
        // chunking; only a structurally empty document (no pages at all) is
        // rejected here.
        if pages.is_empty() {
            return Err(ExtractError::EmptyContent {
                mime: "application/pdf",
            });
        }

        // PDF has no heading syntax to detect; the whole document is one
        // implicit level-0 section, spanning however many lines the
        // concatenated page text has.
        let total_lines: usize = pages.iter().map(|p| p.text.lines().count().max(1)).sum();
        let sections = vec![Section {
            heading: None,
            level: 0,
            start_line: 0,
            end_line: total_lines.saturating_sub(1),
        }];

        Ok(ExtractedDocument::new(processed.metadata.title, pages, sections))
    }
}
