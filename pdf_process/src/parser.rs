use std::path::Path;

use lopdf::Document;

use crate::error::{PdfProcessError, Result};
use crate::model::{DocumentMeta, MetadataVerbosity, Page, PageMode, PdfProcessOptions, ProcessedDocument};

pub(crate) fn parse_from_path(path: &Path, options: &PdfProcessOptions) -> Result<ProcessedDocument> {
    let doc = Document::load(path).map_err(|e| PdfProcessError::Parse(e.to_string()))?;
    parse_document(doc, path.display().to_string(), options)
}

pub(crate) fn parse_from_bytes(
    bytes: &[u8],
    source_name: &str,
    options: &PdfProcessOptions,
) -> Result<ProcessedDocument> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfProcessError::Parse(e.to_string()))?;
    parse_document(doc, source_name.to_string(), options)
}

fn parse_document(doc: Document, source: String, options: &PdfProcessOptions) -> Result<ProcessedDocument> {
    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(PdfProcessError::Encrypted);
    }

    let page_map = doc.get_pages();
    let mut page_numbers: Vec<u32> = page_map.keys().copied().collect();
    page_numbers.sort_unstable();

    let selected = select_pages(&page_numbers, options.page_range.clone());
    if selected.is_empty() && !page_numbers.is_empty() {
        if let Some(range) = options.page_range.clone() {
            return Err(PdfProcessError::EmptyPageRange(range, page_numbers.len()));
        }
    }

    let mut pages = Vec::with_capacity(selected.len());
    for (idx, page_number) in selected.iter().enumerate() {
        let text_raw = doc
            .extract_text(&[*page_number])
            .unwrap_or_else(|_| String::new());
        let normalized = normalize_text(&text_raw);
        let quality = text_quality_score(&normalized);

        let (mode, text) = if quality < options.min_text_quality {
            (PageMode::VisionOnly, String::new())
        } else {
            (PageMode::Native, normalized)
        };

        let text_chars = text.chars().count();
        let token_estimate = estimate_tokens(&text);

        pages.push(Page {
            index: idx + 1,
            mode,
            text,
            text_chars,
            token_estimate,
        });
    }

    let metadata = extract_metadata(&doc, options.metadata_verbosity);

    Ok(ProcessedDocument {
        source,
        page_count: page_numbers.len(),
        metadata,
        pages,
    })
}

fn select_pages(pages: &[u32], range: Option<std::ops::RangeInclusive<usize>>) -> Vec<u32> {
    match range {
        None => pages.to_vec(),
        Some(range) => pages
            .iter()
            .enumerate()
            .filter_map(|(idx, p)| {
                let page_index = idx + 1;
                if range.contains(&page_index) {
                    Some(*p)
                } else {
                    None
                }
            })
            .collect(),
    }
}

fn normalize_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn text_quality_score(text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    let chars = text.chars().count() as f32;
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .count() as f32;
    let words = text.split_whitespace().count() as f32;
    let printable_ratio = printable / chars;
    let density = (words / (chars / 5.0).max(1.0)).min(1.0);
    (0.7 * printable_ratio) + (0.3 * density)
}

fn extract_metadata(doc: &Document, verbosity: MetadataVerbosity) -> DocumentMeta {
    let mut meta = DocumentMeta::default();
    if let Ok(info_ref) = doc.trailer.get(b"Info")
        && let Ok(info_ref) = info_ref.as_reference()
        && let Ok(dict) = doc.get_dictionary(info_ref)
    {
        meta.title = dict
            .get(b"Title")
            .ok()
            .and_then(|v| v.as_str().ok())
            .map(to_clean_string);
        meta.author = dict
            .get(b"Author")
            .ok()
            .and_then(|v| v.as_str().ok())
            .map(to_clean_string);
        if matches!(verbosity, MetadataVerbosity::Standard) {
            meta.creation_date = dict
                .get(b"CreationDate")
                .ok()
                .and_then(|v| v.as_str().ok())
                .map(to_clean_string);
        }
    }
    meta
}

fn to_clean_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_score_is_zero_for_empty_text() {
        assert_eq!(text_quality_score(""), 0.0);
    }

    #[test]
    fn quality_score_rewards_printable_dense_text() {
        let score = text_quality_score("The quick brown fox jumps over the lazy dog.");
        assert!(score > 0.5, "expected dense prose to score high, got {score}");
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens(""), 0);
    }
}
