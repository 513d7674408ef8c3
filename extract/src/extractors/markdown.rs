use crate::error::{ExtractError, Result};
use crate::model::{ExtractedDocument, ExtractedPage, Section};

/// Extracts `text/markdown` sources.
///
/// The document is passed through as a single page so that heading-aware
/// chunking (which needs the original `#` markers) happens downstream; the
/// only thing this extractor adds is lifting the first top-level heading out
/// as the document title.
#[derive(Debug, Default)]
pub struct MarkdownExtractor;

impl MarkdownExtractor {
    /// Decodes `bytes` as UTF-8 Markdown.
    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ExtractError::InvalidSource {
                mime: "text/markdown",
                detail: e.to_string(),
            })?
            .to_string();

        if text.trim().is_empty() {
            return Err(ExtractError::EmptyContent {
                mime: "text/markdown",
            });
        }

        let title = first_heading(&text);
        let sections = detect_sections(&text);

        Ok(ExtractedDocument::new(
            title,
            vec![ExtractedPage::with_text(1, text)],
            sections,
        ))
    }
}

fn first_heading(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let trimmed = line.trim_start();
        trimmed
            .strip_prefix("# ")
            .map(|heading| heading.trim().to_string())
            .filter(|heading| !heading.is_empty())
    })
}

/// A heading line's level (1-6) and text, matched against the same ATX rule
/// the chunker uses: the hashes must be followed by a single space, or
/// nothing at all.
fn atx_heading(line: &str) -> Option<(usize, String)> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('#') {
        return None;
    }
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if rest.is_empty() || rest.starts_with(' ') {
        Some((level, rest.trim().to_string()))
    } else {
        None
    }
}

/// Splits `text` into sections bounded by ATX headings. Content before the
/// first heading becomes an implicit level-0 section; a file with no
/// headings yields one level-0 section spanning the whole file.
fn detect_sections(text: &str) -> Vec<Section> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }

    let headings: Vec<(usize, usize, String)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| atx_heading(line).map(|(level, heading)| (i, level, heading)))
        .collect();

    let mut sections = Vec::new();
    let first_heading_line = headings.first().map(|(i, _, _)| *i);
    match first_heading_line {
        None => sections.push(Section {
            heading: None,
            level: 0,
            start_line: 0,
            end_line: lines.len() - 1,
        }),
        Some(0) => {}
        Some(first) => sections.push(Section {
            heading: None,
            level: 0,
            start_line: 0,
            end_line: first - 1,
        }),
    }

    for (idx, (line_idx, level, heading)) in headings.iter().enumerate() {
        let end_line = headings
            .get(idx + 1)
            .map_or(lines.len() - 1, |(next, _, _)| next - 1);
        sections.push(Section {
            heading: Some(heading.clone()),
            level: *level,
            start_line: *line_idx,
            end_line,
        });
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifts_first_top_level_heading_as_title() {
        let doc = MarkdownExtractor
            .extract(b"# Session One\n\nThe party arrives in town.")
            .unwrap();
        assert_eq!(doc.title.as_deref(), Some("Session One"));
    }

    #[test]
    fn ignores_nested_headings_for_title() {
        let doc = MarkdownExtractor
            .extract(b"## Not the title\n\nBody text.")
            .unwrap();
        assert_eq!(doc.title, None);
    }

    #[test]
    fn preserves_full_text_for_downstream_chunking() {
        let source = "# Title\n\nFirst paragraph.\n\nSecond paragraph.";
        let doc = MarkdownExtractor.extract(source.as_bytes()).unwrap();
        assert_eq!(doc.pages[0].text, source);
    }

    #[test]
    fn body_before_first_heading_is_a_level_zero_section() {
        let source = "Intro line.\n\n# Chapter One\n\nBody.";
        let doc = MarkdownExtractor.extract(source.as_bytes()).unwrap();
        assert_eq!(doc.sections[0].heading, None);
        assert_eq!(doc.sections[0].level, 0);
        assert_eq!(doc.sections[0].end_line, 1);
        assert_eq!(doc.sections[1].heading.as_deref(), Some("Chapter One"));
        assert_eq!(doc.sections[1].level, 1);
    }

    #[test]
    fn headingless_document_is_one_level_zero_section() {
        let doc = MarkdownExtractor
            .extract(b"Just body text.\n\nMore body text.")
            .unwrap();
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].heading, None);
    }

    #[test]
    fn heading_without_space_after_hash_does_not_start_a_section() {
        let source = "# Real Heading\n\n#NoSpace still belongs here.";
        let doc = MarkdownExtractor.extract(source.as_bytes()).unwrap();
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].heading.as_deref(), Some("Real Heading"));
        assert_eq!(doc.sections[0].end_line, 2);
    }

    #[test]
    fn character_and_token_counts_are_derived_from_extracted_text() {
        let doc = MarkdownExtractor.extract(b"# Title\n\nBody.").unwrap();
        assert_eq!(doc.character_count, "# Title\n\nBody.".chars().count());
        assert_eq!(doc.token_count, doc.character_count.div_ceil(4));
        assert_eq!(doc.encoding, "utf-8");
    }
}
