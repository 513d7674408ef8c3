use unicode_segmentation::UnicodeSegmentation;

use crate::config::{ChunkerConfig, estimate_tokens};
use crate::model::{ChunkResult, TextChunk};

/// A leaf span of text too small to be worth splitting any further.
struct Unit<'a> {
    start: usize,
    end: usize,
    tokens: usize,
    text: &'a str,
}

/// Splits text into chunks by cascading through paragraph, sentence, and
/// whitespace boundaries, never splitting inside a word.
///
/// The cascade tries paragraph boundaries first (blank-line separated
/// blocks); any paragraph that alone exceeds
/// [`ChunkerConfig::max_tokens`] is split into sentences
/// (`unicode-segmentation`); any sentence still over budget is split on
/// whitespace, generalizing the workspace's previous
/// `FixedSizeChunker`/`SentenceChunker` pair into one strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct CascadingChunker {
    config: ChunkerConfig,
}

impl CascadingChunker {
    /// Builds a chunker with the given budgets.
    #[must_use]
    pub const fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Splits `text` into chunks.
    ///
    /// Returns an empty result for blank input.
    #[must_use]
    pub fn chunk(&self, text: &str) -> ChunkResult {
        if text.trim().is_empty() {
            return ChunkResult::new("cascading", Vec::new());
        }

        let headings = heading_spans(text);
        let units = leaf_units(text, self.config.max_tokens());
        let chunks = pack_units(text, &units, &headings, self.config);
        ChunkResult::new("cascading", chunks)
    }
}

/// Byte offset and heading text for every Markdown-style `#` heading line.
fn heading_spans(text: &str) -> Vec<(usize, String)> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches('\n').trim_start();
        if trimmed.starts_with('#') {
            let hash_count = trimmed.chars().take_while(|&c| c == '#').count();
            let rest = &trimmed[hash_count..];
            // A valid ATX heading needs a single space after the hashes (or
            // nothing at all); "#NoSpace" is body text, not a heading.
            if rest.is_empty() || rest.starts_with(' ') {
                let heading = rest.trim();
                if !heading.is_empty() {
                    spans.push((cursor, heading.to_string()));
                }
            }
        }
        cursor += line.len();
    }
    spans
}

fn section_for(headings: &[(usize, String)], offset: usize) -> Option<String> {
    headings
        .iter()
        .rev()
        .find(|(pos, _)| *pos <= offset)
        .map(|(_, heading)| heading.clone())
}

/// Splits `text` into paragraphs (blank-line separated), then sentences,
/// then whitespace-bounded fragments, as needed to respect `max_tokens`.
fn leaf_units(text: &str, max_tokens: usize) -> Vec<Unit<'_>> {
    let mut units = Vec::new();
    for (start, end) in paragraph_spans(text) {
        split_unit(text, start, end, max_tokens, &mut units);
    }
    units
}

fn paragraph_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut idx = 0;
    for part in text.split("\n\n") {
        let block_start = idx;
        if let Some(trim_offset) = part.find(|c: char| !c.is_whitespace()) {
            let trimmed = part[trim_offset..].trim_end();
            let start = block_start + trim_offset;
            let end = start + trimmed.len();
            if end > start {
                spans.push((start, end));
            }
        }
        idx = block_start + part.len() + 2;
    }
    spans
}

fn split_unit<'a>(
    text: &'a str,
    start: usize,
    end: usize,
    max_tokens: usize,
    out: &mut Vec<Unit<'a>>,
) {
    let slice = &text[start..end];
    let tokens = estimate_tokens(slice);
    if tokens <= max_tokens {
        out.push(Unit {
            start,
            end,
            tokens,
            text: slice,
        });
        return;
    }

    let sentences: Vec<(usize, &str)> = slice.unicode_sentence_indices().collect();
    if sentences.len() > 1 {
        for (offset, sentence) in sentences {
            let trimmed = sentence.trim();
            if trimmed.is_empty() {
                continue;
            }
            let local_start = offset + sentence.find(trimmed).unwrap_or(0);
            let local_end = local_start + trimmed.len();
            split_unit(text, start + local_start, start + local_end, max_tokens, out);
        }
        return;
    }

    split_by_whitespace_budget(text, start, end, max_tokens, out);
}

fn split_by_whitespace_budget<'a>(
    text: &'a str,
    start: usize,
    end: usize,
    max_tokens: usize,
    out: &mut Vec<Unit<'a>>,
) {
    let max_chars = (max_tokens * 4).max(1);
    let mut cursor = start;
    while cursor < end {
        let remaining = &text[cursor..end];
        if estimate_tokens(remaining) <= max_tokens {
            out.push(Unit {
                start: cursor,
                end,
                tokens: estimate_tokens(remaining),
                text: remaining,
            });
            break;
        }

        let budget_end = byte_offset_for_char_budget(remaining, max_chars);
        let split_at = remaining[..budget_end]
            .rfind(char::is_whitespace)
            .unwrap_or(budget_end);
        let split_at = if split_at == 0 { budget_end } else { split_at };

        let piece = remaining[..split_at].trim_end();
        if piece.is_empty() {
            break;
        }
        let piece_end = cursor + piece.len();
        out.push(Unit {
            start: cursor,
            end: piece_end,
            tokens: estimate_tokens(piece),
            text: piece,
        });
        cursor += split_at;
        while cursor < end && text.as_bytes().get(cursor).is_some_and(u8::is_ascii_whitespace) {
            cursor += 1;
        }
    }
}

fn byte_offset_for_char_budget(s: &str, max_chars: usize) -> usize {
    s.char_indices()
        .nth(max_chars)
        .map_or(s.len(), |(idx, _)| idx)
}

fn pack_units(
    text: &str,
    units: &[Unit<'_>],
    headings: &[(usize, String)],
    config: ChunkerConfig,
) -> Vec<TextChunk> {
    let mut chunks = Vec::new();
    let mut i = 0;
    let mut chunk_index = 0;

    while i < units.len() {
        let mut j = i;
        let mut tokens = 0usize;
        loop {
            if j >= units.len() {
                break;
            }
            if j > i && tokens + units[j].tokens > config.target_tokens() {
                break;
            }
            tokens += units[j].tokens;
            j += 1;
            if tokens >= config.target_tokens() {
                break;
            }
        }
        if j == i {
            j = i + 1;
        }

        let start = units[i].start;
        let end = units[j - 1].end;
        chunks.push(TextChunk {
            chunk_index,
            text: text[start..end].to_string(),
            start_offset: start,
            end_offset: end,
            token_count: units[i..j].iter().map(|u| u.tokens).sum(),
            section: section_for(headings, start),
        });
        chunk_index += 1;

        if j >= units.len() {
            break;
        }

        let mut k = j;
        let mut overlap_sum = 0usize;
        while k > i && overlap_sum < config.overlap_tokens() {
            k -= 1;
            overlap_sum += units[k].tokens;
        }
        i = k.max(i + 1);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_produces_no_chunks() {
        let chunker = CascadingChunker::default();
        let result = chunker.chunk("   \n\n  ");
        assert!(result.chunks.is_empty());
        assert_eq!(result.total_tokens, 0);
        assert_eq!(result.average_chunk_tokens, 0.0);
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunker = CascadingChunker::default();
        let result = chunker.chunk("A short paragraph of text.");
        assert_eq!(result.strategy, "cascading");
        let chunks = result.chunks;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].text, "A short paragraph of text.");
        assert_eq!(result.total_tokens, chunks[0].token_count);
        assert_eq!(result.average_chunk_tokens, chunks[0].token_count as f64);
    }

    #[test]
    fn never_splits_inside_a_word() {
        let config = ChunkerConfig::builder()
            .target_tokens(10)
            .overlap_tokens(2)
            .max_tokens(10)
            .build();
        let chunker = CascadingChunker::new(config);
        let text = "word ".repeat(200);
        let chunks = chunker.chunk(&text).chunks;
        for chunk in &chunks {
            assert!(!chunk.text.starts_with(' '), "chunk should be trimmed at start");
            for word in chunk.text.split_whitespace() {
                assert_eq!(word, "word");
            }
        }
    }

    #[test]
    fn long_text_splits_into_multiple_overlapping_chunks() {
        let config = ChunkerConfig::builder()
            .target_tokens(20)
            .overlap_tokens(5)
            .max_tokens(40)
            .build();
        let chunker = CascadingChunker::new(config);
        let text = (0..20)
            .map(|i| format!("Paragraph number {i} has some words in it."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let chunks = chunker.chunk(&text).chunks;
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
        }
    }

    #[test]
    fn chunks_carry_nearest_preceding_heading_as_section() {
        let text = "# Chapter One\n\nFirst bit of lore.\n\n## Chapter One A\n\nMore specific lore.";
        let chunker = CascadingChunker::default();
        let chunks = chunker.chunk(text).chunks;
        assert_eq!(chunks[0].section.as_deref(), Some("Chapter One"));
        assert_eq!(chunks.last().unwrap().section.as_deref(), Some("Chapter One A"));
    }

    #[test]
    fn heading_without_space_after_hash_is_not_treated_as_a_heading() {
        let text = "#NoSpace\n\nThis stays body text under no section.";
        let chunker = CascadingChunker::default();
        let chunks = chunker.chunk(text).chunks;
        assert_eq!(chunks[0].section, None);
        assert!(chunks[0].text.starts_with("#NoSpace"));
    }

    #[test]
    fn oversized_single_paragraph_is_split_by_sentence_then_whitespace() {
        let config = ChunkerConfig::builder()
            .target_tokens(15)
            .overlap_tokens(2)
            .max_tokens(15)
            .build();
        let chunker = CascadingChunker::new(config);
        let sentence = "The brave adventurers crept through the dungeon corridor. ".repeat(10);
        let chunks = chunker.chunk(&sentence).chunks;
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(estimate_tokens(&chunk.text) <= config.max_tokens() + 4);
        }
    }
}
