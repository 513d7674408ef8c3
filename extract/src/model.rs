use inkwell_core::types::Metadata;

/// One page (or, for paginated-free formats, the whole document) of
/// extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    /// 1-based page index.
    pub index: usize,
    /// Extracted text for this page. Empty when `has_extracted_text` is
    /// false.
    pub text: String,
    /// Whether any usable text was recovered for this page.
    pub has_extracted_text: bool,
}

impl ExtractedPage {
    /// Builds a page with text.
    #[must_use]
    pub fn with_text(index: usize, text: String) -> Self {
        let has_extracted_text = !text.trim().is_empty();
        Self {
            index,
            text,
            has_extracted_text,
        }
    }

    /// Builds a page known to carry no text (image content).
    #[must_use]
    pub const fn empty(index: usize) -> Self {
        Self {
            index,
            text: String::new(),
            has_extracted_text: false,
        }
    }
}

/// A document section, bounded by a heading (or, for the implicit level-0
/// section, by the start of the document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading text, or `None` for the level-0 section preceding the first
    /// heading, or spanning the whole document when it has no headings.
    pub heading: Option<String>,
    /// Heading level: 0 for the implicit level-0 section, otherwise the
    /// number of `#` the heading line started with (1-6).
    pub level: usize,
    /// 0-based inclusive start line.
    pub start_line: usize,
    /// 0-based inclusive end line.
    pub end_line: usize,
}

/// The result of extracting a document's raw bytes into text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedDocument {
    /// Document title, when the source format carries one.
    pub title: Option<String>,
    /// Extracted pages, in reading order.
    pub pages: Vec<ExtractedPage>,
    /// Sections detected in the extracted text, in reading order.
    pub sections: Vec<Section>,
    /// Total character count across all pages.
    pub character_count: usize,
    /// Estimated token count (`ceil(chars / 4)`).
    pub token_count: usize,
    /// Text encoding of the extracted content (always `"utf-8"`; extractors
    /// reject non-UTF-8 sources rather than transcode them).
    pub encoding: String,
}

impl ExtractedDocument {
    /// Builds a document from its title, pages, and detected sections,
    /// deriving `characterCount`/`tokenCount`/`encoding`.
    #[must_use]
    pub fn new(title: Option<String>, pages: Vec<ExtractedPage>, sections: Vec<Section>) -> Self {
        let character_count: usize = pages.iter().map(|p| p.text.chars().count()).sum();
        Self {
            title,
            pages,
            sections,
            character_count,
            token_count: character_count.div_ceil(4),
            encoding: "utf-8".to_string(),
        }
    }

    /// Whether any page produced usable text.
    #[must_use]
    pub fn has_any_text(&self) -> bool {
        self.pages.iter().any(|p| p.has_extracted_text)
    }

    /// Metadata derived from the extraction (currently just the title, when
    /// present).
    #[must_use]
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        if let Some(title) = &self.title {
            metadata.insert("title".to_string(), title.clone());
        }
        metadata
    }
}
