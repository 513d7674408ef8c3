use std::ops::RangeInclusive;

/// Metadata detail level extracted from the PDF info dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataVerbosity {
    /// Include only minimal retrieval-critical metadata.
    Minimal,
    /// Include additional document metadata when available.
    Standard,
}

/// Runtime options for PDF processing.
#[derive(Debug, Clone)]
pub struct PdfProcessOptions {
    /// Optional inclusive 1-based page range.
    pub page_range: Option<RangeInclusive<usize>>,
    /// Metadata detail level in the returned document.
    pub metadata_verbosity: MetadataVerbosity,
    /// Pages whose text-quality score falls below this threshold are
    /// classified [`PageMode::VisionOnly`] and contribute no text.
    pub min_text_quality: f32,
}

impl Default for PdfProcessOptions {
    fn default() -> Self {
        Self {
            page_range: None,
            metadata_verbosity: MetadataVerbosity::Minimal,
            min_text_quality: 0.2,
        }
    }
}

/// Extracted document ready for downstream chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedDocument {
    /// Source identifier (path or virtual label).
    pub source: String,
    /// Total pages in the original PDF.
    pub page_count: usize,
    /// Extracted document metadata.
    pub metadata: DocumentMeta,
    /// Canonical per-page outputs, in reading order.
    pub pages: Vec<Page>,
}

/// Minimal PDF metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMeta {
    /// Optional title from PDF info dictionary.
    pub title: Option<String>,
    /// Optional author from PDF info dictionary.
    pub author: Option<String>,
    /// Optional creation date when standard verbosity is enabled.
    pub creation_date: Option<String>,
}

/// Page modality derived from native-extraction quality.
///
/// This workspace has no OCR backend: a page classified [`Self::VisionOnly`]
/// simply contributes no text, matching the image-document handling in
/// [`inkwell_extract`](https://docs.rs/inkwell-extract).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Native text extraction produced quality text.
    Native,
    /// No usable text was extracted; the page is effectively an image.
    VisionOnly,
}

impl PageMode {
    /// Stable string form used in logs and tests.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::VisionOnly => "vision_only",
        }
    }
}

/// Parsed page in canonical text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page index in the selected output set.
    pub index: usize,
    /// Modality classification for this page.
    pub mode: PageMode,
    /// Canonical text for this page, empty when `mode` is `VisionOnly`.
    pub text: String,
    /// Character count of canonical text.
    pub text_chars: usize,
    /// Approximate token count for canonical text (`ceil(chars / 4)`).
    pub token_estimate: usize,
}
