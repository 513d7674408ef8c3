//! Shared value types used across the workspace.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ErrorKind};

/// Free-form key/value metadata attached to documents and chunks.
///
/// `BTreeMap` rather than `HashMap` so serialized metadata has a stable key
/// order (useful for content hashing and deterministic test fixtures).
pub type Metadata = BTreeMap<String, String>;

/// The broad category of source material a document represents.
///
/// Informs chunking and retrieval presentation but never gates whether a
/// document can be ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentClass {
    /// Core or supplemental rules text.
    Rulebook,
    /// World, location, or faction lore.
    Setting,
    /// Session notes, recaps, or GM scratch material.
    Notes,
    /// A map or other primarily-visual reference.
    Map,
    /// A standalone image with no associated rules text.
    Image,
}

impl fmt::Display for DocumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Rulebook => "rulebook",
            Self::Setting => "setting",
            Self::Notes => "notes",
            Self::Map => "map",
            Self::Image => "image",
        };
        f.write_str(s)
    }
}

/// The MIME types this service knows how to extract text from.
///
/// Anything outside this whitelist is rejected at ingestion time with
/// [`ErrorKind::UnsupportedMime`] rather than being attempted and failing
/// deep inside an extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupportedMime {
    /// `text/plain`
    TextPlain,
    /// `text/markdown`
    TextMarkdown,
    /// `application/pdf`
    ApplicationPdf,
    /// `application/vnd.openxmlformats-officedocument.wordprocessingml.document`
    ApplicationDocx,
    /// `image/png`
    ImagePng,
    /// `image/jpeg`
    ImageJpeg,
    /// `image/webp`
    ImageWebp,
}

impl SupportedMime {
    /// All MIME types this service accepts, in whitelist order.
    pub const ALL: [Self; 7] = [
        Self::TextPlain,
        Self::TextMarkdown,
        Self::ApplicationPdf,
        Self::ApplicationDocx,
        Self::ImagePng,
        Self::ImageJpeg,
        Self::ImageWebp,
    ];

    /// The canonical MIME type string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TextPlain => "text/plain",
            Self::TextMarkdown => "text/markdown",
            Self::ApplicationPdf => "application/pdf",
            Self::ApplicationDocx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::ImagePng => "image/png",
            Self::ImageJpeg => "image/jpeg",
            Self::ImageWebp => "image/webp",
        }
    }

    /// Whether this MIME type is image content with no extractable text.
    #[must_use]
    pub const fn is_image(self) -> bool {
        matches!(self, Self::ImagePng | Self::ImageJpeg | Self::ImageWebp)
    }

    /// Parses a raw MIME string against the whitelist.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnsupportedMime`] if `raw` is not one of the
    /// whitelisted types.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let normalized = raw.split(';').next().unwrap_or(raw).trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| {
                CoreError::new(
                    ErrorKind::UnsupportedMime,
                    format!("unsupported mime type: {raw}"),
                )
            })
    }
}

impl fmt::Display for SupportedMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
