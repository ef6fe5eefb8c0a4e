// Character extraction boundary
//
// Extractors turn a source document into per-page character lists with font
// and position data. Everything after this point works with `RawDocument` and
// is format-agnostic: layout reconstruction never sees the original bytes.

use crate::types::DocumentMetadata;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_font_name() -> String {
    "Unknown".to_string()
}

fn default_font_size() -> f32 {
    12.0
}

/// One glyph as reported by the extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChar {
    #[serde(default)]
    pub text: String,
    /// Raw font name, possibly with a subset tag ("ABCDEF+Arial-BoldMT")
    #[serde(default = "default_font_name", alias = "font_name")]
    pub fontname: String,
    #[serde(default = "default_font_size")]
    pub size: f32,
    #[serde(default, alias = "left")]
    pub x0: f32,
    #[serde(default)]
    pub top: f32,
    #[serde(default, alias = "right")]
    pub x1: f32,
    #[serde(default)]
    pub bottom: f32,
}

impl RawChar {
    pub fn new(text: &str, fontname: &str, size: f32, x0: f32, top: f32, x1: f32, bottom: f32) -> Self {
        Self {
            text: text.to_string(),
            fontname: fontname.to_string(),
            size,
            x0,
            top,
            x1,
            bottom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    /// 1-based page number; the page's position is used when absent
    #[serde(default)]
    pub page_number: Option<u32>,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub chars: Vec<RawChar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub pages: Vec<RawPage>,
}

/// CharacterExtractor trait - converts document bytes to raw characters
///
/// Implementations own the format-specific parsing (PDF content streams,
/// pre-extracted dumps, ...). They must report every glyph with its font
/// name, size and box; filtering and normalization happen downstream.
pub trait CharacterExtractor {
    /// Parse document bytes into pages of raw characters
    fn extract(&self, bytes: &[u8]) -> Result<RawDocument>;

    /// Convenience method: read the file and extract its bytes
    fn extract_file(&self, input: &Path) -> Result<RawDocument> {
        let bytes = std::fs::read(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        self.extract(&bytes)
    }

    /// Extractor name for debugging/logging
    fn name(&self) -> &str;

    /// Check if extractor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}

/// Reads a character dump produced by an external PDF extractor.
///
/// The expected shape is `{"metadata": {...}, "pages": [{"page_number", "width",
/// "height", "chars": [{"text", "fontname", "size", "x0", "top", "x1", "bottom"}]}]}`.
#[derive(Debug, Default, Clone)]
pub struct JsonCharacterExtractor;

impl JsonCharacterExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl CharacterExtractor for JsonCharacterExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<RawDocument> {
        let document: RawDocument =
            serde_json::from_slice(bytes).context("Invalid character dump")?;
        log::debug!(
            "{} extracted {} pages, {} chars",
            self.name(),
            document.pages.len(),
            document.pages.iter().map(|p| p.chars.len()).sum::<usize>()
        );
        Ok(document)
    }

    fn name(&self) -> &str {
        "json-chars"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}
