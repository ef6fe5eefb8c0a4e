use crate::extraction::RawChar;
use crate::types::{BoundingBox, TextRun};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

const FALLBACK_FONT_SIZE: f32 = 12.0;
const UNKNOWN_FAMILY: &str = "Unknown";

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)bold").expect("static regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)italic").expect("static regex"));
static OBLIQUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)oblique").expect("static regex"));

/// Turns extractor characters into clean text runs
pub trait RunNormalizer {
    /// Normalize one character; `None` drops it (invisible whitespace)
    fn normalize(&self, raw: &RawChar) -> Option<TextRun>;

    /// Normalize every character of a page and put the runs in reading order
    fn normalize_page(&self, chars: &[RawChar]) -> Vec<TextRun> {
        let mut runs: Vec<TextRun> = chars.iter().filter_map(|c| self.normalize(c)).collect();
        // Extraction order is not guaranteed to be reading order
        runs.sort_by(|a, b| {
            a.bbox
                .y0
                .partial_cmp(&b.bbox.y0)
                .unwrap_or(Ordering::Equal)
                .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal))
        });
        runs
    }

    fn name(&self) -> &str;
}

/// Default normalizer: one run per visible character
#[derive(Debug, Default, Clone)]
pub struct FontNameNormalizer;

impl FontNameNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl RunNormalizer for FontNameNormalizer {
    fn normalize(&self, raw: &RawChar) -> Option<TextRun> {
        // A lone space is kept as a word separator; other whitespace is noise
        if raw.text.trim().is_empty() && raw.text != " " {
            return None;
        }

        let style = clean_font_name(&raw.fontname);
        let font_size = if raw.size.is_finite() && raw.size > 0.0 {
            raw.size
        } else {
            FALLBACK_FONT_SIZE
        };

        Some(TextRun {
            text: raw.text.clone(),
            font_family: style.family,
            font_size,
            is_bold: style.is_bold,
            is_italic: style.is_italic,
            bbox: BoundingBox::new(raw.x0, raw.top, raw.x1, raw.bottom),
        })
    }

    fn name(&self) -> &str {
        "font-name"
    }
}

/// Result of splitting a raw font name into family and style flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontStyle {
    pub family: String,
    pub is_bold: bool,
    pub is_italic: bool,
}

/// Strip the subset tag and style suffixes from a raw font name.
///
/// `"ABCDEF+Arial-BoldMT"` becomes family `"Arial M T"` with `is_bold` set:
/// the trailing split inserts a space before every internal capital, which
/// is lossy for names like "MT" but keeps merged family names readable.
pub fn clean_font_name(raw: &str) -> FontStyle {
    let base = raw.rsplit('+').next().unwrap_or(raw);
    let mut family = base.to_string();

    let is_bold = BOLD.is_match(&family);
    if is_bold {
        family = BOLD.replace_all(&family, "").into_owned();
    }

    let mut is_italic = false;
    for pattern in [&*ITALIC, &*OBLIQUE] {
        if pattern.is_match(&family) {
            is_italic = true;
            family = pattern.replace_all(&family, "").into_owned();
        }
    }

    if is_bold || is_italic {
        family = family.replace('-', "");
    }

    let family = family.trim().trim_matches(',').trim();
    let family = split_merged_name(family);

    FontStyle {
        family: if family.is_empty() {
            UNKNOWN_FAMILY.to_string()
        } else {
            family
        },
        is_bold,
        is_italic,
    }
}

/// "TimesNewRoman" -> "Times New Roman". Names that already contain spaces
/// or start lowercase are returned unchanged.
fn split_merged_name(name: &str) -> String {
    let starts_upper = name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false);
    if !starts_upper || name.contains(char::is_whitespace) {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            out.push(' ');
        }
        out.push(c);
    }
    out
}
