use crate::config::ListDetectionConfig;
use crate::types::{ListType, Paragraph};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBERED_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"^\d+\.", r"^\d+\)", r"^\(\d+\)"]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("static regex"))
        .collect()
});

static ROMAN_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ivxlcdmIVXLCDM]+)[.)](\s|$)").expect("static regex"));
static ALPHA_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][.)](\s|$)").expect("static regex"));
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

/// Classifies paragraphs as list items and records their marker and depth
pub trait ListStructureDetector {
    /// Mutates the paragraph in place when its text starts with a list marker
    fn detect(&self, paragraph: &mut Paragraph);

    fn detect_all(&self, paragraphs: &mut [Paragraph]) {
        for paragraph in paragraphs.iter_mut() {
            self.detect(paragraph);
        }
    }

    fn name(&self) -> &str;
}

/// A recognized leading marker and the text that follows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker {
    pub list_type: ListType,
    pub prefix: String,
    pub remainder: String,
}

#[derive(Debug, Clone, Default)]
pub struct MarkerListDetector {
    config: ListDetectionConfig,
}

impl MarkerListDetector {
    pub fn new(config: ListDetectionConfig) -> Self {
        Self { config }
    }

    /// Match the left-trimmed text against bullet symbols, then numbered
    /// patterns, then (when enabled) roman and lettered markers.
    pub fn classify(&self, text: &str) -> Option<ListMarker> {
        let stripped = text.trim_start();
        let first = stripped.chars().next()?;

        if self
            .config
            .bullet_symbols
            .iter()
            .any(|symbol| !symbol.is_empty() && stripped.starts_with(symbol.as_str()))
        {
            return Some(ListMarker {
                list_type: ListType::Bullet,
                prefix: first.to_string(),
                remainder: stripped[first.len_utf8()..].trim().to_string(),
            });
        }

        for pattern in NUMBERED_PATTERNS.iter() {
            if let Some(found) = pattern.find(stripped) {
                return Some(marker(ListType::Numbered, stripped, found.end()));
            }
        }

        if self.config.detect_alpha_roman {
            return classify_alpha_roman(stripped);
        }
        None
    }

    /// Nesting depth from the paragraph's left edge
    pub fn indentation_level(&self, x0: f32) -> u32 {
        if x0 >= self.config.level_two_x {
            2
        } else if x0 >= self.config.level_one_x {
            1
        } else {
            0
        }
    }
}

impl ListStructureDetector for MarkerListDetector {
    fn detect(&self, paragraph: &mut Paragraph) {
        let Some(found) = self.classify(&paragraph.text) else {
            return;
        };

        paragraph.list_number = if found.list_type == ListType::Numbered {
            extract_list_number(&found.prefix)
        } else {
            None
        };
        paragraph.level = self.indentation_level(paragraph.bbox.x0);
        paragraph.list_type = found.list_type;
        paragraph.list_prefix = found.prefix;
        paragraph.text = found.remainder;
    }

    fn name(&self) -> &str {
        "marker-lists"
    }
}

fn marker(list_type: ListType, stripped: &str, prefix_end: usize) -> ListMarker {
    ListMarker {
        list_type,
        prefix: stripped[..prefix_end].to_string(),
        remainder: stripped[prefix_end..].trim().to_string(),
    }
}

// A single letter that is also a roman digit ("c.", "v)") is read as a
// letter, except "i"/"I" which almost always opens a roman list.
fn classify_alpha_roman(stripped: &str) -> Option<ListMarker> {
    if let Some(caps) = ROMAN_MARKER.captures(stripped) {
        let numeral = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        if numeral.len() > 1 || numeral.eq_ignore_ascii_case("i") {
            return Some(marker(ListType::Roman, stripped, numeral.len() + 1));
        }
    }

    if ALPHA_MARKER.is_match(stripped) {
        return Some(marker(ListType::Alpha, stripped, 2));
    }
    None
}

/// First run of digits inside a numbered marker: "(12)" -> 12
pub fn extract_list_number(prefix: &str) -> Option<u32> {
    DIGITS
        .find(prefix)
        .and_then(|digits| digits.as_str().parse().ok())
}
