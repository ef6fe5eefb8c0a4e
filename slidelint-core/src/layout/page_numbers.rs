use crate::config::PageNumberConfig;
use crate::types::{BoundingBox, PageNumberPosition, PageNumberSequence, Slide};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}$").expect("static regex"));
static FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}\s*[/\\\-]\s*\d{1,3}$").expect("static regex"));
static X_OF_Y: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\d{1,3}\s+из\s+\d{1,3}$").expect("static regex"));
static FIRST_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

// Format classification for statistics; looser than candidate matching
static FORMAT_SIMPLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("static regex"));
static FORMAT_FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[/\\\-]\d+$").expect("static regex"));
static FORMAT_X_OF_Y: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s+из\s+\d+$").expect("static regex"));
static FORMAT_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[(\[]\d+[)\]]$").expect("static regex"));
static FORMAT_WITH_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.$").expect("static regex"));

/// Fractional page rectangles (x_min, y_min, x_max, y_max) where labels may live
const CANDIDATE_ZONES: [(f32, f32, f32, f32); 6] = [
    (0.7, 0.9, 1.0, 1.0),
    (0.4, 0.9, 0.6, 1.0),
    (0.0, 0.9, 0.3, 1.0),
    (0.7, 0.0, 1.0, 0.1),
    (0.4, 0.0, 0.6, 0.1),
    (0.0, 0.0, 0.3, 0.1),
];

/// (x_min, x_max, y_min, y_max, weight); first match wins
const POSITION_WEIGHTS: [(f32, f32, f32, f32, f32); 6] = [
    (0.85, 1.0, 0.85, 1.0, 1.0),
    (0.4, 0.6, 0.9, 1.0, 0.8),
    (0.0, 0.15, 0.85, 1.0, 0.7),
    (0.85, 1.0, 0.0, 0.15, 0.6),
    (0.4, 0.6, 0.0, 0.15, 0.5),
    (0.0, 0.15, 0.0, 0.15, 0.4),
];
const FALLBACK_WEIGHT: f32 = 0.1;

/// Finds page-number labels across a whole document
pub trait PageNumberDetector {
    /// Tag every slide's best label and validate continuity across slides.
    /// Must run after all slides are fully structured.
    fn detect_page_numbers(&self, slides: &mut [Slide]) -> PageNumberSequence;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageNumberCandidate {
    pub text: String,
    pub confidence: f32,
    pub position: PageNumberPosition,
    pub bbox: BoundingBox,
}

/// Scores paragraphs by label pattern, page zone and size
#[derive(Debug, Clone, Default)]
pub struct ZonePageNumberDetector {
    config: PageNumberConfig,
}

impl ZonePageNumberDetector {
    pub fn new(config: PageNumberConfig) -> Self {
        Self { config }
    }

    /// Confidence that `text` at `bbox` is the page's number label.
    /// Returns 0.0 for anything that fails the pattern, zone or size gate.
    pub fn confidence(&self, text: &str, bbox: &BoundingBox, page_width: f32, page_height: f32) -> f32 {
        if page_width <= 0.0 || page_height <= 0.0 {
            return 0.0;
        }
        let Some(pattern_score) = pattern_score(text.trim()) else {
            return 0.0;
        };

        let x = bbox.center_x() / page_width;
        let y = bbox.center_y() / page_height;
        let in_zone = CANDIDATE_ZONES
            .iter()
            .any(|&(x_min, y_min, x_max, y_max)| x >= x_min && x <= x_max && y >= y_min && y <= y_max);
        if !in_zone {
            return 0.0;
        }

        if bbox.width() >= page_width * self.config.max_width_ratio
            || bbox.height() >= page_height * self.config.max_height_ratio
        {
            return 0.0;
        }

        let mut confidence = pattern_score + 0.4 * position_weight(x, y);
        if bbox.height() < page_height * self.config.small_height_ratio {
            confidence += 0.2;
        }
        confidence.min(1.0)
    }

    /// Highest-scoring accepted candidate on one slide; earliest wins ties
    pub fn best_candidate(&self, slide: &Slide) -> Option<PageNumberCandidate> {
        let mut best: Option<PageNumberCandidate> = None;

        for block in &slide.blocks {
            let confidence = self.confidence(&block.text, &block.bbox, slide.width, slide.height);
            if confidence <= 0.0 {
                continue;
            }
            if best.as_ref().map(|b| confidence > b.confidence).unwrap_or(true) {
                best = Some(PageNumberCandidate {
                    text: block.text.trim().to_string(),
                    confidence,
                    position: resolve_position(&block.bbox, slide.width, slide.height),
                    bbox: block.bbox,
                });
            }
        }

        best.filter(|candidate| candidate.confidence > self.config.acceptance_threshold)
    }
}

impl PageNumberDetector for ZonePageNumberDetector {
    fn detect_page_numbers(&self, slides: &mut [Slide]) -> PageNumberSequence {
        for slide in slides.iter_mut() {
            if let Some(candidate) = self.best_candidate(slide) {
                log::debug!(
                    "Page {}: label '{}' at {} (confidence {:.2})",
                    slide.page_number,
                    candidate.text,
                    candidate.position,
                    candidate.confidence
                );
                slide.detected_page_number = Some(candidate.text);
                slide.page_number_position = candidate.position;
                slide.page_number_bbox = Some(candidate.bbox);
            }
        }

        let numbers: Vec<u32> = slides
            .iter()
            .filter_map(|slide| slide.detected_page_number.as_deref())
            .filter_map(first_integer)
            .collect();
        let sequence = check_sequence(numbers);
        if !sequence.contiguous {
            log::warn!("Page numbering is not contiguous: {:?}", sequence.numbers);
        }
        sequence
    }

    fn name(&self) -> &str {
        "zone-page-numbers"
    }
}

fn pattern_score(text: &str) -> Option<f32> {
    if BARE_NUMBER.is_match(text) {
        Some(0.4)
    } else if FRACTION.is_match(text) {
        Some(0.3)
    } else if X_OF_Y.is_match(text) {
        Some(0.2)
    } else {
        None
    }
}

fn position_weight(x: f32, y: f32) -> f32 {
    POSITION_WEIGHTS
        .iter()
        .find(|&&(x_min, x_max, y_min, y_max, _)| x >= x_min && x <= x_max && y >= y_min && y <= y_max)
        .map(|&(.., weight)| weight)
        .unwrap_or(FALLBACK_WEIGHT)
}

/// Label position from the bbox center: lower 30% of the page is "bottom",
/// everything above is "top". Never yields `Corner`.
pub fn resolve_position(bbox: &BoundingBox, page_width: f32, page_height: f32) -> PageNumberPosition {
    let x = bbox.center_x() / page_width;
    let y = bbox.center_y() / page_height;

    match (y > 0.7, x > 0.7, x < 0.3) {
        (true, true, _) => PageNumberPosition::BottomRight,
        (true, _, true) => PageNumberPosition::BottomLeft,
        (true, _, _) => PageNumberPosition::BottomCenter,
        (false, true, _) => PageNumberPosition::TopRight,
        (false, _, true) => PageNumberPosition::TopLeft,
        (false, _, _) => PageNumberPosition::TopCenter,
    }
}

/// First run of digits in a label: "3 / 10" -> 3
pub fn first_integer(label: &str) -> Option<u32> {
    FIRST_INTEGER
        .find(label)
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Contiguous means the numbers, in page order, are exactly min..=max.
/// Fewer than two numbers is trivially contiguous.
pub fn check_sequence(numbers: Vec<u32>) -> PageNumberSequence {
    let contiguous = match (numbers.iter().min(), numbers.iter().max()) {
        (Some(&min), Some(&max)) if numbers.len() >= 2 => numbers.iter().copied().eq(min..=max),
        _ => true,
    };
    PageNumberSequence { numbers, contiguous }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageNumberFormat {
    SimpleNumber,
    Fraction,
    XOfY,
    Brackets,
    WithDot,
    Other,
}

pub fn classify_format(label: &str) -> PageNumberFormat {
    let clean = label.trim();
    if FORMAT_SIMPLE.is_match(clean) {
        PageNumberFormat::SimpleNumber
    } else if FORMAT_FRACTION.is_match(clean) {
        PageNumberFormat::Fraction
    } else if FORMAT_X_OF_Y.is_match(clean) {
        PageNumberFormat::XOfY
    } else if FORMAT_BRACKETS.is_match(clean) {
        PageNumberFormat::Brackets
    } else if FORMAT_WITH_DOT.is_match(clean) {
        PageNumberFormat::WithDot
    } else {
        PageNumberFormat::Other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNumberStatistics {
    pub total_slides: usize,
    pub slides_with_page_numbers: usize,
    pub coverage_percentage: f64,
    /// Every position is present, zero when unused
    pub position_distribution: BTreeMap<PageNumberPosition, usize>,
    pub format_distribution: BTreeMap<PageNumberFormat, usize>,
}

impl PageNumberStatistics {
    pub fn collect(slides: &[Slide]) -> Self {
        let mut position_distribution: BTreeMap<PageNumberPosition, usize> =
            PageNumberPosition::ALL.iter().map(|&p| (p, 0)).collect();
        let mut format_distribution = BTreeMap::new();
        let mut numbered = 0;

        for slide in slides {
            let Some(label) = slide.detected_page_number.as_deref() else {
                continue;
            };
            numbered += 1;
            *position_distribution.entry(slide.page_number_position).or_insert(0) += 1;
            *format_distribution.entry(classify_format(label)).or_insert(0) += 1;
        }

        let coverage_percentage = if slides.is_empty() {
            0.0
        } else {
            numbered as f64 / slides.len() as f64 * 100.0
        };

        Self {
            total_slides: slides.len(),
            slides_with_page_numbers: numbered,
            coverage_percentage,
            position_distribution,
            format_distribution,
        }
    }
}
