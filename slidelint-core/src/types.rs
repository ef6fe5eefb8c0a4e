use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ===== GEOMETRY =====
// Page coordinates follow the extractor: x grows to the right, y grows
// downwards from the top edge of the page. No unit conversion is applied.

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    /// Build a box from four edges, reordering them so that x0 <= x1 and y0 <= y1.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

// ===== TEXT MODEL =====

/// A minimal fragment of text sharing one font, style and position.
/// Produced by the run normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    /// Family name with subset tag and style suffixes removed
    pub font_family: String,
    pub font_size: f32,
    pub is_bold: bool,
    pub is_italic: bool,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListType {
    #[default]
    None,
    Bullet,
    Numbered,
    Alpha,
    Roman,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::None => "none",
            ListType::Bullet => "bullet",
            ListType::Numbered => "numbered",
            ListType::Alpha => "alpha",
            ListType::Roman => "roman",
        }
    }

    /// Human-readable adjective used in diagnostics ("bulleted list", ...)
    pub fn label(&self) -> &'static str {
        match self {
            ListType::None => "unknown",
            ListType::Bullet => "bulleted",
            ListType::Numbered => "numbered",
            ListType::Alpha => "lettered",
            ListType::Roman => "roman",
        }
    }

    /// Numbered, lettered and roman lists are all "ordered" lists
    pub fn is_ordered(&self) -> bool {
        matches!(self, ListType::Numbered | ListType::Alpha | ListType::Roman)
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reading-order group of lines treated as one logical block.
///
/// Created by the paragraph grouper; the list detector may later strip a
/// marker from `text` and fill in the list fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub runs: Vec<TextRun>,
    pub list_type: ListType,
    /// Nesting depth, only meaningful when `list_type` is not `None`
    pub level: u32,
    /// Ordinal of a numbered item ("3." -> 3)
    pub list_number: Option<u32>,
    /// Raw marker string, empty for plain paragraphs
    pub list_prefix: String,
    pub bbox: BoundingBox,
}

impl Paragraph {
    /// Build a plain paragraph from runs in reading order.
    /// Text is concatenated without separators: extraction already carries spaces.
    pub fn from_runs(runs: Vec<TextRun>) -> Self {
        let text: String = runs.iter().map(|run| run.text.as_str()).collect();
        let bbox = runs
            .iter()
            .map(|run| run.bbox)
            .reduce(|acc, bbox| acc.union(&bbox))
            .unwrap_or_default();

        Self {
            text,
            runs,
            list_type: ListType::None,
            level: 0,
            list_number: None,
            list_prefix: String::new(),
            bbox,
        }
    }

    pub fn is_list_item(&self) -> bool {
        self.list_type != ListType::None
    }
}

// ===== PAGES =====

/// Where a detected page-number label sits on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageNumberPosition {
    #[default]
    None,
    BottomRight,
    BottomCenter,
    BottomLeft,
    TopRight,
    TopCenter,
    TopLeft,
    Corner,
}

impl PageNumberPosition {
    pub const ALL: [PageNumberPosition; 8] = [
        PageNumberPosition::None,
        PageNumberPosition::BottomRight,
        PageNumberPosition::BottomCenter,
        PageNumberPosition::BottomLeft,
        PageNumberPosition::TopRight,
        PageNumberPosition::TopCenter,
        PageNumberPosition::TopLeft,
        PageNumberPosition::Corner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageNumberPosition::None => "none",
            PageNumberPosition::BottomRight => "bottom_right",
            PageNumberPosition::BottomCenter => "bottom_center",
            PageNumberPosition::BottomLeft => "bottom_left",
            PageNumberPosition::TopRight => "top_right",
            PageNumberPosition::TopCenter => "top_center",
            PageNumberPosition::TopLeft => "top_left",
            PageNumberPosition::Corner => "corner",
        }
    }
}

impl fmt::Display for PageNumberPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of the document (a slide, for presentation exports).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based, assigned at extraction time and never renumbered
    pub page_number: u32,
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<Paragraph>,
    pub detected_page_number: Option<String>,
    pub page_number_position: PageNumberPosition,
    pub page_number_bbox: Option<BoundingBox>,
}

impl Slide {
    pub fn new(page_number: u32, width: f32, height: f32) -> Self {
        Self {
            page_number,
            width,
            height,
            blocks: Vec::new(),
            detected_page_number: None,
            page_number_position: PageNumberPosition::None,
            page_number_bbox: None,
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<Paragraph>) -> Self {
        self.blocks = blocks;
        self
    }

    /// All runs on the page in reading order
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.blocks.iter().flat_map(|block| block.runs.iter())
    }

    /// Paragraph texts joined with single spaces
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn list_items(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter(|block| block.is_list_item())
    }
}

// ===== DOCUMENT =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub page_count: u32,
}

/// Usage of one raw font name across the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontUsage {
    /// Size of the first character seen in this font
    pub size: f32,
    pub pages: BTreeSet<u32>,
    pub char_count: usize,
}

/// Leading integers of every detected page-number label, in page order,
/// and whether they form a contiguous ascending run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNumberSequence {
    pub numbers: Vec<u32>,
    pub contiguous: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    /// Ordered by page number, no duplicates
    pub slides: Vec<Slide>,
    pub metadata: DocumentMetadata,
    /// Keyed by the raw font name reported by the extractor
    pub fonts_used: BTreeMap<String, FontUsage>,
    /// Filled by the page-number pass once every page is structured
    pub page_number_sequence: Option<PageNumberSequence>,
}

impl Presentation {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self {
            slides,
            ..Default::default()
        }
    }

    pub fn slide(&self, page_number: u32) -> Option<&Slide> {
        self.slides
            .iter()
            .find(|slide| slide.page_number == page_number)
    }

    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.slides.iter().flat_map(|slide| slide.runs())
    }

    /// Every paragraph's text, one per line
    pub fn all_text(&self) -> String {
        self.slides
            .iter()
            .flat_map(|slide| slide.blocks.iter())
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn all_lists(&self) -> Vec<&Paragraph> {
        self.slides
            .iter()
            .flat_map(|slide| slide.list_items())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> TextRun {
        TextRun {
            text: text.to_string(),
            font_family: "Arial".to_string(),
            font_size: 12.0,
            is_bold: false,
            is_italic: false,
            bbox: BoundingBox::new(x0, y0, x1, y1),
        }
    }

    #[test]
    fn test_bounding_box_reorders_edges() {
        let bbox = BoundingBox::new(10.0, 20.0, 5.0, 2.0);
        assert_eq!(bbox, BoundingBox { x0: 5.0, y0: 2.0, x1: 10.0, y1: 20.0 });
        assert_eq!(bbox.width(), 5.0);
        assert_eq!(bbox.height(), 18.0);
    }

    #[test]
    fn test_paragraph_from_runs_concatenates_and_unions() {
        let paragraph = Paragraph::from_runs(vec![
            run("Hel", 10.0, 10.0, 20.0, 22.0),
            run("lo ", 20.0, 11.0, 30.0, 21.0),
            run("world", 12.0, 30.0, 50.0, 42.0),
        ]);

        assert_eq!(paragraph.text, "Hello world");
        assert_eq!(paragraph.bbox, BoundingBox::new(10.0, 10.0, 50.0, 42.0));
        assert_eq!(paragraph.list_type, ListType::None);
        assert!(paragraph.list_prefix.is_empty());
    }

    #[test]
    fn test_presentation_lookup_and_text() {
        let slide_one = Slide::new(1, 800.0, 600.0)
            .with_blocks(vec![Paragraph::from_runs(vec![run("Intro", 0.0, 0.0, 10.0, 10.0)])]);
        let slide_two = Slide::new(2, 800.0, 600.0)
            .with_blocks(vec![Paragraph::from_runs(vec![run("Body", 0.0, 0.0, 10.0, 10.0)])]);
        let presentation = Presentation::new(vec![slide_one, slide_two]);

        assert_eq!(presentation.slide(2).map(|s| s.page_number), Some(2));
        assert!(presentation.slide(3).is_none());
        assert_eq!(presentation.all_text(), "Intro\nBody");
        assert!(presentation.all_lists().is_empty());
    }
}
