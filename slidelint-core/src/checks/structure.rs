use super::fonts::LimitParams;
use super::Verdict;
use crate::types::{Presentation, Slide};
use serde::{Deserialize, Serialize};

/// A heading's average run size must exceed the body's by this factor
const HEADING_SIZE_RATIO: f32 = 1.2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlidesCountParams {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingPresenceParams {
    pub required: bool,
}

impl Default for HeadingPresenceParams {
    fn default() -> Self {
        Self { required: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDensityParams {
    pub max_total_chars: usize,
    pub max_blocks: usize,
}

impl Default for TextDensityParams {
    fn default() -> Self {
        Self {
            max_total_chars: 1500,
            max_blocks: 10,
        }
    }
}

pub fn slides_count(params: &SlidesCountParams, document: &Presentation) -> Verdict {
    let count = document.slides.len();

    if let Some(min) = params.min.filter(|&min| count < min) {
        return Verdict::fail(format!("Document has {} slides, minimum required is {}", count, min));
    }
    if let Some(max) = params.max.filter(|&max| count > max) {
        return Verdict::fail(format!("Document has {} slides, maximum allowed is {}", count, max));
    }
    Verdict::pass(format!("Document has {} slides, within limits", count))
}

pub fn heading_presence(params: &HeadingPresenceParams, slide: &Slide) -> Verdict {
    if !params.required {
        return Verdict::pass("heading not required");
    }
    if has_heading(slide) {
        Verdict::pass("heading present")
    } else {
        Verdict::fail("heading missing")
    }
}

/// The first block counts as a heading when it is set noticeably larger than
/// everything after it. A lone block is its own heading.
fn has_heading(slide: &Slide) -> bool {
    let Some((first, rest)) = slide.blocks.split_first() else {
        return false;
    };
    if first.runs.is_empty() {
        return false;
    }

    let heading_avg =
        first.runs.iter().map(|run| run.font_size).sum::<f32>() / first.runs.len() as f32;

    let body: Vec<f32> = rest
        .iter()
        .flat_map(|block| block.runs.iter().map(|run| run.font_size))
        .collect();
    if body.is_empty() {
        return true;
    }
    let body_avg = body.iter().sum::<f32>() / body.len() as f32;

    heading_avg > body_avg * HEADING_SIZE_RATIO
}

pub fn elements_count(params: &LimitParams, slide: &Slide) -> Verdict {
    let Some(max) = params.max else {
        return Verdict::pass("no maximum element count configured");
    };
    let count = slide.blocks.len();
    if count > max {
        Verdict::fail(format!("{} text blocks, maximum is {}", count, max))
    } else {
        Verdict::pass(format!("{} text blocks, within limits", count))
    }
}

pub fn text_density(params: &TextDensityParams, slide: &Slide) -> Verdict {
    let total_chars: usize = slide.blocks.iter().map(|b| b.text.chars().count()).sum();
    let blocks = slide.blocks.len();

    let mut issues = Vec::new();
    if total_chars > params.max_total_chars {
        issues.push(format!(
            "too much text ({} characters, maximum {})",
            total_chars, params.max_total_chars
        ));
    }
    if blocks > params.max_blocks {
        issues.push(format!("too many blocks ({}, maximum {})", blocks, params.max_blocks));
    }

    if issues.is_empty() {
        Verdict::pass("text density within limits")
    } else {
        Verdict::fail(issues.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, Paragraph, TextRun};

    fn block(text: &str, size: f32) -> Paragraph {
        Paragraph::from_runs(vec![TextRun {
            text: text.to_string(),
            font_family: "Arial".to_string(),
            font_size: size,
            is_bold: false,
            is_italic: false,
            bbox: BoundingBox::default(),
        }])
    }

    fn slide(blocks: Vec<Paragraph>) -> Slide {
        Slide::new(1, 960.0, 540.0).with_blocks(blocks)
    }

    #[test]
    fn test_slides_count_bounds() {
        let document = Presentation::new(vec![slide(vec![]), slide(vec![])]);
        let within = SlidesCountParams { min: Some(1), max: Some(3) };
        assert!(slides_count(&within, &document).is_pass());

        let too_few = slides_count(&SlidesCountParams { min: Some(5), max: None }, &document);
        assert_eq!(too_few.message, "Document has 2 slides, minimum required is 5");

        let too_many = slides_count(&SlidesCountParams { min: None, max: Some(1) }, &document);
        assert!(!too_many.is_pass());
    }

    #[test]
    fn test_heading_needs_larger_first_block() {
        let params = HeadingPresenceParams::default();
        assert!(heading_presence(&params, &slide(vec![block("Title", 32.0), block("Body", 18.0)])).is_pass());
        assert!(!heading_presence(&params, &slide(vec![block("Title", 20.0), block("Body", 18.0)])).is_pass());
    }

    #[test]
    fn test_heading_edge_cases() {
        let params = HeadingPresenceParams::default();
        assert!(heading_presence(&params, &slide(vec![block("Only", 12.0)])).is_pass());
        assert!(!heading_presence(&params, &slide(vec![])).is_pass());
        assert!(heading_presence(&HeadingPresenceParams { required: false }, &slide(vec![])).is_pass());
    }

    #[test]
    fn test_elements_count() {
        let page = slide(vec![block("a", 12.0), block("b", 12.0), block("c", 12.0)]);
        assert!(elements_count(&LimitParams { max: Some(3) }, &page).is_pass());
        assert!(!elements_count(&LimitParams { max: Some(2) }, &page).is_pass());
        assert!(elements_count(&LimitParams::default(), &page).is_pass());
    }

    #[test]
    fn test_text_density() {
        let page = slide(vec![block(&"x".repeat(40), 12.0), block("y", 12.0)]);
        let params = TextDensityParams { max_total_chars: 30, max_blocks: 1 };
        let verdict = text_density(&params, &page);
        assert!(!verdict.is_pass());
        assert!(verdict.message.contains("41 characters"));
        assert!(verdict.message.contains("too many blocks"));
        assert!(text_density(&TextDensityParams::default(), &page).is_pass());
    }
}
