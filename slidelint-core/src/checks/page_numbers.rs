use super::{CheckType, Verdict};
use crate::error::RuleError;
use crate::layout::page_numbers::first_integer;
use crate::types::{PageNumberPosition, Presentation, Slide};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageNumbersDocumentParams {
    /// Required share of numbered slides, as a fraction in 0..=1
    pub min_coverage: f64,
    /// Largest allowed jump between consecutive labels
    pub max_gap: u32,
}

impl Default for PageNumbersDocumentParams {
    fn default() -> Self {
        Self {
            min_coverage: 1.0,
            max_gap: 5,
        }
    }
}

impl PageNumbersDocumentParams {
    pub(crate) fn validate(&self, check: CheckType) -> Result<(), RuleError> {
        if !(0.0..=1.0).contains(&self.min_coverage) {
            return Err(RuleError::InvalidParams {
                check: check.identifier().to_string(),
                reason: format!(
                    "min_coverage must be a fraction between 0 and 1, got {}",
                    self.min_coverage
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageNumbersPageParams {
    pub required: bool,
    /// Any detected position is accepted when absent
    pub allowed_positions: Option<Vec<PageNumberPosition>>,
}

impl Default for PageNumbersPageParams {
    fn default() -> Self {
        Self {
            required: true,
            allowed_positions: None,
        }
    }
}

pub fn document_page_numbers(params: &PageNumbersDocumentParams, document: &Presentation) -> Verdict {
    let total = document.slides.len();
    if total == 0 {
        return Verdict::pass("no slides to check");
    }

    let labels: Vec<&str> = document
        .slides
        .iter()
        .filter_map(|slide| slide.detected_page_number.as_deref())
        .collect();
    let coverage = labels.len() as f64 / total as f64;

    if coverage < params.min_coverage {
        return Verdict::fail(format!(
            "Low page-number coverage: {:.1}% ({}/{} slides), at least {:.0}% required",
            coverage * 100.0,
            labels.len(),
            total,
            params.min_coverage * 100.0
        ));
    }

    let numbers: Vec<u32> = labels.iter().filter_map(|label| first_integer(label)).collect();
    if let Some(issue) = sequence_issue(&numbers, params.max_gap) {
        return Verdict::fail(issue);
    }

    Verdict::pass(format!(
        "Page-number coverage {:.1}% ({}/{} slides), sequence is consistent",
        coverage * 100.0,
        labels.len(),
        total
    ))
}

fn sequence_issue(numbers: &[u32], max_gap: u32) -> Option<String> {
    if numbers.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Some("Page numbers do not form an increasing sequence".to_string());
    }
    numbers
        .windows(2)
        .find(|pair| pair[1] - pair[0] > max_gap)
        .map(|pair| format!("Large gap in page numbering: between {} and {}", pair[0], pair[1]))
}

pub fn page_number(params: &PageNumbersPageParams, slide: &Slide) -> Verdict {
    if !params.required {
        return Verdict::pass("page number not required");
    }

    let Some(label) = slide.detected_page_number.as_deref() else {
        return Verdict::fail("page number missing");
    };
    if first_integer(label).is_none() {
        return Verdict::fail(format!("page number '{}' has an invalid format", label));
    }

    let position = slide.page_number_position;
    let position_ok = match &params.allowed_positions {
        Some(allowed) => allowed.contains(&position),
        None => position != PageNumberPosition::None,
    };
    if !position_ok {
        return Verdict::fail(format!("page number '{}' is at a non-standard position ({})", label, position));
    }

    Verdict::pass(format!("page number '{}' is correct", label))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(page: u32, label: Option<&str>, position: PageNumberPosition) -> Slide {
        let mut slide = Slide::new(page, 960.0, 540.0);
        slide.detected_page_number = label.map(str::to_string);
        slide.page_number_position = position;
        slide
    }

    fn document(labels: &[Option<&str>]) -> Presentation {
        Presentation::new(
            labels
                .iter()
                .enumerate()
                .map(|(i, label)| numbered(i as u32 + 1, *label, PageNumberPosition::BottomRight))
                .collect(),
        )
    }

    #[test]
    fn test_full_coverage_and_sequence() {
        let doc = document(&[Some("1"), Some("2"), Some("3")]);
        assert!(document_page_numbers(&PageNumbersDocumentParams::default(), &doc).is_pass());
    }

    #[test]
    fn test_low_coverage() {
        let doc = document(&[Some("1"), None, Some("3"), None]);
        let verdict = document_page_numbers(&PageNumbersDocumentParams::default(), &doc);
        assert_eq!(
            verdict.message,
            "Low page-number coverage: 50.0% (2/4 slides), at least 100% required"
        );

        let relaxed = PageNumbersDocumentParams { min_coverage: 0.5, ..Default::default() };
        assert!(document_page_numbers(&relaxed, &doc).is_pass());
    }

    #[test]
    fn test_sequence_problems() {
        let params = PageNumbersDocumentParams::default();
        let backwards = document(&[Some("2"), Some("1")]);
        assert!(document_page_numbers(&params, &backwards).message.contains("increasing"));

        let gap = document(&[Some("1"), Some("9")]);
        assert!(document_page_numbers(&params, &gap).message.contains("between 1 and 9"));
    }

    #[test]
    fn test_empty_document_passes() {
        assert!(document_page_numbers(&PageNumbersDocumentParams::default(), &document(&[])).is_pass());
    }

    #[test]
    fn test_min_coverage_must_be_fraction() {
        let params = PageNumbersDocumentParams { min_coverage: 80.0, ..Default::default() };
        assert!(params.validate(CheckType::PageNumbers).is_err());
    }

    #[test]
    fn test_page_level() {
        let params = PageNumbersPageParams::default();
        assert!(page_number(&params, &numbered(1, Some("1"), PageNumberPosition::BottomRight)).is_pass());
        assert_eq!(
            page_number(&params, &numbered(1, None, PageNumberPosition::None)).message,
            "page number missing"
        );

        let only_bottom_right = PageNumbersPageParams {
            allowed_positions: Some(vec![PageNumberPosition::BottomRight]),
            ..Default::default()
        };
        let top = numbered(2, Some("2"), PageNumberPosition::TopLeft);
        assert!(!page_number(&only_bottom_right, &top).is_pass());
        assert!(page_number(&params, &top).is_pass());
    }

    #[test]
    fn test_allowed_positions_from_yaml() {
        let params: PageNumbersPageParams =
            serde_yaml::from_str("allowed_positions: [bottom_right, bottom_center]").unwrap();
        assert_eq!(
            params.allowed_positions,
            Some(vec![PageNumberPosition::BottomRight, PageNumberPosition::BottomCenter])
        );
        assert!(params.required);
    }
}
