use super::Verdict;
use crate::types::TextRun;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Upper bound on a count; no bound means the check always passes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitParams {
    pub max: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontMinSizeParams {
    pub min: Option<f32>,
    /// Display unit only, sizes are compared as extracted
    pub unit: String,
}

impl Default for FontMinSizeParams {
    fn default() -> Self {
        Self {
            min: None,
            unit: "pt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UppercasePercentParams {
    /// Percentage in 0..=100
    pub max: Option<f64>,
}

pub fn font_count<'a>(params: &LimitParams, runs: impl Iterator<Item = &'a TextRun>) -> Verdict {
    let families: BTreeSet<&str> = runs
        .map(|run| run.font_family.as_str())
        .filter(|family| !family.is_empty())
        .collect();
    let count = families.len();

    match params.max {
        Some(max) if count > max => Verdict::fail(format!(
            "{} font families used ({}), maximum allowed is {}",
            count,
            families.into_iter().collect::<Vec<_>>().join(", "),
            max
        )),
        _ => Verdict::pass(format!("{} font families used, within limits", count)),
    }
}

pub fn font_sizes_count<'a>(params: &LimitParams, runs: impl Iterator<Item = &'a TextRun>) -> Verdict {
    // Sizes are compared exactly as extracted
    let sizes: BTreeSet<u32> = runs.map(|run| run.font_size.to_bits()).collect();
    let count = sizes.len();

    match params.max {
        Some(max) if count > max => Verdict::fail(format!(
            "{} distinct font sizes used, maximum allowed is {}",
            count, max
        )),
        _ => Verdict::pass(format!("{} distinct font sizes used, within limits", count)),
    }
}

/// `runs` carries the page number of every run so affected slides can be counted
pub fn font_min_size<'a>(
    params: &FontMinSizeParams,
    runs: impl Iterator<Item = (u32, &'a TextRun)>,
) -> Verdict {
    let Some(min) = params.min else {
        return Verdict::pass("No minimum font size configured");
    };
    let unit = &params.unit;

    let mut smallest: Option<f32> = None;
    let mut pages = BTreeSet::new();
    for (page, run) in runs {
        if run.font_size < min {
            smallest = Some(smallest.map_or(run.font_size, |s| s.min(run.font_size)));
            pages.insert(page);
        }
    }

    match smallest {
        Some(found) => Verdict::fail(format!(
            "Found fonts smaller than {}{}: smallest is {}{} on {} slide(s)",
            min,
            unit,
            found,
            unit,
            pages.len()
        )),
        None => Verdict::pass(format!("All fonts are at least {}{}", min, unit)),
    }
}

pub fn uppercase_percent(params: &UppercasePercentParams, text: &str) -> Verdict {
    let Some(max) = params.max else {
        return Verdict::pass("No maximum uppercase percentage configured");
    };

    let (letters, upper) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(letters, upper), c| {
            (letters + 1, upper + usize::from(c.is_uppercase()))
        });
    if letters == 0 {
        return Verdict::pass("No letters to check");
    }

    let percent = upper as f64 / letters as f64 * 100.0;
    if percent > max {
        Verdict::fail(format!("Uppercase letters make up {:.1}%, maximum is {}%", percent, max))
    } else {
        Verdict::pass(format!("Uppercase letters make up {:.1}%, within limits", percent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn run(family: &str, size: f32) -> TextRun {
        TextRun {
            text: "x".to_string(),
            font_family: family.to_string(),
            font_size: size,
            is_bold: false,
            is_italic: false,
            bbox: BoundingBox::default(),
        }
    }

    #[test]
    fn test_font_count_over_limit_names_both_numbers() {
        let runs = vec![run("Arial", 12.0), run("Calibri", 12.0), run("Georgia", 12.0), run("Verdana", 12.0)];
        let verdict = font_count(&LimitParams { max: Some(3) }, runs.iter());
        assert!(!verdict.is_pass());
        assert!(verdict.message.contains('4'));
        assert!(verdict.message.contains('3'));
    }

    #[test]
    fn test_font_count_without_limit_passes() {
        let runs = vec![run("Arial", 12.0), run("Calibri", 12.0)];
        assert!(font_count(&LimitParams::default(), runs.iter()).is_pass());
    }

    #[test]
    fn test_font_sizes_count_distinguishes_exact_sizes() {
        let runs = vec![run("Arial", 12.0), run("Arial", 12.5), run("Arial", 12.0)];
        assert!(font_sizes_count(&LimitParams { max: Some(2) }, runs.iter()).is_pass());
        assert!(!font_sizes_count(&LimitParams { max: Some(1) }, runs.iter()).is_pass());
    }

    #[test]
    fn test_font_min_size_reports_smallest_and_slides() {
        let runs = vec![run("Arial", 24.0), run("Arial", 10.0), run("Arial", 14.0)];
        let params = FontMinSizeParams { min: Some(18.0), ..Default::default() };
        let tagged = vec![(1, &runs[0]), (1, &runs[1]), (2, &runs[2])];
        let verdict = font_min_size(&params, tagged.into_iter());
        assert!(!verdict.is_pass());
        assert_eq!(
            verdict.message,
            "Found fonts smaller than 18pt: smallest is 10pt on 2 slide(s)"
        );
    }

    #[test]
    fn test_uppercase_percent() {
        let params = UppercasePercentParams { max: Some(30.0) };
        assert!(uppercase_percent(&params, "Hello world").is_pass());
        let verdict = uppercase_percent(&params, "HELLO world!");
        assert!(!verdict.is_pass());
        assert!(verdict.message.contains("50.0%"));
        assert!(uppercase_percent(&params, "123 456").is_pass());
    }
}
