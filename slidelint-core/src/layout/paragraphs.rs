use crate::types::{Paragraph, TextRun};

/// Merges consecutive lines into paragraphs
pub trait ParagraphGrouper {
    fn group_paragraphs(&self, lines: Vec<Vec<TextRun>>) -> Vec<Paragraph>;

    fn name(&self) -> &str;
}

/// Breaks a paragraph on a large vertical gap or a large indent change
/// between consecutive lines.
#[derive(Debug, Clone)]
pub struct GapIndentParagraphGrouper {
    gap_threshold: f32,
    indent_threshold: f32,
}

impl GapIndentParagraphGrouper {
    pub fn new(gap_threshold: f32, indent_threshold: f32) -> Self {
        Self {
            gap_threshold,
            indent_threshold,
        }
    }
}

impl Default for GapIndentParagraphGrouper {
    fn default() -> Self {
        Self::new(10.0, 20.0)
    }
}

/// Vertical and horizontal extent of one line
#[derive(Debug, Clone, Copy)]
struct LineMetrics {
    top: f32,
    bottom: f32,
    left: f32,
}

impl LineMetrics {
    fn of(line: &[TextRun]) -> Option<Self> {
        let first = line.first()?;
        let mut metrics = LineMetrics {
            top: first.bbox.y0,
            bottom: first.bbox.y1,
            left: first.bbox.x0,
        };
        for run in &line[1..] {
            metrics.top = metrics.top.min(run.bbox.y0);
            // Lowest top-aligned bottom, so tall glyphs don't eat the gap
            metrics.bottom = metrics.bottom.min(run.bbox.y1);
            metrics.left = metrics.left.min(run.bbox.x0);
        }
        Some(metrics)
    }
}

impl ParagraphGrouper for GapIndentParagraphGrouper {
    fn group_paragraphs(&self, lines: Vec<Vec<TextRun>>) -> Vec<Paragraph> {
        let mut paragraphs = Vec::new();
        let mut current: Vec<TextRun> = Vec::new();
        let mut previous: Option<LineMetrics> = None;

        for line in lines {
            let Some(metrics) = LineMetrics::of(&line) else {
                continue;
            };

            if let Some(prev) = previous {
                let gap = metrics.top - prev.bottom;
                let indent = (metrics.left - prev.left).abs();
                if gap > self.gap_threshold || indent > self.indent_threshold {
                    paragraphs.push(Paragraph::from_runs(std::mem::take(&mut current)));
                }
            }

            current.extend(line);
            previous = Some(metrics);
        }

        if !current.is_empty() {
            paragraphs.push(Paragraph::from_runs(current));
        }
        paragraphs
    }

    fn name(&self) -> &str {
        "gap-indent-paragraphs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn line(text: &str, x0: f32, y0: f32) -> Vec<TextRun> {
        vec![TextRun {
            text: text.to_string(),
            font_family: "Arial".to_string(),
            font_size: 12.0,
            is_bold: false,
            is_italic: false,
            bbox: BoundingBox::new(x0, y0, x0 + 100.0, y0 + 12.0),
        }]
    }

    fn texts(paragraphs: &[Paragraph]) -> Vec<&str> {
        paragraphs.iter().map(|p| p.text.as_str()).collect()
    }

    #[test]
    fn test_tight_lines_merge() {
        let lines = vec![line("first ", 50.0, 100.0), line("second", 50.0, 114.0)];
        let paragraphs = GapIndentParagraphGrouper::default().group_paragraphs(lines);
        assert_eq!(texts(&paragraphs), vec!["first second"]);
    }

    #[test]
    fn test_large_gap_splits() {
        let lines = vec![line("first", 50.0, 100.0), line("second", 50.0, 140.0)];
        let paragraphs = GapIndentParagraphGrouper::default().group_paragraphs(lines);
        assert_eq!(texts(&paragraphs), vec!["first", "second"]);
    }

    #[test]
    fn test_indent_change_splits() {
        let lines = vec![line("first", 50.0, 100.0), line("second", 80.0, 114.0)];
        let paragraphs = GapIndentParagraphGrouper::default().group_paragraphs(lines);
        assert_eq!(texts(&paragraphs), vec!["first", "second"]);
    }

    #[test]
    fn test_regrouping_paragraphs_is_stable() {
        let grouper = GapIndentParagraphGrouper::default();
        let lines = vec![
            line("Title ", 50.0, 100.0),
            line("continues", 50.0, 114.0),
            // gap split
            line("Body ", 50.0, 150.0),
            line("more", 50.0, 164.0),
            // indent split, no gap
            line("Indented", 90.0, 178.0),
        ];
        let first = grouper.group_paragraphs(lines);
        assert_eq!(texts(&first), vec!["Title continues", "Body more", "Indented"]);

        // Each paragraph goes back in as one atomic run spanning its bbox
        let atoms: Vec<Vec<TextRun>> = first
            .iter()
            .map(|p| {
                vec![TextRun {
                    text: p.text.clone(),
                    bbox: p.bbox,
                    ..p.runs[0].clone()
                }]
            })
            .collect();
        let second = grouper.group_paragraphs(atoms);
        assert_eq!(texts(&second), texts(&first));
        for (before, after) in first.iter().zip(&second) {
            assert_eq!(before.bbox, after.bbox);
        }
    }

    #[test]
    fn test_empty_lines_are_skipped() {
        let lines = vec![Vec::new(), line("only", 50.0, 100.0), Vec::new()];
        let paragraphs = GapIndentParagraphGrouper::default().group_paragraphs(lines);
        assert_eq!(texts(&paragraphs), vec!["only"]);
        assert_eq!(paragraphs[0].bbox.x0, 50.0);
    }
}
