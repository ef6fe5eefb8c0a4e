use crate::types::TextRun;
use std::cmp::Ordering;

/// Groups reading-ordered runs into visual lines
pub trait LineGrouper {
    fn group_lines(&self, runs: Vec<TextRun>) -> Vec<Vec<TextRun>>;

    fn name(&self) -> &str;
}

/// Starts a new line whenever a run's vertical center drifts more than
/// `line_threshold` from the previous run's center.
#[derive(Debug, Clone)]
pub struct ProximityLineGrouper {
    line_threshold: f32,
}

impl ProximityLineGrouper {
    pub fn new(line_threshold: f32) -> Self {
        Self { line_threshold }
    }
}

impl Default for ProximityLineGrouper {
    fn default() -> Self {
        Self::new(1.5)
    }
}

impl LineGrouper for ProximityLineGrouper {
    fn group_lines(&self, runs: Vec<TextRun>) -> Vec<Vec<TextRun>> {
        let mut lines = Vec::new();
        let mut current: Vec<TextRun> = Vec::new();

        for run in runs {
            let breaks_line = current
                .last()
                .map(|prev| (run.bbox.center_y() - prev.bbox.center_y()).abs() > self.line_threshold)
                .unwrap_or(false);

            if breaks_line {
                lines.push(close_line(std::mem::take(&mut current)));
            }
            current.push(run);
        }

        if !current.is_empty() {
            lines.push(close_line(current));
        }
        lines
    }

    fn name(&self) -> &str {
        "proximity-lines"
    }
}

fn close_line(mut line: Vec<TextRun>) -> Vec<TextRun> {
    line.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal));
    line
}
