// Validation report
//
// Aggregates the ordered results of one run with identifying metadata and a
// summary of the presentation itself. Rendering is left to callers.

use crate::checks::{Severity, ValidationResult};
use crate::layout::page_numbers::PageNumberStatistics;
use crate::types::Presentation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Failed results per severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveritySummary {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl SeveritySummary {
    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.error += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSummary {
    pub family: String,
    pub runs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationAnalysis {
    pub total_slides: usize,
    /// Normalized families, most used first
    pub fonts: Vec<FontSummary>,
    /// Distinct run sizes, ascending
    pub font_sizes: Vec<f32>,
    pub page_numbers: PageNumberStatistics,
    pub total_characters: usize,
    pub average_characters_per_slide: f64,
}

impl PresentationAnalysis {
    pub fn analyze(document: &Presentation) -> Self {
        let mut run_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut sizes: Vec<f32> = Vec::new();
        for run in document.runs() {
            *run_counts.entry(run.font_family.as_str()).or_insert(0) += 1;
            sizes.push(run.font_size);
        }

        let mut fonts: Vec<FontSummary> = run_counts
            .into_iter()
            .map(|(family, runs)| FontSummary {
                family: family.to_string(),
                runs,
            })
            .collect();
        // stable: ties stay alphabetical
        fonts.sort_by(|a, b| b.runs.cmp(&a.runs));

        sizes.sort_by(|a, b| a.total_cmp(b));
        sizes.dedup();

        let total_characters: usize = document
            .slides
            .iter()
            .flat_map(|slide| slide.blocks.iter())
            .map(|block| block.text.chars().count())
            .sum();
        let total_slides = document.slides.len();
        let average_characters_per_slide = if total_slides == 0 {
            0.0
        } else {
            total_characters as f64 / total_slides as f64
        };

        Self {
            total_slides,
            fonts,
            font_sizes: sizes,
            page_numbers: PageNumberStatistics::collect(&document.slides),
            total_characters,
            average_characters_per_slide,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// SHA-256 of the rule file text, when known
    pub rules_fingerprint: Option<String>,
    /// No check failed, whatever its severity
    pub success: bool,
    pub total_checks: usize,
    pub passed_checks: usize,
    pub failed_checks: usize,
    pub failed_by_severity: SeveritySummary,
    pub results: Vec<ValidationResult>,
    pub analysis: PresentationAnalysis,
}

impl ValidationReport {
    pub fn build(
        document: &Presentation,
        results: Vec<ValidationResult>,
        rules_source: Option<&str>,
    ) -> Self {
        let mut failed_by_severity = SeveritySummary::default();
        for result in results.iter().filter(|r| !r.passed()) {
            failed_by_severity.record(result.severity);
        }
        let passed_checks = results.iter().filter(|r| r.passed()).count();
        let failed_checks = results.len() - passed_checks;

        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            rules_fingerprint: rules_source.map(calculate_rules_hash),
            success: failed_checks == 0,
            total_checks: results.len(),
            passed_checks,
            failed_checks,
            failed_by_severity,
            results,
            analysis: PresentationAnalysis::analyze(document),
        }
    }

    /// Any failed result with error severity
    pub fn has_errors(&self) -> bool {
        self.failed_by_severity.error > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| !r.passed())
    }
}

/// Hex SHA-256 of a rule file, so reports can be matched to the rules that produced them
pub fn calculate_rules_hash(rules_source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(rules_source.as_bytes());
    format!("{:x}", hasher.finalize())
}
