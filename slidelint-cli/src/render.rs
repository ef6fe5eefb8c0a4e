use anyhow::Result;
use clap::ValueEnum;
use slidelint_core::{Severity, ValidationReport, ValidationStatus};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

pub fn render(report: &ValidationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => Ok(render_text(report)),
    }
}

fn marker(status: ValidationStatus, severity: Severity) -> &'static str {
    match (status, severity) {
        (ValidationStatus::Passed, _) => "✅",
        (ValidationStatus::Failed, Severity::Error) => "❌",
        (ValidationStatus::Failed, Severity::Warning) => "⚠️ ",
        (ValidationStatus::Failed, Severity::Info) => "ℹ️ ",
    }
}

/// Human-readable report: summary first, then one line per result
pub fn render_text(report: &ValidationReport) -> String {
    let mut out = String::new();
    // fmt::Write into a String never fails
    let _ = writeln!(out, "📊 Validation report {}", report.run_id);
    let _ = writeln!(out, "   Generated: {}", report.generated_at.to_rfc3339());
    let _ = writeln!(
        out,
        "   Checks: {} total, {} passed, {} failed",
        report.total_checks, report.passed_checks, report.failed_checks
    );
    let _ = writeln!(
        out,
        "   Failed by severity: {} error, {} warning, {} info",
        report.failed_by_severity.error, report.failed_by_severity.warning, report.failed_by_severity.info
    );

    let analysis = &report.analysis;
    let _ = writeln!(
        out,
        "   Slides: {} ({} characters, {:.1} per slide)",
        analysis.total_slides, analysis.total_characters, analysis.average_characters_per_slide
    );
    let _ = writeln!(
        out,
        "   Page numbers: {}/{} slides ({:.1}%)",
        analysis.page_numbers.slides_with_page_numbers,
        analysis.page_numbers.total_slides,
        analysis.page_numbers.coverage_percentage
    );
    if !analysis.fonts.is_empty() {
        let fonts: Vec<String> = analysis
            .fonts
            .iter()
            .map(|f| format!("{} ({})", f.family, f.runs))
            .collect();
        let _ = writeln!(out, "   Fonts: {}", fonts.join(", "));
    }

    let _ = writeln!(out);
    for result in &report.results {
        let _ = writeln!(
            out,
            "{} [{}] {}: {}",
            marker(result.status, result.severity),
            result.severity,
            result.rule_name,
            result.message
        );
    }

    let _ = writeln!(out);
    if report.success {
        let _ = writeln!(out, "✅ All checks passed");
    } else {
        let _ = writeln!(out, "❌ {} check(s) failed", report.failed_checks);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidelint_core::{Presentation, ValidationResult};

    fn report() -> ValidationReport {
        let results = vec![
            ValidationResult {
                status: ValidationStatus::Passed,
                severity: Severity::Error,
                rule_name: "Deck size".to_string(),
                message: "Document has 3 slides, within limits".to_string(),
            },
            ValidationResult {
                status: ValidationStatus::Failed,
                severity: Severity::Warning,
                rule_name: "Headings".to_string(),
                message: "Slide 2: heading missing".to_string(),
            },
        ];
        ValidationReport::build(&Presentation::default(), results, None)
    }

    #[test]
    fn test_text_lists_every_result() {
        let text = render_text(&report());
        assert!(text.contains("Checks: 2 total, 1 passed, 1 failed"));
        assert!(text.contains("[warning] Headings: Slide 2: heading missing"));
        assert!(text.contains("1 check(s) failed"));
    }

    #[test]
    fn test_json_is_parseable() {
        let json = render(&report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["failed_checks"], 1);
        assert_eq!(value["results"][1]["severity"], "warning");
    }
}
