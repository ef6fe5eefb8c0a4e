//! Check library
//!
//! Every rule in a rule file compiles into either a [`DocumentCheck`] (one
//! result per document) or a [`PageCheck`] (one result per page in scope).
//! Check kinds are closed enums carrying typed parameters, so a rule that
//! compiled is guaranteed to be evaluable.

pub mod catalog;
pub mod fonts;
pub mod lists;
pub mod page_numbers;
pub mod spelling;
pub mod structure;
pub mod text;

pub use catalog::{CheckLevel, CheckType, DocumentCheckKind, PageCheckKind};

use crate::spelling::SpellChecker;
use crate::types::{Presentation, Slide};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Passed,
    Failed,
}

/// One diagnostic produced by evaluating a check against a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    pub severity: Severity,
    pub rule_name: String,
    pub message: String,
}

impl ValidationResult {
    pub fn passed(&self) -> bool {
        self.status == ValidationStatus::Passed
    }
}

/// Outcome of a check before it is attributed to a rule
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub status: ValidationStatus,
    pub message: String,
}

impl Verdict {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            status: ValidationStatus::Passed,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: ValidationStatus::Failed,
            message: message.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == ValidationStatus::Passed
    }
}

/// Inclusive span of 1-based page numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn single(page: u32) -> Self {
        Self { start: page, end: page }
    }

    pub fn contains(&self, page: u32) -> bool {
        (self.start..=self.end).contains(&page)
    }
}

/// Pages a page-level check applies to
///
/// `Pages` holds sorted, disjoint, non-adjacent ranges, so two scopes
/// covering the same pages compare equal however they were written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    All,
    Pages(Vec<PageRange>),
}

impl Scope {
    /// Union of ranges, merged into canonical form
    pub fn from_ranges<I: IntoIterator<Item = PageRange>>(ranges: I) -> Self {
        let mut ranges: Vec<PageRange> = ranges.into_iter().collect();
        ranges.sort();
        let mut merged: Vec<PageRange> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start <= last.end.saturating_add(1) => {
                    last.end = last.end.max(range.end);
                }
                _ => merged.push(range),
            }
        }
        Scope::Pages(merged)
    }

    pub fn from_pages<I: IntoIterator<Item = u32>>(pages: I) -> Self {
        Self::from_ranges(pages.into_iter().map(PageRange::single))
    }

    pub fn applies_to(&self, page_number: u32) -> bool {
        match self {
            Scope::All => true,
            Scope::Pages(ranges) => ranges.iter().any(|r| r.contains(page_number)),
        }
    }
}

/// Collaborators available while evaluating checks
#[derive(Clone, Copy, Default)]
pub struct CheckContext<'a> {
    pub spell_checker: Option<&'a dyn SpellChecker>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCheck {
    pub rule_name: String,
    pub severity: Severity,
    pub kind: DocumentCheckKind,
}

impl DocumentCheck {
    pub fn evaluate(&self, document: &Presentation) -> ValidationResult {
        let verdict = self.kind.evaluate(document);
        ValidationResult {
            status: verdict.status,
            severity: self.severity,
            rule_name: self.rule_name.clone(),
            message: verdict.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageCheck {
    pub rule_name: String,
    pub severity: Severity,
    pub scope: Scope,
    pub kind: PageCheckKind,
}

impl PageCheck {
    pub fn applies_to(&self, page_number: u32) -> bool {
        self.scope.applies_to(page_number)
    }

    /// Whether evaluation waits on the external spell checker
    pub fn calls_spell_checker(&self) -> bool {
        matches!(self.kind, PageCheckKind::Spelling(_))
    }

    pub fn evaluate(&self, slide: &Slide, ctx: &CheckContext<'_>) -> ValidationResult {
        let verdict = self.kind.evaluate(slide, ctx);
        ValidationResult {
            status: verdict.status,
            severity: self.severity,
            rule_name: self.rule_name.clone(),
            message: format!("Slide {}: {}", slide.page_number, verdict.message),
        }
    }
}

/// Join at most three items, noting how many were left out
pub(crate) fn list_examples<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<S> = items.into_iter().collect();
    let mut out = items
        .iter()
        .take(3)
        .map(|s| -> &str { s.as_ref() })
        .collect::<Vec<_>>()
        .join("; ");
    if items.len() > 3 {
        out.push_str(&format!(" and {} more", items.len() - 3));
    }
    out
}

/// First `max_chars` characters, with an ellipsis when cut
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_membership() {
        assert!(Scope::All.applies_to(42));
        let scope = Scope::from_pages([2, 4]);
        assert!(scope.applies_to(2));
        assert!(!scope.applies_to(3));
    }

    #[test]
    fn test_scope_ranges_merge() {
        let scope = Scope::from_ranges([
            PageRange::new(5, 7),
            PageRange::single(1),
            PageRange::new(2, 3),
            PageRange::new(6, 9),
        ]);
        assert_eq!(
            scope,
            Scope::Pages(vec![PageRange::new(1, 3), PageRange::new(5, 9)])
        );
        assert_eq!(Scope::from_pages([3, 4, 5]), Scope::Pages(vec![PageRange::new(3, 5)]));
        assert!(scope.applies_to(9));
        assert!(!scope.applies_to(4));
        assert!(!scope.applies_to(10));
    }

    #[test]
    fn test_scope_range_at_u32_max() {
        let scope = Scope::from_ranges([PageRange::new(1, u32::MAX), PageRange::single(u32::MAX)]);
        assert_eq!(scope, Scope::Pages(vec![PageRange::new(1, u32::MAX)]));
        assert!(scope.applies_to(4_000_000_000));
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("warning"), Some(Severity::Warning));
        assert_eq!(Severity::parse("Warning"), None);
        assert_eq!(Severity::parse("fatal"), None);
    }

    #[test]
    fn test_list_examples_truncates() {
        assert_eq!(list_examples(["a", "b"]), "a; b");
        assert_eq!(list_examples(["a", "b", "c", "d", "e"]), "a; b; c and 2 more");
    }

    #[test]
    fn test_preview_counts_chars_not_bytes() {
        assert_eq!(preview("привет мир", 6), "привет...");
        assert_eq!(preview("short", 50), "short");
    }
}
