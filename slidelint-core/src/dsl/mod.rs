//! Rule DSL
//!
//! A rule file is a YAML document with a top-level `rules` list; each entry
//! wraps a `rule` mapping:
//!
//! ```yaml
//! rules:
//!   - rule:
//!       name: At most three fonts
//!       check: font_count
//!       level: document
//!       params: { max: 3 }
//!       severity: error
//!   - rule:
//!       name: Headings on content slides
//!       check: heading_presence
//!       scope: [1, "3-5"]
//!       params: {}
//!       severity: warning
//! ```
//!
//! Compilation is all-or-nothing. The first invalid rule aborts the load with
//! a [`CompileError::Rule`] naming it (or its 1-based position when unnamed).

pub mod rule;
pub mod scope;

pub use rule::{CompiledRule, RuleRecord};
pub use scope::parse_scope;

use crate::engine::ValidationEngine;
use crate::error::{CompileError, RuleError};
use serde_yaml::Value;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct RuleCompiler;

impl RuleCompiler {
    pub fn new() -> Self {
        Self
    }

    pub fn compile_file<P: AsRef<Path>>(&self, path: P) -> Result<ValidationEngine, CompileError> {
        let path = path.as_ref();
        log::debug!("Reading rule file {}", path.display());
        let text = std::fs::read_to_string(path)?;
        self.compile_str(&text)
    }

    pub fn compile_str(&self, text: &str) -> Result<ValidationEngine, CompileError> {
        let document: Value = serde_yaml::from_str(text)?;
        self.compile_value(&document)
    }

    pub fn compile_value(&self, document: &Value) -> Result<ValidationEngine, CompileError> {
        let rules = document
            .as_mapping()
            .and_then(|map| map.get("rules"))
            .ok_or(CompileError::MissingRules)?;
        let entries = match rules {
            Value::Sequence(entries) => entries.as_slice(),
            Value::Null => &[],
            _ => return Err(CompileError::RulesNotAList),
        };

        let mut engine = ValidationEngine::new();
        for (index, entry) in entries.iter().enumerate() {
            let compiled = compile_entry(entry).map_err(|source| CompileError::Rule {
                rule: rule_label(entry, index),
                source,
            })?;
            match compiled {
                CompiledRule::Document(check) => engine.add_document_check(check),
                CompiledRule::Page(check) => engine.add_page_check(check),
            }
        }

        log::info!(
            "Compiled {} rules ({} document-level, {} page-level)",
            entries.len(),
            engine.document_checks().len(),
            engine.page_checks().len()
        );
        Ok(engine)
    }
}

fn compile_entry(entry: &Value) -> Result<CompiledRule, RuleError> {
    let body = entry
        .as_mapping()
        .and_then(|map| map.get("rule"))
        .ok_or(RuleError::NotARule)?;
    RuleRecord::from_value(body)?.compile()
}

fn rule_label(entry: &Value, index: usize) -> String {
    entry
        .get("rule")
        .and_then(|rule| rule.get("name"))
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", index + 1))
}

/// Compile a rule file into a ready engine
pub fn load_validation_engine<P: AsRef<Path>>(path: P) -> Result<ValidationEngine, CompileError> {
    RuleCompiler::new().compile_file(path)
}

/// Compile rule text into a ready engine
pub fn load_validation_engine_from_str(text: &str) -> Result<ValidationEngine, CompileError> {
    RuleCompiler::new().compile_str(text)
}
