// Slidelint Core Library
//
// Rebuilds slide structure (paragraphs, lists, page numbers) from positioned
// characters and validates it against rules written in a small YAML DSL.

pub mod checks;
pub mod config;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod layout;
pub mod processor;
pub mod report;
pub mod spelling;
pub mod types;

// Re-export main types and functions for easy use
pub use checks::{CheckLevel, CheckType, PageRange, Scope, Severity, ValidationResult, ValidationStatus};
pub use config::LintConfig;
pub use dsl::{load_validation_engine, load_validation_engine_from_str, RuleCompiler};
pub use engine::ValidationEngine;
pub use error::{CompileError, RuleError, SpellCheckError};
pub use extraction::{CharacterExtractor, JsonCharacterExtractor, RawChar, RawDocument, RawPage};
pub use processor::{DocumentProcessor, Stage, StageProfiler, StageTiming};
pub use report::{PresentationAnalysis, ValidationReport};
pub use spelling::{SpellChecker, SpellingError};
pub use types::*;

#[cfg(feature = "http-speller")]
pub use spelling::HttpSpellChecker;
