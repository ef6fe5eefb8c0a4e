//! Error types for rule compilation and spell checking.
//!
//! Pipeline plumbing (file reads, JSON decoding) goes through `anyhow`;
//! the rule DSL gets a typed error so callers can tell a bad rule file
//! apart from an I/O failure.

use std::time::Duration;
use thiserror::Error;

/// Failure while turning a rule file into a validation engine.
/// Compilation is fail-fast: the first offending rule aborts the whole load.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Failed to read rule file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Rule file must be a mapping with a 'rules' key")]
    MissingRules,

    #[error("'rules' must be a list")]
    RulesNotAList,

    #[error("Error in rule '{rule}': {source}")]
    Rule {
        rule: String,
        #[source]
        source: RuleError,
    },
}

/// Problem with a single rule record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    #[error("each entry of 'rules' must be a mapping with a 'rule' key")]
    NotARule,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unknown severity '{0}', expected one of: error, warning, info")]
    UnknownSeverity(String),

    #[error("unknown check '{0}'")]
    UnknownCheck(String),

    #[error("check '{check}' does not support level '{level}'; allowed levels: {allowed}")]
    UnsupportedLevel {
        check: String,
        level: String,
        allowed: String,
    },

    #[error("check '{check}' has no default level; set 'level' to one of: {allowed}")]
    LevelRequired { check: String, allowed: String },

    #[error("invalid scope: {0}")]
    InvalidScope(String),

    #[error("invalid scope: range '{start}-{end}' starts after it ends")]
    InvertedRange { start: u32, end: u32 },

    #[error("invalid params for '{check}': {reason}")]
    InvalidParams { check: String, reason: String },
}

/// Failure of the external spelling service. Never fatal to a validation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpellCheckError {
    #[error("spelling service timed out after {0:?}")]
    Timeout(Duration),

    #[error("spelling service unreachable: {0}")]
    Transport(String),

    #[error("spelling service returned HTTP {0}")]
    Status(u16),

    #[error("unexpected spelling service response: {0}")]
    InvalidResponse(String),
}
