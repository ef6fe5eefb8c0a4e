use super::scope::parse_scope;
use crate::checks::{
    CheckLevel, CheckType, DocumentCheck, DocumentCheckKind, PageCheck, PageCheckKind, Severity,
};
use crate::error::RuleError;
use serde_yaml::{Mapping, Value};

/// One `rule:` entry of a rule file, validated field by field
#[derive(Debug, Clone, PartialEq)]
pub struct RuleRecord {
    pub name: String,
    pub check: CheckType,
    pub severity: Severity,
    pub level: Option<CheckLevel>,
    pub params: Value,
    pub scope: Option<Value>,
}

/// A rule after level resolution
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledRule {
    Document(DocumentCheck),
    Page(PageCheck),
}

impl RuleRecord {
    /// Parse the body of a `rule:` entry. Required keys: `name`, `check`,
    /// `params` (may be null), `severity`. Optional: `level`, `scope`.
    pub fn from_value(value: &Value) -> Result<Self, RuleError> {
        let map = value.as_mapping().ok_or(RuleError::NotARule)?;

        let name = required_string(map, "name")?;
        if name.trim().is_empty() {
            return Err(RuleError::InvalidField {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }

        let check_id = required_string(map, "check")?;
        let check =
            CheckType::from_identifier(&check_id).ok_or(RuleError::UnknownCheck(check_id))?;

        let params = map
            .get("params")
            .cloned()
            .ok_or(RuleError::MissingField("params"))?;
        if !matches!(params, Value::Null | Value::Mapping(_)) {
            return Err(RuleError::InvalidField {
                field: "params",
                reason: "must be a mapping".to_string(),
            });
        }

        let severity_text = required_string(map, "severity")?;
        let severity =
            Severity::parse(&severity_text).ok_or(RuleError::UnknownSeverity(severity_text))?;

        let level = match map.get("level") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => {
                Some(CheckLevel::parse(text).ok_or_else(|| RuleError::UnsupportedLevel {
                    check: check.identifier().to_string(),
                    level: text.clone(),
                    allowed: check.allowed_levels(),
                })?)
            }
            Some(_) => {
                return Err(RuleError::InvalidField {
                    field: "level",
                    reason: "must be a string".to_string(),
                })
            }
        };

        Ok(Self {
            name,
            check,
            severity,
            level,
            params,
            scope: map.get("scope").cloned(),
        })
    }

    /// Explicit level if the check supports it, else the check's default.
    /// Checks available at both levels have no default.
    pub fn resolve_level(&self) -> Result<CheckLevel, RuleError> {
        match self.level {
            Some(level) if self.check.supports(level) => Ok(level),
            Some(level) => Err(RuleError::UnsupportedLevel {
                check: self.check.identifier().to_string(),
                level: level.as_str().to_string(),
                allowed: self.check.allowed_levels(),
            }),
            None => self.check.default_level().ok_or_else(|| RuleError::LevelRequired {
                check: self.check.identifier().to_string(),
                allowed: self.check.allowed_levels(),
            }),
        }
    }

    pub fn compile(&self) -> Result<CompiledRule, RuleError> {
        match self.resolve_level()? {
            CheckLevel::Document => {
                if self.scope.is_some() {
                    log::warn!(
                        "Rule '{}': scope is ignored for document-level check '{}'",
                        self.name,
                        self.check
                    );
                }
                Ok(CompiledRule::Document(DocumentCheck {
                    rule_name: self.name.clone(),
                    severity: self.severity,
                    kind: DocumentCheckKind::compile(self.check, &self.params)?,
                }))
            }
            CheckLevel::Page => {
                let scope = parse_scope(self.scope.as_ref().unwrap_or(&Value::Null))?;
                Ok(CompiledRule::Page(PageCheck {
                    rule_name: self.name.clone(),
                    severity: self.severity,
                    scope,
                    kind: PageCheckKind::compile(self.check, &self.params)?,
                }))
            }
        }
    }
}

fn required_string(map: &Mapping, field: &'static str) -> Result<String, RuleError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(RuleError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(RuleError::InvalidField {
            field,
            reason: "must be a string".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::Scope;

    fn record(text: &str) -> Result<RuleRecord, RuleError> {
        RuleRecord::from_value(&serde_yaml::from_str(text).unwrap())
    }

    #[test]
    fn test_minimal_record() {
        let rule = record("name: Heading\ncheck: heading_presence\nparams: {}\nseverity: warning").unwrap();
        assert_eq!(rule.check, CheckType::HeadingPresence);
        assert_eq!(rule.severity, Severity::Warning);
        assert_eq!(rule.level, None);
        assert_eq!(rule.resolve_level().unwrap(), CheckLevel::Page);
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            record("check: heading_presence\nparams: {}\nseverity: error").unwrap_err(),
            RuleError::MissingField("name")
        );
        assert_eq!(
            record("name: x\ncheck: heading_presence\nseverity: error").unwrap_err(),
            RuleError::MissingField("params")
        );
        assert_eq!(
            record("name: x\ncheck: heading_presence\nparams:\n").unwrap_err(),
            RuleError::MissingField("severity")
        );
    }

    #[test]
    fn test_bad_severity_and_check() {
        assert_eq!(
            record("name: x\ncheck: heading_presence\nparams: {}\nseverity: fatal").unwrap_err(),
            RuleError::UnknownSeverity("fatal".to_string())
        );
        assert_eq!(
            record("name: x\ncheck: font_colour\nparams: {}\nseverity: error").unwrap_err(),
            RuleError::UnknownCheck("font_colour".to_string())
        );
    }

    #[test]
    fn test_params_must_be_mapping() {
        let err = record("name: x\ncheck: heading_presence\nparams: [1]\nseverity: error").unwrap_err();
        assert!(matches!(err, RuleError::InvalidField { field: "params", .. }));
    }

    #[test]
    fn test_level_required_for_ambiguous_check() {
        let rule = record("name: Fonts\ncheck: font_count\nparams: {max: 3}\nseverity: error").unwrap();
        let err = rule.compile().unwrap_err();
        assert_eq!(
            err.to_string(),
            "check 'font_count' has no default level; set 'level' to one of: document, page"
        );
    }

    #[test]
    fn test_unsupported_level_names_allowed_levels() {
        let rule = record("name: Count\ncheck: slides_count\nparams: {}\nseverity: error\nlevel: slide").unwrap();
        let err = rule.compile().unwrap_err();
        assert!(err.to_string().contains("allowed levels: document"));

        let err = record("name: Count\ncheck: slides_count\nparams: {}\nseverity: error\nlevel: chapter")
            .unwrap_err();
        assert!(matches!(err, RuleError::UnsupportedLevel { ref level, .. } if level == "chapter"));
    }

    #[test]
    fn test_page_rule_gets_scope() {
        let rule = record(
            "name: Spelling\ncheck: spelling\nparams:\nseverity: info\nscope: '2-3'",
        )
        .unwrap();
        match rule.compile().unwrap() {
            CompiledRule::Page(check) => {
                assert_eq!(check.scope, Scope::from_pages([2, 3]));
            }
            other => panic!("expected page check, got {:?}", other),
        }
    }

    #[test]
    fn test_document_rule_ignores_scope() {
        let rule = record("name: Count\ncheck: slides_count\nparams: {max: 20}\nseverity: error\nscope: 1").unwrap();
        assert!(matches!(rule.compile().unwrap(), CompiledRule::Document(_)));
    }
}
