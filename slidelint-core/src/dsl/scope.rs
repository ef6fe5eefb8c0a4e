use crate::checks::{PageRange, Scope};
use crate::error::RuleError;
use serde_yaml::Value;

/// Resolve a rule's `scope` value.
///
/// Accepted forms: `all`, a page number (`5` or `"5"`), an inclusive range
/// (`"3-5"`), or a list mixing numbers and ranges which is unioned.
/// Pages are 1-based; page 0, inverted ranges and empty lists are rejected.
/// Ranges stay ranges, so `"1-4000000000"` costs no more than `"1-2"`.
pub fn parse_scope(value: &Value) -> Result<Scope, RuleError> {
    match value {
        Value::Null => Ok(Scope::All),
        Value::String(s) if s.trim() == "all" => Ok(Scope::All),
        Value::Sequence(items) => {
            if items.is_empty() {
                return Err(RuleError::InvalidScope("scope list is empty".to_string()));
            }
            let mut ranges = Vec::with_capacity(items.len());
            for item in items {
                if matches!(item, Value::Sequence(_) | Value::Mapping(_)) {
                    return Err(RuleError::InvalidScope(format!(
                        "unsupported list element {}",
                        describe(item)
                    )));
                }
                ranges.push(parse_item(item)?);
            }
            Ok(Scope::from_ranges(ranges))
        }
        other => Ok(Scope::from_ranges([parse_item(other)?])),
    }
}

fn parse_item(value: &Value) -> Result<PageRange, RuleError> {
    match value {
        Value::Number(n) => {
            let page = n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| RuleError::InvalidScope(format!("'{}' is not a page number", n)))?;
            single(page)
        }
        Value::String(s) => {
            let s = s.trim();
            if s.contains('-') {
                parse_range(s)
            } else {
                single(parse_page(s)?)
            }
        }
        other => Err(RuleError::InvalidScope(format!(
            "unsupported value {}",
            describe(other)
        ))),
    }
}

fn parse_range(range: &str) -> Result<PageRange, RuleError> {
    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| RuleError::InvalidScope(format!("malformed range '{}'", range)))?;
    if end.contains('-') {
        return Err(RuleError::InvalidScope(format!("malformed range '{}'", range)));
    }

    let start = parse_page(start.trim())?;
    let end = parse_page(end.trim())?;
    if start > end {
        return Err(RuleError::InvertedRange { start, end });
    }
    Ok(PageRange::new(start, end))
}

fn parse_page(text: &str) -> Result<u32, RuleError> {
    let page: u32 = text
        .parse()
        .map_err(|_| RuleError::InvalidScope(format!("'{}' is not a page number", text)))?;
    if page == 0 {
        return Err(RuleError::InvalidScope("page numbers start at 1".to_string()));
    }
    Ok(page)
}

fn single(page: u32) -> Result<PageRange, RuleError> {
    if page == 0 {
        return Err(RuleError::InvalidScope("page numbers start at 1".to_string()));
    }
    Ok(PageRange::single(page))
}

fn describe(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| "<unprintable>".to_string())
}
