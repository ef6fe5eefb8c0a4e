use super::{list_examples, Verdict};
use crate::spelling::SpellChecker;
use crate::types::Slide;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellingParams {
    pub enabled: bool,
}

impl Default for SpellingParams {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Never fails because of the collaborator: a missing checker or a service
/// error yields a passed result that says why nothing was checked.
pub fn spelling(params: &SpellingParams, slide: &Slide, checker: Option<&dyn SpellChecker>) -> Verdict {
    if !params.enabled {
        return Verdict::pass("spelling check disabled");
    }

    let text = slide.text();
    let text = text.trim();
    if text.is_empty() {
        return Verdict::pass("no text to check");
    }

    let Some(checker) = checker else {
        return Verdict::pass("spell checker unavailable, spelling not verified");
    };

    match checker.check(text) {
        Ok(errors) if errors.is_empty() => Verdict::pass("no spelling errors found"),
        Ok(errors) => {
            let examples: Vec<String> = errors
                .iter()
                .map(|e| {
                    if e.suggestions.is_empty() {
                        format!("'{}'", e.word)
                    } else {
                        format!("'{}' (did you mean: {})", e.word, e.suggestions.join(", "))
                    }
                })
                .collect();
            Verdict::fail(format!(
                "{} spelling error(s): {}",
                errors.len(),
                list_examples(&examples)
            ))
        }
        Err(e) => {
            log::warn!(
                "Spell check via {} failed on slide {}: {}",
                checker.name(),
                slide.page_number,
                e
            );
            Verdict::pass(format!("spelling not verified ({})", e))
        }
    }
}
