use super::fonts::{self, FontMinSizeParams, LimitParams, UppercasePercentParams};
use super::lists::{
    self, BulletConsistencyParams, ListConsistencyParams, ListItemsCountParams, ListNestingParams,
    MixedListsParams, NestedListsDepthParams,
};
use super::page_numbers::{self, PageNumbersDocumentParams, PageNumbersPageParams};
use super::spelling::{self, SpellingParams};
use super::structure::{self, HeadingPresenceParams, SlidesCountParams, TextDensityParams};
use super::text::{
    self, CapitalizationParams, LongPhrasesParams, ParagraphLengthParams, SentenceCountParams,
    SentenceLengthParams,
};
use super::{CheckContext, Verdict};
use crate::error::RuleError;
use crate::types::{Presentation, Slide};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;

/// Where a check is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckLevel {
    #[serde(alias = "presentation")]
    Document,
    #[serde(alias = "slide")]
    Page,
}

impl CheckLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "document" | "presentation" => Some(CheckLevel::Document),
            "page" | "slide" => Some(CheckLevel::Page),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckLevel::Document => "document",
            CheckLevel::Page => "page",
        }
    }
}

impl fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DOCUMENT_ONLY: &[CheckLevel] = &[CheckLevel::Document];
const PAGE_ONLY: &[CheckLevel] = &[CheckLevel::Page];
const EITHER: &[CheckLevel] = &[CheckLevel::Document, CheckLevel::Page];

/// Every check identifier a rule file may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckType {
    SlidesCount,
    FontCount,
    FontSizesCount,
    FontMinSize,
    UppercasePercent,
    ListConsistency,
    PageNumbers,
    HeadingPresence,
    ElementsCount,
    SentenceLength,
    ListNesting,
    ListItemsCount,
    NestedListsDepth,
    MixedLists,
    BulletConsistency,
    LongPhrases,
    ParagraphLength,
    SentenceCount,
    TextDensity,
    Capitalization,
    Spelling,
}

impl CheckType {
    pub const ALL: [CheckType; 21] = [
        CheckType::SlidesCount,
        CheckType::FontCount,
        CheckType::FontSizesCount,
        CheckType::FontMinSize,
        CheckType::UppercasePercent,
        CheckType::ListConsistency,
        CheckType::PageNumbers,
        CheckType::HeadingPresence,
        CheckType::ElementsCount,
        CheckType::SentenceLength,
        CheckType::ListNesting,
        CheckType::ListItemsCount,
        CheckType::NestedListsDepth,
        CheckType::MixedLists,
        CheckType::BulletConsistency,
        CheckType::LongPhrases,
        CheckType::ParagraphLength,
        CheckType::SentenceCount,
        CheckType::TextDensity,
        CheckType::Capitalization,
        CheckType::Spelling,
    ];

    pub fn identifier(self) -> &'static str {
        match self {
            CheckType::SlidesCount => "slides_count",
            CheckType::FontCount => "font_count",
            CheckType::FontSizesCount => "font_sizes_count",
            CheckType::FontMinSize => "font_min_size",
            CheckType::UppercasePercent => "uppercase_percent",
            CheckType::ListConsistency => "list_consistency",
            CheckType::PageNumbers => "page_numbers",
            CheckType::HeadingPresence => "heading_presence",
            CheckType::ElementsCount => "elements_count",
            CheckType::SentenceLength => "sentence_length",
            CheckType::ListNesting => "list_nesting",
            CheckType::ListItemsCount => "list_items_count",
            CheckType::NestedListsDepth => "nested_lists_depth",
            CheckType::MixedLists => "mixed_lists",
            CheckType::BulletConsistency => "bullet_consistency",
            CheckType::LongPhrases => "long_phrases",
            CheckType::ParagraphLength => "paragraph_length",
            CheckType::SentenceCount => "sentence_count",
            CheckType::TextDensity => "text_density",
            CheckType::Capitalization => "capitalization",
            CheckType::Spelling => "spelling",
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|check| check.identifier() == identifier)
    }

    pub fn available_levels(self) -> &'static [CheckLevel] {
        match self {
            CheckType::SlidesCount => DOCUMENT_ONLY,
            CheckType::FontCount
            | CheckType::FontSizesCount
            | CheckType::FontMinSize
            | CheckType::UppercasePercent
            | CheckType::ListConsistency
            | CheckType::PageNumbers => EITHER,
            _ => PAGE_ONLY,
        }
    }

    /// Only single-level checks have a default; the rest need an explicit `level`
    pub fn default_level(self) -> Option<CheckLevel> {
        match self.available_levels() {
            [only] => Some(*only),
            _ => None,
        }
    }

    pub fn supports(self, level: CheckLevel) -> bool {
        self.available_levels().contains(&level)
    }

    /// "document, page" style listing used in diagnostics
    pub fn allowed_levels(self) -> String {
        self.available_levels()
            .iter()
            .map(|level| level.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn description(self) -> &'static str {
        match self {
            CheckType::SlidesCount => "number of slides within min/max",
            CheckType::FontCount => "number of distinct font families",
            CheckType::FontSizesCount => "number of distinct font sizes",
            CheckType::FontMinSize => "smallest font size",
            CheckType::UppercasePercent => "share of uppercase letters",
            CheckType::ListConsistency => "all lists use one marker type",
            CheckType::PageNumbers => "page-number presence, position and sequence",
            CheckType::HeadingPresence => "first block is set larger than the rest",
            CheckType::ElementsCount => "number of text blocks",
            CheckType::SentenceLength => "sentence length in words or characters",
            CheckType::ListNesting => "deepest list level",
            CheckType::ListItemsCount => "items per list",
            CheckType::NestedListsDepth => "list depth per marker type",
            CheckType::MixedLists => "bulleted and ordered lists mixed on one slide",
            CheckType::BulletConsistency => "parallel wording and trailing punctuation of items",
            CheckType::LongPhrases => "phrase length between commas and colons",
            CheckType::ParagraphLength => "paragraph length in characters",
            CheckType::SentenceCount => "sentences per paragraph",
            CheckType::TextDensity => "total characters and blocks per slide",
            CheckType::Capitalization => "titles and sentences start with a capital",
            CheckType::Spelling => "spelling via an external service",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Deserialize a rule's `params` mapping; null or absent means all defaults.
/// Unrecognised keys are ignored, mistyped values are errors.
fn parse_params<P>(check: CheckType, params: &Value) -> Result<P, RuleError>
where
    P: DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(P::default());
    }
    serde_yaml::from_value(params.clone()).map_err(|e| RuleError::InvalidParams {
        check: check.identifier().to_string(),
        reason: e.to_string(),
    })
}

fn unsupported(check: CheckType, level: CheckLevel) -> RuleError {
    RuleError::UnsupportedLevel {
        check: check.identifier().to_string(),
        level: level.as_str().to_string(),
        allowed: check.allowed_levels(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentCheckKind {
    SlidesCount(SlidesCountParams),
    FontCount(LimitParams),
    FontSizesCount(LimitParams),
    FontMinSize(FontMinSizeParams),
    UppercasePercent(UppercasePercentParams),
    ListConsistency(ListConsistencyParams),
    PageNumbers(PageNumbersDocumentParams),
}

impl DocumentCheckKind {
    pub fn compile(check: CheckType, params: &Value) -> Result<Self, RuleError> {
        let kind = match check {
            CheckType::SlidesCount => Self::SlidesCount(parse_params(check, params)?),
            CheckType::FontCount => Self::FontCount(parse_params(check, params)?),
            CheckType::FontSizesCount => Self::FontSizesCount(parse_params(check, params)?),
            CheckType::FontMinSize => Self::FontMinSize(parse_params(check, params)?),
            CheckType::UppercasePercent => Self::UppercasePercent(parse_params(check, params)?),
            CheckType::ListConsistency => Self::ListConsistency(parse_params(check, params)?),
            CheckType::PageNumbers => {
                let parsed: PageNumbersDocumentParams = parse_params(check, params)?;
                parsed.validate(check)?;
                Self::PageNumbers(parsed)
            }
            _ => return Err(unsupported(check, CheckLevel::Document)),
        };
        Ok(kind)
    }

    pub fn check_type(&self) -> CheckType {
        match self {
            Self::SlidesCount(_) => CheckType::SlidesCount,
            Self::FontCount(_) => CheckType::FontCount,
            Self::FontSizesCount(_) => CheckType::FontSizesCount,
            Self::FontMinSize(_) => CheckType::FontMinSize,
            Self::UppercasePercent(_) => CheckType::UppercasePercent,
            Self::ListConsistency(_) => CheckType::ListConsistency,
            Self::PageNumbers(_) => CheckType::PageNumbers,
        }
    }

    pub fn evaluate(&self, document: &Presentation) -> Verdict {
        match self {
            Self::SlidesCount(p) => structure::slides_count(p, document),
            Self::FontCount(p) => fonts::font_count(p, document.runs()),
            Self::FontSizesCount(p) => fonts::font_sizes_count(p, document.runs()),
            Self::FontMinSize(p) => fonts::font_min_size(
                p,
                document
                    .slides
                    .iter()
                    .flat_map(|slide| slide.runs().map(move |run| (slide.page_number, run))),
            ),
            Self::UppercasePercent(p) => fonts::uppercase_percent(p, &document.all_text()),
            Self::ListConsistency(p) => {
                lists::list_consistency(p, document.slides.iter().flat_map(|s| s.list_items()))
            }
            Self::PageNumbers(p) => page_numbers::document_page_numbers(p, document),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageCheckKind {
    FontCount(LimitParams),
    FontSizesCount(LimitParams),
    FontMinSize(FontMinSizeParams),
    UppercasePercent(UppercasePercentParams),
    ListConsistency(ListConsistencyParams),
    PageNumbers(PageNumbersPageParams),
    HeadingPresence(HeadingPresenceParams),
    ElementsCount(LimitParams),
    SentenceLength(SentenceLengthParams),
    ListNesting(ListNestingParams),
    ListItemsCount(ListItemsCountParams),
    NestedListsDepth(NestedListsDepthParams),
    MixedLists(MixedListsParams),
    BulletConsistency(BulletConsistencyParams),
    LongPhrases(LongPhrasesParams),
    ParagraphLength(ParagraphLengthParams),
    SentenceCount(SentenceCountParams),
    TextDensity(TextDensityParams),
    Capitalization(CapitalizationParams),
    Spelling(SpellingParams),
}

impl PageCheckKind {
    pub fn compile(check: CheckType, params: &Value) -> Result<Self, RuleError> {
        let kind = match check {
            CheckType::FontCount => Self::FontCount(parse_params(check, params)?),
            CheckType::FontSizesCount => Self::FontSizesCount(parse_params(check, params)?),
            CheckType::FontMinSize => Self::FontMinSize(parse_params(check, params)?),
            CheckType::UppercasePercent => Self::UppercasePercent(parse_params(check, params)?),
            CheckType::ListConsistency => Self::ListConsistency(parse_params(check, params)?),
            CheckType::PageNumbers => Self::PageNumbers(parse_params(check, params)?),
            CheckType::HeadingPresence => Self::HeadingPresence(parse_params(check, params)?),
            CheckType::ElementsCount => Self::ElementsCount(parse_params(check, params)?),
            CheckType::SentenceLength => Self::SentenceLength(parse_params(check, params)?),
            CheckType::ListNesting => Self::ListNesting(parse_params(check, params)?),
            CheckType::ListItemsCount => Self::ListItemsCount(parse_params(check, params)?),
            CheckType::NestedListsDepth => Self::NestedListsDepth(parse_params(check, params)?),
            CheckType::MixedLists => Self::MixedLists(parse_params(check, params)?),
            CheckType::BulletConsistency => Self::BulletConsistency(parse_params(check, params)?),
            CheckType::LongPhrases => Self::LongPhrases(parse_params(check, params)?),
            CheckType::ParagraphLength => Self::ParagraphLength(parse_params(check, params)?),
            CheckType::SentenceCount => Self::SentenceCount(parse_params(check, params)?),
            CheckType::TextDensity => Self::TextDensity(parse_params(check, params)?),
            CheckType::Capitalization => Self::Capitalization(parse_params(check, params)?),
            CheckType::Spelling => Self::Spelling(parse_params(check, params)?),
            CheckType::SlidesCount => return Err(unsupported(check, CheckLevel::Page)),
        };
        Ok(kind)
    }

    pub fn check_type(&self) -> CheckType {
        match self {
            Self::FontCount(_) => CheckType::FontCount,
            Self::FontSizesCount(_) => CheckType::FontSizesCount,
            Self::FontMinSize(_) => CheckType::FontMinSize,
            Self::UppercasePercent(_) => CheckType::UppercasePercent,
            Self::ListConsistency(_) => CheckType::ListConsistency,
            Self::PageNumbers(_) => CheckType::PageNumbers,
            Self::HeadingPresence(_) => CheckType::HeadingPresence,
            Self::ElementsCount(_) => CheckType::ElementsCount,
            Self::SentenceLength(_) => CheckType::SentenceLength,
            Self::ListNesting(_) => CheckType::ListNesting,
            Self::ListItemsCount(_) => CheckType::ListItemsCount,
            Self::NestedListsDepth(_) => CheckType::NestedListsDepth,
            Self::MixedLists(_) => CheckType::MixedLists,
            Self::BulletConsistency(_) => CheckType::BulletConsistency,
            Self::LongPhrases(_) => CheckType::LongPhrases,
            Self::ParagraphLength(_) => CheckType::ParagraphLength,
            Self::SentenceCount(_) => CheckType::SentenceCount,
            Self::TextDensity(_) => CheckType::TextDensity,
            Self::Capitalization(_) => CheckType::Capitalization,
            Self::Spelling(_) => CheckType::Spelling,
        }
    }

    pub fn evaluate(&self, slide: &Slide, ctx: &CheckContext<'_>) -> Verdict {
        match self {
            Self::FontCount(p) => fonts::font_count(p, slide.runs()),
            Self::FontSizesCount(p) => fonts::font_sizes_count(p, slide.runs()),
            Self::FontMinSize(p) => {
                fonts::font_min_size(p, slide.runs().map(|run| (slide.page_number, run)))
            }
            Self::UppercasePercent(p) => fonts::uppercase_percent(p, &slide.text()),
            Self::ListConsistency(p) => lists::list_consistency(p, slide.list_items()),
            Self::PageNumbers(p) => page_numbers::page_number(p, slide),
            Self::HeadingPresence(p) => structure::heading_presence(p, slide),
            Self::ElementsCount(p) => structure::elements_count(p, slide),
            Self::SentenceLength(p) => text::sentence_length(p, slide),
            Self::ListNesting(p) => lists::list_nesting(p, slide),
            Self::ListItemsCount(p) => lists::list_items_count(p, slide),
            Self::NestedListsDepth(p) => lists::nested_lists_depth(p, slide),
            Self::MixedLists(p) => lists::mixed_lists(p, slide),
            Self::BulletConsistency(p) => lists::bullet_consistency(p, slide),
            Self::LongPhrases(p) => text::long_phrases(p, slide),
            Self::ParagraphLength(p) => text::paragraph_length(p, slide),
            Self::SentenceCount(p) => text::sentence_count(p, slide),
            Self::TextDensity(p) => structure::text_density(p, slide),
            Self::Capitalization(p) => text::capitalization(p, slide),
            Self::Spelling(p) => spelling::spelling(p, slide, ctx.spell_checker),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_identifiers_round_trip() {
        for check in CheckType::ALL {
            assert_eq!(CheckType::from_identifier(check.identifier()), Some(check));
        }
        assert_eq!(CheckType::from_identifier("font_colour"), None);
    }

    #[test]
    fn test_default_levels() {
        assert_eq!(CheckType::SlidesCount.default_level(), Some(CheckLevel::Document));
        assert_eq!(CheckType::HeadingPresence.default_level(), Some(CheckLevel::Page));
        assert_eq!(CheckType::FontCount.default_level(), None);
        assert_eq!(CheckType::FontCount.allowed_levels(), "document, page");
    }

    #[test]
    fn test_level_aliases() {
        assert_eq!(CheckLevel::parse("presentation"), Some(CheckLevel::Document));
        assert_eq!(CheckLevel::parse("slide"), Some(CheckLevel::Page));
        assert_eq!(CheckLevel::parse("paragraph"), None);
    }

    #[test]
    fn test_null_params_use_defaults() {
        let kind = PageCheckKind::compile(CheckType::ListItemsCount, &Value::Null).unwrap();
        match kind {
            PageCheckKind::ListItemsCount(p) => {
                assert_eq!((p.min_items, p.max_items), (1, 8));
                assert!(!p.check_nested);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_mistyped_param_is_rejected() {
        let err = DocumentCheckKind::compile(CheckType::FontCount, &yaml("max: three")).unwrap_err();
        assert!(matches!(err, RuleError::InvalidParams { ref check, .. } if check == "font_count"));
    }

    #[test]
    fn test_unknown_param_keys_are_ignored() {
        let kind = DocumentCheckKind::compile(CheckType::FontCount, &yaml("max: 3\ncolour: red")).unwrap();
        assert_eq!(kind, DocumentCheckKind::FontCount(LimitParams { max: Some(3) }));
    }

    #[test]
    fn test_page_only_check_rejected_at_document_level() {
        let err = DocumentCheckKind::compile(CheckType::Spelling, &Value::Null).unwrap_err();
        assert!(matches!(err, RuleError::UnsupportedLevel { .. }));
    }
}
