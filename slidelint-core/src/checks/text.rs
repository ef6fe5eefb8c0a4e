use super::{list_examples, preview, Verdict};
use crate::types::Slide;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("static regex"));
static PHRASE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;:]+").expect("static regex"));

/// Sentences shorter than this are too fragmentary to judge capitalization
const MIN_CAPITALIZED_SENTENCE: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Words,
    #[serde(alias = "characters", alias = "symbols")]
    Chars,
}

impl LengthUnit {
    fn label(&self) -> &'static str {
        match self {
            LengthUnit::Words => "words",
            LengthUnit::Chars => "characters",
        }
    }

    fn measure(&self, text: &str) -> usize {
        match self {
            LengthUnit::Words => text.split_whitespace().count(),
            LengthUnit::Chars => text.chars().count(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentenceLengthParams {
    pub max: Option<usize>,
    pub unit: LengthUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongPhrasesParams {
    pub max_length: usize,
}

impl Default for LongPhrasesParams {
    fn default() -> Self {
        Self { max_length: 80 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphLengthParams {
    pub max_length: usize,
    pub min_length: usize,
}

impl Default for ParagraphLengthParams {
    fn default() -> Self {
        Self {
            max_length: 300,
            min_length: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentenceCountParams {
    pub max_sentences: usize,
    pub min_sentences: usize,
}

impl Default for SentenceCountParams {
    fn default() -> Self {
        Self {
            max_sentences: 5,
            min_sentences: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalizationParams {
    pub check_titles: bool,
    pub check_sentences: bool,
}

impl Default for CapitalizationParams {
    fn default() -> Self {
        Self {
            check_titles: true,
            check_sentences: true,
        }
    }
}

/// Split on runs of `.`, `!` and `?`, dropping empty pieces
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split on runs of `,`, `;` and `:`, dropping empty pieces
pub fn split_phrases(sentence: &str) -> Vec<&str> {
    PHRASE_BREAK
        .split(sentence)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn sentence_length(params: &SentenceLengthParams, slide: &Slide) -> Verdict {
    let text = slide.text();
    let sentences = split_sentences(&text);
    if sentences.is_empty() {
        return Verdict::pass("no text to check");
    }
    let Some(max) = params.max else {
        return Verdict::pass("no maximum sentence length configured");
    };

    let long: Vec<(usize, &str)> = sentences
        .iter()
        .map(|s| (params.unit.measure(s), *s))
        .filter(|(length, _)| *length > max)
        .collect();

    match long.first() {
        Some((length, sentence)) => Verdict::fail(format!(
            "{} long sentence(s). Example: \"{}\" ({} {}, maximum {})",
            long.len(),
            preview(sentence, 50),
            length,
            params.unit.label(),
            max
        )),
        None => Verdict::pass("all sentences within limits"),
    }
}

pub fn long_phrases(params: &LongPhrasesParams, slide: &Slide) -> Verdict {
    let long: Vec<String> = slide
        .blocks
        .iter()
        .flat_map(|block| split_sentences(&block.text))
        .flat_map(split_phrases)
        .filter(|phrase| phrase.chars().count() > params.max_length)
        .map(|phrase| preview(phrase, 50))
        .collect();

    if long.is_empty() {
        Verdict::pass("phrase length within limits")
    } else {
        Verdict::fail(format!(
            "phrases longer than {} characters: {}",
            params.max_length,
            list_examples(&long)
        ))
    }
}

pub fn paragraph_length(params: &ParagraphLengthParams, slide: &Slide) -> Verdict {
    let mut too_long = Vec::new();
    let mut too_short = Vec::new();

    for (i, block) in slide.blocks.iter().enumerate() {
        let length = block.text.trim().chars().count();
        let entry = format!("paragraph {} ({} chars)", i + 1, length);
        if length > params.max_length {
            too_long.push(entry);
        } else if length > 0 && length < params.min_length {
            too_short.push(entry);
        }
    }

    let mut issues = Vec::new();
    if !too_long.is_empty() {
        issues.push(format!("paragraphs too long: {}", list_examples(&too_long)));
    }
    if !too_short.is_empty() {
        issues.push(format!("paragraphs too short: {}", list_examples(&too_short)));
    }

    if issues.is_empty() {
        Verdict::pass("paragraph length within limits")
    } else {
        Verdict::fail(issues.join("; "))
    }
}

pub fn sentence_count(params: &SentenceCountParams, slide: &Slide) -> Verdict {
    let offending: Vec<String> = slide
        .blocks
        .iter()
        .enumerate()
        .filter_map(|(i, block)| {
            let count = split_sentences(&block.text).len();
            let too_many = count > params.max_sentences;
            let too_few = count < params.min_sentences && !block.text.trim().is_empty();
            (too_many || too_few).then(|| format!("paragraph {} ({} sentences)", i + 1, count))
        })
        .collect();

    if offending.is_empty() {
        Verdict::pass("sentences per paragraph within limits")
    } else {
        Verdict::fail(format!(
            "sentence count outside {}..={}: {}",
            params.min_sentences,
            params.max_sentences,
            list_examples(&offending)
        ))
    }
}

pub fn capitalization(params: &CapitalizationParams, slide: &Slide) -> Verdict {
    let mut issues = Vec::new();

    for (i, block) in slide.blocks.iter().enumerate() {
        let text = block.text.trim();
        if text.is_empty() {
            continue;
        }

        if params.check_titles && i == 0 && starts_lowercase(text) {
            issues.push("paragraph 1: title should start with a capital letter".to_string());
        }

        if params.check_sentences {
            for sentence in split_sentences(text) {
                if sentence.chars().count() < MIN_CAPITALIZED_SENTENCE {
                    continue;
                }
                if starts_lowercase(sentence) {
                    issues.push(format!(
                        "paragraph {}: sentence '{}' should start with a capital letter",
                        i + 1,
                        preview(sentence, 20)
                    ));
                }
            }
        }
    }

    if issues.is_empty() {
        Verdict::pass("capitalization is consistent")
    } else {
        Verdict::fail(list_examples(&issues))
    }
}

// Digits, quotes and symbols are allowed to lead; only a lowercase letter is flagged
fn starts_lowercase(text: &str) -> bool {
    text.chars().next().map(|c| c.is_lowercase()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, Paragraph, TextRun};

    fn slide(texts: &[&str]) -> Slide {
        let blocks = texts
            .iter()
            .map(|text| {
                Paragraph::from_runs(vec![TextRun {
                    text: text.to_string(),
                    font_family: "Arial".to_string(),
                    font_size: 18.0,
                    is_bold: false,
                    is_italic: false,
                    bbox: BoundingBox::default(),
                }])
            })
            .collect();
        Slide::new(3, 960.0, 540.0).with_blocks(blocks)
    }

    #[test]
    fn test_sentence_splitting() {
        assert_eq!(split_sentences("One. Two!! Three?"), vec!["One", "Two", "Three"]);
        assert!(split_sentences(" ... ").is_empty());
        assert_eq!(split_phrases("a, b; c: d"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_sentence_length_in_words() {
        let page = slide(&["This sentence has exactly six words. Short one."]);
        let params = SentenceLengthParams { max: Some(5), unit: LengthUnit::Words };
        let verdict = sentence_length(&params, &page);
        assert!(!verdict.is_pass());
        assert!(verdict.message.starts_with("1 long sentence(s)"));
        assert!(verdict.message.contains("6 words"));
    }

    #[test]
    fn test_sentence_length_in_chars() {
        let page = slide(&["Tiny."]);
        let params = SentenceLengthParams { max: Some(3), unit: LengthUnit::Chars };
        assert!(!sentence_length(&params, &page).is_pass());
    }

    #[test]
    fn test_sentence_length_unit_aliases() {
        let params: SentenceLengthParams = serde_yaml::from_str("max: 20\nunit: characters").unwrap();
        assert_eq!(params.unit, LengthUnit::Chars);
    }

    #[test]
    fn test_long_phrases() {
        let long = "word ".repeat(20);
        let page = slide(&[&format!("Short, {}", long)]);
        let verdict = long_phrases(&LongPhrasesParams::default(), &page);
        assert!(!verdict.is_pass());
        assert!(long_phrases(&LongPhrasesParams::default(), &slide(&["Short, sweet."])).is_pass());
    }

    #[test]
    fn test_paragraph_length_long_and_short() {
        let page = slide(&["Hi", &"x".repeat(301), "A reasonable paragraph."]);
        let verdict = paragraph_length(&ParagraphLengthParams::default(), &page);
        assert_eq!(
            verdict.message,
            "paragraphs too long: paragraph 2 (301 chars); paragraphs too short: paragraph 1 (2 chars)"
        );
    }

    #[test]
    fn test_sentence_count() {
        let page = slide(&["One. Two. Three. Four. Five. Six.", "Fine."]);
        let verdict = sentence_count(&SentenceCountParams::default(), &page);
        assert!(!verdict.is_pass());
        assert!(verdict.message.contains("paragraph 1 (6 sentences)"));
        assert!(!verdict.message.contains("paragraph 2"));
    }

    #[test]
    fn test_capitalization_flags_lowercase_only() {
        let ok = slide(&["Title", "Sentence one. 2024 was good. \"Quoted\" start."]);
        assert!(capitalization(&CapitalizationParams::default(), &ok).is_pass());

        let bad = slide(&["title here", "Good start. then lowercase."]);
        let verdict = capitalization(&CapitalizationParams::default(), &bad);
        assert!(!verdict.is_pass());
        assert!(verdict.message.contains("title should start"));
        assert!(verdict.message.contains("'then lowercase'"));
    }
}
