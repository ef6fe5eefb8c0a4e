use crate::config::LintConfig;
use crate::extraction::{CharacterExtractor, RawDocument, RawPage};
use crate::layout::{
    FontNameNormalizer, GapIndentParagraphGrouper, LineGrouper, ListStructureDetector,
    MarkerListDetector, PageNumberDetector, ParagraphGrouper, ProximityLineGrouper, RunNormalizer,
    ZonePageNumberDetector,
};
use crate::types::{FontUsage, Presentation, Slide};
use anyhow::Result;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::{Duration, Instant};

/// A timed phase of a lint run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Extraction,
    Reconstruction,
    PageNumbers,
    FontInventory,
    Validation,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Extraction => "Character extraction",
            Stage::Reconstruction => "Slide reconstruction",
            Stage::PageNumbers => "Page-number detection",
            Stage::FontInventory => "Font inventory",
            Stage::Validation => "Rule evaluation",
        }
    }

    /// What the item count of this stage measures
    pub fn unit(self) -> &'static str {
        match self {
            Stage::Extraction => "pages",
            Stage::Reconstruction => "slides",
            Stage::PageNumbers => "labels",
            Stage::FontInventory => "fonts",
            Stage::Validation => "results",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageTiming {
    pub stage: Stage,
    pub elapsed: Duration,
    /// Pages, slides, labels, fonts or results produced by the stage
    pub items: usize,
}

/// Per-stage wall time and throughput of a lint run, shown with `--profile`
pub struct StageProfiler {
    enabled: bool,
    timings: Vec<StageTiming>,
}

impl StageProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    /// Run `f` as `stage`; `items` counts what it produced
    pub fn time_stage<R>(
        &mut self,
        stage: Stage,
        f: impl FnOnce() -> R,
        items: impl FnOnce(&R) -> usize,
    ) -> R {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();
        let items = items(&result);

        log::info!(
            "{}: {}ms for {} {}",
            stage.label(),
            elapsed.as_millis(),
            items,
            stage.unit()
        );
        self.timings.push(StageTiming { stage, elapsed, items });
        result
    }

    pub fn timings(&self) -> &[StageTiming] {
        &self.timings
    }

    /// Table of stages with time share and per-item cost; empty when disabled
    pub fn summary(&self) -> String {
        if !self.enabled || self.timings.is_empty() {
            return String::new();
        }

        let total: Duration = self.timings.iter().map(|t| t.elapsed).sum();
        let mut lines = vec!["📊 Stage timings:".to_string()];
        for timing in &self.timings {
            let share = if total.is_zero() {
                0.0
            } else {
                timing.elapsed.as_secs_f64() / total.as_secs_f64() * 100.0
            };
            let per_item = if timing.items == 0 {
                String::from("-")
            } else {
                format!(
                    "{:.3}ms/{}",
                    timing.elapsed.as_secs_f64() * 1000.0 / timing.items as f64,
                    timing.stage.unit().trim_end_matches('s')
                )
            };
            lines.push(format!(
                "   {:.<28} {:>6}ms {:>5.1}%  {:>5} {:<7} {}",
                timing.stage.label(),
                timing.elapsed.as_millis(),
                share,
                timing.items,
                timing.stage.unit(),
                per_item
            ));
        }
        lines.push(format!("   {:.<28} {:>6}ms", "Total", total.as_millis()));
        lines.join("\n")
    }

    pub fn print_summary(&self) {
        let summary = self.summary();
        if !summary.is_empty() {
            println!("\n{}", summary);
        }
    }
}

/// Reconstructs a `Presentation` from raw characters.
///
/// Pages are structured independently (normalize, lines, paragraphs, lists)
/// and in parallel; the page-number pass runs once every page is done.
pub struct DocumentProcessor {
    normalizer: Box<dyn RunNormalizer + Send + Sync>,
    line_grouper: Box<dyn LineGrouper + Send + Sync>,
    paragraph_grouper: Box<dyn ParagraphGrouper + Send + Sync>,
    list_detector: Box<dyn ListStructureDetector + Send + Sync>,
    page_number_detector: Box<dyn PageNumberDetector + Send + Sync>,
}

impl DocumentProcessor {
    /// Default stages tuned by `config`
    pub fn new(config: &LintConfig) -> Self {
        Self::new_with_stages(
            Box::new(FontNameNormalizer::new()),
            Box::new(ProximityLineGrouper::new(config.layout.line_threshold)),
            Box::new(GapIndentParagraphGrouper::new(
                config.layout.paragraph_gap_threshold,
                config.layout.indent_threshold,
            )),
            Box::new(MarkerListDetector::new(config.list_detection.clone())),
            Box::new(ZonePageNumberDetector::new(config.page_numbers.clone())),
        )
    }

    /// Create DocumentProcessor with every stage injected
    pub fn new_with_stages(
        normalizer: Box<dyn RunNormalizer + Send + Sync>,
        line_grouper: Box<dyn LineGrouper + Send + Sync>,
        paragraph_grouper: Box<dyn ParagraphGrouper + Send + Sync>,
        list_detector: Box<dyn ListStructureDetector + Send + Sync>,
        page_number_detector: Box<dyn PageNumberDetector + Send + Sync>,
    ) -> Self {
        Self {
            normalizer,
            line_grouper,
            paragraph_grouper,
            list_detector,
            page_number_detector,
        }
    }

    /// Structure a single page; no cross-page state is touched
    pub fn build_slide(&self, page_number: u32, page: &RawPage) -> Slide {
        let runs = self.normalizer.normalize_page(&page.chars);
        let lines = self.line_grouper.group_lines(runs);
        let mut blocks = self.paragraph_grouper.group_paragraphs(lines);
        self.list_detector.detect_all(&mut blocks);

        log::debug!(
            "Page {}: {} chars -> {} blocks ({} list items)",
            page_number,
            page.chars.len(),
            blocks.len(),
            blocks.iter().filter(|b| b.is_list_item()).count()
        );
        Slide::new(page_number, page.width, page.height).with_blocks(blocks)
    }

    pub fn process(&self, raw: &RawDocument) -> Presentation {
        self.process_with_profiler(raw, &mut StageProfiler::new(false))
    }

    pub fn process_with_profiler(&self, raw: &RawDocument, profiler: &mut StageProfiler) -> Presentation {
        let pages = number_pages(raw);

        let mut slides: Vec<Slide> = profiler.time_stage(
            Stage::Reconstruction,
            || {
                pages
                    .par_iter()
                    .map(|(page_number, page)| self.build_slide(*page_number, page))
                    .collect()
            },
            Vec::len,
        );
        slides.sort_by_key(|slide| slide.page_number);

        // Barrier: every page is structured before labels are compared across pages
        let sequence = profiler.time_stage(
            Stage::PageNumbers,
            || self.page_number_detector.detect_page_numbers(&mut slides),
            |sequence| sequence.numbers.len(),
        );

        let fonts_used = profiler.time_stage(
            Stage::FontInventory,
            || font_inventory(&pages),
            BTreeMap::len,
        );

        let mut metadata = raw.metadata.clone();
        if metadata.page_count == 0 {
            metadata.page_count = slides.len() as u32;
        }

        log::info!(
            "Structured {} slides ({} with page numbers, {} fonts)",
            slides.len(),
            slides.iter().filter(|s| s.detected_page_number.is_some()).count(),
            fonts_used.len()
        );

        Presentation {
            slides,
            metadata,
            fonts_used,
            page_number_sequence: Some(sequence),
        }
    }

    /// Extract and process a file in one go
    pub fn process_file(&self, extractor: &dyn CharacterExtractor, input: &Path) -> Result<Presentation> {
        log::info!("Extracting {} with {}", input.display(), extractor.name());
        let raw = extractor.extract_file(input)?;
        Ok(self.process(&raw))
    }
}

/// Pair every page with its 1-based number. Pages without one (or with 0)
/// take their position; later pages repeating a number are dropped.
fn number_pages(raw: &RawDocument) -> Vec<(u32, &RawPage)> {
    let mut seen = BTreeSet::new();
    let mut pages = Vec::with_capacity(raw.pages.len());

    for (index, page) in raw.pages.iter().enumerate() {
        let page_number = page
            .page_number
            .filter(|&n| n > 0)
            .unwrap_or(index as u32 + 1);
        if !seen.insert(page_number) {
            log::warn!("Duplicate page number {}, dropping page at position {}", page_number, index + 1);
            continue;
        }
        pages.push((page_number, page));
    }
    pages
}

fn font_inventory(pages: &[(u32, &RawPage)]) -> BTreeMap<String, FontUsage> {
    let mut fonts: BTreeMap<String, FontUsage> = BTreeMap::new();
    for (page_number, page) in pages {
        for c in &page.chars {
            let usage = fonts.entry(c.fontname.clone()).or_insert_with(|| FontUsage {
                size: c.size,
                pages: BTreeSet::new(),
                char_count: 0,
            });
            usage.pages.insert(*page_number);
            usage.char_count += 1;
        }
    }
    fonts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::RawChar;
    use crate::types::ListType;

    fn word(text: &str, font: &str, size: f32, x0: f32, top: f32) -> Vec<RawChar> {
        let width = size * 0.5;
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                let x = x0 + i as f32 * width;
                RawChar::new(&c.to_string(), font, size, x, top, x + width, top + size)
            })
            .collect()
    }

    fn page(page_number: Option<u32>, chars: Vec<RawChar>) -> RawPage {
        RawPage {
            page_number,
            width: 960.0,
            height: 540.0,
            chars,
        }
    }

    #[test]
    fn test_builds_paragraphs_and_lists() {
        let mut chars = word("Agenda", "ABCDEF+Arial-Bold", 32.0, 40.0, 40.0);
        chars.extend(word("• First point", "ArialMT", 18.0, 60.0, 120.0));
        chars.extend(word("7", "ArialMT", 10.0, 900.0, 520.0));
        let raw = RawDocument {
            pages: vec![page(None, chars)],
            ..Default::default()
        };

        let doc = DocumentProcessor::new(&LintConfig::default()).process(&raw);
        let slide = &doc.slides[0];
        assert_eq!(slide.page_number, 1);
        assert_eq!(slide.blocks[0].text, "Agenda");
        assert!(slide.blocks[0].runs.iter().all(|r| r.is_bold && r.font_family == "Arial"));
        assert_eq!(slide.blocks[1].list_type, ListType::Bullet);
        assert_eq!(slide.blocks[1].text, "First point");
        assert_eq!(slide.blocks[1].level, 1);
        assert_eq!(slide.detected_page_number.as_deref(), Some("7"));
        assert_eq!(doc.metadata.page_count, 1);
    }

    #[test]
    fn test_page_numbering_and_duplicates() {
        let raw = RawDocument {
            pages: vec![
                page(Some(2), word("Two", "Arial", 18.0, 40.0, 40.0)),
                page(None, word("Second", "Arial", 18.0, 40.0, 40.0)),
                page(Some(1), word("One", "Arial", 18.0, 40.0, 40.0)),
            ],
            ..Default::default()
        };
        // page 2 is claimed twice: explicitly, then by position
        let doc = DocumentProcessor::new(&LintConfig::default()).process(&raw);
        let numbers: Vec<u32> = doc.slides.iter().map(|s| s.page_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(doc.slides[1].text(), "Two");
    }

    #[test]
    fn test_font_inventory_uses_raw_names() {
        let mut chars = word("Hi", "ABCDEF+Arial-BoldMT", 24.0, 40.0, 40.0);
        chars.extend(word("you", "Georgia", 12.0, 40.0, 100.0));
        let raw = RawDocument {
            pages: vec![page(None, chars), page(None, word("x", "Georgia", 14.0, 40.0, 40.0))],
            ..Default::default()
        };
        let doc = DocumentProcessor::new(&LintConfig::default()).process(&raw);
        let georgia = &doc.fonts_used["Georgia"];
        assert_eq!(georgia.char_count, 4);
        assert_eq!(georgia.size, 12.0);
        assert_eq!(georgia.pages, BTreeSet::from([1, 2]));
        assert!(doc.fonts_used.contains_key("ABCDEF+Arial-BoldMT"));
    }

    #[test]
    fn test_empty_page_yields_no_blocks() {
        let raw = RawDocument {
            pages: vec![page(None, Vec::new())],
            ..Default::default()
        };
        let doc = DocumentProcessor::new(&LintConfig::default()).process(&raw);
        assert!(doc.slides[0].blocks.is_empty());
        assert_eq!(doc.page_number_sequence.map(|s| s.contiguous), Some(true));
    }

    #[test]
    fn test_profiler_records_stages_with_counts() {
        let numbered = |label: &str| {
            let mut chars = word("Title", "Arial", 32.0, 40.0, 40.0);
            chars.extend(word("Body text", "Arial", 18.0, 40.0, 120.0));
            chars.extend(word(label, "Arial", 10.0, 900.0, 520.0));
            chars
        };
        let raw = RawDocument {
            pages: vec![page(Some(1), numbered("1")), page(Some(2), numbered("2"))],
            ..Default::default()
        };
        let mut profiler = StageProfiler::new(true);
        DocumentProcessor::new(&LintConfig::default()).process_with_profiler(&raw, &mut profiler);

        let recorded: Vec<(Stage, usize)> = profiler
            .timings()
            .iter()
            .map(|t| (t.stage, t.items))
            .collect();
        assert_eq!(
            recorded,
            vec![
                (Stage::Reconstruction, 2),
                (Stage::PageNumbers, 2),
                (Stage::FontInventory, 1),
            ]
        );

        let summary = profiler.summary();
        assert!(summary.contains("Slide reconstruction"));
        assert!(summary.contains("2 slides"));
        assert!(summary.contains("ms/slide"));
    }

    #[test]
    fn test_disabled_profiler_records_nothing() {
        let mut profiler = StageProfiler::new(false);
        let value = profiler.time_stage(Stage::Validation, || 7, |_| 1);
        assert_eq!(value, 7);
        assert!(profiler.timings().is_empty());
        assert_eq!(profiler.summary(), "");
    }
}
