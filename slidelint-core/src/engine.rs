//! Validation engine
//!
//! Holds the compiled checks of one rule file and evaluates them against a
//! reconstructed presentation. Result order is fixed: every document check in
//! compile order, then for each slide in ascending page number every page
//! check whose scope includes it, in compile order. The parallel path fans
//! the same jobs out on rayon and stable-sorts by that key afterwards, so both
//! paths return identical vectors. Spelling jobs go to the rayon pool on
//! either path.

use crate::checks::{CheckContext, DocumentCheck, PageCheck, ValidationResult};
use crate::spelling::SpellChecker;
use crate::types::{Presentation, Slide};
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;

/// (phase, slide position, compile index)
type OrderKey = (u8, usize, usize);

const DOCUMENT_PHASE: u8 = 0;
const PAGE_PHASE: u8 = 1;

#[derive(Default, Clone)]
pub struct ValidationEngine {
    document_checks: Vec<DocumentCheck>,
    page_checks: Vec<PageCheck>,
    spell_checker: Option<Arc<dyn SpellChecker>>,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document_check(&mut self, check: DocumentCheck) {
        self.document_checks.push(check);
    }

    pub fn add_page_check(&mut self, check: PageCheck) {
        self.page_checks.push(check);
    }

    pub fn set_spell_checker(&mut self, checker: Arc<dyn SpellChecker>) {
        self.spell_checker = Some(checker);
    }

    pub fn with_spell_checker(mut self, checker: Arc<dyn SpellChecker>) -> Self {
        self.set_spell_checker(checker);
        self
    }

    pub fn document_checks(&self) -> &[DocumentCheck] {
        &self.document_checks
    }

    pub fn page_checks(&self) -> &[PageCheck] {
        &self.page_checks
    }

    pub fn has_spell_checker(&self) -> bool {
        self.spell_checker.is_some()
    }

    fn context(&self) -> CheckContext<'_> {
        CheckContext {
            spell_checker: self.spell_checker.as_deref(),
        }
    }

    /// Evaluate local checks one after another on the calling thread.
    ///
    /// Checks that call out to the spell checker are handed to the rayon pool
    /// as they are collected, so a slow service never stalls the local checks.
    pub fn validate(&self, document: &Presentation) -> Vec<ValidationResult> {
        let ctx = self.context();
        let slides = slides_in_order(document);
        let (remote, local): (Vec<PageJob<'_>>, Vec<PageJob<'_>>) = self
            .page_jobs(&slides)
            .into_iter()
            .partition(|job| job.check.calls_spell_checker());

        let (mut keyed, remote_results) = rayon::join(
            || {
                let mut keyed: Vec<(OrderKey, ValidationResult)> = self
                    .document_checks
                    .iter()
                    .enumerate()
                    .map(|(index, check)| ((DOCUMENT_PHASE, 0, index), check.evaluate(document)))
                    .collect();
                keyed.extend(local.into_iter().map(|job| job.run(&ctx)));
                keyed
            },
            || {
                remote
                    .into_par_iter()
                    .map(|job| job.run(&ctx))
                    .collect::<Vec<_>>()
            },
        );
        keyed.extend(remote_results);
        keyed.sort_by_key(|(key, _)| *key);

        log::info!("Validation produced {} results", keyed.len());
        keyed.into_iter().map(|(_, result)| result).collect()
    }

    pub fn validate_parallel(&self, document: &Presentation) -> Vec<ValidationResult> {
        let ctx = self.context();
        let slides = slides_in_order(document);
        let page_jobs = self.page_jobs(&slides);

        let mut keyed: Vec<(OrderKey, ValidationResult)> = self
            .document_checks
            .par_iter()
            .enumerate()
            .map(|(index, check)| ((DOCUMENT_PHASE, 0, index), check.evaluate(document)))
            .collect();

        keyed.par_extend(page_jobs.into_par_iter().map(|job| job.run(&ctx)));

        keyed.sort_by_key(|(key, _)| *key);
        log::info!("Validation produced {} results (parallel)", keyed.len());
        keyed.into_iter().map(|(_, result)| result).collect()
    }

    /// Every (slide, page check) pair in scope, in report order
    fn page_jobs<'a>(&'a self, slides: &[&'a Slide]) -> Vec<PageJob<'a>> {
        slides
            .iter()
            .enumerate()
            .flat_map(|(position, &slide)| {
                self.page_checks
                    .iter()
                    .enumerate()
                    .filter(move |(_, check)| check.applies_to(slide.page_number))
                    .map(move |(index, check)| PageJob {
                        key: (PAGE_PHASE, position, index),
                        slide,
                        check,
                    })
            })
            .collect()
    }
}

struct PageJob<'a> {
    key: OrderKey,
    slide: &'a Slide,
    check: &'a PageCheck,
}

impl PageJob<'_> {
    fn run(&self, ctx: &CheckContext<'_>) -> (OrderKey, ValidationResult) {
        (self.key, self.check.evaluate(self.slide, ctx))
    }
}

impl fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("document_checks", &self.document_checks)
            .field("page_checks", &self.page_checks)
            .field("spell_checker", &self.spell_checker.as_ref().map(|c| c.name()))
            .finish()
    }
}

/// Slides sorted by page number; ties keep document order
fn slides_in_order(document: &Presentation) -> Vec<&Slide> {
    let mut slides: Vec<&Slide> = document.slides.iter().collect();
    slides.sort_by_key(|slide| slide.page_number);
    slides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::catalog::{DocumentCheckKind, PageCheckKind};
    use crate::checks::fonts::LimitParams;
    use crate::checks::structure::SlidesCountParams;
    use crate::checks::spelling::SpellingParams;
    use crate::checks::{Scope, Severity};
    use crate::error::SpellCheckError;
    use crate::spelling::SpellingError;
    use crate::types::{BoundingBox, Paragraph, TextRun};
    use std::time::{Duration, Instant};

    fn page_check(name: &str, scope: Scope) -> PageCheck {
        PageCheck {
            rule_name: name.to_string(),
            severity: Severity::Warning,
            scope,
            kind: PageCheckKind::ElementsCount(LimitParams { max: Some(5) }),
        }
    }

    fn engine() -> ValidationEngine {
        let mut engine = ValidationEngine::new();
        engine.add_page_check(page_check("every", Scope::All));
        engine.add_document_check(DocumentCheck {
            rule_name: "count".to_string(),
            severity: Severity::Error,
            kind: DocumentCheckKind::SlidesCount(SlidesCountParams { min: None, max: Some(2) }),
        });
        engine.add_page_check(page_check("even", Scope::from_pages([2, 4])));
        engine
    }

    fn document() -> Presentation {
        // deliberately out of page order
        Presentation::new(vec![
            Slide::new(3, 960.0, 540.0),
            Slide::new(1, 960.0, 540.0),
            Slide::new(4, 960.0, 540.0),
            Slide::new(2, 960.0, 540.0),
        ])
    }

    #[test]
    fn test_document_checks_first_then_pages_ascending() {
        let results = engine().validate(&document());
        let order: Vec<(&str, &str)> = results
            .iter()
            .map(|r| (r.rule_name.as_str(), r.message.split(':').next().unwrap_or("")))
            .collect();
        assert_eq!(
            order,
            vec![
                ("count", "Document has 4 slides, maximum allowed is 2"),
                ("every", "Slide 1"),
                ("every", "Slide 2"),
                ("even", "Slide 2"),
                ("every", "Slide 3"),
                ("every", "Slide 4"),
                ("even", "Slide 4"),
            ]
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let engine = engine();
        let doc = document();
        assert_eq!(engine.validate(&doc), engine.validate_parallel(&doc));
    }

    struct SlowSpeller(Duration);

    impl SpellChecker for SlowSpeller {
        fn check(&self, _text: &str) -> Result<Vec<SpellingError>, SpellCheckError> {
            std::thread::sleep(self.0);
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    fn engine_with_spelling() -> ValidationEngine {
        let mut engine = engine();
        engine.add_page_check(PageCheck {
            rule_name: "spelling".to_string(),
            severity: Severity::Info,
            scope: Scope::All,
            kind: PageCheckKind::Spelling(SpellingParams { enabled: true }),
        });
        engine.add_page_check(page_check("after", Scope::from_pages([1])));
        engine.with_spell_checker(Arc::new(SlowSpeller(Duration::from_millis(200))))
    }

    fn document_with_text() -> Presentation {
        let mut doc = document();
        for slide in &mut doc.slides {
            slide.blocks.push(Paragraph::from_runs(vec![TextRun {
                text: format!("Slide {} text", slide.page_number),
                font_family: "Arial".to_string(),
                font_size: 18.0,
                is_bold: false,
                is_italic: false,
                bbox: BoundingBox::new(40.0, 40.0, 400.0, 58.0),
            }]));
        }
        doc
    }

    #[test]
    fn test_spelling_results_keep_their_place() {
        let engine = engine_with_spelling();
        let doc = document_with_text();
        let results = engine.validate(&doc);
        let slide_one: Vec<&str> = results
            .iter()
            .filter(|r| r.message.starts_with("Slide 1:"))
            .map(|r| r.rule_name.as_str())
            .collect();
        assert_eq!(slide_one, vec!["every", "spelling", "after"]);
        assert_eq!(results, engine.validate_parallel(&doc));
    }

    #[test]
    fn test_sequential_path_does_not_wait_on_each_spelling_call() {
        let engine = engine_with_spelling();
        let doc = document_with_text();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();

        let started = Instant::now();
        let results = pool.install(|| engine.validate(&doc));
        // four slides at 200ms each would take 800ms one after another
        assert!(started.elapsed() < Duration::from_millis(700));
        assert_eq!(results.iter().filter(|r| r.rule_name == "spelling").count(), 4);
    }

    #[test]
    fn test_empty_engine() {
        assert!(ValidationEngine::new().validate(&document()).is_empty());
    }
}
