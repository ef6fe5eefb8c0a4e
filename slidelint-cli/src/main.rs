use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

// Import from slidelint-core
use slidelint_core::{
    load_validation_engine_from_str, CharacterExtractor, CheckType, DocumentProcessor,
    JsonCharacterExtractor, LintConfig, Stage, StageProfiler, ValidationReport,
};

// Import CLI utilities
use slidelint::{render, OutputFormat};

#[derive(Parser)]
#[command(name = "slidelint")]
#[command(about = "Reconstructs slide structure from a character dump and validates it against YAML rules")]
struct Args {
    /// Path to the character dump (JSON) of the presentation
    #[arg(short, long, required_unless_present = "list_checks")]
    input: Option<String>,

    /// Path to the rule file (YAML)
    #[arg(short, long, required_unless_present = "list_checks")]
    rules: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Report format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Evaluate checks on a single thread
    #[arg(long)]
    sequential: bool,

    /// Skip the external spelling service
    #[arg(long)]
    no_spellcheck: bool,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Show available checks and exit
    #[arg(long)]
    list_checks: bool,

    /// Save the reconstructed presentation (JSON) to this path
    #[arg(long)]
    dump_document: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_checks {
        show_checks();
        return Ok(());
    }

    let (Some(input), Some(rules_path)) = (args.input.as_deref(), args.rules.as_deref()) else {
        anyhow::bail!("--input and --rules are required");
    };

    println!("🦀 Slidelint");

    // Load config using functional pattern
    let mut config = LintConfig::load_with_fallback(args.config.as_deref());
    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {}", config_path);
    } else {
        println!("📋 Using default config");
    }

    // Apply CLI overrides to config
    if args.no_spellcheck {
        config.spelling.enabled = false;
    }
    if args.sequential {
        config.validation.parallel = false;
    }

    // Rules first: a bad rule file aborts before any document work
    let rules_text = std::fs::read_to_string(rules_path)
        .with_context(|| format!("Failed to read rule file {}", rules_path))?;
    let mut engine = match load_validation_engine_from_str(&rules_text) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("❌ Rule compilation failed: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "📜 Compiled {} document-level and {} page-level checks from {}",
        engine.document_checks().len(),
        engine.page_checks().len(),
        rules_path
    );

    attach_spell_checker(&mut engine, &config);

    let extractor = JsonCharacterExtractor::new();
    let input_path = Path::new(input);
    if !extractor.supports_file_type(input_path) {
        log::warn!("{} does not look like a JSON character dump", input);
    }

    println!("📄 Processing: {}", input);
    let mut profiler = StageProfiler::new(args.profile);
    let raw = profiler.time_stage(
        Stage::Extraction,
        || extractor.extract_file(input_path),
        |raw| raw.as_ref().map_or(0, |doc| doc.pages.len()),
    )?;
    let processor = DocumentProcessor::new(&config);
    let document = processor.process_with_profiler(&raw, &mut profiler);
    println!("✅ Reconstructed {} slides", document.slides.len());

    if let Some(dump_path) = &args.dump_document {
        std::fs::write(dump_path, serde_json::to_string_pretty(&document)?)
            .with_context(|| format!("Failed to write {}", dump_path))?;
        println!("💾 Presentation saved to: {}", dump_path);
    }

    let results = profiler.time_stage(
        Stage::Validation,
        || {
            if config.validation.parallel {
                engine.validate_parallel(&document)
            } else {
                engine.validate(&document)
            }
        },
        Vec::len,
    );
    let report = ValidationReport::build(&document, results, Some(&rules_text));
    let rendered = render(&report, args.format)?;

    match &args.output {
        Some(output_path) => {
            std::fs::write(output_path, &rendered)
                .with_context(|| format!("Failed to write {}", output_path))?;
            println!("💾 Report saved to: {}", output_path);
        }
        None => println!("{}", rendered),
    }

    profiler.print_summary();

    if report.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "http-speller")]
fn attach_spell_checker(engine: &mut slidelint_core::ValidationEngine, config: &LintConfig) {
    if !config.spelling.enabled {
        println!("🔤 Spell checking disabled");
        return;
    }
    println!("🔤 Spell checking via {}", config.spelling.endpoint);
    engine.set_spell_checker(std::sync::Arc::new(slidelint_core::HttpSpellChecker::new(
        &config.spelling,
    )));
}

/// Fallback when no spell checker is compiled in
#[cfg(not(feature = "http-speller"))]
fn attach_spell_checker(_engine: &mut slidelint_core::ValidationEngine, _config: &LintConfig) {
    println!("🔤 Spell checking not compiled in (enable feature http-speller)");
}

fn show_checks() {
    println!("\n📋 Available checks:");
    for check in CheckType::ALL {
        let default = check
            .default_level()
            .map(|level| level.as_str())
            .unwrap_or("required");
        println!(
            "  {:<20} levels: {:<16} default: {:<9} {}",
            check.identifier(),
            check.allowed_levels(),
            default,
            check.description()
        );
    }

    println!("\n📝 Rule file example:");
    println!("  rules:");
    println!("    - rule:");
    println!("        name: At most three fonts");
    println!("        check: font_count");
    println!("        level: document");
    println!("        params: {{ max: 3 }}");
    println!("        severity: error");

    println!("\n📝 Usage Examples:");
    println!("  slidelint -i deck.json -r rules.yaml");
    println!("  slidelint -i deck.json -r rules.yaml -f json -o report.json");
    println!("  slidelint -i deck.json -r rules.yaml --no-spellcheck --profile");
}
