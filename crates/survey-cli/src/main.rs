//! CLI binary for scoping engineering-geological surveys.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use survey_knowledge::builtin_registry;
use survey_rules::{BlockRegistry, EngineConfig, RulesEngine, Severity};
use survey_types::{GeologicalInput, RulesEngineResult, WorkCategory};

#[derive(Parser)]
#[command(name = "survey", version, about = "Rule-based survey scope calculator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the work list for a project description
    Run {
        /// Path to the project input (.json)
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Abort on the first failing rule instead of recording it
        #[arg(long)]
        strict: bool,

        /// Let reference-tier provisions contribute optional works
        #[arg(long)]
        include_reference_works: bool,

        /// Engine configuration file (.json). Flags override its values.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Lint the built-in instruction registry
    Validate,

    /// List instruction blocks of the built-in registry
    Blocks {
        /// Only show blocks of this section
        #[arg(short, long)]
        section: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            input,
            format,
            strict,
            include_reference_works,
            config,
        } => {
            let config = load_config(config.as_deref(), strict, include_reference_works)?;
            let output = cmd_run(&input, format, config)?;
            print!("{output}");
        }
        Commands::Validate => {
            let (report, has_error) = cmd_validate(&builtin_registry());
            print!("{report}");
            if has_error {
                std::process::exit(1);
            }
        }
        Commands::Blocks { section } => {
            print!("{}", cmd_blocks(&builtin_registry(), section.as_deref()));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_input(path: &Path) -> anyhow::Result<GeologicalInput> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input {}", path.display()))?;
    let input = serde_json::from_str(&source)
        .with_context(|| format!("Invalid project input in {}", path.display()))?;
    Ok(input)
}

/// Read the config file, if any, then apply command-line overrides.
fn load_config(
    path: Option<&Path>,
    strict: bool,
    include_reference_works: bool,
) -> anyhow::Result<EngineConfig> {
    let mut config = match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            EngineConfig::from_json(&source)
                .with_context(|| format!("Invalid engine config in {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    config.strict |= strict;
    config.include_reference_works |= include_reference_works;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_run(path: &Path, format: OutputFormat, config: EngineConfig) -> anyhow::Result<String> {
    let input = load_input(path)?;
    tracing::debug!(input = %path.display(), strict = config.strict, "Loaded project input");
    let engine = RulesEngine::with_config(builtin_registry(), config);
    let result = engine.run(&input)?;

    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&result)? + "\n",
        OutputFormat::Text => render_text(&input, &result),
    })
}

/// Lint report and whether any finding is an error.
fn cmd_validate(registry: &BlockRegistry) -> (String, bool) {
    let diagnostics = survey_rules::validate(registry);
    if diagnostics.is_empty() {
        return (format!("Registry is valid ({} blocks)\n", registry.len()), false);
    }

    let mut out = String::new();
    let mut has_error = false;
    for diag in &diagnostics {
        let severity = match diag.severity {
            Severity::Error => {
                has_error = true;
                "ERROR"
            }
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
        };
        let _ = writeln!(out, "[{}] {}: {}", severity, diag.rule, diag.message);
    }
    (out, has_error)
}

fn cmd_blocks(registry: &BlockRegistry, section: Option<&str>) -> String {
    let mut out = String::new();
    for block in registry.blocks() {
        if section.is_some_and(|s| s != block.section) {
            continue;
        }
        let tiers: Vec<String> = block.variants.iter().map(|v| v.tier.to_string()).collect();
        let _ = writeln!(
            out,
            "{:<32} [{}] p={} {} ({})",
            block.id,
            block.section,
            block.priority,
            block.title,
            tiers.join(", ")
        );
        if !block.depends_on.is_empty() {
            let _ = writeln!(out, "{:<32} depends on: {}", "", block.depends_on.join(", "));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn category_label(category: WorkCategory) -> &'static str {
    match category {
        WorkCategory::Mandatory => "Обязательные работы",
        WorkCategory::Recommended => "Рекомендуемые работы",
        WorkCategory::Optional => "Дополнительные работы",
    }
}

fn render_text(input: &GeologicalInput, result: &RulesEngineResult) -> String {
    let mut out = String::new();
    if let Some(name) = &input.object_name {
        let _ = writeln!(out, "Объект: {name}");
    }

    let mut current = None;
    for work in &result.works {
        if current != Some(work.category) {
            current = Some(work.category);
            let _ = writeln!(out, "\n{}:", category_label(work.category));
        }
        let citation = work
            .normative
            .as_ref()
            .map(|n| n.to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:<36} {:>10.1} {:<10} {}",
            work.name, work.quantity, work.unit, citation
        );
    }

    let _ = writeln!(out, "\nПрименённые положения:");
    for block in &result.applied_blocks {
        let _ = writeln!(
            out,
            "  {} -> {} [{}] {}",
            block.block_id, block.variant_id, block.tier, block.normative
        );
    }

    if !result.diagnostics.is_empty() {
        let _ = writeln!(out, "\nОшибки правил:");
        for d in &result.diagnostics {
            let _ = writeln!(out, "  {} ({}): {}", d.block_id, d.stage, d.message);
        }
    }

    let stats = &result.statistics;
    let _ = writeln!(
        out,
        "\nИтого: {} работ (обязательных {}, рекомендуемых {}, дополнительных {}), положений {}",
        stats.total_works,
        stats.mandatory_works,
        stats.recommended_works,
        stats.optional_works,
        stats.blocks_applied
    );
    out
}
