use anyhow::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mdnorm::report::{self, OutputFormat};
use mdnorm::{BatchProcessor, ConfigManager, NormalizerConfig, Preset, RuleCategory, RuleSet, WriteMode};

#[derive(Parser)]
#[command(name = "mdnorm")]
#[command(about = "Normalize Markdown structure in place until every rule agrees")]
struct Args {
    /// Files or directories to normalize
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in preset: full, relaxed, blank-lines or lists
    #[arg(long)]
    preset: Option<Preset>,

    /// Report files that would change without writing them
    #[arg(long)]
    check: bool,

    /// Disable a rule category (repeatable)
    #[arg(long = "disable", value_name = "CATEGORY")]
    disable: Vec<RuleCategory>,

    #[arg(long)]
    max_iterations: Option<usize>,

    #[arg(long)]
    max_blank_lines: Option<usize>,

    /// Worker threads (0 = one per core)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Output format: text or json
    #[arg(short = 'f', long, default_value = "text")]
    output_format: OutputFormat,

    /// Show presets and the active rule pipeline, then exit
    #[arg(long)]
    show_rules: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only print failures and the summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = resolve_config(&args)?;

    if args.show_rules {
        show_rules(&config);
        return Ok(());
    }

    let mode = if args.check { WriteMode::Check } else { WriteMode::Write };
    let processor = BatchProcessor::new(&config, mode);
    let report = processor.process_paths(&args.paths, &config.discovery);

    let rendered = report::render(&report, args.output_format, args.quiet)?;
    match args.output_format {
        OutputFormat::Json => println!("{rendered}"),
        OutputFormat::Text => print!("{rendered}"),
    }

    std::process::exit(if report.success() { 0 } else { 1 });
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Explicit --config wins, then --preset, then the user's config file,
/// then the built-in full preset. CLI overrides apply last.
fn resolve_config(args: &Args) -> Result<NormalizerConfig> {
    let manager = ConfigManager::new()?;

    let mut config = if let Some(path) = &args.config {
        if args.preset.is_some() {
            tracing::warn!("--preset ignored because --config was given");
        }
        let config = NormalizerConfig::load_from_file(path)?;
        tracing::info!("loaded config from {}", path.display());
        config
    } else if let Some(preset) = args.preset {
        tracing::info!("using built-in preset {preset}");
        manager.get_config(&preset).clone()
    } else if let Some(path) = user_config_path().filter(|p| p.is_file()) {
        tracing::info!("loading user config {}", path.display());
        NormalizerConfig::load_with_fallback(Some(&path))
    } else {
        manager.get_config(&Preset::Full).clone()
    };

    // Apply CLI overrides to config
    if let Some(n) = args.max_iterations {
        config.max_iterations = n;
    }
    if let Some(n) = args.max_blank_lines {
        config.max_blank_lines = n;
    }
    if let Some(n) = args.jobs {
        config.workers = n;
    }
    for category in &args.disable {
        if !config.disabled_categories.contains(category) {
            config.disabled_categories.push(*category);
        }
    }

    config.validate()?;
    Ok(config)
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mdnorm").join("config.yaml"))
}

fn show_rules(config: &NormalizerConfig) {
    println!("\n📋 Presets:");
    for preset in Preset::ALL {
        println!("  {:<12} {}", preset.as_str(), preset.description());
    }

    println!("\n🏷️  Categories (for --disable):");
    let names: Vec<&str> = RuleCategory::ALL.iter().map(|c| c.as_str()).collect();
    println!("  {}", names.join(", "));

    println!("\n🔧 Active pipeline ({}):", config.preset);
    let rule_set = RuleSet::from_config(config);
    for (i, rule) in rule_set.iter().enumerate() {
        println!("  {:>2}. {:<32} {:<11} {}", i + 1, rule.id(), rule.category().as_str(), rule.pattern());
    }
    if rule_set.is_empty() {
        println!("  (no rules enabled)");
    }

    println!("\n⚙️  max_iterations={}  max_blank_lines={}  fence_language={}",
        config.max_iterations, config.max_blank_lines, config.fence_language);

    println!("\n📝 Usage Examples:");
    println!("  mdnorm docs/");
    println!("  mdnorm --check README.md docs/");
    println!("  mdnorm --preset relaxed --disable code-block .");
    println!("  mdnorm -c mdnorm.yaml -f json");
}
