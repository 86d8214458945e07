//! docintel - multi-analyzer document intelligence
//!
//! A CLI tool that runs a summary analyzer, a red-flag detector and a
//! decision extractor concurrently over plain-text documents and merges
//! their findings into one report.
//!
//! Exit codes:
//!   0 - Success (no report at or above --fail-on-risk, or no threshold set)
//!   1 - Runtime error (unreadable input, bad config, failed analysis, etc.)
//!   2 - A document's risk level reached the --fail-on-risk threshold

mod analysis;
mod analyzers;
mod backend;
mod cli;
mod config;
mod error;
mod models;
mod report;

use analysis::Orchestrator;
use analyzers::HEURISTIC_MODEL;
use anyhow::{bail, Context, Result};
use backend::{Generator, OllamaBackend};
use chrono::Utc;
use cli::{is_stdin, Args, OutputFormat};
use config::{BackendConfig, Config, DEFAULT_CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use models::AggregatedReport;
use report::ReportMeta;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config comes first so `[general] verbose` can set the log level.
    let (mut config, config_note) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(args.log_level(config.general.verbose));

    info!("docintel v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_note {
        ConfigNote::Loaded(path) => info!("Loaded config from {}", path),
        ConfigNote::Defaults => debug!("No config file found, using defaults"),
        ConfigNote::Fallback(reason) => warn!("Failed to load config: {}", reason),
    }

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .docintel.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Set [backend] enabled = true to analyze with an Ollama model.");
    Ok(())
}

/// Initialize logging at `level`.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber was already installed");
    }
}

/// Analyze every input and emit the reports. Returns the exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    let generator = build_generator(&config.backend)?;
    let model = generator
        .as_ref()
        .map_or_else(|| HEURISTIC_MODEL.to_string(), |g| g.model().to_string());
    let orchestrator = Orchestrator::new(generator);

    let mut rendered = Vec::with_capacity(args.inputs.len());
    let mut reports = Vec::with_capacity(args.inputs.len());

    for input in &args.inputs {
        let source = source_name(input);
        let text = read_input(input)?;
        if text.trim().is_empty() {
            bail!("Document is empty: {}", source);
        }

        let spinner = start_spinner(&args, &source)?;
        let report = orchestrator.analyze_document(&text).await;
        spinner.finish_and_clear();

        if report.is_completed() {
            for outcome in report.analyzers.iter().filter(|a| a.error.is_some()) {
                warn!(
                    "{} failed on {}: {}",
                    outcome.name,
                    source,
                    outcome.error.as_deref().unwrap_or_default()
                );
            }
        } else {
            error!(
                "Analysis of {} failed: {}",
                source,
                report.error.as_deref().unwrap_or_default()
            );
        }

        let meta = ReportMeta {
            source,
            generated_at: Utc::now(),
            model: model.clone(),
        };
        rendered.push(render(&report, &meta, &config)?);
        reports.push(report);
    }

    let output = match config.general.format {
        // Several JSON reports become one array so the output stays parseable.
        OutputFormat::Json if reports.len() > 1 => serde_json::to_string_pretty(&reports)?,
        _ => rendered.join("\n"),
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path))?;
            info!("Report saved to: {}", path);
        }
        None => println!("{}", output),
    }

    if args.show_status {
        print_status(&orchestrator);
    }

    if args.history {
        println!("\n{}", report::generate_history_table(&orchestrator.history()));
    }

    info!(
        "Analyzed {} document(s) in {:.1}s",
        reports.len(),
        start_time.elapsed().as_secs_f64()
    );

    if reports.iter().any(|r| !r.is_completed()) {
        return Ok(1);
    }

    if let Some(threshold) = args.fail_on_risk {
        let level = threshold.level();
        if reports
            .iter()
            .any(|r| r.risk_level().is_some_and(|risk| risk >= level))
        {
            eprintln!(
                "\n⛔ Risk at or above {} found. Failing (exit code 2).",
                level
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Where the configuration came from, logged once logging is up.
enum ConfigNote {
    Loaded(String),
    Defaults,
    Fallback(String),
}

/// Load configuration from file or use defaults.
///
/// An explicit `--config` must load; a broken default file falls back to
/// the defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigNote)> {
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigNote::Loaded(config_path.display().to_string())));
    }

    Ok(match Config::load_default() {
        Ok(Some(config)) => (config, ConfigNote::Loaded(DEFAULT_CONFIG_FILE.to_string())),
        Ok(None) => (Config::default(), ConfigNote::Defaults),
        Err(e) => (Config::default(), ConfigNote::Fallback(format!("{:#}", e))),
    })
}

/// `None` unless the backend is enabled.
fn build_generator(backend: &BackendConfig) -> Result<Option<Generator>> {
    if !backend.enabled {
        return Ok(None);
    }

    info!(
        "Using Ollama at {} with model {} (timeout {}s)",
        backend.ollama_url, backend.model, backend.timeout_seconds
    );
    let client = OllamaBackend::new(backend.ollama_config())
        .context("Failed to create the Ollama client")?;

    Ok(Some(Generator::new(Arc::new(client), backend.model.clone())))
}

fn source_name(input: &Path) -> String {
    if is_stdin(input) {
        "stdin".to_string()
    } else {
        input.display().to_string()
    }
}

/// Read a file (or stdin), replacing invalid UTF-8.
fn read_input(input: &Path) -> Result<String> {
    let bytes = if is_stdin(input) {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?
    };

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn start_spinner(args: &Args, source: &str) -> Result<ProgressBar> {
    if args.quiet {
        return Ok(ProgressBar::hidden());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Analyzing {}...", source));
    spinner.enable_steady_tick(Duration::from_millis(100));

    Ok(spinner)
}

fn render(report: &AggregatedReport, meta: &ReportMeta, config: &Config) -> Result<String> {
    Ok(match config.general.format {
        OutputFormat::Markdown => {
            report::generate_markdown_report(report, meta, config.report.options())
        }
        OutputFormat::Json => report::generate_json_report(report)?,
        OutputFormat::Text => report::generate_text_report(report),
    })
}

fn print_status(orchestrator: &Orchestrator) {
    println!("\n📡 Analyzer status:");
    for (key, snapshot) in orchestrator.status() {
        println!(
            "   {} {:<8} {} [{}] ({})",
            snapshot.status.emoji(),
            key,
            snapshot.name,
            snapshot.status,
            snapshot.model
        );
    }
}
