//! projexp - Project Experience Aggregator
//!
//! A CLI tool that joins an employee relation with a project relation
//! and reports per-project average experience, the project(s) with the
//! highest average, and average/median/head-count summaries.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (invalid arguments, config, or dataset)

mod analysis;
mod cli;
mod config;
mod dataset;
mod error;
mod models;
mod report;

use analysis::SummaryOptions;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat, QuerySelection};
use config::{Config, CONFIG_FILE};
use dataset::Dataset;
use models::{QueryKind, Report, ReportMetadata};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so `general.verbose` applies
    let config = match load_config(&args, Path::new(".")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("projexp v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(&args, &config) {
        error!("Aggregation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .projexp.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the head-count threshold, percentile and precision.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the dataset, evaluate the selected queries and emit the report.
fn run(args: &Args, config: &Config) -> Result<()> {
    let options = config.summary_options()?;

    let input = args
        .input
        .as_deref()
        .context("An --input dataset file is required")?;
    let dataset = Dataset::load(input)
        .with_context(|| format!("Failed to load dataset {}", input.display()))?;

    let report = build_report(&dataset, &input.display().to_string(), args.query, &options)?;

    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    match config.general.output {
        Some(ref path) => {
            report::write_report(&output, Path::new(path))
                .with_context(|| format!("Failed to write report to {}", path))?;
            info!("Report saved to {}", path);
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Evaluate the selected queries over the joined relations.
fn build_report(
    dataset: &Dataset,
    source: &str,
    selection: QuerySelection,
    options: &SummaryOptions,
) -> Result<Report> {
    let joined = dataset.join();
    debug!(
        "{} distinct project(s) in the project relation",
        dataset.project_ids().len()
    );
    if !joined.dropped.is_empty() {
        warn!(
            "{} assignment(s) reference unknown employees and were dropped",
            joined.dropped.len()
        );
    }

    let metadata = ReportMetadata {
        source: source.to_string(),
        generated_at: Utc::now(),
        employees: dataset.employees.len(),
        assignments: dataset.assignments.len(),
        joined_rows: joined.rows.len(),
        dropped_assignments: joined.dropped.len(),
        min_employees: options.min_employees,
        percentile: options.percentile,
        precision: options.precision,
    };
    let mut report = Report::new(metadata);

    let needs_averages =
        selection.includes(QueryKind::Average) || selection.includes(QueryKind::Top);
    if needs_averages {
        let averages =
            analysis::average_experience_per_project(&joined.rows, options.precision)?;
        debug!("Computed averages for {} projects", averages.len());

        if selection.includes(QueryKind::Top) {
            report.top_projects = Some(analysis::top_average_projects(&averages));
        }
        if selection.includes(QueryKind::Average) {
            report.averages = Some(averages);
        }
    }

    if selection.includes(QueryKind::Summary) {
        let summaries = analysis::project_summaries(&joined.rows, options)?;
        info!(
            "{} project(s) have more than {} employees",
            summaries.len(),
            options.min_employees
        );
        report.summaries = Some(summaries);
    }

    Ok(report)
}

/// Load configuration from file or use defaults, then apply CLI overrides.
///
/// Without `--config`, `.projexp.toml` is looked up in `base_dir`.
fn load_config(args: &Args, base_dir: &Path) -> Result<Config> {
    // Try explicit config path
    let mut config = if let Some(ref config_path) = args.config {
        Config::load(config_path)?
    } else {
        // Try default location
        match Config::load_from_dir(base_dir) {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE, e);
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    Ok(config)
}
