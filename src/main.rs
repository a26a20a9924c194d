//! emicharts - chart-ready tables for emissions dashboards
//!
//! A CLI tool that reads the stats document of an uploaded emissions
//! file and writes a chart report: per-year tables by tier, sector and
//! company, with stable series colors.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable stats, bad config, write failure, etc.)

use anyhow::{Context, Result};
use chrono::Utc;
use emicharts::analysis::{largest_columns, rank_companies, yearly_totals, RankingQuery};
use emicharts::charts::{ChartError, DashboardSession};
use emicharts::cli::{Args, OutputFormat};
use emicharts::config::{Config, CONFIG_FILE_NAME};
use emicharts::models::{
    ChartView, CompanyRanking, Report, ReportMetadata, StatsPayload, ViewMode,
};
use emicharts::palette::ChartColors;
use emicharts::pivot::{compare_years, unique_in_order};
use emicharts::report;
use std::io::Read;
use std::path::{Path, PathBuf};
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

    // Load configuration first so its verbosity applies to logging
    let (mut config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("emicharts v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_source {
        ConfigSource::File(path) => info!("Loaded config from: {}", path.display()),
        ConfigSource::Builtin => debug!("No config file found, using defaults"),
        ConfigSource::Fallback(e) => warn!("Failed to load config: {:#}", e),
    }

    match run(args, config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Chart generation failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .emicharts.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize palettes, views and the ranking table.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Build every requested chart and write the report. Returns the exit code.
fn run(args: Args, config: Config) -> Result<i32> {
    // Step 1: Load the dataset
    let (source, stats) = load_stats(&args)?;
    println!("📥 Loaded stats: {}", source);

    let available: Vec<String> = [ViewMode::Tiers, ViewMode::Sectors, ViewMode::Companies]
        .into_iter()
        .filter(|mode| stats.supports(*mode))
        .map(|mode| mode.to_string())
        .collect();
    println!("   Available views: {}", available.join(", "));

    // Step 2: Build the views through one session, so colors stay
    // consistent across every chart of this dataset
    let mut session = DashboardSession::new(stats, ChartColors::from(&config.palette))
        .with_sorted_years(config.report.sort_years);

    let mut views: Vec<ChartView> = Vec::new();
    let mut unavailable: Vec<ViewMode> = Vec::new();

    for metric in &config.report.metrics {
        for mode in &config.report.views {
            match session.view(*mode, *metric) {
                Ok(view) => views.push(view),
                Err(e) => {
                    warn!("{}", e);
                    let ChartError::ViewUnavailable(missing) = e;
                    if !unavailable.contains(&missing) {
                        unavailable.push(missing);
                    }
                }
            }
        }
    }
    info!("Built {} chart views", views.len());

    // Step 3: Company rankings
    let mut rankings = Vec::new();
    if config.report.top_companies > 0 {
        if let Some(ref companies) = session.stats().companies {
            let query = RankingQuery {
                search: args.search.as_deref(),
                sector: args.sector.as_deref(),
                order: config.report.order,
                limit: Some(config.report.top_companies),
            };
            for metric in &config.report.metrics {
                rankings.push(CompanyRanking {
                    metric: *metric,
                    search: args.search.clone(),
                    sector: args.sector.clone(),
                    order: config.report.order,
                    companies: rank_companies(companies, *metric, &query),
                });
            }
        }
    }

    // Step 4: Assemble and write the report
    let stats = session.stats();
    let metadata = ReportMetadata {
        source: source.clone(),
        generated_at: Utc::now(),
        years: dataset_years(stats, config.report.sort_years),
        sector_count: stats.metadata.sectors.len(),
        company_count: stats.metadata.company_list.len(),
    };

    let assignments = session.assignments();
    let report = Report {
        metadata,
        views,
        unavailable,
        rankings,
        assignments: config
            .report
            .include_assignments
            .then(|| assignments.clone()),
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = output_path(&config, args.format, args.output.is_some());
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path))?;

    // Print summary
    println!("\n📊 Chart Summary:");
    println!("   Views built: {}", report.views.len());
    for metric in &config.report.metrics {
        let totals = yearly_totals(&session.stats().tiers, *metric);
        if !totals.is_empty() {
            let line: Vec<String> = totals
                .iter()
                .map(|(year, total)| format!("{} {}", year, metric.format_value(*total)))
                .collect();
            println!("   {} by year: {}", metric, line.join(" | "));
        }
    }
    if let Some(view) = report
        .views
        .iter()
        .find(|v| v.mode == ViewMode::Sectors)
    {
        let top: Vec<String> = largest_columns(&view.rows, 3)
            .into_iter()
            .map(|(sector, total)| format!("{} ({})", sector, view.metric.format_value(total)))
            .collect();
        if !top.is_empty() {
            println!("   Largest sectors: {}", top.join(", "));
        }
    }
    println!(
        "   Colors assigned: {} sectors, {} companies",
        assignments.sectors.len(),
        assignments.companies.len()
    );
    println!("\n✅ Report saved to: {}", output_path);

    Ok(0)
}

/// Where the configuration came from, reported once logging is up.
enum ConfigSource {
    File(PathBuf),
    Builtin,
    /// The default file exists but could not be loaded.
    Fallback(anyhow::Error),
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::File(config_path.clone())));
    }

    // Try default location
    Ok(match Config::load_default() {
        Ok(Some(config)) => (config, ConfigSource::File(PathBuf::from(CONFIG_FILE_NAME))),
        Ok(None) => (Config::default(), ConfigSource::Builtin),
        Err(e) => (Config::default(), ConfigSource::Fallback(e)),
    })
}

/// Read and parse the stats payload. Returns a display name and the payload.
fn load_stats(args: &Args) -> Result<(String, StatsPayload)> {
    let (source, text) = if args.reads_stdin() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stats from stdin")?;
        ("<stdin>".to_string(), text)
    } else {
        let path = args
            .stats
            .as_deref()
            .context("No stats file given")?;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stats file: {}", path.display()))?;
        (path.display().to_string(), text)
    };

    let stats = StatsPayload::from_json(&text)
        .with_context(|| format!("Failed to parse stats from {}", source))?;
    debug!(
        "Parsed stats: {} tier rows, sectors: {}, companies: {}",
        stats.tiers.len(),
        stats.sectors.is_some(),
        stats.companies.is_some()
    );

    Ok((source, stats))
}

/// Years covered by the dataset: metadata first, else whatever the rows carry.
fn dataset_years(stats: &StatsPayload, sorted: bool) -> Vec<String> {
    let mut years = if stats.metadata.years.is_empty() {
        unique_in_order(
            stats
                .tiers
                .iter()
                .map(|t| t.year.as_str())
                .chain(stats.sectors.iter().flatten().map(|s| s.year.as_str()))
                .chain(stats.companies.iter().flatten().map(|c| c.year.as_str())),
        )
    } else {
        stats.metadata.years.clone()
    };

    if sorted {
        years.sort_by(|a, b| compare_years(a, b));
    }
    years
}

/// Report path; JSON output gets a `.json` default instead of the Markdown one.
fn output_path(config: &Config, format: OutputFormat, explicit: bool) -> String {
    let path = config.general.output.clone();

    if format == OutputFormat::Json && !explicit && path.ends_with(".md") {
        format!("{}.json", path.trim_end_matches(".md"))
    } else {
        path
    }
}
