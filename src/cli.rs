//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{Metric, SortOrder, ViewMode};
use clap::Parser;
use std::path::PathBuf;

/// emicharts - chart-ready tables for emissions dashboards
///
/// Reads the stats document of an uploaded emissions file, pivots it into
/// per-year chart tables by tier, sector and company, assigns stable
/// series colors, and writes a Markdown or JSON chart report.
///
/// Examples:
///   emicharts --stats stats.json
///   emicharts --stats stats.json --view sectors,companies --metric energy
///   emicharts --stats - --format json --output charts.json < stats.json
///   emicharts --stats stats.json --search transporte --top 5
///   emicharts --stats stats.json --sector Energia --order asc
///   emicharts --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Stats JSON file to chart (`-` reads stdin)
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present = "init_config"
    )]
    pub stats: Option<PathBuf>,

    /// Views to build (comma-separated)
    ///
    /// Defaults to the views listed in the config file, or all three.
    #[arg(long, value_name = "VIEWS", value_delimiter = ',')]
    pub view: Option<Vec<ViewMode>>,

    /// Metric to chart
    #[arg(long, value_name = "METRIC")]
    pub metric: Option<MetricArg>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .emicharts.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "EMICHARTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only rank companies whose name or sector contains this text
    #[arg(long, value_name = "TERM")]
    pub search: Option<String>,

    /// Only rank companies of this sector (exact name, any case)
    #[arg(long, value_name = "SECTOR")]
    pub sector: Option<String>,

    /// Ranking direction (desc = largest first)
    #[arg(long, value_name = "ORDER")]
    pub order: Option<SortOrder>,

    /// Number of companies in the ranking table
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Sort years chronologically instead of keeping payload order
    #[arg(long)]
    pub sort_years: bool,

    /// Leave the color assignment tables out of the report
    #[arg(long)]
    pub no_assignments: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .emicharts.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Metric selection for --metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MetricArg {
    Co2,
    Energy,
    Both,
}

impl MetricArg {
    /// Metrics to chart for this selection.
    pub fn metrics(self) -> Vec<Metric> {
        match self {
            MetricArg::Co2 => vec![Metric::Co2],
            MetricArg::Energy => vec![Metric::Energy],
            MetricArg::Both => vec![Metric::Co2, Metric::Energy],
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether the stats payload comes from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.stats.as_deref().is_some_and(|p| p.as_os_str() == "-")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
        }

        if let Some(ref views) = self.view {
            if views.is_empty() {
                return Err("--view needs at least one view".to_string());
            }
        }

        // Validate stats file if provided
        if let Some(ref stats) = self.stats {
            if !self.reads_stdin() && !stats.is_file() {
                return Err(format!("Stats file does not exist: {}", stats.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `general.verbose` setting of the config
    /// file; `--quiet` still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            stats: Some(PathBuf::from("-")),
            view: None,
            metric: None,
            output: None,
            format: OutputFormat::Markdown,
            config: None,
            search: None,
            sector: None,
            order: None,
            top: None,
            sort_years: false,
            no_assignments: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_views_and_metric() {
        let args = Args::try_parse_from([
            "emicharts",
            "--stats",
            "stats.json",
            "--view",
            "sectors,companies",
            "--metric",
            "energy",
        ])
        .unwrap();

        assert_eq!(args.view, Some(vec![ViewMode::Sectors, ViewMode::Companies]));
        assert_eq!(args.metric.map(MetricArg::metrics), Some(vec![Metric::Energy]));
        assert_eq!(args.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_stats_required_unless_init_config() {
        assert!(Args::try_parse_from(["emicharts"]).is_err());
        assert!(Args::try_parse_from(["emicharts", "--init-config"]).is_ok());
    }

    #[test]
    fn test_validation_missing_stats_file() {
        let mut args = make_args();
        args.stats = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(args.validate().is_err());

        let file = tempfile::NamedTempFile::new().unwrap();
        args.stats = Some(file.path().to_path_buf());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_stdin_and_top() {
        let mut args = make_args();
        assert!(args.reads_stdin());
        assert!(args.validate().is_ok());

        args.top = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_parse_ranking_filters() {
        let args = Args::try_parse_from([
            "emicharts",
            "--stats",
            "stats.json",
            "--sector",
            "Energia",
            "--order",
            "asc",
        ])
        .unwrap();

        assert_eq!(args.sector.as_deref(), Some("Energia"));
        assert_eq!(args.order, Some(SortOrder::Asc));
        assert!(Args::try_parse_from(["emicharts", "--stats", "s.json", "--order", "up"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_follows_config_verbose() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
