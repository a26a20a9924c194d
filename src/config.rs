//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.emicharts.toml` files.

use crate::models::{Metric, SortOrder, ViewMode};
use crate::palette::{
    palette_vec, validate_palette, PaletteError, COMPANY_FALLBACK, COMPANY_PALETTE,
    SECTOR_FALLBACK, SECTOR_PALETTE,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".emicharts.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Palette settings.
    #[serde(default)]
    pub palette: PaletteConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "chart_report.md".to_string()
}

/// Palettes and fallback colors for the two color registries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// Sector colors, handed out in order.
    #[serde(default = "default_sector_palette")]
    pub sectors: Vec<String>,

    /// Color for new sectors once the palette is used up.
    #[serde(default = "default_sector_fallback")]
    pub sector_fallback: String,

    /// Company colors, handed out in order.
    #[serde(default = "default_company_palette")]
    pub companies: Vec<String>,

    /// Color for new companies once the palette is used up.
    #[serde(default = "default_company_fallback")]
    pub company_fallback: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            sectors: default_sector_palette(),
            sector_fallback: default_sector_fallback(),
            companies: default_company_palette(),
            company_fallback: default_company_fallback(),
        }
    }
}

fn default_sector_palette() -> Vec<String> {
    palette_vec(SECTOR_PALETTE)
}

fn default_sector_fallback() -> String {
    SECTOR_FALLBACK.to_string()
}

fn default_company_palette() -> Vec<String> {
    palette_vec(COMPANY_PALETTE)
}

fn default_company_fallback() -> String {
    COMPANY_FALLBACK.to_string()
}

impl PaletteConfig {
    /// Check that every configured color is a hex color.
    pub fn validate(&self) -> Result<(), PaletteError> {
        validate_palette("sector", &self.sectors, &self.sector_fallback)?;
        validate_palette("company", &self.companies, &self.company_fallback)
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Metrics charted when `--metric` is not given.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,

    /// Views rendered when `--view` is not given.
    #[serde(default = "default_views")]
    pub views: Vec<ViewMode>,

    /// Rows in the company ranking table (0 disables the table).
    #[serde(default = "default_top_companies")]
    pub top_companies: usize,

    /// Ranking direction when `--order` is not given.
    #[serde(default)]
    pub order: SortOrder,

    /// Include the color assignment maps in the report.
    #[serde(default = "default_true")]
    pub include_assignments: bool,

    /// Sort years before pivoting instead of keeping payload order.
    #[serde(default)]
    pub sort_years: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            metrics: default_metrics(),
            views: default_views(),
            top_companies: default_top_companies(),
            order: SortOrder::Desc,
            include_assignments: true,
            sort_years: false,
        }
    }
}

fn default_metrics() -> Vec<Metric> {
    vec![Metric::Co2, Metric::Energy]
}

fn default_views() -> Vec<ViewMode> {
    vec![ViewMode::Tiers, ViewMode::Sectors, ViewMode::Companies]
}

fn default_top_companies() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .palette
            .validate()
            .with_context(|| format!("Invalid palette in {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.emicharts.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(ref views) = args.view {
            self.report.views = views.clone();
        }
        if let Some(metric) = args.metric {
            self.report.metrics = metric.metrics();
        }
        if let Some(order) = args.order {
            self.report.order = order;
        }
        if let Some(top) = args.top {
            self.report.top_companies = top;
        }

        // Flags always override
        if args.sort_years {
            self.report.sort_years = true;
        }
        if args.no_assignments {
            self.report.include_assignments = false;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "chart_report.md");
        assert_eq!(config.palette.sectors.len(), SECTOR_PALETTE.len());
        assert_eq!(config.palette.company_fallback, COMPANY_FALLBACK);
        assert_eq!(config.report.views.len(), 3);
        assert!(config.palette.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r##"
[general]
output = "custom_report.md"
verbose = true

[palette]
sectors = ["#111", "#222"]
sector_fallback = "#999"

[report]
metrics = ["energy"]
views = ["sectors", "companies"]
top_companies = 3
"##;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "custom_report.md");
        assert!(config.general.verbose);
        assert_eq!(config.palette.sectors, vec!["#111", "#222"]);
        assert_eq!(config.palette.sector_fallback, "#999");
        // untouched palette keeps its default
        assert_eq!(config.palette.companies.len(), COMPANY_PALETTE.len());
        assert_eq!(config.report.metrics, vec![Metric::Energy]);
        assert_eq!(
            config.report.views,
            vec![ViewMode::Sectors, ViewMode::Companies]
        );
        assert_eq!(config.report.top_companies, 3);
        assert_eq!(config.report.order, SortOrder::Desc);
        assert!(config.report.include_assignments);
    }

    #[test]
    fn test_verbose_and_order_merge() {
        let mut config: Config =
            toml::from_str("[general]\nverbose = true\n\n[report]\norder = \"asc\"\n").unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.report.order, SortOrder::Asc);

        let args = crate::cli::Args {
            stats: None,
            view: None,
            metric: None,
            output: None,
            format: crate::cli::OutputFormat::Markdown,
            config: None,
            search: None,
            sector: None,
            order: Some(SortOrder::Desc),
            top: None,
            sort_years: false,
            no_assignments: false,
            verbose: false,
            quiet: false,
            init_config: false,
        };
        config.merge_with_args(&args);

        assert_eq!(config.report.order, SortOrder::Desc);
        // the file setting survives a run without --verbose
        assert!(config.general.verbose);
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[palette]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.palette.sectors, default_sector_palette());
    }

    #[test]
    fn test_load_rejects_invalid_palette() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[palette]\ncompanies = [\"#123456\", \"blue\"]").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("blue"));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[report]\nsort_years = true\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert!(config.report.sort_years);
    }
}
