//! Data models for the chart layer.
//!
//! This module contains the shapes consumed from the stats payload
//! (tiers, sector rows, company rows, metadata), the pivot input and
//! output types, and the report structures built from them.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Which measured quantity a chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// CO2 emissions, in tons.
    Co2,
    /// Energy consumption, in kWh.
    Energy,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Co2 => write!(f, "CO2 Emissions"),
            Metric::Energy => write!(f, "Energy Consumption"),
        }
    }
}

impl Metric {
    /// Field prefix used by the tier columns of the stats payload.
    pub fn tier_prefix(&self) -> &'static str {
        match self {
            Metric::Co2 => "co2",
            Metric::Energy => "energy",
        }
    }

    /// Format a value the way the dashboard tooltips show it.
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Metric::Energy => {
                if value >= 1_000_000.0 {
                    format!("{:.1}M kWh", value / 1_000_000.0)
                } else if value >= 1_000.0 {
                    format!("{:.1}k kWh", value / 1_000.0)
                } else {
                    format!("{} kWh", value)
                }
            }
            Metric::Co2 => format!("{} tons", group_thousands(value.round() as i64)),
        }
    }
}

/// Insert `,` separators into an integer.
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// The three interchangeable chart views.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Stacked high/medium/low buckets.
    Tiers,
    /// One column per sector.
    Sectors,
    /// One column per company.
    Companies,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Tiers => write!(f, "By Tiers"),
            ViewMode::Sectors => write!(f, "By Sectors"),
            ViewMode::Companies => write!(f, "By Companies"),
        }
    }
}

/// Accept `"2021"`, `2021` or `2021.0` for a year field.
fn deserialize_year<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawYear::deserialize(deserializer)?
        .into_label()
        .map_err(de::Error::custom)
}

fn deserialize_year_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<RawYear>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(RawYear::into_label)
        .collect::<Result<_, _>>()
        .map_err(de::Error::custom)
}

fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawYear {
    Text(String),
    Number(i64),
    Float(f64),
}

impl RawYear {
    fn into_label(self) -> Result<String, String> {
        match self {
            RawYear::Text(s) => Ok(s),
            RawYear::Number(n) => Ok(n.to_string()),
            RawYear::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(format!("{:.0}", f)),
            RawYear::Float(f) => Err(format!("year {} is not a whole number", f)),
        }
    }
}

/// One category's value within a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryValue {
    /// Sector or company name.
    pub key: String,
    pub value: f64,
}

impl CategoryValue {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Per-year aggregate with its category breakdown, as fed to the pivot engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearAggregate {
    #[serde(deserialize_with = "deserialize_year")]
    pub year: String,
    #[serde(default)]
    pub breakdown: Vec<CategoryValue>,
}

impl YearAggregate {
    pub fn new(year: impl Into<String>, breakdown: Vec<CategoryValue>) -> Self {
        Self {
            year: year.into(),
            breakdown,
        }
    }
}

/// One pivoted table row: the year plus one column per known key.
///
/// Serializes as a flat object, `{"year": "2021", "Energia": 10.0, ...}`,
/// with the columns in known-key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub year: String,
    #[serde(flatten)]
    pub values: IndexMap<String, f64>,
}

impl PivotRow {
    /// Value of a column, if the column exists.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Column names in order, excluding `year`.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Sum of all columns.
    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }
}

/// Dataset-wide canonical key and year lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaData {
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub company_list: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub sectors: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_year_list")]
    pub years: Vec<String>,
}

/// Per-year tier buckets for both metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierRow {
    #[serde(deserialize_with = "deserialize_year")]
    pub year: String,
    #[serde(default)]
    pub co2_high: f64,
    #[serde(default)]
    pub co2_medium: f64,
    #[serde(default)]
    pub co2_low: f64,
    #[serde(default)]
    pub energy_high: f64,
    #[serde(default)]
    pub energy_medium: f64,
    #[serde(default)]
    pub energy_low: f64,
}

impl TierRow {
    /// High, medium and low values for a metric, in that order.
    pub fn values(&self, metric: Metric) -> [f64; 3] {
        match metric {
            Metric::Co2 => [self.co2_high, self.co2_medium, self.co2_low],
            Metric::Energy => [self.energy_high, self.energy_medium, self.energy_low],
        }
    }
}

/// Flat per-year sector row: `{year, "<sector>": co2, "<sector>_energy": kwh}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRow {
    #[serde(deserialize_with = "deserialize_year")]
    pub year: String,
    #[serde(flatten)]
    pub values: serde_json::Map<String, serde_json::Value>,
}

impl SectorRow {
    /// Numeric value of a field; non-numeric fields read as `None`.
    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.get(field).and_then(serde_json::Value::as_f64)
    }
}

/// A company's figures for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyEntry {
    pub name: String,
    /// CO2 emissions in tons.
    #[serde(default)]
    pub emissions: f64,
    /// Energy consumption in kWh.
    #[serde(default)]
    pub consumption: f64,
    #[serde(default)]
    pub sector: String,
}

impl CompanyEntry {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Co2 => self.emissions,
            Metric::Energy => self.consumption,
        }
    }

    /// Tons of CO2 per kWh consumed; `None` without any consumption.
    pub fn efficiency(&self) -> Option<f64> {
        (self.consumption > 0.0).then(|| self.emissions / self.consumption)
    }
}

/// All companies reported for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyYear {
    #[serde(deserialize_with = "deserialize_year")]
    pub year: String,
    #[serde(default)]
    pub companies: Vec<CompanyEntry>,
}

/// The stats document served for one uploaded file.
///
/// `sectors` and `companies` are optional: when absent the matching
/// view is unavailable for the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    #[serde(default)]
    pub tiers: Vec<TierRow>,
    #[serde(default)]
    pub sectors: Option<Vec<SectorRow>>,
    #[serde(default)]
    pub companies: Option<Vec<CompanyYear>>,
    #[serde(default)]
    pub metadata: MetaData,
}

impl StatsPayload {
    /// Parse a stats payload from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Whether a view can be built from this payload.
    pub fn supports(&self, mode: ViewMode) -> bool {
        match mode {
            ViewMode::Tiers => true,
            ViewMode::Sectors => self.sectors.is_some(),
            ViewMode::Companies => self.companies.is_some(),
        }
    }
}

/// One legend entry of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    /// Column name in the chart rows.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Fill color, `#rrggbb`.
    pub color: String,
}

/// A fully prepared chart: rows plus legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub mode: ViewMode,
    pub metric: Metric,
    /// Whether bars stack (tiers) or group side by side.
    pub stacked: bool,
    pub series: Vec<Series>,
    pub rows: Vec<PivotRow>,
}

/// A company's row in the ranking table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCompany {
    /// 1-based position.
    pub rank: usize,
    pub name: String,
    pub sector: String,
    pub year: String,
    pub value: f64,
    /// CO2 per unit of energy, see [`CompanyEntry::efficiency`].
    pub efficiency: Option<f64>,
}

/// Direction of the company ranking.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest value first.
    Asc,
    /// Largest value first.
    #[default]
    Desc,
}

/// Ranking table with the parameters it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyRanking {
    pub metric: Metric,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    pub order: SortOrder,
    pub companies: Vec<RankedCompany>,
}

/// Color maps handed out during one session, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColorAssignments {
    pub sectors: IndexMap<String, String>,
    pub companies: IndexMap<String, String>,
}

/// Metadata about the chart report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Where the stats payload came from.
    pub source: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Years covered, in display order.
    pub years: Vec<String>,
    pub sector_count: usize,
    pub company_count: usize,
}

/// The complete chart report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub views: Vec<ChartView>,
    /// Views requested but not available for this dataset.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<ViewMode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rankings: Vec<CompanyRanking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments: Option<ColorAssignments>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_energy_value() {
        assert_eq!(Metric::Energy.format_value(2_500_000.0), "2.5M kWh");
        assert_eq!(Metric::Energy.format_value(1_500.0), "1.5k kWh");
        assert_eq!(Metric::Energy.format_value(999.0), "999 kWh");
    }

    #[test]
    fn test_format_co2_value() {
        assert_eq!(Metric::Co2.format_value(1_234_567.4), "1,234,567 tons");
        assert_eq!(Metric::Co2.format_value(999.6), "1,000 tons");
        assert_eq!(Metric::Co2.format_value(12.0), "12 tons");
        assert_eq!(Metric::Co2.format_value(-4_200.0), "-4,200 tons");
    }

    #[test]
    fn test_year_accepts_number_or_string() {
        let rows: Vec<TierRow> =
            serde_json::from_str(r#"[{"year": 2021, "co2_high": 3}, {"year": "2022"}]"#).unwrap();
        assert_eq!(rows[0].year, "2021");
        assert_eq!(rows[0].values(Metric::Co2), [3.0, 0.0, 0.0]);
        assert_eq!(rows[1].year, "2022");
    }

    #[test]
    fn test_year_accepts_whole_float() {
        let payload = StatsPayload::from_json(
            r#"{"tiers": [{"year": 2021.0}], "metadata": {"years": [2021.0, "2022"]}}"#,
        )
        .unwrap();
        assert_eq!(payload.tiers[0].year, "2021");
        assert_eq!(payload.metadata.years, vec!["2021", "2022"]);

        let err = StatsPayload::from_json(r#"{"tiers": [{"year": 2021.5}]}"#).unwrap_err();
        assert!(err.to_string().contains("not a whole number"));
    }

    #[test]
    fn test_company_efficiency() {
        let company: CompanyEntry = serde_json::from_str(
            r#"{"name": "EDP", "emissions": 500, "consumption": 1000000}"#,
        )
        .unwrap();
        assert_eq!(company.efficiency(), Some(0.0005));

        let idle: CompanyEntry =
            serde_json::from_str(r#"{"name": "Idle", "emissions": 3}"#).unwrap();
        assert_eq!(idle.efficiency(), None);
    }

    #[test]
    fn test_metadata_absent_lists_are_empty() {
        let meta: MetaData = serde_json::from_str(r#"{"sectors": null, "years": [2021]}"#).unwrap();
        assert!(meta.company_list.is_empty());
        assert!(meta.sectors.is_empty());
        assert_eq!(meta.years, vec!["2021"]);
    }

    #[test]
    fn test_sector_row_keeps_field_order() {
        let row: SectorRow = serde_json::from_str(
            r#"{"year": "2021", "Transporte": 4, "Energia": 7, "Energia_energy": 900}"#,
        )
        .unwrap();
        let fields: Vec<&str> = row.values.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["Transporte", "Energia", "Energia_energy"]);
        assert_eq!(row.value("Energia_energy"), Some(900.0));
        assert_eq!(row.value("Missing"), None);
    }

    #[test]
    fn test_payload_view_support() {
        let payload = StatsPayload::from_json(r#"{"tiers": []}"#).unwrap();
        assert!(payload.supports(ViewMode::Tiers));
        assert!(!payload.supports(ViewMode::Sectors));
        assert!(!payload.supports(ViewMode::Companies));
    }

    #[test]
    fn test_pivot_row_serializes_flat_in_order() {
        let mut values = IndexMap::new();
        values.insert("Indústria".to_string(), 5.0);
        values.insert("Energia".to_string(), 0.0);
        let row = PivotRow {
            year: "2022".to_string(),
            values,
        };

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"year":"2022","Indústria":5.0,"Energia":0.0}"#);
        assert_eq!(row.total(), 5.0);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["Indústria", "Energia"]);
    }
}
