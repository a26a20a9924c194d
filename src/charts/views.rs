//! Building one chart view from the stats payload.

use super::ChartError;
use crate::models::{
    CategoryValue, ChartView, CompanyYear, Metric, Series, SectorRow, StatsPayload, TierRow,
    ViewMode, YearAggregate,
};
use crate::palette::{ChartColors, ColorRegistry, TIER_COLORS};
use crate::pivot::{pivot, sector_for_field, sector_keys, sort_by_year, unique_in_order};
use tracing::{debug, warn};

const YEAR_COLUMN: &str = "year";
const TIER_LEVELS: [&str; 3] = ["high", "medium", "low"];

/// Build the chart for `mode` and `metric`.
///
/// Sector and company columns follow the dataset metadata when it lists
/// them, otherwise the order keys first appear in the payload. Series
/// colors are requested from `colors` in column order.
pub fn build_view(
    mode: ViewMode,
    metric: Metric,
    stats: &StatsPayload,
    colors: &mut ChartColors,
    sort_years: bool,
) -> Result<ChartView, ChartError> {
    let (mut years, keys) = match mode {
        ViewMode::Tiers => (tier_aggregates(&stats.tiers, metric), tier_keys(metric)),
        ViewMode::Sectors => {
            let rows = stats
                .sectors
                .as_deref()
                .ok_or(ChartError::ViewUnavailable(mode))?;
            let keys = if stats.metadata.sectors.is_empty() {
                sector_keys(rows, metric)
            } else {
                stats.metadata.sectors.clone()
            };
            (sector_aggregates(rows, metric), keys)
        }
        ViewMode::Companies => {
            let companies = stats
                .companies
                .as_deref()
                .ok_or(ChartError::ViewUnavailable(mode))?;
            let keys = if stats.metadata.company_list.is_empty() {
                unique_in_order(
                    companies
                        .iter()
                        .flat_map(|y| y.companies.iter().map(|c| c.name.as_str())),
                )
            } else {
                stats.metadata.company_list.clone()
            };
            (company_aggregates(companies, metric), keys)
        }
    };

    if sort_years {
        sort_by_year(&mut years);
    }

    // `year` is the row label of every pivoted row
    let keys: Vec<String> = keys
        .into_iter()
        .filter(|key| {
            if key == YEAR_COLUMN {
                warn!("Skipping {:?} category named '{}'", mode, YEAR_COLUMN);
                false
            } else {
                true
            }
        })
        .collect();

    let rows = pivot(&years, &keys);
    let series = match mode {
        ViewMode::Tiers => tier_series(metric),
        ViewMode::Sectors => category_series(&keys, &mut colors.sectors),
        ViewMode::Companies => category_series(&keys, &mut colors.companies),
    };

    debug!(
        "Built {:?}/{:?} view: {} rows x {} columns",
        mode,
        metric,
        rows.len(),
        keys.len()
    );

    Ok(ChartView {
        mode,
        metric,
        stacked: mode == ViewMode::Tiers,
        series,
        rows,
    })
}

fn tier_keys(metric: Metric) -> Vec<String> {
    TIER_LEVELS
        .iter()
        .map(|level| format!("{}_{}", metric.tier_prefix(), level))
        .collect()
}

fn tier_aggregates(tiers: &[TierRow], metric: Metric) -> Vec<YearAggregate> {
    let keys = tier_keys(metric);

    tiers
        .iter()
        .map(|row| {
            let breakdown = keys
                .iter()
                .zip(row.values(metric))
                .map(|(key, value)| CategoryValue::new(key.clone(), value))
                .collect();
            YearAggregate::new(row.year.clone(), breakdown)
        })
        .collect()
}

fn tier_series(metric: Metric) -> Vec<Series> {
    let noun = match metric {
        Metric::Co2 => "Emissions",
        Metric::Energy => "Consumption",
    };

    tier_keys(metric)
        .into_iter()
        .zip(["High", "Medium", "Low"])
        .zip(TIER_COLORS)
        .map(|((key, level), color)| Series {
            key,
            label: format!("{} {}", level, noun),
            color: color.to_string(),
        })
        .collect()
}

/// Flat sector rows to per-year breakdowns for one metric.
///
/// Non-numeric fields are skipped.
fn sector_aggregates(rows: &[SectorRow], metric: Metric) -> Vec<YearAggregate> {
    rows.iter()
        .map(|row| {
            let breakdown = row
                .values
                .iter()
                .filter_map(|(field, value)| {
                    let sector = sector_for_field(field, metric)?;
                    Some(CategoryValue::new(sector, value.as_f64()?))
                })
                .collect();
            YearAggregate::new(row.year.clone(), breakdown)
        })
        .collect()
}

fn company_aggregates(companies: &[CompanyYear], metric: Metric) -> Vec<YearAggregate> {
    companies
        .iter()
        .map(|year| {
            let breakdown = year
                .companies
                .iter()
                .map(|c| CategoryValue::new(c.name.clone(), c.value(metric)))
                .collect();
            YearAggregate::new(year.year.clone(), breakdown)
        })
        .collect()
}

fn category_series(keys: &[String], registry: &mut ColorRegistry) -> Vec<Series> {
    keys.iter()
        .map(|key| Series {
            key: key.clone(),
            label: key.clone(),
            color: registry.color_for(key).to_string(),
        })
        .collect()
}
