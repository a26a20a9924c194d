//! Category key and year list helpers.

use crate::models::{Metric, SectorRow, YearAggregate};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Suffix the stats payload appends to sector names for energy columns.
pub const ENERGY_SUFFIX: &str = "_energy";

/// De-duplicate keys, keeping the first occurrence of each.
pub fn unique_in_order<I, S>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for key in keys {
        let key = key.as_ref();
        if seen.insert(key.to_string()) {
            unique.push(key.to_string());
        }
    }

    unique
}

/// Sector name a flat sector-row field belongs to for `metric`, if any.
///
/// Energy fields carry the `_energy` suffix; every other field is a CO2
/// value keyed by the bare sector name.
pub fn sector_for_field(field: &str, metric: Metric) -> Option<&str> {
    match metric {
        Metric::Energy => field.strip_suffix(ENERGY_SUFFIX),
        Metric::Co2 if field.ends_with(ENERGY_SUFFIX) => None,
        Metric::Co2 => Some(field),
    }
}

/// Field name holding `sector`'s value for `metric` in a flat sector row.
pub fn sector_field(sector: &str, metric: Metric) -> String {
    match metric {
        Metric::Co2 => sector.to_string(),
        Metric::Energy => format!("{}{}", sector, ENERGY_SUFFIX),
    }
}

/// Sector names found in flat sector rows, in first-seen order.
///
/// Only numeric fields count; labels or other text fields are ignored.
pub fn sector_keys(rows: &[SectorRow], metric: Metric) -> Vec<String> {
    unique_in_order(
        rows.iter()
            .flat_map(|row| row.values.iter())
            .filter(|(_, value)| value.is_number())
            .filter_map(|(field, _)| sector_for_field(field, metric)),
    )
}

/// Sort key for a year label: numeric years first, by value, then text
/// labels such as `"Unknown"`, alphabetically.
fn year_sort_key(year: &str) -> (u8, i64, &str) {
    match year.trim().parse::<i64>() {
        Ok(n) => (0, n, year),
        Err(_) => (1, 0, year),
    }
}

/// Compare two year labels. Numeric labels sort before text labels.
pub fn compare_years(a: &str, b: &str) -> Ordering {
    year_sort_key(a).cmp(&year_sort_key(b))
}

/// Sort aggregates by year. The pivot engine never reorders, so callers
/// that want chronological rows sort first.
pub fn sort_by_year(years: &mut [YearAggregate]) {
    years.sort_by(|a, b| compare_years(&a.year, &b.year));
}
