//! Company ranking and totals.
//!
//! This module flattens the per-year company lists into a ranking table
//! and computes the summary totals shown next to the charts.

use crate::models::{
    CompanyEntry, CompanyYear, Metric, PivotRow, RankedCompany, SortOrder, TierRow,
};
use indexmap::IndexMap;
use std::cmp::Ordering;

/// Flatten all companies across years, pairing each with its year.
pub fn flatten_companies(companies: &[CompanyYear]) -> Vec<(&str, &CompanyEntry)> {
    companies
        .iter()
        .flat_map(|y| y.companies.iter().map(move |c| (y.year.as_str(), c)))
        .collect()
}

/// Whether a company matches a search term on name or sector, ignoring case.
pub fn matches_search(company: &CompanyEntry, term: &str) -> bool {
    let term = term.to_lowercase();
    company.name.to_lowercase().contains(&term) || company.sector.to_lowercase().contains(&term)
}

/// Filters and ordering for a ranking table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingQuery<'a> {
    /// Substring of the name or sector, case-insensitive.
    pub search: Option<&'a str>,
    /// Exact sector name, case-insensitive.
    pub sector: Option<&'a str>,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

/// Rank companies by `metric`.
///
/// Every (year, company) pair is a row. Rows failing the search or the
/// sector filter are dropped, ties keep payload order in either
/// direction, and `limit` truncates the table.
pub fn rank_companies(
    companies: &[CompanyYear],
    metric: Metric,
    query: &RankingQuery<'_>,
) -> Vec<RankedCompany> {
    let mut rows: Vec<(&str, &CompanyEntry)> = flatten_companies(companies)
        .into_iter()
        .filter(|(_, c)| query.search.map_or(true, |term| matches_search(c, term)))
        .filter(|(_, c)| {
            query
                .sector
                .map_or(true, |sector| c.sector.to_lowercase() == sector.to_lowercase())
        })
        .collect();

    rows.sort_by(|a, b| {
        let ordering = a
            .1
            .value(metric)
            .partial_cmp(&b.1.value(metric))
            .unwrap_or(Ordering::Equal);
        match query.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    if let Some(n) = query.limit {
        rows.truncate(n);
    }

    rows.into_iter()
        .enumerate()
        .map(|(i, (year, c))| RankedCompany {
            rank: i + 1,
            name: c.name.clone(),
            sector: c.sector.clone(),
            year: year.to_string(),
            value: c.value(metric),
            efficiency: c.efficiency(),
        })
        .collect()
}

/// Per-year total of the three tiers.
pub fn yearly_totals(tiers: &[TierRow], metric: Metric) -> Vec<(String, f64)> {
    tiers
        .iter()
        .map(|row| (row.year.clone(), row.values(metric).iter().sum::<f64>()))
        .collect()
}

/// Sum of every column across all rows of a pivoted table.
pub fn column_totals(rows: &[PivotRow]) -> IndexMap<String, f64> {
    let mut totals: IndexMap<String, f64> = IndexMap::new();

    for row in rows {
        for (key, value) in &row.values {
            *totals.entry(key.clone()).or_default() += value;
        }
    }

    totals
}

/// Each column's percentage of the grand total across all rows.
///
/// Every share is `0` when the grand total is `0`.
pub fn column_shares(rows: &[PivotRow]) -> IndexMap<String, f64> {
    let totals = column_totals(rows);
    let grand: f64 = totals.values().sum();

    totals
        .into_iter()
        .map(|(key, total)| {
            let share = if grand == 0.0 { 0.0 } else { total / grand * 100.0 };
            (key, share)
        })
        .collect()
}

/// The `n` largest columns by total, highest first.
pub fn largest_columns(rows: &[PivotRow], n: usize) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = column_totals(rows).into_iter().collect();
    totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    totals.truncate(n);
    totals
}
