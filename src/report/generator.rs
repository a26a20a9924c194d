//! Chart report generation.
//!
//! This module renders the prepared chart views, the company ranking
//! and the color assignments as Markdown or JSON.

use crate::analysis::{column_shares, column_totals};
use crate::models::{
    ChartView, ColorAssignments, CompanyRanking, Report, ReportMetadata, SortOrder, ViewMode,
};
use anyhow::Result;
use indexmap::IndexMap;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Emissions Chart Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(report));

    for view in &report.views {
        output.push_str(&generate_view_section(view));
    }

    output.push_str(&generate_unavailable_section(&report.unavailable));

    if !report.rankings.is_empty() {
        output.push_str("## Company Rankings\n\n");
        for ranking in &report.rankings {
            output.push_str(&generate_ranking_section(ranking));
        }
    }

    if let Some(ref assignments) = report.assignments {
        output.push_str(&generate_assignments_section(assignments));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if !metadata.years.is_empty() {
        section.push_str(&format!("- **Years:** {}\n", metadata.years.join(", ")));
    }
    section.push_str(&format!("- **Sectors:** {}\n", metadata.sector_count));
    section.push_str(&format!("- **Companies:** {}\n", metadata.company_count));
    section.push('\n');

    section
}

/// Make free text safe inside a Markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn view_title(view: &ChartView) -> String {
    format!("{} {}", view.metric, view.mode)
}

fn anchor(title: &str) -> String {
    title.replace([' ', '/', '.'], "-").to_lowercase()
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &Report) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");

    for view in &report.views {
        let title = view_title(view);
        toc.push_str(&format!("- [{}](#{})\n", title, anchor(&title)));
    }

    if !report.rankings.is_empty() {
        toc.push_str("- [Company Rankings](#company-rankings)\n");
    }
    if report.assignments.is_some() {
        toc.push_str("- [Color Assignments](#color-assignments)\n");
    }

    toc.push('\n');

    toc
}

/// Generate the legend and data table of one chart.
fn generate_view_section(view: &ChartView) -> String {
    let mut section = String::new();

    let title = view_title(view);
    section.push_str(&format!("## {} {{#{}}}\n\n", title, anchor(&title)));
    section.push_str(&format!(
        "*{} bars | {} years | {} series*\n\n",
        if view.stacked { "Stacked" } else { "Grouped" },
        view.rows.len(),
        view.series.len()
    ));

    if view.series.is_empty() {
        section.push_str("No categories to chart.\n\n");
        return section;
    }

    section.push_str("### Legend\n\n");
    section.push_str("| Series | Color |\n");
    section.push_str("|:---|:---:|\n");
    for series in &view.series {
        section.push_str(&format!(
            "| {} | `{}` |\n",
            escape_cell(&series.label),
            series.color
        ));
    }
    section.push('\n');

    if view.rows.is_empty() {
        section.push_str("No yearly data.\n\n");
        return section;
    }

    section.push_str("### Data\n\n");
    let labels: Vec<String> = view.series.iter().map(|s| escape_cell(&s.label)).collect();
    section.push_str(&format!("| Year | {} | **Total** |\n", labels.join(" | ")));
    section.push_str(&format!("|:---|{}:---:|\n", ":---:|".repeat(labels.len())));

    for row in &view.rows {
        let cells: Vec<String> = view
            .series
            .iter()
            .map(|s| view.metric.format_value(row.get(&s.key).unwrap_or(0.0)))
            .collect();
        section.push_str(&format!(
            "| {} | {} | **{}** |\n",
            row.year,
            cells.join(" | "),
            view.metric.format_value(row.total())
        ));
    }

    if view.mode != ViewMode::Tiers {
        let totals = column_totals(&view.rows);
        let cells: Vec<String> = view
            .series
            .iter()
            .map(|s| view.metric.format_value(totals.get(&s.key).copied().unwrap_or(0.0)))
            .collect();
        let grand: f64 = totals.values().sum();
        section.push_str(&format!(
            "| **All years** | {} | **{}** |\n",
            cells.join(" | "),
            view.metric.format_value(grand)
        ));

        let shares = column_shares(&view.rows);
        let cells: Vec<String> = view
            .series
            .iter()
            .map(|s| format!("{:.1}%", shares.get(&s.key).copied().unwrap_or(0.0)))
            .collect();
        let covered = if grand == 0.0 { 0.0 } else { 100.0 };
        section.push_str(&format!(
            "| **Share** | {} | **{:.1}%** |\n",
            cells.join(" | "),
            covered
        ));
    }
    section.push('\n');

    section
}

/// List views that were requested but have no data.
fn generate_unavailable_section(unavailable: &[ViewMode]) -> String {
    if unavailable.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Unavailable Views\n\n");
    for mode in unavailable {
        section.push_str(&format!("- {} (no data in this dataset)\n", mode));
    }
    section.push('\n');

    section
}

/// Generate the company ranking table.
fn generate_ranking_section(ranking: &CompanyRanking) -> String {
    let mut section = String::new();

    let direction = match ranking.order {
        SortOrder::Desc => "highest first",
        SortOrder::Asc => "lowest first",
    };
    section.push_str(&format!("### By {} ({})\n\n", ranking.metric, direction));
    if let Some(ref term) = ranking.search {
        section.push_str(&format!("*Filtered by \"{}\"*\n\n", term));
    }
    if let Some(ref sector) = ranking.sector {
        section.push_str(&format!("*Sector: {}*\n\n", sector));
    }

    if ranking.companies.is_empty() {
        section.push_str("No companies match.\n\n");
        return section;
    }

    section.push_str("| Rank | Company | Sector | Year | Value | Efficiency |\n");
    section.push_str("|:---:|:---|:---|:---:|---:|---:|\n");
    for company in &ranking.companies {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            company.rank,
            escape_cell(&company.name),
            escape_cell(&company.sector),
            company.year,
            ranking.metric.format_value(company.value),
            format_efficiency(company.efficiency)
        ));
    }
    section.push('\n');

    section
}

/// Tons per kWh shown as kg per MWh, which keeps the figures readable.
fn format_efficiency(efficiency: Option<f64>) -> String {
    match efficiency {
        Some(tons_per_kwh) => format!("{:.1} kg/MWh", tons_per_kwh * 1_000_000.0),
        None => "n/a".to_string(),
    }
}

fn generate_color_table(title: &str, colors: &IndexMap<String, String>) -> String {
    let mut table = String::new();

    table.push_str(&format!("### {}\n\n", title));
    if colors.is_empty() {
        table.push_str("None assigned.\n\n");
        return table;
    }

    table.push_str("| Key | Color |\n");
    table.push_str("|:---|:---:|\n");
    for (key, color) in colors {
        table.push_str(&format!("| {} | `{}` |\n", escape_cell(key), color));
    }
    table.push('\n');

    table
}

/// Generate the color assignment tables.
fn generate_assignments_section(assignments: &ColorAssignments) -> String {
    let mut section = String::new();

    section.push_str("## Color Assignments\n\n");
    section.push_str("Colors are assigned in the order categories were first charted.\n\n");
    section.push_str(&generate_color_table("Sectors", &assignments.sectors));
    section.push_str(&generate_color_table("Companies", &assignments.companies));

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by emicharts v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
