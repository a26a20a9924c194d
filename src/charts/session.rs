//! Dashboard session: the loaded dataset plus its color registries.

use super::{build_view, ChartError};
use crate::models::{ChartView, ColorAssignments, Metric, StatsPayload, ViewMode};
use crate::palette::ChartColors;
use tracing::info;

/// Owns the current dataset and the colors handed out while showing it.
///
/// Creating a session starts with empty registries, and
/// [`DashboardSession::switch_dataset`] resets them before the new data
/// can be charted, so colors never carry over between datasets.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    stats: StatsPayload,
    colors: ChartColors,
    sort_years: bool,
}

impl DashboardSession {
    /// Start a session for `stats` with fresh registries.
    pub fn new(stats: StatsPayload, mut colors: ChartColors) -> Self {
        colors.reset();
        info!(
            "Loaded dataset: {} tier rows, {} sectors, {} companies",
            stats.tiers.len(),
            stats.metadata.sectors.len(),
            stats.metadata.company_list.len()
        );

        Self {
            stats,
            colors,
            sort_years: false,
        }
    }

    /// Sort years chronologically before pivoting.
    pub fn with_sorted_years(mut self, sort_years: bool) -> Self {
        self.sort_years = sort_years;
        self
    }

    /// Replace the dataset, resetting both registries first.
    pub fn switch_dataset(&mut self, stats: StatsPayload) {
        self.colors.reset();
        self.stats = stats;
        info!("Switched dataset, color assignments cleared");
    }

    pub fn stats(&self) -> &StatsPayload {
        &self.stats
    }

    /// Build one chart for the current dataset.
    pub fn view(&mut self, mode: ViewMode, metric: Metric) -> Result<ChartView, ChartError> {
        build_view(mode, metric, &self.stats, &mut self.colors, self.sort_years)
    }

    /// Whether the current dataset can be charted in `mode`.
    pub fn supports(&self, mode: ViewMode) -> bool {
        self.stats.supports(mode)
    }

    /// Snapshot of the colors handed out so far.
    pub fn assignments(&self) -> ColorAssignments {
        ColorAssignments {
            sectors: self.colors.sectors.assignments().clone(),
            companies: self.colors.companies.assignments().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectorRow;
    use crate::palette::{ColorRegistry, SECTOR_PALETTE};

    fn payload(sectors: &[&str]) -> StatsPayload {
        let row = SectorRow {
            year: "2021".to_string(),
            values: serde_json::Map::new(),
        };
        let mut stats = StatsPayload {
            sectors: Some(vec![row]),
            ..StatsPayload::default()
        };
        stats.metadata.sectors = sectors.iter().map(|s| s.to_string()).collect();
        stats
    }

    #[test]
    fn test_colors_stable_within_session() {
        let mut session = DashboardSession::new(payload(&["A", "B"]), ChartColors::default());

        let first = session.view(ViewMode::Sectors, Metric::Co2).unwrap();
        let again = session.view(ViewMode::Sectors, Metric::Energy).unwrap();

        assert_eq!(first.series, again.series);
        assert_eq!(session.assignments().sectors.len(), 2);
    }

    #[test]
    fn test_switch_dataset_resets_colors() {
        let mut session = DashboardSession::new(payload(&["A", "B"]), ChartColors::default());
        session.view(ViewMode::Sectors, Metric::Co2).unwrap();
        assert_eq!(session.assignments().sectors["B"], SECTOR_PALETTE[1]);

        session.switch_dataset(payload(&["B", "C"]));
        assert!(session.assignments().sectors.is_empty());

        let view = session.view(ViewMode::Sectors, Metric::Co2).unwrap();
        // B asks first in the new dataset and takes the first color
        assert_eq!(view.series[0].key, "B");
        assert_eq!(view.series[0].color, SECTOR_PALETTE[0]);
        assert_eq!(view.series[1].color, SECTOR_PALETTE[1]);
    }

    #[test]
    fn test_new_session_discards_previous_assignments() {
        let mut colors = ChartColors {
            sectors: ColorRegistry::new("sector", vec!["#111".to_string()], "#999"),
            companies: ColorRegistry::companies(),
        };
        colors.sectors.color_for("Stale");

        let mut session = DashboardSession::new(payload(&["Fresh"]), colors);
        let view = session.view(ViewMode::Sectors, Metric::Co2).unwrap();

        assert_eq!(view.series[0].color, "#111");
        assert!(!session.assignments().sectors.contains_key("Stale"));
    }

    #[test]
    fn test_supports_follows_payload() {
        let session = DashboardSession::new(StatsPayload::default(), ChartColors::default());
        assert!(session.supports(ViewMode::Tiers));
        assert!(!session.supports(ViewMode::Companies));
        assert!(session.stats().tiers.is_empty());
    }
}
