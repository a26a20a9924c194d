//! First-seen-order color registry.

use super::{palette_vec, COMPANY_FALLBACK, COMPANY_PALETTE, SECTOR_FALLBACK, SECTOR_PALETTE};
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Assigns palette colors to category keys in the order keys are first seen.
///
/// A key keeps its color until [`ColorRegistry::reset`]. Distinct keys
/// never share a color while palette slots remain; after that every new
/// key gets the fallback and is not recorded, so it may collide with
/// other late keys.
#[derive(Debug, Clone)]
pub struct ColorRegistry {
    name: &'static str,
    palette: Vec<String>,
    /// Index of the next unused palette color.
    next: usize,
    assignments: IndexMap<String, String>,
    fallback: String,
    exhausted_logged: bool,
}

impl ColorRegistry {
    /// Create a registry over `palette` with a constant fallback color.
    pub fn new(name: &'static str, palette: Vec<String>, fallback: impl Into<String>) -> Self {
        Self {
            name,
            palette,
            next: 0,
            assignments: IndexMap::new(),
            fallback: fallback.into(),
            exhausted_logged: false,
        }
    }

    /// Registry over the built-in sector palette.
    pub fn sectors() -> Self {
        Self::new("sector", palette_vec(SECTOR_PALETTE), SECTOR_FALLBACK)
    }

    /// Registry over the built-in company palette.
    pub fn companies() -> Self {
        Self::new("company", palette_vec(COMPANY_PALETTE), COMPANY_FALLBACK)
    }

    /// Color for `key`, allocating the next palette color on first sight.
    pub fn color_for(&mut self, key: &str) -> &str {
        if !self.assignments.contains_key(key) {
            let Some(color) = self.palette.get(self.next).cloned() else {
                if !self.exhausted_logged {
                    warn!(
                        "{} palette exhausted ({} colors), using fallback {}",
                        self.name,
                        self.palette.len(),
                        self.fallback
                    );
                    self.exhausted_logged = true;
                }
                debug!("{} '{}' -> {} (fallback)", self.name, key, self.fallback);
                return &self.fallback;
            };

            debug!("{} '{}' -> {}", self.name, key, color);
            self.next += 1;
            self.assignments.insert(key.to_string(), color);
        }

        &self.assignments[key]
    }

    /// Forget every assignment and start again from the first palette color.
    pub fn reset(&mut self) {
        debug!(
            "Resetting {} colors ({} assigned)",
            self.name,
            self.assignments.len()
        );
        self.assignments.clear();
        self.next = 0;
        self.exhausted_logged = false;
    }

    /// Assignments made since the last reset, in first-seen order.
    pub fn assignments(&self) -> &IndexMap<String, String> {
        &self.assignments
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Number of palette colors not yet handed out.
    pub fn remaining(&self) -> usize {
        self.palette.len().saturating_sub(self.next)
    }
}

/// The two independent registries a dashboard needs.
///
/// Sectors and companies do not share color space: a sector and a
/// company may legitimately end up with the same hex value.
#[derive(Debug, Clone)]
pub struct ChartColors {
    pub sectors: ColorRegistry,
    pub companies: ColorRegistry,
}

impl Default for ChartColors {
    fn default() -> Self {
        Self {
            sectors: ColorRegistry::sectors(),
            companies: ColorRegistry::companies(),
        }
    }
}

impl From<&crate::config::PaletteConfig> for ChartColors {
    fn from(config: &crate::config::PaletteConfig) -> Self {
        Self {
            sectors: ColorRegistry::new(
                "sector",
                config.sectors.clone(),
                config.sector_fallback.clone(),
            ),
            companies: ColorRegistry::new(
                "company",
                config.companies.clone(),
                config.company_fallback.clone(),
            ),
        }
    }
}

impl ChartColors {
    /// Reset both registries.
    pub fn reset(&mut self) {
        self.sectors.reset();
        self.companies.reset();
    }
}
