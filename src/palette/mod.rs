//! Chart color palettes and per-session color assignment.
//!
//! Colors are handed out in first-seen order: the first key ever asked
//! for gets the first palette color, the second new key the second, and
//! so on. Once a palette runs out every further new key gets the
//! registry's fallback color.

pub mod registry;

pub use registry::{ChartColors, ColorRegistry};

use thiserror::Error;

/// Default palette for sector series.
pub const SECTOR_PALETTE: &[&str] = &[
    "#3b82f6", "#10b981", "#f97316", "#8b5cf6", "#ec4899", "#14b8a6", "#f59e0b", "#ef4444",
    "#84cc16", "#06b6d4", "#d946ef", "#0ea5e9",
];

/// Default palette for company series.
pub const COMPANY_PALETTE: &[&str] = &[
    "#6366f1", "#22d3ee", "#f472b6", "#a78bfa", "#34d399", "#fb923c", "#60a5fa", "#f87171",
    "#a3e635", "#38bdf8", "#c084fc", "#4ade80", "#fbbf24", "#818cf8", "#2dd4bf", "#f43f5e",
    "#a855f7", "#eab308", "#0ea5e9", "#10b981", "#f97316", "#8b5cf6", "#ec4899", "#14b8a6",
];

/// Returned for new sector keys once the sector palette is exhausted.
pub const SECTOR_FALLBACK: &str = "#94a3b8";

/// Returned for new company keys once the company palette is exhausted.
pub const COMPANY_FALLBACK: &str = "#64748b";

/// Fixed tier colors: high, medium, low.
pub const TIER_COLORS: [&str; 3] = ["#ef4444", "#f59e0b", "#10b981"];

/// Errors raised while validating configured palettes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaletteError {
    #[error("invalid color '{color}' in {palette} palette: expected #rgb or #rrggbb")]
    InvalidColor { palette: &'static str, color: String },
}

/// Whether `color` is a `#rgb` or `#rrggbb` hex string.
pub fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Check every color of a palette plus its fallback.
pub fn validate_palette(
    name: &'static str,
    colors: &[String],
    fallback: &str,
) -> Result<(), PaletteError> {
    colors
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(fallback))
        .find(|c| !is_hex_color(c))
        .map_or(Ok(()), |bad| {
            Err(PaletteError::InvalidColor {
                palette: name,
                color: bad.to_string(),
            })
        })
}

/// Owned copy of a built-in palette.
pub fn palette_vec(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|c| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_palettes_are_valid() {
        assert!(validate_palette("sector", &palette_vec(SECTOR_PALETTE), SECTOR_FALLBACK).is_ok());
        assert!(
            validate_palette("company", &palette_vec(COMPANY_PALETTE), COMPANY_FALLBACK).is_ok()
        );
        assert!(TIER_COLORS.iter().all(|c| is_hex_color(c)));
    }

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#111"));
        assert!(is_hex_color("#A0b1C2"));
        assert!(!is_hex_color("111111"));
        assert!(!is_hex_color("#12345"));
        assert!(!is_hex_color("#ggghhh"));
    }

    #[test]
    fn test_validate_palette_reports_first_bad_color() {
        let colors = vec!["#111".to_string(), "red".to_string()];
        assert_eq!(
            validate_palette("sector", &colors, "#222"),
            Err(PaletteError::InvalidColor {
                palette: "sector",
                color: "red".to_string(),
            })
        );

        let err = validate_palette("company", &[], "nope").unwrap_err();
        assert!(err.to_string().contains("company palette"));
    }
}
