//! emicharts - chart-ready data for emissions dashboards
//!
//! Pivots per-year emissions and energy aggregates into uniform
//! year-by-category tables, and assigns each sector and company a
//! stable color for as long as a dataset is on screen.

pub mod analysis;
pub mod charts;
pub mod cli;
pub mod config;
pub mod models;
pub mod palette;
pub mod pivot;
pub mod report;
