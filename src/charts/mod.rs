//! Chart view construction.
//!
//! A view is the tagged selection between tiers, sectors and companies
//! for one metric. Views are built from a [`StatsPayload`] through a
//! [`DashboardSession`], which owns the color registries.
//!
//! [`StatsPayload`]: crate::models::StatsPayload

pub mod session;
pub mod views;

pub use session::DashboardSession;
pub use views::build_view;

use crate::models::ViewMode;
use thiserror::Error;

/// Errors raised while building chart views.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("{0:?} view is unavailable: the dataset has no data for it")]
    ViewUnavailable(ViewMode),
}
