//! Analysis modules.
//!
//! Ranking tables and totals derived from the stats payload.

pub mod aggregator;

pub use aggregator::*;
