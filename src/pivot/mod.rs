//! Chart-ready pivoting.
//!
//! Turns per-year aggregates into a uniform year-by-category table, plus
//! the key-list helpers that decide column order.

pub mod engine;
pub mod keys;

pub use engine::pivot;
pub use keys::*;
