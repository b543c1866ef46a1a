//! # Metrics Module
//!
//! Context metrics over a roster snapshot, independent of any leakage quadrant.
//!
//! - `shape` - Team shape (centroid, width, depth, hull), defensive line, formation disruption

pub mod shape;

pub use shape::*;
