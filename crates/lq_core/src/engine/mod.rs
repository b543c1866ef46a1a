//! # Scoring Engine
//!
//! Pure, synchronous scoring of a leakage quadrant against one resolved
//! roster snapshot.
//!
//! - `geometry` - ground-plane helpers (closest entity, triangle test, area, passing cone)
//! - `goal` / `quadrant` - fixed pitch structures and the scored zone
//! - `team_control` - time-to-arrival models
//! - `threat_model`, `exploitation`, `feasibility` - the three sub-scores
//! - `leakage` - aggregation into the final score

pub mod config;
pub mod exploitation;
pub mod feasibility;
pub mod geometry;
pub mod goal;
pub mod leakage;
pub mod quadrant;
pub mod team_control;
pub mod threat_model;

pub use config::EngineConfig;
pub use exploitation::{calculate_exploitation, ExploitationBreakdown};
pub use feasibility::{calculate_feasibility, FeasibilityBreakdown};
pub use goal::Goal;
pub use leakage::{aggregate, Aggregate, LeakageEngine, LeakageScore, ScoringInput};
pub use quadrant::LeakageQuadrant;
pub use team_control::{ArrivalEstimate, TeamControl};
pub use threat_model::{calculate_threat_potential, last_defender, ThreatBreakdown};
