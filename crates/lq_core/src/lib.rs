//! # lq_core - Leakage Quadrant Scoring Engine
//!
//! Scores rectangular zones of pitch space ("leakage quadrants") for how
//! exploitable they are to the attacking team, from live tracking data.
//!
//! ## Features
//! - Deterministic, allocation-light scoring with a full breakdown per call
//! - Gap-aware position tracking with possession detection
//! - Context feature extraction and NDJSON export for dataset building
//! - One YAML-loadable configuration for every tunable constant

// Scorers take the whole roster context as separate arguments
#![allow(clippy::too_many_arguments)]
// Doc formatting lints - purely cosmetic
#![allow(clippy::doc_lazy_continuation)]

pub mod analysis;
pub mod engine;
pub mod error;
pub mod models;
pub mod replay;

pub use analysis::{FeatureMap, FeatureMetadata, FeatureRequest, FeatureService, LocalFeatureService};
pub use engine::{EngineConfig, Goal, LeakageEngine, LeakageQuadrant, LeakageScore, ScoringInput};
pub use error::{ConfigError, ExportError, FeatureError, LeakageError, Result, TrackingError};
pub use models::{AttackDirection, EntityState, Role};
pub use replay::{AnalysisSession, EvaluationContext, PlaybackBuffer, PositionTracker, RawFrame};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
