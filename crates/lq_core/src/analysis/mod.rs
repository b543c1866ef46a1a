//! # Analysis Module
//!
//! Stateless feature extraction over a roster snapshot.
//!
//! ## Submodules
//!
//! - `metrics` - Team shape and defensive line metrics
//! - `features` - Flat numerical feature map for dataset export

pub mod features;
pub mod metrics;

pub use features::{FeatureMap, FeatureMetadata, FeatureRequest, FeatureService, LocalFeatureService};
pub use metrics::{ContextFeatures, TeamShape};
