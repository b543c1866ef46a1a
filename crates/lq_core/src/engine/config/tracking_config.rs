//! Player state tracking and feature extraction parameters

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TrackingConfig {
    /// Ball distance inside which a player can hold possession (default: 1.5)
    #[validate(range(min = 0.0))]
    pub possession_radius: f32,
    /// How far ahead to search for a missing entity's reappearance, ms (default: 5000)
    #[validate(range(min = 0.0))]
    pub gap_search_horizon_ms: f64,
    /// EMA weight given to the newest velocity estimate (default: 0.5)
    #[validate(range(min = 0.0, max = 1.0))]
    pub velocity_smoothing: f32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self { possession_radius: 1.5, gap_search_horizon_ms: 5000.0, velocity_smoothing: 0.5 }
    }
}

/// Thresholds used by the contextual feature extractor
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FeatureConfig {
    /// Minimum mean forward speed of attackers ahead of the carrier (default: 3.0)
    pub counter_mean_speed: f32,
    /// Share of those attackers running forward (default: 0.35)
    #[validate(range(min = 0.0, max = 1.0))]
    pub counter_forward_fraction: f32,
    /// Upper bound on the mean forward speed of defenders ahead of the carrier (default: -1.5)
    pub counter_defender_retreat: f32,
    /// Forward speed above which an attacker counts as running forward (default: 1.0)
    pub forward_runner_speed: f32,
    /// Radius for the raw swarm counts (default: 10.0)
    #[validate(range(min = 0.0))]
    pub swarm_radius: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            counter_mean_speed: 3.0,
            counter_forward_fraction: 0.35,
            counter_defender_retreat: -1.5,
            forward_runner_speed: 1.0,
            swarm_radius: 10.0,
        }
    }
}
