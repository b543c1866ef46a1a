//! Pitch geometry

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Pitch dimensions in ground-plane units, origin at the centre spot.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PitchConfig {
    /// Half of the pitch length along x (default: 52.5)
    #[validate(range(min = 1.0))]
    pub half_length: f32,
    /// Half of the pitch width along z (default: 34.0)
    #[validate(range(min = 1.0))]
    pub half_width: f32,
    /// Distance between the posts (default: 7.32)
    #[validate(range(min = 0.0))]
    pub goal_width: f32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self { half_length: 52.5, half_width: 34.0, goal_width: 7.32 }
    }
}
