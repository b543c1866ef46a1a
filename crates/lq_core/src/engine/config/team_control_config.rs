//! Time-to-arrival model parameters

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TeamControlConfig {
    /// Speed floor for recovering defenders, units/s (default: 1.0)
    #[validate(range(min = 0.01))]
    pub defender_min_speed: f32,
    /// Speed floor for attacking receivers, units/s (default: 4.0)
    #[validate(range(min = 0.01))]
    pub attacker_min_speed: f32,
    /// Average ball speed of a pass, units/s (default: 15.0)
    #[validate(range(min = 0.01))]
    pub avg_pass_speed: f32,
    /// Finite "unreachable" time used instead of infinity (default: 99.0)
    #[validate(range(min = 1.0))]
    pub unreachable_tta: f32,
}

impl Default for TeamControlConfig {
    fn default() -> Self {
        Self {
            defender_min_speed: 1.0,
            attacker_min_speed: 4.0,
            avg_pass_speed: 15.0,
            unreachable_tta: 99.0,
        }
    }
}
