//! Score sub-calculator and aggregator parameters

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Threat potential parameters
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ThreatConfig {
    // === Proximity ===
    /// Goal distance at which proximity threat is 0.5 (default: 30.0)
    pub proximity_midpoint: f32,
    /// Logistic steepness of proximity threat (default: 0.25)
    #[validate(range(min = 0.0))]
    pub proximity_steepness: f32,

    // === Strategic bonus ===
    /// Ceiling of the behind-the-line bonus (default: 0.95)
    #[validate(range(min = 0.0, max = 1.0))]
    pub strategic_weight: f32,
    /// Goal distance at which the bonus logistic is 0.5 (default: 20.0)
    pub strategic_midpoint: f32,
    /// (default: 0.25)
    #[validate(range(min = 0.0))]
    pub strategic_steepness: f32,

    // === Shape ===
    /// Exponential decay per radian off the forward axis (default: 1.2)
    #[validate(range(min = 0.0))]
    pub angle_decay: f32,
    /// LQ area at which the amplifier is half way (default: 75.0)
    pub area_midpoint: f32,
    /// (default: 0.04)
    #[validate(range(min = 0.0))]
    pub area_steepness: f32,
    /// Maximum extra amplification for large zones (default: 0.4)
    #[validate(range(min = 0.0))]
    pub area_max_bonus: f32,

    // === Blend ===
    /// (default: 0.7)
    #[validate(range(min = 0.0, max = 1.0))]
    pub proximity_weight: f32,
    /// (default: 0.3)
    #[validate(range(min = 0.0, max = 1.0))]
    pub angle_weight: f32,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            proximity_midpoint: 30.0,
            proximity_steepness: 0.25,
            strategic_weight: 0.95,
            strategic_midpoint: 20.0,
            strategic_steepness: 0.25,
            angle_decay: 1.2,
            area_midpoint: 75.0,
            area_steepness: 0.04,
            area_max_bonus: 0.4,
            proximity_weight: 0.7,
            angle_weight: 0.3,
        }
    }
}

/// Exploitation parameters
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ExploitationConfig {
    /// Radius around the LQ centre in which players are considered (default: 20.0)
    #[validate(range(min = 0.0))]
    pub analysis_radius: f32,

    // === Defensive side ===
    /// Per-defender arrival probability decay (default: 0.4)
    pub swarm_decay: f32,
    /// Recovery decay on the fastest defender TTA (default: 0.1)
    pub recovery_decay: f32,
    /// How sharply converging defenders suppress the zone (default: 5.0)
    #[validate(range(min = 0.0))]
    pub swarm_sensitivity: f32,
    /// (default: 0.6)
    #[validate(range(min = 0.0, max = 1.0))]
    pub recovery_weight: f32,
    /// (default: 0.4)
    #[validate(range(min = 0.0, max = 1.0))]
    pub swarm_weight: f32,

    // === Offensive side ===
    /// Per-attacker support decay (default: 0.15)
    pub support_decay: f32,
    /// tanh gain on aggregate support (default: 2.0)
    pub support_gain: f32,
    /// Logistic scale on attacker minus defender aggregate (default: 5.0)
    pub overload_scale: f32,
    /// Maximum extra multiplier for a speed advantage (default: 0.45)
    #[validate(range(min = 0.0))]
    pub speed_bonus_max: f32,
    /// tanh gain on the time advantage (default: 0.2)
    pub speed_bonus_gain: f32,
    /// (default: 0.6)
    #[validate(range(min = 0.0, max = 1.0))]
    pub support_weight: f32,
    /// (default: 0.4)
    #[validate(range(min = 0.0, max = 1.0))]
    pub overload_weight: f32,
}

impl Default for ExploitationConfig {
    fn default() -> Self {
        Self {
            analysis_radius: 20.0,
            swarm_decay: 0.4,
            recovery_decay: 0.1,
            swarm_sensitivity: 5.0,
            recovery_weight: 0.6,
            swarm_weight: 0.4,
            support_decay: 0.15,
            support_gain: 2.0,
            overload_scale: 5.0,
            speed_bonus_max: 0.45,
            speed_bonus_gain: 0.2,
            support_weight: 0.6,
            overload_weight: 0.4,
        }
    }
}

/// Pass feasibility parameters
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FeasibilityConfig {
    /// (default: 1.5)
    #[validate(range(min = 0.0))]
    pub pressure_steepness: f32,
    /// Nearest-defender distance at which pressure factor is 0.5 (default: 3.0)
    pub pressure_midpoint: f32,
    /// Decay per defender inside the passing cone (default: 0.3)
    #[validate(range(min = 0.0))]
    pub obstruction_decay: f32,
    /// Decay per unit of pass length (default: 0.03)
    #[validate(range(min = 0.0))]
    pub pass_distance_decay: f32,
    /// (default: 0.45)
    #[validate(range(min = 0.0, max = 1.0))]
    pub obstruction_weight: f32,
    /// (default: 0.3)
    #[validate(range(min = 0.0, max = 1.0))]
    pub pressure_weight: f32,
    /// (default: 0.25)
    #[validate(range(min = 0.0, max = 1.0))]
    pub pass_distance_weight: f32,
}

impl Default for FeasibilityConfig {
    fn default() -> Self {
        Self {
            pressure_steepness: 1.5,
            pressure_midpoint: 3.0,
            obstruction_decay: 0.3,
            pass_distance_decay: 0.03,
            obstruction_weight: 0.45,
            pressure_weight: 0.3,
            pass_distance_weight: 0.25,
        }
    }
}

/// Final leakage score aggregation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AggregateConfig {
    /// Weight of threat × exploitation (default: 0.4)
    #[validate(range(min = 0.0, max = 1.0))]
    pub product_weight: f32,
    /// Weight of the threat/exploitation mean (default: 0.6)
    #[validate(range(min = 0.0, max = 1.0))]
    pub average_weight: f32,
    /// Share of the situation value kept at zero feasibility (default: 0.5)
    #[validate(range(min = 0.0, max = 1.0))]
    pub feasibility_floor: f32,
    /// Logistic sharpness of the final squash (default: 10.0)
    #[validate(range(min = 0.0))]
    pub sharpness: f32,
    /// Raw score mapped to 0.5 (default: 0.5)
    pub decision_boundary: f32,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            product_weight: 0.4,
            average_weight: 0.6,
            feasibility_floor: 0.5,
            sharpness: 10.0,
            decision_boundary: 0.5,
        }
    }
}
