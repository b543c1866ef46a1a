//! Feasibility Score - can the carrier actually play the ball into the zone?
//!
//! ```text
//! pressure      = logistic(1.5 * (nearest_defender_distance - 3.0))
//! obstruction   = exp(-0.3 * defenders_inside_passing_cone)
//! pass_distance = exp(-0.03 * |carrier - lq_center|)
//! feasibility   = 0.45 * obstruction + 0.3 * pressure + 0.25 * pass_distance
//! ```

use super::config::{FeasibilityConfig, TeamControlConfig};
use super::geometry::{closest_entity, finite_or, logistic, passing_cone};
use super::quadrant::LeakageQuadrant;
use crate::models::EntityState;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FeasibilityBreakdown {
    /// False when no carrier was known; every factor is then 0
    pub carrier_present: bool,
    pub nearest_defender_distance: f32,
    pub pressure_factor: f32,
    pub interceptors_in_cone: usize,
    pub obstruction_factor: f32,
    pub pass_distance: f32,
    pub pass_distance_factor: f32,
    pub score: f32,
}

pub fn calculate_feasibility(
    lq: &LeakageQuadrant,
    carrier: Option<&EntityState>,
    defenders: &[&EntityState],
    tc_cfg: &TeamControlConfig,
    cfg: &FeasibilityConfig,
) -> FeasibilityBreakdown {
    let Some(carrier) = carrier else {
        return FeasibilityBreakdown::default();
    };
    let origin = carrier.position;

    let (_, nearest) = closest_entity(&origin, defenders.iter().copied());
    let nearest_defender_distance = finite_or(nearest, tc_cfg.unreachable_tta);
    let pressure_factor = logistic(cfg.pressure_steepness * (nearest_defender_distance - cfg.pressure_midpoint));

    let interceptors_in_cone = match passing_cone(&origin, lq.corners()) {
        Some(cone) => defenders.iter().filter(|d| cone.contains(&d.position)).count(),
        None => 0,
    };
    let obstruction_factor = (-cfg.obstruction_decay * interceptors_in_cone as f32).exp();

    let pass_distance = (lq.center() - origin).norm();
    let pass_distance_factor = (-cfg.pass_distance_decay * pass_distance).exp();

    let raw = cfg.obstruction_weight * obstruction_factor
        + cfg.pressure_weight * pressure_factor
        + cfg.pass_distance_weight * pass_distance_factor;

    FeasibilityBreakdown {
        carrier_present: true,
        nearest_defender_distance,
        pressure_factor,
        interceptors_in_cone,
        obstruction_factor,
        pass_distance,
        pass_distance_factor,
        score: finite_or(raw, 0.0).clamp(0.0, 1.0),
    }
}
