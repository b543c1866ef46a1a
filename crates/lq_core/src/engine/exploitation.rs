//! Exploitation Score - can the attack actually use the space before it closes?
//!
//! Only players within `analysis_radius` of the zone centre take part.
//!
//! ```text
//! defensive_control = 0.6 * exp(-0.1 * def_fastest) + 0.4 * (1 - 1 / (1 + 5 * Σ exp(-0.4 * tta_d)))
//! support           = tanh(2 * Σ exp(-0.15 * tta_a))
//! overload          = logistic(5 * (att_aggregate - def_aggregate))
//! speed_bonus       = 1 + 0.45 * tanh(0.2 * max(0, def_fastest - att_fastest))
//! exploitation      = min(1, (0.6 * support + 0.4 * overload) * (1 - defensive_control) * speed_bonus)
//! ```

use super::config::{ExploitationConfig, TeamControlConfig};
use super::geometry::{finite_or, logistic};
use super::quadrant::LeakageQuadrant;
use super::team_control::TeamControl;
use crate::models::EntityState;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExploitationBreakdown {
    pub near_defenders: usize,
    pub near_attackers: usize,

    // === Defensive side ===
    pub defender_fastest_tta: f32,
    pub defender_aggregate: f32,
    pub recovery_score: f32,
    pub swarm_score: f32,
    pub defensive_control: f32,

    // === Offensive side ===
    pub attacker_fastest_tta: f32,
    pub attacker_aggregate: f32,
    pub support_score: f32,
    pub overload_score: f32,
    pub speed_bonus: f32,
    pub base_potential: f32,

    pub score: f32,
}

pub fn calculate_exploitation(
    lq: &LeakageQuadrant,
    defenders: &[&EntityState],
    attackers: &[&EntityState],
    carrier: Option<&EntityState>,
    tc_cfg: &TeamControlConfig,
    cfg: &ExploitationConfig,
) -> ExploitationBreakdown {
    let center = lq.center();
    let tc = TeamControl::new(tc_cfg);

    let near_defenders: Vec<&EntityState> = defenders
        .iter()
        .copied()
        .filter(|d| d.distance_to(&center) <= cfg.analysis_radius)
        .collect();
    let near_attackers: Vec<&EntityState> = attackers
        .iter()
        .copied()
        .filter(|a| carrier.map_or(true, |c| c.id != a.id))
        .filter(|a| a.distance_to(&center) <= cfg.analysis_radius)
        .collect();

    // Defensive side
    let def = tc.defenders(&center, &near_defenders);
    let defender_aggregate = def.aggregate(cfg.swarm_decay);
    let recovery_score = (-cfg.recovery_decay * def.fastest).exp();
    let swarm_score = 1.0 / (1.0 + cfg.swarm_sensitivity * defender_aggregate);
    let defensive_control = cfg.recovery_weight * recovery_score + cfg.swarm_weight * (1.0 - swarm_score);

    // Offensive side
    let att = tc.attackers(&center, &near_attackers, carrier);
    let attacker_aggregate = att.aggregate(cfg.support_decay);
    let support_score = (cfg.support_gain * attacker_aggregate).tanh();

    let overload_score = logistic(cfg.overload_scale * (attacker_aggregate - defender_aggregate));
    let time_advantage = (def.fastest - att.fastest).max(0.0);
    let speed_bonus = 1.0 + cfg.speed_bonus_max * (cfg.speed_bonus_gain * time_advantage).tanh();

    let base_potential = cfg.support_weight * support_score + cfg.overload_weight * overload_score;
    let raw = base_potential * (1.0 - defensive_control) * speed_bonus;

    ExploitationBreakdown {
        near_defenders: near_defenders.len(),
        near_attackers: near_attackers.len(),
        defender_fastest_tta: def.fastest,
        defender_aggregate,
        recovery_score,
        swarm_score,
        defensive_control,
        attacker_fastest_tta: att.fastest,
        attacker_aggregate,
        support_score,
        overload_score,
        speed_bonus,
        base_potential,
        score: finite_or(raw, 0.0).clamp(0.0, 1.0),
    }
}
