//! Leakage Score aggregation
//!
//! Threat (T), exploitation (E) and feasibility (F) are combined as
//!
//! ```text
//! situation = 0.4 * T * E + 0.6 * (T + E) / 2
//! raw       = situation * (0.5 + 0.5 * F)
//! final     = logistic(10 * (raw - 0.5))
//! ```
//!
//! A [`LeakageScore`] is always produced in one pass from one set of inputs and
//! carries every intermediate so debug and export tooling never recompute.

use super::config::{AggregateConfig, EngineConfig};
use super::exploitation::{calculate_exploitation, ExploitationBreakdown};
use super::feasibility::{calculate_feasibility, FeasibilityBreakdown};
use super::geometry::{finite_or, logistic};
use super::goal::Goal;
use super::quadrant::LeakageQuadrant;
use super::threat_model::{calculate_threat_potential, ThreatBreakdown};
use crate::models::{AttackDirection, EntityState};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// Result of one scoring call. Field names are a stable contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LeakageScore {
    /// Final score in [0, 1]; 0 when the computation was not finite
    pub final_score: f32,
    pub threat_score: f32,
    pub exploitation_score: f32,
    pub feasibility_score: f32,
    pub product: f32,
    pub average: f32,
    pub situation_value: f32,
    pub raw_score: f32,
    pub threat: ThreatBreakdown,
    pub exploitation: ExploitationBreakdown,
    pub feasibility: FeasibilityBreakdown,
}

impl LeakageScore {
    /// Flatten into `section.field` keys (booleans as 0/1, absent options skipped).
    pub fn to_feature_map(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        if let Ok(value) = serde_json::to_value(self) {
            flatten_into("", &value, &mut out);
        }
        out
    }

    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(LeakageScore)
    }
}

fn flatten_into(prefix: &str, value: &serde_json::Value, out: &mut BTreeMap<String, f64>) {
    use serde_json::Value;
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let name = if prefix.is_empty() { key.clone() } else { format!("{}.{}", prefix, key) };
                flatten_into(&name, child, out);
            }
        }
        Value::Number(n) => {
            if let Some(v) = n.as_f64() {
                out.insert(prefix.to_string(), v);
            }
        }
        Value::Bool(b) => {
            out.insert(prefix.to_string(), if *b { 1.0 } else { 0.0 });
        }
        _ => {}
    }
}

/// The three combination terms of the aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub product: f32,
    pub average: f32,
    pub situation_value: f32,
    pub raw_score: f32,
    pub final_score: f32,
}

pub fn aggregate(threat: f32, exploitation: f32, feasibility: f32, cfg: &AggregateConfig) -> Aggregate {
    let product = threat * exploitation;
    let average = (threat + exploitation) / 2.0;
    let situation_value = cfg.product_weight * product + cfg.average_weight * average;
    let raw_score = situation_value * (cfg.feasibility_floor + (1.0 - cfg.feasibility_floor) * feasibility);
    let squashed = logistic(cfg.sharpness * (raw_score - cfg.decision_boundary));

    Aggregate { product, average, situation_value, raw_score, final_score: finite_or(squashed, 0.0).clamp(0.0, 1.0) }
}

/// Everything one scoring call reads.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub lq: &'a LeakageQuadrant,
    pub goal: Goal,
    pub attackers: &'a [&'a EntityState],
    pub defenders: &'a [&'a EntityState],
    pub carrier: Option<&'a EntityState>,
    pub direction: Option<AttackDirection>,
}

/// Scoring pipeline bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct LeakageEngine {
    config: EngineConfig,
}

impl LeakageEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Goal attacked in `direction` under this engine's pitch.
    pub fn goal_for(&self, direction: AttackDirection) -> Goal {
        Goal::attacked(&self.config.pitch, direction)
    }

    pub fn score(&self, input: &ScoringInput<'_>) -> LeakageScore {
        let cfg = &self.config;

        let threat = calculate_threat_potential(
            input.lq,
            &input.goal,
            input.defenders,
            input.attackers,
            input.carrier,
            input.direction,
            &cfg.team_control,
            &cfg.threat,
        );
        let exploitation = calculate_exploitation(
            input.lq,
            input.defenders,
            input.attackers,
            input.carrier,
            &cfg.team_control,
            &cfg.exploitation,
        );
        let feasibility =
            calculate_feasibility(input.lq, input.carrier, input.defenders, &cfg.team_control, &cfg.feasibility);

        let agg = aggregate(threat.score, exploitation.score, feasibility.score, &cfg.aggregate);
        if !agg.raw_score.is_finite() {
            warn!("non-finite raw leakage score coerced to 0 (lq center {:?})", input.lq.center());
        }

        trace!(
            threat = threat.score,
            exploitation = exploitation.score,
            feasibility = feasibility.score,
            final_score = agg.final_score,
            "leakage score computed"
        );

        LeakageScore {
            final_score: agg.final_score,
            threat_score: threat.score,
            exploitation_score: exploitation.score,
            feasibility_score: feasibility.score,
            product: agg.product,
            average: agg.average,
            situation_value: agg.situation_value,
            raw_score: finite_or(agg.raw_score, 0.0),
            threat,
            exploitation,
            feasibility,
        }
    }
}
