//! Team Control Model
//!
//! Time-to-arrival (TTA) of a group of players to a target point, in two flavours:
//!
//! - **Direct arrival** (defenders covering space):
//!   `tta = distance / max(speed, min_speed)`
//! - **Intercept** (attackers receiving a pass from the carrier):
//!   ```text
//!   ball_time  = |carrier - target| / avg_pass_speed
//!   projected  = position + velocity * ball_time
//!   intercept  = (target + projected) / 2
//!   run_time   = |position - intercept| / max(speed, attacker_min_speed)
//!   tta        = max(ball_time, run_time)
//!   ```
//!
//! An empty group reports the finite `unreachable_tta` sentinel (99) so that
//! downstream `exp(-k * tta)` terms stay well behaved.

use super::config::TeamControlConfig;
use super::geometry::finite_or;
use crate::models::EntityState;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Arrival times of a group to one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalEstimate {
    /// Minimum TTA across the group, or the sentinel if empty
    pub fastest: f32,
    /// Per-player TTA in input order
    pub ttas: Vec<f32>,
}

impl ArrivalEstimate {
    fn from_ttas(ttas: Vec<f32>, sentinel: f32) -> Self {
        let fastest = ttas.iter().copied().fold(sentinel, f32::min);
        Self { fastest, ttas }
    }

    pub fn is_empty(&self) -> bool {
        self.ttas.is_empty()
    }

    /// `Σ exp(-decay * tta)` over the group.
    pub fn aggregate(&self, decay: f32) -> f32 {
        self.ttas.iter().map(|tta| (-decay * tta).exp()).sum()
    }
}

/// Direct-arrival TTA for every entity.
pub fn direct_arrival(
    target: &Vector2<f32>,
    entities: &[&EntityState],
    min_speed: f32,
    sentinel: f32,
) -> ArrivalEstimate {
    let ttas = entities
        .iter()
        .map(|e| {
            let tta = e.distance_to(target) / e.speed.max(min_speed);
            finite_or(tta, sentinel)
        })
        .collect();

    ArrivalEstimate::from_ttas(ttas, sentinel)
}

/// Intercept TTA for every entity receiving a pass played from `carrier_pos`.
pub fn intercept_arrival(
    target: &Vector2<f32>,
    entities: &[&EntityState],
    carrier_pos: &Vector2<f32>,
    cfg: &TeamControlConfig,
) -> ArrivalEstimate {
    let ball_time = finite_or((carrier_pos - target).norm() / cfg.avg_pass_speed, cfg.unreachable_tta);

    let ttas = entities
        .iter()
        .map(|e| {
            let projected = e.position + e.velocity * ball_time;
            let intercept = (target + projected) / 2.0;
            let run_time = e.distance_to(&intercept) / e.speed.max(cfg.attacker_min_speed);
            finite_or(ball_time.max(run_time), cfg.unreachable_tta)
        })
        .collect();

    ArrivalEstimate::from_ttas(ttas, cfg.unreachable_tta)
}

/// Chooses the defender/attacker model from configuration.
#[derive(Debug, Clone, Copy)]
pub struct TeamControl<'a> {
    cfg: &'a TeamControlConfig,
}

impl<'a> TeamControl<'a> {
    pub fn new(cfg: &'a TeamControlConfig) -> Self {
        Self { cfg }
    }

    /// Defenders recovering toward a space.
    pub fn defenders(&self, target: &Vector2<f32>, defenders: &[&EntityState]) -> ArrivalEstimate {
        direct_arrival(target, defenders, self.cfg.defender_min_speed, self.cfg.unreachable_tta)
    }

    /// Attackers receiving a pass; without a carrier they run at the attacker speed floor.
    pub fn attackers(
        &self,
        target: &Vector2<f32>,
        attackers: &[&EntityState],
        carrier: Option<&EntityState>,
    ) -> ArrivalEstimate {
        match carrier {
            Some(carrier) => intercept_arrival(target, attackers, &carrier.position, self.cfg),
            None => direct_arrival(target, attackers, self.cfg.attacker_min_speed, self.cfg.unreachable_tta),
        }
    }
}
