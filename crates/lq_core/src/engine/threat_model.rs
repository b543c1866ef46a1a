//! Threat Potential - how dangerous a leakage quadrant is if the ball gets there
//!
//! ```text
//! proximity  = logistic(-k_p * (d_goal - 30))
//! strategic  = 0.95 * logistic(-k_s * (d_goal - 20))   only when the zone is
//!              behind the last defender and attackers win the race
//! combined   = max(proximity, strategic)
//! angle      = exp(-1.2 * angle(LQ→goal, forward))
//! amplifier  = 1 + 0.4 * logistic(0.04 * (area - 75))
//! potential  = clamp((0.7 * combined + 0.3 * angle) * amplifier, 0, 1)
//! ```
//!
//! The race compares defenders on the direct model (floor 1.0) against
//! attackers on the intercept model (floor 4.0); that asymmetry is kept as tuned.

use super::config::{TeamControlConfig, ThreatConfig};
use super::geometry::{finite_or, logistic};
use super::goal::Goal;
use super::quadrant::LeakageQuadrant;
use super::team_control::TeamControl;
use crate::models::{AttackDirection, EntityState};
use nalgebra::Vector2;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Every intermediate of the threat computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ThreatBreakdown {
    pub distance_to_goal: f32,
    pub proximity_threat: f32,
    /// x of the deepest non-goalkeeper defender, if any
    pub last_defender_x: Option<f32>,
    pub behind_last_defender: bool,
    pub defender_fastest_tta: f32,
    pub attacker_fastest_tta: f32,
    pub strategic_bonus: f32,
    pub combined_proximity: f32,
    /// Radians between LQ→goal and the forward axis
    pub angle_to_forward: f32,
    pub angle_factor: f32,
    pub area: f32,
    pub area_amplifier: f32,
    pub score: f32,
}

/// Deepest outfield defender along the attacking direction.
pub fn last_defender<'a>(defenders: &[&'a EntityState], direction: AttackDirection) -> Option<&'a EntityState> {
    let sign = direction.sign();
    defenders
        .iter()
        .copied()
        .filter(|d| d.role.is_outfield())
        .fold(None::<&EntityState>, |best, d| match best {
            Some(b) if b.position.x * sign >= d.position.x * sign => Some(b),
            _ => Some(d),
        })
}

/// Threat potential of `lq`.
///
/// `carrier` is excluded from `attackers` before the arrival race.
pub fn calculate_threat_potential(
    lq: &LeakageQuadrant,
    goal: &Goal,
    defenders: &[&EntityState],
    attackers: &[&EntityState],
    carrier: Option<&EntityState>,
    direction: Option<AttackDirection>,
    tc_cfg: &TeamControlConfig,
    cfg: &ThreatConfig,
) -> ThreatBreakdown {
    let center = lq.center();
    let distance_to_goal = goal.distance_from(&center);

    let proximity_threat = logistic(-cfg.proximity_steepness * (distance_to_goal - cfg.proximity_midpoint));

    let mut breakdown = ThreatBreakdown {
        distance_to_goal,
        proximity_threat,
        defender_fastest_tta: tc_cfg.unreachable_tta,
        attacker_fastest_tta: tc_cfg.unreachable_tta,
        area: lq.area(),
        ..Default::default()
    };

    // Strategic bonus: zone behind the last defender that attackers reach first
    let receivers: Vec<&EntityState> = attackers
        .iter()
        .copied()
        .filter(|a| carrier.map_or(true, |c| c.id != a.id))
        .collect();

    if let Some(dir) = direction {
        if !defenders.is_empty() && !receivers.is_empty() {
            if let Some(last) = last_defender(defenders, dir) {
                breakdown.last_defender_x = Some(last.position.x);
                breakdown.behind_last_defender = center.x * dir.sign() > last.position.x * dir.sign();

                let tc = TeamControl::new(tc_cfg);
                breakdown.defender_fastest_tta = tc.defenders(&center, defenders).fastest;
                breakdown.attacker_fastest_tta = tc.attackers(&center, &receivers, carrier).fastest;

                if breakdown.behind_last_defender && breakdown.defender_fastest_tta > breakdown.attacker_fastest_tta {
                    breakdown.strategic_bonus = cfg.strategic_weight
                        * logistic(-cfg.strategic_steepness * (distance_to_goal - cfg.strategic_midpoint));
                }
            }
        }
    }

    breakdown.combined_proximity = breakdown.proximity_threat.max(breakdown.strategic_bonus);

    // Off-centre penalty
    let forward = match direction {
        Some(dir) => dir.forward(),
        None => Vector2::new(if goal.center.x < 0.0 { -1.0 } else { 1.0 }, 0.0),
    };
    let to_goal = goal.center - center;
    let to_goal_len = to_goal.norm();
    breakdown.angle_to_forward = if to_goal_len > 1e-6 {
        (to_goal.dot(&forward) / to_goal_len).clamp(-1.0, 1.0).acos()
    } else {
        0.0
    };
    breakdown.angle_factor = (-cfg.angle_decay * breakdown.angle_to_forward).exp();

    breakdown.area_amplifier =
        1.0 + cfg.area_max_bonus * logistic(cfg.area_steepness * (breakdown.area - cfg.area_midpoint));

    let potential = (cfg.proximity_weight * breakdown.combined_proximity + cfg.angle_weight * breakdown.angle_factor)
        * breakdown.area_amplifier;
    breakdown.score = finite_or(potential, 0.0).clamp(0.0, 1.0);

    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::PitchConfig;
    use crate::models::Role;

    fn player(id: &str, team: &str, role: &str, x: f32, z: f32, speed_x: f32) -> EntityState {
        EntityState::new(id, team, Role::from(role), Vector2::new(x, z)).with_velocity(Vector2::new(speed_x, 0.0))
    }

    fn goal() -> Goal {
        Goal::attacked(&PitchConfig::default(), AttackDirection::Positive)
    }

    fn threat(lq: &LeakageQuadrant, defs: &[&EntityState], atts: &[&EntityState]) -> ThreatBreakdown {
        calculate_threat_potential(
            lq,
            &goal(),
            defs,
            atts,
            None,
            Some(AttackDirection::Positive),
            &TeamControlConfig::default(),
            &ThreatConfig::default(),
        )
    }

    #[test]
    fn test_threat_monotone_in_goal_distance() {
        // LQ centres at goal distances 50, 30, 10 on the central axis
        let scores: Vec<f32> = [2.5f32, 22.5, 42.5]
            .iter()
            .map(|x| threat(&LeakageQuadrant::from_center(Vector2::new(*x, 0.0), 10.0, 10.0), &[], &[]).score)
            .collect();
        assert!(scores[0] <= scores[1] && scores[1] <= scores[2], "{:?}", scores);
        assert!(scores[2] > scores[0]);
    }

    #[test]
    fn test_no_players_no_strategic_bonus() {
        let lq = LeakageQuadrant::from_center(Vector2::new(40.0, 0.0), 10.0, 10.0);
        let b = threat(&lq, &[], &[]);
        assert_eq!(b.strategic_bonus, 0.0);
        assert!(b.last_defender_x.is_none());
        assert!(b.score > 0.0 && b.score <= 1.0);
    }

    #[test]
    fn test_strategic_bonus_behind_line() {
        // Slow defender at x=30, fast attacker close to a zone at x=40
        let def = player("d", "Away", "CB", 30.0, 10.0, 0.0);
        let gk = player("gk", "Away", "GK", 50.0, 0.0, 0.0);
        let att = player("a", "Home", "ST", 38.0, 0.0, 8.0);
        let lq = LeakageQuadrant::from_center(Vector2::new(40.0, 0.0), 10.0, 10.0);

        let b = threat(&lq, &[&def, &gk], &[&att]);
        // Goalkeeper is ignored for the line
        assert_eq!(b.last_defender_x, Some(30.0));
        assert!(b.behind_last_defender);
        assert!(b.defender_fastest_tta > b.attacker_fastest_tta);
        assert!(b.strategic_bonus > 0.0);
        assert!(b.combined_proximity >= b.proximity_threat);
    }

    #[test]
    fn test_zone_in_front_of_line_gets_no_bonus() {
        let def = player("d", "Away", "CB", 45.0, 0.0, 0.0);
        let att = player("a", "Home", "ST", 38.0, 0.0, 8.0);
        let lq = LeakageQuadrant::from_center(Vector2::new(40.0, 0.0), 10.0, 10.0);
        let b = threat(&lq, &[&def], &[&att]);
        assert!(!b.behind_last_defender);
        assert_eq!(b.strategic_bonus, 0.0);
    }

    #[test]
    fn test_angle_penalizes_wide_zones() {
        let central = threat(&LeakageQuadrant::from_center(Vector2::new(35.0, 0.0), 10.0, 10.0), &[], &[]);
        let wide = threat(&LeakageQuadrant::from_center(Vector2::new(35.0, 25.0), 10.0, 10.0), &[], &[]);
        assert!(central.angle_factor > wide.angle_factor);
        assert!((central.angle_factor - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_area_amplifier_grows_with_area() {
        let small = threat(&LeakageQuadrant::from_center(Vector2::new(30.0, 0.0), 4.0, 4.0), &[], &[]);
        let large = threat(&LeakageQuadrant::from_center(Vector2::new(30.0, 0.0), 20.0, 20.0), &[], &[]);
        assert!(large.area_amplifier > small.area_amplifier);
        assert!(large.area_amplifier <= 1.4);
    }

    #[test]
    fn test_negative_direction() {
        let pitch = PitchConfig::default();
        let g = Goal::attacked(&pitch, AttackDirection::Negative);
        let lq = LeakageQuadrant::from_center(Vector2::new(-40.0, 0.0), 10.0, 10.0);
        let b = calculate_threat_potential(
            &lq,
            &g,
            &[],
            &[],
            None,
            Some(AttackDirection::Negative),
            &TeamControlConfig::default(),
            &ThreatConfig::default(),
        );
        assert!(b.angle_to_forward.abs() < 1e-5);
        assert!((b.distance_to_goal - 12.5).abs() < 1e-4);
    }
}
