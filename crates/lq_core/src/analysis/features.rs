//! # Feature Extraction
//!
//! Flat numerical feature map for one labelled moment, used only for
//! dataset export. Three groups:
//!
//! - **A** global shape: centroids, width/depth, defensive line, disruption
//! - **B** tactical: line spacing, runners, packing, players ahead of the
//!   carrier, counter-attack detection, hull areas
//! - **C** raw leakage-quadrant inputs (`h_*`), only when a quadrant is given
//!
//! Goalkeepers are excluded from both teams. Extraction either returns the
//! whole map or a [`FeatureError`]; partial maps are never produced.

use super::metrics::shape::{line_depth, ContextFeatures};
use crate::engine::config::EngineConfig;
use crate::engine::geometry::{closest_entity, passing_cone};
use crate::engine::goal::Goal;
use crate::engine::quadrant::LeakageQuadrant;
use crate::engine::team_control::direct_arrival;
use crate::error::FeatureError;
use crate::models::{AttackDirection, EntityState, Role};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Named features, ordered by key.
pub type FeatureMap = BTreeMap<String, f64>;

/// Sentinel for line distances when a line has no players.
pub const MISSING_LINE_DISTANCE: f64 = -1.0;

/// Fixed value of `pitch_control_ratio_in_front`; no pitch control model backs it.
pub const PITCH_CONTROL_UNAVAILABLE: f64 = -1.0;

const DIRECTION_EPS: f32 = 1e-8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMetadata {
    pub attacking_team: String,
    pub defending_team: String,
    pub attacking_direction: AttackDirection,
    #[serde(default)]
    pub carrier_id: Option<String>,
}

/// Everything the extractor sees: a roster snapshot plus context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRequest {
    pub players: Vec<EntityState>,
    pub metadata: FeatureMetadata,
    #[serde(default)]
    pub lq: Option<LeakageQuadrant>,
}

/// Feature-extraction boundary.
///
/// Implementations may be remote; the scoring engine never calls one.
pub trait FeatureService {
    fn extract(&self, request: &FeatureRequest) -> Result<FeatureMap, FeatureError>;
}

/// In-process extractor.
#[derive(Debug, Clone, Default)]
pub struct LocalFeatureService {
    config: EngineConfig,
}

impl LocalFeatureService {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl FeatureService for LocalFeatureService {
    fn extract(&self, request: &FeatureRequest) -> Result<FeatureMap, FeatureError> {
        extract_features(request, &self.config)
    }
}

/// Split the roster into its parts.
struct Roster<'a> {
    attackers: Vec<&'a EntityState>,
    defenders: Vec<&'a EntityState>,
    carrier: Option<&'a EntityState>,
    ball: &'a EntityState,
}

impl<'a> Roster<'a> {
    fn from_request(request: &'a FeatureRequest) -> Result<Self, FeatureError> {
        let meta = &request.metadata;
        let team = |name: &str| -> Vec<&'a EntityState> {
            request
                .players
                .iter()
                .filter(|p| p.team == name && !p.is_ball() && p.role.is_outfield())
                .collect()
        };

        let attackers = team(&meta.attacking_team);
        let defenders = team(&meta.defending_team);
        let ball = request.players.iter().find(|p| p.is_ball());
        let carrier = meta
            .carrier_id
            .as_deref()
            .and_then(|id| request.players.iter().find(|p| p.id == id));

        if attackers.is_empty() {
            return Err(FeatureError::MissingData(format!("no attackers for team '{}'", meta.attacking_team)));
        }
        if defenders.is_empty() {
            return Err(FeatureError::MissingData(format!("no defenders for team '{}'", meta.defending_team)));
        }
        let ball = ball.ok_or_else(|| FeatureError::MissingData("no ball".to_string()))?;

        Ok(Self { attackers, defenders, carrier, ball })
    }
}

fn put(features: &mut FeatureMap, key: &str, value: f32) {
    features.insert(key.to_string(), value as f64);
}

fn forward_speed(entity: &EntityState, forward: &Vector2<f32>) -> f32 {
    entity.velocity.dot(forward)
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}

/// Extract the full feature map for `request`.
pub fn extract_features(request: &FeatureRequest, config: &EngineConfig) -> Result<FeatureMap, FeatureError> {
    let roster = Roster::from_request(request)?;
    let direction = request.metadata.attacking_direction;

    let mut features = FeatureMap::new();
    group_a(&mut features, &roster, direction, config);
    group_b(&mut features, &roster, direction, config);

    if let Some(lq) = &request.lq {
        let carrier = roster.carrier.ok_or_else(|| {
            FeatureError::CarrierNotFound(request.metadata.carrier_id.clone().unwrap_or_else(|| "<none>".to_string()))
        })?;
        group_c(&mut features, lq, &roster, carrier, direction, config);
    }

    debug!(count = features.len(), with_lq = request.lq.is_some(), "extracted features");
    Ok(features)
}

fn group_a(features: &mut FeatureMap, roster: &Roster<'_>, direction: AttackDirection, config: &EngineConfig) {
    let ctx = ContextFeatures::compute(&roster.attackers, &roster.defenders, direction, &config.pitch);

    put(features, "attack_centroid_x", ctx.attack.centroid.x);
    put(features, "attack_centroid_z", ctx.attack.centroid.y);
    put(features, "defend_centroid_x", ctx.defend.centroid.x);
    put(features, "defend_centroid_z", ctx.defend.centroid.y);
    put(features, "attack_depth", ctx.attack.depth);
    put(features, "attack_width", ctx.attack.width);
    put(features, "defend_depth", ctx.defend.depth);
    put(features, "defend_width", ctx.defend.width);
    put(features, "defensive_line_depth", ctx.defensive_line_depth);
    put(features, "formation_disruption_index", ctx.formation_disruption_index);
    put(features, "attack_convex_hull_area", ctx.attack.convex_hull_area);
    put(features, "defend_convex_hull_area", ctx.defend.convex_hull_area);
    features.insert("pitch_control_ratio_in_front".into(), PITCH_CONTROL_UNAVAILABLE);
}

fn group_b(features: &mut FeatureMap, roster: &Roster<'_>, direction: AttackDirection, config: &EngineConfig) {
    let cfg = &config.features;
    let sign = direction.sign();
    let forward = direction.forward();

    // Line spacing
    let def_line = line_depth(&roster.defenders, Role::is_back_line);
    let mid_line = line_depth(&roster.defenders, Role::is_midfield);
    let att_line = line_depth(&roster.attackers, Role::is_forward);
    let spacing = |a: Option<f32>, b: Option<f32>| match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() as f64,
        _ => MISSING_LINE_DISTANCE,
    };
    features.insert("def_mid_distance".into(), spacing(def_line, mid_line));
    features.insert("mid_att_distance".into(), spacing(mid_line, att_line));

    // Fastest forward runner other than the carrier
    let runner_speeds: Vec<f32> = roster
        .attackers
        .iter()
        .filter(|a| roster.carrier.map_or(true, |c| c.id != a.id))
        .map(|a| forward_speed(a, &forward))
        .collect();
    let max_runner = runner_speeds.iter().copied().fold(None, |best: Option<f32>, s| Some(best.map_or(s, |b| b.max(s))));
    put(features, "max_forward_runner_speed", max_runner.unwrap_or(0.0));

    // Defenders goal-side of the ball
    let packing = roster.defenders.iter().filter(|d| (d.position.x - roster.ball.position.x) * sign > 0.0).count();
    put(features, "packing_raw", packing as f32);

    // Players ahead of the carrier
    let (attackers_ahead, defenders_ahead): (Vec<&EntityState>, Vec<&EntityState>) = match roster.carrier {
        Some(c) => {
            let ahead = |p: &&EntityState| (p.position.x - c.position.x) * sign > 0.0;
            (
                roster.attackers.iter().copied().filter(ahead).collect(),
                roster.defenders.iter().copied().filter(ahead).collect(),
            )
        }
        None => (Vec::new(), Vec::new()),
    };
    let ppo = attackers_ahead.len() as f32;
    let dto = defenders_ahead.len() as f32;
    let ppo_dto_ratio = (ppo + 0.1) / (dto + 0.1);
    put(features, "ppo_count", ppo);
    put(features, "dto_count", dto);
    put(features, "ppo_dto_ratio", ppo_dto_ratio);

    // Counter-attack: attackers ahead bursting forward while defenders ahead drop toward the ball
    let att_speeds: Vec<f32> = attackers_ahead.iter().map(|a| forward_speed(a, &forward)).collect();
    let def_speeds: Vec<f32> = defenders_ahead.iter().map(|d| forward_speed(d, &forward)).collect();
    let mean_att = mean(&att_speeds);
    let is_counter = !att_speeds.is_empty() && {
        let running = att_speeds.iter().filter(|s| **s > cfg.forward_runner_speed).count() as f32;
        let frac_forward = running / att_speeds.len() as f32;
        mean_att >= cfg.counter_mean_speed
            && frac_forward >= cfg.counter_forward_fraction
            && mean(&def_speeds) <= cfg.counter_defender_retreat
    };
    put(features, "is_counter", if is_counter { 1.0 } else { 0.0 });
    put(features, "counter_score", if is_counter { ppo_dto_ratio * mean_att / 5.0 } else { 0.0 });
}

fn group_c(
    features: &mut FeatureMap,
    lq: &LeakageQuadrant,
    roster: &Roster<'_>,
    carrier: &EntityState,
    direction: AttackDirection,
    config: &EngineConfig,
) {
    let center = lq.center();
    let goal = Goal::attacked(&config.pitch, direction);
    let tc = &config.team_control;

    // Threat inputs
    let to_goal = goal.center - center;
    put(features, "h_lq_dist_to_goal", to_goal.norm());
    put(features, "h_lq_runway", (center.x - goal.center.x).abs());
    put(features, "h_lq_angle_to_goal", to_goal.y.atan2(to_goal.x));
    put(features, "h_lq_area", lq.area());

    let def_line = line_depth(&roster.defenders, Role::is_back_line)
        .or_else(|| line_depth(&roster.defenders, |_| true))
        .unwrap_or(0.0);
    let behind = (center.x - def_line) * direction.sign() > 0.0;
    put(features, "h_is_behind_def_line", if behind { 1.0 } else { 0.0 });

    // Exploitation inputs: both sides on the plain direct model
    let att_tta = direct_arrival(&center, &roster.attackers, tc.defender_min_speed, tc.unreachable_tta).fastest;
    let def_tta = direct_arrival(&center, &roster.defenders, tc.defender_min_speed, tc.unreachable_tta).fastest;
    put(features, "h_att_fastest_tta", att_tta);
    put(features, "h_def_fastest_tta", def_tta);
    put(features, "h_time_advantage", def_tta - att_tta);

    let swarm = |players: &[&EntityState]| players.iter().filter(|p| p.distance_to(&center) < config.features.swarm_radius).count();
    let att_swarm = swarm(roster.attackers.as_slice());
    let def_swarm = swarm(roster.defenders.as_slice());
    put(features, "h_att_swarm_count", att_swarm as f32);
    put(features, "h_def_swarm_count", def_swarm as f32);
    put(features, "h_swarm_advantage", att_swarm as f32 - def_swarm as f32);

    put(features, "h_att_avg_speed_towards_lq", mean_closing_speed(&roster.attackers, &center));
    put(features, "h_def_avg_speed_towards_lq", mean_closing_speed(&roster.defenders, &center));

    // Feasibility inputs
    put(features, "h_pass_dist_to_lq", carrier.distance_to(&center));
    let (_, pressure) = closest_entity(&carrier.position, roster.defenders.iter().copied());
    put(features, "h_pressure_on_carrier_dist", pressure);

    let interceptors = passing_cone(&carrier.position, lq.corners())
        .map(|cone| roster.defenders.iter().filter(|d| cone.contains(&d.position)).count())
        .unwrap_or(0);
    put(features, "h_num_interceptors_in_cone", interceptors as f32);
}

/// Mean speed toward `target` among players closing on it, 0 if none are.
fn mean_closing_speed(players: &[&EntityState], target: &Vector2<f32>) -> f32 {
    let closing: Vec<f32> = players
        .iter()
        .map(|p| {
            let to_target = target - p.position;
            p.velocity.dot(&(to_target / (to_target.norm() + DIRECTION_EPS)))
        })
        .filter(|s| *s > 0.0)
        .collect();
    mean(&closing)
}
