//! # Team Shape Metrics Module
//!
//! Geometric properties of a team snapshot on the ground plane
//! (`x` along the pitch length, `z` lateral). Nothing here depends on a
//! leakage quadrant; these are the context features of a frame.

use crate::engine::config::PitchConfig;
use crate::engine::geometry::{convex_hull, polygon_area};
use crate::engine::goal::Goal;
use crate::models::{AttackDirection, EntityState, Role};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Players taken as the defensive line.
pub const DEFENSIVE_LINE_SIZE: usize = 4;

/// Team shape computed from a snapshot of player positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamShape {
    /// Mean position `(x, z)`
    pub centroid: Vector2<f32>,
    /// Lateral spread (max z - min z)
    pub width: f32,
    /// Lengthwise spread (max x - min x)
    pub depth: f32,
    /// Area of the convex hull, 0 below three players
    pub convex_hull_area: f32,
}

impl TeamShape {
    pub fn empty() -> Self {
        Self { centroid: Vector2::zeros(), width: 0.0, depth: 0.0, convex_hull_area: 0.0 }
    }

    /// Shape of `players`. Fewer than two players give a zero-sized shape.
    pub fn from_players(players: &[&EntityState]) -> Self {
        if players.is_empty() {
            return Self::empty();
        }

        let positions: Vec<Vector2<f32>> = players.iter().map(|p| p.position).collect();
        let centroid = mean_position(&positions);
        if positions.len() < 2 {
            return Self { centroid, ..Self::empty() };
        }

        let (min_x, max_x) = min_max(positions.iter().map(|p| p.x));
        let (min_z, max_z) = min_max(positions.iter().map(|p| p.y));

        let convex_hull_area = if positions.len() > 2 {
            polygon_area(&convex_hull(&positions))
        } else {
            0.0
        };

        Self { centroid, width: max_z - min_z, depth: max_x - min_x, convex_hull_area }
    }
}

fn mean_position(positions: &[Vector2<f32>]) -> Vector2<f32> {
    if positions.is_empty() {
        return Vector2::zeros();
    }
    positions.iter().fold(Vector2::zeros(), |acc, p| acc + p) / positions.len() as f32
}

fn min_max(values: impl Iterator<Item = f32>) -> (f32, f32) {
    values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Mean `x` of the players whose role matches, if any.
pub fn line_depth(players: &[&EntityState], in_line: impl Fn(&Role) -> bool) -> Option<f32> {
    let xs: Vec<f32> = players.iter().filter(|p| in_line(&p.role)).map(|p| p.position.x).collect();
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<f32>() / xs.len() as f32)
    }
}

/// The outfield defenders closest to their own goal, at most four.
pub fn defensive_line<'a>(defenders: &[&'a EntityState], own_goal: &Goal) -> Vec<&'a EntityState> {
    let mut outfield: Vec<&'a EntityState> = defenders.iter().copied().filter(|d| d.role.is_outfield()).collect();
    // Stable sort keeps input order among equidistant defenders
    outfield.sort_by(|a, b| own_goal.distance_from(&a.position).total_cmp(&own_goal.distance_from(&b.position)));
    outfield.truncate(DEFENSIVE_LINE_SIZE);
    outfield
}

/// Mean `x` of the defensive line, 0 when there are no outfield defenders.
pub fn defensive_line_depth(defenders: &[&EntityState], own_goal: &Goal) -> f32 {
    let line = defensive_line(defenders, own_goal);
    if line.is_empty() {
        return 0.0;
    }
    line.iter().map(|d| d.position.x).sum::<f32>() / line.len() as f32
}

/// Standard deviation of every outfield defender's distance from the ideal
/// line centre `(line depth, mean z of the line)`.
///
/// Fewer than two outfield defenders give 0.
pub fn formation_disruption_index(defenders: &[&EntityState], own_goal: &Goal) -> f32 {
    let outfield: Vec<&EntityState> = defenders.iter().copied().filter(|d| d.role.is_outfield()).collect();
    if outfield.len() < 2 {
        return 0.0;
    }

    let line = defensive_line(&outfield, own_goal);
    let line_positions: Vec<Vector2<f32>> = line.iter().map(|d| d.position).collect();
    let ideal = mean_position(&line_positions);

    let distances: Vec<f32> = outfield.iter().map(|d| d.distance_to(&ideal)).collect();
    let n = distances.len() as f32;
    let mean = distances.iter().sum::<f32>() / n;
    let variance = distances.iter().map(|d| (d - mean).powi(2)).sum::<f32>() / n;
    variance.sqrt()
}

/// Context features of one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextFeatures {
    pub attack: TeamShape,
    pub defend: TeamShape,
    pub defensive_line_depth: f32,
    pub formation_disruption_index: f32,
}

impl ContextFeatures {
    /// `direction` is the attacking team's; defenders protect the goal it attacks.
    pub fn compute(
        attackers: &[&EntityState],
        defenders: &[&EntityState],
        direction: AttackDirection,
        pitch: &PitchConfig,
    ) -> Self {
        let own_goal = Goal::attacked(pitch, direction);
        Self {
            attack: TeamShape::from_players(attackers),
            defend: TeamShape::from_players(defenders),
            defensive_line_depth: defensive_line_depth(defenders, &own_goal),
            formation_disruption_index: formation_disruption_index(defenders, &own_goal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(id: &str, role: &str, x: f32, z: f32) -> EntityState {
        EntityState::new(id, "Away", Role::from(role), Vector2::new(x, z))
    }

    fn own_goal() -> Goal {
        Goal::attacked(&PitchConfig::default(), AttackDirection::Positive)
    }

    #[test]
    fn test_team_shape_basic() {
        let players = [
            at("gk", "GK", -42.5, 0.0),
            at("lb", "LB", -27.5, -24.0),
            at("cb1", "CB", -27.5, -9.0),
            at("cb2", "CB", -27.5, 9.0),
            at("rb", "RB", -27.5, 24.0),
            at("lm", "LM", -12.5, -14.0),
            at("cm", "CM", -12.5, 0.0),
            at("rm", "RM", -12.5, 14.0),
            at("lw", "LW", 2.5, -9.0),
            at("st", "ST", 2.5, 0.0),
            at("rw", "RW", 2.5, 9.0),
        ];
        let refs: Vec<&EntityState> = players.iter().collect();
        let shape = TeamShape::from_players(&refs);

        assert!((shape.width - 48.0).abs() < 1e-4);
        assert!((shape.depth - 45.0).abs() < 1e-4);
        assert!(shape.centroid.x > -25.0 && shape.centroid.x < -10.0);
        assert!(shape.centroid.y.abs() < 1e-4);
        assert!(shape.convex_hull_area > 0.0);
        assert!(shape.convex_hull_area <= shape.width * shape.depth);
    }

    #[test]
    fn test_degenerate_shapes_are_zero() {
        let empty = TeamShape::from_players(&[]);
        assert_eq!(empty, TeamShape::empty());

        let solo = at("a", "CM", 10.0, 5.0);
        let shape = TeamShape::from_players(&[&solo]);
        assert_eq!(shape.width, 0.0);
        assert_eq!(shape.depth, 0.0);
        assert_eq!(shape.centroid, Vector2::new(10.0, 5.0));

        let other = at("b", "CM", 20.0, 5.0);
        let pair = TeamShape::from_players(&[&solo, &other]);
        assert_eq!(pair.convex_hull_area, 0.0);
        assert!((pair.depth - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_defensive_line_picks_deepest_four() {
        let players = [
            at("gk", "GK", 50.0, 0.0),
            at("lb", "LB", 45.0, -15.0),
            at("cb1", "CB", 46.0, -5.0),
            at("cb2", "CB", 46.0, 5.0),
            at("rb", "RB", 45.0, 15.0),
            at("cm1", "CM", 30.0, -10.0),
            at("cm2", "CM", 30.0, 10.0),
        ];
        let refs: Vec<&EntityState> = players.iter().collect();

        let line = defensive_line(&refs, &own_goal());
        let ids: Vec<&str> = line.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["cb1", "cb2", "lb", "rb"]);
        assert!((defensive_line_depth(&refs, &own_goal()) - 45.5).abs() < 1e-5);
    }

    #[test]
    fn test_defensive_line_negative_direction() {
        let deep = at("d1", "CB", -45.0, 0.0);
        let high = at("d2", "CB", 10.0, 0.0);
        let goal = Goal::attacked(&PitchConfig::default(), AttackDirection::Negative);
        let line = defensive_line(&[&high, &deep], &goal);
        assert_eq!(line[0].id, "d1");
    }

    #[test]
    fn test_formation_disruption() {
        // Two defenders symmetric about the ideal centre: no disruption
        let l = at("l", "CB", 45.0, -10.0);
        let r = at("r", "CB", 45.0, 10.0);
        assert!(formation_disruption_index(&[&l, &r], &own_goal()).abs() < 1e-6);

        // A single defender is degenerate
        assert_eq!(formation_disruption_index(&[&l], &own_goal()), 0.0);

        // A midfielder far from the line spreads the distances
        let m = at("m", "CM", 20.0, 0.0);
        let b = at("b", "CB", 44.0, 0.0);
        let extra = at("x", "CB", 46.0, 0.0);
        let fdi = formation_disruption_index(&[&l, &r, &b, &extra, &m], &own_goal());
        assert!(fdi > 1.0, "{}", fdi);
    }

    #[test]
    fn test_goalkeeper_excluded_from_line() {
        let gk = at("gk", "GK", 52.0, 0.0);
        let cb = at("cb", "CB", 40.0, 0.0);
        assert!((defensive_line_depth(&[&gk, &cb], &own_goal()) - 40.0).abs() < 1e-6);
        assert_eq!(defensive_line_depth(&[&gk], &own_goal()), 0.0);
    }

    #[test]
    fn test_line_depth_by_role() {
        let cb = at("cb", "CB", 40.0, 0.0);
        let cm = at("cm", "CM", 20.0, 0.0);
        let players = [&cb, &cm];
        assert_eq!(line_depth(&players, Role::is_back_line), Some(40.0));
        assert_eq!(line_depth(&players, Role::is_forward), None);
    }

    #[test]
    fn test_context_features() {
        let a = at("a", "ST", 10.0, 0.0);
        let d1 = at("d1", "CB", 40.0, -5.0);
        let d2 = at("d2", "CB", 40.0, 5.0);
        let ctx = ContextFeatures::compute(&[&a], &[&d1, &d2], AttackDirection::Positive, &PitchConfig::default());
        assert_eq!(ctx.attack.width, 0.0);
        assert!((ctx.defend.width - 10.0).abs() < 1e-6);
        assert!((ctx.defensive_line_depth - 40.0).abs() < 1e-6);
    }
}
