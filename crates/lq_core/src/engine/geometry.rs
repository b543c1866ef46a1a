//! Ground-plane geometry helpers
//!
//! All functions work on the `(x, z)` ground projection and are pure.

use crate::models::EntityState;
use nalgebra::Vector2;

/// Areas below this are treated as degenerate.
const DEGENERATE_EPS: f32 = 1e-9;

/// Standard logistic `1 / (1 + e^-x)`.
#[inline]
pub fn logistic(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Replace NaN/±inf with `fallback`.
#[inline]
pub fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// 2D cross product `a × b`.
#[inline]
fn cross(a: &Vector2<f32>, b: &Vector2<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Closest entity to `target` by linear scan.
///
/// Ties keep the first entity encountered. Returns `(None, f32::INFINITY)`
/// for an empty iterator.
pub fn closest_entity<'a, I>(target: &Vector2<f32>, entities: I) -> (Option<&'a EntityState>, f32)
where
    I: IntoIterator<Item = &'a EntityState>,
{
    let mut best: Option<&'a EntityState> = None;
    let mut best_dist = f32::INFINITY;

    for entity in entities {
        let dist = entity.distance_to(target);
        if dist < best_dist {
            best = Some(entity);
            best_dist = dist;
        }
    }

    (best, best_dist)
}

/// Whether `p` lies strictly inside triangle `abc` (either winding).
///
/// Points on an edge and every point of a zero-area triangle are outside.
pub fn point_in_triangle(p: &Vector2<f32>, a: &Vector2<f32>, b: &Vector2<f32>, c: &Vector2<f32>) -> bool {
    let area2 = cross(&(b - a), &(c - a));
    if area2.abs() < DEGENERATE_EPS {
        return false;
    }

    let d1 = cross(&(b - a), &(p - a));
    let d2 = cross(&(c - b), &(p - b));
    let d3 = cross(&(a - c), &(p - c));

    (d1 > 0.0 && d2 > 0.0 && d3 > 0.0) || (d1 < 0.0 && d2 < 0.0 && d3 < 0.0)
}

/// Shoelace area of a simple polygon (absolute value). Fewer than 3 points ⇒ 0.
pub fn polygon_area(corners: &[Vector2<f32>]) -> f32 {
    if corners.len() < 3 {
        return 0.0;
    }

    let twice: f32 = corners
        .iter()
        .zip(corners.iter().cycle().skip(1))
        .map(|(p, q)| cross(p, q))
        .sum();

    (twice * 0.5).abs()
}

/// Convex hull by Andrew's monotone chain, counter-clockwise, no collinear points.
pub fn convex_hull(points: &[Vector2<f32>]) -> Vec<Vector2<f32>> {
    let mut pts: Vec<Vector2<f32>> = points.iter().copied().filter(|p| p.x.is_finite() && p.y.is_finite()).collect();
    if pts.len() < 3 {
        return pts;
    }
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();

    let mut hull: Vec<Vector2<f32>> = Vec::with_capacity(pts.len() * 2);

    // Lower hull
    for p in &pts {
        while hull.len() >= 2 && cross(&(hull[hull.len() - 1] - hull[hull.len() - 2]), &(p - hull[hull.len() - 2])) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }

    // Upper hull
    let lower_len = hull.len() + 1;
    for p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(&(hull[hull.len() - 1] - hull[hull.len() - 2]), &(p - hull[hull.len() - 2])) <= 0.0
        {
            hull.pop();
        }
        hull.push(*p);
    }

    hull.pop();
    hull
}

/// Widest visual cone from an origin through a quadrilateral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassingCone {
    pub apex: Vector2<f32>,
    /// The two corners spanning the cone, sorted by `z` ascending
    pub corners: [Vector2<f32>; 2],
    /// Angle subtended at the apex, radians
    pub angle: f32,
}

impl PassingCone {
    pub fn contains(&self, p: &Vector2<f32>) -> bool {
        point_in_triangle(p, &self.apex, &self.corners[0], &self.corners[1])
    }
}

/// Pick the corner pair subtending the widest angle at `origin`.
///
/// Corners coinciding with the origin are skipped; `None` when no valid pair remains.
pub fn passing_cone(origin: &Vector2<f32>, quad_corners: &[Vector2<f32>; 4]) -> Option<PassingCone> {
    let mut best: Option<PassingCone> = None;

    for i in 0..quad_corners.len() {
        for j in (i + 1)..quad_corners.len() {
            let v1 = quad_corners[i] - origin;
            let v2 = quad_corners[j] - origin;
            if v1.norm() < DEGENERATE_EPS || v2.norm() < DEGENERATE_EPS {
                continue;
            }

            let angle = cross(&v1, &v2).atan2(v1.dot(&v2)).abs();
            if !angle.is_finite() {
                continue;
            }

            if best.map_or(true, |cone| angle > cone.angle) {
                let (a, b) = (quad_corners[i], quad_corners[j]);
                let corners = if a.y <= b.y { [a, b] } else { [b, a] };
                best = Some(PassingCone { apex: *origin, corners, angle });
            }
        }
    }

    best
}
