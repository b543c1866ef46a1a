//! Leakage quadrant geometry

use super::geometry::polygon_area;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// A coach-designated zone of space, described by four ordered corners.
///
/// Centre and area are derived on construction and cannot drift from the corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "QuadrantCorners", into = "QuadrantCorners")]
pub struct LeakageQuadrant {
    corners: [Vector2<f32>; 4],
    center: Vector2<f32>,
    area: f32,
}

/// Serialized form: only the corners travel, the rest is recomputed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct QuadrantCorners {
    corners: [Vector2<f32>; 4],
}

impl From<QuadrantCorners> for LeakageQuadrant {
    fn from(raw: QuadrantCorners) -> Self {
        LeakageQuadrant::from_corners(raw.corners)
    }
}

impl From<LeakageQuadrant> for QuadrantCorners {
    fn from(lq: LeakageQuadrant) -> Self {
        QuadrantCorners { corners: lq.corners }
    }
}

impl LeakageQuadrant {
    pub fn from_corners(corners: [Vector2<f32>; 4]) -> Self {
        let center = corners.iter().fold(Vector2::zeros(), |acc, c| acc + c) / 4.0;
        let area = polygon_area(&corners);
        Self { corners, center, area }
    }

    /// Axis-aligned rectangle: `width` along x, `depth` along z.
    pub fn from_center(center: Vector2<f32>, width: f32, depth: f32) -> Self {
        let (hw, hd) = (width.abs() / 2.0, depth.abs() / 2.0);
        Self::from_corners([
            Vector2::new(center.x - hw, center.y - hd),
            Vector2::new(center.x + hw, center.y - hd),
            Vector2::new(center.x + hw, center.y + hd),
            Vector2::new(center.x - hw, center.y + hd),
        ])
    }

    pub fn corners(&self) -> &[Vector2<f32>; 4] {
        &self.corners
    }

    pub fn center(&self) -> Vector2<f32> {
        self.center
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    /// Extent along x.
    pub fn width(&self) -> f32 {
        let (min, max) = self.extent(|c| c.x);
        max - min
    }

    /// Extent along z.
    pub fn depth(&self) -> f32 {
        let (min, max) = self.extent(|c| c.y);
        max - min
    }

    fn extent(&self, axis: impl Fn(&Vector2<f32>) -> f32) -> (f32, f32) {
        self.corners
            .iter()
            .map(axis)
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }
}
