//! Goal Contract
//!
//! The attacked goal sits at `x = dir * half_length`, centred on `z = 0`.
//! The defending team protects that same goal.

use super::config::PitchConfig;
use crate::models::AttackDirection;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Goal mouth centre on the goal line
    pub center: Vector2<f32>,
    /// Post at negative z
    pub left_post: Vector2<f32>,
    /// Post at positive z
    pub right_post: Vector2<f32>,
}

impl Goal {
    pub fn at(center: Vector2<f32>, goal_width: f32) -> Self {
        let half = goal_width / 2.0;
        Self {
            center,
            left_post: Vector2::new(center.x, center.y - half),
            right_post: Vector2::new(center.x, center.y + half),
        }
    }

    /// Goal the attacking team is scoring toward.
    pub fn attacked(pitch: &PitchConfig, direction: AttackDirection) -> Self {
        Self::at(Vector2::new(direction.sign() * pitch.half_length, 0.0), pitch.goal_width)
    }

    pub fn distance_from(&self, pos: &Vector2<f32>) -> f32 {
        (self.center - pos).norm()
    }
}
