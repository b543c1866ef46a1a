//! Tracking frame types
//!
//! `RawFrame` is what the ingestion boundary delivers (pitch-relative units);
//! `Frame` is the validated ground-plane form kept in the playback buffer.

use crate::models::Role;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// One entity sample as delivered by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub id: String,
    pub team: String,
    pub role: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    /// Milliseconds since match start
    pub timestamp_ms: f64,
    #[serde(default)]
    pub entities: Vec<RawSample>,
}

/// Pitch-relative `(x, y)` to ground-plane `(x, z)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundMapping {
    pub scale: f32,
    /// +1 or -1
    pub x_sign: f32,
    /// +1 or -1
    pub z_sign: f32,
}

impl Default for GroundMapping {
    fn default() -> Self {
        Self { scale: 1.0, x_sign: 1.0, z_sign: 1.0 }
    }
}

impl GroundMapping {
    pub fn to_ground(&self, x: f32, y: f32) -> Vector2<f32> {
        Vector2::new(x * self.scale * self.x_sign, y * self.scale * self.z_sign)
    }

    /// Map a raw frame, dropping samples that are not finite after mapping.
    ///
    /// Returns `None` when no valid sample is left.
    pub fn map_frame(&self, raw: &RawFrame) -> Option<Frame> {
        let samples: Vec<EntitySample> = raw
            .entities
            .iter()
            .filter_map(|s| {
                let position = self.to_ground(s.x, s.y);
                if !(position.x.is_finite() && position.y.is_finite()) || s.id.is_empty() {
                    return None;
                }
                Some(EntitySample { id: s.id.clone(), team: s.team.clone(), role: Role::from(s.role.as_str()), position })
            })
            .collect();

        if samples.is_empty() {
            None
        } else {
            Some(Frame { timestamp_ms: raw.timestamp_ms, samples })
        }
    }
}

/// One entity sample on the ground plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySample {
    pub id: String,
    pub team: String,
    pub role: Role,
    pub position: Vector2<f32>,
}

/// Validated snapshot; always holds at least one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub timestamp_ms: f64,
    pub samples: Vec<EntitySample>,
}

impl Frame {
    pub fn sample(&self, id: &str) -> Option<&EntitySample> {
        self.samples.iter().find(|s| s.id == id)
    }
}

/// A position observed at a known time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    pub position: Vector2<f32>,
    pub timestamp_ms: f64,
}
