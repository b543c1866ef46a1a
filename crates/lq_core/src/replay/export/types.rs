//! Data structures for the NDJSON export format

use crate::analysis::features::FeatureMap;
use crate::engine::leakage::LeakageScore;
use crate::models::EntityState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Export format version written into every record
pub const EXPORT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportMetadata {
    pub format_version: u32,
    /// Unique per record
    pub sample_id: Uuid,
    /// Match time of the labelled moment
    pub timestamp_ms: f64,
    pub label: String,
    pub attacking_team: String,
    /// When the record was written
    pub exported_at: Option<DateTime<Utc>>,
}

impl Default for ExportMetadata {
    fn default() -> Self {
        Self {
            format_version: EXPORT_FORMAT_VERSION,
            sample_id: Uuid::nil(),
            timestamp_ms: 0.0,
            label: String::new(),
            attacking_team: String::new(),
            exported_at: None,
        }
    }
}

impl ExportMetadata {
    /// Fresh metadata with a random sample id, stamped now.
    pub fn new(timestamp_ms: f64, label: impl Into<String>, attacking_team: impl Into<String>) -> Self {
        Self {
            format_version: EXPORT_FORMAT_VERSION,
            sample_id: Uuid::new_v4(),
            timestamp_ms,
            label: label.into(),
            attacking_team: attacking_team.into(),
            exported_at: Some(Utc::now()),
        }
    }
}

/// Human-assigned label fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundTruth {
    /// Whether the moment is a genuine leakage opportunity
    pub is_leakage: bool,
    /// Whether the attack went on to use the space
    pub exploited: Option<bool>,
    pub outcome: Option<String>,
}

/// Position and velocity of one entity, ground plane.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPosition {
    pub id: String,
    pub team: String,
    pub role: String,
    pub x: f32,
    pub z: f32,
    pub vx: f32,
    pub vz: f32,
    pub inferred: bool,
}

impl From<&EntityState> for RawPosition {
    fn from(e: &EntityState) -> Self {
        Self {
            id: e.id.clone(),
            team: e.team.clone(),
            role: e.role.as_str().to_string(),
            x: e.position.x,
            z: e.position.y,
            vx: e.velocity.x,
            vz: e.velocity.y,
            inferred: e.inferred,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportFeatures {
    pub numerical: FeatureMap,
    pub raw_positions: Vec<RawPosition>,
}

/// One line of the export file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportRecord {
    pub metadata: ExportMetadata,
    pub ground_truth: GroundTruth,
    pub features: ExportFeatures,
    /// Leakage score at the moment, when one was computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<LeakageScore>,
}
