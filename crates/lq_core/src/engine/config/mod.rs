//! # Engine Configuration Module
//!
//! Every tunable constant of the scoring pipeline and the tracker lives here,
//! grouped per concern and named after the formula term it controls.
//!
//! ## Usage
//! ```rust
//! use lq_core::engine::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.team_control.unreachable_tta, 99.0);
//!
//! let tuned = EngineConfig::from_yaml_str("threat:\n  angle_decay: 0.8\n").unwrap();
//! assert_eq!(tuned.threat.angle_decay, 0.8);
//! assert_eq!(tuned.threat.proximity_midpoint, 30.0);
//! ```

mod pitch_config;
mod scoring_config;
mod team_control_config;
mod tracking_config;

pub use pitch_config::PitchConfig;
pub use scoring_config::{AggregateConfig, ExploitationConfig, FeasibilityConfig, ThreatConfig};
pub use team_control_config::TeamControlConfig;
pub use tracking_config::{FeatureConfig, TrackingConfig};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Full engine configuration, passed in at construction.
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
#[serde(default)]
pub struct EngineConfig {
    #[validate]
    pub pitch: PitchConfig,
    #[validate]
    pub team_control: TeamControlConfig,
    #[validate]
    pub threat: ThreatConfig,
    #[validate]
    pub exploitation: ExploitationConfig,
    #[validate]
    pub feasibility: FeasibilityConfig,
    #[validate]
    pub aggregate: AggregateConfig,
    #[validate]
    pub tracking: TrackingConfig,
    #[validate]
    pub features: FeatureConfig,
}

impl EngineConfig {
    /// Parse a (possibly partial) YAML document; missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&data)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = EngineConfig::default();
        assert!((cfg.team_control.defender_min_speed - 1.0).abs() < f32::EPSILON);
        assert!((cfg.team_control.attacker_min_speed - 4.0).abs() < f32::EPSILON);
        assert!((cfg.team_control.avg_pass_speed - 15.0).abs() < f32::EPSILON);
        assert!((cfg.tracking.possession_radius - 1.5).abs() < f32::EPSILON);
        assert!((cfg.exploitation.analysis_radius - 20.0).abs() < f32::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "team_control:\n  avg_pass_speed: 18.0\ntracking:\n  possession_radius: 2.0\n";
        let cfg = EngineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.team_control.avg_pass_speed, 18.0);
        assert_eq!(cfg.team_control.unreachable_tta, 99.0);
        assert_eq!(cfg.tracking.possession_radius, 2.0);
        assert_eq!(cfg.feasibility.obstruction_weight, 0.45);
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let yaml = "aggregate:\n  product_weight: 3.0\n";
        let err = EngineConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = EngineConfig::from_yaml_str("threat: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_yaml_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        let mut cfg = EngineConfig::default();
        cfg.threat.angle_decay = 0.9;
        std::fs::write(&path, cfg.to_yaml_string().unwrap()).unwrap();

        let loaded = EngineConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded.threat.angle_decay, 0.9);
    }

    #[test]
    fn test_config_serialization() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed: EngineConfig = serde_json::from_str(&json).unwrap();
        assert!((parsed.threat.area_max_bonus - cfg.threat.area_max_bonus).abs() < 0.001);
    }
}
