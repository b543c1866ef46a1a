//! Analysis Session
//!
//! Ties the playback buffer, the position tracker and the scoring engine
//! together for one match. A tick is `advance_to(t)` followed by any number
//! of read-only `evaluate` / `feature_request` calls; the borrow checker
//! keeps scoring from observing a half-updated tracker.

use super::buffer::PlaybackBuffer;
use super::position_tracker::PositionTracker;
use super::types::{GroundMapping, RawFrame};
use crate::analysis::features::{FeatureMetadata, FeatureRequest};
use crate::analysis::metrics::ContextFeatures;
use crate::engine::config::EngineConfig;
use crate::engine::leakage::{LeakageEngine, LeakageScore, ScoringInput};
use crate::engine::quadrant::LeakageQuadrant;
use crate::error::TrackingError;
use crate::models::{AttackDirection, EntityState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Who is attacking which way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub attacking_team: String,
    pub defending_team: String,
    pub direction: AttackDirection,
}

impl EvaluationContext {
    pub fn new(attacking_team: impl Into<String>, defending_team: impl Into<String>, direction: AttackDirection) -> Self {
        Self { attacking_team: attacking_team.into(), defending_team: defending_team.into(), direction }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisSession {
    buffer: PlaybackBuffer,
    tracker: PositionTracker,
    engine: LeakageEngine,
    mapping: GroundMapping,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new(EngineConfig::default(), GroundMapping::default())
    }
}

impl AnalysisSession {
    pub fn new(config: EngineConfig, mapping: GroundMapping) -> Self {
        Self {
            buffer: PlaybackBuffer::new(),
            tracker: PositionTracker::new(config.tracking.clone()),
            engine: LeakageEngine::new(config),
            mapping,
        }
    }

    /// Map and buffer one raw frame. `Ok(false)` means it was empty and dropped.
    pub fn ingest(&mut self, raw: &RawFrame) -> Result<bool, TrackingError> {
        self.buffer.ingest(raw, &self.mapping)
    }

    /// Ingest frames in order; stops at the first rejected frame.
    pub fn ingest_all<'a, I>(&mut self, frames: I) -> Result<usize, TrackingError>
    where
        I: IntoIterator<Item = &'a RawFrame>,
    {
        let mut accepted = 0;
        for raw in frames {
            if self.ingest(raw)? {
                accepted += 1;
            }
        }
        info!(accepted, buffered = self.buffer.len(), duration_ms = self.buffer.duration_ms(), "frames ingested");
        Ok(accepted)
    }

    /// Resolve all entity positions and possession at `t_ms`.
    pub fn advance_to(&mut self, t_ms: f64) {
        self.tracker.advance_to(&self.buffer, t_ms);
        debug!(
            t_ms,
            entities = self.tracker.len(),
            carrier = self.tracker.carrier().map(|c| c.id.as_str()),
            "session advanced"
        );
    }

    /// Advance to the frame nearest a normalized playback position in `[0, 1]`.
    ///
    /// Returns the time of that frame.
    pub fn seek_fraction(&mut self, fraction: f64) -> Option<f64> {
        let index = self.buffer.index_at_fraction(fraction)?;
        let t_ms = self.buffer.frame(index)?.timestamp_ms;
        self.advance_to(t_ms);
        Some(t_ms)
    }

    pub fn buffer(&self) -> &PlaybackBuffer {
        &self.buffer
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    pub fn engine(&self) -> &LeakageEngine {
        &self.engine
    }

    /// Carrier for `ctx`: the possessor, if it plays for the attacking team.
    pub fn attacking_carrier(&self, ctx: &EvaluationContext) -> Option<&EntityState> {
        self.tracker.carrier().filter(|c| c.team == ctx.attacking_team)
    }

    /// Score `lq` against the positions resolved by the last `advance_to`.
    pub fn evaluate(&self, lq: &LeakageQuadrant, ctx: &EvaluationContext) -> LeakageScore {
        let attackers = self.tracker.team_players(&ctx.attacking_team);
        let defenders = self.tracker.team_players(&ctx.defending_team);

        let input = ScoringInput {
            lq,
            goal: self.engine.goal_for(ctx.direction),
            attackers: &attackers,
            defenders: &defenders,
            carrier: self.attacking_carrier(ctx),
            direction: Some(ctx.direction),
        };
        self.engine.score(&input)
    }

    pub fn context_features(&self, ctx: &EvaluationContext) -> ContextFeatures {
        let attackers = self.tracker.team_players(&ctx.attacking_team);
        let defenders = self.tracker.team_players(&ctx.defending_team);
        ContextFeatures::compute(&attackers, &defenders, ctx.direction, &self.engine.config().pitch)
    }

    /// Snapshot for the feature-extraction boundary.
    pub fn feature_request(&self, ctx: &EvaluationContext, lq: Option<LeakageQuadrant>) -> FeatureRequest {
        FeatureRequest {
            players: self.tracker.snapshot(),
            metadata: FeatureMetadata {
                attacking_team: ctx.attacking_team.clone(),
                defending_team: ctx.defending_team.clone(),
                attacking_direction: ctx.direction,
                carrier_id: self.attacking_carrier(ctx).map(|c| c.id.clone()),
            },
            lq,
        }
    }
}
