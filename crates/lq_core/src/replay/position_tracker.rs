//! Position Tracker for the Analysis Session
//!
//! Sole owner and mutator of per-entity state. Entities live in an arena
//! (`Vec` plus an id index) and are created on first appearance, never
//! removed. Each `advance_to` resolves every entity for the tick, then
//! recomputes possession; scorers only ever see the finished pass.

use super::buffer::PlaybackBuffer;
use super::gap::{resolve, Observation, TrackState};
use super::types::{EntitySample, Sighting};
use crate::engine::config::TrackingConfig;
use crate::engine::geometry::closest_entity;
use crate::models::EntityState;
use fxhash::FxHashMap;
use tracing::{debug, warn};

/// One arena slot.
#[derive(Debug, Clone)]
pub struct TrackedEntity {
    pub state: EntityState,
    pub track: TrackState,
}

/// Player and ball state over a playback buffer.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    config: TrackingConfig,
    entities: Vec<TrackedEntity>,
    index: FxHashMap<String, usize>,
    ball: Option<usize>,
    carrier: Option<usize>,
    time_ms: Option<f64>,
    /// Frames already scanned for new entities
    scanned_frames: usize,
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new(TrackingConfig::default())
    }
}

impl PositionTracker {
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            config,
            entities: Vec::new(),
            index: FxHashMap::default(),
            ball: None,
            carrier: None,
            time_ms: None,
            scanned_frames: 0,
        }
    }

    /// Resolve every entity at `t_ms`, then recompute possession.
    ///
    /// Does nothing on an empty buffer or a non-finite `t_ms`.
    pub fn advance_to(&mut self, buffer: &PlaybackBuffer, t_ms: f64) {
        if !t_ms.is_finite() {
            warn!(t_ms, "ignored advance to non-finite time");
            return;
        }
        let Some((prev_idx, next_idx)) = buffer.bracket_indices(t_ms) else {
            return;
        };
        let frames = buffer.frames();
        let (prev, next) = (&frames[prev_idx], &frames[next_idx]);

        // Register everything seen up to the bracket, in order of first appearance
        if self.scanned_frames <= next_idx {
            for frame in &frames[self.scanned_frames..=next_idx] {
                for sample in &frame.samples {
                    self.register(sample);
                }
            }
            self.scanned_frames = next_idx + 1;
        }

        let span = next.timestamp_ms - prev.timestamp_ms;
        let alpha = if span > 0.0 { ((t_ms - prev.timestamp_ms) / span).clamp(0.0, 1.0) as f32 } else { 0.0 };
        let smoothing = self.config.velocity_smoothing;
        let horizon_ms = self.config.gap_search_horizon_ms;

        for entity in &mut self.entities {
            let observation = observe(buffer, prev_idx, next_idx, &entity.state.id, alpha, horizon_ms);
            let resolution = resolve(&entity.track, &observation, entity.state.position, t_ms);

            if resolution.state.name() != entity.track.name() {
                debug!(
                    id = %entity.state.id,
                    from = entity.track.name(),
                    to = resolution.state.name(),
                    t_ms,
                    "track state changed"
                );
            }

            entity.track = resolution.state;
            entity.state.position = resolution.position;
            entity.state.inferred = resolution.inferred;
            if let Some(raw) = resolution.velocity {
                let smoothed = raw * smoothing + entity.state.velocity * (1.0 - smoothing);
                entity.state.set_velocity(smoothed);
            }
        }

        self.ball = self.entities.iter().position(|e| e.state.is_ball());
        self.carrier = self.find_carrier();
        self.time_ms = Some(t_ms);
    }

    fn register(&mut self, sample: &EntitySample) {
        if self.index.contains_key(&sample.id) {
            return;
        }
        let state = EntityState::new(sample.id.clone(), sample.team.clone(), sample.role.clone(), sample.position);
        self.index.insert(sample.id.clone(), self.entities.len());
        self.entities.push(TrackedEntity { state, track: TrackState::Live });
        debug!(id = %sample.id, team = %sample.team, "entity registered");
    }

    /// Closest eligible player within the possession radius of the ball.
    fn find_carrier(&self) -> Option<usize> {
        let ball = &self.entities[self.ball?].state;
        let candidates = self
            .entities
            .iter()
            .map(|e| &e.state)
            .filter(|s| !s.is_ball() && !s.role.is_referee());

        let (closest, distance) = closest_entity(&ball.position, candidates);
        closest
            .filter(|_| distance <= self.config.possession_radius)
            .and_then(|c| self.index.get(&c.id).copied())
    }

    pub fn time_ms(&self) -> Option<f64> {
        self.time_ms
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities in first-appearance order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityState> {
        self.entities.iter().map(|e| &e.state)
    }

    pub fn get(&self, id: &str) -> Option<&EntityState> {
        self.index.get(id).map(|&i| &self.entities[i].state)
    }

    pub fn track_state(&self, id: &str) -> Option<&TrackState> {
        self.index.get(id).map(|&i| &self.entities[i].track)
    }

    pub fn ball(&self) -> Option<&EntityState> {
        self.ball.map(|i| &self.entities[i].state)
    }

    /// Entity in possession at the current tick.
    pub fn carrier(&self) -> Option<&EntityState> {
        self.carrier.map(|i| &self.entities[i].state)
    }

    /// Players of `team`, ball and referees excluded.
    pub fn team_players(&self, team: &str) -> Vec<&EntityState> {
        self.entities()
            .filter(|s| s.team == team && !s.is_ball() && !s.role.is_referee())
            .collect()
    }

    /// Owned copy of every entity, for boundaries that need one.
    pub fn snapshot(&self) -> Vec<EntityState> {
        self.entities().cloned().collect()
    }
}

/// What the frame pair says about `id`.
fn observe(
    buffer: &PlaybackBuffer,
    prev_idx: usize,
    next_idx: usize,
    id: &str,
    alpha: f32,
    horizon_ms: f64,
) -> Observation {
    let frames = buffer.frames();
    let (prev, next) = (&frames[prev_idx], &frames[next_idx]);

    match (prev.sample(id), next.sample(id)) {
        (Some(a), Some(b)) => {
            let span_s = ((next.timestamp_ms - prev.timestamp_ms) / 1000.0) as f32;
            let velocity = if span_s > 0.0 { Some((b.position - a.position) / span_s) } else { None };
            Observation::Live { position: a.position + (b.position - a.position) * alpha, velocity }
        }
        _ => {
            let last_idx = buffer.last_appearance_index(id, prev_idx);
            let last_seen = last_idx.and_then(|i| {
                frames[i].sample(id).map(|s| Sighting { position: s.position, timestamp_ms: frames[i].timestamp_ms })
            });
            let missing_since_ms = last_idx
                .and_then(|i| frames.get(i + 1))
                .map_or(prev.timestamp_ms, |f| f.timestamp_ms);
            let reappearance = buffer.next_appearance(id, prev.timestamp_ms, horizon_ms);

            Observation::Missing { last_seen, missing_since_ms, reappearance }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, BALL_TEAM};
    use crate::replay::types::Frame;
    use nalgebra::Vector2;
    use std::time::{Duration, Instant};

    fn sample(id: &str, team: &str, role: &str, x: f32, z: f32) -> EntitySample {
        EntitySample { id: id.into(), team: team.into(), role: Role::from(role), position: Vector2::new(x, z) }
    }

    fn buffer(frames: Vec<(f64, Vec<EntitySample>)>) -> PlaybackBuffer {
        let mut buffer = PlaybackBuffer::new();
        for (t, samples) in frames {
            buffer.push(Frame { timestamp_ms: t, samples }).unwrap();
        }
        buffer
    }

    /// `p` is seen at 0, missing at 100 and 200, back at 300. `q` is always seen.
    fn gap_buffer() -> PlaybackBuffer {
        let q = || sample("q", "Away", "CB", 5.0, 5.0);
        buffer(vec![
            (0.0, vec![sample("p", "Home", "ST", 0.0, 0.0), q()]),
            (100.0, vec![q()]),
            (200.0, vec![q()]),
            (300.0, vec![sample("p", "Home", "ST", 30.0, 10.0), q()]),
        ])
    }

    #[test]
    fn test_gap_fill_midpoint() {
        let buffer = gap_buffer();
        let mut tracker = PositionTracker::default();
        tracker.advance_to(&buffer, 200.0);

        let p = tracker.get("p").unwrap();
        assert!((p.position - Vector2::new(15.0, 5.0)).norm() < 1e-4, "{:?}", p.position);
        assert!(p.inferred);
        assert!(matches!(tracker.track_state("p"), Some(TrackState::Gap(_))));
    }

    #[test]
    fn test_gap_inferred_throughout() {
        let buffer = gap_buffer();
        let mut tracker = PositionTracker::default();

        tracker.advance_to(&buffer, 0.0);
        assert!(!tracker.get("p").unwrap().inferred);

        for t in [100.0, 150.0, 200.0, 250.0, 299.0] {
            tracker.advance_to(&buffer, t);
            assert!(tracker.get("p").unwrap().inferred, "not inferred at {}", t);
            assert!(!tracker.get("q").unwrap().inferred);
        }

        tracker.advance_to(&buffer, 300.0);
        let p = tracker.get("p").unwrap();
        assert!(!p.inferred);
        assert_eq!(p.position, Vector2::new(30.0, 10.0));
        assert_eq!(tracker.track_state("p"), Some(&TrackState::Live));
    }

    #[test]
    fn test_unknown_future_freezes() {
        let buffer = buffer(vec![
            (0.0, vec![sample("p", "Home", "ST", 3.0, 4.0), sample("q", "Away", "CB", 0.0, 0.0)]),
            (100.0, vec![sample("q", "Away", "CB", 0.0, 0.0)]),
            (200.0, vec![sample("q", "Away", "CB", 0.0, 0.0)]),
        ]);
        let mut tracker = PositionTracker::default();
        tracker.advance_to(&buffer, 150.0);

        let p = tracker.get("p").unwrap();
        assert!(p.inferred);
        assert_eq!(p.position, Vector2::new(3.0, 4.0));
        assert_eq!(p.speed, 0.0);
        assert!(matches!(tracker.track_state("p"), Some(TrackState::UnknownFuture { .. })));
    }

    #[test]
    fn test_reappearance_beyond_horizon_is_unknown() {
        let config = TrackingConfig { gap_search_horizon_ms: 150.0, ..TrackingConfig::default() };
        let mut tracker = PositionTracker::new(config);
        tracker.advance_to(&gap_buffer(), 150.0);
        assert!(matches!(tracker.track_state("p"), Some(TrackState::UnknownFuture { .. })));
    }

    #[test]
    fn test_velocity_from_frame_pair() {
        let buffer = buffer(vec![
            (0.0, vec![sample("p", "Home", "ST", 0.0, 0.0)]),
            (100.0, vec![sample("p", "Home", "ST", 1.0, 0.0)]),
            (200.0, vec![sample("p", "Home", "ST", 2.0, 0.0)]),
        ]);

        let config = TrackingConfig { velocity_smoothing: 1.0, ..TrackingConfig::default() };
        let mut tracker = PositionTracker::new(config);
        tracker.advance_to(&buffer, 50.0);
        let p = tracker.get("p").unwrap();
        assert!((p.velocity.x - 10.0).abs() < 1e-4);
        assert!((p.speed - 10.0).abs() < 1e-4);
        assert!((p.position.x - 0.5).abs() < 1e-5);

        // Default smoothing blends with the previous estimate
        let mut smoothed = PositionTracker::default();
        smoothed.advance_to(&buffer, 50.0);
        assert!((smoothed.get("p").unwrap().speed - 5.0).abs() < 1e-4);
        smoothed.advance_to(&buffer, 150.0);
        assert!((smoothed.get("p").unwrap().speed - 7.5).abs() < 1e-4);
    }

    #[test]
    fn test_possession_closest_within_radius() {
        let buffer = buffer(vec![(
            0.0,
            vec![
                sample("ball", BALL_TEAM, "BALL", 0.0, 0.0),
                sample("ref", "Officials", "REF", 0.3, 0.0),
                sample("h", "Home", "CM", 1.0, 0.0),
                sample("a", "Away", "CM", 1.2, 0.0),
            ],
        )]);
        let mut tracker = PositionTracker::default();
        tracker.advance_to(&buffer, 0.0);
        assert_eq!(tracker.ball().map(|b| b.id.as_str()), Some("ball"));
        assert_eq!(tracker.carrier().map(|c| c.id.as_str()), Some("h"));
        assert_eq!(tracker.team_players("Home").len(), 1);
    }

    #[test]
    fn test_no_possession_outside_radius() {
        let buffer = buffer(vec![(
            0.0,
            vec![sample("ball", BALL_TEAM, "BALL", 0.0, 0.0), sample("h", "Home", "CM", 1.6, 0.0)],
        )]);
        let mut tracker = PositionTracker::default();
        tracker.advance_to(&buffer, 0.0);
        assert!(tracker.carrier().is_none());
    }

    #[test]
    fn test_possession_tie_keeps_first_registered() {
        let buffer = buffer(vec![(
            0.0,
            vec![
                sample("ball", BALL_TEAM, "BALL", 0.0, 0.0),
                sample("a", "Away", "CM", 0.0, 1.0),
                sample("h", "Home", "CM", 0.0, -1.0),
            ],
        )]);
        let mut tracker = PositionTracker::default();
        tracker.advance_to(&buffer, 0.0);
        assert_eq!(tracker.carrier().map(|c| c.id.as_str()), Some("a"));
    }

    #[test]
    fn test_entities_are_reused() {
        let buffer = gap_buffer();
        let mut tracker = PositionTracker::default();
        for t in [0.0, 100.0, 200.0, 300.0, 400.0] {
            tracker.advance_to(&buffer, t);
        }
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.time_ms(), Some(400.0));
    }

    #[test]
    fn test_non_finite_time_is_ignored() {
        let buffer = gap_buffer();
        let mut tracker = PositionTracker::default();
        tracker.advance_to(&buffer, 0.0);

        tracker.advance_to(&buffer, f64::NAN);
        tracker.advance_to(&buffer, f64::INFINITY);
        assert_eq!(tracker.time_ms(), Some(0.0));
        let p = tracker.get("p").unwrap();
        assert_eq!(p.position, Vector2::new(0.0, 0.0));
        assert!(p.speed.is_finite());
    }

    #[test]
    fn test_tick_cost_does_not_grow_with_history() {
        // 40 minutes at 25 Hz; `sub` leaves after the tenth frame
        let ids: Vec<String> = (0..11).map(|i| format!("h{}", i)).collect();
        let mut buffer = PlaybackBuffer::new();
        for i in 0..60_000usize {
            let x = (i % 1000) as f32 * 0.01;
            let mut samples: Vec<EntitySample> = ids.iter().map(|id| sample(id, "Home", "CM", x, 0.0)).collect();
            if i < 10 {
                samples.push(sample("sub", "Home", "ST", 1.0, 1.0));
            }
            buffer.push(Frame { timestamp_ms: i as f64 * 40.0, samples }).unwrap();
        }

        let mut tracker = PositionTracker::default();
        tracker.advance_to(&buffer, 0.0);
        // First visit to the end registers the whole history once
        tracker.advance_to(&buffer, 2_399_960.0);
        assert!(matches!(tracker.track_state("sub"), Some(TrackState::UnknownFuture { .. })));

        let start = Instant::now();
        for k in 0..50 {
            tracker.advance_to(&buffer, 2_300_000.0 + k as f64 * 20.0);
        }
        let elapsed = start.elapsed();

        let sub = tracker.get("sub").unwrap();
        assert!(sub.inferred);
        assert_eq!(sub.position, Vector2::new(1.0, 1.0));
        assert!(elapsed < Duration::from_millis(50), "50 late ticks took {:?}", elapsed);
    }
}
