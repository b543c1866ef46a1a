//! Per-entity tracking state machine
//!
//! ```text
//!   Live ──absent, reappears within horizon──▶ Gap
//!   Gap  ──t reaches end / seen again──────▶ Live
//!   Live | Gap ──no reappearance found─────▶ UnknownFuture (frozen, inferred)
//! ```
//!
//! [`resolve`] is pure: given the previous state and what the buffer says
//! about the entity at `t`, it returns the next state and the position to use.

use super::types::Sighting;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Interpolation through a missing-data interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapState {
    /// Last observed position
    pub start_pos: Vector2<f32>,
    /// Time of the first frame the entity was missing from
    pub start_ms: f64,
    /// Position at reappearance
    pub end_pos: Vector2<f32>,
    pub end_ms: f64,
}

impl GapState {
    pub fn position_at(&self, t_ms: f64) -> Vector2<f32> {
        let span = self.end_ms - self.start_ms;
        if span <= 0.0 {
            return self.end_pos;
        }
        let alpha = ((t_ms - self.start_ms) / span).clamp(0.0, 1.0) as f32;
        self.start_pos + (self.end_pos - self.start_pos) * alpha
    }

    /// Constant velocity across the gap, units/s.
    pub fn velocity(&self) -> Vector2<f32> {
        let span_s = ((self.end_ms - self.start_ms) / 1000.0) as f32;
        if span_s > 0.0 {
            (self.end_pos - self.start_pos) / span_s
        } else {
            Vector2::zeros()
        }
    }

    pub fn contains(&self, t_ms: f64) -> bool {
        t_ms < self.end_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrackState {
    Live,
    Gap(GapState),
    UnknownFuture { frozen_at: Vector2<f32> },
}

impl TrackState {
    pub fn is_inferred(&self) -> bool {
        !matches!(self, TrackState::Live)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TrackState::Live => "live",
            TrackState::Gap(_) => "gap",
            TrackState::UnknownFuture { .. } => "unknown_future",
        }
    }
}

/// What the playback buffer says about one entity at the query time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    /// Present in both bracketing frames
    Live {
        position: Vector2<f32>,
        /// `None` when both brackets are the same frame
        velocity: Option<Vector2<f32>>,
    },
    /// Absent from at least one bracketing frame
    Missing {
        last_seen: Option<Sighting>,
        /// Time of the first frame after `last_seen`
        missing_since_ms: f64,
        /// Next sighting within the search horizon
        reappearance: Option<Sighting>,
    },
}

/// Outcome of one transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub state: TrackState,
    pub position: Vector2<f32>,
    /// Raw velocity estimate; `None` keeps the previous estimate
    pub velocity: Option<Vector2<f32>>,
    pub inferred: bool,
}

/// Next state for an entity at `t_ms`.
///
/// `current` is the entity's position before this tick, used only when the
/// buffer holds no sighting at all.
pub fn resolve(previous: &TrackState, observation: &Observation, current: Vector2<f32>, t_ms: f64) -> Resolution {
    match *observation {
        Observation::Live { position, velocity } => {
            Resolution { state: TrackState::Live, position, velocity, inferred: false }
        }
        Observation::Missing { last_seen, missing_since_ms, reappearance } => match (last_seen, reappearance) {
            (_, Some(end)) if t_ms >= end.timestamp_ms => Resolution {
                state: TrackState::Live,
                position: end.position,
                velocity: None,
                inferred: false,
            },
            (Some(start), Some(end)) => {
                let gap = match previous {
                    TrackState::Gap(g) if g.end_ms == end.timestamp_ms && g.contains(t_ms) => *g,
                    _ => GapState {
                        start_pos: start.position,
                        start_ms: missing_since_ms.max(start.timestamp_ms),
                        end_pos: end.position,
                        end_ms: end.timestamp_ms,
                    },
                };
                Resolution {
                    state: TrackState::Gap(gap),
                    position: gap.position_at(t_ms),
                    velocity: Some(gap.velocity()),
                    inferred: true,
                }
            }
            (None, Some(end)) => {
                // Not seen yet: hold at the first known position until it appears
                let gap = GapState { start_pos: end.position, start_ms: t_ms, end_pos: end.position, end_ms: end.timestamp_ms };
                Resolution {
                    state: TrackState::Gap(gap),
                    position: end.position,
                    velocity: Some(Vector2::zeros()),
                    inferred: true,
                }
            }
            (last_seen, None) => {
                let frozen_at = match (previous, last_seen) {
                    (TrackState::UnknownFuture { frozen_at }, _) => *frozen_at,
                    (_, Some(seen)) => seen.position,
                    (_, None) => current,
                };
                Resolution {
                    state: TrackState::UnknownFuture { frozen_at },
                    position: frozen_at,
                    velocity: Some(Vector2::zeros()),
                    inferred: true,
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seen(x: f32, t: f64) -> Sighting {
        Sighting { position: Vector2::new(x, 0.0), timestamp_ms: t }
    }

    fn missing(last: Option<Sighting>, since: f64, next: Option<Sighting>) -> Observation {
        Observation::Missing { last_seen: last, missing_since_ms: since, reappearance: next }
    }

    #[test]
    fn test_gap_position_is_linear() {
        let gap = GapState { start_pos: Vector2::new(0.0, 0.0), start_ms: 100.0, end_pos: Vector2::new(10.0, 4.0), end_ms: 300.0 };
        assert_eq!(gap.position_at(100.0), Vector2::new(0.0, 0.0));
        assert_eq!(gap.position_at(200.0), Vector2::new(5.0, 2.0));
        assert_eq!(gap.position_at(500.0), Vector2::new(10.0, 4.0));
        assert!((gap.velocity().x - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_live_to_gap_and_back() {
        let obs = missing(Some(seen(0.0, 0.0)), 100.0, Some(seen(30.0, 300.0)));

        let r = resolve(&TrackState::Live, &obs, Vector2::zeros(), 200.0);
        assert!(matches!(r.state, TrackState::Gap(_)));
        assert!(r.inferred);
        assert!((r.position.x - 15.0).abs() < 1e-5);

        let r = resolve(&r.state, &obs, r.position, 300.0);
        assert_eq!(r.state, TrackState::Live);
        assert!(!r.inferred);
        assert_eq!(r.position, Vector2::new(30.0, 0.0));
    }

    #[test]
    fn test_gap_is_kept_while_inside() {
        let obs = missing(Some(seen(0.0, 0.0)), 100.0, Some(seen(30.0, 300.0)));
        let first = resolve(&TrackState::Live, &obs, Vector2::zeros(), 150.0);
        let second = resolve(&first.state, &obs, first.position, 250.0);
        assert_eq!(first.state, second.state);
    }

    #[test]
    fn test_no_reappearance_freezes() {
        let obs = missing(Some(seen(7.0, 0.0)), 100.0, None);
        let r = resolve(&TrackState::Live, &obs, Vector2::new(9.0, 9.0), 400.0);
        assert_eq!(r.state, TrackState::UnknownFuture { frozen_at: Vector2::new(7.0, 0.0) });
        assert_eq!(r.position, Vector2::new(7.0, 0.0));
        assert!(r.inferred);

        // Stays frozen on later ticks
        let again = resolve(&r.state, &missing(None, 400.0, None), Vector2::zeros(), 900.0);
        assert_eq!(again.position, Vector2::new(7.0, 0.0));
    }

    #[test]
    fn test_live_observation_clears_inference() {
        let frozen = TrackState::UnknownFuture { frozen_at: Vector2::zeros() };
        let obs = Observation::Live { position: Vector2::new(1.0, 2.0), velocity: None };
        let r = resolve(&frozen, &obs, Vector2::zeros(), 10.0);
        assert_eq!(r.state, TrackState::Live);
        assert!(!r.inferred);
        assert_eq!(r.position, Vector2::new(1.0, 2.0));
    }

    #[test]
    fn test_not_yet_seen_holds_at_first_sighting() {
        let obs = missing(None, 0.0, Some(seen(12.0, 80.0)));
        let r = resolve(&TrackState::Live, &obs, Vector2::zeros(), 40.0);
        assert_eq!(r.position, Vector2::new(12.0, 0.0));
        assert!(r.inferred);
    }
}
