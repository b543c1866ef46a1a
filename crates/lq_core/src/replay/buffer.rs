//! Playback Interpolation Buffer
//!
//! Append-only, time-ordered frames.
//!
//! Each pushed frame also extends a per-entity presence index (runs of
//! consecutive frame indices), so bracket and appearance lookups are binary
//! searches and a tick costs the same at minute 90 as at minute 1.

use super::types::{Frame, GroundMapping, RawFrame, Sighting};
use crate::error::TrackingError;
use fxhash::FxHashMap;
use tracing::{debug, warn};

/// Consecutive frame indices `start..=end` that contain one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PlaybackBuffer {
    frames: Vec<Frame>,
    presence: FxHashMap<String, Vec<Run>>,
}

impl PlaybackBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame. Timestamps must be finite and non-decreasing.
    pub fn push(&mut self, frame: Frame) -> Result<(), TrackingError> {
        if !frame.timestamp_ms.is_finite() {
            return Err(TrackingError::NonFiniteTimestamp);
        }
        if frame.samples.is_empty() {
            return Err(TrackingError::EmptyFrame { timestamp_ms: frame.timestamp_ms });
        }
        if let Some(last) = self.frames.last() {
            if frame.timestamp_ms < last.timestamp_ms {
                return Err(TrackingError::OutOfOrderFrame {
                    timestamp_ms: frame.timestamp_ms,
                    last_ms: last.timestamp_ms,
                });
            }
        }

        let index = self.frames.len();
        for sample in &frame.samples {
            match self.presence.get_mut(&sample.id) {
                Some(runs) => match runs.last_mut() {
                    // Same frame twice or the next frame: extend
                    Some(run) if run.end + 1 >= index => run.end = index,
                    _ => runs.push(Run { start: index, end: index }),
                },
                None => {
                    self.presence.insert(sample.id.clone(), vec![Run { start: index, end: index }]);
                }
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Map and append a raw frame.
    ///
    /// Returns `Ok(false)` when the frame had no valid samples and was dropped.
    pub fn ingest(&mut self, raw: &RawFrame, mapping: &GroundMapping) -> Result<bool, TrackingError> {
        match mapping.map_frame(raw) {
            Some(frame) => {
                self.push(frame).map_err(|e| {
                    warn!("rejected frame: {}", e);
                    e
                })?;
                Ok(true)
            }
            None => {
                debug!(timestamp_ms = raw.timestamp_ms, "dropped frame with no valid samples");
                Ok(false)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Time between the first and last frame.
    pub fn duration_ms(&self) -> f64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0.0,
        }
    }

    /// Indices of the frames bracketing `t_ms`.
    ///
    /// The next frame is the first at or after `t_ms`. Before the first frame
    /// both indices are the first; after the last, both are the last.
    pub fn bracket_indices(&self, t_ms: f64) -> Option<(usize, usize)> {
        let last = self.frames.len().checked_sub(1)?;
        match self.frames.partition_point(|f| f.timestamp_ms < t_ms) {
            0 => Some((0, 0)),
            next if next > last => Some((last, last)),
            next => Some((next - 1, next)),
        }
    }

    pub fn bracket(&self, t_ms: f64) -> Option<(&Frame, &Frame)> {
        let (prev, next) = self.bracket_indices(t_ms)?;
        Some((&self.frames[prev], &self.frames[next]))
    }

    /// Frame index for a playback fraction in `[0, 1]` (clamped).
    pub fn index_at_fraction(&self, fraction: f64) -> Option<usize> {
        let last = self.frames.len().checked_sub(1)?;
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        Some(((fraction * last as f64).round() as usize).min(last))
    }

    /// First sighting of `id` strictly after `after_ms` and no later than
    /// `after_ms + horizon_ms`.
    pub fn next_appearance(&self, id: &str, after_ms: f64, horizon_ms: f64) -> Option<Sighting> {
        let runs = self.presence.get(id)?;
        let from = self.frames.partition_point(|f| f.timestamp_ms <= after_ms);
        let run = runs.get(runs.partition_point(|r| r.end < from))?;

        let frame = &self.frames[run.start.max(from)];
        if frame.timestamp_ms > after_ms + horizon_ms {
            return None;
        }
        frame.sample(id).map(|s| Sighting { position: s.position, timestamp_ms: frame.timestamp_ms })
    }

    /// Latest frame index at or before `index` that contains `id`.
    pub fn last_appearance_index(&self, id: &str, index: usize) -> Option<usize> {
        let end = index.min(self.frames.len().checked_sub(1)?);
        let runs = self.presence.get(id)?;
        let count = runs.partition_point(|r| r.start <= end);
        runs.get(count.checked_sub(1)?).map(|r| r.end.min(end))
    }
}
