//! # Replay Module
//!
//! Tracking ingestion and playback: frames, the interpolation buffer, the
//! per-entity gap state machine, the position tracker, the analysis session
//! and NDJSON export of labelled samples.

pub mod buffer;
pub mod export;
pub mod gap;
pub mod position_tracker;
pub mod session;
pub mod types;

pub use buffer::PlaybackBuffer;
pub use export::{ExportMetadata, ExportRecord, GroundTruth, LabelExporter, NdjsonWriter};
pub use gap::{GapState, TrackState};
pub use position_tracker::PositionTracker;
pub use session::{AnalysisSession, EvaluationContext};
pub use types::{EntitySample, Frame, GroundMapping, RawFrame, RawSample, Sighting};
