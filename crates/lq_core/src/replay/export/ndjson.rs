//! NDJSON reader/writer and the labelled-sample exporter

use super::types::{ExportFeatures, ExportMetadata, ExportRecord, GroundTruth, RawPosition};
use crate::analysis::features::{FeatureRequest, FeatureService};
use crate::engine::leakage::LeakageScore;
use crate::error::ExportError;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Writes one JSON object per line.
pub struct NdjsonWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn write(&mut self, record: &ExportRecord) -> Result<(), ExportError> {
        // A record reaches the sink whole or not at all
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.inner.write_all(&line)?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ExportError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Records written through this writer.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl NdjsonWriter<BufWriter<File>> {
    /// Open `path` for appending, creating it if needed.
    pub fn append_to<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

/// Read every record; blank lines are skipped.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<ExportRecord>, ExportError> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .map_err(|e| ExportError::MalformedLine { line: idx + 1, message: e.to_string() })?;
        records.push(record);
    }
    Ok(records)
}

pub fn read_records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ExportRecord>, ExportError> {
    let file = File::open(path)?;
    read_records(std::io::BufReader::new(file))
}

/// Builds records from a feature service and appends them.
pub struct LabelExporter<S: FeatureService> {
    service: S,
}

impl<S: FeatureService> LabelExporter<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Extract features for `request` and append one record.
    ///
    /// If extraction fails nothing is written and the error is returned.
    pub fn export<W: Write>(
        &self,
        writer: &mut NdjsonWriter<W>,
        request: &FeatureRequest,
        metadata: ExportMetadata,
        ground_truth: GroundTruth,
        score: Option<LeakageScore>,
    ) -> Result<ExportRecord, ExportError> {
        let numerical = self.service.extract(request).map_err(|e| {
            warn!(sample_id = %metadata.sample_id, retryable = e.is_retryable(), "feature extraction failed: {}", e);
            e
        })?;

        let record = ExportRecord {
            metadata,
            ground_truth,
            features: ExportFeatures {
                numerical,
                raw_positions: request.players.iter().map(RawPosition::from).collect(),
            },
            score,
        };
        writer.write(&record)?;
        debug!(sample_id = %record.metadata.sample_id, "exported record");
        Ok(record)
    }
}
