use thiserror::Error;

/// Errors raised while ingesting tracking frames.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackingError {
    #[error("Frame at {timestamp_ms}ms is older than the last buffered frame ({last_ms}ms)")]
    OutOfOrderFrame { timestamp_ms: f64, last_ms: f64 },

    #[error("Frame at {timestamp_ms}ms has no valid entity samples")]
    EmptyFrame { timestamp_ms: f64 },

    #[error("Non-finite frame timestamp")]
    NonFiniteTimestamp,
}

/// Errors raised while loading or validating engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Failure of the feature-extraction boundary. Never carries a partial result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Missing essential player data: {0}")]
    MissingData(String),

    #[error("Carrier not found: {0}")]
    CarrierNotFound(String),

    #[error("Feature service unavailable: {0}")]
    Unavailable(String),

    #[error("Feature service timed out after {0}ms")]
    Timeout(u64),
}

impl FeatureError {
    /// Whether a caller-side retry could succeed with identical inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FeatureError::Unavailable(_) | FeatureError::Timeout(_))
    }
}

/// Errors for the NDJSON export format.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record on line {line}: {message}")]
    MalformedLine { line: usize, message: String },

    #[error("Feature extraction failed: {0}")]
    Features(#[from] FeatureError),
}

/// Crate-level error.
#[derive(Error, Debug)]
pub enum LeakageError {
    #[error(transparent)]
    Tracking(#[from] TrackingError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type Result<T> = std::result::Result<T, LeakageError>;
