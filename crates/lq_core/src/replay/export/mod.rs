//! Labelled-sample export
//!
//! Newline-delimited JSON, one record per labelled moment. Records only ever
//! gain fields; every struct reads with defaults so older lines still parse.

pub mod ndjson;
pub mod types;

pub use ndjson::*;
pub use types::*;
