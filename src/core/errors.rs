//! Error types for the zonerisk analyzer.
//!
//! One variant per error kind in the external error-handling design: per-row
//! errors never reach this type (they are aggregated into
//! [`crate::core::pipeline::summary::AnalysisSummary`] warnings); only
//! structural failures and the single-retry-then-fatal chunk/worker failure
//! propagate here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout zonerisk.
pub type Result<T> = std::result::Result<T, ZoneRiskError>;

/// Errors surfaced by the ingestion, classification, and reporting pipeline.
#[derive(Error, Debug)]
pub enum ZoneRiskError {
    /// Pattern catalog malformed or missing. Fatal at startup.
    #[error("invalid pattern catalog: {message}")]
    ConfigInvalid {
        /// Human-readable description of the violation.
        message: String,
        /// Dotted field path that failed validation, if known.
        field: Option<String>,
    },

    /// Input file not found or unreadable. Fatal for that file only.
    #[error("cannot read input file {path}: {message}")]
    InputMissing {
        /// Path that could not be opened.
        path: PathBuf,
        /// Underlying reason.
        message: String,
    },

    /// No provider adapter exceeded the confidence threshold and no
    /// override was given. Non-fatal: falls back to the generic adapter.
    #[error("provider detection ambiguous for {path}: highest confidence {best_confidence:.2}")]
    DetectionAmbiguous {
        /// File the detection ran against.
        path: PathBuf,
        /// Highest confidence score observed, always < 0.5.
        best_confidence: f64,
    },

    /// A single row failed to decode into a canonical record. Non-fatal:
    /// recorded as a warning, row skipped.
    #[error("row {line} malformed: {reason}")]
    RowMalformed {
        /// 1-based line number within the source file.
        line: usize,
        /// Reason the row was rejected.
        reason: String,
    },

    /// Soft memory cap exceeded by more than 2x for a full chunk. Fatal;
    /// a partial summary is still emitted by the caller.
    #[error("memory cap exceeded: {current_mb} MiB against a {limit_mb} MiB limit")]
    MemoryExceeded {
        /// Estimated resident bytes at the time of the trip, in MiB.
        current_mb: u64,
        /// Configured soft cap, in MiB.
        limit_mb: u64,
    },

    /// A chunk failed classification twice (original attempt + one retry
    /// on another worker). Fatal.
    #[error("chunk {chunk_ordinal} failed classification after retry: {message}")]
    WorkerFailed {
        /// Ordinal of the chunk that could not be classified.
        chunk_ordinal: u64,
        /// Underlying failure description.
        message: String,
    },

    /// The output sink could not be written to. Fatal after flushing
    /// whatever was already buffered.
    #[error("output write failed: {message}")]
    OutputFailed {
        /// Description of the write failure.
        message: String,
        /// Underlying I/O error, if any.
        #[source]
        source: Option<io::Error>,
    },

    /// Cancellation was requested. Not a failure: callers should still
    /// treat this as a partial, successful run (exit code 0).
    #[error("processing interrupted after {records_processed} records")]
    Interrupted {
        /// Number of records actually read before cancellation took effect.
        records_processed: u64,
    },
}

impl ZoneRiskError {
    /// Build a [`ZoneRiskError::ConfigInvalid`] without a field path.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
            field: None,
        }
    }

    /// Build a [`ZoneRiskError::ConfigInvalid`] with a field path for
    /// pinpointing which part of the catalog document failed validation.
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Build a [`ZoneRiskError::InputMissing`] from an I/O error.
    pub fn input_missing(path: impl Into<PathBuf>, source: &io::Error) -> Self {
        Self::InputMissing {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Build a [`ZoneRiskError::OutputFailed`] from an I/O error.
    pub fn output_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self::OutputFailed {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Exit code this error should produce at the CLI boundary, per the
    /// external interface contract: 1 for input/validation errors, 2 for
    /// runtime failures. `Interrupted` is handled separately by the caller
    /// (exit code 0 with a partial summary) and never reaches this method
    /// in practice.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigInvalid { .. } | Self::InputMissing { .. } => 1,
            Self::DetectionAmbiguous { .. } | Self::RowMalformed { .. } => 1,
            Self::MemoryExceeded { .. } | Self::WorkerFailed { .. } | Self::OutputFailed { .. } => 2,
            Self::Interrupted { .. } => 0,
        }
    }
}

impl From<serde_yaml::Error> for ZoneRiskError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config(format!("catalog YAML invalid: {err}"))
    }
}

impl From<serde_json::Error> for ZoneRiskError {
    fn from(err: serde_json::Error) -> Self {
        Self::config(format!("catalog JSON invalid: {err}"))
    }
}

impl From<csv::Error> for ZoneRiskError {
    fn from(err: csv::Error) -> Self {
        Self::OutputFailed {
            message: format!("CSV error: {err}"),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_invalid_exits_one() {
        let err = ZoneRiskError::config("missing scoring table");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn memory_exceeded_exits_two() {
        let err = ZoneRiskError::MemoryExceeded {
            current_mb: 250,
            limit_mb: 100,
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn interrupted_exits_zero() {
        let err = ZoneRiskError::Interrupted {
            records_processed: 42,
        };
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn config_field_carries_path() {
        let err = ZoneRiskError::config_field("threshold not monotonic", "thresholds.high");
        match err {
            ZoneRiskError::ConfigInvalid { field, .. } => {
                assert_eq!(field.as_deref(), Some("thresholds.high"));
            }
            _ => panic!("wrong variant"),
        }
    }
}
