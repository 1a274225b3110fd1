//! JSON report formatter.
//!
//! Emits a single `{summary, results}` document. Requires the full result
//! set to be materialised, which is why the CLI rejects `--output json`
//! combined with `--stream` at argument-validation time rather than
//! silently truncating the array.

use serde::Serialize;

use crate::core::classifier::ClassificationResult;
use crate::core::errors::{Result, ZoneRiskError};
use crate::core::pipeline::summary::AnalysisSummary;

/// The full JSON report document.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// Aggregate run summary.
    pub summary: &'a AnalysisSummary,
    /// Filtered classification results, each embedding its record.
    pub results: Vec<&'a ClassificationResult>,
}

/// Render a report document to a pretty-printed JSON string.
pub fn render(summary: &AnalysisSummary, results: &[&ClassificationResult]) -> Result<String> {
    let report = JsonReport {
        summary,
        results: results.to_vec(),
    };
    serde_json::to_string_pretty(&report).map_err(ZoneRiskError::from)
}
