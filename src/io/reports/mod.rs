//! Report Formatter (C10): table, JSON, and CSV renderings of an analysis
//! run.
//!
//! Risk-level filtering is applied here, at the formatter boundary, never
//! inside the classifier or the pipeline — summary counters always reflect
//! the full input regardless of which level the caller asked to see.

pub mod csv;
pub mod json;
pub mod table;

use crate::core::classifier::{ClassificationResult, RiskLevel};

/// Output format selected on the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Fixed-width summary table (default).
    Table,
    /// A single `{summary, results[]}` JSON document.
    Json,
    /// Header + one row per record, streamable.
    Csv,
}

/// Keep only results at `floor` or a higher risk level. `None` keeps
/// everything. Ordering is `Critical > High > Medium > Low > Safe`.
pub fn filter_by_level(
    results: &[ClassificationResult],
    floor: Option<RiskLevel>,
) -> Vec<&ClassificationResult> {
    match floor {
        None => results.iter().collect(),
        Some(floor) => results.iter().filter(|r| r.level >= floor).collect(),
    }
}
