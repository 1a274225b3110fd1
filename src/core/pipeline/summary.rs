//! The aggregate result of one analysis run.

use serde::Serialize;

use crate::core::catalog::RiskLevel;
use crate::core::classifier::ClassificationResult;
use crate::core::topk::{TopKAggregator, DEFAULT_K};

/// A non-fatal per-row rejection, recorded rather than logged-and-dropped
/// so a report run can audit what was skipped and why.
#[derive(Debug, Clone, Serialize)]
pub struct RowWarning {
    /// 1-based line number within the source file.
    pub line: usize,
    /// Reason the row was rejected.
    pub reason: String,
}

/// Aggregate counts, timing, and the bounded top-K list for one input
/// file. Additionally carries `source_file` and `provider` so a
/// multi-file run's JSON/CSV output can be attributed without re-deriving
/// it from shell history.
#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    /// Path (or identifier) of the file this summary covers.
    pub source_file: String,
    /// Provider adapter id used to decode this file.
    pub provider: String,
    /// Count of records at each risk level.
    pub critical_count: u64,
    /// See [`Self::critical_count`].
    pub high_count: u64,
    /// See [`Self::critical_count`].
    pub medium_count: u64,
    /// See [`Self::critical_count`].
    pub low_count: u64,
    /// See [`Self::critical_count`].
    pub safe_count: u64,
    /// Total classified records (sum of the per-level counts).
    pub total_records: u64,
    /// Rows rejected during normalisation; not included in `total_records`.
    pub warnings: Vec<RowWarning>,
    /// Wall-clock seconds spent processing this file.
    pub wall_clock_seconds: f64,
    /// Highest-scored records retained, descending by score, bounded to K.
    pub top_k: Vec<ClassificationResult>,
    /// Whether the run was cut short by cancellation.
    pub interrupted: bool,
    /// RFC-3339 timestamp taken when the run finished, for report
    /// attribution across multi-file batches.
    pub generated_at: String,
}

impl AnalysisSummary {
    /// Start a new summary for `source_file`, decoded by `provider`.
    pub fn new(source_file: String, provider: String) -> Self {
        Self {
            source_file,
            provider,
            critical_count: 0,
            high_count: 0,
            medium_count: 0,
            low_count: 0,
            safe_count: 0,
            total_records: 0,
            warnings: Vec::new(),
            wall_clock_seconds: 0.0,
            top_k: Vec::new(),
            interrupted: false,
            generated_at: String::new(),
        }
    }

    /// Fold one classification result's counters into the summary. Does
    /// not retain the result itself; callers separately offer it to a
    /// [`TopKAggregator`] via [`Self::finish`].
    pub fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Critical => self.critical_count += 1,
            RiskLevel::High => self.high_count += 1,
            RiskLevel::Medium => self.medium_count += 1,
            RiskLevel::Low => self.low_count += 1,
            RiskLevel::Safe => self.safe_count += 1,
        }
        self.total_records += 1;
    }

    /// Record a rejected row.
    pub fn add_warning(&mut self, line: usize, reason: impl Into<String>) {
        self.warnings.push(RowWarning {
            line,
            reason: reason.into(),
        });
    }

    /// Mark this summary as a partial result from a cancelled run.
    pub fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    /// Finalise with elapsed wall-clock time and the aggregator's
    /// contents, sorted descending by score.
    pub fn finish(&mut self, wall_clock_seconds: f64, top_k: TopKAggregator) {
        self.wall_clock_seconds = wall_clock_seconds;
        self.top_k = top_k.into_sorted_vec();
        self.generated_at = chrono::Utc::now().to_rfc3339();
    }

    /// The UI-surfaced slice of the top-K list (first 10, or fewer).
    pub fn top_slice(&self) -> &[ClassificationResult] {
        let n = self.top_k.len().min(10);
        &self.top_k[..n]
    }

    /// Merge another summary's counters into this one (used by the
    /// worker-parallel collector, which owns per-worker partial
    /// summaries that must fold into one). Does not merge `top_k`;
    /// callers merge top-K separately via a shared aggregator.
    pub fn merge_counts(&mut self, other: &AnalysisSummary) {
        self.critical_count += other.critical_count;
        self.high_count += other.high_count;
        self.medium_count += other.medium_count;
        self.low_count += other.low_count;
        self.safe_count += other.safe_count;
        self.total_records += other.total_records;
        self.warnings.extend(other.warnings.iter().cloned());
    }
}

/// Default K for the top-K aggregator when the CLI does not override it.
pub const DEFAULT_TOP_K: usize = DEFAULT_K;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_increments_matching_bucket() {
        let mut summary = AnalysisSummary::new("zone.csv".into(), "cloudflare".into());
        summary.record(RiskLevel::Critical);
        summary.record(RiskLevel::Safe);
        summary.record(RiskLevel::Safe);
        assert_eq!(summary.critical_count, 1);
        assert_eq!(summary.safe_count, 2);
        assert_eq!(summary.total_records, 3);
    }

    #[test]
    fn merge_counts_sums_both_summaries() {
        let mut a = AnalysisSummary::new("zone.csv".into(), "cloudflare".into());
        a.record(RiskLevel::High);
        let mut b = AnalysisSummary::new("zone.csv".into(), "cloudflare".into());
        b.record(RiskLevel::High);
        b.record(RiskLevel::Low);
        a.merge_counts(&b);
        assert_eq!(a.high_count, 2);
        assert_eq!(a.low_count, 1);
        assert_eq!(a.total_records, 3);
    }

    #[test]
    fn top_slice_caps_at_ten() {
        let mut summary = AnalysisSummary::new("zone.csv".into(), "cloudflare".into());
        let mut agg = TopKAggregator::new(20);
        for i in 0..15 {
            agg.offer(crate::core::classifier::ClassificationResult {
                record: crate::core::record::Record {
                    name: format!("n{i}"),
                    type_: crate::core::record::RecordType::A,
                    content: "192.0.2.1".into(),
                    ttl: crate::core::record::DEFAULT_TTL,
                    proxied: None,
                    created: None,
                    modified: None,
                    provider: None,
                },
                score: i as i64,
                level: RiskLevel::Low,
                matched_patterns: vec![],
                reasons: vec![],
            });
        }
        summary.finish(1.0, agg);
        assert_eq!(summary.top_k.len(), 15);
        assert_eq!(summary.top_slice().len(), 10);
    }
}
