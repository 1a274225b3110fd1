//! The risk classifier: a pure, deterministic function of a canonical
//! record and a pattern catalog.
//!
//! No interior mutability, no clock reads, no randomness — the same
//! `(record, catalog)` pair always yields the same
//! [`ClassificationResult`], which is what makes cross-mode equivalence
//! (in-memory vs. bounded-streaming vs. worker-parallel) possible to test
//! directly against this function rather than against a whole pipeline run.

use serde::Serialize;
use smallvec::SmallVec;

use crate::core::catalog::{Match, PatternCatalog, PatternGroup, Severity};
use crate::core::record::Record;

/// Most records match a handful of tokens at most; inlining up to 8
/// matches avoids a heap allocation on the hot path that runs once per
/// record in the streaming pipeline (the P4 throughput floor is a
/// per-record budget, so allocation-per-record adds up at scale).
type MatchBuffer<'a> = SmallVec<[Match<'a>; 8]>;

pub use crate::core::catalog::RiskLevel;

/// The outcome of classifying one record against one catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    /// The record that was classified.
    pub record: Record,
    /// Clamped total score in `[0, 100]`.
    pub score: i64,
    /// The highest band whose threshold the score meets.
    pub level: RiskLevel,
    /// `"<group>:<token>"` identifiers, in group-traversal order
    /// (prefix, suffix, keyword) and severity order (high, medium, low)
    /// within each group.
    pub matched_patterns: Vec<String>,
    /// Human-readable reason strings, one per entry in `matched_patterns`.
    pub reasons: Vec<String>,
}

/// Classify a single record against a catalog. Pure and side-effect free.
pub fn classify(record: &Record, catalog: &PatternCatalog) -> ClassificationResult {
    let normalized = Record::normalize_name(&record.name).to_ascii_lowercase();
    let labels: Vec<&str> = normalized.split('.').filter(|s| !s.is_empty()).collect();
    let prefix_label = labels.first().copied().unwrap_or(normalized.as_str());
    let suffix_label = if labels.len() >= 2 {
        labels[labels.len() - 2]
    } else {
        prefix_label
    };

    let mut matches: MatchBuffer<'_> = SmallVec::new();
    for group in PatternGroup::ORDER {
        let haystack = match group {
            PatternGroup::Prefix => prefix_label,
            PatternGroup::Suffix => suffix_label,
            PatternGroup::Keyword => normalized.as_str(),
        };
        let buckets = catalog.group(group);
        let mode = group.scan_mode();
        for severity in Severity::ORDER {
            matches.extend(buckets.scan(severity, haystack, group, mode));
        }
    }

    let mut score: i64 = 0;
    let mut matched_patterns = Vec::with_capacity(matches.len());
    let mut reasons = Vec::with_capacity(matches.len());
    for m in &matches {
        score += catalog.points_for(m.severity);
        matched_patterns.push(format!("{}:{}", m.group.tag(), m.token));
        reasons.push(reason_text(m));
    }
    if !matches.is_empty() {
        score += catalog.base_points();
    }
    let score = score.clamp(0, 100);
    let level = catalog.level_for_score(score);

    ClassificationResult {
        record: record.clone(),
        score,
        level,
        matched_patterns,
        reasons,
    }
}

fn reason_text(m: &Match<'_>) -> String {
    let severity = match m.severity {
        Severity::High => "high",
        Severity::Medium => "medium",
        Severity::Low => "low",
    };
    let location = match m.group {
        PatternGroup::Prefix => "as a prefix",
        PatternGroup::Suffix => "as a suffix",
        PatternGroup::Keyword => "as a keyword",
    };
    format!("matched {severity}-severity pattern '{}' {location}", m.token)
}
