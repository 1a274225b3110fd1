//! The pattern catalog: the externally-loaded scoring rubric the risk
//! classifier is a pure function of.
//!
//! The catalog document shape is fixed by the external interface contract
//! (version, patterns, scoring, thresholds) and is loaded once at startup
//! via [`PatternCatalog::from_yaml_str`] / [`PatternCatalog::from_json_str`]
//! and never mutated afterwards — every [`crate::core::classifier::classify`]
//! call borrows it by reference.

use std::collections::HashMap;

use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, ZoneRiskError};
use crate::core::validate::{validate_lowercase_token, validate_monotonic_decreasing};

/// The pattern catalog bundled into the binary so the tool runs without a
/// `--patterns` override.
pub const DEFAULT_CATALOG_YAML: &str = include_str!("../../resources/default_catalog.yaml");

/// Severity bucket a matched token belongs to. Evaluated high before medium
/// before low, per the classifier's traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Highest-weight bucket.
    High,
    /// Medium-weight bucket.
    Medium,
    /// Lowest-weight bucket.
    Low,
}

impl Severity {
    /// All severities, in evaluation order (high, then medium, then low).
    pub const ORDER: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    fn label(self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// Which part of the name a pattern group matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternGroup {
    /// Leftmost label token.
    Prefix,
    /// Rightmost non-TLD label.
    Suffix,
    /// Anywhere in the full name.
    Keyword,
}

impl PatternGroup {
    /// Traversal order used when scanning a record against all three
    /// groups: prefix, then suffix, then keyword. This fixes the ordering
    /// of `matchedPatterns` when a token matches as more than one group.
    pub const ORDER: [PatternGroup; 3] = [
        PatternGroup::Prefix,
        PatternGroup::Suffix,
        PatternGroup::Keyword,
    ];

    fn label(self) -> &'static str {
        match self {
            PatternGroup::Prefix => "prefix",
            PatternGroup::Suffix => "suffix",
            PatternGroup::Keyword => "keyword",
        }
    }
}

/// Raw, serializable shape of the catalog document, mirroring the external
/// interface's documented JSON/YAML shape exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCatalog {
    version: String,
    patterns: RawPatterns,
    scoring: RawScoring,
    thresholds: RawThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPatterns {
    prefixes: RawBuckets,
    suffixes: RawBuckets,
    keywords: RawBuckets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawBuckets {
    #[serde(default)]
    high: Vec<String>,
    #[serde(default)]
    medium: Vec<String>,
    #[serde(default)]
    low: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawScoring {
    high: i64,
    medium: i64,
    low: i64,
    base: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawThresholds {
    critical: i64,
    high: i64,
    medium: i64,
    low: i64,
    safe: i64,
}

/// A built, ready-to-match token bucket: the lower-cased token list plus an
/// Aho-Corasick automaton over it, so a single pass over a name surfaces
/// every matching token instead of one `contains`/`starts_with` scan per
/// token.
#[derive(Debug)]
struct TokenBucket {
    tokens: Vec<String>,
    automaton: AhoCorasick,
}

impl TokenBucket {
    fn build(tokens: Vec<String>) -> Result<Self> {
        let automaton = AhoCorasick::new(&tokens)
            .map_err(|e| ZoneRiskError::config(format!("failed to build pattern automaton: {e}")))?;
        Ok(Self { tokens, automaton })
    }

    /// All tokens that occur anywhere in `haystack`, each with its match
    /// start/end byte offsets within `haystack`.
    fn matches_in<'a>(&'a self, haystack: &str) -> impl Iterator<Item = (&'a str, usize, usize)> + 'a {
        self.automaton
            .find_iter(haystack)
            .map(move |m| (self.tokens[m.pattern().as_usize()].as_str(), m.start(), m.end()))
    }
}

/// The per-group, per-severity set of buckets, built once at load time.
#[derive(Debug)]
struct GroupBuckets {
    high: TokenBucket,
    medium: TokenBucket,
    low: TokenBucket,
}

impl GroupBuckets {
    fn bucket(&self, severity: Severity) -> &TokenBucket {
        match severity {
            Severity::High => &self.high,
            Severity::Medium => &self.medium,
            Severity::Low => &self.low,
        }
    }
}

/// Point value awarded per matched severity bucket, plus a flat `base`
/// score applied once when any match occurred at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Scoring {
    /// Points for a high-severity match.
    pub high: i64,
    /// Points for a medium-severity match.
    pub medium: i64,
    /// Points for a low-severity match.
    pub low: i64,
    /// Flat bonus applied once if any pattern matched.
    pub base: i64,
}

impl Scoring {
    fn points_for(&self, severity: Severity) -> i64 {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

/// Risk level a score maps onto, from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// No matches, or score below every threshold.
    Safe,
    /// Low-risk band.
    Low,
    /// Medium-risk band.
    Medium,
    /// High-risk band.
    High,
    /// Critical-risk band.
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = ZoneRiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "safe" => Ok(RiskLevel::Safe),
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            other => Err(ZoneRiskError::config(format!("unknown risk level '{other}'"))),
        }
    }
}

/// The ordered score-band table mapping a clamped score onto a
/// [`RiskLevel`]. Thresholds are the minimum score (inclusive) required to
/// reach each level and must be strictly decreasing from critical to safe.
#[derive(Debug, Clone, Copy)]
struct Thresholds {
    critical: i64,
    high: i64,
    medium: i64,
    low: i64,
    safe: i64,
}

impl Thresholds {
    /// The first band from the top whose threshold is met.
    fn level_for(&self, score: i64) -> RiskLevel {
        if score >= self.critical {
            RiskLevel::Critical
        } else if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else if score >= self.low {
            RiskLevel::Low
        } else {
            debug_assert!(score >= self.safe);
            RiskLevel::Safe
        }
    }
}

/// A validated, immutable pattern catalog: the scoring rubric the
/// classifier is evaluated against.
#[derive(Debug)]
pub struct PatternCatalog {
    version: String,
    prefixes: GroupBuckets,
    suffixes: GroupBuckets,
    keywords: GroupBuckets,
    scoring: Scoring,
    thresholds: Thresholds,
}

impl PatternCatalog {
    /// Load and validate a catalog from a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let raw: RawCatalog = serde_yaml::from_str(content)?;
        Self::from_raw(raw)
    }

    /// Load and validate a catalog from a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_str(content)?;
        Self::from_raw(raw)
    }

    /// Load and validate a catalog from a file, dispatching on extension
    /// (`.json` parses as JSON; anything else is tried as YAML, which is a
    /// superset-ish of JSON for our purposes).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ZoneRiskError::input_missing(path, &e))?;
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// The catalog bundled into the binary.
    pub fn default_catalog() -> Self {
        Self::from_yaml_str(DEFAULT_CATALOG_YAML)
            .expect("bundled default catalog must always be valid")
    }

    fn from_raw(raw: RawCatalog) -> Result<Self> {
        validate_buckets(&raw.patterns.prefixes, "patterns.prefixes")?;
        validate_buckets(&raw.patterns.suffixes, "patterns.suffixes")?;
        validate_buckets(&raw.patterns.keywords, "patterns.keywords")?;

        validate_monotonic_decreasing(
            &[
                ("critical", raw.thresholds.critical),
                ("high", raw.thresholds.high),
                ("medium", raw.thresholds.medium),
                ("low", raw.thresholds.low),
                ("safe", raw.thresholds.safe),
            ],
            "thresholds",
        )?;

        let prefixes = build_group(&raw.patterns.prefixes)?;
        let suffixes = build_group(&raw.patterns.suffixes)?;
        let keywords = build_group(&raw.patterns.keywords)?;

        Ok(Self {
            version: raw.version,
            prefixes,
            suffixes,
            keywords,
            scoring: Scoring {
                high: raw.scoring.high,
                medium: raw.scoring.medium,
                low: raw.scoring.low,
                base: raw.scoring.base,
            },
            thresholds: Thresholds {
                critical: raw.thresholds.critical,
                high: raw.thresholds.high,
                medium: raw.thresholds.medium,
                low: raw.thresholds.low,
                safe: raw.thresholds.safe,
            },
        })
    }

    /// Catalog document version string, echoed in reports.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Point values per bucket.
    pub fn scoring(&self) -> Scoring {
        self.scoring
    }

    pub(crate) fn group(&self, group: PatternGroup) -> &GroupBuckets {
        match group {
            PatternGroup::Prefix => &self.prefixes,
            PatternGroup::Suffix => &self.suffixes,
            PatternGroup::Keyword => &self.keywords,
        }
    }

    pub(crate) fn points_for(&self, severity: Severity) -> i64 {
        self.scoring.points_for(severity)
    }

    pub(crate) fn base_points(&self) -> i64 {
        self.scoring.base
    }

    pub(crate) fn level_for_score(&self, score: i64) -> RiskLevel {
        self.thresholds.level_for(score)
    }
}

fn validate_buckets(buckets: &RawBuckets, field: &str) -> Result<()> {
    let mut seen: HashMap<&str, Severity> = HashMap::new();
    for (severity, tokens) in [
        (Severity::High, &buckets.high),
        (Severity::Medium, &buckets.medium),
        (Severity::Low, &buckets.low),
    ] {
        for token in tokens {
            validate_lowercase_token(token, &format!("{field}.{}", severity.label()))?;
            if let Some(prior) = seen.insert(token.as_str(), severity) {
                if prior != severity {
                    return Err(ZoneRiskError::config_field(
                        format!(
                            "token '{token}' appears in both '{}' and '{}' buckets",
                            prior.label(),
                            severity.label()
                        ),
                        field.to_string(),
                    ));
                }
                return Err(ZoneRiskError::config_field(
                    format!("duplicate token '{token}' within '{}' bucket", severity.label()),
                    field.to_string(),
                ));
            }
        }
    }
    Ok(())
}

fn build_group(buckets: &RawBuckets) -> Result<GroupBuckets> {
    Ok(GroupBuckets {
        high: TokenBucket::build(buckets.high.clone())?,
        medium: TokenBucket::build(buckets.medium.clone())?,
        low: TokenBucket::build(buckets.low.clone())?,
    })
}

/// A single matched token, used internally by the classifier to build
/// `matchedPatterns` identifiers and reasons.
pub(crate) struct Match<'a> {
    pub group: PatternGroup,
    pub severity: Severity,
    pub token: &'a str,
}

impl GroupBuckets {
    /// Find every token in `severity`'s bucket that matches `haystack`
    /// under `mode`.
    pub(crate) fn scan<'a>(
        &'a self,
        severity: Severity,
        haystack: &str,
        group: PatternGroup,
        mode: ScanMode,
    ) -> Vec<Match<'a>> {
        let bucket = self.bucket(severity);
        bucket
            .matches_in(haystack)
            .filter(|(_, start, end)| mode.accepts(*start, *end, haystack.len()))
            .map(|(token, _, _)| Match {
                group,
                severity,
                token,
            })
            .collect()
    }
}

/// How a match's byte span must relate to the haystack for it to count.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ScanMode {
    /// Match must start at byte 0 (prefix-of-label semantics).
    AnchoredStart,
    /// Match must end at the haystack's length (suffix-of-label semantics).
    AnchoredEnd,
    /// Match may occur anywhere (keyword semantics).
    Anywhere,
}

impl ScanMode {
    fn accepts(self, start: usize, end: usize, haystack_len: usize) -> bool {
        match self {
            ScanMode::AnchoredStart => start == 0,
            ScanMode::AnchoredEnd => end == haystack_len,
            ScanMode::Anywhere => true,
        }
    }
}

impl PatternGroup {
    pub(crate) fn scan_mode(self) -> ScanMode {
        match self {
            PatternGroup::Prefix => ScanMode::AnchoredStart,
            PatternGroup::Suffix => ScanMode::AnchoredEnd,
            PatternGroup::Keyword => ScanMode::Anywhere,
        }
    }

    /// Matched-pattern identifier prefix, e.g. `"prefix:"`.
    pub fn tag(self) -> &'static str {
        self.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> PatternCatalog {
        let yaml = r#"
version: "test-1"
patterns:
  prefixes:
    high: ["old-", "test-"]
    medium: ["dev-"]
    low: []
  suffixes:
    high: []
    medium: ["-legacy"]
    low: []
  keywords:
    high: ["admin"]
    medium: []
    low: ["staging"]
scoring:
  high: 80
  medium: 40
  low: 10
  base: 10
thresholds:
  critical: 90
  high: 70
  medium: 40
  low: 10
  safe: 0
"#;
        PatternCatalog::from_yaml_str(yaml).expect("valid test catalog")
    }

    #[test]
    fn loads_valid_catalog() {
        let catalog = sample_catalog();
        assert_eq!(catalog.version(), "test-1");
        assert_eq!(catalog.scoring().base, 10);
    }

    #[test]
    fn rejects_duplicate_token_across_buckets() {
        let yaml = r#"
version: "dup"
patterns:
  prefixes:
    high: ["old-"]
    medium: ["old-"]
    low: []
  suffixes:
    high: []
    medium: []
    low: []
  keywords:
    high: []
    medium: []
    low: []
scoring: { high: 80, medium: 40, low: 10, base: 10 }
thresholds: { critical: 90, high: 70, medium: 40, low: 10, safe: 0 }
"#;
        assert!(PatternCatalog::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn rejects_non_monotonic_thresholds() {
        let yaml = r#"
version: "bad-thresholds"
patterns:
  prefixes: { high: [], medium: [], low: [] }
  suffixes: { high: [], medium: [], low: [] }
  keywords: { high: [], medium: [], low: [] }
scoring: { high: 80, medium: 40, low: 10, base: 10 }
thresholds: { critical: 50, high: 70, medium: 40, low: 10, safe: 0 }
"#;
        assert!(PatternCatalog::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn rejects_uppercase_token() {
        let yaml = r#"
version: "upper"
patterns:
  prefixes: { high: ["OLD-"], medium: [], low: [] }
  suffixes: { high: [], medium: [], low: [] }
  keywords: { high: [], medium: [], low: [] }
scoring: { high: 80, medium: 40, low: 10, base: 10 }
thresholds: { critical: 90, high: 70, medium: 40, low: 10, safe: 0 }
"#;
        assert!(PatternCatalog::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn default_catalog_loads() {
        let catalog = PatternCatalog::default_catalog();
        assert!(!catalog.version().is_empty());
    }

    #[test]
    fn level_for_score_picks_highest_met_band() {
        let catalog = sample_catalog();
        assert_eq!(catalog.level_for_score(95), RiskLevel::Critical);
        assert_eq!(catalog.level_for_score(90), RiskLevel::Critical);
        assert_eq!(catalog.level_for_score(75), RiskLevel::High);
        assert_eq!(catalog.level_for_score(40), RiskLevel::Medium);
        assert_eq!(catalog.level_for_score(5), RiskLevel::Low);
        assert_eq!(catalog.level_for_score(0), RiskLevel::Safe);
    }
}
