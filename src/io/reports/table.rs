//! Table report formatter.
//!
//! A fixed-width summary (totals, per-level counts with percentages,
//! top-N offenders) followed by an optional detailed table bounded by
//! the `--verbose` flag and whatever `--risk-level` floor the caller
//! already applied via [`super::filter_by_level`]. Colorized with
//! `owo-colors` when the sink is a real terminal, per `console`'s
//! `Term::is_term` idiom; plain text otherwise so piped output stays
//! parseable.

use console::Term;
use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use crate::core::catalog::RiskLevel;
use crate::core::classifier::ClassificationResult;
use crate::core::pipeline::summary::AnalysisSummary;

const TOP_OFFENDERS: usize = 10;

/// Render the fixed-width summary block: totals, per-level counts and
/// percentages, and the top offenders by score.
pub fn render_summary(summary: &AnalysisSummary) -> String {
    let colorize = Term::stdout().is_term();
    let mut out = String::new();

    out.push_str(&heading(&format!("Zone risk summary: {}", summary.source_file), colorize));
    out.push('\n');
    out.push_str(&format!("provider: {}\n", summary.provider));
    out.push_str(&format!("records analyzed: {}\n", summary.total_records));
    if summary.interrupted {
        out.push_str(&warn_line("run interrupted before the source was exhausted", colorize));
    }
    out.push('\n');

    out.push_str(&Table::new(level_rows(summary)).with(TableStyle::rounded()).to_string());
    out.push('\n');

    if !summary.warnings.is_empty() {
        out.push('\n');
        out.push_str(&format!("{} row(s) skipped during ingestion\n", summary.warnings.len()));
    }

    let top = summary.top_slice();
    if !top.is_empty() {
        out.push('\n');
        out.push_str(&heading("Top offenders", colorize));
        out.push('\n');
        out.push_str(
            &Table::new(offender_rows(top.iter().take(TOP_OFFENDERS)))
                .with(TableStyle::rounded())
                .to_string(),
        );
        out.push('\n');
    }

    out
}

/// Render the full detailed table for an already-filtered result set.
/// Used when `--verbose` is set or the caller wants every surviving row,
/// not just the top-N summary slice.
pub fn render_detail(results: &[&ClassificationResult]) -> String {
    if results.is_empty() {
        return String::new();
    }
    Table::new(offender_rows(results.iter().copied()))
        .with(TableStyle::rounded())
        .to_string()
}

fn heading(text: &str, colorize: bool) -> String {
    if colorize {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn warn_line(text: &str, colorize: bool) -> String {
    let line = format!("warning: {text}\n");
    if colorize {
        line.yellow().to_string()
    } else {
        line
    }
}

#[derive(Tabled)]
struct LevelRow {
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Count")]
    count: u64,
    #[tabled(rename = "Percent")]
    percent: String,
}

fn level_rows(summary: &AnalysisSummary) -> Vec<LevelRow> {
    let total = summary.total_records.max(1) as f64;
    let rows = [
        (RiskLevel::Critical, summary.critical_count),
        (RiskLevel::High, summary.high_count),
        (RiskLevel::Medium, summary.medium_count),
        (RiskLevel::Low, summary.low_count),
        (RiskLevel::Safe, summary.safe_count),
    ];
    rows.into_iter()
        .map(|(level, count)| LevelRow {
            level: level.to_string(),
            count,
            percent: format!("{:.1}%", count as f64 / total * 100.0),
        })
        .collect()
}

#[derive(Tabled)]
struct OffenderRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    type_: String,
    #[tabled(rename = "Score")]
    score: i64,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Matched patterns")]
    matched_patterns: String,
}

fn offender_rows<'a>(
    results: impl Iterator<Item = &'a ClassificationResult>,
) -> Vec<OffenderRow> {
    results
        .map(|r| OffenderRow {
            name: r.record.name.clone(),
            type_: r.record.type_.as_str().to_string(),
            score: r.score,
            level: r.level.to_string(),
            matched_patterns: r.matched_patterns.join(", "),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{Record, RecordType, DEFAULT_TTL};
    use crate::core::topk::TopKAggregator;

    fn result(name: &str, score: i64, level: RiskLevel) -> ClassificationResult {
        ClassificationResult {
            record: Record {
                name: name.to_string(),
                type_: RecordType::A,
                content: "192.0.2.1".to_string(),
                ttl: DEFAULT_TTL,
                proxied: None,
                created: None,
                modified: None,
                provider: None,
            },
            score,
            level,
            matched_patterns: vec!["prefix:old-".to_string()],
            reasons: vec!["matched high-severity pattern 'old-' as a prefix".to_string()],
        }
    }

    #[test]
    fn summary_contains_counts_and_provider() {
        let mut summary = AnalysisSummary::new("zone.csv".to_string(), "cloudflare".to_string());
        summary.record(RiskLevel::Critical);
        summary.record(RiskLevel::Safe);
        let mut agg = TopKAggregator::new(10);
        agg.offer(result("old-api.example.com", 90, RiskLevel::Critical));
        summary.finish(0.01, agg);

        let rendered = render_summary(&summary);
        assert!(rendered.contains("cloudflare"));
        assert!(rendered.contains("old-api.example.com"));
        assert!(rendered.contains("critical"));
    }

    #[test]
    fn detail_empty_for_no_results() {
        assert_eq!(render_detail(&[]), "");
    }

    #[test]
    fn detail_renders_each_row() {
        let a = result("a.example.com", 10, RiskLevel::Low);
        let b = result("b.example.com", 20, RiskLevel::Medium);
        let refs: Vec<&ClassificationResult> = vec![&a, &b];
        let rendered = render_detail(&refs);
        assert!(rendered.contains("a.example.com"));
        assert!(rendered.contains("b.example.com"));
    }
}
