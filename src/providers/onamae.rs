//! Onamae.com zone-export adapter.
//!
//! Signature header: `ホスト名,TYPE,VALUE,優先度,TTL` — Japanese locale
//! headers are unified onto the canonical column names rather than
//! threading a locale parameter through the rest of ingestion.

use crate::core::record::{Record, RecordType};
use crate::providers::{parse_ttl, DecodeOutcome, HeaderIndex, ProviderAdapter};

/// Adapter for Onamae.com's CSV export.
pub struct OnamaeAdapter;

const HOST_COL: &str = "ホスト名";
const PRIORITY_COL: &str = "優先度";
const REQUIRED: &[&str] = &["TYPE", "VALUE", "TTL"];

impl ProviderAdapter for OnamaeAdapter {
    fn id(&self) -> &'static str {
        "onamae"
    }

    fn confidence(&self, header: &HeaderIndex) -> f64 {
        let mut score = 0.0;
        if header.has_all(&[HOST_COL]) {
            score += 0.6;
        }
        if header.has_all(&[PRIORITY_COL]) {
            score += 0.1;
        }
        for col in REQUIRED {
            if header.has_all(&[col]) {
                score += 0.1;
            }
        }
        score.clamp(0.0, 1.0)
    }

    fn decode_row(&self, row: &[String], header: &HeaderIndex, _zone_hint: &str) -> DecodeOutcome {
        let name = header.cell(row, HOST_COL);
        if name.is_empty() {
            return DecodeOutcome::Skip("missing ホスト名 column".into());
        }
        let raw_type = header.cell(row, "TYPE");
        let Some(type_) = RecordType::parse(raw_type) else {
            return DecodeOutcome::Skip(format!("unsupported record type '{raw_type}'"));
        };
        let mut content = header.cell(row, "VALUE").to_string();
        let priority = header.cell(row, PRIORITY_COL);
        if type_ == RecordType::Mx && !priority.is_empty() {
            content = format!("{priority} {content}");
        }
        let ttl = parse_ttl(header.cell(row, "TTL"));

        DecodeOutcome::Ok(Box::new(Record {
            name: Record::normalize_name(name),
            type_,
            content,
            ttl,
            proxied: None,
            created: None,
            modified: None,
            provider: Some(self.id().to_string()),
        }))
    }
}
