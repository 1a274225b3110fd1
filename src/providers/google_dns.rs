//! Google Cloud DNS zone-export adapter.
//!
//! Signature header: `dns_name,record_type,ttl,rrdatas`.

use crate::core::record::{Record, RecordType};
use crate::providers::{parse_ttl, DecodeOutcome, HeaderIndex, ProviderAdapter};

/// Adapter for Google Cloud DNS's CSV export.
pub struct GoogleDnsAdapter;

const SIGNATURE: &[&str] = &["rrdatas"];
const REQUIRED: &[&str] = &["dns_name", "record_type", "ttl"];
const CONFLICTING: &[&str] = &["Proxied", "RoutingPolicy"];

impl ProviderAdapter for GoogleDnsAdapter {
    fn id(&self) -> &'static str {
        "google-dns"
    }

    fn confidence(&self, header: &HeaderIndex) -> f64 {
        let mut score = 0.0;
        if header.has_all(SIGNATURE) {
            score += 0.6;
        }
        for col in REQUIRED {
            if header.has_all(&[col]) {
                score += 0.13;
            }
        }
        for col in CONFLICTING {
            if header.has_all(&[col]) {
                score -= 0.3;
            }
        }
        score.clamp(0.0, 1.0)
    }

    fn decode_row(&self, row: &[String], header: &HeaderIndex, _zone_hint: &str) -> DecodeOutcome {
        let name = header.cell(row, "dns_name");
        if name.is_empty() {
            return DecodeOutcome::Skip("missing dns_name column".into());
        }
        let raw_type = header.cell(row, "record_type");
        let Some(type_) = RecordType::parse(raw_type) else {
            return DecodeOutcome::Skip(format!("unsupported record type '{raw_type}'"));
        };
        let content = header.cell(row, "rrdatas").to_string();
        let ttl = parse_ttl(header.cell(row, "ttl"));

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
