//! Cloudflare zone-export adapter.
//!
//! Signature header: `Name,Type,Content,TTL,Proxied,Created,Modified`.

use crate::core::record::{Record, RecordType};
use crate::providers::{parse_bool_tolerant, parse_ttl, DecodeOutcome, HeaderIndex, ProviderAdapter};

/// Adapter for Cloudflare's CSV zone export.
pub struct CloudflareAdapter;

const SIGNATURE: &[&str] = &["Proxied"];
const REQUIRED: &[&str] = &["Name", "Type", "Content", "TTL"];
const CONFLICTING: &[&str] = &["RoutingPolicy", "rrdatas", "dns_name"];

impl ProviderAdapter for CloudflareAdapter {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    fn confidence(&self, header: &HeaderIndex) -> f64 {
        let mut score = 0.0;
        if header.has_all(SIGNATURE) {
            score += 0.6;
        }
        for col in REQUIRED {
            if header.has_all(&[col]) {
                score += 0.1;
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
        let name = header.cell(row, "Name");
        if name.is_empty() {
            return DecodeOutcome::Skip("missing Name column".into());
        }
        let raw_type = header.cell(row, "Type");
        let Some(type_) = RecordType::parse(raw_type) else {
            return DecodeOutcome::Skip(format!("unsupported record type '{raw_type}'"));
        };
        let content = header.cell(row, "Content").to_string();
        let ttl = parse_ttl(header.cell(row, "TTL"));
        let proxied = parse_bool_tolerant(header.cell(row, "Proxied"));
        let created = non_empty(header.cell(row, "Created"));
        let modified = non_empty(header.cell(row, "Modified"));

        DecodeOutcome::Ok(Box::new(Record {
            name: Record::normalize_name(name),
            type_,
            content,
            ttl,
            proxied,
            created,
            modified,
            provider: Some(self.id().to_string()),
        }))
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
