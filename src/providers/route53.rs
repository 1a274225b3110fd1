//! Amazon Route 53 zone-export adapter.
//!
//! Signature header: `Name,Type,Value,TTL,RoutingPolicy`.

use crate::core::record::{Record, RecordType};
use crate::providers::{parse_ttl, DecodeOutcome, HeaderIndex, ProviderAdapter};

/// Adapter for Route 53's CSV export.
pub struct Route53Adapter;

const SIGNATURE: &[&str] = &["RoutingPolicy"];
const REQUIRED: &[&str] = &["Name", "Type", "Value", "TTL"];
const CONFLICTING: &[&str] = &["Proxied", "rrdatas", "dns_name"];

impl ProviderAdapter for Route53Adapter {
    fn id(&self) -> &'static str {
        "route53"
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
        let content = header.cell(row, "Value").to_string();
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
