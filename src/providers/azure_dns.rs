//! Azure DNS zone-export adapter.
//!
//! Signature header: `Name,Type,TTL,Value`, with a bare `@` row for the
//! zone apex (Azure's export carries no zone name of its own on that row).
//!
//! Azure's header carries no column unique to it — detection leans
//! entirely on the required-column set and the absence of every other
//! provider's signature column.

use crate::core::record::{Record, RecordType};
use crate::providers::{parse_ttl, DecodeOutcome, HeaderIndex, ProviderAdapter};

/// Adapter for Azure DNS's CSV export.
pub struct AzureDnsAdapter;

const REQUIRED: &[&str] = &["Name", "Type", "TTL", "Value"];
const CONFLICTING: &[&str] = &[
    "Proxied",
    "RoutingPolicy",
    "rrdatas",
    "dns_name",
    "Priority",
    "ホスト名",
];

impl ProviderAdapter for AzureDnsAdapter {
    fn id(&self) -> &'static str {
        "azure-dns"
    }

    fn confidence(&self, header: &HeaderIndex) -> f64 {
        let mut score = 0.0;
        for col in REQUIRED {
            if header.has_all(&[col]) {
                score += 0.15;
            }
        }
        for col in CONFLICTING {
            if header.has_all(&[col]) {
                score -= 0.3;
            }
        }
        score.clamp(0.0, 1.0)
    }

    fn decode_row(&self, row: &[String], header: &HeaderIndex, zone_hint: &str) -> DecodeOutcome {
        let raw_name = header.cell(row, "Name");
        if raw_name.is_empty() {
            return DecodeOutcome::Skip("missing Name column".into());
        }
        let raw_type = header.cell(row, "Type");
        let Some(type_) = RecordType::parse(raw_type) else {
            return DecodeOutcome::Skip(format!("unsupported record type '{raw_type}'"));
        };
        let content = header.cell(row, "Value").to_string();
        let ttl = parse_ttl(header.cell(row, "TTL"));
        let name = resolve_apex(raw_name, zone_hint);

        DecodeOutcome::Ok(Box::new(Record {
            name: Record::normalize_name(&name),
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

/// Resolve Azure's bare `@` apex marker. When a zone hint (the input
/// filename stem) is available, the apex is qualified against it;
/// otherwise the literal `@` is retained, matching the source's own
/// recorded default rather than guessing a qualified name.
fn resolve_apex(raw_name: &str, zone_hint: &str) -> String {
    if raw_name != "@" {
        return raw_name.to_string();
    }
    if zone_hint.is_empty() {
        "@".to_string()
    } else {
        zone_hint.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> HeaderIndex {
        HeaderIndex::new(vec!["Name".into(), "Type".into(), "TTL".into(), "Value".into()])
    }

    #[test]
    fn canonical_header_wins_detection() {
        let adapter = AzureDnsAdapter;
        assert!(adapter.confidence(&header()) >= crate::providers::MIN_CONFIDENCE);
    }

    #[test]
    fn apex_without_zone_hint_stays_literal() {
        let adapter = AzureDnsAdapter;
        let header = header();
        let row = vec!["@".into(), "A".into(), "3600".into(), "192.0.2.1".into()];
        match adapter.decode_row(&row, &header, "") {
            DecodeOutcome::Ok(record) => assert_eq!(record.name, "@"),
            DecodeOutcome::Skip(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn apex_with_zone_hint_is_qualified() {
        let adapter = AzureDnsAdapter;
        let header = header();
        let row = vec!["@".into(), "A".into(), "3600".into(), "192.0.2.1".into()];
        match adapter.decode_row(&row, &header, "example.net") {
            DecodeOutcome::Ok(record) => assert_eq!(record.name, "example.net"),
            DecodeOutcome::Skip(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn non_apex_rows_are_unaffected() {
        let adapter = AzureDnsAdapter;
        let header = header();
        let row = vec!["www".into(), "A".into(), "3600".into(), "192.0.2.1".into()];
        match adapter.decode_row(&row, &header, "example.net") {
            DecodeOutcome::Ok(record) => assert_eq!(record.name, "www"),
            DecodeOutcome::Skip(reason) => panic!("unexpected skip: {reason}"),
        }
    }
}
