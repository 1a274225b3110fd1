//! Namecheap zone-export adapter.
//!
//! Signature header: `Host,Type,Value,TTL,Priority`.

use crate::core::record::{Record, RecordType};
use crate::providers::{parse_ttl, DecodeOutcome, HeaderIndex, ProviderAdapter};

/// Adapter for Namecheap's CSV export.
pub struct NamecheapAdapter;

const SIGNATURE: &[&str] = &["Host"];
const REQUIRED: &[&str] = &["Type", "Value", "TTL"];
const CONFLICTING: &[&str] = &["ホスト名", "dns_name", "RoutingPolicy"];

impl ProviderAdapter for NamecheapAdapter {
    fn id(&self) -> &'static str {
        "namecheap"
    }

    fn confidence(&self, header: &HeaderIndex) -> f64 {
        let mut score = 0.0;
        if header.has_all(SIGNATURE) {
            score += 0.5;
        }
        if header.has_all(&["Priority"]) {
            score += 0.1;
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
        let name = header.cell(row, "Host");
        if name.is_empty() {
            return DecodeOutcome::Skip("missing Host column".into());
        }
        let raw_type = header.cell(row, "Type");
        let Some(type_) = RecordType::parse(raw_type) else {
            return DecodeOutcome::Skip(format!("unsupported record type '{raw_type}'"));
        };
        let mut content = header.cell(row, "Value").to_string();
        let priority = header.cell(row, "Priority");
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

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> HeaderIndex {
        HeaderIndex::new(vec![
            "Host".into(),
            "Type".into(),
            "Value".into(),
            "TTL".into(),
            "Priority".into(),
        ])
    }

    #[test]
    fn canonical_header_wins_detection() {
        let adapter = NamecheapAdapter;
        assert!(adapter.confidence(&header()) >= crate::providers::MIN_CONFIDENCE);
    }

    #[test]
    fn decodes_a_record_row() {
        let adapter = NamecheapAdapter;
        let header = header();
        let row = vec![
            "www".into(),
            "CNAME".into(),
            "example.com".into(),
            "1800".into(),
            "".into(),
        ];
        match adapter.decode_row(&row, &header, "") {
            DecodeOutcome::Ok(record) => assert_eq!(record.name, "www"),
            DecodeOutcome::Skip(reason) => panic!("unexpected skip: {reason}"),
        }
    }
}
