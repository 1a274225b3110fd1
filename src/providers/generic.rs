//! Generic fallback adapter.
//!
//! Used when no registered adapter reaches [`crate::providers::MIN_CONFIDENCE`].
//! Maps `Name|Host/Type/Content|Value/TTL` if present, tolerating whichever
//! of the common column name variants the export happens to use.

use crate::core::record::{Record, RecordType};
use crate::providers::{parse_ttl, DecodeOutcome, HeaderIndex, ProviderAdapter};

/// Best-effort column mapper for unrecognised export formats.
pub struct GenericAdapter;

const NAME_ALIASES: &[&str] = &["Name", "Host", "dns_name", "ホスト名"];
const TYPE_ALIASES: &[&str] = &["Type", "record_type", "TYPE"];
const CONTENT_ALIASES: &[&str] = &["Content", "Value", "rrdatas", "VALUE"];
const TTL_ALIASES: &[&str] = &["TTL", "ttl"];

impl ProviderAdapter for GenericAdapter {
    fn id(&self) -> &'static str {
        "generic"
    }

    /// The generic adapter is never entered into the scored competition;
    /// it is the registry's fallback when every other adapter loses. This
    /// always returns 0.0 so it can never accidentally win detection.
    fn confidence(&self, _header: &HeaderIndex) -> f64 {
        0.0
    }

    fn decode_row(&self, row: &[String], header: &HeaderIndex, _zone_hint: &str) -> DecodeOutcome {
        let Some(name) = find_cell(row, header, NAME_ALIASES) else {
            return DecodeOutcome::Skip("no recognisable name column".into());
        };
        if name.is_empty() {
            return DecodeOutcome::Skip("missing name value".into());
        }
        let Some(raw_type) = find_cell(row, header, TYPE_ALIASES) else {
            return DecodeOutcome::Skip("no recognisable type column".into());
        };
        let Some(type_) = RecordType::parse(raw_type) else {
            return DecodeOutcome::Skip(format!("unsupported record type '{raw_type}'"));
        };
        let content = find_cell(row, header, CONTENT_ALIASES).unwrap_or("").to_string();
        let ttl = find_cell(row, header, TTL_ALIASES)
            .map(parse_ttl)
            .unwrap_or(crate::core::record::DEFAULT_TTL);

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

fn find_cell<'a>(row: &'a [String], header: &HeaderIndex, aliases: &[&str]) -> Option<&'a str> {
    aliases.iter().find_map(|alias| {
        header.position(alias).and_then(|i| row.get(i)).map(|s| {
            let trimmed: &str = s.trim();
            trimmed
        })
    })
}
