//! Provider detection and row decoding (C2/C3).
//!
//! A [`ProviderAdapter`] is the Rust-native stand-in for the source's
//! runtime class hierarchy of per-format adapters: a capability set
//! (`confidence`, `decode_row`) implemented by N concrete types and held as
//! trait objects in a fixed-order [`ProviderRegistry`]. No inheritance, no
//! dynamic dispatch beyond the vtable call itself.

use std::collections::HashMap;

use crate::core::record::Record;

pub mod azure_dns;
pub mod cloudflare;
pub mod generic;
pub mod google_dns;
pub mod namecheap;
pub mod onamae;
pub mod route53;

/// Minimum confidence an adapter must reach to be selected over the
/// generic fallback.
pub const MIN_CONFIDENCE: f64 = 0.5;

/// A case-insensitive view of a header row, giving adapters O(1) lookup of
/// a column's position regardless of the casing or exact spelling used by
/// the export.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    /// Original header cells, in file order.
    pub raw: Vec<String>,
    by_lower: HashMap<String, usize>,
}

impl HeaderIndex {
    /// Build an index from a raw header row.
    pub fn new(raw: Vec<String>) -> Self {
        let by_lower = raw
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
            .collect();
        Self { raw, by_lower }
    }

    /// Column index of `name`, case-insensitive.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_lower.get(&name.to_ascii_lowercase()).copied()
    }

    /// Whether every name in `names` is present, case-insensitive.
    pub fn has_all(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.position(n).is_some())
    }

    /// Whether any name in `names` is present, case-insensitive.
    pub fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.position(n).is_some())
    }

    /// Fetch a row's cell for `name`, trimmed. Empty string if the column
    /// is absent or the row is short.
    pub fn cell<'a>(&self, row: &'a [String], name: &str) -> &'a str {
        self.position(name)
            .and_then(|i| row.get(i))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    /// Number of header columns.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the header row is empty.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Outcome of decoding a single raw CSV row.
pub enum DecodeOutcome {
    /// Row decoded successfully.
    Ok(Box<Record>),
    /// Row is not fatal but should be skipped, with a reason for the
    /// aggregate warning counter.
    Skip(String),
}

/// Per-provider header detection and row decoding.
pub trait ProviderAdapter: Send + Sync {
    /// Stable identifier, used for `--provider` overrides and report
    /// attribution (e.g. `"cloudflare"`, `"route53"`).
    fn id(&self) -> &'static str;

    /// Confidence in `[0, 1]` that `header` belongs to this provider's
    /// export format.
    fn confidence(&self, header: &HeaderIndex) -> f64;

    /// Decode one raw row into a canonical record, given the already
    /// -detected header. `zone_hint` is the filename stem, used by
    /// providers (Azure) whose apex rows carry no zone name of their own.
    fn decode_row(&self, row: &[String], header: &HeaderIndex, zone_hint: &str) -> DecodeOutcome;
}

/// Holds one adapter per supported export format, in a fixed preference
/// order used to break confidence ties.
pub struct ProviderRegistry {
    adapters: Vec<Box<dyn ProviderAdapter>>,
    generic: generic::GenericAdapter,
}

/// Outcome of running detection against a header row.
pub struct Detection {
    /// Identifier of the selected adapter (a registered adapter's id, or
    /// `"generic"`).
    pub provider_id: &'static str,
    /// Confidence score that led to the selection. For the generic
    /// fallback this is the best score any real adapter reached (always
    /// below [`MIN_CONFIDENCE`]).
    pub confidence: f64,
    /// Whether no adapter reached the confidence threshold and the
    /// generic fallback was used.
    pub ambiguous: bool,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    /// Build the registry with all built-in adapters, in their fixed
    /// tie-break preference order.
    pub fn new() -> Self {
        Self {
            adapters: vec![
                Box::new(cloudflare::CloudflareAdapter),
                Box::new(route53::Route53Adapter),
                Box::new(google_dns::GoogleDnsAdapter),
                Box::new(azure_dns::AzureDnsAdapter),
                Box::new(onamae::OnamaeAdapter),
                Box::new(namecheap::NamecheapAdapter),
            ],
            generic: generic::GenericAdapter,
        }
    }

    /// Run detection over a header row, returning the winning adapter id
    /// and whether the generic fallback had to be used.
    pub fn detect(&self, header: &HeaderIndex) -> Detection {
        let mut best: Option<(&'static str, f64)> = None;
        for adapter in &self.adapters {
            let score = adapter.confidence(header);
            best = match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((adapter.id(), score)),
            };
        }

        match best {
            Some((id, score)) if score >= MIN_CONFIDENCE => Detection {
                provider_id: id,
                confidence: score,
                ambiguous: false,
            },
            Some((_, score)) => Detection {
                provider_id: self.generic.id(),
                confidence: score,
                ambiguous: true,
            },
            None => Detection {
                provider_id: self.generic.id(),
                confidence: 0.0,
                ambiguous: true,
            },
        }
    }

    /// Fetch an adapter by id, falling back to the generic adapter for
    /// `"generic"` or an unknown id.
    pub fn get(&self, id: &str) -> &dyn ProviderAdapter {
        self.adapters
            .iter()
            .find(|a| a.id() == id)
            .map(|a| a.as_ref())
            .unwrap_or(&self.generic)
    }

    /// All registered adapter ids, in tie-break order (generic excluded).
    pub fn adapter_ids(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.id()).collect()
    }
}

/// Tolerant boolean parsing shared by every adapter:
/// `true/false/yes/no/1/0`, case-insensitive, blank means absent.
pub fn parse_bool_tolerant(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Coerce a TTL cell to an integer, defaulting to
/// [`crate::core::record::DEFAULT_TTL`] when blank or unparsable.
pub fn parse_ttl(raw: &str) -> u32 {
    raw.trim()
        .parse::<u32>()
        .unwrap_or(crate::core::record::DEFAULT_TTL)
}
